// crates.io
use ::http::StatusCode;
// self
use crate::obs::{CallKind, CallOutcome};

/// Counts a settled call via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"marketplace_gateway_call_total",
			"call" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts a backend answer by status class (when enabled).
pub fn record_response_status(kind: CallKind, status: StatusCode) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"marketplace_gateway_response_total",
			"call" => kind.as_str(),
			"status" => crate::obs::status_class(status)
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, status);
	}
}
