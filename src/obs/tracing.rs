// crates.io
use ::http::{Method, StatusCode};
// self
use crate::{
	_prelude::*,
	obs::{self, CallKind, CallOutcome},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// Span and counters for one gateway call.
///
/// Only the path of the target is recorded; query strings may carry customer data.
#[derive(Clone, Debug)]
pub struct CallSpan {
	kind: CallKind,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Opens a span for `method` against `target`.
	pub fn new(kind: CallKind, method: &Method, target: &str) -> Self {
		let path = target_path(target);

		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"marketplace_gateway.call",
				call = kind.as_str(),
				method = method.as_str(),
				path,
				status = tracing::field::Empty,
				outcome = tracing::field::Empty,
			);

			Self { kind, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (method, path);

			Self { kind }
		}
	}

	/// Call leg this span covers.
	pub fn kind(&self) -> CallKind {
		self.kind
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Records the backend's status on the span and the response counter.
	pub fn response(&self, status: StatusCode) {
		obs::record_response_status(self.kind, status);

		#[cfg(feature = "tracing")]
		{
			self.span.record("status", status.as_u16());
		}
	}

	/// Records how the call settled on the span and the call counter.
	pub fn finish(&self, outcome: CallOutcome) {
		obs::record_call_outcome(self.kind, outcome);

		#[cfg(feature = "tracing")]
		{
			self.span.record("outcome", outcome.as_str());
		}
	}

	/// Emits a debug event inside the span.
	pub fn note(&self, message: &'static str) {
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(|| tracing::debug!("{message}"));
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = message;
		}
	}

	/// Emits a warning event inside the span carrying `error`.
	pub fn note_error(&self, message: &'static str, error: &dyn StdError) {
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(|| tracing::warn!(error = %error, "{message}"));
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (message, error);
		}
	}
}

fn target_path(target: &str) -> &str {
	target.split(['?', '#']).next().unwrap_or(target)
}
