//! Optional observability for gateway traffic.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to wrap every outbound call in a `marketplace_gateway.call` span carrying
//!   `call`, `method`, and `path`, with `status` and `outcome` filled in once the call settles.
//! - Enable `metrics` to count settled calls in `marketplace_gateway_call_total{call, outcome}`
//!   and backend answers in `marketplace_gateway_response_total{call, status}`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, http::GatewayResponse};

/// Which leg of the request/refresh/replay sequence an outbound call belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Caller-initiated backend request (first attempt).
	Request,
	/// `POST` to the refresh endpoint.
	Refresh,
	/// Replay of a request after a successful refresh.
	Retry,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Request => "request",
			CallKind::Refresh => "refresh",
			CallKind::Retry => "retry",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// How a gateway call settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Backend answered with a status the gateway does not react to.
	Answered,
	/// Backend answered 401 or 422.
	CredentialRejected,
	/// Refresh endpoint issued a new credential.
	Rotated,
	/// Refresh reused the outcome of a refresh another caller already ran.
	Coalesced,
	/// Refresh failed and the session ended.
	SessionExpired,
	/// Transport never produced a response.
	Unreachable,
	/// Local configuration, storage, or decoding failure.
	Failed,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Answered => "answered",
			CallOutcome::CredentialRejected => "credential_rejected",
			CallOutcome::Rotated => "rotated",
			CallOutcome::Coalesced => "coalesced",
			CallOutcome::SessionExpired => "session_expired",
			CallOutcome::Unreachable => "unreachable",
			CallOutcome::Failed => "failed",
		}
	}

	/// Classifies the result of a request or replay.
	pub fn of_response(result: &Result<GatewayResponse>) -> Self {
		match result {
			Ok(response) if response.rejects_credential() => Self::CredentialRejected,
			Ok(_) => Self::Answered,
			Err(e) => Self::of_error(e),
		}
	}

	/// Classifies a failed call.
	pub fn of_error(error: &Error) -> Self {
		match error {
			Error::SessionExpired { .. } => Self::SessionExpired,
			Error::Transport(_) => Self::Unreachable,
			_ => Self::Failed,
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Coarse status class used as a metric label (`2xx`, `4xx`, ...).
pub fn status_class(status: ::http::StatusCode) -> &'static str {
	match status.as_u16() {
		100..=199 => "1xx",
		200..=299 => "2xx",
		300..=399 => "3xx",
		400..=499 => "4xx",
		500..=599 => "5xx",
		_ => "other",
	}
}
