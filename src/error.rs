//! Gateway-level error types shared across the session, transport, and promotion layers.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Parsing failure with the JSON path that broke decoding.
pub type JsonPathError = serde_path_to_error::Error<serde_json::Error>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential storage failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeouts).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The credential was rejected and could not be refreshed; the user must log in again.
	#[error("Session expired; refresh failed.")]
	SessionExpired {
		/// Why the refresh sub-protocol produced no credential.
		#[source]
		reason: RefreshFailure,
	},
	/// Response body did not match the expected JSON shape.
	#[error("Response body could not be decoded.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: JsonPathError,
		/// HTTP status code of the decoded response, when available.
		status: Option<u16>,
	},
	/// Backend answered with a status the typed helper cannot use.
	#[error("Backend returned unexpected status {status}.")]
	UnexpectedStatus {
		/// HTTP status code.
		status: u16,
	},
}
impl Error {
	/// Returns `true` for the terminal session-expired condition.
	pub fn is_session_expired(&self) -> bool {
		matches!(self, Self::SessionExpired { .. })
	}

	/// Short text suitable for showing to the end user.
	pub fn user_message(&self) -> &'static str {
		match self {
			Self::SessionExpired { .. } => "Your session has expired. Please log in.",
			_ => "Something went wrong. Please try again.",
		}
	}
}

/// Configuration and request construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Request target cannot be resolved into a URL.
	#[error("Request target `{target}` is not a valid URL.")]
	InvalidTarget {
		/// Target string supplied by the caller.
		target: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Credential contains bytes that cannot travel in an HTTP header.
	#[error("Credential cannot be encoded as an Authorization header.")]
	InvalidCredentialHeader(#[from] ::http::header::InvalidHeaderValue),
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized to JSON.")]
	BodySerialize(#[source] serde_json::Error),
	/// Gateway configuration failed validation.
	#[error(transparent)]
	Gateway(#[from] crate::config::GatewayConfigError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Reasons the refresh endpoint produced no usable credential.
///
/// Cloneable so every caller waiting on the same refresh receives the same reason.
#[derive(Clone, Debug, ThisError)]
pub enum RefreshFailure {
	/// Refresh endpoint answered with a non-2xx status.
	#[error("Refresh endpoint rejected the session with status {status}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
	},
	/// Refresh endpoint answered with a body that is not the expected JSON.
	#[error("Refresh endpoint returned malformed JSON.")]
	MalformedBody(#[source] Arc<JsonPathError>),
	/// Refresh endpoint answered 2xx without an access token.
	#[error("Refresh endpoint response is missing access_token.")]
	MissingAccessToken,
	/// Refresh call never produced a response.
	#[error("Refresh endpoint could not be reached.")]
	Transport(#[source] Arc<TransportError>),
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn session_expired_exposes_refresh_reason_as_source() {
		let err = Error::SessionExpired { reason: RefreshFailure::Rejected { status: 403 } };
		let source = StdError::source(&err).expect("Session errors should expose the reason.");

		assert!(err.is_session_expired());
		assert_eq!(source.to_string(), "Refresh endpoint rejected the session with status 403.");
		assert_eq!(err.user_message(), "Your session has expired. Please log in.");
	}

	#[test]
	fn refresh_failures_clone_with_shared_sources() {
		let failure =
			RefreshFailure::Transport(Arc::new(TransportError::Io(std::io::Error::other("reset"))));
		let shared = failure.clone();

		match (&failure, &shared) {
			(RefreshFailure::Transport(a), RefreshFailure::Transport(b)) =>
				assert!(Arc::ptr_eq(a, b)),
			_ => panic!("Clone should keep the variant."),
		}
		assert!(StdError::source(&shared).is_some());
	}

	#[test]
	fn transport_errors_read_as_retryable() {
		let err: Error =
			TransportError::Io(std::io::Error::other("connection reset")).into();

		assert!(!err.is_session_expired());
		assert_eq!(err.user_message(), "Something went wrong. Please try again.");
	}
}
