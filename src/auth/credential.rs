//! Bearer credential wrapper that redacts sensitive material.

// self
use crate::_prelude::*;

/// Bearer token proving the caller's identity to the backend.
///
/// The wrapper keeps the raw value out of `Debug`/`Display` output so credentials never leak
/// into logs or span fields.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);
impl Credential {
	/// Wraps a new bearer token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the token carries no characters.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Formats the `Authorization` header value for an optional credential.
	///
	/// An absent credential still produces the `Bearer ` prefix so the backend sees a
	/// well-formed (if empty) scheme.
	pub fn bearer(credential: Option<&Self>) -> String {
		format!("Bearer {}", credential.map(Self::expose).unwrap_or_default())
	}
}
impl AsRef<str> for Credential {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Credential").field(&"<redacted>").finish()
	}
}
impl Display for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
