//! Storage contracts and built-in backends for the process-wide credential slot.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::Credential};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Key/value persistence for bearer credentials.
///
/// Each slot holds at most one credential and the last writer wins; callers needing stronger
/// guarantees must coordinate outside the store.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the credential held in `slot`, if any.
	fn load<'a>(&'a self, slot: &'a str) -> StoreFuture<'a, Option<Credential>>;

	/// Replaces whatever `slot` holds with `credential`.
	fn save<'a>(&'a self, slot: &'a str, credential: Credential) -> StoreFuture<'a, ()>;

	/// Empties `slot`, returning the credential it held.
	fn clear<'a>(&'a self, slot: &'a str) -> StoreFuture<'a, Option<Credential>>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_gateway_error_with_source() {
		let store_error = StoreError::Backend { message: "disk full".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("disk full"));

		let source = StdError::source(&error)
			.expect("Gateway error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
