//! Thread-safe in-memory [`CredentialStore`] for tests and short-lived clients.

// std
use std::collections::HashMap;
// self
use crate::{
	_prelude::*,
	auth::Credential,
	store::{CredentialStore, StoreError, StoreFuture},
};

type SlotMap = Arc<RwLock<HashMap<String, Credential>>>;

/// Storage backend that keeps credentials in-process; contents vanish with the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SlotMap);
impl MemoryStore {
	/// Creates a store with `slot` pre-populated, mirroring a client that already logged in.
	pub fn with_credential(slot: impl Into<String>, credential: Credential) -> Self {
		let store = Self::default();

		store.0.write().insert(slot.into(), credential);

		store
	}

	/// Synchronous snapshot of a slot, convenient for assertions.
	pub fn peek(&self, slot: &str) -> Option<Credential> {
		self.0.read().get(slot).cloned()
	}

	fn save_now(map: SlotMap, slot: String, credential: Credential) -> Result<(), StoreError> {
		map.write().insert(slot, credential);

		Ok(())
	}
}
impl CredentialStore for MemoryStore {
	fn load<'a>(&'a self, slot: &'a str) -> StoreFuture<'a, Option<Credential>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(slot).cloned()) })
	}

	fn save<'a>(&'a self, slot: &'a str, credential: Credential) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let slot = slot.to_owned();

		Box::pin(async move { Self::save_now(map, slot, credential) })
	}

	fn clear<'a>(&'a self, slot: &'a str) -> StoreFuture<'a, Option<Credential>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().remove(slot)) })
	}
}
