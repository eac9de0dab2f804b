//! Session context binding a [`CredentialStore`] to the fixed credential slot.
//!
//! Components receive a [`Session`] instead of touching global storage, so tests can hand each
//! gateway its own isolated store.

// self
use crate::{_prelude::*, auth::Credential, store::CredentialStore};

/// Slot name used when the configuration does not override it.
pub const DEFAULT_CREDENTIAL_SLOT: &str = "access_token";

/// Handle to the process-wide credential slot.
#[derive(Clone)]
pub struct Session {
	store: Arc<dyn CredentialStore>,
	slot: String,
}
impl Session {
	/// Binds `store` using [`DEFAULT_CREDENTIAL_SLOT`].
	pub fn new(store: Arc<dyn CredentialStore>) -> Self {
		Self::with_slot(store, DEFAULT_CREDENTIAL_SLOT)
	}

	/// Binds `store` to a custom slot name.
	pub fn with_slot(store: Arc<dyn CredentialStore>, slot: impl Into<String>) -> Self {
		Self { store, slot: slot.into() }
	}

	/// Slot name the session reads and writes.
	pub fn slot(&self) -> &str {
		&self.slot
	}

	/// Current credential; empty tokens count as absent.
	pub async fn current(&self) -> Result<Option<Credential>> {
		let credential = self.store.load(&self.slot).await?;

		Ok(credential.filter(|c| !c.is_empty()))
	}

	/// Stores a credential issued by login or refresh.
	pub async fn login(&self, credential: Credential) -> Result<()> {
		self.store.save(&self.slot, credential).await?;

		Ok(())
	}

	/// Clears the slot, returning the credential that was dropped.
	pub async fn logout(&self) -> Result<Option<Credential>> {
		Ok(self.store.clear(&self.slot).await?)
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session").field("slot", &self.slot).finish()
	}
}
