// std
use std::sync::Arc;
// self
use marketplace_gateway::{
	auth::Credential,
	session::Session,
	store::{CredentialStore, MemoryStore},
};

#[tokio::test]
async fn save_load_and_clear_round_trip() {
	let store = MemoryStore::default();

	store
		.save("access_token", Credential::new("tok-1"))
		.await
		.expect("Saving a credential into the memory store should succeed.");

	let loaded = store
		.load("access_token")
		.await
		.expect("Loading from the memory store should succeed.")
		.expect("Saved credential should remain present.");

	assert_eq!(loaded.expose(), "tok-1");

	let cleared = store.clear("access_token").await.expect("Clearing the slot should succeed.");

	assert_eq!(cleared, Some(Credential::new("tok-1")));
	assert!(store.load("access_token").await.expect("Load should succeed.").is_none());
}

#[tokio::test]
async fn last_writer_wins_and_slots_are_isolated() {
	let store = MemoryStore::default();

	store.save("buyer", Credential::new("first")).await.expect("First save should succeed.");
	store.save("buyer", Credential::new("second")).await.expect("Second save should succeed.");
	store.save("vendor", Credential::new("other")).await.expect("Vendor save should succeed.");

	assert_eq!(store.peek("buyer"), Some(Credential::new("second")));
	assert_eq!(store.peek("vendor"), Some(Credential::new("other")));
	assert!(store.clear("admin").await.expect("Clearing an empty slot is allowed.").is_none());
}

#[tokio::test]
async fn sessions_share_the_backing_store() {
	let store = Arc::new(MemoryStore::default());
	let buyer = Session::new(store.clone());
	let observer = Session::new(store.clone());

	buyer.login(Credential::new("shared")).await.expect("Login should persist the credential.");

	assert_eq!(
		observer.current().await.expect("Observer should read the store."),
		Some(Credential::new("shared"))
	);

	observer.logout().await.expect("Logout should clear the slot.");

	assert!(buyer.current().await.expect("Buyer should read the store.").is_none());
	assert!(store.peek(buyer.slot()).is_none());
}
