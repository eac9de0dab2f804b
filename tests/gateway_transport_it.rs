// std
use std::{collections::VecDeque, io, sync::Arc};
// crates.io
use parking_lot::Mutex;
// self
use marketplace_gateway::{
	auth::Credential,
	config::GatewayConfig,
	error::{ConfigError, Error, RefreshFailure, TransportError},
	gateway::Gateway,
	http::{GatewayResponse, HttpTransport, RequestAttempt, RequestOptions, TransportFuture},
	http_types::{Method, StatusCode, header::AUTHORIZATION},
	store::{CredentialStore, MemoryStore, StoreError, StoreFuture},
	url::Url,
};

type Scripted = Result<GatewayResponse, TransportError>;

/// Replays canned outcomes in order and records every attempt it receives.
#[derive(Default)]
struct ScriptedTransport {
	script: Mutex<VecDeque<Scripted>>,
	seen: Mutex<Vec<RequestAttempt>>,
}
impl ScriptedTransport {
	fn new(script: impl IntoIterator<Item = Scripted>) -> Arc<Self> {
		Arc::new(Self { script: Mutex::new(script.into_iter().collect()), seen: Default::default() })
	}

	fn seen(&self) -> Vec<RequestAttempt> {
		self.seen.lock().clone()
	}
}
impl HttpTransport for ScriptedTransport {
	fn execute(&self, attempt: RequestAttempt) -> TransportFuture<'_> {
		self.seen.lock().push(attempt);

		let next = self
			.script
			.lock()
			.pop_front()
			.unwrap_or_else(|| Err(TransportError::Io(io::Error::other("script exhausted"))));

		Box::pin(async move {
			// Suspend once so concurrent callers interleave like they would on a network.
			tokio::task::yield_now().await;

			next
		})
	}
}

fn respond(status: StatusCode, body: &str) -> Scripted {
	Ok(GatewayResponse::new(status, body))
}

fn unreachable_host() -> Scripted {
	Err(TransportError::Io(io::Error::new(io::ErrorKind::ConnectionRefused, "refused")))
}

/// Memory store whose `clear` always fails, like a read-only disk.
struct StickyStore(MemoryStore);
impl CredentialStore for StickyStore {
	fn load<'a>(&'a self, slot: &'a str) -> StoreFuture<'a, Option<Credential>> {
		self.0.load(slot)
	}

	fn save<'a>(&'a self, slot: &'a str, credential: Credential) -> StoreFuture<'a, ()> {
		self.0.save(slot, credential)
	}

	fn clear<'a>(&'a self, _: &'a str) -> StoreFuture<'a, Option<Credential>> {
		Box::pin(async { Err(StoreError::Backend { message: "read-only".into() }) })
	}
}

fn gateway_config() -> GatewayConfig {
	let base = Url::parse("https://shop.example.com/api/").expect("Fixture base URL should parse.");

	GatewayConfig::builder(base).build().expect("Gateway config should validate.")
}

fn build_gateway(
	transport: Arc<ScriptedTransport>,
	credential: Option<&str>,
) -> (Gateway<ScriptedTransport>, Arc<MemoryStore>) {
	let store = Arc::new(match credential {
		Some(value) => MemoryStore::with_credential("access_token", Credential::new(value)),
		None => MemoryStore::default(),
	});
	let gateway =
		Gateway::<ScriptedTransport>::with_transport(gateway_config(), store.clone(), transport);

	(gateway, store)
}

#[tokio::test]
async fn primary_transport_failure_propagates_without_refresh() {
	let transport = ScriptedTransport::new([unreachable_host()]);
	let (gateway, store) = build_gateway(transport.clone(), Some("old"));
	let err = gateway
		.request("orders", RequestOptions::get())
		.await
		.expect_err("Network failures must surface.");

	assert!(matches!(err, Error::Transport(TransportError::Io(_))));
	assert!(!err.is_session_expired());
	assert_eq!(transport.seen().len(), 1);
	assert_eq!(store.peek("access_token"), Some(Credential::new("old")));
	assert_eq!(gateway.refresh_metrics.attempts(), 0);
}

#[tokio::test]
async fn refresh_transport_failure_expires_session() {
	let transport =
		ScriptedTransport::new([respond(StatusCode::UNAUTHORIZED, ""), unreachable_host()]);
	let (gateway, store) = build_gateway(transport.clone(), Some("old"));
	let err = gateway
		.request("orders", RequestOptions::get())
		.await
		.expect_err("A refresh that never reached the backend ends the session.");

	let Error::SessionExpired { reason: RefreshFailure::Transport(source) } = &err else {
		panic!("Expected a transport refresh failure, got {err:?}.");
	};

	assert!(matches!(source.as_ref(), TransportError::Io(_)));
	assert_eq!(transport.seen().len(), 2);
	assert!(store.peek("access_token").is_none());
}

#[tokio::test]
async fn retry_transport_failure_propagates() {
	let transport = ScriptedTransport::new([
		respond(StatusCode::UNAUTHORIZED, ""),
		respond(StatusCode::OK, r#"{"access_token":"new"}"#),
		unreachable_host(),
	]);
	let (gateway, store) = build_gateway(transport.clone(), Some("old"));
	let err = gateway
		.request("orders", RequestOptions::get())
		.await
		.expect_err("Retry failures surface as transport errors.");

	assert!(matches!(err, Error::Transport(_)));
	assert_eq!(store.peek("access_token"), Some(Credential::new("new")));
}

#[tokio::test]
async fn refresh_and_retry_attempts_are_shaped_correctly() {
	let transport = ScriptedTransport::new([
		respond(StatusCode::UNPROCESSABLE_ENTITY, ""),
		respond(StatusCode::OK, r#"{"access_token":"new","token_type":"bearer"}"#),
		respond(StatusCode::CREATED, "{}"),
	]);
	let (gateway, _store) = build_gateway(transport.clone(), Some("old"));
	let options = RequestOptions::post().body(r#"{"product_id":7}"#);
	let response =
		gateway.request("cart/items", options).await.expect("Retried request should succeed.");

	assert_eq!(response.status, StatusCode::CREATED);

	let seen = transport.seen();

	assert_eq!(seen.len(), 3);

	let (first, refresh, retry) = (&seen[0], &seen[1], &seen[2]);

	assert_eq!(first.url.as_str(), "https://shop.example.com/api/cart/items");
	assert_eq!(first.headers[AUTHORIZATION], "Bearer old");
	assert!(!first.retry);

	assert_eq!(refresh.method, Method::POST);
	assert_eq!(refresh.url.as_str(), "https://shop.example.com/api/auth/refresh");
	assert!(refresh.headers.get(AUTHORIZATION).is_none());
	assert!(refresh.body.is_none());

	assert_eq!(retry.method, Method::POST);
	assert_eq!(retry.url, first.url);
	assert_eq!(retry.headers[AUTHORIZATION], "Bearer new");
	assert_eq!(retry.body.as_deref(), Some(br#"{"product_id":7}"#.as_slice()));
	assert!(retry.retry);
}

#[tokio::test]
async fn missing_credential_still_refreshes() {
	let transport = ScriptedTransport::new([
		respond(StatusCode::UNAUTHORIZED, ""),
		respond(StatusCode::OK, r#"{"access_token":"restored"}"#),
		respond(StatusCode::OK, "[]"),
	]);
	let (gateway, store) = build_gateway(transport.clone(), None);
	let response =
		gateway.request("wishlist", RequestOptions::get()).await.expect("Request should succeed.");

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(transport.seen()[0].headers[AUTHORIZATION], "Bearer ");
	assert_eq!(store.peek("access_token"), Some(Credential::new("restored")));
}

#[tokio::test]
async fn empty_stored_credential_counts_as_absent() {
	let transport = ScriptedTransport::new([respond(StatusCode::OK, "")]);
	let (gateway, _store) = build_gateway(transport.clone(), Some(""));

	gateway.request("profile", RequestOptions::get()).await.expect("Request should succeed.");

	assert_eq!(transport.seen()[0].headers[AUTHORIZATION], "Bearer ");
}

#[tokio::test]
async fn non_auth_failures_pass_through() {
	let transport = ScriptedTransport::new([respond(StatusCode::FORBIDDEN, "{}")]);
	let (gateway, _store) = build_gateway(transport.clone(), Some("old"));
	let response =
		gateway.request("admin", RequestOptions::get()).await.expect("403 is still a response.");

	assert_eq!(response.status, StatusCode::FORBIDDEN);
	assert_eq!(transport.seen().len(), 1);
}

#[tokio::test]
async fn invalid_target_is_a_config_error() {
	let transport = ScriptedTransport::new([]);
	let (gateway, _store) = build_gateway(transport.clone(), Some("old"));
	let err = gateway
		.request("http://[::1", RequestOptions::get())
		.await
		.expect_err("Malformed absolute targets cannot be resolved.");

	assert!(matches!(err, Error::Config(ConfigError::InvalidTarget { .. })));
	assert!(transport.seen().is_empty());
}

#[tokio::test]
async fn coalesced_refresh_skips_the_endpoint() {
	let transport = ScriptedTransport::new([]);
	let (gateway, store) = build_gateway(transport.clone(), Some("rotated"));
	let credential = gateway
		.refresh(Some(&Credential::new("stale")))
		.await
		.expect("A newer stored credential should be reused.");

	assert_eq!(credential, Credential::new("rotated"));
	assert!(transport.seen().is_empty());
	assert_eq!(store.peek("access_token"), Some(Credential::new("rotated")));
	assert_eq!(gateway.refresh_metrics.coalesced(), 1);
}

#[tokio::test]
async fn waiters_share_a_failed_refresh() {
	let transport = ScriptedTransport::new([
		respond(StatusCode::UNAUTHORIZED, ""),
		respond(StatusCode::UNAUTHORIZED, ""),
		respond(StatusCode::FORBIDDEN, ""),
		respond(StatusCode::OK, r#"{"access_token":"too-late"}"#),
	]);
	let (gateway, store) = build_gateway(transport.clone(), Some("old"));
	let (first, second) = tokio::join!(
		gateway.request("orders", RequestOptions::get()),
		gateway.request("orders", RequestOptions::get()),
	);

	for result in [first, second] {
		assert!(matches!(
			result,
			Err(Error::SessionExpired { reason: RefreshFailure::Rejected { status: 403 } })
		));
	}

	let refreshes =
		transport.seen().iter().filter(|attempt| attempt.url.path() == "/api/auth/refresh").count();

	assert_eq!(refreshes, 1);
	assert_eq!(transport.seen().len(), 3);
	assert!(store.peek("access_token").is_none());
	assert_eq!(gateway.refresh_metrics.attempts(), 1);
	assert_eq!(gateway.refresh_metrics.coalesced(), 1);
}

#[tokio::test]
async fn requests_after_a_failed_refresh_refresh_again() {
	let transport = ScriptedTransport::new([
		respond(StatusCode::UNAUTHORIZED, ""),
		respond(StatusCode::FORBIDDEN, ""),
		respond(StatusCode::UNAUTHORIZED, ""),
		respond(StatusCode::OK, r#"{"access_token":"relogged"}"#),
		respond(StatusCode::OK, "{}"),
	]);
	let (gateway, store) = build_gateway(transport.clone(), Some("old"));

	gateway.request("orders", RequestOptions::get()).await.expect_err("First refresh fails.");

	let response = gateway
		.request("orders", RequestOptions::get())
		.await
		.expect("A later request starts a fresh refresh window.");

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(store.peek("access_token"), Some(Credential::new("relogged")));
	assert_eq!(gateway.refresh_metrics.attempts(), 2);
}

#[tokio::test]
async fn failed_logout_is_counted_and_session_still_expires() {
	let transport = ScriptedTransport::new([
		respond(StatusCode::UNAUTHORIZED, ""),
		respond(StatusCode::FORBIDDEN, ""),
	]);
	let store = StickyStore(MemoryStore::with_credential("access_token", Credential::new("old")));
	let gateway = Gateway::<ScriptedTransport>::with_transport(
		gateway_config(),
		Arc::new(store),
		transport.clone(),
	);
	let err = gateway
		.request("orders", RequestOptions::get())
		.await
		.expect_err("Refresh rejection ends the session even when the slot cannot be cleared.");

	assert!(err.is_session_expired());
	assert_eq!(gateway.refresh_metrics.logout_failures(), 1);
}
