//! Authenticated request gateway: bearer attachment plus one-shot refresh-and-retry.
//!
//! [`Gateway::request`] reads the session credential, issues the call, and on a 401/422
//! answer runs the refresh sub-protocol once before replaying the request exactly once.
//! A failed refresh clears the credential slot and surfaces [`Error::SessionExpired`]; the
//! gateway itself never navigates, see [`crate::policy::LoginRedirect`] for that.

pub mod refresh;

mod promotions;

pub use refresh::*;

// self
use crate::{
	_prelude::*,
	auth::Credential,
	config::GatewayConfig,
	error::ConfigError,
	http::{GatewayResponse, HttpTransport, RequestAttempt, RequestOptions},
	obs::{CallKind, CallOutcome, CallSpan},
	session::Session,
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport.
pub type ReqwestGateway = Gateway<ReqwestTransport>;

/// Sends backend requests on behalf of the current session.
///
/// The gateway owns the transport, the session handle, and the single refresh guard shared by
/// every clone, so concurrent calls rejected with the same stale credential coalesce into one
/// refresh.
pub struct Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport used for every outbound call.
	pub transport: Arc<T>,
	/// Session holding the bearer credential slot.
	pub session: Session,
	/// Validated endpoint configuration.
	pub config: GatewayConfig,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_state: Arc<refresh::RefreshState>,
}
impl<T> Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a gateway over the caller-provided transport.
	///
	/// The session is bound to `config.credential_slot` inside `store`.
	pub fn with_transport(
		config: GatewayConfig,
		store: Arc<dyn CredentialStore>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		let session = Session::with_slot(store, config.credential_slot.clone());

		Self {
			transport: transport.into(),
			session,
			config,
			refresh_metrics: Default::default(),
			refresh_state: Default::default(),
		}
	}

	/// Performs `options` against `target`, refreshing and retrying once on 401/422.
	///
	/// Returns the response of the first attempt, or of the single retry when a refresh
	/// happened. A retried request that is rejected again is returned as-is.
	pub async fn request(&self, target: &str, options: RequestOptions) -> Result<GatewayResponse> {
		let span = CallSpan::new(CallKind::Request, &options.method, target);
		let trace = &span;
		let result = span
			.instrument(async move {
				let url = self.config.resolve(target).map_err(|source| {
					ConfigError::InvalidTarget { target: target.to_owned(), source }
				})?;
				// Read before the credential so a refresh finishing in between is observed.
				let epoch = self.refresh_state.epoch();
				let credential = self.session.current().await?;
				let attempt = RequestAttempt::first(url, options, credential.as_ref())?;
				let response = self.transport.execute(attempt.clone()).await?;

				trace.response(response.status);

				if attempt.retry || !response.rejects_credential() {
					return Ok(response);
				}

				let fresh = self.refresh_since(credential.as_ref(), epoch).await?;

				self.replay(attempt, &fresh).await
			})
			.await;

		span.finish(CallOutcome::of_response(&result));

		result
	}

	async fn replay(&self, attempt: RequestAttempt, credential: &Credential) -> Result<GatewayResponse> {
		let span = CallSpan::new(CallKind::Retry, &attempt.method, attempt.url.path());
		let trace = &span;
		let result = span
			.instrument(async move {
				let retry = attempt.into_retry(credential)?;
				let response = self.transport.execute(retry).await?;

				trace.response(response.status);

				Ok(response)
			})
			.await;

		span.finish(CallOutcome::of_response(&result));

		result
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestTransport> {
	/// Creates a gateway with its own cookie-enabled reqwest transport.
	pub fn new(config: GatewayConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
		let transport = ReqwestTransport::new()?;

		Ok(Self::with_transport(config, store, transport))
	}
}
impl<T> Clone for Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			session: self.session.clone(),
			config: self.config.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh_state: self.refresh_state.clone(),
		}
	}
}
impl<T> Debug for Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("config", &self.config)
			.field("session", &self.session)
			.field("refresh_metrics", &self.refresh_metrics)
			.finish()
	}
}
