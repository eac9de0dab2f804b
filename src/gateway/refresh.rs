//! Credential refresh sub-protocol with a singleflight guard.
//!
//! [`Gateway::refresh`] serializes refreshes behind one async mutex that also remembers how the
//! last refresh ended. A caller that reaches the guard after another caller already rotated the
//! credential reuses the stored value, and a caller whose request went out before a refresh
//! that failed receives that same failure, so a burst of 401s issues a single refresh whatever
//! its outcome.

mod metrics;

pub use metrics::RefreshMetrics;

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use ::http::Method;
// self
use crate::{
	_prelude::*,
	auth::Credential,
	error::{ConfigError, RefreshFailure},
	gateway::Gateway,
	http::{HttpTransport, RequestAttempt},
	obs::{CallKind, CallOutcome, CallSpan},
};

/// Singleflight guard plus the outcome of the last completed refresh.
///
/// `epoch` advances once per completed refresh and is only written while the guard is held.
#[derive(Debug, Default)]
pub(crate) struct RefreshState {
	epoch: AtomicU64,
	last_failure: AsyncMutex<Option<RefreshFailure>>,
}
impl RefreshState {
	/// Number of refreshes completed so far.
	pub(crate) fn epoch(&self) -> u64 {
		self.epoch.load(Ordering::Acquire)
	}

	fn advance(&self) {
		self.epoch.fetch_add(1, Ordering::AcqRel);
	}
}

enum Settled {
	Rotated(Credential),
	Reused(Credential),
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
	#[serde(default)]
	access_token: Option<String>,
}

impl<T> Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Exchanges the session cookie for a new credential.
	///
	/// `stale` is the credential the backend just rejected. When the slot already holds a
	/// different credential by the time the guard is acquired, that credential is returned
	/// without contacting the endpoint. On any refresh failure the slot is cleared and
	/// [`Error::SessionExpired`] is returned.
	pub async fn refresh(&self, stale: Option<&Credential>) -> Result<Credential> {
		self.refresh_since(stale, self.refresh_state.epoch()).await
	}

	/// Refresh on behalf of a request sent when the refresh epoch read `observed_epoch`.
	///
	/// If a refresh completed after that point and failed, its failure is shared instead of
	/// calling the endpoint again.
	pub(crate) async fn refresh_since(
		&self,
		stale: Option<&Credential>,
		observed_epoch: u64,
	) -> Result<Credential> {
		let span = CallSpan::new(CallKind::Refresh, &Method::POST, &self.config.refresh_path);
		let trace = &span;
		let result = span
			.instrument(async move {
				let url = self.config.refresh_url().map_err(|source| ConfigError::InvalidTarget {
					target: self.config.refresh_path.clone(),
					source,
				})?;
				let mut last_failure = self.refresh_state.last_failure.lock().await;

				if self.refresh_state.epoch() != observed_epoch {
					if let Some(reason) = last_failure.clone() {
						self.refresh_metrics.record_coalesced();
						trace.note("sharing the outcome of a failed refresh");

						return Err(Error::SessionExpired { reason });
					}
				}
				if let Some(current) = self.session.current().await?.filter(|c| Some(c) != stale)
				{
					self.refresh_metrics.record_coalesced();
					trace.note("credential already rotated");

					return Ok(Settled::Reused(current));
				}

				self.refresh_metrics.record_attempt();

				match self.call_refresh_endpoint(url, trace).await {
					Ok(credential) => {
						self.session.login(credential.clone()).await.inspect_err(|_| {
							self.refresh_metrics.record_failure();
						})?;
						*last_failure = None;
						self.refresh_state.advance();
						self.refresh_metrics.record_success();

						Ok(Settled::Rotated(credential))
					},
					Err(reason) => {
						self.refresh_metrics.record_failure();
						*last_failure = Some(reason.clone());
						self.refresh_state.advance();

						if let Err(e) = self.session.logout().await {
							self.refresh_metrics.record_logout_failure();
							trace.note_error("credential slot could not be cleared", &e);
						}

						Err(Error::SessionExpired { reason })
					},
				}
			})
			.await;
		let (result, outcome) = match result {
			Ok(Settled::Rotated(credential)) => (Ok(credential), CallOutcome::Rotated),
			Ok(Settled::Reused(credential)) => (Ok(credential), CallOutcome::Coalesced),
			Err(e) => {
				let outcome = CallOutcome::of_error(&e);

				(Err(e), outcome)
			},
		};

		span.finish(outcome);

		result
	}

	async fn call_refresh_endpoint(
		&self,
		url: Url,
		trace: &CallSpan,
	) -> Result<Credential, RefreshFailure> {
		let response = self
			.transport
			.execute(RequestAttempt::refresh(url))
			.await
			.map_err(|e| RefreshFailure::Transport(Arc::new(e)))?;

		trace.response(response.status);

		if !response.is_success() {
			return Err(RefreshFailure::Rejected { status: response.status.as_u16() });
		}

		let de = &mut serde_json::Deserializer::from_slice(&response.body);
		let body: RefreshResponse = serde_path_to_error::deserialize(de)
			.map_err(|e| RefreshFailure::MalformedBody(Arc::new(e)))?;

		body.access_token
			.filter(|token| !token.is_empty())
			.map(Credential::new)
			.ok_or(RefreshFailure::MissingAccessToken)
	}
}
