//! Caller-level reactions to terminal session failures.
//!
//! The gateway reports [`Error::SessionExpired`] but never decides what the UI does about it.
//! [`LoginRedirect`] is the interceptor that sends the client to the login route whenever a
//! wrapped call ends that way.

// self
use crate::{_prelude::*, config::GatewayConfig};

/// Client-side navigation hook (router, webview, or test recorder).
pub trait Navigator
where
	Self: Send + Sync,
{
	/// Replaces the current view with `route`.
	fn navigate(&self, route: &str);
}

/// Redirects to the login route when a call fails with [`Error::SessionExpired`].
pub struct LoginRedirect<N>
where
	N: ?Sized + Navigator,
{
	navigator: Arc<N>,
	route: String,
}
impl<N> LoginRedirect<N>
where
	N: ?Sized + Navigator,
{
	/// Creates an interceptor that navigates to `route`.
	pub fn new(navigator: Arc<N>, route: impl Into<String>) -> Self {
		Self { navigator, route: route.into() }
	}

	/// Creates an interceptor targeting the configured login route.
	pub fn from_config(navigator: Arc<N>, config: &GatewayConfig) -> Self {
		Self::new(navigator, config.login_route.clone())
	}

	/// Route the interceptor navigates to.
	pub fn route(&self) -> &str {
		&self.route
	}

	/// Navigates when `result` carries a session expiry, then hands the result back unchanged.
	pub fn intercept<T>(&self, result: Result<T>) -> Result<T> {
		if matches!(&result, Err(err) if err.is_session_expired()) {
			self.navigator.navigate(&self.route);
		}

		result
	}

	/// Awaits `call` and applies [`LoginRedirect::intercept`] to its outcome.
	pub async fn guard<F, T>(&self, call: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		self.intercept(call.await)
	}
}
impl<N> Clone for LoginRedirect<N>
where
	N: ?Sized + Navigator,
{
	fn clone(&self) -> Self {
		Self { navigator: self.navigator.clone(), route: self.route.clone() }
	}
}
impl<N> Debug for LoginRedirect<N>
where
	N: ?Sized + Navigator,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginRedirect").field("route", &self.route).finish()
	}
}
