//! Transport primitives for authenticated backend calls.
//!
//! The module exposes [`HttpTransport`] alongside the request/response values the gateway
//! passes through it. Downstream crates can plug in a custom HTTP stack (or a scripted fake
//! in tests) by implementing the trait; the default [`ReqwestTransport`] keeps a cookie jar so
//! refresh calls carry the backend's session cookies.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use ::http::{
	HeaderMap, HeaderValue, Method, StatusCode,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::Credential,
	error::{ConfigError, TransportError},
};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<GatewayResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing one [`RequestAttempt`].
///
/// Implementations must send cookies they hold for the target origin (the refresh endpoint
/// relies on them) and must report only network-level failures as errors: every HTTP status,
/// including 4xx and 5xx, comes back as a [`GatewayResponse`].
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Issues the attempt and buffers the full response body.
	fn execute(&self, attempt: RequestAttempt) -> TransportFuture<'_>;
}

/// Caller-supplied request options.
#[derive(Clone, Debug)]
pub struct RequestOptions {
	/// HTTP method.
	pub method: Method,
	/// Extra headers; `Authorization` and `Content-Type` are always overwritten.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
}
impl RequestOptions {
	/// Options for the provided method with no headers or body.
	pub fn new(method: Method) -> Self {
		Self { method, headers: HeaderMap::new(), body: None }
	}

	/// Shorthand for a `GET` request.
	pub fn get() -> Self {
		Self::new(Method::GET)
	}

	/// Shorthand for a `POST` request.
	pub fn post() -> Self {
		Self::new(Method::POST)
	}

	/// Adds or replaces a header.
	pub fn header(mut self, name: ::http::header::HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Sets a raw body.
	pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Serializes `value` as the JSON body.
	pub fn json<T>(self, value: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		let body = serde_json::to_vec(value).map_err(ConfigError::BodySerialize)?;

		Ok(self.body(body))
	}
}
impl Default for RequestOptions {
	fn default() -> Self {
		Self::get()
	}
}

/// One outbound call, fully prepared with gateway headers.
#[derive(Clone, Debug)]
pub struct RequestAttempt {
	/// Resolved absolute target.
	pub url: Url,
	/// HTTP method.
	pub method: Method,
	/// Final header set sent on the wire.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
	/// `true` when this attempt replays a request after a credential refresh.
	pub retry: bool,
}
impl RequestAttempt {
	/// Builds the first attempt for `options`, attaching `credential` (or an empty bearer).
	pub fn first(
		url: Url,
		options: RequestOptions,
		credential: Option<&Credential>,
	) -> Result<Self, ConfigError> {
		let RequestOptions { method, mut headers, body } = options;

		apply_gateway_headers(&mut headers, credential)?;

		Ok(Self { url, method, headers, body, retry: false })
	}

	/// Rebuilds this attempt with a refreshed credential and marks it as the single retry.
	pub fn into_retry(mut self, credential: &Credential) -> Result<Self, ConfigError> {
		apply_gateway_headers(&mut self.headers, Some(credential))?;
		self.retry = true;

		Ok(self)
	}

	/// Bare `POST` used by the refresh sub-protocol; carries no credential and no body.
	pub fn refresh(url: Url) -> Self {
		Self { url, method: Method::POST, headers: HeaderMap::new(), body: None, retry: false }
	}
}

/// Buffered backend response.
#[derive(Clone, Debug)]
pub struct GatewayResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl GatewayResponse {
	/// Creates a response with empty headers.
	pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: HeaderMap::new(), body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Returns `true` when the backend rejected the credential (401 or 422).
	pub fn rejects_credential(&self) -> bool {
		matches!(self.status, StatusCode::UNAUTHORIZED | StatusCode::UNPROCESSABLE_ENTITY)
	}

	/// Lossy UTF-8 view of the body.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decodes the body as JSON, reporting the failing path on mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: for<'de> Deserialize<'de>,
	{
		let de = &mut serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(de)
			.map_err(|source| Error::Decode { source, status: Some(self.status.as_u16()) })
	}
}

fn apply_gateway_headers(
	headers: &mut HeaderMap,
	credential: Option<&Credential>,
) -> Result<(), ConfigError> {
	let mut bearer = HeaderValue::from_str(&Credential::bearer(credential))?;

	bearer.set_sensitive(true);
	headers.insert(AUTHORIZATION, bearer);
	headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

	Ok(())
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// [`ReqwestTransport::new`] enables reqwest's cookie store; clients passed to
/// [`ReqwestTransport::with_client`] should do the same or refresh calls will arrive without
/// the backend's session cookie.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport with a cookie-enabled reqwest client.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().cookie_store(true).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, attempt: RequestAttempt) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let RequestAttempt { url, method, headers, body, .. } = attempt;
			let mut builder = client.request(method, url).headers(headers);

			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?.to_vec();

			Ok(GatewayResponse { status, headers, body })
		})
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
