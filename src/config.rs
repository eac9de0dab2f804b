//! Gateway configuration: backend base URL, refresh endpoint, login route, and credential slot.

// self
use crate::{_prelude::*, session::DEFAULT_CREDENTIAL_SLOT};

/// Errors raised while constructing or validating a [`GatewayConfig`].
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum GatewayConfigError {
	/// Base URL must be an HTTP(S) origin.
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// URL that failed validation.
		url: String,
	},
	/// Base URL must name a host.
	#[error("Base URL must include a host: {url}.")]
	MissingHost {
		/// URL that failed validation.
		url: String,
	},
	/// Base URL cannot carry a query string or fragment.
	#[error("Base URL must not carry a query or fragment: {url}.")]
	UnexpectedQueryOrFragment {
		/// URL that failed validation.
		url: String,
	},
	/// Route-like values must be absolute paths.
	#[error("The {field} must start with `/`: {value}.")]
	RelativePath {
		/// Which field failed validation.
		field: &'static str,
		/// Value that failed validation.
		value: String,
	},
	/// Credential slot name is empty or contains whitespace.
	#[error("Credential slot name must be non-empty and contain no whitespace: {slot:?}.")]
	InvalidSlot {
		/// Slot name that failed validation.
		slot: String,
	},
	/// Serialized configuration could not be parsed.
	#[error("Configuration could not be parsed: {message}.")]
	Parse {
		/// Parser diagnostic including the failing path.
		message: String,
	},
}

/// Immutable, validated gateway configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
	/// Backend origin (and optional path prefix) that relative targets resolve against.
	pub base_url: Url,
	/// Path of the refresh endpoint, appended to the base URL.
	#[serde(default = "default_refresh_path")]
	pub refresh_path: String,
	/// Client route callers navigate to when the session expires.
	#[serde(default = "default_login_route")]
	pub login_route: String,
	/// Storage slot that holds the bearer credential.
	#[serde(default = "default_credential_slot")]
	pub credential_slot: String,
}
impl GatewayConfig {
	/// Default refresh endpoint path.
	pub const DEFAULT_REFRESH_PATH: &'static str = "/auth/refresh";
	/// Default login route.
	pub const DEFAULT_LOGIN_ROUTE: &'static str = "/login";

	/// Creates a builder seeded with the provided base URL.
	pub fn builder(base_url: Url) -> GatewayConfigBuilder {
		GatewayConfigBuilder::new(base_url)
	}

	/// Parses and validates a JSON-encoded configuration.
	pub fn from_json_slice(bytes: &[u8]) -> Result<Self, GatewayConfigError> {
		let de = &mut serde_json::Deserializer::from_slice(bytes);
		let config: Self = serde_path_to_error::deserialize(de)
			.map_err(|e| GatewayConfigError::Parse { message: e.to_string() })?;

		config.validate()?;

		Ok(config)
	}

	/// Absolute URL of the refresh endpoint.
	pub fn refresh_url(&self) -> Result<Url, url::ParseError> {
		Url::parse(&self.join_base(&self.refresh_path))
	}

	/// Resolves a request target: absolute URLs pass through, anything else is appended to the
	/// base URL.
	pub fn resolve(&self, target: &str) -> Result<Url, url::ParseError> {
		match Url::parse(target) {
			Ok(url) => Ok(url),
			Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&self.join_base(target)),
			Err(e) => Err(e),
		}
	}

	fn join_base(&self, path: &str) -> String {
		let base = self.base_url.as_str().trim_end_matches('/');
		let path = path.trim_start_matches('/');

		format!("{base}/{path}")
	}

	fn validate(&self) -> Result<(), GatewayConfigError> {
		let url = &self.base_url;

		if !matches!(url.scheme(), "http" | "https") {
			return Err(GatewayConfigError::UnsupportedScheme { url: url.to_string() });
		}
		if url.host_str().is_none_or(str::is_empty) {
			return Err(GatewayConfigError::MissingHost { url: url.to_string() });
		}
		if url.query().is_some() || url.fragment().is_some() {
			return Err(GatewayConfigError::UnexpectedQueryOrFragment { url: url.to_string() });
		}

		validate_path("refresh path", &self.refresh_path)?;
		validate_path("login route", &self.login_route)?;

		if self.credential_slot.is_empty() || self.credential_slot.chars().any(char::is_whitespace)
		{
			return Err(GatewayConfigError::InvalidSlot { slot: self.credential_slot.clone() });
		}

		Ok(())
	}
}

/// Builder for [`GatewayConfig`] values.
#[derive(Debug)]
pub struct GatewayConfigBuilder {
	base_url: Url,
	refresh_path: String,
	login_route: String,
	credential_slot: String,
}
impl GatewayConfigBuilder {
	/// Creates a builder with default paths and slot name.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			refresh_path: default_refresh_path(),
			login_route: default_login_route(),
			credential_slot: default_credential_slot(),
		}
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the login route used on session expiry.
	pub fn login_route(mut self, route: impl Into<String>) -> Self {
		self.login_route = route.into();

		self
	}

	/// Overrides the credential slot name.
	pub fn credential_slot(mut self, slot: impl Into<String>) -> Self {
		self.credential_slot = slot.into();

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<GatewayConfig, GatewayConfigError> {
		let config = GatewayConfig {
			base_url: self.base_url,
			refresh_path: self.refresh_path,
			login_route: self.login_route,
			credential_slot: self.credential_slot,
		};

		config.validate()?;

		Ok(config)
	}
}

fn default_refresh_path() -> String {
	GatewayConfig::DEFAULT_REFRESH_PATH.into()
}

fn default_login_route() -> String {
	GatewayConfig::DEFAULT_LOGIN_ROUTE.into()
}

fn default_credential_slot() -> String {
	DEFAULT_CREDENTIAL_SLOT.into()
}

fn validate_path(field: &'static str, value: &str) -> Result<(), GatewayConfigError> {
	if value.starts_with('/') {
		Ok(())
	} else {
		Err(GatewayConfigError::RelativePath { field, value: value.to_owned() })
	}
}
