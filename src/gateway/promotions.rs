//! Typed promotions fetch built on the authenticated request path.

// self
use crate::{
	_prelude::*,
	gateway::Gateway,
	http::{HttpTransport, RequestOptions},
	promotion::PromotionCatalog,
};

impl<T> Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Fetches and decodes the promotions payload served at `target`.
	///
	/// Goes through [`Gateway::request`], so an expired credential is refreshed first. Non-2xx
	/// answers surface as [`Error::UnexpectedStatus`].
	pub async fn fetch_promotions(&self, target: &str) -> Result<PromotionCatalog> {
		let response = self.request(target, RequestOptions::get()).await?;

		if !response.is_success() {
			return Err(Error::UnexpectedStatus { status: response.status.as_u16() });
		}

		response.json()
	}
}
