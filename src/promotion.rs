//! Promotion catalog decoding and code eligibility rules.

pub mod eligibility;
pub mod record;

pub use eligibility::*;
pub use record::*;

// self
use crate::_prelude::*;

/// Promotions payload returned by the backend: `{ "promotions": [...] }`.
///
/// Records are decoded one by one; a record that cannot be read is listed in
/// [`PromotionCatalog::skipped`] instead of failing the whole payload.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "WireCatalog")]
pub struct PromotionCatalog {
	/// Readable records in backend order; order decides which duplicate code wins.
	pub promotions: Vec<Promotion>,
	/// Records left out because they could not be decoded.
	pub skipped: Vec<SkippedRecord>,
}
impl PromotionCatalog {
	/// Decodes a payload, reporting the JSON path when its outer shape is wrong.
	pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
		let de = &mut serde_json::Deserializer::from_slice(bytes);

		serde_path_to_error::deserialize(de).map_err(|source| Error::Decode { source, status: None })
	}

	/// Evaluates `code` at `now`.
	pub fn evaluate_at(&self, code: &str, now: OffsetDateTime) -> Eligibility<'_> {
		eligibility::evaluate_at(&self.promotions, code, now)
	}

	/// Returns the promotion matching `code` iff it is active right now and usable.
	pub fn find_active(&self, code: &str) -> Option<&Promotion> {
		find_active_promotion(&self.promotions, code)
	}

	/// Number of records in the catalog.
	pub fn len(&self) -> usize {
		self.promotions.len()
	}

	/// Returns `true` when the catalog holds no records.
	pub fn is_empty(&self) -> bool {
		self.promotions.is_empty()
	}
}
impl From<Vec<Promotion>> for PromotionCatalog {
	fn from(promotions: Vec<Promotion>) -> Self {
		Self { promotions, skipped: Vec::new() }
	}
}

/// A catalog record that could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedRecord {
	/// Position of the record in the backend payload.
	pub index: usize,
	/// Decoder diagnostic.
	pub reason: String,
}

#[derive(Deserialize)]
struct WireCatalog {
	#[serde(default)]
	promotions: Vec<serde_json::Value>,
}
impl From<WireCatalog> for PromotionCatalog {
	fn from(wire: WireCatalog) -> Self {
		let mut catalog = Self::default();

		for (index, record) in wire.promotions.into_iter().enumerate() {
			match serde_json::from_value::<Promotion>(record) {
				Ok(promotion) => catalog.promotions.push(promotion),
				Err(e) => catalog.skipped.push(SkippedRecord { index, reason: e.to_string() }),
			}
		}

		catalog
	}
}
