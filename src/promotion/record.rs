//! Promotion records as decoded from the backend, plus activity and usage predicates.

// crates.io
use serde::de::{Deserializer, Error as DeError};
use time::{
	Date, PrimitiveDateTime,
	format_description::well_known::{Rfc2822, Rfc3339},
	macros::format_description,
};
// self
use crate::_prelude::*;

/// Backend identifier of a promotion; integer ids are normalized to their decimal string.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PromotionId(String);
impl PromotionId {
	/// Wraps an identifier string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}
}
impl AsRef<str> for PromotionId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Display for PromotionId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// How a discount value is applied.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DiscountKind {
	/// Value is a percentage of the subtotal.
	Percentage,
	/// Value is a currency amount taken off the subtotal.
	FixedAmount,
	/// Backend label this crate does not interpret; empty when the backend sent none.
	Other(String),
}
impl DiscountKind {
	fn from_label(label: &str) -> Self {
		match label.trim().to_lowercase().as_str() {
			"percentage" | "percent" | "%" => Self::Percentage,
			"fixed" | "fixed_amount" | "amount" | "flat" => Self::FixedAmount,
			other => Self::Other(other.to_owned()),
		}
	}
}

/// Discount descriptor attached to a promotion.
#[derive(Clone, Debug, PartialEq)]
pub struct Discount {
	/// Interpretation of [`Discount::value`].
	pub kind: DiscountKind,
	/// Percentage points or currency amount, depending on the kind.
	pub value: f64,
}
impl Discount {
	/// Savings on `subtotal`, clamped to `[0, subtotal]`. Uninterpreted kinds save nothing.
	pub fn amount_off(&self, subtotal: f64) -> f64 {
		if subtotal <= 0.0 {
			return 0.0;
		}

		let raw = match self.kind {
			DiscountKind::Percentage => subtotal * self.value / 100.0,
			DiscountKind::FixedAmount => self.value,
			DiscountKind::Other(_) => 0.0,
		};

		raw.clamp(0.0, subtotal)
	}
}

/// A coded discount campaign with an optional activation window and usage ceiling.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "WirePromotion")]
pub struct Promotion {
	/// Backend identifier.
	pub id: PromotionId,
	/// Code customers type; matched case-insensitively. Empty for drafts, which never match.
	pub code: String,
	/// Human-readable title.
	pub title: Option<String>,
	/// Discount descriptor, when the backend supplied one.
	pub discount: Option<Discount>,
	/// Inclusive start of the activation window; open-ended when absent.
	pub starts_at: Option<OffsetDateTime>,
	/// Inclusive end of the activation window; open-ended when absent.
	pub ends_at: Option<OffsetDateTime>,
	/// Maximum number of redemptions, when limited.
	pub usage_limit: Option<u64>,
	/// Redemptions recorded by the backend so far.
	pub usage_count: u64,
}
impl Promotion {
	/// Creates an always-active, unlimited promotion; adjust fields for narrower campaigns.
	pub fn new(id: impl Into<String>, code: impl Into<String>) -> Self {
		Self {
			id: PromotionId::new(id),
			code: code.into(),
			title: None,
			discount: None,
			starts_at: None,
			ends_at: None,
			usage_limit: None,
			usage_count: 0,
		}
	}

	/// Returns `true` when `instant` falls inside the inclusive start/end window.
	pub fn is_active_at(&self, instant: OffsetDateTime) -> bool {
		self.starts_at.is_none_or(|start| instant >= start)
			&& self.ends_at.is_none_or(|end| instant <= end)
	}

	/// Returns `true` while the usage ceiling (if any) has not been reached.
	pub fn is_usable(&self) -> bool {
		self.usage_limit.is_none_or(|limit| self.usage_count < limit)
	}

	/// Redemptions left before the ceiling; `None` when unlimited.
	pub fn remaining_uses(&self) -> Option<u64> {
		self.usage_limit.map(|limit| limit.saturating_sub(self.usage_count))
	}

	/// Case-insensitive comparison against a customer-entered code.
	pub fn matches_code(&self, code: &str) -> bool {
		!self.code.is_empty() && self.code.to_lowercase() == code.to_lowercase()
	}
}

/// Parses the date encodings the backend and browser forms emit.
///
/// Accepts RFC 3339 and RFC 2822 timestamps, offset-less `YYYY-MM-DD[T ]HH:MM[:SS[.fff]]`
/// (read as UTC), and bare `YYYY-MM-DD` dates (UTC midnight).
pub fn parse_instant(raw: &str) -> Option<OffsetDateTime> {
	let raw = raw.trim();

	if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc3339) {
		return Some(instant);
	}
	if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc2822) {
		return Some(instant);
	}

	let naive = [
		format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"),
		format_description!("[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"),
		format_description!("[year]-[month]-[day]T[hour]:[minute]"),
		format_description!("[year]-[month]-[day] [hour]:[minute]"),
	];

	if let Some(naive) =
		naive.iter().find_map(|format| PrimitiveDateTime::parse(raw, *format).ok())
	{
		return Some(naive.assume_utc());
	}
	if let Ok(date) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
		return Some(date.midnight().assume_utc());
	}

	None
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
	Integer(i64),
	Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireNumber {
	Number(f64),
	Text(String),
}

#[derive(Deserialize)]
struct WirePromotion {
	#[serde(default)]
	id: Option<WireId>,
	#[serde(default)]
	promo_code: Option<String>,
	#[serde(default)]
	code: Option<String>,
	#[serde(default)]
	title: Option<String>,
	#[serde(default)]
	name: Option<String>,
	#[serde(default)]
	discount_type: Option<String>,
	#[serde(default, deserialize_with = "deserialize_number")]
	discount_value: Option<f64>,
	#[serde(default, deserialize_with = "deserialize_instant")]
	start_date: Option<OffsetDateTime>,
	#[serde(default, deserialize_with = "deserialize_instant")]
	end_date: Option<OffsetDateTime>,
	#[serde(default)]
	usage_limit: Option<u64>,
	#[serde(default)]
	usage_count: Option<u64>,
}
impl From<WirePromotion> for Promotion {
	fn from(wire: WirePromotion) -> Self {
		let id = match wire.id {
			Some(WireId::Integer(value)) => PromotionId::new(value.to_string()),
			Some(WireId::Text(value)) => PromotionId::new(value),
			None => PromotionId::default(),
		};
		let code = wire
			.promo_code
			.filter(|code| !code.is_empty())
			.or(wire.code.filter(|code| !code.is_empty()))
			.unwrap_or_default();
		let discount = match (wire.discount_type, wire.discount_value) {
			(Some(label), value) =>
				Some(Discount { kind: DiscountKind::from_label(&label), value: value.unwrap_or(0.0) }),
			(None, Some(value)) => Some(Discount { kind: DiscountKind::Other(String::new()), value }),
			(None, None) => None,
		};

		Self {
			id,
			code,
			title: wire.title.or(wire.name),
			discount,
			starts_at: wire.start_date,
			ends_at: wire.end_date,
			usage_limit: wire.usage_limit,
			usage_count: wire.usage_count.unwrap_or(0),
		}
	}
}

fn deserialize_instant<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<String>::deserialize(deserializer)?;

	match raw.as_deref().map(str::trim) {
		None | Some("") => Ok(None),
		Some(value) => parse_instant(value)
			.map(Some)
			.ok_or_else(|| D::Error::custom(format!("unrecognized date `{value}`"))),
	}
}

fn deserialize_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<WireNumber>::deserialize(deserializer)? {
		None => Ok(None),
		Some(WireNumber::Number(value)) => Ok(Some(value)),
		Some(WireNumber::Text(text)) => text
			.trim()
			.parse()
			.map(Some)
			.map_err(|_| D::Error::custom(format!("invalid number `{text}`"))),
	}
}
