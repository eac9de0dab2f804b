//! Code lookup and eligibility evaluation over a promotion catalog.

// self
use crate::{_prelude::*, promotion::Promotion};

/// Text shown to customers for every non-found outcome.
pub const INVALID_CODE_MESSAGE: &str = "Promo code invalid or expired.";

/// Outcome of looking up a promotion code.
///
/// [`find_active_promotion`] collapses everything except [`Eligibility::Found`] into `None`;
/// callers that need to tell the cases apart evaluate directly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Eligibility<'a> {
	/// Code matched an active, usable promotion.
	Found(&'a Promotion),
	/// No promotion carries the code.
	NotFound,
	/// Code matched, but the current instant is outside the activation window.
	Inactive(&'a Promotion),
	/// Code matched an active promotion whose usage limit is reached.
	Exhausted(&'a Promotion),
}
impl<'a> Eligibility<'a> {
	/// The promotion when it can be applied right now.
	pub fn active(self) -> Option<&'a Promotion> {
		match self {
			Self::Found(promotion) => Some(promotion),
			_ => None,
		}
	}

	/// The matched promotion regardless of eligibility.
	pub fn matched(self) -> Option<&'a Promotion> {
		match self {
			Self::Found(promotion) | Self::Inactive(promotion) | Self::Exhausted(promotion) =>
				Some(promotion),
			Self::NotFound => None,
		}
	}

	/// Returns `true` for [`Eligibility::Found`].
	pub fn is_found(&self) -> bool {
		matches!(self, Self::Found(_))
	}

	/// Uniform customer-facing text; `None` when the code can be applied.
	pub fn user_message(&self) -> Option<&'static str> {
		if self.is_found() { None } else { Some(INVALID_CODE_MESSAGE) }
	}
}

/// Evaluates `code` against `promotions` at `now`.
///
/// Only the first case-insensitive code match is considered; later duplicates never are.
pub fn evaluate_at<'a, I>(promotions: I, code: &str, now: OffsetDateTime) -> Eligibility<'a>
where
	I: IntoIterator<Item = &'a Promotion>,
{
	let Some(promotion) = promotions.into_iter().find(|promotion| promotion.matches_code(code))
	else {
		return Eligibility::NotFound;
	};

	if !promotion.is_active_at(now) {
		Eligibility::Inactive(promotion)
	} else if !promotion.is_usable() {
		Eligibility::Exhausted(promotion)
	} else {
		Eligibility::Found(promotion)
	}
}

/// Returns the promotion matching `code` iff it is active at `now` and usable.
pub fn find_active_promotion_at<'a, I>(
	promotions: I,
	code: &str,
	now: OffsetDateTime,
) -> Option<&'a Promotion>
where
	I: IntoIterator<Item = &'a Promotion>,
{
	evaluate_at(promotions, code, now).active()
}

/// Returns the promotion matching `code` iff it is active right now and usable.
pub fn find_active_promotion<'a, I>(promotions: I, code: &str) -> Option<&'a Promotion>
where
	I: IntoIterator<Item = &'a Promotion>,
{
	find_active_promotion_at(promotions, code, OffsetDateTime::now_utc())
}
