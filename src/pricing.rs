//! Pricing
//!
//! Order figures derived from a cart, the active promo discount and the
//! configured pricing rules. Amounts are computed in minor units; every
//! percentage is rounded up.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    cart::Cart,
    config::{PricingRules, to_minor_units},
    items::LineItem,
    promotions::PromoDiscount,
};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A unit price cannot be represented in minor units (item id).
    #[error("price of item {0} cannot be represented in minor units")]
    PriceConversion(String),

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed")]
    PercentConversion,

    /// A line total or sum overflowed.
    #[error("amount overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Figures shown at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct Pricing<'a> {
    /// Line totals (unit price x quantity), in cart order.
    pub line_totals: Vec<Money<'a, Currency>>,

    /// Sum of the line totals.
    pub subtotal: Money<'a, Currency>,

    /// Delivery fee after any free-delivery promo.
    pub delivery_fee: Money<'a, Currency>,

    /// Amount taken off the subtotal by a percent-off promo.
    pub discount: Money<'a, Currency>,

    /// `max(0, subtotal + delivery_fee - discount)`
    pub total: Money<'a, Currency>,

    /// Share of the total paid up front.
    pub advance: Money<'a, Currency>,

    /// Balance due on delivery.
    pub remainder: Money<'a, Currency>,
}

/// Price a cart.
///
/// # Errors
///
/// Returns a [`PricingError`] if a price cannot be represented in minor units or an
/// amount overflows.
pub fn price_cart(
    cart: &Cart,
    discount: Option<&PromoDiscount>,
    rules: &PricingRules,
) -> Result<Pricing<'static>, PricingError> {
    let currency = rules.currency;

    let line_totals = cart
        .iter()
        .map(|line| line_total(line, rules))
        .collect::<Result<Vec<_>, _>>()?;

    let subtotal = total_price(&line_totals, currency)?;
    let subtotal_minor = subtotal.to_minor_units();

    let delivery_minor = match discount {
        Some(PromoDiscount::FreeDelivery) => 0,
        _ => rules.delivery_fee_minor,
    };

    let discount_minor = match discount {
        Some(PromoDiscount::PercentOff { percent }) => percent_of_minor_ceil(*percent, subtotal_minor)?,
        _ => 0,
    };

    let total_minor = subtotal_minor
        .checked_add(delivery_minor)
        .and_then(|sum| sum.checked_sub(discount_minor))
        .ok_or(PricingError::Overflow)?
        .max(0);

    let advance_minor = percent_of_minor_ceil(rules.advance_percentage, total_minor)?;

    Ok(Pricing {
        line_totals,
        subtotal,
        delivery_fee: Money::from_minor(delivery_minor, currency),
        discount: Money::from_minor(discount_minor, currency),
        total: Money::from_minor(total_minor, currency),
        advance: Money::from_minor(advance_minor, currency),
        remainder: Money::from_minor(total_minor - advance_minor, currency),
    })
}

/// Unit price x quantity for a single line, rounded once to minor units.
///
/// # Errors
///
/// Returns a [`PricingError`] if the product overflows or cannot be represented.
pub fn line_total(
    line: &LineItem,
    rules: &PricingRules,
) -> Result<Money<'static, Currency>, PricingError> {
    let exact = line
        .unit_price()
        .checked_mul(Decimal::from(line.quantity().get()))
        .ok_or(PricingError::Overflow)?;

    let total_minor = to_minor_units(exact, rules.exponent)
        .ok_or_else(|| PricingError::PriceConversion(line.id().to_string()))?;

    Ok(Money::from_minor(total_minor, rules.currency))
}

/// Sum a list of amounts, zero in `currency` when the list is empty.
///
/// # Errors
///
/// Returns [`PricingError::Money`] on a currency mismatch.
pub fn total_price<'a>(
    amounts: &[Money<'a, Currency>],
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, PricingError> {
    let total = amounts
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, amount| acc.add(*amount))?;

    Ok(total)
}

/// Calculate `ceil(minor x percent / 100)` where `percent` is in percent points.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the result cannot be represented.
pub fn percent_of_minor_ceil(percent: Decimal, minor: i64) -> Result<i64, PricingError> {
    let Some(fraction) = percent.checked_div(Decimal::ONE_HUNDRED) else {
        return Err(PricingError::PercentConversion);
    };

    let applied = Percentage::from(fraction) * Decimal::from(minor);

    applied.ceil().to_i64().ok_or(PricingError::PercentConversion)
}
