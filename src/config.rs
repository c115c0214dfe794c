//! Config
//!
//! Storefront settings for the cart engine, loadable from YAML.

use std::{fs, path::Path};

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::iso::{Currency, EUR, GBP, USD, XOF};
use serde::Deserialize;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Advance percentage outside of 0-100
    #[error("Advance percentage must be between 0 and 100, got {0}")]
    InvalidAdvancePercentage(Decimal),

    /// Delivery fee negative or not representable in minor units
    #[error("Invalid delivery fee: {0}")]
    InvalidDeliveryFee(Decimal),
}

/// Cart engine configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Shop name printed in order summary headers.
    pub shop_name: String,

    /// ISO currency code all prices are expressed in.
    pub currency: String,

    /// Label printed after amounts (e.g. "FCFA").
    pub currency_label: String,

    /// Flat delivery fee in major units.
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_fee: Decimal,

    /// Share of the total collected up front, in percent points.
    #[serde(with = "rust_decimal::serde::float")]
    pub advance_percentage: Decimal,

    /// Key the cart snapshot is persisted under.
    pub storage_key: String,

    /// Messaging handoff settings.
    pub messaging: MessagingConfig,

    /// Promo API settings.
    pub promo_api: PromoApiConfig,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            shop_name: "Aqua-Racine".to_string(),
            currency: "XOF".to_string(),
            currency_label: "FCFA".to_string(),
            delivery_fee: Decimal::from(1500),
            advance_percentage: Decimal::from(50),
            storage_key: "aquaracine_cart".to_string(),
            messaging: MessagingConfig::default(),
            promo_api: PromoApiConfig::default(),
        }
    }
}

/// Where order summaries are handed off to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Deep link base, e.g. `"https://wa.me"`.
    pub base_url: String,

    /// Recipient phone number; only its digits are used.
    pub recipient: String,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://wa.me".to_string(),
            recipient: String::new(),
        }
    }
}

/// Promo validation backend settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PromoApiConfig {
    /// Backend origin, e.g. `"http://localhost:8000"`.
    pub base_url: String,

    /// Path of the validation endpoint.
    pub validate_path: String,

    /// Path of the mark-used endpoint.
    pub mark_used_path: String,
}

impl Default for PromoApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            validate_path: "/api/promo/validate/".to_string(),
            mark_used_path: "/api/promo/mark-used/".to_string(),
        }
    }
}

impl PromoApiConfig {
    /// Full URL of the validation endpoint.
    pub fn validate_url(&self) -> String {
        join_url(&self.base_url, &self.validate_path)
    }

    /// Full URL of the mark-used endpoint.
    pub fn mark_used_url(&self) -> String {
        join_url(&self.base_url, &self.mark_used_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

impl CartConfig {
    /// Parse a config from a YAML string. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the YAML cannot be parsed.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_norway::from_str(yaml)?)
    }

    /// Load a config from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Resolve the pricing rules described by this config.
    ///
    /// # Errors
    ///
    /// Returns an error if the currency is unknown, the advance percentage is outside
    /// 0-100, or the delivery fee is negative.
    pub fn pricing_rules(&self) -> Result<PricingRules, ConfigError> {
        let (currency, exponent) = parse_currency(&self.currency)?;

        if self.advance_percentage < Decimal::ZERO
            || self.advance_percentage > Decimal::ONE_HUNDRED
        {
            return Err(ConfigError::InvalidAdvancePercentage(
                self.advance_percentage,
            ));
        }

        let delivery_fee_minor = to_minor_units(self.delivery_fee, exponent)
            .filter(|minor| *minor >= 0)
            .ok_or(ConfigError::InvalidDeliveryFee(self.delivery_fee))?;

        Ok(PricingRules {
            currency,
            exponent,
            delivery_fee_minor,
            advance_percentage: self.advance_percentage,
        })
    }
}

/// Pricing parameters resolved from a [`CartConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingRules {
    /// Currency of every amount.
    pub currency: &'static Currency,

    /// Number of minor-unit digits of the currency.
    pub exponent: u32,

    /// Flat delivery fee in minor units.
    pub delivery_fee_minor: i64,

    /// Advance share in percent points (0-100).
    pub advance_percentage: Decimal,
}

/// Map an ISO code to its currency and minor-unit exponent.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownCurrency`] for codes the storefront does not sell in.
pub fn parse_currency(code: &str) -> Result<(&'static Currency, u32), ConfigError> {
    let currency = match code.trim().to_ascii_uppercase().as_str() {
        "XOF" => XOF,
        "EUR" => EUR,
        "USD" => USD,
        "GBP" => GBP,
        other => return Err(ConfigError::UnknownCurrency(other.to_string())),
    };

    Ok((currency, currency.exponent))
}

/// Convert a major-unit amount to minor units, rounding half away from zero.
pub fn to_minor_units(amount: Decimal, exponent: u32) -> Option<i64> {
    let scale = Decimal::from(10_i64.checked_pow(exponent)?);

    amount
        .checked_mul(scale)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}
