//! Promo Service
//!
//! Contract with the promo backend, plus the wire types it answers with.

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::warn;

use super::PromoDiscount;

/// Errors that can occur when talking to the promo backend.
#[derive(Debug, Error)]
pub enum PromoServiceError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-2xx response or an unexpected body.
    #[error("unexpected response from promo service: {0}")]
    UnexpectedResponse(String),
}

/// Promo backend.
#[automock]
#[async_trait]
pub trait PromoService: Send + Sync {
    /// Check a code. An unknown or already used code is a successful call with
    /// `valid: false`.
    async fn validate(&self, code: &str) -> Result<PromoValidation, PromoServiceError>;

    /// Record that a code was consumed by an order.
    async fn mark_used(&self, code: &str) -> Result<(), PromoServiceError>;
}

/// Validation response body.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PromoValidation {
    /// Whether the code can be used
    pub valid: bool,

    /// Message for the customer
    #[serde(default)]
    pub message: String,

    /// Prize attached to the code
    #[serde(default)]
    pub discount: Option<DiscountDescriptor>,

    /// Backend identifier of the game participation that won the code
    #[serde(default, deserialize_with = "participation_id")]
    pub participation_id: Option<String>,
}

/// Prize description as sent by the backend.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DiscountDescriptor {
    /// Prize type, `"discount"` or `"free_delivery"` for the prizes that affect pricing
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    /// Prize display name
    #[serde(default)]
    pub name: Option<String>,

    /// Percent points for `"discount"` prizes
    #[serde(default, with = "rust_decimal::serde::float")]
    pub percent: Decimal,

    /// Whether the prize waives delivery
    #[serde(default)]
    pub free_delivery: bool,
}

impl DiscountDescriptor {
    /// Descriptor for a free-delivery prize.
    pub fn free_delivery() -> Self {
        Self {
            kind: Some("free_delivery".to_string()),
            free_delivery: true,
            ..Self::default()
        }
    }

    /// Descriptor for a percent-off prize.
    pub fn percent(percent: Decimal) -> Self {
        Self {
            kind: Some("discount".to_string()),
            percent,
            ..Self::default()
        }
    }

    /// Pricing effect of the prize. Free delivery wins over a percentage.
    pub fn to_discount(&self) -> Option<PromoDiscount> {
        if self.free_delivery {
            return Some(PromoDiscount::FreeDelivery);
        }

        if self.kind.as_deref() == Some("discount") && self.percent > Decimal::ZERO {
            return Some(PromoDiscount::percent_off(self.percent));
        }

        warn!(kind = ?self.kind, name = ?self.name, "prize has no pricing effect");

        None
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawParticipationId {
    Number(u64),
    Text(String),
}

fn participation_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawParticipationId>::deserialize(deserializer)?;

    Ok(raw.map(|id| match id {
        RawParticipationId::Number(number) => number.to_string(),
        RawParticipationId::Text(text) => text,
    }))
}
