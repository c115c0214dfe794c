//! Promotions
//!
//! Promo codes are won in the storefront's game popup and checked by the backend.
//! The engine only keeps the outcome of the last validation for the session.

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

pub mod http;
pub mod service;

pub use http::HttpPromoService;
pub use service::{
    DiscountDescriptor, MockPromoService, PromoService, PromoServiceError, PromoValidation,
};

/// User-facing message when the promo backend cannot be reached.
pub const VALIDATION_FALLBACK_MESSAGE: &str = "Erreur de validation du code";

/// Discount granted by a validated promo code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoDiscount {
    /// Waive the delivery fee.
    FreeDelivery,

    /// Take a percentage off the product subtotal; delivery is unaffected.
    PercentOff {
        /// Percent points, 0-100
        percent: Decimal,
    },
}

impl PromoDiscount {
    /// Percent-off discount, clamping `percent` into 0-100.
    pub fn percent_off(percent: Decimal) -> Self {
        Self::PercentOff {
            percent: percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED),
        }
    }
}

impl fmt::Display for PromoDiscount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromoDiscount::FreeDelivery => write!(f, "Livraison offerte"),
            PromoDiscount::PercentOff { percent } => write!(f, "-{}%", percent.normalize()),
        }
    }
}

/// Promo code state for the current session.
///
/// Never persisted; a new engine starts without a promo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromoState {
    code: Option<String>,
    discount: Option<PromoDiscount>,
    participation_id: Option<String>,
}

impl PromoState {
    /// Record a successful validation. The code is stored uppercased.
    pub fn apply(
        &mut self,
        code: &str,
        discount: Option<PromoDiscount>,
        participation_id: Option<String>,
    ) {
        self.code = Some(code.trim().to_uppercase());
        self.discount = discount;
        self.participation_id = participation_id;
    }

    /// Forget the promo.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Normalized code, if one was validated.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Active discount, if any.
    pub fn discount(&self) -> Option<&PromoDiscount> {
        self.discount.as_ref()
    }

    /// Backend participation identifier of the validated code.
    pub fn participation_id(&self) -> Option<&str> {
        self.participation_id.as_deref()
    }

    /// Check whether a code is currently applied.
    pub fn is_active(&self) -> bool {
        self.code.is_some()
    }
}

/// Result of a successful promo validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoApplied {
    /// Normalized code
    pub code: String,

    /// Message from the backend, e.g. "Code valide ! Livraison gratuite"
    pub message: String,

    /// Discount granted, `None` when the prize has no effect on pricing
    pub discount: Option<PromoDiscount>,
}

/// Reasons a promo code was not applied.
#[derive(Debug, Error)]
pub enum PromoError {
    /// The backend rejected the code.
    #[error("promo code rejected: {message}")]
    Rejected {
        /// Backend message, shown as-is
        message: String,
    },

    /// The backend could not be reached or answered with something unusable.
    #[error("promo service unavailable")]
    ServiceUnavailable(#[source] PromoServiceError),
}

impl PromoError {
    /// Message to show the customer. Transport failures share one generic message.
    pub fn message(&self) -> &str {
        match self {
            PromoError::Rejected { message } => message,
            PromoError::ServiceUnavailable(_) => VALIDATION_FALLBACK_MESSAGE,
        }
    }
}
