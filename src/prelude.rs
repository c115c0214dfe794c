//! Storefront Cart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::Cart,
    config::{CartConfig, ConfigError, MessagingConfig, PricingRules, PromoApiConfig},
    engine::{CartEngine, CartError, CheckoutPhase},
    handoff::{HandoffError, LoggingHandoff, OrderHandoff, order_link},
    items::{LineItem, NewItem},
    notifications::{Notification, NotificationLevel, Notifier, TracingNotifier},
    pricing::{Pricing, PricingError, price_cart},
    promotions::{
        HttpPromoService, PromoApplied, PromoDiscount, PromoError, PromoService,
        PromoServiceError, PromoState, PromoValidation,
    },
    store::{CartStore, FileStore, MemoryStore, StoreError},
    summary::{CustomerInfo, OrderSummary},
};
