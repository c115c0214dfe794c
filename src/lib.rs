//! Storefront Cart
//!
//! Cart, pricing and order handoff engine for a small storefront: line items persisted in a
//! key-value store, delivery and promo-aware pricing with an advance payment split, and a
//! plain-text order summary sent to the shop through a messaging deep link.

pub mod cart;
pub mod config;
pub mod engine;
pub mod handoff;
pub mod items;
pub mod notifications;
pub mod prelude;
pub mod pricing;
pub mod promotions;
pub mod store;
pub mod summary;
