//! Cart Engine
//!
//! Ties the cart snapshot in the store, the session's promo state and the pricing
//! rules together behind the operations the storefront calls.
//!
//! The store is the source of truth for the cart: every operation reloads the
//! snapshot and writes the result straight back. Two engines sharing a store are
//! last-writer-wins.

use std::{fmt, sync::Arc};

use jiff::Zoned;
use reqwest::Url;
use thiserror::Error;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    cart::Cart,
    config::{CartConfig, ConfigError, PricingRules},
    handoff::{HandoffError, LoggingHandoff, OrderHandoff, order_link},
    items::NewItem,
    notifications::{Notification, Notifier, TracingNotifier},
    pricing::{Pricing, PricingError, price_cart},
    promotions::{PromoApplied, PromoError, PromoService, PromoState},
    store::{CartStore, StoreError},
    summary::{CustomerInfo, OrderSummary},
};

/// Notification shown after a product is added.
pub const ADDED_TO_CART_MESSAGE: &str = "Produit ajouté au panier !";

/// Errors returned by [`CartEngine`] operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The cart could not be serialized.
    #[error("failed to serialize cart: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The cart could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The order could not be handed off.
    #[error(transparent)]
    Handoff(#[from] HandoffError),

    /// An order was requested for an empty cart.
    #[error("cannot send an order for an empty cart")]
    EmptyCart,

    /// The order was completed before it was sent.
    #[error("order has not been sent")]
    OrderNotSent,
}

/// Where the customer is in the checkout flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckoutPhase {
    /// Shopping, no promo applied.
    #[default]
    Idle,

    /// A promo code has been validated.
    PromoApplied,

    /// The order summary was handed off; waiting for the shop to confirm.
    OrderSent,
}

/// Cart engine.
pub struct CartEngine<S: CartStore> {
    config: CartConfig,
    rules: PricingRules,
    store: S,
    promo_service: Arc<dyn PromoService>,
    notifier: Box<dyn Notifier>,
    handoff: Box<dyn OrderHandoff>,
    promo: PromoState,
    phase: CheckoutPhase,
}

impl<S: CartStore> fmt::Debug for CartEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartEngine")
            .field("storage_key", &self.config.storage_key)
            .field("rules", &self.rules)
            .field("promo", &self.promo)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl<S: CartStore> CartEngine<S> {
    /// Create an engine that notifies through logs and leaves opening order links
    /// to the caller.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the pricing rules in `config` are invalid.
    pub fn new(
        config: CartConfig,
        store: S,
        promo_service: Arc<dyn PromoService>,
    ) -> Result<Self, ConfigError> {
        let rules = config.pricing_rules()?;

        Ok(Self {
            config,
            rules,
            store,
            promo_service,
            notifier: Box::new(TracingNotifier),
            handoff: Box::new(LoggingHandoff),
            promo: PromoState::default(),
            phase: CheckoutPhase::Idle,
        })
    }

    /// Replace the notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    /// Replace the order handoff.
    #[must_use]
    pub fn with_handoff(mut self, handoff: impl OrderHandoff + 'static) -> Self {
        self.handoff = Box::new(handoff);
        self
    }

    /// Engine configuration.
    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    /// Resolved pricing rules.
    pub fn rules(&self) -> &PricingRules {
        &self.rules
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Promo state of the session.
    pub fn promo(&self) -> &PromoState {
        &self.promo
    }

    /// Current checkout phase.
    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// Load the cart from the store. A missing snapshot is an empty cart; so is an
    /// unreadable one, which is logged.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::Store`] if the store cannot be read.
    pub fn cart(&self) -> Result<Cart, CartError> {
        let Some(snapshot) = self.store.get(&self.config.storage_key)? else {
            return Ok(Cart::new());
        };

        match serde_json::from_str(&snapshot) {
            Ok(cart) => Ok(cart),
            Err(error) => {
                warn!(
                    storage_key = %self.config.storage_key,
                    "discarding unreadable cart snapshot: {error}"
                );

                Ok(Cart::new())
            }
        }
    }

    fn save(&mut self, cart: &Cart) -> Result<(), CartError> {
        let snapshot = serde_json::to_string(cart)?;

        self.store.set(&self.config.storage_key, snapshot)?;

        debug!(lines = cart.len(), "saved cart");

        if self.phase == CheckoutPhase::OrderSent {
            self.phase = self.idle_phase();
        }

        Ok(())
    }

    fn idle_phase(&self) -> CheckoutPhase {
        if self.promo.is_active() {
            CheckoutPhase::PromoApplied
        } else {
            CheckoutPhase::Idle
        }
    }

    /// Add a product. An existing line with the same id has its quantity increased.
    ///
    /// Input without an id, a name or a positive price is ignored without touching
    /// the store, and `None` is returned.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart cannot be loaded or saved.
    pub fn add_item(&mut self, item: NewItem) -> Result<Option<Cart>, CartError> {
        let Some(line) = item.into_line_item() else {
            debug!("ignoring add-to-cart input without id, name or price");

            return Ok(None);
        };

        let mut cart = self.cart()?;

        debug!(item_id = line.id(), quantity = line.quantity().get(), "adding item");

        cart.add(line);
        self.save(&cart)?;

        self.notifier
            .notify(&Notification::success(ADDED_TO_CART_MESSAGE));

        Ok(Some(cart))
    }

    /// Remove a product. Removing an absent product does nothing.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart cannot be loaded or saved.
    pub fn remove_item(&mut self, id: &str) -> Result<Cart, CartError> {
        let mut cart = self.cart()?;

        if cart.remove(id) {
            debug!(item_id = id, "removed item");

            self.save(&cart)?;
        }

        Ok(cart)
    }

    /// Set a product's quantity; anything below one becomes one.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart cannot be loaded or saved.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) -> Result<Cart, CartError> {
        let mut cart = self.cart()?;

        if cart.update_quantity(id, quantity) {
            debug!(item_id = id, quantity, "updated quantity");

            self.save(&cart)?;
        }

        Ok(cart)
    }

    /// Empty the cart, deleting the snapshot from the store.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::Store`] if the snapshot cannot be removed.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.store.remove(&self.config.storage_key)?;

        self.phase = self.idle_phase();

        debug!("cleared cart");

        Ok(())
    }

    /// Total number of units in the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart cannot be loaded.
    pub fn item_count(&self) -> Result<u64, CartError> {
        Ok(self.cart()?.item_count())
    }

    /// Price the current cart with the active promo.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart cannot be loaded or priced.
    pub fn pricing(&self) -> Result<Pricing<'static>, CartError> {
        let cart = self.cart()?;

        Ok(price_cart(&cart, self.promo.discount(), &self.rules)?)
    }

    /// Check a promo code with the backend and keep the result for the session.
    ///
    /// Any failure clears the promo state and raises an error notification.
    ///
    /// # Errors
    ///
    /// - [`PromoError::Rejected`]: the backend says the code cannot be used.
    /// - [`PromoError::ServiceUnavailable`]: the backend could not be reached.
    pub async fn validate_promo_code(&mut self, code: &str) -> Result<PromoApplied, PromoError> {
        let code = code.trim();

        let validation = match self.promo_service.validate(code).await {
            Ok(validation) => validation,
            Err(error) => {
                warn!(code, "promo validation failed: {error}");

                return Err(self.reject_promo(PromoError::ServiceUnavailable(error)));
            }
        };

        if !validation.valid {
            info!(code, "promo code rejected");

            return Err(self.reject_promo(PromoError::Rejected {
                message: validation.message,
            }));
        }

        let discount = validation
            .discount
            .as_ref()
            .and_then(|descriptor| descriptor.to_discount());

        self.promo
            .apply(code, discount, validation.participation_id);
        self.phase = CheckoutPhase::PromoApplied;

        let code = self.promo.code().unwrap_or_default().to_string();

        info!(code, ?discount, "promo code applied");

        Ok(PromoApplied {
            code,
            message: validation.message,
            discount,
        })
    }

    fn reject_promo(&mut self, error: PromoError) -> PromoError {
        self.clear_promo();

        self.notifier.notify(&Notification::error(error.message()));

        error
    }

    /// Forget the promo code. The cart is untouched.
    pub fn clear_promo(&mut self) {
        self.promo.clear();

        if self.phase == CheckoutPhase::PromoApplied {
            self.phase = CheckoutPhase::Idle;
        }
    }

    /// Tell the backend the active promo code was used, without waiting.
    ///
    /// The call runs on the current tokio runtime; failures are logged. Returns
    /// `None` when there is no active code or no runtime to run on.
    pub fn mark_promo_used(&self) -> Option<JoinHandle<()>> {
        let code = self.promo.code()?.to_string();

        let Ok(runtime) = Handle::try_current() else {
            warn!(code, "no async runtime; promo code not marked as used");

            return None;
        };

        let service = Arc::clone(&self.promo_service);

        Some(runtime.spawn(async move {
            match service.mark_used(&code).await {
                Ok(()) => info!(code, "promo code marked as used"),
                Err(error) => warn!(code, "failed to mark promo code as used: {error}"),
            }
        }))
    }

    /// Render the order summary stamped with the current local time.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart cannot be loaded or priced.
    pub fn generate_order_summary(&self, customer: &CustomerInfo) -> Result<String, CartError> {
        self.generate_order_summary_at(customer, &Zoned::now())
    }

    /// Render the order summary stamped with `placed_at`.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart cannot be loaded or priced.
    pub fn generate_order_summary_at(
        &self,
        customer: &CustomerInfo,
        placed_at: &Zoned,
    ) -> Result<String, CartError> {
        let cart = self.cart()?;
        let pricing = price_cart(&cart, self.promo.discount(), &self.rules)?;

        let summary = OrderSummary::new(
            &self.config.shop_name,
            &self.config.currency_label,
            &cart,
            &self.promo,
            &pricing,
            &self.rules,
            customer,
            placed_at,
        );

        Ok(summary.to_string())
    }

    /// Hand the order summary off to the messaging app.
    ///
    /// Returns the link that was opened. There is no confirmation that the message
    /// was sent.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::EmptyCart`] for an empty cart, or a [`CartError`] if the
    /// summary or link cannot be built or opened.
    pub fn send_order(&mut self, customer: &CustomerInfo) -> Result<Url, CartError> {
        if self.cart()?.is_empty() {
            return Err(CartError::EmptyCart);
        }

        let summary = self.generate_order_summary(customer)?;
        let messaging = &self.config.messaging;
        let url = order_link(&messaging.base_url, &messaging.recipient, &summary)?;

        self.handoff.open(&url)?;
        self.phase = CheckoutPhase::OrderSent;

        info!(promo = ?self.promo.code(), "order handed off");

        Ok(url)
    }

    /// Finish a sent order once the shop confirmed it: mark the promo code used,
    /// then clear the cart and the promo.
    ///
    /// Returns the pending mark-used call, if one was started.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::OrderNotSent`] unless [`CartEngine::send_order`] succeeded
    /// since the cart last changed, or [`CartError::Store`] if the cart cannot be cleared.
    pub fn complete_order(&mut self) -> Result<Option<JoinHandle<()>>, CartError> {
        if self.phase != CheckoutPhase::OrderSent {
            return Err(CartError::OrderNotSent);
        }

        let pending = self.mark_promo_used();

        self.promo.clear();
        self.clear()?;

        Ok(pending)
    }
}
