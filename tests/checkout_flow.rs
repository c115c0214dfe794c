//! End-to-end checkout against a file-backed store.

use std::{fs, sync::Arc};

use rust_decimal::Decimal;
use rusty_money::{Money, iso::XOF};
use tempfile::TempDir;
use testresult::TestResult;

use storefront_cart::{
    handoff::MockOrderHandoff,
    notifications::MockNotifier,
    prelude::*,
    promotions::{DiscountDescriptor, MockPromoService},
};

const CONFIG: &str = r#"
shop_name: Aqua-Racine
currency: XOF
currency_label: FCFA
delivery_fee: 2000
advance_percentage: 30
storage_key: shop_cart
messaging:
  recipient: "+225 01 23 45 67 89"
"#;

fn load_config(dir: &TempDir) -> TestResult<CartConfig> {
    let path = dir.path().join("cart.yml");
    fs::write(&path, CONFIG)?;

    Ok(CartConfig::from_path(&path)?)
}

fn customer() -> CustomerInfo {
    CustomerInfo {
        first_name: "Kouassi".to_string(),
        last_name: "Yao".to_string(),
        phone: "0123456789".to_string(),
        email: "k.yao@example.com".to_string(),
        address: "Lot 7, Cocody".to_string(),
        city: "Abidjan".to_string(),
        commune: Some("Cocody".to_string()),
        notes: Some("Sonner deux fois".to_string()),
    }
}

#[test]
fn cart_survives_a_new_session_but_promo_does_not() -> TestResult {
    let dir = TempDir::new()?;
    let config = load_config(&dir)?;
    let data = dir.path().join("data");

    {
        let mut engine = CartEngine::new(
            config.clone(),
            FileStore::open(&data)?,
            Arc::new(MockPromoService::new()),
        )?;

        engine.add_item(
            NewItem::new("tilapia", "Tilapia frais", Decimal::from(3000))
                .with_unit("kg")
                .with_quantity(2),
        )?;
        engine.add_item(NewItem::new("basilic", "Basilic", Decimal::from(750)))?;
    }

    assert!(data.join("shop_cart.json").exists());

    let engine = CartEngine::new(config, FileStore::open(&data)?, Arc::new(MockPromoService::new()))?;

    let cart = engine.cart()?;
    let ids: Vec<_> = cart.iter().map(LineItem::id).collect();

    assert_eq!(ids, ["tilapia", "basilic"]);
    assert_eq!(cart.get("tilapia").and_then(LineItem::unit), Some("kg"));
    assert!(!engine.promo().is_active());
    assert_eq!(engine.phase(), CheckoutPhase::Idle);

    let pricing = engine.pricing()?;

    assert_eq!(pricing.subtotal, Money::from_minor(6750, XOF));
    assert_eq!(pricing.total, Money::from_minor(8750, XOF));
    assert_eq!(pricing.advance, Money::from_minor(2625, XOF));
    assert_eq!(pricing.remainder, Money::from_minor(6125, XOF));

    Ok(())
}

#[tokio::test]
async fn full_checkout_with_percent_promo() -> TestResult {
    let dir = TempDir::new()?;
    let config = load_config(&dir)?;
    let data = dir.path().join("data");

    let mut service = MockPromoService::new();
    service
        .expect_validate()
        .once()
        .withf(|code| code == "roue15")
        .return_once(|_| {
            Ok(PromoValidation {
                valid: true,
                message: "Code valide ! 15% de réduction".to_string(),
                discount: Some(DiscountDescriptor::percent(Decimal::from(15))),
                participation_id: Some("88".to_string()),
            })
        });
    service
        .expect_mark_used()
        .once()
        .withf(|code| code == "ROUE15")
        .return_once(|_| Ok(()));

    let mut notifier = MockNotifier::new();
    notifier
        .expect_notify()
        .times(2)
        .withf(|notification| notification.level == NotificationLevel::Success)
        .return_const(());

    let mut handoff = MockOrderHandoff::new();
    handoff
        .expect_open()
        .once()
        .withf(|url| url.path() == "/2250123456789")
        .returning(|_| Ok(()));

    let mut engine = CartEngine::new(config, FileStore::open(&data)?, Arc::new(service))?
        .with_notifier(notifier)
        .with_handoff(handoff);

    engine.add_item(NewItem::new("tilapia", "Tilapia frais", Decimal::from(3000)))?;
    engine.add_item(NewItem::new("laitue", "Laitue", Decimal::from(333)).with_quantity(3))?;

    let applied = engine.validate_promo_code("roue15").await?;

    assert_eq!(applied.discount, Some(PromoDiscount::percent_off(Decimal::from(15))));

    // 3999 * 15% = 599.85, rounded up
    let pricing = engine.pricing()?;

    assert_eq!(pricing.discount, Money::from_minor(600, XOF));
    assert_eq!(pricing.total, Money::from_minor(5399, XOF));
    assert_eq!(
        pricing.advance.to_minor_units() + pricing.remainder.to_minor_units(),
        5399
    );

    let url = engine.send_order(&customer())?;
    let text = url
        .query_pairs()
        .find(|(key, _)| key == "text")
        .map(|(_, value)| value.into_owned())
        .ok_or("expected text parameter")?;

    assert!(text.contains("ROUE15"));
    assert!(text.contains("Sonner deux fois"));
    assert_eq!(engine.phase(), CheckoutPhase::OrderSent);

    let pending = engine.complete_order()?.ok_or("expected a pending call")?;
    pending.await?;

    assert!(!data.join("shop_cart.json").exists());
    assert!(engine.cart()?.is_empty());
    assert!(!engine.promo().is_active());

    Ok(())
}

#[test]
fn complete_order_needs_a_sent_order() -> TestResult {
    let dir = TempDir::new()?;
    let config = load_config(&dir)?;

    let mut engine = CartEngine::new(
        config,
        FileStore::open(dir.path().join("data"))?,
        Arc::new(MockPromoService::new()),
    )?;

    engine.add_item(NewItem::new("basilic", "Basilic", Decimal::from(750)))?;

    assert!(matches!(engine.complete_order(), Err(CartError::OrderNotSent)));
    assert_eq!(engine.item_count()?, 1);

    Ok(())
}
