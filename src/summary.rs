//! Order Summary
//!
//! The text sent to the shop when a customer checks out. It is the only record of
//! the order the engine produces.

use std::fmt;

use jiff::Zoned;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;

use crate::{
    cart::Cart,
    config::PricingRules,
    pricing::Pricing,
    promotions::{PromoDiscount, PromoState},
};

/// Separator between thousands, as printed by French number formatting.
pub const GROUP_SEPARATOR: char = '\u{202f}';

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━";

/// Contact details captured on the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Phone number
    pub phone: String,

    /// Email address
    pub email: String,

    /// Street address
    pub address: String,

    /// City
    pub city: String,

    /// Commune (district), optional
    #[serde(default)]
    pub commune: Option<String>,

    /// Delivery instructions, optional
    #[serde(default)]
    pub notes: Option<String>,
}

/// Format a major-unit amount the way French locales do: `1 500 FCFA`, `4,5 EUR`.
pub fn format_amount(amount: Decimal, label: &str) -> String {
    let amount = amount.normalize();
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };

    let text = amount.abs().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text.as_str(), None),
    };

    let grouped = group_thousands(whole);

    match fraction {
        Some(fraction) => format!("{sign}{grouped},{fraction} {label}"),
        None => format!("{sign}{grouped} {label}"),
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.chars().count();
    let mut grouped = String::with_capacity(digits.len() + len / 3 * GROUP_SEPARATOR.len_utf8());

    for (idx, digit) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }

        grouped.push(digit);
    }

    grouped
}

/// Renders an order into the summary text.
///
/// Rendering is pure: everything it prints, including the timestamp, is passed in.
#[derive(Debug)]
pub struct OrderSummary<'a> {
    shop_name: &'a str,
    currency_label: &'a str,
    cart: &'a Cart,
    promo: &'a PromoState,
    pricing: &'a Pricing<'a>,
    rules: &'a PricingRules,
    customer: &'a CustomerInfo,
    placed_at: &'a Zoned,
}

impl<'a> OrderSummary<'a> {
    /// Create a summary for a priced cart.
    #[expect(
        clippy::too_many_arguments,
        reason = "every input is printed in the summary"
    )]
    pub fn new(
        shop_name: &'a str,
        currency_label: &'a str,
        cart: &'a Cart,
        promo: &'a PromoState,
        pricing: &'a Pricing<'a>,
        rules: &'a PricingRules,
        customer: &'a CustomerInfo,
        placed_at: &'a Zoned,
    ) -> Self {
        Self {
            shop_name,
            currency_label,
            cart,
            promo,
            pricing,
            rules,
            customer,
            placed_at,
        }
    }

    fn money(&self, money: &Money<'_, Currency>) -> String {
        format_amount(
            Decimal::new(money.to_minor_units(), self.rules.exponent),
            self.currency_label,
        )
    }

    fn minor(&self, minor: i64) -> String {
        format_amount(Decimal::new(minor, self.rules.exponent), self.currency_label)
    }

    fn write_customer(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let customer = self.customer;

        writeln!(
            f,
            "👤 *Client:* {} {}",
            customer.first_name, customer.last_name
        )?;
        writeln!(f, "📞 *Téléphone:* {}", customer.phone)?;
        writeln!(f, "📧 *Email:* {}", customer.email)?;
        writeln!(f, "📍 *Adresse:* {}, {}", customer.address, customer.city)?;

        if let Some(commune) = customer.commune.as_deref().filter(|s| !s.is_empty()) {
            writeln!(f, "🏘️ *Commune:* {commune}")?;
        }

        if let Some(notes) = customer.notes.as_deref().filter(|s| !s.is_empty()) {
            writeln!(f, "📝 *Instructions:* {notes}")?;
        }

        Ok(())
    }

    fn write_items(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📦 *ARTICLES COMMANDÉS:*")?;
        writeln!(f)?;

        for (idx, (line, total)) in self
            .cart
            .iter()
            .zip(self.pricing.line_totals.iter())
            .enumerate()
        {
            writeln!(f, "{}. {}", idx + 1, line.name())?;

            match line.unit() {
                Some(unit) => writeln!(f, "   Quantité: {} {unit}", line.quantity())?,
                None => writeln!(f, "   Quantité: {}", line.quantity())?,
            }

            writeln!(
                f,
                "   Prix unitaire: {}",
                format_amount(line.unit_price(), self.currency_label)
            )?;
            writeln!(f, "   Sous-total: {}", self.money(total))?;
            writeln!(f)?;
        }

        Ok(())
    }

    fn write_recap(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pricing = self.pricing;

        writeln!(f, "💰 *RÉCAPITULATIF:*")?;
        writeln!(f, "   Sous-total: {}", self.money(&pricing.subtotal))?;

        match (self.promo.code(), self.promo.discount()) {
            (Some(code), Some(PromoDiscount::FreeDelivery)) => {
                writeln!(
                    f,
                    "   Livraison: ~{}~ GRATUITE 🎁",
                    self.minor(self.rules.delivery_fee_minor)
                )?;
                writeln!(f, "   🎟️ *Code promo: {code}*")?;
                writeln!(f, "   ✨ *Livraison offerte !*")?;
            }
            (Some(code), Some(PromoDiscount::PercentOff { percent })) => {
                writeln!(f, "   Livraison: {}", self.money(&pricing.delivery_fee))?;
                writeln!(f, "   🎟️ *Code promo: {code}*")?;
                writeln!(
                    f,
                    "   ✨ *Réduction -{}%: -{}*",
                    percent.normalize(),
                    self.money(&pricing.discount)
                )?;
            }
            (Some(code), None) => {
                writeln!(f, "   Livraison: {}", self.money(&pricing.delivery_fee))?;
                writeln!(f, "   🎟️ *Code promo: {code}*")?;
            }
            (None, _) => {
                writeln!(f, "   Livraison: {}", self.money(&pricing.delivery_fee))?;
            }
        }

        writeln!(f, "   *TOTAL: {}*", self.money(&pricing.total))?;

        Ok(())
    }

    fn write_payment(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "💳 *PAIEMENT:*")?;
        writeln!(
            f,
            "   ✅ Avance payée ({}%): {}",
            self.rules.advance_percentage.normalize(),
            self.money(&self.pricing.advance)
        )?;
        writeln!(
            f,
            "   ⏳ Reste à payer à la livraison: {}",
            self.money(&self.pricing.remainder)
        )?;

        Ok(())
    }
}

impl fmt::Display for OrderSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "🛒 *NOUVELLE COMMANDE {}*",
            self.shop_name.to_uppercase()
        )?;
        writeln!(f)?;

        self.write_customer(f)?;

        writeln!(f)?;
        writeln!(f, "{RULE}")?;

        self.write_items(f)?;

        writeln!(f, "{RULE}")?;

        self.write_recap(f)?;

        writeln!(f)?;
        writeln!(f, "{RULE}")?;

        self.write_payment(f)?;

        writeln!(f)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "📅 Date: {}", self.placed_at.strftime("%d/%m/%Y %H:%M:%S"))?;
        writeln!(f)?;
        write!(f, "_Merci pour votre commande !_")
    }
}

#[cfg(test)]
mod tests {
    use jiff::{civil::date, tz::TimeZone};
    use testresult::TestResult;

    use crate::{config::CartConfig, items::NewItem, pricing::price_cart};

    use super::*;

    fn customer() -> CustomerInfo {
        CustomerInfo {
            first_name: "Awa".to_string(),
            last_name: "Koné".to_string(),
            phone: "0700000000".to_string(),
            email: "awa@example.com".to_string(),
            address: "Rue 12".to_string(),
            city: "Abidjan".to_string(),
            commune: Some("Cocody".to_string()),
            notes: None,
        }
    }

    fn sample_cart() -> Result<Cart, &'static str> {
        let mut cart = Cart::new();

        cart.add(
            NewItem::new("t", "Tilapia frais", Decimal::from(2500))
                .with_unit("kg")
                .with_quantity(2)
                .into_line_item()
                .ok_or("expected a valid line item")?,
        );
        cart.add(
            NewItem::new("l", "Laitue", Decimal::from(500))
                .into_line_item()
                .ok_or("expected a valid line item")?,
        );

        Ok(cart)
    }

    fn render(cart: &Cart, promo: &PromoState) -> TestResult<String> {
        let config = CartConfig::default();
        let rules = config.pricing_rules()?;
        let pricing = price_cart(cart, promo.discount(), &rules)?;
        let placed_at = date(2026, 10, 16).at(14, 5, 9, 0).to_zoned(TimeZone::UTC)?;

        Ok(OrderSummary::new(
            &config.shop_name,
            &config.currency_label,
            cart,
            promo,
            &pricing,
            &rules,
            &customer(),
            &placed_at,
        )
        .to_string())
    }

    #[test]
    fn format_amount_groups_thousands() {
        assert_eq!(format_amount(Decimal::from(0), "FCFA"), "0 FCFA");
        assert_eq!(format_amount(Decimal::from(950), "FCFA"), "950 FCFA");
        assert_eq!(
            format_amount(Decimal::from(1500), "FCFA"),
            "1\u{202f}500 FCFA"
        );
        assert_eq!(
            format_amount(Decimal::from(1_234_567), "FCFA"),
            "1\u{202f}234\u{202f}567 FCFA"
        );
        assert_eq!(format_amount(Decimal::new(450, 2), "EUR"), "4,5 EUR");
        assert_eq!(format_amount(Decimal::from(-2000), "FCFA"), "-2\u{202f}000 FCFA");
    }

    #[test]
    fn renders_items_and_totals_without_promo() -> TestResult {
        let text = render(&sample_cart()?, &PromoState::default())?;

        assert!(text.starts_with("🛒 *NOUVELLE COMMANDE AQUA-RACINE*\n\n👤 *Client:* Awa Koné\n"));
        assert!(text.contains("🏘️ *Commune:* Cocody\n"));
        assert!(!text.contains("Instructions"));
        assert!(text.contains(
            "1. Tilapia frais\n   Quantité: 2 kg\n   Prix unitaire: 2\u{202f}500 FCFA\n   Sous-total: 5\u{202f}000 FCFA\n\n"
        ));
        assert!(text.contains("2. Laitue\n   Quantité: 1\n   Prix unitaire: 500 FCFA\n"));
        assert!(text.contains("   Livraison: 1\u{202f}500 FCFA\n"));
        assert!(text.contains("   *TOTAL: 7\u{202f}000 FCFA*\n"));
        assert!(text.contains("   ✅ Avance payée (50%): 3\u{202f}500 FCFA\n"));
        assert!(text.contains("   ⏳ Reste à payer à la livraison: 3\u{202f}500 FCFA\n"));
        assert!(text.contains("📅 Date: 16/10/2026 14:05:09\n"));
        assert!(text.ends_with("_Merci pour votre commande !_"));
        assert!(!text.contains("Code promo"));

        Ok(())
    }

    #[test]
    fn line_subtotal_matches_fractional_unit_price() -> TestResult {
        let mut cart = Cart::new();
        cart.add(
            NewItem::new("g", "Graines", Decimal::new(25, 1))
                .with_quantity(2)
                .into_line_item()
                .ok_or("expected a valid line item")?,
        );

        let text = render(&cart, &PromoState::default())?;

        assert!(text.contains("   Prix unitaire: 2,5 FCFA\n   Sous-total: 5 FCFA\n"));
        assert!(text.contains("💰 *RÉCAPITULATIF:*\n   Sous-total: 5 FCFA\n"));

        Ok(())
    }

    #[test]
    fn renders_free_delivery_promo() -> TestResult {
        let mut promo = PromoState::default();
        promo.apply("wheel1", Some(PromoDiscount::FreeDelivery), None);

        let text = render(&sample_cart()?, &promo)?;

        assert!(text.contains("   Livraison: ~1\u{202f}500 FCFA~ GRATUITE 🎁\n"));
        assert!(text.contains("   🎟️ *Code promo: WHEEL1*\n"));
        assert!(text.contains("   ✨ *Livraison offerte !*\n"));
        assert!(text.contains("   *TOTAL: 5\u{202f}500 FCFA*\n"));

        Ok(())
    }

    #[test]
    fn renders_percent_promo() -> TestResult {
        let mut promo = PromoState::default();
        promo.apply(
            "wheel2",
            Some(PromoDiscount::percent_off(Decimal::from(10))),
            None,
        );

        let text = render(&sample_cart()?, &promo)?;

        assert!(text.contains("   Livraison: 1\u{202f}500 FCFA\n"));
        assert!(text.contains("   ✨ *Réduction -10%: -550 FCFA*\n"));
        assert!(text.contains("   *TOTAL: 6\u{202f}450 FCFA*\n"));

        Ok(())
    }

    #[test]
    fn rendering_is_deterministic_for_same_inputs() -> TestResult {
        let cart = sample_cart()?;
        let promo = PromoState::default();

        assert_eq!(render(&cart, &promo)?, render(&cart, &promo)?);

        Ok(())
    }
}
