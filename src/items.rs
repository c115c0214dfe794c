//! Items

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product line in the cart.
///
/// Serialized with the storefront's field names (`price`, `image`) so existing
/// snapshots keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    id: String,
    name: String,

    #[serde(rename = "price", with = "rust_decimal::serde::float")]
    unit_price: Decimal,

    #[serde(rename = "image", default)]
    image_ref: String,

    #[serde(default)]
    unit: String,

    quantity: NonZeroU32,
}

impl LineItem {
    /// Identifier of the product.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price of a single unit, in major units.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Image reference, empty when the product has none.
    pub fn image_ref(&self) -> &str {
        &self.image_ref
    }

    /// Unit label such as `"kg"`, if any.
    pub fn unit(&self) -> Option<&str> {
        Some(self.unit.as_str()).filter(|unit| !unit.is_empty())
    }

    /// Number of units, always at least one.
    pub fn quantity(&self) -> NonZeroU32 {
        self.quantity
    }

    pub(crate) fn increment(&mut self, delta: NonZeroU32) {
        self.quantity = self.quantity.saturating_add(delta.get());
    }

    pub(crate) fn set_quantity(&mut self, quantity: NonZeroU32) {
        self.quantity = quantity;
    }
}

/// Add-to-cart input as captured from a product card.
///
/// Every field may be missing; [`NewItem::into_line_item`] decides whether the
/// input describes a product that can go in the cart.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewItem {
    /// Product identifier
    pub id: Option<String>,

    /// Product name
    pub name: Option<String>,

    /// Unit price in major units
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,

    /// Image reference
    #[serde(rename = "image")]
    pub image_ref: Option<String>,

    /// Unit label
    pub unit: Option<String>,

    /// Quantity to add, 1 when missing or zero
    pub quantity: Option<u32>,
}

impl NewItem {
    /// Create an item input with the required fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            price: Some(price),
            ..Self::default()
        }
    }

    /// Set the unit label.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Set the image reference.
    #[must_use]
    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    /// Set the quantity to add.
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Quantity to add, defaulting to one.
    pub fn quantity_delta(&self) -> NonZeroU32 {
        self.quantity
            .and_then(NonZeroU32::new)
            .unwrap_or(NonZeroU32::MIN)
    }

    /// Build a line item, or `None` if the id or name is missing or empty, or the
    /// price is missing or not positive.
    pub fn into_line_item(self) -> Option<LineItem> {
        let quantity = self.quantity_delta();

        let id = self.id.filter(|id| !id.is_empty())?;
        let name = self.name.filter(|name| !name.is_empty())?;
        let unit_price = self.price.filter(|price| *price > Decimal::ZERO)?;

        Some(LineItem {
            id,
            name,
            unit_price,
            image_ref: self.image_ref.unwrap_or_default(),
            unit: self.unit.unwrap_or_default(),
            quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn into_line_item_defaults_quantity_to_one() {
        let item = NewItem::new("p1", "Tilapia", Decimal::from(2500)).into_line_item();

        assert_eq!(item.map(|item| item.quantity().get()), Some(1));
    }

    #[test]
    fn into_line_item_treats_zero_quantity_as_one() {
        let item = NewItem::new("p1", "Tilapia", Decimal::from(2500))
            .with_quantity(0)
            .into_line_item();

        assert_eq!(item.map(|item| item.quantity().get()), Some(1));
    }

    #[test]
    fn into_line_item_rejects_missing_fields() {
        let missing_id = NewItem {
            id: None,
            ..NewItem::new("p1", "Tilapia", Decimal::from(2500))
        };
        let empty_name = NewItem::new("p1", "", Decimal::from(2500));
        let missing_price = NewItem {
            price: None,
            ..NewItem::new("p1", "Tilapia", Decimal::from(2500))
        };
        let zero_price = NewItem::new("p1", "Tilapia", Decimal::ZERO);
        let negative_price = NewItem::new("p1", "Tilapia", Decimal::from(-5));

        assert!(missing_id.into_line_item().is_none());
        assert!(empty_name.into_line_item().is_none());
        assert!(missing_price.into_line_item().is_none());
        assert!(zero_price.into_line_item().is_none());
        assert!(negative_price.into_line_item().is_none());
    }

    #[test]
    fn unit_is_none_when_empty() {
        let plain = NewItem::new("p1", "Laitue", Decimal::from(500)).into_line_item();
        let weighed = NewItem::new("p2", "Tilapia", Decimal::from(2500))
            .with_unit("kg")
            .into_line_item();

        assert_eq!(plain.as_ref().and_then(LineItem::unit), None);
        assert_eq!(weighed.as_ref().and_then(LineItem::unit), Some("kg"));
    }

    #[test]
    fn deserializes_storefront_snapshot_record() -> TestResult {
        let item: LineItem = serde_json::from_str(
            r#"{"id":"7","name":"Tilapia","price":2500,"image":"/img/t.jpg","unit":"kg","quantity":3}"#,
        )?;

        assert_eq!(item.id(), "7");
        assert_eq!(item.unit_price(), Decimal::from(2500));
        assert_eq!(item.image_ref(), "/img/t.jpg");
        assert_eq!(item.unit(), Some("kg"));
        assert_eq!(item.quantity().get(), 3);

        Ok(())
    }

    #[test]
    fn zero_quantity_record_is_rejected() {
        let result = serde_json::from_str::<LineItem>(
            r#"{"id":"7","name":"Tilapia","price":2500,"quantity":0}"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn increment_adds_delta() -> TestResult {
        let mut item = NewItem::new("p1", "Tilapia", Decimal::from(2500))
            .into_line_item()
            .ok_or("expected a line item")?;

        item.increment(NonZeroU32::new(4).ok_or("non-zero")?);

        assert_eq!(item.quantity().get(), 5);

        Ok(())
    }
}
