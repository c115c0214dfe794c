//! Cart

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::items::LineItem;

/// Ordered line items, in the order products were first added.
///
/// Persisted as a bare JSON array of [`LineItem`] records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line item. A line with the same id has its quantity increased by the
    /// item's quantity instead of being duplicated.
    pub fn add(&mut self, item: LineItem) {
        match self.items.iter_mut().find(|line| line.id() == item.id()) {
            Some(existing) => existing.increment(item.quantity()),
            None => self.items.push(item),
        }
    }

    /// Remove the line with the given id. Returns whether a line was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();

        self.items.retain(|line| line.id() != id);

        self.items.len() != before
    }

    /// Set the quantity of a line, clamping anything below one up to one.
    ///
    /// Returns whether a line with the given id exists.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) -> bool {
        let Some(line) = self.items.iter_mut().find(|line| line.id() == id) else {
            return false;
        };

        let clamped = u32::try_from(quantity.max(1)).unwrap_or(u32::MAX);

        line.set_quantity(NonZeroU32::new(clamped).unwrap_or(NonZeroU32::MIN));

        true
    }

    /// Lookup a line by id.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|line| line.id() == id)
    }

    /// Iterate the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|line| u64::from(line.quantity().get()))
            .sum()
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
