//! The shopper's in-progress selection.
//!
//! [`Cart`] is the pure, in-memory collection: an ordered list of
//! [`CartLine`]s keyed by product id. It knows nothing about persistence;
//! the storefront's cart store wraps it and commits after every mutation.
//!
//! Invariants upheld by every constructor and operation:
//! - at most one line per product id (adding an existing id increments it)
//! - every line has `quantity >= 1`
//!
//! Name, price and image are snapshots taken when the line is first added.
//! Later adds of the same id only bump the quantity, so a catalog price
//! change never reprices what is already in the cart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Product, ProductId};

/// One entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    /// Unit price at the time the line was created.
    pub price: Decimal,
    pub image: String,
    pub quantity: u32,
}

impl CartLine {
    /// `price * quantity`, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A candidate line passed to [`Cart::add_item`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartLine {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
}

impl From<&Product> for NewCartLine {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image_url.clone(),
        }
    }
}

/// Ordered collection of cart lines.
///
/// Serializes as a plain JSON array of lines. Deserializing goes through
/// [`Cart::from_lines`], so a hand-edited blob cannot break the invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from stored lines.
    ///
    /// Lines with a zero quantity are dropped and duplicate ids are merged
    /// into the first occurrence (quantities summed, first snapshot kept).
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut merged: Vec<CartLine> = Vec::new();
        for line in lines {
            if line.quantity == 0 {
                continue;
            }
            match merged.iter_mut().find(|existing| existing.id == line.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => merged.push(line),
            }
        }
        Self { lines: merged }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up the line for a product id.
    #[must_use]
    pub fn line(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines (not the item count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Add one unit of `candidate`.
    ///
    /// If a line with the same id exists its quantity goes up by one and its
    /// snapshot is left untouched; otherwise a new line with quantity 1 is
    /// appended.
    pub fn add_item(&mut self, candidate: NewCartLine) {
        self.add_units(candidate, 1);
    }

    /// Add `units` of `candidate` at once; the same as calling
    /// [`Cart::add_item`] `units` times. Zero units is a no-op.
    pub fn add_units(&mut self, candidate: NewCartLine, units: u32) {
        if units == 0 {
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|line| line.id == candidate.id) {
            line.quantity = line.quantity.saturating_add(units);
            return;
        }

        self.lines.push(CartLine {
            id: candidate.id,
            name: candidate.name,
            price: candidate.price,
            image: candidate.image,
            quantity: units,
        });
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of zero or below removes the line. Unknown ids are ignored.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|line| &line.id == id) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Remove the line for `id` if present.
    pub fn remove_item(&mut self, id: &ProductId) {
        self.lines.retain(|line| &line.id != id);
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of `price * quantity` across all lines. Not rounded.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

impl From<Vec<CartLine>> for Cart {
    fn from(lines: Vec<CartLine>) -> Self {
        Self::from_lines(lines)
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}
