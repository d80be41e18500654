//! Cart Model
//!
//! A cart is owned by exactly one session and never persisted. Mutation is
//! plain collection work; prices are looked up live by the catalog at
//! subtotal/commit time, never stored on the line.

use crate::error::{AppError, AppResult, ErrorCode};
use serde::{Deserialize, Serialize};

/// One (product, quantity) selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i64,
}

/// Session-scoped selection of products awaiting checkout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a quantity of a product
    ///
    /// Merges into an existing line for the same product, otherwise appends.
    pub fn add_line(&mut self, product_id: i64, quantity: i64) -> AppResult<()> {
        if quantity <= 0 {
            return Err(AppError::new(ErrorCode::InvalidQuantity)
                .with_detail("product_id", product_id)
                .with_detail("quantity", quantity));
        }
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => line.quantity += quantity,
            None => self.lines.push(CartLine {
                product_id,
                quantity,
            }),
        }
        Ok(())
    }

    /// Remove the line for a product; no-op when absent
    pub fn remove_line(&mut self, product_id: i64) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Drop all lines
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Lines in insertion order
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Distinct product ids, ascending
    ///
    /// This is the lock acquisition order used by order commit.
    pub fn product_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.lines.iter().map(|l| l.product_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_line_appends_and_merges() {
        let mut cart = Cart::new();
        cart.add_line(1, 2).unwrap();
        cart.add_line(2, 1).unwrap();
        cart.add_line(1, 3).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.lines()[0], CartLine { product_id: 1, quantity: 5 });
        assert_eq!(cart.lines()[1], CartLine { product_id: 2, quantity: 1 });
    }

    #[test]
    fn test_add_line_rejects_non_positive_quantity() {
        let mut cart = Cart::new();
        let err = cart.add_line(1, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidQuantity);
        let err = cart.add_line(1, -4).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidQuantity);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_line_is_noop_when_absent() {
        let mut cart = Cart::new();
        cart.add_line(1, 1).unwrap();
        cart.remove_line(99);
        assert_eq!(cart.len(), 1);
        cart.remove_line(1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_line(1, 1).unwrap();
        cart.add_line(2, 2).unwrap();
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_product_ids_sorted_and_deduped() {
        let mut cart = Cart::new();
        cart.add_line(9, 1).unwrap();
        cart.add_line(3, 1).unwrap();
        cart.add_line(9, 2).unwrap();
        cart.add_line(1, 1).unwrap();
        assert_eq!(cart.product_ids(), vec![1, 3, 9]);
    }
}
