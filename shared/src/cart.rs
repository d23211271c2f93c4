//! Staged reservation cart
//!
//! Session-scoped staging area for desired quantities, clamped against the
//! product snapshot taken when the line was staged. The cart never touches
//! persistent stock: the snapshot may be stale by checkout time, so the
//! reservation engine re-validates every line against live stock inside its
//! own transaction regardless of what the cart reports.

use crate::models::Product;
use serde::{Deserialize, Serialize};

/// One staged line: a product snapshot plus the desired quantity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
}

impl CartLine {
    /// Upper clamp for this line: live-at-staging stock and the per-order cap
    fn ceiling(&self) -> i64 {
        self.product.stock.min(self.product.max_reserve_qty)
    }
}

/// Staged cart — a plain value object owned by the session, not a global
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Stage `qty` more units of a product.
    ///
    /// If the product is already staged, the new quantity is
    /// `min(existing + qty, stock, max_reserve_qty)`; otherwise
    /// `min(qty, stock, max_reserve_qty)`. A clamp result of 0 stages
    /// nothing.
    pub fn add(&mut self, product: Product, qty: i64) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            line.quantity = (line.quantity + qty.max(0)).min(line.ceiling());
            return;
        }
        let line = CartLine {
            product,
            quantity: 0,
        };
        let quantity = qty.max(0).min(line.ceiling());
        if quantity > 0 {
            self.lines.push(CartLine { quantity, ..line });
        }
    }

    /// Set a staged line to an absolute quantity, clamped to
    /// `[0, min(stock, max_reserve_qty)]`. A result of 0 removes the line.
    pub fn set_quantity(&mut self, product_id: i64, qty: i64) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product_id) {
            line.quantity = qty.max(0).min(line.ceiling());
        }
        self.lines.retain(|l| l.quantity > 0);
    }

    /// Remove a line unconditionally
    pub fn remove(&mut self, product_id: i64) {
        self.lines.retain(|l| l.product.id != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Σ(staged price × quantity) — the staged snapshot, not live prices
    pub fn total_amount(&self) -> i64 {
        self.lines
            .iter()
            .map(|l| l.product.price * l.quantity)
            .sum()
    }

    pub fn total_items(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Convert staged lines into reservation-create inputs
    pub fn to_items(&self) -> Vec<crate::models::ReservationItemInput> {
        self.lines
            .iter()
            .map(|l| crate::models::ReservationItemInput {
                product_id: l.product.id,
                quantity: l.quantity,
                price: Some(l.product.price),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_product(id: i64, price: i64, stock: i64, max_reserve_qty: i64) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            description: None,
            price,
            image_url: None,
            category_id: 1,
            stock,
            max_reserve_qty,
            is_new: false,
            is_popular: false,
            is_active: true,
            allergens: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_add_within_limits() {
        let mut cart = Cart::new();
        cart.add(make_product(1, 200, 10, 5), 2);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_add_clamps_to_max_reserve_qty() {
        let mut cart = Cart::new();
        cart.add(make_product(1, 200, 10, 3), 5);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_add_clamps_to_stock() {
        let mut cart = Cart::new();
        cart.add(make_product(1, 200, 2, 5), 4);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_add_accumulates_then_clamps() {
        let mut cart = Cart::new();
        let p = make_product(1, 200, 10, 3);
        cart.add(p.clone(), 2);
        cart.add(p, 2);
        // 2 + 2 = 4, clamped to max_reserve_qty 3
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_add_zero_stock_stages_nothing() {
        let mut cart = Cart::new();
        cart.add(make_product(1, 200, 0, 3), 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_clamps() {
        let mut cart = Cart::new();
        cart.add(make_product(1, 200, 4, 3), 1);
        cart.set_quantity(1, 99);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add(make_product(1, 200, 4, 3), 2);
        cart.set_quantity(1, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_negative_removes_line() {
        let mut cart = Cart::new();
        cart.add(make_product(1, 200, 4, 3), 2);
        cart.set_quantity(1, -5);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_unconditional() {
        let mut cart = Cart::new();
        cart.add(make_product(1, 200, 4, 3), 2);
        cart.add(make_product(2, 180, 4, 3), 1);
        cart.remove(1);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].product.id, 2);
    }

    #[test]
    fn test_total_amount_uses_staged_prices() {
        let mut cart = Cart::new();
        cart.add(make_product(1, 200, 10, 5), 2); // 400
        cart.add(make_product(2, 180, 10, 5), 3); // 540
        assert_eq!(cart.total_amount(), 940);
        assert_eq!(cart.total_items(), 5);
    }

    #[test]
    fn test_to_items_carries_snapshot() {
        let mut cart = Cart::new();
        cart.add(make_product(7, 250, 10, 5), 2);
        let items = cart.to_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, 7);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].price, Some(250));
    }
}
