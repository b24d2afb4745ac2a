//! Cart line items and cart ownership.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{GuestSessionId, ProductId, UserId};
use super::price::{CurrencyCode, Price};

/// Errors from constructing an invalid [`CartLine`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartLineError {
    #[error("product id cannot be empty")]
    EmptyProductId,
    #[error("quantity must be greater than zero")]
    ZeroQuantity,
    #[error("price cannot be negative")]
    NegativePrice,
}

/// One product in a cart.
///
/// This is also the element type of the `carts.items` JSON column:
/// `{"product_id": "...", "quantity": 2, "price": "10.00"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price at the time the product was added.
    pub price: Decimal,
}

impl CartLine {
    /// Build a validated line.
    ///
    /// # Errors
    ///
    /// Returns an error if the product ID is empty, the quantity is zero,
    /// or the price is negative.
    pub fn new(product_id: ProductId, quantity: u32, price: Decimal) -> Result<Self, CartLineError> {
        if product_id.is_empty() {
            return Err(CartLineError::EmptyProductId);
        }
        if quantity == 0 {
            return Err(CartLineError::ZeroQuantity);
        }
        if price.is_sign_negative() && !price.is_zero() {
            return Err(CartLineError::NegativePrice);
        }
        Ok(Self {
            product_id,
            quantity,
            price,
        })
    }

    /// Unit price as a [`Price`].
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::new(self.price, CurrencyCode::USD)
    }

    /// `price × quantity`, or `None` if the amount overflows.
    #[must_use]
    pub fn line_total(&self) -> Option<Price> {
        self.unit_price().checked_times(self.quantity)
    }
}

/// The identity a cart row is keyed by.
///
/// A row carries either a guest session token or a user ID, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CartOwner {
    /// Anonymous visitor identified by a locally cached token.
    Guest(GuestSessionId),
    /// Signed-in user.
    User(UserId),
}

impl CartOwner {
    /// Returns `true` for guest carts.
    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest(_))
    }

    /// The user ID, when the owner is signed in.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            Self::Guest(_) => None,
        }
    }

    /// The guest session token, when the owner is anonymous.
    #[must_use]
    pub const fn session_id(&self) -> Option<GuestSessionId> {
        match self {
            Self::Guest(id) => Some(*id),
            Self::User(_) => None,
        }
    }
}

impl fmt::Display for CartOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guest(id) => write!(f, "guest:{id}"),
            Self::User(id) => write!(f, "user:{id}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_validation() {
        let price = Decimal::new(1000, 2);
        assert!(CartLine::new(ProductId::from("x"), 1, price).is_ok());
        assert_eq!(
            CartLine::new(ProductId::from(""), 1, price),
            Err(CartLineError::EmptyProductId)
        );
        assert_eq!(
            CartLine::new(ProductId::from("x"), 0, price),
            Err(CartLineError::ZeroQuantity)
        );
        assert_eq!(
            CartLine::new(ProductId::from("x"), 1, Decimal::new(-1, 2)),
            Err(CartLineError::NegativePrice)
        );
        assert!(CartLine::new(ProductId::from("free"), 1, Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_line_total() {
        let line = CartLine::new(ProductId::from("x"), 3, Decimal::new(250, 2)).unwrap();
        assert_eq!(line.line_total().unwrap().amount, Decimal::new(750, 2));

        let huge = CartLine::new(ProductId::from("x"), 2, Decimal::MAX).unwrap();
        assert_eq!(huge.line_total(), None);
    }

    #[test]
    fn test_items_column_accepts_numeric_price() {
        let line: CartLine =
            serde_json::from_str(r#"{"product_id":"p1","quantity":2,"price":10.5}"#).unwrap();
        assert_eq!(line.price, Decimal::new(105, 1));
    }

    #[test]
    fn test_owner_accessors() {
        let user = UserId::generate();
        let owner = CartOwner::User(user);
        assert!(!owner.is_guest());
        assert_eq!(owner.user_id(), Some(user));
        assert_eq!(owner.session_id(), None);

        let guest = GuestSessionId::generate();
        let owner = CartOwner::Guest(guest);
        assert!(owner.is_guest());
        assert_eq!(owner.session_id(), Some(guest));
        assert!(owner.to_string().starts_with("guest:"));
    }
}
