//! Core types for Fitment Forge.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod cart;
pub mod email;
pub mod id;
pub mod price;
pub mod role;
pub mod vehicle;

pub use address::{AddressKind, AddressKindError};
pub use cart::{CartLine, CartLineError, CartOwner};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use role::{AppRole, AppRoleError};
pub use vehicle::Vehicle;
