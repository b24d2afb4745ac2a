//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - Cart reconciliation against the row store
//! - `fitment` - Year/make/model/engine vehicle selector
//! - `auth` - Password sign-up and sign-in, admin role check
//! - `account` - Profile, saved vehicle and address book
//! - `roles` - Idempotent role assignment

pub mod account;
pub mod auth;
pub mod cart;
pub mod fitment;
pub mod roles;
