//! Fitment Forge Core - Shared types library.
//!
//! This crate provides the domain types used across the Fitment Forge crates:
//! - `storefront` - Public-facing auto-parts storefront API
//! - `cli` - Command-line tools for migrations and role management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Database encoding is available behind the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, emails, roles, vehicles and cart lines

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
