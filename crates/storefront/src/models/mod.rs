//! Domain models for the storefront.

pub mod catalog;
pub mod session;
pub mod user;

pub use catalog::{Category, NameRef, Product};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{Address, AddressInput, Profile, ProfileUpdate, User, UserRole};
