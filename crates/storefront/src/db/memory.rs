//! In-memory stores.
//!
//! Used by unit and integration tests and for running the storefront
//! without a database. Nothing here survives a restart.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use fitment_forge_core::{
    AddressId, AppRole, CartId, CartLine, CartOwner, Email, RoleId, UserId, Vehicle,
};

use super::{
    AddressStore, CartStore, CatalogStore, ProfileStore, RepositoryError, RoleStore, StoredCart,
    UserStore,
};
use crate::models::{
    Address, AddressInput, Category, Product, Profile, ProfileUpdate, User, UserRole,
};

fn unavailable() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

/// Cart rows, with switches to simulate an unreachable store.
#[derive(Default)]
pub struct MemoryCartStore {
    carts: RwLock<HashMap<CartOwner, StoredCart>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryCartStore {
    /// Make every `get` fail until switched back.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every `upsert` fail until switched back.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored cart rows.
    pub async fn len(&self) -> usize {
        self.carts.read().await.len()
    }

    /// Whether no cart row has been written.
    pub async fn is_empty(&self) -> bool {
        self.carts.read().await.is_empty()
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn get(&self, owner: &CartOwner) -> Result<Option<StoredCart>, RepositoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.carts.read().await.get(owner).cloned())
    }

    async fn upsert(
        &self,
        owner: &CartOwner,
        lines: &[CartLine],
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut carts = self.carts.write().await;
        let cart = carts.entry(*owner).or_insert_with(|| StoredCart {
            id: CartId::generate(),
            owner: *owner,
            lines: Vec::new(),
            updated_at,
        });
        cart.lines = lines.to_vec();
        cart.updated_at = updated_at;
        Ok(())
    }
}

/// User accounts keyed by email.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Email, (User, String)>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|(user, _)| user.id == id)
            .map(|(user, _)| user.clone()))
    }

    async fn create(&self, email: &Email, password_hash: &str) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let user = User {
            id: UserId::generate(),
            email: email.clone(),
            created_at: Utc::now(),
        };
        users.insert(email.clone(), (user.clone(), password_hash.to_owned()));
        Ok(user)
    }
}

/// Profiles keyed by user.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<UserId, Profile>>,
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, user_id: UserId) -> Result<Option<Profile>, RepositoryError> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }

    async fn create(
        &self,
        user_id: UserId,
        first_name: Option<&str>,
        last_name: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Profile, RepositoryError> {
        let now = Utc::now();
        let profile = Profile {
            id: user_id,
            first_name: first_name.map(str::to_owned),
            last_name: last_name.map(str::to_owned),
            phone: phone.map(str::to_owned),
            avatar_url: None,
            saved_vehicle: None,
            created_at: now,
            updated_at: now,
        };
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&user_id) {
            return Err(RepositoryError::Conflict("profile already exists".to_owned()));
        }
        profiles.insert(user_id, profile.clone());
        Ok(profile)
    }

    async fn update(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<Profile>, RepositoryError> {
        let mut profiles = self.profiles.write().await;
        let Some(profile) = profiles.get_mut(&user_id) else {
            return Ok(None);
        };
        if let Some(first_name) = &update.first_name {
            profile.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &update.last_name {
            profile.last_name = Some(last_name.clone());
        }
        if let Some(phone) = &update.phone {
            profile.phone = Some(phone.clone());
        }
        profile.updated_at = Utc::now();
        Ok(Some(profile.clone()))
    }

    async fn set_saved_vehicle(
        &self,
        user_id: UserId,
        vehicle: Option<&Vehicle>,
    ) -> Result<(), RepositoryError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(&user_id)
            .ok_or(RepositoryError::NotFound)?;
        profile.saved_vehicle = vehicle.cloned();
        profile.updated_at = Utc::now();
        Ok(())
    }
}

/// Role rows in insertion order.
#[derive(Default)]
pub struct MemoryRoleStore {
    roles: RwLock<Vec<UserRole>>,
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn has_role(&self, user_id: UserId, role: AppRole) -> Result<bool, RepositoryError> {
        Ok(self
            .roles
            .read()
            .await
            .iter()
            .any(|r| r.user_id == user_id && r.role == role))
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Option<UserRole>, RepositoryError> {
        Ok(self
            .roles
            .read()
            .await
            .iter()
            .find(|r| r.user_id == user_id)
            .cloned())
    }

    async fn insert(&self, user_id: UserId, role: AppRole) -> Result<UserRole, RepositoryError> {
        let mut roles = self.roles.write().await;
        if roles.iter().any(|r| r.user_id == user_id && r.role == role) {
            return Err(RepositoryError::Conflict("role already exists".to_owned()));
        }
        let row = UserRole {
            id: RoleId::generate(),
            user_id,
            role,
        };
        roles.push(row.clone());
        Ok(row)
    }
}

/// Addresses in insertion order.
#[derive(Default)]
pub struct MemoryAddressStore {
    addresses: RwLock<Vec<Address>>,
}

fn apply_input(address: &mut Address, input: &AddressInput) {
    address.kind = input.kind;
    address.first_name.clone_from(&input.first_name);
    address.last_name.clone_from(&input.last_name);
    address.company.clone_from(&input.company);
    address.address_line_1.clone_from(&input.address_line_1);
    address.address_line_2.clone_from(&input.address_line_2);
    address.city.clone_from(&input.city);
    address.state.clone_from(&input.state);
    address.postal_code.clone_from(&input.postal_code);
    address.country.clone_from(&input.country);
    address.phone.clone_from(&input.phone);
    address.is_default = input.is_default;
}

fn clear_defaults(addresses: &mut [Address], user_id: UserId, input: &AddressInput) {
    if !input.is_default {
        return;
    }
    for address in addresses
        .iter_mut()
        .filter(|a| a.user_id == user_id && a.kind == input.kind)
    {
        address.is_default = false;
    }
}

#[async_trait]
impl AddressStore for MemoryAddressStore {
    async fn list(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let mut list: Vec<Address> = self
            .addresses
            .read()
            .await
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(list)
    }

    async fn create(
        &self,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let mut addresses = self.addresses.write().await;
        clear_defaults(&mut addresses, user_id, input);

        let now = Utc::now();
        let mut address = Address {
            id: AddressId::generate(),
            user_id,
            kind: input.kind,
            first_name: String::new(),
            last_name: String::new(),
            company: None,
            address_line_1: String::new(),
            address_line_2: None,
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            country: String::new(),
            phone: None,
            is_default: false,
            created_at: now,
            updated_at: now,
        };
        apply_input(&mut address, input);
        addresses.push(address.clone());
        Ok(address)
    }

    async fn update(
        &self,
        user_id: UserId,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<Option<Address>, RepositoryError> {
        let mut addresses = self.addresses.write().await;
        if !addresses.iter().any(|a| a.id == id && a.user_id == user_id) {
            return Ok(None);
        }
        clear_defaults(&mut addresses, user_id, input);

        let Some(address) = addresses
            .iter_mut()
            .find(|a| a.id == id && a.user_id == user_id)
        else {
            return Ok(None);
        };
        apply_input(address, input);
        address.updated_at = Utc::now();
        Ok(Some(address.clone()))
    }

    async fn delete(&self, user_id: UserId, id: AddressId) -> Result<bool, RepositoryError> {
        let mut addresses = self.addresses.write().await;
        let before = addresses.len();
        addresses.retain(|a| !(a.id == id && a.user_id == user_id));
        Ok(addresses.len() < before)
    }
}

/// Catalog rows, with a switch to simulate an unreachable store.
#[derive(Default)]
pub struct MemoryCatalogStore {
    products: RwLock<Vec<Product>>,
    categories: RwLock<Vec<Category>>,
    fail_reads: AtomicBool,
}

impl MemoryCatalogStore {
    /// Make every read fail until switched back.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub async fn add_product(&self, product: Product) {
        self.products.write().await.push(product);
    }

    pub async fn add_category(&self, category: Category) {
        self.categories.write().await.push(category);
    }

    fn check_reads(&self) -> Result<(), RepositoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn featured_products(&self, limit: u32) -> Result<Vec<Product>, RepositoryError> {
        self.check_reads()?;
        let mut featured: Vec<Product> = self
            .products
            .read()
            .await
            .iter()
            .filter(|p| p.is_featured && p.is_active)
            .cloned()
            .collect();
        featured.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        featured.truncate(limit as usize);
        Ok(featured)
    }

    async fn top_level_categories(&self, limit: u32) -> Result<Vec<Category>, RepositoryError> {
        self.check_reads()?;
        let mut top: Vec<Category> = self
            .categories
            .read()
            .await
            .iter()
            .filter(|c| c.parent_id.is_none())
            .cloned()
            .collect();
        top.sort_by(|a, b| a.name.cmp(&b.name));
        top.truncate(limit as usize);
        Ok(top)
    }
}
