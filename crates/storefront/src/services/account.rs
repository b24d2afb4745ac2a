//! Account management for signed-in users.
//!
//! Thin rules over the profile and address stores: profiles are created on
//! demand, and every address operation is scoped to its owner.

use fitment_forge_core::{AddressId, UserId, Vehicle};
use thiserror::Error;

use crate::db::{AddressStore, ProfileStore, RepositoryError};
use crate::models::{Address, AddressInput, Profile, ProfileUpdate};

/// Errors from account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Profile and address book operations.
pub struct AccountService<'a> {
    profiles: &'a dyn ProfileStore,
    addresses: &'a dyn AddressStore,
}

impl<'a> AccountService<'a> {
    #[must_use]
    pub const fn new(profiles: &'a dyn ProfileStore, addresses: &'a dyn AddressStore) -> Self {
        Self {
            profiles,
            addresses,
        }
    }

    /// Fetch the profile, creating an empty one if the user has none yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile store fails.
    pub async fn profile(&self, user_id: UserId) -> Result<Profile, AccountError> {
        if let Some(profile) = self.profiles.get(user_id).await? {
            return Ok(profile);
        }
        match self.profiles.create(user_id, None, None, None).await {
            Ok(profile) => Ok(profile),
            // Created concurrently; read it back.
            Err(RepositoryError::Conflict(_)) => self
                .profiles
                .get(user_id)
                .await?
                .ok_or(AccountError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the profile store fails.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Profile, AccountError> {
        self.profile(user_id).await?;
        self.profiles
            .update(user_id, update)
            .await?
            .ok_or(AccountError::NotFound)
    }

    /// Mirror the fitment selection into the profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile store fails.
    pub async fn set_saved_vehicle(
        &self,
        user_id: UserId,
        vehicle: Option<&Vehicle>,
    ) -> Result<(), AccountError> {
        self.profile(user_id).await?;
        self.profiles.set_saved_vehicle(user_id, vehicle).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the address store fails.
    pub async fn addresses(&self, user_id: UserId) -> Result<Vec<Address>, AccountError> {
        Ok(self.addresses.list(user_id).await?)
    }

    /// # Errors
    ///
    /// Returns `AccountError::MissingFields` if a required field is blank.
    pub async fn add_address(
        &self,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<Address, AccountError> {
        check_address(input)?;
        Ok(self.addresses.create(user_id, input).await?)
    }

    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if the user has no such address.
    pub async fn update_address(
        &self,
        user_id: UserId,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<Address, AccountError> {
        check_address(input)?;
        self.addresses
            .update(user_id, id, input)
            .await?
            .ok_or(AccountError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if the user has no such address.
    pub async fn delete_address(&self, user_id: UserId, id: AddressId) -> Result<(), AccountError> {
        if self.addresses.delete(user_id, id).await? {
            Ok(())
        } else {
            Err(AccountError::NotFound)
        }
    }
}

fn check_address(input: &AddressInput) -> Result<(), AccountError> {
    let missing = input.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AccountError::MissingFields(missing))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fitment_forge_core::AddressKind;

    use super::*;
    use crate::db::Stores;

    fn address() -> AddressInput {
        AddressInput {
            kind: AddressKind::Shipping,
            first_name: "Sam".into(),
            last_name: "Reyes".into(),
            company: None,
            address_line_1: "42 Garage Way".into(),
            address_line_2: None,
            city: "Dayton".into(),
            state: "OH".into(),
            postal_code: "45402".into(),
            country: "US".into(),
            phone: None,
            is_default: true,
        }
    }

    #[tokio::test]
    async fn test_profile_created_on_demand() {
        let stores = Stores::in_memory();
        let account = AccountService::new(stores.profiles.as_ref(), stores.addresses.as_ref());
        let user = UserId::generate();

        let profile = account.profile(user).await.unwrap();
        assert_eq!(profile.id, user);
        assert_eq!(profile.first_name, None);
    }

    #[tokio::test]
    async fn test_update_profile_keeps_unset_fields() {
        let stores = Stores::in_memory();
        let account = AccountService::new(stores.profiles.as_ref(), stores.addresses.as_ref());
        let user = UserId::generate();

        account
            .update_profile(
                user,
                &ProfileUpdate {
                    first_name: Some("Sam".into()),
                    phone: Some("555-0100".into()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();
        let profile = account
            .update_profile(
                user,
                &ProfileUpdate {
                    last_name: Some("Reyes".into()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.first_name.as_deref(), Some("Sam"));
        assert_eq!(profile.last_name.as_deref(), Some("Reyes"));
        assert_eq!(profile.phone.as_deref(), Some("555-0100"));
    }

    #[tokio::test]
    async fn test_saved_vehicle_mirror() {
        let stores = Stores::in_memory();
        let account = AccountService::new(stores.profiles.as_ref(), stores.addresses.as_ref());
        let user = UserId::generate();
        let vehicle = Vehicle::new(2021, "Ford", "F-150", Some("5.0L V8".into()));

        account.set_saved_vehicle(user, Some(&vehicle)).await.unwrap();
        assert_eq!(account.profile(user).await.unwrap().saved_vehicle, Some(vehicle));

        account.set_saved_vehicle(user, None).await.unwrap();
        assert_eq!(account.profile(user).await.unwrap().saved_vehicle, None);
    }

    #[tokio::test]
    async fn test_blank_address_fields_rejected() {
        let stores = Stores::in_memory();
        let account = AccountService::new(stores.profiles.as_ref(), stores.addresses.as_ref());
        let mut input = address();
        input.city = "  ".into();

        let err = account
            .add_address(UserId::generate(), &input)
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::MissingFields(ref f) if f == &["city"]));
    }

    #[tokio::test]
    async fn test_address_crud() {
        let stores = Stores::in_memory();
        let account = AccountService::new(stores.profiles.as_ref(), stores.addresses.as_ref());
        let user = UserId::generate();

        let created = account.add_address(user, &address()).await.unwrap();
        let mut changed = address();
        changed.city = "Toledo".into();
        let updated = account
            .update_address(user, created.id, &changed)
            .await
            .unwrap();
        assert_eq!(updated.city, "Toledo");

        account.delete_address(user, created.id).await.unwrap();
        assert!(matches!(
            account.delete_address(user, created.id).await,
            Err(AccountError::NotFound)
        ));
        assert!(account.addresses(user).await.unwrap().is_empty());
    }
}
