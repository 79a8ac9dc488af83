use thiserror::Error;

use crate::db_types::{NewRestaurant, Restaurant};

#[derive(Debug, Clone, Error)]
pub enum RestaurantApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The restaurant profile has not been set up yet")]
    ProfileNotSetUp,
    #[error("The restaurant profile already exists")]
    ProfileAlreadyExists,
}

impl From<sqlx::Error> for RestaurantApiError {
    fn from(e: sqlx::Error) -> Self {
        RestaurantApiError::DatabaseError(e.to_string())
    }
}

/// The single restaurant profile. The platform serves one restaurant, and the table behind this
/// trait is pinned to a single row, so `create` can fail with [`ProfileAlreadyExists`] while
/// `upsert` always succeeds.
///
/// [`ProfileAlreadyExists`]: RestaurantApiError::ProfileAlreadyExists
#[allow(async_fn_in_trait)]
pub trait RestaurantManagement {
    async fn create_restaurant_profile(&self, profile: NewRestaurant) -> Result<Restaurant, RestaurantApiError>;

    async fn fetch_restaurant_profile(&self) -> Result<Option<Restaurant>, RestaurantApiError>;

    /// Replaces the profile, creating it if it does not exist yet.
    async fn upsert_restaurant_profile(&self, profile: NewRestaurant) -> Result<Restaurant, RestaurantApiError>;
}
