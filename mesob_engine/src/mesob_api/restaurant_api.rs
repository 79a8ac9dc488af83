//! Unified API for the restaurant profile.

use std::fmt::Debug;

use crate::{
    db_types::{NewRestaurant, Restaurant},
    traits::{RestaurantApiError, RestaurantManagement},
};

pub struct RestaurantApi<B> {
    db: B,
}

impl<B: Debug> Debug for RestaurantApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RestaurantApi ({:?})", self.db)
    }
}

impl<B> RestaurantApi<B>
where B: RestaurantManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn create_profile(&self, profile: NewRestaurant) -> Result<Restaurant, RestaurantApiError> {
        self.db.create_restaurant_profile(profile).await
    }

    pub async fn profile(&self) -> Result<Option<Restaurant>, RestaurantApiError> {
        self.db.fetch_restaurant_profile().await
    }

    /// Replaces the profile, creating it on first use.
    pub async fn upsert_profile(&self, profile: NewRestaurant) -> Result<Restaurant, RestaurantApiError> {
        self.db.upsert_restaurant_profile(profile).await
    }
}
