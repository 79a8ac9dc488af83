use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Campus, DeliveryStatusType},
    helpers::{day_bounds, hour_bounds},
    traits::DeliveryApiError,
};

/// A conjunction of optional filters over deliveries. Every filter that is set must hold.
/// Results are always newest-first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DeliveryQueryFilter {
    pub delivery_person_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub order_id: Option<i64>,
    pub campus: Option<Campus>,
    pub status: Option<DeliveryStatusType>,
    pub verified: Option<bool>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DeliveryQueryFilter {
    pub fn for_person(mut self, delivery_person_id: i64) -> Self {
        self.delivery_person_id = Some(delivery_person_id);
        self
    }

    pub fn for_customer(mut self, customer_id: i64) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn for_order(mut self, order_id: i64) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn on_campus(mut self, campus: Campus) -> Self {
        self.campus = Some(campus);
        self
    }

    pub fn with_status(mut self, status: DeliveryStatusType) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = Some(verified);
        self
    }

    pub fn since<T>(mut self, since: T) -> Result<Self, DeliveryApiError>
    where
        T: TryInto<DateTime<Utc>>,
        T::Error: Display,
    {
        let dt = since.try_into().map_err(|e| DeliveryApiError::QueryError(e.to_string()))?;
        self.since = Some(dt);
        Ok(self)
    }

    pub fn until<T>(mut self, until: T) -> Result<Self, DeliveryApiError>
    where
        T: TryInto<DateTime<Utc>>,
        T::Error: Display,
    {
        let dt = until.try_into().map_err(|e| DeliveryApiError::QueryError(e.to_string()))?;
        self.until = Some(dt);
        Ok(self)
    }

    /// Restricts to deliveries created on the given calendar day, UTC.
    pub fn on_day(mut self, day: NaiveDate) -> Self {
        let (start, end) = day_bounds(day);
        self.since = Some(start);
        self.until = Some(end);
        self
    }

    /// Restricts to deliveries created in one hour of the given day, UTC.
    pub fn in_hour(mut self, day: NaiveDate, hour: u32) -> Self {
        let (start, end) = hour_bounds(day, hour);
        self.since = Some(start);
        self.until = Some(end);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.delivery_person_id.is_none() &&
            self.customer_id.is_none() &&
            self.order_id.is_none() &&
            self.campus.is_none() &&
            self.status.is_none() &&
            self.verified.is_none() &&
            self.since.is_none() &&
            self.until.is_none()
    }
}

impl Display for DeliveryQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "No filters.")?;
            return Ok(());
        }
        if let Some(person) = &self.delivery_person_id {
            write!(f, "delivery_person_id: {person}. ")?;
        }
        if let Some(customer_id) = &self.customer_id {
            write!(f, "customer_id: {customer_id}. ")?;
        }
        if let Some(order_id) = &self.order_id {
            write!(f, "order_id: {order_id}. ")?;
        }
        if let Some(campus) = &self.campus {
            write!(f, "campus: {campus}. ")?;
        }
        if let Some(status) = &self.status {
            write!(f, "status: {status}. ")?;
        }
        if let Some(verified) = &self.verified {
            write!(f, "verified: {verified}. ")?;
        }
        if let Some(since) = &self.since {
            write!(f, "since {since}. ")?;
        }
        if let Some(until) = &self.until {
            write!(f, "until {until}. ")?;
        }
        Ok(())
    }
}
