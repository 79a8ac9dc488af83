use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::db_types::{OrderStatusType, PaymentMethod, PaymentStatusType};

/// A conjunction of optional filters over orders. Every filter that is set must hold.
///
/// Results are oldest-first by default, which suits back-office screens working through a queue.
/// Customer-facing views flip that with [`newest_first`](Self::newest_first).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct OrderQueryFilter {
    pub customer_id: Option<i64>,
    pub status: Option<Vec<OrderStatusType>>,
    pub payment_status: Option<Vec<PaymentStatusType>>,
    pub payment_method: Option<PaymentMethod>,
    /// Only match orders that carry a gateway transaction reference. Cash orders never do.
    #[serde(default)]
    pub with_reference_only: bool,
    #[serde(default)]
    pub newest_first: bool,
}

impl OrderQueryFilter {
    pub fn with_customer_id(mut self, customer_id: i64) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn with_payment_status(mut self, status: PaymentStatusType) -> Self {
        self.payment_status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    pub fn with_reference_only(mut self) -> Self {
        self.with_reference_only = true;
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.customer_id.is_none() &&
            self.status.is_none() &&
            self.payment_status.is_none() &&
            self.payment_method.is_none() &&
            !self.with_reference_only
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "No filters.")?;
            return Ok(());
        }
        if let Some(customer_id) = &self.customer_id {
            write!(f, "customer_id: {customer_id}. ")?;
        }
        if let Some(statuses) = &self.status {
            let statuses = statuses.iter().map(|s| s.to_string()).collect::<Vec<String>>().join(",");
            write!(f, "statuses: [{statuses}]. ")?;
        }
        if let Some(statuses) = &self.payment_status {
            let statuses = statuses.iter().map(|s| s.to_string()).collect::<Vec<String>>().join(",");
            write!(f, "payment statuses: [{statuses}]. ")?;
        }
        if let Some(method) = &self.payment_method {
            write!(f, "payment method: {method}. ")?;
        }
        if self.with_reference_only {
            write!(f, "with reference. ")?;
        }
        Ok(())
    }
}
