use std::fmt::Display;

use chrono::NaiveDate;
use mesob_engine::{
    db_types::{
        Campus,
        DeliveryStatusType,
        NewCustomer,
        NewOrder,
        OrderItemRequest,
        OrderStatusType,
        PaymentMethod,
        PaymentStatusType,
        Role,
    },
    delivery_objects::DeliveryQueryFilter,
    order_objects::OrderQueryFilter,
};
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// The kind of account to log in as. The same email may exist as both a customer and a staff member.
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub id: i64,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCustomerRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub campus: Campus,
}

impl RegisterCustomerRequest {
    pub fn into_new_customer(self, password_hash: String) -> NewCustomer {
        NewCustomer { name: self.name, email: self.email, phone: self.phone, password_hash, campus: self.campus }
    }
}

/// The order payload customers submit. The customer id comes from the access token, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub campus: Campus,
    pub building: String,
    pub room_number: String,
    pub payment_method: PaymentMethod,
}

impl NewOrderRequest {
    pub fn into_new_order(self, customer_id: i64) -> NewOrder {
        NewOrder {
            customer_id,
            items: self.items,
            campus: self.campus,
            building: self.building,
            room_number: self.room_number,
            payment_method: self.payment_method,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatusType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryStatusUpdateRequest {
    pub status: DeliveryStatusType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityUpdate {
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStaffRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeliveryPersonRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub campus: Campus,
}

/// Query-string options for the public `GET /menu`. `available` accepts the usual flag spellings (1/true/yes/on).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuQuery {
    pub available: Option<String>,
}

/// Query-string filters for `GET /api/orders`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSearchQuery {
    pub customer_id: Option<i64>,
    pub status: Option<OrderStatusType>,
    pub payment_status: Option<PaymentStatusType>,
    pub payment_method: Option<PaymentMethod>,
    pub newest_first: Option<bool>,
}

impl OrderSearchQuery {
    pub fn into_filter(self) -> OrderQueryFilter {
        let mut filter = OrderQueryFilter::default();
        if let Some(id) = self.customer_id {
            filter = filter.with_customer_id(id);
        }
        if let Some(status) = self.status {
            filter = filter.with_status(status);
        }
        if let Some(status) = self.payment_status {
            filter = filter.with_payment_status(status);
        }
        if let Some(method) = self.payment_method {
            filter = filter.with_payment_method(method);
        }
        if self.newest_first.unwrap_or(false) {
            filter = filter.newest_first();
        }
        filter
    }
}

/// Query-string filters for `GET /api/deliveries`. `day` narrows to a calendar day (UTC) and `hour` to a single
/// hour of that day, so `hour` on its own is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySearchQuery {
    pub delivery_person_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub order_id: Option<i64>,
    pub campus: Option<Campus>,
    pub status: Option<DeliveryStatusType>,
    pub verified: Option<bool>,
    pub day: Option<NaiveDate>,
    pub hour: Option<u32>,
}

impl DeliverySearchQuery {
    pub fn into_filter(self) -> Result<DeliveryQueryFilter, ServerError> {
        let mut filter = DeliveryQueryFilter::default();
        if let Some(id) = self.delivery_person_id {
            filter = filter.for_person(id);
        }
        if let Some(id) = self.customer_id {
            filter = filter.for_customer(id);
        }
        if let Some(id) = self.order_id {
            filter = filter.for_order(id);
        }
        if let Some(campus) = self.campus {
            filter = filter.on_campus(campus);
        }
        if let Some(status) = self.status {
            filter = filter.with_status(status);
        }
        if let Some(verified) = self.verified {
            filter = filter.with_verified(verified);
        }
        match (self.day, self.hour) {
            (Some(day), Some(hour)) => filter = filter.in_hour(day, hour),
            (Some(day), None) => filter = filter.on_day(day),
            (None, Some(_)) => {
                return Err(ServerError::InvalidRequestBody("The hour filter requires a day filter as well".into()))
            },
            (None, None) => {},
        }
        Ok(filter)
    }
}

/// Returned from `POST /api/payments/initialize/{order_id}`. The client sends the customer to `checkout_url` to
/// complete the payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInitiated {
    pub order_id: i64,
    pub tx_ref: String,
    pub checkout_url: String,
}
