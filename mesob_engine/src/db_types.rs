use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use mesob_common::Birr;
use serde::{Deserialize, Serialize};
// Re-exported so API clients can build `MenuItem` and `Restaurant` values without a direct sqlx dependency.
pub use sqlx::types::Json;
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(String);

//--------------------------------------       Campus        ---------------------------------------------------------

/// The campuses the restaurant delivers to. A delivery person works exactly one campus, and an
/// order can only be assigned to a person on the order's campus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum Campus {
    Main,
    #[sqlx(rename = "HiT")]
    #[serde(rename = "HiT")]
    Hit,
    #[sqlx(rename = "CVM")]
    #[serde(rename = "CVM")]
    Cvm,
}

impl Display for Campus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Campus::Main => write!(f, "Main"),
            Campus::Hit => write!(f, "HiT"),
            Campus::Cvm => write!(f, "CVM"),
        }
    }
}

impl FromStr for Campus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Main" => Ok(Self::Main),
            "HiT" => Ok(Self::Hit),
            "CVM" => Ok(Self::Cvm),
            s => Err(ConversionError(format!("Invalid campus: {s}"))),
        }
    }
}

//--------------------------------------   OrderStatusType     -------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum OrderStatusType {
    /// The order has been created but payment has not been confirmed yet.
    Pending,
    /// Payment has been confirmed and the kitchen is working on the order.
    InProgress,
    /// The order has been handed to a delivery person.
    Completed,
    /// The order was cancelled. Terminal.
    Cancelled,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "pending"),
            OrderStatusType::InProgress => write!(f, "inProgress"),
            OrderStatusType::Completed => write!(f, "completed"),
            OrderStatusType::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "inProgress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------  PaymentStatusType    -------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum PaymentStatusType {
    /// Awaiting confirmation from the gateway.
    Pending,
    /// The gateway webhook confirmed the payment.
    Verified,
    /// The payment is settled: cash at creation, or confirmed by the periodic sweep.
    Success,
    /// Gateway initialization or verification failed.
    Failed,
}

impl Display for PaymentStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatusType::Pending => write!(f, "pending"),
            PaymentStatusType::Verified => write!(f, "verified"),
            PaymentStatusType::Success => write!(f, "success"),
            PaymentStatusType::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for PaymentStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------    PaymentMethod      -------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethod {
    Chapa,
    SantimPay,
    Cash,
}

impl PaymentMethod {
    /// Cash settles at order creation; every other method goes through the gateway.
    pub fn uses_gateway(&self) -> bool {
        !matches!(self, PaymentMethod::Cash)
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Chapa => write!(f, "chapa"),
            PaymentMethod::SantimPay => write!(f, "santimPay"),
            PaymentMethod::Cash => write!(f, "cash"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chapa" => Ok(Self::Chapa),
            "santimPay" => Ok(Self::SantimPay),
            "cash" => Ok(Self::Cash),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------  DeliveryStatusType   -------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum DeliveryStatusType {
    Pending,
    InProgress,
    Delivered,
}

impl Display for DeliveryStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatusType::Pending => write!(f, "pending"),
            DeliveryStatusType::InProgress => write!(f, "inProgress"),
            DeliveryStatusType::Delivered => write!(f, "delivered"),
        }
    }
}

impl FromStr for DeliveryStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "inProgress" => Ok(Self::InProgress),
            "delivered" => Ok(Self::Delivered),
            s => Err(ConversionError(format!("Invalid delivery status: {s}"))),
        }
    }
}

//--------------------------------------        Role           -------------------------------------------------------

/// The user roles known to the server. A user holds exactly one role; `Admin` passes every
/// access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Admin,
    RestaurantOwner,
    DeliveryPerson,
    Customer,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::RestaurantOwner => write!(f, "restaurantOwner"),
            Role::DeliveryPerson => write!(f, "deliveryPerson"),
            Role::Customer => write!(f, "customer"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "restaurantOwner" => Ok(Self::RestaurantOwner),
            "deliveryPerson" => Ok(Self::DeliveryPerson),
            "customer" => Ok(Self::Customer),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------        Order          -------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub total_price: Birr,
    pub status: OrderStatusType,
    pub payment_status: PaymentStatusType,
    pub payment_method: PaymentMethod,
    pub payment_ref: Option<String>,
    pub campus: Campus,
    pub building: String,
    pub room_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// `verified` and `success` are the webhook and cash/sweep spellings of the same settled
    /// fact. Delivery assignment accepts either.
    pub fn is_paid(&self) -> bool {
        matches!(self.payment_status, PaymentStatusType::Verified | PaymentStatusType::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    /// Name of the menu item at the time of purchase.
    pub name: String,
    /// Unit price at the time of purchase. Later menu edits never touch this.
    pub price_at_purchase: Birr,
    pub quantity: i64,
}

//--------------------------------------       NewOrder        -------------------------------------------------------

/// A not-yet-priced order request. Pricing and name snapshots happen against the menu inside
/// the same transaction that stores the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_id: i64,
    pub items: Vec<OrderItemRequest>,
    pub campus: Campus,
    pub building: String,
    pub room_number: String,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub menu_item_id: i64,
    pub quantity: i64,
}

//--------------------------------------       Delivery        -------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub id: i64,
    pub order_id: i64,
    pub delivery_person_id: i64,
    pub customer_id: i64,
    pub status: DeliveryStatusType,
    pub customer_verified: bool,
    /// Stamped once, on the transition to `delivered`.
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDelivery {
    pub order_id: i64,
    pub delivery_person_id: i64,
}

//--------------------------------------    DeliveryPerson     -------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPerson {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub campus: Campus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeliveryPerson {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub campus: Campus,
}

//--------------------------------------       MenuItem        -------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Birr,
    pub available: bool,
    pub category: Json<Vec<String>>,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMenuItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Birr,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub image_url: String,
}

fn default_available() -> bool {
    true
}

/// A partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Birr>,
    pub available: Option<bool>,
    pub category: Option<Vec<String>>,
    pub image_url: Option<String>,
}

impl MenuItemUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() &&
            self.description.is_none() &&
            self.price.is_none() &&
            self.available.is_none() &&
            self.category.is_none() &&
            self.image_url.is_none()
    }
}

//--------------------------------------       Customer        -------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub campus: Campus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub campus: Campus,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: i64,
    pub customer_id: i64,
    pub menu_item_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    pub menu_item_id: i64,
    pub quantity: i64,
}

/// One row of the denormalised per-customer order summary.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistoryEntry {
    pub id: i64,
    pub customer_id: i64,
    pub order_id: i64,
    pub total_price: Birr,
    pub status: OrderStatusType,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      Restaurant       -------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub opening_hours: String,
    pub phone: String,
    pub email: String,
    pub social_links: Json<Vec<String>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRestaurant {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub opening_hours: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub social_links: Vec<String>,
}

//--------------------------------------        Staff          -------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStaff {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

//--------------------------------------     Credentials       -------------------------------------------------------

/// The stored login record for any account type. The password hash never leaves the auth flow.
#[derive(Debug, Clone, FromRow)]
pub struct Credentials {
    pub id: i64,
    pub name: String,
    pub password_hash: String,
}
