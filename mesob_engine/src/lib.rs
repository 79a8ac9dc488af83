//! Mesob Engine
//!
//! The core logic of the campus food ordering and delivery platform. This library prices and
//! stores orders, reconciles their payments, assigns them to delivery persons, and tracks each
//! delivery until the customer confirms receipt. It is HTTP-agnostic; the server crate puts a
//! REST face on it.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@traits`] and the SQLite backend). You should never
//!    need to access the database directly. Instead, use the public API of the engine. The
//!    exception is the data types used in the database. These are defined in the `db_types`
//!    module and are public.
//! 2. The engine public API ([`mod@mesob_api`]). This provides the public-facing functionality:
//!    orders, deliveries, the menu, customers, staff and the restaurant profile. A backend needs
//!    to implement the traits in [`mod@traits`] to drive these APIs.
//!
//! The engine also emits a small set of events. For example, when an order's payment settles, an
//! `OrderPaidEvent` is fired. A simple actor framework lets you hook into these events and
//! perform custom actions.
mod mesob_api;
#[cfg(feature = "sqlite")]
mod sqlite;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteDatabase, MIGRATOR};
pub use mesob_api::{
    auth_api::AuthApi,
    customer_api::CustomerApi,
    delivery_api::DeliveryApi,
    delivery_objects,
    menu_api::MenuApi,
    order_flow_api::OrderFlowApi,
    order_objects,
    restaurant_api::RestaurantApi,
    staff_api::StaffApi,
};
