//! # Database management and control.
//!
//! This module defines the interface contracts that storage *backends* of the order engine must
//! honour. The server and the API wrappers are written against these traits, never against a
//! concrete database.
//!
//! * [`OrderManagement`] creates orders and drives the order lifecycle.
//! * [`DeliveryManagement`] assigns paid orders to delivery persons and tracks deliveries.
//! * [`MenuManagement`] maintains the menu that orders are priced against.
//! * [`CustomerManagement`] covers registration, saved carts and the order history view.
//! * [`StaffManagement`] manages admin and restaurant owner accounts.
//! * [`AuthManagement`] hands login credentials to the server's auth layer.
//! * [`RestaurantManagement`] maintains the single restaurant profile.
//!
//! Each trait carries its own error enum so that callers can match on exactly the failures that
//! operation can produce.
mod auth_management;
mod customer_management;
mod delivery_management;
mod menu_management;
mod order_management;
mod restaurant_management;
mod staff_management;

pub use auth_management::{AuthApiError, AuthManagement};
pub use customer_management::{CustomerApiError, CustomerManagement};
pub use delivery_management::{DeliveryApiError, DeliveryManagement};
pub use menu_management::{MenuApiError, MenuManagement};
pub use order_management::{OrderApiError, OrderManagement};
pub use restaurant_management::{RestaurantApiError, RestaurantManagement};
pub use staff_management::{StaffApiError, StaffManagement};
