//! # Order engine public API
//!
//! The `mesob_api` module exposes the programmatic API of the order engine.
//! The API is modular, so that clients can pick and choose the functionality they want, and
//! different parts (say orders and auth) could even run against different backends.
//!
//! * [`order_flow_api`] is the primary API for creating orders and walking them through the
//!   payment and fulfilment lifecycle.
//! * [`delivery_api`] assigns paid orders to delivery persons and tracks deliveries.
//! * [`menu_api`] maintains the menu that orders are priced against.
//! * [`customer_api`] covers registration, saved carts and the order history view.
//! * [`staff_api`] manages admin and restaurant owner accounts.
//! * [`auth_api`] hands stored credentials to the server's login flow.
//! * [`restaurant_api`] maintains the restaurant profile shown to customers.
//!
//! # API usage
//!
//! The pattern for using all the APIs is the same. An API instance is created by supplying a
//! database backend that implements the specific backend traits required by the API.
//!
//! For example, to query the menu:
//!
//! ```rust,ignore
//! use mesob_engine::{MenuApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements MenuManagement
//! let api = MenuApi::new(db);
//! let menu = api.items(true).await?;
//! ```

pub mod auth_api;
pub mod customer_api;
pub mod delivery_api;
pub mod delivery_objects;
pub mod menu_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod restaurant_api;
pub mod staff_api;
