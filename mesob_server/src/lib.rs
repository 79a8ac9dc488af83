//! # Mesob server
//! This module hosts the REST server for the Mesob campus food ordering service. It is responsible for:
//! Authenticating customers, restaurant staff and delivery people.
//! Accepting and pricing food orders, and collecting payment via the Chapa gateway.
//! Dispatching paid orders to delivery people and tracking hand-over to the customer.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes a small public surface (`/health`, `/auth/login`, `/customers/register`, the menu and the
//! payment webhook) and a JWT-protected `/api` scope for everything else. See [routes] for the full list.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod payment_sweeper;
pub mod payments;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
