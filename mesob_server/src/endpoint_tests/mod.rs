//! Endpoint tests.
//!
//! These spin up the full actix service with the real middleware and route definitions, but mock the storage
//! backend and the payment gateway. Errors raised by the middleware surface as service errors, so the helpers
//! return `Err` for those; handler errors come back as ordinary error responses.

mod auth;
mod deliveries;
mod helpers;
mod orders;
mod payments;
