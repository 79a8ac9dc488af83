//! A thin client for the Chapa payment gateway.
//!
//! The server hands Chapa an amount and a transaction reference, sends the customer to the
//! returned checkout URL, and later asks Chapa what became of the reference. Everything else
//! (order state, retries, sweeps) is the caller's business.

mod api;
mod config;
mod error;
mod helpers;
mod traits;

mod data_objects;

pub use api::ChapaApi;
pub use config::GatewayConfig;
pub use data_objects::{CheckoutSession, GatewayPaymentStatus, NewPayment, PaymentVerification};
pub use error::GatewayApiError;
pub use helpers::{new_tx_ref, parse_birr_price};
pub use traits::PaymentGateway;
