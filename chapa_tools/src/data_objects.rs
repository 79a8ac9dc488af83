use std::fmt::Display;

use mesob_common::Birr;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{helpers::parse_birr_price, GatewayApiError};

/// A payment the server wants the gateway to collect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub amount: Birr,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub tx_ref: String,
}

/// The gateway's answer to a successful initialization. The customer completes the payment at
/// `checkout_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub tx_ref: String,
    pub checkout_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GatewayPaymentStatus {
    Pending,
    Success,
    Failed,
}

impl Display for GatewayPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayPaymentStatus::Pending => write!(f, "pending"),
            GatewayPaymentStatus::Success => write!(f, "success"),
            GatewayPaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// What the gateway knows about a transaction reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub tx_ref: String,
    /// Chapa's own reference for the transaction, when one was assigned.
    pub reference: Option<String>,
    pub status: GatewayPaymentStatus,
    pub amount: Birr,
    pub currency: String,
}

impl PaymentVerification {
    /// Chapa's verify payload mixes strings and numbers, so it is picked apart by hand.
    pub fn from_response(data: &Value) -> Result<Self, GatewayApiError> {
        let tx_ref = data["tx_ref"]
            .as_str()
            .ok_or_else(|| GatewayApiError::JsonError("'tx_ref' does not exist in response".to_string()))?
            .to_string();
        let reference = data["reference"].as_str().map(|s| s.to_string());
        let status = match data["status"].as_str() {
            Some("success") => GatewayPaymentStatus::Success,
            Some("pending") => GatewayPaymentStatus::Pending,
            Some("failed") => GatewayPaymentStatus::Failed,
            Some(other) => {
                return Err(GatewayApiError::JsonError(format!("Unknown payment status '{other}' in response")))
            },
            None => return Err(GatewayApiError::JsonError("'status' does not exist in response".to_string())),
        };
        let amount = match &data["amount"] {
            Value::String(s) => parse_birr_price(s)?,
            Value::Number(n) => {
                let v = n
                    .as_f64()
                    .ok_or_else(|| GatewayApiError::InvalidCurrencyAmount(format!("Invalid amount: {n}")))?;
                #[allow(clippy::cast_possible_truncation)]
                Birr::from((v * 100.0).round() as i64)
            },
            other => return Err(GatewayApiError::JsonError(format!("Invalid 'amount' in response: {other}"))),
        };
        let currency = data["currency"]
            .as_str()
            .ok_or_else(|| GatewayApiError::JsonError("'currency' does not exist in response".to_string()))?
            .to_string();
        Ok(Self { tx_ref, reference, status, amount, currency })
    }
}
