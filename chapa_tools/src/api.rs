use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    config::GatewayConfig,
    data_objects::{CheckoutSession, NewPayment, PaymentVerification},
    GatewayApiError,
};

#[derive(Clone)]
pub struct ChapaApi {
    config: GatewayConfig,
    client: Arc<Client>,
}

impl ChapaApi {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let mut val = HeaderValue::from_str(&bearer).map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, GatewayApiError> {
        let url = self.url(path);
        trace!("💳️ Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| GatewayApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| GatewayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayApiError::RestResponseError(e.to_string()))?;
            Err(GatewayApiError::QueryError { status, message })
        }
    }

    /// Chapa wraps every response in `{message, status, data}`. Anything but a "success" status
    /// is a decline, and the message says why.
    fn unwrap_envelope(response: Value) -> Result<Value, GatewayApiError> {
        match response["status"].as_str() {
            Some("success") => Ok(response["data"].clone()),
            _ => {
                let message = match &response["message"] {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Err(GatewayApiError::Declined(message))
            },
        }
    }

    /// Registers a payment with Chapa and returns the checkout URL to send the customer to.
    /// The per-payment callback URL is the configured base with the transaction reference
    /// appended, so the webhook route can identify the order without parsing the body.
    pub async fn initialize_payment(&self, payment: &NewPayment) -> Result<CheckoutSession, GatewayApiError> {
        let callback_url = format!("{}/{}", self.config.callback_url.trim_end_matches('/'), payment.tx_ref);
        let mut body = serde_json::json!({
            "amount": payment.amount.to_decimal_string(),
            "currency": "ETB",
            "email": payment.email,
            "first_name": payment.first_name,
            "last_name": payment.last_name,
            "tx_ref": payment.tx_ref,
            "callback_url": callback_url,
        });
        if let Some(return_url) = &self.config.return_url {
            body["return_url"] = Value::String(return_url.clone());
        }
        debug!("💳️ Initializing payment {} for {}", payment.tx_ref, payment.amount);
        let response = self.rest_query::<Value, Value>(Method::POST, "/transaction/initialize", Some(body)).await?;
        let data = Self::unwrap_envelope(response)?;
        let checkout_url = data["checkout_url"]
            .as_str()
            .ok_or_else(|| GatewayApiError::JsonError("'checkout_url' does not exist in response".to_string()))?
            .to_string();
        info!("💳️ Payment {} initialized", payment.tx_ref);
        Ok(CheckoutSession { tx_ref: payment.tx_ref.clone(), checkout_url })
    }

    /// Asks Chapa what became of a transaction reference.
    pub async fn verify_payment(&self, tx_ref: &str) -> Result<PaymentVerification, GatewayApiError> {
        let path = format!("/transaction/verify/{tx_ref}");
        debug!("💳️ Verifying payment {tx_ref}");
        let response = self.rest_query::<Value, ()>(Method::GET, &path, None).await?;
        let data = Self::unwrap_envelope(response)?;
        let verification = PaymentVerification::from_response(&data)?;
        info!("💳️ Payment {tx_ref} is {} at the gateway", verification.status);
        Ok(verification)
    }
}
