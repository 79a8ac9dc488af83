use log::*;
use mesob_common::Secret;

#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    pub api_url: String,
    pub secret_key: Secret<String>,
    /// Base URL for payment callbacks. The transaction reference is appended per payment.
    pub callback_url: String,
    pub return_url: Option<String>,
}

impl GatewayConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("MESOB_CHAPA_API_URL").unwrap_or_else(|_| {
            warn!("🪛️ MESOB_CHAPA_API_URL not set, using https://api.chapa.co/v1 as default");
            "https://api.chapa.co/v1".to_string()
        });
        let secret_key = Secret::new(std::env::var("MESOB_CHAPA_SECRET_KEY").unwrap_or_else(|_| {
            warn!("🪛️ MESOB_CHAPA_SECRET_KEY not set, using a (probably useless) default");
            "CHASECK_TEST-00000000000000000000".to_string()
        }));
        let callback_url = std::env::var("MESOB_CHAPA_CALLBACK_URL").unwrap_or_else(|_| {
            warn!("🪛️ MESOB_CHAPA_CALLBACK_URL not set, using a localhost default. Chapa cannot reach it");
            "http://localhost:8360/payments/verify".to_string()
        });
        let return_url = std::env::var("MESOB_CHAPA_RETURN_URL").ok();
        Self { api_url, secret_key, callback_url, return_url }
    }
}
