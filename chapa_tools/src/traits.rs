use crate::{
    data_objects::{CheckoutSession, NewPayment, PaymentVerification},
    ChapaApi,
    GatewayApiError,
};

/// The surface the server needs from a payment gateway. Kept small so tests can stand in a fake
/// gateway without talking to Chapa.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    async fn initialize_payment(&self, payment: &NewPayment) -> Result<CheckoutSession, GatewayApiError>;
    async fn verify_payment(&self, tx_ref: &str) -> Result<PaymentVerification, GatewayApiError>;
}

impl PaymentGateway for ChapaApi {
    async fn initialize_payment(&self, payment: &NewPayment) -> Result<CheckoutSession, GatewayApiError> {
        ChapaApi::initialize_payment(self, payment).await
    }

    async fn verify_payment(&self, tx_ref: &str) -> Result<PaymentVerification, GatewayApiError> {
        ChapaApi::verify_payment(self, tx_ref).await
    }
}
