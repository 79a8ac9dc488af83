//! Gateway payment orchestration.
//!
//! The engine stores and settles orders; the Chapa client talks to the gateway. This module joins the two: it
//! starts checkouts for pending orders and turns gateway verification results into settlements. Both the payment
//! webhook and the background sweeper funnel through [`verify_and_settle`], so an order can never settle off the
//! back of a gateway reference that the gateway has not confirmed.

use chapa_tools::{new_tx_ref, GatewayPaymentStatus, NewPayment, PaymentGateway};
use log::*;
use mesob_engine::{
    db_types::{Order, OrderStatusType, PaymentMethod, PaymentStatusType},
    traits::{CustomerManagement, OrderManagement},
    CustomerApi,
    OrderFlowApi,
};

use crate::{data_objects::PaymentInitiated, errors::ServerError};

/// What a verification attempt concluded. `Unknown` covers references that do not belong to any order.
#[derive(Debug, Clone)]
pub enum SettlementOutcome {
    Settled(Order),
    StillPending,
    Failed(Order),
    Unknown,
}

/// Creates a gateway checkout session for a pending order.
///
/// The order must belong to the calling customer, still be pending, and carry a gateway payment method. A fresh
/// transaction reference is written to the order before the gateway is contacted, so a callback can always be
/// matched back to the order, even if this request then fails. When the gateway refuses, the order's payment is
/// marked failed before the error is returned; the order itself stays pending so the checkout can be retried.
///
/// Returns the order as updated with its new payment reference, alongside the checkout session.
pub async fn start_gateway_payment<B, C, G>(
    orders: &OrderFlowApi<B>,
    customers: &CustomerApi<C>,
    gateway: &G,
    order_id: i64,
    customer_id: i64,
) -> Result<(Order, PaymentInitiated), ServerError>
where
    B: OrderManagement,
    C: CustomerManagement,
    G: PaymentGateway,
{
    let order = orders
        .order_by_id(order_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No order with id {order_id}")))?;
    if order.customer_id != customer_id {
        return Err(ServerError::InsufficientPermissions("This order belongs to another customer.".to_string()));
    }
    if order.status != OrderStatusType::Pending {
        return Err(ServerError::Conflict(format!("Order {order_id} is {} and cannot start a checkout", order.status)));
    }
    match order.payment_method {
        PaymentMethod::Chapa => {},
        // TODO: route santimPay initialization here once the SantimPay client lands
        PaymentMethod::SantimPay => {
            return Err(ServerError::InvalidRequestBody(
                "SantimPay checkouts are not available yet. Choose chapa or cash.".to_string(),
            ))
        },
        PaymentMethod::Cash => {
            return Err(ServerError::InvalidRequestBody(
                "Cash orders are paid on delivery and have no checkout".to_string(),
            ))
        },
    }
    let customer = customers
        .customer_by_id(customer_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No customer with id {customer_id}")))?;
    let tx_ref = new_tx_ref(order.id);
    let order = orders.attach_payment_reference(order.id, &tx_ref).await?;
    let mut names = customer.name.splitn(2, ' ');
    let first_name = names.next().unwrap_or("").to_string();
    let last_name = names.next().unwrap_or("").to_string();
    let payment =
        NewPayment { amount: order.total_price, email: customer.email, first_name, last_name, tx_ref };
    let session = match gateway.initialize_payment(&payment).await {
        Ok(session) => session,
        Err(e) => {
            warn!("💳️ The gateway did not accept the checkout for order {}. {e}", order.id);
            if let Err(db) = orders.mark_payment_failed(order.id).await {
                error!("💳️ Could not record the failed payment on order {}. {db}", order.id);
            }
            return Err(e.into());
        },
    };
    info!("💳️ Checkout created for order {} [{}]", order.id, session.tx_ref);
    let initiated = PaymentInitiated { order_id: order.id, tx_ref: session.tx_ref, checkout_url: session.checkout_url };
    Ok((order, initiated))
}

/// Asks the gateway what became of the transaction behind `tx_ref` and settles the order accordingly.
///
/// A confirmed payment settles the order's payment as `settle_as` (the webhook and the sweeper record different
/// statuses so it stays visible which path settled an order). A failed payment is recorded as failed but leaves
/// the order open for another attempt. Anything else is left alone.
pub async fn verify_and_settle<B, G>(
    orders: &OrderFlowApi<B>,
    gateway: &G,
    tx_ref: &str,
    settle_as: PaymentStatusType,
) -> Result<SettlementOutcome, ServerError>
where
    B: OrderManagement,
    G: PaymentGateway,
{
    let verification = gateway.verify_payment(tx_ref).await?;
    let outcome = match verification.status {
        GatewayPaymentStatus::Success => match orders.settle_by_reference(tx_ref, settle_as).await? {
            Some(order) => SettlementOutcome::Settled(order),
            None => SettlementOutcome::Unknown,
        },
        GatewayPaymentStatus::Pending => {
            debug!("💳️ Payment [{tx_ref}] has not completed yet");
            SettlementOutcome::StillPending
        },
        GatewayPaymentStatus::Failed => match orders.order_by_reference(tx_ref).await? {
            Some(order) => {
                let order = orders.mark_payment_failed(order.id).await?;
                SettlementOutcome::Failed(order)
            },
            None => SettlementOutcome::Unknown,
        },
    };
    Ok(outcome)
}
