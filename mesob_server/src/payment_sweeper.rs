//! Background reconciliation of gateway payments.
//!
//! Chapa notifies us of completed payments via the webhook, but callbacks get lost: the server might be down, or
//! the customer closes the checkout page before the redirect. The sweeper periodically re-checks every pending
//! gateway order that has a transaction reference, so a paid order reaches the kitchen even when the callback
//! never arrives.

use chapa_tools::ChapaApi;
use chrono::Duration;
use log::*;
use mesob_engine::{
    db_types::{PaymentMethod, PaymentStatusType},
    events::EventProducers,
    order_objects::OrderQueryFilter,
    OrderFlowApi,
    SqliteDatabase,
};
use tokio::task::JoinHandle;

use crate::payments::{verify_and_settle, SettlementOutcome};

/// Starts the payment sweeper. Do not await the returned JoinHandle, as it will run indefinitely.
pub fn start_payment_sweeper(
    db: SqliteDatabase,
    gateway: ChapaApi,
    producers: EventProducers,
    interval: Duration,
) -> JoinHandle<()> {
    let period = std::time::Duration::from_secs(interval.num_seconds().max(1) as u64);
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(period);
        let api = OrderFlowApi::new(db, producers);
        info!("🕰️ Payment sweeper started. Sweeping every {}s", period.as_secs());
        loop {
            timer.tick().await;
            debug!("🕰️ Running payment sweep");
            match sweep_pending_payments(&api, &gateway).await {
                Ok((settled, failed, pending)) => {
                    if settled + failed > 0 {
                        info!("🕰️ Payment sweep settled {settled} and failed {failed} orders ({pending} still pending)");
                    } else {
                        debug!("🕰️ Payment sweep found nothing to settle ({pending} still pending)");
                    }
                },
                Err(e) => {
                    error!("🕰️ Error running payment sweep: {e}");
                },
            }
        }
    })
}

/// One sweep pass. Returns (settled, failed, still pending) counts.
///
/// A failure against one order does not stop the sweep; the order is logged and retried on the next pass.
async fn sweep_pending_payments(
    api: &OrderFlowApi<SqliteDatabase>,
    gateway: &ChapaApi,
) -> Result<(usize, usize, usize), crate::errors::ServerError> {
    let filter = OrderQueryFilter::default()
        .with_payment_status(PaymentStatusType::Pending)
        .with_payment_method(PaymentMethod::Chapa)
        .with_reference_only();
    let orders = api.search_orders(filter).await?;
    let mut settled = 0usize;
    let mut failed = 0usize;
    let mut pending = 0usize;
    for order in orders {
        let Some(tx_ref) = order.payment_ref.clone() else {
            continue;
        };
        match verify_and_settle(api, gateway, &tx_ref, PaymentStatusType::Success).await {
            Ok(SettlementOutcome::Settled(order)) => {
                info!("🕰️ Sweeper settled the payment for order {}", order.id);
                settled += 1;
            },
            Ok(SettlementOutcome::Failed(order)) => {
                info!("🕰️ Sweeper recorded a failed payment for order {}", order.id);
                failed += 1;
            },
            Ok(SettlementOutcome::StillPending) | Ok(SettlementOutcome::Unknown) => {
                pending += 1;
            },
            Err(e) => {
                warn!("🕰️ Could not verify payment [{tx_ref}] for order {}. {e}", order.id);
                pending += 1;
            },
        }
    }
    Ok((settled, failed, pending))
}
