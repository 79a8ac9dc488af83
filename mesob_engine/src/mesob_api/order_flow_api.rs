use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderItem, OrderStatusType, PaymentStatusType},
    events::{EventProducers, OrderPaidEvent},
    order_objects::OrderQueryFilter,
    traits::{OrderApiError, OrderManagement},
};

/// `OrderFlowApi` is the primary API for creating orders and walking them through the payment
/// and fulfilment lifecycle.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement
{
    /// Submit a new order.
    ///
    /// The order is priced against the menu and stored atomically with its line items. A cash
    /// order settles on the spot, so the order-paid hook fires before this method returns.
    pub async fn place_order(&self, order: NewOrder) -> Result<(Order, Vec<OrderItem>), OrderApiError> {
        let (order, items) = self.db.create_order(order).await?;
        if order.is_paid() {
            self.call_order_paid_hook(&order).await;
        }
        debug!("🔄️📦️ Order {} placed. {} line(s), paying by {}", order.id, items.len(), order.payment_method);
        Ok((order, items))
    }

    pub async fn order_by_id(&self, id: i64) -> Result<Option<Order>, OrderApiError> {
        self.db.fetch_order(id).await
    }

    pub async fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderApiError> {
        self.db.fetch_order_items(order_id).await
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderApiError> {
        trace!("🔄️📦️ Searching orders: {query}");
        self.db.search_orders(query).await
    }

    /// The given customer's orders, newest first.
    pub async fn orders_for_customer(&self, customer_id: i64) -> Result<Vec<Order>, OrderApiError> {
        let query = OrderQueryFilter::default().with_customer_id(customer_id).newest_first();
        self.db.search_orders(query).await
    }

    /// Moves the order to the given status. No transition checks are applied; staff use this to
    /// move orders backwards as well as forwards.
    pub async fn update_order_status(&self, id: i64, status: OrderStatusType) -> Result<Order, OrderApiError> {
        self.db.update_order_status(id, status).await
    }

    /// Records the transaction reference handed to the payment gateway for this order.
    pub async fn attach_payment_reference(&self, id: i64, reference: &str) -> Result<Order, OrderApiError> {
        self.db.set_payment_reference(id, reference).await
    }

    pub async fn order_by_reference(&self, reference: &str) -> Result<Option<Order>, OrderApiError> {
        self.db.fetch_order_by_reference(reference).await
    }

    /// Settles the payment for the order carrying this gateway reference.
    ///
    /// An unknown reference is quietly ignored and `None` is returned, since gateways retry
    /// callbacks and send callbacks for transactions that are not ours. An order whose payment
    /// has already settled is returned as-is without firing hooks a second time.
    pub async fn settle_by_reference(
        &self,
        reference: &str,
        status: PaymentStatusType,
    ) -> Result<Option<Order>, OrderApiError> {
        let Some(order) = self.db.fetch_order_by_reference(reference).await? else {
            info!("🔄️💳️ Ignoring settlement callback for unknown reference [{reference}]");
            return Ok(None);
        };
        if order.is_paid() {
            trace!("🔄️💳️ Order {} has already settled. Nothing to do.", order.id);
            return Ok(Some(order));
        }
        let order = self.settle_order(order.id, status).await?;
        Ok(Some(order))
    }

    /// Settles the payment for an order and fires the order-paid hook.
    pub async fn settle_order(&self, id: i64, status: PaymentStatusType) -> Result<Order, OrderApiError> {
        let order = self.db.settle_order_payment(id, status).await?;
        info!("🔄️💳️ Payment of {} for order {} settled as {status}", order.total_price, order.id);
        self.call_order_paid_hook(&order).await;
        Ok(order)
    }

    pub async fn mark_payment_failed(&self, id: i64) -> Result<Order, OrderApiError> {
        let order = self.db.mark_payment_failed(id).await?;
        info!("🔄️💳️ Payment for order {} marked as failed", order.id);
        Ok(order)
    }

    async fn call_order_paid_hook(&self, order: &Order) {
        for emitter in &self.producers.order_paid_producer {
            debug!("🔄️💳️ Notifying order paid hook subscribers");
            let event = OrderPaidEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }
}
