use crate::db_types::{Delivery, Order};

/// Fired whenever an order's payment settles, whether by cash at the counter, the gateway
/// webhook, or the background sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPaidEvent {
    pub order: Order,
}

impl OrderPaidEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Fired when a customer confirms receipt of their delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfirmedEvent {
    pub delivery: Delivery,
}

impl DeliveryConfirmedEvent {
    pub fn new(delivery: Delivery) -> Self {
        Self { delivery }
    }
}
