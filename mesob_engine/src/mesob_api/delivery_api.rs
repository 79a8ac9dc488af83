use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Delivery, DeliveryPerson, DeliveryStatusType, NewDelivery, NewDeliveryPerson},
    delivery_objects::DeliveryQueryFilter,
    events::{DeliveryConfirmedEvent, EventProducers},
    traits::{DeliveryApiError, DeliveryManagement},
};

/// `DeliveryApi` assigns paid orders to delivery persons and tracks each delivery until the
/// customer confirms receipt.
pub struct DeliveryApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for DeliveryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DeliveryApi")
    }
}

impl<B> DeliveryApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> DeliveryApi<B>
where B: DeliveryManagement
{
    /// Assigns an order to a delivery person. The order must exist, be paid, the person must
    /// exist and work the order's campus, and the order must not be assigned already. The first
    /// failing check decides the error.
    pub async fn assign_order(&self, delivery: NewDelivery) -> Result<Delivery, DeliveryApiError> {
        self.db.create_delivery(delivery).await
    }

    pub async fn delivery_by_id(&self, id: i64) -> Result<Option<Delivery>, DeliveryApiError> {
        self.db.fetch_delivery(id).await
    }

    pub async fn search_deliveries(&self, query: DeliveryQueryFilter) -> Result<Vec<Delivery>, DeliveryApiError> {
        trace!("🛵️ Searching deliveries: {query}");
        self.db.search_deliveries(query).await
    }

    pub async fn update_delivery_status(&self, id: i64, status: DeliveryStatusType) -> Result<Delivery, DeliveryApiError> {
        self.db.update_delivery_status(id, status).await
    }

    /// Records the customer's confirmation of receipt and fires the delivery-confirmed hook.
    /// Confirming an already confirmed delivery is a no-op and does not fire hooks again.
    pub async fn confirm_receipt(&self, id: i64) -> Result<Delivery, DeliveryApiError> {
        let before = self.db.fetch_delivery(id).await?.ok_or(DeliveryApiError::DeliveryNotFound(id))?;
        let delivery = self.db.verify_delivery(id).await?;
        if !before.customer_verified {
            self.call_delivery_confirmed_hook(&delivery).await;
        }
        Ok(delivery)
    }

    pub async fn add_person(&self, person: NewDeliveryPerson) -> Result<DeliveryPerson, DeliveryApiError> {
        self.db.insert_delivery_person(person).await
    }

    pub async fn person_by_id(&self, id: i64) -> Result<Option<DeliveryPerson>, DeliveryApiError> {
        self.db.fetch_delivery_person(id).await
    }

    pub async fn persons(&self) -> Result<Vec<DeliveryPerson>, DeliveryApiError> {
        self.db.fetch_delivery_persons().await
    }

    pub async fn remove_person(&self, id: i64) -> Result<(), DeliveryApiError> {
        self.db.delete_delivery_person(id).await
    }

    async fn call_delivery_confirmed_hook(&self, delivery: &Delivery) {
        for emitter in &self.producers.delivery_confirmed_producer {
            debug!("🛵️ Notifying delivery confirmed hook subscribers");
            let event = DeliveryConfirmedEvent::new(delivery.clone());
            emitter.publish_event(event).await;
        }
    }
}
