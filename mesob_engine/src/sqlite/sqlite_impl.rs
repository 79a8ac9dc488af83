//! `SqliteDatabase` is a concrete implementation of an order engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the
//! [`traits`](crate::traits) module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{auth, customers, db_url, deliveries, delivery_persons, history, menu, new_pool, orders, restaurant, staff};
use crate::{
    db_types::{
        CartItem,
        CartItemRequest,
        Credentials,
        Customer,
        Delivery,
        DeliveryPerson,
        DeliveryStatusType,
        MenuItem,
        MenuItemUpdate,
        NewCustomer,
        NewDelivery,
        NewDeliveryPerson,
        NewMenuItem,
        NewOrder,
        NewRestaurant,
        NewStaff,
        Order,
        OrderHistoryEntry,
        OrderItem,
        OrderStatusType,
        PaymentStatusType,
        Restaurant,
        Role,
        Staff,
    },
    delivery_objects::DeliveryQueryFilter,
    order_objects::OrderQueryFilter,
    traits::{
        AuthApiError,
        AuthManagement,
        CustomerApiError,
        CustomerManagement,
        DeliveryApiError,
        DeliveryManagement,
        MenuApiError,
        MenuManagement,
        OrderApiError,
        OrderManagement,
        RestaurantApiError,
        RestaurantManagement,
        StaffApiError,
        StaffManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Refreshes the customer's history row for this order. Best-effort: the history is a
    /// rebuildable projection, so a failure here must never undo the write that triggered it.
    async fn sync_history(&self, order: &Order) {
        let result = match self.pool.acquire().await {
            Ok(mut conn) => history::upsert_from_order(order, &mut conn).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!("🗃️ Could not refresh order history for order {}. Rebuild it when convenient. {e}", order.id);
        }
    }
}

impl OrderManagement for SqliteDatabase {
    async fn create_order(&self, order: NewOrder) -> Result<(Order, Vec<OrderItem>), OrderApiError> {
        let mut tx = self.pool.begin().await?;
        let (new_order, items) = orders::create_full_order(order, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order {} has been saved in the DB", new_order.id);
        self.sync_history(&new_order).await;
        Ok((new_order, items))
    }

    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::fetch_order_items(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }

    async fn update_order_status(&self, id: i64, status: OrderStatusType) -> Result<Order, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_order_status(id, status, &mut conn).await?;
        debug!("🗃️ Order {id} status set to {status}");
        self.sync_history(&order).await;
        Ok(order)
    }

    async fn set_payment_reference(&self, id: i64, reference: &str) -> Result<Order, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::set_payment_reference(id, reference, &mut conn).await?;
        debug!("🗃️ Order {id} linked to payment reference {reference}");
        Ok(order)
    }

    async fn fetch_order_by_reference(&self, reference: &str) -> Result<Option<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_reference(reference, &mut conn).await?;
        Ok(order)
    }

    async fn settle_order_payment(&self, id: i64, status: PaymentStatusType) -> Result<Order, OrderApiError> {
        let mut tx = self.pool.begin().await?;
        let mut order = orders::set_payment_status(id, status, &mut tx).await?;
        if order.status == OrderStatusType::Pending {
            order = orders::update_order_status(id, OrderStatusType::InProgress, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Payment for order {id} settled as {status}");
        self.sync_history(&order).await;
        Ok(order)
    }

    async fn mark_payment_failed(&self, id: i64) -> Result<Order, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::set_payment_status(id, PaymentStatusType::Failed, &mut conn).await?;
        debug!("🗃️ Payment for order {id} marked as failed");
        Ok(order)
    }
}

impl DeliveryManagement for SqliteDatabase {
    async fn create_delivery(&self, delivery: NewDelivery) -> Result<Delivery, DeliveryApiError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order(delivery.order_id, &mut tx)
            .await?
            .ok_or(DeliveryApiError::OrderNotFound(delivery.order_id))?;
        if !order.is_paid() || order.status != OrderStatusType::InProgress {
            return Err(DeliveryApiError::OrderNotReady(order.id));
        }
        let person = delivery_persons::fetch_delivery_person(delivery.delivery_person_id, &mut tx)
            .await?
            .ok_or(DeliveryApiError::PersonNotFound(delivery.delivery_person_id))?;
        if person.campus != order.campus {
            return Err(DeliveryApiError::CampusMismatch { order: order.campus, person: person.campus });
        }
        if deliveries::fetch_delivery_for_order(order.id, &mut tx).await?.is_some() {
            return Err(DeliveryApiError::AlreadyAssigned(order.id));
        }
        let new_delivery = deliveries::insert_delivery(delivery, order.customer_id, &mut tx).await?;
        // The kitchen's part is done once the order is handed over for delivery.
        let order = orders::update_order_status(order.id, OrderStatusType::Completed, &mut tx).await?;
        tx.commit().await?;
        info!("🛵️ Order {} assigned to delivery person {} on {} campus", order.id, person.id, person.campus);
        self.sync_history(&order).await;
        Ok(new_delivery)
    }

    async fn fetch_delivery(&self, id: i64) -> Result<Option<Delivery>, DeliveryApiError> {
        let mut conn = self.pool.acquire().await?;
        let delivery = deliveries::fetch_delivery(id, &mut conn).await?;
        Ok(delivery)
    }

    async fn search_deliveries(&self, query: DeliveryQueryFilter) -> Result<Vec<Delivery>, DeliveryApiError> {
        let mut conn = self.pool.acquire().await?;
        let deliveries = deliveries::search_deliveries(query, &mut conn).await?;
        Ok(deliveries)
    }

    async fn update_delivery_status(&self, id: i64, status: DeliveryStatusType) -> Result<Delivery, DeliveryApiError> {
        let mut conn = self.pool.acquire().await?;
        let delivery = deliveries::update_delivery_status(id, status, &mut conn).await?;
        debug!("🛵️ Delivery {id} status set to {status}");
        Ok(delivery)
    }

    async fn verify_delivery(&self, id: i64) -> Result<Delivery, DeliveryApiError> {
        let mut conn = self.pool.acquire().await?;
        let delivery = deliveries::fetch_delivery(id, &mut conn).await?.ok_or(DeliveryApiError::DeliveryNotFound(id))?;
        if delivery.status != DeliveryStatusType::Delivered {
            return Err(DeliveryApiError::NotDelivered(id));
        }
        if delivery.customer_verified {
            trace!("🛵️ Delivery {id} was already confirmed. Nothing to do.");
            return Ok(delivery);
        }
        let delivery = deliveries::set_customer_verified(id, &mut conn).await?;
        info!("🛵️ Customer confirmed receipt of delivery {id}");
        Ok(delivery)
    }

    async fn insert_delivery_person(&self, person: NewDeliveryPerson) -> Result<DeliveryPerson, DeliveryApiError> {
        let mut conn = self.pool.acquire().await?;
        let person = delivery_persons::insert_delivery_person(person, &mut conn).await?;
        info!("🛵️ Delivery person {} registered on {} campus", person.id, person.campus);
        Ok(person)
    }

    async fn fetch_delivery_person(&self, id: i64) -> Result<Option<DeliveryPerson>, DeliveryApiError> {
        let mut conn = self.pool.acquire().await?;
        let person = delivery_persons::fetch_delivery_person(id, &mut conn).await?;
        Ok(person)
    }

    async fn fetch_delivery_persons(&self) -> Result<Vec<DeliveryPerson>, DeliveryApiError> {
        let mut conn = self.pool.acquire().await?;
        let persons = delivery_persons::fetch_delivery_persons(&mut conn).await?;
        Ok(persons)
    }

    async fn delete_delivery_person(&self, id: i64) -> Result<(), DeliveryApiError> {
        let mut conn = self.pool.acquire().await?;
        delivery_persons::delete_delivery_person(id, &mut conn).await
    }
}

impl MenuManagement for SqliteDatabase {
    async fn insert_menu_item(&self, item: NewMenuItem) -> Result<MenuItem, MenuApiError> {
        let mut conn = self.pool.acquire().await?;
        menu::insert_menu_item(item, &mut conn).await
    }

    async fn fetch_menu_item(&self, id: i64) -> Result<Option<MenuItem>, MenuApiError> {
        let mut conn = self.pool.acquire().await?;
        let item = menu::fetch_menu_item(id, &mut conn).await?;
        Ok(item)
    }

    async fn fetch_menu_items(&self, only_available: bool) -> Result<Vec<MenuItem>, MenuApiError> {
        let mut conn = self.pool.acquire().await?;
        let items = menu::fetch_menu_items(only_available, &mut conn).await?;
        Ok(items)
    }

    async fn update_menu_item(&self, id: i64, update: MenuItemUpdate) -> Result<MenuItem, MenuApiError> {
        let mut conn = self.pool.acquire().await?;
        menu::update_menu_item(id, update, &mut conn).await
    }

    async fn delete_menu_item(&self, id: i64) -> Result<(), MenuApiError> {
        let mut conn = self.pool.acquire().await?;
        menu::delete_menu_item(id, &mut conn).await
    }
}

impl CustomerManagement for SqliteDatabase {
    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, CustomerApiError> {
        let mut conn = self.pool.acquire().await?;
        customers::insert_customer(customer, &mut conn).await
    }

    async fn fetch_customer(&self, id: i64) -> Result<Option<Customer>, CustomerApiError> {
        let mut conn = self.pool.acquire().await?;
        let customer = customers::fetch_customer(id, &mut conn).await?;
        Ok(customer)
    }

    async fn fetch_customers(&self) -> Result<Vec<Customer>, CustomerApiError> {
        let mut conn = self.pool.acquire().await?;
        let customers = customers::fetch_customers(&mut conn).await?;
        Ok(customers)
    }

    async fn cart_for_customer(&self, customer_id: i64) -> Result<Vec<CartItem>, CustomerApiError> {
        let mut conn = self.pool.acquire().await?;
        let cart = customers::cart_for_customer(customer_id, &mut conn).await?;
        Ok(cart)
    }

    async fn replace_cart(&self, customer_id: i64, items: Vec<CartItemRequest>) -> Result<Vec<CartItem>, CustomerApiError> {
        let mut tx = self.pool.begin().await?;
        let cart = customers::replace_cart(customer_id, items, &mut tx).await?;
        tx.commit().await?;
        Ok(cart)
    }

    async fn clear_cart(&self, customer_id: i64) -> Result<(), CustomerApiError> {
        let mut conn = self.pool.acquire().await?;
        customers::clear_cart(customer_id, &mut conn).await
    }

    async fn history_for_customer(&self, customer_id: i64) -> Result<Vec<OrderHistoryEntry>, CustomerApiError> {
        let mut conn = self.pool.acquire().await?;
        let entries = history::history_for_customer(customer_id, &mut conn).await?;
        Ok(entries)
    }

    async fn rebuild_history(&self, customer_id: i64) -> Result<Vec<OrderHistoryEntry>, CustomerApiError> {
        let mut tx = self.pool.begin().await?;
        if customers::fetch_customer(customer_id, &mut tx).await?.is_none() {
            return Err(CustomerApiError::CustomerNotFound(customer_id));
        }
        let entries = history::rebuild_for_customer(customer_id, &mut tx).await?;
        tx.commit().await?;
        info!("🧑️ Order history for customer {customer_id} rebuilt. {} entries", entries.len());
        Ok(entries)
    }
}

impl StaffManagement for SqliteDatabase {
    async fn insert_staff(&self, staff: NewStaff) -> Result<Staff, StaffApiError> {
        let mut conn = self.pool.acquire().await?;
        staff::insert_staff(staff, &mut conn).await
    }

    async fn fetch_staff(&self) -> Result<Vec<Staff>, StaffApiError> {
        let mut conn = self.pool.acquire().await?;
        let staff = staff::fetch_staff(&mut conn).await?;
        Ok(staff)
    }
}

impl AuthManagement for SqliteDatabase {
    async fn fetch_credentials(&self, role: Role, email: &str) -> Result<Option<Credentials>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        let creds = auth::fetch_credentials(role, email, &mut conn).await?;
        Ok(creds)
    }

    async fn ensure_bootstrap_admin(&self, admin: NewStaff) -> Result<bool, AuthApiError> {
        let mut tx = self.pool.begin().await?;
        let created = auth::ensure_bootstrap_admin(admin, &mut tx).await?;
        tx.commit().await?;
        Ok(created)
    }
}

impl RestaurantManagement for SqliteDatabase {
    async fn create_restaurant_profile(&self, profile: NewRestaurant) -> Result<Restaurant, RestaurantApiError> {
        let mut conn = self.pool.acquire().await?;
        restaurant::insert_restaurant(profile, &mut conn).await
    }

    async fn fetch_restaurant_profile(&self) -> Result<Option<Restaurant>, RestaurantApiError> {
        let mut conn = self.pool.acquire().await?;
        let profile = restaurant::fetch_restaurant(&mut conn).await?;
        Ok(profile)
    }

    async fn upsert_restaurant_profile(&self, profile: NewRestaurant) -> Result<Restaurant, RestaurantApiError> {
        let mut conn = self.pool.acquire().await?;
        restaurant::upsert_restaurant(profile, &mut conn).await
    }
}
