use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chapa_tools::{CheckoutSession, GatewayApiError};
use chrono::{TimeZone, Utc};
use mesob_common::Birr;
use mesob_engine::{
    db_types::{Campus, Customer, Order, OrderItem, OrderStatusType, PaymentMethod, PaymentStatusType, Role},
    events::EventProducers,
    CustomerApi,
    OrderFlowApi,
};
use serde_json::json;

use super::{
    helpers::{get_request, issue_token, patch_request, post_request},
    mocks::{MockCustomerManager, MockGateway, MockOrderManager},
};
use crate::routes::{
    MyOrdersRoute,
    OrderByIdRoute,
    OrderItemsRoute,
    OrdersSearchRoute,
    PlaceOrderRoute,
    UpdateOrderStatusRoute,
};

#[actix_web::test]
async fn placing_a_cash_order_returns_the_priced_order_and_items() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(42, Role::Customer);
    let (status, body) =
        post_request(&token, "/orders", order_request("cash"), configure_place_cash).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let response: serde_json::Value = serde_json::from_str(&body).expect("Body was not JSON");
    assert_eq!(response["order"]["id"], 1);
    assert_eq!(response["order"]["customerId"], 42);
    assert_eq!(response["order"]["totalPrice"], 9000);
    assert_eq!(response["order"]["status"], "pending");
    assert_eq!(response["order"]["paymentStatus"], "success");
    assert_eq!(response["items"].as_array().map(Vec::len), Some(2));
    assert!(response.get("payment").is_none());
}

#[actix_web::test]
async fn placing_a_chapa_order_starts_the_checkout_in_the_same_request() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(42, Role::Customer);
    let (status, body) =
        post_request(&token, "/orders", order_request("chapa"), configure_place_chapa).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let response: serde_json::Value = serde_json::from_str(&body).expect("Body was not JSON");
    assert_eq!(response["order"]["id"], 1);
    assert_eq!(response["order"]["paymentStatus"], "pending");
    let reference = response["order"]["paymentRef"].as_str().unwrap_or_default();
    assert!(reference.starts_with("order-1-"), "got {reference}");
    assert_eq!(response["payment"]["orderId"], 1);
    assert_eq!(response["payment"]["checkoutUrl"], "https://checkout.chapa.co/payment/CH-test-42");
}

#[actix_web::test]
async fn the_order_survives_a_gateway_that_refuses_the_checkout() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(42, Role::Customer);
    let (status, body) = post_request(&token, "/orders", order_request("chapa"), configure_place_gateway_down)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let response: serde_json::Value = serde_json::from_str(&body).expect("Body was not JSON");
    assert_eq!(response["order"]["id"], 1);
    assert_eq!(response["order"]["paymentStatus"], "failed");
    assert!(response.get("payment").is_none());
    let message = response["message"].as_str().unwrap_or_default();
    assert!(message.starts_with("The order was created, but the payment could not be started."), "got {message}");
}

#[actix_web::test]
async fn placing_an_order_requires_a_token() {
    let _ = env_logger::try_init().ok();
    let err = post_request("", "/orders", order_request("cash"), configure_place_cash).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. An access token is required for this endpoint, but none was provided.");
}

#[actix_web::test]
async fn delivery_people_cannot_place_orders() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(9, Role::DeliveryPerson);
    let err =
        post_request(&token, "/orders", order_request("cash"), configure_place_cash).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. This endpoint requires one of: customer.");
}

#[actix_web::test]
async fn customers_fetch_their_own_orders_newest_first() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(42, Role::Customer);
    let (status, body) = get_request(&token, "/my/orders", configure_my_orders).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDERS_JSON);
}

#[actix_web::test]
async fn customers_cannot_read_other_customers_orders() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let (status, body) = get_request(&token, "/orders/10", configure_fetch).await.expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Insufficient Permissions. This order belongs to another customer."}"#);
}

#[actix_web::test]
async fn staff_can_read_any_customers_order() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(2, Role::RestaurantOwner);
    let (status, body) = get_request(&token, "/orders/10", configure_fetch).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let order: Order = serde_json::from_str(&body).expect("Body was not an order");
    assert_eq!(order.customer_id, 42);
}

#[actix_web::test]
async fn missing_orders_are_reported_as_not_found() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(42, Role::Customer);
    let (status, body) = get_request(&token, "/orders/99", configure_fetch).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. No order with id 99"}"#);
}

#[actix_web::test]
async fn order_items_are_scoped_to_the_orders_owner() {
    let _ = env_logger::try_init().ok();
    let owner = issue_token(42, Role::Customer);
    let (status, body) = get_request(&owner, "/orders/10/items", configure_fetch).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ITEMS_JSON);
    let snoop = issue_token(7, Role::Customer);
    let (status, _) = get_request(&snoop, "/orders/10/items", configure_fetch).await.expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn the_kitchen_moves_orders_through_their_lifecycle() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(2, Role::RestaurantOwner);
    let body = json!({ "status": "inProgress" });
    let (status, body) =
        patch_request(&token, "/orders/10/status", body, configure_status).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let order: Order = serde_json::from_str(&body).expect("Body was not an order");
    assert_eq!(order.status, OrderStatusType::InProgress);
}

#[actix_web::test]
async fn customers_cannot_update_order_status() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(42, Role::Customer);
    let body = json!({ "status": "completed" });
    let err = patch_request(&token, "/orders/10/status", body, configure_status).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. This endpoint requires one of: restaurantOwner.");
}

#[actix_web::test]
async fn order_search_filters_are_passed_to_the_backend() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(2, Role::RestaurantOwner);
    let (status, body) = get_request(&token, "/orders?customerId=42&status=pending&newestFirst=true", configure_search)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<Order> = serde_json::from_str(&body).expect("Body was not an order list");
    assert_eq!(orders.len(), 1);
}

fn order_request(method: &str) -> serde_json::Value {
    json!({
        "items": [
            { "menuItemId": 3, "quantity": 2 },
            { "menuItemId": 5, "quantity": 1 },
        ],
        "campus": "Main",
        "building": "Dorm B4",
        "roomNumber": "210",
        "paymentMethod": method,
    })
}

fn configure_place_cash(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders
        .expect_create_order()
        .withf(|order| order.customer_id == 42 && order.items.len() == 2)
        .returning(|_| {
            let mut order = order_fixture(1, 42);
            order.payment_method = PaymentMethod::Cash;
            order.payment_status = PaymentStatusType::Success;
            Ok((order, items_fixture(1)))
        });
    // Cash never reaches the gateway; a mock with no expectations would panic if it did.
    configure_place_with(cfg, orders, MockGateway::new());
}

fn configure_place_chapa(cfg: &mut ServiceConfig) {
    configure_place_with(cfg, chapa_order_mock(), happy_gateway());
}

fn configure_place_gateway_down(cfg: &mut ServiceConfig) {
    let mut orders = chapa_order_mock();
    orders.expect_mark_payment_failed().once().withf(|id| *id == 1).returning(|id| {
        let mut order = order_fixture(id, 42);
        order.payment_status = PaymentStatusType::Failed;
        Ok(order)
    });
    // The handler re-reads the order after the failure, so the response shows the failed payment.
    orders.expect_fetch_order().returning(|id| {
        let mut order = order_fixture(id, 42);
        order.payment_status = PaymentStatusType::Failed;
        Ok(Some(order))
    });
    let mut gateway = MockGateway::new();
    gateway
        .expect_initialize_payment()
        .returning(|_| Err(GatewayApiError::Declined("insufficient merchant balance".to_string())));
    configure_place_with(cfg, orders, gateway);
}

fn configure_place_with(cfg: &mut ServiceConfig, orders: MockOrderManager, gateway: MockGateway) {
    let mut customers = MockCustomerManager::new();
    customers.expect_fetch_customer().withf(|id| *id == 42).returning(|id| Ok(Some(customer_fixture(id))));
    let orders_api = OrderFlowApi::new(orders, EventProducers::default());
    let customers_api = CustomerApi::new(customers);
    cfg.service(PlaceOrderRoute::<MockOrderManager, MockCustomerManager, MockGateway>::new())
        .app_data(web::Data::new(orders_api))
        .app_data(web::Data::new(customers_api))
        .app_data(web::Data::new(gateway));
}

// Creates the order pending, hands it out once to the checkout step, and tags it with the new reference.
fn chapa_order_mock() -> MockOrderManager {
    let mut orders = MockOrderManager::new();
    orders
        .expect_create_order()
        .withf(|order| order.customer_id == 42 && order.items.len() == 2)
        .returning(|_| Ok((order_fixture(1, 42), items_fixture(1))));
    orders.expect_fetch_order().once().withf(|id| *id == 1).returning(|id| Ok(Some(order_fixture(id, 42))));
    orders
        .expect_set_payment_reference()
        .withf(|id, reference| *id == 1 && reference.starts_with("order-1-"))
        .returning(|id, reference| {
            let mut order = order_fixture(id, 42);
            order.payment_ref = Some(reference.to_string());
            Ok(order)
        });
    orders
}

// A gateway that accepts the checkout and echoes the reference back.
fn happy_gateway() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway
        .expect_initialize_payment()
        .withf(|payment| payment.amount == Birr::from(9000) && payment.tx_ref.starts_with("order-1-"))
        .returning(|payment| {
            Ok(CheckoutSession {
                tx_ref: payment.tx_ref.clone(),
                checkout_url: "https://checkout.chapa.co/payment/CH-test-42".to_string(),
            })
        });
    gateway
}

fn configure_my_orders(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders
        .expect_search_orders()
        .withf(|query| query.customer_id == Some(42) && query.newest_first)
        .returning(|_| Ok(my_orders_response()));
    let api = OrderFlowApi::new(orders, EventProducers::default());
    cfg.service(MyOrdersRoute::<MockOrderManager>::new()).app_data(web::Data::new(api));
}

fn configure_fetch(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order().returning(|id| Ok((id == 10).then(|| order_fixture(10, 42))));
    orders.expect_fetch_order_items().returning(|id| Ok(items_fixture(id)));
    let api = OrderFlowApi::new(orders, EventProducers::default());
    cfg.service(OrderByIdRoute::<MockOrderManager>::new())
        .service(OrderItemsRoute::<MockOrderManager>::new())
        .app_data(web::Data::new(api));
}

fn configure_status(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders
        .expect_update_order_status()
        .withf(|id, status| *id == 10 && *status == OrderStatusType::InProgress)
        .returning(|id, status| {
            let mut order = order_fixture(id, 42);
            order.status = status;
            Ok(order)
        });
    let api = OrderFlowApi::new(orders, EventProducers::default());
    cfg.service(UpdateOrderStatusRoute::<MockOrderManager>::new()).app_data(web::Data::new(api));
}

fn configure_search(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders
        .expect_search_orders()
        .withf(|query| {
            query.customer_id == Some(42) && query.status == Some(vec![OrderStatusType::Pending]) && query.newest_first
        })
        .returning(|_| Ok(vec![order_fixture(10, 42)]));
    let api = OrderFlowApi::new(orders, EventProducers::default());
    cfg.service(OrdersSearchRoute::<MockOrderManager>::new()).app_data(web::Data::new(api));
}

fn order_fixture(id: i64, customer_id: i64) -> Order {
    Order {
        id,
        customer_id,
        total_price: Birr::from(9000),
        status: OrderStatusType::Pending,
        payment_status: PaymentStatusType::Pending,
        payment_method: PaymentMethod::Chapa,
        payment_ref: None,
        campus: Campus::Main,
        building: "Dorm B4".to_string(),
        room_number: "210".to_string(),
        created_at: Utc.with_ymd_and_hms(2025, 11, 3, 11, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2025, 11, 3, 11, 30, 0).unwrap(),
    }
}

fn items_fixture(order_id: i64) -> Vec<OrderItem> {
    vec![
        OrderItem {
            id: 1,
            order_id,
            menu_item_id: 3,
            name: "Beyaynetu".to_string(),
            price_at_purchase: Birr::from(3500),
            quantity: 2,
        },
        OrderItem {
            id: 2,
            order_id,
            menu_item_id: 5,
            name: "Shiro".to_string(),
            price_at_purchase: Birr::from(2000),
            quantity: 1,
        },
    ]
}

fn customer_fixture(id: i64) -> Customer {
    Customer {
        id,
        name: "Meron Tadesse".to_string(),
        email: "meron@hu.example.et".to_string(),
        phone: "+251911234567".to_string(),
        campus: Campus::Main,
        created_at: Utc.with_ymd_and_hms(2025, 9, 12, 8, 0, 0).unwrap(),
    }
}

// Mock response to the `search_orders` call behind `/my/orders`.
fn my_orders_response() -> Vec<Order> {
    let newest = order_fixture(10, 42);
    let mut older = order_fixture(9, 42);
    older.status = OrderStatusType::Completed;
    older.payment_status = PaymentStatusType::Success;
    older.payment_method = PaymentMethod::Cash;
    older.created_at = Utc.with_ymd_and_hms(2025, 11, 1, 9, 5, 0).unwrap();
    older.updated_at = Utc.with_ymd_and_hms(2025, 11, 1, 9, 40, 0).unwrap();
    vec![newest, older]
}

const ORDERS_JSON: &str = r#"[{"id":10,"customerId":42,"totalPrice":9000,"status":"pending","paymentStatus":"pending","paymentMethod":"chapa","paymentRef":null,"campus":"Main","building":"Dorm B4","roomNumber":"210","createdAt":"2025-11-03T11:30:00Z","updatedAt":"2025-11-03T11:30:00Z"},{"id":9,"customerId":42,"totalPrice":9000,"status":"completed","paymentStatus":"success","paymentMethod":"cash","paymentRef":null,"campus":"Main","building":"Dorm B4","roomNumber":"210","createdAt":"2025-11-01T09:05:00Z","updatedAt":"2025-11-01T09:40:00Z"}]"#;

const ITEMS_JSON: &str = r#"[{"id":1,"orderId":10,"menuItemId":3,"name":"Beyaynetu","priceAtPurchase":3500,"quantity":2},{"id":2,"orderId":10,"menuItemId":5,"name":"Shiro","priceAtPurchase":2000,"quantity":1}]"#;
