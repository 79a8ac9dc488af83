use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chapa_tools::{CheckoutSession, GatewayApiError, GatewayPaymentStatus, PaymentVerification};
use chrono::{TimeZone, Utc};
use mesob_common::Birr;
use mesob_engine::{
    db_types::{Campus, Customer, Order, OrderStatusType, PaymentMethod, PaymentStatusType, Role},
    events::EventProducers,
    CustomerApi,
    OrderFlowApi,
};
use serde_json::json;

use super::{
    helpers::{issue_token, post_request, public_request},
    mocks::{MockCustomerManager, MockGateway, MockOrderManager},
};
use crate::{
    data_objects::PaymentInitiated,
    routes::{InitializePaymentRoute, VerifyPaymentRoute},
};

const TX_REF: &str = "order-10-1730630000000";

#[actix_web::test]
async fn initializing_a_payment_returns_the_checkout_url() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(42, Role::Customer);
    let (status, body) =
        post_request(&token, "/payments/initialize/10", json!({}), configure_initialize).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let initiated: PaymentInitiated = serde_json::from_str(&body).expect("Body was not a checkout session");
    assert_eq!(initiated.order_id, 10);
    assert!(initiated.tx_ref.starts_with("order-10-"));
    assert_eq!(initiated.checkout_url, "https://checkout.chapa.co/payment/CH-test-42");
}

#[actix_web::test]
async fn checkouts_are_for_the_orders_owner_only() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let (status, body) =
        post_request(&token, "/payments/initialize/10", json!({}), configure_initialize).await.expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Insufficient Permissions. This order belongs to another customer."}"#);
}

#[actix_web::test]
async fn only_pending_orders_can_start_a_checkout() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(42, Role::Customer);
    let (status, body) =
        post_request(&token, "/payments/initialize/11", json!({}), configure_initialize).await.expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body,
        r#"{"error":"The request conflicts with the current state. Order 11 is inProgress and cannot start a checkout"}"#
    );
}

#[actix_web::test]
async fn cash_orders_have_no_checkout() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(42, Role::Customer);
    let (status, body) =
        post_request(&token, "/payments/initialize/12", json!({}), configure_initialize).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Could not read request body: Cash orders are paid on delivery and have no checkout"}"#);
}

#[actix_web::test]
async fn santim_pay_orders_cannot_start_checkouts_yet() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(42, Role::Customer);
    let (status, body) =
        post_request(&token, "/payments/initialize/13", json!({}), configure_initialize).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        r#"{"error":"Could not read request body: SantimPay checkouts are not available yet. Choose chapa or cash."}"#
    );
}

#[actix_web::test]
async fn gateway_failures_surface_as_bad_gateway() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(42, Role::Customer);
    let (status, body) = post_request(&token, "/payments/initialize/10", json!({}), configure_gateway_down)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("The payment gateway could not be reached or gave an invalid response."));
}

#[actix_web::test]
async fn staff_cannot_start_checkouts_for_customers() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(2, Role::RestaurantOwner);
    let err = post_request(&token, "/payments/initialize/10", json!({}), configure_initialize)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. This endpoint requires one of: customer.");
}

#[actix_web::test]
async fn the_gateway_callback_settles_the_order() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri(&format!("/payments/verify/{TX_REF}"));
    let (status, body) = public_request(req, configure_verify(GatewayPaymentStatus::Success)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Payment for order 10 settled"}"#);
}

#[actix_web::test]
async fn incomplete_payments_do_not_settle_anything() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri(&format!("/payments/verify/{TX_REF}"));
    let (status, body) = public_request(req, configure_verify(GatewayPaymentStatus::Pending)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"The payment has not completed yet"}"#);
}

#[actix_web::test]
async fn failed_payments_leave_the_order_open_for_another_try() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri(&format!("/payments/verify/{TX_REF}"));
    let (status, body) = public_request(req, configure_verify(GatewayPaymentStatus::Failed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":false,"message":"Payment for order 10 failed"}"#);
}

#[actix_web::test]
async fn unknown_references_settle_nothing() {
    let _ = env_logger::try_init().ok();
    // Still a 200: gateways keep retrying callbacks that do not answer with success.
    let req = TestRequest::get().uri("/payments/verify/order-99-0000000000000");
    let (status, body) = public_request(req, configure_verify(GatewayPaymentStatus::Success)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":false,"message":"Unknown payment reference"}"#);
}

fn configure_initialize(cfg: &mut ServiceConfig) {
    let gateway = happy_gateway();
    configure_initialize_with(cfg, gateway);
}

fn configure_gateway_down(cfg: &mut ServiceConfig) {
    let mut gateway = MockGateway::new();
    gateway
        .expect_initialize_payment()
        .returning(|_| Err(GatewayApiError::Declined("insufficient merchant balance".to_string())));
    configure_initialize_with(cfg, gateway);
}

fn configure_initialize_with(cfg: &mut ServiceConfig, gateway: MockGateway) {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_order().returning(|id| {
        let order = match id {
            10 => Some(order_fixture(10)),
            11 => {
                let mut order = order_fixture(11);
                order.status = OrderStatusType::InProgress;
                Some(order)
            },
            12 => {
                let mut order = order_fixture(12);
                order.payment_method = PaymentMethod::Cash;
                Some(order)
            },
            13 => {
                let mut order = order_fixture(13);
                order.payment_method = PaymentMethod::SantimPay;
                Some(order)
            },
            _ => None,
        };
        Ok(order)
    });
    orders
        .expect_set_payment_reference()
        .withf(|id, reference| *id == 10 && reference.starts_with("order-10-"))
        .returning(|id, reference| {
            let mut order = order_fixture(id);
            order.payment_ref = Some(reference.to_string());
            Ok(order)
        });
    // Only exercised when the gateway declines the checkout.
    orders.expect_mark_payment_failed().withf(|id| *id == 10).returning(|id| {
        let mut order = order_fixture(id);
        order.payment_status = PaymentStatusType::Failed;
        Ok(order)
    });
    let mut customers = MockCustomerManager::new();
    customers.expect_fetch_customer().withf(|id| *id == 42).returning(|id| Ok(Some(customer_fixture(id))));
    let orders_api = OrderFlowApi::new(orders, EventProducers::default());
    let customers_api = CustomerApi::new(customers);
    cfg.service(InitializePaymentRoute::<MockOrderManager, MockCustomerManager, MockGateway>::new())
        .app_data(web::Data::new(orders_api))
        .app_data(web::Data::new(customers_api))
        .app_data(web::Data::new(gateway));
}

// A gateway that accepts the checkout and echoes the reference back.
fn happy_gateway() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway
        .expect_initialize_payment()
        .withf(|payment| {
            payment.amount == Birr::from(9000) &&
                payment.email == "meron@hu.example.et" &&
                payment.first_name == "Meron" &&
                payment.last_name == "Tadesse" &&
                payment.tx_ref.starts_with("order-10-")
        })
        .returning(|payment| {
            Ok(CheckoutSession {
                tx_ref: payment.tx_ref.clone(),
                checkout_url: "https://checkout.chapa.co/payment/CH-test-42".to_string(),
            })
        });
    gateway
}

fn configure_verify(status: GatewayPaymentStatus) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let mut orders = MockOrderManager::new();
        orders.expect_fetch_order_by_reference().returning(|reference| {
            Ok((reference == TX_REF).then(|| {
                let mut order = order_fixture(10);
                order.payment_ref = Some(TX_REF.to_string());
                order
            }))
        });
        orders
            .expect_settle_order_payment()
            .withf(|id, status| *id == 10 && *status == PaymentStatusType::Verified)
            .returning(|id, status| {
                let mut order = order_fixture(id);
                order.payment_status = status;
                order.payment_ref = Some(TX_REF.to_string());
                Ok(order)
            });
        orders.expect_mark_payment_failed().withf(|id| *id == 10).returning(|id| {
            let mut order = order_fixture(id);
            order.payment_status = PaymentStatusType::Failed;
            order.payment_ref = Some(TX_REF.to_string());
            Ok(order)
        });
        let mut gateway = MockGateway::new();
        gateway.expect_verify_payment().returning(move |tx_ref| {
            Ok(PaymentVerification {
                tx_ref: tx_ref.to_string(),
                reference: Some("APq1x2y3z4".to_string()),
                status,
                amount: Birr::from(9000),
                currency: "ETB".to_string(),
            })
        });
        let api = OrderFlowApi::new(orders, EventProducers::default());
        cfg.service(VerifyPaymentRoute::<MockOrderManager, MockGateway>::new())
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(gateway));
    }
}

fn order_fixture(id: i64) -> Order {
    Order {
        id,
        customer_id: 42,
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
