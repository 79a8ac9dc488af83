use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use mesob_engine::{
    db_types::{Campus, Delivery, DeliveryPerson, DeliveryStatusType, Role},
    events::EventProducers,
    traits::DeliveryApiError,
    DeliveryApi,
};
use serde_json::json;

use super::{
    helpers::{delete_request, get_request, issue_token, patch_request, post_request},
    mocks::MockDeliveryManager,
};
use crate::routes::{
    AddDeliveryPersonRoute,
    AssignDeliveryRoute,
    ConfirmDeliveryRoute,
    DeliveryByIdRoute,
    DeliveryPersonByIdRoute,
    DeliveryPersonsRoute,
    MyDeliveriesRoute,
    RemoveDeliveryPersonRoute,
    SearchDeliveriesRoute,
    UpdateDeliveryStatusRoute,
};

#[actix_web::test]
async fn assigning_a_paid_order_creates_a_delivery() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(2, Role::RestaurantOwner);
    let body = json!({ "orderId": 17, "deliveryPersonId": 6 });
    let (status, body) = post_request(&token, "/deliveries", body, configure_assign).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let delivery: Delivery = serde_json::from_str(&body).expect("Body was not a delivery");
    assert_eq!(delivery.order_id, 17);
    assert_eq!(delivery.delivery_person_id, 6);
}

#[actix_web::test]
async fn unready_orders_cannot_be_assigned() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(2, Role::RestaurantOwner);
    let body = json!({ "orderId": 18, "deliveryPersonId": 6 });
    let (status, body) = post_request(&token, "/deliveries", body, configure_assign).await.expect("Request failed");
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(
        body,
        r#"{"error":"A precondition for this request has not been met. Order 18 must be paid and in progress before it can be assigned"}"#
    );
}

#[actix_web::test]
async fn orders_only_go_to_people_on_the_same_campus() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(2, Role::RestaurantOwner);
    let body = json!({ "orderId": 19, "deliveryPersonId": 6 });
    let (status, body) = post_request(&token, "/deliveries", body, configure_assign).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        r#"{"error":"The request is well-formed but cannot be carried out. Order is for Main campus but the delivery person works HiT campus"}"#
    );
}

#[actix_web::test]
async fn an_order_gets_at_most_one_delivery() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(2, Role::RestaurantOwner);
    let body = json!({ "orderId": 20, "deliveryPersonId": 6 });
    let (status, body) = post_request(&token, "/deliveries", body, configure_assign).await.expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, r#"{"error":"The request conflicts with the current state. Order 20 already has a delivery assigned"}"#);
}

#[actix_web::test]
async fn delivery_people_see_their_own_jobs() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(6, Role::DeliveryPerson);
    let (status, body) = get_request(&token, "/my/deliveries", configure_search).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, DELIVERIES_JSON);
}

#[actix_web::test]
async fn customers_have_no_job_list() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(42, Role::Customer);
    let err = get_request(&token, "/my/deliveries", configure_search).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. This endpoint requires one of: deliveryPerson.");
}

#[actix_web::test]
async fn staff_filter_deliveries_by_time_window() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(2, Role::RestaurantOwner);
    let (status, body) = get_request(&token, "/deliveries?campus=Main&day=2025-11-03&hour=11", configure_search)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, DELIVERIES_JSON);
}

#[actix_web::test]
async fn the_hour_filter_requires_a_day() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(2, Role::RestaurantOwner);
    let (status, body) = get_request(&token, "/deliveries?hour=13", configure_search).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Could not read request body: The hour filter requires a day filter as well"}"#);
}

#[actix_web::test]
async fn delivery_people_report_progress_on_their_own_jobs() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(6, Role::DeliveryPerson);
    let body = json!({ "status": "inProgress" });
    let (status, body) =
        patch_request(&token, "/deliveries/1/status", body, configure_progress).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let delivery: Delivery = serde_json::from_str(&body).expect("Body was not a delivery");
    assert_eq!(delivery.status, DeliveryStatusType::InProgress);
}

#[actix_web::test]
async fn another_persons_job_is_off_limits() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::DeliveryPerson);
    let body = json!({ "status": "delivered" });
    let (status, body) =
        patch_request(&token, "/deliveries/1/status", body, configure_progress).await.expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Insufficient Permissions. This delivery does not involve your account."}"#);
}

#[actix_web::test]
async fn customers_look_up_deliveries_of_their_own_orders() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(42, Role::Customer);
    let (status, _) = get_request(&token, "/deliveries/1", configure_progress).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let (status, body) = get_request(&token, "/deliveries/99", configure_progress).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. No delivery with id 99"}"#);
}

#[actix_web::test]
async fn customers_confirm_receipt_after_handover() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(42, Role::Customer);
    let (status, body) =
        post_request(&token, "/deliveries/1/confirm", json!({}), configure_confirm).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let delivery: Delivery = serde_json::from_str(&body).expect("Body was not a delivery");
    assert!(delivery.customer_verified);
}

#[actix_web::test]
async fn receipt_cannot_be_confirmed_before_handover() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(42, Role::Customer);
    let (status, body) =
        post_request(&token, "/deliveries/2/confirm", json!({}), configure_confirm).await.expect("Request failed");
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(
        body,
        r#"{"error":"A precondition for this request has not been met. Delivery 2 has not been marked delivered yet"}"#
    );
}

#[actix_web::test]
async fn the_admin_hires_delivery_people() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1, Role::Admin);
    let (status, body) =
        post_request(&token, "/delivery-persons", roster_request(), configure_roster).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let person: DeliveryPerson = serde_json::from_str(&body).expect("Body was not a delivery person");
    assert_eq!(person.id, 6);
}

#[actix_web::test]
async fn only_admins_manage_the_roster() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(2, Role::RestaurantOwner);
    let err = post_request(&token, "/delivery-persons", roster_request(), configure_roster)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. This endpoint requires one of: admin.");
    let err = delete_request(&token, "/delivery-persons/6", configure_roster).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. This endpoint requires one of: admin.");
}

#[actix_web::test]
async fn staff_browse_the_roster() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(2, Role::RestaurantOwner);
    let (status, body) = get_request(&token, "/delivery-persons", configure_roster).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let roster: Vec<DeliveryPerson> = serde_json::from_str(&body).expect("Body was not a roster");
    assert_eq!(roster.len(), 1);
    let (status, body) = get_request(&token, "/delivery-persons/99", configure_roster).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. No delivery person with id 99"}"#);
}

#[actix_web::test]
async fn admins_retire_delivery_people() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1, Role::Admin);
    let (status, _) = delete_request(&token, "/delivery-persons/6", configure_roster).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
}

fn roster_request() -> serde_json::Value {
    json!({
        "name": "Dawit Lemma",
        "email": "dawit@mesob.example.et",
        "phone": "+251922334455",
        "password": "yellow-zebra-battery",
        "campus": "Main",
    })
}

fn configure_assign(cfg: &mut ServiceConfig) {
    let mut deliveries = MockDeliveryManager::new();
    deliveries.expect_create_delivery().returning(|request| match request.order_id {
        17 => Ok(delivery_fixture(1)),
        18 => Err(DeliveryApiError::OrderNotReady(18)),
        19 => Err(DeliveryApiError::CampusMismatch { order: Campus::Main, person: Campus::Hit }),
        20 => Err(DeliveryApiError::AlreadyAssigned(20)),
        id => Err(DeliveryApiError::OrderNotFound(id)),
    });
    let api = DeliveryApi::new(deliveries, EventProducers::default());
    cfg.service(AssignDeliveryRoute::<MockDeliveryManager>::new()).app_data(web::Data::new(api));
}

fn configure_search(cfg: &mut ServiceConfig) {
    let mut deliveries = MockDeliveryManager::new();
    deliveries
        .expect_search_deliveries()
        .withf(|query| query.delivery_person_id == Some(6) && query.since.is_none())
        .returning(|_| Ok(vec![delivery_fixture(1)]));
    deliveries
        .expect_search_deliveries()
        .withf(|query| {
            query.campus == Some(Campus::Main) &&
                query.since == Some(Utc.with_ymd_and_hms(2025, 11, 3, 11, 0, 0).unwrap()) &&
                query.until == Some(Utc.with_ymd_and_hms(2025, 11, 3, 12, 0, 0).unwrap())
        })
        .returning(|_| Ok(vec![delivery_fixture(1)]));
    let api = DeliveryApi::new(deliveries, EventProducers::default());
    cfg.service(MyDeliveriesRoute::<MockDeliveryManager>::new())
        .service(SearchDeliveriesRoute::<MockDeliveryManager>::new())
        .app_data(web::Data::new(api));
}

fn configure_progress(cfg: &mut ServiceConfig) {
    let mut deliveries = MockDeliveryManager::new();
    deliveries.expect_fetch_delivery().returning(|id| Ok((id == 1).then(|| delivery_fixture(1))));
    deliveries
        .expect_update_delivery_status()
        .withf(|id, status| *id == 1 && *status == DeliveryStatusType::InProgress)
        .returning(|id, status| {
            let mut delivery = delivery_fixture(id);
            delivery.status = status;
            Ok(delivery)
        });
    let api = DeliveryApi::new(deliveries, EventProducers::default());
    cfg.service(UpdateDeliveryStatusRoute::<MockDeliveryManager>::new())
        .service(DeliveryByIdRoute::<MockDeliveryManager>::new())
        .app_data(web::Data::new(api));
}

fn configure_confirm(cfg: &mut ServiceConfig) {
    let mut deliveries = MockDeliveryManager::new();
    deliveries.expect_fetch_delivery().returning(|id| {
        let delivery = match id {
            1 => Some(delivered_fixture(1)),
            2 => Some(delivery_fixture(2)),
            _ => None,
        };
        Ok(delivery)
    });
    deliveries.expect_verify_delivery().returning(|id| {
        if id == 1 {
            let mut delivery = delivered_fixture(1);
            delivery.customer_verified = true;
            Ok(delivery)
        } else {
            Err(DeliveryApiError::NotDelivered(id))
        }
    });
    let api = DeliveryApi::new(deliveries, EventProducers::default());
    cfg.service(ConfirmDeliveryRoute::<MockDeliveryManager>::new()).app_data(web::Data::new(api));
}

fn configure_roster(cfg: &mut ServiceConfig) {
    let mut deliveries = MockDeliveryManager::new();
    // The raw password must be hashed before it reaches the backend.
    deliveries
        .expect_insert_delivery_person()
        .withf(|person| person.email == "dawit@mesob.example.et" && person.password_hash.starts_with("$argon2"))
        .returning(|_| Ok(person_fixture(6)));
    deliveries.expect_fetch_delivery_persons().returning(|| Ok(vec![person_fixture(6)]));
    deliveries.expect_fetch_delivery_person().returning(|id| Ok((id == 6).then(|| person_fixture(6))));
    deliveries.expect_delete_delivery_person().withf(|id| *id == 6).returning(|_| Ok(()));
    let api = DeliveryApi::new(deliveries, EventProducers::default());
    cfg.service(AddDeliveryPersonRoute::<MockDeliveryManager>::new())
        .service(DeliveryPersonsRoute::<MockDeliveryManager>::new())
        .service(DeliveryPersonByIdRoute::<MockDeliveryManager>::new())
        .service(RemoveDeliveryPersonRoute::<MockDeliveryManager>::new())
        .app_data(web::Data::new(api));
}

fn delivery_fixture(id: i64) -> Delivery {
    Delivery {
        id,
        order_id: 17,
        delivery_person_id: 6,
        customer_id: 42,
        status: DeliveryStatusType::Pending,
        customer_verified: false,
        delivered_at: None,
        created_at: Utc.with_ymd_and_hms(2025, 11, 3, 12, 0, 0).unwrap(),
    }
}

fn delivered_fixture(id: i64) -> Delivery {
    let mut delivery = delivery_fixture(id);
    delivery.status = DeliveryStatusType::Delivered;
    delivery.delivered_at = Some(Utc.with_ymd_and_hms(2025, 11, 3, 12, 45, 0).unwrap());
    delivery
}

fn person_fixture(id: i64) -> DeliveryPerson {
    DeliveryPerson {
        id,
        name: "Dawit Lemma".to_string(),
        email: "dawit@mesob.example.et".to_string(),
        phone: "+251922334455".to_string(),
        campus: Campus::Main,
        created_at: Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap(),
    }
}

const DELIVERIES_JSON: &str = r#"[{"id":1,"orderId":17,"deliveryPersonId":6,"customerId":42,"status":"pending","customerVerified":false,"deliveredAt":null,"createdAt":"2025-11-03T12:00:00Z"}]"#;
