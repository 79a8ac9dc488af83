use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use mesob_engine::{
    db_types::{Credentials, Role},
    AuthApi,
};
use serde_json::json;

use super::{
    helpers::{get_auth_config, get_request, issue_token, public_request},
    mocks::MockAuthManager,
};
use crate::{
    auth::{hash_password, JwtClaims, TokenIssuer},
    data_objects::LoginResponse,
    routes::{CheckTokenRoute, LoginRoute},
};

const KNOWN_EMAIL: &str = "abel@hu.example.et";

#[actix_web::test]
async fn login_issues_a_token_for_valid_credentials() {
    let _ = env_logger::try_init().ok();
    let body = json!({ "email": KNOWN_EMAIL, "password": "correct-horse", "role": "customer" });
    let (status, body) = public_request(TestRequest::post().uri("/auth/login").set_json(body), configure_login).await;
    assert_eq!(status, StatusCode::OK);
    let response: LoginResponse = serde_json::from_str(&body).expect("Malformed login response");
    assert_eq!(response.id, 15);
    assert_eq!(response.name, "Abel Bekele");
    assert_eq!(response.role, Role::Customer);
    let key = DecodingKey::from_secret(get_auth_config().jwt_secret.reveal().as_bytes());
    let decoded = decode::<JwtClaims>(&response.token, &key, &Validation::new(Algorithm::HS256))
        .expect("The issued token should validate against the server secret");
    assert_eq!(decoded.claims.sub, 15);
    assert_eq!(decoded.claims.role, Role::Customer);
}

#[actix_web::test]
async fn wrong_passwords_and_unknown_emails_are_indistinguishable() {
    let _ = env_logger::try_init().ok();
    let wrong_password = json!({ "email": KNOWN_EMAIL, "password": "not-the-password", "role": "customer" });
    let (status_a, body_a) =
        public_request(TestRequest::post().uri("/auth/login").set_json(wrong_password), configure_login).await;
    let unknown_email = json!({ "email": "nobody@hu.example.et", "password": "correct-horse", "role": "customer" });
    let (status_b, body_b) =
        public_request(TestRequest::post().uri("/auth/login").set_json(unknown_email), configure_login).await;
    assert_eq!(status_a, StatusCode::UNAUTHORIZED);
    assert_eq!(status_b, StatusCode::UNAUTHORIZED);
    assert_eq!(body_a, r#"{"error":"Authentication Error. Invalid email or password."}"#);
    assert_eq!(body_a, body_b, "Login failures must not reveal whether the account exists");
}

#[actix_web::test]
async fn logins_are_scoped_to_the_requested_role() {
    let _ = env_logger::try_init().ok();
    // The email exists as a customer, but not as staff.
    let body = json!({ "email": KNOWN_EMAIL, "password": "correct-horse", "role": "restaurantOwner" });
    let (status, _) = public_request(TestRequest::post().uri("/auth/login").set_json(body), configure_login).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn check_token_accepts_a_valid_token() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let (status, body) = get_request(&token, "/check_token", configure_check).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Token is valid.");
}

#[actix_web::test]
async fn admins_pass_every_role_gate() {
    let _ = env_logger::try_init().ok();
    // check_token does not list the admin role. Admins pass anyway.
    let token = issue_token(1, Role::Admin);
    let (status, _) = get_request(&token, "/check_token", configure_check).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn requests_without_a_token_are_rejected() {
    let _ = env_logger::try_init().ok();
    let err = get_request("", "/check_token", configure_check).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. An access token is required for this endpoint, but none was provided.");
}

#[actix_web::test]
async fn expired_tokens_are_rejected() {
    let _ = env_logger::try_init().ok();
    let signer = TokenIssuer::new(&get_auth_config());
    let token = signer.issue_token(7, Role::Customer, Some(chrono::Duration::hours(-2))).unwrap();
    let err = get_request(&token, "/check_token", configure_check).await.expect_err("Expected error");
    assert!(err.contains("Access token is invalid"), "was: {err}");
}

#[actix_web::test]
async fn tampered_tokens_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut token = issue_token(7, Role::Customer);
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    let err = get_request(&token, "/check_token", configure_check).await.expect_err("Expected error");
    assert!(err.contains("Access token is invalid"), "was: {err}");
}

fn configure_login(cfg: &mut ServiceConfig) {
    let password_hash = hash_password("correct-horse").unwrap();
    let mut auth_manager = MockAuthManager::new();
    auth_manager.expect_fetch_credentials().returning(move |role, email| {
        if role == Role::Customer && email == KNOWN_EMAIL {
            Ok(Some(Credentials { id: 15, name: "Abel Bekele".to_string(), password_hash: password_hash.clone() }))
        } else {
            Ok(None)
        }
    });
    let auth_api = AuthApi::new(auth_manager);
    let jwt_signer = TokenIssuer::new(&get_auth_config());
    cfg.app_data(web::Data::new(auth_api))
        .app_data(web::Data::new(jwt_signer))
        .service(LoginRoute::<MockAuthManager>::new());
}

fn configure_check(cfg: &mut ServiceConfig) {
    cfg.service(CheckTokenRoute::new());
}
