use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use log::debug;
use mesob_common::Secret;
use mesob_engine::db_types::Role;

use crate::{auth::TokenIssuer, config::AuthConfig, middleware::JwtMiddlewareFactory};

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this secret anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig { jwt_secret: Secret::new("do-not-use-this-secret-outside-of-tests-0451".to_string()) }
}

pub fn issue_token(sub: i64, role: Role) -> String {
    let signer = TokenIssuer::new(&get_auth_config());
    signer.issue_token(sub, role, None).expect("Failed to sign token")
}

pub async fn get_request<F>(auth_header: &str, path: &str, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    send_request(TestRequest::get().uri(path), auth_header, configure).await
}

pub async fn delete_request<F>(auth_header: &str, path: &str, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    send_request(TestRequest::delete().uri(path), auth_header, configure).await
}

pub async fn post_request<F>(
    auth_header: &str,
    path: &str,
    body: serde_json::Value,
    configure: F,
) -> Result<(StatusCode, String), String>
where
    F: FnOnce(&mut ServiceConfig),
{
    send_request(TestRequest::post().uri(path).set_json(body), auth_header, configure).await
}

pub async fn put_request<F>(
    auth_header: &str,
    path: &str,
    body: serde_json::Value,
    configure: F,
) -> Result<(StatusCode, String), String>
where
    F: FnOnce(&mut ServiceConfig),
{
    send_request(TestRequest::put().uri(path).set_json(body), auth_header, configure).await
}

pub async fn patch_request<F>(
    auth_header: &str,
    path: &str,
    body: serde_json::Value,
    configure: F,
) -> Result<(StatusCode, String), String>
where
    F: FnOnce(&mut ServiceConfig),
{
    send_request(TestRequest::patch().uri(path).set_json(body), auth_header, configure).await
}

/// Runs a request against an app wrapped in the JWT middleware, exactly as the `/api` scope is in production.
/// Middleware rejections surface as `Err`; everything else comes back as (status, body).
async fn send_request<F>(req: TestRequest, auth_header: &str, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    let mut req = req;
    if !auth_header.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {auth_header}")));
    }
    let req = req.to_request();
    let config = get_auth_config();
    let app = App::new().wrap(JwtMiddlewareFactory::new(&config)).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

/// Runs a request without the JWT middleware, for routes that live outside the `/api` scope.
pub async fn public_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let (_, res) = test::call_service(&service, req.to_request()).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}
