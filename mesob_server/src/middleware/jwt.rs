//! JWT extraction middleware.
//!
//! Wrap this around a scope to require a valid `Authorization: Bearer <token>` header on every request inside it.
//! On success the decoded [`JwtClaims`] are stored in the request extensions, where handlers and the ACL middleware
//! pick them up. Requests without a token, or with an expired or tampered one, are rejected with a 401 before they
//! reach any handler.

use std::pin::Pin;
use std::rc::Rc;

use actix_web::dev::{forward_ready, Service, Transform};
use actix_web::{dev::ServiceRequest, dev::ServiceResponse, Error, HttpMessage};
use futures::future::{ok, Ready};
use futures::Future;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::auth::JwtClaims;
use crate::config::AuthConfig;
use crate::errors::{AuthError, ServerError};

pub struct JwtMiddlewareFactory {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtMiddlewareFactory {
    pub fn new(config: &AuthConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        Self { decoding_key, validation }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(JwtMiddlewareService {
            decoding_key: self.decoding_key.clone(),
            validation: self.validation.clone(),
            service: Rc::new(service),
        })
    }
}

pub struct JwtMiddlewareService<S> {
    decoding_key: DecodingKey,
    validation: Validation,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let decoding_key = self.decoding_key.clone();
        let validation = self.validation.clone();
        Box::pin(async move {
            let token = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(str::to_string)
                .ok_or(ServerError::AuthenticationError(AuthError::MissingToken))?;
            match decode::<JwtClaims>(&token, &decoding_key, &validation) {
                Ok(data) => {
                    req.extensions_mut().insert(data.claims);
                    service.call(req).await
                },
                Err(e) => {
                    log::debug!("🗝️ Rejecting request with an invalid token. {e}");
                    Err(ServerError::AuthenticationError(AuthError::InvalidToken(e.to_string())).into())
                },
            }
        })
    }
}
