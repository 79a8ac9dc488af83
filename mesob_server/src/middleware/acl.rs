//! Access control list middleware for the Mesob server.
//! This middleware can be placed on any route or service inside the JWT-protected scope.
//!
//! It checks the role in the claims that the JWT middleware extracted against the roles the route accepts. A request
//! is allowed through when the caller holds any one of the required roles. Admins always pass, so routes never need
//! to list [`Role::Admin`] explicitly. Anyone else receives a 403 Forbidden response.

use std::pin::Pin;
use std::rc::Rc;

use actix_web::dev::{forward_ready, Service, Transform};
use actix_web::error::ErrorInternalServerError;
use actix_web::{dev::ServiceRequest, dev::ServiceResponse, Error, HttpMessage};
use futures::future::{ok, Ready};
use futures::Future;
use mesob_engine::db_types::Role;

use crate::auth::JwtClaims;
use crate::errors::ServerError;

pub struct AclMiddlewareFactory {
    required_roles: Vec<Role>,
}

impl AclMiddlewareFactory {
    pub fn new(required_roles: &[Role]) -> Self {
        AclMiddlewareFactory { required_roles: required_roles.to_vec() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AclMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService { required_roles: self.required_roles.clone(), service: Rc::new(service) })
    }
}

pub struct AclMiddlewareService<S> {
    required_roles: Vec<Role>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
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
        let required_roles = self.required_roles.clone();
        Box::pin(async move {
            let jwt_claims = req
                .extensions()
                .get::<JwtClaims>()
                .ok_or_else(|| {
                    log::warn!("🗝️ No JWT claims found in request extensions. Is the route inside the JWT scope?");
                    ErrorInternalServerError("No JWT claims found in request extensions")
                })?
                .clone();
            if jwt_claims.role == Role::Admin || required_roles.contains(&jwt_claims.role) {
                service.call(req).await
            } else {
                let required = required_roles.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(", ");
                Err(ServerError::InsufficientPermissions(format!("This endpoint requires one of: {required}.")).into())
            }
        })
    }
}
