//! Access tokens and password handling.
//!
//! Tokens are standard HS256 JWTs signed with the secret from [`AuthConfig`]. The claims carry the account id and
//! role, so the middleware can authorise a request without a database round trip. Passwords are hashed with Argon2
//! and only the hash is ever stored.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use mesob_engine::db_types::Role;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The id of the account this token was issued to. Customers and delivery people use their own table's id,
    /// staff use the staff table's id.
    pub sub: i64,
    pub role: Role,
    pub exp: usize,
}

/// Extracts the claims that the JWT middleware stashed in the request extensions. Routes that take [`JwtClaims`]
/// as a parameter therefore only work inside a scope wrapped by the middleware.
impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<JwtClaims>().cloned();
        ready(claims.ok_or(ServerError::AuthenticationError(AuthError::MissingToken)))
    }
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        Self { encoding_key }
    }

    /// Issue a new access token for the given account.
    /// This method DOES NOT verify that the account's credentials are legitimate. This must be done prior to
    /// calling `issue_token`.
    pub fn issue_token(&self, sub: i64, role: Role, duration: Option<Duration>) -> Result<String, AuthError> {
        let duration = duration.unwrap_or_else(|| Duration::hours(24));
        let exp = (Utc::now() + duration).timestamp().max(0) as usize;
        let claims = JwtClaims { sub, role, exp };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| AuthError::InvalidToken(format!("{e}")))
    }
}

pub fn hash_password(password: &str) -> Result<String, ServerError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServerError::Unspecified(format!("Could not hash the password. {e}")))?;
    Ok(hash.to_string())
}

/// Checks a password against a stored Argon2 hash. A wrong password is `Ok(false)`; `Err` means the stored hash
/// itself could not be used.
pub fn verify_password(hash: &str, password: &str) -> Result<bool, ServerError> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| ServerError::Unspecified(format!("Stored password hash is invalid. {e}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(ServerError::Unspecified(format!("Could not verify the password. {e}"))),
    }
}
