/// HTTP middleware for engagement-service
///
/// `IdentityMiddleware` resolves the caller from a Bearer token or the
/// `accessToken` cookie and stores the result in request extensions; the
/// `AuthenticatedUser` and `MaybeUser` extractors read it back in handlers.
/// `RequestMetrics` records per-route request counters and latencies.
mod metrics;

pub use metrics::RequestMetrics;

use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{http::header, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;

/// Cookie carrying the access token for browser clients
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Access token claims; `sub` is the user id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Verifies HS256 access tokens
pub struct JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Returns the user id carried by a valid token.
    pub fn validate(&self, token: &str) -> Result<Uuid, AppError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|_| AppError::Unauthorized("Invalid or expired access token".into()))?;
        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid access token subject".into()))
    }
}

/// Outcome of identity resolution, stored in request extensions
#[derive(Debug, Clone)]
enum Identity {
    Verified(Uuid),
    Rejected(String),
}

fn bearer_or_cookie(req: &ServiceRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    bearer.or_else(|| req.cookie(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_string()))
}

/// Resolves the caller without rejecting anonymous requests; routes that need
/// an identity ask for it through [`AuthenticatedUser`].
pub struct IdentityMiddleware {
    validator: Arc<JwtValidator>,
}

impl IdentityMiddleware {
    pub fn new(validator: Arc<JwtValidator>) -> Self {
        Self { validator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for IdentityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = IdentityMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IdentityMiddlewareService {
            service: Rc::new(service),
            validator: self.validator.clone(),
        }))
    }
}

pub struct IdentityMiddlewareService<S> {
    service: Rc<S>,
    validator: Arc<JwtValidator>,
}

impl<S, B> Service<ServiceRequest> for IdentityMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(token) = bearer_or_cookie(&req) {
            let identity = match self.validator.validate(&token) {
                Ok(user_id) => Identity::Verified(user_id),
                Err(e) => {
                    tracing::debug!(error = %e, path = %req.path(), "Access token rejected");
                    Identity::Rejected(e.to_string())
                }
            };
            req.extensions_mut().insert(identity);
        }

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}

/// Caller identity on routes that require one; 401 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.extensions().get::<Identity>() {
            Some(Identity::Verified(user_id)) => Ok(AuthenticatedUser(*user_id)),
            Some(Identity::Rejected(reason)) => Err(AppError::Unauthorized(reason.clone())),
            None => Err(AppError::Unauthorized("Unauthorized request".into())),
        };
        ready(result)
    }
}

/// Caller identity on routes where it is optional.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<Uuid>);

impl FromRequest for MaybeUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = match req.extensions().get::<Identity>() {
            Some(Identity::Verified(user_id)) => Some(*user_id),
            _ => None,
        };
        ready(Ok(MaybeUser(user)))
    }
}
