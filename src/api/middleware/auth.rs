// src/api/middleware/auth.rs
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::{debug, warn};
use std::rc::Rc;

use crate::core::context::RequestUser;
use crate::core::AppState;

/// Rejects requests without a valid bearer token and stores the
/// resolved account in the request extensions for the handlers.
pub struct TokenValidator;

impl<S, B> Transform<S, ServiceRequest> for TokenValidator
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TokenValidatorMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TokenValidatorMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct TokenValidatorMiddleware<S> {
    service: Rc<S>,
}

/// Pull the raw token out of an `Authorization: Bearer ...` header.
pub fn bearer_token(req: &actix_web::HttpRequest) -> Result<String, String> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| "Missing authorization header".to_string())?;

    let header_str = header
        .to_str()
        .map_err(|_| "Invalid authorization header".to_string())?;

    if !header_str.starts_with("Bearer ") {
        return Err("Invalid authorization header format".to_string());
    }

    Ok(header_str[7..].to_string())
}

impl<S, B> Service<ServiceRequest> for TokenValidatorMiddleware<S>
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
        let service = Rc::clone(&self.service);

        // CORS preflight passes through untouched
        if req.method() == actix_web::http::Method::OPTIONS {
            let fut = service.call(req);
            return Box::pin(async move { fut.await });
        }

        Box::pin(async move {
            let token = match bearer_token(req.request()) {
                Ok(token) => token,
                Err(e) => {
                    warn!("Rejected request to {}: {}", req.path(), e);
                    return Err(actix_web::error::ErrorUnauthorized(e));
                }
            };

            let state = match req.app_data::<web::Data<AppState>>() {
                Some(state) => state.clone(),
                None => {
                    return Err(actix_web::error::ErrorInternalServerError(
                        "Application state missing",
                    ));
                }
            };

            let claims = match state.auth.validate_token(&state.db, &token).await {
                Ok(claims) => claims,
                Err(e) => {
                    warn!("Token validation failed: {}", e);
                    return Err(actix_web::error::ErrorUnauthorized(format!(
                        "Invalid or expired token: {}",
                        e
                    )));
                }
            };

            // resolve the account so handlers see current privileges,
            // not the ones frozen into the token at signon
            let user = match state.db.find_user_by_username(&claims.sub).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    warn!("Token for unknown account '{}'", claims.sub);
                    return Err(actix_web::error::ErrorUnauthorized("Unknown account"));
                }
                Err(e) => {
                    return Err(actix_web::error::ErrorInternalServerError(e.to_string()));
                }
            };

            debug!("Authenticated request for '{}'", user.username);
            req.extensions_mut().insert(RequestUser::from(&user));

            let fut = service.call(req);
            fut.await
        })
    }
}
