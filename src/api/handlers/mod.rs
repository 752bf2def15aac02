// src/api/handlers/mod.rs
pub mod account;
pub mod advertisers;
pub mod auth;
pub mod blogs;
pub mod books;
pub mod system;
pub mod users;
pub mod videos;

use actix_web::{HttpRequest, HttpResponse};

use crate::api::middleware::auth::bearer_token;
use crate::api::types::SuccessResponse;
use crate::core::context::RequestUser;
use crate::core::AppState;

/// The account resolved by the token middleware. Only meaningful on
/// routes wrapped with `TokenValidator`.
pub(crate) fn signed_on(req: &HttpRequest) -> Option<RequestUser> {
    RequestUser::from_request(req)
}

/// Resolve the caller on endpoints that accept anonymous requests:
/// a valid bearer token yields the account, anything else is treated
/// as not signed on.
pub(crate) async fn optional_signon(state: &AppState, req: &HttpRequest) -> Option<RequestUser> {
    let token = bearer_token(req).ok()?;
    let claims = state.auth.validate_token(&state.db, &token).await.ok()?;
    let user = state.db.find_user_by_username(&claims.sub).await.ok()??;
    Some(RequestUser::from(&user))
}

/// Administrator gate used by the management endpoints; mirrors the
/// old pages which rendered a "not authorized" notice instead of the
/// form.
pub(crate) fn require_admin(req: &HttpRequest) -> Result<RequestUser, HttpResponse> {
    match signed_on(req) {
        Some(user) if user.is_admin() => Ok(user),
        Some(_) => Err(HttpResponse::Forbidden().json(SuccessResponse::err(
            "Only the administrator is authorized to use this function.".to_string(),
        ))),
        None => Err(HttpResponse::Unauthorized()
            .json(SuccessResponse::err("Not signed on.".to_string()))),
    }
}
