// src/core/context.rs
//
// The authenticated caller, carried explicitly through each request
// instead of living in ambient state. The token middleware (or the
// optional-signon helper on public endpoints) resolves the bearer
// token to one of these and stores it in the request extensions.

use actix_web::{HttpMessage, HttpRequest};

use crate::models::UserRecord;

#[derive(Debug, Clone)]
pub struct RequestUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub auth: String,
}

impl RequestUser {
    pub fn is_admin(&self) -> bool {
        self.auth.contains("yes")
    }

    pub fn can_blog(&self) -> bool {
        self.is_admin() || self.auth.contains("blog")
    }

    /// Fetch the caller injected by the token middleware, if any.
    pub fn from_request(req: &HttpRequest) -> Option<Self> {
        req.extensions().get::<RequestUser>().cloned()
    }
}

impl From<&UserRecord> for RequestUser {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            auth: user.auth.clone(),
        }
    }
}
