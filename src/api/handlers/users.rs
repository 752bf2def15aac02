// src/api/handlers/users.rs
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::warn;

use crate::api::handlers::require_admin;
use crate::api::params;
use crate::api::types::{
    AdminUserUpdateRequest, BulkMailRequest, BulkMailResponse, SuccessResponse, UserEntry,
    UserListQuery, UserListResponse,
};
use crate::core::AppState;
use crate::logging::LogLevel;
use crate::mailer::{self, OutboundMail};
use crate::models::{UserFilter, UserRecord, UserUpdate};
use crate::utils;

fn user_entry(user: &UserRecord) -> UserEntry {
    UserEntry {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        auth: user.auth.clone(),
        usemail: user.use_email(),
        nohelp: user.no_help(),
    }
}

fn filter_from(query: &UserListQuery) -> UserFilter {
    let (offset, limit) = params::paging(query.offset, query.limit);
    UserFilter {
        username_pattern: params::pattern(query.pattern.as_deref()),
        auth_pattern: params::pattern(query.authpattern.as_deref()),
        email_pattern: params::pattern(query.mailpattern.as_deref()),
        offset,
        limit,
    }
}

/// List registered users
///
/// Filterable by user name, authorization, and e-mail substrings. The
/// response carries the bulk-mailing lists for the matching accounts:
/// administrators openly addressed, everyone else blind-copied.
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Administration",
    security(("bearer_auth" = [])),
    params(UserListQuery),
    responses(
        (status = 200, description = "Matching users", body = UserListResponse),
        (status = 401, description = "Not signed on"),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_users(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<UserListQuery>,
) -> impl Responder {
    if let Err(resp) = require_admin(&req) {
        return resp;
    }

    let filter = filter_from(&query);

    let count = match state.db.count_filtered_users(&filter).await {
        Ok(count) => count,
        Err(e) => {
            return HttpResponse::InternalServerError()
                .json(SuccessResponse::err(format!("Failed to count users: {}", e)));
        }
    };

    let page = match state.db.get_filtered_users(&filter).await {
        Ok(users) => users,
        Err(e) => {
            return HttpResponse::InternalServerError()
                .json(SuccessResponse::err(format!("Failed to list users: {}", e)));
        }
    };

    // the mailing lists cover every match, not just the current page,
    // and only accounts that asked for e-mail
    let all_filter = UserFilter {
        offset: 0,
        limit: i64::MAX,
        ..filter.clone()
    };
    let (tolist, bcclist) = match state.db.get_filtered_users(&all_filter).await {
        Ok(users) => {
            let mailable: Vec<UserRecord> = users
                .into_iter()
                .filter(|u| u.is_admin() || u.use_email())
                .collect();
            mailer::mailing_lists(&mailable)
        }
        Err(e) => {
            warn!("Failed to assemble mailing lists: {}", e);
            (Vec::new(), Vec::new())
        }
    };

    HttpResponse::Ok().json(UserListResponse {
        success: true,
        users: page.iter().map(user_entry).collect(),
        count,
        offset: filter.offset,
        limit: filter.limit,
        tolist,
        bcclist,
        error: None,
    })
}

/// Edit a user's name, e-mail address, or authorization
#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    tag = "Administration",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Account id")),
    request_body = AdminUserUpdateRequest,
    responses(
        (status = 200, description = "User updated", body = SuccessResponse),
        (status = 404, description = "No such user", body = SuccessResponse)
    )
)]
pub async fn update_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<AdminUserUpdateRequest>,
) -> impl Responder {
    let admin = match require_admin(&req) {
        Ok(admin) => admin,
        Err(resp) => return resp,
    };

    let update = UserUpdate {
        username: body.username.clone(),
        email: body.email.clone(),
        auth: body.auth.clone(),
        ..Default::default()
    };

    match state.db.update_user(path.into_inner(), &update).await {
        Ok(()) => {
            let _ = state.logger.log(
                LogLevel::Info,
                "Admin",
                "user record updated",
                Some(&admin.username),
            );
            HttpResponse::Ok().json(SuccessResponse::ok("User updated."))
        }
        Err(crate::db::DbError::NotFound) => {
            HttpResponse::NotFound().json(SuccessResponse::err("No such user.".to_string()))
        }
        Err(e) => HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to update user: {}", e))),
    }
}

/// Delete a user account
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    tag = "Administration",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Account id")),
    responses(
        (status = 200, description = "User deleted", body = SuccessResponse)
    )
)]
pub async fn delete_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let admin = match require_admin(&req) {
        Ok(admin) => admin,
        Err(resp) => return resp,
    };

    match state.db.delete_user(path.into_inner()).await {
        Ok(()) => {
            let _ = state.logger.log(
                LogLevel::Info,
                "Admin",
                "user record deleted",
                Some(&admin.username),
            );
            HttpResponse::Ok().json(SuccessResponse::ok("User deleted."))
        }
        Err(e) => HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to delete user: {}", e))),
    }
}

/// Manually confirm a stuck registration
///
/// Promotes the account to `blog,edit` and sends the apology note the
/// administrator has always sent for registrations the confirmation
/// e-mail failed to reach.
#[utoipa::path(
    post,
    path = "/admin/users/{id}/confirm",
    tag = "Administration",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Account id")),
    responses(
        (status = 200, description = "User confirmed", body = SuccessResponse),
        (status = 404, description = "No such user", body = SuccessResponse)
    )
)]
pub async fn confirm_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let admin = match require_admin(&req) {
        Ok(admin) => admin,
        Err(resp) => return resp,
    };

    let user = match state.db.get_user_by_id(path.into_inner()).await {
        Ok(user) => user,
        Err(_) => {
            return HttpResponse::NotFound()
                .json(SuccessResponse::err("No such user.".to_string()));
        }
    };

    let update = UserUpdate {
        auth: Some("blog,edit".to_string()),
        ..Default::default()
    };
    if let Err(e) = state.db.update_user(user.id, &update).await {
        return HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to confirm user: {}", e)));
    }

    let mail = OutboundMail::to_one(
        &user.email,
        &format!(
            "[FamilyTree] Thank You for Registering as User {}",
            user.username
        ),
        "<p>I apologize for the technical difficulties in registration. \
         I have manually confirmed your registration. Thank you.</p>\
         <p>Administrator</p>",
    );
    if let Err(e) = state.mailer.send(&mail).await {
        warn!("Failed to send confirmation note to '{}': {}", user.username, e);
    }

    let _ = state.logger.log(
        LogLevel::Info,
        "Admin",
        "registration manually confirmed",
        Some(&admin.username),
    );

    HttpResponse::Ok().json(SuccessResponse::ok("User confirmed."))
}

/// Reset a user's password
///
/// Generates a fresh random password, stores its hash, and e-mails it
/// to the account owner with the administrators blind-copied.
#[utoipa::path(
    post,
    path = "/admin/users/{id}/reset-password",
    tag = "Administration",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Account id")),
    responses(
        (status = 200, description = "Password reset and e-mailed", body = SuccessResponse),
        (status = 404, description = "No such user", body = SuccessResponse)
    )
)]
pub async fn reset_user_password(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let admin = match require_admin(&req) {
        Ok(admin) => admin,
        Err(resp) => return resp,
    };

    let user = match state.db.get_user_by_id(path.into_inner()).await {
        Ok(user) => user,
        Err(_) => {
            return HttpResponse::NotFound()
                .json(SuccessResponse::err("No such user.".to_string()));
        }
    };

    let new_password = utils::random_password(10);
    let hash = match state.auth.hash_password(&new_password) {
        Ok(hash) => hash,
        Err(e) => {
            return HttpResponse::InternalServerError()
                .json(SuccessResponse::err(format!("Failed to hash password: {}", e)));
        }
    };
    if let Err(e) = state.db.set_password_hash(user.id, &hash).await {
        return HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to store password: {}", e)));
    }

    let bcc = match state.db.get_admins().await {
        Ok(admins) => admins.into_iter().map(|a| a.email).collect(),
        Err(_) => Vec::new(),
    };

    let mail = OutboundMail {
        to: vec![user.email.clone()],
        bcc,
        subject: format!("[FamilyTree] New password for {}", user.username),
        body: format!(
            "<p>The password on account '{}' has been reset to:</p>\
             <p><b>{}</b></p>\
             <p>Please sign on and change it to a password of your own.</p>",
            user.username, new_password
        ),
    };
    if let Err(e) = state.mailer.send(&mail).await {
        return HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to send password e-mail: {}", e)));
    }

    let _ = state.logger.log(
        LogLevel::Info,
        "Admin",
        "user password reset",
        Some(&admin.username),
    );

    HttpResponse::Ok().json(SuccessResponse::ok(
        "A new password has been e-mailed to the address on the account.",
    ))
}

/// Send a bulk mailing to matching users
///
/// Administrators land in the open to-list; every other match that has
/// opted into e-mail is blind-copied.
#[utoipa::path(
    post,
    path = "/admin/mail",
    tag = "Administration",
    security(("bearer_auth" = [])),
    request_body = BulkMailRequest,
    responses(
        (status = 200, description = "Mailing dispatched", body = BulkMailResponse)
    )
)]
pub async fn bulk_mail(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<BulkMailRequest>,
) -> impl Responder {
    let admin = match require_admin(&req) {
        Ok(admin) => admin,
        Err(resp) => return resp,
    };

    let filter = UserFilter {
        username_pattern: params::pattern(body.pattern.as_deref()),
        auth_pattern: params::pattern(body.authpattern.as_deref()),
        email_pattern: params::pattern(body.mailpattern.as_deref()),
        offset: 0,
        limit: i64::MAX,
    };

    let users = match state.db.get_filtered_users(&filter).await {
        Ok(users) => users,
        Err(e) => {
            return HttpResponse::InternalServerError().json(BulkMailResponse {
                success: false,
                to_count: 0,
                bcc_count: 0,
                sent: false,
                error: Some(format!("Failed to list users: {}", e)),
            });
        }
    };

    let mailable: Vec<UserRecord> = users
        .into_iter()
        .filter(|u| u.is_admin() || u.use_email())
        .collect();
    let (tolist, bcclist) = mailer::mailing_lists(&mailable);
    let to_count = tolist.len();
    let bcc_count = bcclist.len();

    let mail = OutboundMail {
        to: tolist,
        bcc: bcclist,
        subject: body.subject.clone(),
        body: body.body.clone(),
    };
    let sent = match state.mailer.send(&mail).await {
        Ok(sent) => sent,
        Err(e) => {
            return HttpResponse::InternalServerError().json(BulkMailResponse {
                success: false,
                to_count,
                bcc_count,
                sent: false,
                error: Some(format!("Failed to send mailing: {}", e)),
            });
        }
    };

    let _ = state.logger.log(
        LogLevel::Info,
        "Admin",
        "bulk mailing dispatched",
        Some(&admin.username),
    );

    HttpResponse::Ok().json(BulkMailResponse {
        success: true,
        to_count,
        bcc_count,
        sent,
        error: None,
    })
}
