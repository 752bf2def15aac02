// src/api/handlers/account.rs
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::warn;

use crate::api::handlers::signed_on;
use crate::api::params;
use crate::api::types::{AccountResponse, AccountUpdateRequest, MessageEntry, SuccessResponse};
use crate::core::auth::PasswordCheck;
use crate::core::AppState;
use crate::logging::LogLevel;
use crate::models::{BlogRecord, UserRecord, UserUpdate};
use crate::utils::split_datetime;

pub(crate) fn message_entry(blog: &BlogRecord) -> MessageEntry {
    MessageEntry {
        index: blog.index,
        username: blog.username.clone(),
        subject: blog.subject.clone(),
        text: blog.text.clone(),
        table: blog.table_name.clone(),
        keyvalue: blog.keyvalue,
        posted: split_datetime(blog.datetime),
    }
}

/// Current account settings
///
/// Includes the messages addressed to the account, newest first.
#[utoipa::path(
    get,
    path = "/account",
    tag = "Account",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account details", body = AccountResponse),
        (status = 401, description = "Not signed on")
    )
)]
pub async fn get_account(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let ctx = match signed_on(&req) {
        Some(ctx) => ctx,
        None => {
            return HttpResponse::Unauthorized()
                .json(SuccessResponse::err("Not signed on.".to_string()));
        }
    };

    let user = match state.db.get_user_by_id(ctx.id).await {
        Ok(user) => user,
        Err(e) => {
            return HttpResponse::InternalServerError()
                .json(SuccessResponse::err(format!("Failed to load account: {}", e)));
        }
    };

    let messages = match state.db.get_blogs_for("Users", user.id, true).await {
        Ok(blogs) => blogs.iter().map(message_entry).collect(),
        Err(e) => {
            warn!("Failed to load messages for '{}': {}", user.username, e);
            Vec::new()
        }
    };

    HttpResponse::Ok().json(AccountResponse {
        success: true,
        userid: user.username.clone(),
        email: user.email.clone(),
        usemail: user.use_email(),
        nohelp: user.no_help(),
        auth: user.auth.clone(),
        messages,
        error: None,
    })
}

/// Update account settings
///
/// Every change requires the current password. The notification and
/// help options are rebuilt from the submitted flags on each update.
#[utoipa::path(
    put,
    path = "/account",
    tag = "Account",
    security(("bearer_auth" = [])),
    request_body = AccountUpdateRequest,
    responses(
        (status = 200, description = "Account updated", body = SuccessResponse),
        (status = 400, description = "Validation failed", body = SuccessResponse),
        (status = 401, description = "Not signed on")
    )
)]
pub async fn update_account(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<AccountUpdateRequest>,
) -> impl Responder {
    let ctx = match signed_on(&req) {
        Some(ctx) => ctx,
        None => {
            return HttpResponse::Unauthorized()
                .json(SuccessResponse::err("Not signed on.".to_string()));
        }
    };

    let user = match state.db.get_user_by_id(ctx.id).await {
        Ok(user) => user,
        Err(e) => {
            return HttpResponse::InternalServerError()
                .json(SuccessResponse::err(format!("Failed to load account: {}", e)));
        }
    };

    let mut msg = String::new();

    if let Some(userid) = body.userid.as_deref() {
        if userid != user.username {
            msg.push_str("Attempt to bypass security by changing userid. ");
        }
    }

    let password = body.password.trim();
    if password.is_empty() {
        msg.push_str("Password must be specified to change account settings. ");
    } else if state.auth.verify_password(&user, password) == PasswordCheck::NoMatch {
        msg.push_str("Password must match the current password on the account. ");
    }

    let new_password = body.newpassword.as_deref().map(str::trim).unwrap_or("");
    if !new_password.is_empty() {
        let repeat = body.newpassword2.as_deref().map(str::trim).unwrap_or("");
        if new_password != repeat {
            msg.push_str(
                "To change the password on the account you must supply the new password twice. ",
            );
        }
    }

    let mut new_email = None;
    if let Some(email) = body.email.as_deref().map(str::trim) {
        if email.contains('\'') {
            msg.push_str("Invalid email address. ");
        } else if !email.is_empty() && email != user.email {
            if !params::valid_email(email) {
                msg.push_str("Invalid email address. ");
            } else {
                match state.db.find_user_by_email(email).await {
                    Ok(Some(_)) => {
                        msg.push_str(&format!(
                            "Requested e-mail address '{}' is already in use. ",
                            email
                        ));
                    }
                    Ok(None) => new_email = Some(email.to_string()),
                    Err(e) => {
                        return HttpResponse::InternalServerError().json(SuccessResponse::err(
                            format!("Failed to check e-mail address: {}", e),
                        ));
                    }
                }
            }
        }
    }

    if !msg.is_empty() {
        return HttpResponse::BadRequest().json(SuccessResponse::err(msg.trim_end().to_string()));
    }

    // the option bits are rebuilt from the checkboxes on every submit
    let mut options = user.options & !UserRecord::OPT_USEMAIL_ON & !UserRecord::OPT_NOHELP_ON;
    if body.usemail.unwrap_or(false) {
        options |= UserRecord::OPT_USEMAIL_ON;
    }
    if body.nohelp.unwrap_or(false) {
        options |= UserRecord::OPT_NOHELP_ON;
    }

    let update = UserUpdate {
        email: new_email,
        options: Some(options),
        ..Default::default()
    };
    if let Err(e) = state.db.update_user(user.id, &update).await {
        return HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to update account: {}", e)));
    }

    if !new_password.is_empty() {
        let hash = match state.auth.hash_password(new_password) {
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
    }

    let _ = state.logger.log(
        LogLevel::Info,
        "Account",
        "account settings updated",
        Some(&user.username),
    );

    HttpResponse::Ok().json(SuccessResponse::ok("Account updated."))
}
