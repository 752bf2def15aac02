// src/api/handlers/auth.rs
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{info, warn};

use crate::api::middleware::auth::bearer_token;
use crate::api::params;
use crate::api::types::{
    ConfirmQuery, ForgotPasswordRequest, RegisterRequest, RegisterResponse, ResetPasswordRequest,
    ResumeRequest, SignonRequest, StatusResponse, StrengthQuery, StrengthResponse,
    SuccessResponse, TokenResponse,
};
use crate::core::auth::PasswordCheck;
use crate::core::strength::{self, ThresholdPreset};
use crate::core::AppState;
use crate::logging::LogLevel;
use crate::mailer::OutboundMail;
use crate::models::{NewUser, UserRecord, UserUpdate};
use crate::recovery;
use crate::utils;

fn token_error(status: actix_web::http::StatusCode, error: String) -> HttpResponse {
    HttpResponse::build(status).json(TokenResponse {
        success: false,
        token: None,
        persistence_token: None,
        error: Some(error),
    })
}

/// Sign on with user name and password
///
/// Returns a JWT token for subsequent authenticated requests, plus a
/// persistence token when `remember` is set.
#[utoipa::path(
    post,
    path = "/auth/signon",
    tag = "Authentication",
    request_body = SignonRequest,
    responses(
        (status = 200, description = "Signed on", body = TokenResponse),
        (status = 400, description = "Missing user name or password", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = TokenResponse),
        (status = 500, description = "Internal server error", body = TokenResponse)
    )
)]
pub async fn signon(
    state: web::Data<AppState>,
    req: web::Json<SignonRequest>,
) -> impl Responder {
    let userid = req.userid.trim();
    let password = req.password.trim();

    if userid.is_empty() {
        return token_error(
            actix_web::http::StatusCode::BAD_REQUEST,
            "Specify a user name to sign on.".to_string(),
        );
    }

    let user = match state.db.find_user_by_username(userid).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("Signon attempt for unknown user '{}'", userid);
            return token_error(
                actix_web::http::StatusCode::UNAUTHORIZED,
                "User name or password incorrect.".to_string(),
            );
        }
        Err(e) => {
            return token_error(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to look up account: {}", e),
            );
        }
    };

    if password.is_empty() {
        return token_error(
            actix_web::http::StatusCode::BAD_REQUEST,
            "Enter the password for the account.".to_string(),
        );
    }

    match state.auth.verify_password(&user, password) {
        PasswordCheck::Match => {}
        PasswordCheck::MatchLegacy => {
            // verified against the old site's SHA-512 digest: rehash
            // with argon2 so the legacy digest can be retired
            match state.auth.hash_password(password) {
                Ok(hash) => {
                    if let Err(e) = state.db.set_password_hash(user.id, &hash).await {
                        warn!("Failed to upgrade password hash for '{}': {}", userid, e);
                    } else {
                        info!("Upgraded legacy password hash for '{}'", userid);
                    }
                }
                Err(e) => warn!("Failed to rehash password for '{}': {}", userid, e),
            }
        }
        PasswordCheck::NoMatch => {
            let _ = state.logger.log(
                LogLevel::Warning,
                "Auth",
                "signon rejected: bad password",
                Some(userid),
            );
            return token_error(
                actix_web::http::StatusCode::UNAUTHORIZED,
                "User name or password incorrect.".to_string(),
            );
        }
    }

    let token = match state.auth.open_session(&state.db, &user).await {
        Ok(token) => token,
        Err(e) => {
            return token_error(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to open session: {}", e),
            );
        }
    };

    let persistence_token = if req.remember.unwrap_or(false) {
        match state.auth.issue_persistence_token(&state.db, &user).await {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("Failed to issue persistence token for '{}': {}", userid, e);
                None
            }
        }
    } else {
        None
    };

    let _ = state
        .logger
        .log(LogLevel::Info, "Auth", "signed on", Some(userid));

    HttpResponse::Ok().json(TokenResponse {
        success: true,
        token: Some(token),
        persistence_token,
        error: None,
    })
}

/// Resume a remembered session
///
/// Exchanges a persistence token for a fresh JWT session token.
#[utoipa::path(
    post,
    path = "/auth/resume",
    tag = "Authentication",
    request_body = ResumeRequest,
    responses(
        (status = 200, description = "Session resumed", body = TokenResponse),
        (status = 401, description = "Unknown or expired persistence token", body = TokenResponse)
    )
)]
pub async fn resume(
    state: web::Data<AppState>,
    req: web::Json<ResumeRequest>,
) -> impl Responder {
    let user = match state.auth.resume_session(&state.db, &req.token).await {
        Ok(user) => user,
        Err(e) => {
            return token_error(
                actix_web::http::StatusCode::UNAUTHORIZED,
                format!("Persistence token not accepted: {}", e),
            );
        }
    };

    match state.auth.open_session(&state.db, &user).await {
        Ok(token) => HttpResponse::Ok().json(TokenResponse {
            success: true,
            token: Some(token),
            persistence_token: None,
            error: None,
        }),
        Err(e) => token_error(
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to open session: {}", e),
        ),
    }
}

/// Check whether the presented token is still valid
#[utoipa::path(
    get,
    path = "/auth/status",
    tag = "Authentication",
    responses(
        (status = 200, description = "Authentication status", body = StatusResponse)
    )
)]
pub async fn status(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Ok(token) = bearer_token(&req) {
        if let Ok(claims) = state.auth.validate_token(&state.db, &token).await {
            return HttpResponse::Ok().json(StatusResponse {
                success: true,
                authenticated: true,
                username: Some(claims.sub),
            });
        }
    }

    HttpResponse::Ok().json(StatusResponse {
        success: true,
        authenticated: false,
        username: None,
    })
}

/// Sign off, revoking the presented session
#[utoipa::path(
    post,
    path = "/auth/signoff",
    tag = "Authentication",
    responses(
        (status = 200, description = "Signed off", body = SuccessResponse),
        (status = 400, description = "Missing or invalid token", body = SuccessResponse)
    )
)]
pub async fn signoff(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let token = match bearer_token(&req) {
        Ok(token) => token,
        Err(e) => {
            return HttpResponse::BadRequest().json(SuccessResponse::err(e));
        }
    };

    match state.auth.close_session(&state.db, &token).await {
        Ok(()) => {
            info!("User signed off");
            HttpResponse::Ok().json(SuccessResponse::ok("Signed off."))
        }
        Err(e) => HttpResponse::BadRequest()
            .json(SuccessResponse::err(format!("Failed to sign off: {}", e))),
    }
}

fn valid_new_username(userid: &str) -> bool {
    let len = userid.chars().count();
    (6..=63).contains(&len) && !userid.chars().any(|c| matches!(c, '<' | '>' | '@' | '&'))
}

/// Register a new account
///
/// Validation failures are reported all at once in `messages`. On
/// success the account is created pending e-mail confirmation.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created, confirmation e-mail sent", body = RegisterResponse),
        (status = 400, description = "Validation failed", body = RegisterResponse),
        (status = 500, description = "Internal server error", body = RegisterResponse)
    )
)]
pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> impl Responder {
    let userid = req.userid.trim().to_string();
    let password = req.password.clone();
    let mut email = req
        .email
        .as_deref()
        .map(str::trim)
        .unwrap_or("")
        .to_string();
    // the old forms let people register with their address as their
    // user name and no separate e-mail field
    if email.is_empty() && userid.contains('@') {
        email = userid.clone();
    }

    let mut messages = Vec::new();

    if userid.chars().count() < 6 {
        messages.push("User name must be at least 6 characters long.".to_string());
    }
    if !valid_new_username(&userid) {
        messages.push(format!(
            "User name '{}' contains invalid characters or is too long.",
            userid
        ));
    }
    if password.chars().count() < 6 {
        messages.push("Password must be at least 6 characters long.".to_string());
    }
    if password != req.password2 {
        messages.push("The two copies of the password do not match.".to_string());
    }

    let mut already_registered = false;

    if !params::valid_email(&email) {
        messages.push(format!("E-mail address '{}' is invalid.", email));
    } else {
        match state.db.find_user_by_email(&email).await {
            Ok(Some(existing)) => {
                if existing.username == userid {
                    // the same person re-submitting the form
                    already_registered = true;
                } else {
                    messages.push(format!(
                        "Requested e-mail address '{}' is already in use.",
                        email
                    ));
                }
            }
            Ok(None) => match state.db.find_user_by_username(&userid).await {
                Ok(Some(_)) => {
                    messages.push(format!("Requested user name '{}' is already in use.", userid));
                }
                Ok(None) => {}
                Err(e) => {
                    return HttpResponse::InternalServerError().json(RegisterResponse {
                        success: false,
                        already_registered: false,
                        messages,
                        error: Some(e.to_string()),
                    });
                }
            },
            Err(e) => {
                return HttpResponse::InternalServerError().json(RegisterResponse {
                    success: false,
                    already_registered: false,
                    messages,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    if already_registered {
        return HttpResponse::Ok().json(RegisterResponse {
            success: false,
            already_registered: true,
            messages: Vec::new(),
            error: None,
        });
    }

    if !messages.is_empty() {
        return HttpResponse::BadRequest().json(RegisterResponse {
            success: false,
            already_registered: false,
            messages,
            error: None,
        });
    }

    let password_hash = match state.auth.hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            return HttpResponse::InternalServerError().json(RegisterResponse {
                success: false,
                already_registered: false,
                messages: Vec::new(),
                error: Some(e.to_string()),
            });
        }
    };

    let mut options = 0;
    if req.usemail.unwrap_or(false) {
        options |= UserRecord::OPT_USEMAIL_ON;
    }
    if req.nohelp.unwrap_or(false) {
        options |= UserRecord::OPT_NOHELP_ON;
    }

    let confirm_id = utils::random_confirm_id();
    let new_user = NewUser {
        username: userid.clone(),
        email: email.clone(),
        password_hash: Some(password_hash),
        auth: "pending".to_string(),
        options,
        confirm_id: Some(confirm_id.clone()),
    };

    let id = match state.db.create_user(&new_user).await {
        Ok(id) => id,
        Err(e) => {
            return HttpResponse::InternalServerError().json(RegisterResponse {
                success: false,
                already_registered: false,
                messages: Vec::new(),
                error: Some(format!("Failed to create account: {}", e)),
            });
        }
    };

    let confirm_link = format!(
        "{}/auth/confirm?id={}&userid={}&confirmid={}",
        state.config.public_base_url,
        id,
        urlencoding::encode(&userid),
        confirm_id
    );
    let mail = OutboundMail::to_one(
        &email,
        &format!("[FamilyTree] Thank you for registering, {}", userid),
        &format!(
            "<p>A new account '{}' was registered with this e-mail address.</p>\
             <p>To activate the account please confirm your address by \
             following <a href=\"{}\">this link</a>.</p>",
            userid, confirm_link
        ),
    );
    if let Err(e) = state.mailer.send(&mail).await {
        warn!("Failed to send confirmation e-mail to '{}': {}", email, e);
    }

    let _ = state
        .logger
        .log(LogLevel::Info, "Auth", "registered new account", Some(&userid));

    HttpResponse::Ok().json(RegisterResponse {
        success: true,
        already_registered: false,
        messages: Vec::new(),
        error: None,
    })
}

/// Confirm a registration from the e-mailed link
///
/// Promotes the account from `pending` to `blog,edit`.
#[utoipa::path(
    get,
    path = "/auth/confirm",
    tag = "Authentication",
    params(ConfirmQuery),
    responses(
        (status = 200, description = "Account confirmed", body = SuccessResponse),
        (status = 400, description = "Identifier mismatch", body = SuccessResponse)
    )
)]
pub async fn confirm(
    state: web::Data<AppState>,
    query: web::Query<ConfirmQuery>,
) -> impl Responder {
    let user = match state.db.get_user_by_id(query.id).await {
        Ok(user) => user,
        Err(_) => {
            return HttpResponse::BadRequest().json(SuccessResponse::err(format!(
                "Account identifier {} is invalid.",
                query.id
            )));
        }
    };

    if user.username != query.userid {
        return HttpResponse::BadRequest().json(SuccessResponse::err(format!(
            "User name '{}' does not match the account being confirmed.",
            query.userid
        )));
    }

    if user.confirm_id.as_deref() != Some(query.confirmid.as_str()) {
        return HttpResponse::BadRequest().json(SuccessResponse::err(format!(
            "Confirmation id '{}' is invalid.",
            query.confirmid
        )));
    }

    let update = UserUpdate {
        auth: Some("blog,edit".to_string()),
        ..Default::default()
    };
    if let Err(e) = state.db.update_user(user.id, &update).await {
        return HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to confirm account: {}", e)));
    }

    let _ = state.logger.log(
        LogLevel::Info,
        "Auth",
        "e-mail address confirmed",
        Some(&user.username),
    );

    HttpResponse::Ok().json(SuccessResponse::ok(
        "Your registration is confirmed. You may now sign on.",
    ))
}

async fn resolve_account(
    state: &AppState,
    userid: Option<&str>,
    email: Option<&str>,
) -> Result<UserRecord, String> {
    if let Some(userid) = userid.map(str::trim).filter(|u| !u.is_empty()) {
        return match state.db.find_user_by_username(userid).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(format!(
                "Unable to find account record for user '{}'.",
                userid
            )),
            Err(e) => Err(e.to_string()),
        };
    }
    if let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) {
        return match state.db.find_user_by_email(email).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(format!(
                "Unable to find account record for address '{}'.",
                email
            )),
            Err(e) => Err(e.to_string()),
        };
    }
    Err("Specify either the user name or the e-mail address of the account.".to_string())
}

/// Request a password-reset e-mail
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "Authentication",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset e-mail sent", body = SuccessResponse),
        (status = 400, description = "Account not found", body = SuccessResponse)
    )
)]
pub async fn forgot_password(
    state: web::Data<AppState>,
    req: web::Json<ForgotPasswordRequest>,
) -> impl Responder {
    let user = match resolve_account(&state, req.userid.as_deref(), req.email.as_deref()).await {
        Ok(user) => user,
        Err(e) => return HttpResponse::BadRequest().json(SuccessResponse::err(e)),
    };

    let code = recovery::create_reset_code(user.id);
    let link = format!(
        "{}/auth/reset-password?userid={}&validate={}",
        state.config.public_base_url,
        urlencoding::encode(&user.username),
        code
    );

    let mail = OutboundMail::to_one(
        &user.email,
        &format!("[FamilyTree] Password reset for {}", user.username),
        &format!(
            "<p>A password reset was requested for account '{}'.</p>\
             <p>To reset the password follow <a href=\"{}\">this link</a>. \
             The link is valid for one hour. If you did not request this \
             you can ignore this message.</p>",
            user.username, link
        ),
    );
    if let Err(e) = state.mailer.send(&mail).await {
        return HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to send reset e-mail: {}", e)));
    }

    let _ = state.logger.log(
        LogLevel::Info,
        "Auth",
        "password reset requested",
        Some(&user.username),
    );

    HttpResponse::Ok().json(SuccessResponse::ok(
        "Instructions for resetting the password have been e-mailed to the address on the account.",
    ))
}

/// Reset a password using an e-mailed authorization code
///
/// Generates a fresh random password and e-mails it to the account
/// owner, blind-copying the administrators.
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    tag = "Authentication",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset and e-mailed", body = SuccessResponse),
        (status = 400, description = "Bad account or authorization code", body = SuccessResponse)
    )
)]
pub async fn reset_password(
    state: web::Data<AppState>,
    req: web::Json<ResetPasswordRequest>,
) -> impl Responder {
    let user = match resolve_account(&state, req.userid.as_deref(), req.email.as_deref()).await {
        Ok(user) => user,
        Err(e) => return HttpResponse::BadRequest().json(SuccessResponse::err(e)),
    };

    match recovery::take_reset_code(&req.validate) {
        Some(user_id) if user_id == user.id => {}
        _ => {
            let _ = state.logger.log(
                LogLevel::Warning,
                "Auth",
                "password reset with invalid code",
                Some(&user.username),
            );
            return HttpResponse::BadRequest()
                .json(SuccessResponse::err("Invalid authorization code.".to_string()));
        }
    }

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

    // the administrators get a blind copy of every reset notice
    let bcc = match state.db.get_admins().await {
        Ok(admins) => admins.into_iter().map(|a| a.email).collect(),
        Err(e) => {
            warn!("Failed to list administrators for bcc: {}", e);
            Vec::new()
        }
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
        "Auth",
        "password reset completed",
        Some(&user.username),
    );

    HttpResponse::Ok().json(SuccessResponse::ok(
        "A new password has been e-mailed to the address on the account.",
    ))
}

/// Score a candidate password for the live strength indicator
///
/// The indicator shows exactly one of Poor, Weak, Good, Strong.
#[utoipa::path(
    get,
    path = "/auth/password-strength",
    tag = "Authentication",
    params(StrengthQuery),
    responses(
        (status = 200, description = "Strength estimate", body = StrengthResponse)
    )
)]
pub async fn password_strength(query: web::Query<StrengthQuery>) -> impl Responder {
    let preset = match query.preset.as_deref() {
        Some("account") => ThresholdPreset::AccountForm,
        _ => ThresholdPreset::RegistrationForm,
    };
    let (score, category) = strength::evaluate(&query.password, preset);

    HttpResponse::Ok().json(StrengthResponse {
        success: true,
        score,
        category,
    })
}
