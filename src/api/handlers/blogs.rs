// src/api/handlers/blogs.rs
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::warn;

use crate::api::handlers::account::message_entry;
use crate::api::handlers::{optional_signon, signed_on};
use crate::api::params;
use crate::api::types::{
    DeleteBlogResponse, MessageListResponse, PostBlogRequest, PostBlogResponse, ReplyBlogRequest,
    SuccessResponse, ThreadResponse,
};
use crate::core::AppState;
use crate::logging::LogLevel;
use crate::mailer::OutboundMail;
use crate::messages::{self, registry, thread};
use crate::models::NewBlog;

/// Post a message against one or more records
///
/// Anonymous callers must supply an e-mail address; unknown addresses
/// get a visitor account created for them. Posting to a user also
/// delivers the message by e-mail. With `update` set and the `Blogs`
/// table, the identified message is edited in place instead.
#[utoipa::path(
    post,
    path = "/blogs",
    tag = "Messages",
    request_body = PostBlogRequest,
    responses(
        (status = 200, description = "Message posted", body = PostBlogResponse),
        (status = 400, description = "Bad table, key, or sender", body = PostBlogResponse),
        (status = 403, description = "Not authorized to edit the message", body = PostBlogResponse)
    )
)]
pub async fn post_blog(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<PostBlogRequest>,
) -> impl Responder {
    let fail = |status: actix_web::http::StatusCode, error: String| {
        HttpResponse::build(status).json(PostBlogResponse {
            success: false,
            posted: 0,
            error: Some(error),
        })
    };

    // individuals are the default target, as on the old site
    let table_param = body.table.as_deref().unwrap_or("tblIR");
    let table = match registry::by_name(table_param).or_else(|| registry::by_alias(table_param)) {
        Some(table) => table,
        None => {
            return fail(
                actix_web::http::StatusCode::BAD_REQUEST,
                format!("Unsupported table name '{}'.", table_param),
            );
        }
    };

    let keys = match params::parse_key_list(&body.key) {
        Ok(keys) => keys,
        Err(e) => return fail(actix_web::http::StatusCode::BAD_REQUEST, e),
    };

    let caller = optional_signon(&state, &req).await;
    let sender = match &caller {
        Some(user) => user.username.clone(),
        None => {
            let email = body.email.as_deref().map(str::trim).unwrap_or("");
            if email.is_empty() {
                return fail(
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "Posting user did not self identify.".to_string(),
                );
            }
            match messages::visitor_account(&state.db, email).await {
                Ok(user) => user.username,
                Err(e) => {
                    return fail(
                        actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to resolve sender: {}", e),
                    );
                }
            }
        }
    };

    let subject = match body.subject.as_deref().map(str::trim) {
        Some(subject) if !subject.is_empty() => subject.to_string(),
        _ => messages::default_subject(&body.message),
    };

    // edit in place
    if body.update.unwrap_or(false) && table.name == "Blogs" {
        let index = keys[0];
        let original = match state.db.get_blog(index).await {
            Ok(blog) => blog,
            Err(e) => {
                return fail(
                    actix_web::http::StatusCode::BAD_REQUEST,
                    format!("Message {} not found: {}", index, e),
                );
            }
        };
        let may_edit = caller
            .as_ref()
            .map_or(false, |u| u.username == original.username || u.is_admin());
        if !may_edit {
            return fail(
                actix_web::http::StatusCode::FORBIDDEN,
                "Messages may only be edited by their author.".to_string(),
            );
        }
        if let Err(e) = state.db.update_blog(index, &subject, &body.message).await {
            return fail(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to update message: {}", e),
            );
        }
        return HttpResponse::Ok().json(PostBlogResponse {
            success: true,
            posted: 1,
            error: None,
        });
    }

    let mut posted = 0;
    for key in &keys {
        let blog = NewBlog {
            table_name: table.name.to_string(),
            keyvalue: *key,
            username: sender.clone(),
            subject: subject.clone(),
            text: body.message.clone(),
        };
        if let Err(e) = state.db.add_blog(&blog).await {
            return fail(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to post message: {}", e),
            );
        }
        posted += 1;

        // a message to a person is also delivered by e-mail
        if table.name == "Users" {
            match state.db.get_user_by_id(*key).await {
                Ok(recipient) => {
                    let mail = OutboundMail::to_one(
                        &recipient.email,
                        &format!("[FamilyTree] {}", subject),
                        &body.message,
                    );
                    if let Err(e) = state.mailer.send(&mail).await {
                        warn!("Failed to e-mail message to '{}': {}", recipient.username, e);
                    }
                }
                Err(e) => warn!("Message posted to unknown user {}: {}", key, e),
            }
        }
    }

    let _ = state
        .logger
        .log(LogLevel::Info, "Messages", "message posted", Some(&sender));

    HttpResponse::Ok().json(PostBlogResponse {
        success: true,
        posted,
        error: None,
    })
}

/// Reply to a message
///
/// Sends the reply to the original sender's account, then removes the
/// original message when the caller is its sender or addressee.
#[utoipa::path(
    post,
    path = "/blogs/{id}/reply",
    tag = "Messages",
    params(("id" = i64, Path, description = "Message index")),
    request_body = ReplyBlogRequest,
    responses(
        (status = 200, description = "Reply sent", body = DeleteBlogResponse),
        (status = 401, description = "Not signed on"),
        (status = 403, description = "Not authorized to send messages", body = DeleteBlogResponse),
        (status = 404, description = "Message not found", body = DeleteBlogResponse)
    )
)]
pub async fn reply_blog(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<ReplyBlogRequest>,
) -> impl Responder {
    let ctx = match optional_signon(&state, &req).await {
        Some(ctx) => ctx,
        None => {
            return HttpResponse::Unauthorized()
                .json(SuccessResponse::err("Not signed on.".to_string()));
        }
    };
    if !ctx.can_blog() {
        return HttpResponse::Forbidden().json(DeleteBlogResponse {
            success: false,
            deleted: 0,
            error: Some("Not authorized to send blog messages.".to_string()),
        });
    }

    let index = path.into_inner();
    let original = match state.db.get_blog(index).await {
        Ok(blog) => blog,
        Err(e) => {
            return HttpResponse::NotFound().json(DeleteBlogResponse {
                success: false,
                deleted: 0,
                error: Some(format!("Message {} not found: {}", index, e)),
            });
        }
    };

    // the reply goes to the original sender's account
    let send_user = match state.db.find_user_by_username(&original.username).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::NotFound().json(DeleteBlogResponse {
                success: false,
                deleted: 0,
                error: Some(format!(
                    "Sender account '{}' no longer exists.",
                    original.username
                )),
            });
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(DeleteBlogResponse {
                success: false,
                deleted: 0,
                error: Some(e.to_string()),
            });
        }
    };

    let reply = NewBlog {
        table_name: "Users".to_string(),
        keyvalue: send_user.id,
        username: ctx.username.clone(),
        subject: messages::default_subject(&body.message),
        text: body.message.clone(),
    };
    if let Err(e) = state.db.add_blog(&reply).await {
        return HttpResponse::InternalServerError().json(DeleteBlogResponse {
            success: false,
            deleted: 0,
            error: Some(format!("Failed to send reply: {}", e)),
        });
    }

    // answering a message disposes of it, provided the caller was a
    // party to it
    let receiver = match messages::receiver_of(&state.db, &original).await {
        Ok(receiver) => receiver,
        Err(e) => {
            return HttpResponse::InternalServerError().json(DeleteBlogResponse {
                success: false,
                deleted: 0,
                error: Some(e.to_string()),
            });
        }
    };

    if ctx.username == original.username || receiver.as_deref() == Some(ctx.username.as_str()) {
        match state.db.delete_blog(index).await {
            Ok(deleted) => {
                let _ = state.logger.log(
                    LogLevel::Info,
                    "Messages",
                    "reply sent, original removed",
                    Some(&ctx.username),
                );
                HttpResponse::Ok().json(DeleteBlogResponse {
                    success: true,
                    deleted,
                    error: None,
                })
            }
            Err(e) => HttpResponse::InternalServerError().json(DeleteBlogResponse {
                success: false,
                deleted: 0,
                error: Some(format!("Failed to remove original message: {}", e)),
            }),
        }
    } else {
        HttpResponse::Ok().json(DeleteBlogResponse {
            success: true,
            deleted: 0,
            error: Some(
                "Blogs may only be deleted by the sender or the receiver of the message."
                    .to_string(),
            ),
        })
    }
}

/// Delete a message
///
/// Permitted to the sender, the addressee, or an administrator.
#[utoipa::path(
    delete,
    path = "/blogs/{id}",
    tag = "Messages",
    params(("id" = i64, Path, description = "Message index")),
    responses(
        (status = 200, description = "Message deleted", body = DeleteBlogResponse),
        (status = 401, description = "Not signed on"),
        (status = 403, description = "Caller is not a party to the message", body = DeleteBlogResponse),
        (status = 404, description = "Message not found", body = DeleteBlogResponse)
    )
)]
pub async fn delete_blog(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = match optional_signon(&state, &req).await {
        Some(ctx) => ctx,
        None => {
            return HttpResponse::Unauthorized()
                .json(SuccessResponse::err("Not signed on.".to_string()));
        }
    };
    if !ctx.can_blog() {
        return HttpResponse::Forbidden().json(DeleteBlogResponse {
            success: false,
            deleted: 0,
            error: Some("Not authorized to delete blogs.".to_string()),
        });
    }

    let index = path.into_inner();
    let blog = match state.db.get_blog(index).await {
        Ok(blog) => blog,
        Err(e) => {
            return HttpResponse::NotFound().json(DeleteBlogResponse {
                success: false,
                deleted: 0,
                error: Some(format!("Message {} not found: {}", index, e)),
            });
        }
    };

    let receiver = match messages::receiver_of(&state.db, &blog).await {
        Ok(receiver) => receiver,
        Err(e) => {
            return HttpResponse::InternalServerError().json(DeleteBlogResponse {
                success: false,
                deleted: 0,
                error: Some(e.to_string()),
            });
        }
    };

    if !messages::may_delete(&blog, receiver.as_deref(), &ctx) {
        return HttpResponse::Forbidden().json(DeleteBlogResponse {
            success: false,
            deleted: 0,
            error: Some(
                "Blogs may only be deleted by the sender or the receiver of the message."
                    .to_string(),
            ),
        });
    }

    match state.db.delete_blog(index).await {
        Ok(deleted) => {
            let _ = state.logger.log(
                LogLevel::Info,
                "Messages",
                "message deleted",
                Some(&ctx.username),
            );
            HttpResponse::Ok().json(DeleteBlogResponse {
                success: true,
                deleted,
                error: None,
            })
        }
        Err(e) => HttpResponse::InternalServerError().json(DeleteBlogResponse {
            success: false,
            deleted: 0,
            error: Some(format!("Failed to delete message: {}", e)),
        }),
    }
}

/// A message and its replies as a rendered thread
#[utoipa::path(
    get,
    path = "/blogs/{id}/thread",
    tag = "Messages",
    params(("id" = i64, Path, description = "Message index")),
    responses(
        (status = 200, description = "Thread in display order", body = ThreadResponse),
        (status = 404, description = "Message not found", body = ThreadResponse)
    )
)]
pub async fn blog_thread(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let index = path.into_inner();
    let root = match state.db.get_blog(index).await {
        Ok(blog) => blog,
        Err(e) => {
            return HttpResponse::NotFound().json(ThreadResponse {
                success: false,
                posts: Vec::new(),
                error: Some(format!("Message {} not found: {}", index, e)),
            });
        }
    };

    match thread::render_thread(&state.db, root).await {
        Ok(posts) => HttpResponse::Ok().json(ThreadResponse {
            success: true,
            posts,
            error: None,
        }),
        Err(e) => HttpResponse::InternalServerError().json(ThreadResponse {
            success: false,
            posts: Vec::new(),
            error: Some(format!("Failed to render thread: {}", e)),
        }),
    }
}

/// The signed-on user's inbox, newest first
#[utoipa::path(
    get,
    path = "/messages",
    tag = "Messages",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Messages addressed to the caller", body = MessageListResponse),
        (status = 401, description = "Not signed on")
    )
)]
pub async fn inbox(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let ctx = match signed_on(&req) {
        Some(ctx) => ctx,
        None => {
            return HttpResponse::Unauthorized()
                .json(SuccessResponse::err("Not signed on.".to_string()));
        }
    };

    match state.db.get_blogs_for("Users", ctx.id, true).await {
        Ok(blogs) => HttpResponse::Ok().json(MessageListResponse {
            success: true,
            messages: blogs.iter().map(message_entry).collect(),
            error: None,
        }),
        Err(e) => HttpResponse::InternalServerError().json(MessageListResponse {
            success: false,
            messages: Vec::new(),
            error: Some(format!("Failed to load messages: {}", e)),
        }),
    }
}

/// Site-level messages, for the administrator's blog management page
#[utoipa::path(
    get,
    path = "/blogs",
    tag = "Messages",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Site-level messages", body = MessageListResponse),
        (status = 401, description = "Not signed on"),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn site_blogs(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let ctx = match optional_signon(&state, &req).await {
        Some(ctx) => ctx,
        None => {
            return HttpResponse::Unauthorized()
                .json(SuccessResponse::err("Not signed on.".to_string()));
        }
    };
    if !ctx.is_admin() {
        return HttpResponse::Forbidden().json(SuccessResponse::err(
            "Only the administrator is authorized to use this function.".to_string(),
        ));
    }

    match state.db.get_blogs_for("Blogs", 0, true).await {
        Ok(blogs) => HttpResponse::Ok().json(MessageListResponse {
            success: true,
            messages: blogs.iter().map(message_entry).collect(),
            error: None,
        }),
        Err(e) => HttpResponse::InternalServerError().json(MessageListResponse {
            success: false,
            messages: Vec::new(),
            error: Some(format!("Failed to load messages: {}", e)),
        }),
    }
}
