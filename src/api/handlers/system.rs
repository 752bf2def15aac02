// src/api/handlers/system.rs
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sysinfo::{System, SystemExt};

use crate::api::handlers::require_admin;
use crate::api::types::{LogListResponse, LogQuery, SuccessResponse, SystemStatusResponse};
use crate::core::AppState;
use crate::logging::{LogFilter, LogLevel};

/// Service status snapshot
#[utoipa::path(
    get,
    path = "/admin/status",
    tag = "Administration",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status snapshot", body = SystemStatusResponse),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn get_status(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Err(resp) = require_admin(&req) {
        return resp;
    }

    let users = state.db.count_users().await.unwrap_or(-1);
    let messages = state.db.count_blogs().await.unwrap_or(-1);

    let mut sys = System::new_all();
    sys.refresh_memory();

    HttpResponse::Ok().json(SystemStatusResponse {
        success: true,
        backend: state.db.get_backend_type().to_string(),
        users,
        messages,
        total_memory_kb: sys.total_memory(),
        used_memory_kb: sys.used_memory(),
        uptime_secs: sys.uptime(),
        error: None,
    })
}

fn parse_level(value: &str) -> Option<LogLevel> {
    match value.to_lowercase().as_str() {
        "debug" => Some(LogLevel::Debug),
        "info" => Some(LogLevel::Info),
        "warning" | "warn" => Some(LogLevel::Warning),
        "error" => Some(LogLevel::Error),
        _ => None,
    }
}

/// Query the structured application log
#[utoipa::path(
    get,
    path = "/admin/logs",
    tag = "Administration",
    security(("bearer_auth" = [])),
    params(LogQuery),
    responses(
        (status = 200, description = "Matching log entries", body = LogListResponse),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn get_logs(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<LogQuery>,
) -> impl Responder {
    if let Err(resp) = require_admin(&req) {
        return resp;
    }

    let filter = LogFilter {
        start_date: None,
        end_date: None,
        level: query.level.as_deref().and_then(parse_level),
        component: query.component.clone(),
        search_term: query.search.clone(),
        limit: query.limit,
        offset: query.offset,
    };

    match state.logger.get_logs(&filter) {
        Ok(entries) => HttpResponse::Ok().json(LogListResponse {
            success: true,
            entries,
            error: None,
        }),
        Err(e) => HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to read logs: {}", e))),
    }
}
