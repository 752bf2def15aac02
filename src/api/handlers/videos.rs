// src/api/handlers/videos.rs
use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::api::handlers::require_admin;
use crate::api::params;
use crate::api::types::{
    CatalogQuery, SuccessResponse, VideoDeleteQuery, VideoListResponse, VideoUpsertRequest,
};
use crate::core::AppState;
use crate::logging::LogLevel;
use crate::models::Video;

/// List the tutorial video catalog
#[utoipa::path(
    get,
    path = "/admin/videos",
    tag = "Administration",
    security(("bearer_auth" = [])),
    params(CatalogQuery),
    responses(
        (status = 200, description = "Matching videos", body = VideoListResponse),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_videos(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<CatalogQuery>,
) -> impl Responder {
    if let Err(resp) = require_admin(&req) {
        return resp;
    }

    let pattern = params::pattern(query.pattern.as_deref());
    let (offset, limit) = params::paging(query.offset, query.limit);

    let count = match state.db.count_videos(pattern.as_deref()).await {
        Ok(count) => count,
        Err(e) => {
            return HttpResponse::InternalServerError()
                .json(SuccessResponse::err(format!("Failed to count videos: {}", e)));
        }
    };

    match state.db.get_videos(pattern.as_deref(), offset, limit).await {
        Ok(videos) => HttpResponse::Ok().json(VideoListResponse {
            success: true,
            videos,
            count,
            error: None,
        }),
        Err(e) => HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to list videos: {}", e))),
    }
}

/// Create or update a catalog entry, keyed by file name and language
#[utoipa::path(
    put,
    path = "/admin/videos",
    tag = "Administration",
    security(("bearer_auth" = [])),
    request_body = VideoUpsertRequest,
    responses(
        (status = 200, description = "Catalog entry stored", body = SuccessResponse),
        (status = 400, description = "Missing file name or language", body = SuccessResponse)
    )
)]
pub async fn upsert_video(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<VideoUpsertRequest>,
) -> impl Responder {
    let admin = match require_admin(&req) {
        Ok(admin) => admin,
        Err(resp) => return resp,
    };

    let filename = body.filename.trim();
    if filename.is_empty() {
        return HttpResponse::BadRequest()
            .json(SuccessResponse::err("File name is required.".to_string()));
    }
    let lang = params::validate_lang(Some(&body.lang), &state.config.default_lang);

    let video = Video {
        filename: filename.to_string(),
        lang,
        description: body.description.clone().unwrap_or_default(),
        display: body.display.unwrap_or(true),
    };

    match state.db.upsert_video(&video).await {
        Ok(()) => {
            let _ = state.logger.log(
                LogLevel::Info,
                "Admin",
                "video catalog entry stored",
                Some(&admin.username),
            );
            HttpResponse::Ok().json(SuccessResponse::ok("Video stored."))
        }
        Err(e) => HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to store video: {}", e))),
    }
}

/// Remove a catalog entry
#[utoipa::path(
    delete,
    path = "/admin/videos",
    tag = "Administration",
    security(("bearer_auth" = [])),
    params(VideoDeleteQuery),
    responses(
        (status = 200, description = "Catalog entry removed", body = SuccessResponse)
    )
)]
pub async fn delete_video(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<VideoDeleteQuery>,
) -> impl Responder {
    let admin = match require_admin(&req) {
        Ok(admin) => admin,
        Err(resp) => return resp,
    };

    match state.db.delete_video(&query.filename, &query.lang).await {
        Ok(()) => {
            let _ = state.logger.log(
                LogLevel::Info,
                "Admin",
                "video catalog entry removed",
                Some(&admin.username),
            );
            HttpResponse::Ok().json(SuccessResponse::ok("Video removed."))
        }
        Err(e) => HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to remove video: {}", e))),
    }
}
