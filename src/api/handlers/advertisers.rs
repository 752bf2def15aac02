// src/api/handlers/advertisers.rs
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use futures::TryStreamExt;

use crate::api::handlers::require_admin;
use crate::api::params;
use crate::api::types::{
    AdvertiserCreateRequest, AdvertiserEntry, AdvertiserListResponse, AdvertiserResponse,
    AdvertiserUpdateRequest, CatalogQuery, SuccessResponse,
};
use crate::core::AppState;
use crate::db::DbError;
use crate::logging::LogLevel;
use crate::models::Advertiser;

fn advertiser_entry(ad: &Advertiser) -> AdvertiserEntry {
    AdvertiserEntry {
        name: ad.name.clone(),
        email: ad.email.clone(),
        has_ad_copy: ad.ad_copy.is_some(),
        monthly_clicks: ad.monthly_clicks.clone(),
        total_clicks: ad.yearly_total(),
    }
}

/// List advertisers with their monthly click counts
#[utoipa::path(
    get,
    path = "/admin/advertisers",
    tag = "Administration",
    security(("bearer_auth" = [])),
    params(CatalogQuery),
    responses(
        (status = 200, description = "Matching advertisers", body = AdvertiserListResponse),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_advertisers(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<CatalogQuery>,
) -> impl Responder {
    if let Err(resp) = require_admin(&req) {
        return resp;
    }

    let pattern = params::pattern(query.pattern.as_deref());
    let (offset, limit) = params::paging(query.offset, query.limit);

    let count = match state.db.count_advertisers(pattern.as_deref()).await {
        Ok(count) => count,
        Err(e) => {
            return HttpResponse::InternalServerError().json(SuccessResponse::err(format!(
                "Failed to count advertisers: {}",
                e
            )));
        }
    };

    match state
        .db
        .get_advertisers(pattern.as_deref(), offset, limit)
        .await
    {
        Ok(ads) => HttpResponse::Ok().json(AdvertiserListResponse {
            success: true,
            advertisers: ads.iter().map(advertiser_entry).collect(),
            count,
            error: None,
        }),
        Err(e) => HttpResponse::InternalServerError().json(SuccessResponse::err(format!(
            "Failed to list advertisers: {}",
            e
        ))),
    }
}

/// A single advertiser, including the uploaded advertisement copy
#[utoipa::path(
    get,
    path = "/admin/advertisers/{name}",
    tag = "Administration",
    security(("bearer_auth" = [])),
    params(("name" = String, Path, description = "Advertiser name")),
    responses(
        (status = 200, description = "Advertiser details", body = AdvertiserResponse),
        (status = 404, description = "No such advertiser", body = AdvertiserResponse)
    )
)]
pub async fn get_advertiser(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    if let Err(resp) = require_admin(&req) {
        return resp;
    }

    match state.db.get_advertiser(&path).await {
        Ok(Some(ad)) => HttpResponse::Ok().json(AdvertiserResponse {
            success: true,
            advertiser: Some(advertiser_entry(&ad)),
            ad_copy: ad.ad_copy,
            error: None,
        }),
        Ok(None) => HttpResponse::NotFound().json(AdvertiserResponse {
            success: false,
            advertiser: None,
            ad_copy: None,
            error: Some(format!("No advertiser named '{}'.", path)),
        }),
        Err(e) => HttpResponse::InternalServerError().json(AdvertiserResponse {
            success: false,
            advertiser: None,
            ad_copy: None,
            error: Some(e.to_string()),
        }),
    }
}

/// Register a new advertiser
#[utoipa::path(
    post,
    path = "/admin/advertisers",
    tag = "Administration",
    security(("bearer_auth" = [])),
    request_body = AdvertiserCreateRequest,
    responses(
        (status = 200, description = "Advertiser created", body = SuccessResponse),
        (status = 409, description = "Name already in use", body = SuccessResponse)
    )
)]
pub async fn create_advertiser(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<AdvertiserCreateRequest>,
) -> impl Responder {
    let admin = match require_admin(&req) {
        Ok(admin) => admin,
        Err(resp) => return resp,
    };

    let name = body.name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest()
            .json(SuccessResponse::err("Advertiser name is required.".to_string()));
    }

    match state.db.create_advertiser(name, body.email.trim()).await {
        Ok(()) => {
            let _ = state.logger.log(
                LogLevel::Info,
                "Admin",
                "advertiser created",
                Some(&admin.username),
            );
            HttpResponse::Ok().json(SuccessResponse::ok("Advertiser created."))
        }
        Err(DbError::Duplicate(_)) => HttpResponse::Conflict().json(SuccessResponse::err(
            format!("Advertiser name '{}' is already in use.", name),
        )),
        Err(e) => HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to create advertiser: {}", e))),
    }
}

/// Edit an advertiser's name or contact address
#[utoipa::path(
    put,
    path = "/admin/advertisers/{name}",
    tag = "Administration",
    security(("bearer_auth" = [])),
    params(("name" = String, Path, description = "Advertiser name")),
    request_body = AdvertiserUpdateRequest,
    responses(
        (status = 200, description = "Advertiser updated", body = SuccessResponse),
        (status = 404, description = "No such advertiser", body = SuccessResponse)
    )
)]
pub async fn update_advertiser(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<AdvertiserUpdateRequest>,
) -> impl Responder {
    if let Err(resp) = require_admin(&req) {
        return resp;
    }

    match state
        .db
        .update_advertiser(&path, body.name.as_deref(), body.email.as_deref())
        .await
    {
        Ok(()) => HttpResponse::Ok().json(SuccessResponse::ok("Advertiser updated.")),
        Err(DbError::NotFound) => HttpResponse::NotFound()
            .json(SuccessResponse::err(format!("No advertiser named '{}'.", path))),
        Err(e) => HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to update advertiser: {}", e))),
    }
}

/// Remove an advertiser
#[utoipa::path(
    delete,
    path = "/admin/advertisers/{name}",
    tag = "Administration",
    security(("bearer_auth" = [])),
    params(("name" = String, Path, description = "Advertiser name")),
    responses(
        (status = 200, description = "Advertiser deleted", body = SuccessResponse)
    )
)]
pub async fn delete_advertiser(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    let admin = match require_admin(&req) {
        Ok(admin) => admin,
        Err(resp) => return resp,
    };

    match state.db.delete_advertiser(&path).await {
        Ok(()) => {
            let _ = state.logger.log(
                LogLevel::Info,
                "Admin",
                "advertiser deleted",
                Some(&admin.username),
            );
            HttpResponse::Ok().json(SuccessResponse::ok("Advertiser deleted."))
        }
        Err(e) => HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to delete advertiser: {}", e))),
    }
}

/// Upload advertisement copy for an advertiser
///
/// Multipart upload; the first field is stored as the advertiser's
/// ad copy.
#[utoipa::path(
    post,
    path = "/admin/advertisers/{name}/ad",
    tag = "Administration",
    security(("bearer_auth" = [])),
    params(("name" = String, Path, description = "Advertiser name")),
    responses(
        (status = 200, description = "Advertisement stored", body = SuccessResponse),
        (status = 400, description = "Upload empty or unreadable", body = SuccessResponse),
        (status = 404, description = "No such advertiser", body = SuccessResponse)
    )
)]
pub async fn upload_ad_copy(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    mut payload: Multipart,
) -> impl Responder {
    let admin = match require_admin(&req) {
        Ok(admin) => admin,
        Err(resp) => return resp,
    };

    let mut body = Vec::new();
    loop {
        match payload.try_next().await {
            Ok(Some(mut field)) => loop {
                match field.try_next().await {
                    Ok(Some(chunk)) => body.extend_from_slice(&chunk),
                    Ok(None) => break,
                    Err(e) => {
                        return HttpResponse::BadRequest().json(SuccessResponse::err(format!(
                            "Failed to read upload: {}",
                            e
                        )));
                    }
                }
            },
            Ok(None) => break,
            Err(e) => {
                return HttpResponse::BadRequest()
                    .json(SuccessResponse::err(format!("Failed to read upload: {}", e)));
            }
        }
        if !body.is_empty() {
            break;
        }
    }

    if body.is_empty() {
        return HttpResponse::BadRequest()
            .json(SuccessResponse::err("Upload contained no advertisement.".to_string()));
    }

    let copy = match String::from_utf8(body) {
        Ok(copy) => copy,
        Err(_) => {
            return HttpResponse::BadRequest()
                .json(SuccessResponse::err("Advertisement must be UTF-8 text.".to_string()));
        }
    };

    match state.db.set_advertiser_copy(&path, &copy).await {
        Ok(()) => {
            let _ = state.logger.log(
                LogLevel::Info,
                "Admin",
                "advertisement copy uploaded",
                Some(&admin.username),
            );
            HttpResponse::Ok().json(SuccessResponse::ok("Advertisement stored."))
        }
        Err(DbError::NotFound) => HttpResponse::NotFound()
            .json(SuccessResponse::err(format!("No advertiser named '{}'.", path))),
        Err(e) => HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to store advertisement: {}", e))),
    }
}
