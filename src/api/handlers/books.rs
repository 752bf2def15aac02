// src/api/handlers/books.rs
use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::api::handlers::require_admin;
use crate::api::params;
use crate::api::types::{BookListResponse, BookUpsertRequest, CatalogQuery, SuccessResponse};
use crate::core::AppState;
use crate::logging::LogLevel;
use crate::models::Book;

/// List the recommended book catalog
#[utoipa::path(
    get,
    path = "/admin/books",
    tag = "Administration",
    security(("bearer_auth" = [])),
    params(CatalogQuery),
    responses(
        (status = 200, description = "Matching books", body = BookListResponse),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_books(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<CatalogQuery>,
) -> impl Responder {
    if let Err(resp) = require_admin(&req) {
        return resp;
    }

    let pattern = params::pattern(query.pattern.as_deref());
    let (offset, limit) = params::paging(query.offset, query.limit);

    let count = match state.db.count_books(pattern.as_deref()).await {
        Ok(count) => count,
        Err(e) => {
            return HttpResponse::InternalServerError()
                .json(SuccessResponse::err(format!("Failed to count books: {}", e)));
        }
    };

    match state.db.get_books(pattern.as_deref(), offset, limit).await {
        Ok(books) => HttpResponse::Ok().json(BookListResponse {
            success: true,
            books,
            count,
            error: None,
        }),
        Err(e) => HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to list books: {}", e))),
    }
}

/// Create or update a book, keyed by ISBN
#[utoipa::path(
    put,
    path = "/admin/books",
    tag = "Administration",
    security(("bearer_auth" = [])),
    request_body = BookUpsertRequest,
    responses(
        (status = 200, description = "Book stored", body = SuccessResponse),
        (status = 400, description = "Missing ISBN or title", body = SuccessResponse)
    )
)]
pub async fn upsert_book(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<BookUpsertRequest>,
) -> impl Responder {
    let admin = match require_admin(&req) {
        Ok(admin) => admin,
        Err(resp) => return resp,
    };

    let isbn = body.isbn.trim();
    let title = body.title.trim();
    if isbn.is_empty() || title.is_empty() {
        return HttpResponse::BadRequest()
            .json(SuccessResponse::err("Both ISBN and title are required.".to_string()));
    }

    let book = Book {
        isbn: isbn.to_string(),
        title: title.to_string(),
    };

    match state.db.upsert_book(&book).await {
        Ok(()) => {
            let _ = state.logger.log(
                LogLevel::Info,
                "Admin",
                "book catalog entry stored",
                Some(&admin.username),
            );
            HttpResponse::Ok().json(SuccessResponse::ok("Book stored."))
        }
        Err(e) => HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to store book: {}", e))),
    }
}

/// Remove a book from the catalog
#[utoipa::path(
    delete,
    path = "/admin/books/{isbn}",
    tag = "Administration",
    security(("bearer_auth" = [])),
    params(("isbn" = String, Path, description = "Book ISBN")),
    responses(
        (status = 200, description = "Book removed", body = SuccessResponse)
    )
)]
pub async fn delete_book(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    let admin = match require_admin(&req) {
        Ok(admin) => admin,
        Err(resp) => return resp,
    };

    match state.db.delete_book(&path).await {
        Ok(()) => {
            let _ = state.logger.log(
                LogLevel::Info,
                "Admin",
                "book catalog entry removed",
                Some(&admin.username),
            );
            HttpResponse::Ok().json(SuccessResponse::ok("Book removed."))
        }
        Err(e) => HttpResponse::InternalServerError()
            .json(SuccessResponse::err(format!("Failed to remove book: {}", e))),
    }
}
