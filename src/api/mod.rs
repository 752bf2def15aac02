// src/api/mod.rs
use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use utoipa::{Modify, OpenApi};
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::AppState;

pub mod handlers;
pub mod middleware;
pub mod params;
pub mod routes;
pub mod types;

#[derive(Default)]
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// API documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Authentication endpoints
        crate::api::handlers::auth::signon,
        crate::api::handlers::auth::signoff,
        crate::api::handlers::auth::resume,
        crate::api::handlers::auth::status,
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::confirm,
        crate::api::handlers::auth::forgot_password,
        crate::api::handlers::auth::reset_password,
        crate::api::handlers::auth::password_strength,

        // Account endpoints
        crate::api::handlers::account::get_account,
        crate::api::handlers::account::update_account,

        // Message endpoints
        crate::api::handlers::blogs::post_blog,
        crate::api::handlers::blogs::reply_blog,
        crate::api::handlers::blogs::delete_blog,
        crate::api::handlers::blogs::blog_thread,
        crate::api::handlers::blogs::inbox,
        crate::api::handlers::blogs::site_blogs,

        // Administration endpoints
        crate::api::handlers::users::list_users,
        crate::api::handlers::users::update_user,
        crate::api::handlers::users::delete_user,
        crate::api::handlers::users::confirm_user,
        crate::api::handlers::users::reset_user_password,
        crate::api::handlers::users::bulk_mail,
        crate::api::handlers::advertisers::list_advertisers,
        crate::api::handlers::advertisers::get_advertiser,
        crate::api::handlers::advertisers::create_advertiser,
        crate::api::handlers::advertisers::update_advertiser,
        crate::api::handlers::advertisers::delete_advertiser,
        crate::api::handlers::advertisers::upload_ad_copy,
        crate::api::handlers::videos::list_videos,
        crate::api::handlers::videos::upsert_video,
        crate::api::handlers::videos::delete_video,
        crate::api::handlers::books::list_books,
        crate::api::handlers::books::upsert_book,
        crate::api::handlers::books::delete_book,
        crate::api::handlers::system::get_status,
        crate::api::handlers::system::get_logs
    ),
    components(
        schemas(
            crate::api::types::SignonRequest,
            crate::api::types::TokenResponse,
            crate::api::types::ResumeRequest,
            crate::api::types::StatusResponse,
            crate::api::types::SuccessResponse,
            crate::api::types::RegisterRequest,
            crate::api::types::RegisterResponse,
            crate::api::types::ForgotPasswordRequest,
            crate::api::types::ResetPasswordRequest,
            crate::api::types::StrengthResponse,
            crate::api::types::AccountResponse,
            crate::api::types::AccountUpdateRequest,
            crate::api::types::MessageEntry,
            crate::api::types::MessageListResponse,
            crate::api::types::PostBlogRequest,
            crate::api::types::PostBlogResponse,
            crate::api::types::ReplyBlogRequest,
            crate::api::types::DeleteBlogResponse,
            crate::api::types::ThreadResponse,
            crate::api::types::UserEntry,
            crate::api::types::UserListResponse,
            crate::api::types::AdminUserUpdateRequest,
            crate::api::types::BulkMailRequest,
            crate::api::types::BulkMailResponse,
            crate::api::types::AdvertiserEntry,
            crate::api::types::AdvertiserListResponse,
            crate::api::types::AdvertiserResponse,
            crate::api::types::AdvertiserCreateRequest,
            crate::api::types::AdvertiserUpdateRequest,
            crate::api::types::VideoListResponse,
            crate::api::types::VideoUpsertRequest,
            crate::api::types::BookListResponse,
            crate::api::types::BookUpsertRequest,
            crate::api::types::SystemStatusResponse,
            crate::api::types::LogListResponse,

            crate::core::strength::StrengthCategory,
            crate::core::strength::ThresholdPreset,
            crate::messages::thread::RenderedPost,
            crate::models::BlogRecord,
            crate::models::UserRecord,
            crate::models::Advertiser,
            crate::models::Video,
            crate::models::Book,
            crate::utils::DateDisplay,
            crate::logging::LogEntry,
            crate::logging::LogLevel,
            crate::logging::LogFilter
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Signon, registration, and password management"),
        (name = "Account", description = "The signed-on user's account settings"),
        (name = "Messages", description = "User-to-user and record-attached messages"),
        (name = "Administration", description = "User, advertiser, video, and book management")
    ),
    info(
        title = "FamilyTree Web Services",
        version = "0.1.0",
        description = "Account, messaging, and administration services for the family tree site",
        license(name = "MIT")
    )
)]
struct ApiDoc;

pub async fn start_server(state: AppState, port: u16) -> std::io::Result<()> {
    log::info!("Starting FamilyTree API server on port {}", port);

    let state_data = web::Data::new(state);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![
                "Authorization",
                "Content-Type",
                "Accept",
                "X-Requested-With",
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(state_data.clone())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            .service(Redoc::with_url("/redoc", ApiDoc::openapi()))
            .configure(routes::configure_routes)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
