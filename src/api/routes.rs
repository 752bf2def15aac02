// src/api/routes.rs
use actix_web::web;

use super::handlers;
use super::middleware::auth::TokenValidator;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Authentication routes; public, some accept an optional token
    cfg.service(
        web::scope("/auth")
            .route("/signon", web::post().to(handlers::auth::signon))
            .route("/signoff", web::post().to(handlers::auth::signoff))
            .route("/resume", web::post().to(handlers::auth::resume))
            .route("/status", web::get().to(handlers::auth::status))
            .route("/register", web::post().to(handlers::auth::register))
            .route("/confirm", web::get().to(handlers::auth::confirm))
            .route(
                "/forgot-password",
                web::post().to(handlers::auth::forgot_password),
            )
            .route(
                "/reset-password",
                web::post().to(handlers::auth::reset_password),
            )
            .route(
                "/password-strength",
                web::get().to(handlers::auth::password_strength),
            ),
    );

    // Account management (token required)
    cfg.service(
        web::scope("/account")
            .wrap(TokenValidator)
            .route("", web::get().to(handlers::account::get_account))
            .route("", web::put().to(handlers::account::update_account)),
    );

    // The signed-on user's inbox (token required)
    cfg.service(
        web::scope("/messages")
            .wrap(TokenValidator)
            .route("", web::get().to(handlers::blogs::inbox)),
    );

    // Messages; posting and reading threads accept anonymous callers,
    // so these handlers check the token themselves
    cfg.service(
        web::scope("/blogs")
            .route("", web::post().to(handlers::blogs::post_blog))
            .route("", web::get().to(handlers::blogs::site_blogs))
            .route("/{id}/reply", web::post().to(handlers::blogs::reply_blog))
            .route("/{id}/thread", web::get().to(handlers::blogs::blog_thread))
            .route("/{id}", web::delete().to(handlers::blogs::delete_blog)),
    );

    // Administration (token required; handlers check for 'yes')
    cfg.service(
        web::scope("/admin")
            .wrap(TokenValidator)
            .route("/users", web::get().to(handlers::users::list_users))
            .route("/users/{id}", web::put().to(handlers::users::update_user))
            .route("/users/{id}", web::delete().to(handlers::users::delete_user))
            .route(
                "/users/{id}/confirm",
                web::post().to(handlers::users::confirm_user),
            )
            .route(
                "/users/{id}/reset-password",
                web::post().to(handlers::users::reset_user_password),
            )
            .route("/mail", web::post().to(handlers::users::bulk_mail))
            .route(
                "/advertisers",
                web::get().to(handlers::advertisers::list_advertisers),
            )
            .route(
                "/advertisers",
                web::post().to(handlers::advertisers::create_advertiser),
            )
            .route(
                "/advertisers/{name}",
                web::get().to(handlers::advertisers::get_advertiser),
            )
            .route(
                "/advertisers/{name}",
                web::put().to(handlers::advertisers::update_advertiser),
            )
            .route(
                "/advertisers/{name}",
                web::delete().to(handlers::advertisers::delete_advertiser),
            )
            .route(
                "/advertisers/{name}/ad",
                web::post().to(handlers::advertisers::upload_ad_copy),
            )
            .route("/videos", web::get().to(handlers::videos::list_videos))
            .route("/videos", web::put().to(handlers::videos::upsert_video))
            .route("/videos", web::delete().to(handlers::videos::delete_video))
            .route("/books", web::get().to(handlers::books::list_books))
            .route("/books", web::put().to(handlers::books::upsert_book))
            .route("/books/{isbn}", web::delete().to(handlers::books::delete_book))
            .route("/status", web::get().to(handlers::system::get_status))
            .route("/logs", web::get().to(handlers::system::get_logs)),
    );
}
