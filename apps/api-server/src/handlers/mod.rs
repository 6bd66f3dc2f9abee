//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Publishing
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::publish))
                    .route("/search", web::get().to(posts::search))
                    .route("/tags/{tag}", web::get().to(posts::by_tag))
                    .route("/{post_id}", web::get().to(posts::detail))
                    .route("/{post_id}", web::put().to(posts::edit))
                    .route("/{post_id}", web::delete().to(posts::delete))
                    .route("/{post_id}/comments", web::get().to(comments::list_for_post))
                    .route("/{post_id}/comments", web::post().to(comments::create)),
            )
            // Discussion
            .service(
                web::scope("/comments")
                    .route("/{comment_id}", web::get().to(comments::detail))
                    .route("/{comment_id}", web::put().to(comments::edit))
                    .route("/{comment_id}", web::delete().to(comments::delete))
                    .route("/{comment_id}/replies", web::get().to(comments::replies))
                    .route("/{comment_id}/replies", web::post().to(comments::reply)),
            ),
    );
}

#[cfg(test)]
mod tests;
