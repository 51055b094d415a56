//! API routes

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    // HANJI_CORS_ORIGINS: comma-separated origins, or "*" for any
    let cors = match std::env::var("HANJI_CORS_ORIGINS").ok() {
        Some(origins) if origins == "*" => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        Some(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::new()
            .allow_origin(AllowOrigin::list([
                "http://localhost:3000".parse().unwrap(),
                "http://127.0.0.1:3000".parse().unwrap(),
            ]))
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let api_routes = Router::new()
        // Document registry
        .route("/documents", get(handlers::list_documents))
        .route("/documents", post(handlers::open_document))
        .route("/documents/{id}", get(handlers::get_document))
        .route(
            "/documents/{id}",
            axum::routing::delete(handlers::close_document),
        )
        .route("/documents/{id}/download", get(handlers::download_document))
        // Queries
        .route("/documents/{id}/text", get(handlers::get_text))
        .route("/documents/{id}/paragraphs", get(handlers::get_paragraphs))
        .route("/documents/{id}/tables", get(handlers::get_tables))
        .route("/documents/{id}/images", get(handlers::get_images))
        .route("/documents/{id}/page-breaks", get(handlers::get_page_breaks))
        .route("/documents/{id}/search", get(handlers::search))
        // Edits
        .route("/documents/{id}/replace", post(handlers::replace_text))
        .route("/documents/{id}/paragraphs", post(handlers::insert_paragraph))
        .route(
            "/documents/{id}/paragraphs/{section}/{paragraph}",
            axum::routing::put(handlers::set_paragraph_text)
                .delete(handlers::delete_paragraph),
        )
        .route(
            "/documents/{id}/paragraphs/{section}/{paragraph}/style",
            post(handlers::set_paragraph_style),
        )
        .route(
            "/documents/{id}/paragraphs/{section}/{paragraph}/char-style",
            post(handlers::set_char_style),
        )
        .route(
            "/documents/{id}/paragraphs/{section}/{paragraph}/page-break",
            post(handlers::set_page_break),
        )
        .route(
            "/documents/{id}/paragraphs/{section}/{paragraph}/column-break",
            post(handlers::set_column_break),
        )
        .route("/documents/{id}/paragraphs/move", post(handlers::move_paragraph))
        .route("/documents/{id}/paragraphs/copy", post(handlers::copy_paragraph))
        .route("/documents/{id}/tables", post(handlers::insert_table))
        .route("/documents/{id}/images", post(handlers::insert_image));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
