//! Route modules for PDF Shelf Server

pub mod files;
pub mod health;
pub mod pdfs;
pub mod push;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let library = state.config().library.clone();

    Router::new()
        .nest("/health", health::router())
        .nest("/api/pdfs", pdfs::router())
        .nest("/ws", push::router())
        .merge(files::router(&library))
        .merge(files::public_router(&library))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
