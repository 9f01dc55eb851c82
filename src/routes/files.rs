//! Static file serving
//!
//! PDFs, covers and the front-end shell come straight off disk. Missing files
//! are plain 404s from `ServeDir`.

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    Router,
};
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::LibraryConfig;
use crate::state::AppState;

/// `/pdfs` and `/covers` file trees
pub fn router(library: &LibraryConfig) -> Router<AppState> {
    let router =
        Router::new().nest_service("/covers", ServeDir::new(&library.covers_dir));

    let pdfs = ServeDir::new(&library.pdf_dir);
    if library.log_downloads {
        router.nest_service(
            "/pdfs",
            ServiceBuilder::new()
                .layer(middleware::from_fn(log_download))
                .service(pdfs),
        )
    } else {
        router.nest_service("/pdfs", pdfs)
    }
}

/// Front-end shell at `/` plus everything else under the public folder
pub fn public_router(library: &LibraryConfig) -> Router<AppState> {
    Router::new()
        .route_service("/", ServeFile::new(library.public_dir.join("index.html")))
        .fallback_service(ServeDir::new(&library.public_dir))
}

/// Log the decoded path of every PDF request
async fn log_download(request: Request, next: Next) -> Response {
    let path = request.uri().path();
    let decoded = urlencoding::decode(path)
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| path.to_string());
    tracing::info!("Download: {}", decoded);

    next.run(request).await
}
