//! PDF listing API

use axum::{extract::State, routing::get, Json, Router};

use crate::error::Result;
use crate::library::CatalogRecord;
use crate::state::AppState;

/// Create the listing router
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_pdfs))
}

/// List every PDF with its size, cover URL and download URL
async fn list_pdfs(State(state): State<AppState>) -> Result<Json<Vec<CatalogRecord>>> {
    let records = state.catalog().list().await?;
    tracing::debug!("Listing {} PDFs", records.len());
    Ok(Json(records))
}
