//! Document registry handlers

use super::ApiError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use hanji_core::DocumentHandle;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct OpenQuery {
    /// Display name for the opened document
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub name: String,
    pub title: String,
    pub sections: usize,
    pub paragraphs: usize,
    pub opened_at: chrono::DateTime<chrono::Utc>,
}

/// Open a package uploaded as the raw request body
pub async fn open_document(
    State(state): State<AppState>,
    Query(query): Query<OpenQuery>,
    body: Bytes,
) -> Result<Json<DocumentSummary>, ApiError> {
    let handle = DocumentHandle::open(&body)?;
    let name = query.name.unwrap_or_else(|| "untitled".to_string());
    let id = state.insert(handle.clone(), name.clone()).await;
    tracing::info!(%id, name, "opened document");

    Ok(Json(summary(id, &name, &handle, chrono::Utc::now())))
}

/// List open documents
pub async fn list_documents(State(state): State<AppState>) -> Json<Vec<DocumentSummary>> {
    let mut docs: Vec<DocumentSummary> = Vec::new();
    for (id, entry) in state.list().await {
        docs.push(summary(id, &entry.name, &entry.handle, entry.opened_at));
    }
    docs.sort_by_key(|d| d.opened_at);
    Json(docs)
}

/// Summary of one open document
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentSummary>, ApiError> {
    let entry = state.get(id).await.ok_or(ApiError::NotOpen(id))?;
    Ok(Json(summary(id, &entry.name, &entry.handle, entry.opened_at)))
}

/// Close a document, dropping its in-memory state
pub async fn close_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.remove(id).await.ok_or(ApiError::NotOpen(id))?;
    tracing::info!(%id, "closed document");
    Ok(Json(serde_json::json!({ "closed": id })))
}

/// Serialize and download the current package bytes
pub async fn download_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let handle = super::require_document(&state, id).await?;
    let bytes = handle.encode()?;
    let headers = [
        (header::CONTENT_TYPE, "application/hwp+zip".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.hwpx\"", id),
        ),
    ];
    Ok((headers, bytes).into_response())
}

fn summary(
    id: Uuid,
    name: &str,
    handle: &DocumentHandle,
    opened_at: chrono::DateTime<chrono::Utc>,
) -> DocumentSummary {
    handle.read(|doc| DocumentSummary {
        id,
        name: name.to_string(),
        title: doc.metadata.title.clone(),
        sections: doc.sections.len(),
        paragraphs: doc.paragraph_count(),
        opened_at,
    })
}
