//! Read-only query handlers

use super::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::response::Json;
use hanji_core::query::{ImageInfo, Match, PageBreak, ParagraphInfo, TableInfo};
use serde::Deserialize;
use uuid::Uuid;

/// Whole-document text
pub async fn get_text(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<String, ApiError> {
    let handle = super::require_document(&state, id).await?;
    Ok(handle.all_text())
}

#[derive(Debug, Deserialize)]
pub struct ParagraphsQuery {
    #[serde(default)]
    pub section: usize,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

/// Paragraph summaries of one section, optionally narrowed to a range
pub async fn get_paragraphs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ParagraphsQuery>,
) -> Result<Json<Vec<ParagraphInfo>>, ApiError> {
    let handle = super::require_document(&state, id).await?;
    let infos = match (query.start, query.end) {
        (None, None) => handle.paragraphs(query.section)?,
        (start, end) => handle.paragraph_range(
            query.section,
            start.unwrap_or(0),
            end.unwrap_or(usize::MAX),
        )?,
    };
    Ok(Json(infos))
}

/// All tables in document order
pub async fn get_tables(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TableInfo>>, ApiError> {
    let handle = super::require_document(&state, id).await?;
    Ok(Json(handle.tables()))
}

/// All images in document order
pub async fn get_images(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ImageInfo>>, ApiError> {
    let handle = super::require_document(&state, id).await?;
    Ok(Json(handle.images()))
}

/// All explicit page/column breaks in document order
pub async fn get_page_breaks(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PageBreak>>, ApiError> {
    let handle = super::require_document(&state, id).await?;
    Ok(Json(handle.page_breaks()))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default)]
    pub regex: bool,
    #[serde(default)]
    pub ignore_case: bool,
}

/// Literal or pattern search over the document text
pub async fn search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Match>>, ApiError> {
    let handle = super::require_document(&state, id).await?;
    let matches = if query.regex {
        handle.find_pattern(&query.q)?
    } else {
        handle.find_literal(&query.q, !query.ignore_case)
    };
    Ok(Json(matches))
}
