//! Mutation handlers

use super::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::Json;
use base64::{engine::general_purpose::STANDARD, Engine};
use hanji_core::edit::{ParaRef, ReplaceCount, ReplaceMode, Scope};
use hanji_core::{CharStyleId, ParaStyleId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct EditOutcome {
    /// Coordinate produced by the operation, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<ParaRef>,

    /// Replacement count for replace operations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced: Option<usize>,
}

impl EditOutcome {
    fn at(at: ParaRef) -> Json<Self> {
        Json(Self {
            at: Some(at),
            replaced: None,
        })
    }

    fn done() -> Json<Self> {
        Json(Self {
            at: None,
            replaced: None,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ReplaceRequest {
    pub target: String,
    pub replacement: String,
    #[serde(default)]
    pub regex: bool,
    #[serde(default)]
    pub first: bool,
    /// Optional scope restriction; whole document when absent
    pub scope: Option<Scope>,
}

pub async fn replace_text(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReplaceRequest>,
) -> Result<Json<EditOutcome>, ApiError> {
    let handle = super::require_document(&state, id).await?;
    let mode = if req.regex {
        ReplaceMode::Regex
    } else {
        ReplaceMode::Literal
    };
    let count = if req.first {
        ReplaceCount::First
    } else {
        ReplaceCount::All
    };
    let replaced = handle.replace_text(
        req.scope.unwrap_or(Scope::Document),
        &req.target,
        &req.replacement,
        mode,
        count,
    )?;
    Ok(Json(EditOutcome {
        at: None,
        replaced: Some(replaced),
    }))
}

#[derive(Debug, Deserialize)]
pub struct InsertParagraphRequest {
    pub after: ParaRef,
    pub text: String,
}

pub async fn insert_paragraph(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<InsertParagraphRequest>,
) -> Result<Json<EditOutcome>, ApiError> {
    let handle = super::require_document(&state, id).await?;
    let at = handle.insert_paragraph(req.after, &req.text)?;
    Ok(EditOutcome::at(at))
}

#[derive(Debug, Deserialize)]
pub struct SetTextRequest {
    pub text: String,
}

pub async fn set_paragraph_text(
    State(state): State<AppState>,
    Path((id, section, paragraph)): Path<(Uuid, usize, usize)>,
    Json(req): Json<SetTextRequest>,
) -> Result<Json<EditOutcome>, ApiError> {
    let handle = super::require_document(&state, id).await?;
    handle.set_paragraph_text(ParaRef::new(section, paragraph), &req.text)?;
    Ok(EditOutcome::done())
}

pub async fn delete_paragraph(
    State(state): State<AppState>,
    Path((id, section, paragraph)): Path<(Uuid, usize, usize)>,
) -> Result<Json<EditOutcome>, ApiError> {
    let handle = super::require_document(&state, id).await?;
    handle.delete_paragraph(ParaRef::new(section, paragraph))?;
    Ok(EditOutcome::done())
}

#[derive(Debug, Deserialize)]
pub struct MoveCopyRequest {
    pub from: ParaRef,
    pub after: ParaRef,
}

pub async fn move_paragraph(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveCopyRequest>,
) -> Result<Json<EditOutcome>, ApiError> {
    let handle = super::require_document(&state, id).await?;
    let at = handle.move_paragraph(req.from, req.after)?;
    Ok(EditOutcome::at(at))
}

pub async fn copy_paragraph(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveCopyRequest>,
) -> Result<Json<EditOutcome>, ApiError> {
    let handle = super::require_document(&state, id).await?;
    let at = handle.copy_paragraph(req.from, req.after)?;
    Ok(EditOutcome::at(at))
}

#[derive(Debug, Deserialize)]
pub struct SetStyleRequest {
    pub style: u32,
    /// Byte span within the paragraph text (char-style only)
    pub span: Option<(usize, usize)>,
}

pub async fn set_paragraph_style(
    State(state): State<AppState>,
    Path((id, section, paragraph)): Path<(Uuid, usize, usize)>,
    Json(req): Json<SetStyleRequest>,
) -> Result<Json<EditOutcome>, ApiError> {
    let handle = super::require_document(&state, id).await?;
    handle.set_paragraph_style(ParaRef::new(section, paragraph), ParaStyleId(req.style))?;
    Ok(EditOutcome::done())
}

pub async fn set_char_style(
    State(state): State<AppState>,
    Path((id, section, paragraph)): Path<(Uuid, usize, usize)>,
    Json(req): Json<SetStyleRequest>,
) -> Result<Json<EditOutcome>, ApiError> {
    let handle = super::require_document(&state, id).await?;
    handle.set_char_style(
        ParaRef::new(section, paragraph),
        req.span,
        CharStyleId(req.style),
    )?;
    Ok(EditOutcome::done())
}

#[derive(Debug, Deserialize)]
pub struct BreakRequest {
    pub enabled: bool,
}

pub async fn set_page_break(
    State(state): State<AppState>,
    Path((id, section, paragraph)): Path<(Uuid, usize, usize)>,
    Json(req): Json<BreakRequest>,
) -> Result<Json<EditOutcome>, ApiError> {
    let handle = super::require_document(&state, id).await?;
    handle.set_page_break(ParaRef::new(section, paragraph), req.enabled)?;
    Ok(EditOutcome::done())
}

pub async fn set_column_break(
    State(state): State<AppState>,
    Path((id, section, paragraph)): Path<(Uuid, usize, usize)>,
    Json(req): Json<BreakRequest>,
) -> Result<Json<EditOutcome>, ApiError> {
    let handle = super::require_document(&state, id).await?;
    handle.set_column_break(ParaRef::new(section, paragraph), req.enabled)?;
    Ok(EditOutcome::done())
}

#[derive(Debug, Deserialize)]
pub struct InsertTableRequest {
    pub after: ParaRef,
    pub rows: u32,
    pub cols: u32,
    pub data: Option<Vec<Vec<String>>>,
    pub col_widths: Option<Vec<u32>>,
}

pub async fn insert_table(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<InsertTableRequest>,
) -> Result<Json<EditOutcome>, ApiError> {
    let handle = super::require_document(&state, id).await?;
    let at = handle.insert_table(
        req.after,
        req.rows,
        req.cols,
        req.data.as_deref(),
        req.col_widths,
    )?;
    Ok(EditOutcome::at(at))
}

#[derive(Debug, Deserialize)]
pub struct InsertImageRequest {
    pub after: ParaRef,
    /// Base64-encoded image bytes
    pub data: String,
    pub width: u32,
    pub height: u32,
}

pub async fn insert_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<InsertImageRequest>,
) -> Result<Json<EditOutcome>, ApiError> {
    let handle = super::require_document(&state, id).await?;
    let bytes = STANDARD.decode(&req.data).map_err(|e| {
        ApiError::Core(hanji_core::HanjiError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("invalid base64 image payload: {e}"),
        )))
    })?;
    let at = handle.insert_image(req.after, bytes, req.width, req.height)?;
    Ok(EditOutcome::at(at))
}
