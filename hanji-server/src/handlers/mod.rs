//! Request handlers
//!
//! Thin marshaling over hanji-core operations: extract parameters, call the
//! core through the document handle, translate results and error kinds into
//! HTTP responses. No document semantics live here.

mod documents;
mod edit;
mod query;

pub use documents::{close_document, download_document, get_document, list_documents, open_document};
pub use edit::{
    copy_paragraph, delete_paragraph, insert_image, insert_paragraph, insert_table, move_paragraph,
    replace_text, set_char_style, set_column_break, set_page_break, set_paragraph_style,
    set_paragraph_text,
};
pub use query::{get_images, get_page_breaks, get_paragraphs, get_tables, get_text, search};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use hanji_core::HanjiError;
use uuid::Uuid;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Error type translating core error kinds into status codes
#[derive(Debug)]
pub enum ApiError {
    Core(HanjiError),
    NotOpen(Uuid),
}

impl From<HanjiError> for ApiError {
    fn from(err: HanjiError) -> Self {
        ApiError::Core(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            ApiError::NotOpen(id) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("document {} is not open", id),
            ),
            ApiError::Core(err) => {
                let (status, kind) = match err {
                    HanjiError::Package(_) => (StatusCode::BAD_REQUEST, "corrupt_package"),
                    HanjiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                    HanjiError::Pattern(_) => (StatusCode::BAD_REQUEST, "invalid_pattern"),
                    HanjiError::Invariant(_) => (StatusCode::CONFLICT, "invariant_violation"),
                    HanjiError::Provider(_) => (StatusCode::BAD_GATEWAY, "provider_error"),
                    HanjiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
                };
                (status, kind, err.to_string())
            }
        };
        let body = serde_json::json!({ "error": kind, "message": message });
        (status, Json(body)).into_response()
    }
}

/// Look up an open document's handle or fail with 404
pub(crate) async fn require_document(
    state: &crate::state::AppState,
    id: Uuid,
) -> Result<hanji_core::DocumentHandle, ApiError> {
    state
        .get(id)
        .await
        .map(|entry| entry.handle)
        .ok_or(ApiError::NotOpen(id))
}
