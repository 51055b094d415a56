//! Error types for hanji-core

use thiserror::Error;

/// Result type alias using HanjiError
pub type Result<T> = std::result::Result<T, HanjiError>;

/// Top-level error type for all hanji operations
#[derive(Debug, Error)]
pub enum HanjiError {
    #[error("Corrupt package: {0}")]
    Package(#[from] CorruptPackage),

    #[error("Not found: {0}")]
    NotFound(#[from] NotFound),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("Recognition provider: {0}")]
    Provider(#[from] ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while decoding a package that cannot be interpreted
///
/// Decoding is strict: a package that cannot be faithfully round-tripped is
/// rejected rather than partially loaded.
#[derive(Debug, Error)]
pub enum CorruptPackage {
    #[error("not a valid archive: {0}")]
    BadArchive(String),

    #[error("bad mimetype entry: {0:?}")]
    BadMimetype(String),

    #[error("required part missing: {0}")]
    MissingPart(String),

    #[error("malformed XML in {part}: {detail}")]
    MalformedXml { part: String, detail: String },

    #[error("dangling reference: {0}")]
    DanglingReference(String),

    #[error("invalid document structure: {0}")]
    Structure(String),
}

/// A coordinate or catalog ID that does not resolve
///
/// Always recoverable: the caller retries with a valid reference.
#[derive(Debug, Error)]
pub enum NotFound {
    #[error("section {0} out of range")]
    Section(usize),

    #[error("paragraph {paragraph} out of range in section {section}")]
    Paragraph { section: usize, paragraph: usize },

    #[error("character range {start}..{end} out of range for paragraph text")]
    Span { start: usize, end: usize },

    #[error("paragraph style {0} is not in the style catalog")]
    ParaStyle(u32),

    #[error("character style {0} is not in the style catalog")]
    CharStyle(u32),

    #[error("resource {0} is not in the resource catalog")]
    Resource(String),
}

/// An invalid search pattern supplied by the caller
#[derive(Debug, Error)]
#[error("{0}")]
pub struct PatternError(#[from] pub regex::Error);

/// A breach of a structural contract of the document model
///
/// Reported after the offending operation has been rolled back; the document
/// observed by the caller is unchanged.
#[derive(Debug, Error)]
pub enum InvariantViolation {
    #[error("section {0} has no paragraphs")]
    EmptySection(usize),

    #[error("deleting the only paragraph of section {0} would empty it")]
    WouldEmptySection(usize),

    #[error("paragraph {paragraph} in section {section} has no content items")]
    EmptyParagraph { section: usize, paragraph: usize },

    #[error("paragraph style {0} referenced but not registered")]
    DanglingParaStyle(u32),

    #[error("character style {0} referenced but not registered")]
    DanglingCharStyle(u32),

    #[error("resource {0} referenced but not registered")]
    DanglingResource(String),

    #[error("table grid is inconsistent: {0}")]
    TableGrid(String),
}

/// Failures reported by a recognition provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("rate limited by provider")]
    RateLimited,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("recognition failed for page {page} after {attempts} attempts: {source}")]
    Exhausted {
        page: usize,
        attempts: u32,
        #[source]
        source: Box<ProviderError>,
    },
}

impl ProviderError {
    /// Whether a retry with backoff is worthwhile
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Timeout(_) | ProviderError::RateLimited | ProviderError::Transport(_)
        )
    }
}
