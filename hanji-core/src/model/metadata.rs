//! Document metadata carried in the package manifest

use serde::{Deserialize, Serialize};

/// Metadata recorded in the package manifest part
///
/// Date fields are carried as the verbatim strings found in the package so a
/// foreign producer's formatting survives a round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: String,

    /// Language code (e.g. "ko", "en")
    pub language: String,

    /// Author/creator
    pub creator: Option<String>,

    /// Subject line
    pub subject: Option<String>,

    /// Free-form description
    pub description: Option<String>,

    /// Creation timestamp, verbatim
    pub created: Option<String>,

    /// Last-modification timestamp, verbatim
    pub modified: Option<String>,

    /// Manifest meta entries not otherwise modeled, re-emitted verbatim
    pub extra: Vec<(String, String)>,
}

impl Metadata {
    pub fn new(title: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            language: language.into(),
            ..Self::default()
        }
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }
}
