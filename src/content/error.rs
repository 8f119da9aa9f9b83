//! Content loading errors

use std::path::{Path, PathBuf};
use thiserror::Error;

use super::ContentKind;

/// A front-matter field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field `title`")]
    MissingTitle,
    #[error("missing required field `date`")]
    MissingDate,
}

/// Why a content file was left out of a listing
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid front-matter in {path:?}: {message}")]
    FrontMatter { path: PathBuf, message: String },

    #[error("invalid {kind} {path:?}: {}", join_errors(.errors))]
    Invalid {
        path: PathBuf,
        kind: ContentKind,
        errors: Vec<ValidationError>,
    },

    #[error("duplicate slug {slug:?} in {path:?}, already used by {first:?}")]
    DuplicateSlug {
        path: PathBuf,
        slug: String,
        first: PathBuf,
    },
}

impl ContentError {
    /// The file the error is about
    pub fn path(&self) -> &Path {
        match self {
            ContentError::Io { path, .. }
            | ContentError::FrontMatter { path, .. }
            | ContentError::Invalid { path, .. }
            | ContentError::DuplicateSlug { path, .. } => path,
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
