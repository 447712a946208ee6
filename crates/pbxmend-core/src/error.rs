use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Anchor not found: {anchor}")]
    Structural { anchor: String },

    #[error("Ambiguous anchor {anchor}: {matches} matches")]
    AmbiguousAnchor { anchor: String, matches: usize },

    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("{path} is already present in group {group}")]
    DuplicatePath { path: String, group: String },

    #[error("{path} is not a member of group {group}")]
    NotInGroup { path: String, group: String },

    #[error("Could not mint a unique identifier for '{seed}' after {attempts} attempts")]
    IdentifierExhausted { seed: String, attempts: usize },

    #[error("Manifest not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Config error: {0}")]
    Config(String),
}

/// Coarse classification of a [`CoreError`], stable enough for exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Structural,
    DuplicatePath,
    IdentifierExhausted,
    Integrity,
    FileNotFound,
    Io,
    Other,
}

impl CoreError {
    pub(crate) fn structural(anchor: impl Into<String>) -> Self {
        Self::Structural {
            anchor: anchor.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Structural { .. } | Self::AmbiguousAnchor { .. } | Self::Parse { .. } => {
                ErrorKind::Structural
            }
            Self::NotInGroup { .. } => ErrorKind::Structural,
            Self::DuplicatePath { .. } => ErrorKind::DuplicatePath,
            Self::IdentifierExhausted { .. } => ErrorKind::IdentifierExhausted,
            Self::IntegrityViolation(_) => ErrorKind::Integrity,
            Self::FileNotFound { .. } => ErrorKind::FileNotFound,
            Self::Io(_) => ErrorKind::Io,
            Self::Git(_) | Self::Config(_) => ErrorKind::Other,
        }
    }
}
