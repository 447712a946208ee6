use serde::{Deserialize, Serialize};

/// Whether a file belongs to the product or to its test bundle.
/// Only consulted when a descriptor names no targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    #[default]
    Source,
    Test,
}

/// One file to add to the project.
///
/// `group` selects the owning group, either by object id or by a
/// slash-separated path from the main group (`"FocusPal/Core/Models"`).
/// `targets` holds native target names or build phase ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub path: String,
    pub group: String,
    #[serde(default)]
    pub kind: FileKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl FileDescriptor {
    pub fn new(path: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            group: group.into(),
            kind: FileKind::Source,
            targets: Vec::new(),
            comment: None,
        }
    }

    pub fn kind(mut self, kind: FileKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.targets.push(target.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Last path component.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Text mirrored in the `/* ... */` comment next to every reference.
    pub fn label(&self) -> &str {
        self.comment.as_deref().unwrap_or_else(|| self.file_name())
    }
}
