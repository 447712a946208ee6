use serde::{Deserialize, Serialize};

/// Width of identifiers minted by this crate (Xcode's 96-bit object ids).
pub const OBJECT_ID_LEN: usize = 24;

/// Key of one object in the manifest's `objects` dictionary.
///
/// Parsing accepts any bare word since other generators (CocoaPods, older
/// scripts) are not consistent about width; minted ids are always
/// [`OBJECT_ID_LEN`] uppercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl ObjectId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for ids in the format this crate generates.
    pub fn is_canonical(&self) -> bool {
        self.0.len() == OBJECT_ID_LEN
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b))
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ObjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for ObjectId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
