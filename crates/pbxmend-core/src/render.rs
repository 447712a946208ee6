//! Canonical text for new manifest entries.
//!
//! Rendering is pure: the same entry always yields the same bytes, and no
//! renderer looks at the surrounding manifest. Placement is the caller's job.

use std::borrow::Cow;

use crate::model::{ObjectId, PhaseKind};

/// Indentation of entries in the flat object sections.
pub const ENTRY_INDENT: &str = "\t\t";

pub trait Render {
    fn render(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReferenceEntry {
    pub id: ObjectId,
    pub path: String,
    pub comment: String,
    pub file_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFileEntry {
    pub id: ObjectId,
    pub file_ref: ObjectId,
    /// Label of the referenced file, without the phase suffix.
    pub comment: String,
    pub phase: PhaseKind,
}

/// One id inside a `children` or `files` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberItem {
    pub id: ObjectId,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    pub id: ObjectId,
    pub path: String,
    pub children: Vec<MemberItem>,
}

impl BuildFileEntry {
    pub fn label(&self) -> String {
        format!("{} in {}", self.comment, self.phase.label())
    }

    pub fn member(&self) -> MemberItem {
        MemberItem {
            id: self.id.clone(),
            comment: self.label(),
        }
    }
}

impl FileReferenceEntry {
    pub fn member(&self) -> MemberItem {
        MemberItem {
            id: self.id.clone(),
            comment: self.comment.clone(),
        }
    }
}

impl GroupEntry {
    pub fn member(&self) -> MemberItem {
        MemberItem {
            id: self.id.clone(),
            comment: self.path.clone(),
        }
    }
}

impl Render for FileReferenceEntry {
    fn render(&self) -> String {
        let file_name = self.path.rsplit('/').next().unwrap_or(&self.path);
        let name = if file_name != self.path {
            format!("name = {}; ", quote(file_name))
        } else {
            String::new()
        };
        format!(
            "{ENTRY_INDENT}{} /* {} */ = {{isa = PBXFileReference; lastKnownFileType = {}; {name}path = {}; sourceTree = \"<group>\"; }};\n",
            self.id,
            comment_text(&self.comment),
            quote(self.file_type),
            quote(&self.path),
        )
    }
}

impl Render for BuildFileEntry {
    fn render(&self) -> String {
        format!(
            "{ENTRY_INDENT}{} /* {} */ = {{isa = PBXBuildFile; fileRef = {} /* {} */; }};\n",
            self.id,
            comment_text(&self.label()),
            self.file_ref,
            comment_text(&self.comment),
        )
    }
}

impl Render for MemberItem {
    fn render(&self) -> String {
        format!("{} /* {} */,", self.id, comment_text(&self.comment))
    }
}

impl Render for GroupEntry {
    fn render(&self) -> String {
        let mut out = format!(
            "{ENTRY_INDENT}{} /* {} */ = {{\n{ENTRY_INDENT}\tisa = PBXGroup;\n{ENTRY_INDENT}\tchildren = (\n",
            self.id,
            comment_text(&self.path)
        );
        for child in &self.children {
            out.push_str(&format!("{ENTRY_INDENT}\t\t{}\n", child.render()));
        }
        out.push_str(&format!(
            "{ENTRY_INDENT}\t);\n{ENTRY_INDENT}\tpath = {};\n{ENTRY_INDENT}\tsourceTree = \"<group>\";\n{ENTRY_INDENT}}};\n",
            quote(&self.path)
        ));
        out
    }
}

/// Quote a string value unless it only holds characters Xcode writes bare.
pub fn quote(s: &str) -> Cow<'_, str> {
    let bare = !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'/' | b':' | b'.'));
    if bare {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    Cow::Owned(out)
}

/// Label text safe to place inside `/* */`.
pub fn comment_text(s: &str) -> Cow<'_, str> {
    if s.contains("*/") || s.contains('\n') {
        Cow::Owned(s.replace("*/", "* /").replace('\n', " "))
    } else {
        Cow::Borrowed(s)
    }
}
