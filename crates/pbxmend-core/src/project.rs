use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::document::Document;
use crate::edit::{self, AddOptions, AddReport, RemoveReport};
use crate::error::CoreError;
use crate::model::FileDescriptor;
use crate::repair::{self, RepairOptions, RepairReport};

pub const MANIFEST_NAME: &str = "project.pbxproj";
const BUNDLE_EXT: &str = "xcodeproj";

/// A manifest on disk plus its pending in-memory text.
///
/// Operations replace the in-memory text only when they succeed, and
/// nothing reaches the disk until [`Project::save`]. Concurrent writers are
/// not detected; callers must make sure nothing else edits the file.
#[derive(Debug, Clone)]
pub struct Project {
    path: PathBuf,
    original: String,
    text: String,
}

impl Project {
    /// Open a manifest file, or the `project.pbxproj` inside an
    /// `.xcodeproj` bundle.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let path = if path.is_dir() {
            path.join(MANIFEST_NAME)
        } else {
            path.to_path_buf()
        };
        if !path.is_file() {
            return Err(CoreError::FileNotFound { path });
        }
        let text = std::fs::read_to_string(&path)?;
        tracing::debug!("Read {} ({} bytes)", path.display(), text.len());
        Ok(Self {
            path,
            original: text.clone(),
            text,
        })
    }

    /// Find the single `*.xcodeproj/project.pbxproj` at or just below `dir`.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, CoreError> {
        let dir = dir.as_ref();
        if is_bundle(dir) || dir.is_file() {
            return Self::open(dir);
        }

        let mut found: Vec<PathBuf> = WalkDir::new(dir)
            .max_depth(2)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_dir() && is_bundle(entry.path()))
            .map(|entry| entry.path().join(MANIFEST_NAME))
            .filter(|manifest| manifest.is_file())
            .collect();
        found.sort();

        match found.len() {
            0 => Err(CoreError::FileNotFound {
                path: dir.join(format!("*.{BUNDLE_EXT}")).join(MANIFEST_NAME),
            }),
            1 => Self::open(&found[0]),
            n => Err(CoreError::AmbiguousAnchor {
                anchor: format!("*.{BUNDLE_EXT} under {} (pass --project)", dir.display()),
                matches: n,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the in-memory text differs from what was read.
    pub fn is_dirty(&self) -> bool {
        self.text != self.original
    }

    pub fn document(&self) -> Result<Document, CoreError> {
        Document::parse(&self.text)
    }

    pub fn add_files(
        &mut self,
        descriptors: &[FileDescriptor],
        opts: &AddOptions,
    ) -> Result<AddReport, CoreError> {
        let (text, report) = edit::add_files(&self.text, descriptors, opts)?;
        self.text = text;
        Ok(report)
    }

    pub fn remove_file(&mut self, group: &str, path: &str) -> Result<RemoveReport, CoreError> {
        let (text, report) = edit::remove_file(&self.text, group, path)?;
        self.text = text;
        Ok(report)
    }

    pub fn repair(&mut self, opts: &RepairOptions) -> Result<RepairReport, CoreError> {
        let (text, report) = repair::repair(&self.text, opts)?;
        self.text = text;
        Ok(report)
    }

    /// Atomically replace the manifest with the in-memory text. Returns
    /// `false` when there was nothing to write.
    pub fn save(&mut self) -> Result<bool, CoreError> {
        if !self.is_dirty() {
            tracing::debug!("{} unchanged, not writing", self.path.display());
            return Ok(false);
        }
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(self.text.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        self.original = self.text.clone();
        tracing::info!("Wrote {}", self.path.display());
        Ok(true)
    }
}

fn is_bundle(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == BUNDLE_EXT)
}
