pub mod config;
pub mod document;
pub mod edit;
pub mod error;
pub mod ids;
pub mod locate;
pub mod model;
pub mod project;
pub mod render;
pub mod repair;

#[cfg(test)]
mod fixtures;

pub use config::PbxConfig;
pub use document::Document;
pub use edit::{add_file, add_files, remove_file, AddOptions, AddReport, OnExisting, RemoveReport};
pub use error::{CoreError, ErrorKind};
pub use ids::{IdGenerator, IdStrategy};
pub use locate::{locate, resolve_group, resolve_phase, Anchor, GroupMatch, InsertionPoint};
pub use model::{FileDescriptor, FileKind, FileType, ObjectId, PhaseKind};
pub use project::Project;
pub use repair::{repair, Fix, FixKind, RepairOptions, RepairReport};
