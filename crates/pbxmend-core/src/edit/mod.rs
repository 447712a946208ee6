//! Transactions over manifest text.
//!
//! Every operation takes the current text and returns the new text plus a
//! report. Edits are computed against one parse and spliced in a single
//! pass; nothing outside the touched byte ranges changes.

pub mod add;
pub mod batch;
pub mod remove;

pub use add::{add_file, add_files, AddOptions, AddReport, AddedFile, CreatedGroup, OnExisting, PhaseMembership, SkippedFile};
pub use batch::{whole_lines, EditBatch};
pub use remove::{remove_file, RemoveReport};
