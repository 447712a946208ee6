pub mod descriptor;
pub mod file_type;
pub mod object_id;

pub use descriptor::{FileDescriptor, FileKind};
pub use file_type::{FileType, PhaseKind};
pub use object_id::{ObjectId, OBJECT_ID_LEN};
