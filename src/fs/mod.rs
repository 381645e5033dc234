pub mod accessor;
pub mod binary;
pub mod locking;
pub mod state;

pub use accessor::{DirEntryInfo, DirectoryAccessor, Listing, LocalFs};
pub use binary::BinaryPolicy;
pub use state::StateFile;
