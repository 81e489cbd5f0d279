//! Phone number records and the review staging area.
//!
//! Both stores keep their mapping in memory and rewrite a full JSON snapshot
//! after every mutation. The snapshot file is the durability boundary; there
//! is no write-ahead log.

mod error;
mod records;
mod snapshot;
mod staging;
mod types;
mod validate;

pub use error::StoreError;
pub use records::RecordStore;
pub use snapshot::{FileSnapshot, MemorySnapshot, Snapshot};
pub use staging::StagingStore;
pub use types::*;
pub use validate::normalize_phone_number;
