//! # easel-store
//!
//! The [`ContentStore`] contract that the registry client talks to, the
//! [`Table`] engine that enforces token uniqueness and id assignment, typed
//! batch plans with transactional [`batch::apply`], and two stores:
//! [`MemoryStore`] and the durable [`FileStore`].

pub mod batch;
pub mod cursor;
pub mod error;
pub mod file;
pub mod memory;
pub mod query;
pub mod store;
pub mod table;

pub use batch::{BackReference, BatchError, Fault, Operation, OperationResult};
pub use cursor::RowCursor;
pub use error::{Rejection, StoreError};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use query::{Query, Selection, SortOrder};
pub use store::{now_seconds, ContentStore};
pub use table::Table;
