//! File handling subsystem.
//!
//! # Data Flow
//! ```text
//! Handler receives multipart upload (buffered)
//!     → kind.rs (extension, then sniffed MIME → FileKind + Content-Type)
//!     → proxy.rs (SaveMode check, multipart build, POST to storage)
//!     → StorageLocator from `{"file_path"}`
//!
//! Update:
//!     update.rs → proxy.rs save (abort on failure)
//!               → proxy.rs delete old (failure only reported)
//! ```

pub mod endpoints;
pub mod kind;
pub mod proxy;
pub mod update;

pub use endpoints::StorageEndpoints;
pub use kind::{Classification, FileKind};
pub use proxy::{OwnerTag, SaveMode, SaveTarget, StorageLocator, UploadProxy, UploadedFile};
pub use update::{Cleanup, UpdateOrchestrator, UpdateOutcome};
