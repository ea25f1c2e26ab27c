//! Loading and saving frames.
//!
//! Most callers should use [`load`] / [`save`] (from [`unified`]) which:
//!
//! - auto-detect format by file extension (or you can override via [`IoOptions`])
//! - infer column dtypes for text formats, unless a schema is supplied
//! - write atomically (temporary file + rename)
//! - optionally report success/failure/alerts to an [`IoObserver`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - [`json`]
//! - [`parquet`]

mod atomic;
pub mod csv;
pub mod infer;
pub mod json;
pub mod observability;
pub mod parquet;
pub mod unified;

pub use observability::{
    CompositeObserver, FileObserver, IoContext, IoObserver, IoOperation, IoSeverity, IoStats,
    StdErrObserver,
};
pub(crate) use atomic::staged_path;
pub use unified::{convert, load, load_with, save, save_as, save_with, Format, IoOptions};
