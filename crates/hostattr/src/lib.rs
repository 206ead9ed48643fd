//! # hostattr
//!
//! Dotted attribute path resolution and bulk symbol loading against the
//! object graph of an embedded, reference-counted runtime.
//!
//! A native embedding layer typically needs a handful of attributes from one
//! host object at startup (`math.sqrt`, `os.path.join`,
//! `name.attr.__get__`, ...). This crate walks those paths with correct
//! reference bookkeeping and fills a list of output slots in one call.
//!
//! ## Architecture
//!
//! - **Host seam**: [`HostRuntime`] supplies the three host primitives
//!   (attribute lookup, increment, decrement); [`HostRef`] owns one count
//!   and releases it on drop
//! - **Path Resolver**: [`resolve`] walks an [`AttrPath`] from a root object
//! - **Bulk Symbol Loader**: [`load_symbols`] and [`SymbolLoader`] fill
//!   empty slots and report which requests failed
//! - **C ABI**: [`ffi`] exposes both to native callers through a table of
//!   function pointers
//!
//! [`MemoryRuntime`] is an in-memory host with observable reference counts.
//!
//! ## Example
//!
//! ```
//! use hostattr::{HostRef, MemoryRuntime, SymbolLoader};
//!
//! let rt = MemoryRuntime::new();
//! let os = rt.new_object("os");
//! let path = rt.new_object("os.path");
//! let join = rt.new_object("os.path.join");
//! rt.set_attr(os, "path", path);
//! rt.set_attr(path, "join", join);
//!
//! let root = HostRef::from_borrowed(&rt, os);
//! let (mut join_fn, mut split_fn) = (None, None);
//!
//! let report = SymbolLoader::new(&root)
//!     .symbol("path.join", &mut join_fn)
//!     .symbol("path.split", &mut split_fn)
//!     .load();
//!
//! assert_eq!(report.failed_names(), ["path.split"]);
//! assert!(join_fn.is_some());
//! assert!(split_fn.is_none());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod error;
pub mod ffi;
pub mod host;
pub mod loader;
pub mod memory;
pub mod path;
pub mod resolve;

// Re-export main types
pub use context::ResolveContext;
pub use error::{HostError, PathError, ResolveError, Result};
pub use host::{HostRef, HostRuntime};
pub use loader::{
    load_symbols, load_symbols_with, LoadReport, SymbolFailure, SymbolLoader, SymbolRequest,
};
pub use memory::{Lookup, MemoryRuntime, ObjectId};
pub use path::AttrPath;
pub use resolve::{resolve, resolve_path, resolve_path_with, resolve_with};

/// hostattr version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
