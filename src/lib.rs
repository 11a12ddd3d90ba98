#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # gitpath
//!
//! A library for navigating git tree snapshots with filesystem-path
//! ergonomics.
//!
//! A [`GitPath`] is anchored to the tree of one revision and exposes the
//! familiar path surface (parts, parents, joining, globbing, symlink
//! resolution, stat-like metadata) over that immutable snapshot. Nothing
//! can be written through it; the snapshot never changes underneath you.
//!
//! ## Core Types
//!
//! - [`GitPath`]: a read-only path inside one tree snapshot
//! - [`Backend`]: the object-store contract, with [`GitoxideBackend`]
//!   (in-process) and [`SubprocessBackend`] (the `git` binary)
//! - [`ResolveMode`] and [`Stat`]: resolution strictness and metadata
//! - [`Error`] and [`Result`]: error handling types
//!
//! ## Examples
//!
//! ```
//! use gitpath::{GitPath, GitoxideBackend, ResolveMode};
//!
//! let dir = tempfile::tempdir()?;
//! gitpath::testutil::make_repo(dir.path(), "
//! - tree:
//!     src:
//!         main.rs: fn main() {}
//!     link: [link, src/main.rs]
//! ");
//!
//! let root = GitPath::open(GitoxideBackend::open(dir.path())?, "HEAD")?;
//! let link = root.join("link");
//! assert_eq!(link.resolve(ResolveMode::Strict)?, root.join("src/main.rs"));
//! assert_eq!(link.read_text()?, "fn main() {}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backend;
pub mod error;
pub mod path;
pub mod testutil;

// Re-export key types at crate root for convenience
pub use backend::{Backend, FileMode, GitoxideBackend, ObjectKind, SubprocessBackend};
pub use error::{Error, Result};
pub use path::{GitPath, ResolveMode, Stat};
