//! Snapshot path handling: identity, navigation, resolution, and globbing.
//!
//! This module provides the path layer of the gitpath system. A [`GitPath`]
//! names a location inside one immutable tree snapshot and behaves like a
//! filesystem path: it has parts, a parent chain, suffix arithmetic, glob
//! matching, and symlink-aware resolution.
//!
//! # Key Concepts
//!
//! ## Anchors
//!
//! Every path is absolute. The anchor combines the repository location (the
//! "drive") with the hex id of the root tree; all other components hang off
//! that anchor. Equality, hashing, and ordering ignore the drive, so paths
//! from different clones of the same history compare equal.
//!
//! ## Canonical paths
//!
//! A canonical path contains no `.`, `..`, or symlink segments. Joining
//! never canonicalizes; only [`GitPath::resolve`] interprets special
//! segments, consulting the backend to follow symlinks.
//!
//! ## Strict and lenient resolution
//!
//! Strict resolution fails on the first missing segment. Lenient resolution
//! resolves as far as objects exist and carries the remainder along
//! unresolved, which permits building paths to locations that do not exist
//! in the snapshot.
//!
//! # Examples
//!
//! ```no_run
//! use gitpath::{GitPath, GitoxideBackend, ResolveMode};
//!
//! let backend = GitoxideBackend::open("/path/to/repo")?;
//! let root = GitPath::open(backend, "HEAD")?;
//!
//! let readme = root.join("docs/README.md");
//! let canonical = readme.resolve(ResolveMode::Strict)?;
//! println!("{}", canonical.read_text()?);
//! # Ok::<(), gitpath::Error>(())
//! ```

mod glob;
mod meta;
mod navigate;
mod resolve;
mod types;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

// Re-export key types
pub use meta::Stat;
pub use resolve::ResolveMode;
pub use types::GitPath;
