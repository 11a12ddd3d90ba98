//! Backend contract for reading objects out of a repository snapshot.
//!
//! This module defines the narrow interface the path engine consumes, plus
//! two interchangeable implementations: an in-process one built on `gix` and
//! one that shells out to the `git` binary. The design uses a trait at this
//! seam so the engine stays agnostic to how objects are fetched and so tests
//! can drive both implementations through identical scenarios.
//!
//! Most operations carry preconditions (see each method): the engine only
//! calls them for paths it has already canonicalized, so a precondition
//! violation is a bug in the engine rather than a recoverable condition.

pub mod gitoxide;
pub mod subprocess;

use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::path::GitPath;

pub use gitoxide::GitoxideBackend;
pub use subprocess::SubprocessBackend;

/// The type of a git object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// File contents.
    Blob,
    /// A directory listing.
    Tree,
    /// A commit (appears in trees as a submodule entry).
    Commit,
    /// An annotated tag.
    Tag,
}

impl ObjectKind {
    /// Check if this is a tree.
    #[must_use]
    pub fn is_tree(self) -> bool {
        self == Self::Tree
    }

    /// Check if this is a blob.
    #[must_use]
    pub fn is_blob(self) -> bool {
        self == Self::Blob
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blob => write!(f, "blob"),
            Self::Tree => write!(f, "tree"),
            Self::Commit => write!(f, "commit"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

impl FromStr for ObjectKind {
    type Err = Error;

    /// Parse the type name git prints (`blob`, `tree`, `commit`, `tag`).
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "commit" => Ok(Self::Commit),
            "tag" => Ok(Self::Tag),
            other => Err(Error::Backend {
                message: format!("unknown object type {other:?}"),
            }),
        }
    }
}

/// File-mode bits of a tree entry, as git records them.
///
/// Git stores one of five fixed mode values per entry; the type-bits mask
/// distinguishes trees and symlinks from blobs.
///
/// # Examples
///
/// ```
/// use gitpath::backend::FileMode;
///
/// assert!(FileMode::LINK.is_link());
/// assert!(FileMode::TREE.is_tree());
/// assert!(FileMode::BLOB_EXECUTABLE.is_executable());
/// assert!(!FileMode::BLOB.is_executable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMode(u32);

impl FileMode {
    /// Mode of a subtree entry.
    pub const TREE: Self = Self(0o040_000);
    /// Mode of a regular blob entry.
    pub const BLOB: Self = Self(0o100_644);
    /// Mode of an executable blob entry.
    pub const BLOB_EXECUTABLE: Self = Self(0o100_755);
    /// Mode of a symlink entry.
    pub const LINK: Self = Self(0o120_000);
    /// Mode of a submodule (gitlink) entry.
    pub const COMMIT: Self = Self(0o160_000);

    const TYPE_MASK: u32 = 0o170_000;

    /// Wrap raw mode bits.
    #[must_use]
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw mode bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Parse an octal mode string as printed by `git ls-tree`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] if the string is not valid octal.
    pub fn from_octal(s: &str) -> Result<Self> {
        u32::from_str_radix(s, 8).map(Self).map_err(|_| Error::Backend {
            message: format!("malformed mode {s:?} in tree listing"),
        })
    }

    /// Check if the type bits mark a symlink.
    #[must_use]
    pub const fn is_link(self) -> bool {
        self.0 & Self::TYPE_MASK == 0o120_000
    }

    /// Check if the type bits mark a tree.
    #[must_use]
    pub const fn is_tree(self) -> bool {
        self.0 & Self::TYPE_MASK == 0o040_000
    }

    /// Check if the owner-execute bit is set.
    #[must_use]
    pub const fn is_executable(self) -> bool {
        self.0 & 0o100 != 0
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06o}", self.0)
    }
}

/// Primitive object-store operations the path engine is built on.
///
/// One backend instance is bound per root path at construction time and
/// shared by every path derived from that root. Implementations never see
/// uncanonicalized paths except through [`Backend::exists`]: all other
/// methods are called only for paths the engine has already established as
/// existing and canonical (no `.`, `..`, or symlink segments left), so they
/// may treat their preconditions as invariants.
pub trait Backend {
    /// The canonicalized repository location this backend reads from.
    fn location(&self) -> &Path;

    /// Resolve a revision string to the hex id of its tree.
    ///
    /// The revision may use git's extended syntax (`HEAD^`, `branch~2`,
    /// `rev:path`, and so on); it is handed to the underlying machinery as
    /// an opaque string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] if the revision does not exist or does not
    /// peel to a tree.
    fn resolve_revision(&self, rev: &str) -> Result<String>;

    /// Check whether an object exists at `path`.
    ///
    /// The only metadata operation with no precondition: `path` may name a
    /// missing entry or route through a non-tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] if the store cannot be read.
    fn exists(&self, path: &GitPath) -> Result<bool>;

    /// The object type at `path`.
    ///
    /// Precondition: `path` exists and is canonical.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] if the store cannot be read.
    fn kind(&self, path: &GitPath) -> Result<ObjectKind>;

    /// The file-mode bits of the tree entry at `path`.
    ///
    /// The root itself has no entry; it reports [`FileMode::TREE`].
    ///
    /// Precondition: `path` exists and is canonical.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] if the store cannot be read.
    fn mode(&self, path: &GitPath) -> Result<FileMode>;

    /// The entry names of the tree at `path`, in listing order.
    ///
    /// Precondition: `path` exists, is canonical, and is a tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] if the store cannot be read.
    fn list_dir(&self, path: &GitPath) -> Result<Vec<String>>;

    /// The raw bytes of the blob at `path`.
    ///
    /// Precondition: `path` exists, is canonical, and is a blob.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] if the store cannot be read.
    fn read(&self, path: &GitPath) -> Result<Vec<u8>>;

    /// The symlink target recorded at `path`, or `None` when the entry is
    /// not a symlink.
    ///
    /// Precondition: `path` exists and is canonical.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] if the store cannot be read.
    fn link_target(&self, path: &GitPath) -> Result<Option<String>>;

    /// The content hash of the object at `path`, as a hex string.
    ///
    /// Precondition: `path` exists and is canonical.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] if the store cannot be read.
    fn object_id(&self, path: &GitPath) -> Result<String>;
}

/// Forwarding impl so one backend instance can serve several root paths
/// (for example two revisions of the same repository).
impl<B: Backend + ?Sized> Backend for Rc<B> {
    fn location(&self) -> &Path {
        (**self).location()
    }

    fn resolve_revision(&self, rev: &str) -> Result<String> {
        (**self).resolve_revision(rev)
    }

    fn exists(&self, path: &GitPath) -> Result<bool> {
        (**self).exists(path)
    }

    fn kind(&self, path: &GitPath) -> Result<ObjectKind> {
        (**self).kind(path)
    }

    fn mode(&self, path: &GitPath) -> Result<FileMode> {
        (**self).mode(path)
    }

    fn list_dir(&self, path: &GitPath) -> Result<Vec<String>> {
        (**self).list_dir(path)
    }

    fn read(&self, path: &GitPath) -> Result<Vec<u8>> {
        (**self).read(path)
    }

    fn link_target(&self, path: &GitPath) -> Result<Option<String>> {
        (**self).link_target(path)
    }

    fn object_id(&self, path: &GitPath) -> Result<String> {
        (**self).object_id(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_kind_display_round_trips() {
        for kind in [
            ObjectKind::Blob,
            ObjectKind::Tree,
            ObjectKind::Commit,
            ObjectKind::Tag,
        ] {
            let name = kind.to_string();
            assert_eq!(name.parse::<ObjectKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_object_kind_rejects_unknown_type() {
        let err = "branch".parse::<ObjectKind>().unwrap_err();
        assert!(format!("{err}").contains("unknown object type"));
    }

    #[test]
    fn test_file_mode_type_bits() {
        assert!(FileMode::TREE.is_tree());
        assert!(!FileMode::TREE.is_link());
        assert!(FileMode::LINK.is_link());
        assert!(!FileMode::BLOB.is_link());
        assert!(!FileMode::COMMIT.is_tree());
    }

    #[test]
    fn test_file_mode_executable_bit() {
        assert!(FileMode::BLOB_EXECUTABLE.is_executable());
        assert!(!FileMode::BLOB.is_executable());
        assert!(!FileMode::LINK.is_executable());
    }

    #[test]
    fn test_file_mode_from_octal() {
        assert_eq!(FileMode::from_octal("100644").unwrap(), FileMode::BLOB);
        assert_eq!(FileMode::from_octal("40000").unwrap(), FileMode::TREE);
        assert_eq!(FileMode::from_octal("120000").unwrap(), FileMode::LINK);
        assert!(FileMode::from_octal("10x644").is_err());
    }

    #[test]
    fn test_file_mode_displays_octal() {
        assert_eq!(FileMode::BLOB.to_string(), "100644");
        assert_eq!(FileMode::TREE.to_string(), "040000");
    }
}
