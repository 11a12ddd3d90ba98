//! Metadata and content access for snapshot paths.
//!
//! Everything here is read-only. Predicates and reads resolve the path
//! first (strictly or leniently, matching what each operation promises)
//! and then consult the backend about the canonical target. The mutating
//! method family exists so that code written against filesystem-style
//! paths fails with a permission error instead of not compiling, which
//! keeps the read-only nature of a snapshot a runtime fact rather than an
//! API gap.

use std::io;

use crate::backend::FileMode;
use crate::error::{Error, Result};
use crate::path::resolve::ResolveMode;
use crate::path::types::{GitPath, ObjectMeta};

/// Stat-like record for one snapshot object.
///
/// Snapshots carry no ownership or timestamps, so those fields hold fixed
/// placeholder values: device is `-1`, the link count is `1`, user and
/// group ids are `0`, and all three timestamps are `0`. The inode is
/// derived from the object's content hash, so identical content shares an
/// inode even across repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    /// File-mode bits of the entry.
    pub mode: FileMode,
    /// Inode-like integer: the first eight bytes of the content hash,
    /// little-endian.
    pub ino: u64,
    /// Device placeholder, always `-1`.
    pub dev: i64,
    /// Link-count placeholder, always `1`.
    pub nlink: u32,
    /// Owner placeholder, always `0`.
    pub uid: u32,
    /// Group placeholder, always `0`.
    pub gid: u32,
    /// Blob byte length, or entry count for a tree.
    pub size: u64,
    /// Access-time placeholder, always `0`.
    pub atime: i64,
    /// Modification-time placeholder, always `0`.
    pub mtime: i64,
    /// Change-time placeholder, always `0`.
    pub ctime: i64,
}

fn inode_from_hex(hex: &str) -> u64 {
    let mut bytes = [0_u8; 8];
    for (slot, pair) in bytes.iter_mut().zip(hex.as_bytes().chunks(2)) {
        let digits = std::str::from_utf8(pair).unwrap_or("00");
        *slot = u8::from_str_radix(digits, 16).unwrap_or(0);
    }
    u64::from_le_bytes(bytes)
}

impl GitPath {
    /// The lazily fetched (hash, type, mode) triple for this path.
    /// Precondition: the path is canonical and existing.
    pub(super) fn object_meta(&self) -> Result<&ObjectMeta> {
        if let Some(meta) = self.node.meta.get() {
            return Ok(meta);
        }
        let computed = ObjectMeta {
            hex: self.backend().object_id(self)?,
            kind: self.backend().kind(self)?,
            mode: self.backend().mode(self)?,
        };
        Ok(self.node.meta.get_or_init(|| computed))
    }

    /// Check whether this path resolves to an existing object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SymlinkLoop`] if resolution cycles and
    /// [`Error::Backend`] if the store cannot be read. A missing object is
    /// `Ok(false)`, not an error.
    pub fn exists(&self) -> Result<bool> {
        match self.resolve(ResolveMode::Strict) {
            Ok(_) => Ok(true),
            Err(Error::NotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Check whether this path resolves to a tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SymlinkLoop`] if resolution cycles and
    /// [`Error::Backend`] if the store cannot be read.
    pub fn is_dir(&self) -> Result<bool> {
        let (exists, resolved) = self.resolved_pair()?;
        if !exists {
            return Ok(false);
        }
        Ok(resolved.object_meta()?.kind.is_tree())
    }

    /// Check whether this path resolves to a blob.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SymlinkLoop`] if resolution cycles and
    /// [`Error::Backend`] if the store cannot be read.
    pub fn is_file(&self) -> Result<bool> {
        let (exists, resolved) = self.resolved_pair()?;
        if !exists {
            return Ok(false);
        }
        Ok(resolved.object_meta()?.kind.is_blob())
    }

    /// Check whether the entry this path names (without following it) is a
    /// symlink.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SymlinkLoop`] if resolving the parent chain cycles
    /// and [`Error::Backend`] if the store cannot be read.
    pub fn is_symlink(&self) -> Result<bool> {
        Ok(self.info_record()?.link_target.is_some())
    }

    /// Always true: every snapshot path is anchored to a root tree.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        true
    }

    /// Always false: snapshots cannot contain sockets.
    #[must_use]
    pub fn is_socket(&self) -> bool {
        false
    }

    /// Always false: snapshots cannot contain FIFOs.
    #[must_use]
    pub fn is_fifo(&self) -> bool {
        false
    }

    /// Always false: snapshots cannot contain block devices.
    #[must_use]
    pub fn is_block_device(&self) -> bool {
        false
    }

    /// Always false: snapshots cannot contain character devices.
    #[must_use]
    pub fn is_char_device(&self) -> bool {
        false
    }

    /// List this directory, yielding children of this path (not of its
    /// resolution) in backend listing order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the path does not resolve,
    /// [`Error::NotATree`] if it resolves to a blob, [`Error::SymlinkLoop`]
    /// if resolution cycles, and [`Error::Backend`] if the store cannot be
    /// read (including listing a submodule entry).
    ///
    /// # Examples
    ///
    /// ```
    /// use gitpath::{GitPath, GitoxideBackend};
    ///
    /// let dir = tempfile::tempdir()?;
    /// gitpath::testutil::make_repo(dir.path(), "
    /// - tree:
    ///     a.txt: first
    ///     b.txt: second
    /// ");
    /// let root = GitPath::open(GitoxideBackend::open(dir.path())?, "HEAD")?;
    ///
    /// let names: Vec<String> = root
    ///     .iterdir()?
    ///     .into_iter()
    ///     .map(|p| p.name().to_string())
    ///     .collect();
    /// assert_eq!(names, ["a.txt", "b.txt"]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn iterdir(&self) -> Result<Vec<Self>> {
        let resolved = self.resolve(ResolveMode::Strict)?;
        if resolved.object_meta()?.kind.is_blob() {
            return Err(Error::NotATree {
                path: self.to_string(),
            });
        }
        let names = self.backend().list_dir(&resolved)?;
        Ok(names.iter().map(|name| self.child(name)).collect())
    }

    /// Read the blob this path resolves to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the path does not resolve,
    /// [`Error::NotABlob`] if it resolves to something other than a blob,
    /// [`Error::SymlinkLoop`] if resolution cycles, and [`Error::Backend`]
    /// if the store cannot be read.
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        let resolved = self.resolve(ResolveMode::Strict)?;
        if !resolved.object_meta()?.kind.is_blob() {
            return Err(Error::NotABlob {
                path: self.to_string(),
            });
        }
        self.backend().read(&resolved)
    }

    /// Read the blob this path resolves to as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`GitPath::read_bytes`], plus
    /// [`Error::InvalidUtf8`] if the contents do not decode.
    pub fn read_text(&self) -> Result<String> {
        String::from_utf8(self.read_bytes()?).map_err(|_| Error::InvalidUtf8 {
            path: self.to_string(),
        })
    }

    /// Read the blob this path resolves to as text, replacing invalid
    /// UTF-8 sequences with the replacement character.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`GitPath::read_bytes`].
    pub fn read_text_lossy(&self) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.read_bytes()?).into_owned())
    }

    /// A read-only, seekable reader over the blob's bytes.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`GitPath::read_bytes`].
    pub fn reader(&self) -> Result<io::Cursor<Vec<u8>>> {
        Ok(io::Cursor::new(self.read_bytes()?))
    }

    /// Metadata of the entry this path names, without following a final
    /// symlink.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no object exists here,
    /// [`Error::SymlinkLoop`] if resolving the parent chain cycles, and
    /// [`Error::Backend`] if the store cannot be read.
    pub fn lstat(&self) -> Result<Stat> {
        let info = self.info_record()?;
        if !info.exists {
            return Err(Error::NotFound {
                path: self.to_string(),
            });
        }
        info.canonical.load(self).stat_record()
    }

    /// Metadata of the object this path resolves to.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`GitPath::resolve`] in lenient mode, then
    /// those of [`GitPath::lstat`] on the resolved path.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitpath::{GitPath, GitoxideBackend};
    ///
    /// let dir = tempfile::tempdir()?;
    /// gitpath::testutil::make_repo(dir.path(), "
    /// - tree:
    ///     file.txt: hello
    /// ");
    /// let root = GitPath::open(GitoxideBackend::open(dir.path())?, "HEAD")?;
    ///
    /// let stat = root.join("file.txt").stat()?;
    /// assert_eq!(stat.size, 5);
    /// assert_eq!(stat.dev, -1);
    /// assert_eq!(stat.nlink, 1);
    /// assert_eq!(stat.mtime, 0);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn stat(&self) -> Result<Stat> {
        self.resolve(ResolveMode::Lenient)?.lstat()
    }

    /// Build the stat record for a canonical existing path.
    fn stat_record(&self) -> Result<Stat> {
        let meta = self.object_meta()?.clone();
        let size = if meta.kind.is_tree() {
            self.backend().list_dir(self)?.len() as u64
        } else {
            self.backend().read(self)?.len() as u64
        };
        Ok(Stat {
            mode: meta.mode,
            ino: inode_from_hex(&meta.hex),
            dev: -1,
            nlink: 1,
            uid: 0,
            gid: 0,
            size,
            atime: 0,
            mtime: 0,
            ctime: 0,
        })
    }

    /// The content hash of the entry this path names, without following a
    /// final symlink.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no object exists here,
    /// [`Error::SymlinkLoop`] if resolving the parent chain cycles, and
    /// [`Error::Backend`] if the store cannot be read.
    pub fn hex(&self) -> Result<String> {
        let info = self.info_record()?;
        if !info.exists {
            return Err(Error::NotFound {
                path: self.to_string(),
            });
        }
        Ok(info.canonical.load(self).object_meta()?.hex.clone())
    }

    /// Check whether two paths resolve to the same object.
    ///
    /// Content hashes decide this, so identical content in different
    /// repositories counts as the same file.
    ///
    /// # Errors
    ///
    /// Propagates strict-resolution errors for either path.
    pub fn samefile(&self, other: &Self) -> Result<bool> {
        let mine = self.resolve(ResolveMode::Strict)?.hex()?;
        let theirs = other.resolve(ResolveMode::Strict)?.hex()?;
        Ok(mine == theirs)
    }

    /// Owner lookup. Snapshot objects have no owner.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::Unsupported`].
    pub fn owner(&self) -> Result<String> {
        Err(Error::Unsupported {
            reason: "git objects are not owned by a user".to_string(),
        })
    }

    /// Group lookup. Snapshot objects have no group.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::Unsupported`].
    pub fn group(&self) -> Result<String> {
        Err(Error::Unsupported {
            reason: "git objects are not owned by a group".to_string(),
        })
    }

    fn read_only(&self) -> Error {
        Error::ReadOnly {
            path: self.to_string(),
        }
    }

    /// Mode changes are impossible in a snapshot.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::ReadOnly`].
    pub fn chmod(&self, _mode: FileMode) -> Result<()> {
        Err(self.read_only())
    }

    /// Mode changes are impossible in a snapshot, links included.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::ReadOnly`].
    pub fn lchmod(&self, _mode: FileMode) -> Result<()> {
        Err(self.read_only())
    }

    /// Directory creation is impossible in a snapshot.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::ReadOnly`].
    pub fn mkdir(&self) -> Result<()> {
        Err(self.read_only())
    }

    /// Directory removal is impossible in a snapshot.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::ReadOnly`].
    pub fn rmdir(&self) -> Result<()> {
        Err(self.read_only())
    }

    /// Renaming is impossible in a snapshot.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::ReadOnly`].
    pub fn rename(&self, _target: &str) -> Result<()> {
        Err(self.read_only())
    }

    /// Replacing is impossible in a snapshot.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::ReadOnly`].
    pub fn replace(&self, _target: &str) -> Result<()> {
        Err(self.read_only())
    }

    /// Symlink creation is impossible in a snapshot.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::ReadOnly`].
    pub fn symlink_to(&self, _target: &str) -> Result<()> {
        Err(self.read_only())
    }

    /// Touching is impossible in a snapshot.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::ReadOnly`].
    pub fn touch(&self) -> Result<()> {
        Err(self.read_only())
    }

    /// Unlinking is impossible in a snapshot.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::ReadOnly`].
    pub fn unlink(&self) -> Result<()> {
        Err(self.read_only())
    }

    /// Writing is impossible in a snapshot.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::ReadOnly`].
    pub fn write_bytes(&self, _data: &[u8]) -> Result<()> {
        Err(self.read_only())
    }

    /// Writing is impossible in a snapshot.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::ReadOnly`].
    pub fn write_text(&self, _text: &str) -> Result<()> {
        Err(self.read_only())
    }
}
