//! In-process repository access built on `gix`.
//!
//! This backend opens the object database directly and serves every lookup
//! without spawning a process. Entry lookups walk the root tree by name, so
//! only the trees along the requested path are decoded.

use std::fs;
use std::path::{Path, PathBuf};

use gix::bstr::ByteSlice;
use gix::objs::tree::{EntryKind, EntryMode};

use crate::error::{Error, Result};
use crate::path::GitPath;

use super::{Backend, FileMode, ObjectKind};

/// Read objects through an embedded [`gix`] repository handle.
///
/// # Examples
///
/// ```
/// use gitpath::{GitPath, GitoxideBackend};
///
/// let dir = tempfile::tempdir()?;
/// gitpath::testutil::make_repo(dir.path(), "
/// - tree:
///     file.txt: contents
/// ");
/// let backend = GitoxideBackend::open(dir.path())?;
/// let root = GitPath::open(backend, "HEAD")?;
/// assert!(root.join("file.txt").exists()?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct GitoxideBackend {
    location: PathBuf,
    repo: gix::Repository,
}

impl GitoxideBackend {
    /// Open the repository at `path`, which may be a working directory or a
    /// (bare) git directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] if the path does not exist or holds no
    /// repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let location = fs::canonicalize(path).map_err(|err| Error::Backend {
            message: format!("cannot open repository at {}: {err}", path.display()),
        })?;
        let repo = gix::open(&location).map_err(|err| Error::Backend {
            message: format!("cannot open repository at {}: {err}", location.display()),
        })?;
        Ok(Self { location, repo })
    }

    /// The root tree `path` is anchored to.
    fn root_tree(&self, path: &GitPath) -> Result<gix::Tree<'_>> {
        let id = gix::ObjectId::from_hex(path.root().as_bytes()).map_err(backend_error)?;
        let object = self.repo.find_object(id).map_err(backend_error)?;
        object.try_into_tree().map_err(backend_error)
    }

    /// Locate the tree entry `path` names, or `None` when nothing is there.
    /// A lookup that routes through a blob also comes back `None`.
    fn entry(&self, path: &GitPath) -> Result<Option<(gix::ObjectId, EntryMode)>> {
        let entry = self
            .root_tree(path)?
            .lookup_entry(path.relative_parts().iter().map(String::as_str))
            .map_err(backend_error)?;
        Ok(entry.map(|entry| (entry.object_id(), entry.mode())))
    }

    /// Like [`Self::entry`] for paths already known to exist. The root has
    /// no entry of its own and must be answered before this point.
    fn existing_entry(&self, path: &GitPath) -> Result<(gix::ObjectId, EntryMode)> {
        self.entry(path)?.ok_or_else(|| Error::Backend {
            message: format!("no tree entry at {path}"),
        })
    }

    fn read_object(&self, id: gix::ObjectId) -> Result<Vec<u8>> {
        let object = self.repo.find_object(id).map_err(backend_error)?;
        Ok(object.detach().data)
    }
}

impl Backend for GitoxideBackend {
    fn location(&self) -> &Path {
        &self.location
    }

    fn resolve_revision(&self, rev: &str) -> Result<String> {
        let id = self.repo.rev_parse_single(rev).map_err(backend_error)?;
        let object = id.object().map_err(backend_error)?;
        let tree = object.peel_to_tree().map_err(backend_error)?;
        Ok(tree.id.to_string())
    }

    fn exists(&self, path: &GitPath) -> Result<bool> {
        if path.relative_parts().is_empty() {
            return Ok(true);
        }
        Ok(self.entry(path)?.is_some())
    }

    fn kind(&self, path: &GitPath) -> Result<ObjectKind> {
        if path.relative_parts().is_empty() {
            return Ok(ObjectKind::Tree);
        }
        let (_, mode) = self.existing_entry(path)?;
        Ok(object_kind(mode))
    }

    fn mode(&self, path: &GitPath) -> Result<FileMode> {
        if path.relative_parts().is_empty() {
            return Ok(FileMode::TREE);
        }
        let (_, mode) = self.existing_entry(path)?;
        Ok(FileMode::new(u32::from(mode.0)))
    }

    fn list_dir(&self, path: &GitPath) -> Result<Vec<String>> {
        let tree = if path.relative_parts().is_empty() {
            self.root_tree(path)?
        } else {
            let (id, _) = self.existing_entry(path)?;
            let object = self.repo.find_object(id).map_err(backend_error)?;
            object.try_into_tree().map_err(backend_error)?
        };
        let mut names = Vec::new();
        for entry in tree.iter() {
            let entry = entry.map_err(backend_error)?;
            names.push(entry.filename().to_str_lossy().into_owned());
        }
        Ok(names)
    }

    fn read(&self, path: &GitPath) -> Result<Vec<u8>> {
        let (id, _) = self.existing_entry(path)?;
        self.read_object(id)
    }

    fn link_target(&self, path: &GitPath) -> Result<Option<String>> {
        if path.relative_parts().is_empty() {
            return Ok(None);
        }
        let (id, mode) = self.existing_entry(path)?;
        if !mode.is_link() {
            return Ok(None);
        }
        let bytes = self.read_object(id)?;
        Ok(Some(bytes.to_str_lossy().into_owned()))
    }

    fn object_id(&self, path: &GitPath) -> Result<String> {
        if path.relative_parts().is_empty() {
            return Ok(path.root().to_string());
        }
        let (id, _) = self.existing_entry(path)?;
        Ok(id.to_string())
    }
}

/// The entry kind of a submodule is a commit; everything else a tree entry
/// can point at is a blob or another tree.
fn object_kind(mode: EntryMode) -> ObjectKind {
    match mode.kind() {
        EntryKind::Tree => ObjectKind::Tree,
        EntryKind::Commit => ObjectKind::Commit,
        EntryKind::Blob | EntryKind::BlobExecutable | EntryKind::Link => ObjectKind::Blob,
    }
}

fn backend_error(err: impl std::fmt::Display) -> Error {
    Error::Backend {
        message: err.to_string(),
    }
}
