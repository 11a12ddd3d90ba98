//! Core node model for snapshot paths.
//!
//! This module defines [`GitPath`] and its backing node structure. Nodes
//! form a tree rooted at the anchor: each node owns a counted reference to
//! its parent, parents never reference children, and the lazily-populated
//! cache cells on each node use a self marker instead of a counted handle
//! whenever a cached target is the node itself, keeping the ownership graph
//! free of cycles.

use std::cell::OnceCell;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::backend::{Backend, FileMode, ObjectKind};
use crate::error::Result;

/// State shared by every path derived from one root: the backend binding,
/// the repository location, and the root tree id.
pub(super) struct RootCtx {
    pub(super) backend: Rc<dyn Backend>,
    pub(super) drive: PathBuf,
    pub(super) root_hex: String,
}

/// One path component node. Structurally immutable after construction;
/// only the cache cells fill in lazily.
pub(super) struct Node {
    pub(super) ctx: Rc<RootCtx>,
    /// `None` at the anchor.
    pub(super) parent: Option<Rc<Node>>,
    /// Empty string at the anchor. May be a literal `.` or `..`.
    pub(super) name: String,
    pub(super) rel_parts: OnceCell<Box<[String]>>,
    pub(super) info: OnceCell<PathInfo>,
    pub(super) resolved: OnceCell<Resolution>,
    pub(super) meta: OnceCell<ObjectMeta>,
}

impl Node {
    pub(super) fn new(ctx: Rc<RootCtx>, parent: Option<Rc<Node>>, name: String) -> Self {
        Self {
            ctx,
            parent,
            name,
            rel_parts: OnceCell::new(),
            info: OnceCell::new(),
            resolved: OnceCell::new(),
            meta: OnceCell::new(),
        }
    }
}

/// A cached reference to another path. `Same` marks the owning node itself;
/// storing the owner's own counted handle here would leak the node.
#[derive(Clone)]
pub(super) enum CachedPath {
    Same,
    Other(GitPath),
}

impl CachedPath {
    /// Store `target` relative to its owning path.
    pub(super) fn store(owner: &GitPath, target: GitPath) -> Self {
        if Rc::ptr_eq(&owner.node, &target.node) {
            Self::Same
        } else {
            Self::Other(target)
        }
    }

    /// Recover the referenced path, given the owning path.
    pub(super) fn load(&self, owner: &GitPath) -> GitPath {
        match self {
            Self::Same => owner.clone(),
            Self::Other(path) => path.clone(),
        }
    }
}

/// Per-path record relating a literal path to the snapshot: whether an
/// object exists there, the canonical non-link sibling it names, and the
/// raw symlink target when the entry is a symlink.
#[derive(Clone)]
pub(super) struct PathInfo {
    pub(super) exists: bool,
    pub(super) canonical: CachedPath,
    pub(super) link_target: Option<String>,
}

/// Memoized outcome of fully resolving a path: the link-free target and
/// whether an object exists there. Strictness is applied on top of this
/// record, so one cell serves both modes.
#[derive(Clone)]
pub(super) struct Resolution {
    pub(super) exists: bool,
    pub(super) target: CachedPath,
}

/// Lazily fetched object reference for a canonical existing path.
#[derive(Clone)]
pub(super) struct ObjectMeta {
    pub(super) hex: String,
    pub(super) kind: ObjectKind,
    pub(super) mode: FileMode,
}

/// A read-only path inside one git tree snapshot.
///
/// A `GitPath` is anchored to the tree of a single revision and never
/// escapes it. Paths are cheap to clone (a counted handle), structurally
/// immutable, and lazily cache everything they learn from the backend.
///
/// Equality, hashing, and ordering consider the root tree id and the
/// component sequence but not the repository location, so equal snapshots
/// in different clones yield equal paths.
///
/// # Examples
///
/// ```
/// use gitpath::{GitPath, GitoxideBackend};
///
/// let dir = tempfile::tempdir()?;
/// gitpath::testutil::make_repo(dir.path(), "
/// - tree:
///     README.md: hello
/// ");
/// let root = GitPath::open(GitoxideBackend::open(dir.path())?, "HEAD")?;
/// assert_eq!(root.join("README.md").read_text()?, "hello");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct GitPath {
    pub(super) node: Rc<Node>,
}

impl GitPath {
    /// Open the tree snapshot of `revision` through `backend` and return
    /// its root path.
    ///
    /// The revision may use git's extended syntax (`HEAD^`, `branch~2`,
    /// `v1.0:src`, a full hex id, and so on).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`](crate::Error::Backend) if the revision
    /// cannot be resolved to a tree.
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
    /// let root = GitPath::open(GitoxideBackend::open(dir.path())?, "HEAD")?;
    /// assert_eq!(root.name(), "");
    /// assert_eq!(root.root().len(), 40);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(backend: impl Backend + 'static, revision: &str) -> Result<Self> {
        let backend: Rc<dyn Backend> = Rc::new(backend);
        let root_hex = backend.resolve_revision(revision)?;
        log::debug!("revision {revision:?} resolved to tree {root_hex}");
        let drive = backend.location().to_path_buf();
        let ctx = Rc::new(RootCtx {
            backend,
            drive,
            root_hex,
        });
        Ok(Self::from_node(Rc::new(Node::new(ctx, None, String::new()))))
    }

    /// Open a snapshot and join initial segments in one step.
    ///
    /// Equivalent to `GitPath::open(backend, revision)?.join(path)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`](crate::Error::Backend) if the revision
    /// cannot be resolved to a tree.
    pub fn open_at(backend: impl Backend + 'static, revision: &str, path: &str) -> Result<Self> {
        Ok(Self::open(backend, revision)?.join(path))
    }

    pub(super) fn from_node(node: Rc<Node>) -> Self {
        Self { node }
    }

    /// Construct the child named `name` without validation or parsing.
    /// Resolution and globbing build literal `.`/`..` children through this.
    pub(super) fn child(&self, name: &str) -> Self {
        Self::from_node(Rc::new(Node::new(
            self.node.ctx.clone(),
            Some(self.node.clone()),
            name.to_string(),
        )))
    }

    pub(super) fn backend(&self) -> &dyn Backend {
        &*self.node.ctx.backend
    }

    pub(super) fn is_anchor(&self) -> bool {
        self.node.parent.is_none()
    }

    /// The anchor this path hangs off.
    pub(super) fn root_path(&self) -> Self {
        let mut node = self.node.clone();
        while let Some(parent) = node.parent.clone() {
            node = parent;
        }
        Self::from_node(node)
    }

    /// The repository location this path reads from.
    ///
    /// The drive identifies where objects come from but plays no part in
    /// equality or ordering.
    #[must_use]
    pub fn drive(&self) -> &Path {
        &self.node.ctx.drive
    }

    /// The hex id of the root tree this path is anchored to.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.node.ctx.root_hex
    }

    /// The anchor token, `<drive>:<root>`.
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
    /// let root = GitPath::open(GitoxideBackend::open(dir.path())?, "HEAD")?;
    /// let anchor = root.anchor();
    /// assert!(anchor.ends_with(root.root()));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn anchor(&self) -> String {
        format!("{}:{}", self.node.ctx.drive.display(), self.node.ctx.root_hex)
    }

    /// The last component, or the empty string at the root.
    ///
    /// The name is whatever was joined, so it may be a literal `.` or `..`;
    /// only [`GitPath::resolve`] interprets those.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// The components after the anchor, in order.
    ///
    /// Backend implementations walk these to locate the entry a path names.
    #[must_use]
    pub fn relative_parts(&self) -> &[String] {
        self.node.rel_parts.get_or_init(|| {
            let mut parts = match &self.node.parent {
                Some(parent) => Self::from_node(parent.clone()).relative_parts().to_vec(),
                None => Vec::new(),
            };
            if self.node.parent.is_some() {
                parts.push(self.node.name.clone());
            }
            parts.into_boxed_slice()
        })
    }

    /// All components, beginning with the anchor token.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitpath::{GitPath, GitoxideBackend};
    ///
    /// let dir = tempfile::tempdir()?;
    /// gitpath::testutil::make_repo(dir.path(), "
    /// - tree:
    ///     dir:
    ///         file.txt: contents
    /// ");
    /// let path = GitPath::open_at(GitoxideBackend::open(dir.path())?, "HEAD", "dir/file.txt")?;
    /// let parts = path.parts();
    /// assert_eq!(parts[0], path.anchor());
    /// assert_eq!(&parts[1..], ["dir", "file.txt"]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn parts(&self) -> Vec<String> {
        let mut parts = Vec::with_capacity(1 + self.relative_parts().len());
        parts.push(self.anchor());
        parts.extend(self.relative_parts().iter().cloned());
        parts
    }

    /// The path one component shorter. The root is its own parent.
    #[must_use]
    pub fn parent(&self) -> Self {
        match &self.node.parent {
            Some(parent) => Self::from_node(parent.clone()),
            None => self.clone(),
        }
    }

    /// The ancestor chain, nearest first, excluding this path. Empty at
    /// the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitpath::{GitPath, GitoxideBackend};
    ///
    /// let dir = tempfile::tempdir()?;
    /// gitpath::testutil::make_repo(dir.path(), "
    /// - tree:
    ///     dir:
    ///         file.txt: contents
    /// ");
    /// let path = GitPath::open_at(GitoxideBackend::open(dir.path())?, "HEAD", "dir/file.txt")?;
    /// let parents = path.parents();
    /// assert_eq!(parents.len(), 2);
    /// assert_eq!(parents[0].name(), "dir");
    /// assert_eq!(parents[1].name(), "");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn parents(&self) -> Vec<Self> {
        let mut chain = Vec::new();
        let mut node = self.node.parent.clone();
        while let Some(current) = node {
            node = current.parent.clone();
            chain.push(Self::from_node(current));
        }
        chain
    }
}

impl PartialEq for GitPath {
    fn eq(&self, other: &Self) -> bool {
        self.node.ctx.root_hex == other.node.ctx.root_hex
            && self.relative_parts() == other.relative_parts()
    }
}

impl Eq for GitPath {}

impl Hash for GitPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.ctx.root_hex.hash(state);
        for part in self.relative_parts() {
            part.hash(state);
        }
    }
}

impl PartialOrd for GitPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GitPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.node
            .ctx
            .root_hex
            .cmp(&other.node.ctx.root_hex)
            .then_with(|| self.relative_parts().cmp(other.relative_parts()))
    }
}

impl fmt::Display for GitPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.anchor())?;
        for part in self.relative_parts() {
            write!(f, "/{part}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for GitPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GitPath({:?}, {:?}",
            self.node.ctx.drive.display().to_string(),
            self.node.ctx.root_hex
        )?;
        for part in self.relative_parts() {
            write!(f, ", {part:?}")?;
        }
        write!(f, ")")
    }
}

/// Backend stand-in for tests that exercise pure path algebra. Metadata
/// calls fail; only construction works.
#[cfg(test)]
pub(super) struct StubBackend;

#[cfg(test)]
pub(super) const STUB_HEX: &str = "3f786850e387550fdab836ed7e6dc881de23001b";

#[cfg(test)]
impl Backend for StubBackend {
    fn location(&self) -> &Path {
        Path::new("/stub/repo")
    }

    fn resolve_revision(&self, _rev: &str) -> Result<String> {
        Ok(STUB_HEX.to_string())
    }

    fn exists(&self, _path: &GitPath) -> Result<bool> {
        Ok(false)
    }

    fn kind(&self, _path: &GitPath) -> Result<ObjectKind> {
        Err(stub_error())
    }

    fn mode(&self, _path: &GitPath) -> Result<FileMode> {
        Err(stub_error())
    }

    fn list_dir(&self, _path: &GitPath) -> Result<Vec<String>> {
        Err(stub_error())
    }

    fn read(&self, _path: &GitPath) -> Result<Vec<u8>> {
        Err(stub_error())
    }

    fn link_target(&self, _path: &GitPath) -> Result<Option<String>> {
        Err(stub_error())
    }

    fn object_id(&self, _path: &GitPath) -> Result<String> {
        Err(stub_error())
    }
}

#[cfg(test)]
fn stub_error() -> crate::Error {
    crate::Error::Backend {
        message: "stub backend has no objects".to_string(),
    }
}

#[cfg(test)]
pub(super) fn stub_root() -> GitPath {
    GitPath::open(StubBackend, "HEAD").unwrap()
}
