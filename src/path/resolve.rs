//! Symlink and dot-segment resolution.
//!
//! Resolution is defined bottom-up: a path's canonical form is found by
//! resolving its parent first, then interpreting the final component
//! against that resolved parent. `.` is a no-op, `..` undoes one resolved
//! level, and a symlink entry is chased through its target with a per-call
//! set of in-progress links guarding against cycles.
//!
//! Each node memoizes two records: its *info* (does an object exist here,
//! which canonical sibling does the name denote, and the raw symlink target
//! if the entry is a link) and its *resolution* (the link-free target plus
//! an existence flag). Strictness is applied on top of the memoized
//! resolution, so strict and lenient calls share the same cached work and
//! never interfere. Errors are never cached.

use std::collections::HashSet;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::path::types::{CachedPath, GitPath, PathInfo, Resolution};

/// Strictness of [`GitPath::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveMode {
    /// Any missing segment is a hard failure.
    Strict,
    /// Resolve as far as objects exist; the missing remainder is kept
    /// literally, permitting further joins on top.
    Lenient,
}

impl GitPath {
    /// Canonicalize this path: collapse `.` and `..` segments and follow
    /// every symlink, yielding a path with no special segments left.
    ///
    /// In [`ResolveMode::Strict`] the entire chain must exist. In
    /// [`ResolveMode::Lenient`] resolution proceeds as far as objects
    /// exist and the unresolved remainder is appended literally.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] (naming the originally requested path)
    /// in strict mode when a segment is missing, [`Error::SymlinkLoop`]
    /// when link indirections cycle, and [`Error::Backend`] if the store
    /// cannot be read.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitpath::{GitPath, GitoxideBackend, ResolveMode};
    ///
    /// let dir = tempfile::tempdir()?;
    /// gitpath::testutil::make_repo(dir.path(), "
    /// - tree:
    ///     docs:
    ///         guide.md: read me
    ///     link: [link, docs/guide.md]
    /// ");
    /// let root = GitPath::open(GitoxideBackend::open(dir.path())?, "HEAD")?;
    ///
    /// let via_link = root.join("link").resolve(ResolveMode::Strict)?;
    /// assert_eq!(via_link, root.join("docs/guide.md"));
    ///
    /// let missing = root.join("docs/absent");
    /// assert!(missing.resolve(ResolveMode::Strict).is_err());
    /// assert_eq!(missing.resolve(ResolveMode::Lenient)?, missing);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn resolve(&self, mode: ResolveMode) -> Result<Self> {
        let (exists, resolved) = self.resolved_pair()?;
        if mode == ResolveMode::Strict && !exists {
            return Err(Error::NotFound {
                path: self.to_string(),
            });
        }
        Ok(resolved)
    }

    /// Resolve without applying strictness: the canonical target plus
    /// whether an object exists there.
    pub(super) fn resolved_pair(&self) -> Result<(bool, Self)> {
        let seen = HashSet::new();
        let resolution = self.resolution(&seen)?;
        Ok((resolution.exists, resolution.target.load(self)))
    }

    /// The memoized info record for this path.
    pub(super) fn info_record(&self) -> Result<PathInfo> {
        let seen = HashSet::new();
        self.path_info(&seen)
    }

    fn path_info(&self, seen: &HashSet<Self>) -> Result<PathInfo> {
        if let Some(cached) = self.node.info.get() {
            return Ok(cached.clone());
        }
        let computed = self.compute_info(seen)?;
        Ok(self.node.info.get_or_init(|| computed).clone())
    }

    fn compute_info(&self, seen: &HashSet<Self>) -> Result<PathInfo> {
        let Some(parent_node) = self.node.parent.clone() else {
            return Ok(PathInfo {
                exists: true,
                canonical: CachedPath::Same,
                link_target: None,
            });
        };
        let parent = Self::from_node(parent_node);
        let parent_resolution = parent.resolution(seen)?;
        let resolved_parent = parent_resolution.target.load(&parent);

        // Post-root, `.` denotes whatever came before it and `..` undoes
        // one resolved level. Both inherit the resolved parent's existence.
        if self.node.name == "." {
            return Ok(PathInfo {
                exists: parent_resolution.exists,
                canonical: CachedPath::store(self, resolved_parent),
                link_target: None,
            });
        }
        if self.node.name == ".." {
            return Ok(PathInfo {
                exists: parent_resolution.exists,
                canonical: CachedPath::store(self, resolved_parent.parent()),
                link_target: None,
            });
        }

        let sibling = if Rc::ptr_eq(&resolved_parent.node, &parent.node) {
            self.clone()
        } else {
            resolved_parent.child(&self.node.name)
        };
        if !self.backend().exists(&sibling)? {
            return Ok(PathInfo {
                exists: false,
                canonical: CachedPath::store(self, sibling),
                link_target: None,
            });
        }
        let mode = self.backend().mode(&sibling)?;
        let link_target = if mode.is_link() {
            self.backend().link_target(&sibling)?
        } else {
            None
        };
        Ok(PathInfo {
            exists: true,
            canonical: CachedPath::store(self, sibling),
            link_target,
        })
    }

    pub(super) fn resolution(&self, seen: &HashSet<Self>) -> Result<Resolution> {
        if let Some(cached) = self.node.resolved.get() {
            return Ok(cached.clone());
        }
        let computed = self.compute_resolution(seen)?;
        Ok(self.node.resolved.get_or_init(|| computed).clone())
    }

    fn compute_resolution(&self, seen: &HashSet<Self>) -> Result<Resolution> {
        let info = self.path_info(seen)?;
        let canonical = info.canonical.load(self);
        let Some(raw_target) = info.link_target else {
            return Ok(Resolution {
                exists: info.exists,
                target: CachedPath::store(self, canonical),
            });
        };

        if seen.contains(&canonical) {
            log::debug!("symlink loop detected while resolving {self}");
            return Err(Error::SymlinkLoop {
                path: self.to_string(),
            });
        }
        let mut seen = seen.clone();
        seen.insert(canonical.clone());

        let target = canonical.parent().join(&raw_target);
        let target_resolution = target.resolution(&seen)?;
        let resolved = target_resolution.target.load(&target);
        Ok(Resolution {
            exists: target_resolution.exists,
            target: CachedPath::store(self, resolved),
        })
    }
}
