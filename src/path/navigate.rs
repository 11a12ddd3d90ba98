//! Navigation and name arithmetic for snapshot paths.
//!
//! Joining is purely structural: segments are split on `/`, empty and `.`
//! segments are dropped, `..` is kept literally, and an absolute argument
//! resets to the root. Nothing here consults the backend; whether the
//! resulting path names an object is a question for resolution.

use std::ops::Div;

use crate::error::{Error, Result};
use crate::path::glob::compile_segment;
use crate::path::types::GitPath;

/// Split a path string into segments the way conventional path parsing
/// does: empty and `.` segments vanish, `..` survives. The flag reports
/// whether the string was absolute.
pub(super) fn split_segments(path: &str) -> (bool, Vec<String>) {
    let absolute = path.starts_with('/');
    let segments = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .map(str::to_string)
        .collect();
    (absolute, segments)
}

/// Check a single name component: non-empty, no separator, no NUL.
pub(super) fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\0')
}

impl GitPath {
    /// Join path segments onto this path.
    ///
    /// Empty and `.` segments are dropped; `..` segments are kept literally
    /// (only [`GitPath::resolve`] interprets them); an absolute argument
    /// replaces everything and joins from the root.
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
    /// let root = GitPath::open(GitoxideBackend::open(dir.path())?, "HEAD")?;
    ///
    /// let file = root.join("dir//./file.txt");
    /// assert_eq!(file.relative_parts(), ["dir", "file.txt"]);
    ///
    /// let dotted = root.join("dir/../dir");
    /// assert_eq!(dotted.relative_parts(), ["dir", "..", "dir"]);
    ///
    /// let reset = file.join("/dir");
    /// assert_eq!(reset.relative_parts(), ["dir"]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn join(&self, path: &str) -> Self {
        let (absolute, segments) = split_segments(path);
        let mut current = if absolute {
            self.root_path()
        } else {
            self.clone()
        };
        for segment in &segments {
            current = current.child(segment);
        }
        current
    }

    /// The final component's suffix, from its rightmost dot (inclusive), or
    /// the empty string when the name has no dot. A name that starts with
    /// its only dot, like `.gitignore`, is all suffix and no stem.
    #[must_use]
    pub fn suffix(&self) -> &str {
        match self.node.name.rfind('.') {
            Some(index) => &self.node.name[index..],
            None => "",
        }
    }

    /// Every dot-separated suffix of the final component, each with its
    /// leading dot, outermost last.
    #[must_use]
    pub fn suffixes(&self) -> Vec<String> {
        self.node
            .name
            .split('.')
            .skip(1)
            .map(|piece| format!(".{piece}"))
            .collect()
    }

    /// The final component with its suffix removed.
    #[must_use]
    pub fn stem(&self) -> &str {
        match self.node.name.rfind('.') {
            Some(index) => &self.node.name[..index],
            None => &self.node.name,
        }
    }

    /// A sibling path with the final component replaced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if this path is the root (it has no
    /// name to replace) or if `name` is empty or contains `/` or NUL.
    /// Literal `.` and `..` are accepted.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitpath::{GitPath, GitoxideBackend};
    ///
    /// let dir = tempfile::tempdir()?;
    /// gitpath::testutil::make_repo(dir.path(), "
    /// - tree:
    ///     notes.txt: contents
    /// ");
    /// let root = GitPath::open(GitoxideBackend::open(dir.path())?, "HEAD")?;
    ///
    /// let renamed = root.join("notes.txt").with_name("todo.txt")?;
    /// assert_eq!(renamed.name(), "todo.txt");
    /// assert!(root.with_name("anything").is_err());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn with_name(&self, name: &str) -> Result<Self> {
        if self.is_anchor() {
            return Err(Error::InvalidName {
                name: name.to_string(),
                reason: format!("{self} has an empty name"),
            });
        }
        if !is_valid_name(name) {
            return Err(Error::InvalidName {
                name: name.to_string(),
                reason: "names must be non-empty and free of '/' and NUL".to_string(),
            });
        }
        Ok(self.parent().child(name))
    }

    /// A sibling path with the final component's suffix replaced.
    ///
    /// The new suffix must start with `.`; a multi-part suffix such as
    /// `.tar.gz` is appended whole.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSuffix`] if `suffix` lacks its leading dot
    /// or its body is empty or contains `/` or NUL, and
    /// [`Error::InvalidName`] if this path is the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitpath::{GitPath, GitoxideBackend};
    ///
    /// let dir = tempfile::tempdir()?;
    /// gitpath::testutil::make_repo(dir.path(), "
    /// - tree:
    ///     archive.tar.gz: contents
    /// ");
    /// let root = GitPath::open(GitoxideBackend::open(dir.path())?, "HEAD")?;
    ///
    /// let archive = root.join("archive.tar.gz");
    /// assert_eq!(archive.with_suffix(".bz2")?.name(), "archive.tar.bz2");
    /// assert!(archive.with_suffix("txt").is_err());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn with_suffix(&self, suffix: &str) -> Result<Self> {
        let Some(body) = suffix.strip_prefix('.') else {
            return Err(Error::InvalidSuffix {
                suffix: suffix.to_string(),
                reason: "suffixes must start with '.'".to_string(),
            });
        };
        if !is_valid_name(body) {
            return Err(Error::InvalidSuffix {
                suffix: suffix.to_string(),
                reason: "suffix bodies must be non-empty and free of '/' and NUL".to_string(),
            });
        }
        self.with_name(&format!("{}{suffix}", self.stem()))
    }

    /// Test this path against a glob pattern.
    ///
    /// A relative pattern matches from the right against the trailing
    /// components; an absolute pattern must account for every component.
    /// Matching is case-sensitive, shell-style, segment by segment; it
    /// never consults the backend.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the pattern is empty or a
    /// segment's glob syntax is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitpath::{GitPath, GitoxideBackend};
    ///
    /// let dir = tempfile::tempdir()?;
    /// gitpath::testutil::make_repo(dir.path(), "
    /// - tree:
    ///     src:
    ///         lib.rs: contents
    /// ");
    /// let root = GitPath::open(GitoxideBackend::open(dir.path())?, "HEAD")?;
    ///
    /// let lib = root.join("src/lib.rs");
    /// assert!(lib.matches("*.rs")?);
    /// assert!(lib.matches("src/*.rs")?);
    /// assert!(lib.matches("/src/lib.rs")?);
    /// assert!(!lib.matches("/lib.rs")?);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn matches(&self, pattern: &str) -> Result<bool> {
        let (absolute, segments) = split_segments(pattern);
        if segments.is_empty() {
            return Err(Error::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "empty pattern".to_string(),
            });
        }
        let matchers = segments
            .iter()
            .map(|segment| compile_segment(pattern, segment))
            .collect::<Result<Vec<_>>>()?;
        let parts = self.relative_parts();
        if absolute {
            if matchers.len() != parts.len() {
                return Ok(false);
            }
            Ok(matchers
                .iter()
                .zip(parts.iter())
                .all(|(matcher, part)| matcher.is_match(part)))
        } else {
            if matchers.len() > parts.len() {
                return Ok(false);
            }
            Ok(matchers
                .iter()
                .rev()
                .zip(parts.iter().rev())
                .all(|(matcher, part)| matcher.is_match(part)))
        }
    }

    /// Express this path relative to `base`, as a `/`-joined string.
    ///
    /// Yields `"."` when the paths are equal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRelative`] if the two paths are anchored to
    /// different root trees or `base` is not a prefix of this path.
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
    /// let root = GitPath::open(GitoxideBackend::open(dir.path())?, "HEAD")?;
    ///
    /// let file = root.join("dir/file.txt");
    /// assert_eq!(file.relative_to(&root)?, "dir/file.txt");
    /// assert_eq!(root.relative_to(&root)?, ".");
    /// assert!(root.join("other").relative_to(&file).is_err());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn relative_to(&self, base: &Self) -> Result<String> {
        let not_relative = || Error::NotRelative {
            path: self.to_string(),
            base: base.to_string(),
        };
        if self.node.ctx.root_hex != base.node.ctx.root_hex {
            return Err(not_relative());
        }
        let parts = self.relative_parts();
        let base_parts = base.relative_parts();
        if parts.len() < base_parts.len() || parts[..base_parts.len()] != *base_parts {
            return Err(not_relative());
        }
        let rest = &parts[base_parts.len()..];
        if rest.is_empty() {
            Ok(".".to_string())
        } else {
            Ok(rest.join("/"))
        }
    }
}

impl Div<&str> for &GitPath {
    type Output = GitPath;

    fn div(self, rhs: &str) -> GitPath {
        self.join(rhs)
    }
}

impl Div<&str> for GitPath {
    type Output = GitPath;

    fn div(self, rhs: &str) -> GitPath {
        self.join(rhs)
    }
}
