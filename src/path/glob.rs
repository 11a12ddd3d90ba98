//! Glob matching over snapshot trees.
//!
//! Patterns are split into segments up front; each segment is either `**`,
//! a literal `..`, or a shell-style matcher compiled through `globset`.
//! Matching walks segment by segment against the literal paths being built
//! (results keep whatever names were traversed), while resolution is used
//! internally to decide whether a base is a directory worth entering. A
//! set of already-visited resolved directories guards each `**` expansion
//! chain against symlinked subtrees that loop back into an ancestor.

use std::collections::HashSet;

use globset::{Glob, GlobMatcher};

use crate::error::{Error, Result};
use crate::path::navigate::split_segments;
use crate::path::types::GitPath;

/// One parsed pattern segment.
enum GlobPart {
    /// `**`: this directory and, recursively, every reachable subdirectory.
    Recurse,
    /// A literal `..`, entered without resolution.
    ParentDir,
    /// A shell-style match against directory entry names.
    Match(GlobMatcher),
}

/// Compile one pattern segment, reporting errors against the whole pattern.
pub(super) fn compile_segment(pattern: &str, segment: &str) -> Result<GlobMatcher> {
    match Glob::new(segment) {
        Ok(glob) => Ok(glob.compile_matcher()),
        Err(err) => Err(Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: err.kind().to_string(),
        }),
    }
}

fn parse_pattern(pattern: &str) -> Result<Vec<GlobPart>> {
    let (absolute, segments) = split_segments(pattern);
    if absolute {
        return Err(Error::Unsupported {
            reason: "non-relative patterns are unsupported".to_string(),
        });
    }
    if segments.is_empty() {
        return Err(Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: "empty pattern".to_string(),
        });
    }
    segments
        .iter()
        .map(|segment| match segment.as_str() {
            "**" => Ok(GlobPart::Recurse),
            ".." => Ok(GlobPart::ParentDir),
            other => Ok(GlobPart::Match(compile_segment(pattern, other)?)),
        })
        .collect()
}

impl GitPath {
    /// Enumerate the paths under this one that match a relative glob
    /// pattern, in depth-first listing order.
    ///
    /// `**` matches this directory and, recursively, every reachable
    /// subdirectory; a literal `..` segment is entered without resolution;
    /// every other segment matches entry names shell-style,
    /// case-sensitively. Branches whose resolution hits a symlink loop are
    /// silently skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] for an empty pattern or malformed
    /// segment syntax, [`Error::Unsupported`] for an absolute pattern, and
    /// [`Error::Backend`] if the store cannot be read.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitpath::{GitPath, GitoxideBackend};
    ///
    /// let dir = tempfile::tempdir()?;
    /// gitpath::testutil::make_repo(dir.path(), "
    /// - tree:
    ///     README.md: docs
    ///     src:
    ///         lib.rs: code
    ///         main.rs: code
    /// ");
    /// let root = GitPath::open(GitoxideBackend::open(dir.path())?, "HEAD")?;
    ///
    /// let names: Vec<String> = root
    ///     .glob("src/*.rs")?
    ///     .into_iter()
    ///     .map(|p| p.name().to_string())
    ///     .collect();
    /// assert_eq!(names, ["lib.rs", "main.rs"]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn glob(&self, pattern: &str) -> Result<Vec<Self>> {
        let parts = parse_pattern(pattern)?;
        let mut results = Vec::new();
        self.walk_glob(&parts, &HashSet::new(), &mut results)?;
        Ok(results)
    }

    /// Enumerate matches of `pattern` at every depth under this path.
    ///
    /// Equivalent to [`GitPath::glob`] with `**/` prepended; `rglob("")`
    /// is legal and lists this directory and every subdirectory.
    ///
    /// # Errors
    ///
    /// Propagates the same errors as [`GitPath::glob`].
    pub fn rglob(&self, pattern: &str) -> Result<Vec<Self>> {
        self.glob(&format!("**/{pattern}"))
    }

    fn walk_glob(
        &self,
        parts: &[GlobPart],
        seen: &HashSet<Self>,
        out: &mut Vec<Self>,
    ) -> Result<()> {
        let Some((first, rest)) = parts.split_first() else {
            out.push(self.clone());
            return Ok(());
        };

        let (exists, resolved) = match self.resolved_pair() {
            Ok(pair) => pair,
            Err(Error::SymlinkLoop { .. }) => return Ok(()),
            Err(err) => return Err(err),
        };
        if !exists || seen.contains(&resolved) || !resolved.is_dir()? {
            return Ok(());
        }

        match first {
            GlobPart::Recurse => {
                self.walk_glob(rest, &HashSet::new(), out)?;
                let mut seen = seen.clone();
                seen.insert(resolved);
                for child in self.iterdir()? {
                    child.walk_glob(parts, &seen, out)?;
                }
            }
            GlobPart::ParentDir => {
                self.child("..").walk_glob(rest, &HashSet::new(), out)?;
            }
            GlobPart::Match(matcher) => {
                for child in self.iterdir()? {
                    if matcher.is_match(child.name()) {
                        child.walk_glob(rest, &HashSet::new(), out)?;
                    }
                }
            }
        }
        Ok(())
    }
}
