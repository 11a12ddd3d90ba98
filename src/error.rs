//! Error types for the gitpath library.
//!
//! This module provides the error hierarchy for all operations in the
//! gitpath library, using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Result type alias for operations that may fail with a gitpath error.
///
/// # Examples
///
/// ```
/// use gitpath::{Error, Result};
///
/// fn example_operation() -> Result<u64> {
///     Ok(42)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the gitpath library.
///
/// This enum encompasses all possible error conditions that can occur
/// while navigating, resolving, or reading a git tree snapshot.
#[derive(Debug, Error)]
pub enum Error {
    /// No object exists at the given path in the snapshot.
    #[error("object not found: {path}")]
    NotFound {
        /// The path that was requested.
        path: String,
    },

    /// A directory operation was attempted on a path that is not a tree.
    #[error("not a tree: {path}")]
    NotATree {
        /// The path whose object is not a tree.
        path: String,
    },

    /// A file-content operation was attempted on a path that is not a blob.
    #[error("not a blob: {path}")]
    NotABlob {
        /// The path whose object is not a blob.
        path: String,
    },

    /// A mutating operation was attempted on a snapshot path.
    #[error("cannot modify {path}: the snapshot is read-only")]
    ReadOnly {
        /// The path that was attempted to be modified.
        path: String,
    },

    /// A cycle of symlink indirections was detected during resolution.
    #[error("symlink loop from {path}")]
    SymlinkLoop {
        /// The path whose resolution entered the cycle.
        path: String,
    },

    /// An invalid name component was provided.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// The reason the name is invalid.
        reason: String,
    },

    /// An invalid suffix was provided.
    #[error("invalid suffix {suffix:?}: {reason}")]
    InvalidSuffix {
        /// The rejected suffix.
        suffix: String,
        /// The reason the suffix is invalid.
        reason: String,
    },

    /// A glob or match pattern could not be parsed.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// The reason the pattern is invalid.
        reason: String,
    },

    /// A path could not be expressed relative to the given base.
    #[error("{path} does not start with {base}")]
    NotRelative {
        /// The path that was being relativized.
        path: String,
        /// The base it does not start with.
        base: String,
    },

    /// A blob's contents were not valid UTF-8.
    #[error("invalid UTF-8 in blob at {path}")]
    InvalidUtf8 {
        /// The path of the undecodable blob.
        path: String,
    },

    /// The requested operation has no meaning for snapshot paths.
    #[error("unsupported operation: {reason}")]
    Unsupported {
        /// Why the operation is unsupported.
        reason: String,
    },

    /// The backend failed. Backend failures are fatal and undistinguished.
    #[error("backend error: {message}")]
    Backend {
        /// A description of the failure.
        message: String,
    },
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Backend {
            message: err.to_string(),
        }
    }
}

impl Error {
    /// Check if error indicates an object does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitpath::Error;
    ///
    /// let err = Error::NotFound { path: "repo:abc123/missing".to_string() };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if error came from attempting to modify the read-only snapshot.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitpath::Error;
    ///
    /// let err = Error::ReadOnly { path: "repo:abc123/file".to_string() };
    /// assert!(err.is_permission_denied());
    /// ```
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::ReadOnly { .. })
    }

    /// Check if error indicates a malformed argument (name, suffix,
    /// pattern, base path, or undecodable text).
    ///
    /// # Examples
    ///
    /// ```
    /// use gitpath::Error;
    ///
    /// let err = Error::InvalidName {
    ///     name: "a/b".to_string(),
    ///     reason: "names may not contain '/'".to_string(),
    /// };
    /// assert!(err.is_invalid_argument());
    /// ```
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidName { .. }
                | Self::InvalidSuffix { .. }
                | Self::InvalidPattern { .. }
                | Self::NotRelative { .. }
                | Self::InvalidUtf8 { .. }
        )
    }

    /// Check if error indicates a symlink loop.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitpath::Error;
    ///
    /// let err = Error::SymlinkLoop { path: "repo:abc123/spiral".to_string() };
    /// assert!(err.is_symlink_loop());
    /// ```
    #[must_use]
    pub fn is_symlink_loop(&self) -> bool {
        matches!(self, Self::SymlinkLoop { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = Error::NotFound {
            path: "repo:abc/missing".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("object not found"));
        assert!(display.contains("repo:abc/missing"));
    }

    #[test]
    fn test_not_a_tree_error() {
        let err = Error::NotATree {
            path: "repo:abc/file.txt".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("not a tree"));
        assert!(display.contains("file.txt"));
    }

    #[test]
    fn test_not_a_blob_error() {
        let err = Error::NotABlob {
            path: "repo:abc/dir".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("not a blob"));
        assert!(display.contains("dir"));
    }

    #[test]
    fn test_read_only_error() {
        let err = Error::ReadOnly {
            path: "repo:abc/file".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("read-only"));
        assert!(display.contains("cannot modify"));
    }

    #[test]
    fn test_symlink_loop_error() {
        let err = Error::SymlinkLoop {
            path: "repo:abc/spiral".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("symlink loop"));
        assert!(display.contains("spiral"));
    }

    #[test]
    fn test_invalid_name_error() {
        let err = Error::InvalidName {
            name: "a/b".to_string(),
            reason: "names may not contain '/'".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("invalid name"));
        assert!(display.contains("a/b"));
        assert!(display.contains("may not contain"));
    }

    #[test]
    fn test_invalid_pattern_error() {
        let err = Error::InvalidPattern {
            pattern: "[".to_string(),
            reason: "unclosed character class".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("invalid pattern"));
        assert!(display.contains("unclosed"));
    }

    #[test]
    fn test_not_relative_error() {
        let err = Error::NotRelative {
            path: "repo:abc/a/b".to_string(),
            base: "repo:abc/c".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("does not start with"));
    }

    #[test]
    fn test_unsupported_error() {
        let err = Error::Unsupported {
            reason: "git objects are not owned by a user".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("unsupported operation"));
        assert!(display.contains("not owned"));
    }

    #[test]
    fn test_backend_error() {
        let err = Error::Backend {
            message: "git exited with status 128".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("backend error"));
        assert!(display.contains("128"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "spawn failed");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Backend { .. }));
        let display = format!("{err}");
        assert!(display.contains("backend error"));
    }

    #[test]
    fn test_predicates_are_disjoint() {
        let not_found = Error::NotFound {
            path: "p".to_string(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_permission_denied());
        assert!(!not_found.is_invalid_argument());
        assert!(!not_found.is_symlink_loop());
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<u64> {
            Err(Error::Unsupported {
                reason: "test".to_string(),
            })
        }

        assert!(returns_result().is_err());
    }
}
