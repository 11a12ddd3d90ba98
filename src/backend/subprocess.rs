//! Repository access through the `git` binary.
//!
//! Every primitive turns into a `git` invocation with `GIT_DIR` pinned to
//! the repository and `HOME` pointed away from user configuration. Tree
//! listings are parsed once per tree object and cached, so component walks
//! and repeated metadata lookups do not spawn again.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::rc::Rc;
use std::str;

use crate::error::{Error, Result};
use crate::path::GitPath;

use super::{Backend, FileMode, ObjectKind};

/// One parsed `ls-tree` record.
#[derive(Debug, Clone)]
struct TreeEntry {
    mode: FileMode,
    kind: ObjectKind,
    hex: String,
}

/// A decoded tree: entry names in listing order plus per-name records.
#[derive(Default)]
struct Listing {
    names: Vec<String>,
    entries: HashMap<String, TreeEntry>,
}

/// Read objects by spawning the system `git` binary.
///
/// The location must be a bare repository or a `.git` directory; it is not
/// validated at open time, so a location without a repository surfaces as a
/// backend error on first use.
///
/// # Examples
///
/// ```no_run
/// use gitpath::{GitPath, SubprocessBackend};
///
/// let backend = SubprocessBackend::open("/path/to/repo.git")?;
/// let root = GitPath::open(backend, "HEAD")?;
/// for child in root.iterdir()? {
///     println!("{}", child.name());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct SubprocessBackend {
    location: PathBuf,
    listings: RefCell<HashMap<String, Rc<Listing>>>,
}

impl SubprocessBackend {
    /// Open the repository at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] if the path cannot be canonicalized.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let location = fs::canonicalize(path).map_err(|err| Error::Backend {
            message: format!("cannot open repository at {}: {err}", path.display()),
        })?;
        Ok(Self {
            location,
            listings: RefCell::new(HashMap::new()),
        })
    }

    /// Run git and collect stdout, treating a spawn failure or non-zero
    /// exit as fatal.
    fn git_output(&self, args: &[&str]) -> Result<Vec<u8>> {
        log::debug!("running git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .env("GIT_DIR", &self.location)
            .env("HOME", "/dev/null")
            .output()?;
        if !output.status.success() {
            return Err(Error::Backend {
                message: format!(
                    "git {} failed: {}",
                    args.join(" "),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(output.stdout)
    }

    /// Run git for a single line of text output.
    fn git_line(&self, args: &[&str]) -> Result<String> {
        let output = self.git_output(args)?;
        let text = str::from_utf8(&output).map_err(|_| Error::Backend {
            message: format!("git {} produced non-UTF-8 output", args.join(" ")),
        })?;
        Ok(text.trim().to_string())
    }

    /// The listing of the tree `tree_hex`, from cache or a fresh `ls-tree`.
    fn listing(&self, tree_hex: &str) -> Result<Rc<Listing>> {
        if let Some(listing) = self.listings.borrow().get(tree_hex) {
            return Ok(listing.clone());
        }
        let listing = Rc::new(self.load_listing(tree_hex)?);
        self.listings
            .borrow_mut()
            .insert(tree_hex.to_string(), listing.clone());
        Ok(listing)
    }

    fn load_listing(&self, tree_hex: &str) -> Result<Listing> {
        let spec = format!("{tree_hex}^{{tree}}");
        let raw = self.git_output(&["ls-tree", "-z", &spec])?;
        let mut listing = Listing::default();
        for record in raw.split(|byte| *byte == 0) {
            if record.is_empty() {
                continue;
            }
            let (name, entry) = parse_tree_entry(record)?;
            listing.names.push(name.clone());
            listing.entries.insert(name, entry);
        }
        Ok(listing)
    }

    /// Walk the cached listings from the root to the entry `path` names,
    /// or `None` when a component is missing or routes through a non-tree.
    /// The root itself has no entry.
    fn entry(&self, path: &GitPath) -> Result<Option<TreeEntry>> {
        let parts = path.relative_parts();
        let mut tree_hex = path.root().to_string();
        let mut found = None;
        for (index, part) in parts.iter().enumerate() {
            let listing = self.listing(&tree_hex)?;
            let entry = match listing.entries.get(part) {
                Some(entry) => entry.clone(),
                None => return Ok(None),
            };
            if index + 1 < parts.len() {
                if !entry.kind.is_tree() {
                    return Ok(None);
                }
                tree_hex.clone_from(&entry.hex);
            }
            found = Some(entry);
        }
        Ok(found)
    }

    /// Like [`Self::entry`] for paths already known to exist.
    fn existing_entry(&self, path: &GitPath) -> Result<TreeEntry> {
        self.entry(path)?.ok_or_else(|| Error::Backend {
            message: format!("no tree entry at {path}"),
        })
    }
}

impl Backend for SubprocessBackend {
    fn location(&self) -> &Path {
        &self.location
    }

    fn resolve_revision(&self, rev: &str) -> Result<String> {
        let resolved = self.git_line(&["rev-parse", rev])?;
        let spec = format!("{resolved}^{{tree}}");
        let tree = self.git_line(&["rev-parse", &spec])?;
        if !is_hex_id(&tree) {
            return Err(Error::Backend {
                message: format!("revision {rev:?} did not resolve to a tree id: {tree:?}"),
            });
        }
        Ok(tree)
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
        Ok(self.existing_entry(path)?.kind)
    }

    fn mode(&self, path: &GitPath) -> Result<FileMode> {
        if path.relative_parts().is_empty() {
            return Ok(FileMode::TREE);
        }
        Ok(self.existing_entry(path)?.mode)
    }

    fn list_dir(&self, path: &GitPath) -> Result<Vec<String>> {
        let tree_hex = if path.relative_parts().is_empty() {
            path.root().to_string()
        } else {
            self.existing_entry(path)?.hex
        };
        Ok(self.listing(&tree_hex)?.names.clone())
    }

    fn read(&self, path: &GitPath) -> Result<Vec<u8>> {
        let entry = self.existing_entry(path)?;
        self.git_output(&["cat-file", "-p", &entry.hex])
    }

    fn link_target(&self, path: &GitPath) -> Result<Option<String>> {
        if path.relative_parts().is_empty() {
            return Ok(None);
        }
        let entry = self.existing_entry(path)?;
        if !entry.mode.is_link() {
            return Ok(None);
        }
        let bytes = self.git_output(&["cat-file", "-p", &entry.hex])?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn object_id(&self, path: &GitPath) -> Result<String> {
        if path.relative_parts().is_empty() {
            return Ok(path.root().to_string());
        }
        Ok(self.existing_entry(path)?.hex)
    }
}

/// Parse one NUL-terminated `ls-tree -z` record, `mode SP type SP hash TAB
/// name`. The name is decoded lossily; everything before the tab is ASCII.
fn parse_tree_entry(record: &[u8]) -> Result<(String, TreeEntry)> {
    let tab = record
        .iter()
        .position(|byte| *byte == b'\t')
        .ok_or_else(|| malformed(record))?;
    let header = str::from_utf8(&record[..tab]).map_err(|_| malformed(record))?;
    let mut fields = header.split(' ');
    match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(mode), Some(kind), Some(hex), None) => {
            let name = String::from_utf8_lossy(&record[tab + 1..]).into_owned();
            Ok((
                name,
                TreeEntry {
                    mode: FileMode::from_octal(mode)?,
                    kind: kind.parse()?,
                    hex: hex.to_string(),
                },
            ))
        }
        _ => Err(malformed(record)),
    }
}

fn malformed(record: &[u8]) -> Error {
    Error::Backend {
        message: format!(
            "malformed tree listing record {:?}",
            String::from_utf8_lossy(record)
        ),
    }
}

fn is_hex_id(s: &str) -> bool {
    s.len() == 40 && s.bytes().all(|byte| byte.is_ascii_hexdigit())
}
