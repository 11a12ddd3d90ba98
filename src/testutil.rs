//! Fixture repositories for tests and examples.
//!
//! Snapshots are described in YAML: a list of revisions, each a mapping
//! with a `tree` key describing the root tree. Tree values map entry names
//! to a string (a regular blob), `[link, target]` (a symlink),
//! `[executable, content]` (an executable blob), `[binary, [bytes...]]`
//! (a blob from raw byte values), or a nested mapping (a subtree).
//!
//! ```
//! use gitpath::{GitPath, GitoxideBackend};
//!
//! let dir = tempfile::tempdir()?;
//! gitpath::testutil::make_repo(dir.path(), "
//! - tree:
//!     dir:
//!         file.txt: contents
//!     link: [link, dir/file.txt]
//! ");
//! let root = GitPath::open(GitoxideBackend::open(dir.path())?, "HEAD")?;
//! assert!(root.join("link").is_symlink()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::Path;

use gix::objs::tree::EntryKind;
use serde_yaml::Value;

/// Build a bare repository at `path` from a YAML snapshot description,
/// with one commit per listed revision (chained oldest first).
///
/// Commits carry a fixed signature and timestamp so identical descriptions
/// produce identical object ids wherever they are built.
///
/// # Panics
///
/// Panics if the description is not valid YAML, does not follow the schema
/// above, or if the repository cannot be written. This is test tooling; a
/// malformed fixture is a bug in the test, not a recoverable condition.
pub fn make_repo(path: &Path, description: &str) {
    let parsed: Value =
        serde_yaml::from_str(description).expect("fixture description must be valid YAML");
    let revisions = parsed
        .as_sequence()
        .expect("fixture description must be a list of revisions");
    let repo = gix::init_bare(path).expect("initializing the fixture repository must succeed");
    let mut parents: Vec<gix::ObjectId> = Vec::new();
    for revision in revisions {
        let tree = revision
            .get("tree")
            .and_then(Value::as_mapping)
            .expect("each revision must carry a tree mapping");
        let tree_id = write_tree(&repo, tree);
        let signature = gix::actor::SignatureRef {
            name: "Test".into(),
            email: "test@noreply.invalid".into(),
            time: gix::date::Time::new(0, 0),
        };
        let commit = repo
            .commit_as(
                signature,
                signature,
                "HEAD",
                "Initial commit",
                tree_id,
                parents.clone(),
            )
            .expect("writing the fixture commit must succeed");
        parents = vec![commit.detach()];
    }
}

fn write_tree(repo: &gix::Repository, description: &serde_yaml::Mapping) -> gix::ObjectId {
    let mut entries = Vec::new();
    for (key, value) in description {
        let name = key.as_str().expect("tree entry names must be strings");
        let (oid, kind) = write_entry(repo, name, value);
        entries.push(gix::objs::tree::Entry {
            mode: kind.into(),
            filename: name.into(),
            oid,
        });
    }
    // Tree objects require git's canonical entry order, which Entry's Ord
    // implements (subtrees compare with an implicit trailing slash).
    entries.sort();
    repo.write_object(&gix::objs::Tree { entries })
        .expect("writing a fixture tree object must succeed")
        .detach()
}

fn write_entry(repo: &gix::Repository, name: &str, value: &Value) -> (gix::ObjectId, EntryKind) {
    match value {
        Value::String(content) => (write_blob(repo, content.as_bytes()), EntryKind::Blob),
        Value::Sequence(tagged) => write_tagged_entry(repo, name, tagged),
        Value::Mapping(subtree) => (write_tree(repo, subtree), EntryKind::Tree),
        other => panic!("unsupported tree entry for {name:?}: {other:?}"),
    }
}

fn write_tagged_entry(
    repo: &gix::Repository,
    name: &str,
    tagged: &[Value],
) -> (gix::ObjectId, EntryKind) {
    let tag = tagged
        .first()
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("tagged entry {name:?} must start with a tag string"));
    let payload = tagged
        .get(1)
        .unwrap_or_else(|| panic!("tagged entry {name:?} needs a payload"));
    match tag {
        "link" => {
            let target = payload
                .as_str()
                .unwrap_or_else(|| panic!("link entry {name:?} needs a string target"));
            (write_blob(repo, target.as_bytes()), EntryKind::Link)
        }
        "executable" => {
            let content = payload
                .as_str()
                .unwrap_or_else(|| panic!("executable entry {name:?} needs string content"));
            (write_blob(repo, content.as_bytes()), EntryKind::BlobExecutable)
        }
        "binary" => {
            let bytes = payload
                .as_sequence()
                .unwrap_or_else(|| panic!("binary entry {name:?} needs a byte list"))
                .iter()
                .map(|value| {
                    value
                        .as_u64()
                        .and_then(|wide| u8::try_from(wide).ok())
                        .unwrap_or_else(|| panic!("binary entry {name:?} holds a non-byte value"))
                })
                .collect::<Vec<u8>>();
            (write_blob(repo, &bytes), EntryKind::Blob)
        }
        other => panic!("unknown tree entry tag {other:?} for {name:?}"),
    }
}

fn write_blob(repo: &gix::Repository, bytes: &[u8]) -> gix::ObjectId {
    repo.write_blob(bytes)
        .expect("writing a fixture blob must succeed")
        .detach()
}
