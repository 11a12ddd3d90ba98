//! Common fixtures for the integration tests.
//!
//! Repositories are built in temporary directories from the YAML
//! descriptions understood by [`gitpath::testutil::make_repo`] and opened
//! through either backend. Fixture helpers panic on setup failure so that
//! broken fixtures surface as loud test errors rather than as misleading
//! assertion output.

use std::path::Path;

use tempfile::TempDir;

use gitpath::testutil::make_repo;
use gitpath::{GitPath, GitoxideBackend, SubprocessBackend};

/// A layout with a little of everything: nested directories, links to a
/// file and to a directory, and an executable.
#[allow(dead_code)]
pub const SAMPLE_TREE: &str = "
- tree:
    README.md: project notes
    src:
        main.rs: fn main() {}
        lib.rs: pub mod util;
        util:
            mod.rs: pub fn answer() {}
    docs:
        guide.md: how to use it
        api.md: what it exposes
    link-to-src: [link, src]
    link-to-readme: [link, README.md]
    tool: [executable, exit 0]
";

/// Builds a repository from `description` and opens its `HEAD` tree
/// through the gitoxide backend.
///
/// The returned [`TempDir`] owns the repository; keep it alive for as
/// long as the path is used.
#[allow(dead_code)]
pub fn snapshot(description: &str) -> (TempDir, GitPath) {
    let dir = tempfile::tempdir().expect("temp dir should be creatable");
    make_repo(dir.path(), description);
    let root = reopen(dir.path(), "HEAD");
    (dir, root)
}

/// Opens `revision` in an already-built repository through gitoxide.
#[allow(dead_code)]
pub fn reopen(dir: &Path, revision: &str) -> GitPath {
    let backend = GitoxideBackend::open(dir).expect("repository should open");
    GitPath::open(backend, revision).expect("revision should resolve")
}

/// Opens `revision` in an already-built repository through the git CLI.
#[allow(dead_code)]
pub fn reopen_subprocess(dir: &Path, revision: &str) -> GitPath {
    let backend = SubprocessBackend::open(dir).expect("repository should open");
    GitPath::open(backend, revision).expect("revision should resolve")
}

/// Renders `paths` relative to `base`, for compact assertions.
#[allow(dead_code)]
pub fn relative(paths: &[GitPath], base: &GitPath) -> Vec<String> {
    paths
        .iter()
        .map(|path| path.relative_to(base).expect("path should sit under base"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_tree_builds_and_opens() {
        let (_dir, root) = snapshot(SAMPLE_TREE);
        assert!(root.join("README.md").exists().unwrap());
        assert!(root.join("src/util/mod.rs").exists().unwrap());
    }
}
