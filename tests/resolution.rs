//! Integration tests for symlink and dot-segment resolution.
//!
//! This suite verifies that:
//! - Plain paths, link chains, and dotted link targets all canonicalize
//!   to link-free paths inside the same snapshot
//! - Strict resolution fails on missing objects while lenient resolution
//!   keeps the missing remainder joinable
//! - Loops are reported as errors without poisoning unrelated paths
//! - Each revision resolves against its own tree

mod common;

use common::{reopen, snapshot};
use gitpath::{Error, ResolveMode};

const LINK_FARM: &str = "
- tree:
    README.md: top level notes
    src:
        main.rs: fn main() {}
        util:
            io.rs: io helpers
    direct: [link, README.md]
    into-dir: [link, src]
    deep: [link, src/util/io.rs]
    dotted: [link, ./src/../src/main.rs]
    rooted: [link, /src/main.rs]
    above: [link, ../../README.md]
    chain: [link, direct]
    broken: [link, missing.txt]
    spiral: [link, spiral]
    ping: [link, pong]
    pong: [link, ping]
";

// =============================================================================
// Canonicalization
// =============================================================================

#[test]
fn test_resolving_plain_paths_is_identity() {
    let (_dir, root) = snapshot(LINK_FARM);

    for mode in [ResolveMode::Strict, ResolveMode::Lenient] {
        assert_eq!(root.resolve(mode).unwrap(), root);
        let file = root.join("src/main.rs");
        assert_eq!(file.resolve(mode).unwrap(), file);
    }
}

#[test]
fn test_resolve_follows_link_chains() {
    let (_dir, root) = snapshot(LINK_FARM);

    let readme = root.join("README.md");
    assert_eq!(
        root.join("direct").resolve(ResolveMode::Strict).unwrap(),
        readme
    );
    // Two hops: chain -> direct -> README.md
    assert_eq!(
        root.join("chain").resolve(ResolveMode::Strict).unwrap(),
        readme
    );
}

#[test]
fn test_resolve_traverses_directory_links_midway() {
    let (_dir, root) = snapshot(LINK_FARM);

    assert_eq!(
        root.join("into-dir/main.rs")
            .resolve(ResolveMode::Strict)
            .unwrap(),
        root.join("src/main.rs")
    );
    assert_eq!(
        root.join("into-dir/util/io.rs")
            .resolve(ResolveMode::Strict)
            .unwrap(),
        root.join("src/util/io.rs")
    );
    assert_eq!(
        root.join("deep").resolve(ResolveMode::Strict).unwrap(),
        root.join("src/util/io.rs")
    );
}

#[test]
fn test_resolve_interprets_dots_inside_targets() {
    let (_dir, root) = snapshot(LINK_FARM);

    assert_eq!(
        root.join("dotted").resolve(ResolveMode::Strict).unwrap(),
        root.join("src/main.rs")
    );
}

#[test]
fn test_resolve_handles_rooted_targets() {
    let (_dir, root) = snapshot(LINK_FARM);

    assert_eq!(
        root.join("rooted").resolve(ResolveMode::Strict).unwrap(),
        root.join("src/main.rs")
    );
}

#[test]
fn test_targets_above_the_root_clamp_at_the_root() {
    // The root is its own parent, so a target that climbs too far simply
    // lands back at the top of the snapshot.
    let (_dir, root) = snapshot(LINK_FARM);

    assert_eq!(
        root.join("above").resolve(ResolveMode::Strict).unwrap(),
        root.join("README.md")
    );
}

#[test]
fn test_resolution_is_idempotent() {
    let (_dir, root) = snapshot(LINK_FARM);

    for name in ["direct", "chain", "dotted", "into-dir"] {
        let once = root.join(name).resolve(ResolveMode::Strict).unwrap();
        assert_eq!(once.resolve(ResolveMode::Strict).unwrap(), once);
    }
}

#[test]
fn test_resolution_stays_inside_the_snapshot() {
    let (_dir, root) = snapshot(LINK_FARM);

    let resolved = root.join("deep").resolve(ResolveMode::Strict).unwrap();
    assert_eq!(resolved.root(), root.root());
    assert_eq!(resolved.drive(), root.drive());
}

// =============================================================================
// Strictness
// =============================================================================

#[test]
fn test_strict_resolution_requires_existence() {
    let (_dir, root) = snapshot(LINK_FARM);

    let err = root.join("broken").resolve(ResolveMode::Strict).unwrap_err();
    assert!(err.is_not_found());

    let err = root
        .join("nope/deeper")
        .resolve(ResolveMode::Strict)
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn test_lenient_resolution_keeps_the_missing_tail() {
    let (_dir, root) = snapshot(LINK_FARM);

    assert_eq!(
        root.join("broken").resolve(ResolveMode::Lenient).unwrap(),
        root.join("missing.txt")
    );
    // The resolved part of the path is still canonicalized before the
    // missing remainder is appended.
    assert_eq!(
        root.join("broken/extra")
            .resolve(ResolveMode::Lenient)
            .unwrap(),
        root.join("missing.txt/extra")
    );
    let missing = root.join("nope/deeper");
    assert_eq!(missing.resolve(ResolveMode::Lenient).unwrap(), missing);
}

// =============================================================================
// Loops
// =============================================================================

#[test]
fn test_link_loops_error_in_both_modes() {
    let (_dir, root) = snapshot(LINK_FARM);

    for name in ["spiral", "ping", "pong"] {
        for mode in [ResolveMode::Strict, ResolveMode::Lenient] {
            let err = root.join(name).resolve(mode).unwrap_err();
            assert!(err.is_symlink_loop(), "{name} should report a loop");
        }
    }
}

#[test]
fn test_loop_errors_do_not_poison_other_paths() {
    let (_dir, root) = snapshot(LINK_FARM);

    assert!(root.join("ping").resolve(ResolveMode::Strict).is_err());
    // Unrelated paths, and even the same path again, behave normally
    assert_eq!(
        root.join("direct").resolve(ResolveMode::Strict).unwrap(),
        root.join("README.md")
    );
    assert!(root
        .join("ping")
        .resolve(ResolveMode::Strict)
        .unwrap_err()
        .is_symlink_loop());
    assert!(root.join("src/main.rs").exists().unwrap());
}

// =============================================================================
// Revisions
// =============================================================================

const TWO_REVISIONS: &str = "
- tree:
    file.txt: old contents
    gone.txt: short lived
- tree:
    file.txt: new contents
    added.txt: fresh
";

#[test]
fn test_each_revision_resolves_its_own_tree() {
    let (dir, head) = snapshot(TWO_REVISIONS);
    let earlier = reopen(dir.path(), "HEAD^");

    assert_ne!(head.root(), earlier.root());

    assert_eq!(head.join("file.txt").read_text().unwrap(), "new contents");
    assert_eq!(
        earlier.join("file.txt").read_text().unwrap(),
        "old contents"
    );

    assert!(head.join("added.txt").exists().unwrap());
    assert!(!head.join("gone.txt").exists().unwrap());
    assert!(earlier.join("gone.txt").exists().unwrap());
    assert!(!earlier.join("added.txt").exists().unwrap());
}

#[test]
fn test_paths_from_different_revisions_never_compare_equal() {
    let (dir, head) = snapshot(TWO_REVISIONS);
    let earlier = reopen(dir.path(), "HEAD^");

    assert_eq!(head.drive(), earlier.drive());
    assert_ne!(head, earlier);
    assert_ne!(head.join("file.txt"), earlier.join("file.txt"));
}
