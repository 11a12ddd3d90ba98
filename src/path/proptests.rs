//! Property-based tests for path construction and name arithmetic.
//!
//! Everything here is pure path algebra over a stub backend; no repository
//! is touched.

use proptest::prelude::*;

use super::types::stub_root;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 10000,
        max_shrink_iters: 10000,
        .. ProptestConfig::default()
    })]

    // Joining a segment and taking the parent lands back on the base
    #[test]
    fn join_then_parent_returns_base(
        segments in prop::collection::vec("[a-zA-Z0-9_-]{1,10}", 0..4),
        leaf in "[a-zA-Z0-9_-]{1,10}",
    ) {
        let base = segments.iter().fold(stub_root(), |path, segment| path.join(segment));
        prop_assert_eq!(base.join(&leaf).parent(), base);
    }

    // The component sequence is exactly the joined segments
    #[test]
    fn relative_parts_match_joined_segments(
        segments in prop::collection::vec("[a-zA-Z0-9_-]{1,10}", 0..6),
    ) {
        let path = segments.iter().fold(stub_root(), |path, segment| path.join(segment));
        prop_assert_eq!(path.relative_parts(), segments.as_slice());
    }

    // One slash-joined argument builds the same path as sequential joins
    #[test]
    fn one_join_equals_sequential_joins(
        segments in prop::collection::vec("[a-zA-Z0-9_-]{1,10}", 1..5),
    ) {
        let combined = stub_root().join(&segments.join("/"));
        let sequential = segments.iter().fold(stub_root(), |path, segment| path.join(segment));
        prop_assert_eq!(combined, sequential);
    }

    // An absolute argument discards the base entirely
    #[test]
    fn absolute_join_ignores_base(
        base in prop::collection::vec("[a-zA-Z0-9_-]{1,8}", 0..4),
        tail in "[a-zA-Z0-9_-]{1,8}",
    ) {
        let deep = base.iter().fold(stub_root(), |path, segment| path.join(segment));
        let reset = deep.join(&format!("/{tail}"));
        prop_assert_eq!(reset, stub_root().join(&tail));
    }

    // stem + suffix always reassembles the name
    #[test]
    fn stem_and_suffix_partition_name(
        name in "[a-zA-Z0-9_-]{1,8}(\\.[a-zA-Z0-9_-]{1,4}){0,2}",
    ) {
        let path = stub_root().join(&name);
        let rebuilt = format!("{}{}", path.stem(), path.suffix());
        prop_assert_eq!(rebuilt, name);
    }

    // The first dot-free piece plus all suffixes reassembles the name
    #[test]
    fn suffixes_join_back_onto_first_piece(
        name in "[a-zA-Z0-9_-]{1,8}(\\.[a-zA-Z0-9_-]{1,4}){0,2}",
    ) {
        let path = stub_root().join(&name);
        let first = name.split('.').next().unwrap_or("");
        let rebuilt = format!("{first}{}", path.suffixes().concat());
        prop_assert_eq!(rebuilt, name);
    }

    // with_name swaps the leaf and nothing else
    #[test]
    fn with_name_replaces_only_the_leaf(
        dir in "[a-zA-Z0-9_-]{1,8}",
        old in "[a-zA-Z0-9_-]{1,8}",
        new in "[a-zA-Z0-9_-]{1,8}",
    ) {
        let path = stub_root().join(&dir).join(&old);
        let renamed = path.with_name(&new).unwrap();
        prop_assert_eq!(renamed.name(), new.as_str());
        prop_assert_eq!(renamed.parent(), path.parent());
    }

    // with_suffix produces a name ending in exactly the new suffix
    #[test]
    fn with_suffix_ends_with_new_suffix(
        name in "[a-zA-Z0-9_-]{1,8}(\\.[a-zA-Z0-9_-]{1,4}){0,1}",
        body in "[a-zA-Z0-9_-]{1,4}",
    ) {
        let path = stub_root().join(&name);
        let suffix = format!(".{body}");
        let changed = path.with_suffix(&suffix).unwrap();
        prop_assert_eq!(changed.name(), format!("{}{suffix}", path.stem()));
        prop_assert_eq!(changed.suffix(), suffix.as_str());
    }

    // A path matches its own components, absolutely and from the right
    #[test]
    fn path_matches_its_own_literal_pattern(
        segments in prop::collection::vec("[a-zA-Z0-9_-]{1,8}", 1..4),
    ) {
        let path = segments.iter().fold(stub_root(), |path, segment| path.join(segment));
        let absolute = format!("/{}", segments.join("/"));
        prop_assert!(path.matches(&absolute).unwrap());
        prop_assert!(path.matches(segments.last().unwrap()).unwrap());
    }

    // relative_to output joins back onto the base to rebuild the path
    #[test]
    fn relative_to_round_trips_through_join(
        base in prop::collection::vec("[a-zA-Z0-9_-]{1,8}", 0..3),
        rest in prop::collection::vec("[a-zA-Z0-9_-]{1,8}", 1..3),
    ) {
        let base_path = base.iter().fold(stub_root(), |path, segment| path.join(segment));
        let full = rest.iter().fold(base_path.clone(), |path, segment| path.join(segment));
        let relative = full.relative_to(&base_path).unwrap();
        prop_assert_eq!(base_path.join(&relative), full);
    }

    // Path ordering is the ordering of the component sequences
    #[test]
    fn ordering_matches_part_ordering(
        a in prop::collection::vec("[a-z]{1,6}", 0..4),
        b in prop::collection::vec("[a-z]{1,6}", 0..4),
    ) {
        let left = a.iter().fold(stub_root(), |path, segment| path.join(segment));
        let right = b.iter().fold(stub_root(), |path, segment| path.join(segment));
        prop_assert_eq!(left.cmp(&right), a.cmp(&b));
    }

    // Equal paths hash equal regardless of how they were built
    #[test]
    fn equal_paths_hash_equal(
        segments in prop::collection::vec("[a-zA-Z0-9_-]{1,8}", 0..4),
    ) {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let a = segments.iter().fold(stub_root(), |path, segment| path.join(segment));
        let b = stub_root().join(&segments.join("/"));
        let mut hasher_a = DefaultHasher::new();
        let mut hasher_b = DefaultHasher::new();
        a.hash(&mut hasher_a);
        b.hash(&mut hasher_b);
        prop_assert_eq!(hasher_a.finish(), hasher_b.finish());
    }
}
