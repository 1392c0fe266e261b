//! Property tests for the pure building blocks
//!
//! # Invariants tested:
//! 1. Identifier ordering is a total order with numeric runs compared by value
//! 2. Status normalization ignores case and surrounding whitespace
//! 3. A transition to the current status is always refused
//! 4. On an acyclic graph, an edge is refused as a cycle exactly when its
//!    target already reaches its source
//! 5. Version parsing recovers any embedded `major.minor.patch`
//! 6. Argument validation rejects line breaks; scrubbing removes paths
//!
//! Run with: cargo test --package beadsync-core --test validator_properties

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::uninlined_format_args,
    clippy::needless_range_loop
)]

use std::{cmp::Ordering, path::PathBuf};

use beadsync_core::{
    cli::{build_safe_bd_args, is_cli_version_at_least, parse_cli_version, sanitize_message},
    dependency::{validate_dependency_edge, DependencyRejection},
    status::{compare_status, normalize_status, status_rank, validate_transition, TransitionError},
    store::compare_ids,
    IssueStatus, Item,
};
use proptest::prelude::*;
use strum::IntoEnumIterator;

fn fast_config() -> ProptestConfig {
    ProptestConfig {
        cases: 64,
        max_shrink_iters: 256,
        ..ProptestConfig::default()
    }
}

fn any_status() -> impl Strategy<Value = IssueStatus> {
    prop::sample::select(IssueStatus::iter().collect::<Vec<_>>())
}

/// Random DAG over `bd-0..bd-n`: an item may only depend on lower indices.
fn dag() -> impl Strategy<Value = Vec<Vec<bool>>> {
    (2usize..8).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(any::<bool>(), n), n).prop_map(move |mut m| {
            for i in 0..n {
                for j in i..n {
                    m[i][j] = false;
                }
            }
            m
        })
    })
}

fn items_from(matrix: &[Vec<bool>]) -> Vec<Item> {
    matrix
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let deps = row
                .iter()
                .enumerate()
                .filter(|(_, edge)| **edge)
                .map(|(j, _)| format!("bd-{j}"));
            Item::new(format!("bd-{i}"), "node").with_dependencies(deps)
        })
        .collect()
}

fn reaches(matrix: &[Vec<bool>], from: usize, to: usize) -> bool {
    let n = matrix.len();
    let mut closure = matrix.to_vec();
    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                closure[i][j] = closure[i][j] || (closure[i][k] && closure[k][j]);
            }
        }
    }
    from == to || closure[from][to]
}

proptest! {
    #![proptest_config(fast_config())]

    // ── ordering ────────────────────────────────────────────────────────────

    #[test]
    fn prop_compare_ids_is_antisymmetric(a in "[a-zA-Z0-9-]{0,12}", b in "[a-zA-Z0-9-]{0,12}") {
        prop_assert_eq!(compare_ids(&a, &b), compare_ids(&b, &a).reverse());
        prop_assert_eq!(compare_ids(&a, &b) == Ordering::Equal, a == b);
    }

    #[test]
    fn prop_numeric_suffixes_compare_by_value(prefix in "[a-z]{1,5}-", n in 0u64..100_000, m in 0u64..100_000) {
        let left = format!("{prefix}{n}");
        let right = format!("{prefix}{m}");
        prop_assert_eq!(compare_ids(&left, &right), n.cmp(&m).then_with(|| left.cmp(&right)));
    }

    #[test]
    fn prop_sorting_is_transitive(mut ids in prop::collection::vec("[a-c]{1,2}-[0-9]{1,3}", 1..20)) {
        ids.sort_by(|a, b| compare_ids(a, b));
        for window in ids.windows(2) {
            prop_assert_ne!(compare_ids(&window[0], &window[1]), Ordering::Greater);
        }
        for i in 0..ids.len() {
            for j in i..ids.len() {
                prop_assert_ne!(compare_ids(&ids[i], &ids[j]), Ordering::Greater);
            }
        }
    }

    // ── status policy ───────────────────────────────────────────────────────

    #[test]
    fn prop_normalize_ignores_case_and_padding(status in any_status(), upper in any::<bool>(), pad in " {0,3}") {
        let text = if upper { status.as_ref().to_uppercase() } else { status.as_ref().to_string() };
        let padded = format!("{pad}{text}{pad}");
        prop_assert_eq!(normalize_status(Some(padded.as_str())), Some(status));
    }

    #[test]
    fn prop_same_status_transition_refused(status in any_status()) {
        let result = validate_transition(Some(status.as_ref()), status.as_ref());
        prop_assert_eq!(result, Err(TransitionError::AlreadyInStatus(status)));
    }

    #[test]
    fn prop_distinct_status_transition_allowed(from in any_status(), to in any_status()) {
        prop_assume!(from != to);
        prop_assert_eq!(validate_transition(Some(from.as_ref()), to.as_ref()), Ok(to));
    }

    #[test]
    fn prop_unknown_status_ranks_last(junk in "[x-z]{1,8}", status in any_status()) {
        prop_assert_eq!(status_rank(Some(junk.as_str())), u32::MAX);
        prop_assert_eq!(compare_status(Some(status.as_ref()), Some(junk.as_str())), Ordering::Less);
    }

    // ── dependency graph ────────────────────────────────────────────────────

    #[test]
    fn prop_cycle_detected_iff_target_reaches_source(
        matrix in dag(),
        a_seed in any::<prop::sample::Index>(),
        b_seed in any::<prop::sample::Index>(),
    ) {
        let n = matrix.len();
        let (a, b) = (a_seed.index(n), b_seed.index(n));
        let items = items_from(&matrix);
        let from = format!("bd-{a}");
        let to = format!("bd-{b}");

        let expected = if a == b {
            Err(DependencyRejection::SelfDependency)
        } else if matrix[a][b] {
            Err(DependencyRejection::Duplicate)
        } else if reaches(&matrix, b, a) {
            Err(DependencyRejection::Cycle)
        } else {
            Ok(())
        };
        prop_assert_eq!(validate_dependency_edge(&items, &from, &to), expected);
    }

    #[test]
    fn prop_validation_terminates_on_cyclic_input(n in 3usize..10) {
        // Ring bd-0 -> bd-1 -> ... -> bd-0, already cyclic, plus a detached item.
        let mut items: Vec<Item> = (0..n)
            .map(|i| Item::new(format!("bd-{i}"), "ring").with_dependencies([format!("bd-{}", (i + 1) % n)]))
            .collect();
        items.push(Item::new("loose", "detached"));

        prop_assert_eq!(validate_dependency_edge(&items, "loose", "bd-0"), Ok(()));
        prop_assert_eq!(
            validate_dependency_edge(&items, "bd-0", "bd-2"),
            Err(DependencyRejection::Cycle)
        );
    }

    // ── version parsing ─────────────────────────────────────────────────────

    #[test]
    fn prop_embedded_version_is_found(major in 0u32..1000, minor in 0u32..1000, patch in 0u32..1000, tail in "[ a-z()]{0,10}") {
        let raw = format!("bd version {major}.{minor}.{patch}{tail}");
        let version = parse_cli_version(&raw);
        prop_assert_eq!(version.triple(), (major, minor, patch));
        prop_assert!(is_cli_version_at_least(&raw, &raw));
        prop_assert!(is_cli_version_at_least(&raw, "0.0.0"));
    }

    // ── argument and message hygiene ────────────────────────────────────────

    #[test]
    fn prop_line_breaks_always_rejected(head in "[a-z]{0,6}", tail in "[a-z]{0,6}", br in prop::sample::select(vec!["\n", "\r", "\r\n"])) {
        let arg = format!("{head}{br}{tail}");
        prop_assert!(build_safe_bd_args(&["show", arg.as_str()]).is_err());
    }

    #[test]
    fn prop_plain_args_pass_unchanged(args in prop::collection::vec("[a-z0-9_-]{1,10}", 0..6)) {
        prop_assert_eq!(build_safe_bd_args(args.as_slice()).ok(), Some(args.clone()));
    }

    #[test]
    fn prop_scrubbed_message_never_contains_path(dir in "/[a-z]{2,8}/[a-z]{2,8}", before in "[a-z ]{0,10}", after in "[a-z ]{0,10}") {
        let message = format!("{before}{dir}/.beads/beads.db{after}");
        let clean = sanitize_message(&message, &[PathBuf::from(&dir)]);
        prop_assert!(!clean.contains(&dir));
    }
}
