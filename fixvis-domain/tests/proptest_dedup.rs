//! Property-based tests for the fix worklist and the diagnostic matcher.
//!
//! These tests verify that:
//! - Repeated inserts of the same pair leave exactly one record
//! - Each record keeps the position of its first insertion
//! - Any well-formed diagnostic yields the pair it names

use fixvis_domain::{FixWorklist, parse_visibility_issue};
use fixvis_types::FixRecord;
use proptest::prelude::*;

fn arb_label() -> impl Strategy<Value = String> {
    (
        prop::string::string_regex(r"[a-z][a-z0-9_]{0,6}(/[a-z][a-z0-9_]{0,6}){0,2}").unwrap(),
        prop::string::string_regex(r"[a-z][a-z0-9_-]{0,8}").unwrap(),
    )
        .prop_map(|(pkg, name)| format!("//{pkg}:{name}"))
}

fn arb_records() -> impl Strategy<Value = Vec<FixRecord>> {
    prop::collection::vec(
        (arb_label(), arb_label()).prop_map(|(to_fix, from)| FixRecord::new(to_fix, from)),
        0..8,
    )
}

proptest! {
    /// Inserting a sequence with repeats keeps first occurrences in order.
    #[test]
    fn dedup_keeps_first_seen_order(distinct in arb_records(), picks in prop::collection::vec(0usize..64, 0..40)) {
        let mut list = FixWorklist::new();
        let mut expected: Vec<FixRecord> = Vec::new();

        let stream: Vec<FixRecord> = if distinct.is_empty() {
            Vec::new()
        } else {
            picks.iter().map(|i| distinct[i % distinct.len()].clone()).collect()
        };

        for record in &stream {
            let fresh = !expected.contains(record);
            prop_assert_eq!(list.insert(record.to_fix.clone(), record.from.clone()), fresh);
            if fresh {
                expected.push(record.clone());
            }
        }

        let actual: Vec<FixRecord> = list.iter().cloned().collect();
        prop_assert_eq!(actual, expected);
    }

    /// Any pair rendered in Bazel's wording is extracted verbatim.
    #[test]
    fn matcher_extracts_rendered_pair(to_fix in arb_label(), from in arb_label()) {
        let description = format!(
            "ERROR: /ws/BUILD:3:11: in go_library rule {to_fix}: target '{from}' is not visible from target '{to_fix}'. Check the visibility declaration of the former target if you think the dependency is legitimate"
        );
        let record = parse_visibility_issue(&description);
        prop_assert_eq!(record, Some(FixRecord::new(to_fix, from)));
    }
}
