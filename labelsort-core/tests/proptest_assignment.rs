//! Property-based tests for target-to-page assignment
//!
//! Identifiers are drawn from a small alphabet (including the empty one) so
//! duplicates and misses show up on both sides.

use labelsort::{assign, EmptyIdentifierPolicy, PageRecord, TargetEntry};
use proptest::prelude::*;
use std::collections::HashSet;

fn identifier() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("A".to_string()),
        Just("B".to_string()),
        Just("C".to_string()),
        Just("111111111111111111".to_string()),
    ]
}

fn empty_policy() -> impl Strategy<Value = EmptyIdentifierPolicy> {
    prop_oneof![
        Just(EmptyIdentifierPolicy::NeverMatch),
        Just(EmptyIdentifierPolicy::Legacy),
    ]
}

/// Page order and unmatched targets from a plain first-fit scan: each
/// target, in sheet order, takes the first unclaimed page with its identifier.
fn first_fit(
    targets: &[TargetEntry],
    pages: &[PageRecord],
    policy: EmptyIdentifierPolicy,
) -> (Vec<usize>, Vec<TargetEntry>) {
    let mut ordered: Vec<&TargetEntry> = targets.iter().collect();
    ordered.sort_by_key(|t| t.sequence_position);

    let mut claimed = vec![false; pages.len()];
    let mut order = Vec::new();
    let mut unmatched = Vec::new();
    for target in ordered {
        let empty_blocked =
            target.identifier.is_empty() && policy == EmptyIdentifierPolicy::NeverMatch;
        let hit = (0..pages.len()).find(|&i| {
            !empty_blocked && !claimed[i] && pages[i].normalized_identifier == target.identifier
        });
        match hit {
            Some(i) => {
                claimed[i] = true;
                order.push(pages[i].page_index);
            }
            None => unmatched.push(target.clone()),
        }
    }
    (order, unmatched)
}

prop_compose! {
    fn pages_strategy()(ids in prop::collection::vec(identifier(), 0..12)) -> Vec<PageRecord> {
        ids.into_iter()
            .enumerate()
            .map(|(i, id)| PageRecord::new(i, id.clone(), id))
            .collect()
    }
}

prop_compose! {
    fn targets_strategy()(ids in prop::collection::vec(identifier(), 0..12)) -> Vec<TargetEntry> {
        ids.into_iter()
            .enumerate()
            .map(|(i, id)| TargetEntry {
                identifier: id,
                destination_key: format!("K{i}"),
                sequence_position: i,
            })
            .collect()
    }
}

proptest! {
    #[test]
    fn every_target_is_placed_or_reported(
        targets in targets_strategy(),
        mut pages in pages_strategy(),
        policy in empty_policy()
    ) {
        let result = assign(&targets, &mut pages, policy);
        prop_assert_eq!(result.ordered_pages.len() + result.unmatched.len(), targets.len());
    }

    #[test]
    fn no_page_is_used_twice(
        targets in targets_strategy(),
        mut pages in pages_strategy(),
        policy in empty_policy()
    ) {
        let result = assign(&targets, &mut pages, policy);
        let order = result.page_order();
        let unique: HashSet<usize> = order.iter().copied().collect();
        prop_assert_eq!(unique.len(), order.len());

        for index in &order {
            prop_assert!(pages[*index].consumed);
        }
        let consumed = pages.iter().filter(|p| p.consumed).count();
        prop_assert_eq!(consumed, order.len());
    }

    #[test]
    fn placed_pages_carry_their_target_identifier(
        targets in targets_strategy(),
        mut pages in pages_strategy(),
        policy in empty_policy()
    ) {
        let result = assign(&targets, &mut pages, policy);

        let placed: Vec<&TargetEntry> = targets
            .iter()
            .filter(|t| !result.unmatched.contains(t))
            .collect();
        prop_assert_eq!(placed.len(), result.ordered_pages.len());
        for (target, page) in placed.iter().zip(&result.ordered_pages) {
            prop_assert_eq!(&target.identifier, &page.normalized_identifier);
        }
    }

    #[test]
    fn empty_identifiers_never_match_by_default(
        targets in targets_strategy(),
        mut pages in pages_strategy()
    ) {
        let result = assign(&targets, &mut pages, EmptyIdentifierPolicy::NeverMatch);
        prop_assert!(result.ordered_pages.iter().all(|p| !p.normalized_identifier.is_empty()));
        for target in targets.iter().filter(|t| t.identifier.is_empty()) {
            prop_assert!(result.unmatched.contains(target));
        }
    }

    #[test]
    fn assignment_is_deterministic(
        targets in targets_strategy(),
        pages in pages_strategy(),
        policy in empty_policy()
    ) {
        let first = assign(&targets, &mut pages.clone(), policy);
        let second = assign(&targets, &mut pages.clone(), policy);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn repeated_identifiers_take_pages_in_page_order(
        targets in targets_strategy(),
        mut pages in pages_strategy(),
        policy in empty_policy()
    ) {
        let result = assign(&targets, &mut pages, policy);
        let mut seen: Vec<(&str, usize)> = Vec::new();
        for page in &result.ordered_pages {
            let id = page.normalized_identifier.as_str();
            if let Some((_, last)) = seen.iter().rev().find(|(other, _)| *other == id) {
                prop_assert!(page.page_index > *last);
            }
            seen.push((id, page.page_index));
        }
    }

    #[test]
    fn matches_first_fit_scan(
        targets in targets_strategy(),
        mut pages in pages_strategy(),
        policy in empty_policy()
    ) {
        let (expected_order, expected_unmatched) = first_fit(&targets, &pages, policy);

        // Input order must not matter, only sequence_position
        let reversed: Vec<TargetEntry> = targets.iter().rev().cloned().collect();
        let result = assign(&reversed, &mut pages, policy);

        prop_assert_eq!(result.page_order(), expected_order);
        prop_assert_eq!(result.unmatched, expected_unmatched);
    }
}
