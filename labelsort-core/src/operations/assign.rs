//! Target-to-page assignment
//!
//! Targets are taken in sheet order; each one claims the lowest-numbered
//! page that carries its identifier and has not been claimed yet. There is
//! no backtracking, so a repeated barcode claims repeated pages in page
//! order and any surplus target is reported as unmatched.

use crate::index::PageRecord;
use crate::targets::TargetEntry;
use std::collections::{HashMap, VecDeque};

/// How empty identifiers take part in matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyIdentifierPolicy {
    /// An empty identifier never matches anything
    #[default]
    NeverMatch,
    /// An empty target identifier matches a page with no identifier
    Legacy,
}

/// Outcome of an assignment pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentResult {
    /// Claimed pages in output order
    pub ordered_pages: Vec<PageRecord>,
    /// Targets no page was left for, in target order
    pub unmatched: Vec<TargetEntry>,
}

impl AssignmentResult {
    /// Source page indices in output order
    pub fn page_order(&self) -> Vec<usize> {
        self.ordered_pages.iter().map(|p| p.page_index).collect()
    }

    pub fn matched_count(&self) -> usize {
        self.ordered_pages.len()
    }

    pub fn unmatched_identifiers(&self) -> Vec<&str> {
        self.unmatched.iter().map(|t| t.identifier.as_str()).collect()
    }

    /// True when every target found a page
    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }
}

/// Greedy one-to-one assigner
#[derive(Debug, Clone, Default)]
pub struct Assigner {
    policy: EmptyIdentifierPolicy,
}

impl Assigner {
    pub fn new(policy: EmptyIdentifierPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> EmptyIdentifierPolicy {
        self.policy
    }

    /// Assign `targets` onto `pages`, marking claimed pages consumed.
    ///
    /// Pages already marked consumed are not available.
    pub fn assign(&self, targets: &[TargetEntry], pages: &mut [PageRecord]) -> AssignmentResult {
        // Free pages per identifier, lowest page index first
        let mut slots: Vec<usize> = (0..pages.len()).filter(|&i| !pages[i].consumed).collect();
        slots.sort_by_key(|&i| pages[i].page_index);

        let mut available: HashMap<String, VecDeque<usize>> = HashMap::new();
        for slot in slots {
            let identifier = &pages[slot].normalized_identifier;
            if identifier.is_empty() && self.policy == EmptyIdentifierPolicy::NeverMatch {
                continue;
            }
            available
                .entry(identifier.clone())
                .or_default()
                .push_back(slot);
        }

        let mut ordered: Vec<&TargetEntry> = targets.iter().collect();
        ordered.sort_by_key(|t| t.sequence_position);

        let mut result = AssignmentResult::default();
        for target in ordered {
            let slot = available
                .get_mut(target.identifier.as_str())
                .and_then(VecDeque::pop_front);

            match slot {
                Some(slot) => {
                    pages[slot].consumed = true;
                    result.ordered_pages.push(pages[slot].clone());
                }
                None => {
                    tracing::debug!(
                        "No page left for target #{} ({:?})",
                        target.sequence_position + 1,
                        target.identifier
                    );
                    result.unmatched.push(target.clone());
                }
            }
        }

        result
    }
}

/// Assign with the given empty-identifier policy
pub fn assign(
    targets: &[TargetEntry],
    pages: &mut [PageRecord],
    policy: EmptyIdentifierPolicy,
) -> AssignmentResult {
    Assigner::new(policy).assign(targets, pages)
}

#[cfg(test)]
#[path = "assign_tests.rs"]
mod assign_tests;
