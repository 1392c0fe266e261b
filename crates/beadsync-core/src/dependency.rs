//! Dependency edge validation
//!
//! Each item's `depends_on` list is read as directed edges `item -> dep`.
//! Validation is read-only; inserting an accepted edge is bd's job.

use std::collections::{HashMap, HashSet, VecDeque};

use itertools::Itertools;
use thiserror::Error;

use crate::item::Item;

/// Reason a candidate edge was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DependencyRejection {
    #[error("An issue cannot depend on the same issue")]
    SelfDependency,

    #[error("This dependency already exists")]
    Duplicate,

    #[error("This dependency would create a cycle")]
    Cycle,
}

impl DependencyRejection {
    /// Short machine reason: `self`, `duplicate` or `cycle`.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::SelfDependency => "self",
            Self::Duplicate => "duplicate",
            Self::Cycle => "cycle",
        }
    }
}

/// User-facing message for a rejection.
#[must_use]
pub fn rejection_message(rejection: DependencyRejection) -> String {
    rejection.to_string()
}

/// Whether `from` already depends on `to`.
#[must_use]
pub fn has_dependency_edge(items: &[Item], from: &str, to: &str) -> bool {
    items
        .iter()
        .filter(|item| item.id == from)
        .any(|item| item.depends_on(to))
}

/// Validate adding the edge `from -> to` to the current graph.
pub fn validate_dependency_edge(
    items: &[Item],
    from: &str,
    to: &str,
) -> Result<(), DependencyRejection> {
    if from == to {
        return Err(DependencyRejection::SelfDependency);
    }
    if has_dependency_edge(items, from, to) {
        return Err(DependencyRejection::Duplicate);
    }
    if reaches(&adjacency(items), to, from) {
        return Err(DependencyRejection::Cycle);
    }
    Ok(())
}

/// Outgoing edges per item id. Items listed twice contribute both lists.
fn adjacency(items: &[Item]) -> HashMap<&str, Vec<&str>> {
    items
        .iter()
        .flat_map(|item| {
            item.depends_on
                .iter()
                .map(move |dep| (item.id.as_str(), dep.as_str()))
        })
        .into_group_map()
}

/// Breadth-first search over the whole reachable graph.
fn reaches(graph: &HashMap<&str, Vec<&str>>, start: &str, goal: &str) -> bool {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        if current == goal {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(next) = graph.get(current) {
            queue.extend(next.iter().copied().filter(|n| !visited.contains(n)));
        }
    }

    false
}
