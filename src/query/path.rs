use std::collections::{HashSet, VecDeque};

use tracing::trace;

use crate::schema::{RelationDeclaration, RelationGraph};

/// One `JOIN right ON left.left_column = right.right_column` instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinEdge {
    pub left: &'static str,
    pub left_column: &'static str,
    pub right: &'static str,
    pub right_column: &'static str,
    /// Rendered as `LEFT JOIN`
    pub outer: bool,
}

impl From<&RelationDeclaration> for JoinEdge {
    fn from(rel: &RelationDeclaration) -> Self {
        Self {
            left: rel.from_table,
            left_column: rel.from_column,
            right: rel.to_table,
            right_column: rel.to_column,
            outer: false,
        }
    }
}

/// Breadth-first search for the shortest chain of joins from `start` to
/// `end`.
///
/// Tables in `excluded` are never entered, except `start` itself. Non-unique
/// relations are only followed when `allow_non_unique` is set. Among paths of
/// equal length the first one discovered wins, so the result only depends on
/// the graph and the arguments. Returns `None` when `end` is unreachable.
pub fn find_path(
    graph: &RelationGraph,
    start: &str,
    end: &str,
    allow_non_unique: bool,
    excluded: &HashSet<&str>,
) -> Option<Vec<JoinEdge>> {
    let mut visited: HashSet<&str> = excluded.iter().copied().collect();
    visited.insert(start);

    let mut queue: VecDeque<(&str, Vec<JoinEdge>)> = VecDeque::new();
    queue.push_back((start, Vec::new()));

    while let Some((node, path)) = queue.pop_front() {
        if node == end {
            trace!(start, end, hops = path.len(), "join path found");
            return Some(path);
        }

        for rel in graph.edges_from(node) {
            if !allow_non_unique && !rel.unique {
                continue;
            }
            if !visited.insert(rel.to_table) {
                continue;
            }
            let mut next = path.clone();
            next.push(JoinEdge::from(rel));
            queue.push_back((rel.to_table, next));
        }
    }

    trace!(start, end, "no join path");
    None
}
