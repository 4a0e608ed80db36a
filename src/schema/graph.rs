use std::collections::HashMap;

use tracing::warn;

use super::types::{RelationDeclaration, TableSchema};
use crate::error::{Error, Result};

/// Adjacency view over the declared relations.
///
/// Every declaration is stored twice, once per direction, so a relation
/// declared on `A -> B` can be walked from either end. Neighbors keep the
/// order in which their relations were registered.
#[derive(Debug, Default)]
pub struct RelationGraph {
    edges: HashMap<&'static str, Vec<RelationDeclaration>>,
}

impl RelationGraph {
    /// Build the graph for `tables` from `relations`, failing on a relation
    /// whose endpoint is not one of `tables`.
    pub fn build(tables: &[TableSchema], relations: &[RelationDeclaration]) -> Result<Self> {
        let mut edges: HashMap<&'static str, Vec<RelationDeclaration>> = tables
            .iter()
            .map(|t| (t.name, Vec::new()))
            .collect();

        for decl in relations {
            for endpoint in [decl.from_table, decl.to_table] {
                if !edges.contains_key(endpoint) {
                    return Err(Error::UnknownTable(endpoint.to_string()));
                }
            }
        }

        let mut graph = Self { edges };
        for decl in relations {
            graph.insert(*decl);
            graph.insert(decl.reversed());
        }
        Ok(graph)
    }

    fn insert(&mut self, decl: RelationDeclaration) {
        let neighbors = self.edges.entry(decl.from_table).or_default();
        match neighbors.iter_mut().find(|e| e.to_table == decl.to_table) {
            Some(existing) => {
                if *existing != decl {
                    warn!(
                        from = decl.from_table,
                        to = decl.to_table,
                        "relation declared twice, keeping the last declaration"
                    );
                }
                *existing = decl;
            }
            None => neighbors.push(decl),
        }
    }

    /// Relations leaving `table`, one per neighbor, in registration order.
    /// Tables without relations (or unknown to the graph) have none.
    pub fn edges_from(&self, table: &str) -> &[RelationDeclaration] {
        self.edges.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The relation from `from` to `to`, if the two tables are adjacent
    pub fn relation(&self, from: &str, to: &str) -> Option<&RelationDeclaration> {
        self.edges_from(from).iter().find(|e| e.to_table == to)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.edges.contains_key(table)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
