use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use tracing::{debug, warn};

use super::path::{find_path, JoinEdge};
use crate::error::{Error, Result};
use crate::schema::Catalog;

/// Pack containers are skipped when looking for join paths; going through
/// them links records that merely share a pack.
pub const DEFAULT_BLACKLIST: &[&str] = &["BehaviorPack", "ResourcePack"];

/// A table requested in a query, optionally joined with `LEFT JOIN`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
    pub outer: bool,
}

impl TableRef {
    pub fn inner(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outer: false,
        }
    }

    /// Joined with `LEFT JOIN`, yielding an empty handle when nothing matches
    pub fn left(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outer: true,
        }
    }
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        Self::inner(name)
    }
}

/// Query tuning shared by all tables of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Tables never walked through when connecting requested tables
    pub blacklist: Vec<String>,
    /// Follow content-based relations, not only structural ones
    pub allow_non_unique: bool,
    pub distinct: bool,
    /// Raw predicates joined with `AND`
    #[serde(rename = "where")]
    pub filter: Vec<String>,
    pub group_by: Vec<String>,
    /// Raw predicates joined with `AND`
    pub having: Vec<String>,
    pub order_by: Vec<String>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            blacklist: DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect(),
            allow_non_unique: true,
            distinct: true,
            filter: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
        }
    }
}

/// The root table, the tables to connect to it and the options to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub root: String,
    pub tables: Vec<TableRef>,
    pub options: QueryOptions,
}

impl QueryRequest {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            tables: Vec::new(),
            options: QueryOptions::default(),
        }
    }

    pub fn join(mut self, table: impl Into<String>) -> Self {
        self.tables.push(TableRef::inner(table));
        self
    }

    pub fn left_join(mut self, table: impl Into<String>) -> Self {
        self.tables.push(TableRef::left(table));
        self
    }

    pub fn options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn filter(mut self, predicate: impl Into<String>) -> Self {
        self.options.filter.push(predicate.into());
        self
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.options.order_by.push(column.into());
        self
    }
}

/// A rendered query selecting one primary key column per requested table,
/// each column named after its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    root: &'static str,
    tables: Vec<&'static str>,
    joins: Vec<JoinEdge>,
    sql: String,
}

impl QueryPlan {
    pub fn root(&self) -> &'static str {
        self.root
    }

    /// Requested tables in result column order, root first
    pub fn tables(&self) -> &[&'static str] {
        &self.tables
    }

    pub fn joins(&self) -> &[JoinEdge] {
        &self.joins
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl fmt::Display for QueryPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

impl Catalog {
    /// Connect the requested tables through the relation graph and render
    /// the query.
    ///
    /// Each table is connected to the one before it. When a table is
    /// requested as outer, only the last join of its path becomes a
    /// `LEFT JOIN`; the bridge tables before it stay inner joins.
    pub fn build_query(&self, request: &QueryRequest) -> Result<QueryPlan> {
        let root = self.lookup(&request.root)?.name;
        let requested = request
            .tables
            .iter()
            .map(|t| Ok((self.lookup(&t.name)?.name, t.outer)))
            .collect::<Result<Vec<_>>>()?;

        let options = &request.options;
        let excluded: HashSet<&str> = options.blacklist.iter().map(String::as_str).collect();

        let mut edges = Vec::new();
        let mut prev = root;
        for &(table, outer) in &requested {
            let mut path = find_path(
                self.graph(),
                prev,
                table,
                options.allow_non_unique,
                &excluded,
            )
            .ok_or_else(|| Error::NoConnection {
                from: prev.to_string(),
                to: table.to_string(),
                excluded: options.blacklist.clone(),
            })?;
            if outer {
                if let Some(last) = path.last_mut() {
                    last.outer = true;
                }
            }
            edges.extend(path);
            prev = table;
        }

        let joins = reduce_joins(root, edges);
        let mut tables = vec![root];
        tables.extend(requested.iter().map(|&(t, _)| t));
        let sql = render(&tables, &joins, options);

        debug!(root, joins = joins.len(), "query rendered");
        Ok(QueryPlan {
            root,
            tables,
            joins,
            sql,
        })
    }
}

/// Keep only the first edge introducing each table. Separate legs can
/// rediscover the same bridge table; joining it twice would be invalid SQL.
fn reduce_joins(root: &'static str, edges: Vec<JoinEdge>) -> Vec<JoinEdge> {
    let mut known: HashSet<&str> = HashSet::from([root]);
    let mut reduced = Vec::with_capacity(edges.len());
    for edge in edges {
        if !known.insert(edge.right) {
            if edge.outer {
                warn!(table = edge.right, "outer join dropped, table already joined");
            }
            continue;
        }
        reduced.push(edge);
    }
    reduced
}

fn render(tables: &[&str], joins: &[JoinEdge], options: &QueryOptions) -> String {
    let selection = tables
        .iter()
        .map(|t| format!("{}_pk AS {}", t, t))
        .collect::<Vec<_>>()
        .join(",\n\t");
    let select = if options.distinct {
        "SELECT DISTINCT"
    } else {
        "SELECT"
    };

    let mut sql = format!("{}\n\t{}\nFROM {}", select, selection, tables[0]);
    for join in joins {
        let keyword = if join.outer { "LEFT JOIN" } else { "JOIN" };
        sql.push_str(&format!(
            "\n{} {}\n\tON {}.{} = {}.{}",
            keyword, join.right, join.left, join.left_column, join.right, join.right_column
        ));
    }

    let clauses = [
        ("WHERE", &options.filter, "\n\tAND "),
        ("GROUP BY", &options.group_by, "\n\t, "),
        ("HAVING", &options.having, "\n\tAND "),
        ("ORDER BY", &options.order_by, "\n\t, "),
    ];
    for (keyword, parts, separator) in clauses {
        if !parts.is_empty() {
            sql.push_str(&format!("\n{}\n\t{}", keyword, parts.join(separator)));
        }
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ColumnType, Relation, SchemaRegistry, TableSchema};

    fn builtin() -> Catalog {
        Catalog::builtin().unwrap()
    }

    #[test]
    fn test_entity_to_left_geometry() {
        let request = QueryRequest::new("Entity").left_join("Geometry");
        let plan = builtin().build_query(&request).unwrap();

        let expected = "SELECT DISTINCT\n\
            \tEntity_pk AS Entity,\n\
            \tGeometry_pk AS Geometry\n\
            FROM Entity\n\
            JOIN ClientEntity\n\
            \tON Entity.identifier = ClientEntity.identifier\n\
            JOIN ClientEntityGeometryField\n\
            \tON ClientEntity.ClientEntity_pk = ClientEntityGeometryField.ClientEntity_fk\n\
            LEFT JOIN Geometry\n\
            \tON ClientEntityGeometryField.identifier = Geometry.identifier";
        assert_eq!(plan.sql(), expected);
        assert_eq!(plan.tables(), &["Entity", "Geometry"]);
        let outer: Vec<_> = plan.joins().iter().map(|j| j.outer).collect();
        assert_eq!(outer, vec![false, false, true]);
    }

    #[test]
    fn test_clauses_rendered_in_order() {
        let options = QueryOptions {
            distinct: false,
            filter: vec!["Entity.identifier = 'minecraft:pig'".into(), "Geometry_pk > 0".into()],
            group_by: vec!["Entity".into(), "Geometry".into()],
            having: vec!["count(*) > 1".into()],
            order_by: vec!["Entity".into()],
            ..QueryOptions::default()
        };
        let request = QueryRequest::new("Entity").join("Geometry").options(options);
        let sql = builtin().build_query(&request).unwrap().sql().to_string();

        assert!(sql.starts_with("SELECT\n\tEntity_pk AS Entity"));
        assert!(sql.ends_with(
            "\nWHERE\n\tEntity.identifier = 'minecraft:pig'\n\tAND Geometry_pk > 0\
             \nGROUP BY\n\tEntity\n\t, Geometry\
             \nHAVING\n\tcount(*) > 1\
             \nORDER BY\n\tEntity"
        ));
        assert!(!sql.contains("LEFT JOIN"));
    }

    #[test]
    fn test_root_only_query() {
        let plan = builtin().build_query(&QueryRequest::new("RpItem")).unwrap();
        assert_eq!(plan.sql(), "SELECT DISTINCT\n\tRpItem_pk AS RpItem\nFROM RpItem");
        assert!(plan.joins().is_empty());
    }

    #[test]
    fn test_unknown_table_before_rendering() {
        let request = QueryRequest::new("Entity").join("Geometry").join("Nope");
        let err = builtin().build_query(&request).unwrap_err();
        assert!(matches!(err, Error::UnknownTable(name) if name == "Nope"));

        let err = builtin().build_query(&QueryRequest::new("Nope")).unwrap_err();
        assert!(matches!(err, Error::UnknownTable(_)));
    }

    #[test]
    fn test_blacklisted_bridge_is_no_connection() {
        // Sound files only reach entities through the resource pack
        let request = QueryRequest::new("SoundFile").join("ClientEntity");
        let err = builtin().build_query(&request).unwrap_err();
        match err {
            Error::NoConnection { from, to, excluded } => {
                assert_eq!(from, "SoundFile");
                assert_eq!(to, "ClientEntity");
                assert_eq!(excluded, vec!["BehaviorPack", "ResourcePack"]);
            }
            other => panic!("unexpected error: {other}"),
        }

        let options = QueryOptions {
            blacklist: Vec::new(),
            ..QueryOptions::default()
        };
        let plan = builtin()
            .build_query(&QueryRequest::new("SoundFile").join("ClientEntity").options(options))
            .unwrap();
        let bridge: Vec<_> = plan.joins().iter().map(|j| j.right).collect();
        assert_eq!(bridge, vec!["ResourcePack", "ClientEntityFile", "ClientEntity"]);
    }

    #[test]
    fn test_unique_only_rejects_content_links() {
        let options = QueryOptions {
            allow_non_unique: false,
            ..QueryOptions::default()
        };
        let request = QueryRequest::new("Entity").join("ClientEntity").options(options);
        assert!(matches!(
            builtin().build_query(&request),
            Err(Error::NoConnection { .. })
        ));

        let options = QueryOptions {
            allow_non_unique: false,
            ..QueryOptions::default()
        };
        let request = QueryRequest::new("Entity").join("EntityFile").options(options);
        assert!(builtin().build_query(&request).is_ok());
    }

    #[test]
    fn test_blacklisted_table_is_unreachable() {
        let request = QueryRequest::new("Entity").join("BehaviorPack");
        assert!(matches!(
            builtin().build_query(&request),
            Err(Error::NoConnection { .. })
        ));
    }

    // Chain: Hub <- Mid <- Leaf, plus Side attached to Leaf
    static HUB: TableSchema = TableSchema {
        name: "Hub",
        columns: &[],
        relations: &[],
    };
    static MID: TableSchema = TableSchema {
        name: "Mid",
        columns: &[Column::required("Hub_fk", ColumnType::Integer)],
        relations: &[Relation::unique("Hub_fk", "Hub", "Hub_pk")],
    };
    static LEAF: TableSchema = TableSchema {
        name: "Leaf",
        columns: &[Column::required("Mid_fk", ColumnType::Integer)],
        relations: &[Relation::unique("Mid_fk", "Mid", "Mid_pk")],
    };
    static SIDE: TableSchema = TableSchema {
        name: "Side",
        columns: &[Column::required("Leaf_fk", ColumnType::Integer)],
        relations: &[Relation::unique("Leaf_fk", "Leaf", "Leaf_pk")],
    };

    fn chain() -> Catalog {
        let mut registry = SchemaRegistry::new();
        for table in [HUB, MID, LEAF, SIDE] {
            registry.register(table).unwrap();
        }
        registry.finish().unwrap()
    }

    #[test]
    fn test_only_last_hop_is_outer() {
        let request = QueryRequest::new("Hub").left_join("Side");
        let plan = chain().build_query(&request).unwrap();
        let joins: Vec<_> = plan.joins().iter().map(|j| (j.right, j.outer)).collect();
        assert_eq!(
            joins,
            vec![("Mid", false), ("Leaf", false), ("Side", true)]
        );
        assert_eq!(plan.sql().matches("LEFT JOIN").count(), 1);
    }

    #[test]
    fn test_bridge_table_joined_once() {
        // Hub -> Leaf passes through Mid, then Leaf -> Mid comes back to it
        let request = QueryRequest::new("Hub").join("Leaf").join("Mid");
        let plan = chain().build_query(&request).unwrap();
        let joined: Vec<_> = plan.joins().iter().map(|j| j.right).collect();
        assert_eq!(joined, vec!["Mid", "Leaf"]);
        assert_eq!(plan.sql().matches("JOIN Mid\n").count(), 1);
        assert_eq!(plan.tables(), &["Hub", "Leaf", "Mid"]);
    }

    #[test]
    fn test_root_is_never_rejoined() {
        let request = QueryRequest::new("Mid").join("Leaf").join("Hub").join("Mid");
        let plan = chain().build_query(&request).unwrap();
        let joined: Vec<_> = plan.joins().iter().map(|j| j.right).collect();
        assert_eq!(joined, vec!["Leaf", "Hub"]);
    }

    #[test]
    fn test_options_from_json_defaults() {
        let options: QueryOptions =
            serde_json::from_str(r#"{"where": ["Entity_pk = 1"], "distinct": false}"#).unwrap();
        assert_eq!(options.filter, vec!["Entity_pk = 1"]);
        assert!(!options.distinct);
        assert!(options.allow_non_unique);
        assert_eq!(options.blacklist, vec!["BehaviorPack", "ResourcePack"]);
    }
}
