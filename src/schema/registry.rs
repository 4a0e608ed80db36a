use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error};

use super::graph::RelationGraph;
use super::tables::ALL_TABLES;
use super::types::{RelationDeclaration, TableSchema};
use crate::error::{Error, Result};
use crate::handle::{TableWrapper, WrapperFactory};

/// Collects table schemas, relations and handle wrappers during startup.
///
/// Call [`SchemaRegistry::finish`] once everything is registered to get an
/// immutable [`Catalog`].
#[derive(Default)]
pub struct SchemaRegistry {
    tables: Vec<TableSchema>,
    index: HashMap<&'static str, usize>,
    relations: Vec<RelationDeclaration>,
    wrappers: HashMap<&'static str, Arc<dyn WrapperFactory>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table together with the relations it declares
    pub fn register(&mut self, schema: TableSchema) -> Result<()> {
        if self.index.contains_key(schema.name) {
            return Err(Error::DuplicateTable(schema.name.to_string()));
        }
        self.index.insert(schema.name, self.tables.len());
        self.relations.extend(schema.declarations());
        self.wrappers
            .insert(schema.name, Arc::new(TableWrapper::new(&schema)));
        self.tables.push(schema);
        Ok(())
    }

    /// Add a relation that is not part of any table declaration. Endpoints
    /// are checked when the graph is built.
    pub fn register_relation(&mut self, decl: RelationDeclaration) {
        self.relations.push(decl);
    }

    /// Replace the default handle wrapper of a registered table
    pub fn register_wrapper<F>(&mut self, table: &str, factory: F) -> Result<()>
    where
        F: WrapperFactory + 'static,
    {
        let name = self.lookup(table)?.name;
        self.wrappers.insert(name, Arc::new(factory));
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&TableSchema> {
        self.index
            .get(name)
            .map(|&idx| &self.tables[idx])
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    /// Build the relation graph and freeze the registry
    pub fn finish(self) -> Result<Catalog> {
        let graph = RelationGraph::build(&self.tables, &self.relations)?;
        debug!(
            tables = self.tables.len(),
            relations = self.relations.len(),
            "schema catalog built"
        );
        Ok(Catalog {
            tables: self.tables,
            index: self.index,
            relations: self.relations,
            graph,
            wrappers: self.wrappers,
        })
    }
}

/// Read-only schema state shared by every query.
///
/// Safe to share across threads (e.g. behind an `Arc`) once built.
pub struct Catalog {
    tables: Vec<TableSchema>,
    index: HashMap<&'static str, usize>,
    relations: Vec<RelationDeclaration>,
    graph: RelationGraph,
    wrappers: HashMap<&'static str, Arc<dyn WrapperFactory>>,
}

impl Catalog {
    /// Catalog of all built-in pack tables
    pub fn builtin() -> Result<Self> {
        let mut registry = SchemaRegistry::new();
        for table in ALL_TABLES {
            registry.register(**table)?;
        }
        registry.finish()
    }

    pub fn lookup(&self, name: &str) -> Result<&TableSchema> {
        self.index
            .get(name)
            .map(|&idx| &self.tables[idx])
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tables in registration order
    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    /// All relations in registration order
    pub fn relations(&self) -> &[RelationDeclaration] {
        &self.relations
    }

    pub fn graph(&self) -> &RelationGraph {
        &self.graph
    }

    /// The handle wrapper for a result column named after a table
    pub fn wrapper(&self, table: &str) -> Result<Arc<dyn WrapperFactory>> {
        match self.wrappers.get(table) {
            Some(factory) => Ok(Arc::clone(factory)),
            None => {
                error!(table, "no wrapper registered for result column");
                Err(Error::UnknownTable(table.to_string()))
            }
        }
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("tables", &self.tables.len())
            .field("relations", &self.relations.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::Handle;
    use crate::schema::tables::{ENTITY, ENTITY_FILE};
    use crate::schema::types::{Column, ColumnType, Relation};
    use rusqlite::Connection;

    #[test]
    fn test_duplicate_table_error() {
        let mut registry = SchemaRegistry::new();
        registry.register(ENTITY_FILE).unwrap();
        let err = registry.register(ENTITY_FILE).unwrap_err();
        assert!(matches!(err, Error::DuplicateTable(name) if name == "EntityFile"));
    }

    #[test]
    fn test_lookup_unknown_table() {
        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.lookup("Entity"),
            Err(Error::UnknownTable(_))
        ));
    }

    #[test]
    fn test_finish_fails_on_unregistered_endpoint() {
        let mut registry = SchemaRegistry::new();
        // Entity relates to EntityFile and ClientEntity, neither registered
        registry.register(ENTITY).unwrap();
        assert!(matches!(registry.finish(), Err(Error::UnknownTable(_))));
    }

    #[test]
    fn test_register_relation_adds_edges() {
        static A: TableSchema = TableSchema {
            name: "A",
            columns: &[Column::new("tag", ColumnType::Text)],
            relations: &[],
        };
        static B: TableSchema = TableSchema {
            name: "B",
            columns: &[Column::new("tag", ColumnType::Text)],
            relations: &[],
        };
        let mut registry = SchemaRegistry::new();
        registry.register(A).unwrap();
        registry.register(B).unwrap();
        registry.register_relation(RelationDeclaration {
            from_table: "A",
            from_column: "tag",
            to_table: "B",
            to_column: "tag",
            unique: false,
        });
        let catalog = registry.finish().unwrap();
        assert!(catalog.graph().relation("B", "A").is_some());
    }

    #[derive(Debug)]
    struct Marker(i64);

    impl Handle for Marker {
        fn table(&self) -> &'static str {
            "Marker"
        }
        fn pk(&self) -> i64 {
            self.0
        }
        fn connection(&self) -> &Connection {
            unreachable!()
        }
        fn columns(&self) -> &'static [Column] {
            &[]
        }
    }

    struct MarkerWrapper;

    impl WrapperFactory for MarkerWrapper {
        fn construct<'c>(&self, _conn: &'c Connection, pk: i64) -> Box<dyn Handle + 'c> {
            Box::new(Marker(pk))
        }
    }

    #[test]
    fn test_register_wrapper_overrides_default() {
        static SOLO: TableSchema = TableSchema {
            name: "Solo",
            columns: &[],
            relations: &[Relation::shared("x", "Solo", "x")],
        };
        let mut registry = SchemaRegistry::new();
        registry.register(SOLO).unwrap();
        assert!(registry.register_wrapper("Nope", MarkerWrapper).is_err());
        registry.register_wrapper("Solo", MarkerWrapper).unwrap();
        let catalog = registry.finish().unwrap();

        let conn = Connection::open_in_memory().unwrap();
        let handle = catalog.wrapper("Solo").unwrap().construct(&conn, 7);
        assert_eq!(handle.table(), "Marker");
        assert_eq!(handle.pk(), 7);
        assert!(matches!(catalog.wrapper("Nope"), Err(Error::UnknownTable(_))));
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.tables().len(), ALL_TABLES.len());
        assert!(catalog.contains("ClientEntityGeometryField"));
        assert!(catalog.graph().relation("Entity", "ClientEntity").is_some());
        assert!(!catalog.graph().relation("Entity", "ClientEntity").unwrap().unique);
    }
}
