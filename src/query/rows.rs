use rusqlite::{Connection, Rows, Statement};
use std::sync::Arc;

use super::plan::QueryPlan;
use crate::error::Result;
use crate::handle::{Handle, WrapperFactory};
use crate::schema::Catalog;

/// One result row: a handle per requested table, `None` where an outer join
/// found nothing.
pub type HandleRow<'c> = Vec<Option<Box<dyn Handle + 'c>>>;

impl QueryPlan {
    /// Execute the plan and collect the primary keys of every row
    pub fn run(&self, conn: &Connection) -> Result<Vec<Vec<Option<i64>>>> {
        let mut stmt = conn.prepare(self.sql())?;
        collect_keys(&mut stmt)
    }

    /// Prepare the plan and resolve a handle wrapper for each result column
    pub fn prepare<'c>(&self, catalog: &Catalog, conn: &'c Connection) -> Result<PreparedQuery<'c>> {
        PreparedQuery::new(catalog, conn, self.sql())
    }
}

/// A statement whose result columns are named after registered tables.
///
/// Hand-written SQL works too, as long as every column is a primary key
/// aliased to its table name.
pub struct PreparedQuery<'c> {
    conn: &'c Connection,
    stmt: Statement<'c>,
    wrappers: Vec<Arc<dyn WrapperFactory>>,
}

impl<'c> PreparedQuery<'c> {
    pub fn new(catalog: &Catalog, conn: &'c Connection, sql: &str) -> Result<Self> {
        let stmt = conn.prepare(sql)?;
        let wrappers = stmt
            .column_names()
            .into_iter()
            .map(|name| catalog.wrapper(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            conn,
            stmt,
            wrappers,
        })
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.stmt.column_names()
    }

    /// Raw primary keys, one vector per row
    pub fn keys(&mut self) -> Result<Vec<Vec<Option<i64>>>> {
        collect_keys(&mut self.stmt)
    }

    /// Lazily map every row to handles. The iterator makes a single pass
    /// over the results.
    pub fn handles(&mut self) -> Result<HandleRows<'_, 'c>> {
        let rows = self.stmt.query([])?;
        Ok(HandleRows {
            conn: self.conn,
            rows,
            wrappers: &self.wrappers,
        })
    }
}

pub struct HandleRows<'s, 'c> {
    conn: &'c Connection,
    rows: Rows<'s>,
    wrappers: &'s [Arc<dyn WrapperFactory>],
}

impl<'c> Iterator for HandleRows<'_, 'c> {
    type Item = Result<HandleRow<'c>>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.rows.next() {
            Ok(Some(row)) => row,
            Ok(None) => return None,
            Err(e) => return Some(Err(e.into())),
        };

        let mut handles = Vec::with_capacity(self.wrappers.len());
        for (idx, wrapper) in self.wrappers.iter().enumerate() {
            let pk: Option<i64> = match row.get(idx) {
                Ok(pk) => pk,
                Err(e) => return Some(Err(e.into())),
            };
            handles.push(pk.map(|pk| wrapper.construct(self.conn, pk)));
        }
        Some(Ok(handles))
    }
}

fn collect_keys(stmt: &mut Statement<'_>) -> Result<Vec<Vec<Option<i64>>>> {
    let width = stmt.column_count();
    let rows = stmt.query_map([], |row| {
        (0..width)
            .map(|idx| row.get::<_, Option<i64>>(idx))
            .collect::<rusqlite::Result<Vec<_>>>()
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::query::QueryRequest;

    fn store() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE Hub (Hub_pk INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT);
             CREATE TABLE Spoke (
                Spoke_pk INTEGER PRIMARY KEY AUTOINCREMENT,
                Hub_fk INTEGER NOT NULL
             );
             INSERT INTO Hub (name) VALUES ('a'), ('b');
             INSERT INTO Spoke (Hub_fk) VALUES (1);",
        )
        .unwrap();
        conn
    }

    fn catalog() -> Catalog {
        use crate::schema::{Column, ColumnType, Relation, SchemaRegistry, TableSchema};
        static HUB: TableSchema = TableSchema {
            name: "Hub",
            columns: &[Column::new("name", ColumnType::Text)],
            relations: &[],
        };
        static SPOKE: TableSchema = TableSchema {
            name: "Spoke",
            columns: &[Column::required("Hub_fk", ColumnType::Integer)],
            relations: &[Relation::unique("Hub_fk", "Hub", "Hub_pk")],
        };
        let mut registry = SchemaRegistry::new();
        registry.register(HUB).unwrap();
        registry.register(SPOKE).unwrap();
        registry.finish().unwrap()
    }

    #[test]
    fn test_outer_join_maps_to_none() {
        let conn = store();
        let catalog = catalog();
        let plan = catalog
            .build_query(&QueryRequest::new("Hub").left_join("Spoke").order_by("Hub"))
            .unwrap();

        assert_eq!(plan.run(&conn).unwrap(), vec![vec![Some(1), Some(1)], vec![Some(2), None]]);

        let mut prepared = plan.prepare(&catalog, &conn).unwrap();
        assert_eq!(prepared.column_names(), vec!["Hub", "Spoke"]);
        let rows: Vec<_> = prepared.handles().unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(rows.len(), 2);
        let spoke = rows[0][1].as_ref().unwrap();
        assert_eq!((spoke.table(), spoke.pk()), ("Spoke", 1));
        assert!(rows[1][1].is_none());
        assert_eq!(
            rows[1][0].as_ref().unwrap().column("name").unwrap(),
            rusqlite::types::Value::Text("b".into())
        );
    }

    #[test]
    fn test_unregistered_column_name_is_rejected() {
        let conn = store();
        let err = PreparedQuery::new(&catalog(), &conn, "SELECT Hub_pk AS Elsewhere FROM Hub")
            .err()
            .unwrap();
        assert!(matches!(err, Error::UnknownTable(name) if name == "Elsewhere"));
    }
}
