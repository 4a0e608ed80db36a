//! Row handles produced when mapping query results back to tables

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension};
use std::fmt;

use crate::error::{Error, Result};
use crate::schema::{Column, TableSchema};

/// A reference to one row of one table.
pub trait Handle: fmt::Debug {
    fn table(&self) -> &'static str;

    fn pk(&self) -> i64;

    fn connection(&self) -> &Connection;

    /// Declared columns of the table, used to validate [`Handle::column`]
    fn columns(&self) -> &'static [Column];

    /// Fetch a single column of the referenced row.
    fn column(&self, name: &str) -> Result<Value> {
        let table = self.table();
        let pk_column = format!("{}_pk", table);
        if name != pk_column && !self.columns().iter().any(|c| c.name == name) {
            return Err(Error::UnknownColumn {
                table: table.to_string(),
                column: name.to_string(),
            });
        }
        let sql = format!("SELECT {} FROM {} WHERE {} = ?1", name, table, pk_column);
        let value = self
            .connection()
            .query_row(&sql, [self.pk()], |row| row.get::<_, Value>(0))
            .optional()?;
        Ok(value.unwrap_or(Value::Null))
    }
}

/// Builds a [`Handle`] for a table from a connection and a primary key.
pub trait WrapperFactory: Send + Sync {
    fn construct<'c>(&self, conn: &'c Connection, pk: i64) -> Box<dyn Handle + 'c>;
}

/// Default factory, registered for every table
#[derive(Debug, Clone, Copy)]
pub struct TableWrapper {
    table: &'static str,
    columns: &'static [Column],
}

impl TableWrapper {
    pub fn new(schema: &TableSchema) -> Self {
        Self {
            table: schema.name,
            columns: schema.columns,
        }
    }
}

impl WrapperFactory for TableWrapper {
    fn construct<'c>(&self, conn: &'c Connection, pk: i64) -> Box<dyn Handle + 'c> {
        Box::new(TableHandle {
            conn,
            table: self.table,
            columns: self.columns,
            pk,
        })
    }
}

/// Generic handle returned by [`TableWrapper`]
pub struct TableHandle<'c> {
    conn: &'c Connection,
    table: &'static str,
    columns: &'static [Column],
    pk: i64,
}

impl fmt::Debug for TableHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.table, self.pk)
    }
}

impl Handle for TableHandle<'_> {
    fn table(&self) -> &'static str {
        self.table
    }

    fn pk(&self) -> i64 {
        self.pk
    }

    fn connection(&self) -> &Connection {
        self.conn
    }

    fn columns(&self) -> &'static [Column] {
        self.columns
    }
}
