use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::{params_from_iter, Connection, ToSql};
use std::path::Path;

use tracing::{debug, info, warn};

use super::schema_gen::{generate_create_table, generate_indexes};
use crate::error::{Error, Result};
use crate::filter::{resolve_sections, PackKind};
use crate::schema::Catalog;

/// A value bound to an insert statement
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Integer(i) => ToSqlOutput::from(*i),
            SqlValue::Real(f) => ToSqlOutput::from(*f),
            SqlValue::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Integer(i64::from(value))
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&Path> for SqlValue {
    fn from(value: &Path) -> Self {
        SqlValue::Text(path_text(value))
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// Paths are stored with forward slashes regardless of platform
fn path_text(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Parses one section of a pack into rows of the store.
pub trait SectionLoader {
    /// Section name, one of [`crate::filter::RP_SECTIONS`] or
    /// [`crate::filter::BP_SECTIONS`]
    fn section(&self) -> &'static str;

    fn load(&self, store: &mut PackStore, pack_pk: i64, pack_path: &Path) -> Result<()>;
}

/// SQLite database holding loaded packs
pub struct PackStore {
    conn: Connection,
}

impl PackStore {
    /// Create a new database with every table of the catalog. `None` keeps
    /// the database in memory; an existing file is replaced.
    pub fn create(db_path: Option<&Path>, catalog: &Catalog) -> Result<Self> {
        let conn = match db_path {
            Some(path) => {
                if path.exists() {
                    std::fs::remove_file(path)?;
                }
                Connection::open(path)?
            }
            None => Connection::open_in_memory()?,
        };

        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        let store = Self { conn };
        store.create_tables(catalog)?;
        Ok(store)
    }

    /// Open an existing database without touching its structure
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Create all tables of the catalog
    pub fn create_tables(&self, catalog: &Catalog) -> Result<()> {
        debug!(tables = catalog.tables().len(), "creating tables");

        for schema in catalog.tables() {
            self.conn.execute(&generate_create_table(schema), [])?;
            for index_sql in generate_indexes(schema) {
                self.conn.execute(&index_sql, [])?;
            }
        }

        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Insert one row and return its primary key. Starts a transaction if
    /// none is open; call [`PackStore::commit`] to persist.
    pub fn insert(&mut self, table: &str, values: &[(&str, SqlValue)]) -> Result<i64> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }

        let sql = if values.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", table)
        } else {
            let columns: Vec<&str> = values.iter().map(|(c, _)| *c).collect();
            let placeholders: Vec<&str> = values.iter().map(|_| "?").collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                columns.join(", "),
                placeholders.join(", ")
            )
        };

        let mut stmt = self.conn.prepare_cached(&sql)?;
        stmt.execute(params_from_iter(values.iter().map(|(_, v)| v)))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Register a pack and run the loaders of its selected sections.
    ///
    /// Fails if a pack with the same path is already stored. Everything
    /// inserted is committed on success and rolled back on failure.
    pub fn load_pack(
        &mut self,
        kind: PackKind,
        pack_path: &Path,
        loaders: &[&dyn SectionLoader],
        include: Option<&[&str]>,
        exclude: &[&str],
    ) -> Result<i64> {
        let sections = resolve_sections(kind, include, exclude)?;

        let count: i64 = self.conn.query_row(
            &format!("SELECT count(*) FROM {} WHERE path = ?1", kind.table()),
            [path_text(pack_path)],
            |row| row.get(0),
        )?;
        if count != 0 {
            return Err(Error::PackAlreadyLoaded(pack_path.to_path_buf()));
        }

        match self.load_sections(kind, pack_path, loaders, &sections) {
            Ok(pack_pk) => {
                self.commit()?;
                info!(pack = ?pack_path, pk = pack_pk, "pack loaded");
                Ok(pack_pk)
            }
            Err(e) => {
                self.rollback()?;
                Err(e)
            }
        }
    }

    fn load_sections(
        &mut self,
        kind: PackKind,
        pack_path: &Path,
        loaders: &[&dyn SectionLoader],
        sections: &[&'static str],
    ) -> Result<i64> {
        let pack_pk = self.insert(kind.table(), &[("path", SqlValue::from(pack_path))])?;

        for loader in loaders {
            if !kind.sections().contains(&loader.section()) {
                warn!(section = loader.section(), pack = kind.table(), "loader does not belong to this pack");
            }
        }

        for section in sections {
            match loaders.iter().find(|l| l.section() == *section) {
                Some(loader) => {
                    debug!(section, "loading section");
                    loader.load(self, pack_pk, pack_path)?;
                }
                None => debug!(section, "no loader for section"),
            }
        }
        Ok(pack_pk)
    }

    /// Run arbitrary SQL and collect every row
    pub fn execute(&self, sql: &str) -> Result<Vec<Vec<Value>>> {
        let mut stmt = self.conn.prepare(sql)?;
        let width = stmt.column_count();
        let rows = stmt.query_map([], |row| {
            (0..width)
                .map(|idx| row.get::<_, Value>(idx))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn commit(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    pub fn rollback(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    /// Commit pending inserts and optimize the database
    pub fn finalize(mut self) -> Result<()> {
        self.commit()?;
        self.conn.execute_batch("PRAGMA optimize;")?;
        Ok(())
    }
}
