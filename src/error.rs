//! Error types for schema registration, query building and the pack store

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Table '{0}' does not exist in the database")]
    UnknownTable(String),

    #[error("Table '{0}' is already registered")]
    DuplicateTable(String),

    #[error(
        "No connection between {from} and {to} after excluding tables: {}",
        excluded.join(", ")
    )]
    NoConnection {
        from: String,
        to: String,
        excluded: Vec<String>,
    },

    #[error("Table '{table}' has no column '{column}'")]
    UnknownColumn { table: String, column: String },

    #[error("Unknown pack section: {0}")]
    UnknownSection(String),

    #[error("Pack already loaded: {0:?}")]
    PackAlreadyLoaded(PathBuf),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
