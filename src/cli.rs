use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::query::{QueryOptions, QueryRequest, TableRef};

#[derive(Parser, Debug)]
#[command(name = "bedrock-packs-sqlite")]
#[command(version, about = "Query Minecraft Bedrock packs stored in SQLite")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty database with all pack tables
    Init {
        /// Output SQLite database path
        output_db: PathBuf,
    },

    /// List all available table names
    ListTables {
        /// Also print the relations declared by each table
        #[arg(short, long)]
        relations: bool,
    },

    /// Build a query joining the given tables, and run it if a database is given
    Query(QueryArgs),
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Table the query starts from
    pub root: String,

    /// Tables to connect, in order. Prefix with '?' for a LEFT JOIN
    pub tables: Vec<String>,

    /// Run the query against this database instead of printing it
    #[arg(short, long)]
    pub db: Option<PathBuf>,

    /// JSON file with query options; flags override it
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Tables never used to connect others (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub blacklist: Option<Vec<String>>,

    /// Only follow structural (primary key) relations
    #[arg(long)]
    pub pk_only: bool,

    /// Do not use SELECT DISTINCT
    #[arg(long)]
    pub no_distinct: bool,

    /// WHERE predicate, repeatable
    #[arg(short = 'w', long = "where")]
    pub filter: Vec<String>,

    /// GROUP BY expression, repeatable
    #[arg(long)]
    pub group_by: Vec<String>,

    /// HAVING predicate, repeatable
    #[arg(long)]
    pub having: Vec<String>,

    /// ORDER BY expression, repeatable
    #[arg(long)]
    pub order_by: Vec<String>,

    /// Print rows as JSON
    #[arg(long)]
    pub json: bool,
}

impl QueryArgs {
    /// Merge the options file and the flags into a request
    pub fn to_request(&self) -> Result<QueryRequest> {
        let mut options = match &self.options {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read options: {:?}", path))?;
                serde_json::from_str::<QueryOptions>(&text)
                    .with_context(|| format!("Failed to parse options: {:?}", path))?
            }
            None => QueryOptions::default(),
        };

        if let Some(blacklist) = &self.blacklist {
            options.blacklist = blacklist.clone();
        }
        if self.pk_only {
            options.allow_non_unique = false;
        }
        if self.no_distinct {
            options.distinct = false;
        }
        options.filter.extend(self.filter.iter().cloned());
        options.group_by.extend(self.group_by.iter().cloned());
        options.having.extend(self.having.iter().cloned());
        options.order_by.extend(self.order_by.iter().cloned());

        Ok(QueryRequest {
            root: self.root.clone(),
            tables: self.tables.iter().map(|t| parse_table_ref(t)).collect(),
            options,
        })
    }
}

/// `?Name` requests a LEFT JOIN, `Name` an inner join
pub fn parse_table_ref(arg: &str) -> TableRef {
    match arg.strip_prefix('?') {
        Some(name) => TableRef::left(name),
        None => TableRef::inner(arg),
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
