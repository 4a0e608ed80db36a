pub mod cli;
pub mod error;
pub mod filter;
pub mod handle;
pub mod query;
pub mod schema;
pub mod writer;

pub use cli::{Cli, Commands};
pub use error::{Error, Result};
pub use handle::{Handle, TableHandle, TableWrapper, WrapperFactory};
pub use query::{JoinEdge, QueryOptions, QueryPlan, QueryRequest, TableRef};
pub use schema::{Catalog, RelationDeclaration, SchemaRegistry, TableSchema};
pub use writer::{PackStore, SectionLoader, SqlValue};
