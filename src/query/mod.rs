//! Join-path search and query rendering over the relation graph

pub mod path;
pub mod plan;
pub mod rows;

pub use path::{find_path, JoinEdge};
pub use plan::{QueryOptions, QueryPlan, QueryRequest, TableRef, DEFAULT_BLACKLIST};
pub use rows::{HandleRow, HandleRows, PreparedQuery};
