pub mod graph;
pub mod registry;
pub mod tables;
pub mod types;

pub use graph::*;
pub use registry::*;
pub use tables::*;
pub use types::*;
