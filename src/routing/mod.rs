//! Routing module
//!
//! Explicit route table: (method, path pattern) -> endpoint, built once at
//! startup and shared by every connection.

mod matcher;
mod table;

pub use table::{Endpoint, RouteMatch, RouteTable};
