//! Request handler module
//!
//! Route dispatch plus the four endpoint handlers.

pub mod endpoints;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
