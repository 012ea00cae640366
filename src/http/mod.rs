//! HTTP protocol layer module
//!
//! Response builders shared by every endpoint, decoupled from handler logic.

pub mod response;

// Re-export commonly used builders
pub use response::{
    build_404_response, build_405_response, build_error_response, build_json_response,
    build_text_response,
};
