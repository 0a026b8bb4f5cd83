//! Tool system for the agent
//!
//! This module provides the ToolService trait, its HTTP implementation, and
//! validation of tool-call arguments against the catalog.

mod http;
pub mod schema;
mod tool;

pub use http::HttpToolService;
pub use schema::validate_arguments;
pub use tool::ToolService;
