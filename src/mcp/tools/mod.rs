//! MCP tool implementations.
//!
//! Each tool is implemented in its own module for better organization.

mod common;
mod find_files;

// Re-export tool functions
pub use find_files::find_files;
pub use generate_test::generate_test;
