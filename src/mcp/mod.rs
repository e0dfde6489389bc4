//! MCP (Model Context Protocol) module
//!
//! Stdio transport adapter in front of the dispatcher.

pub mod server;
pub mod types;
