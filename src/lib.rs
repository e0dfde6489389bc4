//! Demo MCP Server Library
//!
//! A small Model Context Protocol server that registers a handful of named
//! tools and prompts and dispatches incoming calls to them.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod mcp;
pub mod registry;

pub use config::Config;
pub use dispatch::{Dispatcher, Invocation};
pub use error::{DemoMcpError, DispatchError, Result};
pub use registry::Registry;
