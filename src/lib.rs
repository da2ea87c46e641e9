//! thebrain-mcp: MCP server for TheBrain knowledge graphs
//!
//! Exposes thought management (search, get, create, update, delete) to AI
//! assistants through the Model Context Protocol over stdio.
//!
//! # Modules
//!
//! - [`brain`]: TheBrain API client, cache and error taxonomy
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Error types
//! - [`mcp`]: MCP protocol implementation

pub mod brain;
pub mod config;
pub mod error;
pub mod mcp;
