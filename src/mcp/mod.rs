//! Model Context Protocol (MCP) server implementation.
//!
//! Exposes TheBrain thoughts as MCP tools and resources. The server
//! communicates over stdio transport using JSON-RPC 2.0 messages.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                          MCP Server                           │
//! │                                                               │
//! │   ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐  │
//! │   │  Transport  │───▶│   Router    │───▶│ Tools/Resources  │  │
//! │   │   (stdio)   │    │ (dispatch)  │    │   (handlers)     │  │
//! │   └─────────────┘    └─────────────┘    └──────────────────┘  │
//! │                                                  │            │
//! │                                                  ▼            │
//! │                                         ┌──────────────────┐  │
//! │                                         │   BrainClient    │  │
//! │                                         └──────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod protocol;
pub mod resources;
pub mod router;
pub mod server;
pub mod tools;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use router::Router;
pub use server::McpServer;
pub use transport::{StdioTransport, Transport};
