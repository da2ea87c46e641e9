//! TheBrain API access.
//!
//! This module wraps the remote knowledge-graph API:
//!
//! - [`client`]: thought CRUD over HTTP with retries and a read-through cache
//! - [`cache`]: the cache itself
//! - [`error`]: status-code error taxonomy
//! - [`thought`]: read-only views over thought payloads and request bodies

pub mod cache;
pub mod client;
pub mod error;
pub mod thought;

pub use cache::ThoughtCache;
pub use client::BrainClient;
pub use error::{BrainError, BrainResult};
pub use thought::{search_results, NewThought, Thought, ThoughtLink};
