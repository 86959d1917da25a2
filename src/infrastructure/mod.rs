//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - The explorer backend client (GraphQL plus REST over reqwest)
//! - Live channel sessions over tokio-tungstenite
//! - Tokio runtime bridge for async operations

pub mod api;
pub mod channel;
pub mod runtime;

pub use api::{ApiEndpoints, ExplorerApi, HttpExplorerApi};
pub use runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent, WorkerConfig};
