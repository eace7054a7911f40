pub mod connector;
pub mod manager;

// Re-exports for convenience
pub use connector::{SseConnector, StreamConnector};
pub use manager::{ConnectionManager, StreamState};
