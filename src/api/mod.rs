pub mod client;
pub mod snapshot;
pub mod source;

// Re-exports for convenience
pub use client::HttpLocationsApi;
pub use snapshot::{Snapshot, SnapshotLoader};
pub use source::{LocationSubmission, LocationsApi};
