//! # locshare
//!
//! Async client core for a live location sharing service.
//!
//! This crate reconciles three independent data sources (a one-time
//! snapshot fetch, a live push-event stream, and locally submitted
//! positions) into one consistent, render-ready collection of location
//! records, and manages the lifecycle of the stream connection and the
//! deep-link addressing scheme. Map rendering and the device geolocation
//! sensor are external collaborators behind trait seams.

pub mod api;
pub mod core;
pub mod link;
pub mod session;
pub mod share;
pub mod stream;

pub mod prelude;

// Re-export public API
pub use crate::core::{
    config::SessionConfig,
    geo::{LatLng, DEFAULT_CENTER, DEFAULT_ZOOM},
    record::LocationRecord,
    store::LocationStore,
    viewport::{Viewport, ViewportController},
};

pub use api::{
    client::HttpLocationsApi,
    snapshot::{Snapshot, SnapshotLoader},
    source::{LocationSubmission, LocationsApi},
};

pub use stream::{
    connector::{SseConnector, StreamConnector},
    manager::{ConnectionManager, StreamState},
};

pub use share::{PositionSource, ShareCoordinator, ShareLink};

pub use session::{Session, SessionBuilder, SessionMode};

/// Errors from the snapshot fetch path.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// The backend answered, but knows no record with the requested id.
    #[error("location not found: {0}")]
    NotFound(String),

    /// Transport-level failure: network unreachable, timeout, non-JSON body.
    #[error("location service unreachable: {0}")]
    Unreachable(String),
}

/// Errors from the share-current-position path.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ShareError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No device position capability is available on this session.
    #[error("device position capability unavailable")]
    CapabilityUnavailable,

    /// The one-shot position capture failed (denied, timed out, unavailable).
    #[error("could not capture device position: {0}")]
    CaptureFailed(String),

    /// The backend rejected the submission as invalid.
    #[error("share rejected: {0}")]
    Rejected(String),

    #[error("location service unreachable: {0}")]
    Unreachable(String),
}

/// Errors from the live push-stream connection.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StreamError {
    #[error("live connection failed: {0}")]
    ConnectFailed(String),
}

/// Reasons a one-shot device position capture can fail.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PositionError {
    #[error("permission denied")]
    Denied,

    #[error("position unavailable")]
    Unavailable,

    #[error("timed out waiting for a position fix")]
    Timeout,
}
