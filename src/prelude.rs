//! Prelude module for common locshare types and traits
//!
//! Re-exports the most commonly used types for easy importing with
//! `use locshare::prelude::*;`

pub use crate::core::{
    config::SessionConfig,
    geo::{LatLng, DEFAULT_CENTER, DEFAULT_ZOOM},
    record::LocationRecord,
    store::LocationStore,
    viewport::{Viewport, ViewportController},
};

pub use crate::api::{
    client::HttpLocationsApi,
    snapshot::{Snapshot, SnapshotLoader},
    source::{LocationSubmission, LocationsApi},
};

pub use crate::stream::{
    connector::{SseConnector, StreamConnector},
    manager::{ConnectionManager, StreamState},
};

pub use crate::share::{PositionSource, ShareCoordinator, ShareLink};

pub use crate::session::{Session, SessionBuilder, SessionMode};

pub use crate::link::{location_id_from_url, share_link};

pub use crate::{FetchError, PositionError, ShareError, StreamError};

pub use std::sync::Arc;
pub use std::time::Duration;
