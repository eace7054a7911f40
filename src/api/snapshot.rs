//! One-time snapshot load with the degrade-gracefully fallback policy.

use crate::api::source::LocationsApi;
use crate::core::record::LocationRecord;
use crate::FetchError;
use std::sync::Arc;

/// Outcome of the snapshot load: the working collection plus the error
/// state, if any, to surface to the user.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Vec<LocationRecord>,
    pub error: Option<FetchError>,
}

impl Snapshot {
    fn ok(records: Vec<LocationRecord>) -> Self {
        Self {
            records,
            error: None,
        }
    }
}

/// Performs the one-time fetch that seeds the store at session start.
///
/// Runs exactly once per session, never on stream reconnect. A transport
/// failure substitutes the fixed placeholder record so the map always has
/// something to render; a backend "not found" leaves the collection empty.
/// The placeholder is reserved for transport failure.
pub struct SnapshotLoader {
    api: Arc<dyn LocationsApi>,
}

impl SnapshotLoader {
    pub fn new(api: Arc<dyn LocationsApi>) -> Self {
        Self { api }
    }

    /// Fetches the single identified record, or the full collection when no
    /// identifier is given.
    pub async fn load(&self, id: Option<&str>) -> Snapshot {
        match id {
            Some(id) => match self.api.fetch_one(id).await {
                Ok(record) => {
                    log::debug!("snapshot loaded single location {}", id);
                    Snapshot::ok(vec![record])
                }
                Err(err @ FetchError::NotFound(_)) => Snapshot {
                    records: Vec::new(),
                    error: Some(err),
                },
                Err(err) => Self::fallback(err),
            },
            None => match self.api.fetch_all().await {
                Ok(records) => {
                    log::debug!("snapshot loaded {} location(s)", records.len());
                    Snapshot::ok(records)
                }
                Err(err) => Self::fallback(err),
            },
        }
    }

    fn fallback(err: FetchError) -> Snapshot {
        log::warn!("snapshot fetch failed, substituting placeholder: {}", err);
        Snapshot {
            records: vec![LocationRecord::placeholder()],
            error: Some(err),
        }
    }
}
