use crate::core::record::LocationRecord;
use crate::{FetchError, ShareError};
use async_trait::async_trait;
use serde::Serialize;

/// Body of a share submission, as the backend creation endpoint expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSubmission {
    pub username: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Trait representing the backend's location endpoints.
///
/// The real implementation speaks HTTP ([`crate::api::client::HttpLocationsApi`]);
/// tests substitute in-memory fakes.
#[async_trait]
pub trait LocationsApi: Send + Sync {
    /// `GET /api/locations`: the full collection.
    async fn fetch_all(&self) -> Result<Vec<LocationRecord>, FetchError>;

    /// `GET /api/locations/{id}`: a single record, or `NotFound` when the
    /// backend reports it does not exist.
    async fn fetch_one(&self, id: &str) -> Result<LocationRecord, FetchError>;

    /// `POST /api/locations`: create a record; the backend assigns `id`
    /// and `timestamp`. Validation failures surface as `Rejected`.
    async fn submit(&self, submission: &LocationSubmission) -> Result<LocationRecord, ShareError>;
}
