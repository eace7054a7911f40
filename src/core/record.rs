use crate::core::geo::{LatLng, DEFAULT_CENTER};
use serde::{Deserialize, Serialize};

/// Display label of the synthetic placeholder record used when the
/// snapshot fetch fails at the transport level.
pub const PLACEHOLDER_LABEL: &str = "Shared location unavailable";

/// A single participant's published position, as stored by the backend.
///
/// `id` and `timestamp` are assigned by the backend on creation; both are
/// empty for a record that has not been persisted yet (the placeholder, or
/// a submission body before the response arrives).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(default)]
    pub id: String,
    pub username: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timestamp: String,
}

impl LocationRecord {
    pub fn new(id: impl Into<String>, username: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            latitude: lat,
            longitude: lng,
            timestamp: String::new(),
        }
    }

    /// The fixed, clearly-synthetic record substituted into the collection
    /// when the snapshot endpoint cannot be reached, so that the map always
    /// has something to render. The accompanying error state is what makes
    /// the degraded mode visible to the user.
    pub fn placeholder() -> Self {
        Self::new("", PLACEHOLDER_LABEL, DEFAULT_CENTER.lat, DEFAULT_CENTER.lng)
    }

    /// True for records the backend has not assigned an identity to.
    pub fn is_unpersisted(&self) -> bool {
        self.id.is_empty()
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}
