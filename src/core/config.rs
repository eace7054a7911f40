//! Session policy values
//!
//! A single flat options struct in place of per-subsystem knobs: the base
//! address every backend call derives from, the bounded-retry discipline of
//! the live connection, and the default viewport.

use crate::core::geo::{LatLng, DEFAULT_CENTER, DEFAULT_ZOOM};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Base address of the backend; REST paths and the event stream are
    /// resolved relative to it.
    pub base_url: String,
    /// Reconnection attempts after the initial connect before the live
    /// connection is declared failed.
    pub max_reconnect_attempts: u32,
    /// Delay between reconnection attempts.
    pub reconnect_delay: Duration,
    /// Viewport center when the store is empty.
    pub default_center: LatLng,
    /// Fixed viewport zoom.
    pub default_zoom: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            max_reconnect_attempts: 3,
            reconnect_delay: Duration::from_millis(500),
            default_center: DEFAULT_CENTER,
            default_zoom: DEFAULT_ZOOM,
        }
    }
}

impl SessionConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}
