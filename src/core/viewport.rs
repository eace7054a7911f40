use crate::core::config::SessionConfig;
use crate::core::geo::LatLng;
use crate::core::record::LocationRecord;
use crate::core::store::LocationStore;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// The current view of the map: center and zoom. Screen-space concerns
/// (projection, panning, tiles) belong to the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self { center, zoom }
    }
}

type ViewportSubscriber = Box<dyn Fn(Viewport) + Send + 'static>;

/// Derives the viewport from the store's most recent record.
///
/// Center follows `LocationStore::most_recent()`, falling back to the
/// configured default when the store is empty; zoom is fixed. The
/// derivation is reactive: `attach` registers a store subscription so the
/// viewport is recomputed on every committed mutation, and the rendering
/// layer can in turn subscribe here.
#[derive(Clone)]
pub struct ViewportController {
    default_center: LatLng,
    zoom: f64,
    current: Arc<Mutex<Viewport>>,
    subscribers: Arc<Mutex<Vec<ViewportSubscriber>>>,
}

impl ViewportController {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            default_center: config.default_center,
            zoom: config.default_zoom,
            current: Arc::new(Mutex::new(Viewport::new(
                config.default_center,
                config.default_zoom,
            ))),
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Subscribes to the store so every committed mutation recomputes the
    /// viewport.
    pub fn attach(&self, store: &LocationStore) {
        let controller = self.clone();
        store.subscribe(move |records| controller.recompute(records));
        self.recompute(&store.records());
    }

    /// The most recently derived viewport.
    pub fn current(&self) -> Viewport {
        *self.current.lock().expect("viewport lock poisoned")
    }

    /// Registers a callback invoked with every recomputed viewport.
    pub fn subscribe(&self, callback: impl Fn(Viewport) + Send + 'static) {
        self.subscribers
            .lock()
            .expect("viewport lock poisoned")
            .push(Box::new(callback));
    }

    fn recompute(&self, records: &[LocationRecord]) {
        let center = records
            .last()
            .map(LocationRecord::position)
            .unwrap_or(self.default_center);
        let viewport = Viewport::new(center, self.zoom);
        *self.current.lock().expect("viewport lock poisoned") = viewport;
        for subscriber in self
            .subscribers
            .lock()
            .expect("viewport lock poisoned")
            .iter()
        {
            subscriber(viewport);
        }
    }
}
