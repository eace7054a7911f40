//! Assembles the subsystems into one page-lifetime session.

use crate::api::snapshot::SnapshotLoader;
use crate::api::source::LocationsApi;
use crate::core::config::SessionConfig;
use crate::core::store::LocationStore;
use crate::core::viewport::ViewportController;
use crate::link;
use crate::share::{PositionSource, ShareCoordinator, ShareLink};
use crate::stream::connector::StreamConnector;
use crate::stream::manager::ConnectionManager;
use crate::ShareError;
use reqwest::Url;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// How the session was entered: the shared live map, or a deep link
/// restricted to a single participant's last-known position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    AllLocations,
    Single(String),
}

impl SessionMode {
    /// Resolves the mode from the page address.
    pub fn from_page_url(page_url: &Url) -> Self {
        match link::location_id_from_url(page_url.as_str()) {
            Some(id) => SessionMode::Single(id),
            None => SessionMode::AllLocations,
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, SessionMode::Single(_))
    }
}

/// Wires deep-link resolution, the one-time snapshot, the live connection,
/// the share path, and the derived viewport around a single
/// [`LocationStore`]. Page-lifetime: create with [`SessionBuilder::start`],
/// tear down with [`Session::close`].
pub struct Session {
    mode: SessionMode,
    store: LocationStore,
    viewport: ViewportController,
    connection: ConnectionManager,
    share: ShareCoordinator,
    last_error: Arc<Mutex<Option<String>>>,
    closed: Arc<AtomicBool>,
}

impl Session {
    pub fn builder(config: SessionConfig) -> SessionBuilder {
        SessionBuilder::new(config)
    }

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn store(&self) -> &LocationStore {
        &self.store
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    /// The most recent user-visible error message, if any. Every failure in
    /// this core is recovered into this slot (or a `ShareError` return);
    /// nothing is fatal to the session.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().expect("session lock poisoned").clone()
    }

    /// Shares the device's current position under `username` and returns
    /// the deep link for the created record.
    pub async fn share(&self, username: &str) -> Result<ShareLink, ShareError> {
        let result = self.share.share(username).await;
        if let Err(e) = &result {
            *self.last_error.lock().expect("session lock poisoned") = Some(e.to_string());
        }
        result
    }

    /// Tears the session down: closes the live connection and marks any
    /// in-flight snapshot or share result to be discarded. Idempotent.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.connection.close();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

/// Builder wiring the external collaborators into a [`Session`].
pub struct SessionBuilder {
    config: SessionConfig,
    page_url: Option<Url>,
    api: Option<Arc<dyn LocationsApi>>,
    connector: Option<Arc<dyn StreamConnector>>,
    position: Option<Arc<dyn PositionSource>>,
}

impl SessionBuilder {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            page_url: None,
            api: None,
            connector: None,
            position: None,
        }
    }

    /// The current page address; its optional `locationId` query parameter
    /// selects single-location mode, and share links are derived from it.
    pub fn page_url(mut self, page_url: Url) -> Self {
        self.page_url = Some(page_url);
        self
    }

    pub fn api(mut self, api: Arc<dyn LocationsApi>) -> Self {
        self.api = Some(api);
        self
    }

    pub fn connector(mut self, connector: Arc<dyn StreamConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// The device geolocation capability. Omitting it makes every share
    /// attempt fail with `CapabilityUnavailable`.
    pub fn position_source(mut self, position: Arc<dyn PositionSource>) -> Self {
        self.position = Some(position);
        self
    }

    /// Starts the session: resolves the deep link, opens the live
    /// connection, and applies the one-time snapshot before returning.
    ///
    /// # Panics
    /// Panics if `page_url`, `api` or `connector` were not provided; these
    /// are wiring errors, not runtime conditions.
    pub async fn start(self) -> Session {
        let page_url = self.page_url.expect("SessionBuilder requires page_url");
        let api = self.api.expect("SessionBuilder requires api");
        let connector = self.connector.expect("SessionBuilder requires connector");

        let mode = SessionMode::from_page_url(&page_url);
        log::info!("starting session in {:?} mode", mode);

        let store = LocationStore::new();
        let viewport = ViewportController::new(&self.config);
        viewport.attach(&store);

        let closed = Arc::new(AtomicBool::new(false));
        let last_error = Arc::new(Mutex::new(None));

        // The stream connects concurrently with the snapshot; in
        // single-location mode its events are drained and discarded.
        let connection = ConnectionManager::new(connector, &self.config);
        connection.open(store.clone(), !mode.is_single());

        let share = ShareCoordinator::new(
            api.clone(),
            self.position,
            store.clone(),
            page_url,
            mode.is_single(),
            closed.clone(),
        );

        let session = Session {
            mode,
            store,
            viewport,
            connection,
            share,
            last_error,
            closed,
        };

        session.load_snapshot(api).await;
        session
    }
}

impl Session {
    /// Exactly one snapshot per session; reconnects never re-run it.
    async fn load_snapshot(&self, api: Arc<dyn LocationsApi>) {
        let loader = SnapshotLoader::new(api);
        let id = match &self.mode {
            SessionMode::Single(id) => Some(id.clone()),
            SessionMode::AllLocations => None,
        };
        let snapshot = loader.load(id.as_deref()).await;

        if self.closed.load(Ordering::SeqCst) {
            log::debug!("session closed before snapshot resolved; discarding");
            return;
        }
        if let Some(err) = &snapshot.error {
            *self.last_error.lock().expect("session lock poisoned") = Some(err.to_string());
        }
        self.store.replace_all(snapshot.records);
    }
}
