//! Capturing and publishing the local device's position.

use crate::api::source::{LocationSubmission, LocationsApi};
use crate::core::store::LocationStore;
use crate::core::geo::LatLng;
use crate::{link, PositionError, ShareError};
use async_trait::async_trait;
use reqwest::Url;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-shot device position capture. The device geolocation sensor is an
/// external collaborator; this seam either succeeds once or fails with the
/// reason.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn current_position(&self) -> Result<LatLng, PositionError>;
}

/// A successful share: the backend-assigned id and the durable deep-link
/// address pointing at it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareLink {
    pub id: String,
    pub url: Url,
}

/// Captures the local position, submits it, and produces the shareable
/// address embedding the returned identifier.
pub struct ShareCoordinator {
    api: Arc<dyn LocationsApi>,
    position: Option<Arc<dyn PositionSource>>,
    store: LocationStore,
    page_url: Url,
    /// A single-location session is a read-only shared view; local shares
    /// must not pollute it.
    single_location_view: bool,
    closed: Arc<AtomicBool>,
}

impl ShareCoordinator {
    pub fn new(
        api: Arc<dyn LocationsApi>,
        position: Option<Arc<dyn PositionSource>>,
        store: LocationStore,
        page_url: Url,
        single_location_view: bool,
        closed: Arc<AtomicBool>,
    ) -> Self {
        Self {
            api,
            position,
            store,
            page_url,
            single_location_view,
            closed,
        }
    }

    /// Shares the device's current position under `username`.
    ///
    /// Precondition violations are reported without contacting the backend.
    /// On success the new record is upserted into the store (all-locations
    /// sessions only) and the deep link for it is returned.
    pub async fn share(&self, username: &str) -> Result<ShareLink, ShareError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ShareError::InvalidInput(
                "a display name is required".to_string(),
            ));
        }
        let position_source = self
            .position
            .as_ref()
            .ok_or(ShareError::CapabilityUnavailable)?;

        let position = position_source
            .current_position()
            .await
            .map_err(|e| ShareError::CaptureFailed(e.to_string()))?;

        let submission = LocationSubmission {
            username: username.to_string(),
            latitude: position.lat,
            longitude: position.lng,
        };
        let record = self.api.submit(&submission).await?;
        log::info!("position shared as {} by {}", record.id, username);

        let url = link::share_link(&self.page_url, &record.id);
        let id = record.id.clone();

        // A result resolving after teardown is discarded, and a read-only
        // deep-linked view is never mutated by a local share.
        if !self.single_location_view && !self.closed.load(Ordering::SeqCst) {
            self.store.upsert(record);
        }

        Ok(ShareLink { id, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::LocationRecord;
    use crate::FetchError;
    use std::sync::atomic::AtomicUsize;

    struct FakeApi {
        submissions: AtomicUsize,
        response: Result<LocationRecord, ShareError>,
    }

    impl FakeApi {
        fn accepting(record: LocationRecord) -> Self {
            Self {
                submissions: AtomicUsize::new(0),
                response: Ok(record),
            }
        }
    }

    #[async_trait]
    impl LocationsApi for FakeApi {
        async fn fetch_all(&self) -> Result<Vec<LocationRecord>, FetchError> {
            Ok(Vec::new())
        }

        async fn fetch_one(&self, _id: &str) -> Result<LocationRecord, FetchError> {
            Err(FetchError::NotFound("not found".into()))
        }

        async fn submit(
            &self,
            _submission: &LocationSubmission,
        ) -> Result<LocationRecord, ShareError> {
            self.submissions.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }

    struct FixedPosition(LatLng);

    #[async_trait]
    impl PositionSource for FixedPosition {
        async fn current_position(&self) -> Result<LatLng, PositionError> {
            Ok(self.0)
        }
    }

    struct DeniedPosition;

    #[async_trait]
    impl PositionSource for DeniedPosition {
        async fn current_position(&self) -> Result<LatLng, PositionError> {
            Err(PositionError::Denied)
        }
    }

    fn page() -> Url {
        Url::parse("http://example.com/").unwrap()
    }

    fn coordinator(
        api: Arc<FakeApi>,
        position: Option<Arc<dyn PositionSource>>,
        store: &LocationStore,
        single: bool,
    ) -> ShareCoordinator {
        ShareCoordinator::new(
            api,
            position,
            store.clone(),
            page(),
            single,
            Arc::new(AtomicBool::new(false)),
        )
    }

    #[tokio::test]
    async fn test_successful_share_returns_deep_link_and_upserts() {
        let store = LocationStore::new();
        let api = Arc::new(FakeApi::accepting(LocationRecord::new(
            "xyz", "ada", 1.0, 2.0,
        )));
        let coordinator = coordinator(
            api.clone(),
            Some(Arc::new(FixedPosition(LatLng::new(1.0, 2.0)))),
            &store,
            false,
        );

        let share = coordinator.share("ada").await.unwrap();
        assert_eq!(share.id, "xyz");
        assert_eq!(share.url.as_str(), "http://example.com/?locationId=xyz");
        assert_eq!(store.most_recent().unwrap().id, "xyz");
    }

    #[tokio::test]
    async fn test_single_location_view_is_not_polluted() {
        let store = LocationStore::new();
        store.upsert(LocationRecord::new("only", "bob", 5.0, 5.0));
        let api = Arc::new(FakeApi::accepting(LocationRecord::new(
            "xyz", "ada", 1.0, 2.0,
        )));
        let coordinator = coordinator(
            api,
            Some(Arc::new(FixedPosition(LatLng::new(1.0, 2.0)))),
            &store,
            true,
        );

        let share = coordinator.share("ada").await.unwrap();
        assert_eq!(share.id, "xyz");
        assert_eq!(store.len(), 1);
        assert_eq!(store.most_recent().unwrap().id, "only");
    }

    #[tokio::test]
    async fn test_empty_name_rejected_without_backend_contact() {
        let store = LocationStore::new();
        let api = Arc::new(FakeApi::accepting(LocationRecord::new(
            "xyz", "ada", 1.0, 2.0,
        )));
        let coordinator = coordinator(
            api.clone(),
            Some(Arc::new(FixedPosition(LatLng::new(1.0, 2.0)))),
            &store,
            false,
        );

        let err = coordinator.share("   ").await.unwrap_err();
        assert!(matches!(err, ShareError::InvalidInput(_)));
        assert_eq!(api.submissions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_capability_rejected_without_backend_contact() {
        let store = LocationStore::new();
        let api = Arc::new(FakeApi::accepting(LocationRecord::new(
            "xyz", "ada", 1.0, 2.0,
        )));
        let coordinator = coordinator(api.clone(), None, &store, false);

        let err = coordinator.share("ada").await.unwrap_err();
        assert!(matches!(err, ShareError::CapabilityUnavailable));
        assert_eq!(api.submissions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_capture_failure_carries_the_reason() {
        let store = LocationStore::new();
        let api = Arc::new(FakeApi::accepting(LocationRecord::new(
            "xyz", "ada", 1.0, 2.0,
        )));
        let coordinator = coordinator(api.clone(), Some(Arc::new(DeniedPosition)), &store, false);

        let err = coordinator.share("ada").await.unwrap_err();
        match err {
            ShareError::CaptureFailed(reason) => assert!(reason.contains("denied")),
            other => panic!("expected CaptureFailed, got {other:?}"),
        }
        assert_eq!(api.submissions.load(Ordering::SeqCst), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_backend_rejection_maps_to_rejected() {
        let store = LocationStore::new();
        let api = Arc::new(FakeApi {
            submissions: AtomicUsize::new(0),
            response: Err(ShareError::Rejected("username taken".into())),
        });
        let coordinator = coordinator(
            api,
            Some(Arc::new(FixedPosition(LatLng::new(1.0, 2.0)))),
            &store,
            false,
        );

        let err = coordinator.share("ada").await.unwrap_err();
        assert!(matches!(err, ShareError::Rejected(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_result_after_teardown_is_not_applied() {
        let store = LocationStore::new();
        let api = Arc::new(FakeApi::accepting(LocationRecord::new(
            "xyz", "ada", 1.0, 2.0,
        )));
        let closed = Arc::new(AtomicBool::new(false));
        let coordinator = ShareCoordinator::new(
            api,
            Some(Arc::new(FixedPosition(LatLng::new(1.0, 2.0)))),
            store.clone(),
            page(),
            false,
            closed.clone(),
        );

        closed.store(true, Ordering::SeqCst);
        let share = coordinator.share("ada").await.unwrap();
        assert_eq!(share.id, "xyz");
        assert!(store.is_empty());
    }
}
