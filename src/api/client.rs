use crate::api::source::{LocationSubmission, LocationsApi};
use crate::core::record::LocationRecord;
use crate::{FetchError, ShareError};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, Url};
use serde::Deserialize;

/// Shared HTTP client with a custom User-Agent. Building the client once
/// avoids the cost of TLS and connection pool setup for every request.
pub(crate) static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("locshare/0.1 (+https://github.com/example/locshare)")
        .build()
        .expect("failed to build reqwest client")
});

/// Shape of every non-2xx response body the backend produces.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// [`LocationsApi`] implementation over the backend's HTTP endpoints.
pub struct HttpLocationsApi {
    base: Url,
}

impl HttpLocationsApi {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    /// Builds the api against the configured base address.
    pub fn from_config(config: &crate::core::config::SessionConfig) -> Result<Self, FetchError> {
        Url::parse(&config.base_url)
            .map(Self::new)
            .map_err(|e| FetchError::Unreachable(e.to_string()))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base
            .join(path)
            .map_err(|e| FetchError::Unreachable(e.to_string()))
    }
}

#[async_trait]
impl LocationsApi for HttpLocationsApi {
    async fn fetch_all(&self) -> Result<Vec<LocationRecord>, FetchError> {
        let url = self.endpoint("/api/locations")?;
        let resp = HTTP_CLIENT
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(FetchError::Unreachable(format!("HTTP {}", resp.status())));
        }
        resp.json::<Vec<LocationRecord>>()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))
    }

    async fn fetch_one(&self, id: &str) -> Result<LocationRecord, FetchError> {
        let url = self.endpoint(&format!("/api/locations/{id}"))?;
        let resp = HTTP_CLIENT
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;
        if resp.status().is_success() {
            resp.json::<LocationRecord>()
                .await
                .map_err(|e| FetchError::Unreachable(e.to_string()))
        } else {
            // A well-formed `{error}` body is the backend saying "no such
            // record"; anything else is a transport-level failure.
            let body = resp
                .json::<ErrorBody>()
                .await
                .map_err(|e| FetchError::Unreachable(e.to_string()))?;
            log::info!("location {} not found: {}", id, body.error);
            Err(FetchError::NotFound(body.error))
        }
    }

    async fn submit(&self, submission: &LocationSubmission) -> Result<LocationRecord, ShareError> {
        let url = self
            .endpoint("/api/locations")
            .map_err(|e| ShareError::Unreachable(e.to_string()))?;
        let resp = HTTP_CLIENT
            .post(url)
            .json(submission)
            .send()
            .await
            .map_err(|e| ShareError::Unreachable(e.to_string()))?;
        if resp.status().is_success() {
            let record = resp
                .json::<LocationRecord>()
                .await
                .map_err(|e| ShareError::Unreachable(e.to_string()))?;
            log::info!("shared location accepted as id {}", record.id);
            Ok(record)
        } else {
            let body = resp
                .json::<ErrorBody>()
                .await
                .map_err(|e| ShareError::Unreachable(e.to_string()))?;
            log::warn!("share submission rejected: {}", body.error);
            Err(ShareError::Rejected(body.error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_resolve_against_the_base() {
        let api = HttpLocationsApi::new(Url::parse("http://localhost:3000").unwrap());
        assert_eq!(
            api.endpoint("/api/locations").unwrap().as_str(),
            "http://localhost:3000/api/locations"
        );
        assert_eq!(
            api.endpoint("/api/locations/abc").unwrap().as_str(),
            "http://localhost:3000/api/locations/abc"
        );
    }

    #[test]
    fn test_submission_serializes_to_the_wire_shape() {
        let body = LocationSubmission {
            username: "ada".to_string(),
            latitude: 1.5,
            longitude: -2.5,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"username": "ada", "latitude": 1.5, "longitude": -2.5})
        );
    }
}
