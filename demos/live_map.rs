//! Headless end-to-end demo against a running backend.
//!
//! Usage:
//!   LOCSHARE_BASE=http://localhost:3000 cargo run --example live_map
//!
//! Starts a session for the shared map, prints the collection and the
//! derived viewport on every change, and follows the live stream for a
//! minute before tearing down.

use anyhow::{Context, Result};
use locshare::prelude::*;
use reqwest::Url;

/// The demo has no real geolocation sensor; it reports a fixed position.
struct FixedPosition(LatLng);

#[async_trait::async_trait]
impl PositionSource for FixedPosition {
    async fn current_position(&self) -> Result<LatLng, PositionError> {
        Ok(self.0)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let base = std::env::var("LOCSHARE_BASE").unwrap_or_else(|_| "http://localhost:3000".into());
    let page_url = Url::parse(&base).context("invalid LOCSHARE_BASE")?;

    let config = SessionConfig::with_base_url(base);
    let api = HttpLocationsApi::from_config(&config).context("bad base address")?;
    let connector = SseConnector::from_config(&config).context("bad base address")?;
    let session = Session::builder(config)
        .page_url(page_url)
        .api(Arc::new(api))
        .connector(Arc::new(connector))
        .position_source(Arc::new(FixedPosition(LatLng::new(48.8584, 2.2945))))
        .start()
        .await;

    if let Some(message) = session.last_error() {
        eprintln!("degraded start: {message}");
    }

    session.store().subscribe(|records| {
        println!("--- {} location(s)", records.len());
        for record in records {
            println!(
                "  {:<12} {:>9.4},{:>9.4}  {}",
                record.username, record.latitude, record.longitude, record.id
            );
        }
    });
    session.viewport().subscribe(|viewport| {
        println!(
            "viewport -> center {:.4},{:.4} zoom {}",
            viewport.center.lat, viewport.center.lng, viewport.zoom
        );
    });

    match session.share("demo").await {
        Ok(share) => println!("shared: {}", share.url),
        Err(e) => eprintln!("share failed: {e}"),
    }

    println!("following live updates for 60s");
    tokio::time::sleep(Duration::from_secs(60)).await;
    session.close();
    Ok(())
}
