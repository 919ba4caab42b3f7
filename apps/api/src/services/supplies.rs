//! # Supplies Sync
//!
//! Pulls stock levels from the external supplies feed and overwrites the
//! catalog by offer name.
//!
//! ## Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  interval tick (first tick fires immediately)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GET SUPPLIES_URL ── transport error / non-2xx / bad JSON ─► warn, skip │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SuppliesSnapshot::to_offers()   (7 offers, units / 5)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OfferRepository::upsert_many   (one transaction)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed round is not retried; the next tick tries again.

use std::time::Duration;

use newworld_core::supplies::SuppliesSnapshot;
use newworld_db::{Database, DbError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Why one sync round did not update the catalog.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("supplies request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("supplies feed answered {0}")]
    Status(reqwest::StatusCode),

    #[error("could not store supplies: {0}")]
    Store(#[from] DbError),
}

/// Periodic job that mirrors the supplies feed into the catalog.
pub struct SuppliesSync {
    client: reqwest::Client,
    url: String,
    db: Database,
    interval: Duration,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Stops a running [`SuppliesSync`].
#[derive(Clone)]
pub struct SuppliesSyncHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl SuppliesSyncHandle {
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

impl SuppliesSync {
    pub fn new(
        db: Database,
        url: impl Into<String>,
        interval: Duration,
    ) -> Result<(Self, SuppliesSyncHandle), SyncError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let job = SuppliesSync {
            client,
            url: url.into(),
            db,
            interval,
            shutdown_rx,
        };

        Ok((job, SuppliesSyncHandle { shutdown_tx }))
    }

    /// Runs one fetch-and-upsert round; returns the number of offers written.
    pub async fn sync_once(&self) -> Result<usize, SyncError> {
        debug!(url = %self.url, "Fetching supplies");

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status));
        }

        let snapshot: SuppliesSnapshot = response.json().await?;
        let offers = snapshot.to_offers();
        let written = self.db.offers().upsert_many(&offers).await?;

        Ok(written.len())
    }

    /// Runs the sync loop until the handle asks it to stop.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!(url = %self.url, every_secs = self.interval.as_secs(), "Supplies sync starting");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.sync_once().await {
                        Ok(count) => info!(count, "Supplies synced"),
                        Err(e) => warn!(error = %e, "Supplies sync skipped"),
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Supplies sync shutting down");
                    break;
                }
            }
        }

        info!("Supplies sync stopped");
    }
}
