//! Acquisition orchestration.
//!
//! Owns the two per-device read tasks and the shared cancellation token.
//! Starting a run creates the session row and launches both device loops
//! together; stopping cancels the token and joins each loop with a
//! bounded wait so shutdown completion is observable.

mod reader;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use log::{info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::cache::LiveCache;
use crate::config::MonitorConfig;
use crate::db::Database;
use crate::link::SensorLink;
use crate::models::Session;

use reader::device_loop;

/// Upper bound on waiting for a device loop to observe cancellation: one
/// poll interval plus one in-flight read.
const SHUTDOWN_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

struct ActiveRun {
    session_id: String,
    cancel_token: CancellationToken,
    readers: Vec<JoinHandle<()>>,
}

pub struct AcquisitionController {
    config: MonitorConfig,
    db: Database,
    cache: LiveCache,
    active: Option<ActiveRun>,
}

impl AcquisitionController {
    pub fn new(config: MonitorConfig, db: Database, cache: LiveCache) -> Self {
        Self {
            config,
            db,
            cache,
            active: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.active.as_ref().map(|run| run.session_id.as_str())
    }

    /// Start one acquisition run: create the session row, then launch an
    /// independent read task per configured device.
    pub async fn start(&mut self, link: Arc<dyn SensorLink>) -> Result<String> {
        if self.active.is_some() {
            bail!("acquisition already active");
        }

        let session_id = Uuid::new_v4().to_string();
        let session = Session::begin(session_id.clone(), Utc::now());
        self.db
            .insert_session(&session)
            .await
            .context("failed to create session")?;

        self.cache.clear();

        let cancel_token = CancellationToken::new();
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);

        let readers = self
            .config
            .devices
            .iter()
            .cloned()
            .map(|device| {
                tokio::spawn(device_loop(
                    device,
                    Arc::clone(&link),
                    session_id.clone(),
                    self.db.clone(),
                    self.cache.clone(),
                    poll_interval,
                    cancel_token.clone(),
                ))
            })
            .collect();

        info!("acquisition started, session {session_id}");
        self.active = Some(ActiveRun {
            session_id: session_id.clone(),
            cancel_token,
            readers,
        });
        Ok(session_id)
    }

    /// Stop the current run. Returns the stopped session id, or `None`
    /// when nothing was running.
    pub async fn stop(&mut self) -> Result<Option<String>> {
        let Some(run) = self.active.take() else {
            return Ok(None);
        };

        run.cancel_token.cancel();
        for handle in run.readers {
            match tokio::time::timeout(SHUTDOWN_JOIN_TIMEOUT, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => warn!("device read task panicked: {join_err}"),
                Err(_) => warn!(
                    "device read task did not stop within {:?}",
                    SHUTDOWN_JOIN_TIMEOUT
                ),
            }
        }

        self.db
            .mark_session_stopped(&run.session_id, Utc::now())
            .await
            .context("failed to mark session stopped")?;
        self.cache.clear();

        info!("acquisition stopped, session {}", run.session_id);
        Ok(Some(run.session_id))
    }
}
