//! Periodic posture monitoring.
//!
//! A single task on its own fixed cadence, decoupled from the acquisition
//! write cadence: each tick reads the latest fused delta, classifies it,
//! fires the alert collaborator on state edges, and publishes a snapshot
//! over a watch channel for UI consumers. Missing or stale vectors mean
//! the tick classifies nothing; it never crashes the loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::info;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::alert::AlertSink;
use crate::orientation::OrientationEngine;
use crate::posture::{PostureState, PostureTracker};

/// What the monitoring consumer last observed. `state` is only present
/// when a calibration baseline exists and both devices are live.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostureSnapshot {
    pub angle: Option<f32>,
    pub delta: Option<f32>,
    pub state: Option<PostureState>,
}

pub struct MonitorController {
    engine: OrientationEngine,
    alert: Arc<dyn AlertSink>,
    interval: Duration,
    snapshot_tx: watch::Sender<PostureSnapshot>,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl MonitorController {
    pub fn new(engine: OrientationEngine, alert: Arc<dyn AlertSink>, interval: Duration) -> Self {
        let (snapshot_tx, _) = watch::channel(PostureSnapshot::default());
        Self {
            engine,
            alert,
            interval,
            snapshot_tx,
            handle: None,
            cancel_token: None,
        }
    }

    /// Subscribe to published snapshots. Receivers always see the most
    /// recent evaluation, never every acquisition sample.
    pub fn subscribe(&self) -> watch::Receiver<PostureSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn start(&mut self) -> Result<()> {
        if self.handle.is_some() {
            bail!("monitoring already active");
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();
        let engine = self.engine.clone();
        let alert = Arc::clone(&self.alert);
        let snapshot_tx = self.snapshot_tx.clone();
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            let mut tracker = PostureTracker::new();
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let snapshot = evaluate_tick(&engine, &mut tracker, alert.as_ref());
                        let _ = snapshot_tx.send(snapshot);
                    }
                    _ = token_clone.cancelled() => {
                        info!("monitor loop shutting down");
                        break;
                    }
                }
            }
        });

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("monitor task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

/// One monitoring evaluation. Pure classification first, then the alert
/// side effect on the edge.
fn evaluate_tick(
    engine: &OrientationEngine,
    tracker: &mut PostureTracker,
    alert: &dyn AlertSink,
) -> PostureSnapshot {
    let angle = engine.current_angle();
    let Some(delta) = engine.delta() else {
        return PostureSnapshot {
            angle,
            delta: None,
            state: None,
        };
    };

    let evaluation = tracker.evaluate(delta);
    if evaluation.should_alert {
        alert.alert(evaluation.state);
    }

    PostureSnapshot {
        angle,
        delta: Some(delta),
        state: Some(evaluation.state),
    }
}
