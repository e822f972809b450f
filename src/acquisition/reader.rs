//! Per-device read loop.
//!
//! One loop per peer device: read a telemetry payload, decode it,
//! normalize its timestamp, persist it, publish the unit acceleration
//! vector, then wait out the poll interval. The shared cancel token is
//! observed once per iteration. Any error terminates this loop only; the
//! sibling device keeps running.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::cache::LiveCache;
use crate::clock::TimerBaseline;
use crate::config::DeviceConfig;
use crate::db::Database;
use crate::error::TelemetryError;
use crate::frame::SensorFrame;
use crate::link::{SensorConnection, SensorLink};
use crate::models::SensorSample;
use crate::vector::Vec3;

pub(crate) async fn device_loop(
    device: DeviceConfig,
    link: Arc<dyn SensorLink>,
    session_id: String,
    db: Database,
    cache: LiveCache,
    poll_interval: Duration,
    cancel_token: CancellationToken,
) {
    let mut conn = match link.connect(&device).await {
        Ok(conn) => {
            info!("connected to {} ({})", device.name, device.address);
            conn
        }
        Err(err) => {
            error!("failed to connect to {}: {err}", device.name);
            return;
        }
    };

    let mut baseline = TimerBaseline::new();
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                info!("{} read loop shutting down", device.role);
                break;
            }
            _ = ticker.tick() => {
                match read_one(conn.as_mut(), &device, &session_id, &db, &cache, &mut baseline).await {
                    Ok(()) => {}
                    Err(err) => {
                        // The run is over for this device; readings simply
                        // stop updating and the monitor sees them as stale.
                        error!("{} read loop terminated: {err}", device.role);
                        break;
                    }
                }
            }
        }
    }

    conn.disconnect().await;
}

async fn read_one(
    conn: &mut dyn SensorConnection,
    device: &DeviceConfig,
    session_id: &str,
    db: &Database,
    cache: &LiveCache,
    baseline: &mut TimerBaseline,
) -> Result<(), TelemetryError> {
    let payload = conn.read_frame().await?;
    let frame = SensorFrame::decode(&payload)?;
    let time = baseline.normalize(frame.timer);

    let sample = SensorSample::new(session_id.to_string(), device.role, time, frame);
    db.insert_sample(&sample).await?;

    match Vec3::from_array(frame.acc).normalized() {
        Some(unit) => cache.publish(device.role, unit),
        // Persisted above as-is, but a direction-less reading must not
        // poison calibration or monitoring.
        None => warn!("{} acceleration has no direction, cache not updated", device.role),
    }

    Ok(())
}
