//! Demo run of the full pipeline against simulated sensors.
//!
//! Starts an acquisition session, calibrates once both devices report,
//! monitors while the upper sensor tilts through warning and bad posture,
//! then stops and prints the persisted per-device counts and the recorded
//! angle summary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::info;

use posture_monitor::link::simulated::SimulatedLink;
use posture_monitor::link::SensorLink;
use posture_monitor::report::{session_angle_series, PostureSummary};
use posture_monitor::vector::Vec3;
use posture_monitor::{
    AcquisitionController, BeepAlert, Database, DeviceRole, LiveCache, MonitorConfig,
    MonitorController, OrientationEngine,
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config_path = PathBuf::from("posture-config.json");
    let config = MonitorConfig::load(&config_path)?;
    let db = Database::new(config.db_path.clone())?;

    let cache = LiveCache::new();
    let engine = OrientationEngine::new(cache.clone());
    let mut acquisition = AcquisitionController::new(config.clone(), db.clone(), cache.clone());
    let mut monitor = MonitorController::new(
        engine.clone(),
        Arc::new(BeepAlert::new()),
        Duration::from_millis(config.monitor_interval_ms),
    );

    let link = SimulatedLink::new();
    let link_handle: Arc<dyn SensorLink> = Arc::new(link.clone());

    let session_id = acquisition.start(link_handle).await?;
    info!("session {session_id} running");

    // Let both devices report before capturing the baseline.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let baseline = engine.calibrate()?;
    info!("reference angle {baseline:.1} deg");

    monitor.start()?;
    let mut snapshots = monitor.subscribe();

    let phases = [
        ("upright", Vec3::new(0.0, 0.0, 1.0)),
        ("slouching", Vec3::new(0.0, 0.3, 0.954)),
        ("hunched over", Vec3::new(0.0, 0.5, 0.866)),
        ("upright again", Vec3::new(0.0, 0.0, 1.0)),
    ];
    for (label, gravity) in phases {
        link.set_tilt(DeviceRole::Upper, gravity);
        tokio::time::sleep(Duration::from_secs(2)).await;
        let snapshot = *snapshots.borrow_and_update();
        info!(
            "{label}: angle {:?} delta {:?} state {:?}",
            snapshot.angle, snapshot.delta, snapshot.state
        );
    }

    monitor.stop().await?;
    acquisition.stop().await?;

    for role in DeviceRole::ALL {
        let count = db.sample_count(&session_id, role).await?;
        println!("{role}: {count} samples persisted");
    }

    let series = session_angle_series(&db, &session_id).await?;
    let summary = PostureSummary::from_series(&series);
    println!(
        "{} angle points recorded, {:.1}% bad posture",
        series.len(),
        summary.bad_percentage()
    );

    Ok(())
}
