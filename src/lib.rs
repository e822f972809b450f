//! Dual-IMU posture acquisition and monitoring.
//!
//! Two wearable inertial sensors stream fixed-format telemetry over a
//! short-range wireless link; this crate decodes and persists both
//! streams, fuses them into a relative bend angle, and classifies posture
//! quality against medical thresholds with edge-triggered alerting.

pub mod acquisition;
pub mod alert;
pub mod cache;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod frame;
pub mod link;
pub mod models;
pub mod monitor;
pub mod orientation;
pub mod posture;
pub mod report;
pub mod vector;

pub use acquisition::AcquisitionController;
pub use alert::{AlertSink, BeepAlert, NullAlert};
pub use cache::{DeviceRole, LiveCache};
pub use config::{DeviceConfig, MonitorConfig};
pub use db::Database;
pub use error::TelemetryError;
pub use frame::{SensorFrame, FRAME_LEN};
pub use models::{SensorSample, Session};
pub use monitor::{MonitorController, PostureSnapshot};
pub use orientation::OrientationEngine;
pub use posture::{classify, PostureState, PostureTracker};
