//! Wireless sensor link abstraction.
//!
//! The acquisition side talks to each peer device through these traits;
//! the real short-range transport lives outside this crate and plugs in
//! here. Connection and read failures surface as `DeviceUnavailable` and
//! terminate only the affected device's read task.

pub mod simulated;

use async_trait::async_trait;

use crate::config::DeviceConfig;
use crate::error::TelemetryError;

/// Service characteristic every telemetry frame is read from, identical
/// on both devices.
pub const SENSOR_CHARACTERISTIC_UUID: &str = "19b10001-e8f2-537e-4f6c-d104768a1214";

#[async_trait]
pub trait SensorLink: Send + Sync {
    /// Establish a session with one fixed peer device.
    async fn connect(
        &self,
        device: &DeviceConfig,
    ) -> Result<Box<dyn SensorConnection>, TelemetryError>;
}

#[async_trait]
pub trait SensorConnection: Send {
    /// Read one raw telemetry payload from the sensor characteristic.
    async fn read_frame(&mut self) -> Result<Vec<u8>, TelemetryError>;

    async fn disconnect(&mut self);
}
