use thiserror::Error;

use crate::cache::DeviceRole;

/// Failure taxonomy for the acquisition and fusion pipeline.
///
/// Every variant is scoped to a single device task or a single user
/// operation; none of them is fatal to the sibling device or the
/// monitoring loop.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Telemetry payload was not the fixed frame length.
    #[error("malformed telemetry frame: expected {expected} bytes, got {len}")]
    MalformedFrame { len: usize, expected: usize },

    /// Wireless connection or read failure. Terminates that device's
    /// read task only.
    #[error("device {role} unavailable: {reason}")]
    DeviceUnavailable { role: DeviceRole, reason: String },

    /// One or both devices have not produced a sample yet, so no
    /// calibration baseline can be captured. Reported, never fatal.
    #[error("calibration unavailable: no live sample for {role}")]
    CalibrationUnavailable { role: DeviceRole },

    /// Persistence failure. Fatal for the owning device task, not for
    /// the sibling.
    #[error("session store failure")]
    SessionStore(#[from] anyhow::Error),
}

impl TelemetryError {
    pub fn device_unavailable(role: DeviceRole, reason: impl Into<String>) -> Self {
        Self::DeviceUnavailable {
            role,
            reason: reason.into(),
        }
    }
}
