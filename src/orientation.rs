//! Orientation fusion: angle between the two sensors' acceleration
//! vectors, zeroed against a user-captured calibration baseline.

use std::sync::{Arc, Mutex};

use log::info;

use crate::cache::{DeviceRole, LiveCache};
use crate::error::TelemetryError;
use crate::vector::angle_between_degrees;

/// Shared between the monitoring tick (reader) and the user-facing
/// calibrate control (writer). The baseline persists for the remainder of
/// the process once captured; it is never written to the session store.
#[derive(Clone)]
pub struct OrientationEngine {
    cache: LiveCache,
    baseline: Arc<Mutex<Option<f32>>>,
}

impl OrientationEngine {
    pub fn new(cache: LiveCache) -> Self {
        Self {
            cache,
            baseline: Arc::new(Mutex::new(None)),
        }
    }

    pub fn cache(&self) -> &LiveCache {
        &self.cache
    }

    /// Capture the current inter-sensor angle as the zero reference and
    /// enable monitoring. Fails with `CalibrationUnavailable` when either
    /// device has not yet produced a usable sample.
    pub fn calibrate(&self) -> Result<f32, TelemetryError> {
        let angle = self.current_angle().ok_or_else(|| {
            let missing = if self.cache.latest(DeviceRole::Upper).is_none() {
                DeviceRole::Upper
            } else {
                DeviceRole::Lower
            };
            TelemetryError::CalibrationUnavailable { role: missing }
        })?;

        *self.baseline.lock().unwrap() = Some(angle);
        info!("calibrated: reference angle {angle:.1} deg");
        Ok(angle)
    }

    /// Angle between the latest cached unit vectors, in degrees.
    pub fn current_angle(&self) -> Option<f32> {
        let (upper, lower) = self.cache.latest_pair()?;
        angle_between_degrees(&upper, &lower)
    }

    /// Current angle minus the calibration baseline. Not computed while
    /// no baseline exists.
    pub fn delta(&self) -> Option<f32> {
        let baseline = (*self.baseline.lock().unwrap())?;
        Some(self.current_angle()? - baseline)
    }

    pub fn baseline(&self) -> Option<f32> {
        *self.baseline.lock().unwrap()
    }

    pub fn is_calibrated(&self) -> bool {
        self.baseline().is_some()
    }

    pub fn reset(&self) {
        *self.baseline.lock().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vec3;

    fn engine() -> OrientationEngine {
        OrientationEngine::new(LiveCache::new())
    }

    #[test]
    fn calibrate_without_samples_is_unavailable() {
        let engine = engine();
        match engine.calibrate() {
            Err(TelemetryError::CalibrationUnavailable { role }) => {
                assert_eq!(role, DeviceRole::Upper);
            }
            other => panic!("expected CalibrationUnavailable, got {other:?}"),
        }
        assert!(!engine.is_calibrated());
    }

    #[test]
    fn calibrate_with_one_device_reports_the_missing_one() {
        let engine = engine();
        engine
            .cache()
            .publish(DeviceRole::Upper, Vec3::new(0.0, 0.0, 1.0));
        match engine.calibrate() {
            Err(TelemetryError::CalibrationUnavailable { role }) => {
                assert_eq!(role, DeviceRole::Lower);
            }
            other => panic!("expected CalibrationUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn aligned_sensors_calibrate_to_zero() {
        let engine = engine();
        engine
            .cache()
            .publish(DeviceRole::Upper, Vec3::new(0.0, 0.0, 1.0));
        engine
            .cache()
            .publish(DeviceRole::Lower, Vec3::new(0.0, 0.0, 1.0));
        let baseline = engine.calibrate().unwrap();
        assert!(baseline.abs() < 1e-3);
        assert!(engine.is_calibrated());
    }

    #[test]
    fn delta_tracks_upper_tilt_from_baseline() {
        let engine = engine();
        engine
            .cache()
            .publish(DeviceRole::Upper, Vec3::new(0.0, 0.0, 1.0));
        engine
            .cache()
            .publish(DeviceRole::Lower, Vec3::new(0.0, 0.0, 1.0));
        engine.calibrate().unwrap();

        // Upper tilted roughly 15 degrees off the lower sensor.
        engine
            .cache()
            .publish(DeviceRole::Upper, Vec3::new(0.0, 0.26, 0.97));
        let delta = engine.delta().unwrap();
        assert!((delta - 15.0).abs() < 0.5, "delta was {delta}");
    }

    #[test]
    fn delta_is_undefined_without_baseline() {
        let engine = engine();
        engine
            .cache()
            .publish(DeviceRole::Upper, Vec3::new(0.0, 0.0, 1.0));
        engine
            .cache()
            .publish(DeviceRole::Lower, Vec3::new(0.0, 0.0, 1.0));
        assert!(engine.delta().is_none());
    }

    #[test]
    fn reset_disables_monitoring() {
        let engine = engine();
        engine
            .cache()
            .publish(DeviceRole::Upper, Vec3::new(0.0, 0.0, 1.0));
        engine
            .cache()
            .publish(DeviceRole::Lower, Vec3::new(0.0, 0.0, 1.0));
        engine.calibrate().unwrap();
        engine.reset();
        assert!(engine.delta().is_none());
    }
}
