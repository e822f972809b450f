//! Software stand-in for the wireless sensors.
//!
//! Produces well-formed telemetry frames with a free-running timer and a
//! configurable per-role gravity direction, so the full pipeline can run
//! without hardware. The demo binary tilts the upper sensor mid-run; the
//! integration tests drive it with jitter disabled.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::Rng;

use crate::cache::DeviceRole;
use crate::config::DeviceConfig;
use crate::error::TelemetryError;
use crate::frame::SensorFrame;
use crate::vector::Vec3;

use super::{SensorConnection, SensorLink};

#[derive(Debug, Clone, Copy)]
struct RoleState {
    gravity: Vec3,
}

#[derive(Clone)]
pub struct SimulatedLink {
    states: Arc<Mutex<[RoleState; 2]>>,
    /// Uniform jitter amplitude added to each acceleration component.
    jitter: f32,
    /// Timer increment per read, device timer units.
    timer_step: u32,
}

impl SimulatedLink {
    pub fn new() -> Self {
        Self {
            states: Arc::new(Mutex::new(
                [RoleState {
                    gravity: Vec3::new(0.0, 0.0, 1.0),
                }; 2],
            )),
            jitter: 0.01,
            timer_step: 50,
        }
    }

    /// Deterministic variant for tests.
    pub fn without_jitter() -> Self {
        Self {
            jitter: 0.0,
            ..Self::new()
        }
    }

    /// Point one simulated sensor's gravity vector somewhere else, as if
    /// the wearer bent that body segment.
    pub fn set_tilt(&self, role: DeviceRole, gravity: Vec3) {
        let mut states = self.states.lock().unwrap();
        states[slot(role)].gravity = gravity;
    }
}

impl Default for SimulatedLink {
    fn default() -> Self {
        Self::new()
    }
}

fn slot(role: DeviceRole) -> usize {
    match role {
        DeviceRole::Upper => 0,
        DeviceRole::Lower => 1,
    }
}

#[async_trait]
impl SensorLink for SimulatedLink {
    async fn connect(
        &self,
        device: &DeviceConfig,
    ) -> Result<Box<dyn SensorConnection>, TelemetryError> {
        // Each device timer free-runs from its own arbitrary epoch.
        let epoch = rand::thread_rng().gen_range(0..1_000_000u32);
        Ok(Box::new(SimulatedConnection {
            role: device.role,
            states: Arc::clone(&self.states),
            jitter: self.jitter,
            timer_step: self.timer_step,
            timer: epoch,
            steps: 0,
        }))
    }
}

struct SimulatedConnection {
    role: DeviceRole,
    states: Arc<Mutex<[RoleState; 2]>>,
    jitter: f32,
    timer_step: u32,
    timer: u32,
    steps: u32,
}

#[async_trait]
impl SensorConnection for SimulatedConnection {
    async fn read_frame(&mut self) -> Result<Vec<u8>, TelemetryError> {
        let gravity = {
            let states = self.states.lock().unwrap();
            states[slot(self.role)].gravity
        };

        let mut rng = rand::thread_rng();
        let mut noisy = |base: f32| {
            if self.jitter > 0.0 {
                base + rng.gen_range(-self.jitter..self.jitter)
            } else {
                base
            }
        };

        let frame = SensorFrame {
            acc: [noisy(gravity.x), noisy(gravity.y), noisy(gravity.z)],
            gyro: [noisy(0.0), noisy(0.0), noisy(0.0)],
            timer: self.timer,
            orientation: [0.0, 0.0, 0.0],
            steps: self.steps,
        };

        self.timer = self.timer.wrapping_add(self.timer_step);
        self.steps = self.steps.wrapping_add(1);

        Ok(frame.encode().to_vec())
    }

    async fn disconnect(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;

    #[tokio::test]
    async fn frames_decode_and_timer_free_runs() {
        let link = SimulatedLink::without_jitter();
        let config = MonitorConfig::default();
        let mut conn = link.connect(config.device(DeviceRole::Upper)).await.unwrap();

        let first = SensorFrame::decode(&conn.read_frame().await.unwrap()).unwrap();
        let second = SensorFrame::decode(&conn.read_frame().await.unwrap()).unwrap();
        assert_eq!(second.timer.wrapping_sub(first.timer), 50);
        assert_eq!(first.acc, [0.0, 0.0, 1.0]);
    }

    #[tokio::test]
    async fn tilt_changes_are_visible_to_open_connections() {
        let link = SimulatedLink::without_jitter();
        let config = MonitorConfig::default();
        let mut conn = link.connect(config.device(DeviceRole::Upper)).await.unwrap();

        link.set_tilt(DeviceRole::Upper, Vec3::new(0.0, 0.26, 0.97));
        let frame = SensorFrame::decode(&conn.read_frame().await.unwrap()).unwrap();
        assert_eq!(frame.acc, [0.0, 0.26, 0.97]);
    }
}
