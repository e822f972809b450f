//! Live state cache shared between the acquisition writers and the
//! calibration/monitoring readers.
//!
//! Two slots, one per device role, each holding the most recent unit
//! acceleration vector. Last write wins; no history. All access goes
//! through one mutex so readers always see a consistent snapshot.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::vector::Vec3;

/// Body-segment role of one of the two fixed sensor devices. Its string
/// tag doubles as the `imu_name` persisted with every sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceRole {
    Upper,
    Lower,
}

impl DeviceRole {
    pub const ALL: [DeviceRole; 2] = [DeviceRole::Upper, DeviceRole::Lower];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceRole::Upper => "Upper",
            DeviceRole::Lower => "Lower",
        }
    }

    pub fn from_str(value: &str) -> Option<DeviceRole> {
        match value {
            "Upper" => Some(DeviceRole::Upper),
            "Lower" => Some(DeviceRole::Lower),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        match self {
            DeviceRole::Upper => 0,
            DeviceRole::Lower => 1,
        }
    }
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Default)]
pub struct LiveCache {
    slots: Arc<Mutex<[Option<Vec3>; 2]>>,
}

impl LiveCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the slot for `role` with the latest unit vector.
    pub fn publish(&self, role: DeviceRole, unit_acc: Vec3) {
        let mut slots = self.slots.lock().unwrap();
        slots[role.index()] = Some(unit_acc);
    }

    pub fn latest(&self, role: DeviceRole) -> Option<Vec3> {
        let slots = self.slots.lock().unwrap();
        slots[role.index()]
    }

    /// Both vectors read under one lock, so the pair is a consistent
    /// snapshot even while the read loops keep publishing.
    pub fn latest_pair(&self) -> Option<(Vec3, Vec3)> {
        let slots = self.slots.lock().unwrap();
        match (slots[0], slots[1]) {
            (Some(upper), Some(lower)) => Some((upper, lower)),
            _ => None,
        }
    }

    pub fn clear(&self) {
        let mut slots = self.slots.lock().unwrap();
        *slots = [None, None];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_start_absent() {
        let cache = LiveCache::new();
        assert!(cache.latest(DeviceRole::Upper).is_none());
        assert!(cache.latest_pair().is_none());
    }

    #[test]
    fn last_write_wins() {
        let cache = LiveCache::new();
        cache.publish(DeviceRole::Upper, Vec3::new(1.0, 0.0, 0.0));
        cache.publish(DeviceRole::Upper, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(
            cache.latest(DeviceRole::Upper),
            Some(Vec3::new(0.0, 1.0, 0.0))
        );
    }

    #[test]
    fn pair_needs_both_devices() {
        let cache = LiveCache::new();
        cache.publish(DeviceRole::Upper, Vec3::new(0.0, 0.0, 1.0));
        assert!(cache.latest_pair().is_none());
        cache.publish(DeviceRole::Lower, Vec3::new(0.0, 0.0, 1.0));
        assert!(cache.latest_pair().is_some());
    }

    #[test]
    fn clear_empties_both_slots() {
        let cache = LiveCache::new();
        cache.publish(DeviceRole::Upper, Vec3::new(0.0, 0.0, 1.0));
        cache.publish(DeviceRole::Lower, Vec3::new(0.0, 0.0, 1.0));
        cache.clear();
        assert!(cache.latest_pair().is_none());
    }

    #[test]
    fn role_tags_round_trip() {
        for role in DeviceRole::ALL {
            assert_eq!(DeviceRole::from_str(role.as_str()), Some(role));
        }
        assert_eq!(DeviceRole::from_str("Sideways"), None);
    }
}
