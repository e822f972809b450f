use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::DeviceRole;
use crate::frame::SensorFrame;

/// One contiguous acquisition run. Created once at start, appended to for
/// its lifetime, stopped exactly once. Never deleted by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn begin(id: String, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            started_at,
            stopped_at: None,
            created_at: started_at,
        }
    }
}

/// A decoded frame tagged with its device identity and session-relative
/// time, the unit persisted to the session store.
#[derive(Debug, Clone)]
pub struct SensorSample {
    pub session_id: String,
    pub role: DeviceRole,
    /// Session-relative time in device timer units, non-decreasing per
    /// device within a run.
    pub time: u32,
    pub frame: SensorFrame,
}

impl SensorSample {
    pub fn new(session_id: String, role: DeviceRole, time: u32, frame: SensorFrame) -> Self {
        Self {
            session_id,
            role,
            time,
            frame,
        }
    }
}
