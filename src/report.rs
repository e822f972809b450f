//! Offline angle series for recorded sessions.
//!
//! The external chart tool reads `(time, acc_x, acc_y, acc_z, imu_name)`
//! ordered by time and recomputes the inter-sensor angle per Upper/Lower
//! pair. The formula here is the same unit-vector dot product the live
//! engine uses, so the two views stay numerically consistent.

use anyhow::Result;

use crate::cache::DeviceRole;
use crate::db::{AccelerationRow, Database};
use crate::posture::{classify, PostureState};
use crate::vector::{angle_between_degrees, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnglePoint {
    /// Session-relative time of the Upper sample in the pair.
    pub time: f64,
    pub angle: f32,
}

/// Pair Upper and Lower rows in time order and compute the angle between
/// their unit acceleration vectors. Rows whose acceleration has no
/// direction are dropped, mirroring the live cache policy.
pub fn angle_series(rows: &[AccelerationRow]) -> Vec<AnglePoint> {
    let usable = |row: &&AccelerationRow| Vec3::from_array(row.acc).normalized().is_some();
    let upper: Vec<&AccelerationRow> = rows
        .iter()
        .filter(|row| row.role == DeviceRole::Upper)
        .filter(usable)
        .collect();
    let lower: Vec<&AccelerationRow> = rows
        .iter()
        .filter(|row| row.role == DeviceRole::Lower)
        .filter(usable)
        .collect();

    upper
        .iter()
        .zip(lower.iter())
        .filter_map(|(u, l)| {
            let angle =
                angle_between_degrees(&Vec3::from_array(u.acc), &Vec3::from_array(l.acc))?;
            Some(AnglePoint {
                time: u.time,
                angle,
            })
        })
        .collect()
}

pub async fn session_angle_series(db: &Database, session_id: &str) -> Result<Vec<AnglePoint>> {
    let rows = db.samples_for_session(session_id).await?;
    Ok(angle_series(&rows))
}

/// Per-state tallies over a recorded series, with the headline
/// bad-posture percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PostureSummary {
    pub good: usize,
    pub warning: usize,
    pub bad: usize,
}

impl PostureSummary {
    pub fn from_series(series: &[AnglePoint]) -> Self {
        let mut summary = Self::default();
        for point in series {
            match classify(point.angle) {
                PostureState::Good => summary.good += 1,
                PostureState::Warning => summary.warning += 1,
                PostureState::Bad => summary.bad += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.good + self.warning + self.bad
    }

    pub fn bad_percentage(&self) -> f32 {
        if self.total() == 0 {
            return 0.0;
        }
        self.bad as f32 / self.total() as f32 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: DeviceRole, time: f64, acc: [f32; 3]) -> AccelerationRow {
        AccelerationRow { time, acc, role }
    }

    #[test]
    fn pairs_upper_and_lower_in_order() {
        let rows = [
            row(DeviceRole::Upper, 0.0, [0.0, 0.0, 1.0]),
            row(DeviceRole::Lower, 0.0, [0.0, 0.0, 1.0]),
            row(DeviceRole::Upper, 50.0, [0.0, 1.0, 0.0]),
            row(DeviceRole::Lower, 50.0, [0.0, 0.0, 1.0]),
        ];

        let series = angle_series(&rows);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].time, 0.0);
        assert!(series[0].angle.abs() < 1e-3);
        assert!((series[1].angle - 90.0).abs() < 1e-3);
    }

    #[test]
    fn unpaired_tail_is_dropped() {
        let rows = [
            row(DeviceRole::Upper, 0.0, [0.0, 0.0, 1.0]),
            row(DeviceRole::Lower, 0.0, [0.0, 0.0, 1.0]),
            row(DeviceRole::Upper, 50.0, [0.0, 0.0, 1.0]),
        ];
        assert_eq!(angle_series(&rows).len(), 1);
    }

    #[test]
    fn directionless_rows_are_skipped() {
        let rows = [
            row(DeviceRole::Upper, 0.0, [0.0, 0.0, 0.0]),
            row(DeviceRole::Lower, 0.0, [0.0, 0.0, 1.0]),
            row(DeviceRole::Upper, 50.0, [0.0, 0.0, 1.0]),
            row(DeviceRole::Lower, 50.0, [0.0, 0.0, 1.0]),
        ];

        // The zero-norm Upper row is dropped, so the 50.0 Upper sample
        // pairs with the first Lower sample.
        let series = angle_series(&rows);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].time, 50.0);
    }

    #[test]
    fn summary_counts_and_percentage() {
        let series = [
            AnglePoint { time: 0.0, angle: 5.0 },
            AnglePoint { time: 1.0, angle: 17.0 },
            AnglePoint { time: 2.0, angle: 30.0 },
            AnglePoint { time: 3.0, angle: 45.0 },
        ];
        let summary = PostureSummary::from_series(&series);
        assert_eq!(summary.good, 1);
        assert_eq!(summary.warning, 1);
        assert_eq!(summary.bad, 2);
        assert!((summary.bad_percentage() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn empty_series_has_zero_percentage() {
        let summary = PostureSummary::from_series(&[]);
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.bad_percentage(), 0.0);
    }
}
