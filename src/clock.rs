//! Per-device timestamp normalization.
//!
//! Each device carries a free-running 32-bit timer. The first decoded
//! frame of a run fixes that device's zero offset; every later sample is
//! reported relative to it. The two devices are normalized independently,
//! so cross-device alignment is only as good as the skew between their
//! connection handshakes.

/// Session-relative timer baseline for one device's read loop.
///
/// State lives for the duration of one acquisition run; a new run gets a
/// fresh baseline. Timer wraparound past `u32::MAX` folds through
/// `wrapping_sub`, which keeps short wraps monotonic but is not a general
/// overflow treatment.
#[derive(Debug, Default)]
pub struct TimerBaseline {
    offset: Option<u32>,
}

impl TimerBaseline {
    pub fn new() -> Self {
        Self { offset: None }
    }

    /// Normalize a raw timer value. The first call fixes the offset at
    /// that value and returns 0; later calls are unaffected by it.
    pub fn normalize(&mut self, raw: u32) -> u32 {
        let offset = *self.offset.get_or_insert(raw);
        raw.wrapping_sub(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_becomes_zero() {
        let mut baseline = TimerBaseline::new();
        assert_eq!(baseline.normalize(5_000), 0);
    }

    #[test]
    fn sequence_is_offset_by_first_value() {
        let mut baseline = TimerBaseline::new();
        let raws = [1_000u32, 1_050, 1_100, 1_275];
        let normalized: Vec<u32> = raws.iter().map(|&t| baseline.normalize(t)).collect();
        assert_eq!(normalized, vec![0, 50, 100, 275]);
    }

    #[test]
    fn offset_is_not_moved_by_later_samples() {
        let mut baseline = TimerBaseline::new();
        baseline.normalize(200);
        baseline.normalize(900);
        assert_eq!(baseline.normalize(1_200), 1_000);
    }

    #[test]
    fn independent_baselines_do_not_interact() {
        let mut upper = TimerBaseline::new();
        let mut lower = TimerBaseline::new();
        assert_eq!(upper.normalize(10), 0);
        assert_eq!(lower.normalize(5_000), 0);
        assert_eq!(upper.normalize(60), 50);
        assert_eq!(lower.normalize(5_050), 50);
    }

    #[test]
    fn wraparound_folds_through_wrapping_sub() {
        let mut baseline = TimerBaseline::new();
        baseline.normalize(u32::MAX - 9);
        assert_eq!(baseline.normalize(10), 20);
    }
}
