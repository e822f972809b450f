//! Fixed-format binary telemetry frame.
//!
//! Each poll of the sensor characteristic yields exactly 50 bytes,
//! little-endian:
//!
//! | Bytes  | Field                                   |
//! |--------|-----------------------------------------|
//! | 0-11   | acceleration, 3 x f32                   |
//! | 12-23  | angular rate, 3 x f32                   |
//! | 24-27  | free-running device timer, u32          |
//! | 28-39  | orientation (heading, pitch, roll), f32 |
//! | 40-43  | step count, u32                         |
//! | 44-49  | reserved                                |

use crate::error::TelemetryError;

/// Wire size of one telemetry frame.
pub const FRAME_LEN: usize = 50;

/// One decoded telemetry frame. Immutable once produced; values are not
/// range-checked beyond the length precondition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorFrame {
    pub acc: [f32; 3],
    pub gyro: [f32; 3],
    /// Free-running device timer, device-local units.
    pub timer: u32,
    /// Device-reported heading, pitch, roll.
    pub orientation: [f32; 3],
    pub steps: u32,
}

fn read_f32(buf: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn read_vec3(buf: &[u8], offset: usize) -> [f32; 3] {
    [
        read_f32(buf, offset),
        read_f32(buf, offset + 4),
        read_f32(buf, offset + 8),
    ]
}

impl SensorFrame {
    /// Decode a raw characteristic payload. Fails with `MalformedFrame`
    /// unless the buffer is exactly [`FRAME_LEN`] bytes.
    pub fn decode(buf: &[u8]) -> Result<SensorFrame, TelemetryError> {
        if buf.len() != FRAME_LEN {
            return Err(TelemetryError::MalformedFrame {
                len: buf.len(),
                expected: FRAME_LEN,
            });
        }

        Ok(SensorFrame {
            acc: read_vec3(buf, 0),
            gyro: read_vec3(buf, 12),
            timer: read_u32(buf, 24),
            orientation: read_vec3(buf, 28),
            steps: read_u32(buf, 40),
        })
    }

    /// Encode into the wire layout. Reserved bytes 44-49 are zeroed.
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        fn write_vec3(buf: &mut [u8; FRAME_LEN], offset: usize, v: &[f32; 3]) {
            for (i, component) in v.iter().enumerate() {
                buf[offset + i * 4..offset + i * 4 + 4].copy_from_slice(&component.to_le_bytes());
            }
        }

        let mut buf = [0u8; FRAME_LEN];
        write_vec3(&mut buf, 0, &self.acc);
        write_vec3(&mut buf, 12, &self.gyro);
        buf[24..28].copy_from_slice(&self.timer.to_le_bytes());
        write_vec3(&mut buf, 28, &self.orientation);
        buf[40..44].copy_from_slice(&self.steps.to_le_bytes());
        buf
    }
}
