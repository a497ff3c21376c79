//! Component H: the telemetry scheduler and its `TestData` record.
//!
//! `TestData` mixes floats with integers throughout, which rules out
//! `packed_struct` the same way `GpsRecord` did (see `sensors/gps.rs`):
//! this is a manual little-endian byte-copy layout, field by field.

use crate::config::TEST_DATA_SIZE;
use crate::snapshot::SensorSnapshot;

/// The 100-byte ICD record this firmware emits at 1 Hz while running,
/// and echoes on-demand for `req_test_data(10)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestData {
    pub gps_week: u32,
    pub gps_time: u32,
    pub lat: f64,
    pub lon: f64,
    pub alt: f32,
    pub vel_n: f32,
    pub vel_e: f32,
    pub vel_u: f32,
    pub mode: u8,
    pub error: u8,
    pub n_sv: u8,
    pub mean_gyro: [f32; 3],
    pub mean_accel: [f32; 3],
    pub roll_pitch_yaw: [f32; 3],
}

impl TestData {
    /// Builds a record from the latest sensor snapshot. Fields with no
    /// current reading (no GPS/IMU frame parsed yet) are zeroed --
    /// there is no "stale but valid" distinction at this layer, only
    /// "a reading has arrived or it hasn't".
    pub fn from_snapshot(snap: &SensorSnapshot) -> Self {
        let (gps_week, gps_time, lat, lon, alt, vel_n, vel_e, vel_u, mode, error, n_sv) =
            match &snap.gps {
                Some(g) => (
                    g.wnc as u32,
                    g.tow,
                    g.lat,
                    g.lon,
                    g.height as f32,
                    g.vn,
                    g.ve,
                    g.vu,
                    g.mode,
                    g.error,
                    g.n_sv,
                ),
                None => (0, 0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0, 0, 0),
            };

        let (mean_gyro, mean_accel) = match &snap.imu {
            Some(i) => (i.gyro_xyz, i.accel_xyz),
            None => ([0.0; 3], [0.0; 3]),
        };

        Self {
            gps_week,
            gps_time,
            lat,
            lon,
            alt,
            vel_n,
            vel_e,
            vel_u,
            mode,
            error,
            n_sv,
            mean_gyro,
            mean_accel,
            // No attitude solution is computed (Non-goal): the ICD's
            // byte slots are always zero-filled placeholders.
            roll_pitch_yaw: [0.0; 3],
        }
    }

    pub fn to_bytes(&self) -> [u8; TEST_DATA_SIZE] {
        let mut out = [0u8; TEST_DATA_SIZE];
        out[0..4].copy_from_slice(&self.gps_week.to_le_bytes());
        out[4..8].copy_from_slice(&self.gps_time.to_le_bytes());
        out[8..16].copy_from_slice(&self.lat.to_le_bytes());
        out[16..24].copy_from_slice(&self.lon.to_le_bytes());
        out[24..28].copy_from_slice(&self.alt.to_le_bytes());
        out[28..32].copy_from_slice(&self.vel_n.to_le_bytes());
        out[32..36].copy_from_slice(&self.vel_e.to_le_bytes());
        out[36..40].copy_from_slice(&self.vel_u.to_le_bytes());
        out[40] = self.mode;
        out[41] = self.error;
        out[42] = self.n_sv;
        out[43] = 0;
        for (i, v) in self.mean_gyro.iter().enumerate() {
            out[44 + i * 4..48 + i * 4].copy_from_slice(&v.to_le_bytes());
        }
        for (i, v) in self.mean_accel.iter().enumerate() {
            out[56 + i * 4..60 + i * 4].copy_from_slice(&v.to_le_bytes());
        }
        for (i, v) in self.roll_pitch_yaw.iter().enumerate() {
            out[68 + i * 4..72 + i * 4].copy_from_slice(&v.to_le_bytes());
        }
        // bytes 80..100: reserved, already zero.
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::{GpsRecord, ImuRecord};

    #[test]
    fn empty_snapshot_yields_zeroed_record() {
        let snap = SensorSnapshot::new();
        let td = TestData::from_snapshot(&snap);
        assert_eq!(td.to_bytes(), [0u8; TEST_DATA_SIZE]);
    }

    #[test]
    fn record_is_exactly_100_bytes() {
        let snap = SensorSnapshot::new();
        let td = TestData::from_snapshot(&snap);
        assert_eq!(td.to_bytes().len(), 100);
    }

    #[test]
    fn populated_snapshot_round_trips_into_layout() {
        let mut snap = SensorSnapshot::new();
        snap.update_imu(ImuRecord {
            gyro_xyz: [1.5, -2.5, 3.5],
            accel_xyz: [0.0, 0.0, -16.0],
            counter: 1,
        });
        snap.update_gps(GpsRecord {
            tow: 123_456,
            wnc: 2200,
            mode: 3,
            error: 0,
            lat: 45.0,
            lon: -122.0,
            height: 100.0,
            undulation: 0.0,
            vn: 1.0,
            ve: 2.0,
            vu: 3.0,
            gog: 0.0,
            rx_clk_bias: 0.0,
            rx_clk_drift: 0.0,
            n_sv: 9,
            h_acc: 0,
            v_acc: 0,
        });

        let td = TestData::from_snapshot(&snap);
        let bytes = td.to_bytes();
        assert_eq!(u32::from_le_bytes(bytes[0..4].try_into().unwrap()), 2200);
        assert_eq!(bytes[42], 9);
        assert_eq!(
            f32::from_le_bytes(bytes[56..60].try_into().unwrap()),
            0.0
        );
        assert_eq!(
            f32::from_le_bytes(bytes[64..68].try_into().unwrap()),
            -16.0
        );
        // Attitude placeholders always zero.
        assert_eq!(bytes[68..80], [0u8; 12]);
    }
}
