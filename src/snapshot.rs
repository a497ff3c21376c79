//! Component D: the sensor snapshot.
//!
//! Holds the latest-known-good `ImuRecord`/`GpsRecord`. Rather than a
//! hand-rolled seqlock, the snapshot lives as an RTIC `#[shared]`
//! resource: RTIC's `lock()` *is* a short critical section, with a
//! statically-enforced guarantee that no task holds it across a
//! suspension point, enforced by the framework instead of by
//! convention.

use crate::sensors::{GpsRecord, ImuRecord};

#[derive(Debug, Clone, Copy, Default)]
pub struct SensorSnapshot {
    pub imu: Option<ImuRecord>,
    pub gps: Option<GpsRecord>,
}

impl SensorSnapshot {
    pub const fn new() -> Self {
        Self {
            imu: None,
            gps: None,
        }
    }

    pub fn update_imu(&mut self, rec: ImuRecord) {
        self.imu = Some(rec);
    }

    pub fn update_gps(&mut self, rec: GpsRecord) {
        self.gps = Some(rec);
    }
}
