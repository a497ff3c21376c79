//! The `save_tpvaw` payload (Svc 1 Sub 5), restored from
//! `original_source/IGNU/Inc/TMTC.h`.
//!
//! A 108-byte little-endian record pushed down from the PDHS: two
//! timestamps, a position and velocity 3-vector (all `f64`), four
//! status words, a quaternion, and three reserved `i32`s. This
//! firmware has no fusion filter to feed it into and no persistent
//! storage (Non-goals) -- it exists purely so the telecommand has a
//! defined, byte-correct effect: store the most recent value and ack.

use crate::config::TPVAW_SIZE;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TpvawData {
    pub t_valid: f64,
    pub t_transmit: f64,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub status: [i32; 4],
    pub quaternion: [f32; 4],
    pub reserved: [i32; 3],
}

impl TpvawData {
    /// Parses a 108-byte little-endian record. This is a fixed-layout
    /// ground-commanded payload, not a self-describing frame -- there
    /// is no sync word to check; any buffer of the right length is
    /// accepted.
    pub fn parse(buf: &[u8; TPVAW_SIZE]) -> Self {
        let f64_at = |o: usize| f64::from_le_bytes(buf[o..o + 8].try_into().unwrap());
        let f32_at = |o: usize| f32::from_le_bytes(buf[o..o + 4].try_into().unwrap());
        let i32_at = |o: usize| i32::from_le_bytes(buf[o..o + 4].try_into().unwrap());

        Self {
            t_valid: f64_at(0),
            t_transmit: f64_at(8),
            position: [f64_at(16), f64_at(24), f64_at(32)],
            velocity: [f64_at(40), f64_at(48), f64_at(56)],
            status: [i32_at(64), i32_at(68), i32_at(72), i32_at(76)],
            quaternion: [f32_at(80), f32_at(84), f32_at(88), f32_at(92)],
            reserved: [i32_at(96), i32_at(100), i32_at(104)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> [u8; TPVAW_SIZE] {
        let mut buf = [0u8; TPVAW_SIZE];
        buf[0..8].copy_from_slice(&100.0_f64.to_le_bytes());
        buf[8..16].copy_from_slice(&100.5_f64.to_le_bytes());
        buf[16..24].copy_from_slice(&1.0_f64.to_le_bytes());
        buf[24..32].copy_from_slice(&2.0_f64.to_le_bytes());
        buf[32..40].copy_from_slice(&3.0_f64.to_le_bytes());
        buf[64..68].copy_from_slice(&7i32.to_le_bytes());
        buf[80..84].copy_from_slice(&1.0_f32.to_le_bytes());
        buf
    }

    #[test]
    fn parses_fixed_layout() {
        let rec = TpvawData::parse(&sample());
        assert_eq!(rec.t_valid, 100.0);
        assert_eq!(rec.t_transmit, 100.5);
        assert_eq!(rec.position, [1.0, 2.0, 3.0]);
        assert_eq!(rec.status[0], 7);
        assert_eq!(rec.quaternion[0], 1.0);
    }

    #[test]
    fn accepts_all_zero_buffer() {
        let rec = TpvawData::parse(&[0u8; TPVAW_SIZE]);
        assert_eq!(rec.position, [0.0, 0.0, 0.0]);
    }
}
