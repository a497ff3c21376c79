//! GPS frame parsing (grounded in `original_source/IGNU/Src/ins_gps.c`,
//! `ParseGpsPacket`). Every multi-byte field is copied byte-by-byte into
//! the destination type; the source never performs an unaligned pointer
//! cast, which the target platform would fault on (the GPS frame places
//! an `f64` at byte offset 10, never naturally aligned on its own).

use crate::config::{GPS_PACKET_SIZE, GPS_SYNC_WORD};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsRecord {
    pub tow: u32,
    pub wnc: u16,
    pub mode: u8,
    pub error: u8,
    pub lat: f64,
    pub lon: f64,
    pub height: f64,
    pub undulation: f32,
    pub vn: f32,
    pub ve: f32,
    pub vu: f32,
    pub gog: f32,
    pub rx_clk_bias: f64,
    pub rx_clk_drift: f32,
    pub n_sv: u8,
    pub h_acc: u16,
    pub v_acc: u16,
}

fn f64_le(buf: &[u8], at: usize) -> f64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[at..at + 8]);
    f64::from_le_bytes(b)
}

fn f32_le(buf: &[u8], at: usize) -> f32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&buf[at..at + 4]);
    f32::from_le_bytes(b)
}

fn u32_le(buf: &[u8], at: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&buf[at..at + 4]);
    u32::from_le_bytes(b)
}

fn u16_le(buf: &[u8], at: usize) -> u16 {
    let mut b = [0u8; 2];
    b.copy_from_slice(&buf[at..at + 2]);
    u16::from_le_bytes(b)
}

/// Parse one 91-byte raw GPS frame. Returns `None` if the sync word at
/// offsets 0..2 doesn't match.
pub fn parse_gps(buf: &[u8; GPS_PACKET_SIZE]) -> Option<GpsRecord> {
    if buf[0..2] != GPS_SYNC_WORD {
        return None;
    }

    Some(GpsRecord {
        tow: u32_le(buf, 2),
        wnc: u16_le(buf, 6),
        mode: buf[8],
        error: buf[9],
        lat: f64_le(buf, 10),
        lon: f64_le(buf, 18),
        height: f64_le(buf, 26),
        undulation: f32_le(buf, 34),
        vn: f32_le(buf, 38),
        ve: f32_le(buf, 42),
        vu: f32_le(buf, 46),
        gog: f32_le(buf, 50),
        rx_clk_bias: f64_le(buf, 54),
        rx_clk_drift: f32_le(buf, 62),
        n_sv: buf[68],
        h_acc: u16_le(buf, 84),
        v_acc: u16_le(buf, 86),
    })
}
