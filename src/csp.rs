//! Component F: the CSP routing layer.
//!
//! A 4-byte bit-packed header plus a CRC-32C trailer. The header's
//! sub-byte fields (`prio`/`dest`/`src`/`dport`/`sport`) are a natural fit
//! for `packed_struct`'s bit-range derive (see `CspHeaderBits`, grounded
//! on the bit-packed register structs in
//! `examples/oxidecomputer-hubris/nxp-structs`); the CRC-32C trailer uses
//! the same `crc` crate the CCSDS layer uses for its CRC-16.

use crc::{Crc, CRC_32_ISCSI};
use heapless::Vec;
use packed_struct::prelude::*;

use crate::config::{CSP_CRC32_SIZE, CSP_HEADER_SIZE, CSP_MY_ADDR, CSP_PORT_CMD_RX, MAX_KISS_BUF};

/// CRC-32C: polynomial 0x82F63B78, reflected, init/xorout 0xFFFFFFFF --
/// the Castagnoli variant the `crc` crate ships as `CRC_32_ISCSI`.
const CRC32C: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);

#[derive(PackedStruct, Debug, Clone, Copy, PartialEq, Eq)]
#[packed_struct(size_bytes = "4", bit_numbering = "msb0")]
pub struct CspHeaderBits {
    #[packed_field(bits = "0..=1")]
    pub prio: Integer<u8, packed_bits::Bits2>,
    #[packed_field(bits = "2..=6")]
    pub dest: Integer<u8, packed_bits::Bits5>,
    #[packed_field(bits = "7..=11")]
    pub src: Integer<u8, packed_bits::Bits5>,
    #[packed_field(bits = "12..=17")]
    pub dport: Integer<u8, packed_bits::Bits6>,
    #[packed_field(bits = "18..=23")]
    pub sport: Integer<u8, packed_bits::Bits6>,
    #[packed_field(bits = "24..=31")]
    pub flags: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CspHeader {
    pub prio: u8,
    pub dest: u8,
    pub src: u8,
    pub dport: u8,
    pub sport: u8,
    pub flags: u8,
}

impl CspHeader {
    pub fn to_bytes(self) -> [u8; CSP_HEADER_SIZE] {
        CspHeaderBits {
            prio: self.prio.into(),
            dest: self.dest.into(),
            src: self.src.into(),
            dport: self.dport.into(),
            sport: self.sport.into(),
            flags: self.flags,
        }
        .pack()
        .expect("4-byte packed header always packs")
    }

    pub fn from_bytes(bytes: &[u8; CSP_HEADER_SIZE]) -> Option<Self> {
        let bits = CspHeaderBits::unpack(bytes).ok()?;
        Some(Self {
            prio: bits.prio.into(),
            dest: bits.dest.into(),
            src: bits.src.into(),
            dport: bits.dport.into(),
            sport: bits.sport.into(),
            flags: bits.flags,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CspError {
    TooShort,
    CrcMismatch,
    WrongDestination,
}

/// Receive one CSP packet out of `pkt` (header + payload + CRC-32C
/// trailer). Returns the header and the payload slice (between header and
/// trailer) if accepted.
pub fn csp_receive(pkt: &[u8]) -> Result<(CspHeader, &[u8]), CspError> {
    if pkt.len() < CSP_HEADER_SIZE + CSP_CRC32_SIZE {
        return Err(CspError::TooShort);
    }

    let body_len = pkt.len() - CSP_CRC32_SIZE;
    let (body, trailer) = pkt.split_at(body_len);

    let expected = u32::from_be_bytes(trailer.try_into().unwrap());
    let actual = CRC32C.checksum(body);
    if actual != expected {
        return Err(CspError::CrcMismatch);
    }

    let header_bytes: [u8; CSP_HEADER_SIZE] = body[..CSP_HEADER_SIZE].try_into().unwrap();
    let header = CspHeader::from_bytes(&header_bytes).ok_or(CspError::TooShort)?;
    if header.dest != CSP_MY_ADDR {
        return Err(CspError::WrongDestination);
    }

    Ok((header, &body[CSP_HEADER_SIZE..]))
}

/// Returns `true` if `dport` is a port this firmware's CSP layer
/// dispatches locally (the command-receive port); every other `dport` is
/// silently dropped by the caller.
pub fn is_local_dport(dport: u8) -> bool {
    dport == CSP_PORT_CMD_RX
}

/// Build a complete CSP packet (header + `data` + CRC-32C trailer) for
/// transmission, ready for KISS-encoding. Every outbound packet this
/// firmware ever sends originates from this device, on its one
/// command-receive port -- `src`/`sport` are therefore always
/// `CSP_MY_ADDR`/`CSP_PORT_CMD_RX`, never values copied off whatever
/// packet is being answered.
pub fn csp_send(dest: u8, dport: u8, data: &[u8]) -> Vec<u8, MAX_KISS_BUF> {
    let header = CspHeader {
        prio: 2,
        dest,
        src: CSP_MY_ADDR,
        dport,
        sport: CSP_PORT_CMD_RX,
        flags: 0,
    };

    let mut out: Vec<u8, MAX_KISS_BUF> = Vec::new();
    let _ = out.extend_from_slice(&header.to_bytes());
    let _ = out.extend_from_slice(data);

    let crc = CRC32C.checksum(&out);
    let _ = out.extend_from_slice(&crc.to_be_bytes());
    out
}
