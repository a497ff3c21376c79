//! Component G: the CCSDS/PUS engine.
//!
//! Parses the CCSDS primary + PUS TC secondary header off a CSP
//! payload, dispatches on `(service, subtype)`, and builds the CCSDS
//! TM frame (primary + PUS TM secondary header + user data + CRC-16)
//! that answers it. The CRC here is CRC-16/CCITT-FALSE, the catalog
//! entry the `crc` crate ships as `CRC_16_IBM_3740` -- distinct from
//! the CRC-32C the CSP layer (`csp.rs`) trails its packets with.

use crc::{Crc, CRC_16_IBM_3740};
use heapless::Vec;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::command_state::{CommandState, STATE_IDLE, STATE_RUN};
use crate::config::{
    CCSDS_APID_IGNU, CCSDS_PRI_HEADER_SIZE, CCSDS_TC_SEC_HEADER_SIZE, CCSDS_TM_SEC_HEADER_SIZE,
    MAX_KISS_BUF, PUS_SUB_DIAG_PING, PUS_SUB_FUNC_EXEC, PUS_SUB_HK_REQ,
    PUS_SUB_TEST_DATA_MAX, PUS_SUB_TEST_DATA_MIN, PUS_SUB_TEST_SEND_TPVAW, PUS_SUB_TEST_SET_PARAM,
    PUS_SUB_TEST_START, PUS_SUB_TEST_STOP, PUS_SVC_DIAGNOSE, PUS_SVC_FUNCTION, PUS_SVC_HK,
    PUS_SVC_TEST, TM_ACK_INVALID, TM_ACK_VALID, TPVAW_SIZE,
};
use crate::snapshot::SensorSnapshot;
use crate::telemetry::TestData;
use crate::tpvaw::TpvawData;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Legacy placeholder payload for non-canonical `req_test_data`
/// subtypes (`11..=127`), grounded in `ProcReqTestData`'s
/// `memset(ucDummy, 0xAA, 16)`.
const LEGACY_TEST_DATA_PLACEHOLDER: [u8; 16] = [0xAA; 16];

/// `hk_req` payload, grounded in `ProcHkReq`'s `memset(ucDummy, 0x55, 4)`.
const HK_PLACEHOLDER: [u8; 4] = [0x55; 4];

/// PUS service identifiers this firmware answers, used to turn a raw
/// service byte into something `defmt::warn!`/`info!` can log by name
/// instead of by number. Dispatch itself still matches on the raw
/// `(u8, u8)` pair -- the full table (including the `other` fallback)
/// doesn't fit an exhaustive enum match as cleanly as a `match` ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Service {
    Test = PUS_SVC_TEST,
    Hk = PUS_SVC_HK,
    Function = PUS_SVC_FUNCTION,
    Diagnose = PUS_SVC_DIAGNOSE,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcHeader {
    pub apid: u16,
    pub service: u8,
    pub subtype: u8,
}

/// Parses a CCSDS TC packet (primary header + PUS TC secondary header)
/// off a CSP payload. Returns the header and the remaining user-data
/// slice. `None` if the packet is too short to hold both headers --
/// malformed input is discarded, never panicked on.
pub fn parse_tc(pkt: &[u8]) -> Option<(TcHeader, &[u8])> {
    let min_len = CCSDS_PRI_HEADER_SIZE + CCSDS_TC_SEC_HEADER_SIZE;
    if pkt.len() < min_len {
        return None;
    }

    let apid = (((pkt[0] as u16) & 0x07) << 8) | pkt[1] as u16;
    let sec = &pkt[CCSDS_PRI_HEADER_SIZE..min_len];
    let header = TcHeader {
        apid,
        service: sec[0],
        subtype: sec[1],
    };
    Some((header, &pkt[min_len..]))
}

/// Builds one complete CCSDS TM frame: primary header, PUS TM
/// secondary header, `user_data`, CRC-16/CCITT-FALSE trailer.
pub fn build_tm(service: u8, subtype: u8, user_data: &[u8]) -> Vec<u8, MAX_KISS_BUF> {
    let n = user_data.len();
    let packet_id: u16 = 0x0800 | CCSDS_APID_IGNU;
    let seq_ctrl: u16 = 0xC000;
    let length: u16 = (CCSDS_TM_SEC_HEADER_SIZE + n + 2 - 1) as u16;

    let mut out: Vec<u8, MAX_KISS_BUF> = Vec::new();
    let _ = out.extend_from_slice(&packet_id.to_be_bytes());
    let _ = out.extend_from_slice(&seq_ctrl.to_be_bytes());
    let _ = out.extend_from_slice(&length.to_be_bytes());

    let _ = out.push(service);
    let _ = out.push(subtype);
    let _ = out.extend_from_slice(&CCSDS_APID_IGNU.to_be_bytes());
    let _ = out.extend_from_slice(&[0u8; 6]); // time, unused
    let _ = out.push(0); // flags
    let _ = out.push(0); // spare

    let _ = out.extend_from_slice(user_data);

    let crc = CRC16.checksum(&out);
    let _ = out.extend_from_slice(&crc.to_be_bytes());
    out
}

fn build_ack(service: u8, subtype: u8, valid: bool) -> Vec<u8, MAX_KISS_BUF> {
    let ack = if valid { TM_ACK_VALID } else { TM_ACK_INVALID };
    build_tm(service, subtype, &[ack, 0, 0, 0])
}

/// Everything a dispatch needs to read or mutate.
pub struct PusContext<'a> {
    pub state: &'a CommandState,
    pub snapshot: &'a SensorSnapshot,
    pub tpvaw: &'a mut Option<TpvawData>,
}

/// Dispatches one parsed TC, returning the CCSDS TM/Ack frame to send
/// back (already CRC-16 terminated; the caller CSP-wraps and
/// KISS-encodes it). `user_data` is whatever user-data bytes followed
/// the TC secondary header.
pub fn dispatch(header: TcHeader, user_data: &[u8], ctx: &mut PusContext) -> Vec<u8, MAX_KISS_BUF> {
    match (header.service, header.subtype) {
        (PUS_SVC_TEST, PUS_SUB_TEST_START) => {
            ctx.state.set(STATE_RUN);
            build_ack(header.service, header.subtype, true)
        }
        (PUS_SVC_TEST, PUS_SUB_TEST_STOP) => {
            ctx.state.set(STATE_IDLE);
            build_ack(header.service, header.subtype, true)
        }
        (PUS_SVC_TEST, PUS_SUB_TEST_SET_PARAM) => {
            // No test parameters are defined yet (ICD placeholder);
            // accept and ack regardless of payload content.
            build_ack(header.service, header.subtype, true)
        }
        (PUS_SVC_TEST, PUS_SUB_TEST_SEND_TPVAW) => {
            let valid = user_data.len() >= TPVAW_SIZE;
            if valid {
                let buf: [u8; TPVAW_SIZE] = user_data[..TPVAW_SIZE].try_into().unwrap();
                *ctx.tpvaw = Some(TpvawData::parse(&buf));
            }
            build_ack(header.service, header.subtype, valid)
        }
        (PUS_SVC_TEST, sub) if (PUS_SUB_TEST_DATA_MIN..=PUS_SUB_TEST_DATA_MAX).contains(&sub) => {
            req_test_data(sub, ctx.snapshot)
        }
        (PUS_SVC_HK, PUS_SUB_HK_REQ) => build_tm(PUS_SVC_HK, PUS_SUB_HK_REQ, &HK_PLACEHOLDER),
        (PUS_SVC_FUNCTION, PUS_SUB_FUNC_EXEC) => {
            build_ack(header.service, header.subtype, true)
        }
        (PUS_SVC_DIAGNOSE, PUS_SUB_DIAG_PING) => {
            build_tm(PUS_SVC_DIAGNOSE, PUS_SUB_DIAG_PING, &[TM_ACK_VALID, 0, 0, 0])
        }
        _ => build_ack(header.service, header.subtype, false),
    }
}

/// `req_test_data(sub)`: the canonical subtype (10) echoes the live
/// `TestData` record; every other reserved subtype in `11..=127`
/// returns the original's legacy 16-byte placeholder.
fn req_test_data(sub: u8, snapshot: &SensorSnapshot) -> Vec<u8, MAX_KISS_BUF> {
    if sub == PUS_SUB_TEST_DATA_MIN {
        let td = TestData::from_snapshot(snapshot);
        build_tm(PUS_SVC_TEST, sub, &td.to_bytes())
    } else {
        build_tm(PUS_SVC_TEST, sub, &LEGACY_TEST_DATA_PLACEHOLDER)
    }
}

/// Used by the telemetry scheduler (#4.H): a periodic push of the live
/// `TestData` record as a complete `(svc=1, sub=10)` TM frame, with no
/// preceding TC to answer.
pub fn build_periodic_test_data_tm(snapshot: &SensorSnapshot) -> Vec<u8, MAX_KISS_BUF> {
    req_test_data(PUS_SUB_TEST_DATA_MIN, snapshot)
}
