//! Board- and link-level constants: BRAM register map, ring dimensions, and
//! ground-link addressing. These were `#define`s in the original firmware;
//! here they're grouped so every protocol layer draws from one place.

/// Bytes per BRAM slot region (sized for the largest frame the PL ever
/// writes into a single slot: a full KISS/CSP/CCSDS ground-link frame).
pub const SLOT_BYTES: usize = 1528;

/// Number of ring-buffer slots behind each `RingBuffer`.
pub const N_SLOTS: usize = 16;

/// Depth of a PL-side BRAM packet ring (distinct from the PS-side
/// `RingBuffer`): how many frames the PL rotates through before wrapping
/// its write address back to the start of the region.
pub const GPS_BRAM_PACKET: u8 = 42;
pub const IMU_BRAM_PACKET: u8 = 42;
pub const UART_BRAM_PACKET: u8 = 10;

/// Control-word rollcount modulus for the PL write-index byte (always
/// 8-bit, wraps at 256 regardless of the per-slot packet depth).
pub const MAX_IDX: u16 = 256;

/// Raw sensor/command frame sizes.
pub const IMU_PACKET_SIZE: usize = 42;
pub const GPS_PACKET_SIZE: usize = 91;

pub const IMU_SYNC_BYTE: u8 = 0xA5;
pub const GPS_SYNC_WORD: [u8; 2] = [0x24, 0x40];

pub const ACCEL_SCALE_FACTOR: f32 = 524288.0; // 2^19
pub const GYRO_SCALE_FACTOR: f32 = 524288.0; // 2^19

/// KISS framing bytes.
pub const KISS_FEND: u8 = 0xC0;
pub const KISS_FESC: u8 = 0xDB;
pub const KISS_TFEND: u8 = 0xDC;
pub const KISS_TFESC: u8 = 0xDD;
pub const KISS_CMD_DATA: u8 = 0x00;
pub const MAX_KISS_BUF: usize = 1024;

/// CSP addressing: `CSP_MY_ADDR=6`, `CSP_PDHS_ADDR=19` -- the swapped
/// pair only ever appears commented out in the reference firmware.
pub const CSP_MY_ADDR: u8 = 6;
pub const CSP_PDHS_ADDR: u8 = 19;

pub const CSP_PORT_CMD_RX: u8 = 10;
pub const CSP_PORT_ASYNC_TX: u8 = 11;

pub const CSP_HEADER_SIZE: usize = 4;
pub const CSP_CRC32_SIZE: usize = 4;

/// CCSDS/PUS constants.
pub const CCSDS_APID_IGNU: u16 = 0x550;
pub const CCSDS_PRI_HEADER_SIZE: usize = 6;
pub const CCSDS_TC_SEC_HEADER_SIZE: usize = 4;
pub const CCSDS_TM_SEC_HEADER_SIZE: usize = 12;

pub const TM_ACK_VALID: u8 = 0xFF;
pub const TM_ACK_INVALID: u8 = 0x00;

pub const PUS_SVC_TEST: u8 = 1;
pub const PUS_SVC_HK: u8 = 5;
pub const PUS_SVC_FUNCTION: u8 = 8;
pub const PUS_SVC_DIAGNOSE: u8 = 20;

pub const PUS_SUB_TEST_START: u8 = 1;
pub const PUS_SUB_TEST_STOP: u8 = 2;
pub const PUS_SUB_TEST_SET_PARAM: u8 = 4;
pub const PUS_SUB_TEST_SEND_TPVAW: u8 = 5;
pub const PUS_SUB_TEST_DATA_MIN: u8 = 10;
pub const PUS_SUB_TEST_DATA_MAX: u8 = 127;

pub const PUS_SUB_HK_REQ: u8 = 1;
pub const PUS_SUB_FUNC_EXEC: u8 = 1;
pub const PUS_SUB_DIAG_PING: u8 = 1;
pub const PUS_SUB_DIAG_PONG: u8 = 1;

/// UART BRAM slot record: `{length: u32, bytes: [u8; _]}`, fixed total
/// region size regardless of payload length.
pub const UART_SLOT_SIZE: usize = 1528;

/// Number of UART TX channels this firmware muxes egress across. The
/// ground link lives on channel 1; additional channels are wired the
/// same way but otherwise idle in this configuration.
pub const N_UART_CHANNELS: usize = 2;

/// Ground-link UART channel (1-indexed, matching the register map's
/// per-channel stride arithmetic).
pub const GROUND_LINK_CHANNEL: usize = 1;

pub const TEST_DATA_SIZE: usize = 100;
pub const TPVAW_SIZE: usize = 108;

/// Task periods, in milliseconds.
pub mod periods {
    pub const GPS_DRAIN_MS: u32 = 1;
    pub const IMU_DRAIN_MS: u32 = 1;
    pub const UART_DRAIN_MS: u32 = 5;
    pub const UART_TX_MS: u32 = 5;
    pub const IGNU_RX_MS: u32 = 10;
    pub const IGNU_TX_MS: u32 = 1_000;
}

/// Each sensor BRAM frame embeds an IP-header-like length field ahead of
/// the payload; payload length is `total_length - IP_HEADER_SIZE`. The
/// field itself is a big-endian `u16` at `IP_TOTAL_LEN_OFFSET`.
pub const IP_HEADER_SIZE: usize = 28;
pub const IP_TOTAL_LEN_OFFSET: usize = 2;

/// RX slot assignment: which `regs::RX_SLOT_BASE` region each source
/// drains from (1-indexed, `(slot - 1)` stride arithmetic).
pub const GPS_SLOT: u32 = 1;
pub const IMU_SLOT: u32 = 2;
pub const UART_SLOT: u32 = 3;

/// PL register map (bit-exact).
pub mod regs {
    pub const PL_CMD: u32 = 0x4000_0000;
    pub const LVDS_TX_CMD: u32 = 0x4000_0010;
    pub const UART_TX_CMD: u32 = 0x4000_0020;

    pub const RX_SLOT_BASE: u32 = 0x4004_0000;
    pub const RX_SLOT_STRIDE: u32 = 0x0002_0000;

    pub const UART_TX_BASE: u32 = 0x4001_6000;
    pub const UART_TX_STRIDE: u32 = 0x0000_2000;

    pub const UART_CONF_BASE: u32 = 0x4000_0460;
    pub const UART_CONF_STRIDE: u32 = 0x20;

    pub const XADC_TEMP: u32 = 0x43C0_0200;

    /// PL write-in-progress sentinel value for a slot's status byte.
    pub const PL_BRAM_WR_STS: u8 = 0xFF;
}
