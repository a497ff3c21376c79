//! Real peripheral bindings for the `BramSource`/`UartBramSource`/
//! `UartTxSink` traits (`bram.rs`, `egress.rs`), implemented as direct
//! volatile reads/writes at the addresses in `config::regs` -- there is
//! no vendor PAC for this fabric-defined register map (see `pac.rs`).
//!
//! Every access here is `unsafe` for the same reason a `stm32_hal2`
//! register write is: the address is asserted correct by the board's
//! memory map, not checked by the type system. Kept to raw pointer
//! reads/writes of plain integers -- no pointer casts onto multi-byte
//! fields at unaligned offsets (see `sensors/mod.rs`'s note on the same
//! hazard one layer up).

use crate::bram::{BramSource, ControlWord, UartBramSource};
use crate::config::{regs, SLOT_BYTES};
use crate::egress::UartTxSink;

unsafe fn read_u8(addr: u32) -> u8 {
    core::ptr::read_volatile(addr as *const u8)
}

unsafe fn read_u32(addr: u32) -> u32 {
    core::ptr::read_volatile(addr as *const u32)
}

unsafe fn write_u32(addr: u32, value: u32) {
    core::ptr::write_volatile(addr as *mut u32, value)
}

/// One sensor RX slot region: `regs::RX_SLOT_BASE + RX_SLOT_STRIDE *
/// (slot - 1)`, `SLOT_BYTES`-wide frame records, control word in the
/// last 4 bytes of the region.
pub struct RxSlot {
    base: u32,
    region_size: u32,
}

impl RxSlot {
    pub const fn new(slot: u32) -> Self {
        let region_size = regs::RX_SLOT_STRIDE;
        Self {
            base: regs::RX_SLOT_BASE + region_size * (slot - 1),
            region_size,
        }
    }

    fn control_addr(&self) -> u32 {
        self.base + self.region_size - 4
    }
}

impl BramSource for RxSlot {
    fn control_word(&self) -> ControlWord {
        let word = unsafe { read_u32(self.control_addr()) };
        let bytes = word.to_le_bytes();
        ControlWord {
            write_addr: bytes[0] as u16,
            write_index: bytes[1],
        }
    }

    fn read_frame(&self, addr: u16) -> [u8; SLOT_BYTES] {
        let mut out = [0u8; SLOT_BYTES];
        let start = self.base + addr as u32 * SLOT_BYTES as u32;
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = unsafe { read_u8(start + i as u32) };
        }
        out
    }
}

impl UartBramSource for RxSlot {
    fn control_word(&self) -> (u16, bool) {
        let word = unsafe { read_u32(self.control_addr()) };
        let bytes = word.to_le_bytes();
        (bytes[0] as u16, bytes[3] == regs::PL_BRAM_WR_STS)
    }

    fn read_record(&self, addr: u16) -> ([u8; 4], [u8; SLOT_BYTES - 4]) {
        let start = self.base + addr as u32 * SLOT_BYTES as u32;
        let mut len_bytes = [0u8; 4];
        for (i, b) in len_bytes.iter_mut().enumerate() {
            *b = unsafe { read_u8(start + i as u32) };
        }
        let mut bytes = [0u8; SLOT_BYTES - 4];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = unsafe { read_u8(start + 4 + i as u32) };
        }
        (len_bytes, bytes)
    }
}

/// One UART TX region: `regs::UART_TX_BASE + UART_TX_STRIDE * (ch - 1)`,
/// `{len: u32_le, bytes: [u8; len]}`. Submitting a frame writes the
/// record, then raises the channel's bit in `UART_TX_CMD`.
pub struct UartTxChannel {
    base: u32,
    channel: u32,
}

impl UartTxChannel {
    pub const fn new(channel: u32) -> Self {
        Self {
            base: regs::UART_TX_BASE + regs::UART_TX_STRIDE * (channel - 1),
            channel,
        }
    }
}

impl UartTxSink for UartTxChannel {
    fn is_busy(&self) -> bool {
        let cmd = unsafe { read_u32(regs::UART_TX_CMD) };
        (cmd >> (self.channel - 1)) & 1 != 0
    }

    fn submit(&mut self, frame: &[u8]) {
        let len = frame.len() as u32;
        unsafe {
            write_u32(self.base, len);
            for (i, &b) in frame.iter().enumerate() {
                core::ptr::write_volatile((self.base + 4 + i as u32) as *mut u8, b);
            }
            let cmd = read_u32(regs::UART_TX_CMD);
            write_u32(regs::UART_TX_CMD, cmd | (1 << (self.channel - 1)));
        }
    }
}
