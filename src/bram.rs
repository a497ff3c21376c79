//! Component A: BRAM ring drain.
//!
//! Reads the PL's published `(write_index, write_addr)` control word for
//! a slot, diffs it against the last-seen values, and drains any newly
//! written frames into a `RingBuffer` (B). Two variants: sensor slots
//! track both an 8-bit rollcount and a byte address (desync is detected
//! when they disagree); UART slots track only the address, since the PL
//! never publishes a rollcount for them (`UartBramRead` in the original).
//!
//! Hardware access is behind the `BramSource`/`UartBramSource` traits so
//! the drain/desync logic can run against a fixed in-memory double under
//! test; the real implementation is a set of volatile reads at the
//! addresses in `config::regs`.

use crate::config::{IP_HEADER_SIZE, IP_TOTAL_LEN_OFFSET, MAX_IDX, SLOT_BYTES};
use crate::ring::RingBuffer;

/// Tracks the last-observed `(write_index, write_addr)` for one sensor
/// BRAM slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotCursor {
    last_index: u8,
    last_addr: u16,
}

impl SlotCursor {
    pub const fn new() -> Self {
        Self {
            last_index: 0,
            last_addr: 0,
        }
    }
}

/// Tracks the last-observed write address for one UART BRAM slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct UartCursor {
    last_addr: u16,
}

impl UartCursor {
    pub const fn new() -> Self {
        Self { last_addr: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// `n` frames were read out of the slot and handed to the ring.
    Drained(u16),
    /// Index/address rollcounts disagreed; cursor reset to the current
    /// published values and this cycle's frames skipped -- a hardware
    /// desync, recovered locally rather than escalated.
    Desynced,
    /// No new data since the last poll.
    Idle,
}

/// One published BRAM slot control word: the PL's view of how far it has
/// written into the region.
#[derive(Debug, Clone, Copy)]
pub struct ControlWord {
    pub write_index: u8,
    pub write_addr: u16,
}

/// A sensor BRAM region: provides the current control word and raw
/// frame bytes at a given ring depth position.
pub trait BramSource {
    fn control_word(&self) -> ControlWord;
    fn read_frame(&self, addr: u16) -> [u8; SLOT_BYTES];
}

/// Extracts the payload length embedded in a sensor frame's IP-header-like
/// prefix (`total_length - IP_HEADER_SIZE`), clamped to the frame size.
fn payload_len(frame: &[u8; SLOT_BYTES]) -> usize {
    let total = u16::from_be_bytes([
        frame[IP_TOTAL_LEN_OFFSET],
        frame[IP_TOTAL_LEN_OFFSET + 1],
    ]) as usize;
    total.saturating_sub(IP_HEADER_SIZE).min(SLOT_BYTES)
}

/// Drains one sensor BRAM slot into `ring`. `depth` is the slot's packet
/// ring depth (e.g. `GPS_BRAM_PACKET`/`IMU_BRAM_PACKET`); addresses and
/// indices wrap modulo `depth`/`MAX_IDX` respectively.
pub fn drain_sensor_slot<S: BramSource>(
    src: &S,
    cursor: &mut SlotCursor,
    depth: u16,
    ring: &mut RingBuffer,
) -> DrainOutcome {
    let cw = src.control_word();
    let index_diff = (cw.write_index.wrapping_sub(cursor.last_index)) as u16 % MAX_IDX;
    let addr_diff = (cw.write_addr + depth - cursor.last_addr) % depth;

    if index_diff != addr_diff {
        cursor.last_index = cw.write_index;
        cursor.last_addr = cw.write_addr;
        return DrainOutcome::Desynced;
    }

    if addr_diff == 0 {
        return DrainOutcome::Idle;
    }

    for i in 0..addr_diff {
        let addr = (cursor.last_addr + i) % depth;
        let frame = src.read_frame(addr);
        let len = payload_len(&frame);
        let _ = ring.try_enqueue(&frame[IP_HEADER_SIZE..IP_HEADER_SIZE + len.min(SLOT_BYTES - IP_HEADER_SIZE)]);
    }

    cursor.last_index = cw.write_index;
    cursor.last_addr = cw.write_addr;
    DrainOutcome::Drained(addr_diff)
}

/// A UART BRAM region: `{write_addr, busy}` control plus a fixed-size
/// `{length:u32_le, bytes:[u8; SLOT_BYTES-4]}` record at each address.
pub trait UartBramSource {
    /// Returns `(write_addr, busy)`. `busy` mirrors the PL's
    /// write-in-progress sentinel (`regs::PL_BRAM_WR_STS`); while set,
    /// the slot at `write_addr` must not be read.
    fn control_word(&self) -> (u16, bool);
    fn read_record(&self, addr: u16) -> ([u8; 4], [u8; SLOT_BYTES - 4]);
}

/// Drains one UART BRAM slot into `ring`. Unlike sensor slots, only the
/// address rollcount is checked (`UartBramRead` in the original publishes
/// no separate index word for these channels).
pub fn drain_uart_slot<S: UartBramSource>(
    src: &S,
    cursor: &mut UartCursor,
    depth: u16,
    ring: &mut RingBuffer,
) -> DrainOutcome {
    let (write_addr, busy) = src.control_word();
    if busy {
        return DrainOutcome::Idle;
    }

    let addr_diff = (write_addr + depth - cursor.last_addr) % depth;
    if addr_diff == 0 {
        return DrainOutcome::Idle;
    }

    for i in 0..addr_diff {
        let addr = (cursor.last_addr + i) % depth;
        let (len_bytes, bytes) = src.read_record(addr);
        let len = (u32::from_le_bytes(len_bytes) as usize).min(bytes.len());
        let _ = ring.try_enqueue(&bytes[..len]);
    }

    cursor.last_addr = write_addr;
    DrainOutcome::Drained(addr_diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IMU_BRAM_PACKET;

    struct FakeSensorBram {
        depth: u16,
        frames: std::vec::Vec<[u8; SLOT_BYTES]>,
        write_index: u8,
        write_addr: u16,
    }

    impl FakeSensorBram {
        fn new(depth: u16) -> Self {
            Self {
                depth,
                frames: std::vec![[0u8; SLOT_BYTES]; depth as usize],
                write_index: 0,
                write_addr: 0,
            }
        }

        fn push(&mut self, payload: &[u8]) {
            let addr = self.write_addr as usize;
            let mut frame = [0u8; SLOT_BYTES];
            let total_len = (payload.len() + IP_HEADER_SIZE) as u16;
            frame[IP_TOTAL_LEN_OFFSET..IP_TOTAL_LEN_OFFSET + 2]
                .copy_from_slice(&total_len.to_be_bytes());
            frame[IP_HEADER_SIZE..IP_HEADER_SIZE + payload.len()].copy_from_slice(payload);
            self.frames[addr] = frame;
            self.write_addr = (self.write_addr + 1) % self.depth;
            self.write_index = self.write_index.wrapping_add(1);
        }
    }

    impl BramSource for FakeSensorBram {
        fn control_word(&self) -> ControlWord {
            ControlWord {
                write_index: self.write_index,
                write_addr: self.write_addr,
            }
        }

        fn read_frame(&self, addr: u16) -> [u8; SLOT_BYTES] {
            self.frames[addr as usize]
        }
    }

    #[test]
    fn drains_newly_written_frames_in_order() {
        let depth = IMU_BRAM_PACKET as u16;
        let mut bram = FakeSensorBram::new(depth);
        bram.push(&[1, 2, 3]);
        bram.push(&[4, 5]);

        let mut cursor = SlotCursor::new();
        let mut ring = RingBuffer::new();
        let outcome = drain_sensor_slot(&bram, &mut cursor, depth, &mut ring);
        assert_eq!(outcome, DrainOutcome::Drained(2));

        let first = ring.try_dequeue().unwrap();
        assert_eq!(first.as_slice(), &[1, 2, 3]);
        let second = ring.try_dequeue().unwrap();
        assert_eq!(second.as_slice(), &[4, 5]);
    }

    #[test]
    fn idle_when_nothing_new() {
        let depth = IMU_BRAM_PACKET as u16;
        let bram = FakeSensorBram::new(depth);
        let mut cursor = SlotCursor::new();
        let mut ring = RingBuffer::new();
        assert_eq!(
            drain_sensor_slot(&bram, &mut cursor, depth, &mut ring),
            DrainOutcome::Idle
        );
    }

    /// S5: index and address rollcounts disagree -> desync, not a panic
    /// or a misaligned read.
    #[test]
    fn mismatched_rollcounts_report_desync() {
        let depth = IMU_BRAM_PACKET as u16;
        let mut bram = FakeSensorBram::new(depth);
        bram.push(&[1]);
        // Hand-corrupt the index word so it disagrees with the address.
        bram.write_index = bram.write_index.wrapping_add(5);

        let mut cursor = SlotCursor::new();
        let mut ring = RingBuffer::new();
        let outcome = drain_sensor_slot(&bram, &mut cursor, depth, &mut ring);
        assert_eq!(outcome, DrainOutcome::Desynced);
        assert!(ring.try_dequeue().is_none());

        // Cursor resynced to the published values; next poll is idle.
        let outcome2 = drain_sensor_slot(&bram, &mut cursor, depth, &mut ring);
        assert_eq!(outcome2, DrainOutcome::Idle);
    }

    struct FakeUartBram {
        depth: u16,
        records: std::vec::Vec<([u8; 4], [u8; SLOT_BYTES - 4])>,
        write_addr: u16,
        busy: bool,
    }

    impl FakeUartBram {
        fn new(depth: u16) -> Self {
            Self {
                depth,
                records: std::vec![([0u8; 4], [0u8; SLOT_BYTES - 4]); depth as usize],
                write_addr: 0,
                busy: false,
            }
        }

        fn push(&mut self, payload: &[u8]) {
            let addr = self.write_addr as usize;
            let mut bytes = [0u8; SLOT_BYTES - 4];
            bytes[..payload.len()].copy_from_slice(payload);
            self.records[addr] = ((payload.len() as u32).to_le_bytes(), bytes);
            self.write_addr = (self.write_addr + 1) % self.depth;
        }
    }

    impl UartBramSource for FakeUartBram {
        fn control_word(&self) -> (u16, bool) {
            (self.write_addr, self.busy)
        }

        fn read_record(&self, addr: u16) -> ([u8; 4], [u8; SLOT_BYTES - 4]) {
            self.records[addr as usize]
        }
    }

    #[test]
    fn uart_slot_drains_by_address_only() {
        let depth = 4;
        let mut bram = FakeUartBram::new(depth);
        bram.push(&[9, 9]);

        let mut cursor = UartCursor::new();
        let mut ring = RingBuffer::new();
        let outcome = drain_uart_slot(&bram, &mut cursor, depth, &mut ring);
        assert_eq!(outcome, DrainOutcome::Drained(1));
        assert_eq!(ring.try_dequeue().unwrap().as_slice(), &[9, 9]);
    }

    #[test]
    fn uart_slot_skips_while_busy() {
        let depth = 4;
        let mut bram = FakeUartBram::new(depth);
        bram.push(&[1]);
        bram.busy = true;

        let mut cursor = UartCursor::new();
        let mut ring = RingBuffer::new();
        assert_eq!(
            drain_uart_slot(&bram, &mut cursor, depth, &mut ring),
            DrainOutcome::Idle
        );
    }
}
