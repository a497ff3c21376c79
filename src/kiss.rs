//! Component E: the KISS framer.
//!
//! SLIP-style byte-stuffed frame extraction over the ground-link UART.
//! Every KISS frame on this link carries exactly one CSP packet; the
//! leading command byte is stripped and checked rather than accepted
//! unconditionally -- see `KISS_CMD_DATA`.

use heapless::Vec;

use crate::config::{KISS_CMD_DATA, KISS_FEND, KISS_FESC, KISS_TFEND, KISS_TFESC, MAX_KISS_BUF};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    WaitFend,
    Data,
    Escape,
}

/// Outcome of feeding one byte to the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// No complete frame yet.
    Pending,
    /// A complete frame was extracted (command byte already stripped).
    Frame(Vec<u8, MAX_KISS_BUF>),
    /// A frame completed but was discarded: either it was empty (command
    /// byte only) or the command byte failed the `cmd == 0x00` check.
    Discarded,
}

/// Three-state byte-stuffed frame decoder. Never panics: an overlong
/// frame resyncs to `WaitFend` and is silently discarded as a link
/// desync, recovered locally without operator intervention.
pub struct KissDecoder {
    state: State,
    buf: Vec<u8, MAX_KISS_BUF>,
}

impl KissDecoder {
    pub const fn new() -> Self {
        Self {
            state: State::WaitFend,
            buf: Vec::new(),
        }
    }

    fn reset_to(&mut self, state: State) {
        self.buf.clear();
        self.state = state;
    }

    /// Feed one byte, advancing the state machine.
    pub fn feed(&mut self, byte: u8) -> Decoded {
        match self.state {
            State::WaitFend => {
                if byte == KISS_FEND {
                    self.reset_to(State::Data);
                }
                Decoded::Pending
            }
            State::Data => match byte {
                KISS_FEND => {
                    let out = if self.buf.len() >= 2 && self.buf[0] == KISS_CMD_DATA {
                        let mut frame = Vec::new();
                        // Skip the leading command byte.
                        let _ = frame.extend_from_slice(&self.buf[1..]);
                        Decoded::Frame(frame)
                    } else {
                        Decoded::Discarded
                    };
                    // A FEND both closes the current frame and opens the
                    // next one; stay in `Data` with a fresh buffer.
                    self.reset_to(State::Data);
                    out
                }
                KISS_FESC => {
                    self.state = State::Escape;
                    Decoded::Pending
                }
                b => {
                    if self.buf.push(b).is_err() {
                        // Buffer overrun: resync rather than emit a
                        // truncated, wrong-length frame.
                        self.reset_to(State::WaitFend);
                    }
                    Decoded::Pending
                }
            },
            State::Escape => {
                let literal = match byte {
                    KISS_TFEND => KISS_FEND,
                    KISS_TFESC => KISS_FESC,
                    other => other,
                };
                self.state = State::Data;
                if self.buf.push(literal).is_err() {
                    self.reset_to(State::WaitFend);
                }
                Decoded::Pending
            }
        }
    }
}

impl Default for KissDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte-stuff `payload` into a KISS frame: `FEND, 0x00, <escaped payload>,
/// FEND`. `out` must have room for the worst case (every byte escaped,
/// plus framing); returns the number of bytes written, or `None` if `out`
/// is too small.
pub fn encode(payload: &[u8], out: &mut [u8]) -> Option<usize> {
    let mut i = 0;
    let mut put = |out: &mut [u8], i: &mut usize, b: u8| -> Option<()> {
        *out.get_mut(*i)? = b;
        *i += 1;
        Some(())
    };

    put(out, &mut i, KISS_FEND)?;
    put(out, &mut i, KISS_CMD_DATA)?;
    for &b in payload {
        match b {
            KISS_FEND => {
                put(out, &mut i, KISS_FESC)?;
                put(out, &mut i, KISS_TFEND)?;
            }
            KISS_FESC => {
                put(out, &mut i, KISS_FESC)?;
                put(out, &mut i, KISS_TFESC)?;
            }
            other => put(out, &mut i, other)?,
        }
    }
    put(out, &mut i, KISS_FEND)?;
    Some(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(bytes: &[u8]) -> std::vec::Vec<std::vec::Vec<u8>> {
        let mut dec = KissDecoder::new();
        let mut frames = std::vec::Vec::new();
        for &b in bytes {
            if let Decoded::Frame(f) = dec.feed(b) {
                frames.push(f.as_slice().to_vec());
            }
        }
        frames
    }

    #[test]
    fn round_trip_plain_bytes() {
        let payload = [1u8, 2, 3, 4, 5];
        let mut out = [0u8; 32];
        let n = encode(&payload, &mut out).unwrap();
        let frames = decode_all(&out[..n]);
        assert_eq!(frames, std::vec![payload.to_vec()]);
    }

    #[test]
    fn round_trip_fend_byte() {
        let payload = [KISS_FEND];
        let mut out = [0u8; 16];
        let n = encode(&payload, &mut out).unwrap();
        let frames = decode_all(&out[..n]);
        assert_eq!(frames, std::vec![payload.to_vec()]);
    }

    #[test]
    fn round_trip_fesc_byte() {
        let payload = [KISS_FESC];
        let mut out = [0u8; 16];
        let n = encode(&payload, &mut out).unwrap();
        let frames = decode_all(&out[..n]);
        assert_eq!(frames, std::vec![payload.to_vec()]);
    }

    #[test]
    fn round_trip_mixed_escape_sequence() {
        let payload = [KISS_FEND, KISS_FESC, KISS_FEND];
        let mut out = [0u8; 16];
        let n = encode(&payload, &mut out).unwrap();
        let frames = decode_all(&out[..n]);
        assert_eq!(frames, std::vec![payload.to_vec()]);
    }

    /// S4: `C0 00 DB DC DB DD C0` decodes to exactly two bytes `[C0, DB]`.
    #[test]
    fn scenario_s4_kiss_with_escape() {
        let bytes = [0xC0, 0x00, 0xDB, 0xDC, 0xDB, 0xDD, 0xC0];
        let frames = decode_all(&bytes);
        assert_eq!(frames, std::vec![std::vec![0xC0, 0xDB]]);
    }

    #[test]
    fn non_zero_command_byte_is_discarded() {
        // cmd byte 0x01 instead of 0x00 -- production firmware discards
        // anything but the plain data command.
        let mut dec = KissDecoder::new();
        let frame = [0xC0, 0x01, 0xAA, 0xBB, 0xC0];
        let mut last = Decoded::Pending;
        for &b in &frame {
            let d = dec.feed(b);
            if !matches!(d, Decoded::Pending) {
                last = d;
            }
        }
        assert_eq!(last, Decoded::Discarded);
    }

    #[test]
    fn empty_frame_is_discarded() {
        let mut dec = KissDecoder::new();
        assert_eq!(dec.feed(KISS_FEND), Decoded::Pending);
        assert_eq!(dec.feed(KISS_FEND), Decoded::Discarded);
    }
}
