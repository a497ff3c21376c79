//! Component J: the egress channel mux.
//!
//! Every 5 ms, per UART TX channel: if the PL's tx-busy flag is clear,
//! dequeue one frame from that channel's TX ring and hand it to the PL
//! (write the bytes into the channel's TX BRAM region, then raise
//! `TX_ENABLE` for that channel). Hardware access sits behind
//! `UartTxSink` so the mux logic is exercised without real silicon.

use crate::ring::RingBuffer;

pub trait UartTxSink {
    /// `true` while the PL is still draining a previously submitted
    /// frame on this channel.
    fn is_busy(&self) -> bool;
    /// Writes `frame` into the channel's TX BRAM region and raises
    /// `TX_ENABLE`.
    fn submit(&mut self, frame: &[u8]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuxOutcome {
    Sent,
    Busy,
    Empty,
}

/// Runs one mux tick for a single channel: dequeues at most one frame
/// from `ring` and submits it to `sink`, provided the channel isn't
/// still busy with a previous frame.
pub fn pump_channel<S: UartTxSink>(sink: &mut S, ring: &mut RingBuffer) -> MuxOutcome {
    if sink.is_busy() {
        return MuxOutcome::Busy;
    }

    match ring.try_dequeue() {
        Some(frame) => {
            sink.submit(frame.as_slice());
            MuxOutcome::Sent
        }
        None => MuxOutcome::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSink {
        busy: bool,
        submitted: std::vec::Vec<std::vec::Vec<u8>>,
    }

    impl FakeSink {
        fn new() -> Self {
            Self {
                busy: false,
                submitted: std::vec::Vec::new(),
            }
        }
    }

    impl UartTxSink for FakeSink {
        fn is_busy(&self) -> bool {
            self.busy
        }

        fn submit(&mut self, frame: &[u8]) {
            self.submitted.push(frame.to_vec());
        }
    }

    #[test]
    fn sends_one_frame_per_tick() {
        let mut ring = RingBuffer::new();
        ring.try_enqueue(&[1, 2, 3]);
        ring.try_enqueue(&[4, 5]);

        let mut sink = FakeSink::new();
        assert_eq!(pump_channel(&mut sink, &mut ring), MuxOutcome::Sent);
        assert_eq!(pump_channel(&mut sink, &mut ring), MuxOutcome::Sent);
        assert_eq!(pump_channel(&mut sink, &mut ring), MuxOutcome::Empty);
        assert_eq!(sink.submitted, std::vec![std::vec![1, 2, 3], std::vec![4, 5]]);
    }

    #[test]
    fn skips_while_busy_and_leaves_frame_queued() {
        let mut ring = RingBuffer::new();
        ring.try_enqueue(&[9]);

        let mut sink = FakeSink::new();
        sink.busy = true;
        assert_eq!(pump_channel(&mut sink, &mut ring), MuxOutcome::Busy);
        assert!(sink.submitted.is_empty());
        assert_eq!(ring.len(), 1);

        sink.busy = false;
        assert_eq!(pump_channel(&mut sink, &mut ring), MuxOutcome::Sent);
    }
}
