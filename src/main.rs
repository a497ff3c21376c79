#![no_main]
#![cfg_attr(not(test), no_std)]

//! IGNU data-plane firmware: drains the PL's BRAM ring buffers, parses
//! IMU/GPS sensor frames, and terminates the ground-link protocol
//! stack (KISS framing over UART, CSP routing, CCSDS/PUS
//! telemetry/telecommand).
//!
//! Out of scope here (external collaborators): the interactive debug
//! shell, the UDP echo server on the secondary Ethernet interface,
//! GPIO/PHY reset sequencing, and the one-shot slot-configuration
//! writer that runs once at boot.

use defmt_rtt as _;
use panic_probe as _;

mod bram;
mod command_state;
mod config;
mod csp;
mod egress;
mod hw;
mod kiss;
mod pac;
mod pus;
mod ring;
mod sensors;
mod snapshot;
mod telemetry;
mod tpvaw;

#[rtic::app(device = crate::pac, dispatchers = [SW1, SW2, SW3])]
mod app {
    use rtic_monotonics::systick::prelude::*;

    use crate::bram::{self, SlotCursor, UartCursor};
    use crate::command_state::CommandState;
    use crate::config::{self, periods};
    use crate::csp;
    use crate::egress;
    use crate::hw::{RxSlot, UartTxChannel};
    use crate::kiss::{self, Decoded, KissDecoder};
    use crate::pus::{self, PusContext};
    use crate::ring::{self, RingBuffer};
    use crate::sensors::{gps::parse_gps, imu::parse_imu};
    use crate::snapshot::SensorSnapshot;
    use crate::tpvaw::TpvawData;

    systick_monotonic!(Mono, 1_000);

    #[shared]
    struct Shared {
        snapshot: SensorSnapshot,
        command_state: CommandState,
        tpvaw: Option<TpvawData>,
        cmd_rx_ring: RingBuffer,
        /// Ground-link TX ring fed by `ignu_rx` (command/TC responses).
        /// Single producer, matching `ring.rs`'s invariant.
        cmd_tx_ring: RingBuffer,
        /// Ground-link TX ring fed by `ignu_tx` (periodic telemetry).
        /// A distinct ring from `cmd_tx_ring` so the two producers never
        /// share one ring; `uart_tx` drains both onto the same physical
        /// channel, responses first.
        telemetry_tx_ring: RingBuffer,
        /// TX rings for every UART channel other than the ground link.
        /// Unused in this configuration (no producer is wired to them
        /// yet) but kept so additional channels need only a new producer,
        /// not a new mux shape.
        aux_tx_rings: [RingBuffer; config::N_UART_CHANNELS - 1],
        desync_count: u32,
        drop_count: u32,
    }

    #[local]
    struct Local {
        gps_bram: RxSlot,
        gps_cursor: SlotCursor,
        gps_ring: RingBuffer,
        imu_bram: RxSlot,
        imu_cursor: SlotCursor,
        imu_ring: RingBuffer,
        uart_bram: RxSlot,
        uart_cursor: UartCursor,
        kiss_decoder: KissDecoder,
        uart_tx_sinks: [UartTxChannel; config::N_UART_CHANNELS],
    }

    #[init]
    fn init(cx: init::Context) -> (Shared, Local) {
        Mono::start(cx.core.SYST, 64_000_000);

        defmt::info!("ignu firmware init");

        gps_drain::spawn().ok();
        imu_drain::spawn().ok();
        uart_drain::spawn().ok();
        uart_tx::spawn().ok();
        ignu_rx::spawn().ok();
        ignu_tx::spawn().ok();

        (
            Shared {
                snapshot: SensorSnapshot::new(),
                command_state: CommandState::new(),
                tpvaw: None,
                cmd_rx_ring: RingBuffer::new(),
                cmd_tx_ring: RingBuffer::new(),
                telemetry_tx_ring: RingBuffer::new(),
                aux_tx_rings: [RingBuffer::new()],
                desync_count: 0,
                drop_count: 0,
            },
            Local {
                gps_bram: RxSlot::new(config::GPS_SLOT),
                gps_cursor: SlotCursor::new(),
                gps_ring: RingBuffer::new(),
                imu_bram: RxSlot::new(config::IMU_SLOT),
                imu_cursor: SlotCursor::new(),
                imu_ring: RingBuffer::new(),
                uart_bram: RxSlot::new(config::UART_SLOT),
                uart_cursor: UartCursor::new(),
                kiss_decoder: KissDecoder::new(),
                uart_tx_sinks: [
                    UartTxChannel::new(1),
                    UartTxChannel::new(2),
                ],
            },
        )
    }

    /// Component A+B+C+D for the GPS channel: drain the BRAM ring,
    /// parse any complete frames, and update the shared snapshot. Runs
    /// every `periods::GPS_DRAIN_MS`.
    #[task(local = [gps_bram, gps_cursor, gps_ring], shared = [snapshot, desync_count], priority = 2)]
    async fn gps_drain(mut cx: gps_drain::Context) {
        loop {
            let outcome = bram::drain_sensor_slot(
                cx.local.gps_bram,
                cx.local.gps_cursor,
                config::GPS_BRAM_PACKET as u16,
                cx.local.gps_ring,
            );
            if matches!(outcome, bram::DrainOutcome::Desynced) {
                defmt::warn!("gps bram desync");
                cx.shared.desync_count.lock(|c| *c += 1);
            }

            while let Some(frame) = cx.local.gps_ring.try_dequeue() {
                if frame.len() == config::GPS_PACKET_SIZE {
                    let buf: [u8; config::GPS_PACKET_SIZE] =
                        frame.as_slice().try_into().unwrap();
                    if let Some(rec) = parse_gps(&buf) {
                        cx.shared.snapshot.lock(|s| s.update_gps(rec));
                    } else {
                        defmt::debug!("gps frame rejected: bad sync word");
                    }
                } else {
                    defmt::debug!("gps frame rejected: wrong length");
                }
            }

            Mono::delay(periods::GPS_DRAIN_MS.millis()).await;
        }
    }

    /// Component A+B+C+D for the IMU channel. Runs every
    /// `periods::IMU_DRAIN_MS`.
    #[task(local = [imu_bram, imu_cursor, imu_ring], shared = [snapshot, desync_count], priority = 2)]
    async fn imu_drain(mut cx: imu_drain::Context) {
        loop {
            let outcome = bram::drain_sensor_slot(
                cx.local.imu_bram,
                cx.local.imu_cursor,
                config::IMU_BRAM_PACKET as u16,
                cx.local.imu_ring,
            );
            if matches!(outcome, bram::DrainOutcome::Desynced) {
                defmt::warn!("imu bram desync");
                cx.shared.desync_count.lock(|c| *c += 1);
            }

            while let Some(frame) = cx.local.imu_ring.try_dequeue() {
                if frame.len() == config::IMU_PACKET_SIZE {
                    let buf: [u8; config::IMU_PACKET_SIZE] =
                        frame.as_slice().try_into().unwrap();
                    if let Some(rec) = parse_imu(&buf) {
                        cx.shared.snapshot.lock(|s| s.update_imu(rec));
                    } else {
                        defmt::debug!("imu frame rejected: bad sync byte");
                    }
                } else {
                    defmt::debug!("imu frame rejected: wrong length");
                }
            }

            Mono::delay(periods::IMU_DRAIN_MS.millis()).await;
        }
    }

    /// Component A+B for the ground-link UART: drains raw byte chunks
    /// out of the UART BRAM slot into the shared command-RX ring.
    /// Runs every `periods::UART_DRAIN_MS`.
    #[task(local = [uart_bram, uart_cursor], shared = [cmd_rx_ring, desync_count, drop_count], priority = 2)]
    async fn uart_drain(mut cx: uart_drain::Context) {
        loop {
            let outcome = cx.shared.cmd_rx_ring.lock(|ring| {
                bram::drain_uart_slot(
                    cx.local.uart_bram,
                    cx.local.uart_cursor,
                    config::UART_BRAM_PACKET as u16,
                    ring,
                )
            });

            match outcome {
                bram::DrainOutcome::Desynced => {
                    defmt::warn!("uart bram desync");
                    cx.shared.desync_count.lock(|c| *c += 1);
                }
                bram::DrainOutcome::Drained(n) => {
                    defmt::debug!("uart drain: {} record(s)", n);
                }
                bram::DrainOutcome::Idle => {}
            }

            Mono::delay(periods::UART_DRAIN_MS.millis()).await;
        }
    }

    /// Component E+F+G for inbound ground traffic: decode KISS frames
    /// off the command-RX ring, validate the CSP envelope, dispatch
    /// the CCSDS/PUS payload, and enqueue the response for egress.
    /// Runs every `periods::IGNU_RX_MS`.
    #[task(local = [kiss_decoder], shared = [cmd_rx_ring, snapshot, command_state, tpvaw, cmd_tx_ring, drop_count], priority = 2)]
    async fn ignu_rx(mut cx: ignu_rx::Context) {
        loop {
            while let Some(chunk) = cx.shared.cmd_rx_ring.lock(|ring| ring.try_dequeue()) {
                for &byte in chunk.as_slice() {
                    let decoded = cx.local.kiss_decoder.feed(byte);
                    match decoded {
                        Decoded::Pending => {}
                        Decoded::Discarded => {
                            defmt::debug!("kiss frame discarded");
                        }
                        Decoded::Frame(csp_pkt) => {
                            let (header, payload) = match csp::csp_receive(csp_pkt.as_slice()) {
                                Ok(v) => v,
                                Err(_) => {
                                    defmt::debug!("csp packet rejected");
                                    continue;
                                }
                            };

                            if !csp::is_local_dport(header.dport) {
                                defmt::debug!("csp packet for foreign dport dropped");
                                continue;
                            }

                            let Some((tc_header, user_data)) = pus::parse_tc(payload) else {
                                defmt::info!("malformed tc payload");
                                continue;
                            };

                            let response = cx.shared.snapshot.lock(|snapshot| {
                                cx.shared.command_state.lock(|state| {
                                    cx.shared.tpvaw.lock(|tpvaw| {
                                        let mut ctx = PusContext {
                                            state,
                                            snapshot,
                                            tpvaw,
                                        };
                                        pus::dispatch(tc_header, user_data, &mut ctx)
                                    })
                                })
                            });

                            // Every reply goes to the ground PDHS on its
                            // async-telemetry port, never back to
                            // whatever src/sport the inbound packet
                            // happened to carry.
                            let csp_reply = csp::csp_send(
                                config::CSP_PDHS_ADDR,
                                config::CSP_PORT_ASYNC_TX,
                                &response,
                            );

                            let mut kiss_out = [0u8; config::MAX_KISS_BUF];
                            match kiss::encode(&csp_reply, &mut kiss_out) {
                                Some(n) => {
                                    let dropped = cx
                                        .shared
                                        .cmd_tx_ring
                                        .lock(|ring| ring.try_enqueue(&kiss_out[..n]));
                                    if matches!(dropped, ring::EnqueueOutcome::DroppedOldest) {
                                        cx.shared.drop_count.lock(|c| *c += 1);
                                    }
                                }
                                None => defmt::warn!("reply frame too large to kiss-encode"),
                            }
                        }
                    }
                }
            }

            Mono::delay(periods::IGNU_RX_MS.millis()).await;
        }
    }

    /// Component J: per-channel TX mux. Runs every
    /// `periods::UART_TX_MS`. The ground link is fed by two producers
    /// (`ignu_rx`'s `cmd_tx_ring`, `ignu_tx`'s `telemetry_tx_ring`), so
    /// this task -- their single consumer -- drains the response ring
    /// first and only reaches for telemetry once it's empty; every
    /// other channel's ring has exactly one producer already and is
    /// pumped the same way it always was.
    #[task(local = [uart_tx_sinks], shared = [cmd_tx_ring, telemetry_tx_ring, aux_tx_rings], priority = 2)]
    async fn uart_tx(mut cx: uart_tx::Context) {
        loop {
            let (ground_sink, other_sinks) =
                cx.local.uart_tx_sinks.split_at_mut(config::GROUND_LINK_CHANNEL);
            let ground_sink = &mut ground_sink[config::GROUND_LINK_CHANNEL - 1];

            let sent = cx.shared.cmd_tx_ring.lock(|ring| {
                matches!(
                    egress::pump_channel(ground_sink, ring),
                    egress::MuxOutcome::Sent
                )
            });
            if !sent {
                cx.shared
                    .telemetry_tx_ring
                    .lock(|ring| egress::pump_channel(ground_sink, ring));
            }

            cx.shared.aux_tx_rings.lock(|rings| {
                for (sink, ring) in other_sinks.iter_mut().zip(rings.iter_mut()) {
                    egress::pump_channel(sink, ring);
                }
            });

            Mono::delay(periods::UART_TX_MS.millis()).await;
        }
    }

    /// Component H: deadline-aligned 1 Hz telemetry. While `Run`,
    /// sends the live `TestData` record as a `(1, 10)` TM; while
    /// `Idle`, does nothing (sensor drain still keeps the snapshot
    /// warm).
    #[task(shared = [command_state, snapshot, telemetry_tx_ring, drop_count], priority = 2)]
    async fn ignu_tx(mut cx: ignu_tx::Context) {
        let mut next = Mono::now();
        loop {
            next = next + periods::IGNU_TX_MS.millis();

            let running = cx.shared.command_state.lock(|s| s.is_running());
            if running {
                let tm = cx.shared.snapshot.lock(|s| pus::build_periodic_test_data_tm(s));
                let csp_pkt =
                    csp::csp_send(config::CSP_PDHS_ADDR, config::CSP_PORT_ASYNC_TX, &tm);

                let mut kiss_out = [0u8; config::MAX_KISS_BUF];
                if let Some(n) = kiss::encode(&csp_pkt, &mut kiss_out) {
                    let dropped = cx
                        .shared
                        .telemetry_tx_ring
                        .lock(|ring| ring.try_enqueue(&kiss_out[..n]));
                    if matches!(dropped, ring::EnqueueOutcome::DroppedOldest) {
                        cx.shared.drop_count.lock(|c| *c += 1);
                    }
                } else {
                    defmt::warn!("telemetry frame too large to kiss-encode");
                }
            }

            Mono::delay_until(next).await;
        }
    }
}
