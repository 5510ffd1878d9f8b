//! # Bridge Module
//!
//! The dispatch loop: receive a datagram, decode it, then either pulse the
//! restart button or map the frame and write the axes.
//!
//! Packets are handled one at a time in arrival order. A malformed packet is
//! logged and dropped without touching the device, and the loop goes straight
//! back to waiting for the next one.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::frame::decoder::decode;
use crate::frame::protocol::{Message, ParseError};
use crate::joystick::axis_mapper::{AxisMapper, MappedAxes};
use crate::joystick::restart::RestartTrigger;
use crate::joystick::sink::VirtualJoystick;
use crate::udp::{DatagramReceiver, RECV_BUFFER_SIZE};

/// Default number of packets between status log messages
pub const DEFAULT_STATUS_INTERVAL_PACKETS: u64 = 1000;

/// Pause after a failed receive before listening again
pub const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Complete when `signal` fires, logging why if it could not be installed
///
/// # Examples
///
/// ```no_run
/// use powersteer_bridge::bridge::shutdown_signal;
///
/// # async fn wait() {
/// shutdown_signal(tokio::signal::ctrl_c()).await;
/// # }
/// ```
pub async fn shutdown_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Received Ctrl+C"),
        Err(e) => error!("Failed to listen for Ctrl+C, stopping: {}", e),
    }
}

/// What happened to one datagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Restart button was pulsed
    Restarted,
    /// Frame mapped and written to the device
    Forwarded(MappedAxes),
    /// Packet dropped, device untouched
    Dropped(ParseError),
}

/// Packet counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub frames: u64,
    pub restarts: u64,
    pub dropped: u64,
}

impl BridgeStats {
    pub fn total(&self) -> u64 {
        self.frames + self.restarts + self.dropped
    }

    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Restarted => self.restarts += 1,
            Outcome::Forwarded(_) => self.frames += 1,
            Outcome::Dropped(_) => self.dropped += 1,
        }
    }
}

impl std::fmt::Display for BridgeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} packets ({} frames, {} restarts, {} dropped)",
            self.total(),
            self.frames,
            self.restarts,
            self.dropped
        )
    }
}

/// Sensor-to-joystick bridge
///
/// Owns the virtual joystick; the device is released when the bridge is
/// dropped.
///
/// # Examples
///
/// ```no_run
/// use powersteer_bridge::bridge::{shutdown_signal, Bridge};
/// use powersteer_bridge::joystick::axis_mapper::AxisMapper;
/// use powersteer_bridge::joystick::restart::RestartTrigger;
/// use powersteer_bridge::joystick::uinput::UinputJoystick;
/// use powersteer_bridge::udp::DatagramReceiver;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let joystick = UinputJoystick::create("PowerSteer Virtual Joystick")?;
///     let receiver = DatagramReceiver::bind("0.0.0.0:5005".parse()?).await?;
///
///     let mut bridge = Bridge::new(joystick, AxisMapper::default(), RestartTrigger::default());
///     bridge.run(&receiver, shutdown_signal(tokio::signal::ctrl_c())).await;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Bridge<S> {
    sink: S,
    mapper: AxisMapper,
    restart: RestartTrigger,
    stats: BridgeStats,
    status_interval: u64,
}

impl<S: VirtualJoystick> Bridge<S> {
    pub fn new(sink: S, mapper: AxisMapper, restart: RestartTrigger) -> Self {
        Self {
            sink,
            mapper,
            restart,
            stats: BridgeStats::default(),
            status_interval: DEFAULT_STATUS_INTERVAL_PACKETS,
        }
    }

    /// Log a status line every `packets` handled packets
    pub fn with_status_interval(mut self, packets: u64) -> Self {
        self.status_interval = packets.max(1);
        self
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    /// Handle one datagram payload
    ///
    /// Never fails: parse errors are logged and reported as
    /// [`Outcome::Dropped`], device write errors are logged and ignored.
    pub async fn handle_datagram(&mut self, payload: &[u8]) -> Outcome {
        let outcome = match decode(payload) {
            Ok(Message::Restart) => {
                self.restart.pulse(&mut self.sink).await;
                Outcome::Restarted
            }
            Ok(Message::Frame(frame)) => {
                let axes = self.mapper.map_frame(&frame);
                self.write_axes(&axes);
                info!(
                    "ROLL: {}, ACCEL: {}, BRAKE: {} => {}",
                    frame.roll, frame.accelerate, frame.brake, axes
                );
                Outcome::Forwarded(axes)
            }
            Err(e) => {
                warn!("Dropped packet: {}", e);
                Outcome::Dropped(e)
            }
        };

        self.stats.record(&outcome);
        if self.stats.total() % self.status_interval == 0 {
            info!("Handled {}", self.stats);
        }

        outcome
    }

    fn write_axes(&mut self, axes: &MappedAxes) {
        for (axis, value) in axes.writes() {
            if let Err(e) = self.sink.set_axis(axis, value) {
                warn!("Failed to write axis {}: {}", axis, e);
            }
        }
    }

    /// Log a receive error and back off before the next receive
    async fn recv_failed(&self, e: &crate::error::BridgeError) {
        warn!(
            "Failed to receive datagram: {} (retrying in {:?})",
            e, RECV_ERROR_BACKOFF
        );
        tokio::time::sleep(RECV_ERROR_BACKOFF).await;
    }

    /// Receive and handle datagrams until `shutdown` completes
    ///
    /// Receive errors are logged and the loop keeps listening after
    /// [`RECV_ERROR_BACKOFF`].
    pub async fn run<F>(&mut self, receiver: &DatagramReceiver, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut buf = [0u8; RECV_BUFFER_SIZE];
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                received = receiver.recv(&mut buf) => {
                    match received {
                        Ok((len, sender)) => {
                            debug!("Received {} bytes from {}", len, sender);
                            self.handle_datagram(&buf[..len]).await;
                        }
                        Err(e) => self.recv_failed(&e).await,
                    }
                }

                _ = &mut shutdown => {
                    info!("Shutting down...");
                    info!("Total: {}", self.stats);
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crate::joystick::axis_mapper::MappingProfile;
    use crate::joystick::sink::{Axis, MockVirtualJoystick};
    use mockall::predicate::eq;
    use mockall::Sequence;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::net::UdpSocket;
    use tokio::sync::oneshot;

    fn fast_restart() -> RestartTrigger {
        RestartTrigger::new(1, Duration::from_millis(1))
    }

    fn mock_bridge(sink: MockVirtualJoystick, profile: MappingProfile) -> Bridge<MockVirtualJoystick> {
        Bridge::new(sink, AxisMapper::for_profile(profile), fast_restart())
    }

    /// Sink recording every write, shared with the test body
    #[derive(Clone, Default)]
    struct RecordingJoystick {
        writes: Arc<Mutex<Vec<Write>>>,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Write {
        Axis(Axis, i32),
        Button(u16, bool),
    }

    impl RecordingJoystick {
        fn writes(&self) -> Vec<Write> {
            self.writes.lock().unwrap().clone()
        }
    }

    impl VirtualJoystick for RecordingJoystick {
        fn set_axis(&mut self, axis: Axis, value: i32) -> crate::error::Result<()> {
            self.writes.lock().unwrap().push(Write::Axis(axis, value));
            Ok(())
        }

        fn set_button(&mut self, button: u16, pressed: bool) -> crate::error::Result<()> {
            self.writes.lock().unwrap().push(Write::Button(button, pressed));
            Ok(())
        }
    }

    // ==================== Dispatch Tests ====================

    #[tokio::test]
    async fn test_restart_variants_pulse_once_without_axis_writes() {
        for payload in [&b"RESTART"[..], &b"restart"[..], &b" Restart "[..]] {
            let mut sink = MockVirtualJoystick::new();
            let mut seq = Sequence::new();
            sink.expect_set_button()
                .with(eq(1), eq(true))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(()));
            sink.expect_set_button()
                .with(eq(1), eq(false))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(()));
            sink.expect_set_axis().never();

            let mut bridge = mock_bridge(sink, MappingProfile::Combined);
            assert_eq!(bridge.handle_datagram(payload).await, Outcome::Restarted);
            assert_eq!(bridge.stats().restarts, 1);
        }
    }

    #[tokio::test]
    async fn test_combined_frame_writes_two_axes() {
        let mut sink = MockVirtualJoystick::new();
        let mut seq = Sequence::new();
        sink.expect_set_axis()
            .with(eq(Axis::X), eq(12743))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        sink.expect_set_axis()
            .with(eq(Axis::Y), eq(0))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        sink.expect_set_button().never();

        let mut bridge = mock_bridge(sink, MappingProfile::Combined);
        let outcome = bridge.handle_datagram(b"10,1,0").await;

        assert_eq!(outcome, Outcome::Forwarded(MappedAxes { x: 12743, y: 0, z: None }));
    }

    #[tokio::test]
    async fn test_pass_through_frame_writes_three_axes() {
        let mut sink = MockVirtualJoystick::new();
        let mut seq = Sequence::new();
        for (axis, value) in [(Axis::X, -16384), (Axis::Y, 32767), (Axis::Z, 120)] {
            sink.expect_set_axis()
                .with(eq(axis), eq(value))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(()));
        }
        sink.expect_set_button().never();

        let mut bridge = mock_bridge(sink, MappingProfile::PassThrough);
        let outcome = bridge.handle_datagram(b"90,32767,120").await;

        assert_eq!(
            outcome,
            Outcome::Forwarded(MappedAxes { x: -16384, y: 32767, z: Some(120) })
        );
    }

    #[tokio::test]
    async fn test_malformed_packet_writes_nothing() {
        let mut sink = MockVirtualJoystick::new();
        sink.expect_set_axis().never();
        sink.expect_set_button().never();

        let mut bridge = mock_bridge(sink, MappingProfile::Combined);
        let outcome = bridge.handle_datagram(b"abc,1,0").await;

        assert!(matches!(
            outcome,
            Outcome::Dropped(ParseError::InvalidInteger { field: "roll", .. })
        ));
        assert_eq!(bridge.stats().dropped, 1);
    }

    #[tokio::test]
    async fn test_malformed_packet_then_valid_packet() {
        let sink = RecordingJoystick::default();
        let mut bridge = Bridge::new(sink.clone(), AxisMapper::default(), fast_restart());

        bridge.handle_datagram(b"abc,1,0").await;
        assert!(sink.writes().is_empty());

        bridge.handle_datagram(b"0,0,1").await;
        assert_eq!(
            sink.writes(),
            vec![Write::Axis(Axis::X, 16384), Write::Axis(Axis::Y, 32768)]
        );
        assert_eq!(bridge.stats(), BridgeStats { frames: 1, restarts: 0, dropped: 1 });
    }

    #[tokio::test]
    async fn test_repeated_restarts_each_pulse() {
        let sink = RecordingJoystick::default();
        let mut bridge = Bridge::new(sink.clone(), AxisMapper::default(), fast_restart());

        bridge.handle_datagram(b"RESTART").await;
        bridge.handle_datagram(b"RESTART").await;

        assert_eq!(
            sink.writes(),
            vec![
                Write::Button(1, true),
                Write::Button(1, false),
                Write::Button(1, true),
                Write::Button(1, false),
            ]
        );
    }

    #[tokio::test]
    async fn test_sink_error_does_not_stop_frame() {
        let mut sink = MockVirtualJoystick::new();
        sink.expect_set_axis()
            .with(eq(Axis::X), eq(16384))
            .times(1)
            .returning(|_, _| Err(BridgeError::Device("gone".to_string())));
        sink.expect_set_axis()
            .with(eq(Axis::Y), eq(16384))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut bridge = mock_bridge(sink, MappingProfile::Combined);
        let outcome = bridge.handle_datagram(b"0,0,0").await;

        assert!(matches!(outcome, Outcome::Forwarded(_)));
    }

    #[tokio::test]
    async fn test_receive_error_backs_off() {
        let bridge = Bridge::new(RecordingJoystick::default(), AxisMapper::default(), fast_restart());
        let err = BridgeError::Io(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"));

        let started = std::time::Instant::now();
        bridge.recv_failed(&err).await;

        assert!(started.elapsed() >= RECV_ERROR_BACKOFF);
    }

    #[tokio::test]
    async fn test_shutdown_signal_completes_on_handler_error() {
        let failed = async {
            Err::<(), _>(std::io::Error::new(std::io::ErrorKind::Other, "no signal handler"))
        };
        tokio::time::timeout(Duration::from_secs(1), shutdown_signal(failed))
            .await
            .expect("shutdown should complete when the handler fails");
    }

    #[tokio::test]
    async fn test_shutdown_signal_completes_on_signal() {
        tokio::time::timeout(Duration::from_secs(1), shutdown_signal(async { Ok::<(), std::io::Error>(()) }))
            .await
            .expect("shutdown should complete on signal");
    }

    #[test]
    fn test_stats_display() {
        let stats = BridgeStats { frames: 5, restarts: 1, dropped: 2 };
        assert_eq!(stats.total(), 8);
        assert_eq!(stats.to_string(), "8 packets (5 frames, 1 restarts, 2 dropped)");
    }

    #[test]
    fn test_status_interval_never_zero() {
        let bridge = Bridge::new(RecordingJoystick::default(), AxisMapper::default(), fast_restart())
            .with_status_interval(0);
        assert_eq!(bridge.status_interval, 1);
    }

    // ==================== Loop Tests ====================

    #[tokio::test]
    async fn test_run_over_loopback_until_shutdown() {
        let receiver = DatagramReceiver::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let target = receiver.local_addr();
        let sink = RecordingJoystick::default();
        let mut bridge = Bridge::new(sink.clone(), AxisMapper::default(), fast_restart());
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let oversized = vec![b'9'; RECV_BUFFER_SIZE + 100];
        let observed = sink.clone();
        let client = tokio::spawn(async move {
            let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
            socket.send_to(&oversized, target).await.unwrap();
            socket.send_to(b"abc,1,0", target).await.unwrap();
            socket.send_to(b"10,1,0", target).await.unwrap();
            socket.send_to(b"restart", target).await.unwrap();

            // Stop once the last packet has been handled
            for _ in 0..200 {
                if observed.writes().len() >= 4 {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            let _ = stop_tx.send(());
        });

        bridge
            .run(&receiver, async {
                let _ = stop_rx.await;
            })
            .await;
        client.await.unwrap();

        assert_eq!(
            sink.writes(),
            vec![
                Write::Axis(Axis::X, 12743),
                Write::Axis(Axis::Y, 0),
                Write::Button(1, true),
                Write::Button(1, false),
            ]
        );
        assert_eq!(bridge.stats(), BridgeStats { frames: 1, restarts: 1, dropped: 2 });
    }
}
