//! Streaming client.
//!
//! # Pull Step
//!
//! ```text
//! receive_line ──> decode ──> filter ──> [packet out] ──> assemble ──> [frame out]
//!      │             │          │
//!      │             │          └─ mismatch: packets_filtered, next line
//!      │             └─ error: parse_errors; strict raises, tolerant drops
//!      └─ Timeout / Disconnected: recoverable error
//!         Closed: clean end
//!         Io: terminal error
//! ```
//!
//! In `both` output mode a completed frame is queued and yielded on the pull
//! after its packet.

use std::time::Duration;

use futures::Stream;
use hts_core::{CloseHandle, FrameStamps, HandFrameAssembler, LineReceiver, TransportError};
use hts_proto::{HandFrame, HandSide, Packet, decode};

use crate::{
    config::{ClientConfig, ErrorPolicy},
    error::ClientError,
    event::StreamEvent,
    hook::{self, HookError, LogEventKind, StreamLogEvent},
    stats::ClientStats,
    transport::Receiver,
};

/// Pull-based HTS stream client.
///
/// Generic over the receiver so tests can inject scripted sources; the
/// default is the socket [`Receiver`] chosen by the configuration.
#[derive(Debug)]
pub struct Client<R = Receiver> {
    config: ClientConfig,
    receiver: R,
    assembler: HandFrameAssembler,
    stats: ClientStats,
    queued_frame: Option<HandFrame>,
    finished: bool,
}

impl Client<Receiver> {
    /// Validate `config` and open the receiver it describes.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Config`] if the configuration is invalid; no I/O happens
    /// - [`ClientError::Bind`] if a listening socket cannot be bound
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let receiver = Receiver::open(&config).await?;
        tracing::info!(mode = %config.transport_mode, address = %config.address(), "client started");
        Ok(Self::assemble(config, receiver))
    }
}

impl<R: LineReceiver> Client<R> {
    /// Client over an existing receiver.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the configuration is invalid.
    pub fn with_receiver(config: ClientConfig, receiver: R) -> Result<Self, ClientError> {
        config.validate()?;
        Ok(Self::assemble(config, receiver))
    }

    fn assemble(config: ClientConfig, receiver: R) -> Self {
        let assembler = config
            .frame_id_by_side
            .iter()
            .fold(HandFrameAssembler::new(), |assembler, (side, id)| {
                assembler.with_frame_id(*side, id.clone())
            });

        Self {
            config,
            receiver,
            assembler,
            stats: ClientStats::default(),
            queued_frame: None,
            finished: false,
        }
    }

    /// Pull the next event.
    ///
    /// `Ok(None)` marks the end of the stream, after which every call returns
    /// `Ok(None)` again.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Timeout`] and [`ClientError::Disconnected`] are
    ///   recoverable; pull again to continue
    /// - [`ClientError::Decode`] (strict policy) and [`ClientError::Transport`]
    ///   end the stream
    pub async fn next_event(&mut self) -> Result<Option<StreamEvent>, ClientError> {
        if let Some(frame) = self.queued_frame.take() {
            return Ok(Some(self.emit_frame(frame)));
        }

        loop {
            if self.finished {
                return Ok(None);
            }

            let received = match self.receiver.receive_line(self.config.timeout).await {
                Ok(received) => received,
                Err(err) => return self.transport_failure(err),
            };

            self.stats.lines_received += 1;
            self.log(|| {
                StreamLogEvent::new(LogEventKind::ReceivedLine, "received line")
                    .with_line(&received.line)
            });

            let packet = match decode(&received.line, received.meta.recv_ts_ns) {
                Ok(packet) => packet,
                Err(source) => {
                    self.stats.parse_errors += 1;
                    tracing::debug!(line = %received.line, error = %source, "failed to decode line");
                    self.log(|| {
                        StreamLogEvent::new(LogEventKind::ParseError, "failed to decode line")
                            .with_line(&received.line)
                            .with_error(&source)
                    });

                    match self.config.error_policy {
                        ErrorPolicy::Strict => {
                            self.finish();
                            return Err(ClientError::Decode { line: received.line, source });
                        },
                        ErrorPolicy::Tolerant => {
                            self.stats.dropped_lines += 1;
                            continue;
                        },
                    }
                },
            };

            let side = packet.side();
            if !self.config.hand_filter.matches(side) {
                self.stats.packets_filtered += 1;
                self.log(|| {
                    StreamLogEvent::new(LogEventKind::FilteredPacket, "packet filtered by hand")
                        .with_side(side)
                });
                continue;
            }

            let stamps = FrameStamps {
                recv_time_unix_ns: received
                    .meta
                    .recv_time_unix_ns
                    .filter(|_| self.config.include_wall_time),
                source_ts_ns: None,
            };
            let frame = self
                .assembler
                .push_with(packet, stamps)
                .filter(|_| self.config.output.includes_frames());

            if self.config.output.includes_packets() {
                self.queued_frame = frame;
                return Ok(Some(self.emit_packet(packet)));
            }
            if let Some(frame) = frame {
                return Ok(Some(self.emit_frame(frame)));
            }
        }
    }

    /// Consume the client as a [`Stream`].
    ///
    /// Recoverable errors are yielded and the stream continues. The stream
    /// ends after the clean end or after yielding a terminal error.
    pub fn into_stream(self) -> impl Stream<Item = Result<StreamEvent, ClientError>> {
        futures::stream::unfold(Some(self), |state| async move {
            let mut client = state?;
            match client.next_event().await {
                Ok(Some(event)) => Some((Ok(event), Some(client))),
                Ok(None) => None,
                Err(err) => {
                    let next = if err.is_terminal() { None } else { Some(client) };
                    Some((Err(err), next))
                },
            }
        })
    }

    /// Drive the stream, passing each event to `callback`.
    ///
    /// Timeouts and disconnects are skipped. Stops after `max_events` events
    /// when given, or at the end of the stream. Returns the number of events
    /// processed.
    ///
    /// # Errors
    ///
    /// Returns terminal stream errors, and [`ClientError::Callback`] when the
    /// callback fails.
    pub async fn run<F>(&mut self, mut callback: F, max_events: Option<u64>) -> Result<u64, ClientError>
    where
        F: FnMut(&StreamEvent) -> Result<(), HookError>,
    {
        let mut processed = 0;

        while max_events.is_none_or(|max| processed < max) {
            let event = match self.next_event().await {
                Ok(Some(event)) => event,
                Ok(None) => break,
                Err(err) if err.is_recoverable() => continue,
                Err(err) => return Err(err),
            };

            if let Err(error) = callback(&event) {
                self.stats.callback_errors += 1;
                tracing::warn!(%error, "event callback failed");
                self.log(|| {
                    StreamLogEvent::new(LogEventKind::CallbackError, "event callback failed")
                        .with_side(event.side())
                        .with_error(&error)
                });
                return Err(ClientError::Callback(error));
            }
            self.stats.callbacks_invoked += 1;
            processed += 1;
        }

        Ok(processed)
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> ClientStats {
        self.stats
    }

    /// Zero every counter.
    pub fn reset_stats(&mut self) {
        self.stats = ClientStats::default();
    }

    /// Close the receiver. The next pull ends the stream.
    pub fn close(&mut self) {
        self.receiver.close();
    }

    /// Handle that closes the receiver from another task or thread.
    pub fn close_handle(&self) -> CloseHandle {
        self.receiver.close_handle()
    }

    /// Frame assembler state.
    pub fn assembler(&self) -> &HandFrameAssembler {
        &self.assembler
    }

    /// Active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Underlying receiver.
    pub fn receiver(&self) -> &R {
        &self.receiver
    }

    fn transport_failure(
        &mut self,
        err: TransportError,
    ) -> Result<Option<StreamEvent>, ClientError> {
        match err {
            TransportError::Timeout(timeout) => {
                self.log(|| StreamLogEvent::new(LogEventKind::Timeout, timeout_message(timeout)));
                Err(ClientError::Timeout(timeout))
            },
            TransportError::Disconnected { reason } => {
                self.log(|| {
                    StreamLogEvent::new(LogEventKind::Disconnected, "peer disconnected")
                        .with_error(&reason)
                });
                Err(ClientError::Disconnected { reason })
            },
            TransportError::Closed => {
                self.finished = true;
                tracing::debug!(stats = ?self.stats, "stream closed");
                self.log(|| StreamLogEvent::new(LogEventKind::Closed, "receiver closed"));
                Ok(None)
            },
            TransportError::Io(err) => {
                self.finish();
                Err(ClientError::Transport(err))
            },
        }
    }

    fn emit_packet(&mut self, packet: Packet) -> StreamEvent {
        self.stats.packets_emitted += 1;
        let side = packet.side();
        self.log(|| {
            StreamLogEvent::new(LogEventKind::EmittedPacket, format!("emitted {} packet", packet.kind()))
                .with_side(side)
        });
        StreamEvent::Packet(packet)
    }

    fn emit_frame(&mut self, frame: HandFrame) -> StreamEvent {
        self.stats.frames_emitted += 1;
        let (side, sequence_id) = (frame.side, frame.sequence_id);
        self.log(|| frame_event(side, sequence_id));
        StreamEvent::Frame(frame)
    }

    /// End the stream after a terminal error.
    fn finish(&mut self) {
        self.finished = true;
        self.receiver.close();
    }

    fn log(&mut self, build: impl FnOnce() -> StreamLogEvent) {
        hook::dispatch(self.config.log_hook.as_deref(), &mut self.stats, build);
    }
}

fn timeout_message(timeout: Duration) -> String {
    format!("no data within {timeout:?}")
}

fn frame_event(side: HandSide, sequence_id: u64) -> StreamLogEvent {
    StreamLogEvent::new(LogEventKind::EmittedFrame, format!("emitted frame {sequence_id}"))
        .with_side(side)
}
