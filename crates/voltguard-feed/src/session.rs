//! Sans-IO frame feed state machine.
//!
//! ```text
//! Idle ──open──▶ Connecting ──connected──▶ Connected ──disconnected──▶ Disconnected
//!                                            │  ▲                          │
//!                                            └──┘ frame / error            └─connected─▶ Connected
//! any ──teardown──▶ Closed
//! ```
//!
//! Every transition returns the [`FeedAction`]s the caller must perform.
//! The session never emits a `RequestFrame` outside `Connected` and never
//! has more than one in flight.

use std::fmt;
use std::time::{Duration, Instant};

use bytes::Bytes;
use serde::Serialize;
use voltguard_wire::FeedMessage;

use crate::clock::{Clock, SystemClock};
use crate::config::FeedConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Disconnected,
    Closed,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Closed => "closed",
        }
    }

    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The most recently displayed frame.
#[derive(Clone, PartialEq, Eq)]
pub struct LatestFrame {
    /// Decoded JPEG bytes.
    pub image: Bytes,
    /// Count of frames displayed by this session, starting at 1.
    pub sequence: u64,
    pub received_at: Instant,
}

impl fmt::Debug for LatestFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LatestFrame")
            .field("image", &format_args!("<{} bytes>", self.image.len()))
            .field("sequence", &self.sequence)
            .finish()
    }
}

/// Work the caller must carry out after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedAction {
    /// Write a message to the transport.
    Send(FeedMessage),
    /// Replace the displayed frame.
    Display(LatestFrame),
    /// Close and release the transport.
    Close,
}

/// Session counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStats {
    pub requests_sent: u64,
    pub frames_received: u64,
    /// Frames whose image could not be decoded.
    pub frames_dropped: u64,
    pub server_errors: u64,
    /// Delayed requests actually sent after a server error.
    pub retries: u64,
}

pub struct FeedSession<C = SystemClock> {
    clock: C,
    retry_delay: Duration,
    state: ConnectionState,
    outstanding: bool,
    retry_at: Option<Instant>,
    has_frame: bool,
    stats: FeedStats,
}

impl FeedSession<SystemClock> {
    pub fn new(config: &FeedConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> FeedSession<C> {
    pub fn with_clock(config: &FeedConfig, clock: C) -> Self {
        Self {
            clock,
            retry_delay: config.retry_delay,
            state: ConnectionState::Idle,
            outstanding: false,
            retry_at: None,
            has_frame: false,
            stats: FeedStats::default(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether at least one frame has been displayed.
    pub fn has_frame(&self) -> bool {
        self.has_frame
    }

    /// Whether a `RequestFrame` is awaiting its `frame` or `error` reply.
    pub fn request_outstanding(&self) -> bool {
        self.outstanding
    }

    /// When the pending post-error retry is due, if one is scheduled.
    pub fn retry_deadline(&self) -> Option<Instant> {
        self.retry_at
    }

    pub fn stats(&self) -> FeedStats {
        self.stats
    }

    /// `Idle → Connecting`. The caller starts connecting the transport.
    pub fn open(&mut self) -> Vec<FeedAction> {
        if self.state == ConnectionState::Idle {
            self.transition(ConnectionState::Connecting);
        } else {
            tracing::debug!(state = %self.state, "open ignored");
        }
        Vec::new()
    }

    /// The transport reports an established connection.
    ///
    /// Seeds the pull loop with one `RequestFrame`. Accepted from `Connecting`
    /// and, when the transport reconnects on its own, from `Disconnected`.
    pub fn on_connected(&mut self) -> Vec<FeedAction> {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Disconnected => {
                self.transition(ConnectionState::Connected);
                self.outstanding = false;
                self.retry_at = None;
                let mut actions = Vec::with_capacity(1);
                self.request_frame(&mut actions);
                actions
            }
            state => {
                tracing::debug!(%state, "connect signal ignored");
                Vec::new()
            }
        }
    }

    /// A message arrived from the server.
    pub fn on_message(&mut self, message: FeedMessage) -> Vec<FeedAction> {
        if !self.state.is_connected() {
            tracing::debug!(state = %self.state, event = message.event(), "message ignored");
            return Vec::new();
        }

        let mut actions = Vec::with_capacity(2);
        match message {
            FeedMessage::Frame(payload) => {
                let image = payload.decode_image().map_err(|err| err.to_string());
                self.on_frame(image, &mut actions);
            }
            FeedMessage::InvalidFrame { reason, .. } => self.on_frame(Err(reason), &mut actions),
            FeedMessage::Error(err) => {
                self.outstanding = false;
                self.stats.server_errors += 1;
                if self.retry_at.is_none() {
                    self.retry_at = Some(self.clock.now() + self.retry_delay);
                }
                tracing::warn!(
                    error = %err.message(),
                    retry_in_ms = self.retry_delay.as_millis() as u64,
                    "frame server reported an error"
                );
            }
            other => {
                tracing::debug!(event = other.event(), "unhandled event");
            }
        }
        actions
    }

    /// Fire the post-error retry if it is due.
    pub fn poll_retry(&mut self) -> Vec<FeedAction> {
        let due = self
            .retry_at
            .is_some_and(|deadline| self.clock.now() >= deadline);
        if !due || !self.state.is_connected() {
            return Vec::new();
        }

        self.retry_at = None;
        let mut actions = Vec::with_capacity(1);
        if self.request_frame(&mut actions) {
            self.stats.retries += 1;
        }
        actions
    }

    /// The transport dropped. No reconnect is attempted here.
    pub fn on_disconnected(&mut self) -> Vec<FeedAction> {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => {
                self.transition(ConnectionState::Disconnected);
                self.outstanding = false;
                self.retry_at = None;
            }
            state => tracing::debug!(%state, "disconnect signal ignored"),
        }
        Vec::new()
    }

    /// Tear the session down. Cancels any pending retry.
    ///
    /// The first call always yields [`FeedAction::Close`] regardless of state.
    /// Later calls yield nothing.
    pub fn teardown(&mut self) -> Vec<FeedAction> {
        if self.state == ConnectionState::Closed {
            return Vec::new();
        }
        if self.retry_at.take().is_some() {
            tracing::debug!("pending retry cancelled by teardown");
        }
        self.outstanding = false;
        self.transition(ConnectionState::Closed);
        vec![FeedAction::Close]
    }

    /// A `frame` reply arrived. Undecodable images are dropped, but the reply
    /// still answers the outstanding request and the next one goes out.
    fn on_frame(
        &mut self,
        image: std::result::Result<Bytes, String>,
        actions: &mut Vec<FeedAction>,
    ) {
        self.outstanding = false;
        self.retry_at = None;
        self.stats.frames_received += 1;
        match image {
            Ok(image) => {
                self.has_frame = true;
                let frame = LatestFrame {
                    image,
                    sequence: self.stats.frames_received - self.stats.frames_dropped,
                    received_at: self.clock.now(),
                };
                tracing::debug!(sequence = frame.sequence, size = frame.image.len(), "frame received");
                actions.push(FeedAction::Display(frame));
            }
            Err(reason) => {
                self.stats.frames_dropped += 1;
                tracing::warn!(error = %reason, "dropping undecodable frame");
            }
        }
        self.request_frame(actions);
    }

    fn request_frame(&mut self, actions: &mut Vec<FeedAction>) -> bool {
        if !self.state.is_connected() || self.outstanding {
            return false;
        }
        self.outstanding = true;
        self.stats.requests_sent += 1;
        actions.push(FeedAction::Send(FeedMessage::RequestFrame));
        true
    }

    fn transition(&mut self, to: ConnectionState) {
        tracing::info!(from = %self.state, to = %to, "feed state changed");
        self.state = to;
    }
}
