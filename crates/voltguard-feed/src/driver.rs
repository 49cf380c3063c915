//! Async runtime for [`FeedSession`].
//!
//! One tokio task owns the session and the transport. Transport events,
//! the retry timer and cancellation are funnelled through a single
//! `select!`, so transitions happen one at a time on one logical context.

use std::future::Future;
use std::time::Instant;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use voltguard_wire::{FeedMessage, WireError};

use crate::clock::{Clock, TokioClock};
use crate::config::FeedConfig;
use crate::error::{FeedError, Result};
use crate::session::{ConnectionState, FeedAction, FeedSession, FeedStats, LatestFrame};

/// A connected, message-oriented, full-duplex transport.
pub trait FeedTransport:
    Stream<Item = std::result::Result<FeedMessage, WireError>>
    + Sink<FeedMessage, Error = WireError>
    + Unpin
    + Send
    + 'static
{
}

impl<T> FeedTransport for T where
    T: Stream<Item = std::result::Result<FeedMessage, WireError>>
        + Sink<FeedMessage, Error = WireError>
        + Unpin
        + Send
        + 'static
{
}

/// Snapshot of the feed for status indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatus {
    pub state: ConnectionState,
    pub has_frame: bool,
    pub stats: FeedStats,
}

impl FeedStatus {
    fn of<C: Clock>(session: &FeedSession<C>) -> Self {
        Self {
            state: session.state(),
            has_frame: session.has_frame(),
            stats: session.stats(),
        }
    }
}

impl Default for FeedStatus {
    fn default() -> Self {
        Self {
            state: ConnectionState::Idle,
            has_frame: false,
            stats: FeedStats::default(),
        }
    }
}

/// Builds and starts frame feed sessions.
#[derive(Debug, Clone)]
pub struct FeedClient {
    config: FeedConfig,
}

impl FeedClient {
    pub fn new(config: FeedConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Connect to `config.endpoint` over TCP and start pulling frames.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect_tcp(self) -> FeedHandle {
        let connect = crate::tcp::connect(self.config.clone());
        self.spawn(connect)
    }

    /// Start a session over the transport produced by `connect`.
    ///
    /// The session is `Connecting` until `connect` resolves. A failed connect
    /// leaves it `Disconnected`. Must be called from within a tokio runtime.
    pub fn spawn<F, T>(self, connect: F) -> FeedHandle
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: FeedTransport,
    {
        let (status_tx, status_rx) = watch::channel(FeedStatus::default());
        let (frame_tx, frame_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        let driver = Driver {
            session: FeedSession::with_clock(&self.config, TokioClock),
            status: status_tx,
            frames: frame_tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(driver.run(connect));

        FeedHandle {
            status: status_rx,
            frames: frame_rx,
            cancel: cancel.clone(),
            task,
            _guard: cancel.drop_guard(),
        }
    }
}

/// Owner of a running feed session.
///
/// The connection lives exactly as long as the handle: dropping it (or
/// calling [`FeedHandle::shutdown`]) tears the session down and closes the
/// transport.
pub struct FeedHandle {
    status: watch::Receiver<FeedStatus>,
    frames: watch::Receiver<Option<LatestFrame>>,
    cancel: CancellationToken,
    task: JoinHandle<Option<FeedError>>,
    _guard: DropGuard,
}

impl FeedHandle {
    pub fn status(&self) -> FeedStatus {
        *self.status.borrow()
    }

    /// Watch status changes.
    pub fn subscribe(&self) -> watch::Receiver<FeedStatus> {
        self.status.clone()
    }

    /// The most recently displayed frame.
    pub fn latest_frame(&self) -> Option<LatestFrame> {
        self.frames.borrow().clone()
    }

    /// Watch displayed frames. Only the newest frame is retained.
    pub fn subscribe_frames(&self) -> watch::Receiver<Option<LatestFrame>> {
        self.frames.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Tear down the session, close the transport and wait for the task.
    ///
    /// Returns the final status, which is always [`ConnectionState::Closed`].
    /// If the connection failed or was lost with an error before shutdown,
    /// that error is returned instead. A server that simply hangs up is not
    /// an error.
    pub async fn shutdown(self) -> Result<FeedStatus> {
        let FeedHandle {
            status,
            cancel,
            task,
            _guard,
            ..
        } = self;
        cancel.cancel();
        let failure = task
            .await
            .map_err(|err| FeedError::TaskFailed(err.to_string()))?;
        if let Some(err) = failure {
            return Err(err);
        }
        let last = *status.borrow();
        Ok(last)
    }
}

enum Wake {
    Teardown,
    RetryDue,
    Incoming(Option<std::result::Result<FeedMessage, WireError>>),
}

enum Exit {
    Teardown,
    Disconnected(Option<FeedError>),
}

struct Driver {
    session: FeedSession<TokioClock>,
    status: watch::Sender<FeedStatus>,
    frames: watch::Sender<Option<LatestFrame>>,
    cancel: CancellationToken,
}

impl Driver {
    /// Returns the error that ended the connection, if any.
    async fn run<F, T>(mut self, connect: F) -> Option<FeedError>
    where
        F: Future<Output = Result<T>>,
        T: FeedTransport,
    {
        self.session.open();
        self.publish();

        let cancel = self.cancel.clone();
        let connected = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = connect => Some(result),
        };

        let failure = match connected {
            None => {
                self.session.teardown();
                self.publish();
                return None;
            }
            Some(Err(err)) => {
                tracing::warn!(error = %err, "frame feed connection failed");
                self.session.on_disconnected();
                self.publish();
                Some(err)
            }
            Some(Ok(transport)) => match self.pump(transport).await {
                Exit::Teardown => return None,
                Exit::Disconnected(err) => err,
            },
        };

        // Disconnected is terminal for this task; hold the status until the
        // owner lets go.
        cancel.cancelled().await;
        self.session.teardown();
        self.publish();
        failure
    }

    async fn pump<T: FeedTransport>(&mut self, mut transport: T) -> Exit {
        let actions = self.session.on_connected();
        if let Err(err) = self.apply(actions, &mut transport).await {
            return self.lost(Some(err));
        }

        let cancel = self.cancel.clone();
        loop {
            self.publish();
            let retry_at = self.session.retry_deadline();

            let wake = tokio::select! {
                biased;
                _ = cancel.cancelled() => Wake::Teardown,
                _ = retry_timer(retry_at) => Wake::RetryDue,
                incoming = transport.next() => Wake::Incoming(incoming),
            };

            let actions = match wake {
                Wake::Teardown => {
                    let actions = self.session.teardown();
                    if let Err(err) = self.apply(actions, &mut transport).await {
                        tracing::debug!(error = %err, "error while closing feed transport");
                    }
                    self.publish();
                    return Exit::Teardown;
                }
                Wake::RetryDue => self.session.poll_retry(),
                Wake::Incoming(Some(Ok(message))) => self.session.on_message(message),
                Wake::Incoming(Some(Err(err))) => return self.lost(Some(err)),
                Wake::Incoming(None) => return self.lost(None),
            };

            if let Err(err) = self.apply(actions, &mut transport).await {
                return self.lost(Some(err));
            }
        }
    }

    async fn apply<T: FeedTransport>(
        &self,
        actions: Vec<FeedAction>,
        transport: &mut T,
    ) -> std::result::Result<(), WireError> {
        for action in actions {
            match action {
                FeedAction::Send(message) => {
                    tracing::debug!(event = message.event(), "sending");
                    transport.send(message).await?;
                }
                FeedAction::Display(frame) => {
                    self.frames.send_replace(Some(frame));
                }
                FeedAction::Close => transport.close().await?,
            }
        }
        Ok(())
    }

    fn lost(&mut self, err: Option<WireError>) -> Exit {
        match &err {
            Some(err) => tracing::warn!(error = %err, "frame feed connection lost"),
            None => tracing::info!("frame server closed the connection"),
        }
        self.session.on_disconnected();
        self.publish();
        Exit::Disconnected(err.map(FeedError::from))
    }

    fn publish(&self) {
        self.status.send_replace(FeedStatus::of(&self.session));
    }
}

async fn retry_timer(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
