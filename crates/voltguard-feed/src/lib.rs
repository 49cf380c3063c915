//! Pull-based camera frame feed client.
//!
//! The client holds one persistent connection and pulls frames one at a
//! time: it sends `get_frame`, waits for a `frame`, shows it, and asks again.
//! There is never more than one request in flight.
//!
//! The protocol logic lives in [`FeedSession`], a sans-IO state machine that
//! turns transport events into [`FeedAction`]s. [`FeedClient`] drives a
//! session on a tokio task over any [`FeedTransport`] and hands back a
//! [`FeedHandle`] whose lifetime bounds the connection.

pub mod clock;
pub mod config;
pub mod driver;
pub mod error;
pub mod session;
pub mod tcp;

pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use config::{FeedConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_ENDPOINT, DEFAULT_RETRY_DELAY};
pub use driver::{FeedClient, FeedHandle, FeedStatus, FeedTransport};
pub use error::{FeedError, Result};
pub use session::{ConnectionState, FeedAction, FeedSession, FeedStats, LatestFrame};
pub use tcp::TcpTransport;
