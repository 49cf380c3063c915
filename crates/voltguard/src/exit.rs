use std::fmt;
use std::io;

use voltguard_feed::FeedError;
use voltguard_streak::StreakError;
use voltguard_wire::WireError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn streak_error(context: &str, err: StreakError) -> CliError {
    match err {
        StreakError::Json(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        StreakError::UnknownTier(_) | StreakError::UnknownWeekday(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
    }
}

pub fn wire_error(context: &str, err: WireError) -> CliError {
    match err {
        WireError::Io(source) => io_error(context, source),
        WireError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        WireError::InvalidMagic | WireError::PayloadTooLarge { .. } => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn feed_error(context: &str, err: FeedError) -> CliError {
    match err {
        FeedError::Wire(err) => wire_error(context, err),
        FeedError::Connect { source, .. } | FeedError::Io(source) => io_error(context, source),
        FeedError::ConnectTimeout { .. } => CliError::new(TIMEOUT, format!("{context}: {err}")),
        FeedError::TaskFailed(_) => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn feed_errors_map_to_exit_codes() {
        let refused = FeedError::Connect {
            endpoint: "127.0.0.1:1".to_string(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        assert_eq!(feed_error("watch", refused).code, FAILURE);

        let timeout = FeedError::ConnectTimeout {
            endpoint: "10.0.0.1:8000".to_string(),
            timeout: Duration::from_secs(5),
        };
        let err = feed_error("watch", timeout);
        assert_eq!(err.code, TIMEOUT);
        assert!(err.message.starts_with("watch: "));

        let wire = FeedError::Wire(WireError::InvalidMagic);
        assert_eq!(feed_error("watch", wire).code, TRANSPORT_ERROR);
    }

    #[test]
    fn malformed_snapshot_is_data_invalid() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            streak_error("streak", StreakError::Json(err)).code,
            DATA_INVALID
        );
        assert_eq!(
            streak_error("tier", StreakError::UnknownTier("gold".into())).code,
            USAGE
        );
    }
}
