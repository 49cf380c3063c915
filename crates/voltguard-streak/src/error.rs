/// Errors that can occur while parsing streak data.
#[derive(Debug, thiserror::Error)]
pub enum StreakError {
    /// The streak document is not valid JSON or has the wrong shape.
    #[error("invalid streak document: {0}")]
    Json(#[from] serde_json::Error),

    /// A tier label did not match any known tier.
    #[error("unknown tier: {0:?}")]
    UnknownTier(String),

    /// A day name did not match any weekday.
    #[error("unknown weekday: {0:?}")]
    UnknownWeekday(String),
}

pub type Result<T> = std::result::Result<T, StreakError>;
