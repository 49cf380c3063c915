use serde::{Deserialize, Serialize};

use crate::profile::{progress_fraction, TierProfile};
use crate::tier::{classify, Tier, MAX_MISSED_DAYS};

/// Classifier input, as supplied by the streak data source.
///
/// Missing fields deserialize to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreakMetrics {
    /// Consecutive qualifying days.
    pub current_streak: u32,
    /// Average energy-efficiency score over the last week, `0..=100`.
    pub avg_efficiency: f64,
    pub missed_days: u32,
}

impl StreakMetrics {
    pub fn new(current_streak: u32, avg_efficiency: f64, missed_days: u32) -> Self {
        Self {
            current_streak,
            avg_efficiency,
            missed_days,
        }
    }

    pub fn tier(&self) -> Tier {
        classify(
            i64::from(self.current_streak),
            self.avg_efficiency,
            i64::from(self.missed_days),
        )
    }

    /// Whether the missed-day rule alone forces [`Tier::LowActivity`].
    pub fn missed_too_many(&self) -> bool {
        i64::from(self.missed_days) > MAX_MISSED_DAYS
    }

    pub fn profile(&self) -> &'static TierProfile {
        self.tier().profile()
    }

    /// Progress toward the end of the current tier's streak window.
    pub fn progress(&self) -> f64 {
        progress_fraction(self.current_streak, self.profile())
    }
}
