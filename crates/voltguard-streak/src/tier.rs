use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StreakError;

/// More missed days than this forces [`Tier::LowActivity`].
pub const MAX_MISSED_DAYS: i64 = 2;

/// Average efficiency below this forces [`Tier::LowActivity`].
pub const LOW_ACTIVITY_EFFICIENCY: f64 = 40.0;

/// Minimum streak for [`Tier::HighPerformer`].
pub const HIGH_PERFORMER_MIN_STREAK: i64 = 11;

/// Minimum average efficiency for [`Tier::HighPerformer`].
pub const HIGH_PERFORMER_EFFICIENCY: f64 = 60.0;

/// Streak window for [`Tier::Steady`].
pub const STEADY_STREAK: RangeInclusive<i64> = 4..=10;

/// Minimum average efficiency for [`Tier::Steady`].
pub const STEADY_EFFICIENCY: f64 = 50.0;

/// Engagement tier. Drives the pet shown on the streak panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tier {
    /// Catch-all tier for new or middling users.
    #[default]
    #[serde(rename = "Starter")]
    Starter,
    /// Neglect tier: too many missed days or poor efficiency.
    #[serde(rename = "Low Activity")]
    LowActivity,
    /// Four to ten days with at least 50% efficiency.
    #[serde(rename = "Steady")]
    Steady,
    /// Eleven or more days with at least 60% efficiency.
    #[serde(rename = "High Performer")]
    HighPerformer,
}

impl Tier {
    /// Every tier, in display order.
    pub const ALL: [Tier; 4] = [
        Tier::Starter,
        Tier::LowActivity,
        Tier::Steady,
        Tier::HighPerformer,
    ];

    /// Human-readable label, identical to the wire representation.
    pub fn label(self) -> &'static str {
        match self {
            Tier::Starter => "Starter",
            Tier::LowActivity => "Low Activity",
            Tier::Steady => "Steady",
            Tier::HighPerformer => "High Performer",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tier {
    type Err = StreakError;

    /// Accepts the display label as well as `snake_case`, `kebab-case` and
    /// `CamelCase` spellings, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "starter" => Ok(Tier::Starter),
            "lowactivity" => Ok(Tier::LowActivity),
            "steady" => Ok(Tier::Steady),
            "highperformer" => Ok(Tier::HighPerformer),
            _ => Err(StreakError::UnknownTier(s.to_string())),
        }
    }
}

/// Classify streak metrics into a tier.
///
/// Rules are evaluated in order and the first match wins:
///
/// 1. `missed_days > 2` or `avg_efficiency < 40` → [`Tier::LowActivity`]
/// 2. `streak_days >= 11` and `avg_efficiency >= 60` → [`Tier::HighPerformer`]
/// 3. `4 <= streak_days <= 10` and `avg_efficiency >= 50` → [`Tier::Steady`]
/// 4. anything else → [`Tier::Starter`]
///
/// The neglect rule overrides streak length. A long streak whose efficiency
/// sits in `[40, 60)` is *not* promoted and lands in `Starter`.
///
/// Out-of-range inputs are not clamped. Negative counts and NaN efficiency go
/// through the same comparisons (NaN fails every one of them, so it reaches
/// `Starter`).
pub fn classify(streak_days: i64, avg_efficiency: f64, missed_days: i64) -> Tier {
    if missed_days > MAX_MISSED_DAYS || avg_efficiency < LOW_ACTIVITY_EFFICIENCY {
        return Tier::LowActivity;
    }

    if streak_days >= HIGH_PERFORMER_MIN_STREAK && avg_efficiency >= HIGH_PERFORMER_EFFICIENCY {
        return Tier::HighPerformer;
    }

    if STEADY_STREAK.contains(&streak_days) && avg_efficiency >= STEADY_EFFICIENCY {
        return Tier::Steady;
    }

    Tier::Starter
}
