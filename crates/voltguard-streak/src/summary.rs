//! Streak snapshot → display summary.
//!
//! The snapshot is what the streak data source hands us. The summary is the
//! derived view: tier, profile, progress, weekly goals and pet state.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::StreakMetrics;
use crate::profile::{progress_fraction, Animation, TierProfile};
use crate::tier::Tier;
use crate::usage::{WeeklyUsage, TOTAL_WEEKLY_GOALS};

/// Pet name used when the data source does not provide one.
pub const DEFAULT_PET_NAME: &str = "Sparky";

/// Streak data as supplied by the collaborator.
///
/// Every field is optional on the wire. Missing numbers default to zero.
/// If `avgEfficiency` is missing it is derived from `weeklyUsage`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreakSnapshot {
    pub current_streak: u32,
    pub best_streak: u32,
    pub missed_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_efficiency: Option<f64>,
    /// Explicit goal count; otherwise computed from `weekly_usage`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_goals_met: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_usage: Option<WeeklyUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pet_name: Option<String>,
}

impl StreakSnapshot {
    /// Parse a snapshot, failing on malformed JSON.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Parse a snapshot, falling back to [`StreakSnapshot::default`] when the
    /// document cannot be parsed at all.
    pub fn from_json_lossy(input: &str) -> Self {
        match Self::from_json(input) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(error = %err, "malformed streak snapshot, using defaults");
                Self::default()
            }
        }
    }

    pub fn metrics(&self) -> StreakMetrics {
        let avg_efficiency = self.avg_efficiency.unwrap_or_else(|| {
            self.weekly_usage
                .as_ref()
                .map(WeeklyUsage::average_efficiency)
                .unwrap_or(0.0)
        });
        StreakMetrics::new(self.current_streak, avg_efficiency, self.missed_days)
    }

    /// Whether the snapshot carries no efficiency data at all.
    ///
    /// Such a snapshot is shown as `Starter` (the tier new users start in)
    /// instead of the `Low Activity` its zero efficiency would produce,
    /// unless the missed-day rule applies.
    fn is_blank(&self) -> bool {
        self.avg_efficiency.is_none() && self.weekly_usage.is_none()
    }
}

/// Pet display state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetState {
    pub name: String,
    pub tier: Tier,
    pub image_url: &'static str,
    pub animation_state: Animation,
}

impl PetState {
    pub fn new(name: impl Into<String>, tier: Tier) -> Self {
        let profile = tier.profile();
        Self {
            name: name.into(),
            tier,
            image_url: profile.image_ref,
            animation_state: profile.animation,
        }
    }
}

/// Derived streak view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    pub current_streak: u32,
    pub best_streak: u32,
    pub missed_days: u32,
    pub avg_efficiency: f64,
    pub tier: Tier,
    pub profile: &'static TierProfile,
    /// `0..=1`, display only.
    pub progress: f64,
    /// The top tier has no progress bar.
    pub max_tier_reached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_to_next_tier: Option<u32>,
    pub next_tier_hint: String,
    pub weekly_goals_met: u32,
    pub total_goals: u32,
    pub pet: PetState,
    pub weekly_usage: WeeklyUsage,
}

impl StreakSummary {
    pub fn from_snapshot(snapshot: &StreakSnapshot) -> Self {
        let metrics = snapshot.metrics();
        let tier = match metrics.tier() {
            // Without efficiency data only the missed-day rule can demote.
            Tier::LowActivity if snapshot.is_blank() && !metrics.missed_too_many() => {
                Tier::default()
            }
            tier => tier,
        };
        let profile = tier.profile();
        let weekly_usage = snapshot.weekly_usage.clone().unwrap_or_default();
        let weekly_goals_met = snapshot
            .weekly_goals_met
            .unwrap_or_else(|| weekly_usage.goals_met())
            .min(TOTAL_WEEKLY_GOALS);
        let pet_name = snapshot
            .pet_name
            .clone()
            .unwrap_or_else(|| DEFAULT_PET_NAME.to_string());

        Self {
            current_streak: metrics.current_streak,
            best_streak: snapshot.best_streak.max(metrics.current_streak),
            missed_days: metrics.missed_days,
            avg_efficiency: metrics.avg_efficiency,
            tier,
            profile,
            progress: progress_fraction(metrics.current_streak, profile),
            max_tier_reached: tier.is_max_tier(),
            days_to_next_tier: tier.days_to_next_tier(metrics.current_streak),
            next_tier_hint: tier.next_tier_hint(metrics.current_streak),
            weekly_goals_met,
            total_goals: TOTAL_WEEKLY_GOALS,
            pet: PetState::new(pet_name, tier),
            weekly_usage,
        }
    }
}

/// Tier change between two evaluations, e.g. before and after recording a
/// day of usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierTransition {
    #[serde(rename = "oldTier")]
    pub old: Tier,
    #[serde(rename = "newTier")]
    pub new: Tier,
    #[serde(rename = "tierChanged")]
    pub changed: bool,
}

impl TierTransition {
    pub fn new(old: Tier, new: Tier) -> Self {
        Self {
            old,
            new,
            changed: old != new,
        }
    }

    pub fn between(before: &StreakMetrics, after: &StreakMetrics) -> Self {
        let transition = Self::new(before.tier(), after.tier());
        if transition.changed {
            tracing::info!(old = %transition.old, new = %transition.new, "tier changed");
        }
        transition
    }
}
