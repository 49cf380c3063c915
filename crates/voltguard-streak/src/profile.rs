//! Static tier → profile lookup.
//!
//! Profiles are keyed by the closed [`Tier`] enum. Adding a tier without a
//! profile fails to compile.

use serde::Serialize;

use crate::tier::Tier;

/// Pet animation associated with a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Animation {
    Idle,
    Sleeping,
    Happy,
    Glowing,
}

impl Animation {
    pub fn as_str(self) -> &'static str {
        match self {
            Animation::Idle => "idle",
            Animation::Sleeping => "sleeping",
            Animation::Happy => "happy",
            Animation::Glowing => "glowing",
        }
    }
}

/// Display configuration for a tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierProfile {
    /// Accent color (hex).
    pub color: &'static str,
    /// Badge background color (hex).
    pub background_color: &'static str,
    /// Pet image asset reference.
    pub image_ref: &'static str,
    pub description: &'static str,
    pub animation: Animation,
    /// Lowest streak this tier is drawn for.
    pub min_streak: u32,
    /// Highest streak this tier is drawn for. Used as the progress bar target.
    pub max_streak: u32,
}

const STARTER: TierProfile = TierProfile {
    color: "#FFFFFF",
    background_color: "#F5F5F5",
    image_ref: "/images/energy-pet-starter.png",
    description: "Base form - small and inactive",
    animation: Animation::Idle,
    min_streak: 0,
    max_streak: 3,
};

const LOW_ACTIVITY: TierProfile = TierProfile {
    color: "#FE8D00",
    background_color: "#FFF3E0",
    image_ref: "/images/energy-pet-bad.png",
    description: "Dull and sleepy - showing neglect",
    animation: Animation::Sleeping,
    min_streak: 0,
    max_streak: 3,
};

const STEADY: TierProfile = TierProfile {
    color: "#FFC94A",
    background_color: "#FFF9E6",
    image_ref: "/images/energy-pet-medium.png",
    description: "Lively and growing - balanced progress",
    animation: Animation::Happy,
    min_streak: 4,
    max_streak: 10,
};

const HIGH_PERFORMER: TierProfile = TierProfile {
    color: "#245C94",
    background_color: "#E3F2FD",
    image_ref: "/images/energy-pet-good.png",
    description: "Fully evolved and glowing - optimal behavior",
    animation: Animation::Glowing,
    min_streak: 11,
    max_streak: 999,
};

impl Tier {
    /// Static display profile for this tier.
    pub fn profile(self) -> &'static TierProfile {
        match self {
            Tier::Starter => &STARTER,
            Tier::LowActivity => &LOW_ACTIVITY,
            Tier::Steady => &STEADY,
            Tier::HighPerformer => &HIGH_PERFORMER,
        }
    }
}

/// Fraction of the tier's progress bar filled by `current_streak`.
///
/// `min(current_streak / (max_streak + 1), 1.0)`. This is a display value
/// only, always in `[0, 1]`.
pub fn progress_fraction(current_streak: u32, profile: &TierProfile) -> f64 {
    let target = f64::from(profile.max_streak) + 1.0;
    (f64::from(current_streak) / target).clamp(0.0, 1.0)
}

impl Tier {
    /// The tier a longer streak leads to. `None` for the top tier and for
    /// `LowActivity`, which is left by improving activity rather than by
    /// streak length.
    pub fn next_tier(self) -> Option<Tier> {
        match self {
            Tier::Starter => Some(Tier::Steady),
            Tier::Steady => Some(Tier::HighPerformer),
            Tier::LowActivity | Tier::HighPerformer => None,
        }
    }

    /// Whether this is the top tier. The progress bar is not drawn for it.
    pub fn is_max_tier(self) -> bool {
        self == Tier::HighPerformer
    }

    /// Streak days still missing for [`Tier::next_tier`].
    ///
    /// Zero means the streak is long enough and only efficiency holds the
    /// tier back.
    pub fn days_to_next_tier(self, current_streak: u32) -> Option<u32> {
        let target = self.next_tier()?.profile().min_streak;
        Some(target.saturating_sub(current_streak))
    }

    /// Hint shown under the progress bar.
    pub fn next_tier_hint(self, current_streak: u32) -> String {
        match (self, self.days_to_next_tier(current_streak)) {
            (Tier::HighPerformer, _) => "Maximum Tier Achieved!".to_string(),
            (Tier::LowActivity, _) => "Improve your activity to advance!".to_string(),
            (_, None) | (_, Some(0)) => "Raise your efficiency to advance!".to_string(),
            (Tier::Starter, Some(days)) => {
                format!("Keep going for {} to reach Steady!", day_count(days, ""))
            }
            (Tier::Steady, Some(days)) => {
                format!("{} to High Performer!", day_count(days, "more "))
            }
        }
    }

    /// Who the tier is for, as shown in the tier list.
    pub fn eligibility(self) -> String {
        match self {
            Tier::Starter => "New users".to_string(),
            Tier::LowActivity => "Missed 2+ days".to_string(),
            tier => format!("{}+ days streak", tier.profile().min_streak),
        }
    }
}

fn day_count(days: u32, qualifier: &str) -> String {
    if days == 1 {
        format!("1 {qualifier}day")
    } else {
        format!("{days} {qualifier}days")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tier_has_a_distinct_image() {
        let mut images: Vec<_> = Tier::ALL.iter().map(|t| t.profile().image_ref).collect();
        images.sort_unstable();
        images.dedup();
        assert_eq!(images.len(), Tier::ALL.len());
    }

    #[test]
    fn profile_streak_windows() {
        assert_eq!(Tier::Steady.profile().min_streak, 4);
        assert_eq!(Tier::Steady.profile().max_streak, 10);
        assert_eq!(Tier::HighPerformer.profile().min_streak, 11);
        assert_eq!(Tier::LowActivity.profile().animation, Animation::Sleeping);
    }

    #[test]
    fn progress_is_monotonic_and_clamped() {
        for tier in Tier::ALL {
            let profile = tier.profile();
            let mut previous = 0.0;
            for streak in 0..=1200 {
                let fraction = progress_fraction(streak, profile);
                assert!(fraction >= previous, "{tier}: {fraction} < {previous}");
                assert!((0.0..=1.0).contains(&fraction));
                previous = fraction;
            }
            assert_eq!(progress_fraction(profile.max_streak + 1, profile), 1.0);
            assert_eq!(progress_fraction(u32::MAX, profile), 1.0);
        }
    }

    #[test]
    fn progress_examples() {
        assert_eq!(progress_fraction(0, Tier::Starter.profile()), 0.0);
        assert_eq!(progress_fraction(2, Tier::Starter.profile()), 0.5);
        assert!((progress_fraction(5, Tier::Steady.profile()) - 5.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn days_to_next_tier_follows_streak_windows() {
        assert_eq!(Tier::Starter.days_to_next_tier(0), Some(4));
        assert_eq!(Tier::Starter.days_to_next_tier(3), Some(1));
        assert_eq!(Tier::Steady.days_to_next_tier(5), Some(6));
        assert_eq!(Tier::Steady.days_to_next_tier(10), Some(1));
        assert_eq!(Tier::LowActivity.days_to_next_tier(5), None);
        assert_eq!(Tier::HighPerformer.days_to_next_tier(40), None);
    }

    #[test]
    fn next_tier_hints() {
        assert_eq!(
            Tier::Starter.next_tier_hint(0),
            "Keep going for 4 days to reach Steady!"
        );
        assert_eq!(
            Tier::Steady.next_tier_hint(5),
            "6 more days to High Performer!"
        );
        assert_eq!(
            Tier::Steady.next_tier_hint(10),
            "1 more day to High Performer!"
        );
        assert_eq!(
            Tier::LowActivity.next_tier_hint(9),
            "Improve your activity to advance!"
        );
        assert_eq!(
            Tier::HighPerformer.next_tier_hint(30),
            "Maximum Tier Achieved!"
        );
        // A long streak held back by efficiency in the 50-60% gap.
        assert_eq!(
            Tier::Starter.next_tier_hint(12),
            "Raise your efficiency to advance!"
        );
        assert!(Tier::HighPerformer.is_max_tier());
        assert!(!Tier::Steady.is_max_tier());
    }

    #[test]
    fn eligibility_labels() {
        assert_eq!(Tier::Starter.eligibility(), "New users");
        assert_eq!(Tier::LowActivity.eligibility(), "Missed 2+ days");
        assert_eq!(Tier::Steady.eligibility(), "4+ days streak");
        assert_eq!(Tier::HighPerformer.eligibility(), "11+ days streak");
    }

    #[test]
    fn profile_serializes_camel_case() {
        let value = serde_json::to_value(Tier::Steady.profile()).unwrap();
        assert_eq!(value["backgroundColor"], "#FFF9E6");
        assert_eq!(value["animation"], "happy");
        assert_eq!(value["maxStreak"], 10);
    }
}
