use voltguard_streak::{classify, progress_fraction};

use crate::cmd::TierArgs;
use crate::exit::{CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_tier, print_tier_list, OutputFormat, TierListEntry, TierReport};

pub fn run(args: TierArgs, format: OutputFormat) -> CliResult<i32> {
    if !args.efficiency.is_finite() {
        return Err(CliError::new(USAGE, "--efficiency must be a finite number"));
    }

    let tier = classify(args.streak, args.efficiency, args.missed);
    let profile = tier.profile();
    let streak = display_streak(args.streak);
    let report = TierReport {
        streak_days: args.streak,
        avg_efficiency: args.efficiency,
        missed_days: args.missed,
        tier,
        profile,
        progress: progress_fraction(streak, profile),
        max_tier_reached: tier.is_max_tier(),
        days_to_next_tier: tier.days_to_next_tier(streak),
        next_tier_hint: tier.next_tier_hint(streak),
    };
    print_tier(&report, format);

    Ok(SUCCESS)
}

/// Print every tier with its eligibility and profile.
pub fn list(format: OutputFormat) -> CliResult<i32> {
    print_tier_list(&TierListEntry::all(), format);
    Ok(SUCCESS)
}

/// Negative streaks draw an empty progress bar.
fn display_streak(streak: i64) -> u32 {
    u32::try_from(streak.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_streak_saturates() {
        assert_eq!(display_streak(-4), 0);
        assert_eq!(display_streak(7), 7);
        assert_eq!(display_streak(i64::MAX), u32::MAX);
    }
}
