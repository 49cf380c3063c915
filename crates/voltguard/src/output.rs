use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use voltguard_feed::{FeedStatus, LatestFrame};
use voltguard_streak::{StreakSummary, Tier, TierProfile};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Result of classifying one set of metrics.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierReport {
    pub streak_days: i64,
    pub avg_efficiency: f64,
    pub missed_days: i64,
    pub tier: Tier,
    pub profile: &'static TierProfile,
    pub progress: f64,
    pub max_tier_reached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_to_next_tier: Option<u32>,
    pub next_tier_hint: String,
}

/// One row of the tier list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierListEntry {
    pub tier: Tier,
    pub eligibility: String,
    pub profile: &'static TierProfile,
}

impl TierListEntry {
    pub fn all() -> Vec<Self> {
        Tier::ALL
            .into_iter()
            .map(|tier| Self {
                tier,
                eligibility: tier.eligibility(),
                profile: tier.profile(),
            })
            .collect()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrameOutput {
    sequence: u64,
    size: usize,
    timestamp: String,
}

pub fn print_tier(report: &TierReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "TIER", "STREAK", "EFFICIENCY", "MISSED", "PROGRESS", "PET", "NEXT",
                ])
                .add_row(vec![
                    report.tier.to_string(),
                    report.streak_days.to_string(),
                    format!("{:.1}", report.avg_efficiency),
                    report.missed_days.to_string(),
                    progress_cell(report.progress, report.max_tier_reached),
                    report.profile.animation.as_str().to_string(),
                    report.next_tier_hint.clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "tier={} streak={} efficiency={:.1} missed={} progress={} image={}",
                report.tier,
                report.streak_days,
                report.avg_efficiency,
                report.missed_days,
                progress_cell(report.progress, report.max_tier_reached),
                report.profile.image_ref
            );
            println!("{}", report.next_tier_hint);
        }
        OutputFormat::Raw => println!("{}", report.tier),
    }
}

pub fn print_summary(summary: &StreakSummary, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(summary),
        OutputFormat::Table => {
            let mut overview = Table::new();
            overview
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "TIER", "STREAK", "BEST", "MISSED", "EFFICIENCY", "GOALS", "PET", "NEXT",
                ])
                .add_row(vec![
                    summary.tier.to_string(),
                    summary.current_streak.to_string(),
                    summary.best_streak.to_string(),
                    summary.missed_days.to_string(),
                    format!("{:.1}", summary.avg_efficiency),
                    format!("{}/{}", summary.weekly_goals_met, summary.total_goals),
                    format!(
                        "{} ({})",
                        summary.pet.name,
                        summary.pet.animation_state.as_str()
                    ),
                    summary.next_tier_hint.clone(),
                ]);
            println!("{overview}");

            let mut week = Table::new();
            week.load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["DAY", "USAGE (MIN)", "EFFICIENCY"]);
            for day in summary.weekly_usage.iter() {
                week.add_row(vec![
                    day.day.name().to_string(),
                    format!("{:.0}", day.usage_minutes),
                    format!("{:.1}", day.efficiency),
                ]);
            }
            println!("{week}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} is {} ({}): streak={} best={} progress={} goals={}/{}",
                summary.pet.name,
                summary.tier,
                summary.profile.description,
                summary.current_streak,
                summary.best_streak,
                progress_cell(summary.progress, summary.max_tier_reached),
                summary.weekly_goals_met,
                summary.total_goals
            );
            println!("  {}", summary.next_tier_hint);
            for day in summary.weekly_usage.iter() {
                println!(
                    "  {:<9} {:>5.0} min  {:>5.1}%",
                    day.day.name(),
                    day.usage_minutes,
                    day.efficiency
                );
            }
        }
        OutputFormat::Raw => println!("{}", summary.tier),
    }
}

pub fn print_tier_list(entries: &[TierListEntry], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(entries),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TIER", "ELIGIBILITY", "PET", "COLOR", "DESCRIPTION"]);
            for entry in entries {
                table.add_row(vec![
                    entry.tier.to_string(),
                    entry.eligibility.clone(),
                    entry.profile.animation.as_str().to_string(),
                    entry.profile.color.to_string(),
                    entry.profile.description.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for entry in entries {
                println!(
                    "{:<15} {:<16} {}",
                    entry.tier.label(),
                    entry.eligibility,
                    entry.profile.description
                );
            }
        }
        OutputFormat::Raw => {
            for entry in entries {
                println!("{}", entry.tier);
            }
        }
    }
}

pub fn print_frame(frame: &LatestFrame, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&FrameOutput {
            sequence: frame.sequence,
            size: frame.image.len(),
            timestamp: now_unix_seconds(),
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FRAME", "SIZE"])
                .add_row(vec![frame.sequence.to_string(), frame.image.len().to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("frame={} size={}", frame.sequence, frame.image.len());
        }
        OutputFormat::Raw => print_raw(frame.image.as_ref()),
    }
}

pub fn print_status(status: &FeedStatus, format: OutputFormat) {
    let stats = &status.stats;
    match format {
        OutputFormat::Json => print_json(status),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["STATE", "REQUESTS", "FRAMES", "DROPPED", "ERRORS", "RETRIES"])
                .add_row(vec![
                    status.state.to_string(),
                    stats.requests_sent.to_string(),
                    stats.frames_received.to_string(),
                    stats.frames_dropped.to_string(),
                    stats.server_errors.to_string(),
                    stats.retries.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "state={} requests={} frames={} dropped={} errors={} retries={}",
                status.state,
                stats.requests_sent,
                stats.frames_received,
                stats.frames_dropped,
                stats.server_errors,
                stats.retries
            );
        }
        // Raw output carries frame bytes only.
        OutputFormat::Raw => {}
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

fn progress_cell(fraction: f64, max_tier_reached: bool) -> String {
    if max_tier_reached {
        "max".to_string()
    } else {
        percent(fraction)
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_to_whole_numbers() {
        assert_eq!(percent(0.0), "0%");
        assert_eq!(percent(5.0 / 11.0), "45%");
        assert_eq!(percent(1.0), "100%");
    }

    #[test]
    fn tier_report_serializes_camel_case() {
        let tier = Tier::Steady;
        let report = TierReport {
            streak_days: 5,
            avg_efficiency: 55.0,
            missed_days: 0,
            tier,
            profile: tier.profile(),
            progress: 5.0 / 11.0,
            max_tier_reached: false,
            days_to_next_tier: Some(6),
            next_tier_hint: tier.next_tier_hint(5),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["tier"], "Steady");
        assert_eq!(value["streakDays"], 5);
        assert_eq!(value["profile"]["animation"], "happy");
        assert_eq!(value["daysToNextTier"], 6);
        assert_eq!(value["nextTierHint"], "6 more days to High Performer!");
    }

    #[test]
    fn progress_cell_hides_bar_for_top_tier() {
        assert_eq!(progress_cell(0.5, false), "50%");
        assert_eq!(progress_cell(0.012, true), "max");
    }

    #[test]
    fn tier_list_covers_every_tier() {
        let entries = TierListEntry::all();
        assert_eq!(entries.len(), Tier::ALL.len());
        assert_eq!(entries[0].eligibility, "New users");
        let value = serde_json::to_value(&entries).unwrap();
        assert_eq!(value[3]["tier"], "High Performer");
        assert_eq!(value[3]["eligibility"], "11+ days streak");
    }
}
