//! Weekly usage normalisation and goal counting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StreakError;

/// A day counts toward the weekly goal at or above this efficiency.
pub const GOAL_EFFICIENCY_THRESHOLD: f64 = 50.0;

/// One goal per day of the week.
pub const TOTAL_WEEKLY_GOALS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Weekday {
    type Err = StreakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Weekday::ALL
            .into_iter()
            .find(|day| {
                day.name().eq_ignore_ascii_case(wanted)
                    || (wanted.len() == 3 && day.name()[..3].eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| StreakError::UnknownWeekday(s.to_string()))
    }
}

/// Usage recorded for one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsage {
    pub day: Weekday,
    /// Minutes of app usage.
    #[serde(rename = "usage", alias = "usageMinutes", default)]
    pub usage_minutes: f64,
    /// Energy-efficiency score, `0..=100`.
    #[serde(default)]
    pub efficiency: f64,
}

impl DailyUsage {
    pub fn new(day: Weekday, usage_minutes: f64, efficiency: f64) -> Self {
        Self {
            day,
            usage_minutes,
            efficiency,
        }
    }

    fn empty(day: Weekday) -> Self {
        Self::new(day, 0.0, 0.0)
    }
}

/// A full Monday→Sunday week. Days without samples are zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<DailyUsage>", into = "Vec<DailyUsage>")]
pub struct WeeklyUsage {
    days: [DailyUsage; 7],
}

impl WeeklyUsage {
    /// Build a week from samples in any order.
    ///
    /// Samples for the same day are merged: minutes are summed and efficiency
    /// is averaged.
    pub fn from_samples(samples: impl IntoIterator<Item = DailyUsage>) -> Self {
        let mut days = Weekday::ALL.map(DailyUsage::empty);
        let mut efficiency_sums = [0.0f64; 7];
        let mut counts = [0u32; 7];

        for sample in samples {
            let idx = sample.day.index();
            days[idx].usage_minutes += sample.usage_minutes;
            efficiency_sums[idx] += sample.efficiency;
            counts[idx] += 1;
        }

        for (idx, day) in days.iter_mut().enumerate() {
            if counts[idx] > 0 {
                day.efficiency = round_one_decimal(efficiency_sums[idx] / f64::from(counts[idx]));
            }
        }

        Self { days }
    }

    pub fn days(&self) -> &[DailyUsage; 7] {
        &self.days
    }

    pub fn iter(&self) -> impl Iterator<Item = &DailyUsage> {
        self.days.iter()
    }

    pub fn get(&self, day: Weekday) -> &DailyUsage {
        &self.days[day.index()]
    }

    /// Days meeting the efficiency goal.
    pub fn goals_met(&self) -> u32 {
        self.days
            .iter()
            .filter(|d| d.efficiency >= GOAL_EFFICIENCY_THRESHOLD)
            .count() as u32
    }

    pub fn total_minutes(&self) -> f64 {
        self.days.iter().map(|d| d.usage_minutes).sum()
    }

    /// Day with the most usage. The earliest day wins ties. `None` for an idle week.
    pub fn peak_day(&self) -> Option<&DailyUsage> {
        let mut peak: Option<&DailyUsage> = None;
        for day in &self.days {
            if day.usage_minutes <= 0.0 {
                continue;
            }
            if peak.is_none_or(|p| day.usage_minutes > p.usage_minutes) {
                peak = Some(day);
            }
        }
        peak
    }

    /// Average efficiency over days that recorded usage.
    pub fn average_efficiency(&self) -> f64 {
        average_efficiency(
            self.days
                .iter()
                .filter(|d| d.usage_minutes > 0.0)
                .map(|d| d.efficiency),
        )
    }
}

impl Default for WeeklyUsage {
    fn default() -> Self {
        Self::from_samples(std::iter::empty())
    }
}

impl From<Vec<DailyUsage>> for WeeklyUsage {
    fn from(samples: Vec<DailyUsage>) -> Self {
        Self::from_samples(samples)
    }
}

impl From<WeeklyUsage> for Vec<DailyUsage> {
    fn from(week: WeeklyUsage) -> Self {
        week.days.to_vec()
    }
}

/// Arithmetic mean rounded to one decimal place. `0.0` when there are no scores.
pub fn average_efficiency(scores: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = scores
        .into_iter()
        .fold((0.0f64, 0u32), |(sum, count), score| (sum + score, count + 1));
    if count == 0 {
        return 0.0;
    }
    round_one_decimal(sum / f64::from(count))
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
