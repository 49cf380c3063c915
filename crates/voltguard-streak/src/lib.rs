//! Streak tier classification for the VoltGuard energy dashboard.
//!
//! A user's engagement is summarised by three numbers: the current streak
//! length, the average energy-efficiency score over the last week, and the
//! number of missed days. [`classify`] turns those into a [`Tier`], and every
//! tier carries a static [`TierProfile`] that drives the pet display.
//!
//! # Crate Structure
//!
//! - [`tier`]: The four-rule tier classifier
//! - [`profile`]: Static tier → profile lookup and the progress helper
//! - [`metrics`]: The classifier input record
//! - [`usage`]: Weekly usage normalisation and goal counting
//! - [`summary`]: Collaborator snapshot → display summary, pet state, tier transitions

pub mod error;
pub mod metrics;
pub mod profile;
pub mod summary;
pub mod tier;
pub mod usage;

pub use error::{Result, StreakError};
pub use metrics::StreakMetrics;
pub use profile::{progress_fraction, Animation, TierProfile};
pub use summary::{PetState, StreakSnapshot, StreakSummary, TierTransition, DEFAULT_PET_NAME};
pub use tier::{classify, Tier};
pub use usage::{
    average_efficiency, DailyUsage, WeeklyUsage, Weekday, GOAL_EFFICIENCY_THRESHOLD,
    TOTAL_WEEKLY_GOALS,
};
