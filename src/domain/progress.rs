//! Progress engine: elapsed/remaining days and the `[1, 100]` completion percentage.

use serde::Serialize;
use time::Date;

use super::calendar::{days_between, format_display_date, round_to};
use super::goal::GoalWindow;

/// Percentage reported before the window opens.
pub const PROGRESS_FLOOR: f64 = 1.0;
/// Percentage reported once the window has closed.
pub const PROGRESS_CEILING: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub current_date: String,
    pub start_date: String,
    pub end_date: String,
    pub total_days: i64,
    pub days_elapsed: i64,
    pub days_remaining: i64,
    pub progress_percentage: f64,
    pub is_completed: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    NotStarted,
    InProgress,
    Completed,
}

pub fn compute_progress(current: Date, window: &GoalWindow) -> ProgressSnapshot {
    let total_days = window.total_days();

    let (phase, days_elapsed, percentage) = if current < window.start() {
        (Phase::NotStarted, 0, PROGRESS_FLOOR)
    } else if current > window.end() {
        (Phase::Completed, total_days, PROGRESS_CEILING)
    } else {
        let elapsed = days_between(window.start(), current);
        let fraction = elapsed as f64 / total_days as f64;
        let percentage = round_to(PROGRESS_FLOOR + fraction * 99.0, 1);
        (Phase::InProgress, elapsed, percentage)
    };

    ProgressSnapshot {
        current_date: format_display_date(current),
        start_date: format_display_date(window.start()),
        end_date: format_display_date(window.end()),
        total_days,
        days_elapsed,
        days_remaining: (total_days - days_elapsed).max(0),
        progress_percentage: percentage,
        is_completed: phase == Phase::Completed,
        message: progress_message(phase, percentage).to_string(),
    }
}

fn progress_message(phase: Phase, percentage: f64) -> &'static str {
    match phase {
        Phase::NotStarted => "🚀 The journey hasn't started yet! Get ready for lift-off!",
        Phase::Completed => "🎉 Goal complete! Congratulations, you reached 7k!",
        Phase::InProgress if percentage < 25.0 => {
            "🚀 Starting the journey towards 7k! Focus and determination!"
        }
        Phase::InProgress if percentage < 50.0 => "⚡ Steady progress! Keep the rhythm going!",
        Phase::InProgress if percentage < 75.0 => "🔥 Speeding up! Past the halfway mark!",
        Phase::InProgress if percentage < 95.0 => "💎 Almost there! 7k is within reach!",
        Phase::InProgress => "🏆 The year is closing in! Final steps to 7k!",
    }
}
