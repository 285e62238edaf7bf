//! Statistics aggregator.
//!
//! Day counts here are a blanket `max(0, …)` over direct subtractions, so unlike
//! [`compute_progress`](super::progress::compute_progress) `days_elapsed` keeps growing past
//! the end of the window. The pace and probability heuristics compare time progress against
//! a value progress that is currently the same quantity; both are kept in their general shape
//! so a real metric can be fed in later.

use serde::Serialize;
use time::Date;

use super::calendar::{days_between, round_to};
use super::goal::GoalWindow;

const DAYS_PER_WEEK: f64 = 7.0;
const DAYS_PER_MONTH: f64 = 30.44;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedStats {
    pub timeline: Timeline,
    pub daily_average_required: f64,
    pub current_pace: Pace,
    pub meta_info: MetaInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub total_days: i64,
    pub days_elapsed: i64,
    pub days_remaining: i64,
    pub weeks_total: f64,
    pub weeks_elapsed: f64,
    pub months_total: f64,
    pub months_elapsed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaInfo {
    pub target_value: u32,
    pub current_estimate: i64,
    pub success_probability: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Pace {
    #[serde(rename = "not started")]
    NotStarted,
    #[serde(rename = "on track")]
    OnTrack,
    #[serde(rename = "behind")]
    Behind,
    #[serde(rename = "completed")]
    Completed,
}

pub fn compute_stats(current: Date, window: &GoalWindow, target_value: u32) -> DetailedStats {
    let total_days = window.total_days();
    let days_elapsed = days_between(window.start(), current).max(0);
    let days_remaining = days_between(current, window.end()).max(0);

    let time_progress = days_elapsed as f64 / total_days as f64 * 100.0;
    // No measured value exists yet; value progress mirrors elapsed time.
    let value_progress = if days_elapsed > 0 { time_progress } else { 0.0 };

    let current_estimate = (value_progress / 100.0 * f64::from(target_value)).round() as i64;

    let (current_pace, probability) = if current < window.start() {
        (Pace::NotStarted, 95.0)
    } else if current > window.end() {
        (Pace::Completed, 100.0)
    } else {
        (
            classify_pace(time_progress, value_progress),
            success_probability(time_progress, value_progress),
        )
    };

    DetailedStats {
        timeline: Timeline {
            total_days,
            days_elapsed,
            days_remaining,
            weeks_total: round_to(total_days as f64 / DAYS_PER_WEEK, 1),
            weeks_elapsed: round_to(days_elapsed as f64 / DAYS_PER_WEEK, 1),
            months_total: round_to(total_days as f64 / DAYS_PER_MONTH, 1),
            months_elapsed: round_to(days_elapsed as f64 / DAYS_PER_MONTH, 1),
        },
        daily_average_required: round_to(f64::from(target_value) / total_days as f64, 2),
        current_pace,
        meta_info: MetaInfo {
            target_value,
            current_estimate,
            success_probability: probability.round() as i64,
        },
    }
}

/// In-window pace: on track while value progress keeps up with time progress.
pub fn classify_pace(time_progress: f64, value_progress: f64) -> Pace {
    if value_progress >= time_progress {
        Pace::OnTrack
    } else {
        Pace::Behind
    }
}

/// `clamp(10, 100, 100 - |time - value|)`.
pub fn success_probability(time_progress: f64, value_progress: f64) -> f64 {
    (100.0 - (time_progress - value_progress).abs()).clamp(10.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn stats_on(current: Date) -> DetailedStats {
        compute_stats(current, &GoalWindow::default(), 7000)
    }

    #[test]
    fn rollups_use_week_and_average_month_lengths() {
        let stats = stats_on(date!(2025 - 11 - 01));
        assert_eq!(stats.timeline.total_days, 143);
        assert_eq!(stats.timeline.days_elapsed, 83);
        assert_eq!(stats.timeline.days_remaining, 60);
        assert_eq!(stats.timeline.weeks_total, 20.4);
        assert_eq!(stats.timeline.weeks_elapsed, 11.9);
        assert_eq!(stats.timeline.months_total, 4.7);
        assert_eq!(stats.timeline.months_elapsed, 2.7);
        assert_eq!(stats.daily_average_required, 48.95);
    }

    #[test]
    fn estimate_scales_target_by_elapsed_fraction() {
        // 83 / 143 * 7000 = 4062.9…
        let stats = stats_on(date!(2025 - 11 - 01));
        assert_eq!(stats.meta_info.current_estimate, 4063);
        assert_eq!(stats.meta_info.target_value, 7000);
    }

    #[test]
    fn before_start_is_not_started_with_optimistic_probability() {
        let stats = stats_on(date!(2025 - 07 - 01));
        assert_eq!(stats.current_pace, Pace::NotStarted);
        assert_eq!(stats.meta_info.success_probability, 95);
        assert_eq!(stats.meta_info.current_estimate, 0);
        assert_eq!(stats.timeline.days_elapsed, 0);
        // Remaining is a direct subtraction, so it exceeds the window length here.
        assert_eq!(stats.timeline.days_remaining, 183);
    }

    #[test]
    fn after_end_elapsed_keeps_counting() {
        let stats = stats_on(date!(2026 - 01 - 10));
        assert_eq!(stats.current_pace, Pace::Completed);
        assert_eq!(stats.meta_info.success_probability, 100);
        assert_eq!(stats.timeline.days_elapsed, 153);
        assert_eq!(stats.timeline.days_remaining, 0);
    }

    #[test]
    fn inside_window_is_always_on_track_and_certain() {
        for current in [
            date!(2025 - 08 - 10),
            date!(2025 - 09 - 15),
            date!(2025 - 12 - 31),
        ] {
            let stats = stats_on(current);
            assert_eq!(stats.current_pace, Pace::OnTrack);
            assert_eq!(stats.meta_info.success_probability, 100);
        }
    }

    #[test]
    fn heuristics_react_to_a_real_gap() {
        assert_eq!(classify_pace(50.0, 40.0), Pace::Behind);
        assert_eq!(classify_pace(50.0, 60.0), Pace::OnTrack);
        assert_eq!(success_probability(50.0, 40.0), 90.0);
        assert_eq!(success_probability(95.0, 0.0), 10.0);
    }

    #[test]
    fn pace_serializes_with_readable_labels() {
        let json = serde_json::to_value(stats_on(date!(2025 - 09 - 01))).unwrap();
        assert_eq!(json["current_pace"], "on track");
        assert_eq!(json["timeline"]["total_days"], 143);
        assert_eq!(serde_json::to_value(Pace::Behind).unwrap(), "behind");
    }
}
