//! Milestone evaluator.

use serde::Serialize;
use time::Date;

use super::calendar::format_iso_date;
use super::goal::MilestoneDefinition;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub date: String,
    pub title: String,
    pub description: String,
    pub percentage: u8,
    pub achieved: bool,
}

/// Flags each checkpoint by its own anchor date; input order is kept.
pub fn evaluate_milestones(current: Date, definitions: &[MilestoneDefinition]) -> Vec<Milestone> {
    definitions
        .iter()
        .map(|definition| Milestone {
            date: format_iso_date(definition.date),
            title: definition.title.clone(),
            description: definition.description.clone(),
            percentage: definition.percentage,
            achieved: current >= definition.date,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::goal::{GoalWindow, default_milestones};
    use crate::domain::progress::compute_progress;
    use time::{Duration, macros::date};

    #[test]
    fn milestone_is_achieved_on_its_anchor_day() {
        let milestones = evaluate_milestones(date!(2025 - 10 - 01), &default_milestones());
        let achieved: Vec<bool> = milestones.iter().map(|m| m.achieved).collect();
        assert_eq!(achieved, vec![true, true, true, false, false, false]);
        assert_eq!(milestones[2].date, "2025-10-01");
    }

    #[test]
    fn nothing_is_achieved_before_the_first_anchor() {
        let milestones = evaluate_milestones(date!(2025 - 08 - 09), &default_milestones());
        assert!(milestones.iter().all(|m| !m.achieved));
        assert_eq!(milestones.len(), 6);
    }

    #[test]
    fn achieved_flags_never_revert() {
        let definitions = default_milestones();
        let mut current = date!(2025 - 08 - 01);
        let mut previous = vec![false; definitions.len()];
        while current <= date!(2026 - 01 - 15) {
            let flags: Vec<bool> = evaluate_milestones(current, &definitions)
                .into_iter()
                .map(|m| m.achieved)
                .collect();
            for (before, now) in previous.iter().zip(&flags) {
                assert!(!before || *now, "milestone reverted at {current}");
            }
            previous = flags;
            current += Duration::days(1);
        }
    }

    #[test]
    fn achievement_is_independent_of_the_percentage_curve() {
        // Dec 1 sits near 79% on the curve, yet the 85% checkpoint is already achieved.
        let current = date!(2025 - 12 - 01);
        let progress = compute_progress(current, &GoalWindow::default());
        let milestones = evaluate_milestones(current, &default_milestones());
        assert!(milestones[4].achieved);
        assert!(progress.progress_percentage < f64::from(milestones[4].percentage));

        // Oct 15 sits above 30% while the 60% checkpoint is still pending.
        let current = date!(2025 - 10 - 15);
        let progress = compute_progress(current, &GoalWindow::default());
        let milestones = evaluate_milestones(current, &default_milestones());
        assert!(milestones[2].achieved);
        assert!(!milestones[3].achieved);
        assert!(progress.progress_percentage > f64::from(milestones[2].percentage));
    }

    #[test]
    fn order_is_preserved_for_unsorted_definitions() {
        let definitions = vec![
            MilestoneDefinition::new(date!(2025 - 12 - 01), "late", "", 90),
            MilestoneDefinition::new(date!(2025 - 09 - 01), "early", "", 10),
        ];
        let milestones = evaluate_milestones(date!(2025 - 10 - 01), &definitions);
        assert_eq!(milestones[0].title, "late");
        assert!(!milestones[0].achieved);
        assert!(milestones[1].achieved);
    }
}
