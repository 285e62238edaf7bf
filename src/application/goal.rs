//! Goal progress service: resolves "today" and delegates to the pure engines.

use std::sync::Arc;

use chrono_tz::Tz;
use time::Date;

use crate::application::clock::Clock;
use crate::domain::goal::{GoalWindow, MilestoneDefinition};
use crate::domain::milestones::{Milestone, evaluate_milestones};
use crate::domain::progress::{ProgressSnapshot, compute_progress};
use crate::domain::stats::{DetailedStats, compute_stats};
use crate::util::timezone::localized_date;

#[derive(Debug, Clone)]
pub struct GoalSettings {
    pub window: GoalWindow,
    pub target_value: u32,
    pub timezone: Tz,
    pub milestones: Vec<MilestoneDefinition>,
}

#[derive(Clone)]
pub struct GoalService {
    settings: Arc<GoalSettings>,
    clock: Arc<dyn Clock>,
}

impl GoalService {
    pub fn new(settings: GoalSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            settings: Arc::new(settings),
            clock,
        }
    }

    /// Current calendar date in the goal timezone.
    pub fn today(&self) -> Date {
        localized_date(self.clock.now(), self.settings.timezone)
    }

    pub fn progress(&self) -> ProgressSnapshot {
        compute_progress(self.today(), &self.settings.window)
    }

    pub fn milestones(&self) -> Vec<Milestone> {
        evaluate_milestones(self.today(), &self.settings.milestones)
    }

    pub fn stats(&self) -> DetailedStats {
        compute_stats(
            self.today(),
            &self.settings.window,
            self.settings.target_value,
        )
    }
}
