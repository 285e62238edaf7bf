//! The measurement interval and the checkpoints anchored inside it.

use serde::Serialize;
use time::{Date, macros::date};

use super::calendar::days_between;
use super::error::DomainError;

pub const DEFAULT_GOAL_START: Date = date!(2025 - 08 - 10);
pub const DEFAULT_GOAL_END: Date = date!(2025 - 12 - 31);
pub const DEFAULT_TARGET_VALUE: u32 = 7000;

/// Immutable `[start, end]` pair; `start < end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoalWindow {
    start: Date,
    end: Date,
}

impl GoalWindow {
    pub fn new(start: Date, end: Date) -> Result<Self, DomainError> {
        if start >= end {
            return Err(DomainError::EmptyWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    /// Whole days from start to end; always positive.
    pub fn total_days(&self) -> i64 {
        days_between(self.start, self.end)
    }
}

impl Default for GoalWindow {
    fn default() -> Self {
        Self {
            start: DEFAULT_GOAL_START,
            end: DEFAULT_GOAL_END,
        }
    }
}

/// A checkpoint with its own anchor date, independent of the percentage curve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneDefinition {
    pub date: Date,
    pub title: String,
    pub description: String,
    pub percentage: u8,
}

impl MilestoneDefinition {
    pub fn new(
        date: Date,
        title: impl Into<String>,
        description: impl Into<String>,
        percentage: u8,
    ) -> Self {
        Self {
            date,
            title: title.into(),
            description: description.into(),
            percentage,
        }
    }
}

pub fn default_milestones() -> Vec<MilestoneDefinition> {
    vec![
        MilestoneDefinition::new(
            date!(2025 - 08 - 10),
            "🚀 Journey begins",
            "The 7k project officially kicks off!",
            1,
        ),
        MilestoneDefinition::new(
            date!(2025 - 09 - 01),
            "📚 First month",
            "Laying solid foundations for the project",
            15,
        ),
        MilestoneDefinition::new(
            date!(2025 - 10 - 01),
            "⚡ Acceleration",
            "Growing momentum and first results",
            30,
        ),
        MilestoneDefinition::new(
            date!(2025 - 11 - 01),
            "🔥 Intensification",
            "Picking up the pace for the home stretch",
            60,
        ),
        MilestoneDefinition::new(
            date!(2025 - 12 - 01),
            "💎 Final stretch",
            "The last weeks before the final goal",
            85,
        ),
        MilestoneDefinition::new(
            date!(2025 - 12 - 31),
            "🏆 Goal reached",
            "7k achieved! Congratulations on the success!",
            100,
        ),
    ]
}
