//! Domain layer types and invariants.

pub mod calendar;
pub mod entities;
pub mod error;
pub mod goal;
pub mod milestones;
pub mod moderation;
pub mod progress;
pub mod stats;
pub mod types;
