//! Application services layer.

pub mod access;
pub mod admin_stats;
pub mod clock;
pub mod credentials;
pub mod error;
pub mod goal;
pub mod images;
pub mod posts;
pub mod repos;
pub mod users;
