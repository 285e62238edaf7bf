//! Infrastructure adapters and runtime bootstrap.

pub mod credentials;
pub mod db;
pub mod error;
pub mod http;
pub mod images;
pub mod memory;
pub mod telemetry;
