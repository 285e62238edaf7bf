//! Shared domain enumerations aligned with persisted database enums.
//!
//! Defined in `pulseboard-api-types`; the same values are bound to the `user_role` and
//! `post_status` columns.

pub use pulseboard_api_types::{PostStatus, UserRole};
