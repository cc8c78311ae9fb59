//! Integration tests module
//!
//! Drives the full HTTP surface in-process with fake collaborators.

#[path = "../common/mod.rs"]
mod common;

mod health_test;
mod rate_limit_test;
mod test_notification_test;
