//! Distbot Server Library
//!
//! Relays app distribution release webhooks to a Slack channel. This module
//! exposes the server components for testing purposes.

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
