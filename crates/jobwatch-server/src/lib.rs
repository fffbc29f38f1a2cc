//! Slack command surface: slash commands, interactive callbacks and health.

pub mod auth;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;
