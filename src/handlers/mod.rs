//! HTTP handlers

pub mod analyze;
pub mod blocklist;
pub mod health;
