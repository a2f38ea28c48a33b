//! Data models for price checks, history and configuration.

pub mod config;
pub mod history;
pub mod pricing;
