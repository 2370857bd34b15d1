//! Core components, types, and utilities for the genie-bridge.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - The failure taxonomy for jobs.
//! - User-facing reply texts.
//! - Common types and result handling.

pub mod config;
pub mod error;
pub mod messages;
pub mod types;
