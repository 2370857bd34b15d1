//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services the genie-bridge talks to:
//! - Chat services (e.g., Slack)
//! - Question-answering backends (e.g., Databricks Genie)
//! - A liveness endpoint for the hosting platform
//!
//! Each client service defines both a generic trait and a concrete implementation,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod genie;
pub mod health;
