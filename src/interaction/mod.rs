//! Event handling and user interactions for genie-bridge.
//!
//! This module provides the path from an @-mention to its answer:
//! - Handing incoming mentions off without blocking the platform acknowledgment
//! - Normalizing the question text
//! - Driving the start/poll job against Genie and replying in thread

pub mod app_mention;
pub mod job;
pub mod question;
pub mod reply;
