//! Library root for `genie-bridge`.
//!
//! Genie-bridge lets Slack users ask a Databricks Genie space questions by @-mentioning the bot:
//! - Acknowledges the mention immediately, and answers in the background
//! - Posts a progress notice, then exactly one final reply in the mention's thread
//! - Polls Genie on a bounded schedule, and reports failures and timeouts in thread
//!
//! The bot integrates with Slack for chat and Databricks Genie for answers.
//! Both sit behind traits, so either side can be swapped out or mocked.

#[deny(missing_docs)]
pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the genie-bridge runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the Genie and chat clients
/// - Starts the main event loop for processing mentions
pub async fn start(config: Config) -> Void {
    info!("Starting genie-bridge ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install the default crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
