//! Runtime services and shared state for the genie-bridge.

use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::job::JobBridge,
    service::{chat::ChatClient, genie::GenieClient, health},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, the Genie client, the job bridge, and the chat client.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The Genie client instance.
    pub genie: GenieClient,
    /// The job bridge that answers mentions.
    pub bridge: JobBridge,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the Genie client.
        let genie = GenieClient::databricks(&config)?;

        // Initialize the job bridge.
        let bridge = JobBridge::new(genie.clone(), config.poll_policy(), config.max_concurrent_jobs);

        // Initialize the chat client.
        let chat = ChatClient::slack(&config, bridge.clone()).await?;

        Ok(Self { config, genie, bridge, chat })
    }

    /// Run the chat listener, alongside the health endpoint when one is configured.
    pub async fn start(&self) -> Void {
        let Some(port) = self.config.health_port else {
            return self.chat.start().await;
        };

        info!("Starting with health endpoint on port {port} ...");

        tokio::select! {
            result = self.chat.start() => result,
            result = health::serve(port) => result,
        }
    }
}
