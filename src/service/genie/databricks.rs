//! Databricks Genie integration for genie-bridge.
//!
//! Questions are submitted with a `start-conversation` call, and their answers are
//! observed through the message status endpoint of the same space. Both calls use
//! bearer-token authentication.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::base::{
    config::Config,
    error::BridgeError,
    types::{ConversationHandle, MessageStatus, Res},
};

use super::{GenericGenieClient, GenieClient, parse_message_status, parse_start_response};

// Extra methods on `GenieClient` applied by the databricks implementation.

impl GenieClient {
    pub fn databricks(config: &Config) -> Res<Self> {
        let client = DatabricksGenieClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Specific implementations.

/// Databricks Genie client implementation.
#[derive(Clone)]
pub struct DatabricksGenieClient {
    http: Client,
    space_url: Url,
    token: String,
}

impl DatabricksGenieClient {
    /// Create a new Databricks Genie client.
    #[instrument(name = "DatabricksGenieClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let space_url = space_url(&config.genie_host, &config.genie_api_path, &config.genie_space_id)?;

        Ok(Self {
            http: Client::new(),
            space_url,
            token: config.genie_token.clone(),
        })
    }

    /// Resolve a path below the configured space.
    fn url(&self, path: &str) -> Res<Url> {
        Ok(self.space_url.join(path)?)
    }

    /// Read a JSON body from a response, treating any non-success status as the backend being unavailable.
    async fn read_json(operation: &'static str, response: reqwest::Result<reqwest::Response>) -> Res<Value> {
        let response = response.and_then(|r| r.error_for_status()).map_err(|e| BridgeError::unavailable(operation, e))?;

        debug!("Genie `{operation}` responded with {}", response.status());

        let body = response.json::<Value>().await.map_err(|e| BridgeError::unavailable(operation, e))?;

        Ok(body)
    }
}

#[async_trait]
impl GenericGenieClient for DatabricksGenieClient {
    #[instrument(name = "DatabricksGenieClient::start_conversation", skip_all)]
    async fn start_conversation(&self, question: &str) -> Res<ConversationHandle> {
        let payload = json!({
            "messages": [{ "role": "user", "content": question }]
        });

        let response = self.http.post(self.url("start-conversation")?).bearer_auth(&self.token).json(&payload).send().await;
        let body = Self::read_json("start_conversation", response).await?;

        parse_start_response(body)
    }

    #[instrument(name = "DatabricksGenieClient::get_message_status", skip_all)]
    async fn get_message_status(&self, handle: &ConversationHandle) -> Res<MessageStatus> {
        let url = self.url(&format!("conversations/{}/messages/{}", handle.conversation_id, handle.message_id))?;

        let response = self.http.get(url).bearer_auth(&self.token).send().await;
        let body = Self::read_json("get_message_status", response).await?;

        Ok(parse_message_status(body))
    }
}

// Helpers.

/// Builds the base URL of a space, with a trailing slash so that relative joins stay inside it.
fn space_url(host: &str, api_path: &str, space_id: &str) -> Res<Url> {
    let mut base = Url::parse(host)?;

    let path = format!("{}/{}/{}/", base.path().trim_end_matches('/'), api_path.trim_matches('/'), space_id.trim_matches('/'));
    base.set_path(&path);

    Ok(base)
}

// Tests.
