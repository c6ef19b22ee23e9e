//! Client for the Chainlink CRE workflow gateway
//!
//! Every call wraps the workflow input in a `workflows.execute` JSON-RPC
//! request, signs the request body into a bearer token, and POSTs the exact
//! bytes that were digested.
//!
//! # Examples
//!
//! ```no_run
//! use mindchain_cre::gateway::GatewayClient;
//! use mindchain_cre::types::GatewayConfig;
//! use mindchain_cre::wallet::Wallet;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn example() -> mindchain_cre::Result<()> {
//! let config = GatewayConfig::new("https://gateway.example.com", "ai-agent");
//! let wallet = Wallet::from_env()?;
//! let client = GatewayClient::new(config, Arc::new(wallet))?;
//!
//! let result = client.execute(json!({"query": "What is MindChain?"})).await?;
//! println!("{}", result);
//! # Ok(())
//! # }
//! ```

use crate::crypto::{self, RequestAuthenticator};
use crate::types::{GatewayConfig, JsonRpcRequest};
use crate::wallet::MessageSigner;
use crate::{CreError, Result};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;


/// Authenticated client for one CRE workflow
#[derive(Clone)]
pub struct GatewayClient {
    url: String,
    workflow_id: String,
    client: Client,
    authenticator: RequestAuthenticator,
    signer: Arc<dyn MessageSigner>,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("url", &self.url)
            .field("workflow_id", &self.workflow_id)
            .field("signer", &self.signer.address())
            .finish()
    }
}

impl GatewayClient {
    /// Create a new gateway client signing with `signer`
    pub fn new(config: GatewayConfig, signer: Arc<dyn MessageSigner>) -> Result<Self> {
        config.validate()?;

        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder
            .build()
            .map_err(|e| CreError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: config.url,
            workflow_id: config.workflow_id,
            client,
            authenticator: RequestAuthenticator::new().with_ttl_seconds(config.ttl_seconds),
            signer,
        })
    }

    /// Gateway endpoint
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Workflow this client executes
    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    /// Address requests are signed as
    pub fn signer_address(&self) -> String {
        self.signer.address()
    }

    /// Build and sign a `workflows.execute` request without sending it
    ///
    /// Returns the JSON body to send and the bearer token for it.
    pub async fn prepare(&self, input: Value) -> Result<(Value, String)> {
        let request = JsonRpcRequest::workflow_execute(&self.workflow_id, input);
        let body = crypto::to_body(&request)?;
        let identity = self.signer.address();
        let token = self
            .authenticator
            .authenticate(&body, self.signer.as_ref(), &identity)
            .await?;
        Ok((body, token))
    }

    /// Run the workflow with `input` and return the gateway's JSON response
    pub async fn execute(&self, input: Value) -> Result<Value> {
        let (body, token) = self.prepare(input).await?;
        let payload = serde_json::to_vec(&body)?;

        tracing::debug!(
            "CRE gateway request body: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );
        tracing::info!(
            workflow_id = %self.workflow_id,
            request_id = %body["id"],
            "Sending CRE workflow request to {}",
            self.url
        );

        let response = self
            .client
            .post(&self.url)
            .header(http::header::CONTENT_TYPE, "application/json")
            .header(http::header::AUTHORIZATION, crypto::bearer_header(&token))
            .body(payload)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let response_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            tracing::error!(
                "CRE gateway request failed with status: {}. Response body: {}",
                status,
                response_body
            );
            return Err(CreError::gateway(format!(
                "CRE Gateway Request Failed: {} - {}",
                status, response_body
            )));
        }

        let result: Value = response.json().await?;
        Ok(result)
    }
}
