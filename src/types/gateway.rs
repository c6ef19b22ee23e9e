//! CRE gateway configuration and JSON-RPC envelope

use super::constants::cre;
use crate::crypto::token::DEFAULT_TTL_SECONDS;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Configuration for calls to a CRE workflow gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Gateway endpoint the JSON-RPC request is POSTed to
    pub url: String,
    /// Deployed workflow to execute
    pub workflow_id: String,
    /// Request timeout
    pub timeout: Option<Duration>,
    /// Lifetime of each bearer token in seconds
    pub ttl_seconds: i64,
}

impl GatewayConfig {
    /// Create a new gateway config
    pub fn new(url: impl Into<String>, workflow_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            workflow_id: workflow_id.into(),
            timeout: None,
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }

    /// Read `CRE_GATEWAY_URL` and `CRE_WORKFLOW_ID`
    pub fn from_env() -> crate::Result<Self> {
        let url = std::env::var("CRE_GATEWAY_URL").unwrap_or_default();
        let workflow_id = std::env::var("CRE_WORKFLOW_ID").unwrap_or_default();
        let config = Self::new(url, workflow_id);
        config.validate()?;
        Ok(config)
    }

    /// Validate the gateway configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.url.is_empty() || self.workflow_id.is_empty() {
            return Err(crate::CreError::config(
                "Missing CRE configuration (workflow id or gateway URL)",
            ));
        }

        let parsed = url::Url::parse(&self.url)
            .map_err(|e| crate::CreError::config(format!("Invalid gateway URL: {}", e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(crate::CreError::config(
                "Gateway URL must start with http:// or https://",
            ));
        }

        if self.ttl_seconds <= 0 {
            return Err(crate::CreError::config("Token lifetime must be positive"));
        }

        Ok(())
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the bearer token lifetime
    pub fn with_ttl_seconds(mut self, ttl_seconds: i64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }
}

/// JSON-RPC request understood by the CRE gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: String,
    pub method: String,
    pub params: WorkflowParams,
}

/// Parameters of `workflows.execute`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowParams {
    pub input: Value,
    pub workflow: WorkflowSelector,
}

/// Which workflow to run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSelector {
    #[serde(rename = "workflowID")]
    pub workflow_id: String,
}

impl JsonRpcRequest {
    /// Build a `workflows.execute` request with a fresh request id
    pub fn workflow_execute(workflow_id: impl Into<String>, input: Value) -> Self {
        Self {
            jsonrpc: cre::JSONRPC_VERSION.to_string(),
            id: uuid::Uuid::new_v4().to_string(),
            method: cre::WORKFLOWS_EXECUTE.to_string(),
            params: WorkflowParams {
                input,
                workflow: WorkflowSelector {
                    workflow_id: workflow_id.into(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_workflow_execute_envelope() {
        let request = JsonRpcRequest::workflow_execute("wf-123", json!({"query": "hi"}));
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["method"], "workflows.execute");
        assert_eq!(value["params"]["input"]["query"], "hi");
        assert_eq!(value["params"]["workflow"]["workflowID"], "wf-123");
        assert!(uuid::Uuid::parse_str(value["id"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = JsonRpcRequest::workflow_execute("wf", Value::Null);
        let b = JsonRpcRequest::workflow_execute("wf", Value::Null);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_gateway_config_validation() {
        assert!(GatewayConfig::new("https://gateway.example.com", "wf")
            .validate()
            .is_ok());
        assert!(GatewayConfig::new("", "wf").validate().is_err());
        assert!(GatewayConfig::new("https://gateway.example.com", "")
            .validate()
            .is_err());
        assert!(GatewayConfig::new("ftp://gateway.example.com", "wf")
            .validate()
            .is_err());
        assert!(GatewayConfig::new("https://gateway.example.com", "wf")
            .with_ttl_seconds(0)
            .validate()
            .is_err());
    }
}
