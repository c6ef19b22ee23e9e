//! Facilitator client for payment verification and settlement
//!
//! A facilitator verifies x402 payment authorizations and settles them on
//! chain. [`FacilitatorClient`] is the raw HTTP client; [`ResourceServer`]
//! wraps it with the scheme registry, one-time initialization, and the
//! never-failing verify/settle helpers a paid endpoint uses.
//!
//! # Examples
//!
//! ```no_run
//! use mindchain_cre::facilitator::{FacilitatorClient, ResourceServer};
//! use mindchain_cre::types::{networks, schemes, FacilitatorConfig, PaymentOptions};
//! use rust_decimal::Decimal;
//!
//! # async fn example() -> mindchain_cre::Result<()> {
//! let client = FacilitatorClient::new(FacilitatorConfig::default())?;
//! let server = ResourceServer::new(client).register(networks::BASE_SEPOLIA, schemes::EXACT);
//!
//! # let payload = todo!();
//! let options = PaymentOptions::new(Decimal::new(1, 2), "0x209693Bc6afc0C5328bA36FaF03C514EF312287C");
//! let verification = server.verify_payment(&payload, &options).await;
//! if verification.is_valid {
//!     let settlement = server.settle_payment(&payload, &options).await;
//!     println!("Payment settled: {}", settlement.transaction);
//! }
//! # Ok(())
//! # }
//! ```

use crate::types::{
    FacilitatorConfig, PaymentPayload, PaymentRequirements, SettleResponse, SupportedKinds,
    VerifyResponse, X402_VERSION,
};
use crate::{CreError, Result};
use reqwest::Client;
use serde_json::json;

pub mod resource_server;

#[cfg(test)]
mod tests;

pub use resource_server::ResourceServer;

/// Facilitator client for verifying and settling payments
#[derive(Debug, Clone)]
pub struct FacilitatorClient {
    /// Base URL of the facilitator service
    url: String,
    /// HTTP client
    client: Client,
}

impl FacilitatorClient {
    /// Create a new facilitator client
    pub fn new(config: FacilitatorConfig) -> Result<Self> {
        config.validate()?;

        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder
            .build()
            .map_err(|e| CreError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: config.url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Verify a payment without executing the transaction
    pub async fn verify(
        &self,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse> {
        let request_body = json!({
            "x402Version": X402_VERSION,
            "paymentPayload": payment_payload,
            "paymentRequirements": payment_requirements,
        });

        tracing::debug!(
            "Facilitator verify request body: {}",
            serde_json::to_string_pretty(&request_body).unwrap_or_default()
        );

        let response = self
            .client
            .post(format!("{}/verify", self.url))
            .json(&request_body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let response_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            tracing::error!(
                "Facilitator verify failed with status: {}. Response body: {}",
                status,
                response_body
            );
            return Err(CreError::facilitator_error(format!(
                "Verification failed with status: {}. Response: {}",
                status, response_body
            )));
        }

        let verify_response: VerifyResponse = response.json().await?;
        Ok(verify_response)
    }

    /// Settle a verified payment on chain
    pub async fn settle(
        &self,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<SettleResponse> {
        let request_body = json!({
            "x402Version": X402_VERSION,
            "paymentPayload": payment_payload,
            "paymentRequirements": payment_requirements,
        });

        tracing::debug!("Sending settle request to: {}/settle", self.url);

        let response = self
            .client
            .post(format!("{}/settle", self.url))
            .json(&request_body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let response_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            tracing::error!(
                "Facilitator settle failed with status: {}. Response body: {}",
                status,
                response_body
            );
            return Err(CreError::facilitator_error(format!(
                "Settlement failed with status: {}. Response: {}",
                status, response_body
            )));
        }

        let settle_response: SettleResponse = response.json().await?;
        Ok(settle_response)
    }

    /// Get supported payment schemes and networks
    pub async fn supported(&self) -> Result<SupportedKinds> {
        let response = self
            .client
            .get(format!("{}/supported", self.url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CreError::facilitator_error(format!(
                "Failed to get supported kinds with status: {}",
                response.status()
            )));
        }

        let supported: SupportedKinds = response.json().await?;
        Ok(supported)
    }

    /// Get the base URL of this facilitator
    pub fn url(&self) -> &str {
        &self.url
    }
}
