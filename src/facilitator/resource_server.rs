//! x402 resource server
//!
//! The server is constructed once at startup and shared (typically behind an
//! `Arc`) by every paid endpoint. Its first verify or settle call fetches the
//! facilitator's supported kinds; the result is cached for the server's
//! lifetime. A failed fetch is not cached, so the next call retries it.

use super::FacilitatorClient;
use crate::types::{
    PaymentOptions, PaymentPayload, PaymentRequired, ResourceInfo, SettleResponse,
    SupportedKinds, VerifyResponse,
};
use crate::{CreError, Result};
use tokio::sync::OnceCell;

/// Paid-resource side of the x402 flow
#[derive(Debug)]
pub struct ResourceServer {
    facilitator: FacilitatorClient,
    /// Registered `(network, scheme)` pairs
    schemes: Vec<(String, String)>,
    supported: OnceCell<SupportedKinds>,
}

impl ResourceServer {
    /// Create a resource server backed by `facilitator`
    pub fn new(facilitator: FacilitatorClient) -> Self {
        Self {
            facilitator,
            schemes: Vec::new(),
            supported: OnceCell::new(),
        }
    }

    /// Register a payment scheme on a network
    pub fn register(mut self, network: impl Into<String>, scheme: impl Into<String>) -> Self {
        self.schemes.push((network.into(), scheme.into()));
        self
    }

    /// Registered `(network, scheme)` pairs
    pub fn schemes(&self) -> &[(String, String)] {
        &self.schemes
    }

    /// Whether the facilitator's supported kinds have been fetched
    pub fn is_initialized(&self) -> bool {
        self.supported.initialized()
    }

    /// Fetch the facilitator's supported kinds, once
    pub async fn initialize(&self) -> Result<&SupportedKinds> {
        self.supported
            .get_or_try_init(|| async {
                let supported = self.facilitator.supported().await?;
                for (network, scheme) in &self.schemes {
                    if !supported.supports(network, scheme) {
                        tracing::warn!(
                            "[x402] Facilitator does not advertise scheme {} on {}",
                            scheme,
                            network
                        );
                    }
                }
                tracing::info!(
                    "[x402] Resource server initialized with {} supported kinds",
                    supported.kinds.len()
                );
                Ok::<_, CreError>(supported)
            })
            .await
    }

    /// Verify a payment against the requirements derived from `options`
    ///
    /// Never fails: errors are reported as an invalid result.
    pub async fn verify_payment(
        &self,
        payment_payload: &PaymentPayload,
        options: &PaymentOptions,
    ) -> VerifyResponse {
        match self.try_verify(payment_payload, options).await {
            Ok(result) => {
                tracing::info!("[x402] Verification result: valid={}", result.is_valid);
                result
            }
            Err(e) => {
                tracing::error!("[x402] Payment verification failed: {}", e);
                VerifyResponse::invalid(e.to_string())
            }
        }
    }

    async fn try_verify(
        &self,
        payment_payload: &PaymentPayload,
        options: &PaymentOptions,
    ) -> Result<VerifyResponse> {
        self.initialize().await?;
        let requirements = options.to_requirements()?;

        tracing::info!(
            price_usd = %options.price_usd,
            pay_to = %options.pay_to,
            network = %requirements.network,
            usdc_amount = %requirements.amount,
            "[x402] Verifying payment"
        );

        self.facilitator
            .verify(payment_payload, &requirements)
            .await
    }

    /// Settle a payment against the requirements derived from `options`
    ///
    /// Never fails: errors are reported as an unsuccessful settlement.
    pub async fn settle_payment(
        &self,
        payment_payload: &PaymentPayload,
        options: &PaymentOptions,
    ) -> SettleResponse {
        match self.try_settle(payment_payload, options).await {
            Ok(result) => {
                tracing::info!(
                    "[x402] Settlement result: success={} transaction={}",
                    result.success,
                    result.transaction
                );
                result
            }
            Err(e) => {
                tracing::error!("[x402] Payment settlement failed: {}", e);
                SettleResponse::failed(e.to_string(), options.network())
            }
        }
    }

    async fn try_settle(
        &self,
        payment_payload: &PaymentPayload,
        options: &PaymentOptions,
    ) -> Result<SettleResponse> {
        self.initialize().await?;
        let requirements = options.to_requirements()?;

        tracing::info!(
            price_usd = %options.price_usd,
            pay_to = %options.pay_to,
            network = %requirements.network,
            usdc_amount = %requirements.amount,
            "[x402] Settling payment"
        );

        self.facilitator
            .settle(payment_payload, &requirements)
            .await
    }

    /// Build the 402 body advertising how to pay for `resource`
    pub fn payment_required(
        &self,
        resource: ResourceInfo,
        options: &PaymentOptions,
    ) -> Result<PaymentRequired> {
        Ok(PaymentRequired::new(resource, options.to_requirements()?))
    }
}
