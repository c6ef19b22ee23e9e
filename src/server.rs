//! Pay-per-request HTTP service in front of a CRE workflow
//!
//! `POST /agent/query` charges an x402 payment for each call, then runs the
//! configured workflow with the request body as input:
//!
//! 1. No payment signature header: 402 with the payment requirements.
//! 2. Payment rejected by the facilitator: 402 with the reason.
//! 3. Workflow call fails: 502, nothing is settled.
//! 4. Settlement fails: 402 with the reason, the result is withheld.
//! 5. Otherwise: 200 with the workflow result and a `PAYMENT-RESPONSE` header.

use crate::facilitator::ResourceServer;
use crate::gateway::GatewayClient;
use crate::types::{
    parse_payment_signature, PaymentOptions, PaymentRequired, ResourceInfo, SettleResponse,
    PAYMENT_RESPONSE_HEADER,
};
use crate::{CreError, Result};
use axum::{
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Default price of one agent query in US dollars
pub const DEFAULT_PRICE_USD: &str = "0.01";

/// Configuration for the HTTP service
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:4021")
    pub bind_address: String,
    /// What each query costs
    pub payment: PaymentOptions,
    /// Description shown in 402 responses
    pub description: String,
    /// Externally visible base URL (e.g., "https://api.example.com")
    ///
    /// When unset, resource URLs are built from the request's `Host` header.
    pub public_url: Option<String>,
}

impl ServerConfig {
    /// Create a new server config
    pub fn new(bind_address: impl Into<String>, payment: PaymentOptions) -> Self {
        Self {
            bind_address: bind_address.into(),
            payment,
            description: "MindChain AI agent query".to_string(),
            public_url: None,
        }
    }

    /// Read `BIND_ADDRESS`, `PAY_TO_ADDRESS`, `PRICE_USD` and `PUBLIC_URL`
    pub fn from_env() -> Result<Self> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:4021".to_string());
        let pay_to = std::env::var("PAY_TO_ADDRESS")
            .map_err(|_| CreError::config("PAY_TO_ADDRESS must be set"))?;
        let price = std::env::var("PRICE_USD").unwrap_or_else(|_| DEFAULT_PRICE_USD.to_string());
        let price_usd = Decimal::from_str(&price)
            .map_err(|e| CreError::config(format!("Invalid PRICE_USD {}: {}", price, e)))?;

        let mut config = Self::new(bind_address, PaymentOptions::new(price_usd, pay_to));
        if let Some(public_url) = std::env::var("PUBLIC_URL").ok().filter(|url| !url.is_empty()) {
            config = config.with_public_url(public_url)?;
        }
        Ok(config)
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the externally visible base URL
    pub fn with_public_url(mut self, public_url: impl Into<String>) -> Result<Self> {
        let public_url = public_url.into();
        url::Url::parse(&public_url)
            .map_err(|e| CreError::config(format!("Invalid PUBLIC_URL {}: {}", public_url, e)))?;
        self.public_url = Some(public_url.trim_end_matches('/').to_string());
        Ok(self)
    }
}

/// Shared state of the service
#[derive(Debug, Clone)]
pub struct AppState {
    pub resource_server: Arc<ResourceServer>,
    pub gateway: Arc<GatewayClient>,
    pub payment: PaymentOptions,
    pub description: String,
    pub public_url: Option<String>,
}

impl AppState {
    /// Assemble the service state
    pub fn new(
        resource_server: ResourceServer,
        gateway: GatewayClient,
        config: &ServerConfig,
    ) -> Self {
        Self {
            resource_server: Arc::new(resource_server),
            gateway: Arc::new(gateway),
            payment: config.payment.clone(),
            description: config.description.clone(),
            public_url: config.public_url.clone(),
        }
    }
}

/// Build the router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/agent/query", post(agent_query_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .map_err(|e| {
            CreError::config(format!("Failed to bind to {}: {}", config.bind_address, e))
        })?;

    tracing::info!("MindChain gateway listening on http://{}", config.bind_address);

    axum::serve(listener, create_app(state))
        .await
        .map_err(|e| CreError::config(format!("Server error: {}", e)))?;

    Ok(())
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": crate::VERSION,
    }))
}

async fn agent_query_handler(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Response {
    let resource = ResourceInfo::new(resource_url(&state, &headers, &uri))
        .with_description(state.description.clone());

    let Some(payment_payload) = parse_payment_signature(&headers) else {
        return payment_required(&state, resource, "Payment-Signature header is required");
    };

    let verification = state
        .resource_server
        .verify_payment(&payment_payload, &state.payment)
        .await;
    if !verification.is_valid {
        let reason = verification
            .invalid_reason
            .unwrap_or_else(|| "Payment verification failed".to_string());
        return payment_required(&state, resource, &reason);
    }

    let result = match state.gateway.execute(input).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("CRE workflow call failed: {}", e);
            return (StatusCode::BAD_GATEWAY, Json(json!({"error": e.to_string()})))
                .into_response();
        }
    };

    let settlement = state
        .resource_server
        .settle_payment(&payment_payload, &state.payment)
        .await;
    if !settlement.success {
        let reason = settlement
            .error_reason
            .clone()
            .unwrap_or_else(|| "Payment settlement failed".to_string());
        return payment_required(&state, resource, &reason);
    }

    let mut response = Json(result).into_response();
    match settlement_header(&settlement) {
        Some((name, value)) => {
            response.headers_mut().insert(name, value);
        }
        None => tracing::warn!("Failed to encode settlement response header"),
    }
    response
}

/// Absolute URL of the requested resource
fn resource_url(state: &AppState, headers: &HeaderMap, uri: &Uri) -> String {
    let path = uri.path_and_query().map_or("/", |p| p.as_str());

    if let Some(public_url) = &state.public_url {
        return format!("{}{}", public_url, path);
    }
    if uri.scheme().is_some() {
        return uri.to_string();
    }

    let host = headers
        .get(http::header::HOST)
        .and_then(|value| value.to_str().ok());
    match host {
        Some(host) => {
            let scheme = headers
                .get("x-forwarded-proto")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("http");
            format!("{}://{}{}", scheme, host, path)
        }
        None => path.to_string(),
    }
}

fn settlement_header(settlement: &SettleResponse) -> Option<(HeaderName, HeaderValue)> {
    let name = HeaderName::from_bytes(PAYMENT_RESPONSE_HEADER.as_bytes()).ok()?;
    let value = HeaderValue::from_str(&settlement.to_base64().ok()?).ok()?;
    Some((name, value))
}

fn payment_required(state: &AppState, resource: ResourceInfo, error: &str) -> Response {
    match state
        .resource_server
        .payment_required(resource, &state.payment)
    {
        Ok(body) => {
            let body: PaymentRequired = body.with_error(error);
            (StatusCode::PAYMENT_REQUIRED, Json(body)).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}
