//! MindChain CRE gateway
//!
//! Runs the pay-per-query HTTP service, or signs a single request body.
//!
//! ```text
//! mindchain-gateway [serve]     # start the HTTP service
//! mindchain-gateway sign        # read a JSON body from stdin, print its bearer token
//! ```
//!
//! ## Environment
//!
//! - `CRE_GATEWAY_URL`, `CRE_WORKFLOW_ID` - workflow to execute
//! - `CRE_PRIVATE_KEY` - key the gateway requests are signed with
//! - `FACILITATOR_URL` - x402 facilitator (default: https://x402.org/facilitator)
//! - `PAY_TO_ADDRESS`, `PRICE_USD` - what each query costs and who is paid
//! - `BIND_ADDRESS` - server bind address (default: 0.0.0.0:4021)
//! - `PUBLIC_URL` - externally visible base URL used in 402 responses

use std::io::Read;
use std::sync::Arc;

use mindchain_cre::{
    crypto::RequestAuthenticator,
    facilitator::{FacilitatorClient, ResourceServer},
    server::{self, AppState, ServerConfig},
    types::{networks, schemes, FacilitatorConfig, GatewayConfig},
    wallet::{MessageSigner, Wallet},
    CreError, Result,
};
use serde_json::Value;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    match std::env::args().nth(1).as_deref() {
        None | Some("serve") => serve().await?,
        Some("sign") => sign().await?,
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Usage: mindchain-gateway [serve|sign]");
            std::process::exit(2);
        }
    }

    Ok(())
}

async fn serve() -> Result<()> {
    let gateway_config = GatewayConfig::from_env()?;
    let facilitator_config = FacilitatorConfig::from_env();
    let server_config = ServerConfig::from_env()?;
    let wallet = Wallet::from_env()?;

    tracing::info!(
        workflow_id = %gateway_config.workflow_id,
        signer = %wallet.address(),
        facilitator = %facilitator_config.url,
        price_usd = %server_config.payment.price_usd,
        "Starting MindChain gateway"
    );

    let facilitator = FacilitatorClient::new(facilitator_config)?;
    let resource_server =
        ResourceServer::new(facilitator).register(networks::BASE_SEPOLIA, schemes::EXACT);

    // Not fatal: the first paid request retries it
    if let Err(e) = resource_server.initialize().await {
        tracing::warn!("Resource server initialization deferred: {}", e);
    }

    let gateway = mindchain_cre::gateway::GatewayClient::new(gateway_config, Arc::new(wallet))?;
    let state = AppState::new(resource_server, gateway, &server_config);

    server::serve(&server_config, state).await
}

async fn sign() -> Result<()> {
    let wallet = Wallet::from_env()?;

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| CreError::malformed_input(format!("Failed to read stdin: {}", e)))?;
    let body: Value = serde_json::from_str(&input)?;

    let token = RequestAuthenticator::new()
        .authenticate(&body, &wallet, &wallet.address())
        .await?;
    println!("{}", token);

    Ok(())
}
