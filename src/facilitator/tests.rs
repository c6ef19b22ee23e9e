//! Tests for the facilitator client and resource server

use super::{FacilitatorClient, ResourceServer};
use crate::types::{
    networks, schemes, FacilitatorConfig, PaymentOptions, PaymentPayload, ResourceInfo,
};
use mockito::{Matcher, Server};
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;
use std::time::Duration;

const PAYER: &str = "0x857b06519E91e3A54538791bDbb0E22373e36b66";
const PAY_TO: &str = "0x209693Bc6afc0C5328bA36FaF03C514EF312287C";

fn create_test_options() -> PaymentOptions {
    PaymentOptions::new(Decimal::from_str("0.01").unwrap(), PAY_TO)
}

fn create_test_payment_payload() -> PaymentPayload {
    PaymentPayload::new(
        create_test_options().to_requirements().unwrap(),
        json!({
            "signature": "0x2d6a7588d6acca505cbf0d9a4a227e0c52c6c34008c8e8986a1283259764173608a2ce6496642e377d6da8dbbf5836e9bd15092f9ecab05ded3d6293af148b571c",
            "authorization": {
                "from": PAYER,
                "to": PAY_TO,
                "value": "10000",
                "validAfter": "1745323800",
                "validBefore": "1745323985",
                "nonce": "0xf3746613c2d920b5fdabc0856f2aeb2d4f88ee6037b8cc5d04a71a4462f13480"
            }
        }),
    )
}

fn supported_body() -> String {
    json!({
        "kinds": [
            {"x402Version": 2, "scheme": "exact", "network": "eip155:84532"}
        ]
    })
    .to_string()
}

fn resource_server(url: String) -> ResourceServer {
    let client = FacilitatorClient::new(FacilitatorConfig::new(url)).unwrap();
    ResourceServer::new(client).register(networks::BASE_SEPOLIA, schemes::EXACT)
}

#[tokio::test]
async fn test_facilitator_client_creation() {
    let config = FacilitatorConfig::new("https://example.com/facilitator/");
    let client = FacilitatorClient::new(config).unwrap();
    assert_eq!(client.url(), "https://example.com/facilitator");
}

#[tokio::test]
async fn test_facilitator_client_rejects_invalid_url() {
    assert!(FacilitatorClient::new(FacilitatorConfig::new("")).is_err());
    assert!(FacilitatorClient::new(FacilitatorConfig::new("ftp://example.com")).is_err());
    // Scheme prefix alone is not a URL
    assert!(FacilitatorConfig::new("https://").validate().is_err());
    assert!(FacilitatorConfig::new("http://exa mple.com").validate().is_err());
    assert!(FacilitatorConfig::new("https://x402.org/facilitator")
        .validate()
        .is_ok());
}

#[tokio::test]
async fn test_facilitator_verify_sends_requirements() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/verify")
        .match_body(Matcher::PartialJson(json!({
            "x402Version": 2,
            "paymentRequirements": {
                "scheme": "exact",
                "network": "eip155:84532",
                "amount": "10000",
                "payTo": PAY_TO
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"isValid": true, "payer": PAYER}).to_string())
        .create_async()
        .await;

    let client = FacilitatorClient::new(FacilitatorConfig::new(server.url())).unwrap();
    let requirements = create_test_options().to_requirements().unwrap();

    let response = client
        .verify(&create_test_payment_payload(), &requirements)
        .await
        .unwrap();
    assert!(response.is_valid);
    assert_eq!(response.payer, Some(PAYER.to_string()));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_facilitator_settle_failure_body() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/settle")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "success": false,
                "errorReason": "transaction_failed",
                "transaction": "",
                "network": "eip155:84532"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = FacilitatorClient::new(FacilitatorConfig::new(server.url())).unwrap();
    let requirements = create_test_options().to_requirements().unwrap();

    let response = client
        .settle(&create_test_payment_payload(), &requirements)
        .await
        .unwrap();
    assert!(!response.success);
    assert_eq!(
        response.error_reason,
        Some("transaction_failed".to_string())
    );
}

#[tokio::test]
async fn test_facilitator_server_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/verify")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let client = FacilitatorClient::new(FacilitatorConfig::new(server.url())).unwrap();
    let requirements = create_test_options().to_requirements().unwrap();

    let result = client
        .verify(&create_test_payment_payload(), &requirements)
        .await;
    let message = result.unwrap_err().to_string();
    assert!(message.contains("Verification failed with status: 500"));
    assert!(message.contains("boom"));
}

#[tokio::test]
async fn test_facilitator_supported() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/supported")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(supported_body())
        .create_async()
        .await;

    let client = FacilitatorClient::new(FacilitatorConfig::new(server.url())).unwrap();
    let supported = client.supported().await.unwrap();
    assert_eq!(supported.kinds.len(), 1);
    assert!(supported.supports("eip155:84532", "exact"));
    assert!(!supported.supports("eip155:8453", "exact"));
}

#[tokio::test]
async fn test_resource_server_initializes_once() {
    let mut server = Server::new_async().await;
    let supported = server
        .mock("GET", "/supported")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(supported_body())
        .expect(1)
        .create_async()
        .await;
    let _verify = server
        .mock("POST", "/verify")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"isValid": true, "payer": PAYER}).to_string())
        .expect(2)
        .create_async()
        .await;

    let resource_server = resource_server(server.url());
    assert!(!resource_server.is_initialized());

    let payload = create_test_payment_payload();
    let options = create_test_options();
    assert!(resource_server.verify_payment(&payload, &options).await.is_valid);
    assert!(resource_server.verify_payment(&payload, &options).await.is_valid);

    assert!(resource_server.is_initialized());
    supported.assert_async().await;
}

#[tokio::test]
async fn test_resource_server_retries_failed_initialization() {
    let mut server = Server::new_async().await;
    let failing = server
        .mock("GET", "/supported")
        .with_status(503)
        .create_async()
        .await;

    let resource_server = resource_server(server.url());
    let payload = create_test_payment_payload();
    let options = create_test_options();

    let result = resource_server.verify_payment(&payload, &options).await;
    assert!(!result.is_valid);
    assert!(result.invalid_reason.unwrap().contains("503"));
    assert!(!resource_server.is_initialized());

    failing.remove_async().await;
    let _supported = server
        .mock("GET", "/supported")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(supported_body())
        .create_async()
        .await;

    resource_server.initialize().await.unwrap();
    assert!(resource_server.is_initialized());
}

#[tokio::test]
async fn test_resource_server_settle_error_becomes_failed_settlement() {
    let mut server = Server::new_async().await;
    let _supported = server
        .mock("GET", "/supported")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(supported_body())
        .create_async()
        .await;
    let _settle = server
        .mock("POST", "/settle")
        .with_status(500)
        .create_async()
        .await;

    let resource_server = resource_server(server.url());
    let result = resource_server
        .settle_payment(&create_test_payment_payload(), &create_test_options())
        .await;

    assert!(!result.success);
    assert_eq!(result.transaction, "");
    assert_eq!(result.network, networks::BASE_SEPOLIA);
    assert!(result.error_reason.unwrap().contains("Settlement failed"));
}

#[tokio::test]
async fn test_resource_server_payment_required() {
    let resource_server = resource_server("https://example.com".to_string());
    let body = resource_server
        .payment_required(
            ResourceInfo::new("https://api.example.com/agent/query"),
            &create_test_options(),
        )
        .unwrap();

    assert_eq!(body.x402_version, 2);
    assert_eq!(body.accepts.len(), 1);
    assert_eq!(body.accepts[0].pay_to, PAY_TO);
    assert_eq!(body.accepts[0].amount, "10000");
}

#[tokio::test]
async fn test_facilitator_timeout() {
    let config =
        FacilitatorConfig::new("http://10.255.255.1:9999").with_timeout(Duration::from_millis(1));
    let client = FacilitatorClient::new(config).unwrap();

    let result = client.supported().await;
    assert!(result.is_err());
}
