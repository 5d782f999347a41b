//! Example: Receiving Provider Webhooks
//!
//! This example plays the role of the HTTP endpoint that sits in front of
//! the webhook processor:
//! - Registering handlers once at startup
//! - Signing sample deliveries the way the provider would
//! - Processing them and mapping each result to an HTTP status
//!
//! Run with: `cargo run --example webhooks_example`
//! Set `PAYHOOK_LOG_FORMAT=pretty PAYHOOK_DEBUG=1` to see the processor's logs.

use payhook::prelude::*;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

const SECRET: &str = "whsec_demo_shared_secret";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    payhook::payhook_log::init();

    println!("🪝 Payhook Webhook Receiver Example");
    println!("===================================\n");

    let processor = build_processor()?;

    demonstrate_valid_delivery(&processor).await?;
    demonstrate_tampered_delivery(&processor).await?;
    demonstrate_unknown_event(&processor).await?;
    demonstrate_handler_failure(&processor).await?;
    demonstrate_header_gate(&processor);

    Ok(())
}

fn build_processor() -> Result<WebhookProcessor, WebhookError> {
    let dispatcher = WebhookDispatcher::builder()
        .on("customer.created", |envelope: Arc<WebhookEnvelope>, _cancel| async move {
            tracing::info!(customer = %envelope.data()["customerId"], "Provisioning customer");
            Ok::<(), HandlerError>(())
        })
        .on("payment.settled", |envelope: Arc<WebhookEnvelope>, _cancel| async move {
            let amount = envelope
                .data()
                .get("amount")
                .and_then(|v| v.as_i64())
                .ok_or("payment.settled without amount")?;
            tracing::info!(amount, "Recording settlement");
            Ok::<(), HandlerError>(())
        })
        .build();

    WebhookProcessor::new(SECRET, dispatcher)
}

/// Simulates the provider: serialize once, sign those exact bytes
fn deliver(envelope: &WebhookEnvelope) -> Result<(Vec<u8>, String), serde_json::Error> {
    let body = envelope.to_bytes()?;
    let signature = WebhookSignature::compute_signature(SECRET, &body);
    Ok((body, signature))
}

/// What an HTTP endpoint would answer
fn http_status(result: &WebhookProcessResult) -> u16 {
    match result.error() {
        None => 200,
        Some(error) if error.to_lowercase().contains("signature") => 401,
        Some(_) => 400,
    }
}

fn report(result: &WebhookProcessResult) {
    println!("   HTTP {}", http_status(result));
    println!("   Result: {}", serde_json::to_string(result).unwrap_or_default());
    println!();
}

async fn demonstrate_valid_delivery(
    processor: &WebhookProcessor,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("1️⃣  Valid Delivery");
    println!("------------------");

    let envelope =
        WebhookEnvelope::new("customer.created").with_data(json!({"customerId": "cus_1001"}));
    let (body, signature) = deliver(&envelope)?;

    let result = processor
        .process(&body, &signature, CancellationToken::new())
        .await;
    report(&result);
    Ok(())
}

async fn demonstrate_tampered_delivery(
    processor: &WebhookProcessor,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("2️⃣  Tampered Delivery");
    println!("---------------------");

    let envelope = WebhookEnvelope::new("payment.settled").with_data(json!({"amount": 1000}));
    let (body, signature) = deliver(&envelope)?;
    let tampered = String::from_utf8(body)?.replace("1000", "9000");

    let result = processor
        .process(tampered.as_bytes(), &signature, CancellationToken::new())
        .await;
    report(&result);
    Ok(())
}

async fn demonstrate_unknown_event(
    processor: &WebhookProcessor,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("3️⃣  Unknown Event Type");
    println!("----------------------");

    let envelope = WebhookEnvelope::new("card.issued").with_data(json!({"cardId": "card_9"}));
    let (body, signature) = deliver(&envelope)?;

    let result = processor
        .process(&body, &signature, CancellationToken::new())
        .await;
    report(&result);
    Ok(())
}

async fn demonstrate_handler_failure(
    processor: &WebhookProcessor,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("4️⃣  Handler Failure");
    println!("-------------------");

    let envelope = WebhookEnvelope::new("payment.settled").with_data(json!({"currency": "EUR"}));
    let (body, signature) = deliver(&envelope)?;

    let result = processor
        .process(&body, &signature, CancellationToken::new())
        .await;
    report(&result);

    // Direct dispatch keeps the error, for hosts that answer 5xx to get a redelivery
    let parsed = processor.parser().parse_event(&body, &signature)?;
    match processor
        .dispatcher()
        .dispatch(parsed, CancellationToken::new())
        .await
    {
        Ok(outcome) => println!("   Direct dispatch: {:?}", outcome),
        Err(err) => println!("   Direct dispatch error (would answer 500): {}", err),
    }
    println!();
    Ok(())
}

fn demonstrate_header_gate(processor: &WebhookProcessor) {
    println!("5️⃣  Early Signature Gate");
    println!("------------------------");

    let body = br#"{"id":"evt_gate","event":"customer.created","data":{}}"#;
    let mut headers = HashMap::new();
    headers.insert(
        processor.signature_header().to_string(),
        WebhookSignature::compute_signature(SECRET, body),
    );

    println!(
        "   Signed request accepted: {}",
        processor.validate_from_headers(body, &headers)
    );
    println!(
        "   Unsigned request accepted: {}",
        processor.validate_from_headers(body, &HashMap::new())
    );
    println!();
}
