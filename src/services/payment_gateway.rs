//! Payment gateway
//!
//! Creates payment intents and verifies inbound webhook signatures for a
//! Stripe-shaped payment API. Grounded on
//! `examples/original_source/src/payment.py` (`PaymentManager`) for the
//! agorot conversion and webhook-construct-event flow, reimplemented as the
//! trait-plus-`reqwest`-client pattern used by the calendar gateway, with
//! HMAC-SHA256 webhook verification rather than delegating to a vendor SDK.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;

use crate::config::PaymentConfig;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub payment_ref: String,
    pub client_secret: String,
    /// Smallest-currency-unit amount (agorot for ILS).
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
}

/// Outcome of a verified webhook event, already matched to a `paymentRef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    PaymentSucceeded { payment_ref: String },
    PaymentFailed { payment_ref: String, reason: Option<String> },
}

#[async_trait]
pub trait PaymentGatewayService: Send + Sync {
    async fn create_payment_intent(
        &self,
        amount: Decimal,
        currency: &str,
        booking_id: &str,
        description: Option<&str>,
    ) -> Result<PaymentIntent, AppError>;

    /// Verifies the HMAC-SHA256 signature over the raw webhook body and
    /// parses it into a normalized outcome.
    fn verify_and_parse_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookOutcome, AppError>;
}

#[derive(Debug, Clone)]
pub struct PaymentGatewayClient {
    client: Client,
    config: PaymentConfig,
}

#[derive(Debug, Serialize)]
struct CreateIntentRequest {
    amount: i64,
    currency: String,
    description: String,
    metadata: std::collections::HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct CreateIntentResponse {
    id: String,
    client_secret: String,
    amount: i64,
    currency: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
struct WebhookEventData {
    object: WebhookEventObject,
}

#[derive(Debug, Deserialize)]
struct WebhookEventObject {
    id: String,
    #[serde(default)]
    last_payment_error: Option<WebhookPaymentError>,
}

#[derive(Debug, Deserialize)]
struct WebhookPaymentError {
    message: Option<String>,
}

impl PaymentGatewayClient {
    pub fn new(config: PaymentConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    pub fn is_available(&self) -> bool {
        self.config.is_configured()
    }

    /// ILS → agorot (or generically: major unit → minor unit at 100:1).
    fn to_minor_units(amount: Decimal) -> i64 {
        (amount * Decimal::from(100))
            .round()
            .try_into()
            .unwrap_or(0)
    }

    fn map_transport_error(err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            AppError::ExternalServiceTimeout("payment gateway".to_string())
        } else if err.is_connect() {
            AppError::ExternalServiceUnavailable("payment gateway".to_string())
        } else {
            AppError::PaymentGatewayError(err.to_string())
        }
    }
}

#[async_trait]
impl PaymentGatewayService for PaymentGatewayClient {
    async fn create_payment_intent(
        &self,
        amount: Decimal,
        currency: &str,
        booking_id: &str,
        description: Option<&str>,
    ) -> Result<PaymentIntent, AppError> {
        if !self.is_available() {
            return Err(AppError::PaymentGatewayError(
                "payment gateway is not configured".to_string(),
            ));
        }

        let base_url = self.config.base_url.as_deref().expect("checked by is_available");
        let secret_key = self.config.secret_key.as_deref().expect("checked by is_available");

        let mut metadata = std::collections::HashMap::new();
        metadata.insert("booking_id".to_string(), booking_id.to_string());

        let body = CreateIntentRequest {
            amount: Self::to_minor_units(amount),
            currency: currency.to_lowercase(),
            description: description
                .map(str::to_string)
                .unwrap_or_else(|| format!("Booking {booking_id}")),
            metadata,
        };

        let response = self
            .client
            .post(format!("{base_url}/payment_intents"))
            .bearer_auth(secret_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::PaymentGatewayError(format!(
                "HTTP {status}: {text}"
            )));
        }

        let parsed: CreateIntentResponse = response
            .json()
            .await
            .map_err(|e| AppError::PaymentGatewayError(format!("malformed response: {e}")))?;

        Ok(PaymentIntent {
            payment_ref: parsed.id,
            client_secret: parsed.client_secret,
            amount_minor: parsed.amount,
            currency: parsed.currency,
            status: parsed.status,
        })
    }

    fn verify_and_parse_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookOutcome, AppError> {
        let webhook_secret = self
            .config
            .webhook_secret
            .as_deref()
            .ok_or_else(|| AppError::PaymentGatewayError("webhook secret not configured".to_string()))?;

        let mut mac = HmacSha256::new_from_slice(webhook_secret.as_bytes())
            .map_err(|e| AppError::PaymentGatewayError(format!("invalid webhook secret: {e}")))?;
        mac.update(payload);
        let expected = hex::encode(mac.finalize().into_bytes());

        let provided = signature_header.trim();
        if !constant_time_eq(expected.as_bytes(), provided.as_bytes()) {
            return Err(AppError::InvalidWebhookSignature);
        }

        let event: WebhookEvent = serde_json::from_slice(payload)
            .map_err(|e| AppError::PaymentGatewayError(format!("malformed webhook payload: {e}")))?;

        match event.event_type.as_str() {
            "payment_intent.succeeded" => Ok(WebhookOutcome::PaymentSucceeded {
                payment_ref: event.data.object.id,
            }),
            "payment_intent.payment_failed" => Ok(WebhookOutcome::PaymentFailed {
                payment_ref: event.data.object.id,
                reason: event
                    .data
                    .object
                    .last_payment_error
                    .and_then(|e| e.message),
            }),
            other => Err(AppError::PaymentGatewayError(format!(
                "unrecognized webhook event type: {other}"
            ))),
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn to_minor_units_converts_ils_to_agorot() {
        assert_eq!(PaymentGatewayClient::to_minor_units(dec!(150.00)), 15000);
        assert_eq!(PaymentGatewayClient::to_minor_units(dec!(19.99)), 1999);
    }

    #[test]
    fn constant_time_eq_rejects_different_lengths() {
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }

    #[test]
    fn constant_time_eq_accepts_identical_bytes() {
        assert!(constant_time_eq(b"matching-sig", b"matching-sig"));
    }

    #[test]
    fn webhook_signature_mismatch_is_rejected() {
        let config = PaymentConfig {
            base_url: Some("https://payments.example.test".to_string()),
            secret_key: Some("sk_test".to_string()),
            webhook_secret: Some("whsec_test".to_string()),
            timeout_secs: 15,
        };
        let client = PaymentGatewayClient::new(config);
        let payload = br#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_1"}}}"#;
        let result = client.verify_and_parse_webhook(payload, "deadbeef");
        assert!(matches!(result, Err(AppError::InvalidWebhookSignature)));
    }

    #[test]
    fn webhook_with_correct_signature_parses_success_event() {
        let config = PaymentConfig {
            base_url: Some("https://payments.example.test".to_string()),
            secret_key: Some("sk_test".to_string()),
            webhook_secret: Some("whsec_test".to_string()),
            timeout_secs: 15,
        };
        let client = PaymentGatewayClient::new(config);
        let payload = br#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_1"}}}"#;

        let mut mac = HmacSha256::new_from_slice(b"whsec_test").unwrap();
        mac.update(payload);
        let signature = hex::encode(mac.finalize().into_bytes());

        let outcome = client.verify_and_parse_webhook(payload, &signature).unwrap();
        assert_eq!(
            outcome,
            WebhookOutcome::PaymentSucceeded {
                payment_ref: "pi_1".to_string()
            }
        );
    }
}
