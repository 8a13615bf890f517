use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use sha2::Sha256;
use tracing::error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Signatures older than this are rejected as replays.
pub const WEBHOOK_TOLERANCE_SECS: i64 = 300;

/// Minimal Stripe client built on reqwest.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    webhook_secret: String,
    success_url: String,
    cancel_url: String,
}

#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub type_: String,
    pub created: Option<i64>,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

pub struct CheckoutSessionParams<'a> {
    pub price_id: &'a str,
    pub user_id: Uuid,
    pub customer_id: Option<&'a str>,
    pub customer_email: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    message: Option<String>,
    param: Option<String>,
}

/// `data.object` of `customer.subscription.*` events.
#[derive(Debug, Deserialize)]
pub struct StripeSubscriptionObject {
    pub id: String,
    pub customer: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub items: StripeSubscriptionItems,
}

#[derive(Debug, Deserialize, Default)]
pub struct StripeSubscriptionItems {
    pub data: Vec<StripeSubscriptionItem>,
}

#[derive(Debug, Deserialize)]
pub struct StripeSubscriptionItem {
    pub price: Option<StripePrice>,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StripePrice {
    pub id: String,
}

impl StripeSubscriptionObject {
    pub fn user_id(&self) -> Option<Uuid> {
        self.metadata
            .get("userId")
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
    }

    pub fn price_id(&self) -> Option<&str> {
        self.items
            .data
            .first()
            .and_then(|item| item.price.as_ref())
            .map(|price| price.id.as_str())
    }

    /// Newer API versions move the period onto the subscription item.
    pub fn period_start(&self) -> Option<DateTime<Utc>> {
        self.current_period_start
            .or_else(|| self.items.data.first().and_then(|i| i.current_period_start))
            .and_then(unix_to_utc)
    }

    pub fn period_end(&self) -> Option<DateTime<Utc>> {
        self.current_period_end
            .or_else(|| self.items.data.first().and_then(|i| i.current_period_end))
            .and_then(unix_to_utc)
    }
}

/// `data.object` of `invoice.*` events.
#[derive(Debug, Deserialize)]
pub struct StripeInvoiceObject {
    pub id: Option<String>,
    pub subscription: Option<String>,
    pub parent: Option<StripeInvoiceParent>,
    #[serde(default)]
    pub amount_paid: i64,
    #[serde(default)]
    pub amount_due: i64,
    pub currency: Option<String>,
    pub period_start: Option<i64>,
    pub period_end: Option<i64>,
    pub invoice_pdf: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeInvoiceParent {
    pub subscription_details: Option<StripeInvoiceSubscriptionDetails>,
}

#[derive(Debug, Deserialize)]
pub struct StripeInvoiceSubscriptionDetails {
    pub subscription: Option<String>,
}

impl StripeInvoiceObject {
    pub fn subscription_id(&self) -> Option<&str> {
        self.subscription.as_deref().or_else(|| {
            self.parent
                .as_ref()
                .and_then(|p| p.subscription_details.as_ref())
                .and_then(|d| d.subscription.as_deref())
        })
    }

    pub fn period_start_at(&self) -> Option<DateTime<Utc>> {
        self.period_start.and_then(unix_to_utc)
    }

    pub fn period_end_at(&self) -> Option<DateTime<Utc>> {
        self.period_end.and_then(unix_to_utc)
    }
}

pub fn unix_to_utc(seconds: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0).single()
}

impl StripeClient {
    pub fn new(
        secret_key: String,
        webhook_secret: String,
        success_url: String,
        cancel_url: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            webhook_secret,
            success_url,
            cancel_url,
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("request-id")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let details = serde_json::from_str::<StripeErrorEnvelope>(&body)
            .ok()
            .map(|envelope| envelope.error);

        error!(
            status = %status,
            stripe_request_id = ?request_id,
            stripe_error_type = ?details.as_ref().and_then(|d| d.type_.as_deref()),
            stripe_error_code = ?details.as_ref().and_then(|d| d.code.as_deref()),
            stripe_error_param = ?details.as_ref().and_then(|d| d.param.as_deref()),
            stripe_error_message = ?details.as_ref().and_then(|d| d.message.as_deref()),
            context = %context,
            "stripe: api request failed"
        );

        anyhow::bail!(
            "Stripe API request failed: {} (status {}, request_id={:?})",
            context,
            status,
            request_id
        );
    }

    fn checkout_form(&self, params: &CheckoutSessionParams<'_>) -> Vec<(String, String)> {
        let user_id = params.user_id.to_string();
        let mut body: Vec<(String, String)> = vec![
            ("mode".to_string(), "subscription".to_string()),
            ("line_items[0][price]".to_string(), params.price_id.to_string()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
            ("client_reference_id".to_string(), user_id.clone()),
            ("metadata[userId]".to_string(), user_id.clone()),
            ("subscription_data[metadata][userId]".to_string(), user_id),
        ];

        match (params.customer_id, params.customer_email) {
            (Some(customer), _) => body.push(("customer".to_string(), customer.to_string())),
            (None, Some(email)) => body.push(("customer_email".to_string(), email.to_string())),
            (None, None) => {}
        }

        body
    }

    /// Creates a subscription-mode Checkout Session. The user id travels in
    /// both the session and the subscription metadata so later subscription
    /// events can be attributed.
    pub async fn create_checkout_session(
        &self,
        params: CheckoutSessionParams<'_>,
    ) -> Result<CheckoutSession> {
        let body = self.checkout_form(&params);

        let resp = self
            .http
            .post(format!("{STRIPE_API_BASE}/checkout/sessions"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create checkout session").await?;

        #[derive(Deserialize)]
        struct CheckoutResp {
            id: String,
            url: Option<String>,
        }

        let parsed: CheckoutResp = resp.json().await?;
        let url = parsed
            .url
            .ok_or_else(|| anyhow::anyhow!("Stripe Checkout session URL is missing"))?;

        Ok(CheckoutSession { id: parsed.id, url })
    }

    /// Marks a Stripe subscription to cancel at period end.
    pub async fn cancel_subscription(&self, stripe_subscription_id: &str) -> Result<()> {
        let body = [("cancel_at_period_end", "true".to_string())];
        let resp = self
            .http
            .post(format!(
                "{STRIPE_API_BASE}/subscriptions/{stripe_subscription_id}"
            ))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&body)
            .send()
            .await?;
        Self::ensure_success(resp, "cancel subscription").await?;

        Ok(())
    }

    /// Verifies the `Stripe-Signature` header and parses the event.
    pub fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent> {
        self.verify_webhook_signature_at(payload, signature_header, Utc::now().timestamp())
    }

    pub fn verify_webhook_signature_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now_unix: i64,
    ) -> Result<StripeEvent> {
        let mut timestamp: Option<&str> = None;
        let mut signatures: Vec<&str> = Vec::new();

        for part in signature_header.split(',') {
            let part = part.trim();
            if let Some(rest) = part.strip_prefix("t=") {
                timestamp = Some(rest);
            } else if let Some(rest) = part.strip_prefix("v1=") {
                signatures.push(rest);
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| anyhow::anyhow!("missing timestamp in stripe-signature"))?;
        if signatures.is_empty() {
            anyhow::bail!("missing v1 in stripe-signature");
        }

        let signed_at: i64 = timestamp
            .parse()
            .map_err(|_| anyhow::anyhow!("malformed timestamp in stripe-signature"))?;
        if (now_unix - signed_at).abs() > WEBHOOK_TOLERANCE_SECS {
            anyhow::bail!("stripe-signature timestamp outside tolerance");
        }

        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);

        let matched = signatures.iter().any(|candidate| {
            hex::decode(candidate)
                .map(|provided| mac.clone().verify_slice(&provided).is_ok())
                .unwrap_or(false)
        });
        if !matched {
            anyhow::bail!("invalid webhook signature");
        }

        let event: StripeEvent = serde_json::from_slice(payload)?;
        Ok(event)
    }
}
