//! Stripe integration via REST API (no SDK dependency)

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::payments::{CheckoutSession, PaymentError, PaymentProvider};

/// Stripe REST client (Checkout Sessions only)
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: secret_key.into(),
            api_base: api_base.into(),
        }
    }
}

/// Form body for `POST /v1/checkout/sessions` (payment mode)
pub fn checkout_session_form(session: &CheckoutSession) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), session.success_url.clone()),
        ("cancel_url".to_string(), session.cancel_url.clone()),
        ("client_reference_id".to_string(), session.order_id.to_string()),
        ("metadata[orderId]".to_string(), session.order_id.to_string()),
        ("metadata[storeId]".to_string(), session.store_id.to_string()),
        (
            "metadata[tableId]".to_string(),
            session.table_id.map(|t| t.to_string()).unwrap_or_default(),
        ),
    ];
    for (i, line) in session.lines.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((
            format!("{prefix}[price_data][currency]"),
            session.currency.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            line.name.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            line.unit_amount.to_string(),
        ));
        form.push((format!("{prefix}[quantity]"), line.quantity.to_string()));
    }
    form
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_checkout_session(
        &self,
        session: &CheckoutSession,
    ) -> Result<String, PaymentError> {
        let resp = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&checkout_session_form(session))
            .send()
            .await
            .map_err(|e| PaymentError::Unreachable(e.to_string()))?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| PaymentError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        body["url"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| PaymentError::Rejected {
                status: status.as_u16(),
                message: format!("Stripe create_checkout returned no url: {body}"),
            })
    }
}

/// Verify Stripe webhook signature (HMAC-SHA256)
///
/// `now` is unix seconds; events whose timestamp is further than
/// `tolerance_secs` from it are rejected as replays.
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), &'static str> {
    let mut timestamp = "";
    let mut signatures = Vec::new();
    for part in sig_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signatures.push(v);
        }
    }

    if timestamp.is_empty() || signatures.is_empty() {
        return Err("Invalid Stripe-Signature header");
    }

    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    // Stripe sends several v1 entries while a secret is being rolled
    let matched = signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err("Webhook signature mismatch");
    }

    let ts: i64 = timestamp.parse().map_err(|_| "Invalid timestamp")?;
    if (now - ts).abs() > tolerance_secs {
        return Err("Webhook timestamp too old");
    }

    Ok(())
}

#[cfg(test)]
pub(crate) fn sign_for_test(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}
