//! # Stripe Gateway
//!
//! Stripe implementation of the `PaymentGateway` trait over the
//! form-encoded Stripe REST API: Checkout Sessions, Coupons, and Tax Rates.
//! All three operations return an object whose `id` is the only field the
//! checkout flow keeps.

use crate::config::StripeConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use store_core::{
    CouponSpec, GatewaySession, PaymentGateway, SessionRequest, StoreError, StoreResult,
    TaxRateSpec,
};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Stripe payment gateway over the hosted Checkout Sessions flow
pub struct StripeGateway {
    config: StripeConfig,
    client: Client,
}

impl StripeGateway {
    /// Create a new Stripe gateway
    pub fn new(config: StripeConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> StoreResult<Self> {
        let config = StripeConfig::from_env()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// Bracket-style form params for the session request
    fn session_form_params(request: &SessionRequest) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
        ];

        for (i, item) in request.line_items.iter().enumerate() {
            params.push((
                format!("line_items[{}][price_data][currency]", i),
                item.currency.as_str().to_string(),
            ));
            params.push((
                format!("line_items[{}][price_data][unit_amount]", i),
                item.unit_amount.to_string(),
            ));
            params.push((
                format!("line_items[{}][price_data][product_data][name]", i),
                item.name.clone(),
            ));
            if let Some(ref desc) = item.description {
                params.push((
                    format!("line_items[{}][price_data][product_data][description]", i),
                    desc.clone(),
                ));
            }
            params.push((
                format!("line_items[{}][quantity]", i),
                item.quantity.to_string(),
            ));
            for (j, rate) in item.tax_rate_ids.iter().enumerate() {
                params.push((format!("line_items[{}][tax_rates][{}]", i, j), rate.clone()));
            }
        }

        params
    }

    /// POST a form-encoded request to the Stripe API and return the
    /// response body, mapping non-2xx responses to provider errors.
    async fn post_form(&self, path: &str, params: &[(String, String)]) -> StoreResult<String> {
        let url = format!("{}{}", self.config.api_base_url, path);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .form(&params)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(StoreError::Provider {
                    provider: "stripe".to_string(),
                    message: error_response.error.message,
                });
            }

            return Err(StoreError::Provider {
                provider: "stripe".to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self, request), fields(items = request.line_items.len()))]
    async fn create_checkout_session(
        &self,
        request: &SessionRequest,
    ) -> StoreResult<GatewaySession> {
        if request.line_items.is_empty() {
            return Err(StoreError::InvalidRequest(
                "Checkout request has no line items".to_string(),
            ));
        }

        debug!("Creating Stripe checkout session");

        let params = Self::session_form_params(request);
        let body = self.post_form("/v1/checkout/sessions", &params).await?;

        let session: StripeSessionResponse = serde_json::from_str(&body).map_err(|e| {
            StoreError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        info!(
            "Created Stripe checkout session: id={}, url={}",
            session.id, session.url
        );

        Ok(GatewaySession {
            session_id: session.id,
            checkout_url: session.url,
            expires_at: session
                .expires_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            created_at: Utc::now(),
        })
    }

    #[instrument(skip(self))]
    async fn create_coupon(&self, spec: &CouponSpec) -> StoreResult<String> {
        let mut params: Vec<(String, String)> =
            vec![("duration".to_string(), "once".to_string())];

        match spec {
            CouponSpec::AmountOff { amount, currency } => {
                params.push(("amount_off".to_string(), amount.to_string()));
                params.push(("currency".to_string(), currency.as_str().to_string()));
            }
            CouponSpec::PercentOff { percent } => {
                params.push(("percent_off".to_string(), percent.to_string()));
            }
        }

        let body = self.post_form("/v1/coupons", &params).await?;
        let coupon: StripeObjectResponse = serde_json::from_str(&body).map_err(|e| {
            StoreError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        info!("Created Stripe coupon: id={}", coupon.id);
        Ok(coupon.id)
    }

    #[instrument(skip(self))]
    async fn create_tax_rate(&self, spec: &TaxRateSpec) -> StoreResult<String> {
        let params: Vec<(String, String)> = vec![
            ("display_name".to_string(), spec.display_name.clone()),
            ("percentage".to_string(), spec.percentage.to_string()),
            ("inclusive".to_string(), spec.inclusive.to_string()),
        ];

        let body = self.post_form("/v1/tax_rates", &params).await?;
        let tax_rate: StripeObjectResponse = serde_json::from_str(&body).map_err(|e| {
            StoreError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        info!("Created Stripe tax rate: id={}", tax_rate.id);
        Ok(tax_rate.id)
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeSessionResponse {
    id: String,
    url: String,
    #[serde(default)]
    expires_at: Option<i64>,
}

/// Coupon and tax-rate responses: only the id is consumed
#[derive(Debug, Deserialize)]
struct StripeObjectResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use store_core::{Currency, SessionLineItem};
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway_for(server: &MockServer) -> StripeGateway {
        let config = StripeConfig::new("sk_test_abc123", "pk_test_xyz789")
            .with_api_base_url(server.uri());
        StripeGateway::new(config)
    }

    fn mug_request() -> SessionRequest {
        SessionRequest {
            line_items: vec![SessionLineItem {
                name: "Mug".into(),
                description: Some("A ceramic mug".into()),
                currency: Currency::USD,
                unit_amount: 1000,
                quantity: 1,
                tax_rate_ids: vec![],
            }],
            success_url: "https://shop.test/success?session_id={CHECKOUT_SESSION_ID}".into(),
            cancel_url: "https://shop.test/item/1".into(),
        }
    }

    #[test]
    fn test_session_form_params() {
        let mut request = mug_request();
        request.line_items[0].tax_rate_ids = vec!["txr_1".into()];
        let params = StripeGateway::session_form_params(&request);

        let find = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(find("mode"), Some("payment"));
        assert_eq!(find("payment_method_types[0]"), Some("card"));
        assert_eq!(find("line_items[0][price_data][currency]"), Some("usd"));
        assert_eq!(find("line_items[0][price_data][unit_amount]"), Some("1000"));
        assert_eq!(
            find("line_items[0][price_data][product_data][name]"),
            Some("Mug")
        );
        assert_eq!(find("line_items[0][quantity]"), Some("1"));
        assert_eq!(find("line_items[0][tax_rates][0]"), Some("txr_1"));
    }

    #[tokio::test]
    async fn test_create_checkout_session() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("Authorization", "Bearer sk_test_abc123"))
            .and(body_string_contains("mode=payment"))
            .and(body_string_contains("unit_amount%5D=1000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_a1b2c3",
                "url": "https://checkout.stripe.com/c/pay/cs_test_a1b2c3"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = gateway_for(&server)
            .create_checkout_session(&mug_request())
            .await
            .unwrap();

        assert_eq!(session.session_id, "cs_test_a1b2c3");
        assert_eq!(
            session.checkout_url,
            "https://checkout.stripe.com/c/pay/cs_test_a1b2c3"
        );
        assert_eq!(session.expires_at, None);
    }

    #[tokio::test]
    async fn test_session_error_surfaces_stripe_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "Invalid currency: xyz" }
            })))
            .mount(&server)
            .await;

        let err = gateway_for(&server)
            .create_checkout_session(&mug_request())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::Provider { ref message, .. } if message == "Invalid currency: xyz"
        ));
    }

    #[tokio::test]
    async fn test_empty_request_rejected_locally() {
        let server = MockServer::start().await;
        let mut request = mug_request();
        request.line_items.clear();

        let err = gateway_for(&server)
            .create_checkout_session(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_create_percent_coupon() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/coupons"))
            .and(body_string_contains("duration=once"))
            .and(body_string_contains("percent_off=10"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": "coup_pct10" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let id = gateway_for(&server)
            .create_coupon(&CouponSpec::PercentOff { percent: 10 })
            .await
            .unwrap();
        assert_eq!(id, "coup_pct10");
    }

    #[tokio::test]
    async fn test_create_amount_coupon() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/coupons"))
            .and(body_string_contains("amount_off=5"))
            .and(body_string_contains("currency=eur"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": "coup_flat5" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let id = gateway_for(&server)
            .create_coupon(&CouponSpec::AmountOff {
                amount: 5,
                currency: Currency::EUR,
            })
            .await
            .unwrap();
        assert_eq!(id, "coup_flat5");
    }

    #[tokio::test]
    async fn test_create_tax_rate() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/tax_rates"))
            .and(body_string_contains("display_name=VAT"))
            .and(body_string_contains("percentage=20"))
            .and(body_string_contains("inclusive=true"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": "txr_vat20" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let id = gateway_for(&server)
            .create_tax_rate(&TaxRateSpec {
                display_name: "VAT".into(),
                percentage: 20,
                inclusive: true,
            })
            .await
            .unwrap();
        assert_eq!(id, "txr_vat20");
    }
}
