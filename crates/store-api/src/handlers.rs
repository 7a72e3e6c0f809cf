//! # Request Handlers
//!
//! Axum request handlers for the storefront: item/order detail pages, the
//! two checkout endpoints, and the post-payment success page.

use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;
use store_core::{CheckoutTarget, Order, RedirectUrls, StoreError};
use tracing::{error, info, instrument};

/// Checkout response: the opaque gateway session id the page redirects with
#[derive(Debug, Serialize)]
pub struct SessionIdResponse {
    pub session_id: String,
}

/// Render a `StoreError` as a plain-text HTTP response.
///
/// Lookup failures keep their message; session rejections carry the gateway
/// message behind the `Stripe error:` prefix; everything else (coupon and
/// tax-rate materialization failures included) is a generic server error.
fn error_response(err: StoreError) -> Response {
    let status = StatusCode::from_u16(err.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = match &err {
        StoreError::CheckoutRejected(message) => format!("Stripe error: {}", message),
        StoreError::ItemNotFound { .. }
        | StoreError::OrderNotFound { .. }
        | StoreError::InvalidRequest(_) => err.to_string(),
        _ => {
            error!("Checkout failed: {}", err);
            "Internal server error".to_string()
        }
    };
    (status, body).into_response()
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "storefront-checkout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Item detail page with a Buy button
#[instrument(skip(state))]
pub async fn item_detail(
    State(state): State<AppState>,
    Path(item_id): Path<u64>,
) -> Response {
    let Some(item) = state.store.item(item_id) else {
        return error_response(StoreError::ItemNotFound { item_id });
    };

    let price = format!(
        "{} {}",
        item.price,
        item.currency.map(|c| c.to_string()).unwrap_or_default()
    );
    let page = detail_page(
        &item.name,
        &item.description,
        &price,
        &format!("/buy/{}", item.id),
        &state.publishable_key,
    );
    Html(page).into_response()
}

/// Create a checkout session for a single item
#[instrument(skip(state))]
pub async fn buy_item(
    State(state): State<AppState>,
    Path(item_id): Path<u64>,
) -> Response {
    let urls = RedirectUrls {
        success_url: state.success_url(),
        cancel_url: state.item_cancel_url(item_id),
    };

    match state.checkout.checkout(CheckoutTarget::Item(item_id), urls).await {
        Ok(session) => {
            info!("Item {} checkout session: {}", item_id, session.session_id);
            Json(SessionIdResponse {
                session_id: session.session_id,
            })
            .into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Order detail page with a Buy button
#[instrument(skip(state))]
pub async fn order_detail(
    State(state): State<AppState>,
    Path(order_id): Path<u64>,
) -> Response {
    let Some(order) = state.store.order(order_id) else {
        return error_response(StoreError::OrderNotFound { order_id });
    };

    let page = detail_page(
        &format!("Order #{}", order.id),
        &order_summary(&state, &order),
        if order.paid { "Paid" } else { "Not Paid" },
        &format!("/buy_order/{}", order.id),
        &state.publishable_key,
    );
    Html(page).into_response()
}

/// Create a checkout session for a whole order
#[instrument(skip(state))]
pub async fn buy_order(
    State(state): State<AppState>,
    Path(order_id): Path<u64>,
) -> Response {
    let urls = RedirectUrls {
        success_url: state.success_url(),
        cancel_url: state.order_cancel_url(order_id),
    };

    match state.checkout.checkout(CheckoutTarget::Order(order_id), urls).await {
        Ok(session) => {
            info!("Order {} checkout session: {}", order_id, session.session_id);
            Json(SessionIdResponse {
                session_id: session.session_id,
            })
            .into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Post-payment success page
pub async fn checkout_success(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let session_id = params.get("session_id").map(|s| s.as_str()).unwrap_or("unknown");
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Payment Successful</title></head>
<body style="font-family: system-ui; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0;">
    <div style="padding: 60px; border-radius: 16px; text-align: center; border: 1px solid #ddd;">
        <h1>Payment Successful</h1>
        <p>Session: <code>{}</code></p>
        <p style="color: #666;">Your payment was processed successfully.</p>
    </div>
</body>
</html>
"#,
        session_id
    ))
}

fn order_summary(state: &AppState, order: &Order) -> String {
    order
        .item_ids
        .iter()
        .map(|&id| match state.store.item(id) {
            Some(item) => format!("{} — {}", item.name, item.price),
            None => format!("unknown item {}", id),
        })
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Shared detail page template: a description block and a Buy button that
/// fetches the session id and hands it to the gateway's JS redirect.
fn detail_page(
    title: &str,
    body: &str,
    subtitle: &str,
    buy_path: &str,
    publishable_key: &str,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{title}</title>
    <script src="https://js.stripe.com/v3/"></script>
</head>
<body style="font-family: system-ui; max-width: 640px; margin: 40px auto;">
    <h1>{title}</h1>
    <p>{body}</p>
    <p><strong>{subtitle}</strong></p>
    <button id="buy">Buy</button>
    <p id="error" style="color: #b00;"></p>
    <script>
        const stripe = Stripe("{publishable_key}");
        document.getElementById("buy").addEventListener("click", async () => {{
            const response = await fetch("{buy_path}");
            if (!response.ok) {{
                document.getElementById("error").textContent = await response.text();
                return;
            }}
            const data = await response.json();
            stripe.redirectToCheckout({{ sessionId: data.session_id }});
        }});
    </script>
</body>
</html>
"#
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::routes::create_router;
    use crate::state::AppConfig;
    use async_trait::async_trait;
    use axum_test::TestServer;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use store_core::{
        CouponSpec, Currency, GatewaySession, Item, PaymentGateway, SessionRequest, Store,
        StoreResult, TaxRateSpec,
    };

    /// Gateway stub: succeeds with a fixed session id, or fails the
    /// session call with a provider error when `fail` is set
    #[derive(Default)]
    pub(crate) struct OkGateway {
        pub fail: AtomicBool,
    }

    #[async_trait]
    impl PaymentGateway for OkGateway {
        async fn create_checkout_session(
            &self,
            _request: &SessionRequest,
        ) -> StoreResult<GatewaySession> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Provider {
                    provider: "stripe".into(),
                    message: "Invalid API Key provided".into(),
                });
            }
            Ok(GatewaySession::new("cs_test_fixed", "https://checkout.test/pay"))
        }

        async fn create_coupon(&self, _spec: &CouponSpec) -> StoreResult<String> {
            Ok("coup_test".into())
        }

        async fn create_tax_rate(&self, _spec: &TaxRateSpec) -> StoreResult<String> {
            Ok("txr_test".into())
        }

        fn provider_name(&self) -> &'static str {
            "stub"
        }
    }

    fn test_config() -> AppConfig {
        AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            base_url: "http://localhost:8080".into(),
            environment: "test".into(),
        }
    }

    fn server_with(store: Store, gateway: Arc<OkGateway>) -> TestServer {
        let state = AppState::with_parts(test_config(), Arc::new(store), gateway, "pk_test_xyz");
        TestServer::new(create_router(state)).expect("test server")
    }

    fn seeded_store() -> Store {
        let store = Store::new();
        store.insert_item(
            Item::new(1, "Mug", 10, Currency::USD).with_description("A ceramic mug"),
        );
        store.insert_order(Order::new(1, vec![1, 1]));
        store
    }

    #[tokio::test]
    async fn test_buy_returns_session_id() {
        let server = server_with(seeded_store(), Arc::new(OkGateway::default()));

        let response = server.get("/buy/1").await;
        response.assert_status_ok();
        response.assert_json(&serde_json::json!({ "session_id": "cs_test_fixed" }));
    }

    #[tokio::test]
    async fn test_buy_order_returns_session_id() {
        let server = server_with(seeded_store(), Arc::new(OkGateway::default()));

        let response = server.get("/buy_order/1").await;
        response.assert_status_ok();
        response.assert_json(&serde_json::json!({ "session_id": "cs_test_fixed" }));
    }

    #[tokio::test]
    async fn test_missing_item_is_404() {
        let server = server_with(seeded_store(), Arc::new(OkGateway::default()));

        let response = server.get("/buy/99").await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server.get("/item/99").await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server.get("/buy_order/99").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_gateway_failure_is_400_with_stripe_error_body() {
        let gateway = Arc::new(OkGateway::default());
        gateway.fail.store(true, Ordering::SeqCst);
        let server = server_with(seeded_store(), gateway);

        let response = server.get("/buy/1").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.text();
        assert!(body.starts_with("Stripe error:"));
        assert!(body.contains("Invalid API Key provided"));
    }

    #[tokio::test]
    async fn test_detail_pages_render() {
        let server = server_with(seeded_store(), Arc::new(OkGateway::default()));

        let response = server.get("/item/1").await;
        response.assert_status_ok();
        let body = response.text();
        assert!(body.contains("Mug"));
        assert!(body.contains("pk_test_xyz"));
        assert!(body.contains("/buy/1"));

        let response = server.get("/order/1").await;
        response.assert_status_ok();
        let body = response.text();
        assert!(body.contains("Order #1"));
        assert!(body.contains("/buy_order/1"));
    }

    #[tokio::test]
    async fn test_success_page_echoes_session() {
        let server = server_with(Store::new(), Arc::new(OkGateway::default()));

        let response = server.get("/success").add_query_param("session_id", "cs_x").await;
        response.assert_status_ok();
        assert!(response.text().contains("cs_x"));
    }

    #[tokio::test]
    async fn test_health() {
        let server = server_with(Store::new(), Arc::new(OkGateway::default()));
        let response = server.get("/health").await;
        response.assert_status_ok();
    }
}
