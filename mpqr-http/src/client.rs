//! A [`mpqr::dispatch::Dispatcher`] that sends requests to the MercadoPago API over HTTP.
//!
//! ## Features
//!
//! - Uses `reqwest` for async HTTP requests
//! - Bearer authentication from [`Credentials::access_token`]
//! - Supports optional timeout and extra headers
//! - Integrates with `tracing` if the `telemetry` feature is enabled
//!
//! ## Error Handling
//!
//! Every failure is returned as a [`DispatchError`] and never retried:
//! transport failures, non-2xx responses (with their body) and malformed
//! JSON responses.

use http::HeaderMap;
use mpqr::Credentials;
use mpqr::dispatch::{BoxFuture, Dispatcher, Method};
use reqwest::Client;
use serde_json::Value;
use std::fmt::Display;
use std::time::Duration;

#[cfg(feature = "telemetry")]
use tracing::{Span, instrument};

use crate::constants::{API_BASE_URL, DEFAULT_TIMEOUT};
use crate::error::DispatchError;

/// Sends JSON requests to the MercadoPago API.
///
/// Each request goes to `{base_url}{path}` with an
/// `Authorization: Bearer {access_token}` header and a JSON body.
#[derive(Clone, Debug)]
pub struct HttpDispatcher {
    /// Base URL without trailing slash (e.g. `https://api.mercadopago.com`)
    base_url: String,
    /// Shared Reqwest HTTP client
    client: Client,
    /// Extra headers sent with each request
    headers: HeaderMap,
    /// Optional request timeout
    timeout: Option<Duration>,
}

impl Default for HttpDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpDispatcher {
    /// Creates a dispatcher for the production API with the default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(API_BASE_URL)
    }

    /// Creates a dispatcher for a custom base URL (a proxy or a mock server).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            base_url,
            client: Client::new(),
            headers: HeaderMap::new(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Returns the base URL used by this dispatcher.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns any extra headers configured on the dispatcher.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Attaches extra headers to all future requests.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets a timeout for all future requests.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Removes the per-request timeout, leaving it to the HTTP client.
    #[must_use]
    pub const fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Uses a pre-configured reqwest client.
    #[must_use]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Sends one request and decodes the JSON response.
    ///
    /// A 2xx response with an empty body decodes to [`Value::Null`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the request fails, the status is not 2xx,
    /// or the body is not JSON.
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "mpqr.http.send",
            skip_all,
            fields(
                method = %method,
                path = %path,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    pub async fn request_json(
        &self,
        method: Method,
        path: &str,
        body: &Value,
        credentials: &Credentials,
    ) -> Result<Value, DispatchError> {
        let context = format!("{method} {path}");
        let mut req = self
            .client
            .request(http_method(method), format!("{}{path}", self.base_url))
            .bearer_auth(&credentials.access_token);
        if !body.is_null() {
            req = req.json(body);
        }
        for (key, value) in &self.headers {
            req = req.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        let result = match req.send().await {
            Ok(http_response) => {
                let status = http_response.status();
                match http_response.text().await {
                    Ok(text) if status.is_success() => decode_body(&text)
                        .map_err(|source| DispatchError::Decode { context, source }),
                    Ok(body) => Err(DispatchError::HttpStatus {
                        context,
                        status,
                        body,
                    }),
                    Err(source) => Err(DispatchError::ResponseBodyRead { context, source }),
                }
            }
            Err(source) => Err(DispatchError::Http { context, source }),
        };

        record_result_on_span(&result);

        result
    }
}

impl Dispatcher for HttpDispatcher {
    type Error = DispatchError;

    fn send<'a>(
        &'a self,
        method: Method,
        path: &'a str,
        body: &'a Value,
        credentials: &'a Credentials,
    ) -> BoxFuture<'a, Result<Value, DispatchError>> {
        Box::pin(self.request_json(method, path, body, credentials))
    }
}

fn http_method(method: Method) -> http::Method {
    match method {
        Method::Get => http::Method::GET,
        Method::Post => http::Method::POST,
        Method::Put => http::Method::PUT,
        Method::Delete => http::Method::DELETE,
    }
}

fn decode_body(text: &str) -> Result<Value, serde_json::Error> {
    if text.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str(text)
    }
}

/// Records the outcome of a request on the current span, including status and errors.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: Display>(result: &Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::ERROR, error = %err, "Request to MercadoPago failed");
        }
    }
}

/// Records the outcome of a request on the current span, including status and errors.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R, E: Display>(_result: &Result<R, E>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderName, HeaderValue, StatusCode};
    use mpqr::{LineItem, NodeError, OrderConfig, QrOrderNode};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const QR_PATH: &str = "/instore/orders/qr/seller/collectors/U1/pos/P1/qrs";

    fn credentials() -> Credentials {
        Credentials::new("APP_USR-token", "U1").with_external_pos_id("P1")
    }

    #[test]
    fn test_defaults_target_production_api() {
        let dispatcher = HttpDispatcher::new();
        assert_eq!(dispatcher.base_url(), "https://api.mercadopago.com");
        assert_eq!(dispatcher.timeout(), Some(Duration::from_secs(30)));
        assert!(dispatcher.headers().is_empty());

        let dispatcher = HttpDispatcher::with_base_url("http://localhost:9000/");
        assert_eq!(dispatcher.base_url(), "http://localhost:9000");
        assert_eq!(dispatcher.without_timeout().timeout(), None);
    }

    #[tokio::test]
    async fn test_posts_json_with_bearer_token() {
        let mock_server = MockServer::start().await;
        let body = json!({ "title": "Orden" });

        Mock::given(method("POST"))
            .and(path(QR_PATH))
            .and(header("authorization", "Bearer APP_USR-token"))
            .and(header("content-type", "application/json"))
            .and(body_json(&body))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({ "qr_data": "00020101" })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let dispatcher = HttpDispatcher::with_base_url(mock_server.uri());
        let response = dispatcher
            .send(Method::Post, QR_PATH, &body, &credentials())
            .await
            .unwrap();

        assert_eq!(response, json!({ "qr_data": "00020101" }));
    }

    #[tokio::test]
    async fn test_non_success_status_keeps_response_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(QR_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "invalid access token",
                "error": "unauthorized",
                "status": 401
            })))
            .mount(&mock_server)
            .await;

        let dispatcher = HttpDispatcher::with_base_url(mock_server.uri());
        let err = dispatcher
            .send(Method::Post, QR_PATH, &json!({}), &credentials())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(
            err.response_json().unwrap()["message"],
            json!("invalid access token")
        );
        assert!(err.to_string().contains(QR_PATH));
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(QR_PATH))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let dispatcher = HttpDispatcher::with_base_url(format!("{}/", mock_server.uri()));
        let response = dispatcher
            .send(Method::Post, QR_PATH, &json!({}), &credentials())
            .await
            .unwrap();

        assert_eq!(response, Value::Null);
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_decode_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(QR_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&mock_server)
            .await;

        let dispatcher = HttpDispatcher::with_base_url(mock_server.uri());
        let err = dispatcher
            .send(Method::Post, QR_PATH, &json!({}), &credentials())
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_connection_failure_is_an_http_error() {
        let dispatcher = HttpDispatcher::with_base_url("http://127.0.0.1:1")
            .with_timeout(Duration::from_secs(2));
        let err = dispatcher
            .send(Method::Post, QR_PATH, &json!({}), &credentials())
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Http { .. }));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_extra_headers_are_sent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(QR_PATH))
            .and(header("x-idempotency-key", "order-17"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-idempotency-key"),
            HeaderValue::from_static("order-17"),
        );
        let dispatcher = HttpDispatcher::with_base_url(mock_server.uri()).with_headers(headers);

        dispatcher
            .send(Method::Post, QR_PATH, &json!({}), &credentials())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_node_creates_order_end_to_end() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(QR_PATH))
            .and(header("authorization", "Bearer APP_USR-token"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "in_store_order_id": "d4e8ca59-3e1d-4c03-b1f6-580e87c654ae",
                "qr_data": "00020101021243650016COM.MERCADOLIBRE"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let node = QrOrderNode::new(HttpDispatcher::with_base_url(mock_server.uri()));
        let config = OrderConfig::new("Orden de compra", "Pago")
            .with_item(LineItem::new("Item A", 10.0).with_quantity(3));

        let records = node.execute(&config, &credentials()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0]["in_store_order_id"],
            json!("d4e8ca59-3e1d-4c03-b1f6-580e87c654ae")
        );

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let sent: Value = requests[0].body_json().unwrap();
        assert_eq!(sent["total_amount"].as_f64(), Some(30.0));
        assert_eq!(sent["items"][0]["total_amount"].as_f64(), Some(30.0));
        assert_eq!(sent["items"][0]["unit_measure"], json!("unit"));
        assert!(!sent["external_reference"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_node_surfaces_api_rejection_unchanged() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(QR_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "message": "pos not found",
                "status": 400
            })))
            .mount(&mock_server)
            .await;

        let node = QrOrderNode::new(HttpDispatcher::with_base_url(mock_server.uri()));
        let config = OrderConfig::default().with_item(LineItem::new("a", 1.0));

        let err = node.execute(&config, &credentials()).await.unwrap_err();

        let transport = match err {
            NodeError::Transport(transport) => transport,
            other => panic!("expected a transport error, got {other:?}"),
        };
        assert_eq!(transport.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(
            transport.response_json().unwrap()["message"],
            json!("pos not found")
        );
    }

    #[tokio::test]
    async fn test_node_does_not_call_api_for_empty_items() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&mock_server)
            .await;

        let node = QrOrderNode::new(HttpDispatcher::with_base_url(mock_server.uri()));
        let err = node
            .execute(&OrderConfig::default(), &credentials())
            .await
            .unwrap_err();

        assert!(matches!(err, NodeError::Validation(_)));
    }
}
