use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{health, receipt, receipt_image};
use crate::models::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/test", get(health::api_info))
        .route(
            "/api/receipt",
            get(receipt::receipt_json).post(receipt::receipt_json),
        )
        .route(
            "/api/receipt/html",
            get(receipt::receipt_html).post(receipt::receipt_html),
        )
        .route(
            "/api/receipt/image",
            get(receipt::receipt_image).post(receipt::receipt_image),
        )
        .route(
            "/api/receipt/screenshot",
            get(receipt::receipt_screenshot).post(receipt::receipt_screenshot),
        )
        .route(
            "/api/receipt-image",
            get(receipt_image::receipt_image_url).post(receipt_image::receipt_image_url),
        )
        .route(
            "/api/receipt-image/{filename}",
            get(receipt_image::get_receipt_image),
        )
        .route(
            "/api/receipt-generated",
            post(receipt_image::receipt_generated),
        )
        .layer(axum::extract::DefaultBodyLimit::max(5 * 1024 * 1024))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, RecipientAccountDisplay};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use serde_json::{json, Value};

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn test_config() -> AppConfig {
        AppConfig {
            public_base_url: Some("http://receipts.test".to_string()),
            ..AppConfig::default()
        }
    }

    fn server_with(config: AppConfig) -> TestServer {
        TestServer::new(create_router(AppState::new(config))).unwrap()
    }

    fn server() -> TestServer {
        server_with(test_config())
    }

    const VALID: [(&str, &str); 6] = [
        ("senderName", "John Doe"),
        ("senderAccountNumber", "9123456789"),
        ("recipientName", "Jane Smith"),
        ("recipientBank", "Access Bank"),
        ("recipientAccount", "9876543210"),
        ("amount", "5000"),
    ];

    fn with_params(mut request: axum_test::TestRequest, params: &[(&str, &str)]) -> axum_test::TestRequest {
        for (key, value) in params {
            request = request.add_query_param(key, value);
        }
        request
    }

    #[tokio::test]
    async fn test_health() {
        let response = server().get("/health").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
        assert!(body["uptime"].is_number());
    }

    #[tokio::test]
    async fn test_image_endpoint_returns_png() {
        let server = server();
        let response = with_params(server.get("/api/receipt/image"), &VALID).await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "image/png");
        let body = response.as_bytes();
        assert!(!body.is_empty());
        assert!(body.starts_with(PNG_SIGNATURE));
    }

    #[tokio::test]
    async fn test_missing_amount_is_reported() {
        let server = server();
        let response = with_params(server.get("/api/receipt/image"), &VALID[..5]).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["missing"], json!(["amount"]));
        assert!(body["message"].as_str().unwrap().contains("amount"));
    }

    #[tokio::test]
    async fn test_invalid_inputs_are_client_errors() {
        let server = server();

        let mut params = VALID;
        params[5] = ("amount", "abc");
        let response = with_params(server.get("/api/receipt/html"), &params).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "Invalid amount");

        let mut params = VALID;
        params[1] = ("senderAccountNumber", "12345");
        let response = with_params(server.get("/api/receipt/html"), &params).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "Invalid account number");
    }

    #[tokio::test]
    async fn test_post_json_body() {
        let response = server()
            .post("/api/receipt")
            .json(&json!({
                "senderName": "John Doe",
                "senderAccount": "9123456789",
                "recipientName": "Jane Smith",
                "recipientBank": "Access Bank",
                "recipientAccountNumber": "9876543210",
                "amount": "1234567.5",
                "status": "pending",
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["receiptData"]["amountFormatted"], "1,234,567.50");
        assert_eq!(body["data"]["receiptData"]["senderAccountMasked"], "912****789");
        assert_eq!(body["data"]["receiptData"]["status"], "Pending");
        assert!(body["data"]["receiptHtml"].as_str().unwrap().contains("JANE SMITH"));
    }

    #[tokio::test]
    async fn test_html_endpoint() {
        let server = server();
        let response = with_params(server.get("/api/receipt/html"), &VALID).await;

        response.assert_status_ok();
        assert!(response
            .header("content-type")
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        let text = response.text();
        assert!(text.contains("5,000.00"));
        assert!(text.contains("JOHN DOE"));
    }

    #[tokio::test]
    async fn test_masked_recipient_policy() {
        let config = AppConfig {
            recipient_account_display: RecipientAccountDisplay::Masked,
            ..test_config()
        };
        let server = server_with(config);
        let response = with_params(server.get("/api/receipt"), &VALID).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["receiptData"]["recipientAccount"], "987****210");
    }

    #[tokio::test]
    async fn test_image_url_roundtrip() {
        let server = server();
        let response = with_params(server.get("/api/receipt-image"), &VALID).await;
        response.assert_status_ok();

        let body: Value = response.json();
        let image_url = body["data"]["imageUrl"].as_str().unwrap().to_string();
        let path = image_url.strip_prefix("http://receipts.test").unwrap();
        assert!(path.starts_with("/api/receipt-image/receipt_"));

        let image = server.get(path).await;
        image.assert_status_ok();
        assert_eq!(image.header("content-type"), "image/png");
        assert!(image.as_bytes().starts_with(PNG_SIGNATURE));

        server
            .get("/api/receipt-image/receipt_missing.png")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unsafe_transaction_id_is_rejected() {
        let server = server();
        for (endpoint, id) in [
            ("/api/receipt-image", "AB/CD"),
            ("/api/receipt-image", "AB CD#1"),
            ("/api/receipt/image", "AB\nCD"),
        ] {
            let mut params = VALID.to_vec();
            params.push(("transactionId", id));
            let response = with_params(server.get(endpoint), &params).await;

            response.assert_status(StatusCode::BAD_REQUEST);
            let body: Value = response.json();
            assert_eq!(body["error"], "Invalid transaction id", "id {:?}", id);
        }
    }

    #[tokio::test]
    async fn test_image_url_for_custom_transaction_id_resolves() {
        let server = server();
        let mut params = VALID.to_vec();
        params.push(("transactionId", "INV-2026_0042"));
        let response = with_params(server.get("/api/receipt-image"), &params).await;
        response.assert_status_ok();

        let body: Value = response.json();
        let image_url = body["data"]["imageUrl"].as_str().unwrap();
        let path = image_url.strip_prefix("http://receipts.test").unwrap();
        assert!(path.starts_with("/api/receipt-image/receipt_INV-2026_0042_"));

        let image = server.get(path).await;
        image.assert_status_ok();
        assert_eq!(
            image.header("content-disposition"),
            "inline; filename=\"".to_string() + path.rsplit('/').next().unwrap() + "\""
        );
    }

    #[tokio::test]
    async fn test_post_form_body() {
        let form: Vec<(&str, &str)> = VALID.to_vec();
        let response = server().post("/api/receipt/image").form(&form).await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "image/png");
        assert!(response.as_bytes().starts_with(PNG_SIGNATURE));
    }

    #[tokio::test]
    async fn test_malformed_requests_get_json_errors() {
        let server = server();

        let bad_json = server
            .post("/api/receipt")
            .bytes(axum::body::Bytes::from_static(b"{bad"))
            .content_type("application/json")
            .await;
        bad_json.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = bad_json.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid request");

        let mut params = VALID.to_vec();
        params.push(("senderAccount", "9123456789"));
        let duplicate = with_params(server.get("/api/receipt"), &params).await;
        duplicate.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(duplicate.json::<Value>()["error"], "Invalid request");

        let bad_upload = server
            .post("/api/receipt-generated")
            .json(&json!({ "receiptId": "1" }))
            .await;
        bad_upload.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(bad_upload.json::<Value>()["error"], "Invalid request");
    }

    #[tokio::test]
    async fn test_oversized_field_is_rejected() {
        let server = server();
        let bank = "Bank ".repeat(100);
        let mut params = VALID.to_vec();
        params[3] = ("recipientBank", bank.as_str());
        let response = with_params(server.get("/api/receipt/image"), &params).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "Field too long");
    }

    #[tokio::test]
    async fn test_client_generated_image_is_served() {
        let server = server();
        let mut params = VALID.to_vec();
        params.push(("transactionId", "55500011122233344455"));
        let response = with_params(server.get("/api/receipt"), &params).await;
        response.assert_status_ok();

        let body: Value = response.json();
        let data = &body["data"];
        let token = data["uploadToken"].as_str().unwrap().to_string();
        assert!(data["receiptHtml"].as_str().unwrap().contains(&token));
        let image_url = data["imageUrl"].as_str().unwrap();
        let path = image_url.strip_prefix("http://receipts.test").unwrap().to_string();

        let uploaded = b"\x89PNG\r\n\x1a\nclient-side".to_vec();
        let upload = |token: &str| {
            json!({
                "receiptId": "55500011122233344455",
                "uploadToken": token,
                "imageData": format!("data:image/png;base64,{}", BASE64.encode(&uploaded)),
            })
        };

        server
            .post("/api/receipt-generated")
            .json(&upload("not-the-token"))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server
            .post("/api/receipt-generated")
            .json(&upload(&token))
            .await
            .assert_status_ok();

        let image = server.get(&path).await;
        image.assert_status_ok();
        assert_eq!(image.as_bytes().to_vec(), uploaded);

        // A second upload cannot replace the first
        server
            .post("/api/receipt-generated")
            .json(&upload(&token))
            .await
            .assert_status(StatusCode::CONFLICT);

        server
            .post("/api/receipt-generated")
            .json(&json!({
                "receiptId": "unknown",
                "uploadToken": token,
                "imageData": BASE64.encode(&uploaded),
            }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_image_url_flow_accepts_no_uploads() {
        let server = server();
        let mut params = VALID.to_vec();
        params.push(("transactionId", "77700011122233344455"));
        let response = with_params(server.get("/api/receipt-image"), &params).await;
        response.assert_status_ok();
        assert!(response.json::<Value>()["data"]["uploadToken"].is_null());

        server
            .post("/api/receipt-generated")
            .json(&json!({
                "receiptId": "77700011122233344455",
                "uploadToken": "",
                "imageData": BASE64.encode(b"\x89PNG\r\n\x1a\nforged"),
            }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_screenshot_without_keys_is_bad_gateway() {
        let server = server();
        let response = with_params(server.get("/api/receipt/screenshot"), &VALID).await;
        response.assert_status(StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_render_rate_limit() {
        let config = AppConfig {
            render_rate_limit: 1,
            ..test_config()
        };
        let state = AppState::new(config);
        state.render_limiter.acquire().unwrap();
        let server = TestServer::new(create_router(state)).unwrap();

        let limited = with_params(server.get("/api/receipt/image"), &VALID).await;
        limited.assert_status(StatusCode::TOO_MANY_REQUESTS);
        assert!(limited.maybe_header("retry-after").is_some());

        let screenshot = with_params(server.get("/api/receipt/screenshot"), &VALID).await;
        screenshot.assert_status(StatusCode::TOO_MANY_REQUESTS);
    }
}
