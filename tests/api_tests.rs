use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use gateway_adapter::api::build_router;
use gateway_adapter::config::Config;
use gateway_adapter::dispatch::NotificationDispatcher;
use gateway_adapter::handlers::{HandlerRegistry, default_handlers};
use gateway_adapter::wire::NOTIFICATION_NS;

/// Test: A valid batch posts back the accepted token as XML
#[tokio::test]
async fn test_post_valid_batch_returns_accepted_token() {
    let response = app(test_config())
        .oneshot(post_notification(&valid_envelope()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();
    assert!(content_type.starts_with("text/xml"));

    let body = body_string(response).await;
    assert!(body.contains("<ns1:notificationResponse>[accepted]</ns1:notificationResponse>"));
}

/// Test: Garbage still gets HTTP 200, with the error token in the body
#[tokio::test]
async fn test_post_garbage_returns_error_token() {
    let response = app(test_config())
        .oneshot(post_notification("definitely not an envelope"))
        .await
        .unwrap();

    assert_eq!(
        response.status(),
        StatusCode::OK,
        "The token is the contract, not the HTTP status"
    );

    let body = body_string(response).await;
    assert!(body.contains("<ns1:notificationResponse>error</ns1:notificationResponse>"));
}

/// Test: Health reports healthy when a default merchant account resolves
#[tokio::test]
async fn test_health_healthy_with_default_merchant_account() {
    let response = app(test_config())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let health: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["checks"]["configuration"]["status"], "healthy");
}

/// Test: Health degrades when only country-keyed merchant accounts exist
#[tokio::test]
async fn test_health_degraded_without_default_merchant_account() {
    let config = Config {
        merchant_account: Some("UK#MerchantUK".to_string()),
        ..test_config()
    };

    let response = app(config)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let health: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["checks"]["configuration"]["status"], "degraded");
}

fn test_config() -> Config {
    Config {
        merchant_account: Some("UK#MerchantUK|MerchantGlobal".to_string()),
        username: Some("MerchantUK#uk-user|shared-user".to_string()),
        password: Some("shared-password".to_string()),
        skin: Some("shared-skin".to_string()),
        hmac_secret: Some("shared-secret".to_string()),
        hmac_algorithm: None,
        server_port: 0,
    }
}

fn app(config: Config) -> Router {
    let dispatcher = NotificationDispatcher::new(HandlerRegistry::new(default_handlers()));
    build_router(dispatcher, config.account_resolver())
}

fn post_notification(body: &str) -> Request<Body> {
    Request::post("/notifications")
        .header(header::CONTENT_TYPE, "text/xml; charset=utf-8")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn valid_envelope() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
<soap:Body>
<ns1:sendNotification xmlns:ns1="{NOTIFICATION_NS}">
<ns1:notificationItems>
<ns1:NotificationRequestItem>
<ns1:eventCode>AUTHORISATION</ns1:eventCode>
<ns1:pspReference>psp-1</ns1:pspReference>
<ns1:success>true</ns1:success>
<ns1:merchantReference>order-1</ns1:merchantReference>
<ns1:merchantAccountCode>MerchantUK</ns1:merchantAccountCode>
</ns1:NotificationRequestItem>
</ns1:notificationItems>
</ns1:sendNotification>
</soap:Body>
</soap:Envelope>"#
    )
}
