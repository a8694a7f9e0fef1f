use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use koinonia::error::AppError;
use koinonia::handlers::shared::ApiResponse;

async fn rendered(error: AppError) -> (StatusCode, Value) {
    let response = error.error_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body()).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[actix_web::test]
async fn test_ai_denials_speak_the_code_contract() {
    let (status, body) = rendered(AppError::PremiumRequired).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        json!({
            "error": "premium_required",
            "message": "AI assistant is available on the premium plan",
        })
    );

    let (status, body) = rendered(AppError::LimitReached).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], json!("limit_reached"));

    let (status, body) = rendered(AppError::UpstreamRateLimited).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], json!("rate_limit"));

    let (status, body) = rendered(AppError::UpstreamPaymentRequired).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error"], json!("payment_required"));
}

#[actix_web::test]
async fn test_other_errors_use_the_standard_envelope() {
    let (status, body) = rendered(AppError::NotFound("Invitation not found".to_string())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({
            "success": false,
            "data": null,
            "message": "Not found: Invitation not found",
        })
    );

    let (status, body) = rendered(AppError::Unauthorized).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Unauthorized access"));
}

#[actix_web::test]
async fn test_success_envelopes() {
    let response = ApiResponse::success(json!({ "ok": true }));
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value =
        serde_json::from_slice(&to_bytes(response.into_body()).await.unwrap()).unwrap();
    assert_eq!(
        body,
        json!({ "success": true, "data": { "ok": true }, "message": null })
    );

    let response = ApiResponse::created(json!({ "id": 1 }));
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ApiResponse::<()>::success_with_message(None, "Invitation revoked");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value =
        serde_json::from_slice(&to_bytes(response.into_body()).await.unwrap()).unwrap();
    assert_eq!(
        body,
        json!({ "success": true, "data": null, "message": "Invitation revoked" })
    );
}
