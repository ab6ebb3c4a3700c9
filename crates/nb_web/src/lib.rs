use axum::{
    routing::{any, get},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/gemini", any(handlers::relay))
        .route("/api/health", get(handlers::health))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, addr: SocketAddr) -> nb_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🛰️ Relay listening on {}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use nb_core::{Error, Result};
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{self, Body},
        http::{Method, Request, StatusCode},
        routing::post,
        Json,
    };
    use nb_inference::models::UpstreamConfig;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn fake_provider(status: StatusCode, body: Value) -> String {
        let app = Router::new().route(
            "/v1beta/models/:model",
            post(move || {
                let body = body.clone();
                async move { (status, Json(body)) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1beta", addr)
    }

    fn keyed_state(base_url: &str) -> AppState {
        let mut config = UpstreamConfig::new("test-key".to_string());
        config.base_url = base_url.to_string();
        AppState::new(Some(config)).unwrap()
    }

    fn prompt_body() -> Body {
        Body::from(r#"{"messages":[{"role":"user","parts":[{"text":"hi"}]}]}"#)
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_options_is_empty_ok() {
        let app = create_app(AppState::new(None).unwrap());
        let response = app
            .oneshot(Request::builder().method(Method::OPTIONS).uri("/api/gemini").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_get_is_not_allowed() {
        let app = create_app(AppState::new(None).unwrap());
        let response = app
            .oneshot(Request::get("/api/gemini").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json_body(response).await["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let app = create_app(AppState::new(None).unwrap());
        let response = app
            .oneshot(Request::post("/api/gemini").body(prompt_body()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("API key not found"));
    }

    #[tokio::test]
    async fn test_missing_messages_is_bad_request() {
        let app = create_app(keyed_state("http://127.0.0.1:9/v1beta"));
        let response = app
            .oneshot(Request::post("/api/gemini").body(Body::from(r#"{"tools":[]}"#)).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_forwards_provider_response() {
        let upstream = json!({ "candidates": [{ "content": { "parts": [{ "text": "{}" }] } }] });
        let base = fake_provider(StatusCode::OK, upstream.clone()).await;
        let app = create_app(keyed_state(&base));
        let response = app
            .oneshot(Request::post("/api/gemini").body(prompt_body()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, upstream);
    }

    #[tokio::test]
    async fn test_provider_error_keeps_status() {
        let upstream = json!({ "error": { "code": 429, "message": "Resource exhausted" } });
        let base = fake_provider(StatusCode::TOO_MANY_REQUESTS, upstream).await;
        let app = create_app(keyed_state(&base));
        let response = app
            .oneshot(Request::post("/api/gemini").body(prompt_body()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Resource exhausted");
        assert_eq!(body["status"], 429);
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_app(AppState::new(None).unwrap());
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
