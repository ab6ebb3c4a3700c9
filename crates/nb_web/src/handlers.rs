use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use nb_core::RelayRequest;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use crate::AppState;

fn error_body(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

/// Forwards a prompt to the provider, keeping the API key on the server.
pub async fn relay(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    if method != Method::POST {
        return error_body(StatusCode::METHOD_NOT_ALLOWED, json!({ "error": "Method not allowed" }));
    }

    let Some(upstream) = state.upstream.as_ref() else {
        error!("Provider API key is not set");
        return error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({
                "error": "Server configuration error: API key not found",
                "details": "Set GEMINI_API_KEY in the server environment",
            }),
        );
    };

    let request: RelayRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected relay request: {}", e);
            return error_body(
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid request: messages array is required" }),
            );
        }
    };

    info!("📨 Calling provider with model {}", upstream.model());
    match upstream.forward(&request).await {
        Ok((status, data)) if (200..300).contains(&status) => {
            info!("✨ Provider response received");
            (StatusCode::OK, Json(data)).into_response()
        }
        Ok((status, details)) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            let message = details
                .pointer("/error/message")
                .or_else(|| details.get("error"))
                .and_then(Value::as_str)
                .unwrap_or("Provider request failed")
                .to_string();
            warn!("Provider returned {}: {}", status, message);
            error_body(
                status,
                json!({ "error": message, "status": status.as_u16(), "details": details }),
            )
        }
        Err(e) => {
            error!("Relay failure: {}", e);
            error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error", "message": e.to_string() }),
            )
        }
    }
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
