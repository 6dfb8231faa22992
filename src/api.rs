//! HTTP API server for the WhatsApp pairing flow.
//!
//! Serves the QR code as a PNG so pairing works on headless deployments where
//! nobody is watching the terminal. Spawned as a background task at startup.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use secretaria_channels::whatsapp::{generate_qr_image, WhatsAppChannel};
use secretaria_core::config::ApiConfig;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

/// Shared state for API handlers.
#[derive(Clone)]
struct ApiState {
    whatsapp: Arc<WhatsAppChannel>,
}

/// `GET /api/health` — liveness plus WhatsApp connection status.
async fn health(State(state): State<ApiState>) -> Json<Value> {
    let whatsapp_status = if state.whatsapp.is_connected().await {
        "connected"
    } else {
        "disconnected"
    };
    Json(json!({
        "status": "ok",
        "whatsapp": whatsapp_status,
    }))
}

/// `GET /whatsapp/qrcode` — the current pairing QR as a PNG.
///
/// 404 while no pairing is in progress (already connected, or the QR has not
/// arrived yet).
async fn qrcode(State(state): State<ApiState>) -> impl IntoResponse {
    let Some(code) = state.whatsapp.pending_qr().await else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "no pairing QR available"})),
        )
            .into_response();
    };

    match generate_qr_image(&code) {
        Ok(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Err(e) => {
            error!("QR image generation failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "QR generation failed"})),
            )
                .into_response()
        }
    }
}

fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/whatsapp/qrcode", get(qrcode))
        .with_state(state)
}

/// Start the API server. Runs until the process exits.
pub async fn serve(config: ApiConfig, whatsapp: Arc<WhatsAppChannel>) {
    let app = build_router(ApiState { whatsapp });
    let addr = format!("{}:{}", config.host, config.port);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("API server failed to bind to {addr}: {e}");
            return;
        }
    };

    info!("API server listening on {addr}");
    info!("QrCode: {}:{}/whatsapp/qrcode", config.base_url, config.port);

    if let Err(e) = axum::serve(listener, app).await {
        error!("API server error: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use secretaria_core::config::WhatsAppConfig;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let whatsapp = Arc::new(WhatsAppChannel::new(
            WhatsAppConfig::default(),
            "/tmp/secretaria-api-test",
        ));
        build_router(ApiState { whatsapp })
    }

    async fn body_json(resp: axum::http::Response<Body>) -> Value {
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_disconnected_before_pairing() {
        let app = test_router();
        let req = Request::get("/api/health").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["whatsapp"], "disconnected");
    }

    #[tokio::test]
    async fn test_qrcode_404_when_no_pairing_in_progress() {
        let app = test_router();
        let req = Request::get("/whatsapp/qrcode").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("no pairing QR"));
    }

    #[tokio::test]
    async fn test_qrcode_rejects_post() {
        let app = test_router();
        let req = Request::post("/whatsapp/qrcode")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
