//! HTTP routes: the kiosk's view-model and actions as JSON endpoints.
//!
//! `GET /state` is what the page renders from, `POST /connect` and
//! `POST /mint` are its two buttons, and `GET /notices` drains the dialog
//! queue the way the page would poll for popups.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::{get, post}, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::KioskError;
use crate::notify::MemoryNotifier;
use crate::session::MintSession;

#[derive(Clone)]
pub struct KioskState {
    pub session: Arc<MintSession>,
    pub notices: Arc<MemoryNotifier>,
}

pub fn create_router(session: Arc<MintSession>, notices: Arc<MemoryNotifier>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/state", get(state))
        .route("/count", get(count))
        .route("/notices", get(drain_notices))
        .route("/connect", post(connect))
        .route("/mint", post(mint))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(KioskState { session, notices })
}

fn http_status(err: &KioskError) -> StatusCode {
    match err {
        KioskError::ProviderAbsent => StatusCode::SERVICE_UNAVAILABLE,
        KioskError::Rpc(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

async fn health(State(s): State<KioskState>) -> impl IntoResponse {
    Json(json!({"status": "ok", "service": "mintkiosk", "collection": s.session.config().collection_name.clone()}))
}

async fn state(State(s): State<KioskState>) -> Json<Value> {
    let config = s.session.config();
    Json(json!({
        "collection": {
            "name": config.collection_name.clone(),
            "tagline": config.tagline.clone(),
            "contract": config.contract_address,
            "chain": config.expected_chain,
        },
        "view": s.session.view(),
    }))
}

async fn count(State(s): State<KioskState>) -> Result<Json<Value>, (StatusCode, String)> {
    match s.session.refresh_count().await {
        Ok(minted) => Ok(Json(json!({"minted": minted, "cap": s.session.config().supply_cap}))),
        Err(e) => Err((http_status(&e), e.to_string())),
    }
}

async fn drain_notices(State(s): State<KioskState>) -> Json<Value> {
    let notices = s.notices.drain();
    Json(json!({"count": notices.len(), "notices": notices}))
}

async fn connect(State(s): State<KioskState>) -> Result<Json<Value>, (StatusCode, String)> {
    match s.session.connect().await {
        Ok(view) => Ok(Json(json!({"view": view}))),
        Err(e) => Err((http_status(&e), e.to_string())),
    }
}

async fn mint(State(s): State<KioskState>) -> Result<Json<Value>, (StatusCode, String)> {
    match s.session.mint().await {
        Ok(view) => Ok(Json(json!({"view": view}))),
        Err(e) => Err((http_status(&e), e.to_string())),
    }
}
