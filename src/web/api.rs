use axum::{
    extract::{ws::{Message, WebSocket}, Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::selection::build_request;
use crate::session::{SessionError, UiEvent};
use crate::types::{PickMode, StrategyName};
use super::AppState;

pub const RESULTS_NOT_COMPUTED: &str = "Results Not computed";

fn session_error(e: SessionError) -> Response {
    let status = match e {
        SessionError::NotFound(_) => StatusCode::NOT_FOUND,
        SessionError::UnknownStrategy(_) => StatusCode::BAD_REQUEST,
    };
    (status, Json(json!({"error": e.to_string()}))).into_response()
}

// === Universe & Catalog Endpoints ===

pub async fn get_universe(
    State(state): State<AppState>,
) -> impl IntoResponse {
    Json(state.universe.as_ref().clone())
}

#[derive(Debug, Serialize)]
pub struct StrategyInfo {
    pub name: &'static str,
    pub description: &'static str,
}

pub fn strategy_catalog() -> Vec<StrategyInfo> {
    StrategyName::ALL
        .iter()
        .map(|s| StrategyInfo {
            name: s.as_str(),
            description: s.description(),
        })
        .collect()
}

pub async fn get_strategies() -> impl IntoResponse {
    Json(strategy_catalog())
}

#[derive(Debug, Serialize)]
pub struct PickModeInfo {
    pub value: i64,
    pub label: &'static str,
}

pub fn pick_mode_options() -> Vec<PickModeInfo> {
    PickMode::ALL
        .iter()
        .map(|m| PickModeInfo {
            value: m.radio_value(),
            label: m.label(),
        })
        .collect()
}

pub async fn get_pick_modes() -> impl IntoResponse {
    Json(pick_mode_options())
}

// === Session Endpoints ===

pub async fn post_session(
    State(state): State<AppState>,
) -> impl IntoResponse {
    let snapshot = state.sessions.create().await;
    (StatusCode::CREATED, Json(snapshot))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.sessions.snapshot(id).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => session_error(e),
    }
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    if state.sessions.remove(id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        session_error(SessionError::NotFound(id))
    }
}

pub async fn post_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(event): Json<UiEvent>,
) -> Response {
    debug!("Session {} event: {}", id, event.kind());
    match state.sessions.dispatch(id, &event).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => session_error(e),
    }
}

// === Run Endpoint ===

/// Validate the session's form and return the request a backtest engine
/// would receive. No engine is attached, so results are never computed.
pub async fn post_run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    let form = match state.sessions.state(id).await {
        Ok(form) => form,
        Err(e) => return session_error(e),
    };

    match build_request(form.pick_mode, &form.selections, form.strategy, &state.universe) {
        Ok(request) => {
            info!("Session {} requested {} backtest", id, request.strategy);
            (StatusCode::OK, Json(json!({
                "status": "not_computed",
                "message": RESULTS_NOT_COMPUTED,
                "request": request,
            }))).into_response()
        }
        Err(e) => {
            warn!("Session {} run rejected: {}", id, e);
            (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"error": e.to_string()}))).into_response()
        }
    }
}

// === WebSocket Handler ===

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    let rx = match state.sessions.subscribe(id).await {
        Ok(rx) => rx,
        Err(e) => return session_error(e),
    };
    ws.on_upgrade(move |socket| handle_websocket(socket, state, id, rx))
}

async fn handle_websocket(
    socket: WebSocket,
    state: AppState,
    id: Uuid,
    mut rx: tokio::sync::broadcast::Receiver<crate::session::SessionSnapshot>,
) {
    let (mut sender, mut receiver) = socket.split();
    let (err_tx, mut err_rx) = mpsc::channel::<String>(8);

    info!("WebSocket client connected to session {}", id);

    if let Ok(snapshot) = state.sessions.snapshot(id).await {
        let initial = json!({"type": "initial", "data": snapshot});
        let _ = sender.send(Message::Text(initial.to_string())).await;
    }

    // Only this session's updates are forwarded.
    let send_task = tokio::spawn(async move {
        loop {
            let payload = tokio::select! {
                Ok(snapshot) = rx.recv() => json!({"type": "update", "data": snapshot}),
                Some(message) = err_rx.recv() => json!({"type": "error", "error": message}),
                else => break,
            };
            if sender.send(Message::Text(payload.to_string())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Err(message) = apply_socket_text(&state, id, &text).await {
                    debug!("Session {} event rejected: {}", id, message);
                    if err_tx.send(message).await.is_err() {
                        break;
                    }
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket client disconnected from session {}", id);
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
}

/// Apply one text frame from a dashboard socket to its session.
///
/// The new snapshot reaches the client through the session channel, so only
/// failures are returned here.
async fn apply_socket_text(state: &AppState, id: Uuid, text: &str) -> Result<(), String> {
    let event = serde_json::from_str::<UiEvent>(text).map_err(|e| format!("invalid event: {}", e))?;
    state
        .sessions
        .dispatch(id, &event)
        .await
        .map(|_| ())
        .map_err(|e| e.to_string())
}

// === Health Check ===

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: i64,
    pub sessions: usize,
    pub symbols: usize,
}

pub async fn health_check(
    State(state): State<AppState>,
) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: (chrono::Utc::now() - state.started_at).num_seconds(),
        sessions: state.sessions.len().await,
        symbols: state.universe.symbols.len(),
    })
}
