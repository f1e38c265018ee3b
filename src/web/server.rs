use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::Path;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info};

use super::{api, AppState};
use crate::types::UniverseOptions;

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate<'a> {
    universe: &'a UniverseOptions,
    strategies: Vec<api::StrategyInfo>,
    pick_modes: Vec<api::PickModeInfo>,
    results_placeholder: &'a str,
}

pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Dashboard page
        .route("/", get(serve_dashboard))
        .nest_service("/static", ServeDir::new(static_dir))
        // Catalog endpoints
        .route("/api/health", get(api::health_check))
        .route("/api/universe", get(api::get_universe))
        .route("/api/strategies", get(api::get_strategies))
        .route("/api/pick-modes", get(api::get_pick_modes))
        // Session endpoints
        .route("/api/sessions", post(api::post_session))
        .route("/api/sessions/:id", get(api::get_session).delete(api::delete_session))
        .route("/api/sessions/:id/events", post(api::post_event))
        .route("/api/sessions/:id/run", post(api::post_run))
        // WebSocket
        .route("/ws/:id", get(api::websocket_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_dashboard_server(state: AppState, host: &str, port: u16, static_dir: &Path) -> anyhow::Result<()> {
    let app = build_router(state, static_dir);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Dashboard server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_dashboard(State(state): State<AppState>) -> Response {
    let page = DashboardTemplate {
        universe: state.universe.as_ref(),
        strategies: api::strategy_catalog(),
        pick_modes: api::pick_mode_options(),
        results_placeholder: api::RESULTS_NOT_COMPUTED,
    };

    match page.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render dashboard: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render dashboard").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{EventBus, SessionStore};
    use crate::types::UniverseRow;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let universe = UniverseOptions::from_rows(&[
            UniverseRow::new("AAA", "", None),
            UniverseRow::new("BBB", "US", Some("Tech")),
            UniverseRow::new("CCC", "DE", Some("Energy")),
        ]);
        AppState::new(universe, SessionStore::new(EventBus::default(), Duration::from_secs(60)))
    }

    fn router(state: AppState) -> Router {
        build_router(state, Path::new("static"))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn new_session(app: &Router) -> String {
        let (status, body) = call(app, Method::POST, "/api/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_dashboard_page_renders_options() {
        let app = router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Backtesting Strategies"));
        assert!(html.contains("Results Not computed"));
        assert!(html.contains(r#"value="BBB""#));
        assert!(html.contains("MaximumDiversificationStrategy"));
        assert!(html.contains("Select Defaults"));
    }

    #[tokio::test]
    async fn test_universe_endpoint() {
        let app = router(test_state());
        let (status, body) = call(&app, Method::GET, "/api/universe", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({
            "symbols": ["AAA", "BBB", "CCC"],
            "countries": ["US", "DE"],
            "sectors": ["Tech", "Energy"],
        }));
    }

    #[tokio::test]
    async fn test_strategies_endpoint() {
        let app = router(test_state());
        let (_, body) = call(&app, Method::GET, "/api/strategies", None).await;
        let names: Vec<&str> = body.as_array().unwrap().iter().map(|s| s["name"].as_str().unwrap()).collect();
        assert_eq!(names.len(), 5);
        assert_eq!(names[0], "DrawdownControlStrategy");
    }

    #[tokio::test]
    async fn test_sector_mode_flow() {
        let app = router(test_state());
        let id = new_session(&app).await;
        let events = format!("/api/sessions/{}/events", id);

        call(&app, Method::POST, &events, Some(json!({"type": "symbols_selected", "values": ["AAA"]}))).await;
        let (status, body) = call(&app, Method::POST, &events, Some(json!({"type": "pick_mode_changed", "value": 2}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["enablement"], json!({
            "symbols_disabled": true,
            "sectors_disabled": false,
            "countries_disabled": true,
        }));

        call(&app, Method::POST, &events, Some(json!({"type": "sectors_selected", "values": ["Tech", "Energy"]}))).await;
        call(&app, Method::POST, &events, Some(json!({"type": "strategy_selected", "strategy": "MinimumVarianceStrategy"}))).await;

        let (status, body) = call(&app, Method::POST, &format!("/api/sessions/{}/run", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "not_computed");
        assert_eq!(body["message"], "Results Not computed");
        assert_eq!(body["request"]["universe"], json!({"kind": "sectors", "values": ["Tech", "Energy"]}));
        assert_eq!(body["request"]["strategy"], "MinimumVarianceStrategy");
    }

    #[tokio::test]
    async fn test_run_without_picker_is_rejected() {
        let app = router(test_state());
        let id = new_session(&app).await;

        let (status, body) = call(&app, Method::POST, &format!("/api/sessions/{}/run", id), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("pick tickers"));
    }

    #[tokio::test]
    async fn test_unknown_strategy_event() {
        let app = router(test_state());
        let id = new_session(&app).await;

        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/api/sessions/{}/events", id),
            Some(json!({"type": "strategy_selected", "strategy": "Nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_session() {
        let app = router(test_state());
        let uri = format!("/api/sessions/{}", uuid::Uuid::new_v4());
        let (status, _) = call(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_session() {
        let app = router(test_state());
        let id = new_session(&app).await;
        let uri = format!("/api/sessions/{}", id);

        let (status, _) = call(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(test_state());
        new_session(&app).await;
        let (status, body) = call(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["sessions"], 1);
        assert_eq!(body["symbols"], 3);
    }
}
