//! HTTP surface of the dashboard.

use crate::dispatch::dispatch;
use crate::filter::{DashboardOptions, FilterState};
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use fpd_chart::{page, ChartSpec};
use fpd_db::Database;
use log::{error, info};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared, read-only state of every request handler.
pub struct AppState {
    pub db: Database,
    pub options: DashboardOptions,
}

impl AppState {
    pub fn new(db: Database) -> anyhow::Result<Self> {
        let options = DashboardOptions::from_db(&db)?;
        Ok(AppState { db, options })
    }
}

/// Body of `POST /api/update`.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub previous: Option<FilterState>,
    pub current: FilterState,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/options", get(options))
        .route("/api/update", post(update))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, db: Database) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(db)?);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Dashboard listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

pub async fn index() -> Html<String> {
    Html(page::render_index())
}

pub async fn options(State(state): State<Arc<AppState>>) -> Json<DashboardOptions> {
    Json(state.options.clone())
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<BTreeMap<&'static str, ChartSpec>>, (StatusCode, String)> {
    // SQLite work runs off the async workers.
    let specs = tokio::task::spawn_blocking(move || {
        dispatch(&state.db, request.previous.as_ref(), &request.current)
    })
    .await
    .map_err(|e| {
        error!("update task failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(specs))
}

pub async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::sample_db;
    use fpd_chart::spec::ChartKind;

    fn app_state() -> Arc<AppState> {
        Arc::new(AppState::new(sample_db()).unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn index_serves_page() {
        let Html(body) = index().await;
        assert!(body.contains("<!DOCTYPE html>"));
        assert!(body.contains("id=\"comparison\""));
    }

    #[tokio::test]
    async fn options_lists_sample_values() {
        let Json(options) = options(State(app_state())).await;
        assert_eq!(options.states.len(), 3);
        assert_eq!(options.year_min, 2019);
        assert_eq!(options.year_max, 2021);
    }

    #[tokio::test]
    async fn first_update_returns_every_widget() {
        let state = app_state();
        let request = UpdateRequest {
            previous: None,
            current: state.options.default_state.clone(),
        };
        let Json(specs) = update(State(state), Json(request)).await.unwrap();
        assert_eq!(specs.len(), 7);
        assert_eq!(specs["kpi_b"].kind, ChartKind::Indicator);
    }

    #[tokio::test]
    async fn theme_toggle_returns_every_widget_restyled() {
        let state = app_state();
        let previous = state.options.default_state.clone();
        let mut current = previous.clone();
        current.theme = fpd_chart::Theme::Dark;
        let request = UpdateRequest {
            previous: Some(previous),
            current,
        };
        let Json(specs) = update(State(state), Json(request)).await.unwrap();
        assert_eq!(specs.len(), 7);
        assert!(specs.values().all(|spec| spec.template == "cyborg"));
    }

    #[tokio::test]
    async fn update_request_from_json() {
        let state = app_state();
        let body = serde_json::json!({
            "previous": null,
            "current": state.options.default_state,
        });
        let request: UpdateRequest = serde_json::from_value(body).unwrap();
        let Json(specs) = update(State(state), Json(request)).await.unwrap();
        let json = serde_json::to_value(&specs).unwrap();
        assert_eq!(json["region_means"]["kind"], "horizontal_bar");
        assert_eq!(json["kpi_a"]["indicator"]["prefix"], "R$");
    }
}
