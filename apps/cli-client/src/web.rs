use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use client_sdk::{DashboardError, LookedUp, ReplicationDashboard};
use common::EntityType;
use console_core::format::{pretty_number, representation_number};
use console_core::{EntitySummary, Notification, render_html};
use serde::Deserialize;

pub fn router(dashboard: ReplicationDashboard) -> Router {
    Router::new()
        .route("/", get(|| async { Html(web_ui::app_html()) }))
        .route("/api/replication/summary", get(web_summary))
        .route("/api/replication/lookup", get(web_lookup))
        .route("/api/replication/sites", get(web_sites))
        .route(
            "/api/ping",
            get(|| async {
                Json(serde_json::json!({
                    "ok": true,
                    "service": "console-web"
                }))
            }),
        )
        .with_state(dashboard)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebLookupQuery {
    entity_type: String,
    #[serde(default)]
    entity_value: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

fn upstream_error(notification: &Notification) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({
            "error": notification.message,
            "detailed": notification.detailed,
        })),
    )
        .into_response()
}

fn dashboard_error(err: DashboardError) -> Response {
    match err {
        DashboardError::Invalid(err) => error_response(StatusCode::BAD_REQUEST, err.to_string()),
        DashboardError::Upstream(notification) => upstream_error(&notification),
    }
}

fn summary_json(summary: &[EntitySummary]) -> serde_json::Value {
    let cards = summary
        .iter()
        .map(|card| {
            serde_json::json!({
                "entity": card.entity,
                "label": card.label,
                "synced": card.synced,
                "failed": card.failed,
                "syncedText": pretty_number(Some(card.synced)),
                "syncedShort": representation_number(Some(card.synced)),
            })
        })
        .collect::<Vec<_>>();
    serde_json::json!({ "summary": cards })
}

async fn web_summary(State(dashboard): State<ReplicationDashboard>) -> impl IntoResponse {
    match dashboard.refresh().await {
        Ok(refreshed) => (StatusCode::OK, Json(summary_json(&refreshed.summary))).into_response(),
        Err(err) => dashboard_error(err),
    }
}

async fn web_lookup(
    State(dashboard): State<ReplicationDashboard>,
    Query(query): Query<WebLookupQuery>,
) -> impl IntoResponse {
    let entity = match query.entity_type.parse::<EntityType>() {
        Ok(entity) => entity,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, err.to_string()),
    };

    let LookedUp {
        lookup, outcome, ..
    } = match dashboard.lookup(entity, &query.entity_value).await {
        Ok(looked_up) => looked_up,
        Err(err) => return dashboard_error(err),
    };

    let table = outcome.matrix().map(render_html);
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "entityType": lookup.entity,
            "entityValue": lookup.value,
            "found": table.is_some(),
            "message": outcome.not_found_message(),
            "table": table,
            "rows": outcome.matrix().map(|matrix| matrix.rows()),
        })),
    )
        .into_response()
}

async fn web_sites(State(dashboard): State<ReplicationDashboard>) -> impl IntoResponse {
    match dashboard.client().site_replication_info().await {
        Ok(info) => (StatusCode::OK, Json(info)).into_response(),
        Err(err) => upstream_error(&err.notification()),
    }
}
