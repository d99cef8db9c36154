//! Course Tree Search - search server rendering course items as an indented hierarchy.

mod config;
mod render;
mod search;
mod tree;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Json},
    routing::get,
    Router,
};
use config::AppConfig;
use render::SearchOutcome;
use search::course_search::CourseSearchClient;
use search::{CourseSource, SearchError};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tree::DisplayRecord;

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    source: Arc<dyn CourseSource>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "course_tree_search=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let client = CourseSearchClient::from_config(&config)?;

    let state = AppState {
        source: Arc::new(client),
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Server listening on http://{}", config.bind_addr);
    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(search_page))
        .route("/health", get(health))
        .route("/api/search", get(search_api))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(serde::Deserialize)]
struct SearchQuery {
    query: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct SearchResponse {
    items: Vec<DisplayRecord>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// HTML search page. Results are shown once a non-blank query has been submitted.
async fn search_page(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Html<String> {
    let query = params.query.unwrap_or_default();
    if query.trim().is_empty() {
        return Html(render::render_page(&query, SearchOutcome::NotSearched));
    }

    match search::spawn_search(state.source.clone(), query.clone()).await {
        Ok(items) => Html(render::render_page(&query, SearchOutcome::Found(&items))),
        Err(e) => {
            error!("Search failed: {}", e);
            let message = e.to_string();
            Html(render::render_page(&query, SearchOutcome::Failed(&message)))
        }
    }
}

/// JSON search endpoint returning rows in display order.
async fn search_api(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let query = params.query.unwrap_or_default();

    let items = search::spawn_search(state.source.clone(), query)
        .await
        .map_err(|e| {
            error!("Search failed: {}", e);
            let status = match e {
                SearchError::Network(_) => StatusCode::BAD_GATEWAY,
                SearchError::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(ErrorResponse { error: e.to_string() }))
        })?;

    Ok(Json(SearchResponse { items }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::tests::FakeSource;
    use crate::tree::Record;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn state_with(source: FakeSource) -> (AppState, Arc<FakeSource>) {
        let source = Arc::new(source);
        (
            AppState {
                source: source.clone(),
            },
            source,
        )
    }

    async fn get(state: AppState, uri: &str) -> (StatusCode, String) {
        let response = app(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn lab_records() -> Vec<Record> {
        vec![
            Record {
                id: 3,
                name: "Surface Chemistry".to_string(),
                parent_id: 1,
            },
            Record {
                id: 1,
                name: "Lab Experiment 1".to_string(),
                parent_id: 0,
            },
        ]
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _) = state_with(FakeSource::returning(Vec::new()));
        assert_eq!(get(state, "/health").await, (StatusCode::OK, "ok".to_string()));
    }

    #[tokio::test]
    async fn test_api_search_returns_display_order() {
        let (state, source) = state_with(FakeSource::returning(lab_records()));

        let (status, body) = get(state, "/api/search?query=%20Lab%20").await;

        assert_eq!(status, StatusCode::OK);
        let response: SearchResponse = serde_json::from_str(&body).unwrap();
        let rows: Vec<(i64, usize)> = response.items.iter().map(|r| (r.id, r.depth)).collect();
        assert_eq!(rows, vec![(1, 0), (3, 1)]);
        assert_eq!(source.calls(), vec!["Lab".to_string()]);
    }

    #[tokio::test]
    async fn test_api_blank_query_is_empty() {
        let (state, source) = state_with(FakeSource::returning(lab_records()));

        let (status, body) = get(state, "/api/search?query=%20%20").await;

        assert_eq!(status, StatusCode::OK);
        let response: SearchResponse = serde_json::from_str(&body).unwrap();
        assert!(response.items.is_empty());
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_api_network_error() {
        let (state, _) = state_with(FakeSource::failing(SearchError::Network(
            "API request failed with status 500".to_string(),
        )));

        let (status, body) = get(state, "/api/search?query=Lab").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let response: ErrorResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(
            response.error,
            "Network error: API request failed with status 500. Please try again."
        );
    }

    #[tokio::test]
    async fn test_api_unexpected_error() {
        let (state, _) = state_with(FakeSource::failing(SearchError::Unexpected));

        let (status, _) = get(state, "/api/search?query=Lab").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_page_without_query_shows_form_only() {
        let (state, source) = state_with(FakeSource::returning(lab_records()));

        let (status, body) = get(state, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<form"));
        assert!(!body.contains("course-tree"));
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_page_renders_tree() {
        let (state, _) = state_with(FakeSource::returning(lab_records()));

        let (_, body) = get(state, "/?query=Lab").await;

        assert!(body.contains(">Lab Experiment 1</div>"));
        assert!(body.contains(">- Surface Chemistry</div>"));
    }

    #[tokio::test]
    async fn test_page_empty_results() {
        let (state, _) = state_with(FakeSource::returning(Vec::new()));

        let (_, body) = get(state, "/?query=nothing").await;
        assert!(body.contains(render::EMPTY_MESSAGE));
    }

    #[tokio::test]
    async fn test_page_shows_error_banner() {
        let (state, _) = state_with(FakeSource::failing(SearchError::Network(
            "connection refused".to_string(),
        )));

        let (_, body) = get(state, "/?query=Lab").await;

        assert!(body.contains("role=\"alert\""));
        assert!(body.contains("Network error: connection refused. Please try again."));
        assert!(!body.contains(render::EMPTY_MESSAGE));
    }
}
