//! HTTP API server for integration with other systems.
//!
//! Exposes search, URL resolution and the conversion job tracker as REST
//! endpoints.

use crate::cli::Output;
use crate::config::Settings;
use crate::conversion::{ConversionJob, JobId};
use crate::orchestrator::Orchestrator;
use crate::resolver::{validate_query, validate_url};
use crate::video::VideoRecord;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings).await?;

    let resumed = orchestrator.tracker().resume_pending();
    if resumed > 0 {
        info!("Resumed {} unfinished conversions", resumed);
    }

    let app = router(Arc::new(AppState { orchestrator }));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Tunegrab API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Search", "POST   /search");
    Output::kv("Resolve URL", "POST   /resolve");
    Output::kv("Start conversion", "POST   /conversions");
    Output::kv("History", "GET    /conversions");
    Output::kv("Active job", "GET    /conversions/active");
    Output::kv("Get job", "GET    /conversions/{id}");
    Output::kv("Clear history", "DELETE /conversions");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/search", post(search))
        .route("/resolve", post(resolve))
        .route(
            "/conversions",
            post(start_conversion).get(list_conversions).delete(clear_conversions),
        )
        .route("/conversions/active", get(active_conversion))
        .route("/conversions/{id}", get(get_conversion))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
}

#[derive(Serialize)]
struct SearchResponse {
    videos: Vec<VideoView>,
}

/// A video plus whether a conversion for it is running.
#[derive(Serialize)]
struct VideoView {
    #[serde(flatten)]
    video: VideoRecord,
    processing: bool,
}

#[derive(Deserialize)]
struct ResolveRequest {
    url: String,
}

/// A video to convert. The thumbnail is derived, so it is not accepted.
#[derive(Deserialize)]
struct ConversionRequest {
    id: String,
    title: String,
    channel: String,
    duration: String,
    url: String,
}

#[derive(Serialize)]
struct ConversionListResponse {
    total: usize,
    jobs: Vec<ConversionJob>,
}

#[derive(Serialize)]
struct ActiveResponse {
    job: Option<ConversionJob>,
}

#[derive(Serialize)]
struct ClearResponse {
    removed: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

impl AppState {
    fn view(&self, video: VideoRecord) -> VideoView {
        let processing = self.orchestrator.tracker().is_processing(&video.id);
        VideoView { video, processing }
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> impl IntoResponse {
    let query = match validate_query(&req.query) {
        Ok(q) => q,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let videos = state.orchestrator.resolver().resolve_by_query(query).await;

    Json(SearchResponse {
        videos: videos.into_iter().map(|v| state.view(v)).collect(),
    })
    .into_response()
}

async fn resolve(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResolveRequest>,
) -> impl IntoResponse {
    let url = match validate_url(&req.url) {
        Ok(u) => u,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match state.orchestrator.resolver().resolve_by_url(url).await {
        Some(video) => Json(state.view(video)).into_response(),
        None => error_response(
            StatusCode::BAD_GATEWAY,
            "Could not load the details for this video.",
        ),
    }
}

async fn start_conversion(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConversionRequest>,
) -> impl IntoResponse {
    let video = VideoRecord::new(req.id, req.title, req.channel, req.duration, req.url);
    if !video.is_complete() {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Missing video fields: {}", video.missing_fields().join(", ")),
        );
    }

    let tracker = state.orchestrator.tracker();
    let id = tracker.start_conversion(video).await;

    match tracker.require_job(&id) {
        Ok(job) => (StatusCode::CREATED, Json(job)).into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, e.to_string()),
    }
}

async fn list_conversions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let jobs = state.orchestrator.tracker().list_jobs();
    Json(ConversionListResponse {
        total: jobs.len(),
        jobs,
    })
}

async fn active_conversion(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ActiveResponse {
        job: state.orchestrator.tracker().active_job(),
    })
}

async fn get_conversion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.orchestrator.tracker().require_job(&JobId::from(id)) {
        Ok(job) => Json(job).into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, e.to_string()),
    }
}

async fn clear_conversions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let removed = state.orchestrator.tracker().clear_history().await;
    Json(ClearResponse { removed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::{JobStatus, SimulatedDriver};
    use crate::inference::testing::FakeInference;
    use crate::inference::InferenceClient;
    use crate::session_store::MemorySessionStore;
    use axum::body::to_bytes;
    use axum::response::Response;
    use std::time::Duration;

    async fn state_with(inference: FakeInference) -> Arc<AppState> {
        let inference: Arc<dyn InferenceClient> = Arc::new(inference);
        let orchestrator = Orchestrator::with_components(
            Settings::default(),
            inference,
            Arc::new(MemorySessionStore::new()),
            Arc::new(SimulatedDriver::new(Duration::from_millis(1), 15.0)),
        )
        .await
        .unwrap();
        Arc::new(AppState { orchestrator })
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn conversion_request(id: &str) -> ConversionRequest {
        ConversionRequest {
            id: id.to_string(),
            title: "Song".to_string(),
            channel: "Artist".to_string(),
            duration: "3:45".to_string(),
            url: format!("https://www.youtube.com/watch?v={}", id),
        }
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let state = state_with(FakeInference::failing()).await;
        let response = search(
            State(state),
            Json(SearchRequest {
                query: "  ".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_failure_is_empty_list() {
        let state = state_with(FakeInference::failing()).await;
        let response = search(
            State(state),
            Json(SearchRequest {
                query: "lofi".to_string(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["videos"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_search_returns_videos() {
        let payload = r#"{"videos": [
            {"id": "a1", "title": "A", "channel": "C", "duration": "1:00", "url": "https://youtu.be/a1"}
        ]}"#;
        let state = state_with(FakeInference::with_list(payload)).await;
        let response = search(
            State(state),
            Json(SearchRequest {
                query: "lofi".to_string(),
            }),
        )
        .await
        .into_response();

        let body = body_json(response).await;
        assert_eq!(body["videos"][0]["id"], "a1");
        assert_eq!(
            body["videos"][0]["thumbnail"],
            "https://picsum.photos/seed/a1/320/180"
        );
        assert_eq!(body["videos"][0]["processing"], false);
    }

    #[tokio::test]
    async fn test_resolve_validates_and_reports_failure() {
        let state = state_with(FakeInference::failing()).await;

        let bad = resolve(
            State(state.clone()),
            Json(ResolveRequest {
                url: "https://vimeo.com/1".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(bad).await["error"],
            "Please enter a valid YouTube URL."
        );

        let failed = resolve(
            State(state),
            Json(ResolveRequest {
                url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(failed.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_start_and_follow_conversion() {
        let state = state_with(FakeInference::failing()).await;

        let response = start_conversion(State(state.clone()), Json(conversion_request("v1")))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["status"], "processing");
        assert_eq!(body["video"]["id"], "v1");

        let id = JobId::from(body["id"].as_str().unwrap());
        let tracker = state.orchestrator.tracker();
        let done = tokio::time::timeout(Duration::from_secs(10), tracker.wait_for_terminal(&id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(done.status, JobStatus::Completed);

        let fetched = get_conversion(State(state.clone()), Path(id.to_string()))
            .await
            .into_response();
        assert_eq!(body_json(fetched).await["progress"], 100.0);

        let active = body_json(active_conversion(State(state.clone())).await.into_response()).await;
        assert!(active["job"].is_null());

        let cleared = body_json(clear_conversions(State(state)).await.into_response()).await;
        assert_eq!(cleared["removed"], 1);
    }

    #[tokio::test]
    async fn test_start_conversion_rejects_incomplete_video() {
        let state = state_with(FakeInference::failing()).await;
        let mut request = conversion_request("v1");
        request.title = " ".to_string();

        let response = start_conversion(State(state), Json(request)).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_job_is_404() {
        let state = state_with(FakeInference::failing()).await;
        let response = get_conversion(State(state), Path("nope-1".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await["error"],
            "Conversion job not found: nope-1"
        );
    }
}
