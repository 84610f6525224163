use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};

use tracing::{debug, info, warn};

use crate::image::ImageRecord;
use crate::pipeline::{OutfitPipeline, PipelineError};

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use super::{log_requests, state::*, ServerConfig};

/// Multipart field carrying the photo.
const IMAGE_FIELD: &str = "image";

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: &'static str,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Serialize)]
struct ErrorBody {
    stage: &'static str,
    error: String,
}

/// Failures of the upload route, mapped to a status and a `{stage, error}` body.
enum ApiError {
    /// The client sent something that is not a usable photo.
    Upload { status: StatusCode, message: String },
    /// An upstream stage (model or catalog auth) failed.
    Pipeline(PipelineError),
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Upload {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Image(e) => ApiError::Upload {
                status: StatusCode::BAD_REQUEST,
                message: e.to_string(),
            },
            other => ApiError::Pipeline(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Upload { status, message } => (
                status,
                Json(ErrorBody {
                    stage: "upload",
                    error: message,
                }),
            )
                .into_response(),
            ApiError::Pipeline(err) => (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    stage: err.stage(),
                    error: err.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION"),
    };
    Json(stats)
}

/// Pulls the first non-empty `image` field out of the upload.
async fn read_image(multipart: &mut Multipart) -> Result<ImageRecord, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            debug!(field = ?field.name(), "Ignoring multipart field");
            continue;
        }
        let bytes = field.bytes().await?;
        return ImageRecord::from_bytes(bytes.to_vec())
            .map_err(|e| ApiError::from(PipelineError::Image(e)));
    }

    Err(ApiError::Upload {
        status: StatusCode::BAD_REQUEST,
        message: format!("Missing '{}' field", IMAGE_FIELD),
    })
}

async fn recommend(
    State(pipeline): State<GuardedPipeline>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let image = read_image(&mut multipart).await?;
    debug!(bytes = image.len(), mime = image.mime_type(), "Received upload");

    match pipeline.recommend(&image).await {
        Ok(recommendation) => Ok(Json(recommendation)),
        Err(e) => {
            warn!(stage = e.stage(), error = %e, "Recommendation failed");
            Err(e.into())
        }
    }
}

pub fn make_app(config: ServerConfig, pipeline: Arc<OutfitPipeline>) -> Router {
    let state = ServerState::new(config.clone(), pipeline);

    let api_routes: Router = Router::new()
        .route("/recommend", post(recommend))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(state.clone());

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    home_router
        .nest("/v1", api_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(config: ServerConfig, pipeline: Arc<OutfitPipeline>) -> Result<()> {
    let port = config.port;
    let app = make_app(config, pipeline);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    info!("Listening on {}", listener.local_addr()?);
    Ok(axum::serve(listener, app).await?)
}
