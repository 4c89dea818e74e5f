//! HTTP front end: `POST /process_image` with a multipart `file` field.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::pipeline::{PlateService, ProcessConfig};

/// Caller-visible failure codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NoFile = 1001,
    NoSelectedFile = 1002,
    NoPlateDetected = 1003,
    ProcessingError = 1004,
}

impl ErrorCode {
    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::NoFile => "No file part in the request",
            ErrorCode::NoSelectedFile => "No selected file",
            ErrorCode::NoPlateDetected => "No license plate detected or text recognized",
            ErrorCode::ProcessingError => "Error processing image",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ProcessingError => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    error_code: u16,
}

impl IntoResponse for ErrorCode {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message(),
            error_code: self.code(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct TextResponse {
    pub text: String,
}

/// State shared across routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PlateService>,
    pub config: ProcessConfig,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/process_image", post(process_image))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn start_server(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = router(state);

    info!("License plate HTTP server listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Handler for `POST /process_image`
async fn process_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TextResponse>, ErrorCode> {
    info!("Received image processing request");

    let (file_name, bytes) = read_file_field(multipart).await?;
    info!(file = %file_name, "Processing file");

    let image = image::load_from_memory(&bytes).map_err(|e| {
        error!("Failed to decode uploaded image: {}", e);
        ErrorCode::ProcessingError
    })?;

    let service = state.service.clone();
    let config = state.config.clone();
    let outcome = tokio::task::spawn_blocking(move || service.handle(&image, &config))
        .await
        .map_err(|e| {
            error!("Plate processing task failed: {}", e);
            ErrorCode::ProcessingError
        })?
        .map_err(|e| {
            error!("Error processing image: {:#}", anyhow::Error::from(e));
            ErrorCode::ProcessingError
        })?;

    match outcome.into_parts() {
        (Some(_), Some(text)) => {
            info!(text = %text, "Successfully processed license plate");
            Ok(Json(TextResponse { text }))
        }
        _ => {
            warn!("No license plate detected or text recognized");
            Err(ErrorCode::NoPlateDetected)
        }
    }
}

/// Pull the `file` field out of the form as `(file name, contents)`
async fn read_file_field(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(String, Vec<u8>), ErrorCode> {
    let mut multipart = multipart.map_err(|e| {
        warn!("Request is not a multipart upload: {}", e);
        ErrorCode::NoFile
    })?;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Malformed multipart body: {}", e);
                return Err(ErrorCode::NoFile);
            }
        };

        if field.name() != Some("file") {
            continue;
        }
        // A field without a file name is a plain form value, not an upload
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if file_name.is_empty() {
            warn!("No selected file");
            return Err(ErrorCode::NoSelectedFile);
        }

        let bytes = field.bytes().await.map_err(|e| {
            error!("Failed to read uploaded file: {}", e);
            ErrorCode::ProcessingError
        })?;
        return Ok((file_name, bytes.to_vec()));
    }

    warn!("No file part in the request");
    Err(ErrorCode::NoFile)
}
