//! HTTP control surface for the DCC bridge.
//!
//! Serves the application shell, file read/upload/delete, and the stats
//! snapshot. Handlers only ever touch the storage facade and the status
//! reporter; the bridge paths are never blocked by a request, and a failing
//! request never propagates past its own response.
//!
//! Every response carries a permissive `Access-Control-Allow-Origin` header
//! so the dashboard can be served from another origin during development.

use axum::{
    body::Body,
    extract::{FromRequest, Multipart, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use dccbridge_core::{
    status::StatusReporter, storage::Storage, upload::UploadSink, HttpConfig, Result,
    SharedLinkStatus, StorageError, TransportError,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer};
use tracing::{debug, info, warn};

// ----------------------------------------------------------------------------
// Router Construction
// ----------------------------------------------------------------------------

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    storage: Arc<dyn Storage>,
    reporter: StatusReporter,
}

/// Build the HTTP surface.
///
/// `static_root` is the directory backing the static fallback; with
/// filesystem storage it is the storage root, which keeps uploaded assets
/// immediately servable.
pub fn router(
    storage: Arc<dyn Storage>,
    link: SharedLinkStatus,
    static_root: impl Into<PathBuf>,
) -> Router {
    let state = AppState {
        reporter: StatusReporter::new(storage.clone(), link),
        storage,
    };

    Router::new()
        .route("/", get(shell))
        .route("/dashboard", get(shell))
        .route("/mobile", get(shell))
        .route("/log", get(shell))
        .route("/file", post(file_endpoint))
        .route("/delete", post(delete_endpoint))
        .route("/stats", get(stats))
        .fallback_service(ServeDir::new(static_root.into()))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .with_state(state)
}

/// Bind and serve the surface until the process goes down.
pub async fn serve(config: &HttpConfig, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|e| TransportError::BindFailed {
            addr: config.bind_addr.clone(),
            reason: e.to_string(),
        })?;
    info!(addr = %config.bind_addr, "http surface ready");
    axum::serve(listener, app)
        .await
        .map_err(|e| TransportError::NetworkIo(e).into())
}

// ----------------------------------------------------------------------------
// Application Shell
// ----------------------------------------------------------------------------

/// All shell routes serve the same single-page application; client-side
/// routing handles the rest.
async fn shell(State(state): State<AppState>) -> Response {
    // Prefer the precompressed shell the way the original firmware ships it.
    if let Ok(bytes) = state.storage.read("index.html.gz").await {
        return (
            [
                (header::CONTENT_TYPE, "text/html"),
                (header::CONTENT_ENCODING, "gzip"),
            ],
            bytes,
        )
            .into_response();
    }
    match state.storage.read("index.html").await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "text/html")], bytes).into_response(),
        Err(_) => (
            StatusCode::NOT_FOUND,
            "application shell not installed",
        )
            .into_response(),
    }
}

// ----------------------------------------------------------------------------
// File Endpoint
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ReadFileParams {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// `POST /file` is dual-use, matching the dashboard's existing contract:
/// a multipart body streams an upload in, an urlencoded body reads a blob
/// back.
async fn file_endpoint(State(state): State<AppState>, request: Request<Body>) -> Response {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if is_multipart {
        match Multipart::from_request(request, &()).await {
            Ok(multipart) => receive_upload(state, multipart).await,
            Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        }
    } else {
        match Form::<ReadFileParams>::from_request(request, &()).await {
            Ok(Form(params)) => read_blob(state, params).await,
            Err(_) => missing_params_response(),
        }
    }
}

/// Stream the inbound chunks to a newly created blob, acking only on
/// successful completion. A dropped connection leaves a partial blob behind;
/// that is accepted behavior.
async fn receive_upload(state: AppState, mut multipart: Multipart) -> Response {
    let mut uploaded = 0usize;

    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        };
        let Some(filename) = field.file_name().map(ToOwned::to_owned) else {
            continue;
        };

        let mut sink = match UploadSink::begin(state.storage.clone(), filename.clone()).await {
            Ok(sink) => sink,
            Err(e) => return storage_failure(&filename, e),
        };
        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    if let Err(e) = sink.append(&chunk).await {
                        return storage_failure(&filename, e);
                    }
                }
                Ok(None) => break,
                Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
            }
        }
        match sink.complete().await {
            Ok(bytes) => {
                debug!(file = %filename, bytes, "upload complete");
                uploaded += 1;
            }
            Err(e) => return storage_failure(&filename, e),
        }
    }

    if uploaded > 0 {
        StatusCode::OK.into_response()
    } else {
        (StatusCode::BAD_REQUEST, "ERROR: no file field in upload").into_response()
    }
}

async fn read_blob(state: AppState, params: ReadFileParams) -> Response {
    let (Some(name), Some(_kind)) = (params.name, params.kind) else {
        return missing_params_response();
    };
    match state.storage.read(&name).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            bytes,
        )
            .into_response(),
        Err(StorageError::NotFound { .. }) => {
            (StatusCode::NOT_FOUND, format!("ERROR: no such file: {}", name)).into_response()
        }
        Err(e) => storage_failure(&name, e),
    }
}

fn missing_params_response() -> Response {
    (
        StatusCode::BAD_REQUEST,
        "ERROR: name and type params required",
    )
        .into_response()
}

// ----------------------------------------------------------------------------
// Delete Endpoint
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DeleteParams {
    name: Option<String>,
}

async fn delete_endpoint(
    State(state): State<AppState>,
    form: Option<Form<DeleteParams>>,
) -> Response {
    let name = match form {
        Some(Form(DeleteParams { name: Some(name) })) => name,
        _ => return (StatusCode::BAD_REQUEST, "ERROR: name param required").into_response(),
    };
    // Deleting what isn't there is success; the facade guarantees it.
    match state.storage.delete(&name).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => storage_failure(&name, e),
    }
}

// ----------------------------------------------------------------------------
// Stats Endpoint
// ----------------------------------------------------------------------------

async fn stats(State(state): State<AppState>) -> Response {
    Json(state.reporter.snapshot().await).into_response()
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

/// Storage failures stay confined to the request that triggered them.
fn storage_failure(path: &str, error: StorageError) -> Response {
    warn!(path, error = %error, "storage operation failed");
    match error {
        StorageError::InvalidName { .. } => {
            (StatusCode::BAD_REQUEST, format!("ERROR: {}", error)).into_response()
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, format!("ERROR: {}", error)).into_response(),
    }
}
