//! Request-level tests for the HTTP control surface
//!
//! Runs the router against filesystem storage in a temp directory and
//! exercises every route with in-process requests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use dccbridge_core::{FsStorage, LinkStatus, SharedLinkStatus, Storage};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

struct Fixture {
    app: Router,
    storage: Arc<dyn Storage>,
    _dir: tempfile::TempDir,
}

async fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn Storage> =
        Arc::new(FsStorage::open(dir.path(), 4 * 1024 * 1024).await.unwrap());
    let link: SharedLinkStatus = LinkStatus::new("yard-net", "10.0.0.2").shared();
    let app = dccbridge_http::router(storage.clone(), link, dir.path());
    Fixture {
        app,
        storage,
        _dir: dir,
    }
}

async fn write_blob(storage: &Arc<dyn Storage>, path: &str, content: &[u8]) {
    storage.create(path).await.unwrap();
    storage.append(path, content).await.unwrap();
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

fn form_request(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ----------------------------------------------------------------------------
// Stats
// ----------------------------------------------------------------------------

#[tokio::test]
async fn stats_reports_link_and_listing() {
    let fx = fixture().await;
    write_blob(&fx.storage, "roster.json", b"{}").await;

    let response = fx
        .app
        .oneshot(Request::get("/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );

    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["totalSize"], 4 * 1024 * 1024);
    assert_eq!(json["hotspot"], "yard-net");
    assert_eq!(json["rssi"], "0");
    assert_eq!(json["ip"], "10.0.0.2");
    assert_eq!(json["files"][0]["name"], "roster.json");
    assert_eq!(json["files"][0]["size"], 2);
}

#[tokio::test]
async fn stats_on_empty_storage_has_empty_files_array() {
    let fx = fixture().await;
    let response = fx
        .app
        .oneshot(Request::get("/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["files"], serde_json::json!([]));
}

// ----------------------------------------------------------------------------
// Delete
// ----------------------------------------------------------------------------

#[tokio::test]
async fn delete_succeeds_for_present_and_absent_blobs() {
    let fx = fixture().await;
    write_blob(&fx.storage, "old.bin", b"x").await;

    let response = fx
        .app
        .clone()
        .oneshot(form_request("/delete", "name=old.bin"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Idempotent: the second delete of the same name is still success.
    let response = fx
        .app
        .oneshot(form_request("/delete", "name=old.bin"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn delete_without_name_is_a_client_error() {
    let fx = fixture().await;
    let response = fx
        .app
        .oneshot(form_request("/delete", "other=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains("name param required"));
}

// ----------------------------------------------------------------------------
// File read
// ----------------------------------------------------------------------------

#[tokio::test]
async fn file_read_returns_blob_bytes() {
    let fx = fixture().await;
    write_blob(&fx.storage, "layout.bin", &[1, 2, 3, 4]).await;

    let response = fx
        .app
        .oneshot(form_request("/file", "name=layout.bin&type=application%2Foctet-stream"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn file_read_without_params_is_a_client_error() {
    let fx = fixture().await;
    let response = fx
        .app
        .clone()
        .oneshot(form_request("/file", "name=only-name"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = fx
        .app
        .oneshot(form_request("/file", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn file_read_of_missing_blob_is_not_found() {
    let fx = fixture().await;
    let response = fx
        .app
        .oneshot(form_request("/file", "name=ghost&type=x"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ----------------------------------------------------------------------------
// Upload
// ----------------------------------------------------------------------------

fn multipart_request(path: &str, filename: &str, chunks: &[&[u8]]) -> Request<Body> {
    let boundary = "dccbridge-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\r\n",
            filename
        )
        .as_bytes(),
    );
    for chunk in chunks {
        body.extend_from_slice(chunk);
    }
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri(path)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn upload_round_trips_through_storage() {
    let fx = fixture().await;
    let response = fx
        .app
        .oneshot(multipart_request(
            "/file",
            "points.cfg",
            &[b"turnout 1 ", b"thrown; ", b"turnout 2 closed"],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        fx.storage.read("points.cfg").await.unwrap(),
        b"turnout 1 thrown; turnout 2 closed"
    );
}

#[tokio::test]
async fn upload_without_file_field_is_a_client_error() {
    let fx = fixture().await;
    let boundary = "dccbridge-test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\njust text\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/file")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = fx.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ----------------------------------------------------------------------------
// Shell and static fallback
// ----------------------------------------------------------------------------

#[tokio::test]
async fn shell_routes_serve_the_same_page() {
    let fx = fixture().await;
    write_blob(&fx.storage, "index.html", b"<html>shell</html>").await;

    for path in ["/", "/dashboard", "/mobile", "/log"] {
        let response = fx
            .app
            .clone()
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "route {}", path);
        assert_eq!(body_bytes(response).await, b"<html>shell</html>");
    }
}

#[tokio::test]
async fn precompressed_shell_is_preferred() {
    let fx = fixture().await;
    write_blob(&fx.storage, "index.html.gz", b"gzbytes").await;
    write_blob(&fx.storage, "index.html", b"plain").await;

    let response = fx
        .app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.headers()[header::CONTENT_ENCODING], "gzip");
    assert_eq!(body_bytes(response).await, b"gzbytes");
}

#[tokio::test]
async fn unknown_paths_fall_back_to_static_files() {
    let fx = fixture().await;
    write_blob(&fx.storage, "app.css", b"body{}").await;

    let response = fx
        .app
        .clone()
        .oneshot(Request::get("/app.css").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"body{}");

    let response = fx
        .app
        .oneshot(Request::get("/nothing-here").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
