use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::util::ServiceExt;

use data_analyst_api::server::{router, ServerConfig};

const BOUNDARY: &str = "----TestBoundary1234567890";

fn app() -> Router {
    router(&ServerConfig::default())
}

/// Builds a multipart body with an optional `file` part followed by text fields.
fn multipart_body(file: Option<(&str, &[u8])>, fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some((filename, content)) = file {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n").as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes());
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn post(uri: &str, body: Vec<u8>) -> (StatusCode, Value) {
    post_to(app(), uri, body).await
}

async fn post_to(app: Router, uri: &str, body: Vec<u8>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

const SMALL_CSV: &[u8] = b"a,b\n1,2\n3,4\n";

#[tokio::test]
async fn root_reports_liveness() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["message"], "Backend is running successfully");
}

#[tokio::test]
async fn upload_returns_shape_and_preview() {
    let (status, json) = post("/upload", multipart_body(Some(("t.csv", SMALL_CSV)), &[])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["filename"], "t.csv");
    assert_eq!(json["columns"], serde_json::json!(["a", "b"]));
    assert_eq!(json["rows"], 2);
    assert_eq!(json["preview"], serde_json::json!([{"a": 1, "b": 2}, {"a": 3, "b": 4}]));
    assert_eq!(json["full_data"], json["preview"]);
}

#[tokio::test]
async fn upload_preview_is_capped_at_fifty_rows() {
    let mut csv = String::from("n\n");
    for i in 0..120 {
        csv.push_str(&format!("{i}\n"));
    }
    let (status, json) = post("/upload", multipart_body(Some(("big.csv", csv.as_bytes())), &[])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["rows"], 120);
    assert_eq!(json["preview"].as_array().unwrap().len(), 50);
    assert_eq!(json["full_data"].as_array().unwrap().len(), 120);
}

#[tokio::test]
async fn upload_rejects_unsupported_extension() {
    let (status, json) = post("/upload", multipart_body(Some(("notes.txt", &b"hello"[..])), &[])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Unsupported file format. Upload CSV or Excel file.");
}

#[tokio::test]
async fn upload_reports_malformed_files() {
    let (status, json) = post("/upload", multipart_body(Some(("bad.xlsx", SMALL_CSV)), &[])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["detail"].as_str().unwrap().starts_with("File reading failed: "));
}

#[tokio::test]
async fn upload_without_file_is_unprocessable() {
    let (status, json) = post("/upload", multipart_body(None, &[("other", "x")])).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["detail"], "Field required: file");
}

#[tokio::test]
async fn analyze_summarizes_numeric_columns() {
    let csv: &[u8] = b"name,age,score\nAda,20,1.5\nBob,30,\n";
    let (status, json) = post("/analyze", multipart_body(Some(("p.csv", csv)), &[])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["numeric_columns"], serde_json::json!(["age", "score"]));
    assert_eq!(json["mean"]["age"], 25.0);
    assert_eq!(json["min"]["age"], 20);
    assert_eq!(json["max"]["score"], 1.5);
    assert_eq!(json["count"]["score"], 1);
}

#[tokio::test]
async fn visualize_returns_base64_png() {
    let body = multipart_body(
        Some(("t.csv", SMALL_CSV)),
        &[("chart_type", "scatter"), ("x_column", "a"), ("y_column", "b")],
    );
    let (status, json) = post("/visualize", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["chart_type"], "scatter");
    assert!(json["image"].as_str().unwrap().starts_with("iVBORw0KGgo"));
}

#[tokio::test]
async fn visualize_treats_empty_y_as_absent() {
    let body = multipart_body(
        Some(("t.csv", SMALL_CSV)),
        &[("chart_type", "pie"), ("x_column", "a"), ("y_column", "")],
    );
    let (status, _) = post("/visualize", body).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn visualize_rejects_bad_requests() {
    let cases = [
        (vec![("chart_type", "bar"), ("x_column", "zzz")], "Invalid X column"),
        (
            vec![("chart_type", "bar"), ("x_column", "a"), ("y_column", "zzz")],
            "Invalid Y column",
        ),
        (vec![("chart_type", "radar"), ("x_column", "a")], "Unsupported chart type"),
        (vec![("chart_type", "bar"), ("x_column", "a")], "Y must be numeric for bar chart"),
    ];

    for (fields, detail) in cases {
        let (status, json) = post("/visualize", multipart_body(Some(("t.csv", SMALL_CSV)), &fields)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{detail}");
        assert_eq!(json["detail"], detail);
    }
}

#[tokio::test]
async fn visualize_requires_chart_fields() {
    let (status, json) = post(
        "/visualize",
        multipart_body(Some(("t.csv", SMALL_CSV)), &[("x_column", "a")]),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["detail"], "Field required: chart_type");
}

#[tokio::test]
async fn non_multipart_body_is_unprocessable() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/analyze")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn visualize_rejects_values_that_overflow_the_axes() {
    let csv: &[u8] = b"label,v,w\na,1e308,1e308\nb,-1e308,-1e308\n";
    let cases = [
        (vec![("chart_type", "histogram"), ("x_column", "v")], "histogram"),
        (vec![("chart_type", "scatter"), ("x_column", "v"), ("y_column", "w")], "scatter"),
        (vec![("chart_type", "bar"), ("x_column", "label"), ("y_column", "v")], "bar"),
    ];

    for (fields, kind) in cases {
        let (status, json) = post("/visualize", multipart_body(Some(("x.csv", csv)), &fields)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{kind}");
        assert_eq!(json["detail"], format!("Values are too large to plot as a {kind} chart"));
    }
}

async fn preflight(origin: &str) -> axum::response::Response {
    app()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/upload")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn cors_preflight_allows_the_local_frontend() {
    let response = preflight("http://localhost:3000").await;
    let headers = response.headers();

    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(), "true");
}

#[tokio::test]
async fn cors_preflight_ignores_foreign_origins() {
    let response = preflight("http://evil.example").await;
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn oversized_uploads_are_rejected() {
    let small = router(&ServerConfig {
        upload_limit_bytes: 64,
        ..ServerConfig::default()
    });
    let mut csv = String::from("n\n");
    for i in 0..100 {
        csv.push_str(&format!("{i}\n"));
    }

    let (status, json) = post_to(small, "/upload", multipart_body(Some(("big.csv", csv.as_bytes())), &[])).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["detail"], "Upload exceeds the size limit");
}

#[tokio::test]
async fn concurrent_uploads_are_isolated() {
    let first: &[u8] = b"a\n1\n2\n";
    let second: &[u8] = b"x,y\n1,2\n3,4\n5,6\n";
    let ((s1, j1), (s2, j2)) = tokio::join!(
        post("/upload", multipart_body(Some(("one.csv", first)), &[])),
        post("/upload", multipart_body(Some(("two.csv", second)), &[])),
    );

    assert_eq!((s1, s2), (StatusCode::OK, StatusCode::OK));
    assert_eq!(j1["columns"], serde_json::json!(["a"]));
    assert_eq!(j1["rows"], 2);
    assert_eq!(j2["columns"], serde_json::json!(["x", "y"]));
    assert_eq!(j2["rows"], 3);
}
