//! Route handlers. Each request loads its own copy of the upload; nothing is shared between
//! requests except the read-only [`AppState`].

use std::collections::HashMap;
use std::io::Cursor;

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use crate::chart::{self, ChartRequest};
use crate::ingestion::ingest_from_reader;
use crate::processing::summarize;
use crate::types::{DataSet, Record};

use super::error::ApiError;
use super::AppState;

/// Rows included in the `/upload` preview.
pub const PREVIEW_ROWS: usize = 50;

struct UploadedFile {
    filename: String,
    bytes: Bytes,
}

/// A parsed multipart form: the `file` part plus any text fields.
#[derive(Default)]
struct Form {
    file: Option<UploadedFile>,
    text: HashMap<String, String>,
}

impl Form {
    async fn read(multipart: Result<Multipart, MultipartRejection>) -> Result<Self, ApiError> {
        let mut multipart = multipart?;
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            if name == "file" {
                let filename = field.file_name().unwrap_or("").to_string();
                let bytes = field.bytes().await?;
                form.file = Some(UploadedFile { filename, bytes });
            } else if !name.is_empty() {
                let value = field.text().await?;
                form.text.insert(name, value);
            }
        }
        Ok(form)
    }

    fn take_file(&mut self) -> Result<UploadedFile, ApiError> {
        self.file.take().ok_or(ApiError::MissingField("file"))
    }

    fn take_text(&mut self, name: &'static str) -> Result<String, ApiError> {
        self.text.remove(name).ok_or(ApiError::MissingField(name))
    }
}

/// Parse the upload on the blocking pool; CSV and Excel decoding is CPU-bound.
async fn load_upload(state: &AppState, upload: UploadedFile) -> Result<(String, DataSet), ApiError> {
    let UploadedFile { filename, bytes } = upload;
    let options = state.ingestion.clone();
    debug!(%filename, bytes = bytes.len(), "loading upload");

    tokio::task::spawn_blocking(move || -> Result<_, ApiError> {
        let dataset = ingest_from_reader(&filename, Cursor::new(bytes), &options)?;
        Ok((filename, dataset))
    })
    .await?
}

/// `GET /`: liveness message.
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Backend is running successfully" }))
}

#[derive(Serialize)]
struct UploadResponse<'a> {
    filename: &'a str,
    columns: Vec<&'a str>,
    rows: usize,
    preview: Vec<Record<'a>>,
    full_data: Vec<Record<'a>>,
}

/// `POST /upload`: shape, column names, a 50-row preview and every row.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut form = Form::read(multipart).await?;
    let (filename, dataset) = load_upload(&state, form.take_file()?).await?;

    info!(%filename, rows = dataset.row_count(), "upload parsed");
    let body = UploadResponse {
        filename: &filename,
        columns: dataset.schema.field_names().collect(),
        rows: dataset.row_count(),
        preview: dataset.records(Some(PREVIEW_ROWS)),
        full_data: dataset.records(None),
    };
    Ok(Json(body).into_response())
}

/// `POST /analyze`: summary statistics of the numeric columns.
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut form = Form::read(multipart).await?;
    let (_, dataset) = load_upload(&state, form.take_file()?).await?;
    Ok(Json(summarize(&dataset)).into_response())
}

#[derive(Serialize)]
struct VisualizeResponse {
    chart_type: &'static str,
    image: String,
}

/// `POST /visualize`: one chart rendered to PNG and returned as base64.
pub async fn visualize(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut form = Form::read(multipart).await?;
    let file = form.take_file()?;
    let chart_type = form.take_text("chart_type")?;
    let x_column = form.take_text("x_column")?;
    let y_column = form.text.remove("y_column");

    let (_, dataset) = load_upload(&state, file).await?;
    let request = ChartRequest::parse(&chart_type, x_column, y_column)?;

    let rendered = tokio::task::spawn_blocking(move || chart::render(&dataset, &request)).await??;
    info!(chart_type = %rendered.kind, png_bytes = rendered.png.len(), "chart rendered");

    let body = VisualizeResponse {
        chart_type: rendered.kind.as_str(),
        image: rendered.to_base64(),
    };
    Ok(Json(body).into_response())
}
