//! HTTP request handlers - thin layer over the attendance pipeline

use super::error::Problem;
use super::page::render_index;
use super::AppState;
use crate::core::etl::EtlEngine;
use crate::core::pipeline::AttendancePipeline;
use crate::core::xlsx::XLSX_MEDIA_TYPE;
use crate::domain::ports::Storage;
use crate::utils::validation::validate_file_extension;
use axum::{
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;

pub const DEFAULT_DOWNLOAD_NAME: &str = "attendance_final.xlsx";

pub const MSG_INVALID_FILE: &str = "Please upload a valid CSV file.";
pub const MSG_SUCCESS: &str = "File processed successfully.";

pub async fn index() -> Html<String> {
    Html(render_index(None, None))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

struct Upload {
    file_name: String,
    data: Vec<u8>,
}

/// Keeps the status axum picked for the failure, e.g. 413 once the body limit is hit.
fn multipart_problem(error: MultipartError, fallback_title: &str) -> Problem {
    let status = error.status();
    let title = if status == StatusCode::PAYLOAD_TOO_LARGE {
        "Payload Too Large"
    } else {
        fallback_title
    };
    Problem::new(status, title).with_detail(error.body_text())
}

async fn read_upload(multipart: &mut Multipart) -> Result<Option<Upload>, Problem> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_problem(e, "Malformed multipart body"))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_problem(e, "Upload interrupted"))?;

        return Ok(Some(Upload {
            file_name,
            data: data.to_vec(),
        }));
    }
    Ok(None)
}

/// Processes an uploaded CSV and renders the page with a download link.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, Problem> {
    let upload = read_upload(&mut multipart).await?.ok_or_else(|| {
        Problem::new(StatusCode::UNPROCESSABLE_ENTITY, "Missing Field")
            .with_detail("multipart field 'file' is required")
    })?;

    if validate_file_extension("file", &upload.file_name, &["csv"]).is_err() {
        tracing::info!("Rejected upload '{}': not a CSV file", upload.file_name);
        return Ok(Html(render_index(Some(MSG_INVALID_FILE), None)));
    }

    tracing::info!(
        "Processing upload '{}' ({} bytes)",
        upload.file_name,
        upload.data.len()
    );

    let pipeline = AttendancePipeline::new(
        state.storage.clone(),
        state.rules.as_ref().clone(),
        upload.data,
    );
    match EtlEngine::new(pipeline).run().await {
        Ok(stored_name) => {
            let download_url = format!(
                "/download?path={}&name={}",
                stored_name, DEFAULT_DOWNLOAD_NAME
            );
            Ok(Html(render_index(Some(MSG_SUCCESS), Some(&download_url))))
        }
        Err(e) => {
            tracing::warn!(
                "Processing '{}' failed: {} (Category: {:?}, Severity: {:?})",
                upload.file_name,
                e,
                e.category(),
                e.severity()
            );
            let message = format!("Error: {}", e.user_friendly_message());
            Ok(Html(render_index(Some(&message), None)))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub path: String,
    pub name: Option<String>,
}

/// Keeps the attachment name safe for a quoted header value.
fn attachment_name(name: Option<&str>) -> String {
    let cleaned: String = name
        .unwrap_or(DEFAULT_DOWNLOAD_NAME)
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control() && !matches!(c, '"' | '\\' | '/'))
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        DEFAULT_DOWNLOAD_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, Problem> {
    if !state.storage.exists(&query.path).await {
        tracing::debug!("Download of unknown report '{}'", query.path);
        return Err(Problem::not_found());
    }

    let data = state.storage.read_file(&query.path).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        attachment_name(query.name.as_deref())
    );

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MEDIA_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}
