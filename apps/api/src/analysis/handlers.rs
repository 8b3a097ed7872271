//! Axum route handlers for the Analysis API.

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::analysis::models::{AnalyzeRequest, ExtractRequest, ExtractResponse, ResumeAnalysis};
use crate::errors::AppError;
use crate::extraction::{extract_text, has_enough_text, DocumentFormat};
use crate::state::AppState;

/// POST /api/v1/analyze
///
/// Full pipeline: validate → decode → extract → quality gate → score.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ResumeAnalysis>, AppError> {
    let Json(request) = payload?;
    let span = tracing::info_span!("analyze", request_id = %Uuid::new_v4());
    let analysis = analyze(&state, &request).instrument(span).await?;
    Ok(Json(analysis))
}

async fn analyze(state: &AppState, request: &AnalyzeRequest) -> Result<ResumeAnalysis, AppError> {
    if request.job_description_text.trim().is_empty() {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }

    let resume_text = decode_and_extract(
        &request.document_base64,
        &request.file_name,
        state.config.max_document_bytes,
    )
    .await?;

    let analysis = state
        .scorer
        .analyze(&resume_text, &request.job_description_text)
        .await?;

    info!(
        match_score = analysis.match_score,
        ats_score = analysis.ats_score,
        "Analysis complete"
    );

    Ok(analysis)
}

/// POST /api/v1/extract
///
/// Runs extraction only and returns the text. Useful for checking a file
/// before spending a scoring call.
pub async fn handle_extract(
    State(state): State<AppState>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, AppError> {
    let Json(request) = payload?;
    let text = decode_and_extract(
        &request.document_base64,
        &request.file_name,
        state.config.max_document_bytes,
    )
    .await?;

    Ok(Json(ExtractResponse {
        format: DocumentFormat::from_file_name(&request.file_name),
        character_count: text.chars().count(),
        file_name: request.file_name,
        text,
    }))
}

/// Shared front half of both endpoints: request checks, base64 decode, size gate,
/// extraction and the minimum-text gate.
async fn decode_and_extract(
    document_base64: &str,
    file_name: &str,
    max_document_bytes: usize,
) -> Result<String, AppError> {
    if document_base64.trim().is_empty() || file_name.trim().is_empty() {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }

    let format = DocumentFormat::from_file_name(file_name);
    if !format.is_supported_upload() {
        return Err(AppError::Validation(
            "Only PDF and DOCX files are accepted.".to_string(),
        ));
    }

    let bytes = decode_document(document_base64)?;
    if bytes.len() > max_document_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "File must be under {}.",
            describe_size(max_document_bytes)
        )));
    }

    let decoded_bytes = bytes.len();
    let owned_name = file_name.to_string();
    let text = tokio::task::spawn_blocking(move || extract_text(&bytes, &owned_name))
        .await
        .context("extraction task panicked")?;

    let chars = text.trim().chars().count();
    info!(
        file_name,
        ?format,
        decoded_bytes,
        extracted_chars = chars,
        "Document extracted"
    );

    if !has_enough_text(&text) {
        warn!(file_name, extracted_chars = chars, "Extraction below minimum text length");
        return Err(AppError::InsufficientText { chars });
    }

    Ok(text)
}

/// Human-readable size for limit messages: whole MB, one decimal, KB or bytes.
fn describe_size(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB {
        if bytes % MIB == 0 {
            format!("{} MB", bytes / MIB)
        } else {
            format!("{:.1} MB", bytes as f64 / MIB as f64)
        }
    } else if bytes >= 1024 {
        format!("{} KB", bytes.div_ceil(1024))
    } else {
        format!("{bytes} bytes")
    }
}

/// Decodes standard base64, tolerating a `data:<mime>;base64,` prefix and
/// surrounding whitespace.
fn decode_document(document_base64: &str) -> Result<Vec<u8>, AppError> {
    let trimmed = document_base64.trim();
    let payload = match trimmed.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(";base64,")
            .map(|(_, data)| data)
            .unwrap_or(rest),
        None => trimmed,
    };

    STANDARD
        .decode(payload)
        .map_err(|e| AppError::Validation(format!("documentBase64 is not valid base64: {e}")))
}
