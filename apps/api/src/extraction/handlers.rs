//! Axum route handler for resume extraction.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::models::resume::ResumeData;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ParseResumeRequest {
    #[serde(default)]
    pub images: Value,
}

#[derive(Debug, Serialize)]
pub struct ParseResumeResponse {
    pub success: bool,
    pub data: ResumeData,
}

/// POST /api/v1/resumes/parse
///
/// Accepts rasterised resume pages (base64 PNG, with or without a data-URL
/// prefix) and returns the extracted document.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    Json(request): Json<ParseResumeRequest>,
) -> Result<Json<ParseResumeResponse>, AppError> {
    let images = image_list(&request.images)?;
    info!("Parsing resume from {} page image(s)", images.len());

    let data = state.extractor.extract(&images).await?;

    Ok(Json(ParseResumeResponse {
        success: true,
        data,
    }))
}

fn image_list(value: &Value) -> Result<Vec<String>, AppError> {
    let Some(items) = value.as_array().filter(|items| !items.is_empty()) else {
        return Err(AppError::InvalidInput("No images provided".to_string()));
    };
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| AppError::InvalidInput("Images must be strings".to_string()))
        })
        .collect()
}
