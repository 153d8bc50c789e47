//! Axum route handlers for saved portfolios and their placed elements.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{PlacedElement, ResumeData};
use crate::portfolio::editor::{place_element, remove_element, update_element_props};
use crate::render::handlers::html_download;
use crate::render::{export_filename, parse_document, render_export, ExportOptions};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SavePortfolioRequest {
    pub user_id: String,
    pub portfolio_id: Option<Uuid>,
    pub data: Value,
}

#[derive(Debug, Serialize)]
pub struct SavePortfolioResponse {
    pub success: bool,
    pub portfolio_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PortfolioResponse {
    pub portfolio_id: Uuid,
    pub data: ResumeData,
}

#[derive(Debug, Serialize)]
pub struct UserPortfolioResponse {
    pub has_portfolio: bool,
    pub portfolio_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceElementRequest {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub section: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateElementRequest {
    pub user_id: String,
    pub props: Value,
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub user_id: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/portfolios
///
/// Creates a portfolio, or updates `portfolio_id` when it belongs to the user.
pub async fn handle_save_portfolio(
    State(state): State<AppState>,
    Json(request): Json<SavePortfolioRequest>,
) -> Result<Json<SavePortfolioResponse>, AppError> {
    let user_id = require_user(&request.user_id)?;
    let data = parse_document(request.data)?;
    let portfolio_id = save(&state, user_id, request.portfolio_id, &data).await?;

    Ok(Json(SavePortfolioResponse {
        success: true,
        portfolio_id,
    }))
}

/// GET /api/v1/portfolios/:id
pub async fn handle_get_portfolio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PortfolioResponse>, AppError> {
    let data = load(&state, id, None).await?;
    Ok(Json(PortfolioResponse {
        portfolio_id: id,
        data,
    }))
}

/// GET /api/v1/portfolios/:id/export
///
/// Downloads the saved portfolio as a standalone HTML document.
pub async fn handle_export_portfolio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let data = load(&state, id, None).await?;
    let html = render_export(&data, None, &ExportOptions::default());
    info!("Exported saved portfolio {id} ({} bytes)", html.len());
    Ok(html_download(html, &export_filename(data.name.as_deref())))
}

/// GET /api/v1/users/:user_id/portfolio
///
/// Reports the user's most recently created portfolio, if any.
pub async fn handle_user_portfolio(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserPortfolioResponse>, AppError> {
    let portfolio_id = state.store.latest_for_user(&user_id).await?;
    Ok(Json(UserPortfolioResponse {
        has_portfolio: portfolio_id.is_some(),
        portfolio_id,
    }))
}

/// POST /api/v1/portfolios/:id/elements
pub async fn handle_place_element(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PlaceElementRequest>,
) -> Result<(StatusCode, Json<PlacedElement>), AppError> {
    let user_id = require_user(&request.user_id)?;
    let mut data = load(&state, id, Some(user_id)).await?;

    let element = place_element(&mut data, &request.kind, &request.section)?;
    save(&state, user_id, Some(id), &data).await?;

    Ok((StatusCode::CREATED, Json(element)))
}

/// PATCH /api/v1/portfolios/:id/elements/:element_id
pub async fn handle_update_element(
    State(state): State<AppState>,
    Path((id, element_id)): Path<(Uuid, String)>,
    Json(request): Json<UpdateElementRequest>,
) -> Result<Json<PlacedElement>, AppError> {
    let user_id = require_user(&request.user_id)?;
    let mut data = load(&state, id, Some(user_id)).await?;

    let element = update_element_props(&mut data, &element_id, request.props)?;
    save(&state, user_id, Some(id), &data).await?;

    Ok(Json(element))
}

/// DELETE /api/v1/portfolios/:id/elements/:element_id?user_id=
pub async fn handle_remove_element(
    State(state): State<AppState>,
    Path((id, element_id)): Path<(Uuid, String)>,
    Query(owner): Query<OwnerQuery>,
) -> Result<StatusCode, AppError> {
    let user_id = require_user(&owner.user_id)?;
    let mut data = load(&state, id, Some(user_id)).await?;

    remove_element(&mut data, &element_id)?;
    save(&state, user_id, Some(id), &data).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn require_user(user_id: &str) -> Result<&str, AppError> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::InvalidInput("user_id cannot be empty".to_string()));
    }
    Ok(user_id)
}

/// Loads a stored document. With `owner`, a row belonging to another user
/// is reported as not found.
async fn load(state: &AppState, id: Uuid, owner: Option<&str>) -> Result<ResumeData, AppError> {
    let row = state
        .store
        .get(id)
        .await?
        .filter(|row| owner.map_or(true, |owner| row.user_id == owner))
        .ok_or_else(|| AppError::NotFound(format!("Portfolio {id} not found")))?;
    Ok(parse_document(row.data)?)
}

async fn save(
    state: &AppState,
    user_id: &str,
    id: Option<Uuid>,
    data: &ResumeData,
) -> Result<Uuid, AppError> {
    let value = serde_json::to_value(data).map_err(anyhow::Error::from)?;
    Ok(state.store.upsert(user_id, id, &value).await?)
}
