//! Axum route handlers for the element palette, live preview and export.

use axum::{
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::models::resume::{lenient, PlacedElement};
use crate::registry::{catalog, CatalogEntry, CustomElement};
use crate::render::html::render_element;
use crate::render::{
    export_filename, parse_document, render_export, render_preview, EditorHooks, ExportOptions,
    InteractionHooks, NoHooks, RenderError, Theme,
};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteEntry {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    /// The element rendered with its default props, for palette thumbnails.
    pub preview_html: String,
}

#[derive(Debug, Serialize)]
pub struct ElementsResponse {
    pub elements: Vec<PaletteEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub data: Value,
    /// Replaces the list embedded in `data` when present.
    #[serde(default, deserialize_with = "lenient::opt_items")]
    pub custom_elements: Option<Vec<PlacedElement>>,
    #[serde(default)]
    pub editable: bool,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub tree: Value,
    /// The same tree serialized as escaped markup.
    pub html: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub data: Value,
    #[serde(default, deserialize_with = "lenient::opt_items")]
    pub custom_elements: Option<Vec<PlacedElement>>,
    /// Theme the document opens in before any stored preference applies.
    #[serde(default)]
    pub theme: Theme,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/elements
pub async fn handle_list_elements() -> Json<ElementsResponse> {
    let elements = catalog()
        .into_iter()
        .map(|entry| PaletteEntry {
            preview_html: render_element(&CustomElement::from_props(
                entry.kind,
                &entry.default_props,
            )),
            entry,
        })
        .collect();
    Json(ElementsResponse { elements })
}

/// POST /api/v1/portfolios/preview
///
/// Returns the live-preview node tree. With `editable` set, sections carry
/// drop-zone markers and every placed element gets edit/remove controls.
pub async fn handle_preview(
    Json(request): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let data = parse_document(request.data)?;
    let hooks: &dyn InteractionHooks = if request.editable {
        &EditorHooks
    } else {
        &NoHooks
    };

    let node = render_preview(&data, request.custom_elements.as_deref(), hooks);
    let tree = serde_json::to_value(&node)
        .map_err(|e| RenderError::RenderFailure(format!("preview tree: {e}")))?;

    Ok(Json(PreviewResponse {
        tree,
        html: node.to_html(),
    }))
}

/// POST /api/v1/portfolios/export
///
/// Returns the standalone HTML document as a download.
pub async fn handle_export(Json(request): Json<ExportRequest>) -> Result<Response, AppError> {
    let data = parse_document(request.data)?;
    let options = ExportOptions {
        default_theme: request.theme,
        ..Default::default()
    };
    let html = render_export(&data, request.custom_elements.as_deref(), &options);
    let filename = export_filename(data.name.as_deref());

    info!("Exported portfolio ({} bytes) as {filename}", html.len());
    Ok(html_download(html, &filename))
}

/// Wraps an exported document in download headers.
pub fn html_download(html: String, filename: &str) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", header_safe(filename));
    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        html,
    )
        .into_response()
}

/// Replaces anything that cannot appear inside a quoted header parameter.
fn header_safe(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
