// Portfolio rendering: one composition pass, two backends.
//   compose: section plan shared by both backends
//   html:    self-contained static export (string templates)
//   live:    virtual DOM for the in-app editor preview
// Rendering is pure and synchronous; every field access has a fallback, so the
// only failure is a request whose document is not a JSON object.

pub mod assets;
pub mod compose;
pub mod handlers;
pub mod html;
pub mod live;
pub mod node;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::resume::{PlacedElement, ResumeData};

pub use compose::compose;
pub use live::{EditorHooks, InteractionHooks, NoHooks};
pub use node::Node;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An internal invariant broke. Not expected in practice.
    #[error("Render failure: {0}")]
    RenderFailure(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Label of the toggle button, which names the theme it switches to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Dark => "Light Mode",
            Theme::Light => "Dark Mode",
        }
    }
}

/// Theme preference wiring for the exported document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Theme applied before any stored preference is read.
    pub default_theme: Theme,
    /// Browser storage key holding the visitor's choice.
    pub storage_key: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            default_theme: Theme::Dark,
            storage_key: "portfolio_theme".to_string(),
        }
    }
}

/// Renders the complete standalone HTML document.
pub fn render_export(
    data: &ResumeData,
    elements: Option<&[PlacedElement]>,
    options: &ExportOptions,
) -> String {
    html::render_document(&compose(data, elements), options)
}

/// Renders the editor preview tree.
pub fn render_preview(
    data: &ResumeData,
    elements: Option<&[PlacedElement]>,
    hooks: &dyn InteractionHooks,
) -> Node {
    live::render_page(&compose(data, elements), hooks)
}

/// Accepts a JSON document for rendering. Anything but an object is rejected.
pub fn parse_document(value: Value) -> Result<ResumeData, RenderError> {
    if !value.is_object() {
        return Err(RenderError::InvalidInput(
            "portfolio data must be a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|e| RenderError::InvalidInput(format!("unreadable portfolio data: {e}")))
}

/// Escapes text for HTML element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Suggested download name: lowercase, whitespace runs become hyphens.
pub fn export_filename(name: Option<&str>) -> String {
    let base = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("portfolio")
        .to_lowercase();
    let slug = base.split_whitespace().collect::<Vec<_>>().join("-");
    format!("{slug}-portfolio.html")
}
