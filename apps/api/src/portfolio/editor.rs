//! Editor operations on a document's placed custom elements.
//!
//! These are the only mutations the editor session applies to
//! `customElements`; field edits replace the document wholesale.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::resume::{PlacedElement, ResumeData, SectionId};
use crate::registry::{CustomElement, ElementKind};

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Element {0} not found")]
    NotFound(String),
}

/// Appends a new element of `kind` to `section` with the kind's default props.
pub fn place_element(
    data: &mut ResumeData,
    kind: &str,
    section: &str,
) -> Result<PlacedElement, EditorError> {
    let kind = ElementKind::parse(kind)
        .ok_or_else(|| EditorError::InvalidInput(format!("unknown element type {kind:?}")))?;
    let section = SectionId::parse(section)
        .ok_or_else(|| EditorError::InvalidInput(format!("unknown section {section:?}")))?;

    let element = PlacedElement {
        id: Uuid::new_v4().to_string(),
        kind: kind.tag().to_string(),
        props: kind.default_props(),
        section: section.as_str().to_string(),
    };
    debug!("Placed {} element {} in {}", kind.tag(), element.id, section.as_str());
    data.custom_elements.push(element.clone());
    Ok(element)
}

/// Replaces an element's props. For known kinds the props are normalized
/// through the registry, so absent fields come back as defaults.
pub fn update_element_props(
    data: &mut ResumeData,
    id: &str,
    props: Value,
) -> Result<PlacedElement, EditorError> {
    if !props.is_object() {
        return Err(EditorError::InvalidInput(
            "props must be a JSON object".to_string(),
        ));
    }
    let element = data
        .custom_elements
        .iter_mut()
        .find(|e| e.id == id)
        .ok_or_else(|| EditorError::NotFound(id.to_string()))?;

    element.props = match ElementKind::parse(&element.kind) {
        Some(kind) => CustomElement::from_props(kind, &props).props_json(),
        None => props,
    };
    Ok(element.clone())
}

pub fn remove_element(data: &mut ResumeData, id: &str) -> Result<PlacedElement, EditorError> {
    let index = data
        .custom_elements
        .iter()
        .position(|e| e.id == id)
        .ok_or_else(|| EditorError::NotFound(id.to_string()))?;
    Ok(data.custom_elements.remove(index))
}
