//! Element Registry: the closed catalog of custom element kinds.
//!
//! A `PlacedElement` carries its kind as a raw tag and its props as loose JSON.
//! `CustomElement::resolve` turns that pair into a strongly typed variant,
//! filling every absent or unusable field with the kind's default. Both
//! renderers consume `CustomElement` and never look at raw props.

use serde::Serialize;
use serde_json::Value;

use crate::models::resume::lenient;

/// Upper bound on wizard steps, matching the editor's input range.
pub const MAX_WIZARD_STEPS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Wizard,
    Steps,
    Timeline,
    Stats,
    Achievements,
    Progress,
}

impl ElementKind {
    pub const ALL: [ElementKind; 6] = [
        ElementKind::Wizard,
        ElementKind::Steps,
        ElementKind::Timeline,
        ElementKind::Stats,
        ElementKind::Achievements,
        ElementKind::Progress,
    ];

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::Wizard => "wizard",
            ElementKind::Steps => "steps",
            ElementKind::Timeline => "timeline",
            ElementKind::Stats => "stats",
            ElementKind::Achievements => "achievements",
            ElementKind::Progress => "progress",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ElementKind::Wizard => "Wizard",
            ElementKind::Steps => "Steps",
            ElementKind::Timeline => "Timeline",
            ElementKind::Stats => "Statistics",
            ElementKind::Achievements => "Achievements",
            ElementKind::Progress => "Progress Bars",
        }
    }

    /// The props a freshly placed element of this kind starts with.
    pub fn default_props(self) -> Value {
        CustomElement::from_props(self, &Value::Null).props_json()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Typed props
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardProps {
    pub steps: u32,
    pub current_step: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListProps {
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stat {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsProps {
    pub stats: Vec<Stat>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressItem {
    pub label: String,
    /// Always within 0–100.
    pub progress: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressProps {
    pub items: Vec<ProgressItem>,
}

/// Visual state of one wizard step, derived from `currentStep` on every render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Completed,
    Active,
    Pending,
}

impl StepState {
    pub fn class(self) -> &'static str {
        match self {
            StepState::Completed => "completed",
            StepState::Active => "active",
            StepState::Pending => "pending",
        }
    }
}

impl WizardProps {
    /// One state per step, 1-based: below `current_step` is completed,
    /// equal is active, above is pending.
    pub fn step_states(&self) -> Vec<StepState> {
        (1..=self.steps)
            .map(|n| match n.cmp(&self.current_step) {
                std::cmp::Ordering::Less => StepState::Completed,
                std::cmp::Ordering::Equal => StepState::Active,
                std::cmp::Ordering::Greater => StepState::Pending,
            })
            .collect()
    }
}

/// A resolved custom element: the kind tag fixes the props shape.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomElement {
    Wizard(WizardProps),
    Steps(ListProps),
    Timeline(ListProps),
    Stats(StatsProps),
    Achievements(ListProps),
    Progress(ProgressProps),
}

impl CustomElement {
    /// Resolves a raw tag and props. Returns `None` only for an unknown tag.
    pub fn resolve(tag: &str, props: &Value) -> Option<Self> {
        ElementKind::parse(tag).map(|kind| Self::from_props(kind, props))
    }

    /// Total over every kind: any props value, including null, yields an element.
    pub fn from_props(kind: ElementKind, props: &Value) -> Self {
        match kind {
            ElementKind::Wizard => CustomElement::Wizard(WizardProps {
                steps: positive_int(props.get("steps"))
                    .unwrap_or(3)
                    .min(MAX_WIZARD_STEPS) as u32,
                current_step: positive_int(props.get("currentStep"))
                    .unwrap_or(1)
                    .min(u32::MAX as u64) as u32,
            }),
            ElementKind::Steps => CustomElement::Steps(ListProps {
                items: string_list(props.get("items"))
                    .unwrap_or_else(|| numbered("Step")),
            }),
            ElementKind::Timeline => CustomElement::Timeline(ListProps {
                items: string_list(props.get("items"))
                    .unwrap_or_else(|| numbered("Event")),
            }),
            ElementKind::Achievements => CustomElement::Achievements(ListProps {
                items: string_list(props.get("items"))
                    .unwrap_or_else(|| numbered("Achievement")),
            }),
            ElementKind::Stats => CustomElement::Stats(StatsProps {
                stats: props
                    .get("stats")
                    .and_then(Value::as_array)
                    .map(|arr| arr.iter().filter_map(stat_from).collect())
                    .unwrap_or_else(default_stats),
            }),
            ElementKind::Progress => CustomElement::Progress(ProgressProps {
                items: props
                    .get("items")
                    .and_then(Value::as_array)
                    .map(|arr| arr.iter().filter_map(progress_from).collect())
                    .unwrap_or_else(default_progress),
            }),
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            CustomElement::Wizard(_) => ElementKind::Wizard,
            CustomElement::Steps(_) => ElementKind::Steps,
            CustomElement::Timeline(_) => ElementKind::Timeline,
            CustomElement::Stats(_) => ElementKind::Stats,
            CustomElement::Achievements(_) => ElementKind::Achievements,
            CustomElement::Progress(_) => ElementKind::Progress,
        }
    }

    /// The effective props, serialized back to the wire shape.
    pub fn props_json(&self) -> Value {
        let value = match self {
            CustomElement::Wizard(p) => serde_json::to_value(p),
            CustomElement::Steps(p) | CustomElement::Timeline(p) | CustomElement::Achievements(p) => {
                serde_json::to_value(p)
            }
            CustomElement::Stats(p) => serde_json::to_value(p),
            CustomElement::Progress(p) => serde_json::to_value(p),
        };
        value.unwrap_or_default()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Catalog
// ────────────────────────────────────────────────────────────────────────────

/// One palette entry offered to the editor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub name: &'static str,
    pub default_props: Value,
}

pub fn catalog() -> Vec<CatalogEntry> {
    ElementKind::ALL
        .into_iter()
        .map(|kind| CatalogEntry {
            kind,
            name: kind.display_name(),
            default_props: kind.default_props(),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Prop readers
// ────────────────────────────────────────────────────────────────────────────

/// Zero, negatives, null and non-numeric values all count as absent.
fn positive_int(value: Option<&Value>) -> Option<u64> {
    let n = match value? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 1.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    (n > 0).then_some(n)
}

/// A present array is used as given, even when empty.
fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    value
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(lenient::text).collect())
}

fn stat_from(value: &Value) -> Option<Stat> {
    let obj = value.as_object()?;
    Some(Stat {
        label: obj.get("label").and_then(lenient::text).unwrap_or_default(),
        value: obj.get("value").and_then(lenient::text).unwrap_or_default(),
    })
}

fn progress_from(value: &Value) -> Option<ProgressItem> {
    let obj = value.as_object()?;
    let progress = obj
        .get("progress")
        .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
        .filter(|f| f.is_finite())
        .unwrap_or(0.0)
        .clamp(0.0, 100.0);
    Some(ProgressItem {
        label: obj.get("label").and_then(lenient::text).unwrap_or_default(),
        progress: progress.round() as u8,
    })
}

fn numbered(prefix: &str) -> Vec<String> {
    (1..=3).map(|n| format!("{prefix} {n}")).collect()
}

fn default_stats() -> Vec<Stat> {
    [("Projects", "50+"), ("Clients", "30+"), ("Experience", "5y")]
        .into_iter()
        .map(|(label, value)| Stat {
            label: label.to_string(),
            value: value.to_string(),
        })
        .collect()
}

fn default_progress() -> Vec<ProgressItem> {
    [("Skill 1", 90), ("Skill 2", 75), ("Skill 3", 60)]
        .into_iter()
        .map(|(label, progress)| ProgressItem {
            label: label.to_string(),
            progress,
        })
        .collect()
}
