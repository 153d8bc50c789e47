//! The normalized resume document shared by extraction, editing and both renderers.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Canonical portfolio content. Every field is optional; renderers fall back per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeData {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub professional_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub birthday: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub github_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub linkedin_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub social: Social,
    #[serde(default, deserialize_with = "lenient::items")]
    pub experience: Vec<Experience>,
    #[serde(default, deserialize_with = "lenient::items")]
    pub education: Vec<Education>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient::items")]
    pub projects: Vec<Project>,
    #[serde(default, deserialize_with = "lenient::items")]
    pub custom_elements: Vec<PlacedElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Social {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub github: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub twitter: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub instagram: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub company: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default, deserialize_with = "lenient::string")]
    pub degree: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub institution: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    /// Comma-separated, e.g. `"React, Node.js, PostgreSQL"`.
    #[serde(default, deserialize_with = "lenient::string")]
    pub technologies: String,
}

impl Project {
    /// Splits `technologies` on commas, trimming each and dropping empties.
    pub fn technology_list(&self) -> Vec<&str> {
        self.technologies
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// A custom UI element placed into one of the portfolio sections.
///
/// `kind` and `section` are kept as raw strings: an unknown value is a
/// soft failure at render time, never a deserialization error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedElement {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(rename = "type", deserialize_with = "lenient::string")]
    pub kind: String,
    #[serde(default)]
    pub props: Value,
    #[serde(default, deserialize_with = "lenient::string")]
    pub section: String,
}

/// The fixed set of portfolio sections, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    Hero,
    About,
    Experience,
    Projects,
    Skills,
    Education,
    Contact,
}

impl SectionId {
    pub const ALL: [SectionId; 7] = [
        SectionId::Hero,
        SectionId::About,
        SectionId::Experience,
        SectionId::Projects,
        SectionId::Skills,
        SectionId::Education,
        SectionId::Contact,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SectionId::Hero => "hero",
            SectionId::About => "about",
            SectionId::Experience => "experience",
            SectionId::Projects => "projects",
            SectionId::Skills => "skills",
            SectionId::Education => "education",
            SectionId::Contact => "contact",
        }
    }

    /// Heading shown above the section body. The hero has none.
    pub fn heading(self) -> &'static str {
        match self {
            SectionId::Hero => "",
            SectionId::About => "About Me",
            SectionId::Experience => "Work Experience",
            SectionId::Projects => "Projects",
            SectionId::Skills => "Technical Skills",
            SectionId::Education => "Education",
            SectionId::Contact => "Get In Touch",
        }
    }

    /// Label used for header navigation.
    pub fn nav_label(self) -> &'static str {
        match self {
            SectionId::Hero => "Home",
            SectionId::About => "About",
            SectionId::Experience => "Experience",
            SectionId::Projects => "Projects",
            SectionId::Skills => "Skills",
            SectionId::Education => "Education",
            SectionId::Contact => "Contact",
        }
    }
}

/// Deserializers that accept the loose shapes produced by model output and
/// hand-edited documents: nulls, numbers where text is expected, and
/// non-array values where a list is expected.
pub(crate) mod lenient {
    use super::*;
    use serde::de::DeserializeOwned;

    pub fn text(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(text(&Value::deserialize(d)?).unwrap_or_default())
    }

    /// Empty strings collapse to `None`.
    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(text(&Value::deserialize(d)?).filter(|s| !s.is_empty()))
    }

    pub fn strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items.iter().filter_map(text).collect(),
            _ => Vec::new(),
        })
    }

    /// Items that fail to deserialize are skipped rather than failing the document.
    pub fn items<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }

    /// Like `items`, but an absent or null value stays `None`.
    pub fn opt_items<'de, D, T>(d: D) -> Result<Option<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        match Value::deserialize(d)? {
            Value::Null => Ok(None),
            value => items(value).map(Some).map_err(serde::de::Error::custom),
        }
    }

    pub fn null_default<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        let value = Value::deserialize(d)?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }
}
