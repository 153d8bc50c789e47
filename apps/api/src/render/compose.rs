//! Section composition shared by the live and export backends.
//!
//! `compose` applies every data-level decision once: link precedence, element
//! resolution, section placement, text fallbacks and the absence policy. The
//! backends only translate the resulting `PortfolioView` into markup.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::models::resume::{Education, Experience, PlacedElement, Project, ResumeData, SectionId};
use crate::registry::CustomElement;

pub const DEFAULT_TITLE: &str = "Portfolio";
pub const DEFAULT_NAME: &str = "Your Name";
pub const DEFAULT_PROFESSION: &str = "Professional";
pub const DEFAULT_HERO_SUMMARY: &str =
    "A passionate professional with a drive to explore new technologies.";
pub const DEFAULT_ABOUT_SUMMARY: &str = "Professional summary...";
pub const DEFAULT_INSTITUTION: &str = "Institution";
pub const DEFAULT_DEGREE: &str = "Degree";

/// Social profile links after precedence and sanitising.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SocialLinks {
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
}

impl SocialLinks {
    /// GitHub prefers `social.github` over `githubUrl`; all values are trimmed.
    pub fn resolve(data: &ResumeData) -> Self {
        let github = non_blank(data.social.github.as_deref())
            .or_else(|| non_blank(data.github_url.as_deref()));
        Self {
            github: github.and_then(safe_link),
            linkedin: non_blank(data.linkedin_url.as_deref()).and_then(safe_link),
            twitter: non_blank(data.social.twitter.as_deref()).and_then(safe_link),
            instagram: non_blank(data.social.instagram.as_deref()).and_then(safe_link),
        }
    }

    /// Present links as `(label, url)` in display order.
    pub fn labelled(&self) -> Vec<(&'static str, &str)> {
        [
            ("GitHub", &self.github),
            ("LinkedIn", &self.linkedin),
            ("Twitter", &self.twitter),
            ("Instagram", &self.instagram),
        ]
        .into_iter()
        .filter_map(|(label, url)| url.as_deref().map(|u| (label, u)))
        .collect()
    }
}

/// A registry-resolved element, keyed by its placement id.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedElement<'a> {
    pub id: &'a str,
    pub element: CustomElement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hero<'a> {
    pub name: &'a str,
    pub title: &'a str,
    pub summary: &'a str,
    pub avatar: Option<String>,
    /// Single uppercase letter shown when there is no avatar.
    pub initial: String,
    pub email: Option<&'a str>,
    pub show_projects_cta: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contact<'a> {
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub location: Option<&'a str>,
    pub birthday: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody<'a> {
    Hero(Hero<'a>),
    About { summary: &'a str, skills: &'a [String] },
    Experience(&'a [Experience]),
    Projects(&'a [Project]),
    Skills(&'a [String]),
    Education(&'a [Education]),
    Contact(Contact<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionView<'a> {
    pub id: SectionId,
    /// Placed elements, rendered before the native content in list order.
    pub elements: Vec<ResolvedElement<'a>>,
    pub body: SectionBody<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioView<'a> {
    pub title: &'a str,
    pub links: SocialLinks,
    /// Present sections only, in the fixed display order.
    pub sections: Vec<SectionView<'a>>,
}

impl<'a> PortfolioView<'a> {
    #[cfg(test)]
    pub fn section(&self, id: SectionId) -> Option<&SectionView<'a>> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Sections linked from the header navigation.
    pub fn nav(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.sections
            .iter()
            .map(|s| s.id)
            .filter(|id| *id != SectionId::Hero)
    }
}

/// Builds the section plan for `data`.
///
/// When `elements` is given it replaces the list embedded in `data`.
pub fn compose<'a>(data: &'a ResumeData, elements: Option<&'a [PlacedElement]>) -> PortfolioView<'a> {
    let placed = elements.unwrap_or(data.custom_elements.as_slice());
    let mut by_section = place_elements(placed);

    let mut sections = Vec::with_capacity(SectionId::ALL.len());
    for id in SectionId::ALL {
        let Some(body) = section_body(id, data) else {
            continue;
        };
        sections.push(SectionView {
            id,
            elements: std::mem::take(&mut by_section[section_index(id)]),
            body,
        });
    }

    PortfolioView {
        title: text_or(data.name.as_deref(), DEFAULT_TITLE),
        links: SocialLinks::resolve(data),
        sections,
    }
}

/// Resolves placed elements into per-section buckets, preserving list order.
fn place_elements(placed: &[PlacedElement]) -> Vec<Vec<ResolvedElement<'_>>> {
    let mut buckets: Vec<Vec<ResolvedElement<'_>>> = vec![Vec::new(); SectionId::ALL.len()];
    let mut seen = HashSet::new();

    for item in placed {
        let Some(section) = SectionId::parse(&item.section) else {
            debug!(
                "Custom element {:?} targets unknown section {:?}",
                item.id, item.section
            );
            continue;
        };
        let Some(element) = CustomElement::resolve(&item.kind, &item.props) else {
            debug!("Custom element {:?} has unknown type {:?}", item.id, item.kind);
            continue;
        };
        if !seen.insert(item.id.as_str()) {
            warn!("Skipping custom element with duplicate id {:?}", item.id);
            continue;
        }
        buckets[section_index(section)].push(ResolvedElement {
            id: &item.id,
            element,
        });
    }

    buckets
}

fn section_index(id: SectionId) -> usize {
    SectionId::ALL
        .iter()
        .position(|s| *s == id)
        .unwrap_or_default()
}

/// `None` means the section is absent from both renderers.
fn section_body(id: SectionId, data: &ResumeData) -> Option<SectionBody<'_>> {
    match id {
        SectionId::Hero => Some(SectionBody::Hero(Hero {
            name: text_or(data.name.as_deref(), DEFAULT_NAME),
            title: text_or(data.professional_title.as_deref(), DEFAULT_PROFESSION),
            summary: text_or(data.summary.as_deref(), DEFAULT_HERO_SUMMARY),
            avatar: non_blank(data.avatar.as_deref()).and_then(safe_image_src),
            initial: initial(data.name.as_deref()),
            email: non_blank(data.email.as_deref()),
            show_projects_cta: !data.projects.is_empty(),
        })),
        SectionId::About => Some(SectionBody::About {
            summary: text_or(data.summary.as_deref(), DEFAULT_ABOUT_SUMMARY),
            skills: &data.skills,
        }),
        SectionId::Experience => {
            (!data.experience.is_empty()).then_some(SectionBody::Experience(&data.experience))
        }
        SectionId::Projects => {
            (!data.projects.is_empty()).then_some(SectionBody::Projects(&data.projects))
        }
        SectionId::Skills => (!data.skills.is_empty()).then_some(SectionBody::Skills(&data.skills)),
        SectionId::Education => {
            (!data.education.is_empty()).then_some(SectionBody::Education(&data.education))
        }
        SectionId::Contact => Some(SectionBody::Contact(Contact {
            email: non_blank(data.email.as_deref()),
            phone: non_blank(data.phone.as_deref()),
            location: non_blank(data.location.as_deref()),
            birthday: non_blank(data.birthday.as_deref()),
        })),
    }
}

pub fn text_or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    non_blank(value).unwrap_or(fallback)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn initial(name: Option<&str>) -> String {
    let first = non_blank(name).and_then(|n| n.chars().next()).unwrap_or('U');
    first.to_uppercase().next().unwrap_or(first).to_string()
}

/// Lowercased scheme prefix with whitespace and control characters removed,
/// the way browsers normalise it before deciding what to execute.
fn scheme_of(url: &str) -> String {
    url.chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase()
}

fn safe_link(url: &str) -> Option<String> {
    let scheme = scheme_of(url);
    if ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|s| scheme.starts_with(s))
    {
        warn!("Dropping link with disallowed scheme");
        return None;
    }
    Some(url.to_string())
}

fn safe_image_src(url: &str) -> Option<String> {
    let scheme = scheme_of(url);
    if scheme.starts_with("data:") && !scheme.starts_with("data:image/") {
        return None;
    }
    if scheme.starts_with("javascript:") || scheme.starts_with("vbscript:") {
        return None;
    }
    Some(url.to_string())
}
