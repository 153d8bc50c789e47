//! Static export backend: turns a `PortfolioView` into one self-contained
//! HTML document. All resume-derived text passes through `escape_html`.

use super::assets::{theme_script, STYLESHEET};
use super::compose::{
    text_or, Contact, Hero, PortfolioView, ResolvedElement, SectionBody, SectionView, SocialLinks,
    DEFAULT_DEGREE, DEFAULT_INSTITUTION,
};
use super::{escape_html as esc, ExportOptions, Theme};
use crate::models::resume::{Education, Experience, Project, SectionId};
use crate::registry::{CustomElement, StepState};

pub fn render_document(view: &PortfolioView, options: &ExportOptions) -> String {
    let mut out = String::with_capacity(24 * 1024);

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"UTF-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    out.push_str(&format!("<title>{} - Portfolio</title>\n", esc(view.title)));
    out.push_str("<style>");
    out.push_str(STYLESHEET);
    out.push_str("</style>\n</head>\n");

    let body_class = match options.default_theme {
        Theme::Dark => " class=\"dark\"",
        Theme::Light => "",
    };
    out.push_str(&format!("<body{body_class}>\n"));
    push_header(&mut out, view, options.default_theme);

    out.push_str("<main class=\"container\">\n");
    for section in &view.sections {
        push_section(&mut out, section, &view.links);
    }
    out.push_str("</main>\n");

    out.push_str("<script>");
    out.push_str(&theme_script(options));
    out.push_str("</script>\n</body>\n</html>\n");
    out
}

fn push_header(out: &mut String, view: &PortfolioView, theme: Theme) {
    out.push_str("<header>\n<nav class=\"container\">\n");
    out.push_str(&format!("<div class=\"brand\">{}</div>\n", esc(view.title)));
    out.push_str("<div class=\"nav-links\">\n");
    out.push_str(&format!(
        "<button class=\"theme-toggle\" id=\"themeToggle\" type=\"button\">{}</button>\n",
        theme.toggle_label()
    ));
    for id in view.nav() {
        out.push_str(&format!(
            "<a href=\"#{}\">{}</a>\n",
            id.as_str(),
            id.nav_label()
        ));
    }
    out.push_str("</div>\n</nav>\n</header>\n");
}

fn push_section(out: &mut String, section: &SectionView, links: &SocialLinks) {
    let class = if section.id == SectionId::Hero {
        " class=\"hero\""
    } else {
        ""
    };
    out.push_str(&format!("<section id=\"{}\"{class}>\n", section.id.as_str()));
    for placed in &section.elements {
        push_placed(out, placed);
    }
    if section.id != SectionId::Hero {
        out.push_str(&format!(
            "<div class=\"section-header\"><h2>{}</h2><div class=\"section-divider\"></div></div>\n",
            section.id.heading()
        ));
    }

    match &section.body {
        SectionBody::Hero(hero) => push_hero(out, hero, links),
        SectionBody::About { summary, skills } => push_about(out, summary, skills),
        SectionBody::Experience(items) => items.iter().for_each(|e| push_experience(out, e)),
        SectionBody::Projects(items) => {
            out.push_str("<div class=\"projects-grid\">\n");
            items.iter().for_each(|p| push_project(out, p));
            out.push_str("</div>\n");
        }
        SectionBody::Skills(skills) => {
            out.push_str("<div class=\"skills-grid\">\n");
            for skill in skills.iter() {
                out.push_str(&format!("<div class=\"skill-card\"><span>{}</span></div>\n", esc(skill)));
            }
            out.push_str("</div>\n");
        }
        SectionBody::Education(items) => items.iter().for_each(|e| push_education(out, e)),
        SectionBody::Contact(contact) => push_contact(out, contact, links),
    }
    out.push_str("</section>\n");
}

fn push_placed(out: &mut String, placed: &ResolvedElement) {
    out.push_str(&format!(
        "<div class=\"custom-element {}\" data-element-id=\"{}\">",
        placed.element.kind().tag(),
        esc(placed.id)
    ));
    push_element_body(out, &placed.element);
    out.push_str("</div>\n");
}

/// Renders one registry element as a standalone fragment.
pub fn render_element(element: &CustomElement) -> String {
    let mut out = format!("<div class=\"custom-element {}\">", element.kind().tag());
    push_element_body(&mut out, element);
    out.push_str("</div>");
    out
}

fn push_element_body(out: &mut String, element: &CustomElement) {
    match element {
        CustomElement::Wizard(props) => {
            out.push_str("<div class=\"wizard-container\">");
            let states = props.step_states();
            let last = states.len().saturating_sub(1);
            for (index, state) in states.iter().enumerate() {
                let number = index + 1;
                let marker = match state {
                    StepState::Completed => "<span class=\"wizard-check\">✓</span>".to_string(),
                    _ => format!("<span class=\"wizard-number\">{number}</span>"),
                };
                out.push_str(&format!(
                    "<div class=\"wizard-step-wrapper\"><div class=\"wizard-step\">\
                     <div class=\"wizard-circle {state}\">{marker}</div>\
                     <span class=\"wizard-label {state}\">Step {number}</span>\
                     </div></div>",
                    state = state.class()
                ));
                if index < last {
                    out.push_str(&format!(
                        "<div class=\"wizard-connector {}\"></div>",
                        state.class()
                    ));
                }
            }
            out.push_str("</div>");
        }
        CustomElement::Steps(props) => {
            out.push_str("<div class=\"steps-container\">");
            for (index, item) in props.items.iter().enumerate() {
                out.push_str(&format!(
                    "<div class=\"step-item\"><div class=\"step-number\">{}</div>\
                     <div class=\"step-content\">{}</div></div>",
                    index + 1,
                    esc(item)
                ));
            }
            out.push_str("</div>");
        }
        CustomElement::Timeline(props) => {
            out.push_str("<div class=\"timeline-wrapper\"><div class=\"timeline-line\"></div><div class=\"timeline-items\">");
            for item in &props.items {
                out.push_str(&format!(
                    "<div class=\"timeline-item\"><div class=\"timeline-dot\"></div>\
                     <div class=\"timeline-content\">{}</div></div>",
                    esc(item)
                ));
            }
            out.push_str("</div></div>");
        }
        CustomElement::Stats(props) => {
            out.push_str("<div class=\"stats-grid\">");
            for stat in &props.stats {
                out.push_str(&format!(
                    "<div class=\"stat-item\"><div class=\"stat-value\">{}</div>\
                     <div class=\"stat-label\">{}</div></div>",
                    esc(&stat.value),
                    esc(&stat.label)
                ));
            }
            out.push_str("</div>");
        }
        CustomElement::Achievements(props) => {
            out.push_str("<div class=\"achievements-list\">");
            for item in &props.items {
                out.push_str(&format!(
                    "<div class=\"achievement-item\"><span class=\"achievement-icon\">🏆</span>\
                     <span class=\"achievement-text\">{}</span></div>",
                    esc(item)
                ));
            }
            out.push_str("</div>");
        }
        CustomElement::Progress(props) => {
            out.push_str("<div class=\"progress-list\">");
            for item in &props.items {
                out.push_str(&format!(
                    "<div class=\"progress-item\"><div class=\"progress-header\">\
                     <span class=\"progress-label\">{label}</span>\
                     <span class=\"progress-percent\">{pct}%</span></div>\
                     <div class=\"progress-bar\"><div class=\"progress-fill\" style=\"width: {pct}%\"></div></div></div>",
                    label = esc(&item.label),
                    pct = item.progress
                ));
            }
            out.push_str("</div>");
        }
    }
}

fn push_hero(out: &mut String, hero: &Hero, links: &SocialLinks) {
    out.push_str("<div class=\"hero-content\">\n<div class=\"hero-text\">\n");
    out.push_str(&format!(
        "<h1>Hi, I'm <span class=\"accent\">{}</span></h1>\n",
        esc(hero.name)
    ));
    out.push_str(&format!("<h2 class=\"hero-title\">{}</h2>\n", esc(hero.title)));
    out.push_str(&format!("<p class=\"hero-summary\">{}</p>\n", esc(hero.summary)));

    out.push_str("<div class=\"hero-actions\">");
    out.push_str("<a href=\"#contact\" class=\"btn btn-primary\">Get in Touch</a>");
    if hero.show_projects_cta {
        out.push_str("<a href=\"#projects\" class=\"btn btn-outline\">View Projects</a>");
    }
    out.push_str("</div>\n");

    let labelled = links.labelled();
    if !labelled.is_empty() || hero.email.is_some() {
        out.push_str("<div class=\"social-links\">");
        push_social_buttons(out, &labelled);
        if let Some(email) = hero.email {
            out.push_str(&format!(
                "<a href=\"mailto:{}\" class=\"social-btn\">Email</a>",
                esc(email)
            ));
        }
        out.push_str("</div>\n");
    }
    out.push_str("</div>\n<div class=\"hero-avatar\">");
    match &hero.avatar {
        Some(src) => out.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\" class=\"avatar\">",
            esc(src),
            esc(hero.name)
        )),
        None => out.push_str(&format!(
            "<div class=\"avatar-fallback\">{}</div>",
            esc(&hero.initial)
        )),
    }
    out.push_str("</div>\n</div>\n");
}

fn push_social_buttons(out: &mut String, labelled: &[(&str, &str)]) {
    for (label, url) in labelled {
        out.push_str(&format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"social-btn\">{label}</a>",
            esc(url)
        ));
    }
}

fn push_about(out: &mut String, summary: &str, skills: &[String]) {
    out.push_str("<div class=\"card\">\n");
    out.push_str(&format!("<p class=\"card-text\">{}</p>\n", esc(summary)));
    if !skills.is_empty() {
        out.push_str("<h3>What I'm good at</h3>\n<div class=\"badges\">");
        for skill in skills {
            out.push_str(&format!("<span class=\"badge\">{}</span>", esc(skill)));
        }
        out.push_str("</div>\n");
    }
    out.push_str("</div>\n");
}

fn push_experience(out: &mut String, exp: &Experience) {
    out.push_str(&format!(
        "<div class=\"card\">\n<div class=\"card-heading\">\
         <h3><span class=\"accent\">{}</span> at <span>{}</span></h3>\
         <span class=\"badge\">{}</span></div>\n\
         <p class=\"card-text muted\">{}</p>\n</div>\n",
        esc(&exp.title),
        esc(&exp.company),
        esc(&exp.duration),
        esc(&exp.description)
    ));
}

fn push_project(out: &mut String, project: &Project) {
    out.push_str(&format!(
        "<div class=\"card\">\n<h3>{}</h3>\n<p class=\"card-text muted\">{}</p>\n",
        esc(&project.title),
        esc(&project.description)
    ));
    let technologies = project.technology_list();
    if !technologies.is_empty() {
        out.push_str("<div class=\"badges\">");
        for tech in technologies {
            out.push_str(&format!("<span class=\"badge\">{}</span>", esc(tech)));
        }
        out.push_str("</div>\n");
    }
    out.push_str("</div>\n");
}

fn push_education(out: &mut String, edu: &Education) {
    out.push_str(&format!(
        "<div class=\"card\">\n<h3>{}</h3>\n<p class=\"card-text\">{}</p>\n",
        esc(text_or(Some(edu.institution.as_str()), DEFAULT_INSTITUTION)),
        esc(text_or(Some(edu.degree.as_str()), DEFAULT_DEGREE))
    ));
    if !edu.year.is_empty() {
        out.push_str(&format!("<span class=\"badge\">{}</span>\n", esc(&edu.year)));
    }
    out.push_str("</div>\n");
}

fn push_contact(out: &mut String, contact: &Contact, links: &SocialLinks) {
    out.push_str("<div class=\"card\">\n");
    if let Some(email) = contact.email {
        out.push_str(&format!(
            "<div class=\"contact-row\"><span class=\"contact-label\">Email</span>\
             <a href=\"mailto:{0}\">{0}</a></div>\n",
            esc(email)
        ));
    }
    let rows = [
        ("Phone", contact.phone),
        ("Location", contact.location),
        ("Birthday", contact.birthday),
    ];
    for (label, value) in rows {
        if let Some(value) = value {
            out.push_str(&format!(
                "<div class=\"contact-row\"><span class=\"contact-label\">{label}</span><span>{}</span></div>\n",
                esc(value)
            ));
        }
    }
    let labelled = links.labelled();
    if !labelled.is_empty() {
        out.push_str("<div class=\"social-profiles\"><p class=\"contact-label\">Social Profiles</p><div class=\"social-links\">");
        push_social_buttons(out, &labelled);
        out.push_str("</div></div>\n");
    }
    out.push_str("</div>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{PlacedElement, ResumeData};
    use crate::render::{compose, render_export};
    use serde_json::json;

    fn export(data: &ResumeData) -> String {
        render_export(data, None, &ExportOptions::default())
    }

    fn element(id: &str, kind: &str, section: &str, props: serde_json::Value) -> PlacedElement {
        PlacedElement {
            id: id.to_string(),
            kind: kind.to_string(),
            props,
            section: section.to_string(),
        }
    }

    /// The slice of the document between `<section id="{id}"` and its closing tag.
    fn section_html<'a>(html: &'a str, id: &str) -> Option<&'a str> {
        let start = html.find(&format!("<section id=\"{id}\""))?;
        let len = html[start..].find("</section>")?;
        Some(&html[start..start + len])
    }

    #[test]
    fn test_document_is_self_contained() {
        let html = export(&ResumeData::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<style>"));
        assert!(html.contains("id=\"themeToggle\""));
        assert!(!html.contains("<link"));
        assert!(!html.contains("<script src"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_script_injection_in_name_is_escaped() {
        let data = ResumeData {
            name: Some("<script>alert(1)</script>".into()),
            summary: Some("Tom & \"Jerry\" 'quoted'".into()),
            ..Default::default()
        };
        let html = export(&data);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("Tom &amp; &quot;Jerry&quot; &#039;quoted&#039;"));
        // Only the theme script opens a script element.
        assert_eq!(html.matches("<script>").count(), 1);
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let data = ResumeData {
            linkedin_url: Some("https://x.test/\" onmouseover=\"alert(1)".into()),
            avatar: Some("a.png\" onerror=\"alert(1)".into()),
            ..Default::default()
        };
        let html = export(&data);
        assert!(!html.contains("\" onmouseover=\""));
        assert!(!html.contains("\" onerror=\""));
        assert!(html.contains("&quot; onerror=&quot;alert(1)"));
    }

    #[test]
    fn test_empty_experience_omits_section() {
        let html = export(&ResumeData::default());
        assert!(section_html(&html, "experience").is_none());
        assert!(!html.contains("Work Experience"));
        assert!(!html.contains("href=\"#experience\""));
        assert!(section_html(&html, "hero").is_some());
        assert!(section_html(&html, "about").is_some());
        assert!(section_html(&html, "contact").is_some());
    }

    #[test]
    fn test_technologies_render_as_trimmed_badges() {
        let data = ResumeData {
            projects: vec![Project {
                title: "Folio".into(),
                description: "Portfolio builder".into(),
                technologies: "React, Node.js,  PostgreSQL".into(),
            }],
            ..Default::default()
        };
        let html = export(&data);
        let projects = section_html(&html, "projects").unwrap();
        assert_eq!(projects.matches("<span class=\"badge\">").count(), 3);
        for tech in ["React", "Node.js", "PostgreSQL"] {
            assert!(projects.contains(&format!("<span class=\"badge\">{tech}</span>")));
        }
    }

    #[test]
    fn test_element_placed_only_in_its_section() {
        let data = ResumeData {
            skills: vec!["Rust".into()],
            experience: vec![Experience::default()],
            custom_elements: vec![
                element("stats-1", "stats", "skills", json!({})),
                element("lost", "timeline", "sidebar", json!({})),
            ],
            ..Default::default()
        };
        let html = export(&data);
        assert_eq!(html.matches("data-element-id=\"stats-1\"").count(), 1);
        assert!(section_html(&html, "skills").unwrap().contains("data-element-id=\"stats-1\""));
        assert!(!html.contains("data-element-id=\"lost\""));
    }

    #[test]
    fn test_wizard_fragment_marks_step_states() {
        let element = CustomElement::resolve("wizard", &json!({"steps": 5, "currentStep": 3})).unwrap();
        let html = render_element(&element);
        assert_eq!(html.matches("wizard-circle completed").count(), 2);
        assert_eq!(html.matches("wizard-circle active").count(), 1);
        assert_eq!(html.matches("wizard-circle pending").count(), 2);
        assert_eq!(html.matches("wizard-connector").count(), 4);
        assert_eq!(html.matches('✓').count(), 2);
    }

    #[test]
    fn test_element_text_is_escaped() {
        let element = CustomElement::resolve(
            "stats",
            &json!({"stats": [{"label": "<b>x</b>", "value": "<i>1</i>"}]}),
        )
        .unwrap();
        let html = render_element(&element);
        assert!(html.contains("&lt;b&gt;x&lt;/b&gt;"));
        assert!(!html.contains("<i>"));
    }

    #[test]
    fn test_light_default_theme() {
        let options = ExportOptions {
            default_theme: Theme::Light,
            ..Default::default()
        };
        let html = render_document(&compose(&ResumeData::default(), None), &options);
        assert!(html.contains("<body>"));
        assert!(html.contains(">Dark Mode</button>"));

        let dark = export(&ResumeData::default());
        assert!(dark.contains("<body class=\"dark\">"));
        assert!(dark.contains(">Light Mode</button>"));
    }

    #[test]
    fn test_contact_rows_and_social_profiles() {
        let data = ResumeData {
            email: Some("ada@example.com".into()),
            phone: Some("+44 20 0000".into()),
            github_url: Some("https://github.com/ada".into()),
            ..Default::default()
        };
        let html = export(&data);
        let contact = section_html(&html, "contact").unwrap();
        assert!(contact.contains("mailto:ada@example.com"));
        assert!(contact.contains("+44 20 0000"));
        assert!(contact.contains("Social Profiles"));
        assert!(!contact.contains("Location"));

        let bare = export(&ResumeData::default());
        assert!(!section_html(&bare, "contact").unwrap().contains("Social Profiles"));
    }
}
