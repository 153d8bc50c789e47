//! Live preview backend: builds a `Node` tree from a `PortfolioView`.
//!
//! Class names match the export backend so the in-app preview and the
//! downloaded document share one stylesheet vocabulary.

use super::compose::{
    text_or, Contact, Hero, PortfolioView, ResolvedElement, SectionBody, SectionView, SocialLinks,
    DEFAULT_DEGREE, DEFAULT_INSTITUTION,
};
use super::node::Node;
use crate::models::resume::{Education, Experience, Project, SectionId};
use crate::registry::{CustomElement, ElementKind, StepState};

/// Drop-target registration for a section.
#[derive(Debug, Clone, PartialEq)]
pub struct DropZone {
    pub accepts: Vec<ElementKind>,
}

/// Affordances offered on a rendered custom element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementActions {
    pub edit: bool,
    pub remove: bool,
}

/// Capability hooks the editor wires up. Every method defaults to "absent",
/// and rendering never depends on a hook being present.
pub trait InteractionHooks {
    fn drop_zone(&self, _section: SectionId) -> Option<DropZone> {
        None
    }

    fn element_actions(&self, _element_id: &str) -> Option<ElementActions> {
        None
    }
}

/// Read-only preview.
pub struct NoHooks;

impl InteractionHooks for NoHooks {}

/// Editing preview: every section accepts every kind, every element can be
/// edited and removed.
pub struct EditorHooks;

impl InteractionHooks for EditorHooks {
    fn drop_zone(&self, _section: SectionId) -> Option<DropZone> {
        Some(DropZone {
            accepts: ElementKind::ALL.to_vec(),
        })
    }

    fn element_actions(&self, _element_id: &str) -> Option<ElementActions> {
        Some(ElementActions {
            edit: true,
            remove: true,
        })
    }
}

pub fn render_page(view: &PortfolioView, hooks: &dyn InteractionHooks) -> Node {
    let nav = Node::el("div").class("nav-links").child(
        Node::el("button")
            .class("theme-toggle")
            .attr("data-action", "toggle-theme")
            .with_text(super::Theme::default().toggle_label()),
    );
    let nav = nav.children(view.nav().map(|id| {
        Node::el("a")
            .attr("href", format!("#{}", id.as_str()))
            .with_text(id.nav_label())
    }));

    let header = Node::el("header").child(
        Node::el("nav")
            .class("container")
            .child(Node::el("div").class("brand").with_text(view.title))
            .child(nav),
    );

    let main = Node::el("main")
        .class("container")
        .children(view.sections.iter().map(|s| render_section(s, &view.links, hooks)));

    Node::el("div").class("portfolio-root").child(header).child(main)
}

fn render_section(section: &SectionView, links: &SocialLinks, hooks: &dyn InteractionHooks) -> Node {
    let mut node = Node::el("section").attr("id", section.id.as_str());
    if section.id == SectionId::Hero {
        node = node.class("hero");
    }
    if let Some(zone) = hooks.drop_zone(section.id) {
        let accepts: Vec<_> = zone.accepts.iter().map(|k| k.tag()).collect();
        node = node
            .attr("data-drop-zone", section.id.as_str())
            .attr("data-accepts", accepts.join(" "));
    }

    node = node.children(section.elements.iter().map(|e| render_placed(e, hooks)));
    if section.id != SectionId::Hero {
        node = node.child(
            Node::el("div")
                .class("section-header")
                .child(Node::el("h2").with_text(section.id.heading()))
                .child(Node::el("div").class("section-divider")),
        );
    }

    match &section.body {
        SectionBody::Hero(hero) => node.child(hero_node(hero, links)),
        SectionBody::About { summary, skills } => node.child(about_node(summary, skills)),
        SectionBody::Experience(items) => node.children(items.iter().map(experience_node)),
        SectionBody::Projects(items) => node.child(
            Node::el("div")
                .class("projects-grid")
                .children(items.iter().map(project_node)),
        ),
        SectionBody::Skills(skills) => node.child(
            Node::el("div").class("skills-grid").children(skills.iter().map(|s| {
                Node::el("div")
                    .class("skill-card")
                    .child(Node::el("span").with_text(s.as_str()))
            })),
        ),
        SectionBody::Education(items) => node.children(items.iter().map(education_node)),
        SectionBody::Contact(contact) => node.child(contact_node(contact, links)),
    }
}

fn render_placed(placed: &ResolvedElement, hooks: &dyn InteractionHooks) -> Node {
    let mut node = Node::el("div")
        .class(format!("custom-element {}", placed.element.kind().tag()))
        .attr("data-element-id", placed.id)
        .key(placed.id);

    if let Some(actions) = hooks.element_actions(placed.id) {
        let mut toolbar = Node::el("div").class("element-actions");
        if actions.edit {
            toolbar = toolbar.child(action_button("edit", "Edit", placed.id));
        }
        if actions.remove {
            toolbar = toolbar.child(action_button("remove", "Remove", placed.id));
        }
        node = node.child(toolbar);
    }

    node.children(element_nodes(&placed.element))
}

fn action_button(action: &'static str, label: &'static str, element_id: &str) -> Node {
    Node::el("button")
        .attr("type", "button")
        .attr("data-action", action)
        .attr("data-element-id", element_id)
        .with_text(label)
}

fn element_nodes(element: &CustomElement) -> Vec<Node> {
    let body = match element {
        CustomElement::Wizard(props) => {
            let states = props.step_states();
            let last = states.len().saturating_sub(1);
            let mut container = Node::el("div").class("wizard-container");
            for (index, state) in states.iter().enumerate() {
                let number = index + 1;
                let marker = match state {
                    StepState::Completed => Node::el("span").class("wizard-check").with_text("✓"),
                    _ => Node::el("span")
                        .class("wizard-number")
                        .with_text(number.to_string()),
                };
                container = container.child(
                    Node::el("div").class("wizard-step-wrapper").child(
                        Node::el("div")
                            .class("wizard-step")
                            .child(
                                Node::el("div")
                                    .class(format!("wizard-circle {}", state.class()))
                                    .child(marker),
                            )
                            .child(
                                Node::el("span")
                                    .class(format!("wizard-label {}", state.class()))
                                    .with_text(format!("Step {number}")),
                            ),
                    ),
                );
                if index < last {
                    container = container
                        .child(Node::el("div").class(format!("wizard-connector {}", state.class())));
                }
            }
            container
        }
        CustomElement::Steps(props) => Node::el("div").class("steps-container").children(
            props.items.iter().enumerate().map(|(index, item)| {
                Node::el("div")
                    .class("step-item")
                    .child(Node::el("div").class("step-number").with_text((index + 1).to_string()))
                    .child(Node::el("div").class("step-content").with_text(item.as_str()))
            }),
        ),
        CustomElement::Timeline(props) => Node::el("div")
            .class("timeline-wrapper")
            .child(Node::el("div").class("timeline-line"))
            .child(Node::el("div").class("timeline-items").children(props.items.iter().map(
                |item| {
                    Node::el("div")
                        .class("timeline-item")
                        .child(Node::el("div").class("timeline-dot"))
                        .child(Node::el("div").class("timeline-content").with_text(item.as_str()))
                },
            ))),
        CustomElement::Stats(props) => Node::el("div").class("stats-grid").children(
            props.stats.iter().map(|stat| {
                Node::el("div")
                    .class("stat-item")
                    .child(Node::el("div").class("stat-value").with_text(stat.value.as_str()))
                    .child(Node::el("div").class("stat-label").with_text(stat.label.as_str()))
            }),
        ),
        CustomElement::Achievements(props) => Node::el("div").class("achievements-list").children(
            props.items.iter().map(|item| {
                Node::el("div")
                    .class("achievement-item")
                    .child(Node::el("span").class("achievement-icon").with_text("🏆"))
                    .child(Node::el("span").class("achievement-text").with_text(item.as_str()))
            }),
        ),
        CustomElement::Progress(props) => Node::el("div").class("progress-list").children(
            props.items.iter().map(|item| {
                Node::el("div")
                    .class("progress-item")
                    .child(
                        Node::el("div")
                            .class("progress-header")
                            .child(Node::el("span").class("progress-label").with_text(item.label.as_str()))
                            .child(
                                Node::el("span")
                                    .class("progress-percent")
                                    .with_text(format!("{}%", item.progress)),
                            ),
                    )
                    .child(
                        Node::el("div").class("progress-bar").child(
                            Node::el("div")
                                .class("progress-fill")
                                .attr("style", format!("width: {}%", item.progress)),
                        ),
                    )
            }),
        ),
    };
    vec![body]
}

fn hero_node(hero: &Hero, links: &SocialLinks) -> Node {
    let mut actions = Node::el("div").class("hero-actions").child(
        Node::el("a")
            .attr("href", "#contact")
            .class("btn btn-primary")
            .with_text("Get in Touch"),
    );
    if hero.show_projects_cta {
        actions = actions.child(
            Node::el("a")
                .attr("href", "#projects")
                .class("btn btn-outline")
                .with_text("View Projects"),
        );
    }

    let mut text = Node::el("div")
        .class("hero-text")
        .child(
            Node::el("h1")
                .with_text("Hi, I'm ")
                .child(Node::el("span").class("accent").with_text(hero.name)),
        )
        .child(Node::el("h2").class("hero-title").with_text(hero.title))
        .child(Node::el("p").class("hero-summary").with_text(hero.summary))
        .child(actions);

    let mut buttons = social_buttons(links);
    if let Some(email) = hero.email {
        buttons.push(
            Node::el("a")
                .attr("href", format!("mailto:{email}"))
                .class("social-btn")
                .with_text("Email"),
        );
    }
    if !buttons.is_empty() {
        text = text.child(Node::el("div").class("social-links").children(buttons));
    }

    let avatar = match &hero.avatar {
        Some(src) => Node::el("img")
            .attr("src", src.as_str())
            .attr("alt", hero.name)
            .class("avatar"),
        None => Node::el("div")
            .class("avatar-fallback")
            .with_text(hero.initial.as_str()),
    };

    Node::el("div")
        .class("hero-content")
        .child(text)
        .child(Node::el("div").class("hero-avatar").child(avatar))
}

fn social_buttons(links: &SocialLinks) -> Vec<Node> {
    links
        .labelled()
        .into_iter()
        .map(|(label, url)| {
            Node::el("a")
                .attr("href", url)
                .attr("target", "_blank")
                .attr("rel", "noopener noreferrer")
                .class("social-btn")
                .with_text(label)
        })
        .collect()
}

fn about_node(summary: &str, skills: &[String]) -> Node {
    let mut card = Node::el("div")
        .class("card")
        .child(Node::el("p").class("card-text").with_text(summary));
    if !skills.is_empty() {
        card = card
            .child(Node::el("h3").with_text("What I'm good at"))
            .child(Node::el("div").class("badges").children(
                skills
                    .iter()
                    .map(|s| Node::el("span").class("badge").with_text(s.as_str())),
            ));
    }
    card
}

fn experience_node(exp: &Experience) -> Node {
    Node::el("div")
        .class("card")
        .child(
            Node::el("div")
                .class("card-heading")
                .child(
                    Node::el("h3")
                        .child(Node::el("span").class("accent").with_text(exp.title.as_str()))
                        .with_text(" at ")
                        .child(Node::el("span").with_text(exp.company.as_str())),
                )
                .child(Node::el("span").class("badge").with_text(exp.duration.as_str())),
        )
        .child(
            Node::el("p")
                .class("card-text muted")
                .with_text(exp.description.as_str()),
        )
}

fn project_node(project: &Project) -> Node {
    let mut card = Node::el("div")
        .class("card")
        .child(Node::el("h3").with_text(project.title.as_str()))
        .child(
            Node::el("p")
                .class("card-text muted")
                .with_text(project.description.as_str()),
        );
    let technologies = project.technology_list();
    if !technologies.is_empty() {
        card = card.child(
            Node::el("div").class("badges").children(
                technologies
                    .into_iter()
                    .map(|t| Node::el("span").class("badge").with_text(t)),
            ),
        );
    }
    card
}

fn education_node(edu: &Education) -> Node {
    let mut card = Node::el("div")
        .class("card")
        .child(Node::el("h3").with_text(text_or(Some(edu.institution.as_str()), DEFAULT_INSTITUTION)))
        .child(
            Node::el("p")
                .class("card-text")
                .with_text(text_or(Some(edu.degree.as_str()), DEFAULT_DEGREE)),
        );
    if !edu.year.is_empty() {
        card = card.child(Node::el("span").class("badge").with_text(edu.year.as_str()));
    }
    card
}

fn contact_node(contact: &Contact, links: &SocialLinks) -> Node {
    let mut card = Node::el("div").class("card");
    if let Some(email) = contact.email {
        card = card.child(contact_row(
            "Email",
            Node::el("a").attr("href", format!("mailto:{email}")).with_text(email),
        ));
    }
    if let Some(phone) = contact.phone {
        let dial: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
        card = card.child(contact_row(
            "Phone",
            Node::el("a").attr("href", format!("tel:{dial}")).with_text(phone),
        ));
    }
    for (label, value) in [("Location", contact.location), ("Birthday", contact.birthday)] {
        if let Some(value) = value {
            card = card.child(contact_row(label, Node::el("span").with_text(value)));
        }
    }
    let buttons = social_buttons(links);
    if !buttons.is_empty() {
        card = card.child(
            Node::el("div")
                .class("social-profiles")
                .child(Node::el("p").class("contact-label").with_text("Social Profiles"))
                .child(Node::el("div").class("social-links").children(buttons)),
        );
    }
    card
}

fn contact_row(label: &'static str, value: Node) -> Node {
    Node::el("div")
        .class("contact-row")
        .child(Node::el("span").class("contact-label").with_text(label))
        .child(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{PlacedElement, ResumeData};
    use crate::render::{render_preview, Node};
    use serde_json::json;

    fn element(id: &str, kind: &str, section: &str) -> PlacedElement {
        PlacedElement {
            id: id.to_string(),
            kind: kind.to_string(),
            props: json!({}),
            section: section.to_string(),
        }
    }

    fn section_ids(page: &Node) -> Vec<String> {
        page.find_all(&|n| matches!(n, Node::Element { tag: "section", .. }))
            .into_iter()
            .filter_map(|n| n.get_attr("id").map(str::to_string))
            .collect()
    }

    #[test]
    fn test_renders_with_no_hooks() {
        let page = render_preview(&ResumeData::default(), None, &NoHooks);
        assert_eq!(section_ids(&page), vec!["hero", "about", "contact"]);
        assert!(page.find_all(&|n| n.get_attr("data-drop-zone").is_some()).is_empty());
    }

    #[test]
    fn test_editor_hooks_add_drop_zones_and_actions() {
        let data = ResumeData {
            custom_elements: vec![element("t-1", "timeline", "about")],
            ..Default::default()
        };
        let page = render_preview(&data, None, &EditorHooks);
        let zones = page.find_all(&|n| n.get_attr("data-drop-zone").is_some());
        assert_eq!(zones.len(), 3);

        let buttons = page.find_all(&|n| {
            n.get_attr("data-action").is_some() && n.get_attr("data-element-id") == Some("t-1")
        });
        let actions: Vec<_> = buttons.iter().filter_map(|b| b.get_attr("data-action")).collect();
        assert_eq!(actions, vec!["edit", "remove"]);
    }

    #[test]
    fn test_custom_elements_are_keyed_by_id() {
        let data = ResumeData {
            custom_elements: vec![element("s-1", "stats", "hero")],
            ..Default::default()
        };
        let page = render_preview(&data, None, &NoHooks);
        let keyed = page.find_all(&|n| matches!(n, Node::Element { key: Some(k), .. } if k == "s-1"));
        assert_eq!(keyed.len(), 1);
        assert!(keyed[0].has_class("stats"));
    }

    fn element_ids(node: &Node) -> Vec<&str> {
        node.find_all(&|n| n.get_attr("data-element-id").is_some())
            .into_iter()
            .filter_map(|n| n.get_attr("data-element-id"))
            .collect()
    }

    #[test]
    fn test_element_is_placed_inside_its_section() {
        let data = ResumeData {
            skills: vec!["Rust".into()],
            custom_elements: vec![element("p-1", "progress", "skills")],
            ..Default::default()
        };
        let page = render_preview(&data, None, &NoHooks);

        let skills = page.find_by_id("skills").unwrap();
        assert_eq!(element_ids(skills), vec!["p-1"]);
        for id in ["hero", "about", "contact"] {
            assert!(element_ids(page.find_by_id(id).unwrap()).is_empty());
        }
        assert_eq!(element_ids(&page), vec!["p-1"]);
    }

    #[test]
    fn test_element_for_unknown_section_is_absent() {
        let data = ResumeData {
            custom_elements: vec![element("side-1", "stats", "sidebar")],
            ..Default::default()
        };
        let page = render_preview(&data, None, &EditorHooks);

        assert!(element_ids(&page).is_empty());
        assert!(page
            .find_all(&|n| matches!(n, Node::Element { key: Some(k), .. } if k == "side-1"))
            .is_empty());
    }

    #[test]
    fn test_text_nodes_keep_raw_text() {
        let data = ResumeData {
            name: Some("<script>alert(1)</script>".into()),
            ..Default::default()
        };
        let page = render_preview(&data, None, &NoHooks);
        assert!(page.text_content().contains("<script>alert(1)</script>"));
        assert!(!page.to_html().contains("<script>"));
    }

    #[test]
    fn test_wizard_node_states() {
        let element = CustomElement::resolve("wizard", &json!({"steps": 5, "currentStep": 3})).unwrap();
        let node = Node::el("div").children(element_nodes(&element));
        let count = |class: &str| node.find_all(&|n| n.has_class("wizard-circle") && n.has_class(class)).len();
        assert_eq!(count("completed"), 2);
        assert_eq!(count("active"), 1);
        assert_eq!(count("pending"), 2);
    }

    #[test]
    fn test_phone_link_strips_whitespace() {
        let data = ResumeData {
            phone: Some("+1 555 0100".into()),
            ..Default::default()
        };
        let page = render_preview(&data, None, &NoHooks);
        let links = page.find_all(&|n| n.get_attr("href") == Some("tel:+15550100"));
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].text_content(), "+1 555 0100");
    }
}
