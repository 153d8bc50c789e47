//! A minimal virtual DOM for the live preview.
//!
//! Text nodes hold raw text; the consumer must insert them as text, never as
//! markup. `to_html` escapes on the way out.

use std::collections::BTreeMap;

use serde::Serialize;

use super::escape_html;

/// Elements with no closing tag.
const VOID_TAGS: &[&str] = &["img", "br", "hr", "meta", "input"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Element {
        tag: &'static str,
        /// Stable identity for keyed reconciliation, e.g. a placed element id.
        #[serde(skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        attrs: BTreeMap<&'static str, String>,
        children: Vec<Node>,
    },
    Text {
        text: String,
    },
}

impl Node {
    pub fn el(tag: &'static str) -> Self {
        Node::Element {
            tag,
            key: None,
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        if let Node::Element { attrs, .. } = &mut self {
            attrs.insert(name, value.into());
        }
        self
    }

    pub fn class(self, value: impl Into<String>) -> Self {
        self.attr("class", value)
    }

    pub fn key(mut self, value: impl Into<String>) -> Self {
        if let Node::Element { key, .. } = &mut self {
            *key = Some(value.into());
        }
        self
    }

    pub fn child(mut self, node: Node) -> Self {
        if let Node::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        if let Node::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    /// Appends a text child.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.child(Node::text(text))
    }
}

/// Tree queries used by the renderer tests.
#[cfg(test)]
impl Node {
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        match self {
            Node::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            Node::Text { .. } => None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|c| c.split_whitespace().any(|part| part == class))
    }

    /// Depth-first search, including `self`.
    pub fn find_all<'a>(&'a self, pred: &dyn Fn(&Node) -> bool) -> Vec<&'a Node> {
        let mut found = Vec::new();
        self.walk(&mut |node| {
            if pred(node) {
                found.push(node);
            }
        });
        found
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        self.find_all(&|n| n.get_attr("id") == Some(id)).into_iter().next()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.walk(&mut |node| {
            if let Node::Text { text } = node {
                out.push_str(text);
            }
        });
        out
    }

    fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        visit(self);
        if let Node::Element { children, .. } = self {
            for child in children {
                child.walk(visit);
            }
        }
    }
}

impl Node {
    /// Serializes the tree as markup with all text and attribute values escaped.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text { text } => out.push_str(&escape_html(text)),
            Node::Element {
                tag,
                attrs,
                children,
                ..
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push_str(&format!(" {name}=\"{}\"", escape_html(value)));
                }
                out.push('>');
                if VOID_TAGS.contains(tag) {
                    return;
                }
                for child in children {
                    child.write_html(out);
                }
                out.push_str(&format!("</{tag}>"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_queries() {
        let tree = Node::el("section")
            .attr("id", "about")
            .child(Node::el("p").class("lead muted").with_text("Hello "))
            .child(Node::el("span").with_text("world"));

        assert_eq!(tree.text_content(), "Hello world");
        assert!(tree.find_by_id("about").is_some());
        let leads = tree.find_all(&|n| n.has_class("muted"));
        assert_eq!(leads.len(), 1);
    }

    #[test]
    fn test_to_html_escapes_text_and_attrs() {
        let tree = Node::el("a")
            .attr("href", "x\" onclick=\"y")
            .with_text("<b>bold</b>");
        assert_eq!(
            tree.to_html(),
            "<a href=\"x&quot; onclick=&quot;y\">&lt;b&gt;bold&lt;/b&gt;</a>"
        );
    }

    #[test]
    fn test_void_tags_have_no_closing_tag() {
        let img = Node::el("img").attr("src", "a.png");
        assert_eq!(img.to_html(), "<img src=\"a.png\">");
    }

    #[test]
    fn test_serializes_with_kind_tag_and_optional_key() {
        let json = serde_json::to_value(Node::el("div").key("el-1").with_text("x")).unwrap();
        assert_eq!(json["kind"], "element");
        assert_eq!(json["key"], "el-1");
        assert_eq!(json["children"][0]["kind"], "text");

        let unkeyed = serde_json::to_value(Node::el("div")).unwrap();
        assert!(unkeyed.get("key").is_none());
    }
}
