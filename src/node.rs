//! Defines the [`Node`] and [`Element`] types, a small markup tree used to
//! assemble every HTML document the generator emits. A tree is built once
//! (append-only), rendered as many times as needed, and then dropped.
//!
//! Two rendering contracts are supported:
//!
//! * [`Node::render`] produces compact markup with no whitespace between
//!   tags. This is what ends up on disk.
//! * [`Node::render_readable`] puts every child on its own line, indented two
//!   spaces deeper than its parent. It exists for diagnostics and tests.
//!
//! Attribute values and text payloads are emitted verbatim; callers are
//! expected to hand in markup that is already escaped.

use std::fmt;

/// Tag names which are rendered without a closing tag when they have no
/// children.
pub const STANDALONE: &[&str] = &["img", "link", "meta"];

/// Returns `true` if `name` is one of the [`STANDALONE`] tags.
pub fn is_standalone(name: &str) -> bool {
    STANDALONE.contains(&name)
}

/// A node in the markup tree: either a text leaf or a tagged element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// A text leaf. Rendered verbatim.
    Text(String),

    /// A tagged element with attributes and children.
    Element(Element),
}

impl Node {
    /// Creates a text leaf.
    pub fn text<S: Into<String>>(payload: S) -> Node {
        Node::Text(payload.into())
    }

    /// Creates an element node with no attributes and no children.
    pub fn element<S: Into<String>>(name: S) -> Node {
        Node::Element(Element::new(name))
    }

    /// Renders the node as compact markup.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_compact(&mut out);
        out
    }

    /// Renders the node with one child per line, indented by two spaces per
    /// level of nesting.
    pub fn render_readable(&self) -> String {
        let mut out = String::new();
        self.write_readable(0, &mut out);
        out
    }

    fn write_compact(&self, out: &mut String) {
        match self {
            Node::Text(payload) => out.push_str(payload),
            Node::Element(element) => element.write_compact(out),
        }
    }

    fn write_readable(&self, depth: usize, out: &mut String) {
        match self {
            Node::Text(payload) => out.push_str(payload),
            Node::Element(element) => element.write_readable(depth, out),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Node {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(payload: &str) -> Node {
        Node::text(payload)
    }
}

impl From<String> for Node {
    fn from(payload: String) -> Node {
        Node::Text(payload)
    }
}

impl fmt::Display for Node {
    /// Writes the compact rendering, or the readable one when the alternate
    /// flag (`{:#}`) is set.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            f.write_str(&self.render_readable())
        } else {
            f.write_str(&self.render())
        }
    }
}

/// A tagged element. Attributes are kept in insertion order and are never
/// de-duplicated: setting the same attribute twice emits it twice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Creates an element with no attributes and no children.
    pub fn new<S: Into<String>>(name: S) -> Element {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns `true` if this element's tag is in the [`STANDALONE`] set.
    pub fn is_standalone(&self) -> bool {
        is_standalone(&self.name)
    }

    /// Appends an attribute and returns the element for chaining.
    pub fn attr<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) -> &mut Element {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Attaches `child` and returns a reference to it.
    pub fn append<N: Into<Node>>(&mut self, child: N) -> &mut Node {
        self.children.push(child.into());
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Appends a text leaf and returns the element (not the leaf) so more
    /// content can be chained onto the parent.
    pub fn append_text<S: Into<String>>(&mut self, payload: S) -> &mut Element {
        self.children.push(Node::text(payload));
        self
    }

    /// Creates a child element called `name`, attaches it, and returns the
    /// child.
    pub fn append_element<S: Into<String>>(&mut self, name: S) -> &mut Element {
        self.children.push(Node::element(name));
        match self.children.last_mut() {
            Some(Node::Element(element)) => element,
            _ => unreachable!("an element was just appended"),
        }
    }

    /// Consuming variant of [`Element::attr`].
    pub fn with_attr<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Element {
        self.attr(name, value);
        self
    }

    /// Consuming variant of [`Element::append_text`].
    pub fn with_text<S: Into<String>>(mut self, payload: S) -> Element {
        self.append_text(payload);
        self
    }

    /// Consuming variant of [`Element::append`].
    pub fn with_child<N: Into<Node>>(mut self, child: N) -> Element {
        self.children.push(child.into());
        self
    }

    /// Renders the element as compact markup. See [`Node::render`].
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_compact(&mut out);
        out
    }

    /// Renders the element one child per line. See [`Node::render_readable`].
    pub fn render_readable(&self) -> String {
        let mut out = String::new();
        self.write_readable(0, &mut out);
        out
    }

    fn write_open_tag(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(value);
            out.push('"');
        }
    }

    fn write_close_tag(&self, out: &mut String) {
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    fn write_compact(&self, out: &mut String) {
        self.write_open_tag(out);
        out.push('>');
        if self.children.is_empty() && self.is_standalone() {
            return;
        }
        for child in &self.children {
            child.write_compact(out);
        }
        self.write_close_tag(out);
    }

    fn write_readable(&self, depth: usize, out: &mut String) {
        self.write_open_tag(out);
        if self.children.is_empty() && self.is_standalone() {
            out.push_str(" />");
            return;
        }
        out.push('>');
        for child in &self.children {
            out.push('\n');
            indent(depth + 1, out);
            child.write_readable(depth + 1, out);
        }
        out.push('\n');
        indent(depth, out);
        self.write_close_tag(out);
    }
}

impl fmt::Display for Element {
    /// Same contract as the [`fmt::Display`] impl for [`Node`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            f.write_str(&self.render_readable())
        } else {
            f.write_str(&self.render())
        }
    }
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_render_text() {
        assert_eq!("hello world", Node::text("hello world").render());
    }

    #[test]
    fn test_render_nested_text() {
        let mut p = Element::new("p");
        p.append_text("hello").append_text(" world");
        assert_eq!("<p>hello world</p>", p.render());
    }

    #[test]
    fn test_render_nested_elements() {
        let mut div = Element::new("div");
        div.append_element("p").append_text("hello world");
        assert_eq!("<div><p>hello world</p></div>", div.render());
    }

    #[test]
    fn test_render_attributes_in_call_order() {
        let mut div = Element::new("div");
        div.attr("style", "background-color:black;").attr("id", "test");
        assert_eq!(
            r#"<div style="background-color:black;" id="test"></div>"#,
            div.render()
        );
    }

    #[test]
    fn test_render_duplicate_attributes() {
        let mut meta = Element::new("meta");
        meta.attr("name", "a").attr("name", "b");
        assert_eq!(r#"<meta name="a" name="b">"#, meta.render());
    }

    #[test]
    fn test_render_copyright_div() {
        let div = Element::new("div").with_attr("class", "copyright").with_text("hi");
        assert_eq!(r#"<div class="copyright">hi</div>"#, div.render());
    }

    #[test]
    fn test_render_standalone() {
        let link = Element::new("link")
            .with_attr("rel", "icon")
            .with_attr("href", "/a.png");
        assert_eq!(r#"<link rel="icon" href="/a.png">"#, link.render());
        assert_eq!("<img>", Node::element("img").render());
    }

    #[test]
    fn test_render_standalone_with_children_is_closed() {
        let link = Element::new("link").with_text("x");
        assert_eq!("<link>x</link>", link.render());
    }

    #[test]
    fn test_render_empty_non_standalone_is_closed() {
        assert_eq!("<script></script>", Node::element("script").render());
    }

    #[test]
    fn test_render_simple_dom() {
        let mut html = Element::new("html");
        html.attr("lang", "en")
            .append_element("head")
            .append_element("title")
            .append_text("Hello World");
        html.append_element("body")
            .append_element("div")
            .append_element("p")
            .append_text("works!");
        assert_eq!(
            r#"<html lang="en"><head><title>Hello World</title></head><body><div><p>works!</p></div></body></html>"#,
            html.render()
        );
    }

    #[test]
    fn test_append_returns_child() {
        let mut ul = Element::new("ul");
        if let Node::Element(li) = ul.append(Element::new("li")) {
            li.append_text("one");
        }
        assert_eq!("<ul><li>one</li></ul>", ul.render());
    }

    #[test]
    fn test_render_is_repeatable() {
        let mut body = Element::new("body");
        body.append_element("main").attr("id", "m").append_text("x");
        let node = Node::from(body);
        let first = node.render();
        assert_eq!(first, node.render());
        assert_eq!(node.render_readable(), node.render_readable());
    }

    #[test]
    fn test_render_readable() {
        let mut div = Element::new("div");
        div.attr("class", "c");
        div.append_element("p").append_text("hello");
        div.append(Element::new("img").with_attr("src", "a.png"));
        div.append_text("bye");

        let wanted = "<div class=\"c\">\n  <p>\n    hello\n  </p>\n  <img src=\"a.png\" />\n  bye\n</div>";
        assert_eq!(wanted, div.render_readable());
        assert_eq!(wanted, format!("{:#}", Node::from(div)));
    }

    #[test]
    fn test_render_readable_empty_element() {
        assert_eq!("<nav>\n</nav>", Element::new("nav").render_readable());
    }

    #[test]
    fn test_display_is_compact() {
        let node = Node::from(Element::new("b").with_text("x"));
        assert_eq!("<b>x</b>", node.to_string());
    }
}
