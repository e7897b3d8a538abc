//! Composes complete HTML documents out of [`crate::node`] fragments.
//!
//! A [`Document`] is just a head, a body, and the doctype; a
//! [`DocumentBuilder`] layers the site's conventions on top of it: the
//! baseline head fragments every page carries ([`DocumentBuilder::initialize`]),
//! titles, the copyright notice, and the footer navigation.

use crate::config::Site;
use crate::node::{Element, Node};
use chrono::{Datelike, Local, NaiveDateTime, Timelike};

/// The doctype literal every document starts with.
pub const DOCTYPE: &str = "<!doctype html>";

const ANDROID_ICON_SIZES: &[&str] = &["192x192"];
const FAVICON_SIZES: &[&str] = &["32x32", "96x96", "16x16"];
const APPLE_ICON_SIZES: &[&str] = &[
    "57x57", "60x60", "72x72", "76x76", "114x114", "120x120", "144x144", "152x152", "180x180",
];
const JQUERY: &str = "https://ajax.googleapis.com/ajax/libs/jquery/3.2.1/jquery.min.js";

/// A bare document: doctype, `<head>` and `<body>`.
#[derive(Clone, Debug)]
pub struct Document {
    head: Element,
    body: Element,
}

impl Default for Document {
    fn default() -> Self {
        Document {
            head: Element::new("head"),
            body: Element::new("body"),
        }
    }
}

impl Document {
    pub fn new() -> Document {
        Document::default()
    }

    pub fn add_to_head<N: Into<Node>>(&mut self, node: N) {
        self.head.append(node);
    }

    pub fn add_to_body<N: Into<Node>>(&mut self, node: N) {
        self.body.append(node);
    }

    pub fn head(&self) -> &Element {
        &self.head
    }

    pub fn body(&self) -> &Element {
        &self.body
    }

    fn root(&self) -> Element {
        Element::new("html")
            .with_attr("lang", "en")
            .with_child(self.head.clone())
            .with_child(self.body.clone())
    }

    /// Renders the doctype followed by the compact `<html>` tree.
    pub fn render(&self) -> String {
        format!("{}\n{}", DOCTYPE, self.root().render())
    }

    /// Like [`Document::render`], but with the readable tree layout.
    pub fn render_readable(&self) -> String {
        format!("{}\n{}", DOCTYPE, self.root().render_readable())
    }
}

/// Builds a [`Document`] following the site's conventions.
pub struct DocumentBuilder<'a> {
    site: &'a Site,
    document: Document,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(site: &'a Site) -> DocumentBuilder<'a> {
        DocumentBuilder {
            site,
            document: Document::new(),
        }
    }

    /// Appends the baseline head fragments in their fixed order: the
    /// descriptive meta tags, the content-type, the icon links, and the
    /// jQuery include. Nothing is de-duplicated, so call this exactly once
    /// per document and before any other head fragment.
    pub fn initialize(&mut self) {
        self.add_standard_meta();
        self.add_icon_links("icon", Some("image/png"), "android-icon", ANDROID_ICON_SIZES);
        self.add_icon_links("icon", Some("image/png"), "favicon", FAVICON_SIZES);
        self.add_icon_links("apple-touch-icon", None, "apple-icon", APPLE_ICON_SIZES);
        self.add_script(JQUERY);
    }

    fn add_standard_meta(&mut self) {
        let site = self.site;
        self.add_name_value_metas(&[
            ("viewport", "width=device-width, initial-scale=1.0"),
            ("robots", "index,follow"),
            ("author", site.author.as_str()),
            ("publisher", site.author.as_str()),
            ("keywords", site.keywords.as_str()),
            ("DC.Subject", site.subject.as_str()),
            ("page-topic", site.topic.as_str()),
        ]);
        self.add_head(
            Element::new("meta")
                .with_attr("http-equiv", "content-type")
                .with_attr("content", "text/html;charset=UTF-8"),
        );
    }

    fn add_icon_links(&mut self, rel: &str, kind: Option<&str>, prefix: &str, sizes: &[&str]) {
        for size in sizes {
            let mut link = Element::new("link");
            link.attr("rel", rel);
            if let Some(kind) = kind {
                link.attr("type", kind);
            }
            link.attr("sizes", *size)
                .attr("href", format!("/icons/{}-{}.png", prefix, size));
            self.add_head(link);
        }
    }

    /// Adds one `<meta {name}="{value}">` per pair. Note that the pair's
    /// first member is the attribute *name*, e.g. `("robots", "index")`
    /// yields `<meta robots="index">`.
    pub fn add_name_value_metas(&mut self, metas: &[(&str, &str)]) {
        for (name, value) in metas {
            self.add_head(Element::new("meta").with_attr(*name, *value));
        }
    }

    /// Adds a `<meta>` with the given attribute pairs, in order.
    pub fn add_meta(&mut self, attributes: &[(&str, &str)]) {
        let mut meta = Element::new("meta");
        for (name, value) in attributes {
            meta.attr(*name, *value);
        }
        self.add_head(meta);
    }

    pub fn add_title(&mut self, text: &str) {
        self.add_head(Element::new("title").with_text(text));
    }

    pub fn add_stylesheet(&mut self, href: &str) {
        self.add_head(
            Element::new("link")
                .with_attr("rel", "stylesheet")
                .with_attr("href", href)
                .with_attr("type", "text/css"),
        );
    }

    pub fn add_script(&mut self, src: &str) {
        self.add_head(Element::new("script").with_attr("src", src));
    }

    pub fn add_head<N: Into<Node>>(&mut self, node: N) {
        self.document.add_to_head(node);
    }

    pub fn add_body<N: Into<Node>>(&mut self, node: N) {
        self.document.add_to_body(node);
    }

    /// Adds the copyright notice covering the years from the site's `since`
    /// year through `year`.
    pub fn add_copyright_notice(&mut self, year: i32) {
        self.add_body(Element::new("div").with_attr("class", "copyright").with_text(format!(
            "All content including but not limited to the art, characters, story, \
             website design &amp; graphics are &copy; copyright {}-{} {} unless otherwise \
             stated. All rights reserved. Do not copy, alter or reuse without expressed \
             written permission.",
            self.site.since, year, self.site.author
        )));
    }

    /// Adds the cookie notice bar if the site has a cookie policy.
    pub fn add_cookie_notice(&mut self) {
        let site = self.site;
        if let Some(policy) = &site.cookie_policy {
            self.add_body(Element::new("div").with_attr("id", "cookie-law-info-bar").with_text(
                format!(
                    "This website uses cookies to improve your experience. We'll assume you're \
                     ok with this, but you can opt-out if you wish.\
                     <a href=\"#\" id=\"cookie_action_close_header\" \
                     class=\"medium cli-plugin-button cli-plugin-main-button\">Accept</a> \
                     <a href=\"{}\" id=\"CONSTANT_OPEN_URL\" target=\"_blank\" \
                     class=\"cli-plugin-main-link\">Read More</a>",
                    policy
                ),
            ));
        }
    }

    pub fn add_newsletter(&mut self) {
        if self.site.newsletter {
            self.add_body(
                Element::new("div").with_attr("class", "nl_container nl_container_hidden"),
            );
        }
    }

    /// Wraps `markup` in `<footer><nav>…</nav></footer>`.
    pub fn add_footer_navigation(&mut self, markup: &str) {
        let mut footer = Element::new("footer");
        footer.append_element("nav").append_text(markup);
        self.add_body(footer);
    }

    /// The cache-busting token for asset URLs, computed from the local clock
    /// every time it is requested.
    pub fn version(&self) -> String {
        version_token(&Local::now().naive_local())
    }

    pub fn render(&self) -> String {
        self.document.render()
    }

    pub fn render_readable(&self) -> String {
        self.document.render_readable()
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

/// Formats `at` as `YYYYMMDDTHHMMSS`.
pub fn version_token(at: &NaiveDateTime) -> String {
    format!(
        "{}{:02}{:02}T{:02}{:02}{:02}",
        at.year(),
        at.month(),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_render_document() {
        let mut document = Document::new();
        document.add_to_head(Element::new("title").with_text("Hello World"));
        document.add_to_body(Element::new("div").with_text("yo"));
        assert_eq!(
            "<!doctype html>\n<html lang=\"en\"><head><title>Hello World</title></head><body><div>yo</div></body></html>",
            document.render()
        );
        assert_eq!(document.render(), document.render());
    }

    #[test]
    fn test_render_document_readable() {
        let mut document = Document::new();
        document.add_to_body(Element::new("p").with_text("yo"));
        assert_eq!(
            "<!doctype html>\n<html lang=\"en\">\n  <head>\n  </head>\n  <body>\n    <p>\n      yo\n    </p>\n  </body>\n</html>",
            document.render_readable()
        );
    }

    #[test]
    fn test_initialize_order() {
        let site = Site::fixture();
        let mut builder = DocumentBuilder::new(&site);
        builder.initialize();
        let head = builder.into_document().head().clone();
        let children = head.children();

        // 7 name/value metas, content type, 1 android, 3 favicons, 9 apple
        // icons, jquery
        assert_eq!(22, children.len());
        assert_eq!(
            r#"<meta viewport="width=device-width, initial-scale=1.0">"#,
            children[0].render()
        );
        assert_eq!(
            r#"<meta http-equiv="content-type" content="text/html;charset=UTF-8">"#,
            children[7].render()
        );
        assert_eq!(
            r#"<link rel="icon" type="image/png" sizes="192x192" href="/icons/android-icon-192x192.png">"#,
            children[8].render()
        );
        assert_eq!(
            r#"<link rel="apple-touch-icon" sizes="57x57" href="/icons/apple-icon-57x57.png">"#,
            children[12].render()
        );
        assert_eq!(
            format!(r#"<script src="{}"></script>"#, JQUERY),
            children[21].render()
        );
    }

    #[test]
    fn test_initialize_twice_duplicates() {
        let site = Site::fixture();
        let mut builder = DocumentBuilder::new(&site);
        builder.initialize();
        builder.initialize();
        assert_eq!(44, builder.into_document().head().children().len());
    }

    #[test]
    fn test_copyright_and_footer() {
        let site = Site::fixture();
        let mut builder = DocumentBuilder::new(&site);
        builder.add_copyright_notice(2024);
        builder.add_footer_navigation(r#"<a href="/about.html">About</a>"#);
        let body = builder.into_document().body().render();

        assert!(body.starts_with(r#"<body><div class="copyright">"#));
        assert!(body.contains("&copy; copyright 2013-2024 Jane Doe unless"));
        assert!(body.ends_with(
            r#"<footer><nav><a href="/about.html">About</a></nav></footer></body>"#
        ));
    }

    #[test]
    fn test_cookie_notice_and_newsletter() {
        let site = Site::fixture();
        let mut builder = DocumentBuilder::new(&site);
        builder.add_cookie_notice();
        builder.add_newsletter();
        assert!(builder.into_document().body().children().is_empty());

        let site = Site {
            cookie_policy: Some(String::from("https://devabo.de/imprint.html")),
            newsletter: true,
            ..Site::fixture()
        };
        let mut builder = DocumentBuilder::new(&site);
        builder.add_cookie_notice();
        builder.add_newsletter();
        let body = builder.into_document().body().render();

        assert!(body.starts_with(
            r#"<body><div id="cookie-law-info-bar">This website uses cookies"#
        ));
        assert!(body.contains(
            r#"<a href="https://devabo.de/imprint.html" id="CONSTANT_OPEN_URL" target="_blank""#
        ));
        assert!(body.ends_with(r#"<div class="nl_container nl_container_hidden"></div></body>"#));
    }

    #[test]
    fn test_version_token() {
        let at = NaiveDate::from_ymd_opt(2017, 3, 4)
            .unwrap()
            .and_hms_opt(5, 6, 7)
            .unwrap();
        assert_eq!("20170304T050607", version_token(&at));
    }

    #[test]
    fn test_version_shape() {
        let site = Site::fixture();
        let version = DocumentBuilder::new(&site).version();
        assert_eq!(15, version.len());
        assert_eq!(Some('T'), version.chars().nth(8));
    }
}
