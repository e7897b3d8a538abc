//! Renders the documents of the site: one narrative document per comic page
//! and the data pages (about, imprint, archive). Both share the same shell,
//! built on [`DocumentBuilder`].

use crate::config::{Config, Site};
use crate::document::DocumentBuilder;
use crate::feed::FEED_PATH;
use crate::node::{Element, Node};
use crate::page::{self, Page};
use crate::sequence::Links;
use chrono::{Datelike, FixedOffset, Local};

const IMAGE_WIDTH: &str = "800";
const IMAGE_HEIGHT: &str = "1334";

/// Renders documents for one site and served root.
pub struct Renderer<'a> {
    site: &'a Site,
    served_root: &'a str,
    offset: FixedOffset,
    start_url: Option<String>,
    analytics: Option<&'a str>,
}

impl<'a> Renderer<'a> {
    pub fn new(site: &'a Site, served_root: &'a str, offset: FixedOffset) -> Renderer<'a> {
        Renderer {
            site,
            served_root,
            offset,
            start_url: None,
            analytics: None,
        }
    }

    /// A renderer for the configured stage. Analytics markup is included
    /// only where [`Config::with_analytics`] allows it.
    pub fn from_config(config: &'a Config) -> Renderer<'a> {
        let analytics = if config.with_analytics() {
            config.site.analytics.as_deref()
        } else {
            None
        };
        Renderer::new(&config.site, &config.served_root, config.offset).with_analytics(analytics)
    }

    /// Sets the page new readers are pointed to from the data pages.
    pub fn starting_at(mut self, first: Option<&Page>) -> Renderer<'a> {
        self.start_url = first.map(|page| page.url(self.served_root));
        self
    }

    pub fn with_analytics(mut self, analytics: Option<&'a str>) -> Renderer<'a> {
        self.analytics = analytics;
        self
    }

    /// Renders the document of a narrative page.
    pub fn narrative(&self, page: &Page, links: &Links<Page>) -> Result<String, page::Error> {
        let root = self.served_root;
        let url = page.url(root);
        let published = page.pub_date(&self.offset)?;
        let description = page.description_or(&self.site.description);

        let mut builder = self.shell(Some(url.as_str()));
        let relations = [
            ("start", links.first),
            ("prev", links.previous),
            ("next", links.next),
            ("last", links.last),
        ];
        for (rel, target) in relations {
            if let Some(target) = target {
                builder.add_head(
                    Element::new("link")
                        .with_attr("rel", rel)
                        .with_attr("title", target.title.as_str())
                        .with_attr("href", target.url(root)),
                );
            }
        }
        builder.add_title(&self.title(&page.title));

        let start = links.first.unwrap_or(page).url(root);
        builder.add_body(self.header(&page.title, Some(start)));

        let mut main = Element::new("main");
        let image = Element::new("img")
            .with_attr("src", page.image_url.as_str())
            .with_attr("width", IMAGE_WIDTH)
            .with_attr("height", IMAGE_HEIGHT)
            .with_attr("alt", "");
        match links.next {
            Some(next) if !links.is_last() => {
                main.append_element("a")
                    .attr("href", next.url(root))
                    .attr("rel", "next")
                    .attr("title", next.title.as_str())
                    .append(image);
            }
            _ => {
                main.append(image);
            }
        }
        main.append(navigation(links, root));
        if let Some(shortname) = &self.site.comments {
            main.append_text(comments(shortname, &page.title, &url, &page.comment_id(root)));
        }
        builder.add_body(main);
        self.add_footer(&mut builder);

        let site = self.site;
        builder.add_meta(&[("property", "og:title"), ("content", page.title.as_str())]);
        builder.add_meta(&[("property", "og:url"), ("content", url.as_str())]);
        builder.add_meta(&[("property", "og:image"), ("content", page.image_url.as_str())]);
        builder.add_meta(&[("property", "og:description"), ("content", description)]);
        builder.add_meta(&[("property", "og:site_name"), ("content", site.title.as_str())]);
        builder.add_meta(&[("property", "og:type"), ("content", "article")]);
        builder.add_meta(&[
            ("property", "article:published_time"),
            ("content", published.as_str()),
        ]);
        builder.add_meta(&[("property", "article:modified_time"), ("content", published.as_str())]);
        builder.add_meta(&[("property", "article:section"), ("content", site.topic.as_str())]);
        builder.add_meta(&[("property", "article:tag"), ("content", site.keywords.as_str())]);

        builder.add_meta(&[("itemprop", "name"), ("content", page.title.as_str())]);
        builder.add_meta(&[("itemprop", "description"), ("content", description)]);
        builder.add_meta(&[("itemprop", "image"), ("content", page.image_url.as_str())]);

        builder.add_meta(&[("name", "twitter:card"), ("content", "summary_large_image")]);
        builder.add_meta(&[("name", "twitter:site"), ("content", site.twitter_site.as_str())]);
        builder.add_meta(&[("name", "twitter:title"), ("content", page.title.as_str())]);
        builder.add_meta(&[("name", "twitter:text:description"), ("content", description)]);
        builder.add_meta(&[
            ("name", "twitter:creator"),
            ("content", site.twitter_creator.as_str()),
        ]);
        builder.add_meta(&[("name", "twitter:image"), ("content", page.image_url.as_str())]);

        Ok(builder.render())
    }

    /// Renders a data page: the common shell around arbitrary `content`.
    pub fn data_page<N: Into<Node>>(&self, title: &str, content: N) -> String {
        let mut builder = self.shell(None);
        builder.add_title(&self.title(title));
        builder.add_body(self.header(title, self.start_url.clone()));
        builder.add_body(Element::new("main").with_child(content));
        self.add_footer(&mut builder);
        builder.render()
    }

    fn shell(&self, canonical: Option<&str>) -> DocumentBuilder<'a> {
        let mut builder = DocumentBuilder::new(self.site);
        builder.initialize();
        let version = builder.version();
        builder.add_stylesheet(&format!("{}/css/style.css?version={}", self.served_root, version));
        if let Some(canonical) = canonical {
            builder.add_head(
                Element::new("link")
                    .with_attr("rel", "canonical")
                    .with_attr("href", canonical),
            );
        }
        builder.add_head(
            Element::new("script")
                .with_attr("src", format!("{}/js/script.js?version={}", self.served_root, version))
                .with_attr("type", "text/javascript")
                .with_attr("language", "javascript"),
        );
        builder
    }

    fn title(&self, title: &str) -> String {
        format!("{} | Graphic Novel | {}", self.site.title, title)
    }

    fn header(&self, headline: &str, start: Option<String>) -> Element {
        let mut header = Element::new("header");
        header
            .append_element("a")
            .attr("href", format!("{}/", self.served_root))
            .attr("class", "home")
            .append_text(format!("<!--{}-->", self.site.title));
        if let Some(start) = start {
            header
                .append_element("a")
                .attr("href", start)
                .attr("class", "orange")
                .append_text("New Reader? Start here!");
        }
        header.append_element("h3").append_text(headline);
        header
    }

    fn add_footer(&self, builder: &mut DocumentBuilder) {
        builder.add_copyright_notice(Local::now().year());
        builder.add_cookie_notice();
        builder.add_footer_navigation(&self.footer_navigation());
        builder.add_newsletter();
    }

    /// The links of the footer navigation, followed by the analytics markup
    /// if enabled.
    pub fn footer_navigation(&self) -> String {
        let root = self.served_root;
        let mut markup = String::new();
        if !self.site.twitter_site.is_empty() {
            markup.push_str(&format!(
                r#"<a href="https://twitter.com/{}">Twitter</a>"#,
                self.site.twitter_site.trim_start_matches('@')
            ));
        }
        markup.push_str(&format!(
            r#"<a href="{root}/about.html">About</a><a href="{root}/{FEED_PATH}">RSS</a><a href="{root}/archive.html">Archive</a><a href="{root}/imprint.html">Imprint</a>"#,
        ));
        if let Some(property) = self.analytics {
            markup.push_str(&analytics(property));
        }
        markup
    }
}

fn navigation(links: &Links<Page>, root: &str) -> Element {
    let mut nav = Element::new("nav");
    let entries = [
        ("first", "&lt;&lt; first", links.first),
        ("previous", "&lt; previous", links.previous),
        ("next", "next &gt;", links.next),
        ("last", "newest &gt;", links.last),
    ];
    for (rel, label, target) in entries {
        if let Some(target) = target {
            nav.append_element("a")
                .attr("rel", rel)
                .attr("title", target.title.as_str())
                .attr("href", target.url(root))
                .append_text(label);
        }
    }
    nav
}

fn comments(shortname: &str, title: &str, url: &str, identifier: &str) -> String {
    format!(
        r#"<div id="disqus_thread"></div><script>var disqus_config = function () {{ this.page.title = "{}"; this.page.url = '{}'; this.page.identifier = '{}'; }}; (function() {{ var d = document, s = d.createElement('script'); s.src = 'https://{}.disqus.com/embed.js'; s.setAttribute('data-timestamp', +new Date()); (d.head || d.body).appendChild(s); }})();</script><noscript>Please enable JavaScript to view the comments.</noscript>"#,
        title.replace('"', "\\\""),
        url,
        identifier.replace('\'', "\\'"),
        shortname
    )
}

fn analytics(property: &str) -> String {
    format!(
        r#"<script async src="https://www.googletagmanager.com/gtag/js?id={property}"></script><script>window.dataLayer = window.dataLayer || []; function gtag(){{dataLayer.push(arguments);}} gtag('js', new Date()); gtag('config', '{property}', {{ 'anonymize_ip': true }});</script>"#,
    )
}
