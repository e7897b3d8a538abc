//! Support for creating the RSS feed from the newest pages.

use crate::config::Site;
use crate::page::{self, Page, RFC1123Z};
use chrono::{DateTime, FixedOffset, Utc};
use rss::extension::atom::{AtomExtension, Link};
use rss::extension::dublincore::DublinCoreExtension;
use rss::extension::{Extension, ExtensionMap};
use rss::{CategoryBuilder, Channel, ChannelBuilder, GuidBuilder, ImageBuilder, Item, ItemBuilder};
use std::collections::BTreeMap;
use std::fmt;

/// Where the feed lives, relative to the served root.
pub const FEED_PATH: &str = "feed/rss.xml";

const MEDIA_PREFIX: &str = "media";
const MEDIA_NAMESPACE: &str = "http://search.yahoo.com/mrss/";
const SYNDICATION_PREFIX: &str = "sy";
const SYNDICATION_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/syndication/";

/// Bundled configuration for creating a feed.
pub struct FeedConfig<'a> {
    pub site: &'a Site,

    /// The root the feed and its pages are served from.
    pub served_root: &'a str,

    /// The publication time zone.
    pub offset: FixedOffset,
}

impl FeedConfig<'_> {
    fn self_url(&self) -> String {
        format!("{}/{}", self.served_root, FEED_PATH)
    }
}

/// Renders the feed for `pages` (newest first) as XML, stamped with the
/// current time as build date.
pub fn render_feed(config: &FeedConfig, pages: &[&Page]) -> Result<String> {
    let built = Utc::now().with_timezone(&config.offset);
    Ok(feed(config, pages, &built)?.to_string())
}

/// Creates the feed's channel. Items appear in the order of `pages`.
pub fn feed(
    config: &FeedConfig,
    pages: &[&Page],
    built: &DateTime<FixedOffset>,
) -> Result<Channel> {
    let site = config.site;
    let items = pages
        .iter()
        .map(|page| feed_item(config, page))
        .collect::<Result<Vec<Item>>>()?;

    let mut namespaces = BTreeMap::new();
    namespaces.insert(MEDIA_PREFIX.to_owned(), MEDIA_NAMESPACE.to_owned());
    namespaces.insert(SYNDICATION_PREFIX.to_owned(), SYNDICATION_NAMESPACE.to_owned());

    Ok(ChannelBuilder::default()
        .title(site.title.clone())
        .link(site.url.to_string())
        .description(site.description.clone())
        .language(Some(String::from("en-US")))
        .generator(Some(format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))))
        .last_build_date(Some(built.format(RFC1123Z).to_string()))
        .image(Some(
            ImageBuilder::default()
                .url(format!("{}/icons/favicon-32x32.png", config.served_root))
                .title(site.title.clone())
                .link(site.url.to_string())
                .width(Some(String::from("32")))
                .height(Some(String::from("32")))
                .description(Some(site.description.clone()))
                .build(),
        ))
        .atom_ext(Some(AtomExtension {
            links: vec![Link {
                href: config.self_url(),
                rel: String::from("self"),
                hreflang: None,
                mime_type: Some(String::from("application/rss+xml")),
                title: None,
                length: None,
            }],
        }))
        .namespaces(namespaces)
        .extensions(syndication())
        .items(items)
        .build())
}

fn feed_item(config: &FeedConfig, page: &Page) -> Result<Item> {
    let url = page.url(config.served_root);
    let thumbnail_url = page.thumbnail_url(&config.site.asset_root);

    let mut media = BTreeMap::new();
    media.insert(
        String::from("thumbnail"),
        vec![extension("media:thumbnail", None, &[("url", &thumbnail_url)])],
    );
    let mut content = extension(
        "media:content",
        None,
        &[("url", &page.image_url), ("medium", "image")],
    );
    content.children.insert(
        String::from("title"),
        vec![extension("media:title", Some(page.image_filename()), &[("type", "html")])],
    );
    content.children.insert(
        String::from("thumbnail"),
        vec![extension("media:thumbnail", None, &[("url", &thumbnail_url)])],
    );
    media.insert(String::from("content"), vec![content]);
    let mut extensions = ExtensionMap::new();
    extensions.insert(MEDIA_PREFIX.to_owned(), media);

    Ok(ItemBuilder::default()
        .title(Some(page.title.clone()))
        .link(Some(url.clone()))
        .pub_date(Some(page.pub_date(&config.offset)?))
        .dublin_core_ext(Some(DublinCoreExtension {
            creators: vec![config.site.author.clone()],
            ..Default::default()
        }))
        .categories(vec![CategoryBuilder::default().name(page.act.clone()).build()])
        .guid(Some(
            GuidBuilder::default()
                .value(format!("{}/index.html", url))
                .permalink(true)
                .build(),
        ))
        .description(Some(page.description_or(&page.title).to_owned()))
        .content(Some(format!(r#"<img src="{}">"#, page.image_url)))
        .extensions(extensions)
        .build())
}

fn syndication() -> ExtensionMap {
    let mut sy = BTreeMap::new();
    sy.insert(
        String::from("updatePeriod"),
        vec![extension("sy:updatePeriod", Some("weekly"), &[])],
    );
    sy.insert(
        String::from("updateFrequency"),
        vec![extension("sy:updateFrequency", Some("1"), &[])],
    );
    let mut extensions = ExtensionMap::new();
    extensions.insert(SYNDICATION_PREFIX.to_owned(), sy);
    extensions
}

fn extension(name: &str, value: Option<&str>, attrs: &[(&str, &str)]) -> Extension {
    Extension {
        name: name.to_owned(),
        value: value.map(str::to_owned),
        attrs: attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        children: BTreeMap::new(),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating the feed.
#[derive(Debug)]
pub enum Error {
    /// Returned when a page's publication date can't be derived.
    Page(page::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Page(err) => write!(f, "creating feed: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Page(err) => Some(err),
        }
    }
}

impl From<page::Error> for Error {
    /// Converts [`page::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: page::Error) -> Error {
        Error::Page(err)
    }
}
