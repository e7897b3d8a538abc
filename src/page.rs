//! Defines the [`Page`] type: one published comic page. Pages are created
//! once from a page source and never change afterwards; navigation between
//! pages is computed by [`crate::sequence`].

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The date format used for feed items and `article:*_time` meta tags, e.g.
/// `Thu, 01 Aug 2013 20:00:00 +0100`.
pub const RFC1123Z: &str = "%a, %d %b %Y %H:%M:%S %z";

/// The hour of the day at which pages are considered published.
const PUBLICATION_HOUR: u32 = 20;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// The canonical path relative to the served root, e.g.
    /// `/2013/08/01/a-step-in-the-dark`. The first three segments are the
    /// publication date.
    pub path: String,

    /// The URL of the full-size image.
    #[serde(rename = "img_url")]
    pub image_url: String,

    /// The comment-thread identifier. Empty for pages whose thread is
    /// identified by the page URL.
    #[serde(default)]
    pub disqus_id: String,

    /// The narrative grouping (e.g. `Act I`). Doubles as feed category.
    #[serde(default)]
    pub act: String,
}

impl Page {
    /// The image's file name: everything after the last `/` of the image URL.
    pub fn image_filename(&self) -> &str {
        self.image_url.rsplit('/').next().unwrap_or(&self.image_url)
    }

    /// The absolute URL of the page under `served_root`.
    pub fn url(&self, served_root: &str) -> String {
        format!("{}{}", served_root.trim_end_matches('/'), self.path)
    }

    /// The URL of the page's thumbnail under `asset_root`.
    pub fn thumbnail_url(&self, asset_root: &str) -> String {
        format!(
            "{}/thumb_{}",
            asset_root.trim_end_matches('/'),
            self.image_filename()
        )
    }

    /// The comment-thread identifier, falling back to the page URL.
    pub fn comment_id(&self, served_root: &str) -> String {
        if self.disqus_id.is_empty() {
            self.url(served_root)
        } else {
            self.disqus_id.clone()
        }
    }

    /// The description, or `fallback` if the page has none.
    pub fn description_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.description.is_empty() {
            fallback
        } else {
            &self.description
        }
    }

    /// The publication date, taken from the date segments of the path, at
    /// the publication hour in `offset`.
    pub fn date(&self, offset: &FixedOffset) -> Result<DateTime<FixedOffset>> {
        let invalid = || Error::InvalidDatePath(self.path.clone());
        let mut segments = self.path.split('/').skip(1);
        let mut next_number = || -> Result<u32> {
            segments
                .next()
                .and_then(|segment| segment.parse::<u32>().ok())
                .ok_or_else(invalid)
        };
        let (year, month, day) = (next_number()?, next_number()?, next_number()?);
        let year = i32::try_from(year).map_err(|_| invalid())?;
        offset
            .with_ymd_and_hms(year, month, day, PUBLICATION_HOUR, 0, 0)
            .single()
            .ok_or_else(invalid)
    }

    /// [`Page::date`] formatted as [`RFC1123Z`].
    pub fn pub_date(&self, offset: &FixedOffset) -> Result<String> {
        Ok(self.date(offset)?.format(RFC1123Z).to_string())
    }
}

/// Turns a title into the last segment of a page path, e.g.
/// `"#1 A Step in the dark"` becomes `"1-a-step-in-the-dark"`.
pub fn path_title(title: &str) -> String {
    slug::slugify(title)
}

/// The path of a page published on `date`: `/YYYY/MM/DD/{path_title}`.
pub fn dated_path(title: &str, date: NaiveDate) -> String {
    format!("{}/{}", date.format("/%Y/%m/%d"), path_title(title))
}

/// The comment-thread identifier for a page published on `date`. Threads
/// are keyed by the numeric date, e.g. `20130801 https://example.com/?p=20130801`.
pub fn default_comment_id(date: NaiveDate, site_url: &str) -> String {
    let id = date.format("%Y%m%d");
    format!("{} {}/?p={}", id, site_url.trim_end_matches('/'), id)
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem deriving a value from a [`Page`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Returned when a page path doesn't start with `/YYYY/MM/DD/`.
    InvalidDatePath(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidDatePath(path) => {
                write!(f, "page path `{}` doesn't start with a valid date", path)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
pub(crate) fn fixture(n: usize) -> Page {
    Page {
        title: format!("#{} Page", n),
        description: format!("Page number {}", n),
        path: format!("/2013/08/{:02}/page-{}", (n % 28) + 1, n),
        image_url: format!("https://cdn.example.com/comicstrips/Comic_{:04}.png", n),
        disqus_id: String::new(),
        act: String::from("Act I"),
    }
}
