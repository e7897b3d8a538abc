//! Loads the project configuration. A project is a directory containing an
//! `inkstrip.yaml` file; [`Config::from_directory`] searches the given
//! directory and its ancestors for it, much like `git` does for `.git`.

use anyhow::{anyhow, Context, Result};
use chrono::FixedOffset;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file.
pub const PROJECT_FILE: &str = "inkstrip.yaml";

/// The deployment target. Each stage is served from its own root URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Stage {
    Dev,
    Test,
    Prod,
}

/// Site-wide metadata which ends up in every document's head, the copyright
/// notice, and the feed's channel.
#[derive(Deserialize, Clone, Debug)]
pub struct Site {
    /// The name of the comic, e.g. used as prefix of every `<title>`.
    pub title: String,

    /// The canonical public URL of the site. Used for the feed's channel
    /// link and for comment-thread identifiers of new pages.
    pub url: Url,

    pub description: String,
    pub author: String,

    /// The first year of the copyright notice's year range.
    pub since: i32,

    #[serde(default)]
    pub keywords: String,

    /// The Dublin Core subject, usually a shorter form of `keywords`.
    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub topic: String,

    /// Twitter handle of the comic, e.g. `@devabo_de`.
    #[serde(default)]
    pub twitter_site: String,

    /// Twitter handle of the author.
    #[serde(default)]
    pub twitter_creator: String,

    /// Shortname of the comment-thread provider (disqus), if comments are
    /// enabled.
    #[serde(default)]
    pub comments: Option<String>,

    /// Base URL of the full-size comic images.
    pub image_root: String,

    /// Base URL of the thumbnails, which are stored next to the images as
    /// `thumb_{filename}`.
    pub asset_root: String,

    /// Analytics property id. Analytics markup is only emitted on the `prod`
    /// stage.
    #[serde(default)]
    pub analytics: Option<String>,

    /// Target of the "Read More" link in the cookie notice bar. Pages carry
    /// no cookie notice if this is unset.
    #[serde(default)]
    pub cookie_policy: Option<String>,

    /// Whether pages carry the (initially hidden) newsletter container the
    /// site's script fills in.
    #[serde(default)]
    pub newsletter: bool,
}

#[derive(Deserialize)]
struct ServedRoots {
    dev: String,
    test: String,
    prod: String,
}

#[derive(Deserialize)]
struct FeedSize(usize);

impl Default for FeedSize {
    fn default() -> Self {
        FeedSize(crate::archive::RECENT_PAGES)
    }
}

#[derive(Deserialize)]
struct UtcOffsetHours(i32);

impl Default for UtcOffsetHours {
    fn default() -> Self {
        UtcOffsetHours(1)
    }
}

#[derive(Deserialize)]
struct Project {
    site: Site,
    served_root: ServedRoots,

    #[serde(default)]
    output_directory: Option<PathBuf>,

    #[serde(default)]
    image_directory: Option<PathBuf>,

    #[serde(default)]
    static_directory: Option<PathBuf>,

    #[serde(default)]
    pages_directory: Option<PathBuf>,

    #[serde(default)]
    mirror_directory: Option<PathBuf>,

    #[serde(default)]
    outbox_directory: Option<PathBuf>,

    #[serde(default)]
    feed_size: FeedSize,

    #[serde(default)]
    utc_offset_hours: UtcOffsetHours,
}

/// The fully-resolved configuration for one run. All directories are
/// absolute or relative to the current directory (never relative to the
/// project file).
pub struct Config {
    /// The project file itself. Page records live in it as well.
    pub project_file: PathBuf,

    pub site: Site,
    pub stage: Stage,

    /// The root URL documents are served from on the selected stage, without
    /// a trailing slash.
    pub served_root: String,

    /// Rendered documents are written here.
    pub output_directory: PathBuf,

    /// Full-size images and their `thumb_` thumbnails.
    pub image_directory: PathBuf,

    /// Copied verbatim into the output directory (stylesheets, scripts,
    /// icons).
    pub static_directory: PathBuf,

    /// Markdown sources of the about and imprint pages.
    pub pages_directory: PathBuf,

    /// Target of `publish`.
    pub mirror_directory: PathBuf,

    /// Announcements of new pages are dropped here for the social-media
    /// poster.
    pub outbox_directory: PathBuf,

    /// The number of pages in the feed.
    pub feed_size: usize,

    /// The publication time zone.
    pub offset: FixedOffset,
}

impl Config {
    /// Searches `dir` and its ancestors for the project file and loads it.
    pub fn from_directory(dir: &Path, stage: Stage) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, stage)
                .with_context(|| format!("Loading configuration `{}`", path.display()))
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, stage),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    /// Loads the configuration from a specific project file.
    pub fn from_project_file(path: &Path, stage: Stage) -> Result<Config> {
        let file = File::open(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        let project: Project = serde_yaml::from_reader(file)?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;
        Config::from_project(project, project_root, path, stage)
    }

    fn from_project(
        project: Project,
        project_root: &Path,
        project_file: &Path,
        stage: Stage,
    ) -> Result<Config> {
        let served_root = match stage {
            Stage::Dev => project.served_root.dev,
            Stage::Test => project.served_root.test,
            Stage::Prod => project.served_root.prod,
        };
        Url::parse(&served_root)
            .with_context(|| format!("Invalid served root `{}` for {:?}", served_root, stage))?;

        let hours = project.utc_offset_hours.0;
        let offset = FixedOffset::east_opt(hours * 3600)
            .ok_or_else(|| anyhow!("UTC offset out of range: {} hours", hours))?;

        if project.feed_size.0 == 0 {
            return Err(anyhow!("`feed_size` must be at least 1"));
        }

        let resolve = |dir: Option<PathBuf>, default: &str| match dir {
            Some(dir) => project_root.join(dir),
            None => project_root.join(default),
        };

        Ok(Config {
            project_file: project_file.to_owned(),
            served_root: served_root.trim_end_matches('/').to_owned(),
            output_directory: resolve(project.output_directory, "public"),
            image_directory: resolve(project.image_directory, "images"),
            static_directory: resolve(project.static_directory, "static"),
            pages_directory: resolve(project.pages_directory, "pages"),
            mirror_directory: resolve(project.mirror_directory, "mirror"),
            outbox_directory: resolve(project.outbox_directory, "outbox"),
            site: project.site,
            stage,
            feed_size: project.feed_size.0,
            offset,
        })
    }

    /// Whether analytics markup belongs on the pages of this run.
    pub fn with_analytics(&self) -> bool {
        self.stage == Stage::Prod && self.site.analytics.is_some()
    }
}

#[cfg(test)]
impl Site {
    pub(crate) fn fixture() -> Site {
        Site {
            title: String::from("DevAbo.de"),
            url: Url::parse("https://devabo.de").unwrap(),
            description: String::from("A science-fiction webcomic"),
            author: String::from("Jane Doe"),
            since: 2013,
            keywords: String::from("web comic, comic, sci fi"),
            subject: String::from("web comic"),
            topic: String::from("Science Fiction Web-Comic"),
            twitter_site: String::from("@comic"),
            twitter_creator: String::from("@jane"),
            comments: Some(String::from("comic")),
            image_root: String::from("https://cdn.example.com/comicstrips"),
            asset_root: String::from("https://cdn.example.com/thumbs"),
            analytics: None,
            cookie_policy: None,
            newsletter: false,
        }
    }
}
