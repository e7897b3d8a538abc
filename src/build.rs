//! Exports the [`build_site`] function which stitches together the steps of
//! building the site: reading the pages ([`crate::source`]), rendering every
//! document into a [`Staging`] area ([`crate::render`], [`crate::archive`],
//! [`crate::feed`]), writing the staged documents ([`crate::write`]), and
//! copying the static assets.

use crate::archive::{self, recent};
use crate::config::Config;
use crate::feed::{self, render_feed, FeedConfig, FEED_PATH};
use crate::markdown;
use crate::page::{self, Page};
use crate::render::Renderer;
use crate::sequence::Sequence;
use crate::source::{self, PageSource, RecordSource};
use crate::thumbnail::{self, CachedThumbnails, Thumbnailer};
use crate::write::{self, Staging, Writer};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The data pages rendered from markdown, if their source file exists in
/// the pages directory: (source file, output file, title).
const MARKDOWN_PAGES: &[(&str, &str, &str)] = &[
    ("about.md", "about.html", "About"),
    ("imprint.md", "imprint.html", "Imprint"),
];

/// Builds the site from a [`Config`] object: reads the page records of the
/// project file, renders everything into memory, then replaces the output
/// directory with the result.
pub fn build_site(config: &Config) -> Result<()> {
    let pages = Sequence::new(RecordSource::new(&config.project_file).pages()?);
    info!(stage = ?config.stage, pages = pages.len(), "Building site");

    let thumbnails = CachedThumbnails::new(&config.image_directory);
    let staging = render_site(config, &pages, &thumbnails)?;

    // Only touch the disk once every document has been rendered.
    rmdir(&config.output_directory)?;
    Writer {
        output_directory: &config.output_directory,
    }
    .flush(&staging)?;

    if config.static_directory.is_dir() {
        copy_dir(&config.static_directory, &config.output_directory)?;
    }
    info!(
        output = %config.output_directory.display(),
        documents = staging.len(),
        "Built site"
    );
    Ok(())
}

/// Renders every document of the site: the narrative pages, the markdown
/// data pages, the archive, and the feed.
pub fn render_site(
    config: &Config,
    pages: &Sequence<Page>,
    thumbnails: &dyn Thumbnailer,
) -> Result<Staging> {
    let renderer = Renderer::from_config(config).starting_at(pages.first());
    let mut staging = Staging::new();

    for (page, links) in pages.linked() {
        let html = renderer.narrative(page, &links)?;
        debug!(path = %page.path, "Rendered page");
        staging.stage_page(page, &links, html)?;
    }

    for (file, target, title) in MARKDOWN_PAGES {
        let path = config.pages_directory.join(file);
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                staging.stage(target, renderer.data_page(title, markdown::to_html(&contents)));
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No source for data page");
            }
            Err(err) => return Err(Error::Read { path, err }),
        }
    }

    let newest = recent(pages.as_slice(), config.feed_size);
    let listing = archive::listing(&newest, &config.served_root, thumbnails)?;
    staging.stage("archive.html", renderer.data_page("Archive", listing));

    let feed_config = FeedConfig {
        site: &config.site,
        served_root: &config.served_root,
        offset: config.offset,
    };
    staging.stage(FEED_PATH, render_feed(&feed_config, &newest)?);

    Ok(staging)
}

/// Copies the contents of `src` into `dst`, recursively. `dst` may already
/// exist.
fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &dst.join(entry.file_name()))?;
        } else {
            std::fs::copy(entry.path(), dst.join(entry.file_name()))?;
        }
    }
    Ok(())
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can occur while reading pages,
/// rendering documents, looking up thumbnails, writing output, cleaning the
/// output directory, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors reading the page records.
    Source(source::Error),

    /// Returned when a page's date can't be derived from its path.
    Page(page::Error),

    /// Returned for thumbnail problems other than a missing thumbnail.
    Thumbnail(thumbnail::Error),

    /// Returned for errors creating the feed.
    Feed(feed::Error),

    /// Returned for errors writing the staged documents.
    Write(write::Error),

    /// Returned for I/O problems while cleaning the output directory.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while reading a data page's source.
    Read { path: PathBuf, err: std::io::Error },

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Source(err) => err.fmt(f),
            Error::Page(err) => err.fmt(f),
            Error::Thumbnail(err) => err.fmt(f),
            Error::Feed(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::Read { path, err } => {
                write!(f, "Reading '{}': {}", path.display(), err)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Source(err) => Some(err),
            Error::Page(err) => Some(err),
            Error::Thumbnail(err) => Some(err),
            Error::Feed(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::Read { path: _, err } => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<source::Error> for Error {
    /// Converts [`source::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: source::Error) -> Error {
        Error::Source(err)
    }
}

impl From<page::Error> for Error {
    /// Converts [`page::Error`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: page::Error) -> Error {
        Error::Page(err)
    }
}

impl From<thumbnail::Error> for Error {
    /// Converts [`thumbnail::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: thumbnail::Error) -> Error {
        Error::Thumbnail(err)
    }
}

impl From<feed::Error> for Error {
    /// Converts [`feed::Error`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: feed::Error) -> Error {
        Error::Feed(err)
    }
}

impl From<write::Error> for Error {
    /// Converts [`write::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: write::Error) -> Error {
        Error::Write(err)
    }
}
