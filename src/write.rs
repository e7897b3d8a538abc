//! Collects rendered documents in memory ([`Staging`]) and writes them to the
//! output directory in one go ([`Writer::flush`]). Nothing touches the disk
//! before every document of a build has been rendered.

use crate::page::Page;
use crate::sequence::Links;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

/// The file name of every narrative page and of the site's home page.
pub const INDEX_FILE: &str = "index.html";

/// Rendered documents awaiting [`Writer::flush`], keyed by their path
/// relative to the output directory.
#[derive(Default, Debug)]
pub struct Staging {
    entries: BTreeMap<PathBuf, String>,
}

impl Staging {
    pub fn new() -> Staging {
        Staging::default()
    }

    /// Stages `contents` at `path`. A leading `/` is ignored, so page paths
    /// can be passed as they are. Staging the same path twice replaces the
    /// earlier contents.
    pub fn stage<P: AsRef<Path>>(&mut self, path: P, contents: String) {
        let path = relative(path.as_ref());
        if self.entries.insert(path.clone(), contents).is_some() {
            warn!(path = %path.display(), "Replacing staged document");
        }
    }

    /// Stages a narrative page at `{page.path}/index.html`. The newest page
    /// is also staged as the site's home page. Fails if another page has
    /// already been staged at the same path.
    pub fn stage_page(&mut self, page: &Page, links: &Links<Page>, html: String) -> Result<()> {
        let path = relative(&Path::new(&page.path).join(INDEX_FILE));
        if self.entries.contains_key(&path) {
            return Err(Error::PathCollision(path));
        }
        if links.is_last() {
            self.stage(INDEX_FILE, html.clone());
        }
        self.stage(path, html);
        Ok(())
    }

    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<&str> {
        self.entries
            .get(&relative(path.as_ref()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the staged documents in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.entries
            .iter()
            .map(|(path, contents)| (path.as_path(), contents.as_str()))
    }
}

fn relative(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::RootDir | Component::Prefix(_)))
        .collect()
}

/// Writes staged documents below an output directory.
pub struct Writer<'a> {
    /// The root of the generated site.
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Writes every staged document, creating directories as needed.
    pub fn flush(&self, staging: &Staging) -> Result<()> {
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        for (path, contents) in staging.iter() {
            if path.components().any(|c| c == Component::ParentDir) {
                return Err(Error::OutsideOutput(path.to_owned()));
            }
            let target = self.output_directory.join(path);
            if let Some(dir) = target.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir).map_err(|err| Error::Io {
                        path: dir.to_owned(),
                        err,
                    })?;
                }
            }
            std::fs::write(&target, contents).map_err(|err| Error::Io {
                path: target.clone(),
                err,
            })?;
            info!(path = %target.display(), bytes = contents.len(), "Wrote file");
        }
        Ok(())
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem writing staged documents.
#[derive(Debug)]
pub enum Error {
    /// Returned when a staged path would escape the output directory.
    OutsideOutput(PathBuf),

    /// Returned when two pages would be written to the same path.
    PathCollision(PathBuf),

    /// Returned for I/O problems creating directories or writing files.
    Io { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OutsideOutput(path) => {
                write!(f, "Refusing to write '{}' outside the output directory", path.display())
            }
            Error::PathCollision(path) => {
                write!(f, "More than one page would be written to '{}'", path.display())
            }
            Error::Io { path, err } => write!(f, "Writing '{}': {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OutsideOutput(_) | Error::PathCollision(_) => None,
            Error::Io { path: _, err } => Some(err),
        }
    }
}
