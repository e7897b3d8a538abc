//! The collaborators which act after a build: uploading files ([`Store`]),
//! announcing a new page ([`Announce`]), and recording it for the next
//! build ([`Persist`]). Each comes with a filesystem-backed implementation.

use crate::config::Site;
use crate::page::{self, Page};
use crate::thumbnail::THUMBNAIL_PREFIX;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Uploads a local file to `remote`, a `/`-separated path below the
/// store's root.
pub trait Store {
    fn store(&self, local: &Path, remote: &str) -> Result<()>;
}

/// Tells the world about a new page.
pub trait Announce {
    fn announce(&self, announcement: &Announcement) -> Result<()>;
}

/// Records a new page so that subsequent builds include it.
pub trait Persist {
    fn persist(&self, page: &Page) -> Result<()>;
}

/// The summary of a new page handed to [`Announce`]. Field names follow the
/// publishing service's JSON schema.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Announcement {
    #[serde(rename = "Link")]
    pub link: String,

    #[serde(rename = "ImgUrl")]
    pub img_url: String,

    #[serde(rename = "Title")]
    pub title: String,

    /// Comma-separated tags without spaces.
    #[serde(rename = "TagsCsvString")]
    pub tags: String,

    #[serde(rename = "Description")]
    pub description: String,
}

impl Announcement {
    /// Summarizes `page` as published on the site's canonical URL, tagged
    /// with the site's keywords.
    pub fn new(page: &Page, site: &Site) -> Announcement {
        Announcement {
            link: page.url(site.url.as_str()),
            img_url: page.image_url.clone(),
            title: page.title.clone(),
            tags: site
                .keywords
                .split(',')
                .map(|tag| tag.trim().replace(' ', ""))
                .filter(|tag| !tag.is_empty())
                .collect::<Vec<_>>()
                .join(","),
            description: page.description.clone(),
        }
    }
}

/// A [`Store`] which copies files into a local mirror directory, e.g. one
/// synchronized by an external tool.
pub struct MirrorStore {
    root: PathBuf,
}

impl MirrorStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> MirrorStore {
        MirrorStore { root: root.into() }
    }
}

impl Store for MirrorStore {
    fn store(&self, local: &Path, remote: &str) -> Result<()> {
        let target = self.root.join(remote.trim_start_matches('/'));
        if let Some(dir) = target.parent() {
            std::fs::create_dir_all(dir).map_err(|err| Error::io(dir, err))?;
        }
        std::fs::copy(local, &target).map_err(|err| Error::io(local, err))?;
        info!(from = %local.display(), to = %target.display(), "Stored file");
        Ok(())
    }
}

/// Copies every file below `root` into `store`, keeping relative paths.
/// Returns the number of files stored.
pub fn mirror_tree(store: &dyn Store, root: &Path) -> Result<usize> {
    use walkdir::WalkDir;
    let mut stored = 0;
    for result in WalkDir::new(root).sort_by_file_name() {
        let entry = result?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let remote = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        store.store(entry.path(), &remote)?;
        stored += 1;
    }
    Ok(stored)
}

/// An [`Announce`] which drops each announcement as a JSON file into an
/// outbox directory, for a separate process to deliver.
pub struct OutboxAnnouncer {
    directory: PathBuf,
}

impl OutboxAnnouncer {
    pub fn new<P: Into<PathBuf>>(directory: P) -> OutboxAnnouncer {
        OutboxAnnouncer {
            directory: directory.into(),
        }
    }

    /// The outbox file of an announcement, named after its title.
    pub fn path_for(&self, announcement: &Announcement) -> PathBuf {
        self.directory
            .join(format!("{}.json", page::path_title(&announcement.title)))
    }
}

impl Announce for OutboxAnnouncer {
    fn announce(&self, announcement: &Announcement) -> Result<()> {
        std::fs::create_dir_all(&self.directory).map_err(|err| Error::io(&self.directory, err))?;
        let path = self.path_for(announcement);
        let json = serde_json::to_string_pretty(announcement)?;
        std::fs::write(&path, json).map_err(|err| Error::io(&path, err))?;
        info!(path = %path.display(), title = %announcement.title, "Queued announcement");
        Ok(())
    }
}

/// A [`Persist`] which appends pages to the `pages` records of the project
/// file. The file is rewritten, so comments in it are not preserved.
pub struct RecordPersister {
    project_file: PathBuf,
}

impl RecordPersister {
    pub fn new<P: Into<PathBuf>>(project_file: P) -> RecordPersister {
        RecordPersister {
            project_file: project_file.into(),
        }
    }
}

impl Persist for RecordPersister {
    fn persist(&self, page: &Page) -> Result<()> {
        use serde_yaml::Value;
        let path = &self.project_file;
        let contents = std::fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        let mut project: Value = serde_yaml::from_str(&contents)?;
        let Value::Mapping(mapping) = &mut project else {
            return Err(Error::NotAMapping(path.clone()));
        };

        let record = serde_yaml::to_value(page)?;
        match mapping.get_mut("pages") {
            Some(Value::Sequence(pages)) => pages.push(record),
            Some(Value::Null) | None => {
                mapping.insert(Value::from("pages"), Value::Sequence(vec![record]));
            }
            Some(_) => return Err(Error::NotAMapping(path.clone())),
        }

        std::fs::write(path, serde_yaml::to_string(&project)?).map_err(|err| Error::io(path, err))?;
        info!(path = %path.display(), page = %page.path, "Recorded page");
        Ok(())
    }
}

/// Releases new pages: each one is recorded, its image (and thumbnail, if
/// generated already) stored under the file name, and then announced.
pub struct Release<'a> {
    pub site: &'a Site,

    /// Where the full-size images and their thumbnails live locally.
    pub image_directory: &'a Path,

    pub persist: &'a dyn Persist,
    pub store: &'a dyn Store,
    pub announce: &'a dyn Announce,
}

impl Release<'_> {
    pub fn release(&self, page: &Page) -> Result<()> {
        self.persist.persist(page)?;

        let filename = page.image_filename();
        self.store.store(&self.image_directory.join(filename), filename)?;
        let thumbnail = format!("{}{}", THUMBNAIL_PREFIX, filename);
        let thumbnail_path = self.image_directory.join(&thumbnail);
        if thumbnail_path.is_file() {
            self.store.store(&thumbnail_path, &thumbnail)?;
        } else {
            warn!(
                thumbnail = %thumbnail_path.display(),
                "Thumbnail not generated yet, not storing it"
            );
        }

        self.announce.announce(&Announcement::new(page, self.site))
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem storing, announcing, or persisting a page.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems with a particular file.
    Io { path: PathBuf, err: io::Error },

    /// Returned when the project file isn't a mapping with a `pages` list.
    NotAMapping(PathBuf),

    /// Returned for errors reading or writing the project file.
    Yaml(serde_yaml::Error),

    /// Returned for errors serializing an announcement.
    Json(serde_json::Error),

    /// Returned for I/O errors while walking a directory tree.
    WalkDir(walkdir::Error),
}

impl Error {
    fn io(path: &Path, err: io::Error) -> Error {
        Error::Io {
            path: path.to_owned(),
            err,
        }
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io { path, err } => write!(f, "'{}': {}", path.display(), err),
            Error::NotAMapping(path) => write!(
                f,
                "'{}' must be a mapping whose `pages` entry is a list",
                path.display()
            ),
            Error::Yaml(err) => err.fmt(f),
            Error::Json(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { path: _, err } => Some(err),
            Error::NotAMapping(_) => None,
            Error::Yaml(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::WalkDir(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts [`serde_yaml::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: serde_yaml::Error) -> Error {
        Error::Yaml(err)
    }
}

impl From<serde_json::Error> for Error {
    /// Converts [`serde_json::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::page::fixture;
    use crate::source::{PageSource, RecordSource};

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_announcement() {
        let site = Site {
            keywords: String::from("web comic, graphic novel,sci fi"),
            ..Site::fixture()
        };
        let announcement = Announcement::new(&fixture(1), &site);
        assert_eq!("https://devabo.de/2013/08/02/page-1", announcement.link);
        assert_eq!("webcomic,graphicnovel,scifi", announcement.tags);
    }

    #[test]
    fn test_outbox_announcer() -> TestResult {
        let dir = tempfile::tempdir()?;
        let announcer = OutboxAnnouncer::new(dir.path().join("outbox"));
        let announcement = Announcement::new(&fixture(3), &Site::fixture());
        announcer.announce(&announcement)?;

        let path = dir.path().join("outbox").join("3-page.json");
        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        assert_eq!("#3 Page", json["Title"]);
        assert_eq!("https://devabo.de/2013/08/04/page-3", json["Link"]);
        assert_eq!(
            "https://cdn.example.com/comicstrips/Comic_0003.png",
            json["ImgUrl"]
        );
        Ok(())
    }

    #[test]
    fn test_mirror_tree() -> TestResult {
        let dir = tempfile::tempdir()?;
        let output = dir.path().join("public");
        std::fs::create_dir_all(output.join("2013/08/02/page-1"))?;
        std::fs::write(output.join("index.html"), "home")?;
        std::fs::write(output.join("2013/08/02/page-1/index.html"), "page")?;

        let mirror = dir.path().join("mirror");
        let stored = mirror_tree(&MirrorStore::new(&mirror), &output)?;

        assert_eq!(2, stored);
        assert_eq!("home", std::fs::read_to_string(mirror.join("index.html"))?);
        assert_eq!(
            "page",
            std::fs::read_to_string(mirror.join("2013/08/02/page-1/index.html"))?
        );
        Ok(())
    }

    #[test]
    fn test_record_persister_appends() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("inkstrip.yaml");
        std::fs::write(&path, "site:\n  title: DevAbo.de\n")?;
        let persister = RecordPersister::new(&path);

        persister.persist(&fixture(1))?;
        persister.persist(&fixture(2))?;

        let pages = RecordSource::new(&path).pages()?;
        assert_eq!(vec![fixture(1), fixture(2)], pages);
        assert!(std::fs::read_to_string(&path)?.contains("title: DevAbo.de"));
        Ok(())
    }

    #[test]
    fn test_release() -> TestResult {
        let dir = tempfile::tempdir()?;
        let project_file = dir.path().join("inkstrip.yaml");
        std::fs::write(&project_file, "pages: []\n")?;
        let images = dir.path().join("images");
        std::fs::create_dir_all(&images)?;
        std::fs::write(images.join("Comic_0001.png"), "image")?;

        let site = Site::fixture();
        let persister = RecordPersister::new(&project_file);
        let store = MirrorStore::new(dir.path().join("mirror"));
        let announcer = OutboxAnnouncer::new(dir.path().join("outbox"));
        Release {
            site: &site,
            image_directory: &images,
            persist: &persister,
            store: &store,
            announce: &announcer,
        }
        .release(&fixture(1))?;

        assert_eq!(vec![fixture(1)], RecordSource::new(&project_file).pages()?);
        assert!(dir.path().join("mirror/Comic_0001.png").is_file());
        assert!(!dir.path().join("mirror/thumb_Comic_0001.png").exists());
        assert!(dir.path().join("outbox/1-page.json").is_file());
        Ok(())
    }

    #[test]
    fn test_record_persister_rejects_non_mapping() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("inkstrip.yaml");
        std::fs::write(&path, "- just\n- a list\n")?;
        let result = RecordPersister::new(&path).persist(&fixture(1));
        assert!(matches!(result, Err(Error::NotAMapping(_))));
        Ok(())
    }
}
