//! Where pages come from: the records of the project file
//! ([`RecordSource`]), or an interactive session describing newly drawn
//! images ([`Prompt`]). [`new_images`] finds the images no page refers to
//! yet.

use crate::page::{self, Page};
use crate::thumbnail::is_thumbnail;
use chrono::NaiveDate;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supplies the pages of the comic in publication order.
pub trait PageSource {
    fn pages(&self) -> Result<Vec<Page>>;
}

#[derive(Deserialize)]
struct Records {
    #[serde(default)]
    pages: Vec<Page>,
}

/// Reads the `pages` records of the project file.
pub struct RecordSource {
    project_file: PathBuf,
}

impl RecordSource {
    pub fn new<P: Into<PathBuf>>(project_file: P) -> RecordSource {
        RecordSource {
            project_file: project_file.into(),
        }
    }
}

impl PageSource for RecordSource {
    fn pages(&self) -> Result<Vec<Page>> {
        let file = File::open(&self.project_file).map_err(|err| Error::Open {
            path: self.project_file.clone(),
            err,
        })?;
        let records: Records = serde_yaml::from_reader(file)?;
        debug!(
            path = %self.project_file.display(),
            pages = records.pages.len(),
            "Read page records"
        );
        Ok(records.pages)
    }
}

/// Asks the user to describe each of a list of new images, one page per
/// image. Every page is shown back for confirmation and asked for again
/// until the user accepts it with `y`.
pub struct Prompt<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
    filenames: Vec<String>,
    image_root: String,
    site_url: String,

    /// The publication date of the new pages.
    date: NaiveDate,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(
        input: R,
        output: W,
        filenames: Vec<String>,
        image_root: &str,
        site_url: &str,
        date: NaiveDate,
    ) -> Prompt<R, W> {
        Prompt {
            input: RefCell::new(input),
            output: RefCell::new(output),
            filenames,
            image_root: image_root.trim_end_matches('/').to_owned(),
            site_url: site_url.to_owned(),
            date,
        }
    }

    /// Gives back the output stream, e.g. to inspect what was asked.
    pub fn into_output(self) -> W {
        self.output.into_inner()
    }

    fn ask(&self, question: &str) -> Result<String> {
        let mut output = self.output.borrow_mut();
        writeln!(output, "{}", question)?;
        output.flush()?;

        let mut answer = String::new();
        if self.input.borrow_mut().read_line(&mut answer)? == 0 {
            return Err(Error::InputClosed);
        }
        Ok(answer.trim().to_owned())
    }

    fn describe(&self, filename: &str) -> Result<Page> {
        let act = self.ask(&format!("Enter act for {}: ", filename))?;
        let title = self.ask(&format!("Enter title for {}: ", filename))?;
        let description = self.ask(&format!("Enter description for {}: ", filename))?;
        Ok(Page {
            path: page::dated_path(&title, self.date),
            image_url: format!("{}/{}", self.image_root, filename),
            disqus_id: page::default_comment_id(self.date, &self.site_url),
            title,
            description,
            act,
        })
    }

    fn confirmed(&self, filename: &str) -> Result<Page> {
        loop {
            let page = self.describe(filename)?;
            let answer = self.ask(&format!(
                "Creating the following page:\n\ntitle: {}\ndescription: {}\npath: {}\ndisqusId: {}\nimgUrl: {}\n\nok? [yN]",
                page.title, page.description, page.path, page.disqus_id, page.image_url
            ))?;
            if answer == "y" || answer == "Y" {
                return Ok(page);
            }
            writeln!(self.output.borrow_mut(), "Okay, let's try again ...")?;
        }
    }
}

impl<R: BufRead, W: Write> PageSource for Prompt<R, W> {
    fn pages(&self) -> Result<Vec<Page>> {
        self.filenames
            .iter()
            .map(|filename| self.confirmed(filename))
            .collect()
    }
}

/// Lists the file names of the images in `directory` that none of `known`
/// refers to, sorted by name. Only `.png` files count; thumbnails and
/// hidden files are ignored.
pub fn new_images(directory: &Path, known: &[Page]) -> Result<Vec<String>> {
    use walkdir::WalkDir;
    let known: HashSet<&str> = known.iter().map(Page::image_filename).collect();
    let mut filenames = Vec::new();
    for result in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = result?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if name.starts_with('.') || is_thumbnail(name) || !name.ends_with(".png") {
            continue;
        }
        if !known.contains(name) {
            filenames.push(name.to_owned());
        }
    }
    Ok(filenames)
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem reading pages.
#[derive(Debug)]
pub enum Error {
    /// Returned when the project file can't be opened.
    Open { path: PathBuf, err: io::Error },

    /// Returned when the page records are malformed.
    Yaml(serde_yaml::Error),

    /// Returned when the input ends before a page is confirmed.
    InputClosed,

    /// Returned for I/O errors while listing the image directory.
    WalkDir(walkdir::Error),

    /// Returned for other I/O errors.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening project file '{}': {}", path.display(), err)
            }
            Error::Yaml(err) => write!(f, "Reading page records: {}", err),
            Error::InputClosed => write!(f, "Input ended before the page was confirmed"),
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Yaml(err) => Some(err),
            Error::InputClosed => None,
            Error::WalkDir(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for deserializing records.
    fn from(err: serde_yaml::Error) -> Error {
        Error::Yaml(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for directory traversal.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<io::Error> for Error {
    /// Converts a [`io::Error`] into an [`Error`]. It allows us to use the `?`
    /// operator for IO operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::page::fixture;
    use std::io::Cursor;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2013, 8, 1).unwrap()
    }

    #[test]
    fn test_record_source() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("inkstrip.yaml");
        std::fs::write(
            &path,
            r##"
site:
  title: ignored here
pages:
  - title: "#1 A Step in the Dark"
    path: /2013/08/01/a-step-in-the-dark
    img_url: https://cdn.example.com/comicstrips/DevAbode_0001.png
    disqus_id: 8 http://devabo.de/?p=8
    act: Act I
  - title: "#2 Entangled"
    description: Things get complicated.
    path: /2013/08/08/entangled
    img_url: https://cdn.example.com/comicstrips/DevAbode_0002.png
"##,
        )?;

        let pages = RecordSource::new(&path).pages()?;
        assert_eq!(2, pages.len());
        assert_eq!("#1 A Step in the Dark", pages[0].title);
        assert_eq!("", pages[0].description);
        assert_eq!("DevAbode_0002.png", pages[1].image_filename());
        assert_eq!("", pages[1].act);
        Ok(())
    }

    #[test]
    fn test_record_source_without_pages() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("inkstrip.yaml");
        std::fs::write(&path, "site:\n  title: x\n")?;
        assert!(RecordSource::new(&path).pages()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_record_source_missing_file() {
        let result = RecordSource::new("/nonexistent/inkstrip.yaml").pages();
        assert!(matches!(result, Err(Error::Open { .. })));
    }

    #[test]
    fn test_prompt_retries_until_confirmed() -> Result<()> {
        let input = "Act I\nWrong title\n\nn\nAct I\n#1 A Step in the Dark\nIt begins.\ny\n";
        let prompt = Prompt::new(
            Cursor::new(input),
            Vec::new(),
            vec![String::from("DevAbode_0001.png")],
            "https://cdn.example.com/comicstrips/",
            "https://devabo.de",
            date(),
        );
        let pages = prompt.pages()?;

        assert_eq!(1, pages.len());
        let page = &pages[0];
        assert_eq!("#1 A Step in the Dark", page.title);
        assert_eq!("It begins.", page.description);
        assert_eq!("Act I", page.act);
        assert_eq!("/2013/08/01/1-a-step-in-the-dark", page.path);
        assert_eq!(
            "https://cdn.example.com/comicstrips/DevAbode_0001.png",
            page.image_url
        );
        assert_eq!("20130801 https://devabo.de/?p=20130801", page.disqus_id);

        let transcript = String::from_utf8(prompt.into_output()).unwrap_or_default();
        assert_eq!(1, transcript.matches("Okay, let's try again").count());
        assert!(transcript.starts_with("Enter act for DevAbode_0001.png: \n"));
        Ok(())
    }

    #[test]
    fn test_prompt_input_closed() {
        let prompt = Prompt::new(
            Cursor::new("Act I\n"),
            io::sink(),
            vec![String::from("DevAbode_0001.png")],
            "https://cdn.example.com",
            "https://devabo.de",
            date(),
        );
        assert!(matches!(prompt.pages(), Err(Error::InputClosed)));
    }

    #[test]
    fn test_new_images() -> Result<()> {
        let dir = tempfile::tempdir()?;
        for name in [
            "Comic_0001.png",
            "Comic_0002.png",
            "Comic_0003.png",
            "thumb_Comic_0003.png",
            ".Comic_0004.png",
            "notes.txt",
        ] {
            std::fs::write(dir.path().join(name), b"")?;
        }
        std::fs::create_dir(dir.path().join("Comic_0005.png"))?;

        let known = [fixture(1), fixture(2)];
        assert_eq!(vec![String::from("Comic_0003.png")], new_images(dir.path(), &known)?);
        Ok(())
    }
}
