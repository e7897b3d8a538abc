//! Looks up archive thumbnails. Thumbnails are produced by an external tool
//! and stored next to the full-size images as `thumb_{filename}`; this module
//! only reads them back, together with their pixel dimensions.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use std::io;
use std::path::PathBuf;

/// The prefix of thumbnail file names.
pub const THUMBNAIL_PREFIX: &str = "thumb_";

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// A thumbnail ready for embedding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Thumbnail {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Thumbnail {
    /// The thumbnail as a `data:` URI, so the archive page needs no extra
    /// requests.
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.data))
    }
}

/// Provides the thumbnail of an image, given the image's file name.
pub trait Thumbnailer {
    fn thumbnail(&self, filename: &str) -> Result<Thumbnail>;
}

/// Reads pre-generated thumbnails from a directory.
pub struct CachedThumbnails {
    directory: PathBuf,
}

impl CachedThumbnails {
    pub fn new<P: Into<PathBuf>>(directory: P) -> CachedThumbnails {
        CachedThumbnails {
            directory: directory.into(),
        }
    }

    /// The location of the thumbnail for `filename`.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.directory
            .join(format!("{}{}", THUMBNAIL_PREFIX, filename))
    }
}

impl Thumbnailer for CachedThumbnails {
    fn thumbnail(&self, filename: &str) -> Result<Thumbnail> {
        let path = self.path_for(filename);
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::Missing(path));
            }
            Err(e) => return Err(Error::Io(e)),
        };
        let (width, height) = png_dimensions(&data).ok_or_else(|| Error::NotPng(path.clone()))?;
        Ok(Thumbnail {
            path,
            width,
            height,
            data,
        })
    }
}

/// Reads width and height from the `IHDR` chunk, which the PNG format
/// requires to come first.
pub fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let rest = data.strip_prefix(PNG_SIGNATURE)?;
    // chunk length (4 bytes), chunk type (4 bytes), then width and height
    if rest.get(4..8)? != b"IHDR" {
        return None;
    }
    let word = |at: usize| -> Option<u32> {
        let bytes: [u8; 4] = rest.get(at..at + 4)?.try_into().ok()?;
        Some(u32::from_be_bytes(bytes))
    };
    Some((word(8)?, word(12)?))
}

/// Returns `true` for file names which are thumbnails themselves.
pub fn is_thumbnail(filename: &str) -> bool {
    filename.starts_with(THUMBNAIL_PREFIX)
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem looking up a thumbnail.
#[derive(Debug)]
pub enum Error {
    /// Returned when no thumbnail has been generated for an image yet.
    Missing(PathBuf),

    /// Returned when the thumbnail file isn't a PNG image.
    NotPng(PathBuf),

    /// Returned for other I/O errors.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Missing(path) => write!(f, "missing thumbnail `{}`", path.display()),
            Error::NotPng(path) => write!(f, "thumbnail `{}` is not a PNG image", path.display()),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Missing(_) => None,
            Error::NotPng(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for Error {
    /// Converts [`io::Error`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

/// The smallest byte sequence [`png_dimensions`] accepts: the signature and
/// an `IHDR` chunk header.
#[cfg(test)]
pub(crate) fn png_header(width: u32, height: u32) -> Vec<u8> {
    let mut data = PNG_SIGNATURE.to_vec();
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data
}

/// A thumbnailer which serves fixed dimensions for every file name.
#[cfg(test)]
pub(crate) struct FixedThumbnails(pub u32, pub u32);

#[cfg(test)]
impl Thumbnailer for FixedThumbnails {
    fn thumbnail(&self, filename: &str) -> Result<Thumbnail> {
        Ok(Thumbnail {
            path: PathBuf::from("thumbs").join(format!("{}{}", THUMBNAIL_PREFIX, filename)),
            width: self.0,
            height: self.1,
            data: png_header(self.0, self.1),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_png_dimensions() {
        assert_eq!(Some((150, 250)), png_dimensions(&png_header(150, 250)));
        assert_eq!(None, png_dimensions(b"GIF89a"));
        assert_eq!(None, png_dimensions(&png_header(1, 1)[..20]));
    }

    #[test]
    fn test_cached_thumbnail() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("thumb_a.png"), png_header(150, 250))?;
        std::fs::write(dir.path().join("thumb_b.png"), b"not a png")?;
        let thumbnails = CachedThumbnails::new(dir.path());

        let thumbnail = thumbnails.thumbnail("a.png")?;
        assert_eq!((150, 250), (thumbnail.width, thumbnail.height));
        assert!(thumbnail.data_uri().starts_with("data:image/png;base64,iVBORw0KGgo"));

        assert!(matches!(thumbnails.thumbnail("b.png"), Err(Error::NotPng(_))));
        assert!(matches!(thumbnails.thumbnail("c.png"), Err(Error::Missing(_))));
        Ok(())
    }

    #[test]
    fn test_is_thumbnail() {
        assert!(is_thumbnail("thumb_Comic_0085.png"));
        assert!(!is_thumbnail("Comic_0085.png"));
    }
}
