//! The bounded, newest-first view of the comic shared by the archive page and
//! the feed, and the archive listing itself.

use crate::node::Element;
use crate::page::Page;
use crate::thumbnail::{self, Thumbnailer};
use tracing::warn;

/// The default number of pages in the archive and the feed.
pub const RECENT_PAGES: usize = 11;

/// Returns the last `min(items.len(), limit)` items, newest (i.e. last
/// added) first. Shorter collections yield all of their items.
pub fn recent<T>(items: &[T], limit: usize) -> Vec<&T> {
    let start = items.len().saturating_sub(limit);
    items[start..].iter().rev().collect()
}

/// Builds the `<ul class="archive">` listing: one thumbnail linking to the
/// page for each of `pages`, in the given order.
///
/// Pages whose thumbnail hasn't been generated yet are left out (with a
/// warning) so a freshly added page doesn't block the build. Every other
/// thumbnail problem is returned to the caller.
pub fn listing(
    pages: &[&Page],
    served_root: &str,
    thumbnails: &dyn Thumbnailer,
) -> Result<Element, thumbnail::Error> {
    let mut list = Element::new("ul");
    list.attr("class", "archive");
    for page in pages {
        let thumbnail = match thumbnails.thumbnail(page.image_filename()) {
            Ok(thumbnail) => thumbnail,
            Err(thumbnail::Error::Missing(path)) => {
                warn!(
                    page = %page.path,
                    thumbnail = %path.display(),
                    "Skipping page without thumbnail"
                );
                continue;
            }
            Err(e) => return Err(e),
        };
        list.append_element("li")
            .append_element("a")
            .attr("href", page.url(served_root))
            .append_element("img")
            .attr("src", thumbnail.data_uri())
            .attr("width", thumbnail.width.to_string())
            .attr("height", thumbnail.height.to_string())
            .attr("alt", page.title.as_str())
            .attr("title", page.title.as_str());
    }
    Ok(list)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::page::fixture;
    use crate::thumbnail::{FixedThumbnails, Thumbnail};
    use std::path::PathBuf;

    fn numbers(n: usize) -> Vec<usize> {
        (1..=n).collect()
    }

    #[test]
    fn test_recent_short_sequences() {
        assert!(recent::<usize>(&[], RECENT_PAGES).is_empty());
        assert_eq!(vec![&3, &2, &1], recent(&numbers(3), RECENT_PAGES));
        assert_eq!(
            numbers(10).iter().rev().collect::<Vec<_>>(),
            recent(&numbers(10), RECENT_PAGES)
        );
    }

    #[test]
    fn test_recent_exactly_eleven() {
        let items = numbers(11);
        let window = recent(&items, RECENT_PAGES);
        assert_eq!(11, window.len());
        assert_eq!(&11, window[0]);
        assert_eq!(&1, window[10]);
    }

    #[test]
    fn test_recent_long_sequence() {
        let items = numbers(25);
        let window = recent(&items, RECENT_PAGES);
        assert_eq!(
            (15..=25).rev().collect::<Vec<_>>(),
            window.into_iter().copied().collect::<Vec<_>>()
        );
        assert_eq!(vec![&25, &24, &23], recent(&items, 3));
    }

    #[test]
    fn test_listing() -> Result<(), thumbnail::Error> {
        let pages = [fixture(2), fixture(1)];
        let refs: Vec<&Page> = pages.iter().collect();
        let list = listing(&refs, "https://devabo.de", &FixedThumbnails(150, 250))?;
        let html = list.render();

        assert!(html.starts_with(concat!(
            r#"<ul class="archive"><li><a href="https://devabo.de/2013/08/03/page-2">"#,
            r#"<img src="data:image/png;base64,"#,
        )));
        assert!(html.contains(
            r##"width="150" height="250" alt="#2 Page" title="#2 Page"></a></li>"##
        ));
        assert_eq!(2, list.children().len());
        Ok(())
    }

    struct MissingThumbnails;

    impl Thumbnailer for MissingThumbnails {
        fn thumbnail(&self, filename: &str) -> Result<Thumbnail, thumbnail::Error> {
            Err(thumbnail::Error::Missing(PathBuf::from(filename)))
        }
    }

    #[test]
    fn test_listing_skips_missing_thumbnails() -> Result<(), thumbnail::Error> {
        let page = fixture(1);
        let list = listing(&[&page], "https://devabo.de", &MissingThumbnails)?;
        assert_eq!(r#"<ul class="archive"></ul>"#, list.render());
        Ok(())
    }
}
