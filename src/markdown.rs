use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag};

/// Converts the markdown of a data page (about, imprint) into HTML.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(
        &mut out,
        Parser::new_ext(markdown, options).map(demote_headings),
    );
    out
}

// The headings of the content are subordinate to the site's home link and
// the page headline (`<h3>`), so `#` becomes `<h4>`.
fn demote_headings(ev: Event) -> Event {
    match ev {
        Event::Start(Tag::Heading(level, id, classes)) => {
            Event::Start(Tag::Heading(demote(level), id, classes))
        }
        Event::End(Tag::Heading(level, id, classes)) => {
            Event::End(Tag::Heading(demote(level), id, classes))
        }
        _ => ev,
    }
}

fn demote(level: HeadingLevel) -> HeadingLevel {
    HeadingLevel::try_from(level as usize + 3).unwrap_or(HeadingLevel::H6)
}
