//! Plain-text URL autolinking.
//!
//! Bare `http://` and `https://` URLs in text become autolinks, as GitHub
//! does. Text inside code, links and images is left alone.

use once_cell::sync::Lazy;
use pulldown_cmark::{CowStr, Event, LinkType, Tag, TagEnd};
use regex::Regex;

/// Plain text URLs (http:// or https://) without whitespace, angle brackets
/// or square brackets.
pub(crate) static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s<>\[\]]+").expect("Invalid URL regex pattern"));

/// Characters dropped from the end of a detected URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ':', ';', '!', '?', '"', '\'', '*', '_', '~'];

/// Byte ranges of the URLs in `text`, trailing punctuation excluded.
pub fn detect_plain_urls(text: &str) -> Vec<(usize, usize)> {
    URL_REGEX
        .find_iter(text)
        .filter_map(|m| {
            let url = trim_url(m.as_str());
            // A bare scheme is not a link
            (url.len() > url.find("://")? + 3).then(|| (m.start(), m.start() + url.len()))
        })
        .collect()
}

/// Strip trailing punctuation and unbalanced closing parentheses.
fn trim_url(url: &str) -> &str {
    let mut url = url;
    loop {
        let trimmed = url.trim_end_matches(TRAILING_PUNCTUATION);
        let trimmed = match trimmed.strip_suffix(')') {
            Some(rest) if trimmed.matches(')').count() > trimmed.matches('(').count() => rest,
            _ => trimmed,
        };
        if trimmed.len() == url.len() {
            return url;
        }
        url = trimmed;
    }
}

/// Rewrite text events so plain URLs become autolinks.
///
/// Expects adjacent text events to be merged already.
pub(crate) fn autolink<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut out = Vec::new();
    // Nesting depth of code blocks, links and images
    let mut opaque = 0usize;

    for event in events {
        match event {
            Event::Start(Tag::CodeBlock(_) | Tag::Link { .. } | Tag::Image { .. }) => {
                opaque += 1;
                out.push(event);
            }
            Event::End(TagEnd::CodeBlock | TagEnd::Link | TagEnd::Image) => {
                opaque = opaque.saturating_sub(1);
                out.push(event);
            }
            Event::Text(text) if opaque == 0 => push_linked_text(&mut out, text),
            other => out.push(other),
        }
    }

    out
}

fn push_linked_text<'a>(out: &mut Vec<Event<'a>>, text: CowStr<'a>) {
    let urls = detect_plain_urls(&text);
    if urls.is_empty() {
        out.push(Event::Text(text));
        return;
    }

    let mut last_end = 0;
    for (start, end) in urls {
        if start > last_end {
            out.push(Event::Text(owned(&text[last_end..start])));
        }
        let url = owned(&text[start..end]);
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: url.clone(),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        out.push(Event::Text(url));
        out.push(Event::End(TagEnd::Link));
        last_end = end;
    }
    if last_end < text.len() {
        out.push(Event::Text(owned(&text[last_end..])));
    }
}

fn owned<'a>(s: &str) -> CowStr<'a> {
    CowStr::from(s.to_string())
}
