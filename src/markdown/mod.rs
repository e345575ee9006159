//! Markdown rendering for message bodies.
//!
//! Converts message text to HTML the way GitHub renders comments:
//! - tables, strikethrough, task lists and footnotes
//! - single newlines become `<br />`
//! - bare `http(s)://` URLs become links
//!
//! Raw HTML in the input is passed through unchanged.

mod links;

pub use links::detect_plain_urls;

use pulldown_cmark::{html, Event, Options, Parser, TextMergeStream};

use links::autolink;

fn gfm_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

/// Render markdown to an HTML fragment. Empty input renders as "".
pub fn render_markdown(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let events = TextMergeStream::new(Parser::new_ext(text, gfm_options())).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, autolink(events).into_iter());
    out
}
