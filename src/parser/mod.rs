pub mod fields;
pub mod state;

use std::borrow::Cow;
use std::sync::LazyLock;

use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::record::Record;
use state::ParseState;

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[A-Za-z][A-Za-z0-9]*);").unwrap());

/// Extract history records from a Takeout `watch-history.html` document.
///
/// The markup is read as a stream of open/text/close events. Malformed
/// markup never fails the call; unreadable stretches are logged and skipped.
pub fn extract_records(html: &str) -> Vec<Record> {
    let html = escape_stray_lt(html);
    let mut reader = Reader::from_str(&html);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut state = ParseState::new();
    let mut last_error_at = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let (name, attrs) = open_tag(&e);
                state.open_tag(&name, &attrs);
            }
            Ok(Event::Empty(e)) => {
                let (name, attrs) = open_tag(&e);
                state.open_tag(&name, &attrs);
                state.close_tag(&name);
            }
            Ok(Event::End(e)) => {
                state.close_tag(&String::from_utf8_lossy(e.name().as_ref()));
            }
            Ok(Event::Text(e)) => {
                let raw = String::from_utf8_lossy(&e);
                state.text(&unescape_html(&raw));
            }
            Ok(Event::CData(e)) => {
                state.text(&String::from_utf8_lossy(&e));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                let pos = reader.buffer_position();
                warn!(position = pos, error = %e, "Skipping malformed markup");
                if last_error_at == Some(pos) {
                    break;
                }
                last_error_at = Some(pos);
            }
        }
    }

    debug!(cells = state.cells_seen(), "Finished reading document");
    state.finish()
}

fn open_tag(e: &BytesStart) -> (String, Vec<(String, String)>) {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let attrs = e
        .html_attributes()
        .filter_map(Result::ok)
        .map(|a| {
            let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
            let value = unescape_html(&String::from_utf8_lossy(&a.value)).into_owned();
            (key, value)
        })
        .collect();
    (name, attrs)
}

/// HTML treats `<` followed by anything but a name start as text; the XML
/// tokenizer would swallow it as a tag, so it is escaped up front.
fn escape_stray_lt(html: &str) -> Cow<'_, str> {
    let bytes = html.as_bytes();
    let opens_markup = |i: usize| {
        bytes
            .get(i + 1)
            .is_some_and(|b| b.is_ascii_alphabetic() || matches!(*b, b'/' | b'!' | b'?'))
    };
    if html.match_indices('<').all(|(i, _)| opens_markup(i)) {
        return Cow::Borrowed(html);
    }

    let mut out = String::with_capacity(html.len() + 16);
    let mut last = 0;
    for (i, _) in html.match_indices('<') {
        if !opens_markup(i) {
            out.push_str(&html[last..i]);
            out.push_str("&lt;");
            last = i + 1;
        }
    }
    out.push_str(&html[last..]);
    Cow::Owned(out)
}

/// Resolve HTML5 named and numeric references one at a time. A reference
/// that does not resolve, and any bare `&`, is kept as written.
fn unescape_html(raw: &str) -> Cow<'_, str> {
    ENTITY_RE.replace_all(raw, |caps: &Captures| {
        resolve_reference(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    })
}

fn resolve_reference(name: &str) -> Option<String> {
    let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse().ok()?
    } else {
        return resolve_html5_entity(name).map(str::to_string);
    };
    char::from_u32(code).map(String::from)
}

// ── Tests ──
