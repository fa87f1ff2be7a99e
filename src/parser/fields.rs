use std::sync::LazyLock;

use regex::Regex;

use crate::record::Action;

static ITEM_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"youtube\.com/(?:watch|post)").unwrap());
static CHANNEL_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"youtube\.com/channel").unwrap());

/// Both class markers must be present on the same element.
const CELL_CLASS_MARKERS: [&str; 2] = ["content-cell", "mdl-cell--6-col"];
pub const CELL_TAG: &str = "div";

/// Actions announced with a trailing space ("Watched&nbsp;<a ...>").
const SPACED_ACTIONS: [Action; 2] = [Action::Watched, Action::Viewed];
const BARE_ACTIONS: [Action; 3] = [Action::Subscribed, Action::Liked, Action::Commented];

const TIMEZONE_MARKER: &str = "GMT";
const MIN_PART_CHARS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Item,
    Channel,
}

/// True for the element that holds one history entry.
pub fn is_record_cell(tag: &str, class: Option<&str>) -> bool {
    tag.eq_ignore_ascii_case(CELL_TAG)
        && class.is_some_and(|c| CELL_CLASS_MARKERS.iter().all(|m| c.contains(m)))
}

pub fn classify_link(href: &str) -> Option<LinkKind> {
    if ITEM_LINK_RE.is_match(href) {
        Some(LinkKind::Item)
    } else if CHANNEL_LINK_RE.is_match(href) {
        Some(LinkKind::Channel)
    } else {
        None
    }
}

pub fn detect_action(text: &str) -> Option<Action> {
    SPACED_ACTIONS
        .into_iter()
        .find(|a| text.contains(&format!("{} ", a.label())))
        .or_else(|| BARE_ACTIONS.into_iter().find(|a| text.contains(a.label())))
}

/// Which descriptive field a line of cell text fills.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Descriptors {
    pub title: Option<String>,
    pub channel: Option<String>,
    pub date: Option<String>,
}

impl Descriptors {
    /// First match wins: a field once set is never replaced.
    pub fn absorb(&mut self, part: &str) {
        if part.starts_with("http") || part.chars().count() < MIN_PART_CHARS {
            return;
        }
        if self.title.is_none() {
            self.title = Some(part.to_string());
        } else if self.channel.is_none() && !part.contains("youtube.com") {
            self.channel = Some(part.to_string());
        } else if self.date.is_none() && part.contains(TIMEZONE_MARKER) {
            self.date = Some(part.to_string());
        }
    }
}

/// Lines of the combined cell text that may carry a title, channel or date.
pub fn candidate_parts(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(str::trim)
        .filter(|p| !p.is_empty() && !Action::is_label(p))
}
