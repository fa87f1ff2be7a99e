use tracing::trace;

use super::fields::{self, Descriptors, LinkKind};
use crate::record::{Action, Record};

/// Fields gathered for the entry currently being read.
#[derive(Debug, Default, Clone)]
struct Draft {
    url: Option<String>,
    channel_url: Option<String>,
    action: Option<Action>,
    descriptors: Descriptors,
}

impl Draft {
    fn into_record(self) -> Option<Record> {
        Some(Record {
            url: self.url?,
            action: self.action?,
            channel_url: self.channel_url,
            title: self.descriptors.title,
            channel: self.descriptors.channel,
            date: self.descriptors.date,
        })
    }
}

/// Mutable state for one extraction run. Feed it open/text/close events in
/// document order, then call [`ParseState::finish`].
#[derive(Debug, Default)]
pub struct ParseState {
    in_cell: bool,
    cell_count: usize,
    pending_text: Vec<String>,
    draft: Draft,
    records: Vec<Record>,
}

impl ParseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_tag(&mut self, tag: &str, attrs: &[(String, String)]) {
        if fields::is_record_cell(tag, attr(attrs, "class")) {
            self.in_cell = true;
            self.cell_count += 1;
            self.pending_text.clear();
            return;
        }

        if !self.in_cell || !tag.eq_ignore_ascii_case("a") {
            return;
        }
        let Some(href) = attr(attrs, "href") else {
            return;
        };
        let slot = match fields::classify_link(href) {
            Some(LinkKind::Item) => &mut self.draft.url,
            Some(LinkKind::Channel) => &mut self.draft.channel_url,
            None => return,
        };
        if slot.is_none() {
            *slot = Some(href.to_string());
        }
    }

    pub fn text(&mut self, fragment: &str) {
        if self.in_cell {
            self.pending_text.push(fragment.trim().to_string());
        }
    }

    pub fn close_tag(&mut self, tag: &str) {
        if !self.in_cell || !tag.eq_ignore_ascii_case(fields::CELL_TAG) {
            return;
        }
        self.in_cell = false;
        let mut draft = std::mem::take(&mut self.draft);

        // Cells come in pairs; only the first of each pair describes the entry.
        if self.cell_count % 2 == 0 {
            trace!(cell = self.cell_count, "skipping secondary cell");
            return;
        }

        let combined = self.pending_text.join(" ");
        if let Some(action) = fields::detect_action(&combined) {
            draft.action = Some(action);
        }
        for part in fields::candidate_parts(&combined) {
            draft.descriptors.absorb(part);
        }

        match draft.into_record() {
            Some(record) => self.records.push(record),
            None => trace!(cell = self.cell_count, "cell without link or action"),
        }
    }

    /// Number of record cells entered so far.
    pub fn cells_seen(&self) -> usize {
        self.cell_count
    }

    pub fn finish(self) -> Vec<Record> {
        self.records
    }
}

fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL_CLASS: &str = "content-cell mdl-cell mdl-cell--6-col mdl-typography--body-1";

    fn cell_attrs() -> Vec<(String, String)> {
        vec![("class".into(), CELL_CLASS.into())]
    }

    fn link(href: &str) -> Vec<(String, String)> {
        vec![("href".into(), href.into())]
    }

    fn feed_cell(state: &mut ParseState, links: &[&str], text: &str) {
        state.open_tag("div", &cell_attrs());
        for href in links {
            state.open_tag("a", &link(href));
            state.close_tag("a");
        }
        state.text(text);
        state.close_tag("div");
    }

    #[test]
    fn odd_cell_yields_record() {
        let mut s = ParseState::new();
        feed_cell(
            &mut s,
            &["https://www.youtube.com/watch?v=abc", "https://www.youtube.com/channel/UC1"],
            "Watched \nMy Title\nMy Channel\n",
        );
        let records = s.finish();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.url, "https://www.youtube.com/watch?v=abc");
        assert_eq!(r.channel_url.as_deref(), Some("https://www.youtube.com/channel/UC1"));
        assert_eq!(r.action, Action::Watched);
        assert_eq!(r.title.as_deref(), Some("My Title"));
        assert_eq!(r.channel.as_deref(), Some("My Channel"));
        assert_eq!(r.date, None);
    }

    #[test]
    fn even_cell_never_contributes() {
        let mut s = ParseState::new();
        feed_cell(&mut s, &[], "Watched \nFirst\n");
        feed_cell(&mut s, &["https://www.youtube.com/watch?v=second"], "Watched \nSecond\nChan\n");
        assert_eq!(s.cells_seen(), 2);
        assert!(s.finish().is_empty());
    }

    #[test]
    fn even_cell_links_do_not_leak_into_next_record() {
        let mut s = ParseState::new();
        feed_cell(&mut s, &["https://www.youtube.com/watch?v=one"], "Watched \nOne\n");
        feed_cell(&mut s, &["https://www.youtube.com/watch?v=leak"], "");
        feed_cell(&mut s, &["https://www.youtube.com/watch?v=three"], "Viewed \nThree\n");
        let records = s.finish();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].url, "https://www.youtube.com/watch?v=three");
    }

    #[test]
    fn first_link_of_each_kind_kept() {
        let mut s = ParseState::new();
        feed_cell(
            &mut s,
            &["https://www.youtube.com/watch?v=first", "https://www.youtube.com/post/second"],
            "Viewed \nSome Post\n",
        );
        assert_eq!(s.finish()[0].url, "https://www.youtube.com/watch?v=first");
    }

    #[test]
    fn missing_url_or_action_drops_draft() {
        let mut s = ParseState::new();
        feed_cell(&mut s, &[], "Watched \nTitle only\n");
        feed_cell(&mut s, &[], "");
        feed_cell(&mut s, &["https://www.youtube.com/watch?v=x"], "no marker here\n");
        assert_eq!(s.cells_seen(), 3);
        assert!(s.finish().is_empty());
    }

    #[test]
    fn stray_closes_are_ignored() {
        let mut s = ParseState::new();
        s.close_tag("div");
        s.close_tag("a");
        s.text("Watched \nOutside\n");
        s.open_tag("a", &link("https://www.youtube.com/watch?v=outside"));
        feed_cell(&mut s, &[], "Watched \nInside\n");
        // the link outside a cell was never captured
        assert!(s.finish().is_empty());
    }

    #[test]
    fn text_joined_with_spaces() {
        let mut s = ParseState::new();
        s.open_tag("div", &cell_attrs());
        s.text("Watched");
        s.open_tag("a", &link("https://www.youtube.com/watch?v=abc"));
        s.text("  Some video  ");
        s.close_tag("a");
        s.close_tag("div");
        let records = s.finish();
        assert_eq!(records[0].action, Action::Watched);
        assert_eq!(records[0].title.as_deref(), Some("Watched Some video"));
    }

    #[test]
    fn title_not_overwritten_by_later_parts() {
        let mut s = ParseState::new();
        feed_cell(
            &mut s,
            &["https://www.youtube.com/watch?v=abc"],
            "Watched \nTitle A\nChannel B\nTitle C\nJan 1, 2024, 1:00:00 AM GMT\nFeb 2, 2024, 2:00:00 AM GMT",
        );
        let r = &s.finish()[0];
        assert_eq!(r.title.as_deref(), Some("Title A"));
        assert_eq!(r.channel.as_deref(), Some("Channel B"));
        assert_eq!(r.date.as_deref(), Some("Jan 1, 2024, 1:00:00 AM GMT"));
    }
}
