use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

/// What the account did with the item, as labelled in the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    Watched,
    Viewed,
    Subscribed,
    Liked,
    Commented,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Watched,
        Action::Viewed,
        Action::Subscribed,
        Action::Liked,
        Action::Commented,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::Watched => "Watched",
            Action::Viewed => "Viewed",
            Action::Subscribed => "Subscribed",
            Action::Liked => "Liked",
            Action::Commented => "Commented",
        }
    }

    pub fn is_label(s: &str) -> bool {
        Self::ALL.iter().any(|a| a.label() == s)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One finalized history entry. `url` and `action` are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_url: Option<String>,
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

const DATE_FORMATS: &[&str] = &["%b %d, %Y, %I:%M:%S %p", "%d %b %Y, %H:%M:%S"];

impl Record {
    pub fn is_watched(&self) -> bool {
        self.action == Action::Watched
    }

    /// Wall-clock time of `date` (e.g. "Mar 3, 2024, 9:41:07 PM CET"),
    /// ignoring its zone.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.parse_date().map(|(ts, _)| ts)
    }

    /// The same instant in UTC, only when the export labels it GMT or UTC.
    pub fn utc_timestamp(&self) -> Option<DateTime<Utc>> {
        match self.parse_date()? {
            (ts, Some(zone)) if matches!(zone.as_str(), "GMT" | "UTC") => Some(ts.and_utc()),
            _ => None,
        }
    }

    fn parse_date(&self) -> Option<(NaiveDateTime, Option<String>)> {
        let raw = self.date.as_deref()?.replace(['\u{202f}', '\u{a0}'], " ");
        let raw = raw.trim();
        let (body, zone) = match raw.rsplit_once(' ') {
            Some((head, zone)) if is_zone(zone) => (head, Some(zone.to_string())),
            _ => (raw, None),
        };
        let ts = DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(body, fmt).ok())?;
        Some((ts, zone))
    }
}

fn is_zone(token: &str) -> bool {
    !matches!(token, "AM" | "PM") && !token.is_empty() && token.chars().all(|c| c.is_ascii_alphabetic())
}

/// Split records into (watched, everything else), preserving order.
pub fn partition_watched(records: &[Record]) -> (Vec<&Record>, Vec<&Record>) {
    records.iter().partition(|r| r.is_watched())
}
