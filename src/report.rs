use std::io::Write;

use anyhow::Result;
use chrono::SecondsFormat;
use serde::Serialize;

use crate::record::{partition_watched, Record};

const RULE_WIDTH: usize = 80;

/// Counts, then a numbered listing of everything that was not a plain watch.
pub fn write_summary<W: Write>(out: &mut W, records: &[Record]) -> Result<()> {
    let (watched, not_watched) = partition_watched(records);

    writeln!(out, "Total videos: {}", records.len())?;
    writeln!(out, "Watched videos: {}", watched.len())?;
    writeln!(out, "Not watched (Viewed, etc.): {}", not_watched.len())?;
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "Videos that were NOT watched:")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out)?;

    for (i, r) in not_watched.iter().enumerate() {
        writeln!(out, "{}. Action: {}", i + 1, r.action)?;
        writeln!(out, "   Title: {}", r.title.as_deref().unwrap_or("No title"))?;
        writeln!(out, "   Channel: {}", r.channel.as_deref().unwrap_or("Unknown channel"))?;
        writeln!(out, "   URL: {}", r.url)?;
        writeln!(out, "   Date: {}", r.date.as_deref().unwrap_or("No date"))?;
        writeln!(out)?;
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonRecord<'a> {
    #[serde(flatten)]
    record: &'a Record,
    /// RFC 3339 in UTC; set only for GMT/UTC dates.
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    /// Wall-clock time in the export's own zone, no offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    local_timestamp: Option<String>,
}

/// All records as a pretty JSON array. Dates labelled GMT/UTC get a
/// `timestamp`; other readable dates get only a `localTimestamp`.
pub fn write_json<W: Write>(out: &mut W, records: &[Record]) -> Result<()> {
    let rows: Vec<JsonRecord> = records
        .iter()
        .map(|record| {
            let timestamp = record
                .utc_timestamp()
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true));
            let local_timestamp = match timestamp {
                Some(_) => None,
                None => record
                    .timestamp()
                    .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
            };
            JsonRecord {
                record,
                timestamp,
                local_timestamp,
            }
        })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &rows)?;
    writeln!(out)?;
    Ok(())
}
