//! Line-oriented key counting in map/reduce style.
//!
//! The mapper turns the posts CSV into `hashtag<TAB>mentions` pairs. The
//! reducer sums `key<TAB>value` lines over runs of the same key, so sorted
//! input gives one total per key and unsorted input gives one per run.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::{BufRead, Read, Write};
use tracing::debug;

use crate::error::{Result, TrendError};

/// Parses a signed count, falling back to 0. Run totals saturate at the i64 bounds.
fn parse_or_zero(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

fn column(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| TrendError::MissingColumns(vec![name.to_string()]))
}

/// Emits `(hashtag, mentions)` for every row with a non-empty hashtag.
pub fn map_mentions<R: Read>(reader: R) -> Result<Vec<(String, i64)>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::Headers).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let hashtag_idx = column(&headers, "hashtag")?;
    let mentions_idx = headers.iter().position(|h| h == "mentions");

    let mut pairs = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let hashtag = record.get(hashtag_idx).unwrap_or("").trim();
        if hashtag.is_empty() {
            continue;
        }
        let mentions = mentions_idx
            .and_then(|i| record.get(i))
            .map(parse_or_zero)
            .unwrap_or(0);
        pairs.push((hashtag.to_string(), mentions));
    }

    debug!(pairs = pairs.len(), "Mapped rows to key/value pairs");
    Ok(pairs)
}

/// Accumulator for the reduce fold: the run being summed and every run
/// already closed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct KeyTotals {
    current: Option<(String, i64)>,
    emitted: Vec<(String, i64)>,
}

impl KeyTotals {
    /// Adds one pair. A new key closes the previous run.
    pub fn push(mut self, key: &str, value: i64) -> Self {
        if let Some((k, total)) = self.current.as_mut() {
            if k.as_str() == key {
                *total = total.saturating_add(value);
                return self;
            }
        }
        if let Some(done) = self.current.replace((key.to_string(), value)) {
            self.emitted.push(done);
        }
        self
    }

    /// Closes the last run and returns all totals in first-seen run order.
    pub fn finish(mut self) -> Vec<(String, i64)> {
        if let Some(done) = self.current.take() {
            self.emitted.push(done);
        }
        self.emitted
    }
}

/// Splits a `key<TAB>value` line. Blank or malformed lines yield `None`.
pub fn parse_pair(line: &str) -> Option<(&str, i64)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let mut parts = line.split('\t');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(value), None) => Some((key, parse_or_zero(value))),
        _ => None,
    }
}

/// Sums contiguous runs of equal keys.
pub fn reduce_lines<I, S>(lines: I) -> Vec<(String, i64)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .fold(KeyTotals::default(), |acc, line| {
            match parse_pair(line.as_ref()) {
                Some((key, value)) => acc.push(key, value),
                None => acc,
            }
        })
        .finish()
}

/// Reads `key<TAB>value` lines and reduces them.
pub fn reduce_reader<R: BufRead>(reader: R) -> Result<Vec<(String, i64)>> {
    let lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
    Ok(reduce_lines(lines))
}

/// Writes pairs as `key<TAB>value` lines.
pub fn write_pairs<W: Write>(mut writer: W, pairs: &[(String, i64)]) -> Result<()> {
    for (key, value) in pairs {
        writeln!(writer, "{key}\t{value}")?;
    }
    writer.flush()?;
    Ok(())
}
