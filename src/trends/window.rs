//! Calendar windows: deriving a canonical key from a date and recovering the
//! chronological position of a key that only survived as a string.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TrendError};

/// One accepted input date layout. The year field must be exactly four
/// digits; chrono's `%Y` alone would take `25` as year 25.
#[derive(Debug, Clone, Copy)]
pub struct DateLayout {
    pub format: &'static str,
    pub separator: char,
    pub year_field: usize,
}

/// Input date layouts, tried in order. The first one that parses wins.
pub const DATE_LAYOUTS: &[DateLayout] = &[
    DateLayout {
        format: "%d-%m-%Y",
        separator: '-',
        year_field: 2,
    },
    DateLayout {
        format: "%Y-%m-%d",
        separator: '-',
        year_field: 0,
    },
    DateLayout {
        format: "%d/%m/%Y",
        separator: '/',
        year_field: 2,
    },
];

impl DateLayout {
    pub fn parse(&self, s: &str) -> Option<NaiveDate> {
        let fields: Vec<&str> = s.split(self.separator).collect();
        if fields.len() != 3 {
            return None;
        }
        let year = fields[self.year_field];
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        NaiveDate::parse_from_str(s, self.format).ok()
    }
}

/// Width of the calendar bucket a post is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Granularity {
    #[default]
    Day,
    /// ISO 8601 week, Monday start.
    Week,
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            other => Err(TrendError::Granularity(other.to_string())),
        }
    }
}

impl TryFrom<String> for Granularity {
    type Error = TrendError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Parses a post date in any of the [`DATE_LAYOUTS`].
///
/// # Errors
///
/// Returns [`TrendError::DateFormat`] when none of the layouts match.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    DATE_LAYOUTS
        .iter()
        .find_map(|layout| layout.parse(trimmed))
        .ok_or_else(|| TrendError::DateFormat(raw.to_string()))
}

/// A window identifier that keeps the instant it was derived from.
///
/// `label` is the canonical display string (`YYYY-MM-DD`, `YYYY-Www` or
/// `YYYY-MM`); `start` is the first day of the window. Only the label is
/// serialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowKey {
    label: String,
    start: NaiveDate,
}

impl WindowKey {
    /// Buckets `date` into its window for the given granularity.
    pub fn derive(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Day => WindowKey {
                label: date.format("%Y-%m-%d").to_string(),
                start: date,
            },
            Granularity::Week => {
                let week = date.iso_week();
                WindowKey {
                    label: date.format("%G-W%V").to_string(),
                    start: NaiveDate::from_isoywd_opt(week.year(), week.week(), Weekday::Mon)
                        .unwrap_or(date),
                }
            }
            Granularity::Month => WindowKey {
                label: date.format("%Y-%m").to_string(),
                start: date.with_day(1).unwrap_or(date),
            },
        }
    }

    /// Rebuilds a key from its label alone. Never fails: unparseable labels
    /// start at [`NaiveDate::MIN`].
    pub fn from_label(label: impl Into<String>) -> Self {
        let label = label.into();
        let start = chronological_key(&label);
        WindowKey { label, start }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }
}

impl Ord for WindowKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.label.cmp(&other.label))
    }
}

impl PartialOrd for WindowKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for WindowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl Serialize for WindowKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

impl<'de> Deserialize<'de> for WindowKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(WindowKey::from_label(label))
    }
}

/// Recovers the first day of the window named by `label`.
///
/// | Shape                          | Read as                     |
/// |--------------------------------|-----------------------------|
/// | 10 chars of digits and dashes  | `YYYY-MM-DD`                |
/// | contains `-W`                  | ISO `YYYY-Www`, its Monday  |
/// | 7 chars                        | `YYYY-MM`, the 1st          |
/// | anything else / parse failure  | [`NaiveDate::MIN`]          |
pub fn chronological_key(label: &str) -> NaiveDate {
    parse_window_start(label).unwrap_or(NaiveDate::MIN)
}

fn parse_window_start(label: &str) -> Option<NaiveDate> {
    if label.len() == 10 && label.chars().all(|c| c.is_ascii_digit() || c == '-') {
        return NaiveDate::parse_from_str(label, "%Y-%m-%d").ok();
    }

    if let Some((year, week)) = label.split_once("-W") {
        let year: i32 = year.parse().ok()?;
        let week: u32 = week.parse().ok()?;
        return NaiveDate::from_isoywd_opt(year, week, Weekday::Mon);
    }

    if label.len() == 7 {
        return NaiveDate::parse_from_str(&format!("{label}-01"), "%Y-%m-%d").ok();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_accepts_all_layouts() {
        let expected = date(2025, 5, 1);
        assert_eq!(parse_date("01-05-2025").unwrap(), expected);
        assert_eq!(parse_date("2025-05-01").unwrap(), expected);
        assert_eq!(parse_date("01/05/2025").unwrap(), expected);
        assert_eq!(parse_date("  01-05-2025 ").unwrap(), expected);
    }

    #[test]
    fn test_parse_date_rejects_unknown_layout() {
        let err = parse_date("May 1st 2025").unwrap_err();
        assert!(matches!(err, TrendError::DateFormat(_)));
        assert!(parse_date("").is_err());
        assert!(parse_date("32-01-2025").is_err());
    }

    #[test]
    fn test_parse_date_rejects_short_year() {
        for raw in ["01-05-25", "25-05-01", "01-05-202", "01/05/25", "025-05-01"] {
            assert!(
                matches!(parse_date(raw), Err(TrendError::DateFormat(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_date_accepts_unpadded_day_and_month() {
        assert_eq!(parse_date("1-5-2025").unwrap(), date(2025, 5, 1));
        assert_eq!(parse_date("2025-5-1").unwrap(), date(2025, 5, 1));
        assert_eq!(parse_date("1/5/2025").unwrap(), date(2025, 5, 1));
    }

    #[test]
    fn test_day_key_is_same_for_every_layout() {
        for raw in ["02-05-2025", "2025-05-02", "02/05/2025"] {
            let key = WindowKey::derive(parse_date(raw).unwrap(), Granularity::Day);
            assert_eq!(key.label(), "2025-05-02");
            assert_eq!(key.label().len(), 10);
        }
    }

    #[test]
    fn test_week_key_uses_iso_week_year() {
        let key = WindowKey::derive(date(2023, 1, 1), Granularity::Week);
        assert_eq!(key.label(), "2022-W52");
        assert_eq!(key.start(), date(2022, 12, 26));

        // 2024-12-30 is a Monday in ISO week 1 of 2025
        let key = WindowKey::derive(date(2024, 12, 30), Granularity::Week);
        assert_eq!(key.label(), "2025-W01");
        assert_eq!(key.start(), date(2024, 12, 30));

        let key = WindowKey::derive(date(2021, 1, 3), Granularity::Week);
        assert_eq!(key.label(), "2020-W53");
    }

    #[test]
    fn test_week_key_is_zero_padded() {
        let key = WindowKey::derive(date(2025, 1, 8), Granularity::Week);
        assert_eq!(key.label(), "2025-W02");
        assert_eq!(key.start(), date(2025, 1, 6));
    }

    #[test]
    fn test_month_key_starts_on_first() {
        let key = WindowKey::derive(date(2025, 5, 17), Granularity::Month);
        assert_eq!(key.label(), "2025-05");
        assert_eq!(key.start(), date(2025, 5, 1));
    }

    #[test]
    fn test_granularity_from_str() {
        assert_eq!("day".parse::<Granularity>().unwrap(), Granularity::Day);
        assert_eq!("week".parse::<Granularity>().unwrap(), Granularity::Week);
        assert_eq!("month".parse::<Granularity>().unwrap(), Granularity::Month);
        assert!(matches!(
            "hour".parse::<Granularity>(),
            Err(TrendError::Granularity(_))
        ));
    }

    #[test]
    fn test_granularity_deserialize_goes_through_from_str() {
        let g: Granularity = serde_json::from_str(r#""week""#).unwrap();
        assert_eq!(g, Granularity::Week);

        let err = serde_json::from_str::<Granularity>(r#""hour""#).unwrap_err();
        assert!(err.to_string().contains("Invalid window granularity: hour"));
    }

    #[test]
    fn test_chronological_key_per_shape() {
        assert_eq!(chronological_key("2025-05-02"), date(2025, 5, 2));
        assert_eq!(chronological_key("2022-W52"), date(2022, 12, 26));
        assert_eq!(chronological_key("2025-02"), date(2025, 2, 1));
    }

    #[test]
    fn test_chronological_key_unparseable_is_earliest() {
        assert_eq!(chronological_key(""), NaiveDate::MIN);
        assert_eq!(chronological_key("not-a-date"), NaiveDate::MIN);
        assert_eq!(chronological_key("2025-13-45"), NaiveDate::MIN);
        assert_eq!(chronological_key("2025-W99"), NaiveDate::MIN);
        assert_eq!(chronological_key("2025-13"), NaiveDate::MIN);
    }

    #[test]
    fn test_from_label_matches_derived_key() {
        for g in [Granularity::Day, Granularity::Week, Granularity::Month] {
            let derived = WindowKey::derive(date(2024, 2, 29), g);
            assert_eq!(WindowKey::from_label(derived.label()), derived);
        }
    }

    #[test]
    fn test_window_key_orders_chronologically() {
        let early = WindowKey::from_label("2024-W52");
        let late = WindowKey::from_label("2025-W01");
        let junk = WindowKey::from_label("???");
        assert!(early < late);
        assert!(junk < early);
    }
}
