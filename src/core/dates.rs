//! Date reformatting for date-flagged columns
//!
//! Parses native and textual date values and renders them in one of the
//! recognised output patterns, with Russian or English month names.
//! Formatting never fails: values that cannot be read as a date are kept as text.

use crate::types::CellValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Output patterns accepted in the `date_format` column
pub const RECOGNIZED_DATE_FORMATS: [&str; 7] = [
    "DD.MM.YYYY",
    "DD/MM/YYYY",
    "DD-MM-YYYY",
    "YYYY-MM-DD",
    "MM/DD/YYYY",
    "DD MMM YYYY",
    "DD MMMM YYYY",
];

/// Locales accepted in the `date_locale` column
pub const RECOGNIZED_LOCALES: [&str; 2] = ["ru", "en"];

/// Explicit input formats, tried in order before lenient inference
const CANDIDATE_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%m/%d/%Y"];
const CANDIDATE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const LENIENT_DATETIME_FORMATS: [&str; 10] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

const LENIENT_DATE_FORMATS: [&str; 9] = [
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d-%m-%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
];

static MONTHS_RU: [&str; 12] = [
    "янв", "фев", "мар", "апр", "май", "июн", "июл", "авг", "сен", "окт", "ноя", "дек",
];

static MONTHS_RU_FULL: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

static MONTHS_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

static MONTHS_EN_FULL: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Output date pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePattern {
    /// `DD.MM.YYYY`
    DotDayFirst,
    /// `DD/MM/YYYY`
    SlashDayFirst,
    /// `DD-MM-YYYY`
    DashDayFirst,
    /// `YYYY-MM-DD`
    Iso,
    /// `MM/DD/YYYY`
    SlashMonthFirst,
    /// `DD MMM YYYY`
    ShortMonthName,
    /// `DD MMMM YYYY`
    FullMonthName,
}

impl DatePattern {
    /// Parse a pattern name; `None` if it is not one of the recognised seven
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "DD.MM.YYYY" => Some(DatePattern::DotDayFirst),
            "DD/MM/YYYY" => Some(DatePattern::SlashDayFirst),
            "DD-MM-YYYY" => Some(DatePattern::DashDayFirst),
            "YYYY-MM-DD" => Some(DatePattern::Iso),
            "MM/DD/YYYY" => Some(DatePattern::SlashMonthFirst),
            "DD MMM YYYY" => Some(DatePattern::ShortMonthName),
            "DD MMMM YYYY" => Some(DatePattern::FullMonthName),
            _ => None,
        }
    }

    /// Like [`DatePattern::parse`] but falls back to `DD.MM.YYYY`
    pub fn resolve(name: &str) -> Self {
        Self::parse(name).unwrap_or(DatePattern::DotDayFirst)
    }
}

/// Month-name locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLocale {
    Ru,
    En,
}

impl DateLocale {
    /// Exact match on `ru` or `en`
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "ru" => Some(DateLocale::Ru),
            "en" => Some(DateLocale::En),
            _ => None,
        }
    }

    /// Unrecognised tags use the Russian tables
    pub fn resolve(tag: &str) -> Self {
        Self::parse(tag).unwrap_or(DateLocale::Ru)
    }

    fn month_names(&self, full: bool) -> &'static [&'static str; 12] {
        match (self, full) {
            (DateLocale::Ru, false) => &MONTHS_RU,
            (DateLocale::Ru, true) => &MONTHS_RU_FULL,
            (DateLocale::En, false) => &MONTHS_EN,
            (DateLocale::En, true) => &MONTHS_EN_FULL,
        }
    }
}

/// Result of formatting one cell
#[derive(Debug, Clone, PartialEq)]
pub enum DateOutcome {
    /// Null-like input
    Blank,
    Formatted(String),
    /// Not readable as a date; carries the original text
    Degraded(String),
}

impl DateOutcome {
    pub fn into_text(self) -> String {
        match self {
            DateOutcome::Blank => String::new(),
            DateOutcome::Formatted(s) | DateOutcome::Degraded(s) => s,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, DateOutcome::Degraded(_))
    }
}

/// Renders cells of one date column
#[derive(Debug, Clone, Copy)]
pub struct DateFormatter {
    pattern: DatePattern,
    locale: DateLocale,
}

impl DateFormatter {
    pub fn new(pattern: DatePattern, locale: DateLocale) -> Self {
        Self { pattern, locale }
    }

    /// Build from the raw `date_format` / `date_locale` strings of a column spec
    pub fn from_spec(date_format: &str, date_locale: &str) -> Self {
        Self::new(DatePattern::resolve(date_format), DateLocale::resolve(date_locale))
    }

    pub fn format_cell(&self, value: &CellValue) -> DateOutcome {
        match value {
            CellValue::Empty => DateOutcome::Blank,
            CellValue::Text(s) if s.is_empty() => DateOutcome::Blank,
            CellValue::DateTime(dt) => DateOutcome::Formatted(self.render(dt.date())),
            CellValue::Text(s) => match parse_date_text(s) {
                Some(date) => DateOutcome::Formatted(self.render(date)),
                None => DateOutcome::Degraded(s.clone()),
            },
            other => DateOutcome::Degraded(other.to_string()),
        }
    }

    pub fn render(&self, date: NaiveDate) -> String {
        use chrono::Datelike;

        let (day, month, year) = (date.day(), date.month(), date.year());
        match self.pattern {
            DatePattern::DotDayFirst => format!("{:02}.{:02}.{}", day, month, year),
            DatePattern::SlashDayFirst => format!("{:02}/{:02}/{}", day, month, year),
            DatePattern::DashDayFirst => format!("{:02}-{:02}-{}", day, month, year),
            DatePattern::Iso => format!("{}-{:02}-{:02}", year, month, day),
            DatePattern::SlashMonthFirst => format!("{:02}/{:02}/{}", month, day, year),
            DatePattern::ShortMonthName => {
                let name = self.locale.month_names(false)[month as usize - 1];
                format!("{:02} {} {}", day, name, year)
            }
            DatePattern::FullMonthName => {
                let name = self.locale.month_names(true)[month as usize - 1];
                format!("{:02} {} {}", day, name, year)
            }
        }
    }
}

/// Parse a textual date: explicit candidates first, then lenient inference
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    parse_candidate(text).or_else(|| parse_lenient(text))
}

/// Try the explicit candidate formats in order
pub fn parse_candidate(text: &str) -> Option<NaiveDate> {
    CANDIDATE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, CANDIDATE_DATETIME_FORMAT)
                .ok()
                .map(|dt| dt.date())
        })
}

fn parse_lenient(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(date) = parse_candidate(text) {
        return Some(date);
    }

    if let Some(dt) = LENIENT_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(dt.date());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local().date());
    }

    LENIENT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}
