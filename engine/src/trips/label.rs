//! Folder label text: the trip location over its month and year.

use chrono::{Datelike, NaiveDate};

/// Turns a trip's ISO date into display text.
///
/// The translation layer lives outside the globe; it plugs in here.
pub trait DateFormatter {
    fn format_date(&self, iso_date: &str) -> String;
}

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// "July 2023". Unparseable dates are shown verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishDates;

impl DateFormatter for EnglishDates {
    fn format_date(&self, iso_date: &str) -> String {
        match parse_iso_date(iso_date) {
            Some(date) => format!("{} {}", MONTHS_EN[date.month0() as usize], date.year()),
            None => iso_date.to_string(),
        }
    }
}

/// Accepts a plain date or the date part of a timestamp.
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let date_part = text.trim().get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderLabel {
    pub title: String,
    pub subtitle: String,
}

impl FolderLabel {
    pub fn new(location: &str, date: &str, dates: &dyn DateFormatter) -> Self {
        Self {
            title: location.to_string(),
            subtitle: dates.format_date(date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_month_and_year() {
        assert_eq!(EnglishDates.format_date("2023-07-14"), "July 2023");
        assert_eq!(EnglishDates.format_date("2019-01-02T10:00:00Z"), "January 2019");
    }

    #[test]
    fn test_bad_date_passes_through() {
        assert_eq!(EnglishDates.format_date("summer"), "summer");
        assert_eq!(EnglishDates.format_date("2023-13-40"), "2023-13-40");
    }

    #[test]
    fn test_label_uses_formatter() {
        struct Upper;
        impl DateFormatter for Upper {
            fn format_date(&self, iso_date: &str) -> String {
                iso_date.to_uppercase()
            }
        }
        let label = FolderLabel::new("Kyoto", "x-date", &Upper);
        assert_eq!(label.title, "Kyoto");
        assert_eq!(label.subtitle, "X-DATE");
    }
}
