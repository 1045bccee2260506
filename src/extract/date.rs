//! Calendar date extraction from page content
//!
//! Reading pages label each entry with a date written out in one of three
//! locales: Ukrainian ("1 січня"), Russian ("1 января"), or English
//! ("January 1" / "Jan 1"). The day and month are combined with the current
//! processing year, since the source pages carry no year of their own.
//!
//! Known limitation: because the year is always the current one, crawling a
//! book in a different year than its displayed dates mis-dates every record.

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// A date pattern family: the regex plus which capture group holds the day
struct DatePattern {
    regex: &'static LazyLock<Regex>,
    day_first: bool,
}

static UKRAINIAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d{1,2})\s+(січня|лютого|березня|квітня|травня|червня|липня|серпня|вересня|жовтня|листопада|грудня)",
    )
    .expect("valid date regex")
});

static RUSSIAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d{1,2})\s+(января|февраля|марта|апреля|мая|июня|июля|августа|сентября|октября|ноября|декабря)",
    )
    .expect("valid date regex")
});

static ENGLISH_FULL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{1,2})",
    )
    .expect("valid date regex")
});

static ENGLISH_ABBREVIATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\.?\s+(\d{1,2})")
        .expect("valid date regex")
});

/// Pattern families in priority order; first family to match wins
static PATTERNS: &[DatePattern] = &[
    DatePattern {
        regex: &UKRAINIAN,
        day_first: true,
    },
    DatePattern {
        regex: &RUSSIAN,
        day_first: true,
    },
    DatePattern {
        regex: &ENGLISH_FULL,
        day_first: false,
    },
    DatePattern {
        regex: &ENGLISH_ABBREVIATED,
        day_first: false,
    },
];

/// Extracts a calendar date from a content subtree
///
/// The day/month found in the text is combined with the current year.
/// Returns `None` when no pattern matches anywhere; this is a "no date on
/// this page" signal, not an error.
pub fn extract_date(content: &Html) -> Option<NaiveDate> {
    extract_date_in_year(content, Local::now().year())
}

/// Extracts a calendar date, pinning the year (useful for tests)
///
/// Matches are tried in pattern-family order, then in text order within a
/// family. A match that names an invalid calendar day (e.g. 30 February) is
/// skipped and the search continues.
pub fn extract_date_in_year(content: &Html, year: i32) -> Option<NaiveDate> {
    let text = search_text(content);

    for pattern in PATTERNS {
        for captures in pattern.regex.captures_iter(&text) {
            let (day_group, month_group) = if pattern.day_first { (1, 2) } else { (2, 1) };

            let day: u32 = match captures[day_group].parse() {
                Ok(day) => day,
                Err(_) => continue,
            };
            let month = match month_number(&captures[month_group].to_lowercase()) {
                Some(month) => month,
                None => continue,
            };

            // Invalid day/month combinations skip this match, not the page
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }
    }

    None
}

/// Collects the text searched for a date, in priority order
///
/// Heading text first, then the first paragraph; the entire subtree text is
/// used only when neither exists.
fn search_text(content: &Html) -> String {
    let mut pieces = Vec::new();

    if let Ok(selector) = Selector::parse("h1, h2, h3, h4") {
        for heading in content.select(&selector) {
            pieces.push(heading.text().collect::<String>());
        }
    }

    if let Ok(selector) = Selector::parse("p") {
        if let Some(first_paragraph) = content.select(&selector).next() {
            pieces.push(first_paragraph.text().collect::<String>());
        }
    }

    if pieces.is_empty() {
        pieces.push(content.root_element().text().collect::<String>());
    }

    pieces.join(" ")
}

/// Maps a lowercased month name from any of the three locales to 1..=12
fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        // Ukrainian (genitive, as dates are written)
        "січня" => 1,
        "лютого" => 2,
        "березня" => 3,
        "квітня" => 4,
        "травня" => 5,
        "червня" => 6,
        "липня" => 7,
        "серпня" => 8,
        "вересня" => 9,
        "жовтня" => 10,
        "листопада" => 11,
        "грудня" => 12,
        // Russian (genitive)
        "января" => 1,
        "февраля" => 2,
        "марта" => 3,
        "апреля" => 4,
        "мая" => 5,
        "июня" => 6,
        "июля" => 7,
        "августа" => 8,
        "сентября" => 9,
        "октября" => 10,
        "ноября" => 11,
        "декабря" => 12,
        // English, full and three-letter forms
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}
