use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use num_format::{Locale, ToFormattedString};

static WARNED_MESSAGES: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();

pub fn warn_once(message: impl Into<String>) {
    let message = message.into();
    let cache = WARNED_MESSAGES.get_or_init(|| Mutex::new(HashSet::new()));

    if let Ok(mut warned) = cache.lock()
        && warned.insert(message.clone())
    {
        eprintln!("{message}");
    }
}

#[derive(Clone)]
pub struct NumberFormatOptions {
    pub use_comma: bool,
    pub use_human: bool,
    pub locale: String,
    pub decimal_places: usize,
}

/// Format a number for display. Accepts both u32 and u64.
pub fn format_number(n: impl Into<u64>, options: &NumberFormatOptions) -> String {
    let n: u64 = n.into();
    let locale = match options.locale.as_str() {
        "de" => Locale::de,
        "fr" => Locale::fr,
        "es" => Locale::es,
        "it" => Locale::it,
        "ja" => Locale::ja,
        "ko" => Locale::ko,
        "zh" => Locale::zh,
        _ => Locale::en,
    };

    if options.use_human {
        if n >= 1_000_000 {
            format!(
                "{:.prec$}m",
                n as f64 / 1_000_000.0,
                prec = options.decimal_places
            )
        } else if n >= 1_000 {
            format!(
                "{:.prec$}k",
                n as f64 / 1_000.0,
                prec = options.decimal_places
            )
        } else {
            n.to_string()
        }
    } else if options.use_comma {
        n.to_formatted_string(&locale)
    } else {
        n.to_string()
    }
}

/// Round to 1 decimal place for display.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to 2 decimal places for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn ordinal_suffix(day: u32) -> &'static str {
    match day {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

/// Format a date as e.g. "January 3rd, 2025".
pub fn format_date_ordinal(date: NaiveDate) -> String {
    let month = date.format("%B");
    let day = date.day();
    format!("{month} {day}{}, {}", ordinal_suffix(day), date.year())
}

/// Compact dd-mm-yyyy form, e.g. "03-01-2025".
pub fn format_date_dmy(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Human description of the time elapsed since `from`, in whole calendar-ish
/// units ("2 years 3 months 4 days"). Uses 365-day years and 30-day months;
/// this is display text, not date arithmetic.
pub fn format_duration_since(from: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - from).num_days().max(0);
    let years = days / 365;
    let months = (days % 365) / 30;
    let rem_days = (days % 365) % 30;

    let mut parts = Vec::new();
    if years > 0 {
        parts.push(format!("{years} year{}", if years > 1 { "s" } else { "" }));
    }
    if months > 0 {
        parts.push(format!("{months} month{}", if months > 1 { "s" } else { "" }));
    }
    if rem_days > 0 {
        parts.push(format!(
            "{rem_days} day{}",
            if rem_days > 1 { "s" } else { "" }
        ));
    }

    if parts.is_empty() {
        "0 days".to_string()
    } else {
        parts.join(" ")
    }
}

/// Whether the account was created less than two calendar months ago.
pub fn is_less_than_two_months_old(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    match now.checked_sub_months(Months::new(2)) {
        Some(two_months_ago) => created_at > two_months_ago,
        None => false,
    }
}
