//! Display formatting shared by every presentation surface.

use serde::{Deserialize, Serialize};

/// Placeholder for an absent statistic.
pub const PLACEHOLDER: &str = "—";

/// Language used for worded durations and advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    He,
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "he" => Ok(Locale::He),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

/// Render a minute count as an hours-and-minutes phrase.
///
/// The value is rounded and negative values clamp to zero, which renders as
/// "less than a minute".
pub fn minutes_to_words(minutes: f64, locale: Locale) -> String {
    let total = if minutes.is_finite() {
        minutes.round().max(0.0) as u64
    } else {
        0
    };
    let hours = total / 60;
    let mins = total % 60;

    match locale {
        Locale::En => english_words(hours, mins),
        Locale::He => hebrew_words(hours, mins),
    }
}

fn english_words(hours: u64, mins: u64) -> String {
    let plural = |n: u64, unit: &str| {
        if n == 1 {
            format!("1 {unit}")
        } else {
            format!("{n} {unit}s")
        }
    };
    match (hours, mins) {
        (0, 0) => "less than a minute".to_string(),
        (0, m) => plural(m, "minute"),
        (h, 0) => plural(h, "hour"),
        (h, m) => format!("{} and {}", plural(h, "hour"), plural(m, "minute")),
    }
}

fn hebrew_words(hours: u64, mins: u64) -> String {
    let hours_word = match hours {
        1 => "שעה".to_string(),
        2 => "שעתיים".to_string(),
        h => format!("{h} שעות"),
    };
    let mins_word = match mins {
        1 => "דקה".to_string(),
        m => format!("{m} דקות"),
    };
    match (hours, mins) {
        (0, 0) => "פחות מדקה".to_string(),
        (0, _) => mins_word,
        (_, 0) => hours_word,
        (_, 1) => format!("{hours_word} ו{mins_word}"),
        (_, _) => format!("{hours_word} ו-{mins_word}"),
    }
}

/// Fixed-point rendering, or [`PLACEHOLDER`] for `None` and NaN.
pub fn format_number(value: Option<f64>, digits: usize) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{v:.digits$}"),
        _ => PLACEHOLDER.to_string(),
    }
}

/// `HH:MM:SS`. Hours are not wrapped at 24; negative input renders as zero.
pub fn format_hms(ms: i64) -> String {
    let secs = ms.max(0) / 1000;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
