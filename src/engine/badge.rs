use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use super::threshold;
use crate::settings::Threshold;

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]{2})/([0-9]{2})").expect("Failed to compile date pattern")
});

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Days-remaining annotation for one matched element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub color: String,
    /// Square rather than round; set when the text mentions "fatal".
    pub square: bool,
    pub days_remaining: i64,
}

impl Badge {
    /// Inline style of the overlay: a small disc (or square) pinned to the
    /// top-right corner of the decorated element.
    pub fn css_text(&self) -> String {
        format!(
            "position: absolute; top: -8px; right: -8px; background-color: {}; color: white; \
             border-radius: {}%; width: 24px; height: 24px; display: flex; align-items: center; \
             justify-content: center; font-size: 10px; font-weight: bold; z-index: 1000; \
             box-shadow: 0 2px 4px rgba(0,0,0,0.2);",
            self.color,
            if self.square { 0 } else { 50 }
        )
    }
}

/// Find the first `DD/MM` in `text` and resolve it to a date near
/// `reference`. Dates more than a month behind roll into next year.
/// Day/month pairs that name no real date give `None`.
pub fn extract_date(text: &str, reference: NaiveDateTime) -> Option<NaiveDate> {
    let captures = DATE_PATTERN.captures(text)?;
    let day: u32 = captures.get(1)?.as_str().parse().ok()?;
    let month: u32 = captures.get(2)?.as_str().parse().ok()?;

    let year = reference.year();
    let candidate = NaiveDate::from_ymd_opt(year, month, day)?;

    let one_month_ago = reference
        .checked_sub_months(Months::new(1))
        .unwrap_or(reference);
    if candidate.and_time(chrono::NaiveTime::MIN) < one_month_ago {
        // 29/02 has no twin in a common year; it lands on 1 March instead.
        return candidate
            .with_year(year + 1)
            .or_else(|| NaiveDate::from_ymd_opt(year + 1, 3, 1));
    }

    Some(candidate)
}

/// Whole days from `reference` until the start of `target`, rounded up.
pub fn days_remaining(target: NaiveDate, reference: NaiveDateTime) -> i64 {
    let millis = (target.and_time(chrono::NaiveTime::MIN) - reference).num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) > 0 {
        days + 1
    } else {
        days
    }
}

/// Build the badge for `text`, or `None` when it carries no date.
pub fn synthesize(
    text: &str,
    thresholds: &[Threshold],
    reference: NaiveDateTime,
    default_color: &str,
) -> Option<Badge> {
    let target = extract_date(text, reference)?;
    let days = days_remaining(target, reference);
    let color = threshold::evaluate_or(days, thresholds, default_color);

    Some(Badge {
        label: format!("{}d", days),
        color: color.to_string(),
        square: text.contains("fatal"),
        days_remaining: days,
    })
}
