//! Due-date suffixes on free-text task input.
//!
//! `"Pay rent 2024-03-01"` → title `"Pay rent"`, due 2024-03-01
//! `"Buy milk tomorrow"`   → title `"Buy milk"`, due today + 1

use chrono::{Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_DATE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" ([0-9]{4}-[0-9]{2}-[0-9]{2})$").unwrap());

const TOMORROW_SUFFIX: &str = " tomorrow";

/// A task to create, parsed from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub due: Option<NaiveDate>,
}

/// Parses user input into a task. Returns `None` for blank input.
///
/// A date-shaped suffix that is not a real calendar date stays in the title.
pub fn parse_new_task(input: &str, today: NaiveDate) -> Option<NewTask> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Some(caps) = RE_DATE_SUFFIX.captures(input) {
        let (Some(whole), Some(date)) = (caps.get(0), caps.get(1)) else {
            return Some(plain(input));
        };
        return match NaiveDate::parse_from_str(date.as_str(), "%Y-%m-%d") {
            Ok(due) => Some(NewTask {
                title: input[..whole.start()].to_string(),
                due: Some(due),
            }),
            Err(e) => {
                tracing::debug!(suffix = date.as_str(), error = %e, "Ignoring invalid due date");
                Some(plain(input))
            }
        };
    }

    if let Some(title) = input.strip_suffix(TOMORROW_SUFFIX) {
        return Some(NewTask {
            title: title.to_string(),
            due: today.checked_add_days(Days::new(1)),
        });
    }

    Some(plain(input))
}

fn plain(input: &str) -> NewTask {
    NewTask {
        title: input.to_string(),
        due: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_tomorrow_suffix() {
        let task = parse_new_task("Buy milk tomorrow", date(2024, 1, 1)).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.due, Some(date(2024, 1, 2)));
    }

    #[test]
    fn test_tomorrow_crosses_month_and_year() {
        let task = parse_new_task("Party tomorrow", date(2023, 12, 31)).unwrap();
        assert_eq!(task.due, Some(date(2024, 1, 1)));
    }

    #[test]
    fn test_iso_date_suffix() {
        let task = parse_new_task("Pay rent 2024-03-01", date(2024, 1, 1)).unwrap();
        assert_eq!(task.title, "Pay rent");
        assert_eq!(task.due, Some(date(2024, 3, 1)));
    }

    #[test]
    fn test_date_must_be_a_suffix() {
        let task = parse_new_task("Pay rent 2024-03-01 please", date(2024, 1, 1)).unwrap();
        assert_eq!(task.title, "Pay rent 2024-03-01 please");
        assert_eq!(task.due, None);
    }

    #[test]
    fn test_date_needs_leading_space() {
        let task = parse_new_task("Release-2024-03-01", date(2024, 1, 1)).unwrap();
        assert_eq!(task.title, "Release-2024-03-01");
        assert_eq!(task.due, None);
    }

    #[test]
    fn test_invalid_calendar_date_stays_in_title() {
        let task = parse_new_task("Review 2024-13-45", date(2024, 1, 1)).unwrap();
        assert_eq!(task.title, "Review 2024-13-45");
        assert_eq!(task.due, None);
    }

    #[test]
    fn test_tomorrow_must_be_separate_word() {
        let task = parse_new_task("Plan for the day-after-tomorrow", date(2024, 1, 1)).unwrap();
        assert_eq!(task.due, None);

        let task = parse_new_task("tomorrow", date(2024, 1, 1)).unwrap();
        assert_eq!(task.title, "tomorrow");
        assert_eq!(task.due, None);
    }

    #[test]
    fn test_plain_title_is_trimmed() {
        let task = parse_new_task("  Write spec \n", date(2024, 1, 1)).unwrap();
        assert_eq!(task.title, "Write spec");
        assert_eq!(task.due, None);
    }

    #[test]
    fn test_blank_input_creates_nothing() {
        assert_eq!(parse_new_task("", date(2024, 1, 1)), None);
        assert_eq!(parse_new_task("   \t", date(2024, 1, 1)), None);
    }
}
