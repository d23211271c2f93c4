//! Availability Resolver
//!
//! Pure function of (overrides, regular-holiday weekday set, date).
//! Precedence: an explicit override for the exact date always wins — whether
//! it opens or closes the shop — then the weekly closure rule, then the
//! default open window. Total: never errors, safely cacheable per date.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use shared::models::BusinessDay;

/// Standard opening window applied when no override sets custom hours
pub const DEFAULT_OPEN_TIME: &str = "09:00";
pub const DEFAULT_CLOSE_TIME: &str = "18:00";

/// Fixed note attached to weekly closures
pub const REGULAR_HOLIDAY_NOTE: &str = "定休日";

/// Resolved status of one calendar date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayStatus {
    pub is_open: bool,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub note: Option<String>,
}

impl DayStatus {
    fn open_default() -> Self {
        Self {
            is_open: true,
            open_time: Some(DEFAULT_OPEN_TIME.to_string()),
            close_time: Some(DEFAULT_CLOSE_TIME.to_string()),
            note: None,
        }
    }

    fn regular_holiday() -> Self {
        Self {
            is_open: false,
            open_time: None,
            close_time: None,
            note: Some(REGULAR_HOLIDAY_NOTE.to_string()),
        }
    }
}

/// Resolve whether the shop is open on `date` and what hours apply.
///
/// `holiday_weekdays` uses 0 = Sunday .. 6 = Saturday.
pub fn resolve(date: NaiveDate, overrides: &[BusinessDay], holiday_weekdays: &[i64]) -> DayStatus {
    let key = date.format("%Y-%m-%d").to_string();
    if let Some(day) = overrides.iter().find(|d| d.date == key) {
        return DayStatus {
            is_open: day.is_open,
            open_time: day.open_time.clone(),
            close_time: day.close_time.clone(),
            note: day.note.clone(),
        };
    }

    let weekday = date.weekday().num_days_from_sunday() as i64;
    if holiday_weekdays.contains(&weekday) {
        return DayStatus::regular_holiday();
    }

    DayStatus::open_default()
}
