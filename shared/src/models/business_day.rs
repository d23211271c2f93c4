//! Business Day Model (営業日カレンダー)

use serde::{Deserialize, Serialize};

/// Per-date override record.
///
/// An explicit entry for a date always wins over the weekly closure rule for
/// that date's weekday, whether it opens or closes the shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BusinessDay {
    pub id: i64,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    pub is_open: bool,
    /// Custom hours (HH:MM), falling back to standard hours when absent
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Upsert override payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessDayUpsert {
    pub date: String,
    pub is_open: bool,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub note: Option<String>,
}

/// Weekly closure rule: a day of week (0 = Sunday .. 6 = Saturday) that is
/// closed every week unless overridden for a specific date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RegularHoliday {
    pub id: i64,
    pub day_of_week: i64,
    pub created_at: i64,
}

/// Replace-holiday-set payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegularHolidayUpdate {
    pub weekdays: Vec<i64>,
}
