use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Monday the week numbering starts from.
pub const DEFAULT_EPOCH: (i32, u32, u32) = (2025, 9, 29);

pub fn default_epoch() -> NaiveDate {
    let (year, month, day) = DEFAULT_EPOCH;
    NaiveDate::from_ymd_opt(year, month, day).expect("default epoch must be a valid date")
}

pub fn is_monday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Mon
}

/// 1-based week number of `today`, counting whole weeks since `epoch`.
/// Dates before the epoch fall into week 1.
pub fn week_number(epoch: NaiveDate, today: NaiveDate) -> u32 {
    let elapsed = (today - epoch).num_days();
    if elapsed < 0 {
        return 1;
    }
    u32::try_from(elapsed / 7).map_or(u32::MAX, |weeks| weeks.saturating_add(1))
}

/// Monday is 0, Sunday is 6.
pub fn day_index(today: NaiveDate) -> usize {
    today.weekday().num_days_from_monday() as usize
}

/// Monday of the given week number, or `None` past chrono's date range.
pub fn week_start(epoch: NaiveDate, week: u32) -> Option<NaiveDate> {
    let offset = Duration::try_weeks(i64::from(week.max(1)) - 1)?;
    epoch.checked_add_signed(offset)
}
