use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use chrono_tz::Tz;

/// Converts a UTC instant to a business date in the given timezone.
///
/// This is the single source of truth for converting instants to domain dates.
pub fn business_date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let first = month_start(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    month_end(date).day()
}

/// The date carrying `day_of_month` in the month of `anchor`, clamped to the
/// last day of short months (31 → 30 in April, → 28/29 in February).
pub fn clamp_day_in_month(anchor: NaiveDate, day_of_month: u32) -> NaiveDate {
    let day = day_of_month.clamp(1, days_in_month(anchor));
    anchor.with_day(day).unwrap_or(anchor)
}

/// Whether an obligation keyed on `day_of_month` falls due on `date`.
///
/// A day past the end of the month is due on the month's last day, so an
/// obligation on the 31st charges on 30 April and 28/29 February.
pub fn is_due_on(day_of_month: u32, date: NaiveDate) -> bool {
    clamp_day_in_month(date, day_of_month) == date
}

/// Adds whole months, keeping the day where possible and clamping otherwise.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Whole months from the month of `from` to the month of `to`.
/// Negative when `to` is in an earlier month.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// Day-of-month occurrences from `start` (inclusive) through `end` (inclusive).
pub fn occurrences_between(day_of_month: u32, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    if start > end {
        return dates;
    }
    let mut cursor = month_start(start);
    while cursor <= end {
        let due = clamp_day_in_month(cursor, day_of_month);
        if due >= start && due <= end {
            dates.push(due);
        }
        cursor = add_months(cursor, 1);
    }
    dates
}
