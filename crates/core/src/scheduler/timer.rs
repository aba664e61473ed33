//! Daily fire-time arithmetic in the configured time zone.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Instant of `fire_time` on local `date`. Inside a DST gap the fire moves
/// forward by the gap; in a repeated hour the first occurrence wins.
pub fn fire_on(date: NaiveDate, fire_time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let local = date.and_time(fire_time);
    let resolved = match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(first, _) => Some(first),
        LocalResult::None => tz.from_local_datetime(&(local + Duration::hours(1))).earliest(),
    };
    resolved
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local))
}

/// First fire strictly after `now`.
pub fn next_fire_after(now: DateTime<Utc>, fire_time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let today = now.with_timezone(&tz).date_naive();
    let candidate = fire_on(today, fire_time, tz);
    if candidate > now {
        return candidate;
    }
    let tomorrow = today.succ_opt().unwrap_or(today);
    fire_on(tomorrow, fire_time, tz)
}

/// Fire to wait for at start-up. Today's fire counts when it was missed by
/// no more than `grace`, so a late process start still runs the day.
pub fn initial_fire(now: DateTime<Utc>, fire_time: NaiveTime, tz: Tz, grace: Duration) -> DateTime<Utc> {
    let today = now.with_timezone(&tz).date_naive();
    let todays = fire_on(today, fire_time, tz);
    if todays <= now && now - todays <= grace {
        todays
    } else {
        next_fire_after(now, fire_time, tz)
    }
}

/// Whether a fire scheduled for `scheduled` may still run at `now`.
pub fn within_grace(scheduled: DateTime<Utc>, now: DateTime<Utc>, grace: Duration) -> bool {
    now - scheduled <= grace
}

/// Business date a fire at `scheduled` processes.
pub fn reference_date_of(scheduled: DateTime<Utc>, tz: Tz) -> NaiveDate {
    scheduled.with_timezone(&tz).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn next_fire_is_today_before_fire_time_and_tomorrow_after() {
        let tz = chrono_tz::UTC;
        assert_eq!(
            next_fire_after(utc(2025, 3, 10, 0, 1), t(0, 5), tz),
            utc(2025, 3, 10, 0, 5)
        );
        assert_eq!(
            next_fire_after(utc(2025, 3, 10, 0, 5), t(0, 5), tz),
            utc(2025, 3, 11, 0, 5)
        );
    }

    #[test]
    fn fire_time_is_local_to_the_zone() {
        // Jerusalem is UTC+2 in January.
        let tz = chrono_tz::Asia::Jerusalem;
        assert_eq!(
            next_fire_after(utc(2025, 1, 15, 12, 0), t(0, 5), tz),
            utc(2025, 1, 15, 22, 5)
        );
        assert_eq!(
            reference_date_of(utc(2025, 1, 15, 22, 5), tz),
            NaiveDate::from_ymd_opt(2025, 1, 16).unwrap()
        );
    }

    #[test]
    fn late_start_within_grace_runs_today() {
        let tz = chrono_tz::UTC;
        let grace = Duration::hours(1);
        assert_eq!(
            initial_fire(utc(2025, 3, 10, 0, 50), t(0, 5), tz, grace),
            utc(2025, 3, 10, 0, 5)
        );
        assert_eq!(
            initial_fire(utc(2025, 3, 10, 2, 0), t(0, 5), tz, grace),
            utc(2025, 3, 11, 0, 5)
        );
        assert!(within_grace(utc(2025, 3, 10, 0, 5), utc(2025, 3, 10, 1, 5), grace));
        assert!(!within_grace(utc(2025, 3, 10, 0, 5), utc(2025, 3, 10, 1, 6), grace));
    }

    #[test]
    fn fire_inside_dst_gap_moves_forward() {
        // 2025-03-30 02:00-03:00 does not exist in Berlin.
        let tz = chrono_tz::Europe::Berlin;
        let fire = fire_on(NaiveDate::from_ymd_opt(2025, 3, 30).unwrap(), t(2, 30), tz);
        assert_eq!(fire, utc(2025, 3, 30, 1, 30));
    }
}
