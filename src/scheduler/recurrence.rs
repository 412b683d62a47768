//! Recurrence rules and next-fire computation in a fixed time zone.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Datelike, Local, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use tracing::error;

/// Zone recurring jobs are evaluated in
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JobZone {
    Named(Tz),
    /// Host zone, used when the configured zone cannot be loaded
    Local,
}

impl JobZone {
    /// Look up an IANA zone name. An unknown name is logged and degrades to
    /// the host zone instead of failing startup.
    pub fn resolve(name: &str) -> Self {
        match name.parse::<Tz>() {
            Ok(tz) => JobZone::Named(tz),
            Err(e) => {
                error!(
                    "Failed to load time zone '{}': {}. Falling back to host local time",
                    name, e
                );
                JobZone::Local
            }
        }
    }
}

impl fmt::Display for JobZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobZone::Named(tz) => write!(f, "{}", tz.name()),
            JobZone::Local => write!(f, "host local time"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Recurrence {
    /// Every `weekday` at `time` wall clock in the job zone
    Weekly { weekday: Weekday, time: NaiveTime },
    /// Fixed interval, independent of the zone
    Every { interval: Duration },
}

impl Recurrence {
    /// First fire time strictly after `now`.
    ///
    /// Weekly rules are computed on the zone's calendar, so the wall-clock
    /// time stays fixed across DST changes. A time that falls into a DST gap
    /// fires an hour later that day; an ambiguous time fires at the earlier
    /// instant.
    pub fn next_fire_after(&self, zone: &JobZone, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Recurrence::Weekly { weekday, time } => match zone {
                JobZone::Named(tz) => next_weekly(tz, *weekday, *time, now),
                JobZone::Local => next_weekly(&Local, *weekday, *time, now),
            },
            Recurrence::Every { interval } => {
                chrono::Duration::from_std(*interval).ok().map(|d| now + d)
            }
        }
    }
}

/// Six-field cron expression (with seconds) firing every `weekday` at `time`
pub fn weekly_cron_expr(weekday: Weekday, time: NaiveTime) -> String {
    format!(
        "{} {} {} * * {}",
        time.second(),
        time.minute(),
        time.hour(),
        weekday.to_string().to_uppercase()
    )
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recurrence::Weekly { weekday, time } => {
                write!(f, "every {} at {}", weekday, time.format("%H:%M"))
            }
            Recurrence::Every { interval } => write!(f, "every {}s", interval.as_secs()),
        }
    }
}

fn next_weekly<Z: TimeZone>(
    tz: &Z,
    weekday: Weekday,
    time: NaiveTime,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let today = now.with_timezone(tz).date_naive();

    // Today's occurrence may already be past, so look one extra week ahead
    (0..=7)
        .map(|offset| today + chrono::Duration::days(offset))
        .filter(|date| date.weekday() == weekday)
        .filter_map(|date| resolve_local(tz, date.and_time(time)))
        .find(|candidate| *candidate > now)
}

fn resolve_local<Z: TimeZone>(tz: &Z, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(naive + chrono::Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sunday_11() -> Recurrence {
        Recurrence::Weekly {
            weekday: Weekday::Sun,
            time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        }
    }

    fn moscow() -> JobZone {
        JobZone::resolve("Europe/Moscow")
    }

    #[test]
    fn test_resolve_known_zone() {
        assert_eq!(moscow(), JobZone::Named(chrono_tz::Europe::Moscow));
        assert_eq!(moscow().to_string(), "Europe/Moscow");
    }

    #[test]
    fn test_resolve_unknown_zone_degrades() {
        assert_eq!(JobZone::resolve("Mars/Olympus_Mons"), JobZone::Local);
    }

    #[test]
    fn test_weekly_later_same_day() {
        // 2026-03-01 is a Sunday. 07:00 UTC = 10:00 Moscow (UTC+3)
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 7, 0, 0).unwrap();
        let next = sunday_11().next_fire_after(&moscow(), now).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_weekly_exactly_at_fire_time_moves_to_next_week() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let next = sunday_11().next_fire_after(&moscow(), now).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 8, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_weekly_uses_zone_calendar_not_utc() {
        // Saturday 22:00 UTC is already Sunday 01:00 in Moscow
        let now = Utc.with_ymd_and_hms(2026, 2, 28, 22, 0, 0).unwrap();
        let next = sunday_11().next_fire_after(&moscow(), now).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_weekly_fires_once_per_week() {
        let zone = moscow();
        let rule = sunday_11();
        let mut at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut fires = Vec::new();
        for _ in 0..10 {
            at = rule.next_fire_after(&zone, at).unwrap();
            fires.push(at);
        }
        for pair in fires.windows(2) {
            assert_eq!(pair[1] - pair[0], chrono::Duration::weeks(1));
        }
        for fire in fires {
            let local = fire.with_timezone(&chrono_tz::Europe::Moscow);
            assert_eq!(local.weekday(), Weekday::Sun);
            assert_eq!((local.hour(), local.minute()), (11, 0));
        }
    }

    #[test]
    fn test_weekly_wall_clock_stable_across_dst() {
        // Berlin switches to summer time on 2026-03-29
        let zone = JobZone::resolve("Europe/Berlin");
        let rule = sunday_11();
        let before = rule
            .next_fire_after(&zone, Utc.with_ymd_and_hms(2026, 3, 20, 0, 0, 0).unwrap())
            .unwrap();
        let after = rule.next_fire_after(&zone, before).unwrap();

        assert_eq!(before, Utc.with_ymd_and_hms(2026, 3, 22, 10, 0, 0).unwrap());
        assert_eq!(after, Utc.with_ymd_and_hms(2026, 3, 29, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_weekly_time_in_dst_gap() {
        // 02:30 does not exist in Berlin on 2026-03-29
        let rule = Recurrence::Weekly {
            weekday: Weekday::Sun,
            time: NaiveTime::from_hms_opt(2, 30, 0).unwrap(),
        };
        let zone = JobZone::resolve("Europe/Berlin");
        let now = Utc.with_ymd_and_hms(2026, 3, 28, 12, 0, 0).unwrap();
        let next = rule.next_fire_after(&zone, now).unwrap();
        // 03:30 CEST
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 29, 1, 30, 0).unwrap());
    }

    #[test]
    fn test_every() {
        let rule = Recurrence::Every {
            interval: Duration::from_secs(15 * 60),
        };
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 7, 0, 0).unwrap();
        assert_eq!(
            rule.next_fire_after(&moscow(), now).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 1, 7, 15, 0).unwrap()
        );
    }

    #[test]
    fn test_cron_expr() {
        let eleven = NaiveTime::from_hms_opt(11, 0, 0).unwrap();
        assert_eq!(weekly_cron_expr(Weekday::Sun, eleven), "0 0 11 * * SUN");
        let quarter_to_eight = NaiveTime::from_hms_opt(7, 45, 30).unwrap();
        assert_eq!(
            weekly_cron_expr(Weekday::Wed, quarter_to_eight),
            "30 45 7 * * WED"
        );
    }
}
