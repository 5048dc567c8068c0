use chrono::{Duration, NaiveTime};
use log::debug;
use thiserror::Error;

use crate::clock::ResolvedInstant;
use crate::models::{PrayerEntry, PrayerName};

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Malformed prayer time: {raw:?}")]
pub struct MalformedTimeEntry {
    pub raw: String,
}

/// Parse a 12-hour provider time into a time of day.
///
/// Accepts `5:12 AM`, `05:12AM`, `5:12 am` and `5:12:30 PM`. Seconds, when
/// present, are validated and then dropped since prayers start on the minute.
pub fn parse_time_12h(raw: &str) -> Result<NaiveTime, MalformedTimeEntry> {
    let malformed = || MalformedTimeEntry {
        raw: raw.to_string(),
    };

    let upper = raw.trim().to_ascii_uppercase();
    let (clock, is_pm) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest, false)
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest, true)
    } else {
        return Err(malformed());
    };

    let mut parts = clock.trim_end().split(':');
    let hour = parse_field(parts.next(), 1..=12).ok_or_else(malformed)?;
    let minute = parse_field(parts.next(), 0..=59).ok_or_else(malformed)?;
    if let Some(seconds) = parts.next() {
        parse_field(Some(seconds), 0..=59).ok_or_else(malformed)?;
    }
    if parts.next().is_some() {
        return Err(malformed());
    }

    let hour = match (hour, is_pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(malformed)
}

/// One or two ASCII digits inside `range`.
fn parse_field(part: Option<&str>, range: std::ops::RangeInclusive<u32>) -> Option<u32> {
    let part = part?;
    if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u32 = part.parse().ok()?;
    range.contains(&value).then_some(value)
}

/// Which prayer comes next at `now`.
///
/// Each entry is placed on `now`'s calendar day and the first one strictly
/// after `now` wins. Once Isha has passed the answer wraps to the first entry,
/// i.e. tomorrow's Fajr. Entries whose time cannot be parsed are skipped.
pub fn resolve_next(entries: &[PrayerEntry], now: &ResolvedInstant) -> Option<PrayerName> {
    let first = entries.first()?;

    let next = entries.iter().find(|entry| match parse_time_12h(&entry.time) {
        Ok(time) => now.date().and_time(time) > now.naive(),
        Err(e) => {
            debug!("Skipping {}: {}", entry.name, e);
            false
        }
    });

    Some(next.unwrap_or(first).name)
}

/// Time from `now` until `name` next starts, looking into tomorrow when
/// today's has already gone. `None` if the entry is missing or unparsable.
pub fn time_until(
    entries: &[PrayerEntry],
    name: PrayerName,
    now: &ResolvedInstant,
) -> Option<Duration> {
    let entry = entries.iter().find(|e| e.name == name)?;
    let time = parse_time_12h(&entry.time).ok()?;
    let mut at = now.date().and_time(time);
    if at <= now.naive() {
        at += Duration::days(1);
    }
    Some(at - now.naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use proptest::prelude::*;

    fn schedule(asr: &str) -> Vec<PrayerEntry> {
        vec![
            PrayerEntry::new(PrayerName::Fajr, "5:00 AM"),
            PrayerEntry::new(PrayerName::Dhuhr, "12:30 PM"),
            PrayerEntry::new(PrayerName::Asr, asr),
            PrayerEntry::new(PrayerName::Maghrib, "6:45 PM"),
            PrayerEntry::new(PrayerName::Isha, "8:15 PM"),
        ]
    }

    fn at(h: u32, m: u32, s: u32) -> ResolvedInstant {
        ResolvedInstant::from_naive(
            NaiveDate::from_ymd_opt(2026, 10, 19)
                .unwrap()
                .and_hms_opt(h, m, s)
                .unwrap(),
        )
    }

    fn hm(raw: &str) -> (u32, u32) {
        let t = parse_time_12h(raw).unwrap();
        (t.hour(), t.minute())
    }

    #[test]
    fn parses_padding_and_spacing_variants() {
        assert_eq!(hm("5:12 AM"), (5, 12));
        assert_eq!(hm("05:12AM"), (5, 12));
        assert_eq!(hm("5:12 am"), (5, 12));
        assert_eq!(hm("  7:27 pm "), (19, 27));
        assert_eq!(hm("7:27:45 PM"), (19, 27));
    }

    #[test]
    fn twelve_oclock_edges() {
        assert_eq!(hm("12:00 AM"), (0, 0));
        assert_eq!(hm("12:59 AM"), (0, 59));
        assert_eq!(hm("12:00 PM"), (12, 0));
        assert_eq!(hm("1:00 PM"), (13, 0));
        assert_eq!(hm("11:59 PM"), (23, 59));
    }

    #[test]
    fn rejects_malformed_times() {
        for raw in ["bad-time", "", "5:12", "13:00 PM", "0:30 AM", "5:60 AM", "5 PM", "5:1x PM", "1:2:3:4 AM", "123:00 AM"] {
            assert!(parse_time_12h(raw).is_err(), "{raw:?} should not parse");
        }
    }

    #[test]
    fn morning_picks_dhuhr() {
        assert_eq!(resolve_next(&schedule("4:00 PM"), &at(7, 0, 0)), Some(PrayerName::Dhuhr));
    }

    #[test]
    fn before_fajr_picks_fajr() {
        assert_eq!(resolve_next(&schedule("4:00 PM"), &at(0, 10, 0)), Some(PrayerName::Fajr));
    }

    #[test]
    fn after_isha_wraps_to_fajr() {
        assert_eq!(resolve_next(&schedule("4:00 PM"), &at(21, 0, 0)), Some(PrayerName::Fajr));
        assert_eq!(resolve_next(&schedule("4:00 PM"), &at(20, 15, 0)), Some(PrayerName::Fajr));
    }

    #[test]
    fn exact_time_is_not_next() {
        assert_eq!(resolve_next(&schedule("4:00 PM"), &at(12, 30, 0)), Some(PrayerName::Asr));
    }

    #[test]
    fn seconds_before_the_minute_still_count() {
        assert_eq!(resolve_next(&schedule("4:00 PM"), &at(12, 29, 59)), Some(PrayerName::Dhuhr));
    }

    #[test]
    fn malformed_entry_is_skipped() {
        assert_eq!(resolve_next(&schedule("bad-time"), &at(13, 0, 0)), Some(PrayerName::Maghrib));
    }

    #[test]
    fn malformed_fajr_still_wraps_to_first_entry() {
        let mut entries = schedule("4:00 PM");
        entries[0].time = "??".to_string();
        assert_eq!(resolve_next(&entries, &at(22, 0, 0)), Some(PrayerName::Fajr));
    }

    #[test]
    fn empty_schedule_has_no_next() {
        assert_eq!(resolve_next(&[], &at(7, 0, 0)), None);
    }

    #[test]
    fn countdown_same_day_and_across_midnight() {
        let entries = schedule("4:00 PM");
        assert_eq!(
            time_until(&entries, PrayerName::Dhuhr, &at(7, 0, 0)),
            Some(Duration::minutes(330))
        );
        assert_eq!(
            time_until(&entries, PrayerName::Fajr, &at(21, 0, 0)),
            Some(Duration::hours(8))
        );
        assert_eq!(time_until(&schedule("x"), PrayerName::Asr, &at(7, 0, 0)), None);
    }

    proptest! {
        #[test]
        fn clock_string_round_trips(secs in 0u32..86_400) {
            let instant = at(secs / 3600, (secs / 60) % 60, secs % 60);
            let parsed = parse_time_12h(&instant.clock_string()).unwrap();
            prop_assert_eq!((parsed.hour(), parsed.minute()), (instant.time().hour(), instant.time().minute()));
        }
    }
}
