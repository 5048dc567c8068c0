use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::models::PrayerSchedule;

/// What the timers read on every tick. Replaced as a whole when a fetch
/// lands; never edited in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub schedule: Option<PrayerSchedule>,
    /// Zero (UTC) until the first successful fetch.
    pub utc_offset_hours: f64,
}

impl Snapshot {
    pub fn with_schedule(schedule: PrayerSchedule) -> Rc<Self> {
        Rc::new(Snapshot {
            utc_offset_hours: schedule.utc_offset_hours(),
            schedule: Some(schedule),
        })
    }

    /// The schedule is gone but the clock keeps the last known offset.
    pub fn cleared(&self) -> Rc<Self> {
        Rc::new(Snapshot {
            schedule: None,
            utc_offset_hours: self.utc_offset_hours,
        })
    }
}

/// Hands out increasing request tokens; only the newest one may be applied.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_current(&self, token: u64) -> bool {
        token != 0 && token == self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }
}

/// A repeating timer polled from the event loop.
#[derive(Debug)]
pub struct Cadence {
    period: Duration,
    last: Option<Instant>,
}

impl Cadence {
    pub fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    /// True once per period; the first poll after `new` or `stop` fires.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.period => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Count the next period from `now`, after an out-of-band run.
    pub fn restart(&mut self, now: Instant) {
        self.last = Some(now);
    }
}
