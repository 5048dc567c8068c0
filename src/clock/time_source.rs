use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Where the current UTC time comes from.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Wall-clock time at a location, after the UTC offset has been applied.
/// Carries no zone of its own; compare it only with other local times at the
/// same offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResolvedInstant(NaiveDateTime);

impl ResolvedInstant {
    pub fn from_utc(utc: DateTime<Utc>, utc_offset_hours: f64) -> Self {
        ResolvedInstant(utc.naive_utc() + offset_duration(utc_offset_hours))
    }

    #[cfg(test)]
    pub fn from_naive(local: NaiveDateTime) -> Self {
        ResolvedInstant(local)
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.0.time()
    }

    /// `9:05:03 PM`: hour unpadded, midnight and noon shown as 12.
    pub fn clock_string(&self) -> String {
        self.0.format("%-I:%M:%S %p").to_string()
    }

    /// `Monday`
    pub fn day_name(&self) -> String {
        self.0.format("%A").to_string()
    }

    /// `19 Oct 2026`
    pub fn date_string(&self) -> String {
        self.0.format("%-d %b %Y").to_string()
    }
}

/// Offsets such as +5:45 are not whole hours, so work in seconds.
fn offset_duration(utc_offset_hours: f64) -> Duration {
    if !utc_offset_hours.is_finite() {
        return Duration::zero();
    }
    Duration::seconds((utc_offset_hours * 3600.0).round() as i64)
}

/// Turns a UTC reading into local wall-clock time for a given offset.
pub struct TimeSource {
    clock: Box<dyn Clock>,
}

impl TimeSource {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn system() -> Self {
        Self::new(Box::new(SystemClock))
    }

    pub fn now(&self, utc_offset_hours: f64) -> ResolvedInstant {
        ResolvedInstant::from_utc(self.clock.now_utc(), utc_offset_hours)
    }
}
