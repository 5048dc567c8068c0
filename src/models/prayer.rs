/// The five daily prayers, declared in the order they fall. That order is
/// also the order the next-prayer scan walks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrayerName {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    pub fn display_name(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        }
    }
}

impl std::fmt::Display for PrayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One named prayer and the time string the provider reported for it.
#[derive(Debug, Clone, PartialEq)]
pub struct PrayerEntry {
    pub name: PrayerName,
    pub time: String,
}

impl PrayerEntry {
    pub fn new(name: PrayerName, time: impl Into<String>) -> Self {
        Self {
            name,
            time: time.into(),
        }
    }
}
