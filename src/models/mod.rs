pub mod prayer;
pub mod schedule;

pub use prayer::{PrayerEntry, PrayerName};
pub use schedule::{build_schedule, PrayerSchedule, RawResponse, ScheduleError};
