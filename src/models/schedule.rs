use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::{PrayerEntry, PrayerName};

/// Offsets beyond this are not real zones; treat them as a broken response.
const MAX_OFFSET_HOURS: f64 = 24.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    /// The provider answered but did not recognise the location.
    #[error("Invalid location. Please try again.")]
    InvalidLocation,
    /// The request never completed or the body could not be understood.
    #[error("Failed to fetch prayer times. Please check your connection.")]
    TransportFailure(String),
}

impl ScheduleError {
    pub fn transport(detail: impl std::fmt::Display) -> Self {
        ScheduleError::TransportFailure(detail.to_string())
    }

    /// Underlying cause for logs; the user only ever sees `Display`.
    pub fn detail(&self) -> &str {
        match self {
            ScheduleError::InvalidLocation => "status_valid was not 1",
            ScheduleError::TransportFailure(detail) => detail,
        }
    }
}

/// Provider response as decoded from JSON. Every field is optional here so
/// that missing data is reported through `build_schedule` rather than as a
/// decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResponse {
    #[serde(default)]
    pub status_valid: Option<Value>,
    #[serde(default)]
    pub timezone: Option<Value>,
    #[serde(default)]
    pub items: Vec<RawDay>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDay {
    pub date_for: Option<String>,
    pub fajr: Option<String>,
    pub shurooq: Option<String>,
    pub dhuhr: Option<String>,
    pub asr: Option<String>,
    pub maghrib: Option<String>,
    pub isha: Option<String>,
}

/// One day of prayer times for one location.
///
/// Built in one piece from a provider response and never edited afterwards;
/// a new fetch produces a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct PrayerSchedule {
    entries: [PrayerEntry; 5],
    sunrise: String,
    utc_offset_hours: f64,
    title: Option<String>,
    date_for: Option<String>,
}

impl PrayerSchedule {
    pub fn entries(&self) -> &[PrayerEntry] {
        &self.entries
    }

    pub fn sunrise(&self) -> &str {
        &self.sunrise
    }

    pub fn utc_offset_hours(&self) -> f64 {
        self.utc_offset_hours
    }

    /// Place name as the provider spelled it, if it sent one.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn date_for(&self) -> Option<&str> {
        self.date_for.as_deref()
    }
}

pub fn build_schedule(response: RawResponse) -> Result<PrayerSchedule, ScheduleError> {
    match response.status_valid.as_ref() {
        None => return Err(ScheduleError::transport("response has no status_valid field")),
        Some(flag) if !is_success_flag(flag) => return Err(ScheduleError::InvalidLocation),
        Some(_) => {}
    }

    let utc_offset_hours = response
        .timezone
        .as_ref()
        .and_then(parse_offset)
        .ok_or_else(|| ScheduleError::transport(format!("bad timezone {:?}", response.timezone)))?;

    let day = response
        .items
        .into_iter()
        .next()
        .ok_or_else(|| ScheduleError::transport("response has no items"))?;

    let field = |value: Option<String>, name: &str| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ScheduleError::transport(format!("item is missing '{}'", name)))
    };

    let entries = [
        PrayerEntry::new(PrayerName::Fajr, field(day.fajr, "fajr")?),
        PrayerEntry::new(PrayerName::Dhuhr, field(day.dhuhr, "dhuhr")?),
        PrayerEntry::new(PrayerName::Asr, field(day.asr, "asr")?),
        PrayerEntry::new(PrayerName::Maghrib, field(day.maghrib, "maghrib")?),
        PrayerEntry::new(PrayerName::Isha, field(day.isha, "isha")?),
    ];
    let sunrise = field(day.shurooq, "shurooq")?;

    let title = response
        .title
        .or(response.query)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    Ok(PrayerSchedule {
        entries,
        sunrise,
        utc_offset_hours,
        title,
        date_for: day.date_for.filter(|d| !d.trim().is_empty()),
    })
}

fn is_success_flag(flag: &Value) -> bool {
    match flag {
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => s.trim() == "1",
        Value::Bool(b) => *b,
        _ => false,
    }
}

/// Timezone arrives as `"5.5"`, `5.5` or `"-4"` depending on the zone.
fn parse_offset(value: &Value) -> Option<f64> {
    let hours = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (hours.is_finite() && hours.abs() <= MAX_OFFSET_HOURS).then_some(hours)
}
