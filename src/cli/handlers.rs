use std::io::{self, Write};

use anyhow::Result;

use crate::clock::{ResolvedInstant, TimeSource};
use crate::config::{ApiStyle, AppConfig};
use crate::models::PrayerSchedule;
use crate::prayer_times::{parse_time_12h, resolve_next, time_until, HttpProvider, ScheduleProvider};
use crate::utils::format::{display_time, format_duration_secs};
use crate::utils::hijri::hijri_string;

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

macro_rules! writeln_colored {
    ($out:expr, $color:expr, $($arg:tt)*) => {{
        write!($out, "{}", $color)?;
        write!($out, $($arg)*)?;
        writeln!($out, "\x1b[0m")?;
    }};
}

const AMBER: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

/// Moon-sighting corrections are a day or two; anything past a month is a typo.
const MAX_HIJRI_OFFSET_DAYS: i32 = 30;

// ─── Times ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum RowState {
    Past,
    Next,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq)]
struct TimesRow {
    label: &'static str,
    time: String,
    state: RowState,
}

/// Prayers plus sunrise, in day order, each tagged relative to `now`.
fn times_rows(schedule: &PrayerSchedule, now: &ResolvedInstant) -> Vec<TimesRow> {
    let next = resolve_next(schedule.entries(), now);
    let state_of = |raw: &str| match parse_time_12h(raw) {
        Ok(t) if t <= now.time() => RowState::Past,
        _ => RowState::Upcoming,
    };

    let mut rows: Vec<TimesRow> = schedule
        .entries()
        .iter()
        .map(|e| TimesRow {
            label: e.name.display_name(),
            time: display_time(&e.time),
            state: if next == Some(e.name) {
                RowState::Next
            } else {
                state_of(&e.time)
            },
        })
        .collect();

    rows.insert(
        1,
        TimesRow {
            label: "Sunrise",
            time: display_time(schedule.sunrise()),
            state: state_of(schedule.sunrise()),
        },
    );
    rows
}

pub fn handle_times(config: &AppConfig, location: &str) -> Result<()> {
    let provider = HttpProvider::new(config.api.clone());
    let stdout = io::stdout();
    print_times(
        &mut stdout.lock(),
        &provider,
        &TimeSource::system(),
        config,
        location,
    )
}

/// Fetch and print. Nothing is written unless the fetch succeeds; the caller
/// reports the error.
fn print_times<W: Write>(
    out: &mut W,
    provider: &dyn ScheduleProvider,
    time_source: &TimeSource,
    config: &AppConfig,
    location: &str,
) -> Result<()> {
    let location = location.trim();
    anyhow::ensure!(!location.is_empty(), "Location must not be empty");

    let schedule = provider.fetch_schedule(location)?;
    let now = time_source.now(schedule.utc_offset_hours());

    let date = match schedule.date_for() {
        Some(d) => d.to_string(),
        None => now.date().format("%Y-%m-%d").to_string(),
    };

    writeln!(out)?;
    writeln_colored!(
        out,
        GOLD,
        "  Prayer Times — {} ({})",
        schedule.title().unwrap_or(location),
        date
    );
    let hijri = if config.display.show_hijri {
        hijri_string(now.date(), config.display.hijri_offset)
            .map(|h| format!(" · {}", h))
            .unwrap_or_default()
    } else {
        String::new()
    };
    writeln_colored!(
        out,
        DIM,
        "  {}, {}{} · {} (UTC{:+})",
        now.day_name(),
        now.date_string(),
        hijri,
        now.clock_string(),
        schedule.utc_offset_hours()
    );
    writeln!(out)?;

    for row in times_rows(&schedule, &now) {
        match row.state {
            RowState::Past => writeln_colored!(out, DIM, "  {:<10}  {}", row.label, row.time),
            RowState::Next => writeln_colored!(out, AMBER, "▶ {:<10}  {}", row.label, row.time),
            RowState::Upcoming => writeln_colored!(out, BOLD, "  {:<10}  {}", row.label, row.time),
        }
    }

    if let Some(next) = resolve_next(schedule.entries(), &now) {
        writeln!(out)?;
        match time_until(schedule.entries(), next, &now) {
            Some(d) => writeln_colored!(
                out,
                AMBER,
                "  Next: {} in {}",
                next.display_name(),
                format_duration_secs(d.num_seconds())
            ),
            None => writeln_colored!(out, AMBER, "  Next: {}", next.display_name()),
        }
    }
    writeln!(out)?;
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ConfigChanges {
    pub base_url: Option<String>,
    pub key: Option<String>,
    pub style: Option<ApiStyle>,
    pub default_location: Option<String>,
    pub timeout_secs: Option<u64>,
    pub show_hijri: Option<bool>,
    pub hijri_offset: Option<i32>,
}

/// Fold `changes` into `config`. Empty strings clear optional fields.
/// Returns whether anything was given. Nothing is applied if a value is out
/// of range.
fn apply_changes(config: &mut AppConfig, changes: ConfigChanges) -> Result<bool> {
    if let Some(offset) = changes.hijri_offset {
        anyhow::ensure!(
            (-MAX_HIJRI_OFFSET_DAYS..=MAX_HIJRI_OFFSET_DAYS).contains(&offset),
            "hijri_offset must be between -{0} and {0} days, got {1}",
            MAX_HIJRI_OFFSET_DAYS,
            offset
        );
    }

    let non_empty = |s: String| {
        let s = s.trim().to_string();
        (!s.is_empty()).then_some(s)
    };
    let mut changed = false;

    if let Some(url) = changes.base_url {
        config.api.base_url = url.trim().to_string();
        changed = true;
    }
    if let Some(key) = changes.key {
        config.api.key = non_empty(key);
        changed = true;
    }
    if let Some(style) = changes.style {
        config.api.style = style;
        changed = true;
    }
    if let Some(loc) = changes.default_location {
        config.display.default_location = non_empty(loc);
        changed = true;
    }
    if let Some(secs) = changes.timeout_secs {
        config.api.timeout_secs = secs;
        changed = true;
    }
    if let Some(show) = changes.show_hijri {
        config.display.show_hijri = show;
        changed = true;
    }
    if let Some(offset) = changes.hijri_offset {
        config.display.hijri_offset = offset;
        changed = true;
    }
    Ok(changed)
}

pub fn handle_config(config: &mut AppConfig, changes: ConfigChanges) -> Result<()> {
    let path = if apply_changes(config, changes)? {
        let path = config.save()?;
        println_colored!(AMBER, "  ✓ Saved {}", path.display());
        path
    } else {
        AppConfig::config_path()?
    };

    println!();
    println_colored!(GOLD, "  Configuration ({})", path.display());
    println!();
    println!("  {:<18}  {}", "base_url", config.api.base_url);
    println!("  {:<18}  {}", "style", config.api.style.as_str());
    println!(
        "  {:<18}  {}",
        "key",
        if config.api.key.is_some() { "(set)" } else { "(none)" }
    );
    println!("  {:<18}  {}s", "timeout", config.api.timeout_secs);
    println!(
        "  {:<18}  {}",
        "default_location",
        config.display.default_location.as_deref().unwrap_or("(none)")
    );
    println!("  {:<18}  {}", "show_hijri", config.display.show_hijri);
    println!("  {:<18}  {}", "hijri_offset", config.display.hijri_offset);
    println!();
    Ok(())
}
