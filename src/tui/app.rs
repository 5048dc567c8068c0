use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, info};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use std::rc::Rc;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::clock::TimeSource;
use crate::config::AppConfig;
use crate::models::{PrayerName, PrayerSchedule, ScheduleError};
use crate::prayer_times::{resolve_next, time_until, HttpProvider, ScheduleProvider};
use crate::tui::events::{Event, EventHandler};
use crate::tui::state::{Cadence, RequestSequencer, Snapshot};
use crate::tui::theme;
use crate::tui::widgets::{
    centered_rect, clock, header, location, next_prayer, prayers, statusbar, sunrise,
};
use crate::utils::hijri::hijri_string;

const TICK_MS: u64 = 1000;
const HIGHLIGHT_PERIOD: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Typing a location.
    Entry,
    /// A location has been submitted; showing its schedule (or the error).
    Submitted,
}

/// A fetch the event loop should start.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub token: u64,
    pub location: String,
}

/// Clock text, rebuilt from scratch every tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClockView {
    pub time: String,
    pub day: String,
    pub date: String,
    pub hijri: Option<String>,
}

pub struct App {
    pub mode: Mode,
    pub config: AppConfig,
    pub should_quit: bool,
    pub input_buffer: String,
    pub location: Option<String>,
    pub loading: bool,
    pub error: Option<ScheduleError>,

    snapshot: Rc<Snapshot>,
    sequencer: RequestSequencer,
    time_source: TimeSource,
    highlight_timer: Cadence,

    // Derived from the snapshot on tick
    pub clock: ClockView,
    pub highlighted: Option<PrayerName>,
    pub countdown_secs: Option<i64>,
}

impl App {
    pub fn new(config: AppConfig, time_source: TimeSource) -> Self {
        let mut app = App {
            mode: Mode::Entry,
            config,
            should_quit: false,
            input_buffer: String::new(),
            location: None,
            loading: false,
            error: None,
            snapshot: Rc::new(Snapshot::default()),
            sequencer: RequestSequencer::default(),
            time_source,
            highlight_timer: Cadence::new(HIGHLIGHT_PERIOD),
            clock: ClockView::default(),
            highlighted: None,
            countdown_secs: None,
        };
        app.refresh_clock();
        app
    }

    pub fn schedule(&self) -> Option<&PrayerSchedule> {
        self.snapshot.schedule.as_ref()
    }

    /// Start looking up `text`. Blank input is ignored.
    pub fn submit_location(&mut self, text: &str) -> Option<FetchTicket> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let token = self.sequencer.issue();
        info!("Requesting prayer times for {:?} (request {})", trimmed, token);

        self.location = Some(trimmed.to_string());
        self.input_buffer = trimmed.to_string();
        self.mode = Mode::Submitted;
        self.loading = true;

        Some(FetchTicket {
            token,
            location: trimmed.to_string(),
        })
    }

    /// Apply a finished fetch. Anything but the newest request is dropped.
    pub fn apply_fetch(
        &mut self,
        token: u64,
        result: Result<PrayerSchedule, ScheduleError>,
        now: Instant,
    ) {
        if !self.sequencer.is_current(token) {
            debug!(
                "Discarding response for request {} (latest is {})",
                token,
                self.sequencer.latest()
            );
            return;
        }

        self.loading = false;
        match result {
            Ok(schedule) => {
                self.snapshot = Snapshot::with_schedule(schedule);
                self.error = None;
            }
            Err(e) => {
                self.snapshot = self.snapshot.cleared();
                self.error = Some(e);
            }
        }

        // New snapshot: both displays start over from it right away.
        self.refresh_clock();
        self.resolve_highlight();
        self.highlight_timer.restart(now);
    }

    pub fn tick(&mut self, now: Instant) {
        self.refresh_clock();
        if self.highlight_timer.due(now) {
            self.resolve_highlight();
        }
    }

    fn refresh_clock(&mut self) {
        let instant = self.time_source.now(self.snapshot.utc_offset_hours);
        let hijri = if self.config.display.show_hijri {
            hijri_string(instant.date(), self.config.display.hijri_offset)
        } else {
            None
        };
        self.clock = ClockView {
            time: instant.clock_string(),
            day: instant.day_name(),
            date: instant.date_string(),
            hijri,
        };
    }

    fn resolve_highlight(&mut self) {
        let snapshot = Rc::clone(&self.snapshot);
        let Some(schedule) = snapshot.schedule.as_ref() else {
            self.highlighted = None;
            self.countdown_secs = None;
            return;
        };

        let instant = self.time_source.now(snapshot.utc_offset_hours);
        self.highlighted = resolve_next(schedule.entries(), &instant);
        self.countdown_secs = self
            .highlighted
            .and_then(|name| time_until(schedule.entries(), name, &instant))
            .map(|d| d.num_seconds());
        debug!("Next prayer: {:?}", self.highlighted);
    }

    /// Routes one loop event. A returned ticket still has to be fetched.
    pub fn handle_event(&mut self, event: Event, now: Instant) -> Option<FetchTicket> {
        match event {
            Event::Key(key) => return self.handle_key(key),
            Event::Tick => self.tick(now),
            Event::Fetched { token, result } => self.apply_fetch(token, result, now),
            Event::InputClosed => {
                info!("Terminal input closed, quitting");
                self.should_quit = true;
            }
        }
        None
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<FetchTicket> {
        // Only handle actual key presses — ignore release/repeat events from some terminals
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }
        match self.mode {
            Mode::Entry => self.handle_entry_key(key),
            Mode::Submitted => self.handle_submitted_key(key),
        }
    }

    fn handle_entry_key(&mut self, key: KeyEvent) -> Option<FetchTicket> {
        match key.code {
            KeyCode::Enter => {
                let text = self.input_buffer.clone();
                return self.submit_location(&text);
            }
            KeyCode::Esc => {
                if let Some(location) = &self.location {
                    self.input_buffer = location.clone();
                    self.mode = Mode::Submitted;
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
            }
            _ => {}
        }
        None
    }

    fn handle_submitted_key(&mut self, key: KeyEvent) -> Option<FetchTicket> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('e') | KeyCode::Char('l') => {
                self.mode = Mode::Entry;
            }
            KeyCode::Char('r') => {
                if let Some(location) = self.location.clone() {
                    return self.submit_location(&location);
                }
            }
            _ => {}
        }
        None
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Length(1), // location pin
                Constraint::Min(0),    // body
                Constraint::Length(1), // error
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let place = self
            .schedule()
            .and_then(|s| s.title())
            .or(self.location.as_deref());
        header::render(frame, outer[0], place, &self.clock);

        if let Some(loc) = &self.location {
            location::render_pin(frame, outer[1], loc, self.loading);
            self.draw_dashboard(frame, outer[2]);
        } else {
            clock::render(frame, centered_rect(outer[2], 60, 8), &self.clock.time);
        }

        if let Some(err) = &self.error {
            let line = Line::from(Span::styled(format!("  ✗ {}", err), theme::red()));
            frame.render_widget(Paragraph::new(line), outer[3]);
        }

        statusbar::render(frame, outer[4], &self.mode);

        if self.mode == Mode::Entry {
            location::render_form(frame, centered_rect(area, 50, 6), &self.input_buffer);
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame, body: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(body);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(0)])
            .split(columns[0]);

        prayers::render(
            frame,
            left[0],
            self.schedule(),
            self.highlighted,
            self.loading,
        );

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6), // clock
                Constraint::Length(3), // sunrise
                Constraint::Length(4), // next prayer
                Constraint::Min(0),
            ])
            .split(columns[1]);

        clock::render(frame, right[0], &self.clock.time);
        sunrise::render(frame, right[1], self.schedule().map(|s| s.sunrise()));
        next_prayer::render(frame, right[2], self.highlighted, self.countdown_secs);
    }
}

fn spawn_fetch(provider: Arc<dyn ScheduleProvider>, ticket: FetchTicket, tx: Sender<Event>) {
    thread::spawn(move || {
        let result = provider.fetch_schedule(&ticket.location);
        // The loop may already be gone; nothing to report to then.
        let _ = tx.send(Event::Fetched {
            token: ticket.token,
            result,
        });
    });
}

/// Run the TUI event loop. `initial_location`, if given, is submitted
/// straight away.
pub fn run(config: AppConfig, initial_location: Option<String>) -> Result<()> {
    let provider: Arc<dyn ScheduleProvider> = Arc::new(HttpProvider::new(config.api.clone()));
    let initial = initial_location.or_else(|| config.display.default_location.clone());

    let mut app = App::new(config, TimeSource::system());
    let events = EventHandler::new(TICK_MS);

    if let Some(ticket) = initial.and_then(|loc| app.submit_location(&loc)) {
        spawn_fetch(Arc::clone(&provider), ticket, events.sender());
    }

    let mut terminal = ratatui::init();
    let outcome = event_loop(&mut terminal, &mut app, &events, &provider);
    ratatui::restore();
    outcome
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    events: &EventHandler,
    provider: &Arc<dyn ScheduleProvider>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.draw(frame))?;

        let event = events.next()?;
        if let Some(ticket) = app.handle_event(event, Instant::now()) {
            spawn_fetch(Arc::clone(provider), ticket, events.sender());
        }
        if app.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{build_schedule, RawResponse};
    use chrono::{TimeZone, Utc};

    fn app_at(h: u32, m: u32, s: u32) -> App {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 10, 19, h, m, s).unwrap());
        let mut config = AppConfig::default();
        config.display.show_hijri = false;
        App::new(config, TimeSource::new(Box::new(clock)))
    }

    fn schedule(timezone: &str) -> PrayerSchedule {
        let raw: RawResponse = serde_json::from_value(serde_json::json!({
            "title": "Testville",
            "status_valid": 1,
            "timezone": timezone,
            "items": [{
                "fajr": "5:00 am", "shurooq": "6:20 am", "dhuhr": "12:30 pm",
                "asr": "4:00 pm", "maghrib": "6:45 pm", "isha": "8:15 pm"
            }]
        }))
        .unwrap();
        build_schedule(raw).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert_eq!(app.handle_key(key(KeyCode::Char(c))), None);
        }
    }

    #[test]
    fn clock_is_utc_before_first_fetch() {
        let app = app_at(0, 0, 0);
        assert_eq!(app.clock.time, "12:00:00 AM");
        assert_eq!(app.clock.day, "Monday");
        assert_eq!(app.clock.date, "19 Oct 2026");
        assert_eq!(app.highlighted, None);
        assert_eq!(app.mode, Mode::Entry);
    }

    #[test]
    fn blank_submission_is_ignored() {
        let mut app = app_at(0, 0, 0);
        type_text(&mut app, "   ");
        assert_eq!(app.handle_key(key(KeyCode::Enter)), None);
        assert_eq!(app.mode, Mode::Entry);
        assert!(app.location.is_none());
    }

    #[test]
    fn enter_submits_trimmed_location() {
        let mut app = app_at(0, 0, 0);
        type_text(&mut app, "  Mumbai ");
        let ticket = app.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(ticket.location, "Mumbai");
        assert_eq!(app.mode, Mode::Submitted);
        assert!(app.loading);
        assert_eq!(app.location.as_deref(), Some("Mumbai"));
    }

    #[test]
    fn successful_fetch_applies_offset_and_highlights() {
        // 01:30 UTC is 07:00 at +5.5
        let mut app = app_at(1, 30, 0);
        let ticket = app.submit_location("Mumbai").unwrap();
        app.apply_fetch(ticket.token, Ok(schedule("5.5")), Instant::now());

        assert!(!app.loading);
        assert_eq!(app.clock.time, "7:00:00 AM");
        assert_eq!(app.highlighted, Some(PrayerName::Dhuhr));
        assert_eq!(app.countdown_secs, Some(5 * 3600 + 30 * 60));
        assert_eq!(app.schedule().and_then(|s| s.title()), Some("Testville"));
    }

    #[test]
    fn failed_fetch_clears_schedule_but_keeps_offset() {
        let mut app = app_at(1, 30, 0);
        let first = app.submit_location("Mumbai").unwrap();
        app.apply_fetch(first.token, Ok(schedule("5.5")), Instant::now());

        let second = app.submit_location("Atlantis").unwrap();
        app.apply_fetch(second.token, Err(ScheduleError::InvalidLocation), Instant::now());

        assert!(app.schedule().is_none());
        assert_eq!(app.highlighted, None);
        assert_eq!(app.countdown_secs, None);
        assert_eq!(app.error, Some(ScheduleError::InvalidLocation));
        assert_eq!(app.clock.time, "7:00:00 AM");
    }

    #[test]
    fn transport_failure_also_clears() {
        let mut app = app_at(12, 0, 0);
        let first = app.submit_location("Cairo").unwrap();
        app.apply_fetch(first.token, Ok(schedule("2")), Instant::now());
        let second = app.submit_location("Cairo").unwrap();
        app.apply_fetch(
            second.token,
            Err(ScheduleError::transport("timed out")),
            Instant::now(),
        );
        assert!(app.schedule().is_none());
        assert!(matches!(app.error, Some(ScheduleError::TransportFailure(_))));
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut app = app_at(12, 0, 0);
        let old = app.submit_location("London").unwrap();
        let new = app.submit_location("Paris").unwrap();

        app.apply_fetch(new.token, Err(ScheduleError::InvalidLocation), Instant::now());
        app.apply_fetch(old.token, Ok(schedule("0")), Instant::now());

        assert!(app.schedule().is_none());
        assert_eq!(app.error, Some(ScheduleError::InvalidLocation));
        assert_eq!(app.location.as_deref(), Some("Paris"));
    }

    #[test]
    fn success_clears_previous_error() {
        let mut app = app_at(21, 0, 0);
        let bad = app.submit_location("Nowhere").unwrap();
        app.apply_fetch(bad.token, Err(ScheduleError::InvalidLocation), Instant::now());
        let good = app.submit_location("London").unwrap();
        app.apply_fetch(good.token, Ok(schedule("0")), Instant::now());
        assert_eq!(app.error, None);
        assert_eq!(app.highlighted, Some(PrayerName::Fajr));
    }

    #[test]
    fn highlight_only_reevaluates_each_minute() {
        let mut app = app_at(7, 0, 0);
        let start = Instant::now();
        let ticket = app.submit_location("London").unwrap();
        app.apply_fetch(ticket.token, Ok(schedule("0")), start);
        assert_eq!(app.highlighted, Some(PrayerName::Dhuhr));

        // Pretend the highlight went stale; ticks inside the minute leave it.
        app.highlighted = None;
        app.tick(start + Duration::from_secs(1));
        app.tick(start + Duration::from_secs(59));
        assert_eq!(app.highlighted, None);

        app.tick(start + Duration::from_secs(60));
        assert_eq!(app.highlighted, Some(PrayerName::Dhuhr));
    }

    #[test]
    fn edit_and_cancel_returns_to_schedule() {
        let mut app = app_at(7, 0, 0);
        let ticket = app.submit_location("London").unwrap();
        app.apply_fetch(ticket.token, Ok(schedule("0")), Instant::now());

        assert_eq!(app.handle_key(key(KeyCode::Char('e'))), None);
        assert_eq!(app.mode, Mode::Entry);
        type_text(&mut app, "xyz");
        assert_eq!(app.handle_key(key(KeyCode::Esc)), None);
        assert_eq!(app.mode, Mode::Submitted);
        assert_eq!(app.input_buffer, "London");
        assert!(app.schedule().is_some());
    }

    #[test]
    fn refresh_resubmits_current_location() {
        let mut app = app_at(7, 0, 0);
        let first = app.submit_location("London").unwrap();
        let again = app.handle_key(key(KeyCode::Char('r'))).unwrap();
        assert_eq!(again.location, "London");
        assert!(again.token > first.token);
    }

    #[test]
    fn quitting() {
        let mut app = app_at(7, 0, 0);
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit);

        let mut app = app_at(7, 0, 0);
        app.submit_location("London");
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);

        let mut app = app_at(7, 0, 0);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn closed_input_quits_and_routes_other_events() {
        let mut app = app_at(7, 0, 0);
        assert!(app
            .handle_event(Event::Key(key(KeyCode::Char('x'))), Instant::now())
            .is_none());
        assert_eq!(app.input_buffer, "x");
        let ticket = app.submit_location("London").unwrap();
        assert!(app
            .handle_event(
                Event::Fetched {
                    token: ticket.token,
                    result: Ok(schedule("0")),
                },
                Instant::now()
            )
            .is_none());
        assert_eq!(app.highlighted, Some(PrayerName::Dhuhr));
        assert!(!app.should_quit);

        assert!(app.handle_event(Event::InputClosed, Instant::now()).is_none());
        assert!(app.should_quit);
    }

    #[test]
    fn typing_q_in_the_form_does_not_quit() {
        let mut app = app_at(7, 0, 0);
        type_text(&mut app, "Qom q");
        assert!(!app.should_quit);
        assert_eq!(app.input_buffer, "Qom q");
    }

    #[test]
    fn draws_without_panicking() {
        use ratatui::{backend::TestBackend, Terminal};

        let mut app = app_at(7, 0, 0);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();

        let ticket = app.submit_location("London").unwrap();
        app.apply_fetch(ticket.token, Ok(schedule("0")), Instant::now());
        terminal.draw(|f| app.draw(f)).unwrap();

        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("Dhuhr"));
        assert!(rendered.contains("6:20 AM"));
    }
}
