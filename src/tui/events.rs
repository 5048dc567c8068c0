use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CEvent, KeyEvent};
use log::warn;

use crate::models::{PrayerSchedule, ScheduleError};

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Tick,
    /// A fetch worker finished. `token` is the request sequence number it
    /// was started with.
    Fetched {
        token: u64,
        result: Result<PrayerSchedule, ScheduleError>,
    },
    /// The terminal can no longer be read; nothing more will arrive from it.
    InputClosed,
}

pub struct EventHandler {
    tx: mpsc::Sender<Event>,
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    /// Starts the input/tick thread. It exits on its own once the handler
    /// is dropped, or after reporting `InputClosed`.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_rate = Duration::from_millis(tick_rate_ms);
        let input_tx = tx.clone();

        thread::spawn(move || {
            pump(&input_tx, tick_rate, |timeout| {
                if event::poll(timeout)? {
                    event::read().map(Some)
                } else {
                    Ok(None)
                }
            })
        });

        Self { tx, rx }
    }

    /// For workers that report back into the loop.
    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.tx.clone()
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}

/// Forwards key presses and ticks until the receiver goes away or the
/// terminal stops answering. `read` waits up to the given timeout and yields
/// `None` when nothing arrived.
fn pump<F>(tx: &mpsc::Sender<Event>, tick_rate: Duration, mut read: F)
where
    F: FnMut(Duration) -> io::Result<Option<CEvent>>,
{
    let mut last_tick = Instant::now();
    loop {
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        match read(timeout) {
            Ok(Some(CEvent::Key(key))) => {
                if tx.send(Event::Key(key)).is_err() {
                    return;
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Terminal input failed: {}", e);
                let _ = tx.send(Event::InputClosed);
                return;
            }
        }

        if last_tick.elapsed() >= tick_rate {
            if tx.send(Event::Tick).is_err() {
                return;
            }
            last_tick = Instant::now();
        }
    }
}
