pub mod time_source;

#[cfg(test)]
pub use time_source::FixedClock;
pub use time_source::{ResolvedInstant, TimeSource};
