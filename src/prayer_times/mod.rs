pub mod client;
pub mod resolver;

pub use client::{HttpProvider, ScheduleProvider};
pub use resolver::{parse_time_12h, resolve_next, time_until};
