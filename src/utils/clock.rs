use chrono::{DateTime, Local, Timelike};

/// Represents an entity responsible for providing dates across application. This can allow it to
/// be used for testing
pub trait Clock: Sync + Send + 'static {
    fn now(&self) -> DateTime<Local>;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Greeting shown before logging an entry, chosen by local hour.
pub fn greeting(time: &DateTime<Local>) -> &'static str {
    match time.hour() {
        0..12 => "Good Morning",
        12..18 => "Good Afternoon",
        _ => "Good Evening",
    }
}
