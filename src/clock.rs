use chrono::{DateTime, Local};

/// Produces the short time labels attached to messages and previews.
pub trait Clock: Send {
    fn time_label(&self) -> String;
}

/// Wall clock in the local timezone, formatted like "02:25 PM".
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn time_label(&self) -> String {
        format_time_label(Local::now())
    }
}

/// Always reports the same label.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn time_label(&self) -> String {
        self.0.clone()
    }
}

pub fn format_time_label(at: DateTime<Local>) -> String {
    at.format("%I:%M %p").to_string()
}
