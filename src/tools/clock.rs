//! Time reporting.

use chrono::Local;

/// Clock capability consumed by the TIME action.
pub trait Clock: Send + Sync {
    /// The current local time formatted for humans (`HH:MM`).
    fn current_time(&self) -> String;
}

/// System wall clock.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn current_time(&self) -> String {
        Local::now().format("%H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_as_hours_colon_minutes() {
        let time = SystemClock::new().current_time();
        assert_eq!(time.len(), 5);
        assert_eq!(time.as_bytes()[2], b':');
        assert!(time[..2].parse::<u8>().unwrap() < 24);
        assert!(time[3..].parse::<u8>().unwrap() < 60);
    }
}
