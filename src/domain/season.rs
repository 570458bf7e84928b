//! Season window.

use crate::domain::TimeMs;
use serde::{Deserialize, Serialize};

/// A fixed time window defining which records count toward a season's totals.
///
/// The window is half-open: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonWindow {
    pub id: i64,
    pub start: TimeMs,
    pub end: TimeMs,
}

impl SeasonWindow {
    pub fn new(id: i64, start: TimeMs, end: TimeMs) -> Self {
        Self { id, start, end }
    }

    /// Returns true when `at` falls inside `[start, end)`.
    pub fn contains(&self, at: TimeMs) -> bool {
        at >= self.start && at < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let season = SeasonWindow::new(1, TimeMs::new(100), TimeMs::new(200));
        assert!(season.contains(TimeMs::new(100)));
        assert!(season.contains(TimeMs::new(199)));
        assert!(!season.contains(TimeMs::new(200)));
        assert!(!season.contains(TimeMs::new(99)));
    }
}
