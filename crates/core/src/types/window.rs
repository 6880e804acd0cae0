//! Order windows: the 14:00-to-14:00 daily bucket an order belongs to.

use chrono::{Days, Duration, NaiveDateTime};

use super::status::DISPATCH_CUTOFF;

/// A half-open 24-hour order window `[start, start + 1 day)`.
///
/// Two order requests from the same owner that fall inside the same window
/// are merged into a single order; the window's start instant is what the
/// storage layer keys its at-most-one-order-per-window constraint on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderWindow {
    start: NaiveDateTime,
}

impl OrderWindow {
    /// Compute the window containing the instant `at`.
    ///
    /// Before 14:00 the instant belongs to the window that opened at 14:00
    /// yesterday; at or after 14:00 it belongs to the window opening at
    /// 14:00 today.
    #[must_use]
    pub fn containing(at: NaiveDateTime) -> Self {
        let day = if at.time() < DISPATCH_CUTOFF {
            at.date() - Days::new(1)
        } else {
            at.date()
        };

        Self {
            start: day.and_time(DISPATCH_CUTOFF),
        }
    }

    /// Inclusive start of the window.
    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Exclusive end of the window, one day after the start.
    #[must_use]
    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::days(1)
    }

    /// Whether `at` falls inside this window.
    #[must_use]
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end()
    }
}
