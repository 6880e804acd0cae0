//! Delivery status derivation.
//!
//! Orders placed before the daily 14:00 cutoff go out with that day's
//! delivery run; status is never authoritative in storage and is always
//! recomputed from the order's creation instant and the current time.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// The daily dispatch cutoff. Orders are grouped and shipped per
/// 14:00-to-14:00 window.
pub const DISPATCH_CUTOFF: NaiveTime = match NaiveTime::from_hms_opt(14, 0, 0) {
    Some(t) => t,
    None => panic!("14:00:00 is a valid wall-clock time"),
};

/// Display status of an order's delivery, derived from elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Order accepted, not yet dispatched.
    Preparing,
    /// Dispatched with today's 14:00 run.
    InTransit,
    /// Three or more days have elapsed since the order was placed.
    Delivered,
}

impl DeliveryStatus {
    /// Derive the delivery status of an order created at `created_at`,
    /// observed at `now`.
    ///
    /// Rules, in order:
    ///
    /// 1. Three full days elapsed (inclusive boundary) → [`Delivered`].
    /// 2. Created today before 14:00 and observed at or after 14:00 →
    ///    [`InTransit`].
    /// 3. Otherwise → [`Preparing`].
    ///
    /// An order created exactly at 14:00:00 is not "before 14:00".
    ///
    /// [`Delivered`]: DeliveryStatus::Delivered
    /// [`InTransit`]: DeliveryStatus::InTransit
    /// [`Preparing`]: DeliveryStatus::Preparing
    #[must_use]
    pub fn at(created_at: NaiveDateTime, now: NaiveDateTime) -> Self {
        if now - created_at >= Duration::days(3) {
            return Self::Delivered;
        }

        let same_day = created_at.date() == now.date();
        if same_day && created_at.time() < DISPATCH_CUTOFF && now.time() >= DISPATCH_CUTOFF {
            return Self::InTransit;
        }

        Self::Preparing
    }

    /// Stable string form, matching the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn delivered_after_three_days() {
        let created = at(2025, 3, 10, 9, 0, 0);
        let now = at(2025, 3, 13, 9, 0, 1);
        assert_eq!(DeliveryStatus::at(created, now), DeliveryStatus::Delivered);
    }

    #[test]
    fn delivered_at_exactly_three_days() {
        // The three-day boundary is inclusive.
        let created = at(2025, 3, 10, 9, 0, 0);
        let now = at(2025, 3, 13, 9, 0, 0);
        assert_eq!(DeliveryStatus::at(created, now), DeliveryStatus::Delivered);
    }

    #[test]
    fn in_transit_when_cutoff_passed_same_day() {
        let created = at(2025, 3, 10, 13, 59, 59);
        let now = at(2025, 3, 10, 14, 0, 0);
        assert_eq!(DeliveryStatus::at(created, now), DeliveryStatus::InTransit);
    }

    #[test]
    fn order_at_cutoff_is_not_in_transit() {
        // 14:00:00 exactly is not "before 14:00".
        let created = at(2025, 3, 10, 14, 0, 0);
        let now = at(2025, 3, 10, 18, 0, 0);
        assert_eq!(DeliveryStatus::at(created, now), DeliveryStatus::Preparing);
    }

    #[test]
    fn preparing_before_cutoff() {
        let created = at(2025, 3, 10, 13, 0, 0);
        let now = at(2025, 3, 10, 13, 30, 0);
        assert_eq!(DeliveryStatus::at(created, now), DeliveryStatus::Preparing);
    }

    #[test]
    fn preparing_next_day_before_three_days() {
        // Different calendar date, less than three days: the same-day
        // in-transit rule does not apply.
        let created = at(2025, 3, 10, 13, 0, 0);
        let now = at(2025, 3, 11, 15, 0, 0);
        assert_eq!(DeliveryStatus::at(created, now), DeliveryStatus::Preparing);
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&DeliveryStatus::InTransit).unwrap();
        assert_eq!(json, "\"in_transit\"");
    }
}
