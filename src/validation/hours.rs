//! Opening hours window

use chrono::{Duration, NaiveTime};

/// Museum opening hours with a grace period on either side.
///
/// Kiosks may be used a little before opening and a little after closing;
/// interactions inside `[opens - grace, closes + grace]` are accepted,
/// boundaries included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningHours {
    opens: NaiveTime,
    closes: NaiveTime,
    grace: Duration,
}

impl OpeningHours {
    pub fn new(opens: NaiveTime, closes: NaiveTime, grace: Duration) -> Self {
        Self {
            opens,
            closes,
            grace,
        }
    }

    /// Earliest accepted time of day.
    pub fn earliest(&self) -> NaiveTime {
        self.opens - self.grace
    }

    /// Latest accepted time of day.
    pub fn latest(&self) -> NaiveTime {
        self.closes + self.grace
    }

    /// Returns true if `time` is inside the widened window.
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.earliest() && time <= self.latest()
    }
}

impl Default for OpeningHours {
    /// 09:00 to 18:00 with 15 minutes of grace.
    fn default() -> Self {
        Self::new(
            NaiveTime::MIN + Duration::hours(9),
            NaiveTime::MIN + Duration::hours(18),
            Duration::minutes(15),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_default_window() {
        let hours = OpeningHours::default();
        assert_eq!(hours.earliest(), time(8, 45, 0));
        assert_eq!(hours.latest(), time(18, 15, 0));
    }

    #[test]
    fn test_boundaries_inclusive() {
        let hours = OpeningHours::default();
        assert!(hours.contains(time(8, 45, 0)));
        assert!(hours.contains(time(18, 15, 0)));
        assert!(hours.contains(time(12, 31, 31)));
    }

    #[test]
    fn test_outside_window() {
        let hours = OpeningHours::default();
        assert!(!hours.contains(time(8, 44, 59)));
        assert!(!hours.contains(time(18, 15, 1)));
        assert!(!hours.contains(NaiveTime::from_hms_micro_opt(18, 15, 0, 1).unwrap()));
    }

    #[test]
    fn test_custom_window() {
        let hours = OpeningHours::new(time(10, 0, 0), time(16, 0, 0), Duration::zero());
        assert!(!hours.contains(time(9, 59, 59)));
        assert!(hours.contains(time(10, 0, 0)));
        assert!(hours.contains(time(16, 0, 0)));
    }
}
