/*
Civil-time helpers.
The scheduler compares intervals in the instant (UTC) frame but working
hours are wall-clock times in the user's timezone; LocalFrame converts
between the two at the scheduler boundary.
*/

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};

/// Fixed civil timezone of the user's working hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalFrame {
    offset: FixedOffset,
}

impl LocalFrame {
    /// `offset_min` is minutes east of UTC; rejected outside +/-14 hours.
    pub fn from_offset_minutes(offset_min: i64) -> Option<Self> {
        if offset_min.abs() > 14 * 60 {
            return None;
        }
        let offset = FixedOffset::east_opt((offset_min * 60) as i32)?;
        Some(LocalFrame { offset })
    }

    pub fn to_local(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }

    /// Inverse of `to_local`: `from_local(to_local(x).naive_local()) == x`.
    pub fn from_local(&self, civil: NaiveDateTime) -> DateTime<Utc> {
        let utc_naive = civil - Duration::seconds(self.offset.local_minus_utc() as i64);
        Utc.from_utc_datetime(&utc_naive)
    }
}

// Parse a "HH:MM" wall-clock bound.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let h: u32 = parts[0].parse().ok()?;
    let m: u32 = parts[1].parse().ok()?;
    NaiveTime::from_hms_opt(h, m, 0)
}

// Settings store week days with 0=Sunday .. 6=Saturday.
pub fn weekday_from_sunday_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_hhmm_accepts_bounds() {
        assert_eq!(parse_hhmm("00:00"), NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(parse_hhmm("23:59"), NaiveTime::from_hms_opt(23, 59, 0));
    }

    #[test]
    fn parse_hhmm_rejects_malformed() {
        assert!(parse_hhmm("24:00").is_none());
        assert!(parse_hhmm("12:60").is_none());
        assert!(parse_hhmm("12").is_none());
        assert!(parse_hhmm("12:00:00").is_none());
        assert!(parse_hhmm("noon").is_none());
    }

    #[test]
    fn frame_rejects_out_of_range_offsets() {
        assert!(LocalFrame::from_offset_minutes(15 * 60).is_none());
        assert!(LocalFrame::from_offset_minutes(-15 * 60).is_none());
        assert!(LocalFrame::from_offset_minutes(14 * 60).is_some());
    }

    #[test]
    fn to_local_shifts_wall_clock() {
        let frame = LocalFrame::from_offset_minutes(-300).unwrap(); // UTC-5
        let instant = DateTime::parse_from_rfc3339("2026-03-02T14:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let local = frame.to_local(instant);
        assert_eq!(local.naive_local().to_string(), "2026-03-02 09:00:00");
    }

    proptest! {
        #[test]
        fn local_roundtrip_is_identity(
            secs in -4_102_444_800i64..4_102_444_800i64,
            offset_min in -(14 * 60)..=(14i64 * 60)
        ) {
            let frame = LocalFrame::from_offset_minutes(offset_min).unwrap();
            let instant = DateTime::from_timestamp(secs, 0).unwrap();
            let back = frame.from_local(frame.to_local(instant).naive_local());
            prop_assert_eq!(back, instant);
        }
    }
}
