use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::timeframe::{self, LocalFrame};

/// Eisenhower quadrant of a task. Lower rank is scheduled first.
///
/// Anything outside the four known tags maps to `Unranked`, which
/// always sorts last; a malformed tag is never a deserialization error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    UrgentImportant,
    UrgentNotImportant,
    NotUrgentImportant,
    NotUrgentNotImportant,
    Unranked,
}

impl Priority {
    pub fn rank(self) -> u8 {
        match self {
            Priority::UrgentImportant => 0,
            Priority::UrgentNotImportant => 1,
            Priority::NotUrgentImportant => 2,
            Priority::NotUrgentNotImportant => 3,
            Priority::Unranked => 4,
        }
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            Priority::UrgentImportant => "urgent-important",
            Priority::UrgentNotImportant => "urgent-notImportant",
            Priority::NotUrgentImportant => "notUrgent-important",
            Priority::NotUrgentNotImportant => "notUrgent-notImportant",
            Priority::Unranked => "unranked",
        }
    }

    pub fn from_tag(tag: &str) -> Priority {
        match tag {
            "urgent-important" => Priority::UrgentImportant,
            "urgent-notImportant" => Priority::UrgentNotImportant,
            "notUrgent-important" => Priority::NotUrgentImportant,
            "notUrgent-notImportant" => Priority::NotUrgentNotImportant,
            _ => Priority::Unranked,
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_tag())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Priority::from_tag(&tag))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub priority: Priority,
    pub deadline: Option<DateTime<Utc>>,
    pub estimate_min: Option<i64>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

/// A placed slot on the calendar. Duration always equals the resolved
/// estimate of the task it schedules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeBlock {
    pub id: Uuid,
    pub task_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub completed: bool,
}

/// User-facing working-hours settings as stored in db.json.
///
/// `work_days` uses 0=Sunday .. 6=Saturday. `tz_offset_min` is the
/// offset of the user's civil frame from UTC, in minutes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkHours {
    pub day_start: String, // "HH:MM"
    pub day_end: String,   // "HH:MM"
    pub work_days: Vec<u8>,
    pub break_min: i64,
    pub tz_offset_min: i64,
}

impl WorkHours {
    pub fn validate(&self) -> Result<(), String> {
        if timeframe::parse_hhmm(&self.day_start).is_none() {
            return Err("day_start must be HH:MM".to_string());
        }
        if timeframe::parse_hhmm(&self.day_end).is_none() {
            return Err("day_end must be HH:MM".to_string());
        }
        if self.work_days.is_empty() {
            return Err("work_days must not be empty".to_string());
        }
        if self.work_days.iter().any(|d| *d > 6) {
            return Err("work_days entries must be 0..=6 (0=Sunday)".to_string());
        }
        if self.break_min < 0 {
            return Err("break_min must be >= 0".to_string());
        }
        if self.tz_offset_min.abs() > 14 * 60 {
            return Err("tz_offset_min must be within +/-14 hours".to_string());
        }
        Ok(())
    }

    /// Resolve the wire form into the policy the scheduler consumes.
    pub fn resolve(&self) -> Result<SchedulePolicy, String> {
        self.validate()?;
        let work_start = timeframe::parse_hhmm(&self.day_start)
            .ok_or_else(|| "day_start must be HH:MM".to_string())?;
        let work_end = timeframe::parse_hhmm(&self.day_end)
            .ok_or_else(|| "day_end must be HH:MM".to_string())?;
        if work_end <= work_start {
            return Err("day_end must be after day_start".to_string());
        }
        let work_days: Vec<Weekday> = self
            .work_days
            .iter()
            .filter_map(|d| timeframe::weekday_from_sunday_index(*d))
            .collect();
        let frame = LocalFrame::from_offset_minutes(self.tz_offset_min)
            .ok_or_else(|| "tz_offset_min must be within +/-14 hours".to_string())?;
        Ok(SchedulePolicy {
            work_start,
            work_end,
            work_days,
            break_min: self.break_min,
            frame,
        })
    }
}

/// Validated working-hours policy in the forms the scheduler needs:
/// parsed day bounds, chrono weekdays, and the civil-frame normalizer.
#[derive(Debug, Clone)]
pub struct SchedulePolicy {
    pub work_start: NaiveTime,
    pub work_end: NaiveTime,
    pub work_days: Vec<Weekday>,
    pub break_min: i64,
    pub frame: LocalFrame,
}

impl SchedulePolicy {
    pub fn is_work_day(&self, date: NaiveDate) -> bool {
        self.work_days.contains(&date.weekday())
    }

    /// Instant-frame bounds of the working window on `date`.
    pub fn day_window(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.frame.from_local(date.and_time(self.work_start)),
            self.frame.from_local(date.and_time(self.work_end)),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Db {
    pub settings: WorkHours,
    pub tasks: Vec<Task>,
    pub blocks: Vec<TimeBlock>,
}
