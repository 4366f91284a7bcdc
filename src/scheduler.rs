/*
Auto-scheduling engine.
Module is independently written from HTTP / Axum for testing: all state
comes in as parameters, the only outputs are freshly allocated blocks.
*/

use std::cmp::Ordering;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{SchedulePolicy, Task, TimeBlock};

/// Estimate applied when a task has none, or one outside sane bounds.
pub const DEFAULT_ESTIMATE_MIN: i64 = 60;

/// Largest estimate accepted for a single task (7 days). Anything above
/// would overflow chrono arithmetic long before it could be placed.
pub const MAX_ESTIMATE_MIN: i64 = 7 * 24 * 60;

// Per-task forward scan gives up after this many days. With a non-empty
// work-day set this is only reachable on pathologically busy calendars.
const MAX_DAYS_AHEAD: usize = 365;

/// Task that could not be placed within the scan horizon.
#[derive(Debug, Clone)]
pub struct Unplanned {
    pub task_id: Uuid,
    pub reason: String, // "no_free_slot" / "no_work_day"
}

// Half-open busy interval [start, end) in the instant frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

// Select tasks that are candidates for placement.
//
// Rules:
// - Task must not be completed
// - Task must not already be represented by a block (never double-book)
pub fn eligible_tasks(tasks: &[Task], blocks: &[TimeBlock]) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| !t.completed)
        .filter(|t| !blocks.iter().any(|b| b.task_id == t.id))
        .cloned()
        .collect()
}

// Sort for placement order.
//
// 1) Priority rank ascending (urgent-important first)
// 2) If tied, a present deadline beats an absent one, earlier beats later
// 3) Otherwise stable (input order preserved)
pub fn sort_for_schedule(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| match (a.deadline, b.deadline) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    });
    tasks
}

fn resolve_estimate(task: &Task) -> i64 {
    match task.estimate_min {
        Some(m) if m > 0 && m <= MAX_ESTIMATE_MIN => m,
        _ => DEFAULT_ESTIMATE_MIN,
    }
}

fn overlaps(a: &Interval, b: &Interval) -> bool {
    a.start < b.end && b.start < a.end
}

// Coalesce into disjoint intervals sorted by start.
fn merge_busy(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort_by_key(|iv| iv.start);
    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for iv in intervals {
        match merged.last_mut() {
            Some(last) if iv.start <= last.end => {
                if iv.end > last.end {
                    last.end = iv.end;
                }
            }
            _ => merged.push(iv),
        }
    }
    merged
}

// Busy intervals clipped to a day window, each end padded by the break
// gap so nothing is placed flush against a committed block.
fn busy_within(
    busy: &[Interval],
    win_start: DateTime<Utc>,
    win_end: DateTime<Utc>,
    pad: Duration,
) -> Vec<Interval> {
    busy.iter()
        .filter_map(|iv| {
            let padded_end = iv.end + pad;
            if padded_end <= win_start || iv.start >= win_end {
                return None;
            }
            Some(Interval {
                start: iv.start.max(win_start),
                end: padded_end.min(win_end),
            })
        })
        .collect()
}

// Gaps of the window not covered by the (merged, sorted) busy set.
fn free_gaps(
    win_start: DateTime<Utc>,
    win_end: DateTime<Utc>,
    busy: &[Interval],
) -> Vec<Interval> {
    let mut gaps = Vec::new();
    let mut cursor = win_start;
    for iv in busy {
        if iv.start > cursor {
            gaps.push(Interval {
                start: cursor,
                end: iv.start,
            });
        }
        if iv.end > cursor {
            cursor = iv.end;
        }
    }
    if cursor < win_end {
        gaps.push(Interval {
            start: cursor,
            end: win_end,
        });
    }
    gaps
}

// First work day at or after `date`. None only when the work-day set
// resolves to nothing.
fn next_work_day(policy: &SchedulePolicy, mut date: NaiveDate) -> Option<NaiveDate> {
    for _ in 0..7 {
        if policy.is_work_day(date) {
            return Some(date);
        }
        date = date.succ_opt()?;
    }
    None
}

// Where the forward scan starts.
//
// Anchored runs start at the configured day-start on the anchor's day
// (next work day if the anchor day is not one). Unanchored runs start at
// `now`, clamped up to today's day-start, or roll to the next work day
// when `now` is already past the day-end or today is off.
fn initial_cursor(
    policy: &SchedulePolicy,
    now: DateTime<Utc>,
    anchor: Option<NaiveDate>,
) -> Option<DateTime<Utc>> {
    match anchor {
        Some(date) => {
            let day = next_work_day(policy, date)?;
            Some(policy.day_window(day).0)
        }
        None => {
            let local_now = policy.frame.to_local(now);
            let today = local_now.date_naive();
            if policy.is_work_day(today) && local_now.time() < policy.work_end {
                let (win_start, _) = policy.day_window(today);
                Some(now.max(win_start))
            } else {
                let day = next_work_day(policy, today.succ_opt()?)?;
                Some(policy.day_window(day).0)
            }
        }
    }
}

// Find the earliest conflict-free interval of length `dur` at or after
// `search_from`, scanning work days forward.
//
// A task longer than the whole day window can never satisfy containment;
// it rolls to the next eligible work day and takes the first day-start
// with no conflict, overrunning the end bound rather than being dropped.
fn place_task(
    policy: &SchedulePolicy,
    busy: &[Interval],
    search_from: DateTime<Utc>,
    dur: Duration,
) -> Option<Interval> {
    let pad = Duration::minutes(policy.break_min);
    let day_len = policy.work_end - policy.work_start;
    let start_day = policy.frame.to_local(search_from).date_naive();

    if dur > day_len {
        let mut day = next_work_day(policy, start_day.succ_opt()?)?;
        for _ in 0..MAX_DAYS_AHEAD {
            let (win_start, _) = policy.day_window(day);
            let candidate = Interval {
                start: win_start,
                end: win_start + dur,
            };
            let blocked = busy.iter().any(|iv| {
                overlaps(
                    &candidate,
                    &Interval {
                        start: iv.start,
                        end: iv.end + pad,
                    },
                )
            });
            if !blocked && win_start >= search_from {
                return Some(candidate);
            }
            day = next_work_day(policy, day.succ_opt()?)?;
        }
        return None;
    }

    let mut day = start_day;
    for _ in 0..MAX_DAYS_AHEAD {
        if !policy.is_work_day(day) {
            day = next_work_day(policy, day)?;
        }
        let (win_start, win_end) = policy.day_window(day);
        let search_start = search_from.max(win_start);
        if search_start + dur <= win_end {
            let day_busy = merge_busy(busy_within(busy, win_start, win_end, pad));
            for gap in free_gaps(win_start, win_end, &day_busy) {
                let cand_start = gap.start.max(search_start);
                let cand_end = cand_start + dur;
                if cand_end <= gap.end {
                    return Some(Interval {
                        start: cand_start,
                        end: cand_end,
                    });
                }
            }
        }
        day = day.succ_opt()?;
    }
    None
}

/// Place every eligible task into a free slot within working hours.
///
/// Deterministic single forward pass: tasks are sorted by priority and
/// deadline, then each one takes the earliest free gap at or after the
/// cursor, which only ever advances. Existing blocks are never moved or
/// re-emitted; re-running after persisting produces nothing new for
/// already-placed tasks.
pub fn generate_schedule(
    tasks: &[Task],
    existing_blocks: &[TimeBlock],
    policy: &SchedulePolicy,
    now: DateTime<Utc>,
    anchor: Option<NaiveDate>,
) -> (Vec<TimeBlock>, Vec<Unplanned>) {
    let ordered = sort_for_schedule(eligible_tasks(tasks, existing_blocks));

    let mut busy: Vec<Interval> = existing_blocks
        .iter()
        .filter(|b| b.end_at > b.start_at)
        .map(|b| Interval {
            start: b.start_at,
            end: b.end_at,
        })
        .collect();

    let Some(mut cursor) = initial_cursor(policy, now, anchor) else {
        // Callers validate work_days; stay total regardless.
        let unplanned = ordered
            .iter()
            .map(|t| Unplanned {
                task_id: t.id,
                reason: "no_work_day".to_string(),
            })
            .collect();
        return (Vec::new(), unplanned);
    };

    let break_gap = Duration::minutes(policy.break_min);
    let mut placed: Vec<TimeBlock> = Vec::new();
    let mut unplanned: Vec<Unplanned> = Vec::new();

    for task in ordered {
        let dur = Duration::minutes(resolve_estimate(&task));
        match place_task(policy, &busy, cursor, dur) {
            Some(slot) => {
                placed.push(TimeBlock {
                    id: Uuid::new_v4(),
                    task_id: task.id,
                    start_at: slot.start,
                    end_at: slot.end,
                    completed: false,
                });
                busy.push(slot);
                cursor = slot.end + break_gap;
            }
            None => unplanned.push(Unplanned {
                task_id: task.id,
                reason: "no_free_slot".to_string(),
            }),
        }
    }

    (placed, unplanned)
}
