use crate::domain::{Day, TaskArena};
use chrono::{DateTime, Local};
use std::collections::HashMap;
use uuid::Uuid;

/// Cached aggregates over the full loaded set of days and tasks.
///
/// All counts are deduplicated by task-group: every carryover instance of a
/// task counts once, and a group is completed as soon as any instance is.
/// The per-day rates are the exception: they reflect each day's own rows,
/// carried-over or not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub total_groups: usize,
    pub completed_groups: usize,
    pub pending_groups: usize,
    /// Mean minutes from a group's first appearance to its resolution,
    /// over groups with a timestamped completed instance. 0 when no group
    /// qualifies.
    pub average_completion_minutes: f64,
    pub average_daily_completion_rate: f64,
    pub today_completion_rate: f64,
}

struct GroupAccum {
    any_completed: bool,
    earliest_created: DateTime<Local>,
    latest_completed: Option<DateTime<Local>>,
}

/// Full pass over the in-memory state. Cheap at personal-scale volumes;
/// rerun after every persisted mutation rather than updated incrementally.
pub fn compute_statistics(days: &[Day], arena: &TaskArena, active_day: Option<Uuid>) -> Statistics {
    let mut groups: HashMap<Uuid, GroupAccum> = HashMap::new();

    for task in arena.iter() {
        let entry = groups.entry(task.group_id).or_insert(GroupAccum {
            any_completed: false,
            earliest_created: task.created_at,
            latest_completed: None,
        });
        if task.created_at < entry.earliest_created {
            entry.earliest_created = task.created_at;
        }
        if task.is_completed {
            entry.any_completed = true;
            // A completed instance without a timestamp still marks the
            // group completed; it just contributes no duration sample.
            if let Some(completed) = task.completed_at {
                if entry.latest_completed.map_or(true, |latest| completed > latest) {
                    entry.latest_completed = Some(completed);
                }
            }
        }
    }

    let total_groups = groups.len();
    let completed_groups = groups.values().filter(|g| g.any_completed).count();
    let pending_groups = total_groups - completed_groups;

    let mut duration_sum = 0.0;
    let mut duration_count = 0usize;
    for group in groups.values() {
        if let Some(completed) = group.latest_completed {
            let minutes =
                completed.signed_duration_since(group.earliest_created).num_seconds() as f64 / 60.0;
            duration_sum += minutes;
            duration_count += 1;
        }
    }
    let average_completion_minutes = if duration_count > 0 {
        duration_sum / duration_count as f64
    } else {
        0.0
    };

    let average_daily_completion_rate = if days.is_empty() {
        0.0
    } else {
        let sum: f64 = days.iter().map(|d| daily_completion_rate(arena, d.id)).sum();
        sum / days.len() as f64
    };

    let today_completion_rate = active_day
        .map(|id| daily_completion_rate(arena, id))
        .unwrap_or(0.0);

    Statistics {
        total_groups,
        completed_groups,
        pending_groups,
        average_completion_minutes,
        average_daily_completion_rate,
        today_completion_rate,
    }
}

/// Share of a day's tasks (all depths) that are completed, as a percentage.
/// No task-group dedup here: this is the day's own snapshot, including
/// carried-over rows. 0 for a day with no tasks.
pub fn daily_completion_rate(arena: &TaskArena, day: Uuid) -> f64 {
    let ids = arena.day_task_ids(day);
    if ids.is_empty() {
        return 0.0;
    }
    let completed = ids
        .iter()
        .filter(|id| arena.get(**id).map_or(false, |t| t.is_completed))
        .count();
    100.0 * completed as f64 / ids.len() as f64
}
