use crate::chime::CompletionChime;
use crate::domain::{is_weekend, Day, Task, TaskArena};
use crate::persistence::{Settings, Snapshot, Store, SNAPSHOT_VERSION};
use crate::report::{compute_statistics, Statistics};
use anyhow::Result;
use chrono::{DateTime, Duration, Local, NaiveDate};
use uuid::Uuid;

/// Where debug tooling attaches a new day relative to the loaded set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugEdge {
    BeforeEarliest,
    AfterLatest,
}

/// The carryover & aggregation engine.
///
/// Owns the single in-memory snapshot of all days and tasks: the day list
/// (date descending), the task arena, the active day, the recent/older
/// partitions, and the cached statistics. Every mutating operation goes
/// through here; each one persists the snapshot and recomputes the cached
/// aggregates with a full pass. A failed save is reported to the caller and
/// leaves the mutated in-memory state in place (local-first, no rollback).
pub struct Engine {
    store: Box<dyn Store>,
    chime: Box<dyn CompletionChime>,
    settings: Settings,
    days: Vec<Day>,
    arena: TaskArena,
    active_day: Option<Uuid>,
    recent_days: Vec<Uuid>,
    older_days: Vec<Uuid>,
    stats: Statistics,
    today: NaiveDate,
}

impl Engine {
    /// Run the startup sequence against the local calendar date.
    pub fn bootstrap(
        store: Box<dyn Store>,
        chime: Box<dyn CompletionChime>,
        settings: Settings,
    ) -> Result<Self> {
        Self::bootstrap_at(store, chime, settings, Local::now().date_naive())
    }

    /// Startup with a pinned "today" (tests and debug tooling).
    ///
    /// Sequence: purge ephemeral days and persist the purge, sort days date
    /// descending, recompute statistics, ensure today's day exists, and
    /// partition into recent/older.
    pub fn bootstrap_at(
        store: Box<dyn Store>,
        chime: Box<dyn CompletionChime>,
        settings: Settings,
        today: NaiveDate,
    ) -> Result<Self> {
        let snapshot = store.load()?;
        let mut engine = Self {
            store,
            chime,
            settings,
            days: snapshot.days,
            arena: TaskArena::from_tasks(snapshot.tasks),
            active_day: None,
            recent_days: Vec::new(),
            older_days: Vec::new(),
            stats: Statistics::default(),
            today,
        };

        let ephemeral: Vec<Uuid> = engine
            .days
            .iter()
            .filter(|d| d.is_ephemeral)
            .map(|d| d.id)
            .collect();
        if !ephemeral.is_empty() {
            for id in &ephemeral {
                engine.arena.remove_day(*id);
            }
            engine.days.retain(|d| !d.is_ephemeral);
            let purged = engine.snapshot();
            engine.store.save(&purged)?;
        }

        engine.sort_days();
        engine.stats = compute_statistics(&engine.days, &engine.arena, engine.active_day);
        engine.ensure_day_for(today)?;
        Ok(engine)
    }

    // ------------------------------------------------------------------
    // Day bootstrap & carryover
    // ------------------------------------------------------------------

    /// Guarantee a day exists for the given date, carrying forward
    /// yesterday's unfinished work when configured.
    ///
    /// No-ops (selecting the existing day) when the date is already
    /// represented. Skips creation entirely on weekends unless weekend days
    /// are enabled. Absence of a yesterday to carry from just yields an
    /// empty day.
    pub fn ensure_day_for(&mut self, today: NaiveDate) -> Result<()> {
        self.today = today;

        if let Some(day) = self.days.iter().find(|d| d.date == today) {
            self.active_day = Some(day.id);
            // Nothing persisted, but the today-rate in the cached stats
            // depends on which day is active
            self.stats = compute_statistics(&self.days, &self.arena, self.active_day);
            self.partition();
            return Ok(());
        }

        if is_weekend(today) && !self.settings.create_weekend_days {
            eprintln!("daybook: skipping day creation for {} (weekend)", today);
            self.partition();
            return Ok(());
        }

        let day = Day::new(today);
        let day_id = day.id;
        self.days.insert(0, day);
        self.sort_days();

        if self.settings.auto_carryover {
            let yesterday = today - Duration::days(1);
            if let Some(source) = self.days.iter().find(|d| d.date == yesterday).map(|d| d.id) {
                self.carry_over(source, day_id);
            }
        }

        self.active_day = Some(day_id);
        self.partition();
        self.commit()
    }

    /// Clone every incomplete top-level task of one day into another,
    /// preserving order.
    fn carry_over(&mut self, source_day: Uuid, target_day: Uuid) {
        for id in self.arena.top_level_sorted(source_day) {
            let completed = self.arena.get(id).map_or(true, |t| t.is_completed);
            if !completed {
                self.clone_task_tree(id, None, target_day);
            }
        }
    }

    /// Recursively clone a task tree into a day.
    ///
    /// The clone keeps the source's task-group id: that is the link that
    /// makes instances across days one logical task. Completed descendants
    /// are resolved history and are not cloned.
    fn clone_task_tree(&mut self, source_id: Uuid, new_parent: Option<Uuid>, day_id: Uuid) -> Option<Uuid> {
        let source = self.arena.get(source_id)?.clone();
        let owner_day = if new_parent.is_none() { Some(day_id) } else { None };
        let clone = Task::carryover_of(&source, new_parent, owner_day);
        let clone_id = clone.id;
        self.arena.insert(clone);

        for child_id in self.arena.children_sorted(source_id) {
            let completed = self.arena.get(child_id).map_or(true, |t| t.is_completed);
            if !completed {
                self.clone_task_tree(child_id, Some(clone_id), day_id);
            }
        }
        Some(clone_id)
    }

    /// Create an ephemeral day adjacent to the loaded date range (debug
    /// tooling; purged at next startup). Returns the created date, or None
    /// for the skip conditions (no days loaded, duplicate date, weekend).
    pub fn create_debug_day(&mut self, edge: DebugEdge, carryover: bool) -> Result<Option<NaiveDate>> {
        let (date, adjacent) = match edge {
            DebugEdge::AfterLatest => match self.days.first() {
                Some(latest) => (latest.date + Duration::days(1), latest.id),
                None => {
                    eprintln!("daybook: no days loaded, nothing to attach a debug day to");
                    return Ok(None);
                }
            },
            DebugEdge::BeforeEarliest => match self.days.last() {
                Some(earliest) => (earliest.date - Duration::days(1), earliest.id),
                None => {
                    eprintln!("daybook: no days loaded, nothing to attach a debug day to");
                    return Ok(None);
                }
            },
        };

        if self.days.iter().any(|d| d.date == date) {
            eprintln!("daybook: day {} already exists, skipping", date);
            return Ok(None);
        }
        if is_weekend(date) && !self.settings.create_weekend_days {
            eprintln!("daybook: skipping day creation for {} (weekend)", date);
            return Ok(None);
        }

        let day = Day::ephemeral(date);
        let day_id = day.id;
        self.days.insert(0, day);
        self.sort_days();
        if carryover {
            self.carry_over(adjacent, day_id);
        }
        self.partition();
        self.commit()?;
        Ok(Some(date))
    }

    // ------------------------------------------------------------------
    // Task CRUD & ordering
    // ------------------------------------------------------------------

    /// Append a new top-level task to a day. Blank titles are a logged
    /// no-op, not an error.
    pub fn add_top_level_task(
        &mut self,
        day_id: Uuid,
        title: &str,
        deadline: Option<DateTime<Local>>,
    ) -> Result<Option<Uuid>> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }
        let next_order = self
            .arena
            .top_level_sorted(day_id)
            .iter()
            .filter_map(|id| self.arena.get(*id))
            .map(|t| t.sort_order)
            .max()
            .map_or(0, |m| m + 1);

        let mut task = Task::new(title.to_string(), Some(day_id), None, next_order);
        task.deadline = deadline;
        let id = task.id;
        self.arena.insert(task);
        self.commit()?;
        Ok(Some(id))
    }

    /// Insert a new sub-task as the first sibling, shifting the existing
    /// children down. Blank titles are a no-op.
    pub fn add_sub_task(&mut self, parent_id: Uuid, title: &str) -> Result<Option<Uuid>> {
        let title = title.trim();
        if title.is_empty() || self.arena.get(parent_id).is_none() {
            return Ok(None);
        }
        for id in self.arena.children_sorted(parent_id) {
            if let Some(child) = self.arena.get_mut(id) {
                child.sort_order += 1;
            }
        }
        let task = Task::new(title.to_string(), None, Some(parent_id), 0);
        let id = task.id;
        self.arena.insert(task);
        self.commit()?;
        Ok(Some(id))
    }

    /// Reorder a task among its siblings by shifting the gap between the
    /// old and new rank. The indices must reflect the current ascending
    /// sort-order ranking, computed by the caller immediately beforehand.
    pub fn move_sub_task(&mut self, task_id: Uuid, from: usize, to: usize) -> Result<()> {
        let siblings = self.arena.siblings_sorted(task_id);
        if from == to || from >= siblings.len() || to >= siblings.len() {
            return Ok(());
        }
        if to > from {
            for rank in (from + 1)..=to {
                if let Some(task) = self.arena.get_mut(siblings[rank]) {
                    task.sort_order -= 1;
                }
            }
        } else {
            for rank in to..from {
                if let Some(task) = self.arena.get_mut(siblings[rank]) {
                    task.sort_order += 1;
                }
            }
        }
        if let Some(task) = self.arena.get_mut(task_id) {
            task.sort_order = to as i64;
        }
        self.commit()
    }

    pub fn toggle_expansion(&mut self, task_id: Uuid) -> Result<()> {
        if let Some(task) = self.arena.get_mut(task_id) {
            task.is_expanded = !task.is_expanded;
            return self.commit();
        }
        Ok(())
    }

    pub fn update_title(&mut self, task_id: Uuid, title: &str) -> Result<()> {
        if let Some(task) = self.arena.get_mut(task_id) {
            task.title = title.to_string();
            return self.commit();
        }
        Ok(())
    }

    pub fn update_description(&mut self, task_id: Uuid, description: &str) -> Result<()> {
        if let Some(task) = self.arena.get_mut(task_id) {
            task.description = description.to_string();
            return self.commit();
        }
        Ok(())
    }

    pub fn update_deadline(&mut self, task_id: Uuid, deadline: Option<DateTime<Local>>) -> Result<()> {
        if let Some(task) = self.arena.get_mut(task_id) {
            task.deadline = deadline;
            return self.commit();
        }
        Ok(())
    }

    pub fn update_summary(&mut self, day_id: Uuid, summary: &str) -> Result<()> {
        if let Some(day) = self.days.iter_mut().find(|d| d.id == day_id) {
            day.summary = summary.to_string();
            return self.commit();
        }
        Ok(())
    }

    /// Delete a task and all its descendants. Other members of its
    /// task-group in other days are untouched.
    pub fn delete_task(&mut self, task_id: Uuid) -> Result<()> {
        if self.arena.remove_subtree(task_id).is_empty() {
            return Ok(());
        }
        self.commit()
    }

    /// Delete a day and its whole task tree. Deleting the active day clears
    /// the active pointer and re-runs the today bootstrap.
    pub fn delete_day(&mut self, day_id: Uuid) -> Result<()> {
        let Some(pos) = self.days.iter().position(|d| d.id == day_id) else {
            return Ok(());
        };
        let was_active = self.active_day == Some(day_id);
        self.arena.remove_day(day_id);
        self.days.remove(pos);
        if was_active {
            self.active_day = None;
        }
        self.partition();
        self.commit()?;
        if was_active {
            self.ensure_day_for(self.today)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Linked-instance aggregation
    // ------------------------------------------------------------------

    /// Flip completion for a task, fanning out to every instance of its
    /// task-group when `mark_all_linked`. The completion chime fires once
    /// per incomplete-to-complete transition, never on un-completing.
    pub fn toggle_completion(&mut self, task_id: Uuid, mark_all_linked: bool) -> Result<()> {
        let Some(task) = self.arena.get(task_id) else {
            return Ok(());
        };
        let new_state = !task.is_completed;
        let stamp = if new_state { Some(Local::now()) } else { None };
        let targets = if mark_all_linked {
            self.arena.group_members(task.group_id)
        } else {
            vec![task_id]
        };

        for id in targets {
            if let Some(t) = self.arena.get_mut(id) {
                t.is_completed = new_state;
                t.completed_at = stamp;
            }
        }
        if new_state {
            self.chime.play();
        }
        self.commit()
    }

    /// True when an earlier day holds another instance of this task's group
    pub fn is_carryover_instance(&self, task_id: Uuid) -> bool {
        let Some(task) = self.arena.get(task_id) else {
            return false;
        };
        let Some(own_date) = self.day_date_of(task_id) else {
            return false;
        };
        self.arena.iter().any(|other| {
            other.id != task_id
                && other.group_id == task.group_id
                && self.day_date_of(other.id).map_or(false, |d| d < own_date)
        })
    }

    /// Number of instances of this task's group across all loaded days,
    /// the task itself included
    pub fn linked_instance_count(&self, task_id: Uuid) -> usize {
        self.arena
            .get(task_id)
            .map(|t| self.arena.group_members(t.group_id).len())
            .unwrap_or(0)
    }

    /// Calendar days between the group's first appearance and the day
    /// owning this task; 0 when this task's day is the earliest
    pub fn carryover_age_in_days(&self, task_id: Uuid) -> i64 {
        let Some(task) = self.arena.get(task_id) else {
            return 0;
        };
        let Some(own_date) = self.day_date_of(task_id) else {
            return 0;
        };
        let earliest = self
            .arena
            .iter()
            .filter(|t| t.group_id == task.group_id)
            .filter_map(|t| self.day_date_of(t.id))
            .min()
            .unwrap_or(own_date);
        (own_date - earliest).num_days()
    }

    /// Interpolation parameter in [0, 1] for the carryover badge gradient:
    /// 0 at age 0, saturating at age 7
    pub fn carryover_badge_intensity(&self, task_id: Uuid) -> f64 {
        self.carryover_age_in_days(task_id).clamp(0, 7) as f64 / 7.0
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn day(&self, day_id: Uuid) -> Option<&Day> {
        self.days.iter().find(|d| d.id == day_id)
    }

    pub fn arena(&self) -> &TaskArena {
        &self.arena
    }

    pub fn active_day(&self) -> Option<Uuid> {
        self.active_day
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Days within 6 calendar days of today, date descending
    pub fn recent_days(&self) -> &[Uuid] {
        &self.recent_days
    }

    /// Everything older, date descending
    pub fn older_days(&self) -> &[Uuid] {
        &self.older_days
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// The date a task belongs to, resolved through its top-level ancestor
    pub fn day_date_of(&self, task_id: Uuid) -> Option<NaiveDate> {
        let day_id = self.arena.owning_day(task_id)?;
        self.day(day_id).map(|d| d.date)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn sort_days(&mut self) {
        self.days.sort_by(|a, b| b.date.cmp(&a.date));
    }

    fn partition(&mut self) {
        self.recent_days.clear();
        self.older_days.clear();
        for day in &self.days {
            if (self.today - day.date).num_days() < 7 {
                self.recent_days.push(day.id);
            } else {
                self.older_days.push(day.id);
            }
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            days: self.days.clone(),
            tasks: self.arena.snapshot_tasks(),
        }
    }

    /// Recompute cached statistics and persist the snapshot. In-memory
    /// state stays mutated even when the save fails.
    fn commit(&mut self) -> Result<()> {
        self.stats = compute_statistics(&self.days, &self.arena, self.active_day);
        let snapshot = self.snapshot();
        self.store.save(&snapshot)?;
        Ok(())
    }
}
