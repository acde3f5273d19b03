//! Per-ped task scheduling.
//!
//! A [`TaskManager`] owns at most one running task, a priority-ordered
//! pending queue, and bounded history buckets. It is a state machine over the
//! queue: preemption happens when work arrives, promotion happens only during
//! normal queue processing, and terminated tasks become immutable history.

use std::collections::VecDeque;

use crate::state::{PedId, TaskId};
use crate::task::{Task, TaskContext, TaskStatus};

/// Scheduler knobs, all per owner.
#[derive(Clone, Copy, Debug)]
pub struct ManagerConfig {
    /// Declared concurrency limit. Only a single current slot is
    /// implemented; values above 1 change nothing.
    pub max_concurrent: usize,
    /// Master switch for priority preemption.
    pub allow_interruption: bool,
    /// Promote pending tasks automatically during queue processing.
    pub auto_start: bool,
    /// Retained entries per history bucket; the oldest entry is evicted.
    pub history_limit: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 1,
            allow_interruption: true,
            auto_start: true,
            history_limit: 64,
        }
    }
}

/// Per-entity scheduler: one current slot, a pending queue, and history.
#[derive(Debug)]
pub struct TaskManager {
    owner: PedId,
    config: ManagerConfig,
    current: Option<Task>,
    /// Sorted by descending priority; insertion order preserved among equal
    /// priorities.
    pending: Vec<Task>,
    completed: VecDeque<Task>,
    failed: VecDeque<Task>,
}

impl TaskManager {
    pub fn new(owner: PedId) -> Self {
        Self::with_config(owner, ManagerConfig::default())
    }

    pub fn with_config(owner: PedId, config: ManagerConfig) -> Self {
        Self {
            owner,
            config,
            current: None,
            pending: Vec::new(),
            completed: VecDeque::new(),
            failed: VecDeque::new(),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn owner(&self) -> PedId {
        self.owner
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.current.as_ref()
    }

    pub fn pending_tasks(&self) -> &[Task] {
        &self.pending
    }

    pub fn has_active_tasks(&self) -> bool {
        self.current.is_some() || !self.pending.is_empty()
    }

    /// Current plus pending.
    pub fn task_count(&self) -> usize {
        self.pending.len() + usize::from(self.current.is_some())
    }

    pub fn completed_history(&self) -> &VecDeque<Task> {
        &self.completed
    }

    pub fn failed_history(&self) -> &VecDeque<Task> {
        &self.failed
    }

    // ------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------

    /// Enqueue a task, preempting a lower-priority interruptible current
    /// task. Returns false when the task is rejected outright.
    pub fn add(&mut self, task: Task, ctx: &mut TaskContext<'_>) -> bool {
        if !self.accepts(&task) {
            return false;
        }
        self.try_preempt_for(&task, ctx);
        self.enqueue(task);
        true
    }

    /// Like [`add`](Self::add), but occupies the free slot immediately
    /// instead of waiting for queue processing.
    pub fn start(&mut self, task: Task, ctx: &mut TaskContext<'_>) -> bool {
        if !self.accepts(&task) {
            return false;
        }
        self.try_preempt_for(&task, ctx);

        if self.current.is_none() {
            let mut task = task;
            if task.start(ctx) {
                if task.is_terminal() {
                    // Synchronous completion: straight to history.
                    self.push_history(task);
                } else {
                    self.current = Some(task);
                }
                return true;
            }
            if task.is_terminal() {
                // Initialization failed; the attempt consumed the task.
                self.push_history(task);
            } else {
                tracing::debug!(owner = %self.owner, "immediate start refused; task dropped");
            }
            return false;
        }

        self.enqueue(task);
        true
    }

    /// Stop a specific task (current or pending) by id.
    pub fn stop_task(&mut self, id: TaskId, ctx: &mut TaskContext<'_>) -> bool {
        if let Some(current) = self.current.as_ref()
            && current.id() == id
        {
            let mut task = self.current.take().expect("current checked above");
            task.stop(ctx);
            self.push_history(task);
            return true;
        }

        if let Some(index) = self.pending.iter().position(|task| task.id() == id) {
            // Never started; it goes to failed history untouched.
            let task = self.pending.remove(index);
            self.failed_push(task);
            return true;
        }

        tracing::debug!(owner = %self.owner, task = %id, "stop requested for unknown task");
        false
    }

    /// Explicitly displace the current task. Does not auto-promote.
    pub fn interrupt_current(&mut self, ctx: &mut TaskContext<'_>) -> bool {
        let Some(current) = self.current.as_ref() else {
            return false;
        };
        if !current.can_be_interrupted() {
            tracing::debug!(owner = %self.owner, "current task is not interruptible");
            return false;
        }
        let mut task = self.current.take().expect("current checked above");
        task.interrupt(ctx);
        self.push_history(task);
        true
    }

    /// Stop the current task and fail out every pending task.
    pub fn clear_all(&mut self, ctx: &mut TaskContext<'_>) {
        if let Some(mut task) = self.current.take() {
            task.stop(ctx);
            // An explicitly cleared current task is filed under completed
            // history regardless of its terminal state.
            self.completed_push(task);
        }
        for task in self.pending.drain(..).collect::<Vec<_>>() {
            self.failed_push(task);
        }
    }

    /// One pass of queue maintenance: harvest a terminal current task, then
    /// promote the best startable pending task if auto-start is on.
    pub fn process_queue(&mut self, ctx: &mut TaskContext<'_>) {
        if let Some(current) = self.current.as_ref()
            && current.is_terminal()
        {
            let task = self.current.take().expect("current checked above");
            self.push_history(task);
        }

        if self.current.is_some() || !self.config.auto_start {
            return;
        }

        while !self.pending.is_empty() {
            let mut task = self.pending.remove(0);
            if task.start(ctx) {
                if task.is_terminal() {
                    self.push_history(task);
                    continue;
                }
                self.current = Some(task);
                return;
            }
            if task.is_terminal() {
                // Failed during initialization; try the next candidate.
                self.push_history(task);
                continue;
            }
            // Conditions not met yet; put it back and retry next interval.
            self.pending.insert(0, task);
            return;
        }
    }

    /// Advance the current task, then process the queue.
    pub fn tick(&mut self, dt: f32, ctx: &mut TaskContext<'_>) {
        if let Some(current) = self.current.as_mut() {
            current.tick(dt, ctx);
        }
        self.process_queue(ctx);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn accepts(&self, task: &Task) -> bool {
        if task.owner() != self.owner {
            tracing::warn!(owner = %self.owner, task_owner = %task.owner(), "task owned by another ped");
            return false;
        }
        if task.status() != TaskStatus::Idle {
            tracing::warn!(task = %task.id(), status = %task.status(), "tasks are never reused");
            return false;
        }
        true
    }

    /// Free the slot when the incoming task outranks an interruptible
    /// current task.
    fn try_preempt_for(&mut self, incoming: &Task, ctx: &mut TaskContext<'_>) {
        let Some(current) = self.current.as_ref() else {
            return;
        };
        if !self.config.allow_interruption || !current.can_be_interrupted() {
            return;
        }
        if incoming.priority() <= current.priority() {
            return;
        }
        let mut task = self.current.take().expect("current checked above");
        tracing::debug!(
            owner = %self.owner,
            preempted = %task.id(),
            by = %incoming.id(),
            "priority preemption"
        );
        task.stop(ctx);
        self.push_history(task);
    }

    fn enqueue(&mut self, task: Task) {
        self.pending.push(task);
        // Stable: equal priorities keep their insertion order.
        self.pending
            .sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    fn push_history(&mut self, task: Task) {
        match task.status() {
            TaskStatus::Completed => self.completed_push(task),
            _ => self.failed_push(task),
        }
    }

    fn completed_push(&mut self, task: Task) {
        if self.completed.len() >= self.config.history_limit {
            self.completed.pop_front();
        }
        self.completed.push_back(task);
    }

    fn failed_push(&mut self, task: Task) {
        if self.failed.len() >= self.config.history_limit {
            self.failed.pop_front();
        }
        self.failed.push_back(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use crate::factory::TaskFactory;
    use crate::kinds::TaskClass;
    use crate::kinds::oneshot::MoveTowardsParams;
    use crate::math::Vec3;
    use crate::state::PedState;
    use crate::task::TaskPriority;
    use crate::world::WorldEnv;

    fn move_task(factory: &TaskFactory, priority: TaskPriority) -> Task {
        factory
            .create_move_towards(
                PedId(1),
                None,
                MoveTowardsParams {
                    destination: Some(Vec3::new(100.0, 0.0, 0.0)),
                    speed: 1.0,
                    stop_distance: 0.5,
                },
            )
            .unwrap()
            .with_priority(priority)
    }

    #[test]
    fn queue_starts_the_highest_priority_task_first() {
        let factory = TaskFactory::new();
        let mut manager = TaskManager::new(PedId(1));
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        let mut sink = RecordingSink::new();
        let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);

        for priority in [TaskPriority::Low, TaskPriority::High, TaskPriority::Normal] {
            assert!(manager.add(move_task(&factory, priority), &mut ctx));
        }
        manager.process_queue(&mut ctx);

        assert_eq!(
            manager.current_task().map(|task| task.priority()),
            Some(TaskPriority::High)
        );
        let remaining: Vec<TaskPriority> = manager
            .pending_tasks()
            .iter()
            .map(|task| task.priority())
            .collect();
        assert_eq!(remaining, vec![TaskPriority::Normal, TaskPriority::Low]);
    }

    #[test]
    fn equal_priorities_keep_insertion_order() {
        let factory = TaskFactory::new();
        let mut manager = TaskManager::new(PedId(1));
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        let mut sink = RecordingSink::new();
        let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);

        let first = move_task(&factory, TaskPriority::Normal);
        let second = move_task(&factory, TaskPriority::Normal);
        let first_id = first.id();
        let second_id = second.id();
        manager.add(first, &mut ctx);
        manager.add(second, &mut ctx);

        let order: Vec<TaskId> = manager.pending_tasks().iter().map(|task| task.id()).collect();
        assert_eq!(order, vec![first_id, second_id]);
    }

    #[test]
    fn higher_priority_preempts_interruptible_current() {
        let factory = TaskFactory::new();
        let mut manager = TaskManager::new(PedId(1));
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        let mut sink = RecordingSink::new();
        let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);

        assert!(manager.start(move_task(&factory, TaskPriority::Normal), &mut ctx));
        assert!(manager.current_task().is_some());

        assert!(manager.add(move_task(&factory, TaskPriority::Critical), &mut ctx));
        // The Normal task was stopped into history; the slot is empty until
        // queue processing promotes the Critical task.
        assert!(manager.current_task().is_none());
        assert_eq!(manager.failed_history().len(), 1);
        assert_eq!(
            manager.failed_history()[0].status(),
            TaskStatus::Cancelled
        );

        manager.process_queue(&mut ctx);
        assert_eq!(
            manager.current_task().map(|task| task.priority()),
            Some(TaskPriority::Critical)
        );
    }

    #[test]
    fn non_interruptible_current_is_never_preempted() {
        let factory = TaskFactory::new();
        let mut manager = TaskManager::new(PedId(1));
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        let mut sink = RecordingSink::new();
        let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);

        let stubborn = move_task(&factory, TaskPriority::Low).with_interruptible(false);
        let stubborn_id = stubborn.id();
        assert!(manager.start(stubborn, &mut ctx));

        assert!(manager.add(move_task(&factory, TaskPriority::Emergency), &mut ctx));
        assert_eq!(manager.current_task().map(|task| task.id()), Some(stubborn_id));
        assert_eq!(manager.current_task().unwrap().status(), TaskStatus::Running);

        // Explicit interrupt is refused too.
        assert!(!manager.interrupt_current(&mut ctx));
        assert_eq!(manager.current_task().map(|task| task.id()), Some(stubborn_id));
    }

    #[test]
    fn clear_all_routes_current_to_completed_and_pending_to_failed() {
        let factory = TaskFactory::new();
        let mut manager = TaskManager::new(PedId(1));
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        let mut sink = RecordingSink::new();
        let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);

        manager.start(move_task(&factory, TaskPriority::Normal), &mut ctx);
        manager.add(move_task(&factory, TaskPriority::Low), &mut ctx);
        manager.add(move_task(&factory, TaskPriority::Low), &mut ctx);

        manager.clear_all(&mut ctx);
        assert!(!manager.has_active_tasks());
        assert_eq!(manager.completed_history().len(), 1);
        assert_eq!(manager.failed_history().len(), 2);
        // Pending tasks never ran.
        for task in manager.failed_history() {
            assert_eq!(task.status(), TaskStatus::Idle);
            assert!(task.result().is_none());
        }
    }

    #[test]
    fn history_buckets_are_bounded() {
        let factory = TaskFactory::new();
        let mut manager = TaskManager::with_config(
            PedId(1),
            ManagerConfig {
                history_limit: 2,
                ..ManagerConfig::default()
            },
        );
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        let mut sink = RecordingSink::new();
        let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);

        for _ in 0..5 {
            manager.start(move_task(&factory, TaskPriority::Normal), &mut ctx);
            manager.interrupt_current(&mut ctx);
        }
        assert_eq!(manager.failed_history().len(), 2);
    }

    #[test]
    fn interrupt_current_marks_interrupted_and_does_not_promote() {
        let factory = TaskFactory::new();
        let mut manager = TaskManager::new(PedId(1));
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        let mut sink = RecordingSink::new();
        let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);

        manager.start(move_task(&factory, TaskPriority::Normal), &mut ctx);
        manager.add(move_task(&factory, TaskPriority::Normal), &mut ctx);

        assert!(manager.interrupt_current(&mut ctx));
        assert_eq!(
            manager.failed_history()[0].status(),
            TaskStatus::Interrupted
        );
        // Promotion only happens in queue processing.
        assert!(manager.current_task().is_none());
        assert_eq!(manager.pending_tasks().len(), 1);
    }
}
