//! The task state machine.
//!
//! [`Task`] is the atomic unit of behavior: a finite state machine over
//! [`TaskStatus`] wrapping a [`TaskKind`] sum of the three behavior families.
//! All lifecycle transitions flow through this module; the kinds only report
//! progress back through [`TickOutcome`](crate::kinds::TickOutcome), so the
//! invariants (single terminal transition, cleanup exactly once, event
//! ordering) live in one place.

mod context;
mod result;
mod status;

pub use context::TaskContext;
pub use result::{ResultBag, ResultValue, TaskResult};
pub use status::{TaskFamily, TaskPriority, TaskStatus};

use crate::events::TaskEvent;
use crate::kinds::{TaskClass, TaskKind, TickOutcome};
use crate::state::{PedId, TaskId};

/// Default timeout applied by the factory.
pub const DEFAULT_TIMEOUT: f32 = 30.0;

/// Common state shared by every task regardless of family.
#[derive(Clone, Debug)]
pub struct TaskState {
    pub id: TaskId,
    pub class: TaskClass,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub owner: PedId,
    pub target: Option<PedId>,
    pub requires_target: bool,
    pub can_be_interrupted: bool,
    /// Execution time, accumulated only while Running.
    pub elapsed: f32,
    /// Timeout in seconds; `None` disables enforcement.
    pub timeout: Option<f32>,
    /// Task-specific outputs, folded into the result at termination.
    pub outputs: ResultBag,
    pub result: Option<TaskResult>,
}

/// A single behavior unit bound to one owner for its whole lifetime.
#[derive(Clone, Debug)]
pub struct Task {
    state: TaskState,
    kind: TaskKind,
}

impl Task {
    /// Creates an Idle task. Use the factory for validated construction.
    pub fn new(id: TaskId, class: TaskClass, owner: PedId, target: Option<PedId>, kind: TaskKind) -> Self {
        Self {
            state: TaskState {
                id,
                class,
                description: class.describe().to_owned(),
                priority: TaskPriority::Normal,
                status: TaskStatus::Idle,
                owner,
                target,
                requires_target: class.requires_target(),
                can_be_interrupted: true,
                elapsed: 0.0,
                timeout: Some(DEFAULT_TIMEOUT),
                outputs: ResultBag::new(),
                result: None,
            },
            kind,
        }
    }

    // ------------------------------------------------------------------
    // Construction-time configuration
    // ------------------------------------------------------------------

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.state.priority = priority;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<f32>) -> Self {
        self.state.timeout = timeout;
        self
    }

    pub fn with_interruptible(mut self, can_be_interrupted: bool) -> Self {
        self.state.can_be_interrupted = can_be_interrupted;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.state.description = description.into();
        self
    }

    /// Requirement override for classes whose target is optional in context
    /// (an aim with an explicit direction).
    pub(crate) fn with_requires_target(mut self, requires_target: bool) -> Self {
        self.state.requires_target = requires_target;
        self
    }

    // ------------------------------------------------------------------
    // Read-only queries
    // ------------------------------------------------------------------

    pub fn id(&self) -> TaskId {
        self.state.id
    }

    pub fn class(&self) -> TaskClass {
        self.state.class
    }

    pub fn family(&self) -> TaskFamily {
        self.kind.family()
    }

    pub fn description(&self) -> &str {
        &self.state.description
    }

    pub fn status(&self) -> TaskStatus {
        self.state.status
    }

    pub fn priority(&self) -> TaskPriority {
        self.state.priority
    }

    pub fn owner(&self) -> PedId {
        self.state.owner
    }

    pub fn target(&self) -> Option<PedId> {
        self.state.target
    }

    pub fn elapsed(&self) -> f32 {
        self.state.elapsed
    }

    pub fn can_be_interrupted(&self) -> bool {
        self.state.can_be_interrupted
    }

    pub fn is_terminal(&self) -> bool {
        self.state.status.is_terminal()
    }

    pub fn result(&self) -> Option<&TaskResult> {
        self.state.result.as_ref()
    }

    pub fn state(&self) -> &TaskState {
        &self.state
    }

    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    /// Reprioritize before start. Ignored with a warning once the task has
    /// left Idle.
    pub fn set_priority(&mut self, priority: TaskPriority) {
        if self.state.status != TaskStatus::Idle {
            tracing::warn!(task = %self.state.id, status = %self.state.status, "priority is fixed after start");
            return;
        }
        self.state.priority = priority;
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Precondition for starting: an owner context and valid conditions.
    pub fn can_start(&self, ctx: &TaskContext<'_>) -> bool {
        ctx.ped.id == self.state.owner && self.kind.validate(&self.state, ctx)
    }

    /// Attempts the Idle -> Starting -> Running transition.
    ///
    /// Returns false with no state change when the task is not Idle, its
    /// conditions do not hold, or a required target is absent. Initialization
    /// or first-execution failures finish the task as Failed (with a
    /// descriptive message) instead of leaving it stuck in Starting; those
    /// also return false.
    pub fn start(&mut self, ctx: &mut TaskContext<'_>) -> bool {
        if self.state.status != TaskStatus::Idle {
            tracing::warn!(task = %self.state.id, status = %self.state.status, "start refused: not idle");
            return false;
        }
        if self.state.requires_target && self.state.target.is_none() {
            tracing::warn!(task = %self.state.id, class = %self.state.class, "start refused: target required");
            return false;
        }
        if !self.can_start(ctx) {
            tracing::debug!(task = %self.state.id, "start refused: conditions not met");
            return false;
        }

        self.transition(TaskStatus::Starting, ctx);
        ctx.emit(TaskEvent::Started);

        if let Err(message) = self.kind.initialize(&mut self.state, ctx) {
            self.finish_as(ctx, TaskStatus::Failed, false, message);
            return false;
        }

        match self.kind.execute(&mut self.state, ctx) {
            TickOutcome::Continue => {
                self.transition(TaskStatus::Running, ctx);
                true
            }
            TickOutcome::Complete { success, message } => {
                // Synchronous completion (instant one-shots).
                let terminal = if success {
                    TaskStatus::Completed
                } else {
                    TaskStatus::Failed
                };
                self.finish_as(ctx, terminal, success, message);
                success
            }
        }
    }

    /// Advances the task by `dt` seconds. No-op unless Running.
    ///
    /// Order inside a tick: timeout check, then the subtype update, then
    /// condition re-validation. The update runs first so a task can react to
    /// a state change in the same tick it causes before the validator can
    /// kill it.
    pub fn tick(&mut self, dt: f32, ctx: &mut TaskContext<'_>) {
        if self.state.status != TaskStatus::Running {
            return;
        }
        if ctx.ped.id != self.state.owner {
            tracing::warn!(task = %self.state.id, ped = %ctx.ped.id, "tick refused: context ped is not the owner");
            return;
        }

        self.state.elapsed += dt;
        if let Some(timeout) = self.state.timeout
            && self.state.elapsed >= timeout
        {
            self.finish_as(ctx, TaskStatus::Failed, false, "Task timed out".to_owned());
            return;
        }

        match self.kind.update(&mut self.state, dt, ctx) {
            TickOutcome::Complete { success, message } => {
                let terminal = if success {
                    TaskStatus::Completed
                } else {
                    TaskStatus::Failed
                };
                self.finish_as(ctx, terminal, success, message);
            }
            TickOutcome::Continue => {
                if !self.kind.validate(&self.state, ctx) {
                    self.finish_as(
                        ctx,
                        TaskStatus::Failed,
                        false,
                        "Task conditions invalid".to_owned(),
                    );
                }
            }
        }
    }

    /// Records the outcome and moves to the matching terminal state.
    ///
    /// Honored at most once per task; later calls degrade to a warning.
    pub fn complete(&mut self, ctx: &mut TaskContext<'_>, success: bool, message: impl Into<String>) {
        let terminal = if success {
            TaskStatus::Completed
        } else {
            TaskStatus::Failed
        };
        self.finish_as(ctx, terminal, success, message.into());
    }

    /// Cooperative cancellation: cleanup runs, then the task is Cancelled.
    ///
    /// Idempotent; a no-op when the task is Idle or already terminal.
    pub fn stop(&mut self, ctx: &mut TaskContext<'_>) {
        if self.state.status == TaskStatus::Idle || self.state.status.is_terminal() {
            tracing::debug!(task = %self.state.id, status = %self.state.status, "stop ignored");
            return;
        }
        self.finish_as(ctx, TaskStatus::Cancelled, false, "Task stopped".to_owned());
    }

    /// Stop flavor used by the manager's explicit interrupt.
    pub fn interrupt(&mut self, ctx: &mut TaskContext<'_>) {
        if self.state.status == TaskStatus::Idle || self.state.status.is_terminal() {
            tracing::debug!(task = %self.state.id, status = %self.state.status, "interrupt ignored");
            return;
        }
        self.finish_as(
            ctx,
            TaskStatus::Interrupted,
            false,
            "Task interrupted".to_owned(),
        );
    }

    /// Running -> Paused, only for interruptible tasks.
    pub fn pause(&mut self, ctx: &mut TaskContext<'_>) -> bool {
        if self.state.status != TaskStatus::Running {
            tracing::debug!(task = %self.state.id, status = %self.state.status, "pause refused");
            return false;
        }
        if !self.state.can_be_interrupted {
            tracing::debug!(task = %self.state.id, "pause refused: not interruptible");
            return false;
        }
        self.transition(TaskStatus::Paused, ctx);
        true
    }

    /// Paused -> Running.
    pub fn resume(&mut self, ctx: &mut TaskContext<'_>) -> bool {
        if self.state.status != TaskStatus::Paused {
            tracing::debug!(task = %self.state.id, status = %self.state.status, "resume refused");
            return false;
        }
        self.transition(TaskStatus::Running, ctx);
        true
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn transition(&mut self, to: TaskStatus, ctx: &mut TaskContext<'_>) {
        let from = self.state.status;
        self.state.status = to;
        ctx.emit(TaskEvent::StateChanged { from, to });
    }

    /// The single terminal path: cleanup once, record the result once, then
    /// notify state-changed followed by completed.
    fn finish_as(
        &mut self,
        ctx: &mut TaskContext<'_>,
        terminal: TaskStatus,
        success: bool,
        message: String,
    ) {
        debug_assert!(terminal.is_terminal());
        if self.state.status.is_terminal() || self.state.result.is_some() {
            tracing::warn!(task = %self.state.id, status = %self.state.status, "completion ignored: already terminal");
            return;
        }

        self.kind.cleanup(&mut self.state, ctx);

        let result = TaskResult {
            success,
            message,
            elapsed: self.state.elapsed,
            outputs: std::mem::take(&mut self.state.outputs),
        };
        self.state.result = Some(result.clone());

        self.transition(terminal, ctx);
        ctx.emit(TaskEvent::Completed { result });
    }
}

/// Bare task state for exercising kinds directly in unit tests.
#[cfg(test)]
pub(crate) fn test_state(class: TaskClass, owner: PedId, target: Option<PedId>) -> TaskState {
    TaskState {
        id: TaskId(0),
        class,
        description: class.describe().to_owned(),
        priority: TaskPriority::Normal,
        status: TaskStatus::Running,
        owner,
        target,
        requires_target: false,
        can_be_interrupted: true,
        elapsed: 0.0,
        timeout: None,
        outputs: ResultBag::new(),
        result: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use crate::kinds::oneshot::{MoveTowardsParams, MoveTowardsTask, OneShotTask, OneShotVariant};
    use crate::math::Vec3;
    use crate::state::PedState;
    use crate::world::WorldEnv;

    fn move_task(id: u64) -> Task {
        let params = MoveTowardsParams {
            destination: Some(Vec3::new(10.0, 0.0, 0.0)),
            speed: 1.0,
            stop_distance: 0.5,
        };
        Task::new(
            TaskId(id),
            TaskClass::MoveTowards,
            PedId(1),
            None,
            TaskKind::OneShot(OneShotTask::new(OneShotVariant::MoveTowards(
                MoveTowardsTask::new(params),
            ))),
        )
    }

    fn ped() -> PedState {
        PedState::new(PedId(1), Vec3::ZERO)
    }

    #[test]
    fn illegal_transitions_leave_state_unchanged() {
        let mut task = move_task(1);
        let mut ped = ped();
        let mut sink = RecordingSink::new();
        let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);

        // Resume and pause are refused outside their source states.
        assert!(!task.resume(&mut ctx));
        assert!(!task.pause(&mut ctx));
        assert_eq!(task.status(), TaskStatus::Idle);

        // Ticking an Idle task does nothing.
        task.tick(1.0, &mut ctx);
        assert_eq!(task.status(), TaskStatus::Idle);
        assert_eq!(task.elapsed(), 0.0);

        assert!(task.start(&mut ctx));
        assert_eq!(task.status(), TaskStatus::Running);
        // Starting twice is refused.
        assert!(!task.start(&mut ctx));
        assert_eq!(task.status(), TaskStatus::Running);
    }

    #[test]
    fn completion_fires_exactly_once() {
        let mut task = move_task(2);
        let mut ped = ped();
        let mut sink = RecordingSink::new();
        let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);

        assert!(task.start(&mut ctx));
        task.complete(&mut ctx, true, "done");
        task.complete(&mut ctx, true, "done again");
        task.stop(&mut ctx);

        assert_eq!(task.status(), TaskStatus::Completed);
        assert_eq!(sink.completions(), 1);
        assert_eq!(task.result().unwrap().message, "done");
    }

    #[test]
    fn state_changed_precedes_completed() {
        let mut task = move_task(3);
        let mut ped = ped();
        let mut sink = RecordingSink::new();
        let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);

        assert!(task.start(&mut ctx));
        task.complete(&mut ctx, true, "done");

        let events = sink.events;
        let state_change = events
            .iter()
            .position(|event| {
                matches!(
                    event,
                    crate::events::TaskEvent::StateChanged {
                        to: TaskStatus::Completed,
                        ..
                    }
                )
            })
            .unwrap();
        let completed = events
            .iter()
            .position(|event| matches!(event, crate::events::TaskEvent::Completed { .. }))
            .unwrap();
        assert!(state_change < completed);
    }

    #[test]
    fn timeout_is_boundary_inclusive() {
        let mut task = move_task(4).with_timeout(Some(3.0));
        let mut ped = ped();
        let mut sink = RecordingSink::new();
        let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);

        assert!(task.start(&mut ctx));
        task.tick(1.0, &mut ctx);
        task.tick(1.0, &mut ctx);
        assert_eq!(task.status(), TaskStatus::Running);
        task.tick(1.0, &mut ctx);
        assert_eq!(task.status(), TaskStatus::Failed);
        assert_eq!(task.result().unwrap().message, "Task timed out");
    }

    #[test]
    fn stop_is_idempotent_and_cancels() {
        let mut task = move_task(5);
        let mut ped = ped();
        let mut sink = RecordingSink::new();

        assert!(task.start(&mut TaskContext::new(
            &mut ped,
            WorldEnv::empty(),
            &mut sink
        )));
        task.stop(&mut TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink));
        let first_completions = sink.completions();
        task.stop(&mut TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink));

        assert_eq!(task.status(), TaskStatus::Cancelled);
        assert_eq!(first_completions, 1);
        assert_eq!(sink.completions(), 1);
    }

    #[test]
    fn pause_blocks_timeout_accrual() {
        let mut task = move_task(6).with_timeout(Some(2.0));
        let mut ped = ped();
        let mut sink = RecordingSink::new();
        let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);

        assert!(task.start(&mut ctx));
        assert!(task.pause(&mut ctx));
        task.tick(10.0, &mut ctx);
        assert_eq!(task.status(), TaskStatus::Paused);
        assert_eq!(task.elapsed(), 0.0);
        assert!(task.resume(&mut ctx));
        assert_eq!(task.status(), TaskStatus::Running);
    }

    #[test]
    fn non_interruptible_task_refuses_pause() {
        let mut task = move_task(7).with_interruptible(false);
        let mut ped = ped();
        let mut sink = RecordingSink::new();
        let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);

        assert!(task.start(&mut ctx));
        assert!(!task.pause(&mut ctx));
        assert_eq!(task.status(), TaskStatus::Running);
    }

    #[test]
    fn priority_is_fixed_after_start() {
        let mut task = move_task(8);
        task.set_priority(TaskPriority::High);
        assert_eq!(task.priority(), TaskPriority::High);

        let mut ped = ped();
        let mut sink = RecordingSink::new();
        let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);
        assert!(task.start(&mut ctx));
        task.set_priority(TaskPriority::Lowest);
        assert_eq!(task.priority(), TaskPriority::High);
    }
}
