//! Multi-phase behaviors.
//!
//! Actions that take measurable time and have sub-goals run through a linear
//! phase sequence: Preparation -> Execution -> Completion -> Cleanup. Phases
//! cannot be skipped or revisited; a phase may carry its own timeout,
//! independent of the task-level one.

mod climb;
mod climb_ladder;
mod enter_vehicle;
mod grab_ledge;

pub use climb::{ClimbParams, ClimbTask};
pub use climb_ladder::{ClimbLadderParams, ClimbLadderTask};
pub use enter_vehicle::{EnterVehicleParams, EnterVehicleTask};
pub use grab_ledge::{GrabLedgeParams, GrabLedgeTask};

use crate::events::TaskEvent;
use crate::kinds::TickOutcome;
use crate::task::{TaskContext, TaskState};

/// One linear stage of a multi-step action.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TaskPhase {
    #[default]
    Preparation,
    Execution,
    Completion,
    Cleanup,
}

impl TaskPhase {
    /// The following phase, or `None` after Cleanup.
    pub const fn next(self) -> Option<TaskPhase> {
        match self {
            TaskPhase::Preparation => Some(TaskPhase::Execution),
            TaskPhase::Execution => Some(TaskPhase::Completion),
            TaskPhase::Completion => Some(TaskPhase::Cleanup),
            TaskPhase::Cleanup => None,
        }
    }
}

/// Hooks a multi-phase behavior implements.
pub(crate) trait ComplexBehavior {
    /// Resolve anchors and preconditions; an error aborts the task as Failed.
    fn prepare(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) -> Result<(), String>;

    /// Run one tick of the given phase.
    fn execute_phase(
        &mut self,
        phase: TaskPhase,
        state: &mut TaskState,
        dt: f32,
        ctx: &mut TaskContext<'_>,
    ) -> TickOutcome;

    /// Whether the given phase has met its goal.
    fn can_advance(&self, phase: TaskPhase, state: &TaskState, ctx: &TaskContext<'_>) -> bool;

    /// Invoked once when a new phase begins.
    fn on_phase_start(
        &mut self,
        _phase: TaskPhase,
        _state: &mut TaskState,
        _ctx: &mut TaskContext<'_>,
    ) {
    }

    fn validate(&self, _state: &TaskState, _ctx: &TaskContext<'_>) -> bool {
        true
    }

    fn cleanup(&mut self, _state: &mut TaskState, _ctx: &mut TaskContext<'_>) {}

    fn finished_message(&self) -> &'static str {
        "task complete"
    }
}

/// Concrete multi-phase behaviors.
#[derive(Clone, Debug)]
pub enum ComplexVariant {
    Climb(ClimbTask),
    EnterVehicle(EnterVehicleTask),
    GrabLedge(GrabLedgeTask),
    ClimbLadder(ClimbLadderTask),
}

impl ComplexVariant {
    fn behavior_mut(&mut self) -> &mut dyn ComplexBehavior {
        match self {
            Self::Climb(task) => task,
            Self::EnterVehicle(task) => task,
            Self::GrabLedge(task) => task,
            Self::ClimbLadder(task) => task,
        }
    }

    fn behavior(&self) -> &dyn ComplexBehavior {
        match self {
            Self::Climb(task) => task,
            Self::EnterVehicle(task) => task,
            Self::GrabLedge(task) => task,
            Self::ClimbLadder(task) => task,
        }
    }
}

/// Family scaffold: owns the phase machine and its timing.
#[derive(Clone, Debug)]
pub struct ComplexTask {
    phase: TaskPhase,
    time_in_phase: f32,
    phase_timeout: Option<f32>,
    variant: ComplexVariant,
}

impl ComplexTask {
    pub fn new(variant: ComplexVariant) -> Self {
        Self {
            phase: TaskPhase::Preparation,
            time_in_phase: 0.0,
            phase_timeout: None,
            variant,
        }
    }

    /// Bound how long any single phase may run.
    pub fn with_phase_timeout(mut self, timeout: Option<f32>) -> Self {
        self.phase_timeout = timeout;
        self
    }

    pub fn phase(&self) -> TaskPhase {
        self.phase
    }

    pub fn time_in_phase(&self) -> f32 {
        self.time_in_phase
    }

    pub fn variant(&self) -> &ComplexVariant {
        &self.variant
    }

    pub(crate) fn initialize(
        &mut self,
        state: &mut TaskState,
        ctx: &mut TaskContext<'_>,
    ) -> Result<(), String> {
        self.variant.behavior_mut().prepare(state, ctx)
    }

    pub(crate) fn execute(
        &mut self,
        _state: &mut TaskState,
        _ctx: &mut TaskContext<'_>,
    ) -> TickOutcome {
        // The phase machine starts ticking in Preparation.
        TickOutcome::Continue
    }

    pub(crate) fn update(
        &mut self,
        state: &mut TaskState,
        dt: f32,
        ctx: &mut TaskContext<'_>,
    ) -> TickOutcome {
        self.time_in_phase += dt;
        if let Some(timeout) = self.phase_timeout
            && self.time_in_phase >= timeout
        {
            return TickOutcome::fail(format!("{} phase timed out", self.phase));
        }

        let outcome = self
            .variant
            .behavior_mut()
            .execute_phase(self.phase, state, dt, ctx);
        if let TickOutcome::Complete { .. } = outcome {
            return outcome;
        }

        if self
            .variant
            .behavior()
            .can_advance(self.phase, state, &*ctx)
        {
            match self.phase.next() {
                Some(next) => {
                    ctx.emit(TaskEvent::PhaseChanged {
                        from: self.phase,
                        to: next,
                    });
                    self.phase = next;
                    self.time_in_phase = 0.0;
                    self.variant.behavior_mut().on_phase_start(next, state, ctx);
                }
                None => {
                    return TickOutcome::done(self.variant.behavior().finished_message());
                }
            }
        }

        TickOutcome::Continue
    }

    pub(crate) fn validate(&self, state: &TaskState, ctx: &TaskContext<'_>) -> bool {
        self.variant.behavior().validate(state, ctx)
    }

    pub(crate) fn cleanup(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) {
        self.variant.behavior_mut().cleanup(state, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{RecordingSink, TaskEvent};
    use crate::kinds::{TaskClass, TaskKind};
    use crate::math::Vec3;
    use crate::state::{PedId, PedState, TaskId};
    use crate::task::{Task, TaskContext, TaskStatus};
    use crate::world::WorldEnv;

    fn grab_ledge_task(ledge: Vec3, hold_duration: f32, phase_timeout: Option<f32>) -> Task {
        let params = GrabLedgeParams {
            ledge: Some(ledge),
            grab_range: 1.5,
            hold_duration,
            stamina_drain_rate: 0.5,
        };
        Task::new(
            TaskId(10),
            TaskClass::GrabLedge,
            PedId(1),
            None,
            TaskKind::Complex(
                ComplexTask::new(ComplexVariant::GrabLedge(GrabLedgeTask::new(params)))
                    .with_phase_timeout(phase_timeout),
            ),
        )
    }

    #[test]
    fn phases_advance_linearly_without_skips_or_repeats() {
        // Ledge straight above the hang point the ped already occupies, so
        // preparation advances immediately.
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        let ledge = ped.position + Vec3::UP * 0.9;
        let mut task = grab_ledge_task(ledge, 0.2, None);
        let mut sink = RecordingSink::new();

        {
            let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);
            assert!(task.start(&mut ctx));
            for _ in 0..200 {
                if task.is_terminal() {
                    break;
                }
                task.tick(0.1, &mut ctx);
            }
        }

        assert_eq!(task.status(), TaskStatus::Completed);
        let observed: Vec<(TaskPhase, TaskPhase)> = sink
            .events
            .iter()
            .filter_map(|event| match event {
                TaskEvent::PhaseChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect();
        assert_eq!(
            observed,
            vec![
                (TaskPhase::Preparation, TaskPhase::Execution),
                (TaskPhase::Execution, TaskPhase::Completion),
                (TaskPhase::Completion, TaskPhase::Cleanup),
            ]
        );
    }

    #[test]
    fn phase_timeout_is_independent_of_task_timeout() {
        // Hang point 1.1m away: preparation needs ~0.7s but the phase is
        // bounded at 0.3s while the task-level timeout stays at the default.
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        let ledge = ped.position + Vec3::new(1.1, 0.0, 0.9);
        let mut task = grab_ledge_task(ledge, 0.2, Some(0.3));
        let mut sink = RecordingSink::new();

        let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);
        assert!(task.start(&mut ctx));
        for _ in 0..20 {
            if task.is_terminal() {
                break;
            }
            task.tick(0.1, &mut ctx);
        }

        assert_eq!(task.status(), TaskStatus::Failed);
        let result = task.result().unwrap();
        assert!(result.message.contains("phase timed out"));
        assert!(task.elapsed() < 1.0);
    }
}
