//! Adaptive AI-driven behaviors.
//!
//! These tasks re-evaluate the world continuously rather than follow a fixed
//! phase order. Each tick runs through a micro-cycle: analysis and planning
//! (each throttled by its own update rate), then execution, then - when
//! accumulated drift crosses the adaptation threshold - an adaptation step
//! that forces a re-plan. Finalization runs once, on the way out of Running.

mod combat_targets;
mod fight;
pub(crate) mod scoring;

pub use combat_targets::{CombatStrategy, CombatTargetsParams, CombatTargetsTask};
pub use fight::{FightMove, FightParams, FightTask, FightingStyle};
pub use scoring::Score;

use crate::kinds::TickOutcome;
use crate::task::{TaskContext, TaskState};

/// One stage of the continuous analyze/plan/execute/adapt loop.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CycleState {
    #[default]
    Initializing,
    Analyzing,
    Planning,
    Executing,
    Adapting,
    Finalizing,
}

/// Update-rate and adaptation knobs shared by the family.
#[derive(Clone, Copy, Debug)]
pub struct WildTuning {
    /// Minimum seconds between situation analyses.
    pub analysis_rate: f32,
    /// Minimum seconds between planning passes.
    pub planning_rate: f32,
    pub adaptation_enabled: bool,
    /// Accumulated drift that triggers an adaptation.
    pub adaptation_threshold: f32,
    /// Hard cap on adaptations, against runaway re-planning.
    pub adaptation_cap: u32,
}

impl Default for WildTuning {
    fn default() -> Self {
        Self {
            analysis_rate: 0.25,
            planning_rate: 0.5,
            adaptation_enabled: true,
            adaptation_threshold: 1.0,
            adaptation_cap: 8,
        }
    }
}

/// Hooks an adaptive behavior implements.
pub(crate) trait WildBehavior {
    /// Set up analysis/planning state; an error fails the task at start.
    fn init_systems(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>)
    -> Result<(), String>;

    /// Refresh the world read. Returns a drift contribution: how much the
    /// situation changed since the last analysis.
    fn analyze(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) -> f32;

    /// Choose the next action set from the current read.
    fn plan(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>);

    /// Carry out the planned actions for this tick.
    fn execute_actions(
        &mut self,
        state: &mut TaskState,
        dt: f32,
        ctx: &mut TaskContext<'_>,
    ) -> TickOutcome;

    /// React to accumulated drift; the core forces a re-plan afterwards.
    fn adapt(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>);

    fn finalize(&mut self, _state: &mut TaskState, _ctx: &mut TaskContext<'_>) {}

    fn validate(&self, _state: &TaskState, _ctx: &TaskContext<'_>) -> bool {
        true
    }
}

/// Concrete adaptive behaviors.
#[derive(Clone, Debug)]
pub enum WildVariant {
    FightAgainst(FightTask),
    CombatTargets(CombatTargetsTask),
}

impl WildVariant {
    fn behavior_mut(&mut self) -> &mut dyn WildBehavior {
        match self {
            Self::FightAgainst(task) => task,
            Self::CombatTargets(task) => task,
        }
    }

    fn behavior(&self) -> &dyn WildBehavior {
        match self {
            Self::FightAgainst(task) => task,
            Self::CombatTargets(task) => task,
        }
    }
}

/// Family scaffold: owns the micro-cycle, its throttles, and the drift
/// bookkeeping.
#[derive(Clone, Debug)]
pub struct WildTask {
    cycle: CycleState,
    tuning: WildTuning,
    since_analysis: f32,
    since_planning: f32,
    drift: f32,
    adaptations: u32,
    variant: WildVariant,
}

impl WildTask {
    pub fn new(variant: WildVariant) -> Self {
        Self::with_tuning(variant, WildTuning::default())
    }

    pub fn with_tuning(variant: WildVariant, tuning: WildTuning) -> Self {
        Self {
            cycle: CycleState::Initializing,
            // Primed so the first running tick analyzes and plans.
            since_analysis: tuning.analysis_rate,
            since_planning: tuning.planning_rate,
            drift: 0.0,
            adaptations: 0,
            tuning,
            variant,
        }
    }

    pub fn cycle(&self) -> CycleState {
        self.cycle
    }

    pub fn adaptations(&self) -> u32 {
        self.adaptations
    }

    pub fn variant(&self) -> &WildVariant {
        &self.variant
    }

    pub(crate) fn initialize(
        &mut self,
        state: &mut TaskState,
        ctx: &mut TaskContext<'_>,
    ) -> Result<(), String> {
        self.cycle = CycleState::Initializing;
        self.variant.behavior_mut().init_systems(state, ctx)
    }

    pub(crate) fn execute(
        &mut self,
        _state: &mut TaskState,
        _ctx: &mut TaskContext<'_>,
    ) -> TickOutcome {
        TickOutcome::Continue
    }

    pub(crate) fn update(
        &mut self,
        state: &mut TaskState,
        dt: f32,
        ctx: &mut TaskContext<'_>,
    ) -> TickOutcome {
        self.since_analysis += dt;
        self.since_planning += dt;

        if self.since_analysis >= self.tuning.analysis_rate {
            self.cycle = CycleState::Analyzing;
            self.drift += self.variant.behavior_mut().analyze(state, ctx);
            self.since_analysis = 0.0;
        }

        if self.since_planning >= self.tuning.planning_rate {
            self.cycle = CycleState::Planning;
            self.variant.behavior_mut().plan(state, ctx);
            self.since_planning = 0.0;
        }

        self.cycle = CycleState::Executing;
        let outcome = self.variant.behavior_mut().execute_actions(state, dt, ctx);
        if let TickOutcome::Complete { .. } = outcome {
            return outcome;
        }

        if self.tuning.adaptation_enabled
            && self.drift >= self.tuning.adaptation_threshold
            && self.adaptations < self.tuning.adaptation_cap
        {
            self.cycle = CycleState::Adapting;
            self.variant.behavior_mut().adapt(state, ctx);
            self.adaptations += 1;
            self.drift = 0.0;
            // Force a fresh plan on the next tick.
            self.since_planning = self.tuning.planning_rate;
            state
                .outputs
                .insert("adaptations".to_owned(), self.adaptations.into());
        }

        TickOutcome::Continue
    }

    pub(crate) fn validate(&self, state: &TaskState, ctx: &TaskContext<'_>) -> bool {
        self.variant.behavior().validate(state, ctx)
    }

    pub(crate) fn cleanup(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) {
        self.cycle = CycleState::Finalizing;
        self.variant.behavior_mut().finalize(state, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use crate::kinds::TaskClass;
    use crate::math::Vec3;
    use crate::state::{PedId, PedState};
    use crate::world::{ActorSnapshot, ActorsSnapshot, PcgRng, WorldEnv};

    fn snapshot_at(x: f32) -> ActorsSnapshot {
        let opponent = PedState::new(PedId(2), Vec3::new(x, 0.0, 0.0));
        let mut actors = ActorsSnapshot::new();
        actors.insert(ActorSnapshot::of(&opponent).with_aggressive(true));
        actors
    }

    #[test]
    fn drift_triggers_adaptation_up_to_the_cap() {
        let tuning = WildTuning {
            analysis_rate: 0.2,
            planning_rate: 0.4,
            adaptation_enabled: true,
            adaptation_threshold: 0.5,
            adaptation_cap: 2,
        };
        let mut task = WildTask::with_tuning(
            WildVariant::FightAgainst(FightTask::new(FightParams {
                disengage_range: 1000.0,
                ..FightParams::default()
            })),
            tuning,
        );
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        let mut state = crate::task::test_state(TaskClass::FightAgainst, PedId(1), Some(PedId(2)));
        let mut sink = NullSink;
        let rng = PcgRng;

        // The opponent teleports around, so every analysis reads heavy drift.
        let mut x = 5.0;
        for step in 0..12 {
            let actors = snapshot_at(x);
            let mut ctx = TaskContext::new(
                &mut ped,
                WorldEnv::new(None, Some(&actors), Some(&rng)),
                &mut sink,
            );
            if step == 0 {
                task.initialize(&mut state, &mut ctx).unwrap();
            }
            state.elapsed += 0.2;
            let outcome = task.update(&mut state, 0.2, &mut ctx);
            assert_eq!(outcome, TickOutcome::Continue);
            assert!(matches!(
                task.cycle(),
                CycleState::Executing | CycleState::Adapting
            ));
            x = if x > 100.0 { 5.0 } else { x + 40.0 };
        }

        assert_eq!(task.adaptations(), tuning.adaptation_cap);
        assert!(state.outputs.contains_key("adaptations"));
    }
}
