//! Validated task construction.
//!
//! The factory holds no per-task runtime state and is safe to share across
//! all owners: it validates inputs, applies the common defaults (Normal
//! priority, 30 s timeout), and returns fully initialized - but not started -
//! tasks. Construction problems are reported as values, never panics.

mod registry;

pub use registry::TaskRegistry;

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{ErrorSeverity, PedError};
use crate::kinds::complex::{
    ClimbLadderParams, ClimbLadderTask, ClimbParams, ClimbTask, ComplexTask, ComplexVariant,
    EnterVehicleParams, EnterVehicleTask, GrabLedgeParams, GrabLedgeTask,
};
use crate::kinds::oneshot::{
    AimParams, AimTask, DropDownParams, DropDownTask, JumpParams, JumpTask, LookAtParams,
    LookAtTask, MoveTowardsParams, MoveTowardsTask, OneShotTask, OneShotVariant, ShimmyParams,
    ShimmyTask, TurnParams, TurnTask,
};
use crate::kinds::wild::{
    CombatTargetsParams, CombatTargetsTask, FightParams, FightTask, WildTask, WildTuning,
    WildVariant,
};
use crate::kinds::{TaskClass, TaskKind};
use crate::state::{PedId, TaskId};
use crate::task::Task;

/// Construction errors, reported synchronously and never thrown.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum BuildError {
    /// The owner handle is the reserved empty sentinel.
    #[error("owner handle is invalid")]
    InvalidOwner,

    /// The class requires a target and none was supplied.
    #[error("task class '{0}' requires a target")]
    MissingTarget(TaskClass),

    /// No class with that name exists.
    #[error("unknown task class '{0}'")]
    UnknownClass(String),

    /// The class exists but is not in this factory's registry.
    #[error("task class '{0}' is not registered")]
    Unregistered(TaskClass),

    /// A behavior-specific parameter failed validation.
    #[error("invalid parameter for '{class}': {reason}")]
    InvalidParameter {
        class: TaskClass,
        reason: &'static str,
    },

    /// Sequence creation got lists of different lengths.
    #[error("sequence lists differ in length: {classes} classes, {targets} targets")]
    MismatchedSequence { classes: usize, targets: usize },
}

impl PedError for BuildError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        use BuildError::*;
        match self {
            InvalidOwner => "BUILD_INVALID_OWNER",
            MissingTarget(_) => "BUILD_MISSING_TARGET",
            UnknownClass(_) => "BUILD_UNKNOWN_CLASS",
            Unregistered(_) => "BUILD_UNREGISTERED_CLASS",
            InvalidParameter { .. } => "BUILD_INVALID_PARAMETER",
            MismatchedSequence { .. } => "BUILD_MISMATCHED_SEQUENCE",
        }
    }
}

/// Stateless construction helpers over an explicit registry.
#[derive(Debug)]
pub struct TaskFactory {
    registry: TaskRegistry,
    next_id: AtomicU64,
}

impl TaskFactory {
    pub fn new() -> Self {
        Self::with_registry(TaskRegistry::with_builtins())
    }

    pub fn with_registry(registry: TaskRegistry) -> Self {
        Self {
            registry,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    fn next_id(&self) -> TaskId {
        TaskId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn ensure(&self, class: TaskClass, owner: PedId) -> Result<(), BuildError> {
        if owner.is_none() {
            return Err(BuildError::InvalidOwner);
        }
        if !self.registry.contains(class) {
            return Err(BuildError::Unregistered(class));
        }
        Ok(())
    }

    fn invalid(class: TaskClass, reason: &'static str) -> BuildError {
        BuildError::InvalidParameter { class, reason }
    }

    // ------------------------------------------------------------------
    // One-shot behaviors
    // ------------------------------------------------------------------

    pub fn create_aim(
        &self,
        owner: PedId,
        target: Option<PedId>,
        params: AimParams,
    ) -> Result<Task, BuildError> {
        let class = TaskClass::Aim;
        self.ensure(class, owner)?;
        if params.speed <= 0.0 {
            return Err(Self::invalid(class, "aim speed must be positive"));
        }
        let directed = params.direction.is_some();
        if !directed && target.is_none() {
            return Err(BuildError::MissingTarget(class));
        }
        let kind = TaskKind::OneShot(OneShotTask::new(OneShotVariant::Aim(AimTask::new(params))));
        Ok(Task::new(self.next_id(), class, owner, target, kind)
            .with_requires_target(!directed))
    }

    pub fn create_look_at(
        &self,
        owner: PedId,
        target: Option<PedId>,
        params: LookAtParams,
    ) -> Result<Task, BuildError> {
        let class = TaskClass::LookAt;
        self.ensure(class, owner)?;
        if params.duration <= 0.0 {
            return Err(Self::invalid(class, "look duration must be positive"));
        }
        if params.direction.is_none() && target.is_none() {
            return Err(BuildError::MissingTarget(class));
        }
        let kind =
            TaskKind::OneShot(OneShotTask::new(OneShotVariant::LookAt(LookAtTask::new(params))));
        Ok(Task::new(self.next_id(), class, owner, target, kind))
    }

    pub fn create_turn(
        &self,
        owner: PedId,
        target: Option<PedId>,
        params: TurnParams,
    ) -> Result<Task, BuildError> {
        let class = TaskClass::Turn;
        self.ensure(class, owner)?;
        if params.speed <= 0.0 {
            return Err(Self::invalid(class, "turn speed must be positive"));
        }
        if params.rotation.is_none() && params.direction.is_none() && target.is_none() {
            return Err(Self::invalid(class, "turn needs a rotation, direction, or target"));
        }
        let kind = TaskKind::OneShot(OneShotTask::new(OneShotVariant::Turn(TurnTask::new(params))));
        Ok(Task::new(self.next_id(), class, owner, target, kind))
    }

    pub fn create_shimmy(&self, owner: PedId, params: ShimmyParams) -> Result<Task, BuildError> {
        let class = TaskClass::Shimmy;
        self.ensure(class, owner)?;
        if params.distance <= 0.0 {
            return Err(Self::invalid(class, "shimmy distance must be positive"));
        }
        if params.speed <= 0.0 {
            return Err(Self::invalid(class, "shimmy speed must be positive"));
        }
        let kind =
            TaskKind::OneShot(OneShotTask::new(OneShotVariant::Shimmy(ShimmyTask::new(params))));
        Ok(Task::new(self.next_id(), class, owner, None, kind))
    }

    pub fn create_drop_down(
        &self,
        owner: PedId,
        params: DropDownParams,
    ) -> Result<Task, BuildError> {
        let class = TaskClass::DropDown;
        self.ensure(class, owner)?;
        if params.drop_height <= 0.0 {
            return Err(Self::invalid(class, "drop height must be positive"));
        }
        let kind = TaskKind::OneShot(OneShotTask::new(OneShotVariant::DropDown(
            DropDownTask::new(params),
        )));
        Ok(Task::new(self.next_id(), class, owner, None, kind))
    }

    pub fn create_jump(&self, owner: PedId, params: JumpParams) -> Result<Task, BuildError> {
        let class = TaskClass::Jump;
        self.ensure(class, owner)?;
        if params.force <= 0.0 {
            return Err(Self::invalid(class, "jump force must be positive"));
        }
        if params.height < 0.0 {
            return Err(Self::invalid(class, "jump height cannot be negative"));
        }
        let kind = TaskKind::OneShot(OneShotTask::new(OneShotVariant::Jump(JumpTask::new(params))));
        Ok(Task::new(self.next_id(), class, owner, None, kind))
    }

    pub fn create_move_towards(
        &self,
        owner: PedId,
        target: Option<PedId>,
        params: MoveTowardsParams,
    ) -> Result<Task, BuildError> {
        let class = TaskClass::MoveTowards;
        self.ensure(class, owner)?;
        if params.speed <= 0.0 {
            return Err(Self::invalid(class, "movement speed must be positive"));
        }
        if params.stop_distance < 0.0 {
            return Err(Self::invalid(class, "stop distance cannot be negative"));
        }
        if params.destination.is_none() && target.is_none() {
            return Err(Self::invalid(class, "move-towards needs a destination or target"));
        }
        let kind = TaskKind::OneShot(OneShotTask::new(OneShotVariant::MoveTowards(
            MoveTowardsTask::new(params),
        )));
        Ok(Task::new(self.next_id(), class, owner, target, kind))
    }

    // ------------------------------------------------------------------
    // Complex behaviors
    // ------------------------------------------------------------------

    pub fn create_climb(
        &self,
        owner: PedId,
        target: Option<PedId>,
        params: ClimbParams,
        phase_timeout: Option<f32>,
    ) -> Result<Task, BuildError> {
        let class = TaskClass::Climb;
        self.ensure(class, owner)?;
        if params.climb_speed <= 0.0 {
            return Err(Self::invalid(class, "climb speed must be positive"));
        }
        if !params.auto_detect_height && params.climb_height.is_none() {
            return Err(Self::invalid(
                class,
                "climb height required when auto-detection is off",
            ));
        }
        let kind = TaskKind::Complex(
            ComplexTask::new(ComplexVariant::Climb(ClimbTask::new(params)))
                .with_phase_timeout(phase_timeout),
        );
        Ok(Task::new(self.next_id(), class, owner, target, kind))
    }

    pub fn create_enter_vehicle(
        &self,
        owner: PedId,
        vehicle: PedId,
        params: EnterVehicleParams,
        phase_timeout: Option<f32>,
    ) -> Result<Task, BuildError> {
        let class = TaskClass::EnterVehicle;
        self.ensure(class, owner)?;
        if vehicle.is_none() {
            return Err(BuildError::MissingTarget(class));
        }
        if params.seat_index >= 4 {
            return Err(Self::invalid(class, "seat index out of range"));
        }
        if params.approach_speed <= 0.0 {
            return Err(Self::invalid(class, "approach speed must be positive"));
        }
        let kind = TaskKind::Complex(
            ComplexTask::new(ComplexVariant::EnterVehicle(EnterVehicleTask::new(params)))
                .with_phase_timeout(phase_timeout),
        );
        Ok(Task::new(self.next_id(), class, owner, Some(vehicle), kind))
    }

    pub fn create_grab_ledge(
        &self,
        owner: PedId,
        params: GrabLedgeParams,
        phase_timeout: Option<f32>,
    ) -> Result<Task, BuildError> {
        let class = TaskClass::GrabLedge;
        self.ensure(class, owner)?;
        if params.grab_range <= 0.0 {
            return Err(Self::invalid(class, "grab range must be positive"));
        }
        if params.hold_duration <= 0.0 {
            return Err(Self::invalid(class, "hold duration must be positive"));
        }
        if params.stamina_drain_rate < 0.0 {
            return Err(Self::invalid(class, "stamina drain cannot be negative"));
        }
        let kind = TaskKind::Complex(
            ComplexTask::new(ComplexVariant::GrabLedge(GrabLedgeTask::new(params)))
                .with_phase_timeout(phase_timeout),
        );
        Ok(Task::new(self.next_id(), class, owner, None, kind))
    }

    pub fn create_climb_ladder(
        &self,
        owner: PedId,
        target: Option<PedId>,
        params: ClimbLadderParams,
        phase_timeout: Option<f32>,
    ) -> Result<Task, BuildError> {
        let class = TaskClass::ClimbLadder;
        self.ensure(class, owner)?;
        if params.climb_speed <= 0.0 {
            return Err(Self::invalid(class, "climb speed must be positive"));
        }
        if params.ladder_height <= 0.0 {
            return Err(Self::invalid(class, "ladder height must be positive"));
        }
        if params.base.is_none() && target.is_none() {
            return Err(Self::invalid(class, "ladder needs a base point or target"));
        }
        let kind = TaskKind::Complex(
            ComplexTask::new(ComplexVariant::ClimbLadder(ClimbLadderTask::new(params)))
                .with_phase_timeout(phase_timeout),
        );
        Ok(Task::new(self.next_id(), class, owner, target, kind))
    }

    // ------------------------------------------------------------------
    // Wild behaviors
    // ------------------------------------------------------------------

    pub fn create_fight_against(
        &self,
        owner: PedId,
        opponent: PedId,
        params: FightParams,
        tuning: WildTuning,
    ) -> Result<Task, BuildError> {
        let class = TaskClass::FightAgainst;
        self.ensure(class, owner)?;
        if opponent.is_none() {
            return Err(BuildError::MissingTarget(class));
        }
        if opponent == owner {
            return Err(Self::invalid(class, "cannot fight oneself"));
        }
        if !(0.0..=1.0).contains(&params.aggression) || !(0.0..=1.0).contains(&params.skill) {
            return Err(Self::invalid(class, "aggression and skill must be in 0..=1"));
        }
        if params.disengage_range <= 0.0 {
            return Err(Self::invalid(class, "disengage range must be positive"));
        }
        let kind = TaskKind::Wild(WildTask::with_tuning(
            WildVariant::FightAgainst(FightTask::new(params)),
            tuning,
        ));
        Ok(Task::new(self.next_id(), class, owner, Some(opponent), kind))
    }

    pub fn create_combat_targets(
        &self,
        owner: PedId,
        params: CombatTargetsParams,
        tuning: WildTuning,
    ) -> Result<Task, BuildError> {
        let class = TaskClass::CombatTargets;
        self.ensure(class, owner)?;
        if params.targets.is_empty() {
            return Err(Self::invalid(class, "target list is empty"));
        }
        if params.targets.contains(&owner) {
            return Err(Self::invalid(class, "owner cannot target itself"));
        }
        if params.engagement_range <= 0.0 {
            return Err(Self::invalid(class, "engagement range must be positive"));
        }
        if params.max_simultaneous == 0 {
            return Err(Self::invalid(class, "max simultaneous targets must be at least 1"));
        }
        // The highest-threat target doubles as the bound target handle.
        let primary = params.targets.first().copied();
        let kind = TaskKind::Wild(WildTask::with_tuning(
            WildVariant::CombatTargets(CombatTargetsTask::new(params)),
            tuning,
        ));
        Ok(Task::new(self.next_id(), class, owner, primary, kind))
    }

    // ------------------------------------------------------------------
    // Generic, name-driven, and batch creation
    // ------------------------------------------------------------------

    /// Default-parameter construction for any registered class.
    pub fn create(
        &self,
        class: TaskClass,
        owner: PedId,
        target: Option<PedId>,
    ) -> Result<Task, BuildError> {
        match class {
            TaskClass::Aim => self.create_aim(owner, target, AimParams::default()),
            TaskClass::LookAt => self.create_look_at(owner, target, LookAtParams::default()),
            TaskClass::Turn => self.create_turn(owner, target, TurnParams::default()),
            TaskClass::Shimmy => self.create_shimmy(owner, ShimmyParams::default()),
            TaskClass::DropDown => self.create_drop_down(owner, DropDownParams::default()),
            TaskClass::Jump => self.create_jump(owner, JumpParams::default()),
            TaskClass::MoveTowards => {
                self.create_move_towards(owner, target, MoveTowardsParams::default())
            }
            TaskClass::Climb => self.create_climb(owner, target, ClimbParams::default(), None),
            TaskClass::EnterVehicle => {
                let vehicle = target.ok_or(BuildError::MissingTarget(class))?;
                self.create_enter_vehicle(owner, vehicle, EnterVehicleParams::default(), None)
            }
            TaskClass::GrabLedge => self.create_grab_ledge(owner, GrabLedgeParams::default(), None),
            TaskClass::ClimbLadder => {
                self.create_climb_ladder(owner, target, ClimbLadderParams::default(), None)
            }
            TaskClass::FightAgainst => {
                let opponent = target.ok_or(BuildError::MissingTarget(class))?;
                self.create_fight_against(
                    owner,
                    opponent,
                    FightParams::default(),
                    WildTuning::default(),
                )
            }
            TaskClass::CombatTargets => {
                let targets = target.map(|id| vec![id]).unwrap_or_default();
                self.create_combat_targets(
                    owner,
                    CombatTargetsParams {
                        targets,
                        ..CombatTargetsParams::default()
                    },
                    WildTuning::default(),
                )
            }
        }
    }

    /// Name-driven construction through the registry.
    pub fn create_by_name(
        &self,
        name: &str,
        owner: PedId,
        target: Option<PedId>,
    ) -> Result<Task, BuildError> {
        use std::str::FromStr;
        let class =
            TaskClass::from_str(name).map_err(|_| BuildError::UnknownClass(name.to_owned()))?;
        if !self.registry.contains(class) {
            return Err(BuildError::Unregistered(class));
        }
        self.create(class, owner, target)
    }

    /// Validated variant reporting a success flag and a human-readable error
    /// instead of a Result.
    pub fn create_validated(
        &self,
        class: TaskClass,
        owner: PedId,
        target: Option<PedId>,
    ) -> (Option<Task>, bool, String) {
        match self.create(class, owner, target) {
            Ok(task) => (Some(task), true, String::new()),
            Err(err) => (None, false, err.to_string()),
        }
    }

    /// Same class fanned out across many owners.
    pub fn create_for_owners(
        &self,
        class: TaskClass,
        owners: &[PedId],
        target: Option<PedId>,
    ) -> Result<Vec<Task>, BuildError> {
        owners
            .iter()
            .map(|&owner| self.create(class, owner, target))
            .collect()
    }

    /// One owner against many targets.
    pub fn create_against_targets(
        &self,
        class: TaskClass,
        owner: PedId,
        targets: &[PedId],
    ) -> Result<Vec<Task>, BuildError> {
        targets
            .iter()
            .map(|&target| self.create(class, owner, Some(target)))
            .collect()
    }

    /// Heterogeneous task list paired with a parallel target list.
    pub fn create_sequence(
        &self,
        owner: PedId,
        classes: &[TaskClass],
        targets: &[Option<PedId>],
    ) -> Result<Vec<Task>, BuildError> {
        if classes.len() != targets.len() {
            return Err(BuildError::MismatchedSequence {
                classes: classes.len(),
                targets: targets.len(),
            });
        }
        classes
            .iter()
            .zip(targets)
            .map(|(&class, &target)| self.create(class, owner, target))
            .collect()
    }
}

impl Default for TaskFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use crate::task::{DEFAULT_TIMEOUT, TaskPriority, TaskStatus};

    #[test]
    fn defaults_are_applied_at_construction() {
        let factory = TaskFactory::new();
        let task = factory
            .create(TaskClass::Turn, PedId(1), Some(PedId(2)))
            .unwrap();
        assert_eq!(task.status(), TaskStatus::Idle);
        assert_eq!(task.priority(), TaskPriority::Normal);
        assert_eq!(task.state().timeout, Some(DEFAULT_TIMEOUT));
        assert!(task.can_be_interrupted());
    }

    #[test]
    fn missing_required_target_is_rejected() {
        let factory = TaskFactory::new();
        assert_eq!(
            factory
                .create(TaskClass::FightAgainst, PedId(1), None)
                .unwrap_err(),
            BuildError::MissingTarget(TaskClass::FightAgainst)
        );
        assert_eq!(
            factory
                .create_aim(PedId(1), None, AimParams::default())
                .unwrap_err(),
            BuildError::MissingTarget(TaskClass::Aim)
        );
    }

    #[test]
    fn explicit_direction_waives_the_aim_target() {
        let factory = TaskFactory::new();
        let task = factory
            .create_aim(
                PedId(1),
                None,
                AimParams {
                    direction: Some(Vec3::new(1.0, 0.0, 0.0)),
                    ..AimParams::default()
                },
            )
            .unwrap();
        assert!(!task.state().requires_target);
    }

    #[test]
    fn invalid_owner_and_parameters_are_rejected() {
        let factory = TaskFactory::new();
        assert_eq!(
            factory
                .create(TaskClass::Turn, PedId::NONE, Some(PedId(2)))
                .unwrap_err(),
            BuildError::InvalidOwner
        );
        assert!(matches!(
            factory.create_move_towards(
                PedId(1),
                None,
                MoveTowardsParams {
                    destination: Some(Vec3::ZERO),
                    speed: -1.0,
                    ..MoveTowardsParams::default()
                },
            ),
            Err(BuildError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn unregistered_class_is_rejected_by_name_lookup() {
        let mut registry = TaskRegistry::with_builtins();
        registry.unregister(TaskClass::Jump);
        let factory = TaskFactory::with_registry(registry);
        assert_eq!(
            factory.create_by_name("jump", PedId(1), None).unwrap_err(),
            BuildError::Unregistered(TaskClass::Jump)
        );
        assert_eq!(
            factory.create_by_name("levitate", PedId(1), None).unwrap_err(),
            BuildError::UnknownClass("levitate".to_owned())
        );
    }

    #[test]
    fn validated_creation_reports_errors_as_strings() {
        let factory = TaskFactory::new();
        let (task, ok, error) = factory.create_validated(TaskClass::EnterVehicle, PedId(1), None);
        assert!(task.is_none());
        assert!(!ok);
        assert!(error.contains("requires a target"));

        let (task, ok, error) =
            factory.create_validated(TaskClass::MoveTowards, PedId(1), Some(PedId(2)));
        assert!(task.is_some());
        assert!(ok);
        assert!(error.is_empty());
    }

    #[test]
    fn batch_and_sequence_creation_assign_unique_ids() {
        let factory = TaskFactory::new();
        let owners = [PedId(1), PedId(2), PedId(3)];
        let batch = factory
            .create_for_owners(TaskClass::Shimmy, &owners, None)
            .unwrap();
        assert_eq!(batch.len(), 3);

        let sequence = factory
            .create_sequence(
                PedId(1),
                &[TaskClass::Turn, TaskClass::MoveTowards],
                &[Some(PedId(2)), Some(PedId(2))],
            )
            .unwrap();
        assert_eq!(sequence.len(), 2);

        let mut ids: Vec<u64> = batch
            .iter()
            .chain(sequence.iter())
            .map(|task| task.id().0)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn sequence_length_mismatch_is_an_error() {
        let factory = TaskFactory::new();
        assert_eq!(
            factory
                .create_sequence(PedId(1), &[TaskClass::Turn], &[])
                .unwrap_err(),
            BuildError::MismatchedSequence {
                classes: 1,
                targets: 0
            }
        );
    }
}
