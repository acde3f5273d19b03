//! Many-target engagement.

use std::collections::BTreeMap;

use super::WildBehavior;
use super::scoring::{Score, pick_best};
use crate::kinds::TickOutcome;
use crate::math::Vec3;
use crate::state::PedId;
use crate::task::{TaskContext, TaskState};
use crate::world::compute_seed;

const MELEE_RANGE: f32 = 1.8;
const ADVANCE_SPEED: f32 = 2.8;
const RETREAT_SPEED: f32 = 3.0;
/// A target this far beyond the engagement range counts as disengaged.
const DISENGAGE_FACTOR: f32 = 2.0;

/// Overall combat posture toward the target set.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CombatStrategy {
    Aggressive,
    Defensive,
    Tactical,
    Stealth,
    Retreat,
    /// Re-resolved to a concrete strategy at every planning pass.
    #[default]
    Adaptive,
}

#[derive(Clone, Debug)]
pub struct CombatTargetsParams {
    /// Every entity this task may engage.
    pub targets: Vec<PedId>,
    /// Beyond this range targets are tracked but not engaged.
    pub engagement_range: f32,
    /// Upper bound on targets engaged at once.
    pub max_simultaneous: usize,
    pub strategy: CombatStrategy,
}

impl Default for CombatTargetsParams {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            engagement_range: 20.0,
            max_simultaneous: 3,
            strategy: CombatStrategy::Adaptive,
        }
    }
}

/// Everything tracked per target across analyses.
#[derive(Clone, Copy, Debug)]
struct TargetRecord {
    distance: f32,
    threat: u32,
    /// Task time of the last successful observation.
    last_seen: f32,
    last_position: Vec3,
    alive: bool,
    aggressive: bool,
    health: f32,
}

#[derive(Clone, Debug)]
pub struct CombatTargetsTask {
    params: CombatTargetsParams,
    records: BTreeMap<PedId, TargetRecord>,
    primary: Option<PedId>,
    secondary: Option<PedId>,
    active: CombatStrategy,
    cautious: bool,
    cooldown: f32,
    decisions: u64,
    strikes: u32,
    shots: u32,
}

impl CombatTargetsTask {
    pub fn new(params: CombatTargetsParams) -> Self {
        let active = params.strategy;
        Self {
            params,
            records: BTreeMap::new(),
            primary: None,
            secondary: None,
            active,
            cautious: false,
            cooldown: 0.0,
            decisions: 0,
            strikes: 0,
            shots: 0,
        }
    }

    pub fn active_strategy(&self) -> CombatStrategy {
        self.active
    }

    fn threat_of(distance: f32, health: f32, aggressive: bool, armed: bool) -> u32 {
        let mut threat = if aggressive { 40 } else { 10 };
        threat += (health * 20.0) as u32;
        threat += if distance < 5.0 {
            30
        } else if distance < 10.0 {
            20
        } else if distance < 20.0 {
            10
        } else {
            0
        };
        if armed {
            threat += 20;
        }
        threat
    }

    fn alive_records(&self) -> impl Iterator<Item = (&PedId, &TargetRecord)> {
        self.records.iter().filter(|(_, record)| record.alive)
    }

    fn should_retreat(&self, ctx: &TaskContext<'_>) -> bool {
        let aggressors = self
            .alive_records()
            .filter(|(_, record)| record.aggressive && record.distance < self.params.engagement_range)
            .count();
        ctx.ped.health.ratio() < 0.25 || aggressors > self.params.max_simultaneous
    }

    fn should_advance(&self, ctx: &TaskContext<'_>) -> bool {
        let Some(primary) = self.primary.and_then(|id| self.records.get(&id)) else {
            return false;
        };
        primary.distance > self.params.engagement_range && ctx.ped.health.ratio() > 0.5
    }

    /// Resolve the Adaptive strategy to a concrete posture.
    fn adaptive_choice(&self, state: &TaskState, ctx: &TaskContext<'_>) -> CombatStrategy {
        let health = (ctx.ped.health.ratio() * 100.0) as u32;
        let armed = ctx.ped.armed;
        let engaged = self
            .alive_records()
            .filter(|(_, record)| record.distance < self.params.engagement_range)
            .count() as u32;
        let near = self
            .alive_records()
            .any(|(_, record)| record.distance < MELEE_RANGE * 2.0);
        let caution: u32 = if self.cautious { 30 } else { 0 };

        let options = [
            (
                CombatStrategy::Aggressive,
                Score::new(
                    true,
                    if near { 90 } else { 50 },
                    (100 - caution).saturating_sub(engaged.saturating_sub(1) * 15),
                    if health > 60 { 110 } else { 60 },
                ),
            ),
            (
                CombatStrategy::Defensive,
                Score::new(
                    true,
                    if engaged > 1 { 80 } else { 40 },
                    60 + caution,
                    if health < 60 { 120 } else { 90 },
                ),
            ),
            (
                CombatStrategy::Tactical,
                if armed {
                    Score::new(true, if near { 50 } else { 90 }, 70 + caution / 2, 100)
                } else {
                    Score::impossible()
                },
            ),
            (
                CombatStrategy::Stealth,
                Score::new(
                    true,
                    if near { 10 } else { 45 },
                    30 + caution,
                    if engaged == 0 { 120 } else { 70 },
                ),
            ),
        ];

        let seed = compute_seed(state.id.0, self.decisions, state.owner.0, 1);
        pick_best(&options, ctx.world.rng().ok(), seed).unwrap_or(CombatStrategy::Defensive)
    }

    fn engaged_targets(&self) -> Vec<(PedId, TargetRecord)> {
        let mut engaged: Vec<(PedId, TargetRecord)> = self
            .alive_records()
            .filter(|(_, record)| record.distance < self.params.engagement_range)
            .map(|(id, record)| (*id, *record))
            .collect();
        engaged.sort_by(|a, b| b.1.threat.cmp(&a.1.threat));
        engaged.truncate(self.params.max_simultaneous.max(1));
        engaged
    }

    fn face(ctx: &mut TaskContext<'_>, toward: Vec3) {
        let direction = (toward - ctx.ped.position).normalized();
        if direction != Vec3::ZERO {
            ctx.ped.rotation.yaw = direction.yaw_degrees();
        }
    }
}

impl WildBehavior for CombatTargetsTask {
    fn init_systems(
        &mut self,
        _state: &mut TaskState,
        _ctx: &mut TaskContext<'_>,
    ) -> Result<(), String> {
        if self.params.targets.is_empty() {
            return Err("no combat targets supplied".to_owned());
        }
        Ok(())
    }

    fn analyze(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) -> f32 {
        let mut drift = 0.0;

        for &target in &self.params.targets {
            let Ok(snapshot) = ctx.world.actor(target) else {
                continue;
            };
            let distance = ctx.ped.position.distance(snapshot.position);
            let threat = Self::threat_of(distance, snapshot.health, snapshot.aggressive, snapshot.armed);
            let record = TargetRecord {
                distance,
                threat,
                last_seen: state.elapsed,
                last_position: snapshot.position,
                alive: snapshot.alive,
                aggressive: snapshot.aggressive,
                health: snapshot.health,
            };

            if let Some(previous) = self.records.insert(target, record) {
                drift += (record.distance - previous.distance).abs() * 0.05;
                if record.alive != previous.alive {
                    drift += 0.5;
                }
                if record.aggressive != previous.aggressive {
                    drift += 0.3;
                }
            }
        }

        let previous_primary = self.primary;
        let mut ranked: Vec<(PedId, u32, f32)> = self
            .alive_records()
            .map(|(id, record)| (*id, record.threat, record.distance))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.total_cmp(&b.2)));
        self.primary = ranked.first().map(|(id, _, _)| *id);
        self.secondary = ranked.get(1).map(|(id, _, _)| *id);
        if self.primary != previous_primary {
            drift += 1.0;
        }

        drift
    }

    fn plan(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) {
        self.decisions += 1;
        self.active = if self.should_retreat(&*ctx) {
            CombatStrategy::Retreat
        } else if self.params.strategy == CombatStrategy::Adaptive {
            if self.should_advance(&*ctx) {
                CombatStrategy::Aggressive
            } else {
                self.adaptive_choice(state, &*ctx)
            }
        } else {
            self.params.strategy
        };
    }

    fn execute_actions(
        &mut self,
        state: &mut TaskState,
        dt: f32,
        ctx: &mut TaskContext<'_>,
    ) -> TickOutcome {
        if !ctx.ped.is_alive() {
            return TickOutcome::fail("defeated");
        }

        // Termination is judged over every tracked target, not just the
        // engaged subset.
        if !self.records.is_empty() && self.records.len() == self.params.targets.len() {
            if self.records.values().all(|record| !record.alive) {
                return TickOutcome::done("all targets neutralized");
            }
            let disengage = self.params.engagement_range * DISENGAGE_FACTOR;
            if self
                .records
                .values()
                .filter(|record| record.alive)
                .all(|record| record.distance > disengage)
            {
                return TickOutcome::done("targets disengaged");
            }
        }

        self.cooldown = (self.cooldown - dt).max(0.0);
        let engaged = self.engaged_targets();
        state
            .outputs
            .insert("engaged_targets".to_owned(), (engaged.len() as i64).into());

        let Some((_, primary)) = self
            .primary
            .and_then(|id| self.records.get(&id).map(|record| (id, *record)))
        else {
            return TickOutcome::Continue;
        };

        match self.active {
            CombatStrategy::Retreat => {
                let centroid = engaged
                    .iter()
                    .fold(Vec3::ZERO, |sum, (_, record)| sum + record.last_position)
                    * (1.0 / engaged.len().max(1) as f32);
                let threat_point = if engaged.is_empty() {
                    primary.last_position
                } else {
                    centroid
                };
                let away = (ctx.ped.position - threat_point).normalized();
                ctx.ped.position += away * (RETREAT_SPEED * dt);
            }
            CombatStrategy::Aggressive => {
                Self::face(ctx, primary.last_position);
                if primary.distance > MELEE_RANGE {
                    ctx.ped.position = ctx
                        .ped
                        .position
                        .move_towards(primary.last_position, ADVANCE_SPEED * dt);
                } else if self.cooldown <= 0.0 {
                    self.cooldown = 1.0;
                    self.strikes += 1;
                    state
                        .outputs
                        .insert("strikes_thrown".to_owned(), self.strikes.into());
                }
            }
            CombatStrategy::Defensive => {
                Self::face(ctx, primary.last_position);
                if primary.distance <= MELEE_RANGE && self.cooldown <= 0.0 {
                    self.cooldown = 1.4;
                    self.strikes += 1;
                    state
                        .outputs
                        .insert("strikes_thrown".to_owned(), self.strikes.into());
                } else if primary.distance < 3.0 {
                    let away = (ctx.ped.position - primary.last_position).normalized();
                    ctx.ped.position += away * (1.2 * dt);
                }
            }
            CombatStrategy::Tactical => {
                Self::face(ctx, primary.last_position);
                let clear = ctx
                    .world
                    .geometry()
                    .map(|geometry| geometry.clear_line(ctx.ped.position, primary.last_position))
                    .unwrap_or(true);
                let in_band = primary.distance > 3.0 && primary.distance < self.params.engagement_range;
                if ctx.ped.armed && clear && in_band {
                    if self.cooldown <= 0.0 {
                        self.cooldown = 1.5;
                        self.shots += 1;
                        state
                            .outputs
                            .insert("shots_fired".to_owned(), self.shots.into());
                    }
                } else {
                    // Reposition: toward cover when any exists, otherwise to
                    // the preferred firing band.
                    let cover = ctx.world.geometry().ok().and_then(|geometry| {
                        geometry.cover_point(ctx.ped.position, primary.last_position)
                    });
                    let goal = cover.unwrap_or_else(|| {
                        let back = (ctx.ped.position - primary.last_position).normalized();
                        primary.last_position + back * (self.params.engagement_range * 0.6)
                    });
                    ctx.ped.position = ctx.ped.position.move_towards(goal, ADVANCE_SPEED * dt);
                }
            }
            CombatStrategy::Stealth => {
                let cover = ctx.world.geometry().ok().and_then(|geometry| {
                    geometry.cover_point(ctx.ped.position, primary.last_position)
                });
                match cover {
                    Some(cover) => {
                        ctx.ped.position = ctx.ped.position.move_towards(cover, 1.5 * dt);
                    }
                    None => {
                        Self::face(ctx, primary.last_position);
                        ctx.ped.position = ctx
                            .ped
                            .position
                            .move_towards(primary.last_position, 1.0 * dt);
                    }
                }
            }
            CombatStrategy::Adaptive => {
                // Planning always resolves Adaptive; reaching here means no
                // plan has run yet this tick.
                Self::face(ctx, primary.last_position);
            }
        }

        TickOutcome::Continue
    }

    fn adapt(&mut self, _state: &mut TaskState, ctx: &mut TaskContext<'_>) {
        // Drift means the fight is not going as read; bias toward caution
        // while hurt, back toward confidence when healthy.
        self.cautious = ctx.ped.health.ratio() < 0.6;
    }

    fn finalize(&mut self, state: &mut TaskState, _ctx: &mut TaskContext<'_>) {
        let defeated = self
            .records
            .values()
            .filter(|record| !record.alive)
            .count() as i64;
        state
            .outputs
            .insert("targets_defeated".to_owned(), defeated.into());
        state
            .outputs
            .insert("strikes_thrown".to_owned(), self.strikes.into());
        state
            .outputs
            .insert("shots_fired".to_owned(), self.shots.into());
    }

    fn validate(&self, _state: &TaskState, ctx: &TaskContext<'_>) -> bool {
        ctx.world.actors().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use crate::kinds::TaskClass;
    use crate::state::{PedId, PedState};
    use crate::world::{ActorSnapshot, ActorsSnapshot, PcgRng, WorldEnv};

    fn hostile(id: u32, position: Vec3) -> ActorSnapshot {
        let ped = PedState::new(PedId(id), position);
        ActorSnapshot::of(&ped).with_aggressive(true)
    }

    fn params(targets: Vec<PedId>) -> CombatTargetsParams {
        CombatTargetsParams {
            targets,
            engagement_range: 20.0,
            max_simultaneous: 2,
            strategy: CombatStrategy::Adaptive,
        }
    }

    #[test]
    fn primary_target_is_the_biggest_threat() {
        let mut task = CombatTargetsTask::new(params(vec![PedId(2), PedId(3)]));
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        let mut state =
            crate::task::test_state(TaskClass::CombatTargets, PedId(1), None);
        let mut sink = NullSink;

        let mut actors = ActorsSnapshot::new();
        actors.insert(hostile(2, Vec3::new(3.0, 0.0, 0.0)));
        actors.insert(hostile(3, Vec3::new(15.0, 0.0, 0.0)));
        let mut ctx = TaskContext::new(&mut ped, WorldEnv::new(None, Some(&actors), None), &mut sink);

        task.analyze(&mut state, &mut ctx);
        // The closer hostile scores higher threat.
        assert_eq!(task.primary, Some(PedId(2)));
        assert_eq!(task.secondary, Some(PedId(3)));
    }

    #[test]
    fn low_health_forces_retreat() {
        let mut task = CombatTargetsTask::new(params(vec![PedId(2)]));
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        ped.health.drain(85.0);
        let mut state =
            crate::task::test_state(TaskClass::CombatTargets, PedId(1), None);
        let mut sink = NullSink;
        let rng = PcgRng;

        let mut actors = ActorsSnapshot::new();
        actors.insert(hostile(2, Vec3::new(4.0, 0.0, 0.0)));
        let mut ctx = TaskContext::new(
            &mut ped,
            WorldEnv::new(None, Some(&actors), Some(&rng)),
            &mut sink,
        );

        task.analyze(&mut state, &mut ctx);
        task.plan(&mut state, &mut ctx);
        assert_eq!(task.active_strategy(), CombatStrategy::Retreat);

        let before = ctx.ped.position.distance(Vec3::new(4.0, 0.0, 0.0));
        task.execute_actions(&mut state, 0.5, &mut ctx);
        assert!(ctx.ped.position.distance(Vec3::new(4.0, 0.0, 0.0)) > before);
    }

    #[test]
    fn all_targets_dead_completes_successfully() {
        let mut task = CombatTargetsTask::new(params(vec![PedId(2)]));
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        let mut state =
            crate::task::test_state(TaskClass::CombatTargets, PedId(1), None);
        let mut sink = NullSink;

        let mut dead = PedState::new(PedId(2), Vec3::new(2.0, 0.0, 0.0));
        dead.health.drain(1000.0);
        let mut actors = ActorsSnapshot::new();
        actors.insert(ActorSnapshot::of(&dead));
        let mut ctx = TaskContext::new(&mut ped, WorldEnv::new(None, Some(&actors), None), &mut sink);

        task.analyze(&mut state, &mut ctx);
        let outcome = task.execute_actions(&mut state, 0.1, &mut ctx);
        assert_eq!(
            outcome,
            TickOutcome::Complete {
                success: true,
                message: "all targets neutralized".to_owned()
            }
        );
    }
}
