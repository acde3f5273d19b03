//! One-on-one combat against a single opponent.

use super::WildBehavior;
use super::scoring::{Score, pick_best};
use crate::kinds::TickOutcome;
use crate::math::Vec3;
use crate::task::{TaskContext, TaskState};
use crate::world::compute_seed;

/// Range within which melee strikes connect.
const MELEE_RANGE: f32 = 1.8;
const ADVANCE_SPEED: f32 = 2.5;
const RETREAT_SPEED: f32 = 2.0;

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
pub enum FightingStyle {
    #[default]
    Balanced,
    /// Pressure and raw strikes.
    Brawler,
    /// Timing, feints, and counters.
    Technical,
    /// Guard-first, strike on openings.
    Defensive,
}

/// The melee action set planning selects from.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum FightMove {
    Strike,
    HeavyStrike,
    Block,
    Dodge,
    Advance,
    Retreat,
}

#[derive(Clone, Copy, Debug)]
pub struct FightParams {
    /// Appetite for offense, 0..=1.
    pub aggression: f32,
    /// Fighting competence, 0..=1; shortens cooldowns and sharpens choices.
    pub skill: f32,
    pub style: FightingStyle,
    /// Stamina cost of one strike.
    pub strike_cost: f32,
    /// Continuous stamina drain while fighting, per second.
    pub stamina_drain_rate: f32,
    /// Fight ends (successfully) after this long, if set.
    pub fight_duration: Option<f32>,
    /// Opponent counts as fled beyond this distance.
    pub disengage_range: f32,
}

impl Default for FightParams {
    fn default() -> Self {
        Self {
            aggression: 0.5,
            skill: 0.5,
            style: FightingStyle::Balanced,
            strike_cost: 8.0,
            stamina_drain_rate: 1.5,
            fight_duration: None,
            disengage_range: 15.0,
        }
    }
}

/// What analysis last saw of the opponent.
#[derive(Clone, Copy, Debug)]
struct OpponentRead {
    position: Vec3,
    distance: f32,
    health: f32,
    alive: bool,
    aggressive: bool,
    blocking: bool,
    fatigue: f32,
}

#[derive(Clone, Debug)]
pub struct FightTask {
    params: FightParams,
    read: Option<OpponentRead>,
    planned: FightMove,
    cooldown: f32,
    decisions: u64,
    strikes: u32,
}

impl FightTask {
    pub fn new(params: FightParams) -> Self {
        Self {
            params,
            read: None,
            planned: FightMove::Advance,
            cooldown: 0.0,
            decisions: 0,
            strikes: 0,
        }
    }

    fn pct(value: f32) -> u32 {
        (value.clamp(0.0, 1.0) * 100.0) as u32
    }

    /// Score the whole action set against the current read.
    fn score_moves(&self, ctx: &TaskContext<'_>, read: &OpponentRead) -> Vec<(FightMove, Score)> {
        let aggression = Self::pct(self.params.aggression);
        let skill = Self::pct(self.params.skill);
        let stamina = Self::pct(ctx.ped.stamina.ratio());
        let health = Self::pct(ctx.ped.health.ratio());
        let in_melee = read.distance <= MELEE_RANGE;

        let style_offense: u32 = match self.params.style {
            FightingStyle::Brawler => 20,
            FightingStyle::Balanced => 10,
            FightingStyle::Technical => 10,
            FightingStyle::Defensive => 0,
        };
        let style_guard: u32 = match self.params.style {
            FightingStyle::Defensive => 25,
            FightingStyle::Technical => 15,
            FightingStyle::Balanced => 10,
            FightingStyle::Brawler => 0,
        };

        let strike = if in_melee && self.cooldown <= 0.0 && stamina > 10 {
            let situation = if read.distance <= 1.2 { 100 } else { 80 };
            let disposition = (aggression * 60 + skill * 30) / 100 + style_offense;
            let modifier = if read.blocking { 40 } else { 100 };
            Score::new(true, situation, disposition, modifier)
        } else {
            Score::impossible()
        };

        let heavy = if in_melee && self.cooldown <= 0.0 && stamina > 30 {
            let situation = 70;
            let disposition = (aggression * 50 + skill * 40) / 100 + style_offense;
            // A heavy strike is what breaks a standing guard.
            let modifier = if read.blocking { 130 } else { 85 };
            Score::new(true, situation, disposition, modifier)
        } else {
            Score::impossible()
        };

        let block = {
            let situation = if read.aggressive && in_melee { 90 } else { 20 };
            let disposition = ((100 - aggression) * 50 + skill * 20) / 100 + style_guard;
            let modifier = if stamina < 30 { 130 } else { 100 };
            Score::new(true, situation, disposition, modifier)
        };

        let dodge = {
            let situation = if read.aggressive && in_melee { 70 } else { 15 };
            let disposition = (skill * 70) / 100 + style_guard / 2;
            let modifier = if read.fatigue > 0.6 { 120 } else { 100 };
            Score::new(true, situation, disposition, modifier)
        };

        let advance = if read.distance > MELEE_RANGE * 0.75 {
            let situation = if read.distance > 6.0 {
                100
            } else if read.distance > 3.0 {
                85
            } else {
                60
            };
            let disposition = (aggression * 70 + skill * 10) / 100 + style_offense / 2;
            Score::new(true, situation, disposition, 100)
        } else {
            Score::impossible()
        };

        let retreat = {
            let situation = if health < 30 {
                100
            } else if health < 50 {
                60
            } else {
                10
            };
            let disposition = ((100 - aggression) * 60) / 100 + style_guard;
            let modifier = if stamina < 20 { 130 } else { 100 };
            Score::new(true, situation, disposition, modifier)
        };

        vec![
            (FightMove::Strike, strike),
            (FightMove::HeavyStrike, heavy),
            (FightMove::Block, block),
            (FightMove::Dodge, dodge),
            (FightMove::Advance, advance),
            (FightMove::Retreat, retreat),
        ]
    }

    fn face(ctx: &mut TaskContext<'_>, toward: Vec3) {
        let direction = (toward - ctx.ped.position).normalized();
        if direction != Vec3::ZERO {
            ctx.ped.rotation.yaw = direction.yaw_degrees();
        }
    }
}

impl WildBehavior for FightTask {
    fn init_systems(
        &mut self,
        state: &mut TaskState,
        ctx: &mut TaskContext<'_>,
    ) -> Result<(), String> {
        let opponent = state
            .target
            .ok_or_else(|| "no opponent bound".to_owned())?;
        ctx.world
            .actor(opponent)
            .map_err(|_| "opponent not observable".to_owned())?;
        Ok(())
    }

    fn analyze(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) -> f32 {
        let Some(opponent) = state.target else {
            return 0.0;
        };
        let Ok(snapshot) = ctx.world.actor(opponent) else {
            return 0.0;
        };

        let read = OpponentRead {
            position: snapshot.position,
            distance: ctx.ped.position.distance(snapshot.position),
            health: snapshot.health,
            alive: snapshot.alive,
            aggressive: snapshot.aggressive,
            blocking: snapshot.blocking,
            fatigue: snapshot.fatigue,
        };

        let drift = match self.read {
            Some(previous) => {
                let mut drift = (read.distance - previous.distance).abs() * 0.2;
                drift += (read.health - previous.health).abs() * 2.0;
                if read.blocking != previous.blocking {
                    drift += 0.5;
                }
                if read.aggressive != previous.aggressive {
                    drift += 0.5;
                }
                drift
            }
            None => 0.0,
        };

        self.read = Some(read);
        drift
    }

    fn plan(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) {
        let Some(read) = self.read else {
            return;
        };
        let options = self.score_moves(&*ctx, &read);
        let seed = compute_seed(state.id.0, self.decisions, state.owner.0, 0);
        self.decisions += 1;
        if let Some(chosen) = pick_best(&options, ctx.world.rng().ok(), seed) {
            self.planned = chosen;
        }
    }

    fn execute_actions(
        &mut self,
        state: &mut TaskState,
        dt: f32,
        ctx: &mut TaskContext<'_>,
    ) -> TickOutcome {
        let Some(read) = self.read else {
            return TickOutcome::Continue;
        };

        if !read.alive {
            return TickOutcome::done("opponent defeated");
        }
        if read.distance > self.params.disengage_range {
            return TickOutcome::done("opponent fled");
        }
        if let Some(duration) = self.params.fight_duration
            && state.elapsed >= duration
        {
            return TickOutcome::done("fight duration elapsed");
        }
        if !ctx.ped.is_alive() {
            return TickOutcome::fail("defeated");
        }
        if ctx.ped.stamina.is_depleted() {
            return TickOutcome::fail("stamina exhausted");
        }

        self.cooldown = (self.cooldown - dt).max(0.0);
        ctx.ped.stamina.drain(self.params.stamina_drain_rate * dt);

        match self.planned {
            FightMove::Advance => {
                Self::face(ctx, read.position);
                ctx.ped.position = ctx
                    .ped
                    .position
                    .move_towards(read.position, ADVANCE_SPEED * dt);
            }
            FightMove::Retreat => {
                let away = (ctx.ped.position - read.position).normalized();
                ctx.ped.position += away * (RETREAT_SPEED * dt);
                Self::face(ctx, read.position);
            }
            FightMove::Strike | FightMove::HeavyStrike => {
                Self::face(ctx, read.position);
                let heavy = self.planned == FightMove::HeavyStrike;
                if read.distance <= MELEE_RANGE && self.cooldown <= 0.0 {
                    let cost = if heavy {
                        self.params.strike_cost * 2.0
                    } else {
                        self.params.strike_cost
                    };
                    ctx.ped.stamina.drain(cost);
                    self.cooldown =
                        (if heavy { 1.8 } else { 1.2 }) - self.params.skill.clamp(0.0, 1.0) * 0.6;
                    self.strikes += 1;
                    state
                        .outputs
                        .insert("strikes_thrown".to_owned(), self.strikes.into());
                }
            }
            FightMove::Block | FightMove::Dodge => {
                // Hold ground facing the opponent; a dodge adds a small
                // lateral offset.
                Self::face(ctx, read.position);
                if self.planned == FightMove::Dodge {
                    let toward = (read.position - ctx.ped.position).normalized();
                    let lateral = Vec3::new(-toward.y, toward.x, 0.0);
                    ctx.ped.position += lateral * (1.0 * dt);
                }
            }
        }

        // Refresh distance for the next execution tick; full re-reads stay
        // throttled by the analysis rate.
        if let Some(read) = self.read.as_mut() {
            read.distance = ctx.ped.position.distance(read.position);
        }

        TickOutcome::Continue
    }

    fn adapt(&mut self, _state: &mut TaskState, ctx: &mut TaskContext<'_>) {
        // Losing fighters cool off; winning fighters press the advantage.
        let own_health = ctx.ped.health.ratio();
        let opponent_health = self.read.map(|read| read.health).unwrap_or(1.0);
        if own_health < opponent_health {
            self.params.aggression = (self.params.aggression - 0.15).max(0.0);
        } else {
            self.params.aggression = (self.params.aggression + 0.1).min(1.0);
        }
    }

    fn finalize(&mut self, state: &mut TaskState, _ctx: &mut TaskContext<'_>) {
        state
            .outputs
            .insert("strikes_thrown".to_owned(), self.strikes.into());
        if let Some(read) = self.read {
            state
                .outputs
                .insert("final_distance".to_owned(), read.distance.into());
        }
    }

    fn validate(&self, state: &TaskState, ctx: &TaskContext<'_>) -> bool {
        state
            .target
            .map(|opponent| ctx.world.actor(opponent).is_ok())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use crate::kinds::TaskClass;
    use crate::state::{PedId, PedState};
    use crate::world::{ActorSnapshot, ActorsSnapshot, PcgRng, WorldEnv};

    fn opponent(position: Vec3, alive: bool) -> ActorSnapshot {
        let mut ped = PedState::new(PedId(2), position);
        if !alive {
            ped.health.drain(1000.0);
        }
        ActorSnapshot::of(&ped).with_aggressive(true)
    }

    #[test]
    fn fight_ends_when_opponent_is_defeated() {
        let mut task = FightTask::new(FightParams::default());
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        let mut state = crate::task::test_state(TaskClass::FightAgainst, PedId(1), Some(PedId(2)));
        let mut sink = NullSink;
        let rng = PcgRng;

        let mut actors = ActorsSnapshot::new();
        actors.insert(opponent(Vec3::new(1.0, 0.0, 0.0), false));
        let mut ctx = TaskContext::new(
            &mut ped,
            WorldEnv::new(None, Some(&actors), Some(&rng)),
            &mut sink,
        );

        task.analyze(&mut state, &mut ctx);
        let outcome = task.execute_actions(&mut state, 0.1, &mut ctx);
        assert_eq!(
            outcome,
            TickOutcome::Complete {
                success: true,
                message: "opponent defeated".to_owned()
            }
        );
    }

    #[test]
    fn distant_opponent_makes_advance_the_plan() {
        let mut task = FightTask::new(FightParams {
            aggression: 0.8,
            ..FightParams::default()
        });
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        let mut state = crate::task::test_state(TaskClass::FightAgainst, PedId(1), Some(PedId(2)));
        let mut sink = NullSink;
        let rng = PcgRng;

        let mut actors = ActorsSnapshot::new();
        actors.insert(opponent(Vec3::new(8.0, 0.0, 0.0), true));
        let mut ctx = TaskContext::new(
            &mut ped,
            WorldEnv::new(None, Some(&actors), Some(&rng)),
            &mut sink,
        );

        task.analyze(&mut state, &mut ctx);
        task.plan(&mut state, &mut ctx);
        assert_eq!(task.planned, FightMove::Advance);

        let before = ctx.ped.position;
        task.execute_actions(&mut state, 0.5, &mut ctx);
        assert!(ctx.ped.position.distance(Vec3::new(8.0, 0.0, 0.0)) < before.distance(Vec3::new(8.0, 0.0, 0.0)));
    }

    #[test]
    fn fled_opponent_completes_the_fight() {
        let mut task = FightTask::new(FightParams {
            disengage_range: 5.0,
            ..FightParams::default()
        });
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        let mut state = crate::task::test_state(TaskClass::FightAgainst, PedId(1), Some(PedId(2)));
        let mut sink = NullSink;

        let mut actors = ActorsSnapshot::new();
        actors.insert(opponent(Vec3::new(20.0, 0.0, 0.0), true));
        let mut ctx = TaskContext::new(&mut ped, WorldEnv::new(None, Some(&actors), None), &mut sink);

        task.analyze(&mut state, &mut ctx);
        let outcome = task.execute_actions(&mut state, 0.1, &mut ctx);
        assert_eq!(
            outcome,
            TickOutcome::Complete {
                success: true,
                message: "opponent fled".to_owned()
            }
        );
    }
}
