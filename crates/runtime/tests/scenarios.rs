//! End-to-end behavior scenarios driven synchronously against ped-core.

use ped_core::{
    ActorSnapshot, ActorsSnapshot, FightParams, GrabLedgeParams, MoveTowardsParams, PcgRng, PedId,
    PedState, RecordingSink, TaskContext, TaskFactory, TaskPriority, TaskStatus, TurnParams, Vec3,
    WildTuning, WorldEnv,
};

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn move_towards_reaches_the_destination() {
    init_tracing();
    let factory = TaskFactory::new();
    let mut manager = ped_core::TaskManager::new(PedId(1));
    let mut ped = PedState::new(PedId(1), Vec3::ZERO);
    let mut sink = RecordingSink::new();
    let destination = Vec3::new(100.0, 0.0, 0.0);

    let task = factory
        .create_move_towards(
            PedId(1),
            None,
            MoveTowardsParams {
                destination: Some(destination),
                speed: 300.0,
                stop_distance: 10.0,
            },
        )
        .unwrap();

    let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);
    assert!(manager.start(task, &mut ctx));

    let mut ticks = 0;
    while manager.current_task().is_some() && ticks < 10 {
        manager.tick(1.0, &mut ctx);
        ticks += 1;
    }

    assert_eq!(manager.completed_history().len(), 1);
    let finished = &manager.completed_history()[0];
    assert_eq!(finished.status(), TaskStatus::Completed);
    let result = finished.result().unwrap();
    assert!(result.success);
    assert!(ped.position.distance(destination) <= 10.0 + 1e-3);
}

#[test]
fn critical_fight_preempts_a_running_turn() {
    init_tracing();
    let factory = TaskFactory::new();
    let mut manager = ped_core::TaskManager::new(PedId(1));
    let mut ped = PedState::new(PedId(1), Vec3::ZERO);
    let mut sink = RecordingSink::new();
    let rng = PcgRng;

    let opponent = PedState::new(PedId(2), Vec3::new(5.0, 0.0, 0.0));
    let mut actors = ActorsSnapshot::new();
    actors.insert(ActorSnapshot::of(&opponent).with_aggressive(true));

    let turn = factory
        .create_turn(
            PedId(1),
            None,
            TurnParams {
                direction: Some(Vec3::new(0.0, 1.0, 0.0)),
                ..TurnParams::default()
            },
        )
        .unwrap();
    let turn_id = turn.id();

    let fight = factory
        .create_fight_against(
            PedId(1),
            PedId(2),
            FightParams::default(),
            WildTuning::default(),
        )
        .unwrap()
        .with_priority(TaskPriority::Critical);

    let world = WorldEnv::new(None, Some(&actors), Some(&rng));
    let mut ctx = TaskContext::new(&mut ped, world, &mut sink);

    assert!(manager.start(turn, &mut ctx));
    assert_eq!(
        manager.current_task().map(|task| task.status()),
        Some(TaskStatus::Running)
    );

    // The Critical fight displaces the interruptible Normal turn.
    assert!(manager.add(fight, &mut ctx));
    manager.process_queue(&mut ctx);

    assert_eq!(
        manager.current_task().map(|task| task.class()),
        Some(ped_core::TaskClass::FightAgainst)
    );
    assert_eq!(
        manager.current_task().map(|task| task.status()),
        Some(TaskStatus::Running)
    );

    let cancelled = manager
        .failed_history()
        .iter()
        .find(|task| task.id() == turn_id)
        .expect("turn should be in history");
    assert_eq!(cancelled.status(), TaskStatus::Cancelled);
}

#[test]
fn ledge_hold_fails_when_stamina_runs_out_early() {
    init_tracing();
    let factory = TaskFactory::new();
    let mut manager = ped_core::TaskManager::new(PedId(1));
    let mut ped = PedState::new(PedId(1), Vec3::ZERO);
    let mut sink = RecordingSink::new();

    // The ped already occupies the hang point, so the hold begins on the
    // second tick. Stamina (100) empties after three seconds of hanging,
    // well before the five-second hold completes.
    let ledge = ped.position + Vec3::UP * 0.9;
    let task = factory
        .create_grab_ledge(
            PedId(1),
            GrabLedgeParams {
                ledge: Some(ledge),
                grab_range: 1.5,
                hold_duration: 5.0,
                stamina_drain_rate: 100.0 / 3.0,
            },
            None,
        )
        .unwrap();

    let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);
    assert!(manager.start(task, &mut ctx));

    let mut ticks = 0;
    while manager.current_task().is_some() && ticks < 100 {
        manager.tick(0.1, &mut ctx);
        ticks += 1;
    }

    assert_eq!(manager.failed_history().len(), 1);
    let failed = &manager.failed_history()[0];
    assert_eq!(failed.status(), TaskStatus::Failed);
    let result = failed.result().unwrap();
    assert!(!result.success);
    assert_eq!(result.message, "stamina exhausted");
    // Failure lands at roughly the three-second mark, not the hold duration.
    assert!(result.elapsed > 2.9 && result.elapsed < 3.7, "elapsed was {}", result.elapsed);
    assert!(ped.stamina.is_depleted());
}
