//! Async scheduler-loop tests over the event bus.

use std::time::Duration;

use runtime::{Event, Scheduler, SchedulerConfig, Topic};

use ped_core::{MoveTowardsParams, PedId, PedState, TaskEvent, TaskFactory, Vec3};

#[tokio::test]
async fn scheduler_drives_a_task_to_completion() {
    let (handle, scheduler) = Scheduler::on_open_ground(SchedulerConfig {
        interval: Duration::from_millis(10),
        ..SchedulerConfig::default()
    });
    let worker = tokio::spawn(scheduler.run());

    let mut lifecycle = handle.subscribe(Topic::Lifecycle);
    handle
        .add_ped(PedState::new(PedId(1), Vec3::ZERO))
        .await
        .unwrap();

    let factory = TaskFactory::new();
    let destination = Vec3::new(2.0, 0.0, 0.0);
    let task = factory
        .create_move_towards(
            PedId(1),
            None,
            MoveTowardsParams {
                destination: Some(destination),
                speed: 10.0,
                stop_distance: 0.1,
            },
        )
        .unwrap();
    assert!(handle.dispatch(task, false).await.unwrap());

    let result = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match lifecycle.recv().await {
                Ok(Event::Task(notification)) => {
                    assert_eq!(notification.ped, PedId(1));
                    if let TaskEvent::Completed { result } = notification.event {
                        break result;
                    }
                }
                Ok(_) => {}
                Err(err) => panic!("lifecycle stream ended: {err}"),
            }
        }
    })
    .await
    .expect("task should complete within the timeout");

    assert!(result.success);

    let report = handle.report(PedId(1)).await.unwrap();
    assert_eq!(report.completed, 1);
    assert_eq!(report.pending, 0);
    assert!(report.state.position.distance(destination) <= 0.1 + 1e-3);

    handle.shutdown().await.unwrap();
    worker.await.unwrap();
}

#[tokio::test]
async fn unknown_ped_is_reported_as_an_error() {
    let (handle, scheduler) = Scheduler::on_open_ground(SchedulerConfig::default());
    let worker = tokio::spawn(scheduler.run());

    let err = handle.report(PedId(42)).await.unwrap_err();
    assert_eq!(err, runtime::RuntimeError::UnknownPed(PedId(42)));

    let factory = TaskFactory::new();
    let task = factory
        .create_move_towards(
            PedId(42),
            None,
            MoveTowardsParams {
                destination: Some(Vec3::ZERO),
                ..MoveTowardsParams::default()
            },
        )
        .unwrap();
    let err = handle.dispatch(task, true).await.unwrap_err();
    assert_eq!(err, runtime::RuntimeError::UnknownPed(PedId(42)));

    handle.shutdown().await.unwrap();
    worker.await.unwrap();
}

#[tokio::test]
async fn bus_events_serialize_for_external_consumers() {
    let (handle, scheduler) = Scheduler::on_open_ground(SchedulerConfig {
        interval: Duration::from_millis(10),
        ..SchedulerConfig::default()
    });
    let worker = tokio::spawn(scheduler.run());

    let mut scheduler_events = handle.subscribe(Topic::Scheduler);
    let event = tokio::time::timeout(Duration::from_secs(5), scheduler_events.recv())
        .await
        .expect("a tick should land within the timeout")
        .unwrap();

    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("TickCompleted"));

    handle.shutdown().await.unwrap();
    worker.await.unwrap();
}
