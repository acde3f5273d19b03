//! The scheduling worker.
//!
//! [`Scheduler`] owns every registered ped's state and task manager, ticking
//! them at a fixed interval that is typically coarser than the render rate.
//! Commands arrive over an mpsc channel with oneshot replies; task events
//! flow out through the topic bus. Each pass snapshots all actors first so a
//! task can observe its targets while its own ped is being mutated.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use ped_core::{
    ActorsSnapshot, GeometryOracle, ManagerConfig, OpenGround, PcgRng, PedId, PedState, Task,
    TaskClass, TaskContext, TaskManager, TaskStatus, WorldEnv,
};

use crate::error::{Result, RuntimeError};
use crate::events::{BusSink, Event, EventBus, SchedulerEvent};

/// Scheduler configuration.
#[derive(Clone, Copy, Debug)]
pub struct SchedulerConfig {
    /// Fixed scheduling interval; also the dt fed to every manager tick.
    pub interval: Duration,
    /// Manager configuration applied to each registered ped.
    pub manager: ManagerConfig,
    /// Capacity of each bus topic.
    pub bus_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            manager: ManagerConfig::default(),
            bus_capacity: 100,
        }
    }
}

/// Commands that can be sent to the scheduling worker.
pub enum Command {
    AddPed {
        state: PedState,
        reply: oneshot::Sender<Result<()>>,
    },
    RemovePed {
        ped: PedId,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Enqueue a task with its owner's manager; `start_now` requests the
    /// slot immediately instead of waiting for queue processing.
    Dispatch {
        task: Task,
        start_now: bool,
        reply: oneshot::Sender<Result<bool>>,
    },
    InterruptCurrent {
        ped: PedId,
        reply: oneshot::Sender<Result<bool>>,
    },
    ClearAll {
        ped: PedId,
        reply: oneshot::Sender<Result<()>>,
    },
    Report {
        ped: PedId,
        reply: oneshot::Sender<Result<PedReport>>,
    },
    Shutdown,
}

/// Read-only snapshot of one ped's scheduling situation.
#[derive(Clone, Debug)]
pub struct PedReport {
    pub state: PedState,
    pub current_class: Option<TaskClass>,
    pub current_status: Option<TaskStatus>,
    pub pending: usize,
    pub completed: usize,
    pub failed: usize,
}

struct PedEntry {
    state: PedState,
    manager: TaskManager,
}

/// Worker that owns ped states and managers and processes commands.
pub struct Scheduler {
    peds: HashMap<PedId, PedEntry>,
    geometry: Arc<dyn GeometryOracle>,
    rng: PcgRng,
    bus: EventBus,
    config: SchedulerConfig,
    command_rx: mpsc::Receiver<Command>,
    tick: u64,
}

impl Scheduler {
    /// Creates the worker together with its handle.
    ///
    /// The worker does nothing until [`run`](Self::run) is awaited (usually
    /// via `tokio::spawn`).
    pub fn new(
        config: SchedulerConfig,
        geometry: Arc<dyn GeometryOracle>,
    ) -> (SchedulerHandle, Scheduler) {
        let (command_tx, command_rx) = mpsc::channel(64);
        let bus = EventBus::with_capacity(config.bus_capacity);
        let handle = SchedulerHandle {
            commands: command_tx,
            bus: bus.clone(),
        };
        let scheduler = Scheduler {
            peds: HashMap::new(),
            geometry,
            rng: PcgRng,
            bus,
            config,
            command_rx,
            tick: 0,
        };
        (handle, scheduler)
    }

    /// Convenience constructor over open flat ground.
    pub fn on_open_ground(config: SchedulerConfig) -> (SchedulerHandle, Scheduler) {
        Self::new(config, Arc::new(OpenGround))
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let dt = self.config.interval.as_secs_f32();

        loop {
            tokio::select! {
                _ = ticker.tick() => self.step(dt),
                command = self.command_rx.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
            }
        }
        tracing::debug!(ticks = self.tick, "scheduler stopped");
    }

    /// One scheduling pass over every registered ped.
    fn step(&mut self, dt: f32) {
        let actors = ActorsSnapshot::from_peds(self.peds.values().map(|entry| &entry.state));

        for (&ped, entry) in self.peds.iter_mut() {
            let mut sink = BusSink::new(ped, &self.bus);
            let world = WorldEnv::with_all(self.geometry.as_ref(), &actors, &self.rng);
            let mut ctx = TaskContext::new(&mut entry.state, world, &mut sink);
            entry.manager.tick(dt, &mut ctx);
        }

        self.tick += 1;
        self.bus.publish(Event::Scheduler(SchedulerEvent::TickCompleted {
            tick: self.tick,
            active_peds: self.peds.len(),
        }));
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::AddPed { state, reply } => {
                let _ = reply.send(self.add_ped(state));
            }
            Command::RemovePed { ped, reply } => {
                let _ = reply.send(self.remove_ped(ped));
            }
            Command::Dispatch {
                task,
                start_now,
                reply,
            } => {
                let _ = reply.send(self.dispatch(task, start_now));
            }
            Command::InterruptCurrent { ped, reply } => {
                let _ = reply.send(self.with_ped(ped, |entry, ctx| entry.interrupt_current(ctx)));
            }
            Command::ClearAll { ped, reply } => {
                let _ = reply.send(self.with_ped(ped, |entry, ctx| entry.clear_all(ctx)));
            }
            Command::Report { ped, reply } => {
                let _ = reply.send(self.report(ped));
            }
            Command::Shutdown => unreachable!("shutdown breaks the loop before dispatch"),
        }
    }

    fn add_ped(&mut self, state: PedState) -> Result<()> {
        let ped = state.id;
        if self.peds.contains_key(&ped) {
            return Err(RuntimeError::PedAlreadyRegistered(ped));
        }
        let manager = TaskManager::with_config(ped, self.config.manager);
        self.peds.insert(ped, PedEntry { state, manager });
        self.bus
            .publish(Event::Scheduler(SchedulerEvent::PedRegistered { ped }));
        Ok(())
    }

    fn remove_ped(&mut self, ped: PedId) -> Result<()> {
        self.peds
            .remove(&ped)
            .ok_or(RuntimeError::UnknownPed(ped))?;
        self.bus
            .publish(Event::Scheduler(SchedulerEvent::PedRemoved { ped }));
        Ok(())
    }

    fn dispatch(&mut self, task: Task, start_now: bool) -> Result<bool> {
        let owner = task.owner();
        self.with_ped(owner, |manager, ctx| {
            if start_now {
                manager.start(task, ctx)
            } else {
                manager.add(task, ctx)
            }
        })
    }

    fn report(&self, ped: PedId) -> Result<PedReport> {
        let entry = self.peds.get(&ped).ok_or(RuntimeError::UnknownPed(ped))?;
        Ok(PedReport {
            state: entry.state.clone(),
            current_class: entry.manager.current_task().map(|task| task.class()),
            current_status: entry.manager.current_task().map(|task| task.status()),
            pending: entry.manager.pending_tasks().len(),
            completed: entry.manager.completed_history().len(),
            failed: entry.manager.failed_history().len(),
        })
    }

    /// Run a manager operation with a fully-wired context for `ped`.
    fn with_ped<T>(
        &mut self,
        ped: PedId,
        operation: impl FnOnce(&mut TaskManager, &mut TaskContext<'_>) -> T,
    ) -> Result<T> {
        if !self.peds.contains_key(&ped) {
            return Err(RuntimeError::UnknownPed(ped));
        }
        let actors = ActorsSnapshot::from_peds(self.peds.values().map(|entry| &entry.state));
        let entry = self.peds.get_mut(&ped).expect("presence checked above");

        let mut sink = BusSink::new(ped, &self.bus);
        let world = WorldEnv::with_all(self.geometry.as_ref(), &actors, &self.rng);
        let mut ctx = TaskContext::new(&mut entry.state, world, &mut sink);
        Ok(operation(&mut entry.manager, &mut ctx))
    }
}

/// Cloneable async API over the scheduler's command channel.
#[derive(Clone)]
pub struct SchedulerHandle {
    commands: mpsc::Sender<Command>,
    bus: EventBus,
}

impl SchedulerHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T>>) -> Command,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        reply_rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    pub async fn add_ped(&self, state: PedState) -> Result<()> {
        self.request(|reply| Command::AddPed { state, reply }).await
    }

    pub async fn remove_ped(&self, ped: PedId) -> Result<()> {
        self.request(|reply| Command::RemovePed { ped, reply }).await
    }

    /// Hand a task to its owner's manager. Returns the manager's verdict.
    pub async fn dispatch(&self, task: Task, start_now: bool) -> Result<bool> {
        self.request(|reply| Command::Dispatch {
            task,
            start_now,
            reply,
        })
        .await
    }

    pub async fn interrupt_current(&self, ped: PedId) -> Result<bool> {
        self.request(|reply| Command::InterruptCurrent { ped, reply })
            .await
    }

    pub async fn clear_all(&self, ped: PedId) -> Result<()> {
        self.request(|reply| Command::ClearAll { ped, reply }).await
    }

    pub async fn report(&self, ped: PedId) -> Result<PedReport> {
        self.request(|reply| Command::Report { ped, reply }).await
    }

    /// Subscribe to a bus topic.
    pub fn subscribe(&self, topic: crate::events::Topic) -> tokio::sync::broadcast::Receiver<Event> {
        self.bus.subscribe(topic)
    }

    /// Ask the worker to stop after the current iteration.
    pub async fn shutdown(&self) -> Result<()> {
        self.commands
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::ChannelClosed)
    }
}
