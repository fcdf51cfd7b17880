//! Headless run loop.

use anyhow::Result;
use ashfall_common::Direction;
use ashfall_sim::prelude::*;
use tracing::{debug, info};

use crate::config::SandboxConfig;
use crate::scene::Scene;
use crate::snapshot::WorldSnapshot;

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks simulated
    pub ticks: u64,
    /// Actors spawned during the run
    pub spawned: usize,
    /// Actors removed during the run
    pub removed: usize,
    /// Actors alive at the end
    pub survivors: usize,
    /// Events raised during the run
    pub events: usize,
}

/// Owns a world, its scene and the event bus.
///
/// The bus is drained after every tick into `pending`, which the next
/// snapshot takes, so long gaps between snapshots never fill the channel.
pub struct Runner {
    world: World,
    scene: Scene,
    bus: EventBus,
    pending: Vec<SimEvent>,
    autoplay: bool,
}

impl Runner {
    /// Builds a world from `config` and spawns the scene into it.
    pub fn new(config: &SandboxConfig, mut scene: Scene, weapons: &WeaponTable) -> Result<Self> {
        scene.layer.set_margin(config.sim.query_margin);
        let mut world = World::new(&config.sim);
        let ids = scene.populate(&mut world, weapons)?;
        info!("Spawned {} actors", ids.len());

        Ok(Self {
            world,
            scene,
            bus: EventBus::default(),
            pending: Vec::new(),
            autoplay: config.autoplay,
        })
    }

    /// The simulated world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Runs one tick and collects the events it raised.
    pub fn tick(&mut self) -> StepReport {
        if self.autoplay {
            self.drive_players();
        }
        let report = self
            .world
            .step(&self.scene.layer, &TimelineAnimation, &mut self.bus);
        self.pending.extend(self.bus.drain());
        report
    }

    /// Runs `ticks` ticks, handing a snapshot to `emit` every
    /// `snapshot_every` ticks and once at the end.
    pub fn run<F>(&mut self, ticks: u64, snapshot_every: u64, mut emit: F) -> Result<RunSummary>
    where
        F: FnMut(&WorldSnapshot) -> Result<()>,
    {
        let mut summary = RunSummary::default();
        for tick in 1..=ticks {
            let before = self.pending.len();
            let report = self.tick();
            summary.events += self.pending.len() - before;
            summary.ticks = tick;
            summary.spawned += report.spawned;
            summary.removed += report.removed;

            if snapshot_every > 0 && tick % snapshot_every == 0 && tick != ticks {
                emit(&self.snapshot())?;
            }
        }

        emit(&self.snapshot())?;
        summary.survivors = self.world.len();
        Ok(summary)
    }

    /// Captures the world with the events collected since the last snapshot.
    pub fn snapshot(&mut self) -> WorldSnapshot {
        self.pending.extend(self.bus.drain());
        WorldSnapshot::capture(&self.world, std::mem::take(&mut self.pending))
    }

    /// Walks every player toward the nearest opponent, swinging when armed.
    fn drive_players(&mut self) {
        let players: Vec<_> = self
            .world
            .iter()
            .filter(|actor| actor.kind() == ActorKind::Player && !actor.is_dead())
            .map(|actor| (actor.id(), actor.side(), actor.bounds().center_x(), actor.weapon().is_some()))
            .collect();

        for (id, side, x, armed) in players {
            let target = self
                .world
                .live_targets(side.opposing())
                .map(|target| target.bounds().center_x() - x)
                .min_by(|a, b| a.abs().total_cmp(&b.abs()));

            let mut intent = match target.and_then(Direction::from_velocity) {
                Some(direction) => Intent::walk(direction),
                None => Intent::default(),
            };
            if armed && target.is_some_and(|dx| dx.abs() < 48.0) {
                intent = intent.holding(0);
            }

            if let Err(e) = self.world.set_intent(id, intent) {
                debug!("Autoplay skipped {id}: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_run() {
        let mut config = SandboxConfig::default();
        config.ticks = 240;
        let mut runner =
            Runner::new(&config, Scene::arena(), &WeaponTable::new()).expect("arena is valid");

        let mut snapshots = 0;
        let summary = runner
            .run(config.ticks, 60, |_| {
                snapshots += 1;
                Ok(())
            })
            .expect("run completes");

        assert_eq!(summary.ticks, 240);
        assert_eq!(snapshots, 4);
        assert_eq!(runner.world().clock().ticks(), 240);
    }

    #[test]
    fn test_events_survive_long_snapshot_gaps() {
        let mut config = SandboxConfig::default();
        config.autoplay = false;
        let mut runner =
            Runner::new(&config, Scene::arena(), &WeaponTable::new()).expect("arena is valid");
        let marker = ActorId::new(999, 0);

        // Twice the bus capacity, spread over ticks with no snapshot in between
        for _ in 0..2048 {
            assert!(runner.bus.publish(SimEvent::Landed { id: marker }));
            runner.tick();
        }

        let snapshot = runner.snapshot();
        let landed = snapshot
            .events
            .iter()
            .filter(|event| matches!(event, SimEvent::Landed { id } if *id == marker))
            .count();
        assert_eq!(landed, 2048);
        assert!(runner.snapshot().events.is_empty());
    }

    #[test]
    fn test_run_counts_events() {
        let mut config = SandboxConfig::default();
        config.ticks = 240;
        let mut runner =
            Runner::new(&config, Scene::arena(), &WeaponTable::new()).expect("arena is valid");

        let mut emitted = 0;
        let summary = runner
            .run(config.ticks, 0, |snapshot| {
                emitted += snapshot.events.len();
                Ok(())
            })
            .expect("run completes");

        assert_eq!(summary.events, emitted);
    }

    #[test]
    fn test_runner_applies_query_margin() {
        let mut config = SandboxConfig::default();
        config.sim.query_margin = 80.0;
        let runner =
            Runner::new(&config, Scene::arena(), &WeaponTable::new()).expect("arena is valid");

        assert_eq!(runner.scene.layer.margin(), 80.0);
    }

    #[test]
    fn test_player_settles_on_floor() {
        let mut config = SandboxConfig::default();
        config.autoplay = false;
        let scene = Scene::arena();
        let mut runner = Runner::new(&config, scene, &WeaponTable::new()).expect("arena is valid");

        for _ in 0..30 {
            runner.tick();
        }

        let player = runner
            .world()
            .iter()
            .find(|actor| actor.kind() == ActorKind::Player)
            .expect("player alive");
        assert_eq!(player.position().1, 168.0);
        assert!(!player.body().falling);
    }
}
