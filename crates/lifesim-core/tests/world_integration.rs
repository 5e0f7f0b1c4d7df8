use lifesim_core::{
    ActionOutcome, AttackDamage, Behavior, LifeletContext, LifeletError, LifeletId, RaceRegistry,
    SimulationConfig, SimulationPhase, SpawnMethod, Vector, World, WorldError,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

struct Idle;

impl Behavior for Idle {
    fn decide(&mut self, _ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
        Ok(())
    }
}

/// Requests the same velocity every tick.
struct Push(Vector);

impl Behavior for Push {
    fn decide(&mut self, ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
        ctx.move_by(self.0);
        Ok(())
    }
}

/// Wanders randomly and attacks whoever is closest.
struct Brawler;

impl Behavior for Brawler {
    fn decide(&mut self, ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
        if let Some(target) = ctx.closest_visible() {
            let destination = target.position(&*ctx)?;
            ctx.attack(&target, 5.0)?;
            ctx.move_to_destination(destination, 2.0);
        } else {
            ctx.move_randomly(2.0);
        }
        Ok(())
    }
}

fn idle() -> Box<dyn Behavior> {
    Box::new(Idle)
}

fn brawler() -> Box<dyn Behavior> {
    Box::new(Brawler)
}

fn registry(names: &[&'static str], make: fn() -> Box<dyn Behavior>) -> RaceRegistry {
    let mut registry = RaceRegistry::new();
    for name in names {
        registry.register(*name, "integration", move |_rng| make());
    }
    registry
}

fn base_config() -> SimulationConfig {
    SimulationConfig {
        rng_seed: Some(0xDEAD_BEEF),
        initial_food: 0,
        food_respawn_interval: 0,
        ..SimulationConfig::default()
    }
}

#[test]
fn grouped_spawn_places_every_lifelet_and_food() {
    let config = SimulationConfig {
        initial_lifelets: 20,
        initial_food: 100,
        spawn_method: SpawnMethod::GroupedOnRing,
        ..base_config()
    };
    let world = World::new(config.clone(), registry(&["A", "B"], idle))
        .expect("world");

    assert_eq!(world.lifelets().len(), 20);
    assert_eq!(world.population(), vec![10, 10]);
    assert_eq!(world.food().len(), config.initial_food);
    assert!(world
        .lifelets()
        .iter()
        .all(|l| l.position().norm() <= config.world_radius));
    assert!(world
        .food()
        .iter()
        .all(|f| lifesim_core::Entity::position(f).norm() <= config.world_radius));
    let ids: HashSet<LifeletId> = world.lifelets().iter().map(|l| l.id()).collect();
    assert_eq!(ids.len(), 20);
}

#[test]
fn every_spawn_method_respects_the_world() {
    for method in [
        SpawnMethod::GroupedOnRing,
        SpawnMethod::RandomOnRing,
        SpawnMethod::Scattered,
    ] {
        let config = SimulationConfig {
            initial_lifelets: 30,
            spawn_method: method,
            dispersion_amount: 900.0,
            ..base_config()
        };
        let world = World::new(config, registry(&["A", "B", "C"], idle))
            .expect("world");
        assert_eq!(world.lifelets().len(), 30, "{method:?}");
        assert!(world
            .lifelets()
            .iter()
            .all(|l| l.position().norm() <= 1000.0 + 1e-9));
    }
}

#[test]
fn huge_dispersion_is_capped_at_the_world_edge() {
    let config = SimulationConfig {
        initial_lifelets: 6,
        spawn_method: SpawnMethod::GroupedOnRing,
        dispersion_amount: 1e308,
        ..base_config()
    };
    let world = World::new(config.clone(), registry(&["A", "B"], idle)).expect("world");
    assert_eq!(world.lifelets().len(), 6);
    assert!(world
        .lifelets()
        .iter()
        .all(|l| l.position().is_finite() && l.position().norm() <= config.world_radius + 1e-9));

    let unbounded = SimulationConfig {
        dispersion_ratio: 1e-320,
        ..config
    };
    assert!(matches!(
        World::new(unbounded, registry(&["A"], idle)),
        Err(WorldError::InvalidConfig(_))
    ));
}

#[test]
fn shells_expire_when_the_tick_advances() {
    let mut world = World::new(base_config(), registry(&["A"], idle)).expect("world");
    for _ in 0..10 {
        world.simulate().expect("tick");
    }
    let id = world.lifelets().iter().next().map(|l| l.id()).expect("lifelet");
    let shell = world.shell_of(id).expect("shell");
    assert_eq!(world.tick().0, 10);
    assert!(shell.position(&world).is_ok());
    assert!(world.unshell(&shell).is_some());

    world.simulate().expect("tick");
    match shell.position(&world) {
        Err(LifeletError::ExpiredShell {
            target,
            stamped,
            current,
        }) => {
            assert_eq!(target, id);
            assert_eq!(stamped.0, 10);
            assert_eq!(current.0, 11);
        }
        other => panic!("expected an expired shell, got {other:?}"),
    }
}

#[test]
fn hoarded_shells_fail_inside_behaviours() {
    struct Hoarder {
        kept: Option<lifesim_core::Shell>,
        failures: Arc<Mutex<usize>>,
    }

    impl Behavior for Hoarder {
        fn decide(&mut self, ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
            if let Some(old) = &self.kept
                && old.energy(&*ctx).is_err()
            {
                *self.failures.lock().expect("lock") += 1;
            }
            self.kept = ctx.visible_lifelets().into_iter().next();
            Ok(())
        }
    }

    let failures = Arc::new(Mutex::new(0));
    let shared = Arc::clone(&failures);
    let mut races = RaceRegistry::new();
    races.register("Hoarder", "integration", move |_rng| {
        Box::new(Hoarder {
            kept: None,
            failures: Arc::clone(&shared),
        }) as Box<dyn Behavior>
    });
    let config = SimulationConfig {
        initial_lifelets: 2,
        dispersion_amount: 0.0,
        ..base_config()
    };
    let mut world = World::new(config, races).expect("world");
    for _ in 0..3 {
        world.simulate().expect("tick");
    }
    // Each lifelet sees the other every tick and reads a stale shell on ticks 2 and 3.
    assert_eq!(*failures.lock().expect("lock"), 4);
}

/// Health of the closest lifelet read through one shell before and after an
/// attack, next to a freshly captured shell of the same lifelet.
type StrikeLog = Arc<Mutex<Vec<(f64, Result<f64, LifeletError>, Option<f64>)>>>;

struct Striker(StrikeLog);

impl Behavior for Striker {
    fn decide(&mut self, ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
        let Some(target) = ctx.closest_visible() else {
            return Ok(());
        };
        let before = target.health(&*ctx)?;
        if ctx.attack(&target, 1.0)? == ActionOutcome::Performed {
            let after = target.health(&*ctx);
            let fresh = ctx
                .shell_of(target.id()?)
                .map(|shell| shell.health(&*ctx))
                .transpose()?;
            self.0.lock().expect("lock").push((before, after, fresh));
        }
        Ok(())
    }
}

fn strike_once(damage: f64) -> Vec<(f64, Result<f64, LifeletError>, Option<f64>)> {
    let log: StrikeLog = Arc::new(Mutex::new(Vec::new()));
    let shared = Arc::clone(&log);
    let mut races = RaceRegistry::new();
    races.register("Striker", "integration", move |_rng| {
        Box::new(Striker(Arc::clone(&shared))) as Box<dyn Behavior>
    });
    let config = SimulationConfig {
        initial_lifelets: 2,
        spawn_method: SpawnMethod::GroupedOnRing,
        dispersion_amount: 0.0,
        attack_damage: AttackDamage::Fixed(damage),
        ..base_config()
    };
    let mut world = World::new(config, races).expect("world");
    world.simulate().expect("tick");
    log.lock().expect("lock").clone()
}

#[test]
fn shells_read_damage_dealt_earlier_in_the_tick() {
    let strikes = strike_once(30.0);
    assert!(!strikes.is_empty());
    for (before, after, fresh) in strikes {
        let after = after.expect("target survives");
        assert!((before - after - 30.0).abs() < 1e-9, "{before} -> {after}");
        assert_eq!(fresh, Some(after));
    }
}

#[test]
fn shells_of_killed_targets_report_them_gone() {
    let strikes = strike_once(150.0);
    // The first striker kills the other before it gets a turn.
    assert_eq!(strikes.len(), 1);
    let (before, after, fresh) = &strikes[0];
    assert!(*before > 0.0);
    assert!(matches!(after, Err(LifeletError::TargetGone { .. })));
    assert_eq!(*fresh, None);
}

#[test]
fn food_is_picked_up_exactly_once() {
    let config = SimulationConfig {
        initial_lifelets: 2,
        dispersion_amount: 0.0,
        ..base_config()
    };
    let mut world = World::new(config, registry(&["A"], idle)).expect("world");
    let spot = world.lifelets().iter().next().map(|l| l.position()).expect("lifelet");
    assert!(world.lifelets().iter().all(|l| l.position() == spot));
    world.place_food(spot, 15.0);

    let report = world.simulate().expect("tick");
    assert_eq!(report.food_eaten, 1);
    assert!(world.food().is_empty());
    let mut energies: Vec<f64> = world.lifelets().iter().map(|l| l.energy()).collect();
    energies.sort_by(f64::total_cmp);
    assert!((energies[0] - 99.999).abs() < 1e-9);
    assert!((energies[1] - 114.999).abs() < 1e-9);
}

#[test]
fn unfunded_movement_is_not_committed() {
    let config = SimulationConfig {
        initial_lifelets: 1,
        initial_energy: 5.0,
        movement_energy_multiplier: 1.0,
        maximum_velocity: 10.0,
        ..base_config()
    };
    let races = registry(&["A"], || {
        Box::new(Push(Vector::new(10.0, 0.0))) as Box<dyn Behavior>
    });
    let mut world = World::new(config, races).expect("world");
    let start = world.lifelets().iter().next().map(|l| l.position()).expect("lifelet");

    world.simulate().expect("tick");
    let lifelet = world.lifelets().iter().next().expect("lifelet");
    assert_eq!(lifelet.velocity(), Vector::ZERO);
    assert_eq!(lifelet.position(), start);
    assert!((lifelet.energy() - (5.0 - 0.001)).abs() < 1e-9);
}

#[test]
fn funded_movement_is_clamped_and_paid() {
    let config = SimulationConfig {
        initial_lifelets: 1,
        ..base_config()
    };
    let races = registry(&["A"], || {
        Box::new(Push(Vector::new(0.0, 30.0))) as Box<dyn Behavior>
    });
    let mut world = World::new(config, races).expect("world");
    let start = world.lifelets().iter().next().map(|l| l.position()).expect("lifelet");

    world.simulate().expect("tick");
    let lifelet = world.lifelets().iter().next().expect("lifelet");
    assert_eq!(lifelet.velocity(), Vector::new(0.0, 3.0));
    assert_eq!(lifelet.position(), start + Vector::new(0.0, 3.0));
    assert!((lifelet.energy() - (100.0 - 0.001 - 0.3)).abs() < 1e-9);
}

#[test]
fn message_wavefront_becomes_audible() {
    struct Talker;

    impl Behavior for Talker {
        fn on_spawn(&mut self, ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
            assert_eq!(ctx.talk('a')?, ActionOutcome::Performed);
            Ok(())
        }

        fn decide(&mut self, _ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
            Ok(())
        }
    }

    struct Listener(Arc<Mutex<Vec<(u64, usize)>>>);

    impl Listener {
        fn record(&self, ctx: &LifeletContext<'_>) {
            let heard = ctx.audible_messages().len();
            self.0.lock().expect("lock").push((ctx.tick().0, heard));
        }
    }

    impl Behavior for Listener {
        fn on_spawn(&mut self, ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
            self.record(ctx);
            Ok(())
        }

        fn decide(&mut self, ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
            self.record(ctx);
            Ok(())
        }
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    let shared = Arc::clone(&log);
    let mut races = RaceRegistry::new();
    races.register("Talker", "integration", |_rng| Box::new(Talker) as Box<dyn Behavior>);
    races.register("Listener", "integration", move |_rng| {
        Box::new(Listener(Arc::clone(&shared))) as Box<dyn Behavior>
    });
    let config = SimulationConfig {
        initial_lifelets: 2,
        initial_spawn_radius: 45.0,
        dispersion_amount: 0.0,
        message_max_age_jitter: 0,
        ..base_config()
    };
    let mut world = World::new(config, races).expect("world");
    let message = world.messages().iter().next().expect("message");
    assert_eq!(message.content(), 'A');
    assert_eq!(message.radius(), 0.0);

    for _ in 0..10 {
        world.simulate().expect("tick");
    }
    let message = world.messages().iter().next().expect("message");
    assert!((message.radius() - 60.0).abs() < 1e-9);

    let log = log.lock().expect("lock");
    assert_eq!(log.first(), Some(&(0, 0)));
    assert_eq!(log.last(), Some(&(10, 1)));
    assert!(log.iter().filter(|(tick, _)| *tick <= 8).all(|(_, heard)| *heard == 0));
}

#[test]
fn survivors_always_end_the_tick_simulated() {
    let config = SimulationConfig {
        initial_lifelets: 60,
        dispersion_amount: 20.0,
        ..base_config()
    };
    let mut world = World::new(config.clone(), registry(&["A", "B", "C"], brawler))
        .expect("world");

    let mut total_deaths = 0;
    for _ in 0..200 {
        let before: HashSet<LifeletId> = world.lifelets().iter().map(|l| l.id()).collect();
        let report = world.simulate().expect("tick");
        total_deaths += report.deaths;
        for lifelet in world.lifelets().iter() {
            assert!(before.contains(&lifelet.id()));
            assert!(lifelet.is_alive());
            assert_eq!(lifelet.phase(), SimulationPhase::Simulated);
            assert!(lifelet.energy() >= config.minimum_energy);
            assert!(lifelet.health() > config.minimum_health);
        }
        assert_eq!(before.len() - world.lifelets().len(), report.deaths);
    }
    assert!(total_deaths > 0);
    assert_eq!(world.total_deaths(), total_deaths as u64);
}

#[test]
fn death_drops_remaining_energy_as_food() {
    let config = SimulationConfig {
        initial_lifelets: 5,
        natural_health_decrement: 500.0,
        food_pickup_radius: 0.0,
        ..base_config()
    };
    let mut world = World::new(config, registry(&["A"], idle)).expect("world");
    let report = world.simulate().expect("tick");
    assert_eq!(report.deaths, 5);
    assert!(world.lifelets().is_empty());
    assert_eq!(world.food().len(), 5);
    assert!(world
        .food()
        .iter()
        .all(|food| (food.energy() - 99.999).abs() < 1e-9));
}

#[test]
fn seeded_worlds_advance_deterministically() {
    let config = SimulationConfig {
        initial_lifelets: 30,
        ..base_config()
    };
    let run = || {
        let mut world = World::new(config.clone(), registry(&["A", "B"], brawler))
            .expect("world");
        let reports: Vec<_> = (0..100).map(|_| world.simulate().expect("tick")).collect();
        let positions: Vec<Vector> = world.lifelets().iter().map(|l| l.position()).collect();
        (reports, positions)
    };
    assert_eq!(run(), run());
}

#[test]
fn invalid_config_is_rejected() {
    let config = SimulationConfig {
        world_radius: -1.0,
        ..base_config()
    };
    let result = World::new(config, registry(&["A"], idle));
    assert!(matches!(result, Err(WorldError::InvalidConfig(_))));
}
