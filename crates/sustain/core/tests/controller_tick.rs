use glam::Vec3;
use sustain_core::{
    ActionId, ActionSpec, Actor, ActorId, CommitmentTransition, Controller, Decision, Env,
    InFlightAction, PhaseProfile, ReleaseReason, Role, SceneSnapshot, SustainConfig, TickSnapshot,
};

const ME: ActorId = ActorId(0);
const MEND: ActionId = ActionId(1);
const CHANNEL: ActionId = ActionId(2);
const EXPENSIVE: ActionId = ActionId(3);
const PATH: ActionId = ActionId(4);

fn catalog() -> Vec<ActionSpec> {
    vec![
        ActionSpec::instant(MEND, "mend", 50.0).with_cost(20.0),
        ActionSpec::multi_phase(CHANNEL, "channel", PhaseProfile::uniform(4, 1.0)),
        ActionSpec::instant(EXPENSIVE, "greater mend", 120.0).with_cost(500.0),
        ActionSpec::positional(PATH, "stride", 20.0),
    ]
}

fn me() -> Actor {
    Actor::new(ME, Role::Myself, Vec3::ZERO, 100.0)
}

fn actor(id: u32, role: Role, position: Vec3, health: f32) -> Actor {
    Actor::new(ActorId(id), role, position, 100.0).with_health(health)
}

#[test]
fn instant_skips_unknown_and_unaffordable_candidates() {
    let mut controller = Controller::new(SustainConfig::default());
    let catalog = catalog();
    let scene = SceneSnapshot::new();
    let env = Env::with_all(&scene, &catalog);

    let actors = vec![
        me(),
        actor(2, Role::Damage, Vec3::new(5.0, 0.0, 0.0), 50.0),
        actor(3, Role::Tank, Vec3::new(10.0, 0.0, 0.0), 20.0),
    ];
    let options = [ActionId(99), EXPENSIVE, MEND];
    let snapshot = TickSnapshot::new(0.0, ME, Vec3::ZERO, &actors)
        .with_mana(100.0)
        .with_options(&options);

    assert_eq!(
        controller.tick(&snapshot, &env),
        Decision::StartInstant {
            action: MEND,
            target: ActorId(3)
        }
    );
}

#[test]
fn healthy_group_yields_no_action() {
    let mut controller = Controller::new(SustainConfig::default());
    let catalog = catalog();
    let scene = SceneSnapshot::new();
    let env = Env::with_all(&scene, &catalog);

    let actors = vec![me(), actor(2, Role::Tank, Vec3::X, 100.0)];
    let options = [MEND, CHANNEL, PATH];
    let snapshot = TickSnapshot::new(0.0, ME, Vec3::ZERO, &actors).with_options(&options);

    assert_eq!(controller.tick(&snapshot, &env), Decision::NoAction);
}

#[test]
fn channel_escalates_to_fixed_rank_then_releases() {
    let mut controller = Controller::new(SustainConfig::default());
    let catalog = catalog();
    let scene = SceneSnapshot::new();
    let env = Env::with_all(&scene, &catalog).into_sustain_env();

    let actors: Vec<Actor> = (1..=4)
        .map(|id| actor(id, Role::Damage, Vec3::new(id as f32, 0.0, 0.0), 35.0))
        .collect();
    let options = [CHANNEL];
    let start = TickSnapshot::new(0.0, ME, Vec3::ZERO, &actors).with_options(&options);

    assert_eq!(
        controller.tick(&start, &env),
        Decision::StartMultiPhase {
            action: CHANNEL,
            target: Some(ActorId(1)),
            rank: 4
        }
    );

    let in_flight = InFlightAction {
        action: CHANNEL,
        target: Some(ActorId(1)),
        remaining: 4.0,
    };
    for now in [0.1, 1.0, 2.0, 2.5] {
        let tick = TickSnapshot::new(now, ME, Vec3::ZERO, &actors).with_in_flight(in_flight);
        assert_eq!(controller.tick(&tick, &env), Decision::NoAction);
        assert_eq!(controller.commitment().current().map(|c| c.target_rank()), Some(4));
    }

    let done = TickSnapshot::new(3.0, ME, Vec3::ZERO, &actors).with_in_flight(in_flight);
    assert_eq!(controller.tick(&done, &env), Decision::ReleaseCurrent);
    assert_eq!(
        controller.commitment().last_transition(),
        Some(CommitmentTransition::Released {
            action: CHANNEL,
            phase: 4,
            reason: ReleaseReason::RankReached
        })
    );
}

#[test]
fn channel_releases_early_on_new_emergency() {
    let mut controller = Controller::new(SustainConfig::default());
    let catalog = catalog();
    let scene = SceneSnapshot::new();
    let env = Env::with_all(&scene, &catalog);

    let mut actors: Vec<Actor> = (1..=4)
        .map(|id| actor(id, Role::Damage, Vec3::new(id as f32, 0.0, 0.0), 35.0))
        .collect();
    let options = [CHANNEL];
    let start = TickSnapshot::new(0.0, ME, Vec3::ZERO, &actors).with_options(&options);
    assert!(matches!(
        controller.tick(&start, &env),
        Decision::StartMultiPhase { rank: 4, .. }
    ));

    let in_flight = InFlightAction {
        action: CHANNEL,
        target: Some(ActorId(1)),
        remaining: 4.0,
    };
    let confirm = TickSnapshot::new(0.1, ME, Vec3::ZERO, &actors).with_in_flight(in_flight);
    assert_eq!(controller.tick(&confirm, &env), Decision::NoAction);

    actors[3].health = 10.0;
    let crisis = TickSnapshot::new(1.5, ME, Vec3::ZERO, &actors).with_in_flight(in_flight);
    assert_eq!(controller.tick(&crisis, &env), Decision::ReleaseCurrent);
    assert_eq!(
        controller.commitment().last_transition(),
        Some(CommitmentTransition::Released {
            action: CHANNEL,
            phase: 2,
            reason: ReleaseReason::NewEmergency(ActorId(4))
        })
    );
}

#[test]
fn emergency_and_forced_rank_shape_the_channel() {
    let catalog = catalog();
    let scene = SceneSnapshot::new();
    let env = Env::with_all(&scene, &catalog);
    let options = [CHANNEL];

    let actors = vec![
        actor(1, Role::Damage, Vec3::X, 10.0),
        actor(2, Role::Damage, Vec3::X, 40.0),
    ];
    let mut controller = Controller::new(SustainConfig::default());
    let snapshot = TickSnapshot::new(0.0, ME, Vec3::ZERO, &actors).with_options(&options);
    assert!(matches!(
        controller.tick(&snapshot, &env),
        Decision::StartMultiPhase { rank: 1, .. }
    ));

    let mut controller = Controller::new(SustainConfig::default());
    let forced = snapshot.with_forced_rank(3);
    assert!(matches!(
        controller.tick(&forced, &env),
        Decision::StartMultiPhase { rank: 3, .. }
    ));
}

#[test]
fn overhealing_in_flight_action_is_aborted() {
    let mut controller = Controller::new(SustainConfig::default());
    let catalog = catalog();
    let scene = SceneSnapshot::new();
    let env = Env::with_all(&scene, &catalog);

    let actors = vec![
        actor(1, Role::Damage, Vec3::X, 90.0),
        actor(2, Role::Damage, Vec3::Z, 40.0),
    ];
    let in_flight = InFlightAction {
        action: MEND,
        target: Some(ActorId(1)),
        remaining: 1.0,
    };
    let snapshot = TickSnapshot::new(0.0, ME, Vec3::ZERO, &actors).with_in_flight(in_flight);
    assert_eq!(controller.tick(&snapshot, &env), Decision::AbortCurrent);

    let landing = TickSnapshot::new(0.1, ME, Vec3::ZERO, &actors).with_in_flight(InFlightAction {
        remaining: 0.1,
        ..in_flight
    });
    assert_eq!(controller.tick(&landing, &env), Decision::NoAction);
}

#[test]
fn only_new_emergencies_interrupt() {
    let mut controller = Controller::new(SustainConfig::default());
    let catalog = catalog();
    let scene = SceneSnapshot::new();
    let env = Env::with_all(&scene, &catalog);

    let mut actors = vec![
        actor(1, Role::Damage, Vec3::X, 50.0),
        actor(2, Role::Damage, Vec3::Z, 20.0),
        actor(3, Role::Damage, Vec3::Y, 80.0),
    ];
    let in_flight = InFlightAction {
        action: MEND,
        target: Some(ActorId(1)),
        remaining: 1.5,
    };
    let first = TickSnapshot::new(0.0, ME, Vec3::ZERO, &actors).with_in_flight(in_flight);
    assert_eq!(controller.tick(&first, &env), Decision::NoAction);

    actors[2].health = 15.0;
    let second = TickSnapshot::new(0.5, ME, Vec3::ZERO, &actors).with_in_flight(in_flight);
    assert_eq!(controller.tick(&second, &env), Decision::AbortCurrent);
}

#[test]
fn positional_action_targets_best_path() {
    let mut config = SustainConfig::default();
    config.path.min_coverage = 2;
    let mut controller = Controller::new(config);
    let catalog = catalog();
    let scene = SceneSnapshot::new();
    let env = Env::with_all(&scene, &catalog);

    let actors = vec![
        me(),
        actor(1, Role::Damage, Vec3::new(4.0, 0.0, 0.0), 90.0),
        actor(2, Role::Damage, Vec3::new(8.0, 0.0, 0.0), 90.0),
        actor(3, Role::Damage, Vec3::new(12.0, 0.0, 0.0), 90.0),
        actor(4, Role::Damage, Vec3::new(0.0, 0.0, 4.0), 20.0),
        actor(5, Role::Damage, Vec3::new(0.0, 0.0, 9.0), 20.0),
    ];
    let options = [PATH];
    let snapshot = TickSnapshot::new(0.0, ME, Vec3::ZERO, &actors).with_options(&options);

    match controller.tick(&snapshot, &env) {
        Decision::StartPath { action, terminal } => {
            assert_eq!(action, PATH);
            assert!(terminal.x.abs() < 1e-4);
            assert!((terminal.z - 10.0).abs() < 1e-4);
        }
        other => panic!("expected a path, got {other:?}"),
    }
}
