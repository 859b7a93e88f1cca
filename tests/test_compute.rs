use formation_shooter::collision::{AabbDetector, Overlap};
use formation_shooter::compute::*;
use formation_shooter::config::{FormationConfig, GameConfig};
use formation_shooter::engine::{NoticeBoard, ScriptedInput};
use formation_shooter::entities::*;
use formation_shooter::formation::{AlienId, Formation};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DT: f32 = 0.016;

const IDLE: FrameInput = FrameInput {
    left: false,
    right: false,
    shoot: false,
};
const SHOOT: FrameInput = FrameInput {
    left: false,
    right: false,
    shoot: true,
};
const LEFT: FrameInput = FrameInput {
    left: true,
    right: false,
    shoot: false,
};
const RIGHT: FrameInput = FrameInput {
    left: false,
    right: true,
    shoot: false,
};

/// A session plus the collaborators `tick` needs.
struct Harness {
    session: GameSession,
    detector: AabbDetector,
    notices: NoticeBoard,
    overlaps: Vec<Overlap>,
}

impl Harness {
    fn new() -> Self {
        Self {
            session: init_session(&GameConfig::default()),
            detector: AabbDetector,
            notices: NoticeBoard::default(),
            overlaps: Vec::new(),
        }
    }

    fn step(&mut self, input: FrameInput) -> TickReport {
        tick(
            &mut self.session,
            input,
            DT,
            &mut self.detector,
            &mut self.notices,
            &mut self.overlaps,
        )
    }
}

fn alien_positions(session: &GameSession) -> Vec<Bounds> {
    session.formation.aliens().iter().map(|a| a.bounds).collect()
}

fn bullet_positions(session: &GameSession) -> Vec<Bounds> {
    session.bullets.active().map(|(_, b)| b.bounds).collect()
}

/// Park the ship where alien 0 will be after one tick.
fn put_ship_under_first_alien(session: &mut GameSession) {
    session.ship.bounds = Bounds::new(100.0, 80.0, 40.0, 20.0);
}

// ── init_session ──────────────────────────────────────────────────────────────

#[test]
fn init_session_ship_position() {
    let s = init_session(&GameConfig::default());
    assert_eq!(s.ship.bounds, Bounds::new(380.0, 570.0, 40.0, 20.0));
}

#[test]
fn init_session_full_grid_and_empty_pool() {
    let s = init_session(&GameConfig::default());
    assert_eq!(s.formation.active_count(), 24);
    assert_eq!(s.bullets.active_count(), 0);
    assert_eq!(s.bullets.capacity(), 10);
    assert_eq!(s.status, GameStatus::Playing);
    assert_eq!(s.stats.wave, 1);
    assert_eq!(s.stats.ticks, 0);
    assert_eq!((s.width, s.height), (800.0, 600.0));
}

// ── Ship movement ─────────────────────────────────────────────────────────────

#[test]
fn move_left_normal() {
    let mut s = init_session(&GameConfig::default());
    move_ship_left(&mut s);
    assert_eq!(s.ship.bounds.x, 375.0);
}

#[test]
fn move_left_clamps_at_margin() {
    let mut s = init_session(&GameConfig::default());
    s.ship.bounds.x = 22.0;
    move_ship_left(&mut s);
    assert_eq!(s.ship.bounds.x, 20.0);
    move_ship_left(&mut s);
    assert_eq!(s.ship.bounds.x, 20.0);
}

#[test]
fn move_right_normal() {
    let mut s = init_session(&GameConfig::default());
    move_ship_right(&mut s);
    assert_eq!(s.ship.bounds.x, 385.0);
}

#[test]
fn move_right_clamps_at_width_minus_ship_and_margin() {
    let mut s = init_session(&GameConfig::default());
    s.ship.bounds.x = 738.0;
    move_ship_right(&mut s);
    assert_eq!(s.ship.bounds.x, 740.0);
    move_ship_right(&mut s);
    assert_eq!(s.ship.bounds.x, 740.0);
}

#[test]
fn tick_left_wins_over_right() {
    let mut h = Harness::new();
    h.step(FrameInput {
        left: true,
        right: true,
        shoot: false,
    });
    assert_eq!(h.session.ship.bounds.x, 375.0);
}

#[test]
fn tick_applies_single_direction() {
    let mut h = Harness::new();
    h.step(RIGHT);
    h.step(RIGHT);
    assert_eq!(h.session.ship.bounds.x, 390.0);
    h.step(LEFT);
    assert_eq!(h.session.ship.bounds.x, 385.0);
}

// ── Shooting ──────────────────────────────────────────────────────────────────

#[test]
fn shoot_spawns_bullet_at_muzzle() {
    let mut s = init_session(&GameConfig::default());
    let id = ship_shoot(&mut s).unwrap();
    let b = s.bullets.get(id).unwrap();
    // centred on the ship (380 + 20 - 2.5), nose just above it (570 - 10)
    assert_eq!((b.bounds.x, b.bounds.y), (397.5, 560.0));
}

#[test]
fn tick_shot_moves_in_same_tick() {
    let mut h = Harness::new();
    let report = h.step(SHOOT);
    let id = report.shot.expect("empty pool must fire");
    let y = h.session.bullets.get(id).unwrap().bounds.y;
    assert!((y - (560.0 - 300.0 * DT)).abs() < 1e-3);
}

#[test]
fn eleven_shots_in_one_tick_leave_ten_active() {
    let mut s = init_session(&GameConfig::default());
    let shots: Vec<_> = (0..11).map(|_| ship_shoot(&mut s)).collect();
    assert!(shots[..10].iter().all(Option::is_some));
    assert!(shots[10].is_none());
    assert_eq!(s.bullets.active_count(), 10);
}

#[test]
fn held_fire_is_limited_by_pool() {
    let mut h = Harness::new();
    // A bullet needs ~118 ticks to leave the field; 20 straight shots
    // exhaust the pool long before any slot frees up.
    let fired = (0..20).filter(|_| h.step(SHOOT).shot.is_some()).count();
    assert_eq!(fired, 10);
    assert_eq!(h.session.bullets.active_count(), 10);
}

// ── Formation via tick ────────────────────────────────────────────────────────

#[test]
fn idle_ticks_flip_formation_once_at_right_edge() {
    let mut h = Harness::new();
    // 4 units per tick: the right column's edge goes 560 → 804 on tick 61.
    let flips = (0..61).filter(|_| h.step(IDLE).edge_flip).count();
    assert_eq!(flips, 1);
    assert_eq!(h.session.formation.aliens()[0].bounds.y, 70.0);
}

#[test]
fn tick_counts_ticks() {
    let mut h = Harness::new();
    for _ in 0..5 {
        h.step(IDLE);
    }
    assert_eq!(h.session.stats.ticks, 5);
}

// ── Collisions via tick ───────────────────────────────────────────────────────

#[test]
fn bullet_destroys_alien_during_tick() {
    let mut h = Harness::new();
    // Alien 0 will be at x 104..144, y 50..90; the bullet rises into it.
    let id = h.session.bullets.acquire(110.0, 80.0).unwrap();
    let report = h.step(IDLE);
    assert_eq!(report.hits, 1);
    assert!(!h.session.bullets.is_live(id));
    assert!(!h.session.formation.is_active(AlienId(0)));
    assert_eq!(h.session.formation.active_count(), 23);
    assert_eq!(h.session.stats.aliens_destroyed, 1);
}

// ── Wave reset ────────────────────────────────────────────────────────────────

#[test]
fn shooting_last_alien_clears_wave() {
    let mut h = Harness::new();
    for i in 1..24 {
        h.session.formation.deactivate(AlienId(i));
    }
    h.session.bullets.acquire(110.0, 80.0).unwrap();

    let report = h.step(IDLE);

    assert_eq!(report.hits, 1);
    assert_eq!(report.wave_reset, Some(WaveOutcome::Cleared));
    assert_eq!(h.session.formation.active_count(), 24);
    assert_eq!(h.session.formation.aliens()[0].bounds.x, 100.0);
    assert_eq!(h.session.stats.waves_cleared, 1);
    assert_eq!(h.session.stats.wave, 2);
}

#[test]
fn alien_past_bottom_breaches_wave() {
    let mut h = Harness::new();
    let low = FormationConfig {
        rows: 1,
        cols: 2,
        origin_y: 605.0,
        ..FormationConfig::default()
    };
    h.session.formation = Formation::new(low, 800.0);

    let report = h.step(IDLE);

    assert_eq!(report.wave_reset, Some(WaveOutcome::Breached));
    assert_eq!(h.session.stats.waves_breached, 1);
    assert_eq!(h.session.stats.waves_cleared, 0);
    assert_eq!(h.session.formation.active_count(), 2);
    assert_eq!(h.session.formation.aliens()[0].bounds.y, 605.0);
}

#[test]
fn no_reset_while_wave_in_progress() {
    let mut h = Harness::new();
    for _ in 0..30 {
        assert_eq!(h.step(IDLE).wave_reset, None);
    }
    assert_eq!(h.session.stats.wave, 1);
}

#[test]
fn bullets_in_flight_survive_wave_reset() {
    let mut h = Harness::new();
    for i in 0..24 {
        h.session.formation.deactivate(AlienId(i));
    }
    let stray = h.session.bullets.acquire(700.0, 500.0).unwrap();
    assert_eq!(h.step(IDLE).wave_reset, Some(WaveOutcome::Cleared));
    assert!(h.session.bullets.is_live(stray));
}

// ── Game over ─────────────────────────────────────────────────────────────────

#[test]
fn alien_reaching_ship_ends_game_once() {
    let mut h = Harness::new();
    put_ship_under_first_alien(&mut h.session);

    let report = h.step(IDLE);

    assert!(report.game_over);
    assert_eq!(h.session.status, GameStatus::GameOver);
    assert_eq!(h.notices.notices().len(), 1);
    let notice = h.notices.latest().unwrap();
    assert_eq!(notice.text, GAME_OVER_TEXT);
    assert_eq!((notice.x, notice.y), (400.0, 300.0));
}

#[test]
fn game_over_freezes_world() {
    let mut h = Harness::new();
    h.session.bullets.acquire(700.0, 400.0).unwrap();
    put_ship_under_first_alien(&mut h.session);
    h.step(IDLE);

    let ship = h.session.ship.bounds;
    let aliens = alien_positions(&h.session);
    let bullets = bullet_positions(&h.session);
    let ticks = h.session.stats.ticks;

    for input in [LEFT, RIGHT, SHOOT, IDLE] {
        let report = h.step(input);
        assert_eq!(report, TickReport::default());
    }

    assert_eq!(h.session.ship.bounds, ship);
    assert_eq!(alien_positions(&h.session), aliens);
    assert_eq!(bullet_positions(&h.session), bullets);
    assert_eq!(h.session.stats.ticks, ticks);
    assert_eq!(h.notices.notices().len(), 1);
}

#[test]
fn shooting_disabled_after_game_over() {
    let mut s = init_session(&GameConfig::default());
    s.status = GameStatus::GameOver;
    assert!(ship_shoot(&mut s).is_none());
    assert_eq!(s.bullets.active_count(), 0);
}

#[test]
fn game_over_tick_skips_wave_reset() {
    let mut h = Harness::new();
    for i in 1..24 {
        h.session.formation.deactivate(AlienId(i));
    }
    put_ship_under_first_alien(&mut h.session);
    let report = h.step(IDLE);
    assert!(report.game_over);
    assert_eq!(report.wave_reset, None);
    assert_eq!(h.session.formation.active_count(), 1);
}

// ── Coordinator ───────────────────────────────────────────────────────────────

#[test]
fn coordinator_replays_script_then_idles() {
    let script = ScriptedInput::new([SHOOT, LEFT, LEFT]);
    let mut game = Coordinator::new(
        &GameConfig::default(),
        script,
        AabbDetector,
        NoticeBoard::default(),
    );

    assert!(game.tick(DT).shot.is_some());
    game.tick(DT);
    game.tick(DT);
    assert_eq!(game.input().remaining(), 0);
    assert_eq!(game.session().ship.bounds.x, 370.0);

    game.tick(DT);
    assert_eq!(game.session().ship.bounds.x, 370.0);
    assert!(!game.is_over());

    game.input_mut().push(RIGHT);
    assert_eq!(game.input().remaining(), 1);
    game.tick(DT);
    assert_eq!(game.input().remaining(), 0);
    assert_eq!(game.session().ship.bounds.x, 375.0);
}

#[test]
fn coordinator_reports_game_over_through_notifier() {
    let mut game = Coordinator::new(
        &GameConfig::default(),
        ScriptedInput::default(),
        AabbDetector,
        NoticeBoard::default(),
    );
    put_ship_under_first_alien(game.session_mut());
    assert!(game.tick(DT).game_over);
    assert!(game.is_over());
    assert_eq!(game.notifier().notices().len(), 1);
}

#[test]
fn identical_scripts_give_identical_sessions() {
    let mut rng = StdRng::seed_from_u64(7);
    let script: Vec<FrameInput> = (0..600)
        .map(|_| FrameInput {
            left: rng.gen_bool(0.3),
            right: rng.gen_bool(0.3),
            shoot: rng.gen_bool(0.1),
        })
        .collect();

    let run = |script: Vec<FrameInput>| {
        let mut game = Coordinator::new(
            &GameConfig::default(),
            ScriptedInput::new(script),
            AabbDetector,
            NoticeBoard::default(),
        );
        for _ in 0..600 {
            game.tick(DT);
        }
        let s = game.session();
        (
            s.ship.bounds,
            alien_positions(s),
            bullet_positions(s),
            s.status,
            s.stats.clone(),
        )
    };

    assert_eq!(run(script.clone()), run(script));
}

// ── Randomised invariants ─────────────────────────────────────────────────────

#[test]
fn random_play_never_exceeds_pool_and_freezes_after_game_over() {
    for seed in 0..8u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut h = Harness::new();
        let mut frozen: Option<(Bounds, Vec<Bounds>, Vec<Bounds>)> = None;

        for _ in 0..4000 {
            let input = FrameInput {
                left: rng.gen_bool(0.4),
                right: rng.gen_bool(0.4),
                shoot: rng.gen_bool(0.2),
            };
            let report = h.step(input);

            assert!(h.session.bullets.active_count() <= h.session.bullets.capacity());

            assert!(h.session.formation.active_count() <= 24);
            // A cleared wave is rebuilt within the same tick.
            if h.session.status == GameStatus::Playing {
                assert!(!h.session.formation.is_cleared());
            }

            match (&frozen, h.session.status) {
                (None, GameStatus::GameOver) => {
                    assert!(report.game_over);
                    frozen = Some((
                        h.session.ship.bounds,
                        alien_positions(&h.session),
                        bullet_positions(&h.session),
                    ));
                }
                (Some((ship, aliens, bullets)), GameStatus::GameOver) => {
                    assert!(!report.game_over);
                    assert_eq!(h.session.ship.bounds, *ship);
                    assert_eq!(&alien_positions(&h.session), aliens);
                    assert_eq!(&bullet_positions(&h.session), bullets);
                }
                (_, GameStatus::Playing) => assert!(frozen.is_none()),
            }
        }
        assert!(h.notices.notices().len() <= 1);
    }
}
