/// Per-tick game logic.
///
/// Every function takes the `GameSession` by `&mut` and touches nothing else;
/// the host's services arrive as trait objects or generics.  Given the same
/// inputs and `dt`, a tick is fully deterministic.

use tracing::info;

use crate::collision::{self, AabbDetector, Overlap};
use crate::config::GameConfig;
use crate::engine::{InputSource, Notice, Notifier, OverlapDetector};
use crate::entities::{Bounds, FrameInput, GameSession, GameStatus, SessionStats, Ship};
use crate::formation::Formation;
use crate::pool::{BulletId, BulletPool};

pub const GAME_OVER_TEXT: &str = "Game Over";

/// Why the grid was rebuilt.  Both outcomes rebuild the same grid; only the
/// bookkeeping differs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaveOutcome {
    /// Every alien was shot down.
    Cleared,
    /// An alien sank past the bottom of the field.
    Breached,
}

/// What happened during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub shot: Option<BulletId>,
    pub edge_flip: bool,
    pub hits: u32,
    pub wave_reset: Option<WaveOutcome>,
    pub game_over: bool,
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build a fresh session: ship centred near the bottom, full grid, empty pool.
pub fn init_session(config: &GameConfig) -> GameSession {
    let field = &config.field;
    let ship = Ship {
        bounds: Bounds::new(
            (field.width - config.ship.width) / 2.0,
            field.height - config.ship.bottom_offset,
            config.ship.width,
            config.ship.height,
        ),
        step: config.ship.step,
        margin: config.ship.margin,
    };
    GameSession {
        ship,
        formation: Formation::new(config.formation.clone(), field.width),
        bullets: BulletPool::new(&config.bullets),
        status: GameStatus::Playing,
        stats: SessionStats {
            wave: 1,
            ..SessionStats::default()
        },
        width: field.width,
        height: field.height,
    }
}

// ── Input-driven state transitions ──────────────────────────────────────────

pub fn move_ship_left(session: &mut GameSession) {
    let ship = &mut session.ship;
    ship.bounds.x = (ship.bounds.x - ship.step).max(ship.margin);
}

pub fn move_ship_right(session: &mut GameSession) {
    let limit = session.width - session.ship.bounds.width - session.ship.margin;
    let ship = &mut session.ship;
    ship.bounds.x = (ship.bounds.x + ship.step).min(limit);
}

/// Fire from the ship's nose.  `None` once the game is over or when every
/// bullet is already in flight.
pub fn ship_shoot(session: &mut GameSession) -> Option<BulletId> {
    if session.status == GameStatus::GameOver {
        return None;
    }
    let (width, height) = session.bullets.bullet_size();
    let ship = &session.ship.bounds;
    let x = ship.x + ship.width / 2.0 - width / 2.0;
    let y = ship.y - height;
    session.bullets.acquire(x, y)
}

// ── Per-frame tick ──────────────────────────────────────────────────────────

/// Advance the simulation by `dt` seconds.
///
/// `overlaps` is scratch space for the detector; it is cleared on entry and
/// left holding this tick's pairs.
pub fn tick(
    session: &mut GameSession,
    input: FrameInput,
    dt: f32,
    detector: &mut impl OverlapDetector,
    notifier: &mut impl Notifier,
    overlaps: &mut Vec<Overlap>,
) -> TickReport {
    let mut report = TickReport::default();
    if session.status == GameStatus::GameOver {
        return report;
    }
    session.stats.ticks += 1;

    // ── 1. Ship ──────────────────────────────────────────────────────────────
    if input.left {
        move_ship_left(session);
    } else if input.right {
        move_ship_right(session);
    }

    // ── 2. Fire ──────────────────────────────────────────────────────────────
    if input.shoot {
        report.shot = ship_shoot(session);
    }

    // ── 3–4. Movement ────────────────────────────────────────────────────────
    report.edge_flip = session.formation.advance(dt);
    session.bullets.advance(dt);

    // ── 5. Collisions ────────────────────────────────────────────────────────
    overlaps.clear();
    detector.detect(&session.ship, &session.formation, &session.bullets, overlaps);
    let resolution = collision::resolve(
        overlaps.iter().copied(),
        &mut session.formation,
        &mut session.bullets,
    );
    report.hits = resolution.hits;
    session.stats.aliens_destroyed += resolution.hits;

    if resolution.ship_struck {
        end_game(session, notifier);
        report.game_over = true;
        return report;
    }

    // ── 6. Wave reset ────────────────────────────────────────────────────────
    let outcome = if session.formation.passed_bottom(session.height) {
        Some(WaveOutcome::Breached)
    } else if session.formation.is_cleared() {
        Some(WaveOutcome::Cleared)
    } else {
        None
    };
    if let Some(outcome) = outcome {
        match outcome {
            WaveOutcome::Cleared => session.stats.waves_cleared += 1,
            WaveOutcome::Breached => session.stats.waves_breached += 1,
        }
        session.formation.reset();
        session.stats.wave += 1;
        info!(?outcome, wave = session.stats.wave, "formation reset");
        report.wave_reset = Some(outcome);
    }

    report
}

/// Latch the terminal state.  Only the first call has any effect.
fn end_game(session: &mut GameSession, notifier: &mut impl Notifier) {
    if session.status == GameStatus::GameOver {
        return;
    }
    session.status = GameStatus::GameOver;
    info!(
        ticks = session.stats.ticks,
        destroyed = session.stats.aliens_destroyed,
        "alien reached the ship, game over"
    );
    notifier.notify(Notice {
        x: session.width / 2.0,
        y: session.height / 2.0,
        text: GAME_OVER_TEXT.to_string(),
    });
}

// ── Coordinator ──────────────────────────────────────────────────────────────

/// A session bundled with the host services it runs against.
pub struct Coordinator<I, D = AabbDetector, N = crate::engine::NoticeBoard> {
    session: GameSession,
    input: I,
    detector: D,
    notifier: N,
    overlaps: Vec<Overlap>,
}

impl<I, D, N> Coordinator<I, D, N>
where
    I: InputSource,
    D: OverlapDetector,
    N: Notifier,
{
    pub fn new(config: &GameConfig, input: I, detector: D, notifier: N) -> Self {
        let session = init_session(config);
        // Worst case: every bullet touches every alien, and every alien the ship.
        let worst = session.bullets.capacity() * config.formation.alien_count()
            + config.formation.alien_count();
        Self {
            session,
            input,
            detector,
            notifier,
            overlaps: Vec::with_capacity(worst),
        }
    }

    /// Poll input and run one tick.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let input = self.input.poll();
        tick(
            &mut self.session,
            input,
            dt,
            &mut self.detector,
            &mut self.notifier,
            &mut self.overlaps,
        )
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn is_over(&self) -> bool {
        self.session.status == GameStatus::GameOver
    }
}
