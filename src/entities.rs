/// All game entity types — pure data, no logic beyond geometry.
///
/// Coordinates are playfield units.  `(x, y)` is the top-left corner of an
/// entity's bounding box and y grows downward, so "up" is negative.

use crate::formation::Formation;
use crate::pool::BulletPool;

// ── Geometry ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Strict overlap: boxes that only touch along an edge do not collide.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

// ── Status ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    /// Terminal.  Nothing moves and shooting is disabled.
    GameOver,
}

// ── Player & aliens ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Ship {
    pub bounds: Bounds,
    /// Distance moved per tick while a direction is held.
    pub step: f32,
    /// Gap kept between the ship and either side of the field.
    pub margin: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Alien {
    pub bounds: Bounds,
    pub active: bool,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub bounds: Bounds,
    pub active: bool,
    /// Vertical velocity in units/sec (negative = upward).
    pub vy: f32,
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// One tick's worth of player intent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    /// Edge-triggered: true only on the tick the fire key went down.
    pub shoot: bool,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// Running totals.  Purely informational; nothing in the simulation reads them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub wave: u32,
    pub aliens_destroyed: u32,
    pub waves_cleared: u32,
    pub waves_breached: u32,
    pub ticks: u64,
}

/// Everything one game owns.  Passed by `&mut` into each component so several
/// sessions can run side by side.
#[derive(Clone, Debug)]
pub struct GameSession {
    pub ship: Ship,
    pub formation: Formation,
    pub bullets: BulletPool,
    pub status: GameStatus,
    pub stats: SessionStats,
    pub width: f32,
    pub height: f32,
}
