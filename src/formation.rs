/// The alien grid: layout, shared sweep, edge bounce and wave reset.
///
/// All active aliens share one direction and one speed.  `advance` moves
/// everyone first, then checks the edges, then reacts once, so a bounce is a
/// single global event rather than a cascade of per-alien reactions.

use tracing::debug;

use crate::config::FormationConfig;
use crate::entities::{Alien, Bounds};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Index of an alien within the current grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AlienId(pub usize);

#[derive(Clone, Debug)]
pub struct Formation {
    aliens: Vec<Alien>,
    direction: Direction,
    velocity: f32,
    layout: FormationConfig,
    field_width: f32,
}

impl Formation {
    /// Build the full grid, every alien active, sweeping right.
    pub fn new(layout: FormationConfig, field_width: f32) -> Self {
        let mut formation = Self {
            aliens: Vec::with_capacity(layout.alien_count()),
            direction: Direction::Right,
            velocity: layout.velocity,
            layout,
            field_width,
        };
        formation.populate();
        formation
    }

    fn populate(&mut self) {
        let layout = &self.layout;
        for row in 0..layout.rows {
            for col in 0..layout.cols {
                let (x, y) = layout.slot_origin(row, col);
                self.aliens.push(Alien {
                    bounds: Bounds::new(x, y, layout.alien_width, layout.alien_height),
                    active: true,
                });
            }
        }
    }

    // ── Per-tick movement ─────────────────────────────────────────────────────

    /// Sweep the formation sideways by `dt` seconds.  Returns `true` when an
    /// edge was touched, in which case the direction has flipped and every
    /// active alien has dropped by `drop_step`.
    pub fn advance(&mut self, dt: f32) -> bool {
        let dx = self.direction.sign() * self.velocity * dt;
        for alien in self.aliens.iter_mut().filter(|a| a.active) {
            alien.bounds.x += dx;
        }

        let left = self.layout.left_margin;
        let right = self.field_width;
        let hit_edge = self
            .active()
            .any(|(_, a)| a.bounds.x < left || a.bounds.right() > right);
        if !hit_edge {
            return false;
        }

        self.direction = self.direction.flipped();
        let drop = self.layout.drop_step;
        for alien in self.aliens.iter_mut().filter(|a| a.active) {
            alien.bounds.y += drop;
        }
        debug!(direction = ?self.direction, "formation hit an edge");
        true
    }

    /// Throw away the current grid and lay out a fresh one at the canonical
    /// start positions.  Direction and speed carry over.
    pub fn reset(&mut self) {
        self.aliens.clear();
        self.populate();
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// Any active alien has sunk past the bottom of a field `field_height` tall.
    pub fn passed_bottom(&self, field_height: f32) -> bool {
        self.active().any(|(_, a)| a.bounds.y > field_height)
    }

    pub fn is_cleared(&self) -> bool {
        self.active_count() == 0
    }

    /// Remove one alien from the wave.  Returns `false` if it was already gone.
    pub fn deactivate(&mut self, id: AlienId) -> bool {
        match self.aliens.get_mut(id.0) {
            Some(alien) if alien.active => {
                alien.active = false;
                true
            }
            _ => false,
        }
    }

    pub fn is_active(&self, id: AlienId) -> bool {
        self.aliens.get(id.0).is_some_and(|a| a.active)
    }

    pub fn active(&self) -> impl Iterator<Item = (AlienId, &Alien)> + '_ {
        self.aliens
            .iter()
            .enumerate()
            .filter(|(_, a)| a.active)
            .map(|(i, a)| (AlienId(i), a))
    }

    pub fn active_count(&self) -> usize {
        self.aliens.iter().filter(|a| a.active).count()
    }

    pub fn aliens(&self) -> &[Alien] {
        &self.aliens
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: f32) {
        self.velocity = velocity;
    }

    pub fn layout(&self) -> &FormationConfig {
        &self.layout
    }
}
