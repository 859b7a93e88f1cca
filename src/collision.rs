/// Collision policy.
///
/// Detection is the host's job (see `OverlapDetector`); this module decides
/// what an overlap means.  A bullet and an alien that touch both disappear.
/// An alien that touches the ship ends the game.

use crate::engine::OverlapDetector;
use crate::entities::Ship;
use crate::formation::{AlienId, Formation};
use crate::pool::{BulletId, BulletPool};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlap {
    BulletAlien(BulletId, AlienId),
    AlienShip(AlienId),
}

/// What a batch of overlaps did to the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Bullet↔alien pairs that actually removed an alien.
    pub hits: u32,
    pub ship_struck: bool,
}

/// Apply `overlaps` in order.  A pair is skipped when either side was already
/// removed, so one bullet never takes out two aliens and a destroyed alien
/// cannot reach the ship.
pub fn resolve(
    overlaps: impl IntoIterator<Item = Overlap>,
    formation: &mut Formation,
    bullets: &mut BulletPool,
) -> Resolution {
    let mut resolution = Resolution::default();
    for overlap in overlaps {
        match overlap {
            Overlap::BulletAlien(bullet, alien) => {
                if bullets.is_live(bullet) && formation.is_active(alien) {
                    bullets.release(bullet);
                    formation.deactivate(alien);
                    resolution.hits += 1;
                }
            }
            Overlap::AlienShip(alien) => {
                if formation.is_active(alien) {
                    resolution.ship_struck = true;
                }
            }
        }
    }
    resolution
}

// ── Default detector ──────────────────────────────────────────────────────────

/// Brute-force axis-aligned box test.  The entity counts are tiny, so there is
/// no broad phase.
#[derive(Clone, Copy, Debug, Default)]
pub struct AabbDetector;

impl AabbDetector {
    /// Lazily yield every overlap: bullet↔alien pairs in slot order, then
    /// alien↔ship pairs in grid order.
    pub fn pairs<'a>(
        ship: &'a Ship,
        formation: &'a Formation,
        bullets: &'a BulletPool,
    ) -> impl Iterator<Item = Overlap> + 'a {
        let bullet_hits = bullets.active().flat_map(move |(bullet_id, bullet)| {
            formation
                .active()
                .filter(move |(_, alien)| bullet.bounds.overlaps(&alien.bounds))
                .map(move |(alien_id, _)| Overlap::BulletAlien(bullet_id, alien_id))
        });
        let ship_hits = formation
            .active()
            .filter(move |(_, alien)| alien.bounds.overlaps(&ship.bounds))
            .map(|(alien_id, _)| Overlap::AlienShip(alien_id));
        bullet_hits.chain(ship_hits)
    }
}

impl OverlapDetector for AabbDetector {
    fn detect(
        &mut self,
        ship: &Ship,
        formation: &Formation,
        bullets: &BulletPool,
        out: &mut Vec<Overlap>,
    ) {
        out.extend(Self::pairs(ship, formation, bullets));
    }
}
