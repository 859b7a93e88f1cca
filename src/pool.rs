/// Fixed-capacity bullet storage.
///
/// Every slot is allocated when the pool is built.  Firing claims the first
/// free slot; a bullet that leaves the top of the field, or hits something,
/// just goes inactive and waits to be claimed again.  Running out of slots is
/// how the fire rate is limited.

use tracing::trace;

use crate::config::BulletConfig;
use crate::entities::{Bounds, Bullet};

/// Handle to a fired bullet.  The generation changes every time the slot is
/// reused, so a handle kept past its bullet's retirement goes stale instead of
/// aliasing the next shot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BulletId {
    pub index: usize,
    pub generation: u32,
}

#[derive(Clone, Debug)]
struct Slot {
    bullet: Bullet,
    generation: u32,
}

#[derive(Clone, Debug)]
pub struct BulletPool {
    slots: Vec<Slot>,
    speed: f32,
    width: f32,
    height: f32,
    retired_size: f32,
}

impl BulletPool {
    pub fn new(config: &BulletConfig) -> Self {
        let idle = Bullet {
            bounds: Bounds::new(0.0, 0.0, config.retired_size, config.retired_size),
            active: false,
            vy: 0.0,
        };
        Self {
            slots: vec![
                Slot {
                    bullet: idle,
                    generation: 0,
                };
                config.capacity
            ],
            speed: config.speed,
            width: config.width,
            height: config.height,
            retired_size: config.retired_size,
        }
    }

    /// Launch a bullet from `(x, y)`.  `None` when every slot is in flight;
    /// nothing already flying is disturbed.
    pub fn acquire(&mut self, x: f32, y: f32) -> Option<BulletId> {
        let Some(index) = self.slots.iter().position(|s| !s.bullet.active) else {
            trace!(capacity = self.slots.len(), "bullet pool exhausted");
            return None;
        };
        let slot = &mut self.slots[index];
        slot.generation = slot.generation.wrapping_add(1);
        slot.bullet = Bullet {
            bounds: Bounds::new(x, y, self.width, self.height),
            active: true,
            vy: -self.speed,
        };
        Some(BulletId {
            index,
            generation: slot.generation,
        })
    }

    /// Move every live bullet and retire the ones that crossed the top edge.
    pub fn advance(&mut self, dt: f32) {
        let retired_size = self.retired_size;
        for slot in self.slots.iter_mut().filter(|s| s.bullet.active) {
            let bullet = &mut slot.bullet;
            bullet.bounds.y += bullet.vy * dt;
            if bullet.bounds.y < 0.0 {
                retire(bullet, retired_size);
            }
        }
    }

    /// Return a live bullet to the pool.  Stale or idle handles are ignored.
    pub fn release(&mut self, id: BulletId) -> bool {
        let retired_size = self.retired_size;
        match self.slot_mut(id) {
            Some(slot) => {
                retire(&mut slot.bullet, retired_size);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: BulletId) -> Option<&Bullet> {
        self.slots
            .get(id.index)
            .filter(|s| s.generation == id.generation && s.bullet.active)
            .map(|s| &s.bullet)
    }

    pub fn is_live(&self, id: BulletId) -> bool {
        self.get(id).is_some()
    }

    fn slot_mut(&mut self, id: BulletId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.index)
            .filter(|s| s.generation == id.generation && s.bullet.active)
    }

    pub fn active(&self) -> impl Iterator<Item = (BulletId, &Bullet)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.bullet.active)
            .map(|(index, s)| {
                (
                    BulletId {
                        index,
                        generation: s.generation,
                    },
                    &s.bullet,
                )
            })
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.bullet.active).count()
    }

    pub fn free_count(&self) -> usize {
        self.capacity() - self.active_count()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Launch width and height of a bullet.
    pub fn bullet_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}

fn retire(bullet: &mut Bullet, size: f32) {
    bullet.active = false;
    bullet.vy = 0.0;
    bullet.bounds.width = size;
    bullet.bounds.height = size;
}
