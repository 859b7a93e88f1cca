/// Tunable constants, loadable from TOML.
///
/// Every section falls back to its defaults field by field, so a config file
/// only needs to mention what it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest grid a config may ask for.
pub const MAX_ALIENS: usize = 1024;
pub const MAX_BULLETS: usize = 256;
/// Longest tick, in seconds.
pub const MAX_DT: f32 = 1.0;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub field: FieldConfig,
    pub ship: ShipConfig,
    pub formation: FormationConfig,
    pub bullets: BulletConfig,
    pub clock: ClockConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    pub width: f32,
    pub height: f32,
    /// Distance from the bottom of the field to the top of the ship.
    pub bottom_offset: f32,
    /// Units moved per tick while a direction key is held.
    pub step: f32,
    pub margin: f32,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            width: 40.0,
            height: 20.0,
            bottom_offset: 30.0,
            step: 5.0,
            margin: 20.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    pub rows: usize,
    pub cols: usize,
    pub origin_x: f32,
    pub origin_y: f32,
    pub alien_width: f32,
    pub alien_height: f32,
    pub spacing_x: f32,
    pub spacing_y: f32,
    /// Horizontal speed in units/sec shared by the whole formation.
    pub velocity: f32,
    /// An alien whose x drops below this counts as touching the left edge.
    pub left_margin: f32,
    /// How far the formation descends each time it bounces off an edge.
    pub drop_step: f32,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 8,
            origin_x: 100.0,
            origin_y: 50.0,
            alien_width: 40.0,
            alien_height: 40.0,
            spacing_x: 20.0,
            spacing_y: 20.0,
            velocity: 250.0,
            left_margin: 30.0,
            drop_step: 20.0,
        }
    }
}

impl FormationConfig {
    /// Canonical top-left corner of the alien at `(row, col)`.
    pub fn slot_origin(&self, row: usize, col: usize) -> (f32, f32) {
        (
            self.origin_x + col as f32 * (self.alien_width + self.spacing_x),
            self.origin_y + row as f32 * (self.alien_height + self.spacing_y),
        )
    }

    pub fn alien_count(&self) -> usize {
        self.rows * self.cols
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    pub capacity: usize,
    /// Upward speed in units/sec.
    pub speed: f32,
    pub width: f32,
    pub height: f32,
    /// Side length of the square footprint a retired bullet shrinks to.
    pub retired_size: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            speed: 300.0,
            width: 5.0,
            height: 10.0,
            retired_size: 5.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Seconds simulated per tick.
    pub dt: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { dt: 0.016 }
    }
}

// ── Loading & validation ──────────────────────────────────────────────────────

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("field.width", self.field.width)?;
        positive("field.height", self.field.height)?;

        positive("ship.width", self.ship.width)?;
        positive("ship.height", self.ship.height)?;
        positive("ship.step", self.ship.step)?;
        non_negative("ship.margin", self.ship.margin)?;
        if self.ship.width + 2.0 * self.ship.margin > self.field.width {
            return Err(invalid("ship.width", "ship and margins do not fit in the field"));
        }

        let f = &self.formation;
        nonzero("formation.rows", f.rows)?;
        nonzero("formation.cols", f.cols)?;
        match f.rows.checked_mul(f.cols) {
            Some(n) if n <= MAX_ALIENS => {}
            _ => {
                return Err(invalid(
                    "formation.rows",
                    &format!("rows * cols must not exceed {MAX_ALIENS}"),
                ))
            }
        }
        positive("formation.alien_width", f.alien_width)?;
        positive("formation.alien_height", f.alien_height)?;
        non_negative("formation.spacing_x", f.spacing_x)?;
        non_negative("formation.spacing_y", f.spacing_y)?;
        positive("formation.velocity", f.velocity)?;
        non_negative("formation.drop_step", f.drop_step)?;
        let (last_x, _) = f.slot_origin(0, f.cols - 1);
        if f.origin_x < f.left_margin || last_x + f.alien_width > self.field.width {
            return Err(invalid("formation.cols", "grid does not fit between the edges"));
        }

        nonzero("bullets.capacity", self.bullets.capacity)?;
        if self.bullets.capacity > MAX_BULLETS {
            return Err(invalid(
                "bullets.capacity",
                &format!("must not exceed {MAX_BULLETS}"),
            ));
        }
        positive("bullets.speed", self.bullets.speed)?;
        positive("bullets.width", self.bullets.width)?;
        positive("bullets.height", self.bullets.height)?;
        positive("bullets.retired_size", self.bullets.retired_size)?;

        positive("clock.dt", self.clock.dt)?;
        if self.clock.dt > MAX_DT {
            return Err(invalid("clock.dt", &format!("must not exceed {MAX_DT} seconds")));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be positive, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("must not be negative, got {value}")))
    }
}

fn nonzero(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(invalid(field, "must be at least 1"))
    }
}
