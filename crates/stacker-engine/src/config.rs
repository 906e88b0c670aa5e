//! Static game configuration.
//!
//! A [`GameConfig`] is deserialized once, checked with
//! [`GameConfig::validate`], and read-only afterwards. Every field has a
//! default, so an empty JSON object is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{
    CoordMapper, Grid, GridPos, Palette, ShapeTable, ShapeTableDefinition, ShapeTableError,
    WorldPos,
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("grid size {width}x{height} out of range 1..={}", Grid::MAX_DIMENSION)]
    GridSize {
        #[error(not(source))]
        width: usize,
        height: usize,
    },
    #[display("cell size [{}, {}] must be positive and finite", size.x, size.y)]
    CellSize {
        #[error(not(source))]
        size: WorldPos,
    },
    #[display("grid origin [{}, {}] must be finite", origin.x, origin.y)]
    Origin {
        #[error(not(source))]
        origin: WorldPos,
    },
    #[display("fall interval must be positive")]
    FallInterval,
    #[display("{name} must be a non-negative number, got {value}")]
    NegativeSetting {
        #[error(not(source))]
        name: &'static str,
        value: f32,
    },
    #[display("invalid shape table: {_0}")]
    Shapes(ShapeTableError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 20,
        }
    }
}

/// Exit-effect timing for removed cells.
///
/// The engine only validates these numbers; the presentation layer reads
/// them when it plays [`GameEvent::CellsRemoved`](crate::GameEvent).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DyingCellSettings {
    pub fade_ms: f32,
    pub jump_ms: f32,
    pub max_jump_x: f32,
    pub rotation_speed: f32,
    pub rotation_dampener: f32,
}

impl Default for DyingCellSettings {
    fn default() -> Self {
        Self {
            fade_ms: 400.0,
            jump_ms: 250.0,
            max_jump_x: 2.0,
            rotation_speed: 360.0,
            rotation_dampener: 0.9,
        }
    }
}

impl DyingCellSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        let settings = [
            ("dying_cell.fade_ms", self.fade_ms),
            ("dying_cell.jump_ms", self.jump_ms),
            ("dying_cell.max_jump_x", self.max_jump_x),
            ("dying_cell.rotation_speed", self.rotation_speed),
            ("dying_cell.rotation_dampener", self.rotation_dampener),
        ];
        for (name, value) in settings {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::NegativeSetting { name, value });
            }
        }
        Ok(())
    }
}

/// Complete configuration of a game.
///
/// # Example
///
/// ```
/// use stacker_engine::{GameConfig, GridPos};
///
/// let config = GameConfig::default();
/// config.validate().unwrap();
/// assert_eq!(config.spawn_anchor(), GridPos::new(3, 20));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    pub grid: GridConfig,
    pub cell_size: WorldPos,
    pub origin: WorldPos,
    /// Spawn anchor; derived from the grid size when absent.
    pub spawn: Option<GridPos>,
    pub slide_duration_ms: u64,
    pub fall_interval_ms: u64,
    pub palette: Palette,
    pub dying_cell: DyingCellSettings,
    /// Replacement shape table; the standard one is used when absent.
    pub shapes: Option<ShapeTableDefinition>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            cell_size: CoordMapper::UNIT.cell_size(),
            origin: CoordMapper::UNIT.origin(),
            spawn: None,
            slide_duration_ms: 80,
            fall_interval_ms: 500,
            palette: Palette::default(),
            dying_cell: DyingCellSettings::default(),
            shapes: None,
        }
    }
}

impl GameConfig {
    /// Checks every value the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let GridConfig { width, height } = self.grid;
        let dimension_ok = |n: usize| (1..=Grid::MAX_DIMENSION).contains(&n);
        if !dimension_ok(width) || !dimension_ok(height) {
            return Err(ConfigError::GridSize { width, height });
        }
        let size = self.cell_size;
        if !(size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0) {
            return Err(ConfigError::CellSize { size });
        }
        let origin = self.origin;
        if !(origin.x.is_finite() && origin.y.is_finite()) {
            return Err(ConfigError::Origin { origin });
        }
        if self.fall_interval_ms == 0 {
            return Err(ConfigError::FallInterval);
        }
        self.dying_cell.validate()?;
        self.shape_table()?;
        Ok(())
    }

    #[must_use]
    pub fn mapper(&self) -> CoordMapper {
        CoordMapper::new(self.cell_size, self.origin)
    }

    /// Builds the configured grid with its coordinate mapper.
    ///
    /// # Panics
    ///
    /// Panics if the grid size is invalid; call [`Self::validate`] first.
    #[must_use]
    pub fn build_grid(&self) -> Grid {
        Grid::new(self.grid.width, self.grid.height).with_mapper(self.mapper())
    }

    /// Returns the configured shape table, or the standard one.
    pub fn shape_table(&self) -> Result<ShapeTable, ConfigError> {
        match &self.shapes {
            Some(definition) => ShapeTable::from_definition(definition).map_err(ConfigError::Shapes),
            None => Ok(ShapeTable::STANDARD),
        }
    }

    /// Anchor new pieces are placed at.
    ///
    /// Defaults to `(width / 2 - 2, height)`: the top edge of the spawn
    /// bounding box sits one row above the grid, which puts a flat I piece
    /// on the top row.
    #[must_use]
    pub fn spawn_anchor(&self) -> GridPos {
        self.spawn
            .unwrap_or_else(|| default_spawn_anchor(self.grid.width, self.grid.height))
    }

    #[must_use]
    pub fn slide_duration(&self) -> Duration {
        Duration::from_millis(self.slide_duration_ms)
    }

    #[must_use]
    pub fn fall_interval(&self) -> Duration {
        Duration::from_millis(self.fall_interval_ms)
    }
}

pub(crate) fn default_spawn_anchor(width: usize, height: usize) -> GridPos {
    let to_i32 = |n: usize| i32::try_from(n).unwrap_or(i32::MAX);
    GridPos::new(to_i32(width / 2) - 2, to_i32(height))
}
