use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::geometry::{Dimensions, Position};

pub const DEBOUNCE_ENV_VAR: &str = "PIXELMED_DEBOUNCE_MS";
pub const STEP_CELLS_ENV_VAR: &str = "PIXELMED_STEP_CELLS";
pub const SCALE_ENV_VAR: &str = "PIXELMED_SCALE";

const DEFAULT_DEBOUNCE_WINDOW_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub walkable: Dimensions,
    pub scale: i32,
    pub cell_size_px: i32,
    pub step_cells: i32,
    pub debounce_window_ms: u64,
    pub initial_position: Position,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            walkable: Dimensions::new(960, 640),
            scale: 2,
            cell_size_px: 16,
            step_cells: 2,
            debounce_window_ms: DEFAULT_DEBOUNCE_WINDOW_MS,
            initial_position: Position::new(480, 576),
        }
    }
}

impl EngineConfig {
    /// Copy with scale, cell size and step count clamped to at least 1.
    pub fn normalized(&self) -> Self {
        Self {
            scale: self.scale.max(1),
            cell_size_px: self.cell_size_px.max(1),
            step_cells: self.step_cells.max(1),
            ..self.clone()
        }
    }

    pub fn step_px(&self) -> i32 {
        self.cell_size_px
            .max(1)
            .saturating_mul(self.step_cells.max(1))
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_window_ms)
    }

    /// Applies `PIXELMED_*` overrides read through `lookup`. Values that do not
    /// parse are skipped with a warning.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ms) = parse_override::<u64, _>(&lookup, DEBOUNCE_ENV_VAR) {
            self.debounce_window_ms = ms;
        }
        if let Some(cells) = parse_override::<i32, _>(&lookup, STEP_CELLS_ENV_VAR) {
            if cells >= 1 {
                self.step_cells = cells;
            } else {
                warn!(var = STEP_CELLS_ENV_VAR, value = cells, "config_override_ignored");
            }
        }
        if let Some(scale) = parse_override::<i32, _>(&lookup, SCALE_ENV_VAR) {
            if scale >= 1 {
                self.scale = scale;
            } else {
                warn!(var = SCALE_ENV_VAR, value = scale, "config_override_ignored");
            }
        }
        self
    }

    pub fn from_process_env() -> Self {
        let config = Self::default().with_env_overrides(|var| std::env::var(var).ok());
        info!(
            walkable_width = config.walkable.width,
            walkable_height = config.walkable.height,
            scale = config.scale,
            step_px = config.step_px(),
            debounce_window_ms = config.debounce_window_ms,
            "engine_config"
        );
        config
    }
}

fn parse_override<T, F>(lookup: &F, var: &'static str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(var)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var, value = %raw, "config_override_invalid");
            None
        }
    }
}
