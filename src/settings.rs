//! Bottle settings
//!
//! Geometry, wave speed, tick rate and styling, stored as JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::SimError;
use crate::consts::{TICK_MS, WAVE_SPEED};
use crate::sim::frame::{
    DEFAULT_BACKGROUND_COLOR, DEFAULT_NO_DATA_LABEL, DEFAULT_WATER_COLOR, Style,
};
use crate::sim::Dimensions;

/// Bottle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Geometry ===
    /// Container width in pixels
    pub container_width: f32,
    /// Container height in pixels
    pub container_height: f32,
    /// Largest wave height in pixels
    pub max_amplitude: f32,
    /// Drawing surface width (the water body extends to it)
    pub surface_width: f32,
    /// Drawing surface height (also sizes the wave anchor array)
    pub surface_height: f32,

    // === Motion ===
    /// Horizontal wave speed in pixels per tick
    pub wave_speed: f32,
    /// Tick period in milliseconds
    pub tick_period_ms: u64,

    // === Style ===
    /// Water colour (ARGB)
    pub water_color: u32,
    /// Background colour (ARGB)
    pub background_color: u32,
    /// Label shown when the level is not calibrated
    pub no_data_label: String,
    /// Show the "tap the bottle" tips overlay
    pub show_tips: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            container_width: 240.0,
            container_height: 400.0,
            max_amplitude: 12.0,
            surface_width: 480.0,
            surface_height: 800.0,

            wave_speed: WAVE_SPEED,
            tick_period_ms: TICK_MS,

            water_color: DEFAULT_WATER_COLOR,
            background_color: DEFAULT_BACKGROUND_COLOR,
            no_data_label: DEFAULT_NO_DATA_LABEL.to_string(),
            show_tips: false,
        }
    }
}

impl Settings {
    /// Validated container geometry
    pub fn dimensions(&self) -> Result<Dimensions, SimError> {
        Dimensions::new(
            self.container_width,
            self.container_height,
            self.max_amplitude,
            self.surface_width,
            self.surface_height,
        )
    }

    /// Scroll distance per tick; any finite non-negative value
    pub fn wave_speed(&self) -> Result<f32, SimError> {
        if self.wave_speed.is_finite() && self.wave_speed >= 0.0 {
            Ok(self.wave_speed)
        } else {
            Err(SimError::InvalidWaveSpeed(self.wave_speed))
        }
    }

    /// Styling carried through to every frame
    pub fn style(&self) -> Style {
        Style {
            water_color: self.water_color,
            background_color: self.background_color,
            no_data_label: self.no_data_label.clone(),
            show_tips: self.show_tips,
        }
    }

    /// Tick period, never below one millisecond
    pub fn tick_period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_period_ms.max(1))
    }

    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.dimensions()?;
        settings.wave_speed()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings ({}: {e})", path.display());
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON (via a temp file, then rename)
    pub fn save(&self, path: &Path) -> Result<(), SimError> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, self.to_json()?)?;
        fs::rename(&tmp, path)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
