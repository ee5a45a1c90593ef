//! Shared simulation types
//!
//! Container geometry, tilt samples and the scroll direction shared between
//! tilt input and the wave field.

use serde::{Deserialize, Serialize};

use crate::SimError;
use crate::consts::WAVES_PER_WIDTH;

/// Horizontal scroll direction of the wave train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScrollDirection {
    /// Device tilted right (x > 0): anchors move left
    #[default]
    Forward,
    /// Device tilted left: anchors move right
    Reverse,
}

/// One accelerometer reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TiltSample {
    pub x: f32,
    pub y: f32,
    /// Monotonic timestamp in milliseconds
    pub time_ms: u64,
}

impl TiltSample {
    pub fn new(x: f32, y: f32, time_ms: u64) -> Self {
        Self { x, y, time_ms }
    }

    /// Magnitude of the (x, y) acceleration
    #[inline]
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// NaN, infinite or zero-magnitude samples carry no direction
    pub fn is_malformed(&self) -> bool {
        !self.x.is_finite() || !self.y.is_finite() || self.magnitude() <= f32::EPSILON
    }
}

/// Container geometry, fixed for the lifetime of a simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub container_width: f32,
    pub container_height: f32,
    /// Baseline offset when the container is full (half the height)
    pub full_line_offset: f32,
    /// Length of one crest (or one trough)
    pub wave_length: f32,
    pub max_amplitude: f32,
    /// Size of the whole drawing surface (the water body extends to it)
    pub surface_width: f32,
    pub surface_height: f32,
}

impl Dimensions {
    pub fn new(
        container_width: f32,
        container_height: f32,
        max_amplitude: f32,
        surface_width: f32,
        surface_height: f32,
    ) -> Result<Self, SimError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(container_width) || !positive(container_height) {
            return Err(SimError::InvalidDimensions(format!(
                "container must be positive, got {container_width}x{container_height}"
            )));
        }
        if !max_amplitude.is_finite() || max_amplitude < 0.0 {
            return Err(SimError::InvalidDimensions(format!(
                "max amplitude must be >= 0, got {max_amplitude}"
            )));
        }
        if !positive(surface_width) || !positive(surface_height) {
            return Err(SimError::InvalidDimensions(format!(
                "surface must be positive, got {surface_width}x{surface_height}"
            )));
        }

        let dims = Self {
            container_width,
            container_height,
            full_line_offset: container_height / 2.0,
            wave_length: container_width / WAVES_PER_WIDTH,
            max_amplitude,
            surface_width,
            surface_height,
        };

        if dims.segment_capacity() == 0 {
            return Err(SimError::InvalidDimensions(format!(
                "surface height {surface_height} holds no wave segment of period {}",
                dims.wave_period()
            )));
        }
        Ok(dims)
    }

    /// One crest plus one trough
    #[inline]
    pub fn wave_period(&self) -> f32 {
        self.wave_length * 2.0
    }

    /// Number of anchor slots: floor(surface_height / (2 * wave_length))
    pub fn segment_capacity(&self) -> usize {
        (self.surface_height / self.wave_period()).floor() as usize
    }

    /// Baseline height for a fill fraction
    #[inline]
    pub fn baseline_for(&self, fraction: f32) -> f32 {
        self.container_height - (self.container_height - self.full_line_offset) * fraction
    }
}
