//! Scrolling wave train
//!
//! The surface is a row of periods, each one crest followed by one trough,
//! starting at a lead anchor in (-2λ, 0]. Anchors are stored with an explicit
//! active count; slots past it are stale.

use super::state::{Dimensions, ScrollDirection};
use crate::consts::{AMPLITUDE_DECAY, WAVE_SPEED};

#[derive(Debug, Clone)]
pub struct WaveField {
    /// Current wave height, in [0, max_amplitude]
    amplitude: f32,
    max_amplitude: f32,
    /// Written by tilt input, read by the scroll
    direction: ScrollDirection,
    /// Anchor x positions; only `active` are meaningful
    anchors: Vec<f32>,
    active: usize,
    /// Horizontal distance per tick
    speed: f32,
    period: f32,
    container_width: f32,
}

impl WaveField {
    pub fn new(dims: &Dimensions) -> Self {
        Self::with_speed(dims, WAVE_SPEED)
    }

    /// Negative or non-finite speeds fall back to the default
    pub fn with_speed(dims: &Dimensions, speed: f32) -> Self {
        let speed = if speed.is_finite() && speed >= 0.0 {
            speed
        } else {
            log::warn!("Wave speed {speed} unusable, using {WAVE_SPEED}");
            WAVE_SPEED
        };
        let mut field = Self {
            amplitude: 0.0,
            max_amplitude: dims.max_amplitude,
            direction: ScrollDirection::default(),
            anchors: vec![0.0; dims.segment_capacity()],
            active: 0,
            speed,
            period: dims.wave_period(),
            container_width: dims.container_width,
        };
        field.layout(0.0);
        field
    }

    /// Advance one tick: scroll and decay while there is any amplitude
    pub fn tick(&mut self) {
        if self.amplitude <= 0.0 || self.anchors.is_empty() {
            return;
        }

        let lead = match self.direction {
            ScrollDirection::Forward => self.anchors[0] - self.speed,
            ScrollDirection::Reverse => self.anchors[0] + self.speed,
        };
        self.layout(self.wrap_lead(lead));

        self.amplitude -= self.amplitude / AMPLITUDE_DECAY;
    }

    /// Bring a lead position back into (-period, 0], however far it moved
    fn wrap_lead(&self, lead: f32) -> f32 {
        let r = lead.rem_euclid(self.period);
        if r == 0.0 { 0.0 } else { r - self.period }
    }

    /// Place anchors at lead + k * period while they still reach into the container
    fn layout(&mut self, lead: f32) {
        let mut point = lead;
        let mut count = 0;
        for slot in self.anchors.iter_mut() {
            if point - self.period >= self.container_width {
                break;
            }
            *slot = point;
            point += self.period;
            count += 1;
        }
        self.active = count;
    }

    /// Hold the wave at full height (level in motion)
    pub fn refresh(&mut self) {
        self.amplitude = self.max_amplitude;
    }

    /// Kick the wave to `amplitude`, capped at the maximum
    pub fn splash(&mut self, amplitude: f32) {
        self.amplitude = amplitude.clamp(0.0, self.max_amplitude);
    }

    pub fn set_direction(&mut self, direction: ScrollDirection) {
        self.direction = direction;
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn max_amplitude(&self) -> f32 {
        self.max_amplitude
    }

    /// Active anchors, lead first
    pub fn anchors(&self) -> &[f32] {
        &self.anchors[..self.active]
    }

    pub fn lead_anchor(&self) -> f32 {
        self.anchors.first().copied().unwrap_or(0.0)
    }

    pub fn capacity(&self) -> usize {
        self.anchors.len()
    }
}
