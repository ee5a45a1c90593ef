//! Fixed timestep simulation tick
//!
//! Core loop step that advances fill level, waves and rotation in order and
//! snapshots the result.

use super::fill::FillLevelController;
use super::frame::{FillLabel, FrameState, Style};
use super::state::{Dimensions, ScrollDirection, TiltSample};
use super::tilt::{TiltOutcome, TiltRotationController};
use super::wave::WaveField;
use crate::{SimError, Settings};

/// Host inputs for a single tick
#[derive(Debug, Clone, Copy)]
pub struct TickInput {
    /// Surface currently visible; hidden empties the level
    pub visible: bool,
    /// Latest tilt reading since the previous tick
    pub tilt: Option<TiltSample>,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            visible: true,
            tilt: None,
        }
    }
}

/// Output of one tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub frame: FrameState,
    /// A commanded level was reached this tick
    pub animation_ended: bool,
}

/// The whole simulation for one container
#[derive(Debug, Clone)]
pub struct Simulation {
    dims: Dimensions,
    fill: FillLevelController,
    wave: WaveField,
    tilt: TiltRotationController,
    style: Style,
    ticks: u64,
}

impl Simulation {
    pub fn new(dims: Dimensions) -> Self {
        Self::with_parts(dims, WaveField::new(&dims), Style::default())
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, SimError> {
        let dims = settings.dimensions()?;
        let wave = WaveField::with_speed(&dims, settings.wave_speed()?);
        Ok(Self::with_parts(dims, wave, settings.style()))
    }

    fn with_parts(dims: Dimensions, wave: WaveField, style: Style) -> Self {
        log::info!(
            "Simulation {}x{} (wave length {}, {} segment slots)",
            dims.container_width,
            dims.container_height,
            dims.wave_length,
            dims.segment_capacity()
        );
        Self {
            dims,
            fill: FillLevelController::new(),
            wave,
            tilt: TiltRotationController::new(),
            style,
            ticks: 0,
        }
    }

    /// Animate to `fraction` (rise from empty, then settle). Rotation eases back upright.
    pub fn command_animated(&mut self, fraction: f32) -> Result<(), SimError> {
        self.fill.command_animated(fraction)?;
        self.tilt.reset_target();
        Ok(())
    }

    pub fn command_immediate(&mut self, fraction: f32) -> Result<(), SimError> {
        self.fill.command_immediate(fraction)
    }

    pub fn command_correctness(&mut self, correct: bool) {
        self.fill.command_correctness(correct);
    }

    /// Scroll direction until the next tilt reading decides otherwise
    pub fn set_direction_hint(&mut self, direction: ScrollDirection) {
        self.wave.set_direction(direction);
    }

    pub fn set_show_tips(&mut self, show: bool) {
        self.style.show_tips = show;
    }

    pub fn set_water_color(&mut self, color: u32) {
        self.style.water_color = color;
    }

    pub fn set_background_color(&mut self, color: u32) {
        self.style.background_color = color;
    }

    /// Apply a tilt reading; direction and splash go to the wave field
    pub fn on_tilt_sample(&mut self, sample: TiltSample) -> TiltOutcome {
        let outcome = self
            .tilt
            .on_sample(sample, self.fill.is_settled(), self.wave.amplitude());
        if let TiltOutcome::Applied {
            direction, splash, ..
        } = outcome
        {
            self.wave.set_direction(direction);
            if let Some(amplitude) = splash {
                self.wave.splash(amplitude);
            }
        }
        outcome
    }

    /// Advance one tick
    pub fn tick(&mut self, input: &TickInput) -> TickReport {
        if let Some(sample) = input.tilt {
            self.on_tilt_sample(sample);
        }

        let fill = self.fill.tick(input.visible);
        if fill.moving {
            self.wave.refresh();
        }

        self.wave.tick();

        if self.fill.is_settled() {
            self.tilt.tick();
        }

        self.ticks += 1;

        TickReport {
            frame: self.frame(),
            animation_ended: fill.animation_ended,
        }
    }

    /// Snapshot of the current state
    pub fn frame(&self) -> FrameState {
        let current = self.fill.current();
        FrameState {
            tick: self.ticks,
            dimensions: self.dims,
            fill: current,
            baseline: self.dims.baseline_for(current),
            rotation_deg: self.tilt.current_angle(),
            amplitude: self.wave.amplitude(),
            anchors: self.wave.anchors().to_vec(),
            label: FillLabel::new(
                current,
                self.fill.is_correct(),
                &self.dims,
                &self.style.no_data_label,
            ),
            show_tips: self.style.show_tips,
            water_color: self.style.water_color,
            background_color: self.style.background_color,
        }
    }

    /// Bring the level to rest before teardown
    pub fn park(&mut self) {
        self.fill.park();
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dims
    }

    pub fn fill(&self) -> &FillLevelController {
        &self.fill
    }

    pub fn wave(&self) -> &WaveField {
        &self.wave
    }

    pub fn tilt(&self) -> &TiltRotationController {
        &self.tilt
    }

    pub fn show_tips(&self) -> bool {
        self.style.show_tips
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
