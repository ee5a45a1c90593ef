//! Water Bottle - animated liquid surface inside a tilting container
//!
//! Core modules:
//! - `sim`: Fixed-tick simulation (fill level, waves, tilt rotation)
//! - `clock`: Simulation thread, command handle, tilt mailbox
//! - `platform`: Host abstractions (tilt source, render target, time, visibility)
//! - `renderer`: Scene geometry and a text rasteriser built from `FrameState`
//! - `settings`: JSON configuration

pub mod clock;
pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use clock::{SimulationClock, SimulationHandle, TiltSink};
pub use error::SimError;
pub use settings::Settings;

/// Simulation constants
pub mod consts {
    /// Fixed tick period in milliseconds
    pub const TICK_MS: u64 = 30;

    /// Ticks for the rise-in animation (0 -> full)
    pub const RISE_TICKS: f32 = 30.0;
    /// Ticks for a commanded rise/fall (900 ms / 30 ms)
    pub const LEVEL_TICKS: f32 = 30.0;
    /// Ticks spent at full before the rise-in animation completes
    pub const SETTLE_DELAY_TICKS: u32 = 20;

    /// Amplitude loses 1/AMPLITUDE_DECAY of itself each tick
    pub const AMPLITUDE_DECAY: f32 = 30.0;
    /// Default horizontal wave speed (pixels per tick)
    pub const WAVE_SPEED: f32 = 10.0;

    /// Minimum interval between processed tilt samples
    pub const ROTATE_PERIOD_MS: u64 = 300;
    /// Smoothing divisor for rotation (300 ms / 30 ms)
    pub const ROTATE_TICKS: f32 = 10.0;
    /// Angular gap above which smoothing goes the other way round
    pub const WRAP_THRESHOLD_DEG: f32 = 200.0;

    /// Tilt readings inside this box on both axes are treated as level
    pub const TILT_DEAD_ZONE: f32 = 3.0;
    /// A splash only happens when the wave is calmer than this
    pub const SPLASH_MAX_AMPLITUDE: f32 = 3.0;
    /// Minimum angle jump (degrees) that splashes
    pub const SPLASH_MIN_DELTA_DEG: f32 = 20.0;
    /// Amplitude gained per degree of jump
    pub const SPLASH_GAIN: f32 = 20.0;

    /// Ratio of wave length to container width
    pub const WAVES_PER_WIDTH: f32 = 5.0;
}

/// Round half-up to `places` decimals (`floor(x * 10^n + 0.5) / 10^n`).
#[inline]
pub fn round_half_up(value: f32, places: i32) -> f32 {
    let scale = 10f32.powi(places);
    (value * scale + 0.5).floor() / scale
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if a >= 360.0 { 0.0 } else { a }
}
