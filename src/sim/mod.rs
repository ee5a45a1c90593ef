//! Deterministic simulation module
//!
//! All liquid behaviour lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - No threads, clocks or rendering dependencies
//! - Time enters only through tilt sample timestamps

pub mod fill;
pub mod frame;
pub mod state;
pub mod tick;
pub mod tilt;
pub mod wave;

pub use fill::{FillLevelController, FillTick};
pub use frame::{FillLabel, FrameState, LabelKind, Style};
pub use state::{Dimensions, ScrollDirection, TiltSample};
pub use tick::{Simulation, TickInput, TickReport};
pub use tilt::{TiltOutcome, TiltRotationController, tilt_angle};
pub use wave::WaveField;
