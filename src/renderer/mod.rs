//! Rendering helpers
//!
//! Turns a `FrameState` into drawable geometry; pixel backends live with the host.

pub mod ascii;
pub mod shapes;

pub use shapes::{Paint, QuadCurve, Rect, WaterScene};
