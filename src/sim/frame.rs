//! Per-tick snapshot handed to the renderer

use serde::{Deserialize, Serialize};

use super::state::Dimensions;
use crate::round_half_up;

/// Default water colour (ARGB)
pub const DEFAULT_WATER_COLOR: u32 = 0xFF3F_A9F5;
/// Default background colour (ARGB)
pub const DEFAULT_BACKGROUND_COLOR: u32 = 0xFF10_2A43;
/// Label shown when the level is not calibrated
pub const DEFAULT_NO_DATA_LABEL: &str = "No data";

/// Pass-through styling; not simulated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub water_color: u32,
    pub background_color: u32,
    pub no_data_label: String,
    pub show_tips: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            water_color: DEFAULT_WATER_COLOR,
            background_color: DEFAULT_BACKGROUND_COLOR,
            no_data_label: DEFAULT_NO_DATA_LABEL.to_string(),
            show_tips: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelKind {
    Percent(u32),
    NoData,
}

/// Text drawn over the container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillLabel {
    pub kind: LabelKind,
    pub text: String,
    pub font_size: f32,
}

impl FillLabel {
    /// Percentage of `fraction` (clamped to [0, 1]) or the placeholder when uncalibrated
    pub fn new(fraction: f32, correct: bool, dims: &Dimensions, no_data: &str) -> Self {
        if correct {
            let clamped = fraction.clamp(0.0, 1.0);
            let percent = (round_half_up(clamped, 2) * 100.0).round() as u32;
            Self {
                kind: LabelKind::Percent(percent),
                text: format!("{percent}%"),
                font_size: dims.container_width / 3.0,
            }
        } else {
            Self {
                kind: LabelKind::NoData,
                text: no_data.to_string(),
                font_size: dims.container_width / 6.0,
            }
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameState {
    /// Ticks since the simulation was created
    pub tick: u64,
    pub dimensions: Dimensions,
    /// Animated fill fraction
    pub fill: f32,
    /// Height of the flat surface line
    pub baseline: f32,
    /// Rotation about the container centre, degrees in [0, 360)
    pub rotation_deg: f32,
    pub amplitude: f32,
    /// Active wave anchors, lead first
    pub anchors: Vec<f32>,
    pub label: FillLabel,
    pub show_tips: bool,
    pub water_color: u32,
    pub background_color: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> Dimensions {
        Dimensions::new(120.0, 200.0, 10.0, 120.0, 400.0).unwrap()
    }

    #[test]
    fn test_percent_label() {
        let label = FillLabel::new(0.7, true, &dims(), DEFAULT_NO_DATA_LABEL);
        assert_eq!(label.kind, LabelKind::Percent(70));
        assert_eq!(label.text, "70%");
        assert_eq!(label.font_size, 40.0);
    }

    #[test]
    fn test_label_clamps() {
        assert_eq!(FillLabel::new(-0.2, true, &dims(), "").text, "0%");
        assert_eq!(FillLabel::new(1.0, true, &dims(), "").text, "100%");
        assert_eq!(FillLabel::new(0.333, true, &dims(), "").text, "33%");
    }

    #[test]
    fn test_no_data_label() {
        let label = FillLabel::new(0.7, false, &dims(), "Not calibrated");
        assert_eq!(label.kind, LabelKind::NoData);
        assert_eq!(label.text, "Not calibrated");
        assert_eq!(label.font_size, 20.0);
    }
}
