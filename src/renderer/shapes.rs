//! Scene geometry for a liquid frame
//!
//! Everything is expressed in container coordinates (origin top-left, y down)
//! and then rotated about the container centre by the frame's angle.

use glam::Vec2;

use crate::sim::{FillLabel, FrameState};

/// Paint used for a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Water,
    Background,
}

/// Quadratic Bézier segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadCurve {
    pub from: Vec2,
    pub ctrl: Vec2,
    pub to: Vec2,
    pub paint: Paint,
}

impl QuadCurve {
    pub fn point_at(&self, t: f32) -> Vec2 {
        let u = 1.0 - t;
        self.from * (u * u) + self.ctrl * (2.0 * u * t) + self.to * (t * t)
    }

    /// Evenly spaced points along the curve, both ends included
    pub fn sample(&self, num_points: usize) -> Vec<Vec2> {
        (0..num_points)
            .map(|i| {
                let t = i as f32 / (num_points - 1).max(1) as f32;
                self.point_at(t)
            })
            .collect()
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Drawable description of one frame
#[derive(Debug, Clone)]
pub struct WaterScene {
    /// Rotation centre (container middle)
    pub pivot: Vec2,
    pub rotation_deg: f32,
    /// Flat water below the baseline, reaching past the container on all sides
    pub body: Rect,
    /// Crest/trough pairs, one per anchor
    pub curves: Vec<QuadCurve>,
    pub label: FillLabel,
    /// Centre of the label baseline (not rotated)
    pub label_anchor: Vec2,
    pub show_tips: bool,
    baseline: f32,
    amplitude: f32,
    wave_length: f32,
    anchors: Vec<f32>,
}

impl WaterScene {
    pub fn from_frame(frame: &FrameState) -> Self {
        let dims = &frame.dimensions;
        let baseline = frame.baseline;
        let amp = frame.amplitude;
        let wl = dims.wave_length;

        let curves = frame
            .anchors
            .iter()
            .flat_map(|&s| {
                [
                    QuadCurve {
                        from: Vec2::new(s, baseline),
                        ctrl: Vec2::new(s + wl / 2.0, baseline - amp),
                        to: Vec2::new(s + wl, baseline),
                        paint: Paint::Water,
                    },
                    QuadCurve {
                        from: Vec2::new(s + wl, baseline),
                        ctrl: Vec2::new(s + wl * 1.5, baseline + amp),
                        to: Vec2::new(s + wl * 2.0, baseline),
                        paint: Paint::Background,
                    },
                ]
            })
            .collect();

        Self {
            pivot: Vec2::new(dims.container_width / 2.0, dims.container_height / 2.0),
            rotation_deg: frame.rotation_deg,
            body: Rect {
                min: Vec2::new(-(dims.surface_width - dims.container_width) / 2.0, baseline),
                max: Vec2::new(dims.surface_width, dims.surface_height),
            },
            curves,
            label: frame.label.clone(),
            label_anchor: Vec2::new(dims.container_width / 2.0, dims.container_height * 0.75),
            show_tips: frame.show_tips,
            baseline,
            amplitude: amp,
            wave_length: wl,
            anchors: frame.anchors.clone(),
        }
    }

    /// Height of the drawn surface at container x (before rotation)
    pub fn surface_at(&self, x: f32) -> f32 {
        let period = self.wave_length * 2.0;
        let Some(&lead) = self.anchors.first() else {
            return self.baseline;
        };
        if x < lead || period <= 0.0 {
            return self.baseline;
        }

        let index = ((x - lead) / period).floor() as usize;
        let Some(&start) = self.anchors.get(index) else {
            return self.baseline;
        };

        // Control points sit mid-span, so x is linear in t
        let u = x - start;
        if u < self.wave_length {
            let t = u / self.wave_length;
            self.baseline - 2.0 * t * (1.0 - t) * self.amplitude
        } else {
            let t = (u - self.wave_length) / self.wave_length;
            self.baseline + 2.0 * t * (1.0 - t) * self.amplitude
        }
    }

    /// Container coordinates to screen coordinates
    pub fn to_screen(&self, p: Vec2) -> Vec2 {
        let rot = Vec2::from_angle(self.rotation_deg.to_radians());
        self.pivot + rot.rotate(p - self.pivot)
    }

    /// Screen coordinates back to container coordinates
    pub fn to_container(&self, p: Vec2) -> Vec2 {
        let rot = Vec2::from_angle(-self.rotation_deg.to_radians());
        self.pivot + rot.rotate(p - self.pivot)
    }

    /// Whether a screen point is covered by water
    pub fn is_water(&self, screen: Vec2) -> bool {
        let p = self.to_container(screen);
        p.x >= self.body.min.x
            && p.x <= self.body.max.x
            && p.y <= self.body.max.y
            && p.y >= self.surface_at(p.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Dimensions, Simulation};

    fn frame(fill: f32, amplitude_splash: bool, rotation: Option<f32>) -> FrameState {
        let dims = Dimensions::new(100.0, 200.0, 10.0, 100.0, 400.0).unwrap();
        let mut sim = Simulation::new(dims);
        sim.command_immediate(fill).unwrap();
        let mut f = sim.frame();
        if amplitude_splash {
            f.amplitude = 10.0;
        }
        if let Some(r) = rotation {
            f.rotation_deg = r;
        }
        f
    }

    #[test]
    fn test_curves_per_anchor() {
        let scene = WaterScene::from_frame(&frame(0.5, true, None));
        // Anchors 0, 40, 80, 120 -> crest + trough each
        assert_eq!(scene.curves.len(), 8);
        let crest = scene.curves[0];
        assert_eq!(crest.paint, Paint::Water);
        assert_eq!(crest.from, Vec2::new(0.0, 150.0));
        assert_eq!(crest.ctrl, Vec2::new(10.0, 140.0));
        assert_eq!(crest.to, Vec2::new(20.0, 150.0));
        let trough = scene.curves[1];
        assert_eq!(trough.paint, Paint::Background);
        assert_eq!(trough.ctrl, Vec2::new(30.0, 160.0));
        assert_eq!(trough.to, Vec2::new(40.0, 150.0));
    }

    #[test]
    fn test_surface_matches_curves() {
        let scene = WaterScene::from_frame(&frame(0.5, true, None));
        // Crest peak is half the control offset
        assert!((scene.surface_at(10.0) - 145.0).abs() < 1e-4);
        assert!((scene.surface_at(30.0) - 155.0).abs() < 1e-4);
        assert!((scene.surface_at(40.0) - 150.0).abs() < 1e-4);
        let mid = scene.curves[0].point_at(0.5);
        assert!((scene.surface_at(mid.x) - mid.y).abs() < 1e-4);
        // Left of the lead anchor the surface is flat
        assert_eq!(scene.surface_at(-5.0), 150.0);
    }

    #[test]
    fn test_body_and_label() {
        let scene = WaterScene::from_frame(&frame(0.5, false, None));
        assert_eq!(scene.body.min, Vec2::new(0.0, 150.0));
        assert_eq!(scene.body.max, Vec2::new(100.0, 400.0));
        assert_eq!(scene.label_anchor, Vec2::new(50.0, 150.0));
        assert_eq!(scene.label.text, "50%");
        assert_eq!(scene.pivot, Vec2::new(50.0, 100.0));
    }

    #[test]
    fn test_rotation_round_trip() {
        let scene = WaterScene::from_frame(&frame(0.5, false, Some(90.0)));
        let p = Vec2::new(80.0, 30.0);
        let back = scene.to_container(scene.to_screen(p));
        assert!((back - p).length() < 1e-3);
        // Quarter turn clockwise (y down): right of centre maps below it
        let right = scene.to_screen(Vec2::new(60.0, 100.0));
        assert!((right - Vec2::new(50.0, 110.0)).length() < 1e-3);
    }

    #[test]
    fn test_is_water() {
        let upright = WaterScene::from_frame(&frame(0.5, false, None));
        assert!(upright.is_water(Vec2::new(50.0, 180.0)));
        assert!(!upright.is_water(Vec2::new(50.0, 120.0)));

        // Upside down: water now sits at the top of the container
        let flipped = WaterScene::from_frame(&frame(0.5, false, Some(180.0)));
        assert!(flipped.is_water(Vec2::new(50.0, 20.0)));
        assert!(!flipped.is_water(Vec2::new(50.0, 80.0)));
    }

    #[test]
    fn test_sample_endpoints() {
        let scene = WaterScene::from_frame(&frame(0.5, true, None));
        let points = scene.curves[0].sample(5);
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], scene.curves[0].from);
        assert!((points[4] - scene.curves[0].to).length() < 1e-4);
    }
}
