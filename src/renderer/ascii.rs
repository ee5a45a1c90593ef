//! Character-grid rasteriser
//!
//! Samples a `WaterScene` at cell centres over the container and prints water
//! as `#`, air as `.`, with the fill label written across the row that holds
//! the label anchor.

use glam::Vec2;

use super::shapes::WaterScene;

pub const WATER: char = '#';
pub const AIR: char = '.';

/// Render the container into `rows` lines of `cols` characters
pub fn render(scene: &WaterScene, width: f32, height: f32, cols: usize, rows: usize) -> String {
    if cols == 0 || rows == 0 {
        return String::new();
    }

    let cell = Vec2::new(width / cols as f32, height / rows as f32);
    let mut grid: Vec<Vec<char>> = (0..rows)
        .map(|row| {
            (0..cols)
                .map(|col| {
                    let centre = Vec2::new((col as f32 + 0.5) * cell.x, (row as f32 + 0.5) * cell.y);
                    if scene.is_water(centre) { WATER } else { AIR }
                })
                .collect()
        })
        .collect();

    overlay_label(&mut grid, scene, cell);

    let mut out = String::with_capacity(rows * (cols + 1));
    for line in grid {
        out.extend(line);
        out.push('\n');
    }
    out
}

fn overlay_label(grid: &mut [Vec<char>], scene: &WaterScene, cell: Vec2) {
    let row = (scene.label_anchor.y / cell.y) as usize;
    let Some(line) = grid.get_mut(row) else {
        return;
    };

    let text: Vec<char> = scene.label.text.chars().collect();
    if text.len() > line.len() {
        return;
    }
    let centre = (scene.label_anchor.x / cell.x) as usize;
    let start = centre.saturating_sub(text.len() / 2).min(line.len() - text.len());
    line[start..start + text.len()].copy_from_slice(&text);
}
