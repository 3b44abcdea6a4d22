use glam::DVec2;
use raid_core::{MapDimensions, Vector2};

pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 3.0;
const MIN_MARKER_SCALE: f64 = 0.25;
const MAX_MARKER_SCALE: f64 = 2.0;

/// Pan and zoom state of the map canvas.
/// A canvas point `p` shows the map point `(p - translation) / scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    canvas: DVec2,
    scale: f64,
    translation: DVec2,
}

impl Viewport {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            canvas: DVec2::new(canvas_width, canvas_height),
            scale: 1.0,
            translation: DVec2::ZERO,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translation(&self) -> Vector2 {
        Vector2(self.translation)
    }

    /// Keeps the current translation, re-clamped to the new size.
    pub fn resize(&mut self, canvas_width: f64, canvas_height: f64) {
        self.canvas = DVec2::new(canvas_width, canvas_height);
        self.clamp_translation();
    }

    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.translation = DVec2::ZERO;
    }

    pub fn pan(&mut self, delta: Vector2) {
        self.translation += delta.0;
        self.clamp_translation();
    }

    /// Multiplies the scale by `factor` while the map point under `canvas_point` stays put.
    pub fn zoom_at(&mut self, canvas_point: Vector2, factor: f64) {
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        if new_scale == self.scale {
            return;
        }
        let world = (canvas_point.0 - self.translation) / self.scale;
        self.scale = new_scale;
        self.translation = canvas_point.0 - world * self.scale;
        self.clamp_translation();
    }

    /// at most half of the canvas may be left empty on any side
    fn clamp_translation(&mut self) {
        let max = self.canvas * 0.5;
        let min = -self.canvas * self.scale + self.canvas * 0.5;
        self.translation = self.translation.max(min).min(max);
    }

    /// markers grow when zoomed out and shrink when zoomed in
    pub fn marker_scale(&self) -> f64 {
        (1.0 / self.scale).clamp(MIN_MARKER_SCALE, MAX_MARKER_SCALE)
    }

    pub fn canvas_to_map(&self, canvas_point: Vector2) -> Vector2 {
        Vector2((canvas_point.0 - self.translation) / self.scale)
    }

    /// The map image is stretched over the whole canvas at scale 1.
    pub fn screen_to_map_pixel(&self, canvas_point: Vector2, dimensions: MapDimensions) -> Vector2 {
        let map_point = self.canvas_to_map(canvas_point).0;
        let size = DVec2::new(dimensions.width, dimensions.height);
        Vector2((map_point / self.canvas * size).round())
    }
}
