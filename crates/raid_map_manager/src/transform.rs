use glam::DVec2;
use raid_core::{MapDimensions, Vector2, ViewerConfig};
use serde::{Deserialize, Serialize};

/// Viewport coordinate, `lat` grows upwards when the vertical axis is flipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// `[[south, west], [north, east]]` of the image overlay in viewport space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl ViewportBounds {
    /// `[[0, 0], [height, width]]`, one viewport unit per game pixel
    pub fn from_dimensions(dimensions: MapDimensions) -> Self {
        Self {
            south_west: LatLng::new(0.0, 0.0),
            north_east: LatLng::new(dimensions.height, dimensions.width),
        }
    }
}

/// Affine mapping between game pixels (origin top left) and viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapTransform {
    pub dimensions: MapDimensions,
    pub bounds: ViewportBounds,
    pub flip_y: bool,
    /// added to game x before projecting, removed again on the way back
    pub horizontal_offset: f64,
}

impl Default for MapTransform {
    fn default() -> Self {
        Self::new(MapDimensions::default())
    }
}

impl MapTransform {
    pub fn new(dimensions: MapDimensions) -> Self {
        Self {
            dimensions,
            bounds: ViewportBounds::from_dimensions(dimensions),
            flip_y: true,
            horizontal_offset: 0.0,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            flip_y: config.flip_y,
            horizontal_offset: config.horizontal_offset,
            ..Self::new(config.map_dimensions)
        }
    }

    fn size(&self) -> DVec2 {
        DVec2::new(self.dimensions.width, self.dimensions.height)
    }

    fn span(&self) -> DVec2 {
        DVec2::new(
            self.bounds.north_east.lng - self.bounds.south_west.lng,
            self.bounds.north_east.lat - self.bounds.south_west.lat,
        )
    }

    pub fn to_viewport(&self, position: Vector2) -> LatLng {
        let mut relative = (position.0 + DVec2::new(self.horizontal_offset, 0.0)) / self.size();
        if self.flip_y {
            relative.y = 1.0 - relative.y;
        }
        let span = self.span();
        LatLng {
            lat: self.bounds.south_west.lat + relative.y * span.y,
            lng: self.bounds.south_west.lng + relative.x * span.x,
        }
    }

    pub fn to_game(&self, latlng: LatLng) -> Vector2 {
        let span = self.span();
        let mut relative = DVec2::new(
            (latlng.lng - self.bounds.south_west.lng) / span.x,
            (latlng.lat - self.bounds.south_west.lat) / span.y,
        );
        if self.flip_y {
            relative.y = 1.0 - relative.y;
        }
        Vector2(relative * self.size() - DVec2::new(self.horizontal_offset, 0.0))
    }

    /// [Self::to_game] clamped to the image and rounded to whole pixels, for the cursor readout
    pub fn to_game_pixel(&self, latlng: LatLng) -> Vector2 {
        let position = self.to_game(latlng).0;
        Vector2(position.clamp(DVec2::ZERO, self.size()).round())
    }

    pub fn contains(&self, position: Vector2) -> bool {
        let size = self.size();
        (0.0..=size.x).contains(&position.x()) && (0.0..=size.y).contains(&position.y())
    }
}
