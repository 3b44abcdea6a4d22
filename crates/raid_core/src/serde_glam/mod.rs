mod vec2;

pub use vec2::Vector2;
