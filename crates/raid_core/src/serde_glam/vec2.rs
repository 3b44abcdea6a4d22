use serde::{
    de::{MapAccess, SeqAccess, Visitor},
    Deserialize, Serialize,
};

/// Game pixel position. Origin is the top left corner of the map image.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vector2(pub glam::DVec2);

impl Vector2 {
    pub const ZERO: Self = Self(glam::DVec2::ZERO);

    pub fn new(x: f64, y: f64) -> Self {
        Self(glam::DVec2::new(x, y))
    }
    pub fn x(&self) -> f64 {
        self.0.x
    }
    pub fn y(&self) -> f64 {
        self.0.y
    }
    /// true when both axes are within `tolerance` of `other`
    pub fn is_near(&self, other: &Vector2, tolerance: f64) -> bool {
        (self.0.x - other.0.x).abs() < tolerance && (self.0.y - other.0.y).abs() < tolerance
    }
}

impl From<Vector2> for glam::DVec2 {
    fn from(src: Vector2) -> glam::DVec2 {
        src.0
    }
}
impl From<glam::DVec2> for Vector2 {
    fn from(src: glam::DVec2) -> Vector2 {
        Vector2(src)
    }
}
impl From<(f64, f64)> for Vector2 {
    fn from((x, y): (f64, f64)) -> Vector2 {
        Vector2::new(x, y)
    }
}

impl std::fmt::Display for Vector2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.0.x, self.0.y)
    }
}

struct Vector2Deserializer;
impl<'de> Visitor<'de> for Vector2Deserializer {
    type Value = Vector2;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("Vector2Deserializer {x, y} object or [x, y] sequence.")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let x: f64 = seq.next_element()?.unwrap_or_default();
        let y: f64 = seq.next_element()?.unwrap_or_default();
        Ok(Vector2::new(x, y))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        // missing or null axes are read as 0
        let mut x: Option<f64> = None;
        let mut y: Option<f64> = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "x" => x = map.next_value::<Option<f64>>()?,
                "y" => y = map.next_value::<Option<f64>>()?,
                _ => {
                    map.next_value::<serde::de::IgnoredAny>()?;
                }
            }
        }
        Ok(Vector2::new(x.unwrap_or_default(), y.unwrap_or_default()))
    }
}

impl Serialize for Vector2 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut st = serializer.serialize_struct("Vector2", 2)?;
        st.serialize_field("x", &self.0.x)?;
        st.serialize_field("y", &self.0.y)?;
        st.end()
    }
}

impl<'de> Deserialize<'de> for Vector2 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(Vector2Deserializer)
    }
}
