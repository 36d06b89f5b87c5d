use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of a query result: column name -> scalar value.
pub type Row = Map<String, Value>;

/// A geographic `(lat, lng)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Geographic rectangle currently visible on the map (or covered by the data).
///
/// Persisted in options as `[[sw_lat, sw_lng], [ne_lat, ne_lng]]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f64; 2]; 2]", into = "[[f64; 2]; 2]")]
pub struct ViewportBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl ViewportBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Degenerate bounds covering a single point.
    pub fn at(point: LatLng) -> Self {
        Self::new(point, point)
    }

    /// Grow the rectangle so that it contains `point`.
    pub fn extend(&mut self, point: LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    pub fn union(&mut self, other: &ViewportBounds) {
        self.extend(other.south_west);
        self.extend(other.north_east);
    }
}

impl From<[[f64; 2]; 2]> for ViewportBounds {
    fn from(v: [[f64; 2]; 2]) -> Self {
        Self::new(LatLng::new(v[0][0], v[0][1]), LatLng::new(v[1][0], v[1][1]))
    }
}

impl From<ViewportBounds> for [[f64; 2]; 2] {
    fn from(b: ViewportBounds) -> Self {
        [
            [b.south_west.lat, b.south_west.lng],
            [b.north_east.lat, b.north_east.lng],
        ]
    }
}

/// GeoJSON position: `[lng, lat, ...]`.
pub type Position = Vec<f64>;

/// Pre-parsed GeoJSON geometry. Only used to compute bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<Geometry> },
}

impl Geometry {
    /// Bounding rectangle of all positions, or `None` for an empty geometry.
    pub fn bounds(&self) -> Option<ViewportBounds> {
        let mut acc: Option<ViewportBounds> = None;
        self.visit_positions(&mut |p| {
            if p.len() < 2 || !p[0].is_finite() || !p[1].is_finite() {
                return;
            }
            let ll = LatLng::new(p[1], p[0]);
            match acc.as_mut() {
                Some(b) => b.extend(ll),
                None => acc = Some(ViewportBounds::at(ll)),
            }
        });
        acc
    }

    fn visit_positions(&self, f: &mut dyn FnMut(&Position)) {
        match self {
            Geometry::Point { coordinates } => f(coordinates),
            Geometry::MultiPoint { coordinates } | Geometry::LineString { coordinates } => {
                coordinates.iter().for_each(|p| f(p))
            }
            Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
                coordinates.iter().flatten().for_each(|p| f(p))
            }
            Geometry::MultiPolygon { coordinates } => {
                coordinates.iter().flatten().flatten().for_each(|p| f(p))
            }
            Geometry::GeometryCollection { geometries } => {
                for g in geometries {
                    g.visit_positions(f);
                }
            }
        }
    }
}

/// A geographic region: named properties plus optional geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, deserialize_with = "de_null_as_empty")]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

impl Feature {
    /// The join code stored under `code_type`, if any.
    pub fn code(&self, code_type: &str) -> Option<String> {
        self.properties.get(code_type).and_then(code_text)
    }
}

/// A GeoJSON feature collection, one per map type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Union of all feature bounds.
    pub fn bounds(&self) -> Option<ViewportBounds> {
        let mut acc: Option<ViewportBounds> = None;
        for b in self
            .features
            .iter()
            .filter_map(|f| f.geometry.as_ref().and_then(Geometry::bounds))
        {
            match acc.as_mut() {
                Some(a) => a.union(&b),
                None => acc = Some(b),
            }
        }
        acc
    }
}

/// Textual form of a scalar used as a join code.
///
/// Strings are returned as-is (empty or blank strings are rejected); integral numbers are
/// rendered without a fractional part so that `840` and `840.0` join the same region.
pub fn code_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().filter(|f| f.is_finite()).map(|f| {
                    if f.fract() == 0.0 && f.abs() < 1e15 {
                        format!("{}", f as i64)
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        _ => None,
    }
}

/// Serde helper: treat `null` properties as an empty map.
fn de_null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v: Option<Map<String, Value>> = Option::deserialize(deserializer)?;
    Ok(v.unwrap_or_default())
}
