use crate::error::Result;
use crate::models::geometry::Bounds;
use geojson::{Feature, GeoJson, Geometry, Value};

/// Normalized GeoJSON as handed to a vector overlay: always a flat list of
/// features, whatever top-level object the backend returned.
#[derive(Debug, Clone, Default)]
pub struct VectorData {
    pub features: Vec<Feature>,
}

impl VectorData {
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let features = match GeoJson::from_json_value(value)? {
            GeoJson::FeatureCollection(fc) => fc.features,
            GeoJson::Feature(f) => vec![f],
            GeoJson::Geometry(g) => vec![Feature {
                bbox: None,
                geometry: Some(g),
                id: None,
                properties: None,
                foreign_members: None,
            }],
        };
        Ok(VectorData { features })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Envelope of every vertex in the collection, `None` when there is no
    /// geometry at all.
    pub fn bounds(&self) -> Option<Bounds> {
        self.features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .fold(None, geometry_bounds)
    }

    /// Popup markup for one feature; `None` when it has no properties.
    pub fn popup(&self, index: usize) -> Option<String> {
        let props = self.features.get(index)?.properties.as_ref()?;
        if props.is_empty() {
            return None;
        }
        Some(
            props
                .iter()
                .map(|(k, v)| {
                    let v = match v {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    format!("<strong>{}:</strong> {}", k, v)
                })
                .collect::<Vec<_>>()
                .join("<br>"),
        )
    }
}

fn geometry_bounds(acc: Option<Bounds>, geometry: &Geometry) -> Option<Bounds> {
    value_bounds(acc, &geometry.value)
}

fn value_bounds(acc: Option<Bounds>, value: &Value) -> Option<Bounds> {
    let extend = |acc, pos: &Vec<f64>| match pos.as_slice() {
        [lng, lat, ..] => Bounds::extend(acc, *lng, *lat),
        _ => acc,
    };
    match value {
        Value::Point(p) => extend(acc, p),
        Value::MultiPoint(ps) | Value::LineString(ps) => ps.iter().fold(acc, extend),
        Value::MultiLineString(ls) | Value::Polygon(ls) => {
            ls.iter().flatten().fold(acc, extend)
        }
        Value::MultiPolygon(polys) => polys.iter().flatten().flatten().fold(acc, extend),
        Value::GeometryCollection(gs) => gs.iter().fold(acc, geometry_bounds),
    }
}
