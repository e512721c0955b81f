use serde::{Deserialize, Serialize};

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }
}

/// Bounding box in geographic degrees, stored west/south/east/north as the
/// backend reports it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Bounds {
    /// Leaflet-style `[[south, west], [north, east]]` corners.
    pub fn corners(&self) -> (LatLng, LatLng) {
        (
            LatLng::new(self.south, self.west),
            LatLng::new(self.north, self.east),
        )
    }

    pub fn from_corners(south_west: LatLng, north_east: LatLng) -> Self {
        Bounds {
            west: south_west.lng,
            south: south_west.lat,
            east: north_east.lng,
            north: north_east.lat,
        }
    }

    /// Grow the box to include a point, starting from an empty box when `acc`
    /// is `None`.
    pub fn extend(acc: Option<Bounds>, lng: f64, lat: f64) -> Option<Bounds> {
        Some(match acc {
            None => Bounds::from((lng, lat, lng, lat)),
            Some(b) => Bounds {
                west: b.west.min(lng),
                south: b.south.min(lat),
                east: b.east.max(lng),
                north: b.north.max(lat),
            },
        })
    }
}

impl From<(f64, f64, f64, f64)> for Bounds {
    fn from(extent: (f64, f64, f64, f64)) -> Self {
        Bounds {
            west: extent.0,
            south: extent.1,
            east: extent.2,
            north: extent.3,
        }
    }
}

impl From<[f64; 4]> for Bounds {
    fn from(b: [f64; 4]) -> Self {
        Bounds::from((b[0], b[1], b[2], b[3]))
    }
}

impl From<Bounds> for [f64; 4] {
    fn from(b: Bounds) -> Self {
        [b.west, b.south, b.east, b.north]
    }
}

/// Slippy-map tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_swap_into_lat_lng_order() {
        let b = Bounds::from((-74.1, 40.6, -73.9, 40.8));
        let (sw, ne) = b.corners();
        assert_eq!(sw, LatLng::new(40.6, -74.1));
        assert_eq!(ne, LatLng::new(40.8, -73.9));
        assert_eq!(Bounds::from_corners(sw, ne), b);
    }

    #[test]
    fn test_deserializes_from_backend_array() {
        let b: Bounds = serde_json::from_str("[1.0, 2.0, 3.0, 4.0]").unwrap();
        assert_eq!(b, Bounds::from((1.0, 2.0, 3.0, 4.0)));
        assert_eq!(serde_json::to_string(&b).unwrap(), "[1.0,2.0,3.0,4.0]");
    }

    #[test]
    fn test_extend_builds_envelope() {
        let mut acc = None;
        for (lng, lat) in [(1.0, 5.0), (-2.0, 3.0), (4.0, -1.0)] {
            acc = Bounds::extend(acc, lng, lat);
        }
        assert_eq!(acc, Some(Bounds::from((-2.0, -1.0, 4.0, 5.0))));
    }
}
