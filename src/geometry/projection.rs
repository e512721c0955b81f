use crate::models::geometry::{LatLng, TileCoord};
use std::f64::consts::PI;

/// WebMercator constants
const R_MAJOR: f64 = 6378137.0;
pub const MAX_LAT: f64 = 85.05112877980659; // Max bounds for Web Mercator
pub const HALF_WORLD: f64 = 20037508.342789244;
pub const TILE_SIZE: f64 = 256.0;

/// from longitude, latitude (degrees) → Web Mercator (x, y in meters)
pub fn lon_lat_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    // clamp latitude into Mercator’s valid range
    let clamped_lat = lat.clamp(-MAX_LAT, MAX_LAT);

    let x = lon * R_MAJOR * PI / 180.0;
    let lat_rad = clamped_lat * PI / 180.0;
    let y = R_MAJOR * ((PI / 4.0 + lat_rad / 2.0).tan().ln());
    (x, y)
}

/// from Web Mercator (x, y in meters) → longitude, latitude (degrees)
pub fn mercator_to_lon_lat(x: f64, y: f64) -> (f64, f64) {
    let lon = x / (R_MAJOR * PI / 180.0);
    let lat_rad = 2.0 * ((y / R_MAJOR).exp().atan()) - PI / 2.0;
    let lat = lat_rad * 180.0 / PI;
    (lon, lat)
}

/// Width of the whole world in pixels at a zoom level.
pub fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * 2f64.powi(zoom as i32)
}

/// Geographic point → global pixel coordinates at `zoom`, origin top-left.
pub fn project(point: LatLng, zoom: u8) -> (f64, f64) {
    let (mx, my) = lon_lat_to_mercator(point.lng, point.lat);
    let scale = world_size(zoom) / (2.0 * HALF_WORLD);
    ((mx + HALF_WORLD) * scale, (HALF_WORLD - my) * scale)
}

pub fn unproject(px: f64, py: f64, zoom: u8) -> LatLng {
    let scale = world_size(zoom) / (2.0 * HALF_WORLD);
    let (lon, lat) = mercator_to_lon_lat(px / scale - HALF_WORLD, HALF_WORLD - py / scale);
    LatLng::new(lat, lon)
}

/// Tile containing a global pixel, clamped to the world (no wrapping).
pub fn pixel_to_tile(px: f64, py: f64, zoom: u8) -> TileCoord {
    let max = (1u32 << zoom) - 1;
    let clamp = |v: f64| ((v / TILE_SIZE).floor().max(0.0) as u32).min(max);
    TileCoord {
        z: zoom,
        x: clamp(px),
        y: clamp(py),
    }
}
