use crate::models::geometry::{Bounds, LatLng, TileCoord};
use serde::Serialize;

/// 1x1 transparent PNG shown in place of tiles the backend failed to serve.
pub const ERROR_TILE_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8/5+hHgAHggJ/PchI7wAAAABJRU5ErkJggg==";

/// Opaque reference to a layer owned by the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerHandle(pub u64);

/// An XYZ URL with `{z}`, `{x}` and `{y}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileUrlTemplate(pub String);

impl TileUrlTemplate {
    pub fn resolve(&self, coord: TileCoord) -> String {
        self.0
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Basemap {
    pub name: String,
    pub url: TileUrlTemplate,
    pub attribution: String,
    pub max_zoom: u8,
}

impl Basemap {
    pub fn new(name: &str, url: &str, attribution: &str) -> Self {
        Basemap {
            name: name.to_string(),
            url: TileUrlTemplate(url.to_string()),
            attribution: attribution.to_string(),
            max_zoom: 22,
        }
    }

    pub fn defaults() -> Vec<Basemap> {
        vec![
            Basemap::new(
                "OpenStreetMap",
                "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
                "© OpenStreetMap contributors",
            ),
            Basemap::new(
                "Satellite",
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
                "Tiles © Esri & contributors",
            ),
            Basemap::new(
                "Streets",
                "https://{s}.tile.openstreetmap.fr/osmfr/{z}/{x}/{y}.png",
                "© OpenStreetMap France contributors",
            ),
        ]
    }
}

/// Options for a raster overlay served by the backend's tile endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayerOptions {
    pub url: TileUrlTemplate,
    pub attribution: String,
    pub opacity: f64,
    pub max_zoom: u8,
    /// `[south_west, north_east]`
    pub bounds: (LatLng, LatLng),
    pub no_wrap: bool,
    pub error_tile_url: String,
}

impl TileLayerOptions {
    pub fn for_upload(base_url: &str, filename: &str, bounds: &Bounds, opacity: f64, max_zoom: u8) -> Self {
        TileLayerOptions {
            url: TileUrlTemplate(format!(
                "{}/tile/{}/{{z}}/{{x}}/{{y}}.png",
                base_url.trim_end_matches('/'),
                filename
            )),
            attribution: format!("GeoTIFF: {}", filename),
            opacity,
            max_zoom,
            bounds: bounds.corners(),
            no_wrap: true,
            error_tile_url: ERROR_TILE_URL.to_string(),
        }
    }

    pub fn geographic_bounds(&self) -> Bounds {
        Bounds::from_corners(self.bounds.0, self.bounds.1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
}

pub const VECTOR_COLOR: &str = "#ff7800";
pub const HIGHLIGHT_COLOR: &str = "#666";

impl VectorStyle {
    /// Base overlay style; fills always render lighter than strokes.
    pub fn base(opacity: f64) -> Self {
        VectorStyle {
            color: VECTOR_COLOR.to_string(),
            weight: 2.0,
            opacity,
            fill_color: VECTOR_COLOR.to_string(),
            fill_opacity: opacity * 0.3,
        }
    }

    /// Emphasis applied while the pointer is over a feature.
    pub fn highlight(opacity: f64) -> Self {
        VectorStyle {
            color: HIGHLIGHT_COLOR.to_string(),
            weight: 5.0,
            opacity,
            fill_color: VECTOR_COLOR.to_string(),
            fill_opacity: 0.7,
        }
    }
}
