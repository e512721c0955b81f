use crate::models::geometry::Bounds;
use serde::{Deserialize, Serialize};

/// Body returned by `POST /upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterUpload {
    #[serde(default)]
    pub success: bool,
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub bands: u32,
    pub crs: String,
    pub bounds: Bounds,
}

/// Body returned by `POST /upload_geojson`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorUpload {
    #[serde(default)]
    pub success: bool,
    pub filename: String,
    pub url: String,
    pub feature_count: usize,
}

/// Extended raster metadata from `GET /info/{filename}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub filename: String,
    pub driver: String,
    pub width: u32,
    pub height: u32,
    pub count: u32,
    pub crs: String,
    pub transform: Vec<f64>,
    pub bounds: Bounds,
    #[serde(default)]
    pub nodata: Option<f64>,
    #[serde(default)]
    pub dtypes: Vec<String>,
}

pub struct TileResponse {
    pub bytes: Vec<u8>,
    pub content_type: String,
}
