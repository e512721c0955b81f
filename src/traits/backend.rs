use crate::error::Result;
use crate::models::file::SelectedFile;
use crate::models::geometry::TileCoord;
use crate::models::responses::{FileInfo, RasterUpload, TileResponse, VectorUpload};
use async_trait::async_trait;

/// The viewer's HTTP backend: upload endpoints, processed GeoJSON, tiles and
/// raster info.
///
/// Upload calls only return `Ok` for a 2xx response whose body carries
/// `success: true`; anything else is an error.
#[async_trait]
pub trait GeoBackend: Send + Sync {
    fn base_url(&self) -> &str;

    async fn upload_raster(&self, file: &SelectedFile) -> Result<RasterUpload>;

    async fn upload_vector(&self, file: &SelectedFile) -> Result<VectorUpload>;

    /// Fetch normalized GeoJSON from a URL handed out by `upload_vector`.
    async fn fetch_geojson(&self, url: &str) -> Result<serde_json::Value>;

    async fn fetch_tile(&self, filename: &str, coord: TileCoord) -> Result<TileResponse>;

    async fn file_info(&self, filename: &str) -> Result<FileInfo>;
}
