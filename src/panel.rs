use crate::models::geometry::Bounds;
use crate::models::responses::{RasterUpload, VectorUpload};

/// Side-panel contents describing the loaded file.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InfoPanel {
    #[default]
    Empty,
    Raster {
        filename: String,
        width: u32,
        height: u32,
        bands: u32,
        crs: String,
        bounds: Bounds,
    },
    Vector {
        filename: String,
        feature_count: usize,
    },
}

impl From<&RasterUpload> for InfoPanel {
    fn from(r: &RasterUpload) -> Self {
        InfoPanel::Raster {
            filename: r.filename.clone(),
            width: r.width,
            height: r.height,
            bands: r.bands,
            crs: r.crs.clone(),
            bounds: r.bounds,
        }
    }
}

impl From<&VectorUpload> for InfoPanel {
    fn from(v: &VectorUpload) -> Self {
        InfoPanel::Vector {
            filename: v.filename.clone(),
            feature_count: v.feature_count,
        }
    }
}

impl InfoPanel {
    /// Label/value rows in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        match self {
            InfoPanel::Empty => Vec::new(),
            InfoPanel::Raster {
                filename,
                width,
                height,
                bands,
                crs,
                bounds,
            } => vec![
                ("Filename", filename.clone()),
                ("Type", "GeoTIFF".to_string()),
                ("Dimensions", format!("{} × {}", width, height)),
                ("Bands", bands.to_string()),
                ("CRS", crs.clone()),
                ("West", format!("{:.6}", bounds.west)),
                ("South", format!("{:.6}", bounds.south)),
                ("East", format!("{:.6}", bounds.east)),
                ("North", format!("{:.6}", bounds.north)),
            ],
            InfoPanel::Vector {
                filename,
                feature_count,
            } => vec![
                ("Filename", filename.clone()),
                ("Type", "GeoJSON".to_string()),
                ("Features", feature_count.to_string()),
                ("CRS", "EPSG:4326 (WGS84)".to_string()),
            ],
        }
    }

    pub fn to_html(&self) -> String {
        self.rows()
            .iter()
            .map(|(k, v)| format!("<p><strong>{}:</strong> {}</p>", k, v))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
