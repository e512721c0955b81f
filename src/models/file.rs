use crate::error::Result;
use std::path::Path;

/// What the viewer does with a file, decided purely from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Raster,
    Vector,
    Unsupported,
}

impl FileKind {
    pub fn classify(name: &str) -> FileKind {
        let name = name.to_lowercase();
        if name.ends_with(".tif") || name.ends_with(".tiff") {
            FileKind::Raster
        } else if name.ends_with(".geojson") || name.ends_with(".json") {
            FileKind::Vector
        } else {
            FileKind::Unsupported
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Raster => "GeoTIFF",
            FileKind::Vector => "GeoJSON",
            FileKind::Unsupported => "unsupported",
        }
    }
}

/// A file picked by the user, held in memory until it is uploaded.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        SelectedFile {
            name: name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Ok(SelectedFile { name, bytes })
    }

    pub fn kind(&self) -> FileKind {
        FileKind::classify(&self.name)
    }
}
