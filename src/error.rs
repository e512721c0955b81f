use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Please select a file first")]
    NoFileSelected,

    #[error(
        "Unsupported file type. Please upload a GeoTIFF (.tif/.tiff) or GeoJSON (.geojson/.json) file."
    )]
    UnsupportedFile(String),

    /// Non-2xx response. `detail` is the server's message when it sent one.
    #[error("server returned {status}")]
    Server {
        status: reqwest::StatusCode,
        detail: Option<String>,
    },

    /// 2xx response whose body did not carry `success: true`.
    #[error("upload rejected")]
    Rejected { detail: Option<String> },

    #[error("Failed to load processed GeoJSON")]
    SecondaryFetch,

    #[error("invalid GeoJSON: {0}")]
    InvalidGeoJson(#[from] geojson::Error),

    #[error("unknown basemap '{0}'")]
    UnknownBasemap(String),

    #[error("unknown layer")]
    UnknownLayer,

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ViewerError {
    /// Text shown to the user in the notification stack.
    pub fn user_message(&self) -> String {
        match self {
            ViewerError::Server {
                detail: Some(d), ..
            }
            | ViewerError::Rejected { detail: Some(d) } => d.clone(),
            ViewerError::Server {
                status,
                detail: None,
            } => format!(
                "Upload failed: {}",
                status.canonical_reason().unwrap_or(status.as_str())
            ),
            ViewerError::Rejected { detail: None } => "Upload failed".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;
