use crate::error::{Result, ViewerError};
use crate::models::file::SelectedFile;
use crate::models::geometry::TileCoord;
use crate::models::responses::{FileInfo, RasterUpload, TileResponse, VectorUpload};
use crate::traits::GeoBackend;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, header};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URLs pass through; paths are joined onto the base URL.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    async fn post_file(&self, endpoint: &str, file: &SelectedFile) -> Result<Response> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str("application/octet-stream")?;
        let form = Form::new().part("file", part);
        let resp = self
            .client
            .post(self.resolve(endpoint))
            .multipart(form)
            .send()
            .await?;
        debug!(endpoint, status = %resp.status(), "upload response");
        Ok(resp)
    }
}

fn detail_of(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Turn an upload response into its typed body, or the error the user sees.
async fn read_upload<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    let body: Option<Value> = serde_json::from_slice(&bytes).ok();

    if !status.is_success() {
        return Err(ViewerError::Server {
            status,
            detail: body.as_ref().and_then(detail_of),
        });
    }

    let body = body.ok_or(ViewerError::Rejected { detail: None })?;
    if body.get("success").and_then(Value::as_bool) != Some(true) {
        return Err(ViewerError::Rejected {
            detail: detail_of(&body),
        });
    }
    serde_json::from_value(body).map_err(|e| {
        warn!("malformed upload response: {}", e);
        ViewerError::Rejected { detail: None }
    })
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body: Option<Value> = resp.json().await.ok();
        return Err(ViewerError::Server {
            status,
            detail: body.as_ref().and_then(detail_of),
        });
    }
    Ok(resp.json().await?)
}

#[async_trait]
impl GeoBackend for HttpBackend {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self, file), fields(file = %file.name))]
    async fn upload_raster(&self, file: &SelectedFile) -> Result<RasterUpload> {
        let resp = self.post_file("/upload", file).await?;
        let upload: RasterUpload = read_upload(resp).await?;
        info!(filename = %upload.filename, crs = %upload.crs, "raster uploaded");
        Ok(upload)
    }

    #[instrument(skip(self, file), fields(file = %file.name))]
    async fn upload_vector(&self, file: &SelectedFile) -> Result<VectorUpload> {
        let resp = self.post_file("/upload_geojson", file).await?;
        let upload: VectorUpload = read_upload(resp).await?;
        info!(filename = %upload.filename, features = upload.feature_count, "vector uploaded");
        Ok(upload)
    }

    async fn fetch_geojson(&self, url: &str) -> Result<Value> {
        let url = self.resolve(url);
        let fetched = async {
            let resp = self.client.get(&url).send().await?.error_for_status()?;
            resp.json::<Value>().await
        }
        .await;
        fetched.map_err(|e| {
            warn!(url = %url, "failed to fetch processed GeoJSON: {}", e);
            ViewerError::SecondaryFetch
        })
    }

    async fn fetch_tile(&self, filename: &str, coord: TileCoord) -> Result<TileResponse> {
        let url = self.resolve(&format!(
            "/tile/{}/{}/{}/{}.png",
            filename, coord.z, coord.x, coord.y
        ));
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body: Option<Value> = resp.json().await.ok();
            return Err(ViewerError::Server {
                status,
                detail: body.as_ref().and_then(detail_of),
            });
        }
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        let bytes = resp.bytes().await?.to_vec();
        Ok(TileResponse {
            bytes,
            content_type,
        })
    }

    async fn file_info(&self, filename: &str) -> Result<FileInfo> {
        let resp = self
            .client
            .get(self.resolve(&format!("/info/{}", filename)))
            .send()
            .await?;
        read_json(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_joins_relative_paths() {
        let backend = HttpBackend::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            backend.resolve("/geojson/a.geojson"),
            "http://localhost:8000/geojson/a.geojson"
        );
        assert_eq!(backend.resolve("upload"), "http://localhost:8000/upload");
        assert_eq!(
            backend.resolve("https://cdn.example.com/x.json"),
            "https://cdn.example.com/x.json"
        );
    }

    #[test]
    fn test_detail_accepts_strings_and_structures() {
        assert_eq!(detail_of(&json!({"detail": "bad raster"})).as_deref(), Some("bad raster"));
        assert_eq!(detail_of(&json!({"detail": null})), None);
        assert_eq!(detail_of(&json!({})), None);
        assert_eq!(
            detail_of(&json!({"detail": [{"msg": "field required"}]})).as_deref(),
            Some(r#"[{"msg":"field required"}]"#)
        );
    }
}
