use crate::models::geometry::LatLng;
use crate::models::layer::Basemap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the upload/tile backend.
    pub server: String,
    pub center: LatLng,
    pub zoom: u8,
    pub max_zoom: u8,
    /// Viewport size in pixels for the headless surface.
    pub viewport: (u32, u32),
    pub fit_padding: (u32, u32),
    pub initial_opacity: f64,
    pub request_timeout: Duration,
    pub notification_display: Duration,
    pub notification_exit: Duration,
    pub basemaps: Vec<Basemap>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: "http://127.0.0.1:8000".to_string(),
            center: LatLng::new(40.7128, -74.0060),
            zoom: 2,
            max_zoom: 22,
            viewport: (1024, 768),
            fit_padding: (20, 20),
            initial_opacity: 1.0,
            request_timeout: Duration::from_secs(300),
            notification_display: Duration::from_secs(5),
            notification_exit: Duration::from_millis(300),
            basemaps: Basemap::defaults(),
        }
    }
}
