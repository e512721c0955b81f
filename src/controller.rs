//! The viewer controller: owns the session, the UI state and the
//! notification stack, and reacts to one [`ViewerEvent`] at a time.

use crate::config::Config;
use crate::error::{Result, ViewerError};
use crate::models::file::{FileKind, SelectedFile};
use crate::models::geometry::{Bounds, LatLng};
use crate::models::layer::{LayerHandle, TileLayerOptions, VectorStyle};
use crate::models::vector::VectorData;
use crate::notifications::{Level, Notifications};
use crate::panel::InfoPanel;
use crate::traits::{BusyIndicator, GeoBackend, MapSurface};
use std::time::Instant;
use tracing::{debug, info, warn};

/// The single overlay on top of the basemap. Raster and vector are mutually
/// exclusive, and raster bounds only exist alongside a raster layer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Overlay {
    #[default]
    None,
    Raster {
        handle: LayerHandle,
        bounds: Bounds,
    },
    Vector {
        handle: LayerHandle,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    None,
    Raster,
    Vector,
}

#[derive(Debug, Default)]
pub struct Session {
    overlay: Overlay,
    filename: Option<String>,
    /// Features currently under the pointer, carrying the highlight style.
    hovered: Vec<usize>,
}

impl Session {
    pub fn overlay(&self) -> Overlay {
        self.overlay
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn file_type(&self) -> FileType {
        match self.overlay {
            Overlay::None => FileType::None,
            Overlay::Raster { .. } => FileType::Raster,
            Overlay::Vector { .. } => FileType::Vector,
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        match self.overlay {
            Overlay::Raster { bounds, .. } => Some(bounds),
            _ => None,
        }
    }
}

/// Everything a front end needs to draw the controls and side panel.
#[derive(Debug, Clone)]
pub struct UiState {
    pub selected: Option<SelectedFile>,
    pub upload_enabled: bool,
    pub fit_enabled: bool,
    pub busy: bool,
    pub drag_over: bool,
    pub opacity: f64,
    pub opacity_label: String,
    pub coordinates_label: String,
    pub zoom_label: String,
    pub panel: InfoPanel,
    pub popup: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ViewerEvent {
    FileSelected(Option<SelectedFile>),
    DragOver,
    DragLeave,
    FilesDropped(Vec<SelectedFile>),
    UploadClicked,
    OpacityChanged(f64),
    FitBounds,
    ResetView,
    PointerMoved(LatLng),
    ZoomEnded,
    SelectBasemap(String),
    FeatureHover(usize),
    FeatureLeave(usize),
    FeatureClicked(usize),
    DismissNotification(u64),
    Tick(Instant),
}

pub fn opacity_label(opacity: f64) -> String {
    format!("{}%", (opacity * 100.0).round() as i64)
}

pub struct ViewerController<M: MapSurface, B: GeoBackend> {
    config: Config,
    map: M,
    backend: B,
    session: Session,
    ui: UiState,
    notifications: Notifications,
    basemaps: Vec<(String, LayerHandle)>,
    busy_indicator: Option<Box<dyn BusyIndicator>>,
}

impl<M: MapSurface, B: GeoBackend> ViewerController<M, B> {
    pub fn new(config: Config, mut map: M, backend: B) -> Self {
        let basemaps: Vec<(String, LayerHandle)> = config
            .basemaps
            .iter()
            .map(|b| (b.name.clone(), map.add_basemap(b.clone())))
            .collect();
        if let Some((name, handle)) = basemaps.first() {
            if let Err(e) = map.show_basemap(*handle) {
                warn!(basemap = %name, "failed to show basemap: {}", e);
            }
        }
        map.set_view(config.center, config.zoom);

        let opacity = config.initial_opacity.clamp(0.0, 1.0);
        let ui = UiState {
            selected: None,
            upload_enabled: false,
            fit_enabled: false,
            busy: false,
            drag_over: false,
            opacity,
            opacity_label: opacity_label(opacity),
            coordinates_label: String::new(),
            zoom_label: format!("Zoom: {}", map.zoom()),
            panel: InfoPanel::Empty,
            popup: None,
        };
        let notifications =
            Notifications::new(config.notification_display, config.notification_exit);

        ViewerController {
            config,
            map,
            backend,
            session: Session::default(),
            ui,
            notifications,
            basemaps,
            busy_indicator: None,
        }
    }

    pub fn with_busy_indicator(mut self, indicator: Box<dyn BusyIndicator>) -> Self {
        self.busy_indicator = Some(indicator);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    /// Direct map access for interactions the map handles itself (panning,
    /// wheel zoom). Follow with `ViewerEvent::ZoomEnded` to refresh labels.
    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn basemap_names(&self) -> impl Iterator<Item = &str> {
        self.basemaps.iter().map(|(n, _)| n.as_str())
    }

    /// Dispatch one event. Errors never escape: they end up on the
    /// notification stack or in the log.
    pub async fn handle(&mut self, event: ViewerEvent) {
        match event {
            ViewerEvent::UploadClicked => self.upload().await,
            other => self.apply(other),
        }
    }

    fn apply(&mut self, event: ViewerEvent) {
        match event {
            ViewerEvent::FileSelected(file) => self.select_file(file),
            ViewerEvent::DragOver => self.ui.drag_over = true,
            ViewerEvent::DragLeave => self.ui.drag_over = false,
            ViewerEvent::FilesDropped(files) => {
                self.ui.drag_over = false;
                if let Some(first) = files.into_iter().next() {
                    self.select_file(Some(first));
                }
            }
            ViewerEvent::OpacityChanged(v) => self.set_opacity(v),
            ViewerEvent::FitBounds => self.fit_to_bounds(),
            ViewerEvent::ResetView => {
                self.map.set_view(self.config.center, self.config.zoom);
                self.refresh_zoom();
            }
            ViewerEvent::PointerMoved(p) => {
                self.ui.coordinates_label = format!("Lat: {:.6}, Lng: {:.6}", p.lat, p.lng);
            }
            ViewerEvent::ZoomEnded => self.refresh_zoom(),
            ViewerEvent::SelectBasemap(name) => {
                if let Err(e) = self.select_basemap(&name) {
                    self.report(e);
                }
            }
            ViewerEvent::FeatureHover(feature) => self.hover(feature, true),
            ViewerEvent::FeatureLeave(feature) => self.hover(feature, false),
            ViewerEvent::FeatureClicked(feature) => {
                if let Overlay::Vector { handle } = self.session.overlay {
                    self.ui.popup = self.map.popup(handle, feature);
                }
            }
            ViewerEvent::DismissNotification(id) => {
                self.notifications.dismiss(id);
            }
            ViewerEvent::Tick(now) => {
                for n in self.notifications.expire(now) {
                    debug!(id = n.id, "notification expired");
                }
            }
            ViewerEvent::UploadClicked => {
                warn!("upload must go through the async dispatcher");
            }
        }
    }

    fn notify(&mut self, message: impl Into<String>, level: Level) {
        self.notifications.push(message, level, Instant::now());
    }

    fn report(&mut self, err: ViewerError) {
        warn!("{}", err);
        self.notify(err.user_message(), Level::Error);
    }

    fn select_file(&mut self, file: Option<SelectedFile>) {
        self.ui.upload_enabled = file.is_some();
        if let Some(f) = &file {
            if f.kind() == FileKind::Unsupported {
                self.ui.upload_enabled = false;
                self.report(ViewerError::UnsupportedFile(f.name.clone()));
            }
        }
        self.ui.selected = file;
    }

    async fn upload(&mut self) {
        if self.ui.busy {
            debug!("upload already in flight, ignoring click");
            return;
        }
        let Some(file) = self.ui.selected.clone() else {
            self.report(ViewerError::NoFileSelected);
            return;
        };
        let kind = file.kind();
        if kind == FileKind::Unsupported {
            self.report(ViewerError::UnsupportedFile(file.name));
            return;
        }

        self.begin_busy(&file);
        let result = match kind {
            FileKind::Raster => self.load_raster(&file).await,
            _ => self.load_vector(&file).await,
        };
        self.end_busy();

        match result {
            Ok(message) => self.notify(message, Level::Success),
            Err(e) => self.report(e),
        }
    }

    fn begin_busy(&mut self, file: &SelectedFile) {
        self.ui.busy = true;
        self.ui.upload_enabled = false;
        if let Some(b) = &self.busy_indicator {
            b.show(&format!("Uploading {} {}", file.kind().label(), file.name));
        }
    }

    fn end_busy(&mut self) {
        self.ui.busy = false;
        self.ui.upload_enabled = true;
        if let Some(b) = &self.busy_indicator {
            b.hide();
        }
    }

    async fn load_raster(&mut self, file: &SelectedFile) -> Result<String> {
        let upload = self.backend.upload_raster(file).await?;
        self.ui.panel = InfoPanel::from(&upload);
        self.show_raster(&upload.filename, upload.bounds)?;
        self.session.filename = Some(upload.filename.clone());
        self.ui.fit_enabled = true;
        info!(filename = %upload.filename, "raster layer loaded");
        Ok(format!("Successfully uploaded GeoTIFF: {}", upload.filename))
    }

    async fn load_vector(&mut self, file: &SelectedFile) -> Result<String> {
        let upload = self.backend.upload_vector(file).await?;
        let content = self.backend.fetch_geojson(&upload.url).await?;
        let data = VectorData::from_json(content).map_err(|e| {
            warn!(url = %upload.url, "processed GeoJSON did not parse: {}", e);
            ViewerError::SecondaryFetch
        })?;
        self.ui.panel = InfoPanel::from(&upload);
        self.show_vector(data)?;
        self.session.filename = Some(upload.filename.clone());
        self.ui.fit_enabled = true;
        info!(filename = %upload.filename, features = upload.feature_count, "vector layer loaded");
        Ok(format!("Successfully uploaded GeoJSON: {}", upload.filename))
    }

    fn clear_overlay(&mut self) -> Result<()> {
        match std::mem::take(&mut self.session.overlay) {
            Overlay::Raster { handle, .. } | Overlay::Vector { handle } => {
                self.ui.popup = None;
                self.session.hovered.clear();
                self.map.remove_layer(handle)
            }
            Overlay::None => Ok(()),
        }
    }

    fn show_raster(&mut self, filename: &str, bounds: Bounds) -> Result<()> {
        self.clear_overlay()?;
        let options = TileLayerOptions::for_upload(
            self.backend.base_url(),
            filename,
            &bounds,
            self.ui.opacity,
            self.config.max_zoom,
        );
        let handle = self.map.add_tile_layer(options);
        self.session.overlay = Overlay::Raster { handle, bounds };
        self.fit_to_bounds();
        Ok(())
    }

    fn show_vector(&mut self, data: VectorData) -> Result<()> {
        self.clear_overlay()?;
        let handle = self
            .map
            .add_vector_layer(data, VectorStyle::base(self.ui.opacity));
        self.session.overlay = Overlay::Vector { handle };
        self.fit_to_bounds();
        Ok(())
    }

    fn set_opacity(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        let opacity = value.clamp(0.0, 1.0);
        self.ui.opacity = opacity;
        self.ui.opacity_label = opacity_label(opacity);
        let applied = match self.session.overlay {
            Overlay::Raster { handle, .. } => self.map.set_opacity(handle, opacity),
            Overlay::Vector { handle } => {
                let highlight = VectorStyle::highlight(opacity);
                self.map
                    .set_style(handle, VectorStyle::base(opacity))
                    .and_then(|_| {
                        self.session.hovered.iter().try_for_each(|&f| {
                            self.map
                                .set_feature_style(handle, f, Some(highlight.clone()))
                        })
                    })
            }
            Overlay::None => Ok(()),
        };
        if let Err(e) = applied {
            warn!("failed to apply opacity: {}", e);
        }
    }

    fn fit_to_bounds(&mut self) {
        let bounds = match self.session.overlay {
            Overlay::Raster { bounds, .. } => Some(bounds),
            Overlay::Vector { handle } => self.map.layer_bounds(handle),
            Overlay::None => None,
        };
        let Some(bounds) = bounds else {
            return;
        };
        let (south_west, north_east) = bounds.corners();
        self.map
            .fit_bounds(south_west, north_east, self.config.fit_padding);
        self.refresh_zoom();
    }

    fn refresh_zoom(&mut self) {
        self.ui.zoom_label = format!("Zoom: {}", self.map.zoom());
    }

    fn select_basemap(&mut self, name: &str) -> Result<()> {
        let handle = self
            .basemaps
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, h)| *h)
            .ok_or_else(|| ViewerError::UnknownBasemap(name.to_string()))?;
        self.map.show_basemap(handle)
    }

    fn hover(&mut self, feature: usize, entered: bool) {
        let Overlay::Vector { handle } = self.session.overlay else {
            return;
        };
        self.session.hovered.retain(|&f| f != feature);
        let result = if entered {
            self.session.hovered.push(feature);
            self.map
                .set_feature_style(handle, feature, Some(VectorStyle::highlight(self.ui.opacity)))
                .and_then(|_| self.map.bring_to_front(handle, feature))
        } else {
            self.map.set_feature_style(handle, feature, None)
        };
        if let Err(e) = result {
            warn!(feature, "hover restyle failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::geometry::TileCoord;
    use crate::models::responses::{FileInfo, RasterUpload, TileResponse, VectorUpload};
    use crate::surface::{HeadlessMap, MountedLayer};
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use reqwest::StatusCode;
    use serde_json::{Value, json};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeBackend {
        raster: Option<RasterUpload>,
        vector: Option<VectorUpload>,
        geojson: Option<Value>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }
    }

    #[async_trait]
    impl GeoBackend for FakeBackend {
        fn base_url(&self) -> &str {
            "http://backend"
        }

        async fn upload_raster(&self, _file: &SelectedFile) -> Result<RasterUpload> {
            self.record("upload");
            self.raster.clone().ok_or(ViewerError::Server {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: Some("bad raster".into()),
            })
        }

        async fn upload_vector(&self, _file: &SelectedFile) -> Result<VectorUpload> {
            self.record("upload_geojson");
            self.vector
                .clone()
                .ok_or(ViewerError::Rejected { detail: None })
        }

        async fn fetch_geojson(&self, url: &str) -> Result<Value> {
            self.record(url);
            self.geojson.clone().ok_or(ViewerError::SecondaryFetch)
        }

        async fn fetch_tile(&self, _filename: &str, _coord: TileCoord) -> Result<TileResponse> {
            unimplemented!("not used by the controller")
        }

        async fn file_info(&self, _filename: &str) -> Result<FileInfo> {
            unimplemented!("not used by the controller")
        }
    }

    fn nyc_raster() -> RasterUpload {
        RasterUpload {
            success: true,
            filename: "nyc.tif".into(),
            width: 1000,
            height: 800,
            bands: 1,
            crs: "EPSG:4326".into(),
            bounds: Bounds::from((-74.1, 40.6, -73.9, 40.8)),
        }
    }

    fn parcels() -> (VectorUpload, Value) {
        let upload = VectorUpload {
            success: true,
            filename: "parcels.geojson".into(),
            url: "/geojson/parcels.geojson".into(),
            feature_count: 3,
        };
        let features: Vec<Value> = ["North", "Middle", "South"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                json!({
                    "type": "Feature",
                    "properties": {"name": name},
                    "geometry": {"type": "Point", "coordinates": [-74.0 + i as f64 * 0.01, 40.7]}
                })
            })
            .collect();
        (
            upload,
            json!({"type": "FeatureCollection", "features": features}),
        )
    }

    fn full_backend() -> FakeBackend {
        let (vector, geojson) = parcels();
        FakeBackend {
            raster: Some(nyc_raster()),
            vector: Some(vector),
            geojson: Some(geojson),
            ..Default::default()
        }
    }

    fn controller(backend: FakeBackend) -> ViewerController<HeadlessMap, FakeBackend> {
        ViewerController::new(Config::default(), HeadlessMap::new(1024, 768), backend)
    }

    async fn upload(ctl: &mut ViewerController<HeadlessMap, FakeBackend>, name: &str) {
        ctl.handle(ViewerEvent::FileSelected(Some(SelectedFile::new(name, vec![1, 2, 3]))))
            .await;
        ctl.handle(ViewerEvent::UploadClicked).await;
    }

    fn last_message(ctl: &ViewerController<HeadlessMap, FakeBackend>) -> (String, Level) {
        let n = ctl.notifications().last().expect("a notification");
        (n.message.clone(), n.level)
    }

    fn overlay_count(map: &HeadlessMap) -> usize {
        map.tile_layers().count() + map.vector_layers().count()
    }

    #[test]
    fn test_initial_state() {
        let ctl = controller(FakeBackend::default());
        let ui = ctl.ui();
        assert!(!ui.upload_enabled);
        assert!(!ui.fit_enabled);
        assert_eq!(ui.zoom_label, "Zoom: 2");
        assert_eq!(ui.opacity_label, "100%");
        assert_eq!(ctl.map().center(), LatLng::new(40.7128, -74.0060));
        assert_eq!(ctl.map().active_basemap().unwrap().name, "OpenStreetMap");
        assert_eq!(ctl.session().file_type(), FileType::None);
        assert!(ctl.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_file_never_reaches_backend() {
        let mut ctl = controller(full_backend());
        upload(&mut ctl, "photo.PNG").await;

        assert!(!ctl.ui().upload_enabled);
        let (message, level) = last_message(&ctl);
        assert_eq!(level, Level::Error);
        assert!(message.starts_with("Unsupported file type."));
        assert!(ctl.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_upload_without_selection() {
        let mut ctl = controller(full_backend());
        ctl.handle(ViewerEvent::UploadClicked).await;
        assert_eq!(last_message(&ctl).0, "Please select a file first");
        assert!(ctl.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_raster_upload_attaches_layer_and_fits() {
        let mut ctl = controller(full_backend());
        upload(&mut ctl, "NYC.TIF").await;

        let session = ctl.session();
        assert_eq!(session.file_type(), FileType::Raster);
        assert_eq!(session.filename(), Some("nyc.tif"));
        assert_eq!(session.bounds(), Some(nyc_raster().bounds));

        let layers: Vec<_> = ctl.map().tile_layers().collect();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].url.0, "http://backend/tile/nyc.tif/{z}/{x}/{y}.png");
        assert!(layers[0].no_wrap);
        assert_eq!(layers[0].max_zoom, 22);

        let fit = ctl.map().last_fit().unwrap();
        assert_eq!(fit.south_west, LatLng::new(40.6, -74.1));
        assert_eq!(fit.north_east, LatLng::new(40.8, -73.9));
        assert_eq!(fit.padding, (20, 20));
        assert_eq!(ctl.ui().zoom_label, format!("Zoom: {}", ctl.map().zoom()));

        let ui = ctl.ui();
        assert!(ui.fit_enabled && ui.upload_enabled && !ui.busy);
        assert!(matches!(ui.panel, InfoPanel::Raster { width: 1000, .. }));
        assert_eq!(
            last_message(&ctl),
            ("Successfully uploaded GeoTIFF: nyc.tif".to_string(), Level::Success)
        );
    }

    #[tokio::test]
    async fn test_server_error_shows_detail_and_restores_ui() {
        let mut ctl = controller(FakeBackend::default());
        upload(&mut ctl, "broken.tif").await;

        assert_eq!(
            last_message(&ctl),
            ("bad raster".to_string(), Level::Error)
        );
        assert!(ctl.ui().upload_enabled);
        assert!(!ctl.ui().busy);
        assert!(!ctl.ui().fit_enabled);
        assert_eq!(ctl.session().file_type(), FileType::None);
        assert_eq!(overlay_count(ctl.map()), 0);
    }

    #[tokio::test]
    async fn test_rejected_upload_without_detail() {
        let mut ctl = controller(FakeBackend::default());
        upload(&mut ctl, "parcels.geojson").await;
        assert_eq!(last_message(&ctl).0, "Upload failed");
        assert!(ctl.ui().upload_enabled);
    }

    #[tokio::test]
    async fn test_failed_secondary_fetch() {
        let (vector, _) = parcels();
        let mut ctl = controller(FakeBackend {
            vector: Some(vector),
            ..Default::default()
        });
        upload(&mut ctl, "parcels.geojson").await;

        assert_eq!(last_message(&ctl).0, "Failed to load processed GeoJSON");
        assert_eq!(
            ctl.backend().calls(),
            vec!["upload_geojson", "/geojson/parcels.geojson"]
        );
        assert_eq!(ctl.session().file_type(), FileType::None);
        assert!(ctl.ui().upload_enabled);
    }

    #[tokio::test]
    async fn test_parcels_scenario() {
        let mut ctl = controller(full_backend());
        upload(&mut ctl, "parcels.geojson").await;

        assert_eq!(ctl.session().file_type(), FileType::Vector);
        assert_eq!(ctl.session().bounds(), None);
        assert!(
            ctl.ui()
                .panel
                .rows()
                .contains(&("Features", "3".to_string()))
        );

        let overlay = ctl.map().vector_layers().next().unwrap();
        assert_eq!(overlay.data.len(), 3);
        assert_eq!(overlay.popup(0).unwrap(), "<strong>name:</strong> North");
        assert_eq!(overlay.popup(2).unwrap(), "<strong>name:</strong> South");

        ctl.handle(ViewerEvent::FeatureClicked(1)).await;
        assert_eq!(ctl.ui().popup.as_deref(), Some("<strong>name:</strong> Middle"));

        // Fit uses the geometry, not any server bounds.
        let fit = ctl.map().last_fit().unwrap();
        assert_eq!(fit.south_west, LatLng::new(40.7, -74.0));
        assert!((fit.north_east.lng - -73.98).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_layers_stay_mutually_exclusive() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut ctl = controller(full_backend());

        for _ in 0..25 {
            let raster = rng.random_bool(0.5);
            upload(&mut ctl, if raster { "a.tiff" } else { "b.json" }).await;

            assert_eq!(overlay_count(ctl.map()), 1);
            let expected = if raster { FileType::Raster } else { FileType::Vector };
            assert_eq!(ctl.session().file_type(), expected);
            assert_eq!(ctl.session().bounds().is_some(), raster);
        }
    }

    #[tokio::test]
    async fn test_opacity_propagates_to_active_layer() {
        let mut ctl = controller(full_backend());
        ctl.handle(ViewerEvent::OpacityChanged(0.456)).await;
        assert_eq!(ctl.ui().opacity_label, "46%");

        upload(&mut ctl, "nyc.tif").await;
        assert_eq!(ctl.map().tile_layers().next().unwrap().opacity, 0.456);
        ctl.handle(ViewerEvent::OpacityChanged(0.7)).await;
        assert_eq!(ctl.map().tile_layers().next().unwrap().opacity, 0.7);
        assert_eq!(ctl.ui().opacity_label, "70%");

        upload(&mut ctl, "parcels.geojson").await;
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let v: f64 = rng.random_range(0.0..=1.0);
            ctl.handle(ViewerEvent::OpacityChanged(v)).await;
            let style = &ctl.map().vector_layers().next().unwrap().style;
            assert_eq!(style.opacity, v);
            assert_eq!(style.fill_opacity, 0.3 * v);
            assert_eq!(ctl.ui().opacity_label, format!("{}%", (v * 100.0).round()));
        }

        ctl.handle(ViewerEvent::OpacityChanged(1.7)).await;
        assert_eq!(ctl.ui().opacity_label, "100%");
    }

    #[tokio::test]
    async fn test_fit_without_overlay_is_noop() {
        let mut ctl = controller(full_backend());
        let before = ctl.map().view_log().len();
        ctl.handle(ViewerEvent::FitBounds).await;
        assert_eq!(ctl.map().view_log().len(), before);
    }

    #[tokio::test]
    async fn test_reset_view_restores_initial_view() {
        let mut ctl = controller(full_backend());
        upload(&mut ctl, "nyc.tif").await;
        ctl.handle(ViewerEvent::FitBounds).await;
        assert_ne!(ctl.map().zoom(), 2);

        ctl.handle(ViewerEvent::ResetView).await;
        assert_eq!(ctl.map().center(), LatLng::new(40.7128, -74.0060));
        assert_eq!(ctl.map().zoom(), 2);
        assert_eq!(ctl.ui().zoom_label, "Zoom: 2");
    }

    #[tokio::test]
    async fn test_pointer_and_zoom_labels() {
        let mut ctl = controller(full_backend());
        ctl.handle(ViewerEvent::PointerMoved(LatLng::new(40.71234567, -74.0)))
            .await;
        assert_eq!(ctl.ui().coordinates_label, "Lat: 40.712346, Lng: -74.000000");
        assert_eq!(ctl.ui().zoom_label, "Zoom: 2");

        let center = ctl.map().center();
        ctl.map_mut().set_view(center, 9);
        assert_eq!(ctl.ui().zoom_label, "Zoom: 2");
        ctl.handle(ViewerEvent::ZoomEnded).await;
        assert_eq!(ctl.ui().zoom_label, "Zoom: 9");
    }

    #[tokio::test]
    async fn test_opacity_change_keeps_hover_highlight() {
        let mut ctl = controller(full_backend());
        upload(&mut ctl, "parcels.geojson").await;
        let Overlay::Vector { handle } = ctl.session().overlay() else {
            panic!("expected vector overlay");
        };

        ctl.handle(ViewerEvent::FeatureHover(1)).await;
        ctl.handle(ViewerEvent::OpacityChanged(0.4)).await;
        let Some(MountedLayer::Vector(v)) = ctl.map().layer(handle) else {
            panic!("expected vector layer");
        };
        assert_eq!(v.feature_style(1), &VectorStyle::highlight(0.4));
        assert_eq!(v.feature_style(0), &VectorStyle::base(0.4));

        ctl.handle(ViewerEvent::FeatureLeave(1)).await;
        let Some(MountedLayer::Vector(v)) = ctl.map().layer(handle) else {
            panic!("expected vector layer");
        };
        assert_eq!(v.feature_style(1), &VectorStyle::base(0.4));
    }

    #[tokio::test]
    async fn test_hover_emphasis_reverts() {
        let mut ctl = controller(full_backend());
        ctl.handle(ViewerEvent::OpacityChanged(0.5)).await;
        upload(&mut ctl, "parcels.geojson").await;
        let Overlay::Vector { handle } = ctl.session().overlay() else {
            panic!("expected vector overlay");
        };

        ctl.handle(ViewerEvent::FeatureHover(0)).await;
        let Some(MountedLayer::Vector(v)) = ctl.map().layer(handle) else {
            panic!("expected vector layer");
        };
        assert_eq!(v.feature_style(0).weight, 5.0);
        assert_eq!(v.draw_order().last(), Some(&0));

        ctl.handle(ViewerEvent::FeatureLeave(0)).await;
        let Some(MountedLayer::Vector(v)) = ctl.map().layer(handle) else {
            panic!("expected vector layer");
        };
        assert_eq!(v.feature_style(0), &VectorStyle::base(0.5));
    }

    #[tokio::test]
    async fn test_drag_and_drop_selects_first_file() {
        let mut ctl = controller(full_backend());
        ctl.handle(ViewerEvent::DragOver).await;
        assert!(ctl.ui().drag_over);
        ctl.handle(ViewerEvent::FilesDropped(vec![
            SelectedFile::new("dem.tif", vec![0]),
            SelectedFile::new("other.geojson", vec![0]),
        ]))
        .await;
        assert!(!ctl.ui().drag_over);
        assert!(ctl.ui().upload_enabled);
        assert_eq!(ctl.ui().selected.as_ref().unwrap().name, "dem.tif");
        assert!(ctl.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_busy_indicator_wraps_upload() {
        struct Recorder(Rc<RefCell<Vec<String>>>);
        impl BusyIndicator for Recorder {
            fn show(&self, message: &str) {
                self.0.borrow_mut().push(message.to_string());
            }
            fn hide(&self) {
                self.0.borrow_mut().push("hide".to_string());
            }
        }

        let log = Rc::new(RefCell::new(Vec::new()));
        let mut ctl = controller(FakeBackend::default())
            .with_busy_indicator(Box::new(Recorder(log.clone())));
        upload(&mut ctl, "x.tif").await;
        assert_eq!(*log.borrow(), vec!["Uploading GeoTIFF x.tif", "hide"]);
    }

    #[tokio::test]
    async fn test_basemap_switching() {
        let mut ctl = controller(full_backend());
        ctl.handle(ViewerEvent::SelectBasemap("satellite".into())).await;
        assert_eq!(ctl.map().active_basemap().unwrap().name, "Satellite");

        ctl.handle(ViewerEvent::SelectBasemap("Topo".into())).await;
        assert_eq!(last_message(&ctl).0, "unknown basemap 'Topo'");
        assert_eq!(ctl.map().active_basemap().unwrap().name, "Satellite");
    }

    #[tokio::test]
    async fn test_notifications_expire_on_tick() {
        let mut ctl = controller(full_backend());
        ctl.handle(ViewerEvent::UploadClicked).await;
        assert_eq!(ctl.notifications().len(), 1);
        ctl.handle(ViewerEvent::Tick(Instant::now() + Duration::from_secs(6)))
            .await;
        assert!(ctl.notifications().is_empty());
    }
}
