//! A map surface with no renderer attached.
//!
//! Keeps the layer table and the view (center/zoom) the way a browser map
//! widget would, so the controller can be driven from a terminal or a test.
//! View changes are also appended to a log of [`ViewRequest`]s.

use crate::error::{Result, ViewerError};
use crate::geometry::projection::{pixel_to_tile, project, unproject};
use crate::models::geometry::{Bounds, LatLng, TileCoord};
use crate::models::layer::{Basemap, LayerHandle, TileLayerOptions, VectorStyle};
use crate::models::vector::VectorData;
use crate::traits::MapSurface;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct FitRequest {
    pub south_west: LatLng,
    pub north_east: LatLng,
    pub padding: (u32, u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewRequest {
    Fit(FitRequest),
    SetView { center: LatLng, zoom: u8 },
}

#[derive(Debug, Clone)]
pub struct VectorOverlay {
    pub data: VectorData,
    pub style: VectorStyle,
    feature_styles: HashMap<usize, VectorStyle>,
    /// Draw order of features, last on top.
    order: Vec<usize>,
}

impl VectorOverlay {
    fn new(data: VectorData, style: VectorStyle) -> Self {
        let order = (0..data.len()).collect();
        VectorOverlay {
            data,
            style,
            feature_styles: HashMap::new(),
            order,
        }
    }

    pub fn feature_style(&self, feature: usize) -> &VectorStyle {
        self.feature_styles.get(&feature).unwrap_or(&self.style)
    }

    pub fn draw_order(&self) -> &[usize] {
        &self.order
    }

    pub fn popup(&self, feature: usize) -> Option<String> {
        self.data.popup(feature)
    }
}

#[derive(Debug, Clone)]
pub enum MountedLayer {
    Basemap { basemap: Basemap, visible: bool },
    Tile(TileLayerOptions),
    Vector(VectorOverlay),
}

pub struct HeadlessMap {
    size: (u32, u32),
    min_zoom: u8,
    max_zoom: u8,
    center: LatLng,
    zoom: u8,
    next_handle: u64,
    layers: BTreeMap<LayerHandle, MountedLayer>,
    view_log: Vec<ViewRequest>,
}

impl HeadlessMap {
    pub fn new(width: u32, height: u32) -> Self {
        HeadlessMap {
            size: (width.max(1), height.max(1)),
            min_zoom: 0,
            max_zoom: 22,
            center: LatLng::new(0.0, 0.0),
            zoom: 0,
            next_handle: 1,
            layers: BTreeMap::new(),
            view_log: Vec::new(),
        }
    }

    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom.max(min_zoom);
        self
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn layer(&self, handle: LayerHandle) -> Option<&MountedLayer> {
        self.layers.get(&handle)
    }

    pub fn layers(&self) -> impl Iterator<Item = (&LayerHandle, &MountedLayer)> {
        self.layers.iter()
    }

    pub fn tile_layers(&self) -> impl Iterator<Item = &TileLayerOptions> {
        self.layers.values().filter_map(|l| match l {
            MountedLayer::Tile(t) => Some(t),
            _ => None,
        })
    }

    pub fn vector_layers(&self) -> impl Iterator<Item = &VectorOverlay> {
        self.layers.values().filter_map(|l| match l {
            MountedLayer::Vector(v) => Some(v),
            _ => None,
        })
    }

    pub fn active_basemap(&self) -> Option<&Basemap> {
        self.layers.values().find_map(|l| match l {
            MountedLayer::Basemap {
                basemap,
                visible: true,
            } => Some(basemap),
            _ => None,
        })
    }

    pub fn view_log(&self) -> &[ViewRequest] {
        &self.view_log
    }

    pub fn last_fit(&self) -> Option<&FitRequest> {
        self.view_log.iter().rev().find_map(|r| match r {
            ViewRequest::Fit(f) => Some(f),
            _ => None,
        })
    }

    /// Geographic extent currently on screen.
    pub fn view_bounds(&self) -> Bounds {
        let (cx, cy) = project(self.center, self.zoom);
        let (hw, hh) = (self.size.0 as f64 / 2.0, self.size.1 as f64 / 2.0);
        Bounds::from_corners(
            unproject(cx - hw, cy + hh, self.zoom),
            unproject(cx + hw, cy - hh, self.zoom),
        )
    }

    /// Tiles the topmost raster overlay would request for the current view:
    /// the viewport clipped to the layer bounds, never wrapping past the
    /// antimeridian.
    pub fn visible_tiles(&self) -> Vec<TileCoord> {
        let Some(layer) = self.tile_layers().last() else {
            return Vec::new();
        };
        if self.zoom > layer.max_zoom {
            return Vec::new();
        }

        let z = self.zoom;
        let (cx, cy) = project(self.center, z);
        let (hw, hh) = (self.size.0 as f64 / 2.0, self.size.1 as f64 / 2.0);
        let (sw, ne) = layer.bounds;
        let (lx0, ly1) = project(sw, z);
        let (lx1, ly0) = project(ne, z);

        let x0 = (cx - hw).max(lx0);
        let x1 = (cx + hw).min(lx1);
        let y0 = (cy - hh).max(ly0);
        let y1 = (cy + hh).min(ly1);
        if x0 >= x1 || y0 >= y1 {
            return Vec::new();
        }

        let first = pixel_to_tile(x0, y0, z);
        // Half a pixel in from the far edge so an exact tile boundary is not counted.
        let last = pixel_to_tile((x1 - 0.5).max(x0), (y1 - 0.5).max(y0), z);
        let mut tiles = Vec::new();
        for y in first.y..=last.y {
            for x in first.x..=last.x {
                tiles.push(TileCoord { z, x, y });
            }
        }
        tiles
    }

    fn insert(&mut self, layer: MountedLayer) -> LayerHandle {
        let handle = LayerHandle(self.next_handle);
        self.next_handle += 1;
        self.layers.insert(handle, layer);
        handle
    }

    fn vector_mut(&mut self, handle: LayerHandle) -> Result<&mut VectorOverlay> {
        match self.layers.get_mut(&handle) {
            Some(MountedLayer::Vector(v)) => Ok(v),
            _ => Err(ViewerError::UnknownLayer),
        }
    }

    /// Largest integer zoom at which `bounds` fits inside the padded viewport.
    fn bounds_zoom(&self, south_west: LatLng, north_east: LatLng, padding: (u32, u32)) -> u8 {
        let (x0, y1) = project(south_west, 0);
        let (x1, y0) = project(north_east, 0);
        let avail_w = (self.size.0 as f64 - 2.0 * padding.0 as f64).max(1.0);
        let avail_h = (self.size.1 as f64 - 2.0 * padding.1 as f64).max(1.0);
        let scale = (avail_w / (x1 - x0).abs()).min(avail_h / (y1 - y0).abs());
        scale
            .log2()
            .floor()
            .clamp(self.min_zoom as f64, self.max_zoom as f64) as u8
    }
}

impl MapSurface for HeadlessMap {
    fn add_basemap(&mut self, basemap: Basemap) -> LayerHandle {
        self.insert(MountedLayer::Basemap {
            basemap,
            visible: false,
        })
    }

    fn show_basemap(&mut self, handle: LayerHandle) -> Result<()> {
        if !matches!(self.layers.get(&handle), Some(MountedLayer::Basemap { .. })) {
            return Err(ViewerError::UnknownLayer);
        }
        for (h, layer) in self.layers.iter_mut() {
            if let MountedLayer::Basemap { visible, .. } = layer {
                *visible = *h == handle;
            }
        }
        Ok(())
    }

    fn add_tile_layer(&mut self, options: TileLayerOptions) -> LayerHandle {
        debug!(url = %options.url.0, "adding tile layer");
        self.insert(MountedLayer::Tile(options))
    }

    fn add_vector_layer(&mut self, data: VectorData, style: VectorStyle) -> LayerHandle {
        debug!(features = data.len(), "adding vector layer");
        self.insert(MountedLayer::Vector(VectorOverlay::new(data, style)))
    }

    fn remove_layer(&mut self, handle: LayerHandle) -> Result<()> {
        self.layers
            .remove(&handle)
            .map(|_| ())
            .ok_or(ViewerError::UnknownLayer)
    }

    fn set_opacity(&mut self, handle: LayerHandle, opacity: f64) -> Result<()> {
        match self.layers.get_mut(&handle) {
            Some(MountedLayer::Tile(t)) => {
                t.opacity = opacity;
                Ok(())
            }
            Some(MountedLayer::Vector(v)) => {
                v.style = VectorStyle {
                    opacity,
                    fill_opacity: opacity * 0.3,
                    ..v.style.clone()
                };
                Ok(())
            }
            _ => Err(ViewerError::UnknownLayer),
        }
    }

    fn set_style(&mut self, handle: LayerHandle, style: VectorStyle) -> Result<()> {
        self.vector_mut(handle)?.style = style;
        Ok(())
    }

    fn set_feature_style(
        &mut self,
        handle: LayerHandle,
        feature: usize,
        style: Option<VectorStyle>,
    ) -> Result<()> {
        let overlay = self.vector_mut(handle)?;
        match style {
            Some(s) => overlay.feature_styles.insert(feature, s),
            None => overlay.feature_styles.remove(&feature),
        };
        Ok(())
    }

    fn bring_to_front(&mut self, handle: LayerHandle, feature: usize) -> Result<()> {
        let overlay = self.vector_mut(handle)?;
        if let Some(pos) = overlay.order.iter().position(|&f| f == feature) {
            let f = overlay.order.remove(pos);
            overlay.order.push(f);
        }
        Ok(())
    }

    fn popup(&self, handle: LayerHandle, feature: usize) -> Option<String> {
        match self.layers.get(&handle)? {
            MountedLayer::Vector(v) => v.popup(feature),
            _ => None,
        }
    }

    fn layer_bounds(&self, handle: LayerHandle) -> Option<Bounds> {
        match self.layers.get(&handle)? {
            MountedLayer::Tile(t) => Some(t.geographic_bounds()),
            MountedLayer::Vector(v) => v.data.bounds(),
            MountedLayer::Basemap { .. } => None,
        }
    }

    fn fit_bounds(&mut self, south_west: LatLng, north_east: LatLng, padding: (u32, u32)) {
        let zoom = self.bounds_zoom(south_west, north_east, padding);
        let (x0, y1) = project(south_west, 0);
        let (x1, y0) = project(north_east, 0);
        self.center = unproject((x0 + x1) / 2.0, (y0 + y1) / 2.0, 0);
        self.zoom = zoom;
        self.view_log.push(ViewRequest::Fit(FitRequest {
            south_west,
            north_east,
            padding,
        }));
    }

    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.center = center;
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.view_log.push(ViewRequest::SetView {
            center,
            zoom: self.zoom,
        });
    }

    fn center(&self) -> LatLng {
        self.center
    }

    fn zoom(&self) -> u8 {
        self.zoom
    }
}
