use crate::error::Result;
use crate::models::geometry::{Bounds, LatLng};
use crate::models::layer::{Basemap, LayerHandle, TileLayerOptions, VectorStyle};
use crate::models::vector::VectorData;

/// A slippy-map widget. Layers belong to the surface once added; callers keep
/// only the handle.
pub trait MapSurface {
    fn add_basemap(&mut self, basemap: Basemap) -> LayerHandle;

    /// Make one basemap visible and hide the others.
    fn show_basemap(&mut self, handle: LayerHandle) -> Result<()>;

    fn add_tile_layer(&mut self, options: TileLayerOptions) -> LayerHandle;

    fn add_vector_layer(&mut self, data: VectorData, style: VectorStyle) -> LayerHandle;

    fn remove_layer(&mut self, handle: LayerHandle) -> Result<()>;

    fn set_opacity(&mut self, handle: LayerHandle, opacity: f64) -> Result<()>;

    fn set_style(&mut self, handle: LayerHandle, style: VectorStyle) -> Result<()>;

    /// Override one feature's style, or drop the override with `None`.
    fn set_feature_style(
        &mut self,
        handle: LayerHandle,
        feature: usize,
        style: Option<VectorStyle>,
    ) -> Result<()>;

    fn bring_to_front(&mut self, handle: LayerHandle, feature: usize) -> Result<()>;

    /// Popup markup bound to one feature of a vector layer.
    fn popup(&self, handle: LayerHandle, feature: usize) -> Option<String>;

    /// Bounds computed from the layer's own geometry.
    fn layer_bounds(&self, handle: LayerHandle) -> Option<Bounds>;

    fn fit_bounds(&mut self, south_west: LatLng, north_east: LatLng, padding: (u32, u32));

    fn set_view(&mut self, center: LatLng, zoom: u8);

    fn center(&self) -> LatLng;

    fn zoom(&self) -> u8;
}

/// Shown while an upload is in flight.
pub trait BusyIndicator {
    fn show(&self, message: &str);
    fn hide(&self);
}
