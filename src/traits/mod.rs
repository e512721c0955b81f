mod backend;
mod surface;

pub use backend::GeoBackend;
pub use surface::{BusyIndicator, MapSurface};
