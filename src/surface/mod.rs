mod headless;

pub use headless::{FitRequest, HeadlessMap, MountedLayer, VectorOverlay, ViewRequest};
