pub mod status;
pub mod tile;
