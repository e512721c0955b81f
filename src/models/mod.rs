pub mod file;
pub mod geometry;
pub mod layer;
pub mod responses;
pub mod vector;
