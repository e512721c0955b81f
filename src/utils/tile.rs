use crate::geometry::projection::TILE_SIZE;
use crate::models::responses::TileResponse;
use image::{ColorType, ImageEncoder, RgbaImage, codecs::png::PngEncoder};
use std::io::Cursor;

/// Fully transparent PNG tile, used when the backend cannot serve one.
pub fn fallback_tile() -> image::ImageResult<Vec<u8>> {
    let size = TILE_SIZE as u32;
    let img = RgbaImage::new(size, size);
    let mut png_data = Vec::new();
    PngEncoder::new(Cursor::new(&mut png_data)).write_image(
        img.as_raw(),
        size,
        size,
        ColorType::Rgba8.into(),
    )?;
    Ok(png_data)
}

/// Dimensions of a tile response, `None` if it is not a decodable PNG.
pub fn tile_dimensions(tile: &TileResponse) -> Option<(u32, u32)> {
    let img = image::load_from_memory_with_format(&tile.bytes, image::ImageFormat::Png).ok()?;
    Some((img.width(), img.height()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_tile_is_transparent_png() {
        let bytes = fallback_tile().unwrap();
        let tile = TileResponse {
            bytes: bytes.clone(),
            content_type: "image/png".into(),
        };
        assert_eq!(tile_dimensions(&tile), Some((256, 256)));

        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert!(img.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_garbage_is_not_a_tile() {
        let tile = TileResponse {
            bytes: b"<html>oops</html>".to_vec(),
            content_type: "text/html".into(),
        };
        assert_eq!(tile_dimensions(&tile), None);
    }
}
