use std::sync::Arc;

use crate::foundation::core::Rgba8Premul;

pub mod decode;
pub mod resolve;

/// Decoded raster image ready for compositing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Image filled with one straight-alpha color.
    pub fn solid(width: u32, height: u32, [r, g, b, a]: [u8; 4]) -> Self {
        let px = Rgba8Premul::from_straight_rgba(r, g, b, a).to_array();
        let rgba8_premul = px.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_images_are_premultiplied() {
        let img = PreparedImage::solid(2, 1, [255, 0, 100, 128]);
        assert_eq!(img.rgba8_premul.as_slice(), &[128, 0, 50, 128, 128, 0, 50, 128]);
    }
}
