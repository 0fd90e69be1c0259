use std::io::Cursor;

use base64::Engine as _;

use crate::{
    foundation::error::{CardError, CardResult},
    render::backend::FrameRGBA,
};

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

pub(crate) fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

/// Straight-alpha copy of the frame's pixels.
pub fn straight_rgba(frame: &FrameRGBA) -> Vec<u8> {
    let mut out = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_in_place(&mut out);
    }
    out
}

/// Encode a rendered card as PNG bytes.
pub fn encode_png(frame: &FrameRGBA) -> CardResult<Vec<u8>> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != expected {
        return Err(CardError::render(format!(
            "frame buffer is {} bytes, expected {expected}",
            frame.data.len()
        )));
    }

    let rgba = image::RgbaImage::from_raw(frame.width, frame.height, straight_rgba(frame))
        .ok_or_else(|| CardError::render("frame buffer does not match its dimensions"))?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(rgba)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| CardError::render(format!("png encode failed: {e}")))?;
    Ok(buf)
}

/// `data:image/png;base64,...` URI for the frame, suitable for an `<img src>`.
pub fn png_data_uri(frame: &FrameRGBA) -> CardResult<String> {
    let png = encode_png(frame)?;
    let mut uri = String::with_capacity(PNG_DATA_URI_PREFIX.len() + png.len().div_ceil(3) * 4);
    uri.push_str(PNG_DATA_URI_PREFIX);
    base64::engine::general_purpose::STANDARD.encode_string(&png, &mut uri);
    Ok(uri)
}
