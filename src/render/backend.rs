use crate::{
    assets::resolve::ImageResolver,
    compile::plan::CardPlan,
    foundation::core::Canvas,
    foundation::error::CardResult,
};

/// Rendered card pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at (`x`, `y`) as stored (premultiplied when [`Self::premultiplied`]).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

pub trait RenderBackend {
    /// Canvas that plans for this backend are compiled against.
    fn canvas(&self) -> Canvas {
        Canvas::CARD
    }

    fn render_plan(
        &mut self,
        plan: &CardPlan,
        assets: &mut dyn ImageResolver,
    ) -> CardResult<FrameRGBA>;
}

#[derive(Clone, Debug)]
pub struct RenderSettings {
    pub canvas: Canvas,
    /// Straight-alpha fill drawn beneath every layer; `None` leaves the canvas transparent.
    pub clear_rgba: Option<[u8; 4]>,
    /// Straight-alpha text fill color.
    pub text_rgba: [u8; 4],
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            canvas: Canvas::CARD,
            clear_rgba: None,
            text_rgba: [0, 0, 0, 255],
        }
    }
}
