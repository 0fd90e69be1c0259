use std::sync::Arc;

use crate::foundation::error::{CardError, CardResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<[u8; 4]> for TextBrushRgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// What parley needs to select exactly one registered face.
#[derive(Clone, Debug, PartialEq)]
struct RegisteredFace {
    family: String,
    weight: parley::style::FontWeight,
    style: parley::style::FontStyle,
    width: parley::style::FontWidth,
}

/// Stateful helper for building Parley text layouts from raw font bytes.
///
/// Fonts are registered once per distinct byte buffer. Every face of a
/// collection is remembered by its index, so the face parley shapes with is the
/// one the rasterizer draws.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    registered: Vec<(Arc<Vec<u8>>, Vec<(u32, RegisteredFace)>)>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: Vec::new(),
        }
    }

    /// Shape and lay out a single unwrapped line of `text` with face `index` of
    /// `font_bytes`.
    pub fn layout_line(
        &mut self,
        text: &str,
        font_bytes: &Arc<Vec<u8>>,
        index: u32,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> CardResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CardError::render("text size must be finite and > 0"));
        }

        let face = self.register(font_bytes, index)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(face.family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontWeight(face.weight));
        builder.push_default(parley::style::StyleProperty::FontStyle(face.style));
        builder.push_default(parley::style::StyleProperty::FontWidth(face.width));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    fn register(&mut self, font_bytes: &Arc<Vec<u8>>, index: u32) -> CardResult<RegisteredFace> {
        let slot = match self
            .registered
            .iter()
            .position(|(bytes, _)| Arc::ptr_eq(bytes, font_bytes))
        {
            Some(slot) => slot,
            None => {
                let families = self.font_ctx.collection.register_fonts(
                    parley::fontique::Blob::from(font_bytes.as_ref().clone()),
                    None,
                );

                let mut faces = Vec::new();
                for (family_id, infos) in families {
                    let family = self
                        .font_ctx
                        .collection
                        .family_name(family_id)
                        .ok_or_else(|| CardError::render("registered font family has no name"))?
                        .to_string();
                    for info in infos {
                        faces.push((
                            info.index(),
                            RegisteredFace {
                                family: family.clone(),
                                weight: info.weight(),
                                style: info.style(),
                                width: info.width(),
                            },
                        ));
                    }
                }
                if faces.is_empty() {
                    return Err(CardError::render("no font families registered from font bytes"));
                }

                self.registered.push((font_bytes.clone(), faces));
                self.registered.len() - 1
            }
        };

        self.registered[slot]
            .1
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, face)| face.clone())
            .ok_or_else(|| {
                CardError::render(format!("font data has no face at index {index}"))
            })
    }
}

/// Alphabetic baseline of the first line, in layout coordinates.
pub fn first_baseline(layout: &parley::Layout<TextBrushRgba8>) -> f32 {
    layout
        .lines()
        .next()
        .map(|line| line.metrics().baseline)
        .unwrap_or(0.0)
}
