use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::{PreparedImage, resolve::ImageResolver},
    compile::plan::{CardPlan, DrawOp},
    foundation::core::{Affine, Canvas, Point, Rect},
    foundation::error::{CardError, CardResult},
    render::backend::{FrameRGBA, RenderBackend, RenderSettings},
    text::{
        font::{FontFamily, FontSpec, FontStyle},
        fonts::{FontLibrary, FontSettings, ResolvedFace},
        layout::{TextBrushRgba8, TextLayoutEngine, first_baseline},
    },
};

/// Faces are picked by family list, weight and style; size only affects layout.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct FaceKey {
    families: Vec<FontFamily>,
    weight: u16,
    style: FontStyle,
}

impl FaceKey {
    fn of(spec: &FontSpec) -> Self {
        Self {
            families: spec.families.clone(),
            weight: spec.weight,
            style: spec.style,
        }
    }
}

#[derive(Clone)]
struct CachedFace {
    face: ResolvedFace,
    font: vello_cpu::peniko::FontData,
}

pub struct CpuBackend {
    settings: RenderSettings,
    fonts: FontLibrary,
    text: TextLayoutEngine,
    face_cache: HashMap<FaceKey, CachedFace>,
}

impl CpuBackend {
    pub fn new(settings: RenderSettings, fonts: FontLibrary) -> Self {
        Self {
            settings,
            fonts,
            text: TextLayoutEngine::new(),
            face_cache: HashMap::new(),
        }
    }

    /// Backend with a font library built from `fonts`.
    pub fn with_font_settings(settings: RenderSettings, fonts: &FontSettings) -> Self {
        Self::new(settings, FontLibrary::new(fonts))
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    fn face_for(&mut self, spec: &FontSpec) -> CardResult<CachedFace> {
        let key = FaceKey::of(spec);
        if let Some(cached) = self.face_cache.get(&key) {
            return Ok(cached.clone());
        }

        let face = self.fonts.resolve(spec)?;
        tracing::debug!(family = %face.family, weight = spec.weight, "resolved font face");
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(face.font_bytes.as_ref().clone()),
            face.index,
        );
        let cached = CachedFace { face, font };
        self.face_cache.insert(key, cached.clone());
        Ok(cached)
    }

    fn draw_op(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        op: &DrawOp,
        assets: &mut dyn ImageResolver,
    ) -> CardResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match op {
            DrawOp::Image {
                layer,
                source,
                dest,
            } => {
                tracing::debug!(?layer, source = %source, "draw image layer");
                let image = assets.load(source)?;
                let (paint, w, h) = image_paint(&image)?;

                ctx.set_transform(affine_to_cpu(stretch_to(*dest, w, h)));
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
                Ok(())
            }
            DrawOp::Text {
                attribute: _,
                text,
                font,
                anchor,
                transform,
            } => {
                let cached = self.face_for(font)?;
                let brush = TextBrushRgba8::from(self.settings.text_rgba);
                let layout = self.text.layout_line(
                    text,
                    &cached.face.font_bytes,
                    cached.face.index,
                    font.size_px,
                    brush,
                )?;

                let baseline = f64::from(first_baseline(&layout));
                ctx.set_transform(affine_to_cpu(text_transform(*transform, *anchor, baseline)));

                for line in layout.lines() {
                    for item in line.items() {
                        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                            continue;
                        };

                        let brush = run.style().brush;
                        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                            brush.r, brush.g, brush.b, brush.a,
                        ));

                        let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x,
                            y: g.y,
                        });
                        ctx.glyph_run(&cached.font)
                            .font_size(run.run().font_size())
                            .fill_glyphs(glyphs);
                    }
                }
                Ok(())
            }
        }
    }
}

impl RenderBackend for CpuBackend {
    fn canvas(&self) -> Canvas {
        self.settings.canvas
    }

    #[tracing::instrument(skip_all, fields(ops = plan.ops.len()))]
    fn render_plan(
        &mut self,
        plan: &CardPlan,
        assets: &mut dyn ImageResolver,
    ) -> CardResult<FrameRGBA> {
        let width: u16 = plan
            .canvas
            .width
            .try_into()
            .map_err(|_| CardError::render("canvas width exceeds u16"))?;
        let height: u16 = plan
            .canvas
            .height
            .try_into()
            .map_err(|_| CardError::render("canvas height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(CardError::render("canvas width/height must be > 0"));
        }

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        if let Some([r, g, b, a]) = self.settings.clear_rgba {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));
        }

        for op in &plan.ops {
            self.draw_op(&mut ctx, op, assets)?;
        }

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: plan.canvas.width,
            height: plan.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

/// Map the `w`x`h` image space onto `dest`.
fn stretch_to(dest: Rect, w: f64, h: f64) -> Affine {
    Affine::translate((dest.x0, dest.y0))
        * Affine::scale_non_uniform(dest.width() / w, dest.height() / h)
}

/// Place a layout whose first baseline sits at `baseline` so that it starts at
/// `anchor`, then apply the op's own transform.
fn text_transform(op_transform: Affine, anchor: Point, baseline: f64) -> Affine {
    op_transform * Affine::translate((anchor.x, anchor.y - baseline))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_paint(image: &PreparedImage) -> CardResult<(vello_cpu::Image, f64, f64)> {
    if image.width == 0 || image.height == 0 {
        return Err(CardError::resource("image has zero width or height"));
    }
    let pixmap =
        image_premul_bytes_to_pixmap(image.rgba8_premul.as_slice(), image.width, image.height)?;
    let paint = vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    };
    Ok((paint, f64::from(image.width), f64::from(image.height)))
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> CardResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CardError::resource("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CardError::resource("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(CardError::resource("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], a,
        ]));
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}
