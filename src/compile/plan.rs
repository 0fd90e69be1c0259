use crate::{
    card::instance::CardInstanceData,
    foundation::core::{Affine, Canvas, Point, Rect, rotation_about},
    foundation::error::{CardError, CardResult},
    template::model::{CardTemplate, find_attribute},
    text::font::{DEFAULT_FONT, FontSpec},
};

/// Ordered draw operations for one card, back to front.
#[derive(Clone, Debug, PartialEq)]
pub struct CardPlan {
    pub canvas: Canvas,
    pub ops: Vec<DrawOp>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageLayer {
    Art,
    Background,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Resource image stretched to fill `dest`.
    Image {
        layer: ImageLayer,
        source: String,
        dest: Rect,
    },
    /// Text whose alphabetic baseline starts at `anchor`, drawn under `transform`.
    Text {
        attribute: String,
        text: String,
        font: FontSpec,
        anchor: Point,
        transform: Affine,
    },
}

impl CardPlan {
    pub fn text_ops(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Text { .. }))
    }
}

/// Turn a resolved template and one card's data into a [`CardPlan`].
///
/// Layers: art, then the template background, then one text op per instance
/// attribute whose `type` names a template attribute. Unknown types are skipped.
/// Each text op carries its own transform, so a rotation never outlives the
/// attribute that declared it.
///
/// The template's raw `background` and `attributes` are typed here; a shape
/// that does not fit is a [`CardError::Parse`]. `attributes` is only read when
/// the card has entries to place.
#[tracing::instrument(skip_all, fields(template = %template.name()))]
pub fn compile_card(
    template: &CardTemplate,
    instance: &CardInstanceData,
    canvas: Canvas,
) -> CardResult<CardPlan> {
    let mut ops = Vec::new();
    let dest = canvas.rect();

    if let Some(art) = instance.art_source() {
        ops.push(DrawOp::Image {
            layer: ImageLayer::Art,
            source: art.to_string(),
            dest,
        });
    }
    if let Some(background) = template.background_source()? {
        ops.push(DrawOp::Image {
            layer: ImageLayer::Background,
            source: background.to_string(),
            dest,
        });
    }

    let entries = instance.attributes.as_deref().ok_or_else(|| {
        CardError::validation(format!(
            "card for template '{}' has no attributes list",
            template.name()
        ))
    })?;
    let attributes = if entries.is_empty() {
        Vec::new()
    } else {
        template.attribute_list()?.ok_or_else(|| {
            CardError::validation(format!(
                "template '{}' has no attributes list",
                template.name()
            ))
        })?
    };

    let mut active_font = FontSpec::parse(DEFAULT_FONT).unwrap_or_default();
    for entry in entries {
        let Some(attr) = find_attribute(&attributes, &entry.kind) else {
            tracing::debug!(kind = %entry.kind, "no template attribute for type, skipping");
            continue;
        };

        match FontSpec::parse(&attr.styling) {
            Some(font) => active_font = font,
            None => tracing::warn!(
                attribute = %attr.name,
                styling = %attr.styling,
                "unparseable font, keeping the previous one"
            ),
        }

        let anchor = Point::new(attr.x, attr.y);
        let transform = match attr.rotation {
            Some(degrees) => rotation_about(degrees, anchor),
            None => Affine::IDENTITY,
        };

        ops.push(DrawOp::Text {
            attribute: attr.name.clone(),
            text: entry.text.clone(),
            font: active_font.clone(),
            anchor,
            transform,
        });
    }

    Ok(CardPlan { canvas, ops })
}
