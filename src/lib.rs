//! cardsmith composites trading-card images from JSON templates.
//!
//! - Register a [`CardTemplate`] from a ```` ```cardTemplate ```` block into a [`TemplateStore`]
//! - Compile a card's [`CardInstanceData`] against its template into a [`CardPlan`]
//! - Rasterize the plan on the CPU with [`CpuBackend`] and encode it as PNG
#![forbid(unsafe_code)]

pub mod assets;
pub mod card;
pub mod compile;
pub mod foundation;
pub mod host;
pub mod pipeline;
pub mod render;
pub mod template;
pub mod text;

pub use crate::assets::PreparedImage;
pub use crate::assets::resolve::{FsImageResolver, ImageResolver, MemoryImageResolver};
pub use crate::card::instance::{CardInstanceData, InstanceAttribute, parse_instance};
pub use crate::compile::plan::{CardPlan, DrawOp, ImageLayer, compile_card};
pub use crate::foundation::core::{Affine, CARD_HEIGHT, CARD_WIDTH, Canvas, Point, Rect};
pub use crate::foundation::error::{CardError, CardResult};
pub use crate::host::block::{CARD_BLOCK_LANGUAGE, CardBlockRenderer, CardBlockView};
pub use crate::host::commands::{AddTemplateCommand, RegisterOutcome};
pub use crate::pipeline::render_card;
pub use crate::render::backend::{FrameRGBA, RenderBackend, RenderSettings};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::encode::{encode_png, png_data_uri};
pub use crate::template::model::{CardAttribute, CardTemplate};
pub use crate::template::parser::{TemplateBlock, fenced_blocks, parse_template_block};
pub use crate::template::store::{JsonFileSink, MemorySink, TemplateSink, TemplateStore, Upsert};
pub use crate::text::font::FontSpec;
pub use crate::text::fonts::{FontLibrary, FontSettings};
