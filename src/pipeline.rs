use crate::{
    assets::resolve::ImageResolver,
    card::instance::CardInstanceData,
    compile::plan::compile_card,
    foundation::error::CardResult,
    render::backend::{FrameRGBA, RenderBackend},
    template::store::TemplateStore,
};

/// Composite one card. `Ok(None)` when the instance names no known template.
pub fn render_card(
    store: &TemplateStore,
    instance: &CardInstanceData,
    backend: &mut dyn RenderBackend,
    assets: &mut dyn ImageResolver,
) -> CardResult<Option<FrameRGBA>> {
    let Some(name) = instance.template_name.as_deref() else {
        tracing::debug!("card has no templateName");
        return Ok(None);
    };
    let Some(template) = store.find_by_name(name) else {
        tracing::debug!(template = name, "unknown template");
        return Ok(None);
    };

    let plan = compile_card(template, instance, backend.canvas())?;
    backend.render_plan(&plan, assets).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assets::{PreparedImage, resolve::MemoryImageResolver},
        compile::plan::CardPlan,
        foundation::core::Canvas,
        template::model::CardTemplate,
    };

    /// Records plans instead of rasterizing them.
    #[derive(Default)]
    struct RecordingBackend {
        plans: Vec<CardPlan>,
    }

    impl RenderBackend for RecordingBackend {
        fn render_plan(
            &mut self,
            plan: &CardPlan,
            assets: &mut dyn ImageResolver,
        ) -> CardResult<FrameRGBA> {
            for op in &plan.ops {
                if let crate::compile::plan::DrawOp::Image { source, .. } = op {
                    assets.load(source)?;
                }
            }
            self.plans.push(plan.clone());
            Ok(FrameRGBA {
                width: plan.canvas.width,
                height: plan.canvas.height,
                data: Vec::new(),
                premultiplied: true,
            })
        }
    }

    fn store() -> TemplateStore {
        TemplateStore::from_templates(vec![CardTemplate::new("Fire").with_background("bg.png")])
    }

    #[test]
    fn unknown_or_missing_template_renders_nothing() {
        let mut backend = RecordingBackend::default();
        let mut assets = MemoryImageResolver::new();

        let unknown = CardInstanceData::new("Water");
        assert!(
            render_card(&store(), &unknown, &mut backend, &mut assets)
                .unwrap()
                .is_none()
        );

        let unnamed = CardInstanceData::default();
        assert!(
            render_card(&store(), &unnamed, &mut backend, &mut assets)
                .unwrap()
                .is_none()
        );
        assert!(backend.plans.is_empty());
        assert!(assets.loads().is_empty());
    }

    #[test]
    fn known_template_is_compiled_at_backend_canvas() {
        let mut backend = RecordingBackend::default();
        let mut assets = MemoryImageResolver::new();
        assets.insert("bg.png", PreparedImage::solid(1, 1, [0, 0, 255, 255]));
        assets.insert("art.png", PreparedImage::solid(1, 1, [255, 0, 0, 255]));

        let instance = CardInstanceData::new("Fire").with_art("art.png");
        let frame = render_card(&store(), &instance, &mut backend, &mut assets)
            .unwrap()
            .unwrap();
        assert_eq!((frame.width, frame.height), (700, 1050));
        assert_eq!(backend.plans[0].canvas, Canvas::CARD);
        assert_eq!(assets.loads(), ["art.png", "bg.png"]);
    }

    #[test]
    fn resolution_failure_aborts_render() {
        let mut backend = RecordingBackend::default();
        let mut assets = MemoryImageResolver::new();
        let err = render_card(
            &store(),
            &CardInstanceData::new("Fire"),
            &mut backend,
            &mut assets,
        )
        .unwrap_err();
        assert!(matches!(err, crate::foundation::error::CardError::Resource(_)));
        assert!(backend.plans.is_empty());
    }
}
