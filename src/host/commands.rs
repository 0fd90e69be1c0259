use crate::{
    foundation::error::CardResult,
    template::{
        parser::{TemplateBlock, contains_template_block, parse_template_block},
        store::{TemplateSink, TemplateStore},
    },
};

/// Result of running [`AddTemplateCommand`] on a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The document has no template block.
    NotApplicable,
    /// The block parsed but has no `name` key; nothing was stored.
    Declined,
    Registered { name: String, replaced: bool },
}

/// "Add card template": register the document's first `cardTemplate` block.
#[derive(Clone, Copy, Debug, Default)]
pub struct AddTemplateCommand;

impl AddTemplateCommand {
    pub const ID: &'static str = "add-card-template";
    pub const NAME: &'static str = "Add card template";

    /// Whether the command should be offered for `document`.
    pub fn check(&self, document: &str) -> bool {
        contains_template_block(document)
    }

    /// Parse, upsert and persist. A failed save leaves `store` as it was.
    #[tracing::instrument(skip_all)]
    pub fn run(
        &self,
        store: &mut TemplateStore,
        sink: &mut dyn TemplateSink,
        document: &str,
    ) -> CardResult<RegisterOutcome> {
        if !self.check(document) {
            return Ok(RegisterOutcome::NotApplicable);
        }

        let template = match parse_template_block(document)? {
            TemplateBlock::NotApplicable => return Ok(RegisterOutcome::NotApplicable),
            TemplateBlock::MissingName => {
                tracing::debug!("template block has no name, declining");
                return Ok(RegisterOutcome::Declined);
            }
            TemplateBlock::Parsed(template) => template,
        };

        let name = template.name().to_string();
        let upsert = store.upsert(template);
        let replaced = upsert.replaced();

        if let Err(e) = store.save_to(sink) {
            tracing::warn!(template = %name, error = %e, "saving templates failed, rolling back");
            store.revert(upsert);
            return Err(e);
        }

        tracing::info!(template = %name, replaced, "registered card template");
        Ok(RegisterOutcome::Registered { name, replaced })
    }
}
