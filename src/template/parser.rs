use crate::{
    foundation::error::{CardError, CardResult},
    template::model::{CardTemplate, duplicate_attribute_names},
};

/// Language tag of template-definition blocks.
pub const TEMPLATE_BLOCK_LANGUAGE: &str = "cardTemplate";

const FENCE: &str = "```";

/// Outcome of scanning a document for a template-definition block.
#[derive(Clone, Debug, PartialEq)]
pub enum TemplateBlock {
    /// No opening ```` ```cardTemplate ```` line in the text.
    NotApplicable,
    /// A block was found and parsed but has no `name` key.
    MissingName,
    Parsed(CardTemplate),
}

/// Cheap check used to enable the registration command.
pub fn contains_template_block(text: &str) -> bool {
    text.contains(&format!("{FENCE}{TEMPLATE_BLOCK_LANGUAGE}"))
}

/// Body of the first block opened by ```` ```<language> ````, lines joined without
/// separators. `None` when no opening line exists.
pub fn first_block_body(text: &str, language: &str) -> Option<String> {
    let open = format!("{FENCE}{language}");
    let mut lines = text.lines();
    lines.by_ref().find(|line| *line == open)?;

    let mut body = String::new();
    for line in lines {
        if line == FENCE {
            break;
        }
        body.push_str(line);
    }
    Some(body)
}

/// Bodies of every block opened by ```` ```<language> ````, in document order,
/// each with its lines joined by `\n`.
pub fn fenced_blocks(text: &str, language: &str) -> Vec<String> {
    let open = format!("{FENCE}{language}");
    let mut out = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in text.lines() {
        match current.as_mut() {
            None => {
                if line == open {
                    current = Some(Vec::new());
                }
            }
            Some(body) => {
                if line == FENCE {
                    out.push(body.join("\n"));
                    current = None;
                } else {
                    body.push(line);
                }
            }
        }
    }
    if let Some(body) = current {
        out.push(body.join("\n"));
    }
    out
}

/// Extract and parse the first template-definition block of `text`.
///
/// Later template blocks in the same text are ignored. Malformed JSON is an
/// error and an object without a `name` key is a [`TemplateBlock::MissingName`]
/// decline. Nothing else about the object is checked here: a template whose
/// `background` or `attributes` have the wrong shape still parses, with a
/// warning, and fails when a card is rendered against it.
pub fn parse_template_block(text: &str) -> CardResult<TemplateBlock> {
    let Some(body) = first_block_body(text, TEMPLATE_BLOCK_LANGUAGE) else {
        return Ok(TemplateBlock::NotApplicable);
    };

    let value: serde_json::Value = serde_json::from_str(&body)
        .map_err(|e| CardError::parse(format!("template block is not valid JSON: {e}")))?;
    if value.get("name").is_none() {
        return Ok(TemplateBlock::MissingName);
    }
    let template = CardTemplate::from_value(value)?;

    if let Err(e) = template.background_source() {
        tracing::warn!(
            template = %template.name(),
            error = %e,
            "cards using this template will fail to render"
        );
    }
    match template.attribute_list() {
        Ok(Some(attrs)) => {
            let dups = duplicate_attribute_names(&attrs);
            if !dups.is_empty() {
                tracing::warn!(
                    template = %template.name(),
                    duplicates = ?dups,
                    "duplicate attribute names; the last definition of each is used"
                );
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(
            template = %template.name(),
            error = %e,
            "cards using this template will fail to render"
        ),
    }

    Ok(TemplateBlock::Parsed(template))
}
