use serde::Deserialize as _;

use crate::{
    foundation::error::{CardError, CardResult},
    template::model::name_key,
};

/// One `{type, text}` pair of a card instance.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InstanceAttribute {
    /// Name of the template attribute this text is placed at.
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Per-card content, combined with a template at render time.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInstanceData {
    /// Matched against template names with the same keying as registration,
    /// so `"templateName": 5` finds a template registered as `"name": 5`.
    #[serde(default, deserialize_with = "template_key")]
    pub template_name: Option<String>,
    #[serde(default)]
    pub art: Option<String>,
    #[serde(default)]
    pub attributes: Option<Vec<InstanceAttribute>>,
}

impl CardInstanceData {
    pub fn new(template_name: impl Into<String>) -> Self {
        Self {
            template_name: Some(template_name.into()),
            art: None,
            attributes: Some(Vec::new()),
        }
    }

    pub fn with_art(mut self, art: impl Into<String>) -> Self {
        self.art = Some(art.into());
        self
    }

    pub fn with_text(mut self, kind: impl Into<String>, text: impl Into<String>) -> Self {
        self.attributes
            .get_or_insert_with(Vec::new)
            .push(InstanceAttribute {
                kind: kind.into(),
                text: text.into(),
            });
        self
    }

    /// Art path, if one is set and non-empty.
    pub fn art_source(&self) -> Option<&str> {
        self.art.as_deref().filter(|s| !s.is_empty())
    }
}

fn template_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<serde_json::Value>::deserialize(deserializer)?
        .as_ref()
        .map(name_key))
}

/// Parse the JSON body of a `card` block. Empty source means "nothing to render".
pub fn parse_instance(source: &str) -> CardResult<Option<CardInstanceData>> {
    if source.trim().is_empty() {
        return Ok(None);
    }
    let data = serde_json::from_str(source)
        .map_err(|e| CardError::parse(format!("card block is not valid card JSON: {e}")))?;
    Ok(Some(data))
}
