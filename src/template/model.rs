use serde::Deserialize as _;
use serde_json::{Map, Value};

use crate::foundation::error::{CardError, CardResult};

/// One placeable text field of a template.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CardAttribute {
    pub name: String,
    /// Anchor of the text's alphabetic baseline, start-aligned.
    pub x: f64,
    pub y: f64,
    /// CSS `font` shorthand, consumed verbatim by the text stack.
    #[serde(default)]
    pub styling: String,
    /// Degrees, clockwise on screen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

/// A named visual layout for a category of cards, kept as registered.
///
/// Only the `name` key is required. `background` and `attributes` stay raw JSON
/// until a card is compiled against the template: [`Self::background_source`]
/// and [`Self::attribute_list`] type them on use and report a bad shape as
/// [`CardError::Parse`]. A malformed template therefore registers and persists
/// like any other and only fails the cards rendered with it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct CardTemplate {
    name: String,
    body: Map<String, Value>,
}

/// Store key of a JSON `name` value: strings verbatim, anything else as its
/// JSON text (`5` keys as `"5"`).
pub(crate) fn name_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl CardTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut body = Map::new();
        body.insert("name".to_string(), Value::String(name.clone()));
        body.insert("attributes".to_string(), Value::Array(Vec::new()));
        Self { name, body }
    }

    /// Template from a parsed JSON object. Fails only when `name` is absent.
    pub fn from_value(value: Value) -> CardResult<Self> {
        match value {
            Value::Object(body) => Self::try_from(body),
            other => Err(CardError::validation(format!(
                "template must be a JSON object, found {other}"
            ))),
        }
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.body
            .insert("background".to_string(), Value::String(background.into()));
        self
    }

    pub fn with_attribute(mut self, attribute: CardAttribute) -> Self {
        let entry = self
            .body
            .entry("attributes")
            .or_insert_with(|| Value::Array(Vec::new()));
        match entry {
            Value::Array(list) => list.push(attribute.into()),
            other => *other = Value::Array(vec![attribute.into()]),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The template object exactly as registered.
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Background path, if one is set and non-empty.
    pub fn background_source(&self) -> CardResult<Option<&str>> {
        match self.body.get("background") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str()).filter(|s| !s.is_empty())),
            Some(other) => Err(CardError::parse(format!(
                "template '{}': background must be a string, found {other}",
                self.name
            ))),
        }
    }

    /// Typed attribute list. `None` when the template declares no `attributes`.
    pub fn attribute_list(&self) -> CardResult<Option<Vec<CardAttribute>>> {
        match self.body.get("attributes") {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Vec::<CardAttribute>::deserialize(value)
                .map(Some)
                .map_err(|e| {
                    CardError::parse(format!("template '{}' attributes: {e}", self.name))
                }),
        }
    }

    /// Attribute lookup by name. With duplicate names the last entry wins.
    pub fn attribute(&self, name: &str) -> CardResult<Option<CardAttribute>> {
        Ok(self
            .attribute_list()?
            .and_then(|attrs| find_attribute(&attrs, name).cloned()))
    }
}

impl TryFrom<Map<String, Value>> for CardTemplate {
    type Error = CardError;

    fn try_from(body: Map<String, Value>) -> CardResult<Self> {
        let name = body
            .get("name")
            .map(name_key)
            .ok_or_else(|| CardError::validation("template has no name"))?;
        Ok(Self { name, body })
    }
}

impl From<CardTemplate> for Map<String, Value> {
    fn from(template: CardTemplate) -> Self {
        template.body
    }
}

/// Last attribute called `name`.
pub fn find_attribute<'a>(
    attributes: &'a [CardAttribute],
    name: &str,
) -> Option<&'a CardAttribute> {
    attributes.iter().rev().find(|a| a.name == name)
}

/// Names that occur more than once, in first-seen order.
pub fn duplicate_attribute_names(attributes: &[CardAttribute]) -> Vec<&str> {
    let mut dups = Vec::new();
    for (i, a) in attributes.iter().enumerate() {
        if attributes[..i].iter().any(|b| b.name == a.name) && !dups.contains(&a.name.as_str()) {
            dups.push(a.name.as_str());
        }
    }
    dups
}

impl CardAttribute {
    pub fn new(name: impl Into<String>, x: f64, y: f64, styling: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            styling: styling.into(),
            rotation: None,
        }
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }
}

impl From<CardAttribute> for Value {
    fn from(a: CardAttribute) -> Self {
        let mut map = Map::new();
        map.insert("name".to_string(), a.name.into());
        map.insert("x".to_string(), a.x.into());
        map.insert("y".to_string(), a.y.into());
        map.insert("styling".to_string(), a.styling.into());
        if let Some(degrees) = a.rotation {
            map.insert("rotation".to_string(), degrees.into());
        }
        Value::Object(map)
    }
}
