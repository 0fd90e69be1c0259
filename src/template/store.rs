use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    foundation::error::{CardError, CardResult},
    template::model::CardTemplate,
};

/// Ordered collection of card templates, unique by name.
///
/// Serialized as `{"data": [...]}`; a missing `data` key loads as an empty list.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TemplateStore {
    #[serde(default)]
    data: Vec<CardTemplate>,
}

/// Result of [`TemplateStore::upsert`].
#[derive(Clone, Debug, PartialEq)]
pub enum Upsert {
    /// No template had this name; it was appended.
    Inserted { index: usize },
    /// The template at `index` was replaced in place.
    Replaced {
        index: usize,
        previous: Box<CardTemplate>,
    },
}

impl Upsert {
    pub fn index(&self) -> usize {
        match self {
            Upsert::Inserted { index } | Upsert::Replaced { index, .. } => *index,
        }
    }

    pub fn replaced(&self) -> bool {
        matches!(self, Upsert::Replaced { .. })
    }
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_templates(data: Vec<CardTemplate>) -> Self {
        Self { data }
    }

    /// Insert `template`, or replace the slot holding a template of the same name.
    pub fn upsert(&mut self, template: CardTemplate) -> Upsert {
        match self.data.iter().position(|t| t.name() == template.name()) {
            Some(index) => {
                let previous = std::mem::replace(&mut self.data[index], template);
                Upsert::Replaced {
                    index,
                    previous: Box::new(previous),
                }
            }
            None => {
                self.data.push(template);
                Upsert::Inserted {
                    index: self.data.len() - 1,
                }
            }
        }
    }

    /// Undo an [`Upsert`] returned by the most recent call to [`Self::upsert`].
    pub fn revert(&mut self, upsert: Upsert) {
        match upsert {
            Upsert::Inserted { index } => {
                if index + 1 == self.data.len() {
                    self.data.pop();
                }
            }
            Upsert::Replaced { index, previous } => {
                if let Some(slot) = self.data.get_mut(index) {
                    *slot = *previous;
                }
            }
        }
    }

    pub fn find_by_name(&self, name: &str) -> Option<&CardTemplate> {
        self.data.iter().find(|t| t.name() == name)
    }

    pub fn templates(&self) -> &[CardTemplate] {
        &self.data
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.data.iter().map(CardTemplate::name)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn from_json_str(s: &str) -> CardResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| CardError::serde(format!("decode template collection: {e}")))
    }

    pub fn to_json_string(&self) -> CardResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CardError::serde(format!("encode template collection: {e}")))
    }

    /// Load a persisted collection. A missing file yields an empty store.
    pub fn load_json(path: &Path) -> CardResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "template collection missing, starting empty");
            return Ok(Self::default());
        }
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read template collection '{}'", path.display()))?;
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        Self::from_json_str(&s)
    }

    /// Persist the whole collection through `sink` (e.g. on shutdown).
    pub fn save_to(&self, sink: &mut dyn TemplateSink) -> CardResult<()> {
        sink.save(self)
    }
}

/// Persistence collaborator invoked after every registration.
pub trait TemplateSink {
    fn save(&mut self, store: &TemplateStore) -> CardResult<()>;
}

/// Writes the collection as pretty JSON to a file.
#[derive(Clone, Debug)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TemplateSink for JsonFileSink {
    fn save(&mut self, store: &TemplateStore) -> CardResult<()> {
        let json = store.to_json_string()?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create store dir '{}'", parent.display()))?;
        }

        // Sibling temp file, then rename over the target.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json.as_bytes())
            .with_context(|| format!("write template collection '{}'", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace template collection '{}'", self.path.display()))?;
        Ok(())
    }
}

/// Keeps the last saved JSON in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub saved: Option<String>,
    pub saves: usize,
}

impl TemplateSink for MemorySink {
    fn save(&mut self, store: &TemplateStore) -> CardResult<()> {
        self.saved = Some(store.to_json_string()?);
        self.saves += 1;
        Ok(())
    }
}
