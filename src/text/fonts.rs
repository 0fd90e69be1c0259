use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use usvg::fontdb;

use crate::{
    foundation::error::{CardError, CardResult},
    text::font::{FontFamily, FontSpec, FontStyle},
};

/// Environment variable naming an extra font directory.
pub const FONT_DIR_ENV: &str = "CARDSMITH_FONT_DIR";

/// Where the font library looks for faces.
#[derive(Clone, Debug)]
pub struct FontSettings {
    pub load_system_fonts: bool,
    pub font_dirs: Vec<PathBuf>,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            load_system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

impl FontSettings {
    /// Defaults plus the directory named by [`FONT_DIR_ENV`], if set.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Some(dir) = std::env::var_os(FONT_DIR_ENV).filter(|v| !v.is_empty()) {
            settings.font_dirs.push(PathBuf::from(dir));
        }
        settings
    }

    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(dir.into());
        self
    }

    pub fn with_system_fonts(mut self, enabled: bool) -> Self {
        self.load_system_fonts = enabled;
        self
    }
}

/// Font bytes selected for a [`FontSpec`].
#[derive(Clone)]
pub struct ResolvedFace {
    pub font_bytes: Arc<Vec<u8>>,
    /// Face index inside a collection file.
    pub index: u32,
    pub family: String,
}

impl std::fmt::Debug for ResolvedFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFace")
            .field("font_bytes_len", &self.font_bytes.len())
            .field("index", &self.index)
            .field("family", &self.family)
            .finish()
    }
}

/// Database of available faces, queried by family/weight/style.
pub struct FontLibrary {
    db: fontdb::Database,
}

impl FontLibrary {
    pub fn new(settings: &FontSettings) -> Self {
        let mut db = fontdb::Database::new();
        if settings.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &settings.font_dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font library ready");
        Self { db }
    }

    /// Library with no faces; fonts can be added with [`Self::load_font_data`].
    pub fn empty() -> Self {
        Self {
            db: fontdb::Database::new(),
        }
    }

    pub fn load_font_data(&mut self, bytes: Vec<u8>) {
        self.db.load_font_data(bytes);
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Pick a face for `spec`: requested families in order, then generic
    /// fallbacks, then any face at all.
    pub fn resolve(&self, spec: &FontSpec) -> CardResult<ResolvedFace> {
        let mut families = Vec::<fontdb::Family<'_>>::with_capacity(spec.families.len() + 3);
        for family in &spec.families {
            families.push(match family {
                FontFamily::Serif => fontdb::Family::Serif,
                FontFamily::SansSerif => fontdb::Family::SansSerif,
                FontFamily::Monospace => fontdb::Family::Monospace,
                FontFamily::Cursive => fontdb::Family::Cursive,
                FontFamily::Fantasy => fontdb::Family::Fantasy,
                FontFamily::Named(name) => fontdb::Family::Name(name.as_str()),
            });
        }
        families.push(fontdb::Family::SansSerif);
        families.push(fontdb::Family::Serif);
        families.push(fontdb::Family::Monospace);

        let style = match spec.style {
            FontStyle::Normal => fontdb::Style::Normal,
            FontStyle::Italic => fontdb::Style::Italic,
            FontStyle::Oblique => fontdb::Style::Oblique,
        };
        let query = fontdb::Query {
            families: &families,
            weight: fontdb::Weight(spec.weight),
            stretch: fontdb::Stretch::Normal,
            style,
        };

        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))
            .ok_or_else(|| CardError::render("no font faces available"))?;

        let family = self
            .db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_else(|| "unknown".to_string());

        let (font_bytes, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| CardError::render(format!("font data for '{family}' unavailable")))?;

        Ok(ResolvedFace {
            font_bytes: Arc::new(font_bytes),
            index,
            family,
        })
    }
}

fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}
