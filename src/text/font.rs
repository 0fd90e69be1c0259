//! CSS `font` shorthand parsing, the format of a template attribute's `styling`.
//!
//! Grammar accepted (a subset of CSS Fonts Level 3):
//!
//! ```text
//! [ <style> || <variant> || <weight> || <stretch> ]* <size>[/<line-height>] <family>[, <family>]*
//! ```
//!
//! Relative sizes (`em`, `rem`, `%`) resolve against [`DEFAULT_FONT_SIZE_PX`].

/// Font of a fresh drawing surface, `10px sans-serif`.
pub const DEFAULT_FONT: &str = "10px sans-serif";

pub const DEFAULT_FONT_SIZE_PX: f32 = 10.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Serif,
    SansSerif,
    Monospace,
    Cursive,
    Fantasy,
    Named(String),
}

impl FontFamily {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let quoted = (raw.starts_with('"') && raw.ends_with('"') && raw.len() >= 2)
            || (raw.starts_with('\'') && raw.ends_with('\'') && raw.len() >= 2);
        if quoted {
            let inner = raw[1..raw.len() - 1].trim();
            if inner.is_empty() {
                return None;
            }
            return Some(Self::Named(inner.to_string()));
        }

        let generic = match raw.to_ascii_lowercase().as_str() {
            "serif" => Some(Self::Serif),
            // `sans` is not a CSS generic, but templates in the wild use it for sans-serif.
            "sans-serif" | "sans" => Some(Self::SansSerif),
            "monospace" => Some(Self::Monospace),
            "cursive" => Some(Self::Cursive),
            "fantasy" => Some(Self::Fantasy),
            _ => None,
        };
        Some(generic.unwrap_or_else(|| {
            Self::Named(raw.split_whitespace().collect::<Vec<_>>().join(" "))
        }))
    }
}

/// A parsed font description.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub families: Vec<FontFamily>,
    pub size_px: f32,
    pub weight: u16,
    pub style: FontStyle,
    pub small_caps: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            families: vec![FontFamily::SansSerif],
            size_px: DEFAULT_FONT_SIZE_PX,
            weight: 400,
            style: FontStyle::Normal,
            small_caps: false,
        }
    }
}

impl FontSpec {
    /// Parse a CSS font shorthand. `None` when the string is not a valid font.
    pub fn parse(css: &str) -> Option<Self> {
        let css = css.trim();
        if css.is_empty() {
            return None;
        }

        let mut spec = FontSpec {
            families: Vec::new(),
            ..FontSpec::default()
        };
        let mut weight_set = false;
        let mut style_set = false;
        let mut rest = css;

        // Prefix keywords, up to the size token.
        let size_px = loop {
            let (token, tail) = split_token(rest)?;
            rest = tail;
            let lower = token.to_ascii_lowercase();

            if let Some(size) = parse_size(&lower) {
                break size;
            }
            match lower.as_str() {
                "normal" => {}
                "italic" if !style_set => {
                    spec.style = FontStyle::Italic;
                    style_set = true;
                }
                "oblique" if !style_set => {
                    spec.style = FontStyle::Oblique;
                    style_set = true;
                }
                "small-caps" => spec.small_caps = true,
                "bold" | "bolder" if !weight_set => {
                    spec.weight = 700;
                    weight_set = true;
                }
                "lighter" if !weight_set => {
                    spec.weight = 100;
                    weight_set = true;
                }
                "ultra-condensed" | "extra-condensed" | "condensed" | "semi-condensed"
                | "semi-expanded" | "expanded" | "extra-expanded" | "ultra-expanded" => {}
                _ => {
                    let w = lower.parse::<u16>().ok().filter(|w| (1..=1000).contains(w))?;
                    if weight_set {
                        return None;
                    }
                    spec.weight = w;
                    weight_set = true;
                }
            }
        };
        spec.size_px = size_px;

        let rest = rest.trim_start();
        let rest = match rest.strip_prefix('/') {
            Some(after) => {
                let (line_height, tail) = split_token(after.trim_start())?;
                if !is_line_height(line_height) {
                    return None;
                }
                tail
            }
            None => rest,
        };

        for raw in rest.split(',') {
            spec.families.push(FontFamily::parse(raw)?);
        }
        if spec.families.is_empty() {
            return None;
        }
        Some(spec)
    }
}

/// Split the next whitespace- or `/`-delimited token off `s`.
fn split_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

fn parse_size(token: &str) -> Option<f32> {
    // (number, multiplier, divisor) keeps whole-number conversions exact.
    let (num, mul, div) = if let Some(n) = token.strip_suffix("px") {
        (n, 1.0, 1.0)
    } else if let Some(n) = token.strip_suffix("pt") {
        (n, 4.0, 3.0)
    } else if let Some(n) = token.strip_suffix("rem") {
        (n, DEFAULT_FONT_SIZE_PX, 1.0)
    } else if let Some(n) = token.strip_suffix("em") {
        (n, DEFAULT_FONT_SIZE_PX, 1.0)
    } else if let Some(n) = token.strip_suffix('%') {
        (n, DEFAULT_FONT_SIZE_PX, 100.0)
    } else {
        return None;
    };
    let value: f32 = num.parse().ok()?;
    let px = value * mul / div;
    (px.is_finite() && px > 0.0).then_some(px)
}

fn is_line_height(token: &str) -> bool {
    let t = token.to_ascii_lowercase();
    t == "normal" || parse_size(&t).is_some() || t.parse::<f32>().is_ok_and(|v| v >= 0.0)
}
