use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Advance width of `text` in pixels using the first installed face of
/// `font_family`. `None` when no matching font is available.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = normalize_family_key(font_family);
        if !self.cache.contains_key(&key) {
            let face = self.load_face(&key);
            if face.is_none() {
                tracing::debug!(family = %key, "no installed font, using width table");
            }
            self.cache.insert(key.clone(), face);
        }
        self.cache.get(&key)?.as_ref()?.measure_width(text, font_size)
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let families = parse_family_list(font_family);
        let families: Vec<Family<'_>> = families.iter().map(FamilyName::as_family).collect();

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::parse(data.to_vec(), index))
            .flatten()
    }
}

enum FamilyName {
    Generic(Family<'static>),
    Named(String),
}

impl FamilyName {
    fn as_family(&self) -> Family<'_> {
        match self {
            FamilyName::Generic(family) => *family,
            FamilyName::Named(name) => Family::Name(name.as_str()),
        }
    }
}

fn parse_family_list(font_family: &str) -> Vec<FamilyName> {
    let mut out = Vec::new();
    for part in font_family.split(',') {
        let raw = part.trim().trim_matches('"').trim_matches('\'');
        if raw.is_empty() {
            continue;
        }
        let name = match raw.to_ascii_lowercase().as_str() {
            "serif" => FamilyName::Generic(Family::Serif),
            "sans-serif" | "system-ui" | "-apple-system" => FamilyName::Generic(Family::SansSerif),
            "monospace" => FamilyName::Generic(Family::Monospace),
            _ => FamilyName::Named(raw.to_string()),
        };
        out.push(name);
    }
    if out.is_empty() {
        out.push(FamilyName::Generic(Family::SansSerif));
    }
    out
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
}

impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
        })
    }

    fn measure_width(&self, text: &str, font_size: f32) -> Option<f32> {
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * 0.56;
        let advance = |units: u16| {
            if units == 0 {
                fallback
            } else {
                units as f32 * scale
            }
        };

        if text.is_ascii() {
            let width: f32 = text
                .bytes()
                .filter(|byte| *byte != b'\n')
                .map(|byte| advance(self.ascii_advances[byte as usize]))
                .sum();
            return Some(width);
        }

        let face = Face::parse(&self.data, self.index).ok()?;
        let width = text
            .chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .map_or(fallback, advance)
            })
            .sum();
        Some(width)
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_zero_width() {
        assert_eq!(measure_text_width("", 12.0, "sans-serif"), Some(0.0));
        assert_eq!(measure_text_width("abc", 0.0, "sans-serif"), Some(0.0));
    }

    #[test]
    fn family_list_maps_generics() {
        let families = parse_family_list("\"Helvetica\", Arial, sans-serif");
        assert_eq!(families.len(), 3);
        assert!(matches!(&families[0], FamilyName::Named(name) if name == "Helvetica"));
        assert!(matches!(families[2], FamilyName::Generic(Family::SansSerif)));
        assert!(matches!(
            parse_family_list(" , ")[0],
            FamilyName::Generic(Family::SansSerif)
        ));
    }
}
