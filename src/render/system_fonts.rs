//! Font catalog backed by the fonts installed on this machine.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};

use super::font::{FontCatalog, FontFace, FontStyle, FontWeight};

pub struct SystemFontCatalog {
    db: Database,
}

impl std::fmt::Debug for SystemFontCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemFontCatalog")
            .field("faces", &self.db.len())
            .finish()
    }
}

impl SystemFontCatalog {
    /// Scan the system font directories.
    pub fn load() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");
        Self { db }
    }

    pub fn from_database(db: Database) -> Self {
        Self { db }
    }
}

fn to_db_style(style: FontStyle) -> Style {
    match style {
        FontStyle::Normal => Style::Normal,
        FontStyle::Italic => Style::Italic,
        FontStyle::Oblique => Style::Oblique,
    }
}

fn from_db_style(style: Style) -> FontStyle {
    match style {
        Style::Normal => FontStyle::Normal,
        Style::Italic => FontStyle::Italic,
        Style::Oblique => FontStyle::Oblique,
    }
}

impl FontCatalog for SystemFontCatalog {
    fn best_match(&self, family: &str, weight: FontWeight, style: FontStyle) -> Option<FontFace> {
        let families = [Family::Name(family)];
        let query = Query {
            families: &families,
            weight: Weight(weight.value()),
            stretch: Stretch::Normal,
            style: to_db_style(style),
        };
        let id = self.db.query(&query)?;
        let face = self.db.face(id)?;
        let name = face
            .families
            .iter()
            .map(|(name, _)| name.as_str())
            .find(|name| name.eq_ignore_ascii_case(family))?;
        Some(FontFace::new(
            name,
            FontWeight::new(face.weight.0),
            from_db_style(face.style),
        ))
    }
}
