//! Font family parsing and resolution.
//!
//! Users type family names the way font menus show them, often with the
//! face baked in ("Inter-Bold Italic", "游ゴシック 太"). [`FontResolver`]
//! peels recognised weight/style suffixes off such names, checks the
//! result against a [`FontCatalog`], and caches successful lookups by the
//! raw request.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Font weight on the usual 1..=1000 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const THIN: Self = Self(100);
    pub const EXTRA_LIGHT: Self = Self(200);
    pub const LIGHT: Self = Self(300);
    pub const SEMI_LIGHT: Self = Self(350);
    pub const NORMAL: Self = Self(400);
    pub const MEDIUM: Self = Self(500);
    pub const SEMI_BOLD: Self = Self(600);
    pub const BOLD: Self = Self(700);
    pub const EXTRA_BOLD: Self = Self(800);
    pub const BLACK: Self = Self(900);
    pub const EXTRA_BLACK: Self = Self(950);

    /// Creates a weight, clamped to 1..=1000.
    pub fn new(weight: u16) -> Self {
        Self(weight.clamp(1, 1000))
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub fn is_slanted(self) -> bool {
        matches!(self, Self::Italic | Self::Oblique)
    }
}

/// A concrete face known to a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontFace {
    pub family: String,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl FontFace {
    pub fn new(family: impl Into<String>, weight: FontWeight, style: FontStyle) -> Self {
        Self {
            family: family.into(),
            weight,
            style,
        }
    }
}

/// Source of installed fonts.
pub trait FontCatalog {
    /// Closest face of the family named exactly `family` (ASCII
    /// case-insensitive), or `None` when no such family exists.
    fn best_match(&self, family: &str, weight: FontWeight, style: FontStyle) -> Option<FontFace>;
}

/// Pick the face closest to the request: matching slant first, then the
/// nearest weight.
pub fn closest_face<'a, I>(faces: I, weight: FontWeight, style: FontStyle) -> Option<&'a FontFace>
where
    I: IntoIterator<Item = &'a FontFace>,
{
    faces.into_iter().min_by_key(|face| {
        let slant_penalty = if face.style == style {
            0
        } else if face.style.is_slanted() == style.is_slanted() {
            1
        } else {
            2
        };
        (slant_penalty, face.weight.0.abs_diff(weight.0))
    })
}

/// In-memory catalog, for tests and the CLI's `--font` list.
#[derive(Debug, Clone, Default)]
pub struct MemoryFontCatalog {
    faces: Vec<FontFace>,
}

impl MemoryFontCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with regular, bold, italic and bold italic faces for each family.
    pub fn with_families<I, S>(families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::new();
        for family in families {
            catalog.add_family(family.as_ref());
        }
        catalog
    }

    pub fn add_family(&mut self, family: &str) {
        for weight in [FontWeight::NORMAL, FontWeight::BOLD] {
            for style in [FontStyle::Normal, FontStyle::Italic] {
                self.add_face(FontFace::new(family, weight, style));
            }
        }
    }

    pub fn add_face(&mut self, face: FontFace) {
        if !self.faces.contains(&face) {
            self.faces.push(face);
        }
    }

    pub fn faces(&self) -> &[FontFace] {
        &self.faces
    }
}

impl FontCatalog for MemoryFontCatalog {
    fn best_match(&self, family: &str, weight: FontWeight, style: FontStyle) -> Option<FontFace> {
        let family = family.trim();
        closest_face(
            self.faces.iter().filter(|f| f.family.eq_ignore_ascii_case(family)),
            weight,
            style,
        )
        .cloned()
    }
}

/// Weight words recognised at the end of a family name, longest first.
pub const WEIGHT_SUFFIXES: &[(&str, FontWeight)] = &[
    ("ExtraBlack", FontWeight::EXTRA_BLACK),
    ("UltraBlack", FontWeight::EXTRA_BLACK),
    ("ExtraLight", FontWeight::EXTRA_LIGHT),
    ("UltraLight", FontWeight::EXTRA_LIGHT),
    ("ExtraBold", FontWeight::EXTRA_BOLD),
    ("UltraBold", FontWeight::EXTRA_BOLD),
    ("SemiLight", FontWeight::SEMI_LIGHT),
    ("SemiBold", FontWeight::SEMI_BOLD),
    ("DemiBold", FontWeight::SEMI_BOLD),
    ("Regular", FontWeight::NORMAL),
    ("Medium", FontWeight::MEDIUM),
    ("Normal", FontWeight::NORMAL),
    ("Light", FontWeight::LIGHT),
    ("Black", FontWeight::BLACK),
    ("Heavy", FontWeight::BLACK),
    ("Thin", FontWeight::THIN),
    ("Bold", FontWeight::BOLD),
    ("W1", FontWeight::THIN),
    ("W2", FontWeight::EXTRA_LIGHT),
    ("W3", FontWeight::LIGHT),
    ("W4", FontWeight::NORMAL),
    ("W5", FontWeight::MEDIUM),
    ("W6", FontWeight::SEMI_BOLD),
    ("W7", FontWeight::BOLD),
    ("W8", FontWeight::EXTRA_BOLD),
    ("W9", FontWeight::BLACK),
    ("極太", FontWeight::BLACK),
    ("極細", FontWeight::EXTRA_LIGHT),
    ("太", FontWeight::BOLD),
    ("中", FontWeight::MEDIUM),
    ("細", FontWeight::LIGHT),
];

/// Style words recognised at the end of a family name, longest first.
pub const STYLE_SUFFIXES: &[(&str, FontStyle)] = &[
    ("Oblique", FontStyle::Oblique),
    ("Italic", FontStyle::Italic),
];

/// Characters that separate a family name from its suffix.
const SEPARATORS: [char; 2] = [' ', '-'];

/// Dash look-alikes folded to `-` before matching.
const DASH_VARIANTS: [char; 7] = [
    '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}', '\u{FF0D}',
];

/// Replace typographic dashes with a plain hyphen.
pub fn normalize_dashes(name: &str) -> String {
    name.chars()
        .map(|c| if DASH_VARIANTS.contains(&c) { '-' } else { c })
        .collect()
}

/// Strip `sep + word` from the end of `name` (ASCII case-insensitive).
/// Returns the remaining family, or `None` if it would be empty.
fn strip_word<'a>(name: &'a str, word: &str) -> Option<&'a str> {
    let start = name.len().checked_sub(word.len())?;
    let tail = name.get(start..)?;
    if !tail.eq_ignore_ascii_case(word) {
        return None;
    }
    let head = name.get(..start)?;
    let rest = head.strip_suffix(|c: char| SEPARATORS.contains(&c))?;
    let rest = rest.trim_end();
    (!rest.is_empty()).then_some(rest)
}

/// Family with every recognised weight/style suffix removed, plus what the
/// suffixes asked for. `weight`/`style` are the values used when the name
/// carries no suffix of that kind.
pub fn split_family(name: &str, weight: FontWeight, style: FontStyle) -> (String, FontWeight, FontStyle) {
    let mut family = name.trim();
    let mut weight = weight;
    let mut style = style;
    loop {
        let mut stripped = false;
        if let Some((rest, w)) = WEIGHT_SUFFIXES
            .iter()
            .find_map(|(word, w)| strip_word(family, word).map(|rest| (rest, *w)))
        {
            family = rest;
            weight = w;
            stripped = true;
        }
        if let Some((rest, s)) = STYLE_SUFFIXES
            .iter()
            .find_map(|(word, s)| strip_word(family, word).map(|rest| (rest, *s)))
        {
            family = rest;
            style = s;
            stripped = true;
        }
        if !stripped {
            break;
        }
    }
    (family.to_string(), weight, style)
}

/// Outcome of resolving a family string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedFont {
    pub family: String,
    pub weight: FontWeight,
    pub style: FontStyle,
    /// False when the catalog knew neither the raw nor the stripped name.
    pub found: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FontKey {
    family: String,
    style: FontStyle,
    weight: FontWeight,
}

/// Cached font lookups in front of a [`FontCatalog`].
pub struct FontResolver {
    catalog: Box<dyn FontCatalog>,
    cache: HashMap<FontKey, ResolvedFont>,
    queries: usize,
}

impl std::fmt::Debug for FontResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontResolver")
            .field("cached", &self.cache.len())
            .field("queries", &self.queries)
            .finish_non_exhaustive()
    }
}

impl Default for FontResolver {
    fn default() -> Self {
        Self::new(Box::new(MemoryFontCatalog::new()))
    }
}

impl FontResolver {
    pub fn new(catalog: Box<dyn FontCatalog>) -> Self {
        Self {
            catalog,
            cache: HashMap::new(),
            queries: 0,
        }
    }

    /// Swap the catalog. Cached entries are dropped.
    pub fn set_catalog(&mut self, catalog: Box<dyn FontCatalog>) {
        self.catalog = catalog;
        self.cache.clear();
    }

    /// Number of catalog lookups so far.
    pub fn catalog_queries(&self) -> usize {
        self.queries
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Forget every cached entry.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    fn query(&mut self, family: &str, weight: FontWeight, style: FontStyle) -> Option<FontFace> {
        self.queries += 1;
        self.catalog.best_match(family, weight, style)
    }

    /// Resolve `raw` with the requested bold/italic flags.
    ///
    /// Unknown families are not an error: the stripped name and the
    /// requested face are returned, and nothing is cached.
    pub fn resolve(&mut self, raw: &str, bold: bool, italic: bool) -> ResolvedFont {
        let weight = if bold { FontWeight::BOLD } else { FontWeight::NORMAL };
        let style = if italic { FontStyle::Italic } else { FontStyle::Normal };
        let key = FontKey {
            family: raw.to_string(),
            style,
            weight,
        };
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }

        if let Some(face) = self.query(raw.trim(), weight, style) {
            let resolved = ResolvedFont {
                family: face.family,
                weight: face.weight,
                style: face.style,
                found: true,
            };
            self.cache.insert(key, resolved.clone());
            return resolved;
        }

        let (family, weight, style) = split_family(&normalize_dashes(raw), weight, style);
        if family != raw.trim() {
            if let Some(face) = self.query(&family, weight, style) {
                tracing::debug!(raw, family = %face.family, weight = face.weight.0, "resolved font by suffix");
                let resolved = ResolvedFont {
                    family: face.family,
                    weight: face.weight,
                    style: face.style,
                    found: true,
                };
                self.cache.insert(key, resolved.clone());
                return resolved;
            }
        }

        tracing::warn!(raw, family = %family, "font family not found, using best guess");
        ResolvedFont {
            family,
            weight,
            style,
            found: false,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn resolver() -> FontResolver {
        FontResolver::new(Box::new(MemoryFontCatalog::with_families(["Inter", "Yu Gothic UI"])))
    }

    #[test]
    fn test_suffix_tables_longest_first() {
        // A word must come before any shorter word it ends with.
        for (i, (earlier, _)) in WEIGHT_SUFFIXES.iter().enumerate() {
            for (later, _) in WEIGHT_SUFFIXES.iter().skip(i + 1) {
                assert!(!later.ends_with(earlier), "{later} shadows {earlier}");
            }
        }
    }

    #[test_case("Inter-Bold", "Inter", FontWeight::BOLD, FontStyle::Normal)]
    #[test_case("Inter Bold Italic", "Inter", FontWeight::BOLD, FontStyle::Italic)]
    #[test_case("Inter-Bold Italic", "Inter", FontWeight::BOLD, FontStyle::Italic)]
    #[test_case("Inter ExtraLight", "Inter", FontWeight::EXTRA_LIGHT, FontStyle::Normal)]
    #[test_case("Inter Italic Bold", "Inter", FontWeight::BOLD, FontStyle::Italic)]
    #[test_case("游ゴシック 太", "游ゴシック", FontWeight::BOLD, FontStyle::Normal)]
    #[test_case("Noto Sans JP W7", "Noto Sans JP", FontWeight::BOLD, FontStyle::Normal)]
    #[test_case("inter oblique", "inter", FontWeight::NORMAL, FontStyle::Oblique)]
    #[test_case("Bold", "Bold", FontWeight::NORMAL, FontStyle::Normal)]
    #[test_case("Arial", "Arial", FontWeight::NORMAL, FontStyle::Normal)]
    fn test_split_family(raw: &str, family: &str, weight: FontWeight, style: FontStyle) {
        assert_eq!(
            split_family(raw, FontWeight::NORMAL, FontStyle::Normal),
            (family.to_string(), weight, style)
        );
    }

    #[test]
    fn test_extra_bold_not_split_as_bold() {
        let (family, weight, _) = split_family("Inter ExtraBold", FontWeight::NORMAL, FontStyle::Normal);
        assert_eq!(family, "Inter");
        assert_eq!(weight, FontWeight::EXTRA_BOLD);
    }

    #[test]
    fn test_suffix_needs_separator() {
        let (family, weight, _) = split_family("Superbold", FontWeight::NORMAL, FontStyle::Normal);
        assert_eq!(family, "Superbold");
        assert_eq!(weight, FontWeight::NORMAL);
    }

    #[test]
    fn test_normalize_dashes() {
        assert_eq!(normalize_dashes("Inter\u{2013}Bold"), "Inter-Bold");
        assert_eq!(normalize_dashes("Inter\u{FF0D}Bold"), "Inter-Bold");
    }

    #[test]
    fn test_exact_family_hits_catalog_once() {
        let mut r = resolver();
        let font = r.resolve("Inter", true, false);
        assert!(font.found);
        assert_eq!(font.weight, FontWeight::BOLD);
        assert_eq!(r.catalog_queries(), 1);
        r.resolve("Inter", true, false);
        assert_eq!(r.catalog_queries(), 1);
    }

    #[test]
    fn test_suffixed_family_resolves_and_caches() {
        let mut r = resolver();
        let font = r.resolve("Inter\u{2013}Bold Italic", false, false);
        assert_eq!(font.family, "Inter");
        assert_eq!(font.weight, FontWeight::BOLD);
        assert_eq!(font.style, FontStyle::Italic);
        assert!(font.found);
        let queries = r.catalog_queries();
        assert_eq!(queries, 2);

        assert_eq!(r.resolve("Inter\u{2013}Bold Italic", false, false), font);
        assert_eq!(r.catalog_queries(), queries);
    }

    #[test]
    fn test_unknown_family_not_cached() {
        let mut r = resolver();
        let font = r.resolve("Missing Sans Bold", false, true);
        assert!(!font.found);
        assert_eq!(font.family, "Missing Sans");
        assert_eq!(font.weight, FontWeight::BOLD);
        assert_eq!(font.style, FontStyle::Italic);
        assert_eq!(r.cached_len(), 0);
        r.resolve("Missing Sans Bold", false, true);
        assert_eq!(r.catalog_queries(), 4);
    }

    #[test]
    fn test_separate_cache_entries_per_flags() {
        let mut r = resolver();
        r.resolve("Inter", false, false);
        r.resolve("Inter", true, false);
        assert_eq!(r.cached_len(), 2);
        r.clear();
        assert_eq!(r.cached_len(), 0);
    }

    #[test]
    fn test_closest_face_prefers_slant() {
        let faces = vec![
            FontFace::new("X", FontWeight::BOLD, FontStyle::Normal),
            FontFace::new("X", FontWeight::NORMAL, FontStyle::Italic),
        ];
        let face = closest_face(&faces, FontWeight::BOLD, FontStyle::Oblique).unwrap();
        assert_eq!(face.style, FontStyle::Italic);
    }
}
