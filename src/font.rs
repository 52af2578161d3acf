use crate::standard_font::StandardFontMetrics;
use crate::{LayoutError, Pt};
use owned_ttf_parser::{AsFaceRef, OwnedFace};

/// Which font a run of text is set in, and at what size. `index` refers to a face known
/// by whatever [FontMetrics] implementation the layout is given.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SpanFont {
    pub index: usize,
    pub size: Pt,
}

impl SpanFont {
    pub fn new(index: usize, size: Pt) -> SpanFont {
        SpanFont { index, size }
    }
}

impl Default for SpanFont {
    /// The first registered face at 12pt
    fn default() -> Self {
        SpanFont {
            index: 0,
            size: Pt(12.0),
        }
    }
}

/// The measured size of a piece of text. `height` is the ink height: the distance from
/// the lowest to the highest point any glyph in the text reaches.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Extent {
    pub width: Pt,
    pub height: Pt,
}

/// Supplies text measurements to the layout engine. Implementations must be pure and
/// deterministic; a character they cannot measure is an error rather than a guess.
pub trait FontMetrics {
    /// Measure the advance width and ink height of `text`
    fn measure(&self, text: &str, font: &SpanFont) -> Result<Extent, LayoutError>;

    /// How far apart consecutive lines of text are set
    fn line_height(&self, font: &SpanFont) -> Result<Pt, LayoutError>;

    /// Distance from the top of a line to its baseline
    fn ascent(&self, font: &SpanFont) -> Result<Pt, LayoutError>;

    /// Convenience for the advance width of `text`
    fn width_of(&self, text: &str, font: &SpanFont) -> Result<Pt, LayoutError> {
        self.measure(text, font).map(|e| e.width)
    }
}

/// A parsed TrueType or OpenType font, used purely for its metrics.
pub struct Font {
    pub face: OwnedFace,
}

impl Font {
    /// Load a font from raw bytes, parsing the font and returning an error if the font
    /// could not be parsed
    pub fn load(bytes: Vec<u8>) -> Result<Font, LayoutError> {
        let face = OwnedFace::from_vec(bytes, 0)?;
        Ok(Font { face })
    }

    fn scaling(&self, size: Pt) -> Pt {
        size / self.face.as_face_ref().units_per_em() as f32
    }

    /// Calculate the ascent (distance from the baseline to the top of the font) for the given font size
    pub fn ascent(&self, size: Pt) -> Pt {
        self.scaling(size) * self.face.as_face_ref().ascender() as f32
    }

    /// Calculate the descent (distance from the baseline to the bottom of the font) for the given font size.
    /// Note: this is usually negative
    pub fn descent(&self, size: Pt) -> Pt {
        self.scaling(size) * self.face.as_face_ref().descender() as f32
    }

    /// Calculate the default line height of the font for the given size. The returned value is
    /// how much to vertically offset a second row of text below a first row of text.
    pub fn line_height(&self, size: Pt) -> Pt {
        let face = self.face.as_face_ref();
        let scaling = self.scaling(size);
        let leading: Pt = scaling * face.line_gap() as f32;
        leading + self.ascent(size) - self.descent(size)
    }

    fn measure(&self, index: usize, text: &str, size: Pt) -> Result<Extent, LayoutError> {
        let face = self.face.as_face_ref();
        let scaling = self.scaling(size);
        let mut width = Pt::ZERO;
        let mut bounds: Option<(i16, i16)> = None;
        for ch in text.chars() {
            let gid = face
                .glyph_index(ch)
                .ok_or(LayoutError::MissingGlyph { font: index, ch })?;
            width += scaling * face.glyph_hor_advance(gid).unwrap_or_default() as f32;
            if let Some(bbox) = face.glyph_bounding_box(gid) {
                bounds = Some(match bounds {
                    Some((lo, hi)) => (lo.min(bbox.y_min), hi.max(bbox.y_max)),
                    None => (bbox.y_min, bbox.y_max),
                });
            }
        }
        let height = bounds
            .map(|(lo, hi)| scaling * (hi as f32 - lo as f32))
            .unwrap_or_default();
        Ok(Extent { width, height })
    }
}

enum Face {
    Standard(&'static StandardFontMetrics),
    TrueType(Font),
}

/// The set of faces a document is laid out with. Faces are referred to by the index
/// [FontLibrary::add_font] returns, which is what [SpanFont::index] holds.
#[derive(Default)]
pub struct FontLibrary {
    faces: Vec<Face>,
}

impl FontLibrary {
    /// A library holding only the built-in Times-Roman metrics, at index 0
    pub fn standard() -> FontLibrary {
        let mut library = FontLibrary::default();
        library.add_standard(&crate::standard_font::TIMES_ROMAN);
        library
    }

    pub fn add_font(&mut self, font: Font) -> usize {
        self.faces.push(Face::TrueType(font));
        self.faces.len() - 1
    }

    pub fn add_standard(&mut self, metrics: &'static StandardFontMetrics) -> usize {
        self.faces.push(Face::Standard(metrics));
        self.faces.len() - 1
    }

    fn face(&self, index: usize) -> Result<&Face, LayoutError> {
        self.faces.get(index).ok_or(LayoutError::UnknownFont(index))
    }
}

impl FontMetrics for FontLibrary {
    fn measure(&self, text: &str, font: &SpanFont) -> Result<Extent, LayoutError> {
        match self.face(font.index)? {
            Face::TrueType(f) => f.measure(font.index, text, font.size),
            Face::Standard(m) => {
                let mut width = Pt::ZERO;
                let mut bounds: Option<(i16, i16)> = None;
                for ch in text.chars() {
                    width += m.advance(ch, font.size).ok_or(LayoutError::MissingGlyph {
                        font: font.index,
                        ch,
                    })?;
                    if let Some((lo, hi)) = m.vertical_bounds(ch) {
                        bounds = Some(match bounds {
                            Some((blo, bhi)) => (blo.min(lo), bhi.max(hi)),
                            None => (lo, hi),
                        });
                    }
                }
                let height = bounds
                    .map(|(lo, hi)| font.size * ((hi - lo) as f32 / 1000.0))
                    .unwrap_or_default();
                Ok(Extent { width, height })
            }
        }
    }

    fn line_height(&self, font: &SpanFont) -> Result<Pt, LayoutError> {
        Ok(match self.face(font.index)? {
            Face::TrueType(f) => f.line_height(font.size),
            Face::Standard(m) => m.line_height(font.size),
        })
    }

    fn ascent(&self, font: &SpanFont) -> Result<Pt, LayoutError> {
        Ok(match self.face(font.index)? {
            Face::TrueType(f) => f.ascent(font.size),
            Face::Standard(m) => m.ascent(font.size),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_width_and_ink_height() {
        let library = FontLibrary::standard();
        let extent = library.measure("Test", &SpanFont::default()).unwrap();
        assert!((extent.width.0 - 20.664).abs() < 1e-3);
        assert!((extent.height.0 - 8.064).abs() < 1e-3);

        let extent = library.measure("Test2", &SpanFont::default()).unwrap();
        assert!((extent.width.0 - 26.664).abs() < 1e-3);
        assert!((extent.height.0 - 8.232).abs() < 1e-3);
    }

    #[test]
    fn blank_text_has_no_height() {
        let library = FontLibrary::standard();
        let extent = library.measure("   ", &SpanFont::default()).unwrap();
        assert_eq!(extent.height, Pt::ZERO);
        assert!((extent.width.0 - 9.0).abs() < 1e-3);
    }

    #[test]
    fn unmeasurable_characters_are_errors() {
        let library = FontLibrary::standard();
        let err = library.measure("naïve", &SpanFont::default()).unwrap_err();
        assert!(matches!(err, LayoutError::MissingGlyph { font: 0, ch: 'ï' }));
    }

    #[test]
    fn unknown_fonts_are_errors() {
        let library = FontLibrary::standard();
        let err = library
            .line_height(&SpanFont::new(3, Pt(12.0)))
            .unwrap_err();
        assert!(matches!(err, LayoutError::UnknownFont(3)));
    }
}
