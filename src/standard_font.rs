//! Built-in metrics for the standard Times-Roman face, so documents can be laid out
//! without loading a font file. The table is a read-only `static`; it is handed to
//! layout through a [FontLibrary](crate::FontLibrary) like any other face.

use crate::units::Pt;

/// Read-only metrics for one of the standard PDF faces, in 1/1000 em units
#[derive(Debug)]
pub struct StandardFontMetrics {
    pub name: &'static str,
    /// Advance widths for the printable ASCII range `' '..='~'`
    widths: [u16; 95],
    pub ascender: i16,
    pub descender: i16,
    pub cap_height: i16,
    pub x_height: i16,
    /// Height of the figures, which sit slightly above the capitals
    pub figure_height: i16,
    /// Depth of the round bottoms of lowercase letters
    pub overshoot: i16,
}

#[rustfmt::skip]
pub static TIMES_ROMAN: StandardFontMetrics = StandardFontMetrics {
    name: "Times-Roman",
    widths: [
        // space ! " # $ % & ' ( ) * + , - . /
        250, 333, 408, 500, 500, 833, 778, 333, 333, 333, 500, 564, 250, 333, 250, 278,
        // 0-9
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        // : ; < = > ? @
        278, 278, 564, 564, 564, 444, 921,
        // A-Z
        722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
        722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
        // [ \ ] ^ _ `
        333, 278, 333, 469, 500, 333,
        // a-z
        444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
        500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
        // { | } ~
        480, 200, 480, 541,
    ],
    ascender: 683,
    descender: -217,
    cap_height: 662,
    x_height: 460,
    figure_height: 676,
    overshoot: -10,
};

impl StandardFontMetrics {
    fn index_of(ch: char) -> Option<usize> {
        match ch {
            ' '..='~' => Some(ch as usize - ' ' as usize),
            _ => None,
        }
    }

    /// Advance width of `ch` at the given size, if the face covers it
    pub fn advance(&self, ch: char, size: Pt) -> Option<Pt> {
        Self::index_of(ch).map(|i| size * (self.widths[i] as f32 / 1000.0))
    }

    /// Approximate ink extent of `ch` as `(bottom, top)` in 1/1000 em. Blank glyphs have
    /// no extent.
    pub fn vertical_bounds(&self, ch: char) -> Option<(i16, i16)> {
        Self::index_of(ch)?;
        let bounds = match ch {
            ' ' => return None,
            'A'..='Z' => (0, self.cap_height),
            '0'..='9' => (0, self.figure_height),
            'g' | 'p' | 'q' | 'y' => (self.descender, self.x_height),
            'j' => (self.descender, self.ascender),
            't' => (self.overshoot, 579),
            'b' | 'd' | 'f' | 'h' | 'i' | 'k' | 'l' => (self.overshoot, self.ascender),
            'a'..='z' => (self.overshoot, self.x_height),
            _ => (self.overshoot, self.figure_height),
        };
        Some(bounds)
    }

    /// Distance between consecutive baselines at the given size
    pub fn line_height(&self, size: Pt) -> Pt {
        size * ((self.ascender - self.descender) as f32 / 1000.0)
    }

    pub fn ascent(&self, size: Pt) -> Pt {
        size * (self.ascender as f32 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_follow_the_times_roman_afm() {
        let size = Pt(1000.0);
        assert_eq!(TIMES_ROMAN.advance('T', size), Some(Pt(611.0)));
        assert_eq!(TIMES_ROMAN.advance('e', size), Some(Pt(444.0)));
        assert_eq!(TIMES_ROMAN.advance('s', size), Some(Pt(389.0)));
        assert_eq!(TIMES_ROMAN.advance('t', size), Some(Pt(278.0)));
        assert_eq!(TIMES_ROMAN.advance('2', size), Some(Pt(500.0)));
        assert_eq!(TIMES_ROMAN.advance('~', size), Some(Pt(541.0)));
    }

    #[test]
    fn characters_outside_ascii_are_not_covered() {
        assert_eq!(TIMES_ROMAN.advance('é', Pt(12.0)), None);
        assert_eq!(TIMES_ROMAN.vertical_bounds('é'), None);
    }

    #[test]
    fn spaces_have_no_ink() {
        assert_eq!(TIMES_ROMAN.vertical_bounds(' '), None);
    }
}
