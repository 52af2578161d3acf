use crate::geometry::Space;
use crate::layout::Margins;
use crate::page::EPSILON;
use crate::units::Pt;

/// Horizontal placement of a part or a line within the free space it is given
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Right,
    Centered,
    /// Stretch to fill the available space: word spacing for text, width for tables
    Justified,
}

/// Which side of its text run an anchored part sits on
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AnchorSide {
    Above,
    Below,
    Left,
    Right,
}

impl AnchorSide {
    /// Side anchors share the run's rows and text wraps around them
    pub fn is_beside(self) -> bool {
        matches!(self, AnchorSide::Left | AnchorSide::Right)
    }
}

/// Choose where something `width` wide goes among the free intervals `spaces`, keeping
/// `margins` clear on either side. Returns the content's x and its width, which only
/// differs from `width` when justified content stretches to fill its interval.
pub(crate) fn place_horizontally(
    alignment: Alignment,
    spaces: &[Space],
    width: Pt,
    margins: &Margins,
) -> Option<(Pt, Pt)> {
    let needed = width + margins.horizontal();
    let mut fitting = spaces.iter().filter(|s| s.width() >= needed - EPSILON);
    let space = match alignment {
        Alignment::Left | Alignment::Justified => fitting.next(),
        Alignment::Right => fitting.last(),
        Alignment::Centered => fitting.reduce(|widest, s| {
            if s.width() > widest.width() {
                s
            } else {
                widest
            }
        }),
    }?;
    Some(match alignment {
        Alignment::Left => (space.start + margins.left, width),
        Alignment::Right => (space.end - margins.right - width, width),
        Alignment::Centered => (
            space.start + margins.left + (space.width() - needed) / 2.0,
            width,
        ),
        Alignment::Justified => (
            space.start + margins.left,
            space.width() - margins.horizontal(),
        ),
    })
}
