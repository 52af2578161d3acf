use crate::layout::AnchorSide;
use crate::units::Pt;
use thiserror::Error;

/// All errors that the crate can generate. Running out of room on a page is never an
/// error: those conditions produce continuations or [LayoutWarning]s instead. Errors are
/// reserved for collaborators that could not provide the measurements layout relies on.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("font {font} has no metrics for {ch:?}")]
    /// The font metrics provider could not measure a character
    MissingGlyph { font: usize, ch: char },

    #[error("no font is registered at index {0}")]
    /// A text run referred to a font the metrics provider does not know about
    UnknownFont(usize),

    #[error("could not determine the format of the image data")]
    /// Raw image bytes were neither a known raster format nor SVG
    UnknownImageFormat,

    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsingError(#[from] owned_ttf_parser::FaceParsingError),

    #[error(transparent)]
    /// [image] failed to read the image header
    Image(#[from] image::ImageError),

    #[error(transparent)]
    /// [usvg] failed to parse the image
    Svg(#[from] usvg::Error),
}

/// Recoverable conditions noticed while laying out a page. They are logged as they
/// happen and collected on the [PageTracker](crate::PageTracker) for the caller to surface.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutWarning {
    /// An anchored part could never fit next to its run and was removed
    AnchorDropped {
        side: AnchorSide,
        required_width: Pt,
        required_height: Pt,
    },
    /// A line was placed even though it does not fit, because the page was empty and
    /// holding it back would never make progress
    LineForced { height: Pt },
    /// A table row taller than an empty page was placed anyway
    RowForced { height: Pt },
    /// A part taller or wider than an empty page was placed anyway
    PartForced { width: Pt, height: Pt },
}
