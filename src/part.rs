use crate::font::SpanFont;
use crate::geometry::Position;
use crate::image::Image;
use crate::layout::{Alignment, AnchorSide, Margins};
use crate::units::Pt;
use id_arena::Id;

/// Refers to a part template stored in a [Document](crate::Document)
pub type PartId = Id<Part>;

/// Everything that can be put on a page. Parts are templates: laying them out never
/// changes them, it produces state objects (see [StatePart](crate::layout::StatePart)) instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(Text),
    Paragraph(Paragraph),
    Table(Table),
    Image(Image),
}

/// A run of text set in a single font
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub text: String,
    pub font: SpanFont,
    /// Top and bottom are the clearance above and below the run; left and right narrow
    /// the lines when the run is laid out on its own
    pub margins: Margins,
    pub alignment: Alignment,
    pub position: Option<Position>,
}

impl Text {
    pub fn new<S: ToString>(text: S) -> Text {
        Text {
            text: text.to_string(),
            font: SpanFont::default(),
            margins: Margins::empty(),
            alignment: Alignment::Left,
            position: None,
        }
    }

    pub fn font(mut self, font: SpanFont) -> Text {
        self.font = font;
        self
    }

    /// Font size in points, keeping the font face
    pub fn size(mut self, size: Pt) -> Text {
        self.font.size = size.at_least(1.0);
        self
    }

    pub fn margins(mut self, margins: Margins) -> Text {
        self.margins = margins;
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Text {
        self.alignment = alignment;
        self
    }

    pub fn on(mut self, position: Position) -> Text {
        self.position = Some(position);
        self
    }
}

/// Identifies a text run within its paragraph. The id survives the run being split across
/// pages, which is how anchored parts find their run again in a continuation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(pub(crate) u32);

/// Attaches a fixed-size part to one side of a text run
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub run: RunId,
    pub part: Image,
    pub side: AnchorSide,
}

/// An ordered sequence of text runs laid out as one flow, with parts anchored to them
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Paragraph {
    runs: Vec<(RunId, Text)>,
    anchors: Vec<Anchor>,
    pub alignment: Alignment,
    pub margins: Margins,
    pub position: Option<Position>,
    next_run: u32,
}

impl Paragraph {
    pub fn new() -> Paragraph {
        Paragraph::default()
    }

    /// Append a run, returning the id anchors can refer to it by
    pub fn add_text(&mut self, text: Text) -> RunId {
        let id = RunId(self.next_run);
        self.next_run += 1;
        self.runs.push((id, text));
        id
    }

    /// Anchor `part` to the run identified by `run`. Anchors on unknown runs are ignored.
    pub fn add_anchor(&mut self, run: RunId, part: Image, side: AnchorSide) -> &mut Paragraph {
        if self.runs.iter().any(|(id, _)| *id == run) {
            self.anchors.push(Anchor { run, part, side });
        } else {
            log::warn!("ignoring anchor on unknown run {run:?}");
        }
        self
    }

    pub fn runs(&self) -> impl Iterator<Item = (RunId, &Text)> {
        self.runs.iter().map(|(id, t)| (*id, t))
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn align(&mut self, alignment: Alignment) -> &mut Paragraph {
        self.alignment = alignment;
        self
    }

    pub fn margins(&mut self, margins: Margins) -> &mut Paragraph {
        self.margins = margins;
        self
    }

    pub fn on(&mut self, position: Position) -> &mut Paragraph {
        self.position = Some(position);
        self
    }
}

/// What a table cell holds
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Empty,
    Text(Text),
    Image(Image),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub content: CellContent,
    pub column_span: usize,
    /// Overrides the height the content would need
    pub height: Option<Pt>,
    /// Overrides the width the content would ask its column for
    pub width: Option<Pt>,
}

impl Cell {
    pub fn new(content: CellContent) -> Cell {
        Cell {
            content,
            column_span: 1,
            height: None,
            width: None,
        }
    }

    pub fn empty() -> Cell {
        Cell::new(CellContent::Empty)
    }

    pub fn text(text: Text) -> Cell {
        Cell::new(CellContent::Text(text))
    }

    pub fn image(image: Image) -> Cell {
        Cell::new(CellContent::Image(image))
    }

    /// How many columns the cell covers. At least one; spans running past the end of the
    /// row are cut short during layout.
    pub fn column_span(mut self, span: usize) -> Cell {
        self.column_span = span.max(1);
        self
    }

    pub fn height(mut self, height: Pt) -> Cell {
        self.height = Some(height.at_least(1.0));
        self
    }

    pub fn width(mut self, width: Pt) -> Cell {
        self.width = Some(width.at_least(1.0));
        self
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::text(Text::new(s))
    }
}

/// Borders wider than this are clamped
pub const MAX_BORDER_WIDTH: Pt = Pt(6.0);

/// A grid of cells filled row by row
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub width: Pt,
    columns: usize,
    pub cells: Vec<Cell>,
    pub alignment: Alignment,
    pub margins: Margins,
    pub position: Option<Position>,
    pub wrapping: bool,
    border_width: Pt,
    pub padding: Pt,
    pub draw_filler_cells: bool,
    pub repeat_header: bool,
    pub vertical_align: bool,
    pub prioritize_header_width: bool,
}

impl Table {
    pub fn new(width: Pt) -> Table {
        Table {
            width: width.at_least(1.0),
            columns: 1,
            cells: Vec::new(),
            alignment: Alignment::Left,
            margins: Margins::empty(),
            position: None,
            wrapping: false,
            border_width: Pt(1.0),
            padding: Pt(5.0),
            draw_filler_cells: true,
            repeat_header: false,
            vertical_align: false,
            prioritize_header_width: false,
        }
    }

    pub fn columns(&mut self, columns: usize) -> &mut Table {
        self.columns = columns.max(1);
        self
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }

    pub fn add_cell<C: Into<Cell>>(&mut self, cell: C) -> &mut Table {
        self.cells.push(cell.into());
        self
    }

    pub fn border(&mut self, width: Pt) -> &mut Table {
        self.border_width = width.max(Pt::ZERO).min(MAX_BORDER_WIDTH);
        self
    }

    pub fn border_width(&self) -> Pt {
        self.border_width
    }

    pub fn padding(&mut self, padding: Pt) -> &mut Table {
        self.padding = padding.max(Pt::ZERO);
        self
    }

    pub fn align(&mut self, alignment: Alignment) -> &mut Table {
        self.alignment = alignment;
        self
    }

    pub fn margins(&mut self, margins: Margins) -> &mut Table {
        self.margins = margins;
        self
    }

    pub fn on(&mut self, position: Position) -> &mut Table {
        self.position = Some(position);
        self
    }

    pub fn allow_wrapping(&mut self, wrapping: bool) -> &mut Table {
        self.wrapping = wrapping;
        self
    }

    pub fn draw_filler_cells(&mut self, draw: bool) -> &mut Table {
        self.draw_filler_cells = draw;
        self
    }

    pub fn repeat_header(&mut self, repeat: bool) -> &mut Table {
        self.repeat_header = repeat;
        self
    }

    pub fn vertical_align(&mut self, vertical_align: bool) -> &mut Table {
        self.vertical_align = vertical_align;
        self
    }

    pub fn prioritize_header_width(&mut self, prioritize: bool) -> &mut Table {
        self.prioritize_header_width = prioritize;
        self
    }
}
