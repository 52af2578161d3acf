use std::ops::Range;

use crate::font::FontMetrics;
use crate::geometry::{Position, Space};
use crate::layout::overflow::{split_off, Continuable};
use crate::layout::text::{normalize_text, wrap_lines, SpanLayout};
use crate::layout::{place_horizontally, Alignment, LayoutContext, Margins};
use crate::page::{Footprint, PageTracker, EPSILON};
use crate::part::{Cell, CellContent, PartId, Table, Text};
use crate::rect::Rect;
use crate::{LayoutError, LayoutWarning, Pt};

/// A table cell being laid out
#[derive(Debug, Clone, PartialEq)]
pub struct StateCell {
    pub content: CellContent,
    /// The span asked for; spans running past the end of a row are cut short during layout
    pub column_span: usize,
    pub declared_height: Option<Pt>,
    pub declared_width: Option<Pt>,
    /// Added to pad out an incomplete last row
    pub filler: bool,
    /// A copy of a header cell repeated at the top of a continuation
    pub header_copy: bool,
    /// Top-left of the cell, once placed
    pub position: Option<Position>,
    pub width: Pt,
    pub height: Pt,
    /// The laid out lines of text content
    pub lines: Vec<SpanLayout>,
    /// Top-left of image content
    pub content_position: Option<Position>,
}

impl StateCell {
    pub fn new(cell: &Cell, tab_size: usize) -> StateCell {
        let content = match &cell.content {
            CellContent::Text(text) => CellContent::Text(Text {
                text: normalize_text(&text.text, tab_size),
                ..text.clone()
            }),
            other => other.clone(),
        };
        StateCell {
            content,
            column_span: cell.column_span.max(1),
            declared_height: cell.height,
            declared_width: cell.width,
            filler: false,
            header_copy: false,
            position: None,
            width: Pt::ZERO,
            height: Pt::ZERO,
            lines: Vec::new(),
            content_position: None,
        }
    }

    fn filler() -> StateCell {
        StateCell {
            filler: true,
            ..StateCell::new(&Cell::empty(), 0)
        }
    }

    fn header_copy(&self) -> StateCell {
        StateCell {
            header_copy: true,
            position: None,
            width: Pt::ZERO,
            height: Pt::ZERO,
            lines: Vec::new(),
            content_position: None,
            ..self.clone()
        }
    }

    fn reset(&mut self) {
        self.position = None;
        self.width = Pt::ZERO;
        self.height = Pt::ZERO;
        self.lines.clear();
        self.content_position = None;
    }

    /// The width the cell asks of its columns: its widest line of content plus padding
    /// and border
    pub fn required_width(
        &self,
        metrics: &dyn FontMetrics,
        padding: Pt,
        border: Pt,
    ) -> Result<Pt, LayoutError> {
        if let Some(width) = self.declared_width {
            return Ok(width);
        }
        let content = match &self.content {
            CellContent::Empty => Pt::ZERO,
            CellContent::Image(image) => image.width(),
            CellContent::Text(text) => {
                let mut widest = Pt::ZERO;
                for line in text.text.split('\n') {
                    widest = widest.max(metrics.width_of(line, &text.font)?);
                }
                widest
            }
        };
        Ok(content + padding * 2.0 + border)
    }

    /// The height the cell needs when it is `width` wide
    pub fn required_height(
        &self,
        metrics: &dyn FontMetrics,
        padding: Pt,
        border: Pt,
        width: Pt,
    ) -> Result<Pt, LayoutError> {
        if let Some(height) = self.declared_height {
            return Ok(height);
        }
        let content = match &self.content {
            CellContent::Empty => Pt::ZERO,
            CellContent::Image(image) => image.height(),
            CellContent::Text(text) => {
                let inner = (width - padding * 2.0 - border).at_least(1.0);
                let lines = wrap_lines(metrics, &text.font, &text.text, inner)?;
                text_height(metrics, text, &lines)?
            }
        };
        Ok(content + padding * 2.0 + border)
    }

    /// Lay the content out inside the cell, `inner` being the top-left of the content
    /// area and `inner_width` its width
    fn place_content(
        &mut self,
        metrics: &dyn FontMetrics,
        inner: Position,
        inner_width: Pt,
    ) -> Result<(), LayoutError> {
        self.lines.clear();
        self.content_position = None;
        match &self.content {
            CellContent::Empty => {}
            CellContent::Image(_) => self.content_position = Some(inner),
            CellContent::Text(text) => {
                let line_height = metrics.line_height(&text.font)?;
                let ascent = metrics.ascent(&text.font)?;
                let mut y = inner.y;
                for line in wrap_lines(metrics, &text.font, &text.text, inner_width)? {
                    let width = metrics.width_of(&line, &text.font)?;
                    let slack = (inner_width - width).max(Pt::ZERO);
                    let x = match text.alignment {
                        Alignment::Right => inner.x + slack,
                        Alignment::Centered => inner.x + slack / 2.0,
                        Alignment::Left | Alignment::Justified => inner.x,
                    };
                    self.lines.push(SpanLayout {
                        text: line,
                        font: text.font,
                        position: Position::new(x, y),
                        coords: (x, y - ascent),
                        width,
                        word_spacing: Pt::ZERO,
                    });
                    y -= line_height;
                }
            }
        }
        Ok(())
    }
}

/// Ink height of the first line plus a line height for every further line
fn text_height(
    metrics: &dyn FontMetrics,
    text: &Text,
    lines: &[String],
) -> Result<Pt, LayoutError> {
    if lines.is_empty() {
        return Ok(Pt::ZERO);
    }
    let mut ink = Pt::ZERO;
    for line in lines {
        ink = ink.max(metrics.measure(line, &text.font)?.height);
    }
    let line_height = metrics.line_height(&text.font)?;
    Ok(ink + line_height * (lines.len() - 1) as f32)
}

/// A table being laid out. Cells fill the grid row by row; the first row is the header,
/// repeated at the top of every continuation when `repeat_header` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct StateTable {
    pub origin: Option<PartId>,
    pub width: Pt,
    pub columns: usize,
    pub cells: Vec<StateCell>,
    pub alignment: Alignment,
    pub margins: Margins,
    pub wrapping: bool,
    pub border_width: Pt,
    pub padding: Pt,
    pub draw_filler_cells: bool,
    pub repeat_header: bool,
    pub vertical_align: bool,
    pub prioritize_header_width: bool,
    /// A fixed top-left for the table instead of the next free spot
    pub fixed: Option<Position>,
    /// Top-left of the table once placed
    pub position: Option<Position>,
    /// Combined height of the placed rows
    pub height: Pt,
    column_widths: Option<Vec<Pt>>,
}

impl StateTable {
    pub fn new(origin: Option<PartId>, table: &Table, tab_size: usize) -> StateTable {
        StateTable {
            origin,
            width: table.width,
            columns: table.column_count(),
            cells: table
                .cells
                .iter()
                .map(|c| StateCell::new(c, tab_size))
                .collect(),
            alignment: table.alignment,
            margins: table.margins,
            wrapping: table.wrapping,
            border_width: table.border_width(),
            padding: table.padding,
            draw_filler_cells: table.draw_filler_cells,
            repeat_header: table.repeat_header,
            vertical_align: table.vertical_align,
            prioritize_header_width: table.prioritize_header_width,
            fixed: table.position,
            position: None,
            height: Pt::ZERO,
            column_widths: None,
        }
    }

    pub fn is_placed(&self) -> bool {
        self.position.is_some()
    }

    /// Column widths settled on during layout
    pub fn column_widths(&self) -> Option<&[Pt]> {
        self.column_widths.as_deref()
    }

    /// The span each cell actually gets, and the cell ranges making up each row
    pub fn rows(&self) -> (Vec<usize>, Vec<Range<usize>>) {
        let mut spans = Vec::with_capacity(self.cells.len());
        let mut rows = Vec::new();
        let mut column = 0;
        let mut start = 0;
        for (i, cell) in self.cells.iter().enumerate() {
            let span = cell.column_span.clamp(1, self.columns - column);
            spans.push(span);
            column += span;
            if column == self.columns {
                rows.push(start..i + 1);
                start = i + 1;
                column = 0;
            }
        }
        if start < self.cells.len() {
            rows.push(start..self.cells.len());
        }
        (spans, rows)
    }

    fn fill_last_row(&mut self) {
        if !self.draw_filler_cells {
            return;
        }
        let (spans, rows) = self.rows();
        if let Some(last) = rows.last() {
            let used: usize = spans[last.clone()].iter().sum();
            for _ in used..self.columns {
                self.cells.push(StateCell::filler());
            }
        }
    }

    /// Share the table width out between the columns. Every column gets at least what
    /// its single-column cells ask for, spanning cells top up the columns they cover, and
    /// what is left is split evenly. When the requests add up to more than the table
    /// width they are scaled down instead.
    fn compute_column_widths(
        &self,
        metrics: &dyn FontMetrics,
        spans: &[usize],
        rows: &[Range<usize>],
    ) -> Result<Vec<Pt>, LayoutError> {
        let considered = if self.prioritize_header_width {
            &rows[..rows.len().min(1)]
        } else {
            rows
        };
        let mut required = vec![Pt::ZERO; self.columns];
        let mut spanning = Vec::new();
        for row in considered {
            let mut column = 0;
            for i in row.clone() {
                let width = self.cells[i].required_width(metrics, self.padding, self.border_width)?;
                if spans[i] == 1 {
                    required[column] = required[column].max(width);
                } else {
                    spanning.push((column, spans[i], width));
                }
                column += spans[i];
            }
        }
        for (column, span, width) in spanning {
            let covered: Pt = required[column..column + span].iter().copied().sum();
            if width > covered {
                let extra = (width - covered) / span as f32;
                for r in &mut required[column..column + span] {
                    *r += extra;
                }
            }
        }

        let total: Pt = required.iter().copied().sum();
        if total <= self.width {
            let share = (self.width - total) / self.columns as f32;
            for r in &mut required {
                *r += share;
            }
        } else {
            log::debug!("table cells ask for {total} but the table is {} wide", self.width);
            for r in &mut required {
                *r = self.width * (r.0 / total.0);
            }
        }
        Ok(required)
    }

    /// Where the table goes and how wide it ends up. [None] means it has to wait for the
    /// next page.
    fn locate(&self, page: &mut PageTracker) -> Option<(Position, Pt)> {
        if let Some(fixed) = self.fixed {
            return Some((fixed, self.width));
        }
        let margins = self.margins;
        match page.open_position(margins.top, margins.bottom, self.width + margins.horizontal()) {
            Some(position) => {
                let spaces = page.open_spaces_on(position, false, margins.top, margins.bottom);
                let (x, width) = place_horizontally(self.alignment, &spaces, self.width, &margins)
                    .unwrap_or((position.x + margins.left, self.width));
                Some((position.with_x(x), width))
            }
            None if page.is_empty() => {
                page.warn(LayoutWarning::PartForced {
                    width: self.width,
                    height: self.height,
                });
                let top_left = page.content_box.top_left();
                Some((
                    Position::new(top_left.x + margins.left, top_left.y - margins.top),
                    self.width,
                ))
            }
            None => None,
        }
    }

    /// Lay the table out row by row. Rows are never split: a row that does not fit starts
    /// the continuation, which is returned. Returns [None] once every row is placed.
    pub fn layout(
        &mut self,
        ctx: &LayoutContext,
        page: &mut PageTracker,
    ) -> Result<Option<StateTable>, LayoutError> {
        self.fill_last_row();
        let force = page.is_empty();
        let Some((top, width)) = self.locate(page) else {
            log::debug!("no room left for the table, continuing on the next page");
            return Ok(Some(split_off(self, 0, None)));
        };
        self.width = width;

        let (spans, rows) = self.rows();
        let widths = match self.column_widths.take() {
            Some(widths) if (widths.iter().copied().sum::<Pt>() - width).abs() < EPSILON => {
                widths
            }
            _ => self.compute_column_widths(ctx.metrics, &spans, &rows)?,
        };

        let mut cell_widths = vec![Pt::ZERO; self.cells.len()];
        let mut cell_heights = vec![Pt::ZERO; self.cells.len()];
        let mut row_heights = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut column = 0;
            let mut row_height = Pt::ZERO;
            for i in row.clone() {
                let cell_width: Pt = widths[column..column + spans[i]].iter().copied().sum();
                let cell_height = self.cells[i].required_height(
                    ctx.metrics,
                    self.padding,
                    self.border_width,
                    cell_width,
                )?;
                cell_widths[i] = cell_width;
                cell_heights[i] = cell_height;
                row_height = row_height.max(cell_height);
                column += spans[i];
            }
            row_heights.push(row_height);
        }
        self.column_widths = Some(widths);

        let inset = self.padding + self.border_width / 2.0;
        let mut y = top.y;
        for (r, row) in rows.iter().enumerate() {
            let row_height = row_heights[r];
            // the last row also has to leave room for the bottom margin
            let below = if r + 1 == rows.len() {
                self.margins.bottom
            } else {
                Pt::ZERO
            };
            let room =
                page.available_height_across(Position::new(top.x, y), width, Pt::ZERO, below);
            if room + EPSILON < row_height {
                let only_header_above = r == 1 && self.cells[rows[0].start].header_copy;
                if force && (r == 0 || only_header_above) {
                    page.warn(LayoutWarning::RowForced { height: row_height });
                } else if r == 0 || (r == 1 && self.repeat_header && !force) {
                    // a header alone at the bottom of a page helps nobody
                    log::debug!("table does not fit, moving it to the next page");
                    self.cells.iter_mut().for_each(StateCell::reset);
                    return Ok(Some(split_off(self, 0, None)));
                } else {
                    self.finish(page, top, top.y - y);
                    return Ok(Some(split_off(self, row.start, None)));
                }
            }

            let mut x = top.x;
            for i in row.clone() {
                let offset = if self.vertical_align {
                    ((row_height - cell_heights[i]) / 2.0).max(Pt::ZERO)
                } else {
                    Pt::ZERO
                };
                let cell = &mut self.cells[i];
                cell.position = Some(Position::new(x, y));
                cell.width = cell_widths[i];
                cell.height = row_height;
                let inner = Position::new(x + inset, y - inset - offset);
                let inner_width =
                    (cell_widths[i] - self.padding * 2.0 - self.border_width).at_least(1.0);
                cell.place_content(ctx.metrics, inner, inner_width)?;
                x += cell_widths[i];
            }
            y -= row_height;
        }

        self.finish(page, top, top.y - y);
        Ok(None)
    }

    fn finish(&mut self, page: &mut PageTracker, top: Position, height: Pt) {
        self.position = Some(top);
        self.height = height;
        if let Some(footprint) = self.footprint() {
            page.add(footprint);
        }
    }

    pub fn footprint(&self) -> Option<Footprint> {
        let position = self.position?;
        Some(Footprint {
            rect: Rect::from_top_left(position, self.width, self.height),
            margins: self.margins,
            wrapping: self.wrapping,
        })
    }

    /// The horizontal intervals the placed table occupies at `height`, margins included
    pub fn used_spaces_at(&self, height: Pt, page_width: Pt) -> Vec<Space> {
        self.footprint()
            .filter(|f| f.covers_height(height))
            .map(|f| f.span(page_width))
            .into_iter()
            .collect()
    }

    /// Left edges of the table's occupied intervals at `height`
    pub fn positions_at(&self, height: Pt, page_width: Pt) -> Vec<Pt> {
        self.footprint()
            .map(|f| f.positions_at(height, page_width))
            .unwrap_or_default()
    }
}

impl Continuable for StateTable {
    type Child = StateCell;

    fn children_mut(&mut self) -> &mut Vec<StateCell> {
        &mut self.cells
    }

    fn continue_with(&mut self, remainder: Vec<StateCell>) -> StateTable {
        let mut cells = Vec::with_capacity(remainder.len() + self.columns);
        if self.repeat_header {
            let (_, rows) = self.rows();
            if rows.len() >= 2 {
                cells.extend(self.cells[rows[0].clone()].iter().map(StateCell::header_copy));
            }
        }
        cells.extend(remainder);
        StateTable {
            cells,
            fixed: None,
            position: None,
            height: Pt::ZERO,
            ..self.clone_attributes()
        }
    }
}

impl StateTable {
    fn clone_attributes(&self) -> StateTable {
        StateTable {
            origin: self.origin,
            width: self.width,
            columns: self.columns,
            cells: Vec::new(),
            alignment: self.alignment,
            margins: self.margins,
            wrapping: self.wrapping,
            border_width: self.border_width,
            padding: self.padding,
            draw_filler_cells: self.draw_filler_cells,
            repeat_header: self.repeat_header,
            vertical_align: self.vertical_align,
            prioritize_header_width: self.prioritize_header_width,
            fixed: self.fixed,
            position: self.position,
            height: self.height,
            column_widths: self.column_widths.clone(),
        }
    }
}
