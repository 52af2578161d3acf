use crate::font::SpanFont;
use crate::geometry::{Position, Space};
use crate::layout::overflow::{split_off, Continuable};
use crate::layout::text::{flow_text, normalize_text, FlowOutcome, FlowRequest, SpanLayout};
use crate::layout::{Alignment, AnchorRegistry, AnchorSide, LayoutContext, Margins};
use crate::page::{Footprint, PageTracker, EPSILON};
use crate::part::{Paragraph, PartId, RunId, Text};
use crate::rect::Rect;
use crate::{LayoutError, Pt};

/// A text run being laid out. Once placed it holds its lines; when a run is split between
/// pages each piece keeps the run's [RunId].
#[derive(Debug, Clone, PartialEq)]
pub struct StateText {
    pub run: RunId,
    /// The run's text with tabs expanded and line endings normalized
    pub text: String,
    pub font: SpanFont,
    pub margins: Margins,
    pub lines: Vec<SpanLayout>,
    /// Where the first line starts, once placed
    pub position: Option<Position>,
    pub height: Pt,
}

impl StateText {
    pub fn new(run: RunId, text: &Text, tab_size: usize) -> StateText {
        StateText {
            run,
            text: normalize_text(&text.text, tab_size),
            font: text.font,
            margins: text.margins,
            lines: Vec::new(),
            position: None,
            height: Pt::ZERO,
        }
    }

    /// Cut the text at `offset`, keeping the head and returning the rest as a fresh run
    fn split_at(&mut self, offset: usize) -> StateText {
        let tail = self.text.split_off(offset);
        StateText {
            run: self.run,
            text: tail,
            font: self.font,
            margins: self.margins,
            lines: Vec::new(),
            position: None,
            height: Pt::ZERO,
        }
    }

    fn reset(&mut self) {
        self.lines.clear();
        self.position = None;
        self.height = Pt::ZERO;
    }

    /// A textless copy of the run, which carries its remaining anchors to the next page
    fn emptied(&self) -> StateText {
        StateText {
            text: String::new(),
            lines: Vec::new(),
            position: None,
            height: Pt::ZERO,
            ..self.clone()
        }
    }

    /// The area covered by the run's lines
    pub fn bounds(&self) -> Option<Rect> {
        let position = self.position?;
        let (x1, x2) = self.lines.iter().fold((position.x, position.x), |(x1, x2), l| {
            (x1.min(l.position.x), x2.max(l.position.x + l.width))
        });
        Some(Rect {
            x1,
            y1: position.y - self.height,
            x2,
            y2: position.y,
        })
    }
}

/// A paragraph being laid out: its runs flow one after another down the page, with
/// anchored parts placed around the run they belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct StateParagraph {
    pub origin: Option<PartId>,
    pub alignment: Alignment,
    pub margins: Margins,
    /// A fixed top-left for the paragraph instead of the next free spot
    pub fixed: Option<Position>,
    pub runs: Vec<StateText>,
    pub anchors: AnchorRegistry,
}

impl StateParagraph {
    pub fn new(origin: Option<PartId>, paragraph: &Paragraph, tab_size: usize) -> StateParagraph {
        StateParagraph {
            origin,
            alignment: paragraph.alignment,
            margins: paragraph.margins,
            fixed: paragraph.position,
            runs: paragraph
                .runs()
                .map(|(id, text)| StateText::new(id, text, tab_size))
                .collect(),
            anchors: AnchorRegistry::new(paragraph.anchors()),
        }
    }

    /// A paragraph of a single run, for text placed on its own
    pub fn from_text(origin: Option<PartId>, text: &Text, tab_size: usize) -> StateParagraph {
        let mut paragraph = Paragraph::new();
        paragraph.alignment = text.alignment;
        paragraph.position = text.position;
        paragraph.add_text(text.clone());
        StateParagraph::new(origin, &paragraph, tab_size)
    }

    /// Whether anything of the paragraph is on the page
    pub fn is_placed(&self) -> bool {
        self.runs.iter().any(|r| r.position.is_some())
            || self.anchors.iter().any(|a| a.is_placed())
    }

    /// Every line placed so far, in reading order
    pub fn lines(&self) -> impl Iterator<Item = &SpanLayout> {
        self.runs.iter().flat_map(|r| r.lines.iter())
    }

    /// The horizontal extent lines of the paragraph are kept within
    fn bounds(&self, page: &PageTracker) -> Space {
        let left = self
            .fixed
            .map_or(page.content_box.x1 + self.margins.left, |p| p.x);
        let right = (page.content_box.x2 - self.margins.right).max(left + Pt(1.0));
        Space::new(left, right)
    }

    /// Lay the runs out in order. Returns a continuation with everything that did not fit,
    /// or [None] once the whole paragraph is placed.
    pub fn layout(
        &mut self,
        ctx: &LayoutContext,
        page: &mut PageTracker,
    ) -> Result<Option<StateParagraph>, LayoutError> {
        self.runs.iter_mut().for_each(StateText::reset);
        self.anchors.reset();
        let paragraph_bounds = self.bounds(page);
        let gap = ctx.config.anchor_line_gap;
        let last = self.runs.len().saturating_sub(1);
        let mut pending_gap = Pt::ZERO;
        let mut previous_bottom: Option<Pt> = None;

        for index in 0..self.runs.len() {
            let run = self.runs[index].run;
            let font = self.runs[index].font;
            let run_margins = self.runs[index].margins;
            let line_height = ctx.metrics.line_height(&font)?;
            let bounds = Space::new(
                paragraph_bounds.start + run_margins.left,
                (paragraph_bounds.end - run_margins.right)
                    .max(paragraph_bounds.start + run_margins.left + Pt(1.0)),
            );
            let lead = if index == 0 {
                self.margins.top
            } else {
                ctx.config.leading
            };
            let above = run_margins.top + lead + pending_gap;
            pending_gap = Pt::ZERO;
            let force = page.is_empty();
            let fixed_start = self.fixed.map(|p| {
                let top = previous_bottom.unwrap_or(p.y + lead);
                Position::new(bounds.start, top - above)
            });

            let line_below = line_height + run_margins.bottom;
            let (mut width, mut below) = (ctx.config.min_wrap_width, line_below);
            if self.anchors.has_pending(run) {
                let (w, h) = self.anchors.fit_to_page(run, line_height, page, &ctx.config);
                (width, below) = (w, h + run_margins.bottom);
            }
            // a fixed run still has to fit above whatever is placed under it
            let fixed_start = fixed_start.filter(|p| {
                force
                    || page.available_height_across(*p, width, Pt::ZERO, Pt::ZERO) + EPSILON
                        >= below
            });
            let mut found = match self.fixed {
                Some(_) => fixed_start,
                None => page.open_position(above, below, width),
            };
            if found.is_none() && force && self.anchors.has_pending(run) {
                self.anchors.drop_pending(run, page);
                found = page.open_position(above, line_below, ctx.config.min_wrap_width);
            }
            let start = match found {
                Some(position) => position.with_x(position.x.max(bounds.start)),
                None if force => Position::new(
                    bounds.start,
                    page.content_box.y2 - page.filled_height() - above,
                ),
                None => {
                    log::debug!("no room left for run {run:?}, continuing on the next page");
                    return Ok(Some(split_off(self, index, None)));
                }
            };

            let checkpoint = self
                .anchors
                .has_pending(run)
                .then(|| (page.clone(), self.anchors.clone()));
            let text_start = if self.anchors.has_pending(run) {
                let y = self.anchors.place_above(run, start, page, gap);
                let text_start = self.anchors.place_left(run, start.with_y(y), page);
                self.anchors.place_right(run, text_start, page);
                text_start
            } else {
                start
            };

            let flow = flow_text(
                ctx,
                page,
                FlowRequest {
                    text: &self.runs[index].text,
                    font,
                    start: text_start,
                    bounds,
                    alignment: self.alignment,
                    force,
                },
            )?;

            let offset = match flow.outcome {
                FlowOutcome::Overflow { offset: 0 } => {
                    // the anchors go wherever the run goes
                    if let Some((saved_page, saved_anchors)) = checkpoint {
                        *page = saved_page;
                        self.anchors = saved_anchors;
                    }
                    log::debug!("run {run:?} does not fit, continuing on the next page");
                    return Ok(Some(split_off(self, index, None)));
                }
                FlowOutcome::Overflow { offset } => Some(offset),
                FlowOutcome::Fits => None,
            };

            let state = &mut self.runs[index];
            state.lines = flow.lines;
            state.position = Some(text_start);
            state.height = flow.height;
            let bottom = text_start.y - flow.height;
            if flow.height > Pt::ZERO {
                let mut margins = Margins::empty();
                margins.bottom = run_margins.bottom;
                if index == last {
                    margins.bottom += self.margins.bottom;
                }
                if let Some(rect) = state.bounds() {
                    page.add(Footprint {
                        rect,
                        margins,
                        wrapping: false,
                    });
                }
            }

            if let Some(offset) = offset {
                let tail = self.runs[index].split_at(offset);
                return Ok(Some(split_off(self, index + 1, Some(tail))));
            }

            let mut bottom = bottom - run_margins.bottom;
            if self.anchors.has_pending_on(run, AnchorSide::Below) {
                let below_start = Position::new(bounds.start, bottom);
                match self.anchors.place_below(run, below_start, page, gap) {
                    Some(stack_bottom) => bottom = stack_bottom,
                    None => {
                        let carrier = self.runs[index].emptied();
                        return Ok(Some(split_off(self, index + 1, Some(carrier))));
                    }
                }
                pending_gap = gap;
            }
            previous_bottom = Some(bottom);
        }

        Ok(None)
    }
}

impl Continuable for StateParagraph {
    type Child = StateText;

    fn children_mut(&mut self) -> &mut Vec<StateText> {
        &mut self.runs
    }

    fn continue_with(&mut self, remainder: Vec<StateText>) -> StateParagraph {
        let runs: Vec<RunId> = remainder.iter().map(|r| r.run).collect();
        StateParagraph {
            origin: self.origin,
            alignment: self.alignment,
            margins: self.margins,
            fixed: None,
            anchors: self.anchors.take_pending(&runs),
            runs: remainder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Image;
    use crate::test_utils::*;
    use crate::LayoutWarning;
    use proptest::prelude::*;

    fn paragraph(texts: &[&str]) -> Paragraph {
        let mut p = Paragraph::new();
        for t in texts {
            p.add_text(Text::new(*t));
        }
        p
    }

    #[test]
    fn runs_follow_one_another() {
        let fonts = fonts();
        let ctx = LayoutContext::new(&fonts);
        let mut page = tracker(200.0, 200.0, 10.0);
        let mut state = StateParagraph::new(None, &paragraph(&["Test", "Test2"]), 4);
        assert!(state.layout(&ctx, &mut page).unwrap().is_none());
        assert_eq!(state.runs[0].position, Some(Position::new(Pt(10.0), Pt(190.0))));
        let second = state.runs[1].position.unwrap();
        assert_close(second.y, 190.0 - 10.8);
        assert_close(page.filled_height(), 2.0 * 10.8);
    }

    #[test]
    fn overflowing_runs_are_split_and_keep_their_id() {
        let fonts = fonts();
        let ctx = LayoutContext::new(&fonts);
        // two lines of 10.8 fit, a third does not
        let mut page = tracker(40.0, 25.0, 0.0);
        let mut template = Paragraph::new();
        let first = template.add_text(Text::new("Test Test Test"));
        let second = template.add_text(Text::new("Test2"));
        let mut state = StateParagraph::new(None, &template, 4);

        let rest = state.layout(&ctx, &mut page).unwrap().unwrap();
        assert_eq!(state.runs.len(), 1);
        assert_eq!(state.runs[0].text, "Test Test ");
        assert_eq!(rest.runs.len(), 2);
        assert_eq!((rest.runs[0].run, rest.runs[0].text.as_str()), (first, "Test"));
        assert_eq!(rest.runs[1].run, second);
        assert!(rest.fixed.is_none());
    }

    #[test]
    fn a_paragraph_that_does_not_start_moves_whole() {
        let fonts = fonts();
        let ctx = LayoutContext::new(&fonts);
        let mut page = tracker(100.0, 100.0, 0.0);
        page.add(Footprint::new(Position::new(Pt::ZERO, Pt(100.0)), Pt(100.0), Pt(95.0)));
        let mut state = StateParagraph::new(None, &paragraph(&["Test"]), 4);
        let rest = state.layout(&ctx, &mut page).unwrap().unwrap();
        assert!(!state.is_placed());
        assert!(state.runs.is_empty());
        assert_eq!(rest.runs[0].text, "Test");
    }

    #[test]
    fn side_anchors_sit_beside_the_text() {
        let fonts = fonts();
        let ctx = LayoutContext::new(&fonts);
        let mut page = tracker(300.0, 300.0, 0.0);
        let mut template = Paragraph::new();
        let run = template.add_text(Text::new("Test"));
        template
            .add_anchor(run, Image::new(Pt(40.0), Pt(30.0)), AnchorSide::Left)
            .add_anchor(run, Image::new(Pt(50.0), Pt(20.0)), AnchorSide::Right);
        let mut state = StateParagraph::new(None, &template, 4);
        assert!(state.layout(&ctx, &mut page).unwrap().is_none());

        let placed: Vec<(AnchorSide, Position)> = state
            .anchors
            .iter()
            .filter_map(|a| a.part.position.map(|p| (a.side, p)))
            .collect();
        assert_eq!(
            placed,
            vec![
                (AnchorSide::Left, Position::new(Pt::ZERO, Pt(300.0))),
                (AnchorSide::Right, Position::new(Pt(250.0), Pt(300.0))),
            ]
        );
        assert_eq!(state.runs[0].position, Some(Position::new(Pt(40.0), Pt(300.0))));
    }

    #[test]
    fn above_and_below_anchors_stack_around_the_run() {
        let fonts = fonts();
        let ctx = LayoutContext::new(&fonts);
        let mut page = tracker(300.0, 300.0, 0.0);
        let mut template = Paragraph::new();
        let run = template.add_text(Text::new("Test"));
        let next = template.add_text(Text::new("Test2"));
        template
            .add_anchor(run, Image::new(Pt(40.0), Pt(30.0)), AnchorSide::Above)
            .add_anchor(run, Image::new(Pt(40.0), Pt(20.0)), AnchorSide::Below);
        let mut state = StateParagraph::new(None, &template, 4);
        assert!(state.layout(&ctx, &mut page).unwrap().is_none());

        // image, gap, text line, image, gap, next run
        let text_top = 300.0 - 30.0 - 6.0;
        assert_close(state.runs[0].position.unwrap().y, text_top);
        let below = state
            .anchors
            .iter()
            .find(|a| a.side == AnchorSide::Below)
            .and_then(|a| a.part.position)
            .unwrap();
        assert_close(below.y, text_top - 10.8);
        assert_eq!(state.runs[1].run, next);
        assert_close(state.runs[1].position.unwrap().y, text_top - 10.8 - 20.0 - 6.0);
    }

    #[test]
    fn oversized_anchors_are_dropped_with_a_warning() {
        let fonts = fonts();
        let ctx = LayoutContext::new(&fonts);
        let mut page = tracker(100.0, 100.0, 0.0);
        let mut template = Paragraph::new();
        let run = template.add_text(Text::new("Test"));
        template.add_anchor(run, Image::new(Pt(50.0), Pt(500.0)), AnchorSide::Left);
        let mut state = StateParagraph::new(None, &template, 4);
        assert!(state.layout(&ctx, &mut page).unwrap().is_none());
        assert!(state.anchors.is_empty());
        assert!(matches!(page.warnings(), [LayoutWarning::AnchorDropped { .. }]));
        assert_eq!(state.runs[0].lines.len(), 1);
    }

    #[test]
    fn anchors_travel_with_their_run() {
        let fonts = fonts();
        let ctx = LayoutContext::new(&fonts);
        let mut page = tracker(200.0, 50.0, 0.0);
        let mut template = Paragraph::new();
        template.add_text(Text::new("Test"));
        let second = template.add_text(Text::new("Test2"));
        template.add_anchor(second, Image::new(Pt(30.0), Pt(30.0)), AnchorSide::Above);
        let mut state = StateParagraph::new(None, &template, 4);

        let rest = state.layout(&ctx, &mut page).unwrap().unwrap();
        assert_eq!(state.runs.len(), 1);
        assert!(state.anchors.is_empty());
        assert_eq!(rest.runs[0].run, second);
        assert_eq!(rest.anchors.iter().count(), 1);

        let mut next_page = tracker(200.0, 50.0, 0.0);
        let mut rest = rest;
        assert!(rest.layout(&ctx, &mut next_page).unwrap().is_none());
        assert!(rest.anchors.iter().all(|a| a.is_placed()));
    }

    #[test]
    fn fixed_paragraphs_ignore_the_fill_line() {
        let fonts = fonts();
        let ctx = LayoutContext::new(&fonts);
        let mut page = tracker(300.0, 300.0, 0.0);
        page.add(
            Footprint::new(Position::new(Pt::ZERO, Pt(300.0)), Pt(40.0), Pt(100.0))
                .wrapping(true),
        );
        let mut template = paragraph(&["Test", "Test2"]);
        template.on(Position::new(Pt(50.0), Pt(250.0)));
        let mut state = StateParagraph::new(None, &template, 4);
        assert!(state.layout(&ctx, &mut page).unwrap().is_none());
        assert_eq!(state.runs[0].position, Some(Position::new(Pt(50.0), Pt(250.0))));
        assert_close(state.runs[1].position.unwrap().y, 250.0 - 10.8);
    }

    #[test]
    fn a_fixed_run_that_cannot_start_takes_its_anchors_along() {
        let fonts = fonts();
        let ctx = LayoutContext::new(&fonts);
        let mut page = tracker(300.0, 300.0, 0.0);
        page.add(Footprint::new(Position::new(Pt(200.0), Pt(300.0)), Pt(10.0), Pt(10.0)));
        let mut template = Paragraph::new();
        let run = template.add_text(Text::new("Test"));
        template
            .add_anchor(run, Image::new(Pt(40.0), Pt(30.0)), AnchorSide::Above)
            .on(Position::new(Pt::ZERO, Pt(40.0)));
        let mut state = StateParagraph::new(None, &template, 4);

        let rest = state.layout(&ctx, &mut page).unwrap().unwrap();
        assert!(!state.is_placed());
        assert_eq!(page.occupants().len(), 1);
        assert_eq!(rest.runs[0].run, run);
        assert_eq!(rest.anchors.iter().count(), 1);
        assert!(rest.anchors.iter().all(|a| !a.is_placed()));
    }

    #[test]
    fn laying_out_again_places_the_anchors_again() {
        let fonts = fonts();
        let ctx = LayoutContext::new(&fonts);
        let mut template = Paragraph::new();
        let run = template.add_text(Text::new("Test"));
        template.add_anchor(run, Image::new(Pt(40.0), Pt(30.0)), AnchorSide::Left);
        let mut state = StateParagraph::new(None, &template, 4);

        let mut page = tracker(300.0, 300.0, 0.0);
        assert!(state.layout(&ctx, &mut page).unwrap().is_none());
        let first = state.clone();
        let mut page = tracker(300.0, 300.0, 0.0);
        assert!(state.layout(&ctx, &mut page).unwrap().is_none());
        assert_eq!(state, first);
        assert_eq!(page.occupants().len(), 2);
        assert_eq!(state.runs[0].position, Some(Position::new(Pt(40.0), Pt(300.0))));
    }

    fn words(texts: &[String]) -> Vec<String> {
        texts
            .iter()
            .flat_map(|t| t.split_whitespace().map(str::to_string))
            .collect()
    }

    proptest! {
        #[test]
        fn every_word_lands_once_and_in_order(
            runs in prop::collection::vec(
                prop::collection::vec("[a-z]{1,10}", 1..40),
                1..4,
            ),
            width in 100f32..400.0,
            height in 15f32..300.0,
        ) {
            let fonts = fonts();
            let ctx = LayoutContext::new(&fonts);
            let texts: Vec<String> = runs.iter().map(|r| r.join(" ")).collect();
            let mut template = Paragraph::new();
            for text in &texts {
                template.add_text(Text::new(text));
            }

            let mut placed = Vec::new();
            let mut pending = Some(StateParagraph::new(None, &template, 4));
            let mut pages = 0;
            while let Some(mut state) = pending.take() {
                pages += 1;
                prop_assert!(pages < 1000);
                let mut page = tracker(width, height, 0.0);
                pending = state.layout(&ctx, &mut page).unwrap();
                placed.extend(state.lines().map(|l| l.text.clone()));
            }
            prop_assert_eq!(words(&placed), words(&texts));
        }
    }
}
