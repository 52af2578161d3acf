use crate::config::LayoutConfig;
use crate::geometry::Position;
use crate::layout::{AnchorSide, StateImage};
use crate::page::PageTracker;
use crate::part::{Anchor, RunId};
use crate::{LayoutWarning, Pt};

/// A part anchored to a text run, and where it ended up
#[derive(Debug, Clone, PartialEq)]
pub struct StateAnchor {
    pub run: RunId,
    pub side: AnchorSide,
    pub part: StateImage,
}

impl StateAnchor {
    fn outer_width(&self) -> Pt {
        self.part.image.width() + self.part.image.margins.horizontal()
    }

    fn outer_height(&self) -> Pt {
        self.part.image.height() + self.part.image.margins.vertical()
    }

    pub fn is_placed(&self) -> bool {
        self.part.position.is_some()
    }
}

/// The anchored parts of a paragraph, looked up by the [RunId] of the run they hang off.
/// Anchors stay in declaration order within each side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnchorRegistry {
    anchors: Vec<StateAnchor>,
}

impl AnchorRegistry {
    pub fn new(anchors: &[Anchor]) -> AnchorRegistry {
        AnchorRegistry {
            anchors: anchors
                .iter()
                .map(|a| StateAnchor {
                    run: a.run,
                    side: a.side,
                    part: StateImage::new(None, a.part.clone()),
                })
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateAnchor> {
        self.anchors.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Forget where every anchor went, ready for laying the paragraph out again
    pub(crate) fn reset(&mut self) {
        for anchor in &mut self.anchors {
            anchor.part.position = None;
        }
    }

    /// Whether `run` still has anchors waiting to be placed
    pub fn has_pending(&self, run: RunId) -> bool {
        self.anchors.iter().any(|a| a.run == run && !a.is_placed())
    }

    pub fn has_pending_on(&self, run: RunId, side: AnchorSide) -> bool {
        self.pending(run, side).next().is_some()
    }

    fn pending(&self, run: RunId, side: AnchorSide) -> impl Iterator<Item = &StateAnchor> {
        self.anchors
            .iter()
            .filter(move |a| a.run == run && a.side == side && !a.is_placed())
    }

    fn pending_mut(
        &mut self,
        run: RunId,
        side: AnchorSide,
    ) -> impl Iterator<Item = &mut StateAnchor> {
        self.anchors
            .iter_mut()
            .filter(move |a| a.run == run && a.side == side && !a.is_placed())
    }

    /// The space a run needs to be set together with its pending anchors, as
    /// `(width, height)`. Anchors that could never fit on a page this size, even alone on
    /// it, are dropped with a warning.
    pub(crate) fn fit_to_page(
        &mut self,
        run: RunId,
        line_height: Pt,
        page: &mut PageTracker,
        config: &LayoutConfig,
    ) -> (Pt, Pt) {
        let max_width = page.width_without_margins();
        let max_height = page.height_without_margins();
        let mut beside_width = Pt::ZERO;
        let mut stacked_width = Pt::ZERO;
        let mut beside_height = line_height;
        let mut stacked_height = Pt::ZERO;
        let mut dropped = Vec::new();

        for (i, anchor) in self.anchors.iter().enumerate() {
            if anchor.run != run || anchor.is_placed() {
                continue;
            }
            let (w, h) = (anchor.outer_width(), anchor.outer_height());
            let (bw, sw, bh, sh) = if anchor.side.is_beside() {
                (beside_width + w, stacked_width, beside_height.max(h), stacked_height)
            } else {
                (
                    beside_width,
                    stacked_width.max(w),
                    beside_height,
                    stacked_height + h + config.anchor_line_gap,
                )
            };
            let required_width = (bw + config.min_wrap_width).max(sw);
            let required_height = bh + sh;
            if required_width > max_width || required_height > max_height {
                page.warn(LayoutWarning::AnchorDropped {
                    side: anchor.side,
                    required_width,
                    required_height,
                });
                dropped.push(i);
                continue;
            }
            (beside_width, stacked_width, beside_height, stacked_height) = (bw, sw, bh, sh);
        }

        for i in dropped.into_iter().rev() {
            self.anchors.remove(i);
        }
        (
            (beside_width + config.min_wrap_width).max(stacked_width),
            beside_height + stacked_height,
        )
    }

    /// Drop every pending anchor of `run`, used when they cannot be fit on an otherwise
    /// empty page
    pub(crate) fn drop_pending(&mut self, run: RunId, page: &mut PageTracker) {
        let mut kept = Vec::with_capacity(self.anchors.len());
        for anchor in self.anchors.drain(..) {
            if anchor.run == run && !anchor.is_placed() {
                page.warn(LayoutWarning::AnchorDropped {
                    side: anchor.side,
                    required_width: anchor.outer_width(),
                    required_height: anchor.outer_height(),
                });
            } else {
                kept.push(anchor);
            }
        }
        self.anchors = kept;
    }

    /// Stack the run's [AnchorSide::Above] anchors down from `start`. Returns the height
    /// at which the run itself begins.
    pub(crate) fn place_above(
        &mut self,
        run: RunId,
        start: Position,
        page: &mut PageTracker,
        gap: Pt,
    ) -> Pt {
        let mut y = start.y;
        for anchor in self.pending_mut(run, AnchorSide::Above) {
            let margins = anchor.part.image.margins;
            let height = anchor.outer_height();
            let position = Position::new(start.x + margins.left, y - margins.top);
            anchor.part.place(page, position, false);
            y -= height + gap;
        }
        y
    }

    /// Line the run's [AnchorSide::Left] anchors up from `start` rightwards. Returns where
    /// the run's text begins.
    pub(crate) fn place_left(
        &mut self,
        run: RunId,
        start: Position,
        page: &mut PageTracker,
    ) -> Position {
        let mut x = start.x;
        for anchor in self.pending_mut(run, AnchorSide::Left) {
            let margins = anchor.part.image.margins;
            let position = Position::new(x + margins.left, start.y - margins.top);
            x += anchor.outer_width();
            anchor.part.place(page, position, true);
        }
        start.with_x(x)
    }

    /// Put the run's [AnchorSide::Right] anchors against the right edge of the rightmost
    /// free interval wide enough for them. Anchors with nowhere to go are dropped.
    pub(crate) fn place_right(&mut self, run: RunId, text_start: Position, page: &mut PageTracker) {
        let mut stranded = Vec::new();
        for anchor in self.pending_mut(run, AnchorSide::Right) {
            let margins = anchor.part.image.margins;
            let (width, height) = (anchor.outer_width(), anchor.outer_height());
            let spaces = page.open_spaces_on(text_start, true, Pt::ZERO, height);
            match spaces.iter().rev().find(|s| s.width() >= width) {
                Some(space) => {
                    let x = space.end - margins.right - anchor.part.image.width();
                    let position = Position::new(x, text_start.y - margins.top);
                    anchor.part.place(page, position, true);
                }
                None => stranded.push((anchor.side, width, height)),
            }
        }
        if !stranded.is_empty() {
            for (side, required_width, required_height) in stranded {
                page.warn(LayoutWarning::AnchorDropped {
                    side,
                    required_width,
                    required_height,
                });
            }
            self.anchors
                .retain(|a| !(a.run == run && a.side == AnchorSide::Right && !a.is_placed()));
        }
    }

    /// Stack the run's [AnchorSide::Below] anchors down from `start`, as far as the page
    /// allows. Returns the bottom of the stack, or [None] if some anchors had to be left
    /// for the next page.
    pub(crate) fn place_below(
        &mut self,
        run: RunId,
        start: Position,
        page: &mut PageTracker,
        gap: Pt,
    ) -> Option<Pt> {
        let mut y = start.y;
        let mut bottom = start.y;
        for anchor in self.pending_mut(run, AnchorSide::Below) {
            let margins = anchor.part.image.margins;
            let height = anchor.outer_height();
            if y - height < page.content_box.y1 {
                return None;
            }
            let position = Position::new(start.x + margins.left, y - margins.top);
            anchor.part.place(page, position, false);
            bottom = y - height;
            y = bottom - gap;
        }
        Some(bottom)
    }

    /// Move the not yet placed anchors of `runs` into a registry of their own, for a
    /// continuation holding those runs
    pub(crate) fn take_pending(&mut self, runs: &[RunId]) -> AnchorRegistry {
        let (moving, staying) = self
            .anchors
            .drain(..)
            .partition(|a| !a.is_placed() && runs.contains(&a.run));
        self.anchors = staying;
        AnchorRegistry { anchors: moving }
    }
}
