use crate::geometry::{free_spaces, merge_spaces, Position, Space};
use crate::layout::Margins;
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::units::Pt;
use crate::LayoutWarning;

/// Comparisons against page geometry tolerate this much floating point slop
pub(crate) const EPSILON: Pt = Pt(0.001);

/// Content areas never shrink below this, however large the margins
const MIN_CONTENT: Pt = Pt(1.0);

/// The space a placed part takes up on its page.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Footprint {
    /// The part's content area
    pub rect: Rect,
    /// Clearance around the content, occupied along with it
    pub margins: Margins,
    /// When set, the part only blocks its own horizontal extent and other content may sit
    /// beside it. Otherwise it claims the full page width at every height it covers.
    pub wrapping: bool,
}

impl Footprint {
    pub fn new(position: Position, width: Pt, height: Pt) -> Footprint {
        Footprint {
            rect: Rect::from_top_left(position, width, height),
            margins: Margins::empty(),
            wrapping: false,
        }
    }

    pub fn margins(mut self, margins: Margins) -> Footprint {
        self.margins = margins;
        self
    }

    pub fn wrapping(mut self, wrapping: bool) -> Footprint {
        self.wrapping = wrapping;
        self
    }

    /// The content area grown by the margins
    pub fn outer(&self) -> Rect {
        Rect {
            x1: self.rect.x1 - self.margins.left,
            y1: self.rect.y1 - self.margins.bottom,
            x2: self.rect.x2 + self.margins.right,
            y2: self.rect.y2 + self.margins.top,
        }
    }

    /// The horizontal interval this footprint blocks on a page `page_width` wide
    pub fn span(&self, page_width: Pt) -> Space {
        if self.wrapping {
            let outer = self.outer();
            Space::new(outer.x1, outer.x2)
        } else {
            Space::new(Pt::ZERO, page_width)
        }
    }

    /// Whether the footprint covers `height`, edges included
    pub fn covers_height(&self, height: Pt) -> bool {
        let outer = self.outer();
        height >= outer.y1 - EPSILON && height <= outer.y2 + EPSILON
    }

    /// Whether the footprint intrudes into the band between `bottom` and `top`. Merely
    /// touching the band does not count, so content can be stacked edge to edge.
    pub fn intrudes(&self, bottom: Pt, top: Pt) -> bool {
        let outer = self.outer();
        if top - bottom <= EPSILON {
            return bottom > outer.y1 + EPSILON && bottom < outer.y2 - EPSILON;
        }
        bottom < outer.y2 - EPSILON && top > outer.y1 + EPSILON
    }

    /// The left edges of the footprint's occupied interval at `height`: a single offset
    /// when the height is covered, nothing otherwise
    pub fn positions_at(&self, height: Pt, page_width: Pt) -> Vec<Pt> {
        if self.covers_height(height) {
            vec![self.span(page_width).start]
        } else {
            Vec::new()
        }
    }
}

/// Tracks what is already on a page and answers where new content can go.
///
/// Occupancy is kept as the list of placed [Footprint]s; every query rebuilds the free
/// intervals it needs from that list, so the answers always reflect everything placed so
/// far. Coordinates follow PDF conventions: the origin is the lower-left corner of the
/// page and `y` grows upwards.
#[derive(Debug, Clone)]
pub struct PageTracker {
    /// The size of the page
    pub media_box: Rect,
    /// Where content can live, i.e. within the margins
    pub content_box: Rect,
    margins: Margins,
    filled_width: Pt,
    filled_height: Pt,
    occupants: Vec<Footprint>,
    warnings: Vec<LayoutWarning>,
}

impl PageTracker {
    pub fn new(size: PageSize, margins: Margins) -> PageTracker {
        let (width, height) = (size.0.at_least(*MIN_CONTENT), size.1.at_least(*MIN_CONTENT));
        let mut margins = margins;
        margins.left = margins.left.max(Pt::ZERO);
        margins.right = margins.right.max(Pt::ZERO);
        margins.top = margins.top.max(Pt::ZERO);
        margins.bottom = margins.bottom.max(Pt::ZERO);
        if width - margins.horizontal() < MIN_CONTENT {
            log::warn!("horizontal page margins leave no room for content, ignoring them");
            margins.left = Pt::ZERO;
            margins.right = Pt::ZERO;
        }
        if height - margins.vertical() < MIN_CONTENT {
            log::warn!("vertical page margins leave no room for content, ignoring them");
            margins.top = Pt::ZERO;
            margins.bottom = Pt::ZERO;
        }

        PageTracker {
            media_box: Rect {
                x1: Pt::ZERO,
                y1: Pt::ZERO,
                x2: width,
                y2: height,
            },
            content_box: Rect {
                x1: margins.left,
                y1: margins.bottom,
                x2: width - margins.right,
                y2: height - margins.top,
            },
            margins,
            filled_width: Pt::ZERO,
            filled_height: Pt::ZERO,
            occupants: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn width(&self) -> Pt {
        self.media_box.width()
    }

    pub fn height(&self) -> Pt {
        self.media_box.height()
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn width_without_margins(&self) -> Pt {
        self.content_box.width()
    }

    pub fn height_without_margins(&self) -> Pt {
        self.content_box.height()
    }

    /// How far down from the top of the content area the page has been filled
    pub fn filled_height(&self) -> Pt {
        self.filled_height
    }

    /// How far right from the left of the content area anything has been placed
    pub fn filled_width(&self) -> Pt {
        self.filled_width
    }

    pub fn remaining_height(&self) -> Pt {
        (self.height_without_margins() - self.filled_height).max(Pt::ZERO)
    }

    pub fn remaining_width(&self) -> Pt {
        (self.width_without_margins() - self.filled_width).max(Pt::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    pub fn occupants(&self) -> &[Footprint] {
        &self.occupants
    }

    /// Where the fill line currently sits
    fn cursor(&self) -> Position {
        Position::new(self.content_box.x1, self.content_box.y2 - self.filled_height)
    }

    /// Find the highest spot at or below the current fill where a part `width` wide fits,
    /// with `above` of free clearance over the returned position and `below` of free space
    /// under it. Returns [None] when no such spot exists before the bottom margin.
    pub fn open_position(&self, above: Pt, below: Pt, width: Pt) -> Option<Position> {
        self.scan(self.cursor(), false, above, below, width)
    }

    /// Like [PageTracker::open_position] but searching downwards from `start` instead of
    /// the fill line. Free space left of `start.x` is ignored on the first row searched.
    pub fn open_position_from(
        &self,
        start: Position,
        above: Pt,
        below: Pt,
        width: Pt,
    ) -> Option<Position> {
        self.scan(start, true, above, below, width)
    }

    fn scan(
        &self,
        start: Position,
        honor_x: bool,
        above: Pt,
        below: Pt,
        width: Pt,
    ) -> Option<Position> {
        let mut y = start.y - above;
        let mut first = true;
        loop {
            if y - below < self.content_box.y1 - EPSILON {
                return None;
            }

            let probe = Position::new(start.x, y);
            let ignore_before = honor_x && first;
            let spaces = self.open_spaces_on(probe, ignore_before, above, below);
            let found = spaces.iter().find_map(|s| {
                let from = if ignore_before {
                    s.start.max(start.x)
                } else {
                    s.start
                };
                (s.end - from >= width - EPSILON).then_some(from)
            });
            if let Some(x) = found {
                return Some(Position::new(x, y));
            }

            match self.next_row(y, above, below) {
                Some(next) => {
                    y = next;
                    first = false;
                }
                None => return None,
            }
        }
    }

    /// The first height below `y` at which the set of footprints intruding into the
    /// clearance band changes
    fn next_row(&self, y: Pt, above: Pt, below: Pt) -> Option<Pt> {
        self.occupants
            .iter()
            .filter(|o| o.intrudes(y - below, y + above))
            .map(|o| o.outer().y1 - above)
            .filter(|candidate| *candidate < y - EPSILON)
            .fold(None, |highest: Option<Pt>, c| {
                Some(highest.map_or(c, |h| h.max(c)))
            })
    }

    /// The free horizontal intervals inside the content area across the band from
    /// `position.y - below` to `position.y + above`, left to right. With `ignore_before_x`
    /// intervals ending at or before `position.x` are left out.
    pub fn open_spaces_on(
        &self,
        position: Position,
        ignore_before_x: bool,
        above: Pt,
        below: Pt,
    ) -> Vec<Space> {
        let used: Vec<Space> = self
            .occupants
            .iter()
            .filter(|o| o.intrudes(position.y - below, position.y + above))
            .map(|o| o.span(self.width()))
            .collect();
        free_spaces(
            Space::new(self.content_box.x1, self.content_box.x2),
            &used,
        )
        .into_iter()
        .filter(|s| !ignore_before_x || s.end > position.x + EPSILON)
        .map(|s| Space::at_height(s.start, s.end, position.y))
        .collect()
    }

    /// Total free width across the band around `position`
    pub fn total_available_width(&self, position: Position, above: Pt, below: Pt) -> Pt {
        self.open_spaces_on(position, false, above, below)
            .iter()
            .map(Space::width)
            .sum()
    }

    /// How far down from `position` content could extend before running into something
    /// placed at that x or the bottom margin, less `below`. Zero when `above` of clearance
    /// is not free.
    pub fn available_height(&self, position: Position, above: Pt, below: Pt) -> Pt {
        self.available_height_across(position, Pt::ZERO, above, below)
    }

    /// [PageTracker::available_height] for something `width` wide hanging from `position`
    pub(crate) fn available_height_across(
        &self,
        position: Position,
        width: Pt,
        above: Pt,
        below: Pt,
    ) -> Pt {
        let (x1, x2) = (position.x, position.x + width);
        let mut floor = self.content_box.y1;
        for o in &self.occupants {
            let span = o.span(self.width());
            let overlaps = if width <= EPSILON {
                span.start <= x1 + EPSILON && x1 < span.end - EPSILON
            } else {
                span.start < x2 - EPSILON && span.end > x1 + EPSILON
            };
            if !overlaps {
                continue;
            }
            let outer = o.outer();
            if outer.y1 >= position.y + above - EPSILON {
                continue;
            }
            if outer.y2 > position.y + EPSILON {
                return Pt::ZERO;
            }
            floor = floor.max(outer.y2);
        }
        (position.y - floor - below).max(Pt::ZERO)
    }

    /// The occupied horizontal intervals at `height`, merged and left to right
    pub fn used_spaces_at(&self, height: Pt) -> Vec<Space> {
        let used = self
            .occupants
            .iter()
            .filter(|o| o.covers_height(height))
            .map(|o| o.span(self.width()))
            .collect();
        merge_spaces(used)
            .into_iter()
            .map(|s| Space::at_height(s.start, s.end, height))
            .collect()
    }

    /// Record a placed part. The filled height and width only ever grow.
    pub fn add(&mut self, footprint: Footprint) {
        let outer = footprint.outer();
        let height = (self.content_box.y2 - outer.y1).min(self.height_without_margins());
        let width = (outer.x2 - self.content_box.x1).min(self.width_without_margins());
        self.filled_height = self.filled_height.max(height);
        self.filled_width = self.filled_width.max(width);
        log::trace!(
            "occupied {:?}, page filled to {} x {}",
            outer,
            self.filled_width,
            self.filled_height
        );
        self.occupants.push(footprint);
    }

    pub(crate) fn warn(&mut self, warning: LayoutWarning) {
        log::warn!("{warning:?}");
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[LayoutWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<LayoutWarning> {
        std::mem::take(&mut self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagesize;
    use proptest::prelude::*;

    fn page() -> PageTracker {
        PageTracker::new(
            (Pt(800.0), Pt(800.0)),
            Margins::trbl(Pt(3.0), Pt(20.0), Pt(20.0), Pt(20.0)),
        )
    }

    #[test]
    fn empty_page_opens_at_the_top_left_of_the_content_box() {
        let page = page();
        assert!(page.is_empty());
        assert_eq!(
            page.open_position(Pt::ZERO, Pt(10.0), Pt(100.0)),
            Some(Position::new(Pt(20.0), Pt(797.0)))
        );
        assert_eq!(page.width_without_margins(), Pt(760.0));
        assert_eq!(page.height_without_margins(), Pt(777.0));
    }

    #[test]
    fn full_width_footprints_push_the_fill_line_down() {
        let mut page = page();
        page.add(Footprint::new(Position::new(Pt(20.0), Pt(797.0)), Pt(100.0), Pt(50.0)));
        assert_eq!(page.filled_height(), Pt(50.0));
        assert_eq!(page.filled_width(), Pt(100.0));
        assert_eq!(
            page.open_position(Pt::ZERO, Pt(10.0), Pt(10.0)),
            Some(Position::new(Pt(20.0), Pt(747.0)))
        );
    }

    #[test]
    fn wrapping_footprints_leave_room_beside_them() {
        let mut page = page();
        page.add(
            Footprint::new(Position::new(Pt(20.0), Pt(797.0)), Pt(100.0), Pt(50.0))
                .wrapping(true),
        );
        let spaces =
            page.open_spaces_on(Position::new(Pt(20.0), Pt(790.0)), false, Pt::ZERO, Pt(10.0));
        assert_eq!(spaces.len(), 1);
        assert_eq!((spaces[0].start, spaces[0].end), (Pt(120.0), Pt(780.0)));
        assert_eq!(spaces[0].valid_at_height, Some(Pt(790.0)));
        assert_eq!(
            page.total_available_width(Position::new(Pt(20.0), Pt(790.0)), Pt::ZERO, Pt(10.0)),
            Pt(660.0)
        );
    }

    #[test]
    fn open_position_skips_past_blockers_that_are_too_wide() {
        let mut page = page();
        page.add(
            Footprint::new(Position::new(Pt(20.0), Pt(797.0)), Pt(700.0), Pt(40.0))
                .wrapping(true),
        );
        let position = page.open_position_from(
            Position::new(Pt(20.0), Pt(797.0)),
            Pt::ZERO,
            Pt(10.0),
            Pt(100.0),
        );
        assert_eq!(position, Some(Position::new(Pt(20.0), Pt(757.0))));
        let beside = page.open_position_from(
            Position::new(Pt(20.0), Pt(797.0)),
            Pt::ZERO,
            Pt(10.0),
            Pt(50.0),
        );
        assert_eq!(beside, Some(Position::new(Pt(720.0), Pt(797.0))));
    }

    #[test]
    fn nothing_fits_below_the_bottom_margin() {
        let page = page();
        assert_eq!(page.open_position(Pt::ZERO, Pt(778.0), Pt(10.0)), None);
        assert_eq!(page.open_position(Pt::ZERO, Pt(10.0), Pt(761.0)), None);
    }

    #[test]
    fn used_spaces_include_margins_and_honour_wrapping() {
        let mut page = PageTracker::new(pagesize::LETTER, Margins::empty());
        let table = Footprint::new(Position::new(Pt(100.0), Pt(100.0)), Pt(300.0), Pt::ZERO)
            .margins(Margins::trbl(Pt(10.0), Pt::ZERO, Pt(20.0), Pt::ZERO));
        let table = table.wrapping(true);
        page.add(table);
        assert_eq!(
            page.used_spaces_at(Pt(110.0)),
            vec![Space::at_height(Pt(100.0), Pt(400.0), Pt(110.0))]
        );
        assert_eq!(page.used_spaces_at(Pt(80.0)).len(), 1);
        assert!(page.used_spaces_at(Pt(140.0)).is_empty());
        assert!(page.used_spaces_at(Pt(70.0)).is_empty());

        assert_eq!(table.positions_at(Pt(110.0), page.width()), vec![Pt(100.0)]);
        assert!(table.positions_at(Pt(140.0), page.width()).is_empty());
        assert!(table.positions_at(Pt(70.0), page.width()).is_empty());
        assert_eq!(table.positions_at(Pt(90.0), page.width()), vec![Pt(100.0)]);
        assert_eq!(
            table.wrapping(false).positions_at(Pt(90.0), page.width()),
            vec![Pt::ZERO]
        );
    }

    #[test]
    fn available_height_stops_at_what_lies_below() {
        let mut page = page();
        page.add(Footprint::new(Position::new(Pt(20.0), Pt(400.0)), Pt(100.0), Pt(100.0)));
        assert_eq!(
            page.available_height(Position::new(Pt(20.0), Pt(797.0)), Pt::ZERO, Pt::ZERO),
            Pt(397.0)
        );
        assert_eq!(
            page.available_height(Position::new(Pt(20.0), Pt(350.0)), Pt::ZERO, Pt::ZERO),
            Pt::ZERO
        );
        assert_eq!(
            page.available_height(Position::new(Pt(20.0), Pt(290.0)), Pt::ZERO, Pt(10.0)),
            Pt(260.0)
        );
    }

    #[test]
    fn absurd_margins_are_ignored() {
        let page = PageTracker::new((Pt(100.0), Pt(100.0)), Margins::all(Pt(60.0)));
        assert_eq!(page.width_without_margins(), Pt(100.0));
        assert_eq!(page.height_without_margins(), Pt(100.0));
    }

    proptest! {
        #[test]
        fn fill_never_shrinks(parts in prop::collection::vec((0f32..760.0, 0f32..777.0, 1f32..200.0, 1f32..200.0, any::<bool>()), 1..20)) {
            let mut page = page();
            let (mut width, mut height) = (Pt::ZERO, Pt::ZERO);
            for (x, y, w, h, wrapping) in parts {
                page.add(
                    Footprint::new(Position::new(Pt(20.0 + x), Pt(20.0 + y)), Pt(w), Pt(h))
                        .wrapping(wrapping),
                );
                prop_assert!(page.filled_height() >= height);
                prop_assert!(page.filled_width() >= width);
                prop_assert!(page.filled_height() <= page.height_without_margins());
                height = page.filled_height();
                width = page.filled_width();
            }
        }

        #[test]
        fn open_positions_are_free(parts in prop::collection::vec((0f32..700.0, 0f32..700.0, 1f32..100.0, 1f32..100.0), 0..10), width in 1f32..300.0, below in 0f32..100.0) {
            let mut page = page();
            for (x, y, w, h) in parts {
                page.add(
                    Footprint::new(Position::new(Pt(20.0 + x), Pt(50.0 + y)), Pt(w), Pt(h))
                        .wrapping(true),
                );
            }
            if let Some(p) = page.open_position(Pt::ZERO, Pt(below), Pt(width)) {
                prop_assert!(p.y - Pt(below) >= page.content_box.y1 - EPSILON);
                prop_assert!(p.x + Pt(width) <= page.content_box.x2 + EPSILON);
                let band = Footprint::new(p, Pt(width), Pt(below));
                for o in page.occupants() {
                    let (a, b) = (o.outer(), band.outer());
                    let apart = a.x2 <= b.x1 + EPSILON
                        || b.x2 <= a.x1 + EPSILON
                        || a.y2 <= b.y1 + EPSILON
                        || b.y2 <= a.y1 + EPSILON;
                    prop_assert!(apart, "{:?} overlaps {:?}", a, b);
                }
            }
        }
    }
}
