use crate::geometry::Position;
use crate::image::Image;
use crate::layout::place_horizontally;
use crate::page::{Footprint, PageTracker};
use crate::part::PartId;
use crate::rect::Rect;
use crate::LayoutWarning;

/// An image being placed on a page, either on its own or anchored to a text run
#[derive(Debug, Clone, PartialEq)]
pub struct StateImage {
    pub origin: Option<PartId>,
    pub image: Image,
    /// Top-left of the image once placed
    pub position: Option<Position>,
}

impl StateImage {
    pub fn new(origin: Option<PartId>, image: Image) -> StateImage {
        StateImage {
            origin,
            image,
            position: None,
        }
    }

    /// Where the image landed, if it has
    pub fn bounds(&self) -> Option<Rect> {
        self.position
            .map(|p| Rect::from_top_left(p, self.image.width(), self.image.height()))
    }

    /// Put the image's top-left corner at `position` and record it on the page
    pub(crate) fn place(&mut self, page: &mut PageTracker, position: Position, wrapping: bool) {
        self.position = Some(position);
        page.add(
            Footprint::new(position, self.image.width(), self.image.height())
                .margins(self.image.margins)
                .wrapping(wrapping),
        );
    }

    /// Place the image at the first spot it fits, aligned within the free space there.
    /// Returns the image itself, unplaced, when it has to wait for the next page.
    pub fn layout(&mut self, page: &mut PageTracker) -> Option<StateImage> {
        let (width, height) = (self.image.width(), self.image.height());
        let margins = self.image.margins;
        let wrapping = self.image.wrapping;

        if let Some(fixed) = self.image.position {
            self.place(page, fixed, wrapping);
            return None;
        }

        let found = page.open_position(
            margins.top,
            height + margins.bottom,
            width + margins.horizontal(),
        );
        let position = match found {
            Some(position) => position,
            None if page.is_empty() => {
                page.warn(LayoutWarning::PartForced { width, height });
                let top_left = page.content_box.top_left();
                let forced = Position::new(top_left.x + margins.left, top_left.y - margins.top);
                self.place(page, forced, wrapping);
                return None;
            }
            None => {
                log::debug!("image does not fit, moving it to the next page");
                return Some(StateImage::new(self.origin, self.image.clone()));
            }
        };

        let spaces = page.open_spaces_on(position, false, margins.top, height + margins.bottom);
        let x = place_horizontally(self.image.alignment, &spaces, width, &margins)
            .map(|(x, _)| x)
            .unwrap_or(position.x + margins.left);
        self.place(page, position.with_x(x), wrapping);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Alignment, Margins};
    use crate::test_utils::*;
    use crate::Pt;

    #[test]
    fn images_stack_down_the_page() {
        let mut page = tracker(200.0, 200.0, 10.0);
        let mut first = StateImage::new(None, Image::new(Pt(50.0), Pt(50.0)));
        let mut second = StateImage::new(None, Image::new(Pt(50.0), Pt(50.0)));
        assert!(first.layout(&mut page).is_none());
        assert!(second.layout(&mut page).is_none());
        assert_eq!(first.position, Some(Position::new(Pt(10.0), Pt(190.0))));
        assert_eq!(second.position, Some(Position::new(Pt(10.0), Pt(140.0))));
    }

    #[test]
    fn alignment_and_margins_shift_the_image() {
        let mut page = tracker(200.0, 200.0, 10.0);
        let image = Image::new(Pt(50.0), Pt(50.0))
            .align(Alignment::Right)
            .margins(Margins::all(Pt(5.0)));
        let mut state = StateImage::new(None, image);
        state.layout(&mut page);
        assert_eq!(state.position, Some(Position::new(Pt(135.0), Pt(185.0))));
        assert_eq!(page.filled_height(), Pt(60.0));
    }

    #[test]
    fn images_that_do_not_fit_wait_for_the_next_page() {
        let mut page = tracker(200.0, 200.0, 10.0);
        let mut first = StateImage::new(None, Image::new(Pt(50.0), Pt(150.0)));
        first.layout(&mut page);
        let mut second = StateImage::new(None, Image::new(Pt(50.0), Pt(50.0)));
        let rest = second.layout(&mut page).unwrap();
        assert_eq!(rest.position, None);
        assert_eq!(second.position, None);
    }

    #[test]
    fn oversized_images_are_forced_onto_empty_pages() {
        let mut page = tracker(200.0, 200.0, 10.0);
        let mut state = StateImage::new(None, Image::new(Pt(500.0), Pt(500.0)));
        assert!(state.layout(&mut page).is_none());
        assert_eq!(state.position, Some(Position::new(Pt(10.0), Pt(190.0))));
        assert!(matches!(page.warnings(), [LayoutWarning::PartForced { .. }]));
    }
}
