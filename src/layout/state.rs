use crate::layout::{LayoutContext, StateImage, StateParagraph, StateTable};
use crate::page::PageTracker;
use crate::part::{Part, PartId};
use crate::rect::Rect;
use crate::{LayoutError, LayoutWarning};

/// A part being laid out, carrying everything placed so far
#[derive(Debug, Clone, PartialEq)]
pub enum StatePart {
    Paragraph(StateParagraph),
    Table(StateTable),
    Image(StateImage),
}

impl StatePart {
    /// Start laying out the template `part`. Loose text becomes a single-run paragraph.
    pub fn from_part(origin: Option<PartId>, part: &Part, ctx: &LayoutContext) -> StatePart {
        let tab_size = ctx.config.tab_size;
        match part {
            Part::Text(text) => {
                StatePart::Paragraph(StateParagraph::from_text(origin, text, tab_size))
            }
            Part::Paragraph(paragraph) => {
                StatePart::Paragraph(StateParagraph::new(origin, paragraph, tab_size))
            }
            Part::Table(table) => StatePart::Table(StateTable::new(origin, table, tab_size)),
            Part::Image(image) => StatePart::Image(StateImage::new(origin, image.clone())),
        }
    }

    /// The template this part was made from, if it came out of a document
    pub fn origin(&self) -> Option<PartId> {
        match self {
            StatePart::Paragraph(p) => p.origin,
            StatePart::Table(t) => t.origin,
            StatePart::Image(i) => i.origin,
        }
    }

    /// Place as much of the part as fits. Returns the continuation holding the rest, or
    /// [None] when the whole part is on the page.
    pub fn layout(
        &mut self,
        ctx: &LayoutContext,
        page: &mut PageTracker,
    ) -> Result<Option<StatePart>, LayoutError> {
        Ok(match self {
            StatePart::Paragraph(p) => p.layout(ctx, page)?.map(StatePart::Paragraph),
            StatePart::Table(t) => t.layout(ctx, page)?.map(StatePart::Table),
            StatePart::Image(i) => i.layout(page).map(StatePart::Image),
        })
    }

    pub fn is_placed(&self) -> bool {
        match self {
            StatePart::Paragraph(p) => p.is_placed(),
            StatePart::Table(t) => t.is_placed(),
            StatePart::Image(i) => i.position.is_some(),
        }
    }
}

/// One laid out page
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub media_box: Rect,
    pub content_box: Rect,
    /// Parts placed on this page, in document order
    pub parts: Vec<StatePart>,
    /// What has to go on the following pages, continuation first. [Document::paginate]
    /// moves this on to the next page, leaving it empty.
    ///
    /// [Document::paginate]: crate::Document::paginate
    pub pending: Vec<StatePart>,
    pub warnings: Vec<LayoutWarning>,
}

/// Lay `parts` out on `page` in order until one of them overflows. Its continuation and
/// every part after it end up in [PageLayout::pending].
pub fn layout_page(
    ctx: &LayoutContext,
    page: &mut PageTracker,
    parts: Vec<StatePart>,
) -> Result<PageLayout, LayoutError> {
    let mut placed = Vec::with_capacity(parts.len());
    let mut pending = Vec::new();
    let mut parts = parts.into_iter();

    while let Some(mut part) = parts.next() {
        let continuation = part.layout(ctx, page)?;
        let whole = continuation.is_none();
        if whole || part.is_placed() {
            placed.push(part);
        }
        if let Some(continuation) = continuation {
            log::debug!("page full after {} parts", placed.len());
            pending.push(continuation);
            pending.extend(parts.by_ref());
            break;
        }
    }

    Ok(PageLayout {
        media_box: page.media_box,
        content_box: page.content_box,
        parts: placed,
        pending,
        warnings: page.take_warnings(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Image;
    use crate::part::Text;
    use crate::test_utils::*;
    use crate::Pt;

    #[test]
    fn parts_after_an_overflow_wait_their_turn() {
        let fonts = fonts();
        let ctx = LayoutContext::new(&fonts);
        let mut page = tracker(200.0, 100.0, 10.0);
        let parts = vec![
            StatePart::from_part(None, &Part::Image(Image::new(Pt(50.0), Pt(50.0))), &ctx),
            StatePart::from_part(None, &Part::Image(Image::new(Pt(50.0), Pt(50.0))), &ctx),
            StatePart::from_part(None, &Part::Text(Text::new("after")), &ctx),
        ];
        let layout = layout_page(&ctx, &mut page, parts).unwrap();
        assert_eq!(layout.parts.len(), 1);
        assert_eq!(layout.pending.len(), 2);
        assert!(!layout.pending[0].is_placed());
        assert!(matches!(layout.pending[1], StatePart::Paragraph(_)));
    }

    #[test]
    fn warnings_are_collected_per_page() {
        let fonts = fonts();
        let ctx = LayoutContext::new(&fonts);
        let mut page = tracker(100.0, 100.0, 10.0);
        let parts = vec![StatePart::from_part(
            None,
            &Part::Image(Image::new(Pt(500.0), Pt(10.0))),
            &ctx,
        )];
        let layout = layout_page(&ctx, &mut page, parts).unwrap();
        assert_eq!(layout.parts.len(), 1);
        assert!(layout.pending.is_empty());
        assert!(matches!(layout.warnings[..], [LayoutWarning::PartForced { .. }]));
        assert!(page.warnings().is_empty());
    }
}
