use crate::layout::{layout_page, LayoutContext, Margins, PageLayout, StatePart};
use crate::page::PageTracker;
use crate::pagesize::PageSize;
use crate::part::{Part, PartId};
use crate::LayoutError;
use id_arena::Arena;

#[derive(Default)]
/// A document is the ordered collection of parts to be paginated with a call to
/// [Document::paginate]
pub struct Document {
    pub parts: Arena<Part>,
    pub part_order: Vec<PartId>,
}

impl Document {
    /// Add a part to the end of the document, returning its ID. Parts are templates and
    /// are never changed by laying them out, so a document can be paginated any number of
    /// times.
    pub fn add_part(&mut self, part: Part) -> PartId {
        let id = self.parts.alloc(part);
        self.part_order.push(id);
        id
    }

    /// Add a part to the document, inserting it before the part identified by `next`.
    /// If there is no part identified by `next`, the part will be added to the end of
    /// the document.
    pub fn insert_part_before_id(&mut self, part: Part, next: PartId) -> PartId {
        let id = self.parts.alloc(part);
        match self.index_of_part(next) {
            Some(index) => self.part_order.insert(index, id),
            None => self.part_order.push(id),
        }
        id
    }

    /// Add a part to the document, inserting it after the part identified by `previous`.
    /// If there is no part identified by `previous`, the part will be added to the end
    /// of the document.
    pub fn insert_part_after_id(&mut self, part: Part, previous: PartId) -> PartId {
        let id = self.parts.alloc(part);
        match self.index_of_part(previous) {
            Some(index) => self.part_order.insert(index + 1, id),
            None => self.part_order.push(id),
        }
        id
    }

    /// Get the 0-based position of a part given its ID. Note that changing the part order
    /// after this call _will_ invalidate the returned index
    pub fn index_of_part(&self, part: PartId) -> Option<usize> {
        self.part_order.iter().position(|p| *p == part)
    }

    /// Get the part Id of a part at the given index. Returns [None] if
    /// `index >= self.part_order.len()`.
    pub fn id_of_part_index(&self, index: usize) -> Option<PartId> {
        self.part_order.get(index).copied()
    }

    /// Lay every part out in order onto as many pages of `page_size` as it takes. Whatever
    /// overflows one page opens the next.
    pub fn paginate(
        &self,
        ctx: &LayoutContext,
        page_size: PageSize,
        margins: Margins,
    ) -> Result<Vec<PageLayout>, LayoutError> {
        let mut pending: Vec<StatePart> = self
            .part_order
            .iter()
            .map(|id| StatePart::from_part(Some(*id), &self.parts[*id], ctx))
            .collect();

        let mut pages = Vec::new();
        while !pending.is_empty() {
            let mut page = PageTracker::new(page_size, margins);
            let mut layout = layout_page(ctx, &mut page, pending)?;
            log::debug!(
                "page {} holds {} parts, {} waiting",
                pages.len() + 1,
                layout.parts.len(),
                layout.pending.len()
            );
            pending = std::mem::take(&mut layout.pending);
            pages.push(layout);
        }
        Ok(pages)
    }
}
