//! Laying parts out on pages.
//!
//! Every template [Part](crate::Part) is turned into a [StatePart] which is then placed
//! onto a [PageTracker](crate::PageTracker). Whatever does not fit comes back as a
//! continuation (see [overflow]) to be laid out on the next page.
//!
//! # Example
//!
//! ```
//! use pdf_flow::{FontLibrary, PageTracker, Part, Pt, Text};
//! use pdf_flow::layout::{layout_page, LayoutContext, Margins, StatePart};
//! use pdf_flow::pagesize;
//!
//! let fonts = FontLibrary::standard();
//! let ctx = LayoutContext::new(&fonts);
//! let mut page = PageTracker::new(pagesize::LETTER, Margins::all(Pt(72.0)));
//!
//! let part = Part::Text(Text::new("Hello, world!"));
//! let parts = vec![StatePart::from_part(None, &part, &ctx)];
//! let laid_out = layout_page(&ctx, &mut page, parts).expect("can lay out text");
//! assert!(laid_out.pending.is_empty());
//! ```

mod alignment;
mod anchor;
mod context;
mod image_state;
mod margins;
pub mod overflow;
mod paragraph;
mod state;
mod table;
mod text;

pub use alignment::*;
pub use anchor::*;
pub use context::*;
pub use image_state::*;
pub use margins::*;
pub use paragraph::*;
pub use state::*;
pub use table::*;
pub use text::*;
