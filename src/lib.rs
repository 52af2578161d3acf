mod config;
pub use config::*;

mod document;
pub use document::*;

mod error;
pub use error::*;

mod font;
pub use font::*;

mod geometry;
pub use geometry::*;

mod image;
pub use self::image::*;

/// Placing parts on pages: text flow, tables, anchors and continuations
pub mod layout;

mod page;
pub use page::*;

pub mod pagesize;

mod part;
pub use part::*;

mod rect;
pub use rect::*;

mod standard_font;
pub use standard_font::*;

mod units;
pub use units::*;

#[cfg(test)]
mod test_utils;

/// Re-export PDF-writer, whose [pdf_writer::Rect] placed parts convert into
pub use pdf_writer;
