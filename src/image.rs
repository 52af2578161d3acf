use crate::geometry::Position;
use crate::layout::{Alignment, Margins};
use crate::{LayoutError, Pt};
use std::io::Cursor;

/// Determine the intrinsic size of encoded image data, one point per pixel. Raster
/// formats only have their header read; SVG documents report their declared size.
pub fn intrinsic_size(data: &[u8]) -> Result<(Pt, Pt), LayoutError> {
    let reader = image::io::Reader::new(Cursor::new(data)).with_guessed_format()?;
    if reader.format().is_some() {
        let (width, height) = reader.into_dimensions()?;
        return Ok((Pt(width as f32), Pt(height as f32)));
    }

    if looks_like_svg(data) {
        let tree = usvg::Tree::from_data(data, &usvg::Options::default())?;
        let size = tree.size();
        return Ok((Pt(size.width()), Pt(size.height())));
    }

    Err(LayoutError::UnknownImageFormat)
}

fn looks_like_svg(data: &[u8]) -> bool {
    let head = &data[..data.len().min(512)];
    String::from_utf8_lossy(head).contains("<svg")
}

/// An image template: an opaque rectangle of known size. The pixels themselves belong to
/// whoever serializes the document; layout only needs the footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: Pt,
    height: Pt,
    pub alignment: Alignment,
    pub margins: Margins,
    pub wrapping: bool,
    pub position: Option<Position>,
}

impl Image {
    /// Create an image with an explicit size. Sizes below one point are raised to one.
    pub fn new(width: Pt, height: Pt) -> Image {
        Image {
            width: width.at_least(1.0),
            height: height.at_least(1.0),
            alignment: Alignment::Left,
            margins: Margins::empty(),
            wrapping: false,
            position: None,
        }
    }

    /// Create an image sized from its encoded data
    pub fn from_bytes(data: &[u8]) -> Result<Image, LayoutError> {
        let (width, height) = intrinsic_size(data)?;
        Ok(Image::new(width, height))
    }

    pub fn width(&self) -> Pt {
        self.width
    }

    pub fn height(&self) -> Pt {
        self.height
    }

    /// Change the width, optionally scaling the height to keep the aspect ratio
    pub fn with_width(mut self, width: Pt, scale_height: bool) -> Image {
        let width = width.at_least(1.0);
        if scale_height {
            self.height = (self.height * (*width / *self.width)).at_least(1.0);
        }
        self.width = width;
        self
    }

    /// Change the height, optionally scaling the width to keep the aspect ratio
    pub fn with_height(mut self, height: Pt, scale_width: bool) -> Image {
        let height = height.at_least(1.0);
        if scale_width {
            self.width = (self.width * (*height / *self.height)).at_least(1.0);
        }
        self.height = height;
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Image {
        self.alignment = alignment;
        self
    }

    pub fn margins(mut self, margins: Margins) -> Image {
        self.margins = margins;
        self
    }

    pub fn allow_wrapping(mut self, wrapping: bool) -> Image {
        self.wrapping = wrapping;
        self
    }

    /// Pin the image's top-left corner to a fixed spot on the page
    pub fn on(mut self, position: Position) -> Image {
        self.position = Some(position);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonsensical_sizes_are_clamped() {
        let image = Image::new(Pt(0.0), Pt(-20.0));
        assert_eq!(image.width(), Pt(1.0));
        assert_eq!(image.height(), Pt(1.0));
    }

    #[test]
    fn scaling_keeps_the_aspect_ratio() {
        let image = Image::new(Pt(200.0), Pt(100.0)).with_width(Pt(100.0), true);
        assert_eq!(image.height(), Pt(50.0));
        let image = image.with_height(Pt(100.0), false);
        assert_eq!(image.width(), Pt(100.0));
    }

    #[test]
    fn reads_svg_dimensions() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="40"></svg>"#;
        let (w, h) = intrinsic_size(svg).unwrap();
        assert_eq!((w, h), (Pt(120.0), Pt(40.0)));
    }

    #[test]
    fn reads_raster_headers() {
        let mut png = Vec::new();
        image::DynamicImage::new_rgb8(7, 3)
            .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .unwrap();
        let (w, h) = intrinsic_size(&png).unwrap();
        assert_eq!((w, h), (Pt(7.0), Pt(3.0)));
    }

    #[test]
    fn garbage_is_rejected() {
        let err = intrinsic_size(b"definitely not an image").unwrap_err();
        assert!(matches!(err, LayoutError::UnknownImageFormat));
    }
}
