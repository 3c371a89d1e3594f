// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The frame renderer.  Each pixel is mapped to the complex plane,
//! tested for escape, and shaded; pixels share nothing, and a frame
//! renders sequentially on whichever thread asks for it.

use image::Pixel as ImagePixel;
use image::{ImageBuffer, Rgba, RgbaImage};
use itertools::iproduct;
use std::path::PathBuf;

use error::RenderError;
use escape::escape_time;
use planes::{Mapping, Pixel, PlaneMapper, Viewport};
use shade::shade;

/// Fill for a freshly allocated buffer, before any pixel is set.
pub const BACKGROUND: [u8; 4] = [255, 255, 255, 255];

/// Everything needed to render and persist one image.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameDescriptor {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pan and zoom.
    pub viewport: Viewport,
    /// Escape iteration bound.
    pub max_iterations: u32,
    /// Coordinate mapping strategy.
    pub mapping: Mapping,
    /// Where the sink should write the frame.
    pub path: PathBuf,
}

impl FrameDescriptor {
    /// Render this frame into a new buffer.
    pub fn render(&self) -> Result<RgbaImage, RenderError> {
        render(
            self.width,
            self.height,
            self.viewport,
            self.max_iterations,
            self.mapping,
        )
    }
}

/// Render a w x h Mandelbrot image.  Dimensions and the iteration
/// bound are checked before the buffer is allocated.
pub fn render(
    width: u32,
    height: u32,
    viewport: Viewport,
    max_iterations: u32,
    mapping: Mapping,
) -> Result<RgbaImage, RenderError> {
    let plane = PlaneMapper::new(width, height, viewport, mapping)?;
    if max_iterations == 0 {
        return Err(RenderError::InvalidIterationBound { max_iterations });
    }

    let background = Rgba::from_channels(
        BACKGROUND[0],
        BACKGROUND[1],
        BACKGROUND[2],
        BACKGROUND[3],
    );
    let mut img: RgbaImage = ImageBuffer::from_pixel(width, height, background);
    for (x, y) in iproduct!(0..width, 0..height) {
        let point = plane.pixel_to_point(&Pixel(x, y));
        let i = escape_time(point, max_iterations)?;
        img.put_pixel(x, y, shade(i, max_iterations)?);
    }
    Ok(img)
}
