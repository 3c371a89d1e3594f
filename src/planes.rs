// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and the classic Mandelbrot viewing window on the complex plane,
//! roughly [-2, 1] x [-1.5, 1.5], panned and zoomed by a Viewport.
use num::Complex;

use error::RenderError;

/// Width and height of the classic viewing window on the complex plane.
pub const PLANE_SPAN: f64 = 3.0;

/// Distance from the left edge of the window to the imaginary axis.
pub const RE_OFFSET: f64 = 2.0;

/// Distance from the top edge of the window to the real axis.
pub const IM_OFFSET: f64 = 1.5;

/// Describes the width and height of an integral plane that is
/// assumed to start at 0,0.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub u32, pub u32);

/// Describes the x, y of a point in the integral plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub u32, pub u32);

/// Pan and zoom applied to the viewing window.  The offsets are in
/// units of the image (1.0 pans by a whole image width or height)
/// and a larger zoom samples a smaller region.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Horizontal pan.
    pub offset_x: f64,
    /// Vertical pan.
    pub offset_y: f64,
    /// Divides the whole mapped coordinate.
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            offset_x: 0.0,
            offset_y: 0.0,
            zoom: 1.0,
        }
    }
}

/// How pixels land on the complex plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Mapping {
    /// Pans by the viewport offsets, then divides by the zoom.
    ViewportRelative,
    /// Always the unpanned, unzoomed window; the viewport is ignored.
    Fixed,
}

impl Mapping {
    /// Map pixel (x, y) of a w x h grid onto the complex plane.  The
    /// order of operations is fixed; images are compared bit for bit.
    pub fn pixel_to_point(
        self,
        pixel: Pixel,
        plane: IntegralPlane,
        viewport: &Viewport,
    ) -> Complex<f64> {
        let x = f64::from(pixel.0) / f64::from(plane.0);
        let y = f64::from(pixel.1) / f64::from(plane.1);
        match self {
            Mapping::ViewportRelative => Complex::new(
                ((x + viewport.offset_x) * PLANE_SPAN - RE_OFFSET) / viewport.zoom,
                ((y + viewport.offset_y) * PLANE_SPAN - IM_OFFSET) / viewport.zoom,
            ),
            Mapping::Fixed => Complex::new(x * PLANE_SPAN - RE_OFFSET, y * PLANE_SPAN - IM_OFFSET),
        }
    }
}

/// Ties an integral plane to a viewport and a mapping strategy, so a
/// renderer can ask for the complex point behind any pixel.
#[derive(Debug)]
pub struct PlaneMapper {
    /// The lower-right corner of the integral cartesian plane.
    pub integral_plane: IntegralPlane,
    /// Pan and zoom for this frame.
    pub viewport: Viewport,
    /// The mapping strategy.
    pub mapping: Mapping,
}

impl PlaneMapper {
    /// Constructor.  Refuses planes with no pixels.
    pub fn new(
        width: u32,
        height: u32,
        viewport: Viewport,
        mapping: Mapping,
    ) -> Result<PlaneMapper, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimension { width, height });
        }
        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            viewport,
            mapping,
        })
    }

    /// Given a pixel on the integral cartesian plane, return the point
    /// on the complex plane it samples.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        self.mapping
            .pixel_to_point(*pixel, self.integral_plane, &self.viewport)
    }
}
