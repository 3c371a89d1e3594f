// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Grayscale color mapping.

use image::Pixel as ImagePixel;
use image::Rgba;
use num::clamp;

use error::RenderError;

/// Fully opaque alpha.
pub const OPAQUE: u8 = 255;

/// Map an escape iteration onto an opaque gray: floor(i / N * 255),
/// clamped to a byte.  Fast escapes are dark, slow ones bright.
pub fn shade(iteration: u32, max_iterations: u32) -> Result<Rgba<u8>, RenderError> {
    if max_iterations == 0 {
        return Err(RenderError::InvalidIterationBound { max_iterations });
    }
    let level = f64::from(iteration) / f64::from(max_iterations) * 255.0;
    let level = clamp(level, 0.0, 255.0) as u8;
    Ok(Rgba::from_channels(level, level, level, OPAQUE))
}
