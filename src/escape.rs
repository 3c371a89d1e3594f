// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time test at the heart of the Mandelbrot set.

use num::Complex;

use error::RenderError;

/// Once the modulus of z reaches this, the orbit is known to diverge.
pub const ESCAPE_RADIUS: f64 = 2.0;

/// Iterate z <- z * z + c from z = 0, at most `max_iterations` times,
/// and return the 0-based index of the iteration whose result first
/// reached the escape radius.
///
/// A point that never escapes also returns 0, so "in the set" and
/// "escaped on the first step" render identically.  Renderers that
/// want to tell them apart need a different return convention, which
/// would change every image this crate has produced.
///
/// The test is on the modulus itself (`norm`, a hypot), not on the
/// squared modulus against 4.0; the two can disagree in the last bit.
pub fn escape_time(c: Complex<f64>, max_iterations: u32) -> Result<u32, RenderError> {
    if max_iterations == 0 {
        return Err(RenderError::InvalidIterationBound { max_iterations });
    }
    let mut z = Complex { re: 0.0, im: 0.0 };
    for i in 0..max_iterations {
        z = z * z + c;
        if z.norm() >= ESCAPE_RADIUS {
            return Ok(i);
        }
    }
    Ok(0)
}
