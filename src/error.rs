// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The things that can go wrong while rendering.  Pure computation
//! only fails on degenerate parameters; the rest is I/O.

use std::fmt;
use std::io;

/// Identifies a frame in a render run, for error reports and logs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FrameId {
    /// The still frame rendered at the base parameters.
    Base,
    /// An animation frame, by index.
    Animation(u32),
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FrameId::Base => write!(f, "base frame"),
            FrameId::Animation(i) => write!(f, "frame {}", i),
        }
    }
}

/// Every failure the renderer reports.
#[derive(Debug, Fail)]
pub enum RenderError {
    /// The image would have no pixels.
    #[fail(display = "invalid image dimensions {}x{}", width, height)]
    InvalidDimension {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// A zero iteration bound; the color mapping divides by it.
    #[fail(display = "iteration bound must be positive, got {}", max_iterations)]
    InvalidIterationBound {
        /// The rejected bound.
        max_iterations: u32,
    },

    /// The sink could not write a frame.
    #[fail(display = "could not write {} to {}: {}", frame, path, cause)]
    Persistence {
        /// Which frame.
        frame: FrameId,
        /// Where it was headed.
        path: String,
        /// The underlying I/O failure.
        #[cause]
        cause: io::Error,
    },

    /// Rendering or writing a frame panicked.  The worker carried on
    /// with the rest of the queue.
    #[fail(display = "{} panicked while writing {}", frame, path)]
    FramePanic {
        /// Which frame.
        frame: FrameId,
        /// Where it was headed.
        path: String,
    },

    /// A render worker died before reporting its frames.
    #[fail(display = "render worker {} panicked", worker)]
    WorkerPanic {
        /// Index of the worker in the pool.
        worker: usize,
    },

    /// Some frames of a run failed.  The others were still written.
    #[fail(display = "{} of {} frames failed", failed, total)]
    Frames {
        /// Number of failures.
        failed: usize,
        /// Number of frames attempted, base frame included.
        total: usize,
        /// The individual failures, in frame order where known.
        failures: Vec<RenderError>,
    },
}
