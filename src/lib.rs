#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot zoom renderer
//!
//! The Mandelbrot set is the set of points c on the complex plane for
//! which repeatedly squaring z and adding c, starting from zero,
//! never runs off to infinity.  Every pixel of an image samples one
//! such point; how many squarings it takes the point to get at least
//! 2.0 away from the origin becomes the pixel's shade of gray.
//!
//! This crate renders one still image of a region of the plane, and
//! optionally an animation: a sequence of frames that either pans and
//! zooms into the set or deepens the iteration bound one step at a
//! time.  Frames are independent, so an animation is rendered on a
//! pool of worker threads and written out as numbered PNG files.

extern crate crossbeam;
#[macro_use]
extern crate failure;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

pub mod animate;
pub mod config;
pub mod error;
pub mod escape;
pub mod planes;
pub mod render;
pub mod shade;
pub mod sink;

pub use animate::{run, AnimationPolicy};
pub use config::Config;
pub use error::{FrameId, RenderError};
pub use planes::{Mapping, PlaneMapper, Viewport};
pub use render::{render, FrameDescriptor};
pub use sink::{FrameSink, PngSink};
