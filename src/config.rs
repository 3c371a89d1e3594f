// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Runtime configuration for a render run.

use std::path::PathBuf;

use animate::{AnimationPolicy, ZOOM_PAN_FRAMES};
use error::RenderError;
use planes::{Mapping, Viewport};

/// Default edge length of the square output images.
pub const DEFAULT_SIZE: u32 = 1024;

/// Default escape iteration bound.
pub const DEFAULT_ITERATIONS: u32 = 50;

/// Everything a run needs.  The defaults reproduce a 1024 pixel,
/// 50 iteration render of the classic window followed by a 300 frame
/// zoom-and-pan sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Width and height of every frame.
    pub image_size: u32,
    /// Escape iteration bound for the base frame and zoom-pan frames.
    pub max_iterations: u32,
    /// Render the animation after the base frame.
    pub animate: bool,
    /// Base pan and zoom.
    pub viewport: Viewport,
    /// Coordinate mapping strategy for every frame.
    pub mapping: Mapping,
    /// How animation frames derive from the base frame.
    pub policy: AnimationPolicy,
    /// Render workers for the animation.
    pub threads: usize,
    /// Directory the base frame is written to.
    pub output_dir: PathBuf,
    /// Directory for animation frames, relative to `output_dir`.  It
    /// must already exist.
    pub frames_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            image_size: DEFAULT_SIZE,
            max_iterations: DEFAULT_ITERATIONS,
            animate: true,
            viewport: Viewport::default(),
            mapping: Mapping::ViewportRelative,
            policy: AnimationPolicy::ZoomPanSweep {
                frames: ZOOM_PAN_FRAMES,
            },
            threads: ::num_cpus::get(),
            output_dir: PathBuf::from("."),
            frames_dir: PathBuf::from("frames"),
        }
    }
}

impl Config {
    /// Reject configurations that could never render.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.image_size == 0 {
            return Err(RenderError::InvalidDimension {
                width: self.image_size,
                height: self.image_size,
            });
        }
        if self.max_iterations == 0 {
            return Err(RenderError::InvalidIterationBound {
                max_iterations: self.max_iterations,
            });
        }
        Ok(())
    }

    /// Where animation frames are written.
    pub fn frames_path(&self) -> PathBuf {
        self.output_dir.join(&self.frames_dir)
    }
}
