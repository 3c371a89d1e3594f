// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Where finished frames go.  The renderer hands each buffer over to
//! a sink; encoding lives in the `image` crate.

use image::RgbaImage;
use std::io;
use std::path::Path;

/// Takes ownership of a finished frame and stores it.  Sinks are
/// shared between render workers, and are only ever asked to write
/// distinct paths concurrently.
pub trait FrameSink: Sync {
    /// Persist `frame` at `path`.
    fn persist(&self, frame: RgbaImage, path: &Path) -> io::Result<()>;
}

/// Writes frames to disk, choosing the format from the extension.
/// Directories are not created; a missing one is a write failure.
#[derive(Copy, Clone, Debug, Default)]
pub struct PngSink;

impl FrameSink for PngSink {
    fn persist(&self, frame: RgbaImage, path: &Path) -> io::Result<()> {
        frame.save(path)
    }
}
