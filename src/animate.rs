// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The animation driver.  A run always renders the base frame on the
//! calling thread first; an animated run then derives every frame
//! from the base with an AnimationPolicy and renders them on a pool
//! of scoped worker threads.  Workers pull frames from a shared
//! queue, each frame owns its own buffer and path, and nothing
//! returns until every worker has been joined.  Failed frames do not
//! stop the others; they are collected and reported together.

use crossbeam::thread::ScopedJoinHandle;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use config::Config;
use error::{FrameId, RenderError};
use planes::Viewport;
use render::FrameDescriptor;
use sink::FrameSink;

/// Horizontal pan per zoom-pan frame, in image widths.
pub const PAN_STEP_X: f64 = 0.03;

/// Vertical pan per zoom-pan frame, in image heights.
pub const PAN_STEP_Y: f64 = 0.006;

/// Zoom added per zoom-pan frame.
pub const ZOOM_STEP: f64 = 0.12;

/// Length of the default zoom-pan sweep.
pub const ZOOM_PAN_FRAMES: u32 = 300;

/// How frame `i` of an animation derives from the base frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AnimationPolicy {
    /// Pan up and left while zooming in, at a fixed iteration bound.
    ZoomPanSweep {
        /// Number of frames in the sweep.
        frames: u32,
    },
    /// Fixed viewport; frame `i` uses `i` as its iteration bound, one
    /// frame per iteration up to the base bound.
    IterationSweep,
}

impl AnimationPolicy {
    /// How many frames the policy produces from `base`.
    pub fn frame_count(&self, base: &FrameDescriptor) -> u32 {
        match *self {
            AnimationPolicy::ZoomPanSweep { frames } => frames,
            AnimationPolicy::IterationSweep => base.max_iterations,
        }
    }

    /// The descriptor for frame `index`, to be written at `path`.
    ///
    /// Frame 0 of an iteration sweep would have no iterations at all;
    /// it renders with a bound of 1, which is black everywhere.
    pub fn derive(&self, base: &FrameDescriptor, index: u32, path: PathBuf) -> FrameDescriptor {
        match *self {
            AnimationPolicy::ZoomPanSweep { .. } => {
                let i = f64::from(index);
                FrameDescriptor {
                    viewport: Viewport {
                        offset_x: base.viewport.offset_x - PAN_STEP_X * i,
                        offset_y: base.viewport.offset_y - PAN_STEP_Y * i,
                        zoom: base.viewport.zoom + ZOOM_STEP * i,
                    },
                    path,
                    ..base.clone()
                }
            }
            AnimationPolicy::IterationSweep => FrameDescriptor {
                max_iterations: index.max(1),
                path,
                ..base.clone()
            },
        }
    }
}

/// The base frame's file: its offsets and zoom, three decimals each.
pub fn base_path(dir: &Path, viewport: &Viewport) -> PathBuf {
    dir.join(format!(
        "{:.3}_{:.3}_{:.3}.png",
        viewport.offset_x, viewport.offset_y, viewport.zoom
    ))
}

/// An animation frame's file, zero-padded to three digits.
pub fn frame_path(dir: &Path, index: u32) -> PathBuf {
    dir.join(format!("frame_{:03}.png", index))
}

/// The still frame every run starts with.
pub fn base_frame(config: &Config) -> FrameDescriptor {
    FrameDescriptor {
        width: config.image_size,
        height: config.image_size,
        viewport: config.viewport,
        max_iterations: config.max_iterations,
        mapping: config.mapping,
        path: base_path(&config.output_dir, &config.viewport),
    }
}

/// Every animation frame the configured policy derives from `base`.
pub fn animation_frames(
    config: &Config,
    base: &FrameDescriptor,
) -> Vec<(FrameId, FrameDescriptor)> {
    let dir = config.frames_path();
    (0..config.policy.frame_count(base))
        .map(|i| {
            let frame = config.policy.derive(base, i, frame_path(&dir, i));
            (FrameId::Animation(i), frame)
        })
        .collect()
}

/// Render one frame and hand it to the sink.
pub fn persist_frame<S: FrameSink>(
    sink: &S,
    id: FrameId,
    frame: &FrameDescriptor,
) -> Result<PathBuf, RenderError> {
    let img = frame.render()?;
    sink.persist(img, &frame.path)
        .map_err(|cause| RenderError::Persistence {
            frame: id,
            path: frame.path.display().to_string(),
            cause,
        })?;
    info!("{} written to {}", id, frame.path.display());
    Ok(frame.path.clone())
}

/// `persist_frame`, with a panic in the renderer or the sink turned
/// into a FramePanic for this frame.
fn persist_guarded<S: FrameSink>(
    sink: &S,
    id: FrameId,
    frame: &FrameDescriptor,
) -> Result<PathBuf, RenderError> {
    catch_unwind(AssertUnwindSafe(|| persist_frame(sink, id, frame))).unwrap_or_else(|_| {
        Err(RenderError::FramePanic {
            frame: id,
            path: frame.path.display().to_string(),
        })
    })
}

type Outcome = (usize, Result<PathBuf, RenderError>);

/// Render and persist `frames` on up to `threads` workers.  Returns
/// one result per frame, in the order given, once all workers are
/// done.  A frame that panics becomes a FramePanic and its worker
/// moves on to the next frame.
pub fn render_frames<S: FrameSink>(
    frames: &[(FrameId, FrameDescriptor)],
    threads: usize,
    sink: &S,
) -> Vec<Result<PathBuf, RenderError>> {
    if frames.is_empty() {
        return vec![];
    }
    let workers = threads.max(1).min(frames.len());
    let queue = Arc::new(Mutex::new(frames.iter().enumerate()));

    let joined = crossbeam::scope(|spawner| {
        let handles: Vec<ScopedJoinHandle<Vec<Outcome>>> = (0..workers)
            .map(|_| {
                let queue = queue.clone();
                spawner.spawn(move |_| {
                    let mut done: Vec<Outcome> = vec![];
                    loop {
                        let next = { queue.lock().unwrap_or_else(|e| e.into_inner()).next() };
                        match next {
                            Some((position, &(id, ref frame))) => {
                                done.push((position, persist_guarded(sink, id, frame)))
                            }
                            None => {
                                break;
                            }
                        }
                    }
                    done
                })
            })
            .collect();

        handles
            .into_iter()
            .enumerate()
            .flat_map(|(worker, handle)| match handle.join() {
                Ok(done) => done,
                Err(_) => vec![(usize::MAX, Err(RenderError::WorkerPanic { worker }))],
            })
            .collect::<Vec<Outcome>>()
    });

    let mut outcomes = joined
        .unwrap_or_else(|_| vec![(usize::MAX, Err(RenderError::WorkerPanic { worker: 0 }))]);
    outcomes.sort_by_key(|outcome| outcome.0);
    outcomes.into_iter().map(|(_, result)| result).collect()
}

/// Render the base frame and, if animation is on, every frame of the
/// configured policy.  Returns the written paths, base first, or a
/// `Frames` error listing every failure once all frames are done.
pub fn run<S: FrameSink>(config: &Config, sink: &S) -> Result<Vec<PathBuf>, RenderError> {
    config.validate()?;
    debug!("render configuration: {:?}", config);

    let base = base_frame(config);
    let frames = if config.animate {
        animation_frames(config, &base)
    } else {
        vec![]
    };
    let total = 1 + frames.len();

    let mut outcomes = vec![persist_guarded(sink, FrameId::Base, &base)];
    if !frames.is_empty() {
        debug!(
            "rendering {} frames on {} threads",
            frames.len(),
            config.threads
        );
        outcomes.extend(render_frames(&frames, config.threads, sink));
    }

    let mut written = vec![];
    let mut failures = vec![];
    for outcome in outcomes {
        match outcome {
            Ok(path) => written.push(path),
            Err(e) => {
                warn!("{}", e);
                failures.push(e);
            }
        }
    }
    if failures.is_empty() {
        Ok(written)
    } else {
        Err(RenderError::Frames {
            failed: failures.len(),
            total,
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use planes::Mapping;
    use std::io;

    /// Remembers every frame it was asked to write, fails the writes
    /// for one chosen path, and panics on another.
    #[derive(Default)]
    struct RecordingSink {
        written: Mutex<Vec<(PathBuf, Vec<u8>)>>,
        attempts: Mutex<Vec<PathBuf>>,
        fail_on: Option<PathBuf>,
        panic_on: Option<PathBuf>,
    }

    impl FrameSink for RecordingSink {
        fn persist(&self, frame: RgbaImage, path: &Path) -> io::Result<()> {
            self.attempts.lock().unwrap().push(path.to_path_buf());
            if self.fail_on.as_ref().map(|p| p == path).unwrap_or(false) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
            }
            if self.panic_on.as_ref().map(|p| p == path).unwrap_or(false) {
                panic!("encoder blew up on {}", path.display());
            }
            self.written
                .lock()
                .unwrap()
                .push((path.to_path_buf(), frame.into_raw()));
            Ok(())
        }
    }

    fn small_config(policy: AnimationPolicy) -> Config {
        Config {
            image_size: 8,
            max_iterations: 20,
            animate: true,
            policy,
            threads: 4,
            ..Config::default()
        }
    }

    fn base() -> FrameDescriptor {
        FrameDescriptor {
            width: 8,
            height: 8,
            viewport: Viewport {
                offset_x: 0.1,
                offset_y: 0.2,
                zoom: 1.5,
            },
            max_iterations: 40,
            mapping: Mapping::ViewportRelative,
            path: PathBuf::from("base.png"),
        }
    }

    #[test]
    fn paths_are_formatted() {
        assert_eq!(
            frame_path(Path::new("frames"), 7),
            PathBuf::from("frames/frame_007.png")
        );
        assert_eq!(
            frame_path(Path::new("frames"), 299),
            PathBuf::from("frames/frame_299.png")
        );
        assert_eq!(
            base_path(Path::new("."), &Viewport::default()),
            PathBuf::from("./0.000_0.000_1.000.png")
        );
        let vp = Viewport {
            offset_x: -0.25,
            offset_y: 0.5,
            zoom: 2.0,
        };
        assert_eq!(
            base_path(Path::new("out"), &vp),
            PathBuf::from("out/-0.250_0.500_2.000.png")
        );
    }

    #[test]
    fn zoom_pan_sweep_moves_viewport() {
        let policy = AnimationPolicy::ZoomPanSweep { frames: 300 };
        let b = base();
        assert_eq!(policy.frame_count(&b), 300);
        let f = policy.derive(&b, 10, PathBuf::from("frames/frame_010.png"));
        assert_eq!(f.viewport.offset_x, 0.1 - PAN_STEP_X * 10.0);
        assert_eq!(f.viewport.offset_y, 0.2 - PAN_STEP_Y * 10.0);
        assert_eq!(f.viewport.zoom, 1.5 + ZOOM_STEP * 10.0);
        assert_eq!(f.max_iterations, 40);
        assert_eq!(f.path, PathBuf::from("frames/frame_010.png"));

        let first = policy.derive(&b, 0, PathBuf::from("frames/frame_000.png"));
        assert_eq!(first.viewport, b.viewport);
    }

    #[test]
    fn iteration_sweep_walks_bound() {
        let policy = AnimationPolicy::IterationSweep;
        let b = base();
        assert_eq!(policy.frame_count(&b), 40);
        let f = policy.derive(&b, 7, PathBuf::from("x.png"));
        assert_eq!(f.max_iterations, 7);
        assert_eq!(f.viewport, b.viewport);
        assert_eq!(policy.derive(&b, 0, PathBuf::from("y.png")).max_iterations, 1);
    }

    #[test]
    fn still_run_writes_only_base_frame() {
        let sink = RecordingSink::default();
        let config = Config {
            animate: false,
            ..small_config(AnimationPolicy::ZoomPanSweep { frames: 12 })
        };
        let written = run(&config, &sink).unwrap();
        assert_eq!(written, vec![PathBuf::from("./0.000_0.000_1.000.png")]);
        assert_eq!(sink.attempts.lock().unwrap().len(), 1);
    }

    #[test]
    fn animated_run_writes_every_frame() {
        let sink = RecordingSink::default();
        let config = small_config(AnimationPolicy::ZoomPanSweep { frames: 12 });
        let written = run(&config, &sink).unwrap();
        assert_eq!(written.len(), 13);
        assert_eq!(written[1], PathBuf::from("./frames/frame_000.png"));
        assert_eq!(written[12], PathBuf::from("./frames/frame_011.png"));

        let attempts = sink.attempts.lock().unwrap();
        let frames = attempts
            .iter()
            .filter(|p| p.starts_with("./frames"))
            .count();
        assert_eq!(frames, 12);
    }

    #[test]
    fn iteration_sweep_run_writes_one_frame_per_iteration() {
        let sink = RecordingSink::default();
        let config = small_config(AnimationPolicy::IterationSweep);
        run(&config, &sink).unwrap();
        assert_eq!(sink.attempts.lock().unwrap().len(), 21);
    }

    #[test]
    fn concurrent_frames_match_sequential_renders() {
        let sink = RecordingSink::default();
        let config = small_config(AnimationPolicy::ZoomPanSweep { frames: 16 });
        run(&config, &sink).unwrap();

        let base = base_frame(&config);
        let mut expected = vec![(base.path.clone(), base.render().unwrap().into_raw())];
        for (_, frame) in animation_frames(&config, &base) {
            expected.push((frame.path.clone(), frame.render().unwrap().into_raw()));
        }
        let mut written = sink.written.lock().unwrap().clone();
        written.sort();
        expected.sort();
        assert_eq!(written, expected);
    }

    #[test]
    fn thread_count_does_not_change_output() {
        let one = RecordingSink::default();
        let many = RecordingSink::default();
        let policy = AnimationPolicy::ZoomPanSweep { frames: 9 };
        run(&Config { threads: 1, ..small_config(policy) }, &one).unwrap();
        run(&Config { threads: 0, ..small_config(policy) }, &many).unwrap();
        run(&Config { threads: 64, ..small_config(policy) }, &many).unwrap();

        let mut a = one.written.lock().unwrap().clone();
        let mut b = many.written.lock().unwrap().clone();
        a.sort();
        b.sort();
        b.dedup();
        assert_eq!(a, b);
    }

    #[test]
    fn failed_frame_is_reported_after_the_rest_finish() {
        let sink = RecordingSink {
            fail_on: Some(PathBuf::from("./frames/frame_003.png")),
            ..RecordingSink::default()
        };
        let config = small_config(AnimationPolicy::ZoomPanSweep { frames: 12 });
        match run(&config, &sink) {
            Err(RenderError::Frames {
                failed,
                total,
                failures,
            }) => {
                assert_eq!((failed, total), (1, 13));
                match failures[0] {
                    RenderError::Persistence {
                        frame, ref path, ..
                    } => {
                        assert_eq!(frame, FrameId::Animation(3));
                        assert_eq!(path, "./frames/frame_003.png");
                    }
                    ref other => panic!("unexpected {:?}", other),
                }
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(sink.attempts.lock().unwrap().len(), 13);
        assert_eq!(sink.written.lock().unwrap().len(), 12);
    }

    #[test]
    fn panicking_frame_does_not_stop_its_worker() {
        let sink = RecordingSink {
            panic_on: Some(PathBuf::from("./frames/frame_003.png")),
            ..RecordingSink::default()
        };
        let config = Config {
            threads: 1,
            ..small_config(AnimationPolicy::ZoomPanSweep { frames: 12 })
        };
        match run(&config, &sink) {
            Err(RenderError::Frames {
                failed,
                total,
                failures,
            }) => {
                assert_eq!((failed, total), (1, 13));
                match failures[0] {
                    RenderError::FramePanic { frame, ref path } => {
                        assert_eq!(frame, FrameId::Animation(3));
                        assert_eq!(path, "./frames/frame_003.png");
                    }
                    ref other => panic!("unexpected {:?}", other),
                }
            }
            other => panic!("unexpected {:?}", other),
        }
        let written = sink.written.lock().unwrap();
        assert_eq!(written.len(), 12);
        let animation = written
            .iter()
            .filter(|&&(ref p, _)| p.starts_with("./frames"))
            .count();
        assert_eq!(animation, 11);
    }

    #[test]
    fn failure_total_counts_scheduled_frames() {
        let sink = RecordingSink {
            fail_on: Some(PathBuf::from("./0.000_0.000_1.000.png")),
            ..RecordingSink::default()
        };
        let config = Config {
            animate: false,
            ..small_config(AnimationPolicy::ZoomPanSweep { frames: 12 })
        };
        match run(&config, &sink) {
            Err(RenderError::Frames { failed: 1, total: 1, .. }) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn failed_base_frame_does_not_stop_animation() {
        let sink = RecordingSink {
            fail_on: Some(PathBuf::from("./0.000_0.000_1.000.png")),
            ..RecordingSink::default()
        };
        let config = small_config(AnimationPolicy::ZoomPanSweep { frames: 5 });
        match run(&config, &sink) {
            Err(RenderError::Frames { failed: 1, total: 6, .. }) => (),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(sink.written.lock().unwrap().len(), 5);
    }

    #[test]
    fn invalid_config_renders_nothing() {
        let sink = RecordingSink::default();
        let config = Config {
            image_size: 0,
            ..small_config(AnimationPolicy::IterationSweep)
        };
        assert!(run(&config, &sink).is_err());
        assert!(sink.attempts.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_batch_spawns_nothing() {
        let sink = RecordingSink::default();
        assert!(render_frames(&[], 4, &sink).is_empty());
    }
}
