// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
extern crate failure;
extern crate mandelzoom;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use failure::Fail;
use mandelzoom::{AnimationPolicy, Config, Mapping, PngSink, RenderError, Viewport};
use std::path::PathBuf;
use std::str::FromStr;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const FRAMES_DIR: &str = "frames-dir";
const SIZE: &str = "size";
const ITERATIONS: &str = "iterations";
const OFFSET: &str = "offset";
const ZOOM: &str = "zoom";
const POLICY: &str = "policy";
const FRAMES: &str = "frames";
const FIXED: &str = "fixed";
const STILL: &str = "still";
const THREADS: &str = "threads";

const ZOOM_PAN: &str = "zoom-pan";
const ITERATION_SWEEP: &str = "iterations";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("mandelzoom")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Mandelbrot still and animation frame renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value(".")
                .help("Directory for the base frame"),
        )
        .arg(
            Arg::with_name(FRAMES_DIR)
                .long(FRAMES_DIR)
                .takes_value(true)
                .default_value("frames")
                .help("Existing directory for animation frames, relative to the output directory"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1024")
                .validator(|s| {
                    validate_range(
                        &s,
                        1u32,
                        16_384,
                        "Could not parse image size",
                        "Image size must be between 1 and 16384",
                    )
                })
                .help("Width and height of every frame"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("50")
                .validator(|s| {
                    validate_range(
                        &s,
                        1u32,
                        100_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 100000",
                    )
                })
                .help("Escape iteration bound"),
        )
        .arg(
            Arg::with_name(OFFSET)
                .long(OFFSET)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0,0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse offset"))
                .help("Base pan as X,Y in image units"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        ::std::f64::MIN_POSITIVE,
                        ::std::f64::MAX,
                        "Could not parse zoom",
                        "Zoom must be positive",
                    )
                })
                .help("Base zoom"),
        )
        .arg(
            Arg::with_name(POLICY)
                .long(POLICY)
                .short("p")
                .takes_value(true)
                .possible_values(&[ZOOM_PAN, ITERATION_SWEEP])
                .default_value(ZOOM_PAN)
                .help("How animation frames change"),
        )
        .arg(
            Arg::with_name(FRAMES)
                .long(FRAMES)
                .short("f")
                .takes_value(true)
                .default_value("300")
                .validator(|s| {
                    validate_range(
                        &s,
                        0u32,
                        100_000,
                        "Could not parse frame count",
                        "Frame count must be between 0 and 100000",
                    )
                })
                .help("Number of zoom-pan frames"),
        )
        .arg(
            Arg::with_name(FIXED)
                .long(FIXED)
                .help("Ignore offset and zoom when mapping pixels"),
        )
        .arg(
            Arg::with_name(STILL)
                .long(STILL)
                .help("Render only the base frame"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of render threads [default: one per CPU]"),
        )
        .get_matches()
}

fn config(matches: &ArgMatches) -> Result<Config, String> {
    let (offset_x, offset_y) = matches
        .value_of(OFFSET)
        .and_then(|s| parse_pair::<f64>(s, ','))
        .ok_or_else(|| "Error parsing offset".to_string())?;
    let zoom = parse::<f64>(matches, ZOOM)?;
    let max_iterations = parse::<u32>(matches, ITERATIONS)?;
    let policy = match matches.value_of(POLICY) {
        Some(ITERATION_SWEEP) => AnimationPolicy::IterationSweep,
        _ => AnimationPolicy::ZoomPanSweep {
            frames: parse::<u32>(matches, FRAMES)?,
        },
    };

    Ok(Config {
        image_size: parse::<u32>(matches, SIZE)?,
        max_iterations,
        animate: !matches.is_present(STILL),
        viewport: Viewport {
            offset_x,
            offset_y,
            zoom,
        },
        mapping: if matches.is_present(FIXED) {
            Mapping::Fixed
        } else {
            Mapping::ViewportRelative
        },
        policy,
        threads: match matches.value_of(THREADS) {
            Some(_) => parse::<usize>(matches, THREADS)?,
            None => num_cpus::get(),
        },
        output_dir: PathBuf::from(matches.value_of(OUTPUT).unwrap_or(".")),
        frames_dir: PathBuf::from(matches.value_of(FRAMES_DIR).unwrap_or("frames")),
    })
}

fn parse<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, String> {
    matches
        .value_of(name)
        .and_then(|s| T::from_str(s).ok())
        .ok_or_else(|| format!("Error parsing {}", name))
}

fn report(e: &RenderError) {
    eprintln!("Render failure: {}", e);
    if let RenderError::Frames { ref failures, .. } = *e {
        for frame in failures {
            eprintln!("  {}", frame);
            let mut cause = frame.cause();
            while let Some(c) = cause {
                eprintln!("    caused by: {}", c);
                cause = c.cause();
            }
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = args();
    let config = match config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    match mandelzoom::run(&config, &PngSink) {
        Err(e) => {
            report(&e);
            std::process::exit(1);
        }
        Ok(written) => {
            println!("{} frames written", written.len());
        }
    }
}
