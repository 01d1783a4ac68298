//! Tune a threshold and a contour area filter interactively, then print the
//! chosen values.
//!
//! cargo run -p vidkit-viewer --example threshold_viewer -- coins.png

use std::process;

use clap::Parser;

use vidkit_core::interface::{ControlSpec, Feed, Interface, View};
use vidkit_core::ops::{
    apply_filters, draw_contours, draw_rectangles, find_contours, fit_rectangles, gray, parents,
    rgb, Area, Color, DrawMode,
};
use vidkit_core::shared::frame::Frame;
use vidkit_core::video::footage::{Footage, FrameRange, ReadOptions};
use vidkit_viewer::IcedEventLoop;

/// Tune a threshold and a contour area filter interactively.
#[derive(Parser)]
#[command(name = "threshold_viewer")]
struct Cli {
    /// Input video, image or glob pattern (quote patterns containing `*`).
    input: String,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let input = cli.input;

    let mut footage = Footage::open_path(&input)?;
    let frames = footage.read_range(
        FrameRange::all(),
        ReadOptions {
            grayscale: true,
            ..Default::default()
        },
    )?;
    let feed = Feed::sequence(frames)?;
    footage.close();

    let mut interface = Interface::new("Threshold", feed)?;
    interface
        .add_control(ControlSpec::new("threshold", "Threshold", 0, 255).with_initial(128))?
        .add_control(ControlSpec::new("min_area", "Min area", 0, 5000).with_initial(50))?
        .add_control(ControlSpec::new("boxes", "Boxes", 0, 1))?
        .set_process(highlight)?;

    interface.run(&mut IcedEventLoop::new())?;

    for (id, value) in interface.values() {
        println!("{id} = {value}");
    }
    Ok(())
}

fn highlight(view: &View<'_>) -> Result<Frame, vidkit_core::interface::BoxError> {
    let threshold = view.get("threshold").unwrap_or(128);
    let min_area = view.get("min_area").unwrap_or(0);

    let source = if view.frame().is_grayscale() {
        view.frame().clone()
    } else {
        gray(view.frame())?
    };
    let mut binary = source.clone();
    for v in binary.data_mut() {
        *v = if i32::from(*v) > threshold { 255 } else { 0 };
    }

    let contours = parents(&find_contours(&binary)?);
    let kept = apply_filters(&contours, &[&Area::at_least(f64::from(min_area))]);

    let mut out = rgb(&source)?;
    draw_contours(&mut out, &kept, Color::Rgb([255, 0, 0]), DrawMode::Outline)?;
    if view.get("boxes") == Some(1) {
        draw_rectangles(
            &mut out,
            &fit_rectangles(&kept),
            Color::Rgb([0, 255, 0]),
            DrawMode::Outline,
        )?;
    }
    Ok(out)
}
