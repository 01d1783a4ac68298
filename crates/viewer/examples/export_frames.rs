//! Re-encode footage as grayscale video at half resolution.
//!
//! cargo run -p vidkit-viewer --example export_frames -- clip.mp4 gray.avi

use std::path::PathBuf;
use std::process;

use clap::Parser;

use vidkit_core::pipeline::export_frames_use_case::ExportFramesUseCase;
use vidkit_core::shared::progress::LogProgress;
use vidkit_core::video::footage::{Footage, FrameRange, ReadOptions};
use vidkit_core::video::sink::{SinkConfig, SinkOutput, Writer};

/// Re-encode footage as grayscale video at half resolution.
#[derive(Parser)]
#[command(name = "export_frames")]
struct Cli {
    /// Input video, image or glob pattern.
    input: String,

    /// Output video file.
    output: PathBuf,

    /// Frame rate used when the input doesn't report one.
    #[arg(long, default_value = "25.0")]
    fps: f64,
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
    let footage = Footage::open_path(&cli.input)?;
    let (width, height) = footage.resolution();
    let mut config = SinkConfig::from_footage(&footage)
        .with_resolution((width / 2).max(1), (height / 2).max(1))
        .with_grayscale(true);
    if config.fps.is_none() {
        config = config.with_fps(cli.fps);
    }

    // Frames are converted and resized by the writer.
    let writer = Writer::create(SinkOutput::Video(cli.output), config)?;
    let written = ExportFramesUseCase::new(footage, writer).execute(
        FrameRange::all(),
        ReadOptions::default(),
        &mut LogProgress::default(),
    )?;

    println!("Wrote {written} frames");
    Ok(())
}
