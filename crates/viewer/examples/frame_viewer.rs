//! Scrub through a video or image sequence.
//!
//! cargo run -p vidkit-viewer --example frame_viewer -- clip.mp4

use std::process;

use clap::Parser;

use vidkit_core::interface::{Feed, Interface};
use vidkit_core::video::footage::Footage;
use vidkit_viewer::IcedEventLoop;

/// Scrub through a video or image sequence.
#[derive(Parser)]
#[command(name = "frame_viewer")]
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

    let footage = Footage::open_path(&input)?;
    let (width, height) = footage.resolution();
    println!("{input}: {} frames at {width}x{height}", footage.len());

    let mut interface = Interface::new("Frames", Feed::footage(footage))?;
    interface.run(&mut IcedEventLoop::new())?;
    Ok(())
}
