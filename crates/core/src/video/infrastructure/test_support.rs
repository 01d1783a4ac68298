use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::video::domain::frame_writer::FrameWriter;
use crate::video::infrastructure::ffmpeg_writer::{EncoderSettings, FfmpegWriter};

/// Encodes `count` RGB frames where frame `i` is filled with `i * 40`.
pub fn gray_ramp_video(dir: &Path, count: usize, width: u32, height: u32) -> PathBuf {
    let path = dir.join("ramp.avi");
    let settings = EncoderSettings {
        width,
        height,
        fps: 25.0,
        codec: "MJPG".to_string(),
        grayscale: false,
    };
    let mut writer = FfmpegWriter::create(&path, &settings).unwrap();
    for i in 0..count {
        let value = (i * 40).min(255) as u8;
        writer
            .write(&Frame::filled(width, height, 3, value).with_index(i))
            .unwrap();
    }
    writer.close().unwrap();
    path
}

pub fn mean(frame: &Frame) -> f64 {
    frame.data().iter().map(|&b| b as f64).sum::<f64>() / frame.data().len() as f64
}
