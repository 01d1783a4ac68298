pub mod codec;
pub mod ffmpeg_reader;
pub mod ffmpeg_writer;
pub mod image_sequence_reader;
pub mod image_sequence_writer;

#[cfg(test)]
pub(crate) mod test_support;
