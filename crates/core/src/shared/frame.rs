use image::{DynamicImage, GrayImage, RgbImage};
use ndarray::{ArrayView3, ArrayViewMut3};

/// A single video/image frame: contiguous 8-bit pixels in row-major order.
///
/// Frames carry either one channel (grayscale) or three (RGB). Format
/// conversion happens at I/O boundaries and in `ops::color`; everything else
/// treats pixel data as opaque.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// A frame with every byte set to `value`.
    pub fn filled(width: u32, height: u32, channels: u8, value: u8) -> Self {
        let len = (width as usize) * (height as usize) * (channels as usize);
        Self::new(vec![value; len], width, height, channels, 0)
    }

    pub fn from_gray_image(img: GrayImage, index: usize) -> Self {
        let (width, height) = img.dimensions();
        Self::new(img.into_raw(), width, height, 1, index)
    }

    pub fn from_rgb_image(img: RgbImage, index: usize) -> Self {
        let (width, height) = img.dimensions();
        Self::new(img.into_raw(), width, height, 3, index)
    }

    /// Keeps grayscale images single-channel and reduces everything else to
    /// RGB. Higher bit depths are scaled down to 8 bits.
    pub fn from_dynamic(img: DynamicImage, index: usize) -> Self {
        match img {
            DynamicImage::ImageLuma8(gray) => Self::from_gray_image(gray, index),
            DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLumaA16(_) => Self::from_gray_image(img.to_luma8(), index),
            other => Self::from_rgb_image(other.to_rgb8(), index),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn is_grayscale(&self) -> bool {
        self.channels == 1
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Copies the pixels into an `image` buffer of the matching colour type.
    pub fn to_dynamic(&self) -> Option<DynamicImage> {
        match self.channels {
            1 => GrayImage::from_raw(self.width, self.height, self.data.clone())
                .map(DynamicImage::ImageLuma8),
            3 => RgbImage::from_raw(self.width, self.height, self.data.clone())
                .map(DynamicImage::ImageRgb8),
            _ => None,
        }
    }

    /// Single-channel copy using the `image` crate's luma weights.
    /// Grayscale frames are returned as is.
    pub fn to_grayscale(&self) -> Frame {
        match self.to_dynamic() {
            Some(img) if self.channels == 3 => Frame::from_gray_image(img.to_luma8(), self.index),
            _ => self.clone(),
        }
    }

    /// Three-channel copy with the gray value repeated. RGB frames are
    /// returned as is.
    pub fn to_rgb(&self) -> Frame {
        match self.to_dynamic() {
            Some(img) if self.channels == 1 => Frame::from_rgb_image(img.to_rgb8(), self.index),
            _ => self.clone(),
        }
    }

    /// Resamples to the given resolution, keeping the channel count.
    pub fn resized(&self, width: u32, height: u32) -> Frame {
        if (width, height) == self.resolution() {
            return self.clone();
        }
        let filter = image::imageops::FilterType::Triangle;
        match self.channels {
            1 => {
                let img = GrayImage::from_raw(self.width, self.height, self.data.clone())
                    .expect("Frame data length must match dimensions");
                let out = image::imageops::resize(&img, width, height, filter);
                Frame::from_gray_image(out, self.index)
            }
            _ => {
                let img = RgbImage::from_raw(self.width, self.height, self.data.clone())
                    .expect("Frame data length must match dimensions");
                let out = image::imageops::resize(&img, width, height, filter);
                Frame::from_rgb_image(out, self.index)
            }
        }
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// `(height, width, channels)`, the layout used by in-memory sequences.
    pub fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
