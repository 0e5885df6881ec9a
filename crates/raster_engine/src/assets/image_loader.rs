//! Image decoding for textures
//!
//! Every format the `image` crate is built with decodes to tightly packed
//! RGBA8, the only layout the texture upload path accepts.

use std::path::Path;

use crate::assets::{AssetError, AssetResult};

/// Decoded pixels ready for GPU upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// RGBA8 pixel rows, top row first
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Channel count of the source image before RGBA expansion
    pub channels: u8,
}

impl ImageData {
    /// Decode an image file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AssetResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AssetError::NotFound(path.display().to_string()));
        }

        log::debug!("Loading image from: {:?}", path);
        let bytes = std::fs::read(path)
            .map_err(|e| AssetError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        let data = Self::from_bytes(&bytes)?;
        log::info!("Loaded image {}x{} ({} channels) from {:?}", data.width, data.height, data.channels, path);
        Ok(data)
    }

    /// Decode an in-memory encoded image
    pub fn from_bytes(bytes: &[u8]) -> AssetResult<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to decode image from bytes: {}", e)))?;

        let data = Self::from_dynamic(img);
        log::debug!("Decoded image {}x{}", data.width, data.height);
        Ok(data)
    }

    /// Uniformly coloured image
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self {
            data: color.repeat(pixel_count(width, height)),
            width,
            height,
            channels: 4,
        }
    }

    /// Size of the pixel data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check the buffer holds exactly `width * height` RGBA8 pixels
    pub fn validate(&self) -> AssetResult<()> {
        let expected = pixel_count(self.width, self.height) * 4;
        if self.width == 0 || self.height == 0 || self.data.len() != expected {
            return Err(AssetError::InvalidData(format!(
                "{}x{} image carries {} bytes, expected {}",
                self.width,
                self.height,
                self.data.len(),
                expected
            )));
        }
        Ok(())
    }

    fn from_dynamic(img: image::DynamicImage) -> Self {
        let channels = img.color().channel_count();
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            data: rgba.into_raw(),
            width,
            height,
            channels,
        }
    }
}

/// Pixel count, widened before multiplying
fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}
