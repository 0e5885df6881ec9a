//! 2D textures

use std::path::Path;

use crate::assets::ImageData;
use crate::render::gl::{DeviceRef, DeviceResult, TextureId, TextureParams};

/// Owned 2D texture object
///
/// A texture whose image failed to decode stays alive but blank, so a missing
/// file shows up as black surfaces rather than a startup failure.
pub struct Texture2D {
    device: DeviceRef,
    handle: TextureId,
    dimensions: Option<(u32, u32)>,
}

impl Texture2D {
    /// Create a texture and fill it from an image file
    pub fn load<P: AsRef<Path>>(device: DeviceRef, path: P, params: &TextureParams) -> DeviceResult<Self> {
        let path = path.as_ref();
        let mut texture = Self::blank(device, params)?;
        match ImageData::from_file(path) {
            Ok(image) => texture.upload(&image),
            Err(e) => log::warn!("Texture {:?} left blank: {}", path, e),
        }
        Ok(texture)
    }

    /// Create a texture from already decoded pixels
    pub fn from_image(device: DeviceRef, image: &ImageData, params: &TextureParams) -> DeviceResult<Self> {
        let mut texture = Self::blank(device, params)?;
        texture.upload(image);
        Ok(texture)
    }

    fn blank(device: DeviceRef, params: &TextureParams) -> DeviceResult<Self> {
        let handle = device.create_texture()?;
        device.bind_texture(0, Some(handle));
        device.texture_params(params);
        Ok(Self {
            device,
            handle,
            dimensions: None,
        })
    }

    fn upload(&mut self, image: &ImageData) {
        if let Err(e) = image.validate() {
            log::warn!("Skipping texture upload: {}", e);
            return;
        }
        self.device.bind_texture(0, Some(self.handle));
        self.device.texture_image_rgba8(image.width, image.height, &image.data);
        self.dimensions = Some((image.width, image.height));
    }

    /// Bind to a texture unit
    pub fn bind(&self, unit: u32) {
        self.device.bind_texture(unit, Some(self.handle));
    }

    /// Driver handle
    pub fn handle(&self) -> TextureId {
        self.handle
    }

    /// Whether image data was uploaded
    pub fn populated(&self) -> bool {
        self.dimensions.is_some()
    }

    /// Width and height, when populated
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        self.device.delete_texture(self.handle);
    }
}
