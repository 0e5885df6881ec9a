//! Asset loading
//!
//! Decoding of on-disk resources into CPU-side data ready for upload.

pub mod image_loader;

pub use image_loader::ImageData;

use thiserror::Error;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Failed to load asset
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),

    /// Invalid asset data
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result alias for asset loading
pub type AssetResult<T> = Result<T, AssetError>;
