//! Scene configuration
//!
//! Every field defaults to the built-in scene, so a config file only needs to
//! name what it changes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::Config;
use crate::render::camera::{Camera, DEFAULT_SENSITIVITY, DEFAULT_SPEED, DEFAULT_ZOOM};
use crate::foundation::math::Vec3;

/// Window creation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title bar text
    pub title: String,
    /// Width in screen coordinates
    pub width: u32,
    /// Height in screen coordinates
    pub height: u32,
    /// Hide and capture the cursor for mouse look
    pub capture_cursor: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Learning OpenGL Project".to_string(),
            width: 800,
            height: 600,
            capture_cursor: true,
        }
    }
}

/// Shader files, one per program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderPaths {
    /// Phong-lit textured objects
    pub lit: PathBuf,
    /// Unlit light markers
    pub marker: PathBuf,
}

impl Default for ShaderPaths {
    fn default() -> Self {
        Self {
            lit: PathBuf::from("res/shaders/lit.shader"),
            marker: PathBuf::from("res/shaders/marker.shader"),
        }
    }
}

/// Diffuse and specular maps for the floor and the cube
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TexturePaths {
    /// Floor diffuse map
    pub floor_diffuse: PathBuf,
    /// Floor specular map
    pub floor_specular: PathBuf,
    /// Cube diffuse map
    pub cube_diffuse: PathBuf,
    /// Cube specular map
    pub cube_specular: PathBuf,
}

impl Default for TexturePaths {
    fn default() -> Self {
        Self {
            floor_diffuse: PathBuf::from("res/textures/carpet_texture.png"),
            floor_specular: PathBuf::from("res/textures/carpet_texture_specular.png"),
            cube_diffuse: PathBuf::from("res/textures/blanket_texture.png"),
            cube_specular: PathBuf::from("res/textures/blanket_texture_specular.png"),
        }
    }
}

/// Fly camera parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Starting position
    pub position: [f32; 3],
    /// Units per second
    pub movement_speed: f32,
    /// Degrees per pixel
    pub mouse_sensitivity: f32,
    /// Smallest field of view in degrees
    pub zoom_min: f32,
    /// Largest (and starting) field of view in degrees
    pub zoom_max: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 3.0],
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            zoom_min: 1.0,
            zoom_max: DEFAULT_ZOOM,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl CameraConfig {
    /// Build the camera these settings describe
    pub fn build(&self) -> Camera {
        let mut camera = Camera::new(Vec3::from(self.position))
            .with_zoom_range(self.zoom_min, self.zoom_max)
            .with_zoom(self.zoom_max)
            .with_clip_planes(self.near, self.far);
        camera.movement_speed = self.movement_speed;
        camera.mouse_sensitivity = self.mouse_sensitivity;
        camera
    }
}

/// Everything the lit scene reads at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Window settings
    pub window: WindowConfig,
    /// Shader files
    pub shaders: ShaderPaths,
    /// Texture files
    pub textures: TexturePaths,
    /// Camera settings
    pub camera: CameraConfig,
    /// Background colour
    pub clear_color: [f32; 3],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            shaders: ShaderPaths::default(),
            textures: TexturePaths::default(),
            camera: CameraConfig::default(),
            clear_color: [0.2, 0.3, 0.3],
        }
    }
}

impl Config for SceneConfig {}
