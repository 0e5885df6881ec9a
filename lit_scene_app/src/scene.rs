//! The lit scene: a carpeted floor, a blanket-textured cube and a small white
//! cube at every light.

use std::path::Path;

use raster_engine::config::SceneConfig;
use raster_engine::foundation::math::{Mat4, Mat4Ext, Vec3};
use raster_engine::render::gl::{DeviceRef, TextureParams};
use raster_engine::render::{Camera, LightingEnvironment, Mesh, ProgramBuilder, ShaderProgram, Texture2D};

use crate::app::AppResult;

/// Specular exponent of both materials
pub const SHININESS: f32 = 32.0;

/// Uniform scale of the light marker cubes
pub const MARKER_SCALE: f32 = 0.2;

/// Floor plane tilted into place and stretched
pub fn floor_model() -> Mat4 {
    Mat4::identity()
        .rotated_deg(-60.0, Vec3::x())
        .translated(Vec3::new(0.0, 1.0, -0.7))
        .scaled(Vec3::new(18.0, 18.0, 1.0))
}

/// Cube tipped towards the viewer
pub fn cube_model() -> Mat4 {
    Mat4::identity().rotated_deg(-55.0, Vec3::x())
}

/// Small tilted cube centred on a light
pub fn marker_model(position: Vec3) -> Mat4 {
    Mat4::identity()
        .translated(position)
        .scaled(Vec3::repeat(MARKER_SCALE))
        .rotated_deg(-60.0, Vec3::new(1.0, -0.3, 0.0))
}

/// Diffuse and specular maps bound to units 0 and 1
struct Material {
    // Loaded diffuse first, released specular first
    specular: Texture2D,
    diffuse: Texture2D,
}

impl Material {
    fn load(
        device: &DeviceRef,
        name: &str,
        diffuse: &Path,
        specular: &Path,
        params: &TextureParams,
    ) -> AppResult<Self> {
        let diffuse = Texture2D::load(device.clone(), diffuse, params)?;
        let specular = Texture2D::load(device.clone(), specular, params)?;
        if let (Some(d), Some(s)) = (diffuse.dimensions(), specular.dimensions()) {
            if d != s {
                log::warn!("{} material: diffuse map is {:?} but specular map is {:?}", name, d, s);
            }
        }
        Ok(Self { specular, diffuse })
    }

    fn bind(&self) {
        self.diffuse.bind(0);
        self.specular.bind(1);
    }
}

/// GPU resources and lighting of the scene
///
/// Fields are declared in the reverse of the order [`Scene::load`] creates
/// them, so dropping the scene releases the newest resources first.
pub struct Scene {
    lighting: LightingEnvironment,
    marker: Mesh,
    cube: Mesh,
    floor: Mesh,
    cube_material: Material,
    floor_material: Material,
    marker_program: ShaderProgram,
    lit_program: ShaderProgram,
}

impl Scene {
    /// Build programs, meshes and textures
    ///
    /// Shader failures abort startup; missing textures only leave surfaces black.
    pub fn load(device: &DeviceRef, config: &SceneConfig) -> AppResult<Self> {
        let lit_program = ProgramBuilder::new(device.clone())
            .with_label("lit")
            .build_from_file(&config.shaders.lit)?;
        let marker_program = ProgramBuilder::new(device.clone())
            .with_label("marker")
            .build_from_file(&config.shaders.marker)?;

        let params = TextureParams::default();
        let textures = &config.textures;
        let floor_material =
            Material::load(device, "floor", &textures.floor_diffuse, &textures.floor_specular, &params)?;
        let cube_material =
            Material::load(device, "cube", &textures.cube_diffuse, &textures.cube_specular, &params)?;

        let lighting = LightingEnvironment::room();
        lit_program.use_program();
        lighting.apply(&lit_program);
        lit_program.set_i32("material.diffuse", 0);
        lit_program.set_i32("material.specular", 1);
        lit_program.set_f32("material.shininess", SHININESS);

        let floor = Mesh::plane(device.clone())?;
        let cube = Mesh::cube(device.clone())?;
        let marker = Mesh::marker_cube(device.clone())?;

        log::info!("Scene loaded");
        Ok(Self {
            lighting,
            marker,
            cube,
            floor,
            cube_material,
            floor_material,
            marker_program,
            lit_program,
        })
    }

    /// Issue every draw call for one frame
    pub fn draw(&self, camera: &Camera, aspect: f32) {
        let view = camera.view_matrix();
        let projection = camera.projection_matrix(aspect);

        let lit = &self.lit_program;
        lit.use_program();
        lit.set_mat4("view", &view);
        lit.set_mat4("projection", &projection);
        lit.set_vec3("viewPosition", &camera.position);

        self.floor_material.bind();
        lit.set_mat4("model", &floor_model());
        self.floor.draw();

        self.cube_material.bind();
        lit.set_mat4("model", &cube_model());
        self.cube.draw();

        let marker = &self.marker_program;
        marker.use_program();
        marker.set_mat4("view", &view);
        marker.set_mat4("projection", &projection);
        for position in self.lighting.marker_positions() {
            marker.set_mat4("model", &marker_model(position));
            self.marker.draw();
        }
    }
}
