//! Lighting system
//!
//! Phong light descriptions and their upload to the lit program. Uniform names
//! follow the GLSL structs declared in the lit shader:
//!
//! - `directionalLight.{direction,ambient,diffuse,specular}`
//! - `pointLight[i].{position,ambient,diffuse,specular,constant,linear,quadratic}`
//! - `spotLight.{position,direction,cutoff,outerCutoff,ambient,diffuse,specular}`

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Vec3};
use crate::render::shader::ShaderProgram;

/// Number of point light slots declared by the lit shader
pub const MAX_POINT_LIGHTS: usize = 2;

/// Ambient, diffuse and specular contributions of one light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightColors {
    /// Ambient term
    pub ambient: [f32; 3],
    /// Diffuse term
    pub diffuse: [f32; 3],
    /// Specular term
    pub specular: [f32; 3],
}

impl LightColors {
    /// Create from the three terms
    pub fn new(ambient: [f32; 3], diffuse: [f32; 3], specular: [f32; 3]) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
        }
    }

    fn apply(&self, program: &ShaderProgram, prefix: &str) {
        program.set_vec3(&format!("{prefix}.ambient"), &Vec3::from(self.ambient));
        program.set_vec3(&format!("{prefix}.diffuse"), &Vec3::from(self.diffuse));
        program.set_vec3(&format!("{prefix}.specular"), &Vec3::from(self.specular));
    }
}

/// Directional light (like sunlight)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    /// Direction the light travels
    pub direction: [f32; 3],
    /// Light terms
    pub colors: LightColors,
}

/// Distance attenuation `1 / (constant + linear·d + quadratic·d²)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attenuation {
    /// Constant term
    pub constant: f32,
    /// Linear term
    pub linear: f32,
    /// Quadratic term
    pub quadratic: f32,
}

impl Default for Attenuation {
    /// Roughly a 100 unit falloff
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.045,
            quadratic: 0.0075,
        }
    }
}

/// Point light (like a lightbulb)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    /// World position
    pub position: [f32; 3],
    /// Light terms
    pub colors: LightColors,
    /// Distance falloff
    pub attenuation: Attenuation,
}

/// Spot light (like a flashlight)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotLight {
    /// World position
    pub position: [f32; 3],
    /// Cone axis
    pub direction: [f32; 3],
    /// Full-intensity cone half angle in degrees
    pub cutoff_degrees: f32,
    /// Falloff cone half angle in degrees
    pub outer_cutoff_degrees: f32,
    /// Light terms
    pub colors: LightColors,
}

impl SpotLight {
    /// Cosine of the inner cone angle, as compared in the shader
    pub fn cutoff_cos(&self) -> f32 {
        utils::deg_to_rad(self.cutoff_degrees).cos()
    }

    /// Cosine of the outer cone angle
    pub fn outer_cutoff_cos(&self) -> f32 {
        utils::deg_to_rad(self.outer_cutoff_degrees).cos()
    }
}

/// The scene's complete light set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingEnvironment {
    /// Overall light tint (`lightColor`)
    pub light_color: [f32; 3],
    /// Sun-like light
    pub directional: DirectionalLight,
    /// Point lights, at most [`MAX_POINT_LIGHTS`] are uploaded
    pub point_lights: Vec<PointLight>,
    /// Spot light
    pub spot: SpotLight,
}

impl LightingEnvironment {
    /// Upload every light uniform to `program`, which must be current
    pub fn apply(&self, program: &ShaderProgram) {
        program.set_vec3("lightColor", &Vec3::from(self.light_color));

        program.set_vec3("directionalLight.direction", &Vec3::from(self.directional.direction));
        self.directional.colors.apply(program, "directionalLight");

        if self.point_lights.len() > MAX_POINT_LIGHTS {
            log::warn!(
                "{} point lights configured, only the first {} are uploaded",
                self.point_lights.len(),
                MAX_POINT_LIGHTS
            );
        }
        for (index, light) in self.point_lights.iter().take(MAX_POINT_LIGHTS).enumerate() {
            let prefix = format!("pointLight[{index}]");
            program.set_vec3(&format!("{prefix}.position"), &Vec3::from(light.position));
            light.colors.apply(program, &prefix);
            program.set_f32(&format!("{prefix}.constant"), light.attenuation.constant);
            program.set_f32(&format!("{prefix}.linear"), light.attenuation.linear);
            program.set_f32(&format!("{prefix}.quadratic"), light.attenuation.quadratic);
        }

        program.set_vec3("spotLight.position", &Vec3::from(self.spot.position));
        program.set_vec3("spotLight.direction", &Vec3::from(self.spot.direction));
        program.set_f32("spotLight.cutoff", self.spot.cutoff_cos());
        program.set_f32("spotLight.outerCutoff", self.spot.outer_cutoff_cos());
        self.spot.colors.apply(program, "spotLight");
    }

    /// Positions that get a light marker cube: point lights, then the spot
    pub fn marker_positions(&self) -> Vec<Vec3> {
        self.point_lights
            .iter()
            .map(|light| Vec3::from(light.position))
            .chain(std::iter::once(Vec3::from(self.spot.position)))
            .collect()
    }

    /// Dim room lit by two lamps and a ceiling spot
    pub fn room() -> Self {
        let white = LightColors::new([0.2, 0.2, 0.2], [0.5, 0.5, 0.5], [1.0, 1.0, 1.0]);
        Self {
            light_color: [1.0, 1.0, 1.0],
            directional: DirectionalLight {
                direction: [-0.1, -1.0, 0.4],
                colors: LightColors::new([0.05, 0.05, 0.05], [0.125, 0.125, 0.125], [0.25, 0.25, 0.25]),
            },
            point_lights: vec![
                PointLight {
                    position: [-2.0, 3.3, -2.3],
                    colors: white,
                    attenuation: Attenuation::default(),
                },
                PointLight {
                    position: [1.7, 2.7, 2.5],
                    colors: LightColors::new([0.4, 0.4, 0.7], [0.4, 0.4, 0.7], [0.4, 0.4, 0.7]),
                    attenuation: Attenuation::default(),
                },
            ],
            spot: SpotLight {
                position: [0.4, 3.0, -6.4],
                direction: [-0.1, -1.0, 0.4],
                cutoff_degrees: 13.5,
                outer_cutoff_degrees: 18.7,
                colors: white,
            },
        }
    }
}

impl Default for LightingEnvironment {
    fn default() -> Self {
        Self::room()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::gl::recording::RecordingDevice;
    use crate::render::gl::UniformValue;
    use crate::render::shader::ProgramBuilder;
    use approx::assert_relative_eq;

    const LIT_FRAGMENT: &str = "#version 330 core
uniform vec3 lightColor;
uniform DirLight directionalLight;
uniform PointLight pointLight[2];
uniform SpotLight spotLight;
void main() {
}
";
    const VERTEX: &str = "#version 330 core\nvoid main() {\n}\n";

    #[test]
    fn test_spot_cutoffs_upload_as_cosines() {
        let spot = LightingEnvironment::room().spot;
        assert_relative_eq!(spot.cutoff_cos(), 13.5f32.to_radians().cos(), epsilon = 1e-6);
        assert!(spot.cutoff_cos() > spot.outer_cutoff_cos());
    }

    #[test]
    fn test_apply_uploads_every_light() {
        let device = RecordingDevice::shared();
        let program = ProgramBuilder::new(device.clone()).build(VERTEX, LIT_FRAGMENT).unwrap();
        program.use_program();

        let lighting = LightingEnvironment::room();
        lighting.apply(&program);

        assert_eq!(device.uniform("lightColor"), Some(UniformValue::Vec3([1.0, 1.0, 1.0])));
        assert_eq!(
            device.uniform("directionalLight.direction"),
            Some(UniformValue::Vec3([-0.1, -1.0, 0.4]))
        );
        assert_eq!(
            device.uniform("pointLight[1].position"),
            Some(UniformValue::Vec3([1.7, 2.7, 2.5]))
        );
        assert_eq!(device.uniform("pointLight[0].quadratic"), Some(UniformValue::Float(0.0075)));
        assert_eq!(
            device.uniform("spotLight.outerCutoff"),
            Some(UniformValue::Float(lighting.spot.outer_cutoff_cos()))
        );
    }

    #[test]
    fn test_marker_positions_cover_point_and_spot_lights() {
        let positions = LightingEnvironment::room().marker_positions();
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[2], Vec3::new(0.4, 3.0, -6.4));
    }
}
