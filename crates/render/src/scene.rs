use clothwave_common::{AmbientLightConfig, ClothConfig, Rgb, SceneConfig, SpotLightConfig};
use clothwave_kernel::{ClothMesh, MeshError};
use glam::{Mat4, Quat, Vec3};

/// Which triangle faces are shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Double,
}

/// Metal/roughness surface parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalMaterial {
    pub color: Rgb,
    pub metalness: f32,
    pub roughness: f32,
    pub emissive: Rgb,
    pub side: Side,
    pub wireframe: bool,
}

impl PhysicalMaterial {
    pub fn from_config(cfg: &ClothConfig) -> Self {
        Self {
            color: cfg.color,
            metalness: cfg.metalness,
            roughness: cfg.roughness,
            emissive: cfg.emissive,
            side: if cfg.double_sided {
                Side::Double
            } else {
                Side::Front
            },
            wireframe: cfg.wireframe,
        }
    }
}

/// Cone light with linear distance falloff.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    pub color: Rgb,
    pub intensity: f32,
    pub range: f32,
    /// Cone half-angle in radians.
    pub angle: f32,
    pub penumbra: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub cast_shadow: bool,
}

impl SpotLight {
    pub fn from_config(cfg: &SpotLightConfig) -> Self {
        Self {
            color: cfg.color,
            intensity: cfg.intensity,
            range: cfg.range,
            angle: cfg.angle,
            penumbra: cfg.penumbra,
            position: cfg.position,
            target: cfg.target,
            cast_shadow: true,
        }
    }

    pub fn direction(&self) -> Vec3 {
        (self.target - self.position)
            .try_normalize()
            .unwrap_or(Vec3::NEG_Z)
    }

    /// `1 - d / range`, clamped to `[0, 1]`. A zero range means no falloff.
    pub fn distance_falloff(&self, distance: f32) -> f32 {
        if self.range <= 0.0 {
            return 1.0;
        }
        (1.0 - distance / self.range).clamp(0.0, 1.0)
    }

    /// Cosines of the outer and inner cone edges.
    pub fn cone_cos(&self) -> (f32, f32) {
        let outer = self.angle.cos();
        let inner = (self.angle * (1.0 - self.penumbra)).cos();
        (outer, inner)
    }

    /// Projection used to render the shadow map from the light.
    pub fn shadow_view_projection(&self) -> Mat4 {
        let dir = self.direction();
        let up = if dir.abs().dot(Vec3::Y) > 0.99 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_to_rh(self.position, dir, up);
        let far = if self.range > 0.0 { self.range } else { 1000.0 };
        let proj = Mat4::perspective_rh((self.angle * 2.0).min(3.0), 1.0, 0.5, far);
        proj * view
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmbientLight {
    pub color: Rgb,
    pub intensity: f32,
}

impl AmbientLight {
    pub fn from_config(cfg: &AmbientLightConfig) -> Self {
        Self {
            color: cfg.color,
            intensity: cfg.intensity,
        }
    }
}

/// The cloth mesh with its material and placement.
#[derive(Debug, Clone)]
pub struct ClothObject {
    pub mesh: ClothMesh,
    pub material: PhysicalMaterial,
    pub position: Vec3,
    pub rotation: Quat,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl ClothObject {
    pub fn from_config(cfg: &ClothConfig) -> Result<Self, MeshError> {
        // Euler XYZ: rotate about X, then the rotated Y, then the rotated Z.
        let rotation = Quat::from_rotation_x(cfg.rotation.x)
            * Quat::from_rotation_y(cfg.rotation.y)
            * Quat::from_rotation_z(cfg.rotation.z);
        Ok(Self {
            mesh: ClothMesh::from_config(cfg)?,
            material: PhysicalMaterial::from_config(cfg),
            position: Vec3::ZERO,
            rotation,
            cast_shadow: cfg.cast_shadow,
            receive_shadow: cfg.receive_shadow,
        })
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }
}

/// Flat set of everything drawn in a frame.
#[derive(Debug, Clone)]
pub struct Scene {
    pub cloth: ClothObject,
    pub spot_light: SpotLight,
    pub ambient_light: AmbientLight,
}

impl Scene {
    pub fn from_config(cfg: &SceneConfig) -> Result<Self, MeshError> {
        Ok(Self {
            cloth: ClothObject::from_config(&cfg.cloth)?,
            spot_light: SpotLight::from_config(&cfg.spot_light),
            ambient_light: AmbientLight::from_config(&cfg.ambient_light),
        })
    }
}
