use glam::{Mat4, Vec3};

/// Perspective camera defined by eye position, target, and projection
/// parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye (camera) position in world space.
    pub eye: Vec3,
    /// Look-at target position.
    pub target: Vec3,
    /// Up direction vector.
    pub up: Vec3,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

/// GPU uniform holding the view-projection matrix and the camera basis the
/// impostor shader needs to orient its quads.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Camera world-space position.
    pub position: [f32; 3],
    /// Viewport aspect ratio.
    pub aspect: f32,
    /// Unit vector from eye toward target.
    pub forward: [f32; 3],
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Camera up vector.
    pub up: [f32; 3],
    pub(crate) _pad: f32,
}

impl Camera {
    /// Build the combined view-projection matrix.
    #[must_use]
    pub fn build_matrix(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        // perspective_rh already uses [0,1] depth range (wgpu convention)
        let proj = Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        );
        proj * view
    }

    /// Aspect ratio for a `width x height` viewport; degenerate sizes
    /// yield 1.
    #[must_use]
    pub fn aspect_for(width: u32, height: u32) -> f32 {
        if width == 0 || height == 0 {
            return 1.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let aspect = width as f32 / height as f32;
        aspect
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 3],
            aspect: 1.0,
            forward: [0.0, 0.0, -1.0],
            fovy: 75.0,
            up: [0.0, 1.0, 0.0],
            _pad: 0.0,
        }
    }
}

impl From<&Camera> for CameraUniform {
    fn from(camera: &Camera) -> Self {
        Self {
            view_proj: camera.build_matrix().to_cols_array_2d(),
            position: camera.eye.to_array(),
            aspect: camera.aspect,
            forward: (camera.target - camera.eye).normalize_or_zero().to_array(),
            fovy: camera.fovy,
            up: camera.up.to_array(),
            _pad: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;

    use super::*;

    fn default_camera() -> Camera {
        Camera {
            eye: Vec3::new(0.0, 0.0, 120.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.0,
            fovy: 75.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    #[test]
    fn uniform_layout_is_112_bytes() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 112);
    }

    #[test]
    fn target_projects_to_screen_center() {
        let clip = default_camera().build_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn nearer_points_have_smaller_depth() {
        let m = default_camera().build_matrix();
        let depth = |z: f32| {
            let clip = m * Vec4::new(0.0, 0.0, z, 1.0);
            clip.z / clip.w
        };
        assert!(depth(10.0) < depth(0.0));
        assert!(depth(0.0) < depth(-50.0));
    }

    #[test]
    fn uniform_carries_basis() {
        let uniform = CameraUniform::from(&default_camera());
        assert_eq!(uniform.position, [0.0, 0.0, 120.0]);
        assert_eq!(uniform.forward, [0.0, 0.0, -1.0]);
        assert_eq!(uniform.up, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn aspect_handles_zero_height() {
        assert_eq!(Camera::aspect_for(800, 0), 1.0);
        assert!((Camera::aspect_for(1600, 800) - 2.0).abs() < f32::EPSILON);
    }
}
