use glam::{Quat, Vec2, Vec3};

use crate::camera::core::Camera;
use crate::options::CameraOptions;

/// Closest and farthest allowed orbit distance.
pub const DISTANCE_RANGE: (f32, f32) = (1.0, 1000.0);

/// Quaternion orbit around a focus point.
///
/// Dragging rotates the eye around the focus, shift-dragging slides the
/// focus in the view plane, and the wheel scales the orbit distance.
#[derive(Debug, Clone)]
pub struct OrbitController {
    orientation: Quat,
    distance: f32,
    focus_point: Vec3,
    camera: Camera,
    rotate_speed: f32,
    pan_speed: f32,
    zoom_speed: f32,
}

impl OrbitController {
    /// Place the camera as described by `options` for a viewport of the
    /// given aspect ratio.
    #[must_use]
    pub fn new(options: &CameraOptions, aspect: f32) -> Self {
        let eye = Vec3::from(options.position);
        let focus_point = Vec3::from(options.target);
        let offset = eye - focus_point;
        let distance = offset
            .length()
            .clamp(DISTANCE_RANGE.0, DISTANCE_RANGE.1);
        let orientation =
            Quat::from_rotation_arc(Vec3::Z, offset.normalize_or(Vec3::Z));

        let mut controller = Self {
            orientation,
            distance,
            focus_point,
            camera: Camera {
                eye,
                target: focus_point,
                up: Vec3::Y,
                aspect,
                fovy: options.fovy,
                znear: options.znear,
                zfar: options.zfar,
            },
            rotate_speed: options.rotate_speed,
            pan_speed: options.pan_speed,
            zoom_speed: options.zoom_speed,
        };
        controller.update_camera_pos();
        controller
    }

    fn update_camera_pos(&mut self) {
        let dir = self.orientation * Vec3::Z;
        self.camera.eye = self.focus_point + dir * self.distance;
        self.camera.target = self.focus_point;
        self.camera.up = self.orientation * Vec3::Y;
    }

    /// Current camera state.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Distance from eye to focus.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Point the camera orbits around.
    #[must_use]
    pub fn focus_point(&self) -> Vec3 {
        self.focus_point
    }

    /// Update the projection for a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.aspect = Camera::aspect_for(width, height);
    }

    /// Orbit by a cursor delta in pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        // Yaw around the camera's up vector, then pitch around its right.
        let up = self.orientation * Vec3::Y;
        let yaw = Quat::from_axis_angle(up, -delta.x * self.rotate_speed);
        self.orientation = (yaw * self.orientation).normalize();

        let right = self.orientation * Vec3::X;
        let pitch = Quat::from_axis_angle(right, -delta.y * self.rotate_speed);
        self.orientation = (pitch * self.orientation).normalize();

        self.update_camera_pos();
    }

    /// Slide the focus point in the view plane by a cursor delta in pixels.
    pub fn pan(&mut self, delta: Vec2) {
        let right = self.orientation * Vec3::X;
        let up = self.orientation * Vec3::Y;
        self.focus_point += right * (-delta.x * self.pan_speed)
            + up * (delta.y * self.pan_speed);
        self.update_camera_pos();
    }

    /// Scale the orbit distance; positive deltas move closer.
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta * self.zoom_speed))
            .clamp(DISTANCE_RANGE.0, DISTANCE_RANGE.1);
        self.update_camera_pos();
    }
}
