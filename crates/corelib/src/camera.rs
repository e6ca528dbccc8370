use crate::{Mat4, Vec3};

/// Field of view of the board camera.
pub const BOARD_FOV_Y_DEG: f32 = 60.0;
/// Distance from the camera to the board plane.
pub const BOARD_CAMERA_DISTANCE: f32 = 3.0;

/// Fixed perspective camera (right-handed) looking down -Z at the board.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub fov_y_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub aspect: f32,
}

impl Camera {
    /// Camera used for the board: 60 degrees, near 0.1, far 100, backed off 3 units.
    pub fn board(aspect: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, BOARD_CAMERA_DISTANCE),
            fov_y_rad: BOARD_FOV_Y_DEG.to_radians(),
            z_near: 0.1,
            z_far: 100.0,
            aspect,
        }
    }

    /// World -> view: moves the world by `-eye`.
    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(-self.eye)
    }

    /// Depth is mapped to [0, 1], which is what wgpu expects.
    #[inline]
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_rad,
            self.aspect.max(1e-6),
            self.z_near,
            self.z_far,
        )
    }
}
