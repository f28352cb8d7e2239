use glam::{Mat4, Vec3};
use labyrinth_kernel::PlayerState;
use std::f32::consts::FRAC_PI_4;

/// First-person camera driven by the player's pose.
/// The pose itself lives in the kernel; this only builds matrices.
pub struct FirstPersonCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 3.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            fov: FRAC_PI_4,
            aspect: 16.0 / 9.0,
            near: 0.5,
            far: 1000.0,
        }
    }
}

impl FirstPersonCamera {
    pub fn follow(&mut self, player: &PlayerState) {
        self.position = player.position;
        self.yaw = player.yaw;
        self.pitch = player.pitch;
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labyrinth_kernel::GameConfig;

    #[test]
    fn follows_player_pose() {
        let mut player = PlayerState::spawn(&GameConfig::default());
        player.yaw = 1.0;
        player.pitch = -0.2;
        let mut cam = FirstPersonCamera::default();
        cam.follow(&player);
        assert_eq!(cam.position, player.position);
        assert!((cam.forward() - player.forward()).length() < 1e-6);
    }

    #[test]
    fn point_ahead_projects_inside_clip_space() {
        let cam = FirstPersonCamera::default();
        let p = cam.position + cam.forward() * 10.0;
        let clip = cam.view_projection() * p.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn viewport_sets_aspect() {
        let mut cam = FirstPersonCamera::default();
        cam.set_viewport(800, 0);
        assert_eq!(cam.aspect, 800.0);
        cam.set_viewport(1200, 600);
        assert_eq!(cam.aspect, 2.0);
    }
}
