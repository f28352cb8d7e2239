use crate::config::GameConfig;
use glam::Vec3;
use labyrinth_input::FrameInput;

const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// First-person player: camera pose, health and damage feedback timers.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub health: i32,
    pub time_since_damage: f32,
    /// Seconds of red flash left after the latest hit.
    pub damage_flash: f32,
    /// Seconds since the latest hit, while the fading overlay is shown.
    pub overlay_elapsed: Option<f32>,
    pub game_over: bool,
    pub flashlight: bool,
}

impl PlayerState {
    pub fn spawn(config: &GameConfig) -> Self {
        Self {
            position: config.spawn,
            yaw: 0.0,
            pitch: 0.0,
            health: config.max_health,
            time_since_damage: 0.0,
            damage_flash: 0.0,
            overlay_elapsed: None,
            game_over: false,
            flashlight: config.flashlight_on_start,
        }
    }

    /// View direction.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    /// Walking direction: the view direction flattened onto the ground.
    fn heading(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin())
    }

    pub fn apply_input(&mut self, input: &FrameInput, config: &GameConfig, dt: f32) {
        self.yaw += input.look.x * config.look_sensitivity;
        self.pitch = (self.pitch - input.look.y * config.look_sensitivity)
            .clamp(-MAX_PITCH, MAX_PITCH);

        let heading = self.heading();
        let right = heading.cross(Vec3::Y);
        let mut speed = config.move_speed;
        if input.sprint {
            speed *= config.sprint_scale;
        }
        let step = heading * input.movement.y + right * input.movement.x;
        self.position += step.normalize_or_zero() * speed * dt;
    }

    /// Pin the camera height and keep it inside the world bounds.
    pub fn clamp_to_world(&mut self, config: &GameConfig) {
        let b = config.world_bound;
        self.position.x = self.position.x.clamp(-b, b);
        self.position.z = self.position.z.clamp(-b, b);
        self.position.y = config.camera_height.clamp(config.min_height, config.max_height);
    }

    pub fn tick_feedback(&mut self, dt: f32) {
        self.damage_flash = (self.damage_flash - dt).max(0.0);
        if let Some(t) = self.overlay_elapsed.as_mut() {
            *t += dt;
        }
    }

    /// Alpha of the post-damage overlay, fading from 1 to 0.
    pub fn overlay_alpha(&self, duration: f32) -> f32 {
        match self.overlay_elapsed {
            Some(t) if !self.game_over => (1.0 - t / duration).max(0.0),
            _ => 0.0,
        }
    }

    /// Subtract one hit. Returns true if this hit ended the game.
    pub fn take_hit(&mut self, config: &GameConfig) -> bool {
        self.health = (self.health - config.damage).max(0);
        self.damage_flash = config.damage_flash_secs;
        self.overlay_elapsed = Some(0.0);
        if self.health <= 0 {
            self.game_over = true;
        }
        self.game_over
    }

    /// Back to spawn with full health. Look direction and flashlight are kept.
    pub fn reset(&mut self, config: &GameConfig) {
        self.position = config.spawn;
        self.health = config.max_health;
        self.time_since_damage = 0.0;
        self.damage_flash = 0.0;
        self.overlay_elapsed = None;
        self.game_over = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn walks_along_heading() {
        let config = GameConfig::default();
        let mut p = PlayerState::spawn(&config);
        p.position = Vec3::ZERO;
        p.apply_input(&FrameInput::forward(), &config, 1.0);
        assert!((p.position - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn sprint_scales_speed() {
        let config = GameConfig::default();
        let mut p = PlayerState::spawn(&config);
        p.position = Vec3::ZERO;
        let input = FrameInput {
            sprint: true,
            ..FrameInput::forward()
        };
        p.apply_input(&input, &config, 0.1);
        assert!((p.position.x - 2.5).abs() < 1e-5);
    }

    #[test]
    fn diagonal_is_not_faster() {
        let config = GameConfig::default();
        let mut p = PlayerState::spawn(&config);
        p.position = Vec3::ZERO;
        let input = FrameInput {
            movement: Vec2::new(1.0, 1.0),
            ..FrameInput::default()
        };
        p.apply_input(&input, &config, 1.0);
        assert!((p.position.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn pitch_is_clamped() {
        let config = GameConfig::default();
        let mut p = PlayerState::spawn(&config);
        let input = FrameInput {
            look: Vec2::new(0.0, -100_000.0),
            ..FrameInput::default()
        };
        p.apply_input(&input, &config, 0.016);
        assert!(p.pitch <= MAX_PITCH);
        assert!(p.forward().is_finite());
    }

    #[test]
    fn clamp_pins_height_and_bounds() {
        let config = GameConfig::default();
        let mut p = PlayerState::spawn(&config);
        p.position = Vec3::new(500.0, 40.0, -500.0);
        p.clamp_to_world(&config);
        assert_eq!(p.position, Vec3::new(100.0, 3.0, -100.0));
    }

    #[test]
    fn hits_floor_at_zero() {
        let config = GameConfig {
            damage: 40,
            ..GameConfig::default()
        };
        let mut p = PlayerState::spawn(&config);
        assert!(!p.take_hit(&config));
        assert!(!p.take_hit(&config));
        assert!(p.take_hit(&config));
        assert_eq!(p.health, 0);
        assert!(p.game_over);
    }

    #[test]
    fn overlay_fades() {
        let config = GameConfig::default();
        let mut p = PlayerState::spawn(&config);
        assert_eq!(p.overlay_alpha(1.0), 0.0);
        p.take_hit(&config);
        assert_eq!(p.overlay_alpha(1.0), 1.0);
        p.tick_feedback(0.25);
        assert!((p.overlay_alpha(1.0) - 0.75).abs() < 1e-6);
        assert!((p.damage_flash - 0.05).abs() < 1e-6);
        p.tick_feedback(2.0);
        assert_eq!(p.overlay_alpha(1.0), 0.0);
        assert_eq!(p.damage_flash, 0.0);
    }

    #[test]
    fn reset_restores_health_and_spawn() {
        let config = GameConfig::default();
        let mut p = PlayerState::spawn(&config);
        p.flashlight = false;
        p.position = Vec3::ZERO;
        for _ in 0..4 {
            p.take_hit(&config);
        }
        assert!(p.game_over);
        p.reset(&config);
        assert_eq!(p.health, 100);
        assert!(!p.game_over);
        assert_eq!(p.position, config.spawn);
        assert!(!p.flashlight);
    }
}
