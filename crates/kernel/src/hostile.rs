use crate::config::GameConfig;
use crate::player::PlayerState;
use crate::scene::{Scene, SceneEvent};
use glam::{Mat4, Vec3};
use std::f32::consts::PI;

/// Moves the hostile toward the player, spins dynamic entities and applies
/// contact damage.
#[derive(Debug, Clone)]
pub struct EntityAnimator {
    config: GameConfig,
}

impl EntityAnimator {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn on_frame(&self, scene: &mut Scene, player: &mut PlayerState, dt: f32) {
        self.chase(scene, player.position, dt);
        self.spin(scene, dt);
        self.apply_damage(scene, player, dt);
    }

    /// Step toward `target` unless already within the stop distance. The
    /// hostile keeps the height it was compiled at.
    fn chase(&self, scene: &mut Scene, target: Vec3, dt: f32) {
        let mut position = scene.hostile_position();
        let to_target = target - position;
        let distance = to_target.length();
        if distance > self.config.hostile_stop_distance && distance > f32::EPSILON {
            let height = position.y;
            position += to_target / distance * self.config.hostile_speed * dt;
            position.y = height;
            scene.set_hostile_position(position);
        }
    }

    /// Accumulate yaw on every dynamic entity and rewrite its transform.
    fn spin(&self, scene: &mut Scene, dt: f32) {
        let hostile = scene.hostile();
        let position = scene.hostile_position();
        let mut updates = Vec::with_capacity(scene.dynamics().len());
        for entity in scene.dynamics_mut() {
            entity.yaw += PI * dt * entity.spin_speed;
            let spin = Mat4::from_rotation_y(entity.yaw);
            let model = if entity.object == hostile {
                Mat4::from_translation(position) * spin
            } else {
                entity.base * spin
            };
            updates.push((entity.object, model));
        }
        for (object, model) in updates {
            scene.object_mut(object).set_model(model);
        }
    }

    fn apply_damage(&self, scene: &mut Scene, player: &mut PlayerState, dt: f32) {
        let distance = player.position.distance(scene.hostile_position());
        if distance >= self.config.contact_radius || player.game_over {
            player.time_since_damage = 0.0;
            return;
        }

        player.time_since_damage += dt;
        while player.time_since_damage >= self.config.damage_cooldown {
            player.time_since_damage -= self.config.damage_cooldown;
            let over = player.take_hit(&self.config);
            tracing::info!(health = player.health, "player damaged");
            scene.push_event(SceneEvent::PlayerDamaged {
                health: player.health,
            });
            if over {
                tracing::info!("game over");
                scene.push_event(SceneEvent::GameOver);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labyrinth_maze::{MazeCompiler, MazeConfig, TileGrid};

    fn setup(grid: &str, maze: MazeConfig) -> (Scene, PlayerState, EntityAnimator) {
        let config = GameConfig::default();
        let grid: TileGrid = grid.parse().unwrap();
        let scene = Scene::new(
            MazeCompiler::new(maze).compile(&grid),
            config.rise_speed,
            config.spin_speed,
            config.spin_growth,
        );
        (scene, PlayerState::spawn(&config), EntityAnimator::new(&config))
    }

    #[test]
    fn hostile_chases_at_fixed_speed() {
        let (mut scene, mut player, anim) = setup("0", MazeConfig::default());
        let start = scene.hostile_position();
        player.position = start + Vec3::new(10.0, 0.0, 0.0);
        anim.on_frame(&mut scene, &mut player, 0.5);
        let moved = scene.hostile_position();
        assert!((moved.x - start.x - 1.5).abs() < 1e-5);
        assert_eq!(moved.y, 3.0);
    }

    #[test]
    fn hostile_keeps_compiled_height() {
        let maze = MazeConfig {
            hostile_spawn: Vec3::new(0.0, 4.5, -20.0),
            ..MazeConfig::default()
        };
        let (mut scene, mut player, anim) = setup("0", maze);
        player.position = Vec3::new(10.0, 0.5, 10.0);
        anim.on_frame(&mut scene, &mut player, 0.5);
        assert_eq!(scene.hostile_position().y, 4.5);
    }

    #[test]
    fn zero_stop_distance_on_top_of_player_stays_finite() {
        let config = GameConfig {
            hostile_stop_distance: 0.0,
            ..GameConfig::default()
        };
        let grid: TileGrid = "0".parse().unwrap();
        let mut scene = Scene::new(
            MazeCompiler::default().compile(&grid),
            config.rise_speed,
            config.spin_speed,
            config.spin_growth,
        );
        let mut player = PlayerState::spawn(&config);
        let anim = EntityAnimator::new(&config);
        let start = scene.hostile_position();
        player.position = start;
        anim.on_frame(&mut scene, &mut player, 0.5);
        assert!(scene.hostile_position().is_finite());
        assert_eq!(scene.hostile_position(), start);
    }

    #[test]
    fn hostile_stops_when_close() {
        let (mut scene, mut player, anim) = setup("0", MazeConfig::default());
        let start = scene.hostile_position();
        player.position = start + Vec3::new(1.0, 0.0, 0.0);
        anim.on_frame(&mut scene, &mut player, 0.5);
        assert_eq!(scene.hostile_position(), start);
    }

    #[test]
    fn hostile_instance_follows_position_at_full_scale() {
        let (mut scene, mut player, anim) = setup("0", MazeConfig::default());
        let hostile = scene.hostile();
        assert!(scene.object(hostile).model.x_axis.length() < 0.1);
        player.position = Vec3::new(30.0, 3.0, 30.0);
        anim.on_frame(&mut scene, &mut player, 0.1);
        let obj = scene.object(hostile);
        assert!((obj.model.x_axis.length() - 1.0).abs() < 1e-5);
        assert!((obj.translation() - scene.hostile_position()).length() < 1e-5);
    }

    #[test]
    fn dynamic_decorations_spin_in_place() {
        let maze = MazeConfig {
            dynamic_codes: vec![5],
            ..MazeConfig::default()
        };
        let (mut scene, mut player, anim) = setup("5 0", maze);
        let deco = scene.dynamics()[1].object;
        let before = scene.object(deco).translation();
        anim.on_frame(&mut scene, &mut player, 1.0);
        assert!((scene.object(deco).translation() - before).length() < 1e-5);
        let expected_yaw = PI * 0.15 * 1.5;
        assert!((scene.dynamics()[1].yaw - expected_yaw).abs() < 1e-6);
        assert!((scene.dynamics()[0].yaw - PI * 0.15).abs() < 1e-6);
    }

    #[test]
    fn sustained_contact_damages_per_cooldown() {
        let (mut scene, mut player, anim) = setup("0", MazeConfig::default());
        player.position = scene.hostile_position() + Vec3::new(1.0, 0.0, 0.0);
        for _ in 0..12 {
            anim.on_frame(&mut scene, &mut player, 0.25);
        }
        assert_eq!(player.health, 25);
        assert!(!player.game_over);
        let hits = scene
            .events()
            .iter()
            .filter(|e| matches!(e, SceneEvent::PlayerDamaged { .. }))
            .count();
        assert_eq!(hits, 3);
    }

    #[test]
    fn reaching_zero_ends_game_and_stops_damage() {
        let (mut scene, mut player, anim) = setup("0", MazeConfig::default());
        player.position = scene.hostile_position() + Vec3::new(1.0, 0.0, 0.0);
        anim.on_frame(&mut scene, &mut player, 10.0);
        assert_eq!(player.health, 0);
        assert!(player.game_over);
        assert_eq!(scene.events().last(), Some(&SceneEvent::GameOver));

        let events = scene.events().len();
        anim.on_frame(&mut scene, &mut player, 10.0);
        assert_eq!(scene.events().len(), events);
        assert_eq!(player.time_since_damage, 0.0);
    }

    #[test]
    fn leaving_contact_forfeits_partial_cooldown() {
        let (mut scene, mut player, anim) = setup("0", MazeConfig::default());
        let near = scene.hostile_position() + Vec3::new(1.0, 0.0, 0.0);
        player.position = near;
        anim.on_frame(&mut scene, &mut player, 0.75);
        assert_eq!(player.time_since_damage, 0.75);

        player.position = near + Vec3::new(40.0, 0.0, 0.0);
        anim.on_frame(&mut scene, &mut player, 0.01);
        assert_eq!(player.time_since_damage, 0.0);
        assert_eq!(player.health, 100);
    }
}
