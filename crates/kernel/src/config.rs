use glam::Vec3;
use labyrinth_maze::MazeConfig;
use serde::{Deserialize, Serialize};

/// Errors from loading a tuning file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("tuning file is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid tuning value: {0}")]
    Invalid(String),
}

/// Gameplay constants. Every field has a built-in default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Player collision and key pickup radius.
    pub player_radius: f32,
    pub rise_speed: f32,
    /// Door offset past which the door is removed.
    pub rise_height: f32,
    pub unlock_message_secs: f32,
    pub hostile_speed: f32,
    /// The hostile stops chasing once this close.
    pub hostile_stop_distance: f32,
    pub contact_radius: f32,
    pub damage: i32,
    pub damage_cooldown: f32,
    pub damage_flash_secs: f32,
    pub damage_overlay_secs: f32,
    /// Spin speed of the first dynamic entity, in half-turns per second.
    pub spin_speed: f32,
    /// Each further dynamic entity spins this many times faster than the previous.
    pub spin_growth: f32,
    pub camera_height: f32,
    /// Camera x and z are clamped to `-world_bound..=world_bound`.
    pub world_bound: f32,
    pub min_height: f32,
    pub max_height: f32,
    pub spawn: Vec3,
    pub move_speed: f32,
    pub sprint_scale: f32,
    pub look_sensitivity: f32,
    pub max_health: i32,
    pub flashlight_on_start: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_radius: 0.5,
            rise_speed: 2.0,
            rise_height: 3.0,
            unlock_message_secs: 3.0,
            hostile_speed: 3.0,
            hostile_stop_distance: 1.5,
            contact_radius: 2.0,
            damage: 25,
            damage_cooldown: 1.0,
            damage_flash_secs: 0.3,
            damage_overlay_secs: 1.0,
            spin_speed: 0.15,
            spin_growth: 1.5,
            camera_height: 3.0,
            world_bound: 100.0,
            min_height: 0.1,
            max_height: 60.0,
            spawn: Vec3::new(-15.7, 3.7, -5.8),
            move_speed: 5.0,
            sprint_scale: 5.0,
            look_sensitivity: 0.005,
            max_health: 100,
            flashlight_on_start: true,
        }
    }
}

impl GameConfig {
    /// Reject values that would stall or break the simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.damage_cooldown <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "damage_cooldown must be positive, got {}",
                self.damage_cooldown
            )));
        }
        if self.player_radius <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "player_radius must be positive, got {}",
                self.player_radius
            )));
        }
        if self.hostile_stop_distance < 0.0 || self.hostile_stop_distance.is_nan() {
            return Err(ConfigError::Invalid(format!(
                "hostile_stop_distance must be non-negative, got {}",
                self.hostile_stop_distance
            )));
        }
        if self.max_health <= 0 {
            return Err(ConfigError::Invalid(format!(
                "max_health must be positive, got {}",
                self.max_health
            )));
        }
        if self.min_height > self.max_height {
            return Err(ConfigError::Invalid(format!(
                "min_height {} above max_height {}",
                self.min_height, self.max_height
            )));
        }
        Ok(())
    }
}

/// Everything a tuning file can override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub maze: MazeConfig,
    pub game: GameConfig,
}

impl Tuning {
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_yaml::from_str(s)?;
        tuning.game.validate()?;
        if tuning.maze.spacing <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "maze spacing must be positive, got {}",
                tuning.maze.spacing
            )));
        }
        Ok(tuning)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
