use crate::collision;
use crate::config::GameConfig;
use crate::doors::KeyDoorController;
use crate::hostile::EntityAnimator;
use crate::player::PlayerState;
use crate::scene::{Scene, SceneEvent};
use labyrinth_common::ObjectInstance;
use labyrinth_input::{Action, FrameInput};
use labyrinth_maze::CompiledMaze;
use serde::{Deserialize, Serialize};

/// Which full-screen UI, if any, is in front of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Start,
    Controls,
    Playing,
}

/// Read-only state the UI draws from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub screen: Screen,
    pub health: i32,
    pub max_health: i32,
    pub game_over: bool,
    pub unlock_message_active: bool,
    pub flashlight: bool,
    /// Seconds until the next hit while in contact, 0 otherwise.
    pub damage_cooldown_remaining: f32,
    pub damage_flash: f32,
    pub overlay_alpha: f32,
    pub keys_collected: usize,
    pub keys_total: usize,
}

/// Runs one gameplay tick per rendered frame.
///
/// Tick order: camera from input, collision, keys and doors, hostile and
/// damage, then the world clamp. Subsystems write instance transforms in
/// place, so after `tick` returns `instances()` is ready for upload.
#[derive(Debug, Clone)]
pub struct FrameSimulator {
    config: GameConfig,
    scene: Scene,
    player: PlayerState,
    doors: KeyDoorController,
    animator: EntityAnimator,
    screen: Screen,
    tick: u64,
}

impl FrameSimulator {
    /// Start on the start screen with a freshly spawned player.
    pub fn new(maze: CompiledMaze, config: GameConfig) -> Self {
        let scene = Scene::new(maze, config.rise_speed, config.spin_speed, config.spin_growth);
        let mut player = PlayerState::spawn(&config);
        player.clamp_to_world(&config);
        Self {
            doors: KeyDoorController::new(&config),
            animator: EntityAnimator::new(&config),
            config,
            scene,
            player,
            screen: Screen::Start,
            tick: 0,
        }
    }

    /// Skip the start screen, for headless runs.
    pub fn playing(mut self) -> Self {
        self.screen = Screen::Playing;
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerState {
        &mut self.player
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Ticks actually simulated; screens do not count.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// The instance table for the renderer.
    pub fn instances(&self) -> &[ObjectInstance] {
        self.scene.objects()
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        self.scene.drain_events()
    }

    pub fn request_open_all(&mut self) {
        self.doors.request_open_all();
    }

    /// Advance one frame. Returns false when a screen suspends the game.
    pub fn tick(&mut self, input: &FrameInput, dt: f32) -> bool {
        if self.screen != Screen::Playing {
            return false;
        }
        let radius = self.config.player_radius;

        self.player.apply_input(input, &self.config, dt);
        self.player.position = collision::resolve(self.player.position, radius, self.scene.walls());
        self.doors
            .on_frame(&mut self.scene, self.player.position, radius, dt);
        self.player.tick_feedback(dt);
        self.animator
            .on_frame(&mut self.scene, &mut self.player, dt);
        self.player.clamp_to_world(&self.config);

        self.tick += 1;
        true
    }

    /// Apply a UI trigger. Transitions that make no sense from the current
    /// screen are ignored.
    pub fn apply(&mut self, action: Action) {
        let next = match (action, self.screen) {
            (Action::DismissStartScreen, Screen::Start) => Screen::Playing,
            (Action::ShowControls, Screen::Start) => Screen::Controls,
            (Action::DismissControlsScreen, Screen::Controls) => Screen::Playing,
            (Action::BackToStart, Screen::Controls) => Screen::Start,
            (Action::ToggleFlashlight, Screen::Playing) => {
                self.player.flashlight = !self.player.flashlight;
                tracing::debug!(on = self.player.flashlight, "flashlight toggled");
                return;
            }
            (Action::ResetGame, _) if self.player.game_over => {
                self.reset_game();
                return;
            }
            (action, screen) => {
                tracing::debug!(?action, ?screen, "ignored action");
                return;
            }
        };
        tracing::debug!(from = ?self.screen, to = ?next, "screen changed");
        self.screen = next;
    }

    fn reset_game(&mut self) {
        self.player.reset(&self.config);
        self.player.clamp_to_world(&self.config);
        tracing::info!("game reset");
        self.scene.push_event(SceneEvent::GameReset);
    }

    pub fn hud(&self) -> HudSnapshot {
        let p = &self.player;
        let cooldown_remaining = if p.time_since_damage > 0.0 {
            (self.config.damage_cooldown - p.time_since_damage).max(0.0)
        } else {
            0.0
        };
        HudSnapshot {
            screen: self.screen,
            health: p.health,
            max_health: self.config.max_health,
            game_over: p.game_over,
            unlock_message_active: self.doors.unlock_message_active(),
            flashlight: p.flashlight,
            damage_cooldown_remaining: cooldown_remaining,
            damage_flash: if p.game_over { 0.0 } else { p.damage_flash },
            overlay_alpha: p.overlay_alpha(self.config.damage_overlay_secs),
            keys_collected: self.scene.keys().iter().filter(|k| k.collected).count(),
            keys_total: self.scene.keys().len(),
        }
    }
}
