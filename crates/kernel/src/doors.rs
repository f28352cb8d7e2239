use crate::config::GameConfig;
use crate::scene::{Scene, SceneEvent};
use glam::Vec3;
use labyrinth_common::DoorId;

/// Key pickup, door opening and the door rise animation.
#[derive(Debug, Clone)]
pub struct KeyDoorController {
    rise_height: f32,
    unlock_message_secs: f32,
    unlock_timer: f32,
    pending_open_all: u32,
}

impl KeyDoorController {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            rise_height: config.rise_height,
            unlock_message_secs: config.unlock_message_secs,
            unlock_timer: 0.0,
            pending_open_all: 0,
        }
    }

    pub fn unlock_message_active(&self) -> bool {
        self.unlock_timer > 0.0
    }

    pub fn unlock_message_remaining(&self) -> f32 {
        self.unlock_timer
    }

    /// Queue an open-all; applied on the next frame.
    pub fn request_open_all(&mut self) {
        self.pending_open_all += 1;
    }

    pub fn pending_open_all(&self) -> u32 {
        self.pending_open_all
    }

    pub fn reset(&mut self) {
        self.unlock_timer = 0.0;
        self.pending_open_all = 0;
    }

    pub fn on_frame(&mut self, scene: &mut Scene, player: Vec3, radius: f32, dt: f32) {
        self.unlock_timer = (self.unlock_timer - dt).max(0.0);
        self.collect_keys(scene, player, radius);

        if self.pending_open_all > 0 {
            self.pending_open_all = 0;
            let ids: Vec<DoorId> = scene.doors().iter().map(|d| d.id).collect();
            let opened = ids.into_iter().filter(|&id| scene.open_door(id)).count();
            tracing::info!(opened, "opened all doors");
        }

        scene.animate_doors(dt, self.rise_height);
    }

    /// Collect every uncollected key whose box is within `radius` of `player`.
    fn collect_keys(&mut self, scene: &mut Scene, player: Vec3, radius: f32) {
        for i in 0..scene.keys().len() {
            let key = &scene.keys()[i];
            if key.collected || player.distance(key.bounds.closest_point(player)) >= radius {
                continue;
            }

            let key = &mut scene.keys_mut()[i];
            key.collected = true;
            let (code, object, doors) = (key.code, key.object, key.door_ids.clone());

            scene.object_mut(object).hide();
            self.unlock_timer = self.unlock_message_secs;
            tracing::info!(code, doors = doors.len(), "key collected");
            scene.push_event(SceneEvent::KeyCollected { code, object });

            for id in doors {
                scene.open_door(id);
            }
        }
    }
}
