use glam::{Mat4, Vec3};
use labyrinth_common::{Aabb, DoorId, InstanceGroup, ObjectIndex, ObjectInstance, WallIndex};
use labyrinth_maze::CompiledMaze;
use serde::{Deserialize, Serialize};

/// An event record produced by every gameplay state transition.
///
/// The log is append-only; binaries drain it for reporting and tests read it
/// to check transitions happened exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    KeyCollected { code: u8, object: ObjectIndex },
    DoorOpened { id: DoorId },
    /// Door finished rising; its collision volume is gone.
    DoorRisen { id: DoorId },
    PlayerDamaged { health: i32 },
    GameOver,
    GameReset,
}

/// Where a door is in its one-way lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorPhase {
    Closed,
    Rising,
    Risen,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Door {
    pub id: DoorId,
    pub code: u8,
    pub wall: WallIndex,
    pub object: ObjectIndex,
    pub opened: bool,
    pub rising: bool,
    pub rise_timer: f32,
    pub rise_speed: f32,
    /// Instance transform captured when the door was opened.
    pub original: Mat4,
}

impl Door {
    pub fn phase(&self) -> DoorPhase {
        match (self.opened, self.rising) {
            (false, _) => DoorPhase::Closed,
            (true, true) => DoorPhase::Rising,
            (true, false) => DoorPhase::Risen,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    pub code: u8,
    pub bounds: Aabb,
    pub collected: bool,
    pub object: ObjectIndex,
    pub door_ids: Vec<DoorId>,
}

/// An instance animated every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicEntity {
    pub object: ObjectIndex,
    /// Transform the spin is applied on top of, in local space.
    pub base: Mat4,
    pub yaw: f32,
    pub spin_speed: f32,
}

/// The mutable runtime tables derived from a compiled maze.
///
/// All gameplay subsystems receive the scene by reference; nothing else owns
/// any of these tables. Handles index straight into them, so a bad handle
/// panics.
#[derive(Debug, Clone)]
pub struct Scene {
    objects: Vec<ObjectInstance>,
    walls: Vec<Aabb>,
    doors: Vec<Door>,
    keys: Vec<Key>,
    groups: Vec<InstanceGroup>,
    hostile: ObjectIndex,
    hostile_position: Vec3,
    dynamics: Vec<DynamicEntity>,
    event_log: Vec<SceneEvent>,
}

impl Scene {
    /// Attach runtime state to a compiled maze.
    ///
    /// Dynamic entity `i` spins at `spin_speed * spin_growth^i`.
    pub fn new(maze: CompiledMaze, rise_speed: f32, spin_speed: f32, spin_growth: f32) -> Self {
        let doors = maze
            .doors
            .iter()
            .map(|d| Door {
                id: d.id,
                code: d.code,
                wall: d.wall,
                object: d.object,
                opened: false,
                rising: false,
                rise_timer: 0.0,
                rise_speed,
                original: maze.objects[d.object.index()].model,
            })
            .collect();

        let keys = maze
            .keys
            .into_iter()
            .map(|k| Key {
                code: k.code,
                bounds: k.bounds,
                collected: false,
                object: k.object,
                door_ids: k.door_ids,
            })
            .collect();

        let mut speed = spin_speed;
        let dynamics = maze
            .dynamic
            .iter()
            .map(|&object| {
                let entity = DynamicEntity {
                    object,
                    base: maze.objects[object.index()].model,
                    yaw: 0.0,
                    spin_speed: speed,
                };
                speed *= spin_growth;
                entity
            })
            .collect();

        Self {
            objects: maze.objects,
            walls: maze.walls,
            doors,
            keys,
            groups: maze.groups,
            hostile: maze.hostile,
            hostile_position: maze.hostile_position,
            dynamics,
            event_log: Vec::new(),
        }
    }

    /// The instance table handed to the renderer each frame.
    pub fn objects(&self) -> &[ObjectInstance] {
        &self.objects
    }

    pub fn object(&self, index: ObjectIndex) -> &ObjectInstance {
        &self.objects[index.index()]
    }

    pub fn object_mut(&mut self, index: ObjectIndex) -> &mut ObjectInstance {
        &mut self.objects[index.index()]
    }

    pub fn walls(&self) -> &[Aabb] {
        &self.walls
    }

    pub fn wall(&self, index: WallIndex) -> &Aabb {
        &self.walls[index.index()]
    }

    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    /// Door ids are allocated densely from zero, so an id is also its index.
    pub fn door(&self, id: DoorId) -> &Door {
        let door = &self.doors[id.0 as usize];
        assert_eq!(door.id, id, "door table out of order");
        door
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub(crate) fn keys_mut(&mut self) -> &mut [Key] {
        &mut self.keys
    }

    pub fn groups(&self) -> &[InstanceGroup] {
        &self.groups
    }

    pub fn hostile(&self) -> ObjectIndex {
        self.hostile
    }

    pub fn hostile_position(&self) -> Vec3 {
        self.hostile_position
    }

    pub(crate) fn set_hostile_position(&mut self, position: Vec3) {
        self.hostile_position = position;
    }

    pub fn dynamics(&self) -> &[DynamicEntity] {
        &self.dynamics
    }

    pub(crate) fn dynamics_mut(&mut self) -> &mut [DynamicEntity] {
        &mut self.dynamics
    }

    /// Open a door and start it rising. Returns false if it was already open.
    ///
    /// Both key pickup and the open-all trigger go through here.
    pub fn open_door(&mut self, id: DoorId) -> bool {
        let index = id.0 as usize;
        assert_eq!(self.doors[index].id, id, "door table out of order");
        if self.doors[index].opened {
            return false;
        }
        let object = self.doors[index].object;
        let current = self.objects[object.index()].model;

        let door = &mut self.doors[index];
        door.opened = true;
        door.rising = true;
        door.rise_timer = 0.0;
        door.original = current;
        tracing::info!(door = id.0, code = door.code, "door opened");
        self.event_log.push(SceneEvent::DoorOpened { id });
        true
    }

    /// Advance every rising door by `dt`. Doors past `rise_height` lose their
    /// collision volume and are hidden.
    pub fn animate_doors(&mut self, dt: f32, rise_height: f32) {
        for i in 0..self.doors.len() {
            let door = &mut self.doors[i];
            if !door.rising {
                continue;
            }
            door.rise_timer += dt;
            let offset = door.rise_timer * door.rise_speed;
            let (id, wall, object, original) = (door.id, door.wall, door.object, door.original);

            if offset > rise_height {
                door.rising = false;
                self.walls[wall.index()] = Aabb::EMPTY;
                self.objects[object.index()].hide();
                tracing::debug!(door = id.0, "door risen");
                self.event_log.push(SceneEvent::DoorRisen { id });
            } else {
                self.objects[object.index()]
                    .set_model(Mat4::from_translation(Vec3::new(0.0, offset, 0.0)) * original);
            }
        }
    }

    pub(crate) fn push_event(&mut self, event: SceneEvent) {
        self.event_log.push(event);
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labyrinth_maze::{MazeCompiler, TileGrid};

    fn scene(text: &str) -> Scene {
        let grid: TileGrid = text.parse().unwrap();
        Scene::new(MazeCompiler::default().compile(&grid), 2.0, 0.15, 1.5)
    }

    #[test]
    fn doors_start_closed() {
        let s = scene("10 10 10\n0 0 0\n20 0 0");
        assert_eq!(s.doors().len(), 1);
        assert_eq!(s.door(DoorId(0)).phase(), DoorPhase::Closed);
        assert_eq!(s.keys().len(), 1);
        assert!(!s.keys()[0].collected);
    }

    #[test]
    fn open_door_is_idempotent() {
        let mut s = scene("10 0 11");
        assert!(s.open_door(DoorId(1)));
        assert!(!s.open_door(DoorId(1)));
        assert_eq!(s.door(DoorId(1)).phase(), DoorPhase::Rising);
        assert_eq!(s.door(DoorId(0)).phase(), DoorPhase::Closed);
        assert_eq!(s.events(), &[SceneEvent::DoorOpened { id: DoorId(1) }]);
    }

    #[test]
    fn rising_door_translates_then_clears_volume() {
        let mut s = scene("10");
        s.open_door(DoorId(0));
        let start = s.object(ObjectIndex(0)).translation();

        s.animate_doors(0.5, 3.0);
        let moved = s.object(ObjectIndex(0)).translation();
        assert!((moved.y - start.y - 1.0).abs() < 1e-5);
        assert!(!s.wall(WallIndex(0)).is_degenerate());

        // 1.5 s * 2.0 = 3.0 is not past the threshold yet.
        s.animate_doors(1.0, 3.0);
        assert_eq!(s.door(DoorId(0)).phase(), DoorPhase::Rising);

        s.animate_doors(0.1, 3.0);
        assert_eq!(s.door(DoorId(0)).phase(), DoorPhase::Risen);
        assert!(s.wall(WallIndex(0)).is_degenerate());
        assert!(s.object(ObjectIndex(0)).is_hidden());

        // Terminal: further ticks change nothing.
        let events = s.events().len();
        s.animate_doors(1.0, 3.0);
        assert_eq!(s.events().len(), events);
        assert!(!s.open_door(DoorId(0)));
    }

    #[test]
    fn dynamic_spin_speed_grows() {
        let grid: TileGrid = "19 0 19".parse().unwrap();
        let config = labyrinth_maze::MazeConfig {
            dynamic_codes: vec![19],
            ..Default::default()
        };
        let s = Scene::new(MazeCompiler::new(config).compile(&grid), 2.0, 0.2, 2.0);
        let speeds: Vec<f32> = s.dynamics().iter().map(|d| d.spin_speed).collect();
        assert_eq!(speeds, vec![0.2, 0.4, 0.8]);
        assert_eq!(s.dynamics()[0].object, s.hostile());
    }

    #[test]
    fn drain_events_clears_log() {
        let mut s = scene("10");
        s.open_door(DoorId(0));
        assert_eq!(s.drain_events().len(), 1);
        assert!(s.events().is_empty());
    }

    #[test]
    #[should_panic]
    fn unknown_door_id_panics() {
        let s = scene("10");
        let _ = s.door(DoorId(5));
    }
}
