use glam::Vec3;
use labyrinth_common::{DoorId, ObjectIndex};
use labyrinth_kernel::{DoorPhase, FrameSimulator, Screen};
use serde::Serialize;

/// Scene inspector for developer tooling.
///
/// Provides read-only queries against a simulation for debugging output and
/// the CLI reports.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the simulation state.
    pub fn summary(sim: &FrameSimulator) -> SceneSummary {
        let scene = sim.scene();
        let count_phase = |phase| scene.doors().iter().filter(|d| d.phase() == phase).count();
        SceneSummary {
            tick: sim.tick_count(),
            screen: sim.screen(),
            instances: scene.objects().len(),
            hidden_instances: scene.objects().iter().filter(|o| o.is_hidden()).count(),
            active_walls: scene.walls().iter().filter(|w| !w.is_degenerate()).count(),
            doors_total: scene.doors().len(),
            doors_rising: count_phase(DoorPhase::Rising),
            doors_risen: count_phase(DoorPhase::Risen),
            keys_collected: scene.keys().iter().filter(|k| k.collected).count(),
            keys_total: scene.keys().len(),
            health: sim.player().health,
            game_over: sim.player().game_over,
            pending_events: scene.events().len(),
        }
    }

    pub fn door(sim: &FrameSimulator, id: DoorId) -> Option<DoorInfo> {
        let door = sim.scene().doors().get(id.0 as usize)?;
        Some(DoorInfo {
            id: door.id,
            code: door.code,
            phase: door.phase(),
            position: sim.scene().object(door.object).translation(),
            blocking: !sim.scene().wall(door.wall).is_degenerate(),
        })
    }

    pub fn doors(sim: &FrameSimulator) -> Vec<DoorInfo> {
        sim.scene()
            .doors()
            .iter()
            .filter_map(|d| Self::door(sim, d.id))
            .collect()
    }

    pub fn keys(sim: &FrameSimulator) -> Vec<KeyInfo> {
        sim.scene()
            .keys()
            .iter()
            .map(|k| KeyInfo {
                code: k.code,
                object: k.object,
                center: k.bounds.center(),
                collected: k.collected,
                doors: k.door_ids.clone(),
            })
            .collect()
    }

    /// Distance from the player to the hostile entity.
    pub fn hostile_distance(sim: &FrameSimulator) -> f32 {
        sim.player().position.distance(sim.scene().hostile_position())
    }
}

/// Summary of simulation state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary {
    pub tick: u64,
    pub screen: Screen,
    pub instances: usize,
    pub hidden_instances: usize,
    pub active_walls: usize,
    pub doors_total: usize,
    pub doors_rising: usize,
    pub doors_risen: usize,
    pub keys_collected: usize,
    pub keys_total: usize,
    pub health: i32,
    pub game_over: bool,
    pub pending_events: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: tick={} screen={:?} instances={} walls={} doors={}/{} risen \
             keys={}/{} health={}{}",
            self.tick,
            self.screen,
            self.instances,
            self.active_walls,
            self.doors_risen,
            self.doors_total,
            self.keys_collected,
            self.keys_total,
            self.health,
            if self.game_over { " GAME OVER" } else { "" },
        )
    }
}

/// Detailed info about a single door.
#[derive(Debug, Clone, Serialize)]
pub struct DoorInfo {
    pub id: DoorId,
    pub code: u8,
    pub phase: DoorPhase,
    pub position: Vec3,
    pub blocking: bool,
}

impl std::fmt::Display for DoorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Door #{} code={} {:?} pos=({:.2}, {:.2}, {:.2}){}",
            self.id.0,
            self.code,
            self.phase,
            self.position.x,
            self.position.y,
            self.position.z,
            if self.blocking { " blocking" } else { "" },
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyInfo {
    pub code: u8,
    pub object: ObjectIndex,
    pub center: Vec3,
    pub collected: bool,
    pub doors: Vec<DoorId>,
}

impl std::fmt::Display for KeyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Key code={} at ({:.2}, {:.2}) opens {} door(s){}",
            self.code,
            self.center.x,
            self.center.z,
            self.doors.len(),
            if self.collected { " [collected]" } else { "" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labyrinth_input::FrameInput;
    use labyrinth_kernel::GameConfig;
    use labyrinth_maze::{MazeCompiler, TileGrid};

    fn sim(text: &str) -> FrameSimulator {
        let grid: TileGrid = text.parse().unwrap();
        FrameSimulator::new(MazeCompiler::default().compile(&grid), GameConfig::default()).playing()
    }

    #[test]
    fn summary_fresh_scene() {
        let sim = sim("1 1 10\n0 0 0\n20 0 0");
        let s = SceneInspector::summary(&sim);
        assert_eq!(s.tick, 0);
        assert_eq!(s.doors_total, 1);
        assert_eq!(s.doors_risen, 0);
        assert_eq!(s.keys_total, 1);
        assert_eq!(s.keys_collected, 0);
        assert_eq!(s.health, 100);
        assert!(s.active_walls >= 2);
    }

    #[test]
    fn door_lifecycle_is_visible() {
        let mut sim = sim("10");
        assert!(SceneInspector::door(&sim, DoorId(0)).unwrap().blocking);

        sim.request_open_all();
        for _ in 0..40 {
            sim.tick(&FrameInput::idle(), 0.05);
        }
        let door = SceneInspector::door(&sim, DoorId(0)).unwrap();
        assert_eq!(door.phase, DoorPhase::Risen);
        assert!(!door.blocking);

        let s = SceneInspector::summary(&sim);
        assert_eq!(s.doors_risen, 1);
        assert_eq!(s.tick, 40);
        assert!(s.hidden_instances >= 1);
    }

    #[test]
    fn unknown_door_is_none() {
        let sim = sim("0");
        assert!(SceneInspector::door(&sim, DoorId(3)).is_none());
        assert!(SceneInspector::doors(&sim).is_empty());
    }

    #[test]
    fn keys_list_their_doors() {
        let sim = sim("10 0 20\n0 0 10");
        let keys = SceneInspector::keys(&sim);
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].code, 20);
        assert_eq!(keys[0].doors.len(), 2);
        assert!(format!("{}", keys[0]).contains("2 door(s)"));
    }

    #[test]
    fn summary_display() {
        let sim = sim("0");
        let text = format!("{}", SceneInspector::summary(&sim));
        assert!(text.contains("tick=0"));
        assert!(text.contains("health=100"));
    }
}
