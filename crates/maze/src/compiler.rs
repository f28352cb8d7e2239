use crate::bindings::{DEFAULT_BINDINGS, KeyDoorBinding, door_code_for_key};
use crate::config::MazeConfig;
use crate::grid::{CellCoord, TileGrid};
use crate::tile::TileKind;
use glam::{Mat4, Quat, Vec3};
use labyrinth_common::{
    Aabb, DoorId, InstanceGroup, MaterialId, MeshId, MeshLayout, ObjectIndex, ObjectInstance,
    WallIndex,
};
use serde::{Deserialize, Serialize};

/// Merge direction of a run of identical tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// Along a row (increasing `x`).
    Horizontal,
    /// Along a column (increasing `z`).
    Vertical,
}

/// Grid footprint of one emitted structural block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub origin: CellCoord,
    pub len: usize,
    pub axis: Axis,
}

impl Run {
    pub fn single(origin: CellCoord) -> Self {
        Self {
            origin,
            len: 1,
            axis: Axis::Horizontal,
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.len).map(move |i| match self.axis {
            Axis::Horizontal => CellCoord::new(self.origin.x + i, self.origin.z),
            Axis::Vertical => CellCoord::new(self.origin.x, self.origin.z + i),
        })
    }
}

/// A door as produced by compilation, before any runtime state is attached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorSpec {
    pub id: DoorId,
    pub code: u8,
    pub wall: WallIndex,
    pub object: ObjectIndex,
}

/// A key as produced by compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeySpec {
    pub code: u8,
    pub bounds: Aabb,
    pub object: ObjectIndex,
    pub door_ids: Vec<DoorId>,
}

/// Everything the runtime needs from a tile grid.
///
/// `walls` and `footprints` are index-aligned: wall `i` was emitted for the
/// cells of footprint `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledMaze {
    pub objects: Vec<ObjectInstance>,
    pub walls: Vec<Aabb>,
    pub footprints: Vec<Run>,
    pub doors: Vec<DoorSpec>,
    pub keys: Vec<KeySpec>,
    pub groups: Vec<InstanceGroup>,
    pub ground: ObjectIndex,
    pub ceiling: ObjectIndex,
    pub hostile: ObjectIndex,
    pub hostile_position: Vec3,
    /// Instances animated every frame. The hostile is always first.
    pub dynamic: Vec<ObjectIndex>,
    pub grid_size: (usize, usize),
}

impl CompiledMaze {
    pub fn door(&self, id: DoorId) -> Option<&DoorSpec> {
        self.doors.iter().find(|d| d.id == id)
    }
}

/// Turns a tile grid into instanced geometry, collision volumes and key/door
/// bindings.
///
/// Two passes over the grid in row-major order. The first emits walls,
/// merged door runs and merged decoration runs; the second emits keys and
/// resolves which doors each key opens. Ground, ceiling and hostile are
/// appended last, each in its own instancing group.
#[derive(Debug, Clone)]
pub struct MazeCompiler {
    config: MazeConfig,
    bindings: Vec<KeyDoorBinding>,
    layout: MeshLayout,
}

impl Default for MazeCompiler {
    fn default() -> Self {
        Self::new(MazeConfig::default())
    }
}

impl MazeCompiler {
    pub fn new(config: MazeConfig) -> Self {
        Self {
            config,
            bindings: DEFAULT_BINDINGS.to_vec(),
            layout: MeshLayout::default(),
        }
    }

    pub fn with_bindings(mut self, bindings: &[KeyDoorBinding]) -> Self {
        self.bindings = bindings.to_vec();
        self
    }

    pub fn with_mesh_layout(mut self, layout: MeshLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    /// Compile `grid`. Deterministic: the same grid always yields equal tables.
    pub fn compile(&self, grid: &TileGrid) -> CompiledMaze {
        let mut build = Build::new(self, grid);
        build.structural_pass();
        build.key_pass();
        let maze = build.finish();
        tracing::info!(
            objects = maze.objects.len(),
            walls = maze.walls.len(),
            doors = maze.doors.len(),
            keys = maze.keys.len(),
            "maze compiled"
        );
        maze
    }
}

struct Build<'a> {
    compiler: &'a MazeCompiler,
    grid: &'a TileGrid,
    visited: Vec<bool>,
    objects: Vec<ObjectInstance>,
    walls: Vec<Aabb>,
    footprints: Vec<Run>,
    doors: Vec<DoorSpec>,
    keys: Vec<KeySpec>,
    dynamic_decorations: Vec<ObjectIndex>,
    spawn_cell: Option<CellCoord>,
    next_door_id: u32,
}

impl<'a> Build<'a> {
    fn new(compiler: &'a MazeCompiler, grid: &'a TileGrid) -> Self {
        Self {
            compiler,
            grid,
            visited: vec![false; grid.rows() * grid.cols()],
            objects: Vec::new(),
            walls: Vec::new(),
            footprints: Vec::new(),
            doors: Vec::new(),
            keys: Vec::new(),
            dynamic_decorations: Vec::new(),
            spawn_cell: None,
            next_door_id: 0,
        }
    }

    fn visited(&self, x: usize, z: usize) -> bool {
        self.visited[z * self.grid.cols() + x]
    }

    fn mark(&mut self, cell: CellCoord) {
        let cols = self.grid.cols();
        self.visited[cell.z * cols + cell.x] = true;
    }

    fn structural_pass(&mut self) {
        let grid = self.grid;
        for (x, z, code) in grid.cells() {
            if code == 0 || self.visited(x, z) {
                continue;
            }
            let cell = CellCoord::new(x, z);
            match TileKind::classify(code) {
                TileKind::Wall => {
                    self.mark(cell);
                    self.emit_block(Run::single(cell), code);
                }
                kind if kind.merges() => {
                    let run = self.scan_run(cell, code);
                    for c in run.cells() {
                        self.mark(c);
                    }
                    let (wall, object) = self.emit_block(run, code);
                    if matches!(kind, TileKind::Door(_)) {
                        let id = DoorId(self.next_door_id);
                        self.next_door_id += 1;
                        self.doors.push(DoorSpec {
                            id,
                            code,
                            wall,
                            object,
                        });
                    } else if self.compiler.config.dynamic_codes.contains(&code) {
                        self.dynamic_decorations.push(object);
                    }
                }
                TileKind::HostileSpawn => {
                    self.mark(cell);
                    if self.spawn_cell.is_none() {
                        self.spawn_cell = Some(cell);
                    }
                }
                TileKind::Unknown(code) => {
                    self.mark(cell);
                    tracing::warn!(x, z, code, "skipping unknown tile code");
                }
                // Keys are emitted in the second pass.
                _ => {}
            }
        }
    }

    /// Longest run of identical unvisited cells from `seed`; ties favour rows.
    fn scan_run(&self, seed: CellCoord, code: u8) -> Run {
        let grid = self.grid;
        let same = |x: usize, z: usize| grid.get(x, z) == code && !self.visited(x, z);

        let mut run_x = 1;
        while seed.x + run_x < grid.cols() && same(seed.x + run_x, seed.z) {
            run_x += 1;
        }
        let mut run_z = 1;
        while seed.z + run_z < grid.rows() && same(seed.x, seed.z + run_z) {
            run_z += 1;
        }

        if run_x >= run_z {
            Run {
                origin: seed,
                len: run_x,
                axis: Axis::Horizontal,
            }
        } else {
            Run {
                origin: seed,
                len: run_z,
                axis: Axis::Vertical,
            }
        }
    }

    /// Emit one box instance plus its collision volume, centred on the run.
    fn emit_block(&mut self, run: Run, code: u8) -> (WallIndex, ObjectIndex) {
        let cfg = &self.compiler.config;
        let spacing = cfg.spacing;
        let span = run.len as f32;
        let offset = (span - 1.0) * 0.5;

        let first = self.grid.cell_center(run.origin, spacing);
        let (center, half) = match run.axis {
            Axis::Horizontal => (
                Vec3::new(first.x + offset * spacing, 0.0, first.z),
                Vec3::new(spacing * span * 0.5, cfg.wall_height, spacing * 0.5),
            ),
            Axis::Vertical => (
                Vec3::new(first.x, 0.0, first.z + offset * spacing),
                Vec3::new(spacing * 0.5, cfg.wall_height, spacing * span * 0.5),
            ),
        };

        let render_center = Vec3::new(center.x, cfg.wall_height - cfg.wall_sink, center.z);
        let model = Mat4::from_scale_rotation_translation(half, Quat::IDENTITY, render_center);
        let object = self.push_object(model, MaterialId::for_tile(code), MeshId::CUBE);

        let wall = WallIndex(self.walls.len() as u32);
        self.walls.push(Aabb::new(
            Vec3::new(center.x - half.x, 0.0, center.z - half.z),
            Vec3::new(center.x + half.x, cfg.wall_height, center.z + half.z),
        ));
        self.footprints.push(run);
        (wall, object)
    }

    fn push_object(&mut self, model: Mat4, material: MaterialId, mesh: MeshId) -> ObjectIndex {
        let index = ObjectIndex(self.objects.len() as u32);
        self.objects.push(ObjectInstance::new(
            model,
            material,
            mesh,
            &self.compiler.layout,
        ));
        index
    }

    fn key_pass(&mut self) {
        let grid = self.grid;
        let cfg = &self.compiler.config;
        let size = cfg.key_half_size;
        for (x, z, code) in grid.cells() {
            let TileKind::Key(code) = TileKind::classify(code) else {
                continue;
            };
            if self.visited(x, z) {
                continue;
            }
            let cell = CellCoord::new(x, z);
            self.mark(cell);

            let mut center = grid.cell_center(cell, cfg.spacing);
            center.y = size + cfg.key_hover;
            let model =
                Mat4::from_scale_rotation_translation(Vec3::splat(size), Quat::IDENTITY, center);
            let object = self.push_object(model, MaterialId::for_tile(code), MeshId::CUBE);

            let door_ids = match door_code_for_key(&self.compiler.bindings, code) {
                Some(door_code) => {
                    let material = MaterialId::for_tile(door_code);
                    self.doors
                        .iter()
                        .filter(|d| self.objects[d.object.index()].material == material)
                        .map(|d| d.id)
                        .collect()
                }
                None => {
                    tracing::debug!(code, "key has no door binding");
                    Vec::new()
                }
            };

            self.keys.push(KeySpec {
                code,
                bounds: Aabb::from_center_half_extents(center, Vec3::splat(size)),
                object,
                door_ids,
            });
        }
    }

    fn finish(mut self) -> CompiledMaze {
        let cfg = &self.compiler.config;
        let mut groups = vec![InstanceGroup {
            mesh: MeshId::CUBE,
            first: 0,
            count: self.objects.len() as u32,
        }];

        let (width, depth) = self.grid.world_size(cfg.spacing);

        let ground = self.push_object(
            Mat4::from_scale_rotation_translation(
                Vec3::new(width * 0.5, 1.0, depth * 0.5),
                Quat::IDENTITY,
                Vec3::new(0.0, cfg.ground_offset, 0.0),
            ),
            MaterialId::GROUND,
            MeshId::PLANE,
        );
        groups.push(single_group(ground, MeshId::PLANE));

        let ceiling = self.push_object(
            Mat4::from_scale_rotation_translation(
                Vec3::new(width * 0.5, cfg.ceiling_thickness, depth * 0.5),
                Quat::IDENTITY,
                Vec3::new(0.0, cfg.ceiling_height + cfg.ceiling_thickness * 0.5, 0.0),
            ),
            MaterialId::CEILING,
            MeshId::CUBE,
        );
        groups.push(single_group(ceiling, MeshId::CUBE));

        let hostile_position = match self.spawn_cell {
            Some(cell) => {
                let mut p = self.grid.cell_center(cell, cfg.spacing);
                p.y = cfg.hostile_height;
                p
            }
            None => cfg.hostile_spawn,
        };
        let hostile = self.push_object(
            Mat4::from_scale_rotation_translation(
                Vec3::splat(cfg.hostile_hidden_scale),
                Quat::IDENTITY,
                hostile_position,
            ),
            MaterialId::HOSTILE,
            MeshId::CUBE,
        );
        groups.push(single_group(hostile, MeshId::CUBE));

        let mut dynamic = vec![hostile];
        dynamic.extend(self.dynamic_decorations);

        CompiledMaze {
            objects: self.objects,
            walls: self.walls,
            footprints: self.footprints,
            doors: self.doors,
            keys: self.keys,
            groups,
            ground,
            ceiling,
            hostile,
            hostile_position,
            dynamic,
            grid_size: (self.grid.cols(), self.grid.rows()),
        }
    }
}

fn single_group(index: ObjectIndex, mesh: MeshId) -> InstanceGroup {
    InstanceGroup {
        mesh,
        first: index.0,
        count: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::default_maze;
    use std::collections::BTreeSet;

    fn grid(text: &str) -> TileGrid {
        text.parse().unwrap()
    }

    /// Splitmix64 step, used to generate reproducible random grids.
    fn splitmix64(state: &mut u64) -> u64 {
        *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = *state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    fn random_grid(seed: u64, cols: usize, rows: usize) -> TileGrid {
        // Biased towards a few codes so runs actually form.
        const PALETTE: [u8; 12] = [0, 0, 0, 1, 3, 3, 10, 10, 13, 20, 23, 42];
        let mut state = seed;
        let rows: Vec<Vec<u8>> = (0..rows)
            .map(|_| {
                (0..cols)
                    .map(|_| PALETTE[(splitmix64(&mut state) % PALETTE.len() as u64) as usize])
                    .collect()
            })
            .collect();
        TileGrid::try_from_rows(&rows).unwrap()
    }

    #[test]
    fn horizontal_door_run_bound_to_key() {
        let maze = MazeCompiler::default().compile(&grid("10 10 10\n0 0 0\n20 0 0"));
        assert_eq!(maze.doors.len(), 1);
        assert_eq!(maze.keys.len(), 1);

        let door = maze.doors[0];
        assert_eq!(maze.keys[0].door_ids, vec![door.id]);
        assert_eq!(maze.footprints[door.wall.index()].len, 3);

        let volume = maze.walls[door.wall.index()];
        assert_eq!(volume.size(), Vec3::new(6.0, 3.0, 2.0));
        // Columns 0..3 of a 3-wide grid with spacing 2 are centred at -3, -1, 1.
        assert_eq!(volume.center().x, -1.0);
    }

    #[test]
    fn longer_vertical_run_wins() {
        let maze = MazeCompiler::default().compile(&grid("3 3 0\n3 0 0\n3 0 0"));
        // Vertical run of 3 from (0,0), then the lone (1,0) cell.
        assert_eq!(maze.footprints[0].axis, Axis::Vertical);
        assert_eq!(maze.footprints[0].len, 3);
        assert_eq!(maze.footprints[1].len, 1);
        assert_eq!(maze.walls.len(), 2);
    }

    #[test]
    fn tie_favours_horizontal() {
        let maze = MazeCompiler::default().compile(&grid("3 3\n3 3"));
        assert_eq!(maze.footprints.len(), 2);
        for run in &maze.footprints {
            assert_eq!(run.axis, Axis::Horizontal);
            assert_eq!(run.len, 2);
        }
    }

    #[test]
    fn plain_walls_never_merge() {
        let maze = MazeCompiler::default().compile(&grid("1 1 1"));
        assert_eq!(maze.walls.len(), 3);
        assert!(maze.footprints.iter().all(|r| r.len == 1));
    }

    #[test]
    fn different_codes_do_not_merge() {
        let maze = MazeCompiler::default().compile(&grid("10 11 10"));
        assert_eq!(maze.doors.len(), 3);
    }

    #[test]
    fn door_ids_are_monotonic() {
        let maze = MazeCompiler::default().compile(&grid("10 0 11\n0 0 0\n12 0 13"));
        let ids: Vec<u32> = maze.doors.iter().map(|d| d.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn key_opens_every_door_with_bound_code() {
        let maze = MazeCompiler::default().compile(&grid("13 0 13\n0 23 0\n11 0 0"));
        assert_eq!(maze.doors.len(), 3);
        let key = &maze.keys[0];
        assert_eq!(key.door_ids, vec![DoorId(0), DoorId(1)]);
    }

    #[test]
    fn unbound_key_gets_empty_relation() {
        let maze = MazeCompiler::default()
            .with_bindings(&[])
            .compile(&grid("10 20"));
        assert_eq!(maze.keys.len(), 1);
        assert!(maze.keys[0].door_ids.is_empty());

        let maze = MazeCompiler::default().compile(&grid("0 20"));
        assert!(maze.keys[0].door_ids.is_empty());
    }

    #[test]
    fn key_geometry() {
        let maze = MazeCompiler::default().compile(&grid("20"));
        let key = &maze.keys[0];
        assert_eq!(key.bounds.center(), Vec3::new(-1.0, 2.5, -1.0));
        assert_eq!(key.bounds.size(), Vec3::splat(1.0));
        assert_eq!(maze.objects[key.object.index()].material, MaterialId(19));
    }

    #[test]
    fn wall_volume_spans_ground_to_height() {
        let maze = MazeCompiler::default().compile(&grid("1"));
        let wall = maze.walls[0];
        assert_eq!(wall.min.y, 0.0);
        assert_eq!(wall.max.y, 3.0);
        let obj = maze.objects[0];
        assert!((obj.translation().y - 2.8).abs() < 1e-6);
    }

    #[test]
    fn empty_tiles_never_emitted() {
        let maze = MazeCompiler::default().compile(&grid("0 0\n0 0"));
        assert!(maze.walls.is_empty());
        // Only ground, ceiling and hostile.
        assert_eq!(maze.objects.len(), 3);
        assert_eq!(maze.groups[0].count, 0);
    }

    #[test]
    fn trailing_groups_hold_one_instance_each() {
        let maze = MazeCompiler::default().compile(&grid("1 10\n20 3"));
        assert_eq!(maze.groups.len(), 4);
        assert_eq!(maze.groups[0].range(), 0..4);
        assert_eq!(maze.groups[1].mesh, MeshId::PLANE);
        assert_eq!(maze.groups[1].range(), maze.ground.0..maze.ground.0 + 1);
        assert_eq!(maze.groups[2].range(), maze.ceiling.0..maze.ceiling.0 + 1);
        assert_eq!(maze.groups[3].range(), maze.hostile.0..maze.hostile.0 + 1);
        assert_eq!(maze.dynamic, vec![maze.hostile]);
    }

    #[test]
    fn hostile_spawn_marker() {
        let maze = MazeCompiler::default().compile(&grid("0 18\n0 0"));
        assert_eq!(maze.hostile_position, Vec3::new(0.0, 3.0, -2.0));
        assert!(maze.walls.is_empty());

        let maze = MazeCompiler::default().compile(&grid("0 0"));
        assert_eq!(maze.hostile_position, Vec3::new(0.0, 3.0, -20.0));
    }

    #[test]
    fn unknown_codes_are_skipped() {
        let maze = MazeCompiler::default().compile(&grid("42 1"));
        assert_eq!(maze.walls.len(), 1);
    }

    #[test]
    fn dynamic_decorations_follow_hostile() {
        let config = MazeConfig {
            dynamic_codes: vec![19],
            ..MazeConfig::default()
        };
        let maze = MazeCompiler::new(config).compile(&grid("19 0 19"));
        assert_eq!(maze.dynamic.len(), 3);
        assert_eq!(maze.dynamic[0], maze.hostile);
    }

    #[test]
    fn volume_count_matches_structural_instances() {
        for seed in 0..64 {
            let maze = MazeCompiler::default().compile(&random_grid(seed, 9, 7));
            let structural = maze.groups[0].count as usize - maze.keys.len();
            assert_eq!(maze.walls.len(), structural, "seed {seed}");
            assert_eq!(maze.footprints.len(), maze.walls.len());
        }
    }

    #[test]
    fn footprints_cover_structural_cells_exactly() {
        for seed in 0..64 {
            let g = random_grid(seed, 9, 7);
            let maze = MazeCompiler::default().compile(&g);

            let mut covered = BTreeSet::new();
            for run in &maze.footprints {
                let code = g.get(run.origin.x, run.origin.z);
                for cell in run.cells() {
                    assert_eq!(g.get(cell.x, cell.z), code, "run mixes codes, seed {seed}");
                    assert!(covered.insert(cell), "overlapping runs, seed {seed}");
                }
            }

            let expected: BTreeSet<CellCoord> = g
                .cells()
                .filter(|&(_, _, code)| {
                    matches!(
                        TileKind::classify(code),
                        TileKind::Wall | TileKind::Door(_) | TileKind::Decoration(_)
                    )
                })
                .map(|(x, z, _)| CellCoord::new(x, z))
                .collect();
            assert_eq!(covered, expected, "seed {seed}");
        }
    }

    #[test]
    fn merged_volume_matches_footprint_extent() {
        for seed in 0..32 {
            let maze = MazeCompiler::default().compile(&random_grid(seed, 8, 8));
            for (wall, run) in maze.walls.iter().zip(&maze.footprints) {
                let size = wall.size();
                let cells = (size.x / 2.0).round() as usize * (size.z / 2.0).round() as usize;
                assert_eq!(cells, run.len);
            }
        }
    }

    #[test]
    fn compile_is_deterministic() {
        let g = random_grid(7, 12, 12);
        let compiler = MazeCompiler::default();
        let a = compiler.compile(&g);
        let b = compiler.compile(&g);
        assert_eq!(a.doors, b.doors);
        assert_eq!(a.keys, b.keys);
        assert_eq!(a.walls, b.walls);
        assert_eq!(a, b);
    }

    #[test]
    fn key_door_ids_reference_existing_doors() {
        for seed in 0..32 {
            let maze = MazeCompiler::default().compile(&random_grid(seed, 10, 10));
            for key in &maze.keys {
                for id in &key.door_ids {
                    assert!(maze.door(*id).is_some());
                }
            }
            let objects: BTreeSet<ObjectIndex> = maze.doors.iter().map(|d| d.object).collect();
            assert_eq!(objects.len(), maze.doors.len());
        }
    }

    #[test]
    fn default_maze_tables() {
        let maze = MazeCompiler::default().compile(&default_maze());
        assert_eq!(maze.doors.len(), 9);
        assert_eq!(maze.keys.len(), 8);
        let key_23 = maze.keys.iter().find(|k| k.code == 23).unwrap();
        assert_eq!(key_23.door_ids.len(), 2);
        for key in &maze.keys {
            assert!(!key.door_ids.is_empty(), "key {} opens nothing", key.code);
        }
    }
}
