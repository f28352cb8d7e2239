use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use labyrinth_common::{Aabb, MeshId};
use labyrinth_input::{Action, FrameInput};
use labyrinth_kernel::{FrameSimulator, SceneEvent, Tuning};
use labyrinth_maze::{CompiledMaze, DoorSpec, KeySpec, MazeCompiler, default_maze};
use labyrinth_render::{
    DebugTextRenderer, RecordingBackend, RenderCall, RenderView, Renderer, SceneGeometry,
    prepare_scene, submit_frame,
};
use labyrinth_tools::SceneInspector;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "labyrinth-cli", about = "CLI tool for the labyrinth maze game")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML tuning file overriding the built-in constants
    #[arg(long, global = true)]
    tuning: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Compile the built-in maze and report the tables
    Compile {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the gameplay loop headless, walking forward
    Simulate {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "600")]
        ticks: u64,
        /// Seconds per tick
        #[arg(long, default_value = "0.016666668")]
        dt: f32,
        /// Yaw input per tick, in look units
        #[arg(long, default_value = "0")]
        turn: f32,
        /// Unlock every door on the first tick
        #[arg(long)]
        open_all: bool,
    },
    /// Print a debug-text frame and the draw calls a backend would receive
    Render {
        /// Ticks to simulate before rendering
        #[arg(short, long, default_value = "0")]
        ticks: u64,
    },
}

#[derive(Serialize)]
struct CompileReport<'a> {
    rows: usize,
    cols: usize,
    objects: usize,
    walls: usize,
    groups: usize,
    hostile_position: [f32; 3],
    doors: &'a [DoorSpec],
    keys: &'a [KeySpec],
    unbound_keys: Vec<u8>,
}

impl<'a> CompileReport<'a> {
    fn new(maze: &'a CompiledMaze) -> Self {
        Self {
            rows: maze.grid_size.1,
            cols: maze.grid_size.0,
            objects: maze.objects.len(),
            walls: maze.walls.len(),
            groups: maze.groups.len(),
            hostile_position: maze.hostile_position.to_array(),
            doors: &maze.doors,
            keys: &maze.keys,
            unbound_keys: maze
                .keys
                .iter()
                .filter(|k| k.door_ids.is_empty())
                .map(|k| k.code)
                .collect(),
        }
    }
}

fn load_tuning(path: Option<&Path>) -> anyhow::Result<Tuning> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading tuning file {}", path.display()))?;
    let tuning = Tuning::from_yaml_str(&text)
        .with_context(|| format!("parsing tuning file {}", path.display()))?;
    tracing::info!(path = %path.display(), "tuning loaded");
    Ok(tuning)
}

fn compile(tuning: &Tuning) -> CompiledMaze {
    MazeCompiler::new(tuning.maze.clone())
        .with_mesh_layout(SceneGeometry::new().layout)
        .compile(&default_maze())
}

fn log_events(events: &[SceneEvent], tick: u64) {
    for event in events {
        tracing::info!(tick, ?event, "scene event");
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let tuning = load_tuning(cli.tuning.as_deref())?;

    match cli.command {
        Commands::Info => {
            println!("labyrinth-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("maze: {}", labyrinth_maze::crate_info());
            println!("render: {}", labyrinth_render::crate_info());
            println!("tools: {}", labyrinth_tools::crate_info());
            let grid = default_maze();
            println!("default maze: {} x {}", grid.rows(), grid.cols());
        }
        Commands::Compile { json } => {
            let maze = compile(&tuning);
            let report = CompileReport::new(&maze);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Compiled {}x{} grid: objects={} walls={} groups={}",
                    report.rows, report.cols, report.objects, report.walls, report.groups
                );
                let [hx, hy, hz] = report.hostile_position;
                println!("Hostile spawn: ({hx:.2}, {hy:.2}, {hz:.2})");
                for door in report.doors {
                    let wall: &Aabb = &maze.walls[door.wall.index()];
                    let c = wall.center();
                    println!(
                        "  door #{} code={} at ({:.2}, {:.2})",
                        door.id.0, door.code, c.x, c.z
                    );
                }
                for key in report.keys {
                    let ids: Vec<u32> = key.door_ids.iter().map(|d| d.0).collect();
                    println!("  key code={} opens {:?}", key.code, ids);
                }
                if !report.unbound_keys.is_empty() {
                    println!("Unbound keys: {:?}", report.unbound_keys);
                }
            }
        }
        Commands::Simulate {
            ticks,
            dt,
            turn,
            open_all,
        } => {
            let mut sim = FrameSimulator::new(compile(&tuning), tuning.game.clone());
            sim.apply(Action::DismissStartScreen);
            if open_all {
                sim.request_open_all();
            }

            let mut input = FrameInput::forward();
            input.look.x = turn;
            for _ in 0..ticks {
                sim.tick(&input, dt);
                let events = sim.drain_events();
                log_events(&events, sim.tick_count());
                if sim.player().game_over {
                    break;
                }
            }
            println!("{}", SceneInspector::summary(&sim));
            println!(
                "Hostile distance: {:.2}",
                SceneInspector::hostile_distance(&sim)
            );
        }
        Commands::Render { ticks } => {
            let mut sim = FrameSimulator::new(compile(&tuning), tuning.game.clone()).playing();
            for _ in 0..ticks {
                sim.tick(&FrameInput::idle(), 1.0 / 60.0);
            }

            let view = RenderView::from_player(sim.player());
            print!("{}", DebugTextRenderer::new().render(&sim, &view));

            let geometry = SceneGeometry::new();
            let mut backend = RecordingBackend::new();
            let mesh = prepare_scene(&mut backend, &geometry);
            backend.clear();
            submit_frame(
                &mut backend,
                mesh,
                &geometry.layout,
                sim.instances(),
                sim.scene().groups(),
            );
            for call in backend.draw_calls() {
                if let RenderCall::Draw {
                    range, instances, ..
                } = call
                {
                    let kind = if *range == geometry.layout.range(MeshId::CUBE) {
                        "cube"
                    } else {
                        "plane"
                    };
                    println!(
                        "draw {kind}: indices={} instances={}..{}",
                        range.num_indices, instances.start, instances.end
                    );
                }
            }
        }
    }

    Ok(())
}
