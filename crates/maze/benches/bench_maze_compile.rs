use std::hint::black_box;
use std::time::Instant;

use labyrinth_maze::{MazeCompiler, TileGrid, default_maze};

/// Grid of alternating wall rows and long door runs.
fn striped_grid(cols: usize, rows: usize) -> TileGrid {
    let rows: Vec<Vec<u8>> = (0..rows)
        .map(|z| match z % 4 {
            0 => vec![1; cols],
            2 => (0..cols).map(|x| if x % 8 < 6 { 10 } else { 0 }).collect(),
            _ => (0..cols).map(|x| if x % 16 == 0 { 20 } else { 0 }).collect(),
        })
        .collect();
    TileGrid::try_from_rows(&rows).expect("striped grid is rectangular")
}

fn bench_compile(label: &str, grid: &TileGrid, iterations: usize) {
    let compiler = MazeCompiler::default();
    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(compiler.compile(black_box(grid)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  compile {label} ({}x{}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}",
        grid.cols(),
        grid.rows()
    );
}

fn main() {
    println!("=== Maze Compile Benchmarks ===\n");

    println!("Default maze:");
    bench_compile("default", &default_maze(), 1000);

    println!("\nStriped grids:");
    bench_compile("striped", &striped_grid(64, 64), 1000);
    bench_compile("striped", &striped_grid(256, 256), 100);
    bench_compile("striped", &striped_grid(1024, 1024), 10);

    println!("\n=== Done ===");
}
