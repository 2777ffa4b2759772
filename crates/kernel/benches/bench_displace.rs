use std::hint::black_box;
use std::time::{Duration, Instant};

use clothwave_kernel::{ClothMesh, SimplexField, Wave};

fn bench_displace(segments: u32, iterations: usize) {
    let field = SimplexField::new(0);
    let wave = Wave::default();
    let mut mesh = ClothMesh::new(5.0, 8.0, segments).expect("valid grid");

    let start = Instant::now();
    for i in 0..iterations {
        let offset = wave.offset(Duration::from_millis(i as u64 * 16));
        wave.displace(black_box(&mut mesh), black_box(&field), offset);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  displace ({segments} segments, {} vertices, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}",
        mesh.vertex_count()
    );
}

fn bench_normals(segments: u32, iterations: usize) {
    let mut mesh = ClothMesh::new(5.0, 8.0, segments).expect("valid grid");
    mesh.set_heights(|x, y| (x * 2.0).sin() * y.cos());

    let start = Instant::now();
    for _ in 0..iterations {
        black_box(&mut mesh).compute_vertex_normals();
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  normals ({segments} segments, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Cloth Displacement Benchmarks ===\n");

    println!("Noise displacement + normals:");
    bench_displace(25, 1000);
    bench_displace(100, 200);
    bench_displace(250, 20);

    println!("\nNormals only:");
    bench_normals(100, 500);
    bench_normals(250, 50);

    println!("\n=== Done ===");
}
