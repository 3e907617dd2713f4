use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mt1d_rs::discretization::generator::{build_skin_depth_mesh, SkinDepthMeshParams};
use mt1d_rs::discretization::operators::DifferentialOperators;
use mt1d_rs::numerics::forward::compute_fields;
use mt1d_rs::physics::angular_frequency;
use mt1d_rs::physics::system::SystemAssembler;
use mt1d_rs::{logspace_frequencies, DenseLu, EarthModel, ElectricFieldBoundary, LinearSolver, Mesh1D};

/// Cells per skin depth; the mesh grows roughly linearly with it.
fn resolutions() -> Vec<f64> {
    vec![5.0, 10.0, 20.0]
}

fn mesh(cells_per_skin_depth: f64) -> Mesh1D {
    let params = SkinDepthMeshParams::new(0.1, 1e-2, 1e2)
        .with_cells_per_skin_depth(cells_per_skin_depth)
        .with_padding_skin_depths(2.0)
        .with_core_depth(3000.0);
    build_skin_depth_mesh(&params).expect("valid mesh parameters")
}

fn assembler(mesh: &Mesh1D) -> SystemAssembler {
    SystemAssembler::new(
        mesh,
        &EarthModel::halfspace(mesh, 0.1),
        &ElectricFieldBoundary::default(),
    )
    .expect("model fits mesh")
}

fn bench_operators(c: &mut Criterion) {
    let mut group = c.benchmark_group("operators");
    for &res in &resolutions() {
        let mesh = mesh(res);
        group.bench_with_input(BenchmarkId::from_parameter(mesh.n_cells()), &mesh, |b, mesh| {
            b.iter(|| {
                let ops = DifferentialOperators::new(mesh, &ElectricFieldBoundary::default());
                std::hint::black_box(ops.grad.nnz());
            });
        });
    }
    group.finish();
}

fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly");
    for &res in &resolutions() {
        let mesh = mesh(res);
        let asm = assembler(&mesh);
        let omega = angular_frequency(1.0);
        group.bench_with_input(BenchmarkId::from_parameter(mesh.n_cells()), &asm, |b, asm| {
            b.iter(|| std::hint::black_box(asm.matrix(omega).nnz()));
        });
    }
    group.finish();
}

fn bench_factorization(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense_lu");
    group.sample_size(20);
    for &res in &resolutions() {
        let mesh = mesh(res);
        let matrix = assembler(&mesh).matrix(angular_frequency(1.0));
        group.bench_with_input(BenchmarkId::from_parameter(mesh.n_cells()), &matrix, |b, m| {
            b.iter(|| {
                let factor = DenseLu::default().factorize(m).expect("nonsingular");
                std::hint::black_box(factor);
            });
        });
    }
    group.finish();
}

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward_sweep");
    group.sample_size(10);
    let freqs = logspace_frequencies(1e-2, 1e2, 4);
    for &res in &resolutions() {
        let mesh = mesh(res);
        let asm = assembler(&mesh);
        group.bench_with_input(BenchmarkId::from_parameter(mesh.n_cells()), &asm, |b, asm| {
            b.iter(|| {
                let sol = compute_fields(asm, &freqs, &DenseLu::default()).expect("solve");
                std::hint::black_box(sol.fields().ncols());
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_operators,
    bench_assembly,
    bench_factorization,
    bench_sweep
);
criterion_main!(benches);
