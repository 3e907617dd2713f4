use mt1d_rs::discretization::generator::SkinDepthMeshParams;
use mt1d_rs::{
    build_skin_depth_mesh, compute_fields, DenseLu, ElectricFieldBoundary, Layer, LayeredEarth,
    Sounding,
};
use mt1d_rs::physics::system::SystemAssembler;

// 10 Ohm.m over 1000 Ohm.m: the sounding curve should read the top layer at
// high frequency and the basement at low frequency.
#[test]
fn two_layer_asymptotes() {
    let params = SkinDepthMeshParams::new(0.1, 1e-4, 1e3)
        .with_core_depth(1000.0)
        .with_cells_per_skin_depth(5.0)
        .with_padding_skin_depths(20.0);
    let mesh = build_skin_depth_mesh(&params).unwrap();
    assert_eq!(mesh.n_cells(), 143);

    let earth = LayeredEarth::new(
        vec![Layer {
            thickness: 200.0,
            conductivity: 0.1,
        }],
        0.001,
    );
    let model = earth.to_model(&mesh).unwrap();

    let assembler =
        SystemAssembler::new(&mesh, &model, &ElectricFieldBoundary::default()).unwrap();
    let solution = compute_fields(&assembler, &[1e-4, 1e3], &DenseLu::default()).unwrap();
    let sounding = Sounding::from_solution(&solution);

    let low = sounding.apparent_resistivity[0];
    let high = sounding.apparent_resistivity[1];
    assert!((high - 10.0).abs() / 10.0 < 0.02, "rho_a(1 kHz) = {high}");
    assert!((low - 1000.0).abs() / 1000.0 < 0.02, "rho_a(0.1 mHz) = {low}");
}

#[test]
fn sounding_curve_rises_into_the_resistive_basement() {
    let params = SkinDepthMeshParams::new(0.1, 1e-3, 1e2)
        .with_core_depth(1000.0)
        .with_cells_per_skin_depth(5.0)
        .with_padding_skin_depths(10.0);
    let mesh = build_skin_depth_mesh(&params).unwrap();
    let earth = LayeredEarth::new(
        vec![Layer {
            thickness: 200.0,
            conductivity: 0.1,
        }],
        0.001,
    );
    let model = earth.to_model(&mesh).unwrap();
    let assembler =
        SystemAssembler::new(&mesh, &model, &ElectricFieldBoundary::default()).unwrap();

    let freqs = mt1d_rs::logspace_frequencies(1e-3, 1e2, 1);
    let solution = compute_fields(&assembler, &freqs, &DenseLu::default()).unwrap();
    let sounding = Sounding::from_solution(&solution);

    // Lower frequency sees deeper, more resistive ground.
    assert!(sounding.apparent_resistivity[0] > 10.0 * sounding.apparent_resistivity[5]);
    assert!(sounding.phase.iter().all(|p| *p > 0.0 && *p < 90.0));
}
