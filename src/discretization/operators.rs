use super::mesh::Mesh1D;
use crate::physics::bc::{ElectricFieldBoundary, Side};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

/// Discrete differential operators of a 1-D tensor mesh.
///
/// Built once per mesh and boundary model; every frequency reuses them.
#[derive(Debug, Clone)]
pub struct DifferentialOperators {
    /// Cell-centred to face gradient, `(nC+1) x nC`.
    pub grad: CsrMatrix<f64>,
    /// Boundary restriction of the gradient, `(nC+1) x 2`.
    pub grad_bc: CsrMatrix<f64>,
    /// Face to cell-centred divergence, `nC x (nC+1)`.
    pub div: CsrMatrix<f64>,
    /// Cell-centred to face averaging, `(nC+1) x nC`.
    pub ave_cc_to_face: CsrMatrix<f64>,
}

impl DifferentialOperators {
    pub fn new(mesh: &Mesh1D, boundary: &ElectricFieldBoundary) -> Self {
        Self {
            grad: cell_gradient(mesh, boundary),
            grad_bc: cell_gradient_bc(mesh, boundary),
            div: face_divergence(mesh),
            ave_cc_to_face: average_cell_to_face(mesh),
        }
    }
}

/// Length associated with each face: half of each neighbour, a full cell on
/// the boundary.
pub fn face_lengths(mesh: &Mesh1D) -> Vec<f64> {
    let h = mesh.widths();
    let n = h.len();
    let mut v = Vec::with_capacity(n + 1);
    v.push(h[0]);
    v.extend(h.windows(2).map(|pair| 0.5 * (pair[0] + pair[1])));
    v.push(h[n - 1]);
    v
}

pub fn cell_gradient(mesh: &Mesh1D, boundary: &ElectricFieldBoundary) -> CsrMatrix<f64> {
    let n = mesh.n_cells();
    let v = face_lengths(mesh);
    let mut coo = CooMatrix::new(n + 1, n);

    // Half-cell one-sided differences against the boundary value.
    if boundary.is_dirichlet(Side::Bottom) {
        coo.push(0, 0, 2.0 / v[0]);
    }
    for j in 1..n {
        coo.push(j, j - 1, -1.0 / v[j]);
        coo.push(j, j, 1.0 / v[j]);
    }
    if boundary.is_dirichlet(Side::Top) {
        coo.push(n, n - 1, -2.0 / v[n]);
    }
    CsrMatrix::from(&coo)
}

/// Maps `[Ex_bottom, Ex_top]` onto the boundary faces so that
/// `grad * u + grad_bc * bc` is the full gradient.
pub fn cell_gradient_bc(mesh: &Mesh1D, boundary: &ElectricFieldBoundary) -> CsrMatrix<f64> {
    let n = mesh.n_cells();
    let v = face_lengths(mesh);
    let mut coo = CooMatrix::new(n + 1, 2);
    if boundary.is_dirichlet(Side::Bottom) {
        coo.push(0, 0, -2.0 / v[0]);
    }
    if boundary.is_dirichlet(Side::Top) {
        coo.push(n, 1, 2.0 / v[n]);
    }
    CsrMatrix::from(&coo)
}

pub fn face_divergence(mesh: &Mesh1D) -> CsrMatrix<f64> {
    let n = mesh.n_cells();
    let mut coo = CooMatrix::new(n, n + 1);
    for (i, h) in mesh.widths().iter().enumerate() {
        coo.push(i, i, -1.0 / h);
        coo.push(i, i + 1, 1.0 / h);
    }
    CsrMatrix::from(&coo)
}

pub fn average_cell_to_face(mesh: &Mesh1D) -> CsrMatrix<f64> {
    let n = mesh.n_cells();
    let mut coo = CooMatrix::new(n + 1, n);
    coo.push(0, 0, 1.0);
    for j in 1..n {
        coo.push(j, j - 1, 0.5);
        coo.push(j, j, 0.5);
    }
    coo.push(n, n - 1, 1.0);
    CsrMatrix::from(&coo)
}

/// `y = A x` for a real sparse operator.
pub fn apply(op: &CsrMatrix<f64>, x: &[f64]) -> Vec<f64> {
    assert_eq!(op.ncols(), x.len(), "operator/vector size mismatch");
    let mut y = vec![0.0; op.nrows()];
    for (i, j, a) in op.triplet_iter() {
        y[i] += a * x[j];
    }
    y
}
