use crate::discretization::mesh::Mesh1D;
use crate::discretization::operators::{apply, DifferentialOperators};
use crate::physics::bc::ElectricFieldBoundary;
use crate::physics::model::{EarthModel, ModelError};
use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use num_complex::Complex64;

/// Builds the per-frequency block system of the 1-D MT problem.
///
/// Unknowns are `[Ex; Hy]` with `Ex` on the `nC` cell centres and `Hy` on the
/// `nC+1` nodes:
///
/// ```text
/// | Grad        iω M_mu | | Ex |   | -B Ex_bc |
/// | M_sigma     Div     | | Hy | = |    0     |
/// ```
///
/// Only the `iω M_mu` block depends on the frequency, so the operators, the
/// material diagonals and the right-hand side are prepared once.
#[derive(Debug, Clone)]
pub struct SystemAssembler {
    n_cells: usize,
    operators: DifferentialOperators,
    mu_faces: Vec<f64>,
    sigma_hat: Vec<Complex64>,
    rhs: DVector<Complex64>,
}

impl SystemAssembler {
    pub fn new(
        mesh: &Mesh1D,
        model: &EarthModel,
        boundary: &ElectricFieldBoundary,
    ) -> Result<Self, ModelError> {
        model.check_against(mesh)?;

        let operators = DifferentialOperators::new(mesh, boundary);
        let mu_faces = apply(&operators.ave_cc_to_face, &model.cell_permeability());

        let n = mesh.n_cells();
        let b_ex = apply(&operators.grad_bc, &boundary.values());
        let mut rhs = DVector::from_element(2 * n + 1, Complex64::new(0.0, 0.0));
        for (j, value) in b_ex.iter().enumerate() {
            rhs[j] = Complex64::new(-value, 0.0);
        }

        Ok(Self {
            n_cells: n,
            operators,
            mu_faces,
            sigma_hat: model.conductivity().to_vec(),
            rhs,
        })
    }

    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// Number of unknowns, `2 nC + 1`.
    pub fn dimension(&self) -> usize {
        2 * self.n_cells + 1
    }

    pub fn operators(&self) -> &DifferentialOperators {
        &self.operators
    }

    /// Right-hand side; identical for every frequency.
    pub fn rhs(&self) -> &DVector<Complex64> {
        &self.rhs
    }

    /// System matrix at angular frequency `omega`.
    pub fn matrix(&self, omega: f64) -> CsrMatrix<Complex64> {
        let n = self.n_cells;
        let n_faces = n + 1;
        let dim = self.dimension();
        let ops = &self.operators;
        let mut coo = CooMatrix::new(dim, dim);

        // Faraday rows: Grad Ex + iω M_mu Hy
        for (i, j, g) in ops.grad.triplet_iter() {
            coo.push(i, j, Complex64::new(*g, 0.0));
        }
        for (j, mu) in self.mu_faces.iter().enumerate() {
            coo.push(j, n + j, Complex64::new(0.0, omega * mu));
        }

        // Ampère rows: M_sigma Ex + Div Hy
        for (i, sigma) in self.sigma_hat.iter().enumerate() {
            coo.push(n_faces + i, i, *sigma);
        }
        for (i, j, d) in ops.div.triplet_iter() {
            coo.push(n_faces + i, n + j, Complex64::new(*d, 0.0));
        }

        CsrMatrix::from(&coo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{angular_frequency, MU_0};

    fn assembler() -> SystemAssembler {
        let mesh = Mesh1D::from_widths(vec![40.0, 20.0, 10.0, 10.0]).unwrap();
        let model = EarthModel::halfspace(&mesh, 0.05);
        SystemAssembler::new(&mesh, &model, &ElectricFieldBoundary::default()).unwrap()
    }

    #[test]
    fn dimensions_are_consistent_for_every_frequency() {
        let asm = assembler();
        assert_eq!(asm.dimension(), 9);
        assert_eq!(asm.rhs().len(), 9);
        for f in [1e-3, 1.0, 1e3] {
            let a = asm.matrix(angular_frequency(f));
            assert_eq!((a.nrows(), a.ncols()), (9, 9));
        }
    }

    #[test]
    fn rhs_carries_unit_surface_field() {
        let asm = assembler();
        let rhs = asm.rhs();
        // Only the surface face sees the source: -(2 / h_top) * 1
        for (i, value) in rhs.iter().enumerate() {
            if i == 4 {
                assert!((value.re + 2.0 / 10.0).abs() < 1e-15);
            } else {
                assert_eq!(*value, Complex64::new(0.0, 0.0));
            }
        }
    }

    #[test]
    fn only_the_permeability_block_changes_with_frequency() {
        let asm = assembler();
        let a1 = asm.matrix(1.0);
        let a2 = asm.matrix(3.0);
        assert_eq!(a1.nnz(), a2.nnz());
        for ((i, j, x), (_, _, y)) in a1.triplet_iter().zip(a2.triplet_iter()) {
            let in_mu_block = i <= 4 && j >= 4 && j - 4 == i;
            if in_mu_block {
                assert!((y.im - 3.0 * x.im).abs() < 1e-18);
                assert!(x.im > 0.0);
            } else {
                assert_eq!(x, y);
            }
        }
        // Boundary faces average the permeability with a full cell.
        let diag: Vec<f64> = a1
            .triplet_iter()
            .filter(|(i, j, _)| *i <= 4 && *j == *i + 4)
            .map(|(_, _, v)| v.im)
            .collect();
        assert!(diag.iter().all(|m| (m - MU_0).abs() < 1e-20));
    }

    #[test]
    fn model_must_fit_mesh() {
        let mesh = Mesh1D::from_widths(vec![1.0, 1.0]).unwrap();
        let model = EarthModel::from_conductivity(&[0.1, 0.1, 0.1]);
        assert!(SystemAssembler::new(&mesh, &model, &ElectricFieldBoundary::default()).is_err());
    }
}
