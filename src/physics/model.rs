use crate::discretization::mesh::Mesh1D;
use crate::physics::MU_0;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("model has {found} cells but the mesh has {expected}")]
    CellCountMismatch { expected: usize, found: usize },
    #[error("permeability has {found} entries but the mesh has {expected} cells")]
    PermeabilityCountMismatch { expected: usize, found: usize },
    #[error("non-finite conductivity in cell {index}")]
    NonFiniteConductivity { index: usize },
    #[error("resistivity must be positive, got {value} in cell {index}")]
    NonPositiveResistivity { index: usize, value: f64 },
    #[error("permeability must be positive, got {value}")]
    NonPositivePermeability { value: f64 },
    #[error("layer {index} has invalid thickness {thickness}")]
    InvalidLayer { index: usize, thickness: f64 },
}

/// Magnetic permeability (H/m), either one value everywhere or one per cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Permeability {
    Uniform(f64),
    PerCell(Vec<f64>),
}

impl Default for Permeability {
    fn default() -> Self {
        Permeability::Uniform(MU_0)
    }
}

/// Physical properties of every cell of a 1-D mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct EarthModel {
    conductivity: Vec<Complex64>,
    permeability: Permeability,
}

impl EarthModel {
    pub fn from_conductivity(sigma: &[f64]) -> Self {
        Self::from_complex_conductivity(sigma.iter().map(|&s| Complex64::new(s, 0.0)).collect())
    }

    /// Complex `σ̂` lets callers fold displacement currents or losses in.
    pub fn from_complex_conductivity(sigma_hat: Vec<Complex64>) -> Self {
        Self {
            conductivity: sigma_hat,
            permeability: Permeability::default(),
        }
    }

    pub fn from_resistivity(rho: &[f64]) -> Result<Self, ModelError> {
        if let Some((index, &value)) = rho
            .iter()
            .enumerate()
            .find(|(_, r)| !(r.is_finite() && **r > 0.0))
        {
            return Err(ModelError::NonPositiveResistivity { index, value });
        }
        let sigma: Vec<f64> = rho.iter().map(|r| 1.0 / r).collect();
        Ok(Self::from_conductivity(&sigma))
    }

    pub fn halfspace(mesh: &Mesh1D, sigma: f64) -> Self {
        Self::from_conductivity(&vec![sigma; mesh.n_cells()])
    }

    pub fn with_permeability(mut self, permeability: Permeability) -> Self {
        self.permeability = permeability;
        self
    }

    pub fn n_cells(&self) -> usize {
        self.conductivity.len()
    }

    pub fn conductivity(&self) -> &[Complex64] {
        &self.conductivity
    }

    pub fn permeability(&self) -> &Permeability {
        &self.permeability
    }

    /// Permeability expanded to one value per cell.
    pub fn cell_permeability(&self) -> Vec<f64> {
        match &self.permeability {
            Permeability::Uniform(mu) => vec![*mu; self.n_cells()],
            Permeability::PerCell(mu) => mu.clone(),
        }
    }

    /// Make sure the model fits `mesh` and holds physical values.
    pub fn check_against(&self, mesh: &Mesh1D) -> Result<(), ModelError> {
        let expected = mesh.n_cells();
        if self.n_cells() != expected {
            return Err(ModelError::CellCountMismatch {
                expected,
                found: self.n_cells(),
            });
        }
        if let Some(index) = self
            .conductivity
            .iter()
            .position(|s| !(s.re.is_finite() && s.im.is_finite()))
        {
            return Err(ModelError::NonFiniteConductivity { index });
        }
        match &self.permeability {
            Permeability::Uniform(mu) => check_mu(*mu)?,
            Permeability::PerCell(mu) => {
                if mu.len() != expected {
                    return Err(ModelError::PermeabilityCountMismatch {
                        expected,
                        found: mu.len(),
                    });
                }
                for &m in mu {
                    check_mu(m)?;
                }
            }
        }
        Ok(())
    }
}

fn check_mu(mu: f64) -> Result<(), ModelError> {
    if mu.is_finite() && mu > 0.0 {
        Ok(())
    } else {
        Err(ModelError::NonPositivePermeability { value: mu })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Thickness (m).
    pub thickness: f64,
    /// Conductivity (S/m).
    pub conductivity: f64,
}

/// Stack of horizontal layers over a half-space basement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayeredEarth {
    /// Layers from the surface downwards.
    pub layers: Vec<Layer>,
    pub basement_conductivity: f64,
}

impl LayeredEarth {
    pub fn new(layers: Vec<Layer>, basement_conductivity: f64) -> Self {
        Self {
            layers,
            basement_conductivity,
        }
    }

    /// Conductivity at `depth` below the surface. Interfaces belong to the
    /// layer underneath.
    pub fn conductivity_at(&self, depth: f64) -> f64 {
        let mut bottom = 0.0;
        for layer in &self.layers {
            bottom += layer.thickness;
            if depth < bottom {
                return layer.conductivity;
            }
        }
        self.basement_conductivity
    }

    /// Sample the layers at the cell-centre depths of `mesh`.
    pub fn to_model(&self, mesh: &Mesh1D) -> Result<EarthModel, ModelError> {
        for (index, layer) in self.layers.iter().enumerate() {
            if !(layer.thickness.is_finite() && layer.thickness > 0.0) {
                return Err(ModelError::InvalidLayer {
                    index,
                    thickness: layer.thickness,
                });
            }
        }
        let sigma: Vec<f64> = mesh
            .cell_center_depths()
            .into_iter()
            .map(|d| self.conductivity_at(d))
            .collect();
        let model = EarthModel::from_conductivity(&sigma);
        model.check_against(mesh)?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resistivity_is_reciprocal_of_conductivity() {
        let model = EarthModel::from_resistivity(&[10.0, 1000.0]).unwrap();
        assert_eq!(model.conductivity()[0], Complex64::new(0.1, 0.0));
        assert!((model.conductivity()[1].re - 1e-3).abs() < 1e-18);
        assert_eq!(
            EarthModel::from_resistivity(&[10.0, 0.0]),
            Err(ModelError::NonPositiveResistivity {
                index: 1,
                value: 0.0
            })
        );
    }

    #[test]
    fn layers_map_onto_cell_centres() {
        let mesh = Mesh1D::from_widths(vec![100.0, 50.0, 50.0, 10.0, 10.0]).unwrap();
        // Cell-centre depths: 170, 95, 45, 15, 5
        let earth = LayeredEarth::new(
            vec![
                Layer {
                    thickness: 20.0,
                    conductivity: 0.1,
                },
                Layer {
                    thickness: 80.0,
                    conductivity: 0.01,
                },
            ],
            0.001,
        );
        let model = earth.to_model(&mesh).unwrap();
        let sigma: Vec<f64> = model.conductivity().iter().map(|s| s.re).collect();
        assert_eq!(sigma, vec![0.001, 0.01, 0.01, 0.1, 0.1]);
    }

    #[test]
    fn size_and_value_checks() {
        let mesh = Mesh1D::from_widths(vec![1.0, 1.0]).unwrap();
        let short = EarthModel::from_conductivity(&[0.1]);
        assert_eq!(
            short.check_against(&mesh),
            Err(ModelError::CellCountMismatch {
                expected: 2,
                found: 1
            })
        );

        let model = EarthModel::halfspace(&mesh, 0.1)
            .with_permeability(Permeability::PerCell(vec![MU_0]));
        assert!(matches!(
            model.check_against(&mesh),
            Err(ModelError::PermeabilityCountMismatch { .. })
        ));

        let model = EarthModel::halfspace(&mesh, f64::NAN);
        assert_eq!(
            model.check_against(&mesh),
            Err(ModelError::NonFiniteConductivity { index: 0 })
        );

        let bad_layer = LayeredEarth::new(
            vec![Layer {
                thickness: -1.0,
                conductivity: 0.1,
            }],
            0.1,
        );
        assert!(matches!(
            bad_layer.to_model(&mesh),
            Err(ModelError::InvalidLayer { index: 0, .. })
        ));
    }

    #[test]
    fn uniform_permeability_expands_per_cell() {
        let mesh = Mesh1D::from_widths(vec![1.0; 3]).unwrap();
        let model = EarthModel::halfspace(&mesh, 0.01);
        assert_eq!(model.cell_permeability(), vec![MU_0; 3]);
        assert!(model.check_against(&mesh).is_ok());
    }
}
