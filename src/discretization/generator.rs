use super::mesh::{Mesh1D, MeshConstructionError};
use crate::physics::skin_depth;
use serde::{Deserialize, Serialize};

/// Growth ratio of consecutive padding cells.
pub const DEFAULT_EXPANSION_FACTOR: f64 = 1.3;

/// Upper bound on the number of padding cells before giving up.
pub const DEFAULT_MAX_PADDING_CELLS: usize = 1000;

/// Upper bound on the number of uniform core cells.
pub const DEFAULT_MAX_CORE_CELLS: usize = 100_000;

/// Inputs of the skin-depth mesh heuristic.
///
/// The finest cell resolves the skin depth at the highest frequency; the
/// padding reaches a multiple of the skin depth at the lowest frequency, both
/// evaluated in a uniform reference half-space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinDepthMeshParams {
    /// Conductivity (S/m) used for the skin-depth estimates.
    pub reference_conductivity: f64,
    pub min_frequency: f64,
    pub max_frequency: f64,
    /// Depth (m) covered by uniform core cells below the surface.
    pub core_depth: f64,
    pub cells_per_skin_depth: f64,
    /// Padding length in skin depths at `min_frequency`.
    pub padding_skin_depths: f64,
    pub expansion_factor: f64,
    pub max_padding_cells: usize,
    pub max_core_cells: usize,
}

impl Default for SkinDepthMeshParams {
    fn default() -> Self {
        Self {
            reference_conductivity: 0.1,
            min_frequency: 1e-2,
            max_frequency: 1e2,
            core_depth: 3000.0,
            cells_per_skin_depth: 10.0,
            padding_skin_depths: 2.0,
            expansion_factor: DEFAULT_EXPANSION_FACTOR,
            max_padding_cells: DEFAULT_MAX_PADDING_CELLS,
            max_core_cells: DEFAULT_MAX_CORE_CELLS,
        }
    }
}

impl SkinDepthMeshParams {
    pub fn new(reference_conductivity: f64, min_frequency: f64, max_frequency: f64) -> Self {
        Self {
            reference_conductivity,
            min_frequency,
            max_frequency,
            ..Self::default()
        }
    }

    pub fn with_core_depth(mut self, core_depth: f64) -> Self {
        self.core_depth = core_depth;
        self
    }

    pub fn with_cells_per_skin_depth(mut self, cells: f64) -> Self {
        self.cells_per_skin_depth = cells;
        self
    }

    pub fn with_padding_skin_depths(mut self, skin_depths: f64) -> Self {
        self.padding_skin_depths = skin_depths;
        self
    }

    pub fn with_expansion_factor(mut self, factor: f64) -> Self {
        self.expansion_factor = factor;
        self
    }

    fn validate(&self) -> Result<(), MeshConstructionError> {
        let positive = [
            ("reference_conductivity", self.reference_conductivity),
            ("min_frequency", self.min_frequency),
            ("max_frequency", self.max_frequency),
            ("core_depth", self.core_depth),
            ("cells_per_skin_depth", self.cells_per_skin_depth),
            ("padding_skin_depths", self.padding_skin_depths),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(MeshConstructionError::InvalidParameter { name, value });
            }
        }
        if self.min_frequency > self.max_frequency {
            return Err(MeshConstructionError::InvalidParameter {
                name: "min_frequency",
                value: self.min_frequency,
            });
        }
        if !(self.expansion_factor.is_finite() && self.expansion_factor >= 1.0) {
            return Err(MeshConstructionError::InvalidParameter {
                name: "expansion_factor",
                value: self.expansion_factor,
            });
        }
        Ok(())
    }
}

/// Resolved layout of a skin-depth mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPlan {
    pub core_cell_width: f64,
    /// Padding length the heuristic asked for.
    pub padding_target: f64,
    /// Padding length actually laid down (always `>= padding_target`).
    pub padding_length: f64,
    pub n_padding: usize,
    pub n_core: usize,
    pub expansion_factor: f64,
}

impl MeshPlan {
    pub fn n_cells(&self) -> usize {
        self.n_padding + self.n_core
    }

    /// Width of padding cell `k` counted from the core (`k >= 1`).
    fn padding_width(&self, k: usize) -> f64 {
        padding_width(self.core_cell_width, self.expansion_factor, k)
    }

    /// Cell widths bottom to top: expanding padding first, then the core.
    pub fn widths(&self) -> Vec<f64> {
        let mut widths: Vec<f64> = (1..=self.n_padding)
            .rev()
            .map(|k| self.padding_width(k))
            .collect();
        widths.extend(std::iter::repeat(self.core_cell_width).take(self.n_core));
        widths
    }

    pub fn build(&self) -> Result<Mesh1D, MeshConstructionError> {
        Mesh1D::from_widths(self.widths())
    }
}

#[inline]
fn padding_width(cs: f64, factor: f64, k: usize) -> f64 {
    cs * factor.powi(k as i32)
}

/// Work out the padding and core cell counts for `params`.
pub fn plan_skin_depth_mesh(
    params: &SkinDepthMeshParams,
) -> Result<MeshPlan, MeshConstructionError> {
    params.validate()?;

    let rho = 1.0 / params.reference_conductivity;
    let cs = skin_depth(rho, params.max_frequency) / params.cells_per_skin_depth;
    let target = skin_depth(rho, params.min_frequency) * params.padding_skin_depths;
    let r = params.expansion_factor;

    let mut n_padding = 1;
    let mut padding = padding_width(cs, r, 1);
    while padding < target {
        if n_padding >= params.max_padding_cells {
            return Err(MeshConstructionError::PaddingUnreachable {
                target,
                reached: padding,
                max_cells: params.max_padding_cells,
            });
        }
        n_padding += 1;
        padding += padding_width(cs, r, n_padding);
    }

    let core_cells = (params.core_depth / cs).floor();
    if core_cells > params.max_core_cells as f64 {
        return Err(MeshConstructionError::TooManyCoreCells {
            requested: core_cells,
            max_cells: params.max_core_cells,
        });
    }
    let n_core = (core_cells as usize).max(1);

    tracing::info!(
        finest_cell = cs,
        padding_distance = target,
        n_padding,
        n_core,
        "planned skin-depth mesh"
    );

    Ok(MeshPlan {
        core_cell_width: cs,
        padding_target: target,
        padding_length: padding,
        n_padding,
        n_core,
        expansion_factor: r,
    })
}

/// Plan and build in one go.
pub fn build_skin_depth_mesh(
    params: &SkinDepthMeshParams,
) -> Result<Mesh1D, MeshConstructionError> {
    plan_skin_depth_mesh(params)?.build()
}
