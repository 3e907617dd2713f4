use thiserror::Error;

/// A 1-D tensor mesh along the vertical axis.
///
/// Cells are stored bottom to top: cell 0 is the deepest one and the last node
/// sits on the surface at `z = 0`. `z` increases upwards, so every node below
/// the surface has a negative coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh1D {
    widths: Vec<f64>,
    origin: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum MeshConstructionError {
    #[error("invalid mesh parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("mesh needs at least one cell")]
    Empty,
    #[error(
        "padding target of {target:.3e} m unreachable: {reached:.3e} m after {max_cells} padding cells"
    )]
    PaddingUnreachable {
        target: f64,
        reached: f64,
        max_cells: usize,
    },
    #[error("core depth needs {requested:.3e} cells, more than the {max_cells} allowed")]
    TooManyCoreCells { requested: f64, max_cells: usize },
}

impl Mesh1D {
    /// Build a mesh from bottom-to-top cell widths, anchored so that the top
    /// node is the surface.
    pub fn from_widths(widths: Vec<f64>) -> Result<Self, MeshConstructionError> {
        if widths.is_empty() {
            return Err(MeshConstructionError::Empty);
        }
        if let Some(&bad) = widths.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
            return Err(MeshConstructionError::InvalidParameter {
                name: "cell width",
                value: bad,
            });
        }
        let origin = -widths.iter().sum::<f64>();
        Ok(Self { widths, origin })
    }

    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    pub fn n_cells(&self) -> usize {
        self.widths.len()
    }

    /// In 1-D faces and nodes coincide.
    pub fn n_nodes(&self) -> usize {
        self.widths.len() + 1
    }

    /// `z` of the bottom node.
    pub fn origin(&self) -> f64 {
        self.origin
    }

    pub fn total_depth(&self) -> f64 {
        -self.origin
    }

    /// Node coordinates, bottom to top. The last entry is the surface.
    pub fn nodes(&self) -> Vec<f64> {
        let mut z = self.origin;
        let mut nodes = Vec::with_capacity(self.n_nodes());
        nodes.push(z);
        for h in &self.widths {
            z += h;
            nodes.push(z);
        }
        // Pin the surface exactly; the running sum drifts by a few ulps.
        if let Some(last) = nodes.last_mut() {
            *last = 0.0;
        }
        nodes
    }

    pub fn cell_centers(&self) -> Vec<f64> {
        self.nodes()
            .windows(2)
            .map(|pair| 0.5 * (pair[0] + pair[1]))
            .collect()
    }

    /// Depth below the surface (positive down) of every cell centre.
    pub fn cell_center_depths(&self) -> Vec<f64> {
        self.cell_centers().into_iter().map(|z| -z).collect()
    }

    pub fn min_width(&self) -> f64 {
        self.widths.iter().cloned().fold(f64::INFINITY, f64::min)
    }

    pub fn max_width(&self) -> f64 {
        self.widths.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Width of the cell touching the surface.
    pub fn surface_width(&self) -> f64 {
        self.widths[self.widths.len() - 1]
    }
}
