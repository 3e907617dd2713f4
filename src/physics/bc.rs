use serde::{Deserialize, Serialize};

/// `Ex` imposed at the surface by the plane-wave source.
pub const SURFACE_EX: f64 = 1.0;

/// `Ex` imposed at the bottom of the domain under a Dirichlet condition.
pub const BOTTOM_EX: f64 = 0.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Bottom,
    Top,
}

/// Condition on `Ex` at the bottom of the padded domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BottomBoundary {
    /// `Ex = 0`: fields have fully decayed (perfect conductor below).
    #[default]
    Dirichlet,
    /// `dEx/dz = 0`, equivalently `Hy = 0` (perfect insulator below).
    Neumann,
}

/// Boundary model of the 1-D MT problem.
///
/// The surface always carries a unit Dirichlet `Ex`; only the bottom is
/// configurable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectricFieldBoundary {
    pub bottom: BottomBoundary,
}

impl ElectricFieldBoundary {
    pub fn new(bottom: BottomBoundary) -> Self {
        Self { bottom }
    }

    pub fn is_dirichlet(&self, side: Side) -> bool {
        match side {
            Side::Top => true,
            Side::Bottom => self.bottom == BottomBoundary::Dirichlet,
        }
    }

    /// Boundary values `[bottom, top]` of `Ex`.
    pub fn values(&self) -> [f64; 2] {
        [BOTTOM_EX, SURFACE_EX]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_is_always_dirichlet() {
        let neumann = ElectricFieldBoundary::new(BottomBoundary::Neumann);
        assert!(neumann.is_dirichlet(Side::Top));
        assert!(!neumann.is_dirichlet(Side::Bottom));
        assert!(ElectricFieldBoundary::default().is_dirichlet(Side::Bottom));
        assert_eq!(neumann.values(), [0.0, 1.0]);
    }

    #[test]
    fn bottom_boundary_parses_from_json() {
        let bc: ElectricFieldBoundary = serde_json::from_str(r#"{"bottom":"neumann"}"#).unwrap();
        assert_eq!(bc.bottom, BottomBoundary::Neumann);
    }
}
