//! One-dimensional magnetotelluric forward modelling.
//!
//! A survey fixes the frequency band, a skin-depth heuristic turns it into a
//! padded vertical mesh, and for every frequency the coupled `Ex`/`Hy` system
//! is assembled and solved through an injected [`LinearSolver`]. Surface
//! fields are then projected to impedance, apparent resistivity or phase.

pub mod config;
pub mod discretization;
pub mod error;
pub mod numerics;
pub mod physics;
pub mod processing;
pub mod survey;

pub use discretization::generator::{build_skin_depth_mesh, plan_skin_depth_mesh, SkinDepthMeshParams};
pub use discretization::mesh::{Mesh1D, MeshConstructionError};
pub use error::Mt1dError;
pub use numerics::forward::{
    compute_fields, mt_response, simulate, ForwardSolution, Response, ResponseKind,
    SimulationResult,
};
pub use numerics::solver::{DenseLu, Factorization, LinearSolver, SolveError, SolveFailure};
pub use physics::bc::{BottomBoundary, ElectricFieldBoundary};
pub use physics::model::{EarthModel, Layer, LayeredEarth, ModelError, Permeability};
pub use survey::data::{Data, Sounding};
pub use survey::{
    logspace_frequencies, Component, InconsistentFrequencyError, Receiver, ReceiverId, Source, Survey,
    SurveyError, UnsupportedOutputModeError,
};
