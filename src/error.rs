use crate::config::ConfigError;
use crate::discretization::mesh::MeshConstructionError;
use crate::numerics::solver::SolveError;
use crate::physics::model::ModelError;
use crate::survey::{InconsistentFrequencyError, SurveyError, UnsupportedOutputModeError};
use thiserror::Error;

/// Any failure of a forward-modelling run.
#[derive(Debug, Error)]
pub enum Mt1dError {
    #[error(transparent)]
    Mesh(#[from] MeshConstructionError),
    #[error(transparent)]
    Survey(#[from] SurveyError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Solve(#[from] SolveError),
    #[error(transparent)]
    UnsupportedOutputMode(#[from] UnsupportedOutputModeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<InconsistentFrequencyError> for Mt1dError {
    fn from(err: InconsistentFrequencyError) -> Self {
        Mt1dError::Survey(err.into())
    }
}
