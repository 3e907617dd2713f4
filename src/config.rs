use crate::discretization::generator::{
    SkinDepthMeshParams, DEFAULT_EXPANSION_FACTOR, DEFAULT_MAX_CORE_CELLS,
    DEFAULT_MAX_PADDING_CELLS,
};
use crate::physics::bc::ElectricFieldBoundary;
use crate::physics::model::{Layer, LayeredEarth};
use crate::survey::{logspace_frequencies, Component, Receiver, Source, Survey};
use crate::Mt1dError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencySweep {
    pub min: f64,
    pub max: f64,
    pub per_decade: usize,
}

impl Default for FrequencySweep {
    fn default() -> Self {
        Self {
            min: 1e-4,
            max: 1e3,
            per_decade: 4,
        }
    }
}

impl FrequencySweep {
    pub fn frequencies(&self) -> Vec<f64> {
        logspace_frequencies(self.min, self.max, self.per_decade)
    }
}

/// Skin-depth mesh settings; the frequency band comes from the survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub reference_conductivity: f64,
    pub core_depth: f64,
    pub cells_per_skin_depth: f64,
    pub padding_skin_depths: f64,
    pub expansion_factor: f64,
    pub max_padding_cells: usize,
    pub max_core_cells: usize,
}

// Coarser and deeper than `SkinDepthMeshParams::default`: sized so the
// two-layer sweep down to 1e-4 Hz reaches the 1000 Ohm.m basement.
impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            reference_conductivity: 0.1,
            core_depth: 1000.0,
            cells_per_skin_depth: 5.0,
            padding_skin_depths: 20.0,
            expansion_factor: DEFAULT_EXPANSION_FACTOR,
            max_padding_cells: DEFAULT_MAX_PADDING_CELLS,
            max_core_cells: DEFAULT_MAX_CORE_CELLS,
        }
    }
}

/// Everything the `mt1d` binary needs for one run.
///
/// Missing fields fall back to a conductive 200 m layer (10 Ω·m) over a
/// resistive basement (1000 Ω·m), swept from 1e-4 to 1e3 Hz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub frequencies: FrequencySweep,
    pub components: Vec<String>,
    pub mesh: MeshConfig,
    pub earth: LayeredEarth,
    pub boundary: ElectricFieldBoundary,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frequencies: FrequencySweep::default(),
            components: vec!["app_res".into(), "phase".into()],
            mesh: MeshConfig::default(),
            earth: LayeredEarth::new(
                vec![Layer {
                    thickness: 200.0,
                    conductivity: 0.1,
                }],
                0.001,
            ),
            boundary: ElectricFieldBoundary::default(),
        }
    }
}

impl RunConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// One surface source with a receiver per requested component, all on
    /// the same sweep.
    pub fn survey(&self) -> Result<Survey, Mt1dError> {
        let frequencies = self.frequencies.frequencies();
        let receivers = self
            .components
            .iter()
            .map(|name| {
                let component: Component = name.parse()?;
                Ok(Receiver::new(component, frequencies.clone()))
            })
            .collect::<Result<Vec<_>, Mt1dError>>()?;
        Ok(Survey::new(vec![Source::new(receivers)])?)
    }

    pub fn mesh_params(&self, survey: &Survey) -> SkinDepthMeshParams {
        let m = &self.mesh;
        SkinDepthMeshParams {
            max_padding_cells: m.max_padding_cells,
            max_core_cells: m.max_core_cells,
            ..survey
                .mesh_params(m.reference_conductivity)
                .with_core_depth(m.core_depth)
                .with_cells_per_skin_depth(m.cells_per_skin_depth)
                .with_padding_skin_depths(m.padding_skin_depths)
                .with_expansion_factor(m.expansion_factor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::bc::BottomBoundary;
    use crate::survey::SurveyError;
    use std::io::Write;

    #[test]
    fn default_run_is_the_two_layer_sweep() {
        let config = RunConfig::default();
        let survey = config.survey().unwrap();
        assert_eq!(survey.n_receivers(), 2);
        // 7 decades at 4 per decade, both ends included
        assert_eq!(survey.n_frequencies(), 29);
        assert!((survey.min_frequency() - 1e-4).abs() < 1e-18);
        assert!((survey.max_frequency() - 1e3).abs() < 1e-9);

        let params = config.mesh_params(&survey);
        assert_eq!(params.core_depth, 1000.0);
        assert_eq!(params.cells_per_skin_depth, 5.0);
        assert_eq!(params.padding_skin_depths, 20.0);
        assert_eq!(params.min_frequency, survey.min_frequency());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "components": ["real", "imag"],
                "mesh": {{ "core_depth": 500.0 }},
                "boundary": {{ "bottom": "neumann" }}
            }}"#
        )
        .unwrap();

        let config = RunConfig::load(file.path()).unwrap();
        assert_eq!(config.components, vec!["real", "imag"]);
        assert_eq!(config.mesh.core_depth, 500.0);
        assert_eq!(config.mesh.cells_per_skin_depth, 5.0);
        assert_eq!(config.boundary.bottom, BottomBoundary::Neumann);
        assert_eq!(config.frequencies, FrequencySweep::default());
    }

    #[test]
    fn bad_inputs_are_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            RunConfig::load(file.path()),
            Err(ConfigError::Json { .. })
        ));
        assert!(matches!(
            RunConfig::load("/nonexistent/mt1d.json"),
            Err(ConfigError::Io { .. })
        ));

        let config = RunConfig {
            components: vec!["tipper".into()],
            ..RunConfig::default()
        };
        assert!(matches!(
            config.survey(),
            Err(Mt1dError::UnsupportedOutputMode(_))
        ));

        let config = RunConfig {
            components: vec![],
            ..RunConfig::default()
        };
        assert!(matches!(
            config.survey(),
            Err(Mt1dError::Survey(SurveyError::NoReceivers))
        ));
    }
}
