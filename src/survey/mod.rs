pub mod data;

use crate::discretization::generator::SkinDepthMeshParams;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Quantity a receiver reports at each of its frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    /// Real part of `Zxy`.
    Real,
    /// Imaginary part of `Zxy`.
    Imag,
    /// Apparent resistivity (Ω·m).
    AppRes,
    /// Impedance phase (degrees).
    Phase,
}

const COMPONENT_NAMES: &str = "real, imag, app_res, phase";

#[derive(Debug, Error, Clone, PartialEq)]
#[error("unsupported output mode `{requested}` (expected one of: {expected})")]
pub struct UnsupportedOutputModeError {
    pub requested: String,
    pub expected: &'static str,
}

impl UnsupportedOutputModeError {
    pub fn new(requested: &str, expected: &'static str) -> Self {
        Self {
            requested: requested.to_string(),
            expected,
        }
    }
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Real => "real",
            Component::Imag => "imag",
            Component::AppRes => "app_res",
            Component::Phase => "phase",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Component {
    type Err = UnsupportedOutputModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "real" => Ok(Component::Real),
            "imag" => Ok(Component::Imag),
            "app_res" | "apparent_resistivity" => Ok(Component::AppRes),
            "phase" => Ok(Component::Phase),
            _ => Err(UnsupportedOutputModeError::new(s, COMPONENT_NAMES)),
        }
    }
}

/// Surface receiver requesting one component at a list of frequencies.
#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    location: f64,
    component: Component,
    frequencies: Vec<f64>,
}

impl Receiver {
    pub fn new(component: Component, frequencies: Vec<f64>) -> Self {
        Self {
            location: 0.0,
            component,
            frequencies,
        }
    }

    pub fn location(&self) -> f64 {
        self.location
    }

    pub fn component(&self) -> Component {
        self.component
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn n_data(&self) -> usize {
        self.frequencies.len()
    }
}

/// Plane-wave source at the surface. It imposes `Ex = 1` on the top boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    location: f64,
    receivers: Vec<Receiver>,
}

impl Source {
    pub fn new(receivers: Vec<Receiver>) -> Self {
        Self {
            location: 0.0,
            receivers,
        }
    }

    pub fn location(&self) -> f64 {
        self.location
    }

    pub fn receivers(&self) -> &[Receiver] {
        &self.receivers
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReceiverId {
    pub source: usize,
    pub receiver: usize,
}

impl fmt::Display for ReceiverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source {} / receiver {}", self.source, self.receiver)
    }
}

fn join_ids(ids: &[ReceiverId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error(
    "receivers [{}] do not request the {unique} survey frequencies ({requested} requested for {n_receivers} receivers)",
    join_ids(.receivers)
)]
pub struct InconsistentFrequencyError {
    /// Receivers whose frequency list differs from the one most receivers
    /// request.
    pub receivers: Vec<ReceiverId>,
    pub unique: usize,
    pub requested: usize,
    pub n_receivers: usize,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SurveyError {
    #[error(transparent)]
    InconsistentFrequency(#[from] InconsistentFrequencyError),
    #[error("{id} requests invalid frequency {frequency}")]
    InvalidFrequency { id: ReceiverId, frequency: f64 },
    #[error("survey has no receivers")]
    NoReceivers,
    #[error("receivers request no frequencies")]
    NoFrequencies,
    #[error("no field solution at {frequency} Hz")]
    FrequencyNotSolved { frequency: f64 },
    #[error("field vector has {found} unknowns, evaluator expects {expected}")]
    FieldSizeMismatch { expected: usize, found: usize },
}

/// Most frequent list; ties go to `preferred`, then to the earliest seen.
fn most_common<'a>(
    items: impl Iterator<Item = &'a Vec<f64>>,
    preferred: &[f64],
) -> Option<&'a Vec<f64>> {
    let mut counts: Vec<(&Vec<f64>, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(seen, _)| *seen == item) {
            Some((_, n)) => *n += 1,
            None => counts.push((item, 1)),
        }
    }
    let mut best: Option<(&Vec<f64>, usize)> = None;
    for (item, n) in counts {
        let better = match best {
            None => true,
            Some((current, m)) => n > m || (n == m && item == preferred && current != preferred),
        };
        if better {
            best = Some((item, n));
        }
    }
    best.map(|(item, _)| item)
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

/// Validated collection of MT sources and receivers.
///
/// The unique frequency set is computed once, at construction; a survey never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Survey {
    sources: Vec<Source>,
    frequencies: Vec<f64>,
}

impl Survey {
    pub fn new(sources: Vec<Source>) -> Result<Self, SurveyError> {
        let mut requested = Vec::new();
        let mut n_receivers = 0;
        for (id, rx) in receivers_of(&sources) {
            if let Some(&frequency) = rx.frequencies.iter().find(|f| !(f.is_finite() && **f > 0.0)) {
                return Err(SurveyError::InvalidFrequency { id, frequency });
            }
            requested.extend_from_slice(&rx.frequencies);
            n_receivers += 1;
        }
        if n_receivers == 0 {
            return Err(SurveyError::NoReceivers);
        }

        let mut frequencies = sorted(&requested);
        frequencies.dedup();
        if frequencies.is_empty() {
            return Err(SurveyError::NoFrequencies);
        }

        let lists: Vec<(ReceiverId, Vec<f64>)> = receivers_of(&sources)
            .map(|(id, rx)| (id, sorted(&rx.frequencies)))
            .collect();
        let consistent = lists.iter().all(|(_, list)| *list == frequencies);
        if !consistent || requested.len() != n_receivers * frequencies.len() {
            // Blame the receivers that disagree with the most common list;
            // when every list agrees, none of them matches the unique set.
            let majority = most_common(lists.iter().map(|(_, list)| list), &frequencies);
            let mut offenders: Vec<ReceiverId> = lists
                .iter()
                .filter(|(_, list)| Some(list) != majority)
                .map(|(id, _)| *id)
                .collect();
            if offenders.is_empty() {
                offenders = lists.iter().map(|(id, _)| *id).collect();
            }
            return Err(InconsistentFrequencyError {
                receivers: offenders,
                unique: frequencies.len(),
                requested: requested.len(),
                n_receivers,
            }
            .into());
        }

        tracing::debug!(
            n_receivers,
            n_frequencies = frequencies.len(),
            "survey validated"
        );

        Ok(Self {
            sources,
            frequencies,
        })
    }

    /// Unique frequencies, ascending.
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn n_frequencies(&self) -> usize {
        self.frequencies.len()
    }

    pub fn min_frequency(&self) -> f64 {
        self.frequencies[0]
    }

    pub fn max_frequency(&self) -> f64 {
        self.frequencies[self.frequencies.len() - 1]
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn receivers(&self) -> impl Iterator<Item = (ReceiverId, &Receiver)> {
        receivers_of(&self.sources)
    }

    pub fn n_receivers(&self) -> usize {
        self.receivers().count()
    }

    pub fn n_data(&self) -> usize {
        self.receivers().map(|(_, rx)| rx.n_data()).sum()
    }

    pub fn frequency_index(&self, frequency: f64) -> Option<usize> {
        find_frequency(&self.frequencies, frequency)
    }

    /// Skin-depth mesh parameters spanning the survey band, with the default
    /// core depth and padding.
    pub fn mesh_params(&self, reference_conductivity: f64) -> SkinDepthMeshParams {
        SkinDepthMeshParams::new(
            reference_conductivity,
            self.min_frequency(),
            self.max_frequency(),
        )
    }
}

fn receivers_of(sources: &[Source]) -> impl Iterator<Item = (ReceiverId, &Receiver)> {
    sources.iter().enumerate().flat_map(|(is, src)| {
        src.receivers.iter().enumerate().map(move |(ir, rx)| {
            (
                ReceiverId {
                    source: is,
                    receiver: ir,
                },
                rx,
            )
        })
    })
}

/// Exact lookup in an ascending frequency list.
pub(crate) fn find_frequency(frequencies: &[f64], frequency: f64) -> Option<usize> {
    frequencies
        .binary_search_by(|f| f.partial_cmp(&frequency).unwrap_or(Ordering::Less))
        .ok()
}

/// Log-spaced frequencies from `f_min`, `per_decade` points per decade, up to
/// `f_max` (the last point lands on `f_max` when the span is a whole number of
/// steps).
pub fn logspace_frequencies(f_min: f64, f_max: f64, per_decade: usize) -> Vec<f64> {
    if per_decade == 0 || f_max <= f_min {
        return vec![f_min];
    }
    let decades = (f_max / f_min).log10();
    let steps = (decades * per_decade as f64).round() as usize;
    (0..=steps)
        .map(|i| f_min * 10.0_f64.powf(i as f64 / per_decade as f64))
        .collect()
}
