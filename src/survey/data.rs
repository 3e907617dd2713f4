use crate::numerics::forward::ForwardSolution;
use crate::numerics::solver::Factorization;
use crate::physics::{angular_frequency, MU_0};
use crate::survey::{Component, ReceiverId, Survey, SurveyError};
use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use num_complex::Complex64;
use num_traits::Zero;

/// `|Z|² / (μ0 ω)` in Ω·m.
pub fn apparent_resistivity(z: Complex64, frequency: f64) -> f64 {
    z.norm_sqr() / (MU_0 * angular_frequency(frequency))
}

/// `atan(Im Z / Re Z)` in degrees.
///
/// A purely imaginary impedance gives `±90°` following the sign of `Im Z`;
/// `Z = 0` gives `0°`.
pub fn phase_degrees(z: Complex64) -> f64 {
    if z.re.is_zero() {
        if z.im.is_zero() {
            0.0
        } else {
            90.0_f64.copysign(z.im)
        }
    } else {
        (z.im / z.re).atan().to_degrees()
    }
}

fn impedance_from_surface_hy(hy: Complex64) -> Complex64 {
    Complex64::new(-1.0, 0.0) / hy
}

/// Samples the surface `Hy` out of a field column and turns it into `Zxy`.
#[derive(Debug, Clone)]
pub struct SurfaceEvaluator {
    p0: CsrMatrix<f64>,
}

impl SurfaceEvaluator {
    pub fn new(n_cells: usize) -> Self {
        let n = 2 * n_cells + 1;
        let mut coo = CooMatrix::new(1, n);
        coo.push(0, n - 1, 1.0);
        Self {
            p0: CsrMatrix::from(&coo),
        }
    }

    /// Length of the field vectors this evaluator accepts.
    pub fn dimension(&self) -> usize {
        self.p0.ncols()
    }

    pub fn sample(&self, x: &DVector<Complex64>) -> Result<Complex64, SurveyError> {
        if x.len() != self.dimension() {
            return Err(SurveyError::FieldSizeMismatch {
                expected: self.dimension(),
                found: x.len(),
            });
        }
        Ok(self
            .p0
            .triplet_iter()
            .map(|(_, j, p)| x[j] * *p)
            .sum())
    }

    /// `Zxy = -1 / (P0 x)`, the source field being `Ex = 1`.
    pub fn impedance(&self, x: &DVector<Complex64>) -> Result<Complex64, SurveyError> {
        Ok(impedance_from_surface_hy(self.sample(x)?))
    }

    pub fn impedances<F: Factorization>(
        &self,
        solution: &ForwardSolution<F>,
    ) -> Result<Vec<Complex64>, SurveyError> {
        let found = 2 * solution.n_cells() + 1;
        if found != self.dimension() {
            return Err(SurveyError::FieldSizeMismatch {
                expected: self.dimension(),
                found,
            });
        }
        (0..solution.frequencies().len())
            .map(|i| self.impedance(&solution.column(i)))
            .collect()
    }

    /// Project `solution` onto every receiver of `survey`, each with its own
    /// component.
    pub fn eval<F: Factorization>(
        &self,
        survey: &Survey,
        solution: &ForwardSolution<F>,
    ) -> Result<Data, SurveyError> {
        let z = self.impedances(solution)?;
        let mut entries = Vec::with_capacity(survey.n_receivers());

        for (id, rx) in survey.receivers() {
            let values = rx
                .frequencies()
                .iter()
                .map(|&frequency| {
                    let i = solution
                        .frequency_index(frequency)
                        .ok_or(SurveyError::FrequencyNotSolved { frequency })?;
                    Ok(project(rx.component(), z[i], frequency))
                })
                .collect::<Result<Vec<_>, SurveyError>>()?;

            entries.push(ReceiverData {
                id,
                component: rx.component(),
                frequencies: rx.frequencies().to_vec(),
                values,
            });
        }

        Ok(Data { entries })
    }
}

fn project(component: Component, z: Complex64, frequency: f64) -> f64 {
    match component {
        Component::Real => z.re,
        Component::Imag => z.im,
        Component::AppRes => apparent_resistivity(z, frequency),
        Component::Phase => phase_degrees(z),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiverData {
    pub id: ReceiverId,
    pub component: Component,
    pub frequencies: Vec<f64>,
    pub values: Vec<f64>,
}

/// Predicted data, one entry per receiver in source/receiver order.
#[derive(Debug, Clone, PartialEq)]
pub struct Data {
    entries: Vec<ReceiverData>,
}

impl Data {
    pub fn entries(&self) -> &[ReceiverData] {
        &self.entries
    }

    pub fn get(&self, id: ReceiverId) -> Option<&ReceiverData> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.iter().map(|e| e.values.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All values flattened in receiver order.
    pub fn dobs(&self) -> Vec<f64> {
        self.entries
            .iter()
            .flat_map(|e| e.values.iter().copied())
            .collect()
    }
}

/// Impedance, apparent resistivity and phase curves of one forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Sounding {
    pub frequencies: Vec<f64>,
    pub impedance: Vec<Complex64>,
    pub apparent_resistivity: Vec<f64>,
    pub phase: Vec<f64>,
}

impl Sounding {
    pub fn from_solution<F: Factorization>(solution: &ForwardSolution<F>) -> Self {
        let surface = 2 * solution.n_cells();
        let impedance: Vec<Complex64> = (0..solution.frequencies().len())
            .map(|i| impedance_from_surface_hy(solution.fields()[(surface, i)]))
            .collect();
        let frequencies = solution.frequencies().to_vec();
        let apparent_resistivity = impedance
            .iter()
            .zip(&frequencies)
            .map(|(z, f)| apparent_resistivity(*z, *f))
            .collect();
        let phase = impedance.iter().map(|z| phase_degrees(*z)).collect();
        Self {
            frequencies,
            impedance,
            apparent_resistivity,
            phase,
        }
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}
