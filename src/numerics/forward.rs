use crate::discretization::mesh::Mesh1D;
use crate::error::Mt1dError;
use crate::numerics::solver::{Factorization, LinearSolver, SolveError, SolveFailure};
use crate::numerics::timing::{
    finalize_and_report, record_assembly, record_factorization, record_solve, reset_timing,
};
use crate::physics::angular_frequency;
use crate::physics::bc::ElectricFieldBoundary;
use crate::physics::model::EarthModel;
use crate::physics::system::SystemAssembler;
use crate::survey::data::{apparent_resistivity, phase_degrees, Data, SurfaceEvaluator};
use crate::survey::{find_frequency, Survey, UnsupportedOutputModeError};
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use std::str::FromStr;
use std::time::Instant;

/// Fields of every frequency of one forward pass, together with the
/// factorization each column was solved with.
pub struct ForwardSolution<F> {
    n_cells: usize,
    frequencies: Vec<f64>,
    fields: DMatrix<Complex64>,
    factorizations: Vec<F>,
}

impl<F: Factorization> ForwardSolution<F> {
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// `(2 nC + 1) × nF` field matrix, one column per frequency.
    pub fn fields(&self) -> &DMatrix<Complex64> {
        &self.fields
    }

    pub fn column(&self, index: usize) -> DVector<Complex64> {
        self.fields.column(index).into_owned()
    }

    /// `Ex` at the cell centres, bottom to top.
    pub fn electric_field(&self, index: usize) -> DVector<Complex64> {
        self.fields
            .view((0, index), (self.n_cells, 1))
            .column(0)
            .into_owned()
    }

    /// `Hy` at the nodes, bottom to top.
    pub fn magnetic_field(&self, index: usize) -> DVector<Complex64> {
        self.fields
            .view((self.n_cells, index), (self.n_cells + 1, 1))
            .column(0)
            .into_owned()
    }

    pub fn factorization(&self, index: usize) -> Option<&F> {
        self.factorizations.get(index)
    }

    pub fn frequency_index(&self, frequency: f64) -> Option<usize> {
        find_frequency(&self.frequencies, frequency)
    }

    /// Solve another right-hand side at frequency `index` with the stored
    /// factorization. An out-of-range index reports a NaN frequency.
    pub fn resolve(
        &self,
        index: usize,
        rhs: &DVector<Complex64>,
    ) -> Result<DVector<Complex64>, SolveError> {
        let frequency = self.frequencies.get(index).copied().unwrap_or(f64::NAN);
        let factor = self
            .factorizations
            .get(index)
            .ok_or(SolveError::new(frequency, SolveFailure::NoFactorization { index }))?;
        factor
            .solve(rhs)
            .map_err(|source| SolveError::new(frequency, source))
    }
}

/// Assemble, factorize and solve the system at one frequency.
pub fn solve_frequency<S: LinearSolver>(
    assembler: &SystemAssembler,
    frequency: f64,
    solver: &S,
) -> Result<(DVector<Complex64>, S::Factor), SolveError> {
    let fail = |source| SolveError::new(frequency, source);
    if !(frequency.is_finite() && frequency > 0.0) {
        return Err(fail(SolveFailure::InvalidFrequency));
    }

    let omega = angular_frequency(frequency);
    let matrix = record_assembly(|| assembler.matrix(omega));
    let factor = record_factorization(|| solver.factorize(&matrix)).map_err(fail)?;
    let x = record_solve(|| factor.solve(assembler.rhs())).map_err(fail)?;

    if x.len() != assembler.dimension() {
        return Err(fail(SolveFailure::DimensionMismatch {
            expected: assembler.dimension(),
            found: x.len(),
        }));
    }
    if !x.iter().all(|v| v.re.is_finite() && v.im.is_finite()) {
        return Err(fail(SolveFailure::NonFinite));
    }
    Ok((x, factor))
}

/// Frequencies must be positive and strictly ascending, so that solved
/// columns can be looked up by binary search.
fn check_sweep(frequencies: &[f64]) -> Result<(), SolveError> {
    if let Some(&f) = frequencies.iter().find(|f| !(f.is_finite() && **f > 0.0)) {
        return Err(SolveError::new(f, SolveFailure::InvalidFrequency));
    }
    if let Some(pair) = frequencies.windows(2).find(|pair| pair[1] <= pair[0]) {
        return Err(SolveError::new(pair[1], SolveFailure::UnorderedFrequency));
    }
    Ok(())
}

fn collect_solution<F>(
    assembler: &SystemAssembler,
    frequencies: &[f64],
    columns: Vec<(DVector<Complex64>, F)>,
) -> ForwardSolution<F> {
    let mut fields = DMatrix::zeros(assembler.dimension(), frequencies.len());
    let mut factorizations = Vec::with_capacity(columns.len());
    for (j, (x, factor)) in columns.into_iter().enumerate() {
        fields.set_column(j, &x);
        factorizations.push(factor);
    }
    ForwardSolution {
        n_cells: assembler.n_cells(),
        frequencies: frequencies.to_vec(),
        fields,
        factorizations,
    }
}

/// Solve every frequency in order. The first failure aborts the pass.
///
/// `frequencies` must be strictly ascending, as [`Survey::frequencies`] is.
pub fn compute_fields<S: LinearSolver>(
    assembler: &SystemAssembler,
    frequencies: &[f64],
    solver: &S,
) -> Result<ForwardSolution<S::Factor>, SolveError> {
    check_sweep(frequencies)?;
    let span = tracing::info_span!(
        "forward",
        n_cells = assembler.n_cells(),
        n_frequencies = frequencies.len()
    );
    let _guard = span.enter();

    reset_timing();
    let start = Instant::now();

    let mut columns = Vec::with_capacity(frequencies.len());
    for (i, &frequency) in frequencies.iter().enumerate() {
        let (x, factor) = solve_frequency(assembler, frequency, solver)?;
        tracing::debug!(
            index = i,
            frequency,
            surface_hy = %x[assembler.dimension() - 1],
            "frequency solved"
        );
        columns.push((x, factor));
    }

    finalize_and_report(start.elapsed());
    tracing::info!(elapsed_ms = start.elapsed().as_secs_f64() * 1000.0, "forward pass done");
    Ok(collect_solution(assembler, frequencies, columns))
}

/// Rayon version of [`compute_fields`]. Each task owns one column; the first
/// failure observed aborts the pass.
#[cfg(feature = "parallel")]
pub fn compute_fields_parallel<S>(
    assembler: &SystemAssembler,
    frequencies: &[f64],
    solver: &S,
) -> Result<ForwardSolution<S::Factor>, SolveError>
where
    S: LinearSolver + Sync,
    S::Factor: Send,
{
    use rayon::prelude::*;

    check_sweep(frequencies)?;
    let start = Instant::now();
    let columns = frequencies
        .par_iter()
        .map(|&frequency| solve_frequency(assembler, frequency, solver))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(
        n_frequencies = frequencies.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "parallel forward pass done"
    );
    Ok(collect_solution(assembler, frequencies, columns))
}

pub struct SimulationResult<F> {
    pub solution: ForwardSolution<F>,
    pub data: Data,
}

/// Full forward model: assemble on `mesh`, solve every survey frequency and
/// project the surface fields onto each receiver.
pub fn simulate<S: LinearSolver>(
    survey: &Survey,
    mesh: &Mesh1D,
    model: &EarthModel,
    boundary: &ElectricFieldBoundary,
    solver: &S,
) -> Result<SimulationResult<S::Factor>, Mt1dError> {
    let assembler = SystemAssembler::new(mesh, model, boundary)?;
    let solution = compute_fields(&assembler, survey.frequencies(), solver)?;
    let data = SurfaceEvaluator::new(mesh.n_cells()).eval(survey, &solution)?;
    Ok(SimulationResult { solution, data })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Impedance,
    AppResPhase,
}

impl FromStr for ResponseKind {
    type Err = UnsupportedOutputModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "impedance" => Ok(ResponseKind::Impedance),
            "app_res" | "apparent_resistivity" => Ok(ResponseKind::AppResPhase),
            _ => Err(UnsupportedOutputModeError::new(s, "impedance, app_res")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Response {
    Impedance(Complex64),
    AppResPhase {
        apparent_resistivity: f64,
        phase: f64,
    },
}

/// Surface response at a single frequency over a Dirichlet bottom.
pub fn mt_response<S: LinearSolver>(
    mesh: &Mesh1D,
    model: &EarthModel,
    frequency: f64,
    kind: ResponseKind,
    solver: &S,
) -> Result<Response, Mt1dError> {
    let assembler = SystemAssembler::new(mesh, model, &ElectricFieldBoundary::default())?;
    let (x, _) = solve_frequency(&assembler, frequency, solver)?;
    let z = SurfaceEvaluator::new(mesh.n_cells()).impedance(&x)?;
    Ok(match kind {
        ResponseKind::Impedance => Response::Impedance(z),
        ResponseKind::AppResPhase => Response::AppResPhase {
            apparent_resistivity: apparent_resistivity(z, frequency),
            phase: phase_degrees(z),
        },
    })
}
