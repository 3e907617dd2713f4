use crate::discretization::generator::MeshPlan;
use crate::discretization::mesh::Mesh1D;
use crate::physics::bc::BottomBoundary;
use crate::survey::data::Sounding;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub struct SoundingSummary {
    // Mesh info
    pub n_cells: usize,
    pub n_padding: usize,
    pub n_core: usize,
    pub total_depth: f64,
    pub min_cell_width: f64,
    pub max_cell_width: f64,
    pub padding_target: f64,

    // Boundary
    pub bottom: BottomBoundary,

    // Sounding
    pub n_frequencies: usize,
    pub frequency_range: (f64, f64),
    pub apparent_resistivity_range: (f64, f64),
    pub phase_range: (f64, f64),
}

fn range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

impl SoundingSummary {
    pub fn new(plan: &MeshPlan, mesh: &Mesh1D, bottom: BottomBoundary, sounding: &Sounding) -> Self {
        Self {
            n_cells: mesh.n_cells(),
            n_padding: plan.n_padding,
            n_core: plan.n_core,
            total_depth: mesh.total_depth(),
            min_cell_width: mesh.min_width(),
            max_cell_width: mesh.max_width(),
            padding_target: plan.padding_target,
            bottom,
            n_frequencies: sounding.len(),
            frequency_range: range(&sounding.frequencies),
            apparent_resistivity_range: range(&sounding.apparent_resistivity),
            phase_range: range(&sounding.phase),
        }
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        self.write(&mut file)
    }

    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out, "1-D MT FORWARD SUMMARY")?;
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out)?;

        writeln!(out, "MESH")?;
        writeln!(out, "{}", "-".repeat(60))?;
        writeln!(out, "Number of cells:     {}", self.n_cells)?;
        writeln!(out, "Core cells:          {}", self.n_core)?;
        writeln!(out, "Padding cells:       {}", self.n_padding)?;
        writeln!(out, "Total depth:         {:.6e} m", self.total_depth)?;
        writeln!(out, "Padding target:      {:.6e} m", self.padding_target)?;
        writeln!(out, "Min cell width:      {:.6e} m", self.min_cell_width)?;
        writeln!(out, "Max cell width:      {:.6e} m", self.max_cell_width)?;
        writeln!(out, "Bottom boundary:     {:?}", self.bottom)?;
        writeln!(out)?;

        writeln!(out, "SOUNDING")?;
        writeln!(out, "{}", "-".repeat(60))?;
        writeln!(out, "Frequencies:         {}", self.n_frequencies)?;
        writeln!(
            out,
            "Frequency range:     {:.3e} to {:.3e} Hz",
            self.frequency_range.0, self.frequency_range.1
        )?;
        writeln!(
            out,
            "App. resistivity:    {:.4e} to {:.4e} Ohm.m",
            self.apparent_resistivity_range.0, self.apparent_resistivity_range.1
        )?;
        writeln!(
            out,
            "Phase:               {:.2} to {:.2} deg",
            self.phase_range.0, self.phase_range.1
        )?;
        writeln!(out, "{}", "=".repeat(60))?;

        Ok(())
    }

    pub fn log(&self) {
        tracing::info!(
            cells = self.n_cells,
            padding = self.n_padding,
            depth_m = self.total_depth,
            frequencies = self.n_frequencies,
            rho_min = self.apparent_resistivity_range.0,
            rho_max = self.apparent_resistivity_range.1,
            "sounding summary"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretization::generator::{plan_skin_depth_mesh, SkinDepthMeshParams};
    use num_complex::Complex64;

    #[test]
    fn summary_reports_mesh_and_curve_ranges() {
        let plan = plan_skin_depth_mesh(&SkinDepthMeshParams::default()).unwrap();
        let mesh = plan.build().unwrap();
        let sounding = Sounding {
            frequencies: vec![0.01, 1.0, 100.0],
            impedance: vec![Complex64::new(1.0, 1.0); 3],
            apparent_resistivity: vec![12.0, 10.0, 9.0],
            phase: vec![40.0, 45.0, 50.0],
        };

        let summary = SoundingSummary::new(&plan, &mesh, BottomBoundary::Dirichlet, &sounding);
        assert_eq!(summary.n_cells, 213);
        assert_eq!(summary.n_padding + summary.n_core, summary.n_cells);
        assert_eq!(summary.apparent_resistivity_range, (9.0, 12.0));
        assert_eq!(summary.frequency_range, (0.01, 100.0));

        let mut buf = Vec::new();
        summary.write(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Number of cells:     213"));
        assert!(text.contains("Bottom boundary:     Dirichlet"));

        let dir = tempfile::tempdir().unwrap();
        summary.write_to_file(dir.path().join("summary.txt")).unwrap();
    }
}
