use crate::discretization::mesh::Mesh1D;
use crate::physics::model::EarthModel;
use crate::survey::data::Sounding;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write column data to a CSV file with headers
pub fn write_csv<P: AsRef<Path>>(path: P, headers: &[&str], data: &[Vec<f64>]) -> io::Result<()> {
    if !headers.is_empty() && !data.is_empty() && headers.len() != data.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Headers count ({}) doesn't match data columns ({})",
                headers.len(),
                data.len()
            ),
        ));
    }

    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "{}", headers.join(","))?;

    let n_rows = data.iter().map(|col| col.len()).max().unwrap_or(0);

    for i in 0..n_rows {
        let row: Vec<String> = data
            .iter()
            .map(|col| col.get(i).map(|v| format!("{:.15e}", v)).unwrap_or_default())
            .collect();
        writeln!(file, "{}", row.join(","))?;
    }

    file.flush()
}

/// Sounding curves, one row per frequency
pub fn write_sounding<P: AsRef<Path>>(path: P, sounding: &Sounding) -> io::Result<()> {
    write_csv(
        path,
        &[
            "frequency",
            "z_real",
            "z_imag",
            "apparent_resistivity",
            "phase",
        ],
        &[
            sounding.frequencies.clone(),
            sounding.impedance.iter().map(|z| z.re).collect(),
            sounding.impedance.iter().map(|z| z.im).collect(),
            sounding.apparent_resistivity.clone(),
            sounding.phase.clone(),
        ],
    )
}

/// Cell depths, widths and conductivities, surface first
pub fn write_model<P: AsRef<Path>>(path: P, mesh: &Mesh1D, model: &EarthModel) -> io::Result<()> {
    if mesh.n_cells() != model.n_cells() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Model has {} cells, mesh has {}",
                model.n_cells(),
                mesh.n_cells()
            ),
        ));
    }
    let rev = |v: Vec<f64>| v.into_iter().rev().collect::<Vec<_>>();
    write_csv(
        path,
        &["depth", "width", "conductivity"],
        &[
            rev(mesh.cell_center_depths()),
            rev(mesh.widths().to_vec()),
            rev(model.conductivity().iter().map(|s| s.re).collect()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use std::fs;

    #[test]
    fn writes_headers_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let data = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0]];

        write_csv(&path, &["x", "y"], &data).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "x,y");
        assert_eq!(lines.len(), 4);
        assert!(lines[3].ends_with(','));

        assert!(write_csv(&path, &["x"], &data).is_err());
    }

    #[test]
    fn sounding_has_one_row_per_frequency() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sounding.csv");
        let sounding = Sounding {
            frequencies: vec![0.1, 1.0],
            impedance: vec![Complex64::new(1e-3, 1e-3), Complex64::new(2e-3, 2e-3)],
            apparent_resistivity: vec![10.0, 11.0],
            phase: vec![45.0, 45.0],
        };

        write_sounding(&path, &sounding).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "frequency,z_real,z_imag,apparent_resistivity,phase"
        );
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].split(',').count(), 5);
    }

    #[test]
    fn model_rows_start_at_the_surface() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.csv");
        let mesh = Mesh1D::from_widths(vec![30.0, 10.0]).unwrap();
        let model = EarthModel::from_conductivity(&[0.001, 0.1]);

        write_model(&path, &mesh, &model).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let first: Vec<f64> = content
            .lines()
            .nth(1)
            .unwrap()
            .split(',')
            .map(|v| v.parse().unwrap())
            .collect();
        assert_eq!(first, vec![5.0, 10.0, 0.1]);

        let short = EarthModel::from_conductivity(&[0.1]);
        assert!(write_model(&path, &mesh, &short).is_err());
    }
}
