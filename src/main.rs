use anyhow::{Context, Result};
use clap::Parser;
use mt1d_rs::config::RunConfig;
use mt1d_rs::discretization::generator::plan_skin_depth_mesh;
use mt1d_rs::processing::csv_writer;
use mt1d_rs::processing::summary::SoundingSummary;
use mt1d_rs::{simulate, DenseLu, Sounding};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "mt1d")]
#[command(about = "1-D magnetotelluric forward sounding over a layered earth")]
struct Args {
    /// JSON run configuration. Missing fields use the two-layer default
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for sounding.csv, mesh.csv and summary.txt
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let survey = config.survey()?;
    let plan = plan_skin_depth_mesh(&config.mesh_params(&survey))?;
    let mesh = plan.build()?;
    let model = config.earth.to_model(&mesh)?;
    info!(
        cells = mesh.n_cells(),
        depth_m = mesh.total_depth(),
        frequencies = survey.n_frequencies(),
        "running forward model"
    );

    let result = simulate(&survey, &mesh, &model, &config.boundary, &DenseLu::default())?;
    for entry in result.data.entries() {
        info!(receiver = %entry.id, component = %entry.component, n = entry.values.len(), "receiver data");
    }

    let sounding = Sounding::from_solution(&result.solution);

    fs::create_dir_all(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    let sounding_path = args.output.join("sounding.csv");
    csv_writer::write_sounding(&sounding_path, &sounding)
        .with_context(|| format!("writing {}", sounding_path.display()))?;

    let mesh_path = args.output.join("mesh.csv");
    csv_writer::write_model(&mesh_path, &mesh, &model)
        .with_context(|| format!("writing {}", mesh_path.display()))?;

    let summary = SoundingSummary::new(&plan, &mesh, config.boundary.bottom, &sounding);
    let summary_path = args.output.join("summary.txt");
    summary
        .write_to_file(&summary_path)
        .with_context(|| format!("writing {}", summary_path.display()))?;
    summary.log();

    info!(output = %args.output.display(), "done");
    Ok(())
}
