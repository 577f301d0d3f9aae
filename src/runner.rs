//! Command-line entry point wiring: argument parsing, parameter assembly,
//! report setup, and the end-of-run summary. Contains no simulation logic.

use std::path::PathBuf;

use clap::{Args, Command, FromArgMatches as _};
use log::LevelFilter;

use crate::error::HerdError;
use crate::log::set_log_level;
use crate::params::Parameters;
use crate::report::{FileLogger, ReportOptions};
use crate::simulation::{Simulation, SimulationSummary};

/// Default cli arguments for the herd-immunity runner
#[derive(Args, Debug)]
pub struct BaseArgs {
    /// Random seed; overrides the seed from a parameters file
    #[arg(short, long)]
    pub random_seed: Option<u64>,

    /// Optional path to a JSON parameters file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for report output
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Replace existing report files
    #[arg(short, long)]
    pub force_overwrite: bool,

    /// Enable log messages at the given level
    #[arg(short, long)]
    pub log_level: Option<LevelFilter>,
}

/// Model parameters, required on the command line unless a parameters file
/// supplies them
#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Number of people in the population
    #[arg(long, required_unless_present = "config")]
    pub population_size: Option<usize>,

    /// Fraction of the population vaccinated at the start, in [0, 1]
    #[arg(long, required_unless_present = "config")]
    pub vaccination_coverage: Option<f64>,

    /// Name of the simulated virus (label only)
    #[arg(long, required_unless_present = "config")]
    pub virus_name: Option<String>,

    /// Probability an infection is fatal, in [0, 1]
    #[arg(long, required_unless_present = "config")]
    pub mortality_rate: Option<f64>,

    /// Per-contact probability of transmission, in [0, 1]
    #[arg(long, required_unless_present = "config")]
    pub transmission_probability: Option<f64>,

    /// Number of people infected at the start
    #[arg(long, default_value_t = 1)]
    pub initial_infected: usize,
}

fn create_cli() -> Command {
    let cli = Command::new("herd-immunity");
    let cli = BaseArgs::augment_args(cli);
    ModelArgs::augment_args(cli)
}

/// Parses command line arguments and runs one simulation to completion.
///
/// # Errors
///
/// Returns an error if argument parsing, report setup, or the run fails
pub fn run_with_args() -> Result<SimulationSummary, Box<dyn std::error::Error>> {
    let matches = create_cli().get_matches();
    let base = BaseArgs::from_arg_matches(&matches)?;
    let model = ModelArgs::from_arg_matches(&matches)?;
    Ok(run_with_args_internal(base, model)?)
}

fn assemble_parameters(base: &BaseArgs, model: ModelArgs) -> Result<Parameters, HerdError> {
    // A parameters file supplies the model wholesale; flags are the
    // alternative, not a patch on top of it.
    let mut parameters = match &base.config {
        Some(path) => Parameters::from_file(path)?,
        None => Parameters {
            population_size: model
                .population_size
                .ok_or("--population-size is required without --config")?,
            vaccination_coverage: model
                .vaccination_coverage
                .ok_or("--vaccination-coverage is required without --config")?,
            virus_name: model
                .virus_name
                .ok_or("--virus-name is required without --config")?,
            mortality_rate: model
                .mortality_rate
                .ok_or("--mortality-rate is required without --config")?,
            transmission_probability: model
                .transmission_probability
                .ok_or("--transmission-probability is required without --config")?,
            initial_infected: model.initial_infected,
            seed: 0,
        },
    };
    if let Some(seed) = base.random_seed {
        parameters.seed = seed;
    }
    parameters.validate()?;
    Ok(parameters)
}

fn run_with_args_internal(base: BaseArgs, model: ModelArgs) -> Result<SimulationSummary, HerdError> {
    if let Some(level) = base.log_level {
        set_log_level(level);
    }

    let parameters = assemble_parameters(&base, model)?;
    let options = ReportOptions::default()
        .directory(base.output_dir.clone())
        .prefix(parameters.report_prefix())
        .overwrite(base.force_overwrite);
    let mut logger = FileLogger::new(&options)?;

    let mut simulation = Simulation::new(parameters)?;
    let summary = simulation.run(&mut logger)?;
    println!(
        "The simulation has ended after {} time steps: {} people infected in total, {} dead.",
        summary.steps, summary.total_infected, summary.total_dead
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;

    fn base_args(output_dir: PathBuf) -> BaseArgs {
        BaseArgs {
            random_seed: Some(42),
            config: None,
            output_dir,
            force_overwrite: false,
            log_level: None,
        }
    }

    fn model_args() -> ModelArgs {
        ModelArgs {
            population_size: Some(20),
            vaccination_coverage: Some(0.5),
            virus_name: Some("measles".to_string()),
            mortality_rate: Some(0.2),
            transmission_probability: Some(0.4),
            initial_infected: 1,
        }
    }

    #[test]
    fn test_run_with_flags() {
        let temp_dir = tempdir().unwrap();
        let summary =
            run_with_args_internal(base_args(temp_dir.path().to_path_buf()), model_args())
                .unwrap();
        assert!(summary.steps >= 1);

        let interactions = temp_dir
            .path()
            .join("measles_simulation_pop_20_vp_0.5_infected_1_interactions.csv");
        assert!(interactions.exists());
    }

    #[test]
    fn test_run_with_config_path() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("input.json");
        let mut file = fs::File::create(&config_path).unwrap();
        write!(
            file,
            r#"{{
                "population_size": 10,
                "vaccination_coverage": 1.0,
                "virus_name": "flu",
                "mortality_rate": 0.0,
                "transmission_probability": 1.0,
                "seed": 7
            }}"#
        )
        .unwrap();

        let mut base = base_args(temp_dir.path().to_path_buf());
        base.random_seed = None;
        base.config = Some(config_path);
        let model = ModelArgs {
            population_size: None,
            vaccination_coverage: None,
            virus_name: None,
            mortality_rate: None,
            transmission_probability: None,
            initial_infected: 1,
        };

        // Full coverage: the outbreak ends after one step.
        let summary = run_with_args_internal(base, model).unwrap();
        assert_eq!(summary.steps, 1);
        assert_eq!(summary.total_infected, 1);
    }

    #[test]
    fn test_seed_flag_overrides_config_seed() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("input.json");
        let mut file = fs::File::create(&config_path).unwrap();
        write!(
            file,
            r#"{{
                "population_size": 10,
                "vaccination_coverage": 0.5,
                "virus_name": "flu",
                "mortality_rate": 0.1,
                "transmission_probability": 0.2,
                "seed": 7
            }}"#
        )
        .unwrap();

        let mut base = base_args(temp_dir.path().to_path_buf());
        base.config = Some(config_path);
        let model = ModelArgs {
            population_size: None,
            vaccination_coverage: None,
            virus_name: None,
            mortality_rate: None,
            transmission_probability: None,
            initial_infected: 1,
        };

        let parameters = assemble_parameters(&base, model).unwrap();
        assert_eq!(parameters.seed, 42);
    }

    #[test]
    fn test_missing_flags_without_config() {
        let base = base_args(PathBuf::from("."));
        let model = ModelArgs {
            population_size: None,
            vaccination_coverage: None,
            virus_name: None,
            mortality_rate: None,
            transmission_probability: None,
            initial_infected: 1,
        };
        assert!(assemble_parameters(&base, model).is_err());
    }

    #[test]
    fn test_cli_invocation() {
        let temp_dir = tempdir().unwrap();
        assert_cmd::Command::cargo_bin("herd-immunity")
            .unwrap()
            .args([
                "--population-size",
                "15",
                "--vaccination-coverage",
                "0.8",
                "--virus-name",
                "measles",
                "--mortality-rate",
                "0.1",
                "--transmission-probability",
                "0.3",
                "--random-seed",
                "42",
                "--output-dir",
                temp_dir.path().to_str().unwrap(),
            ])
            .assert()
            .success();

        let interactions = temp_dir
            .path()
            .join("measles_simulation_pop_15_vp_0.8_infected_1_interactions.csv");
        assert!(interactions.exists());
    }
}
