//! Run parameters: the disease, the population, and the seed.
//!
//! Parameters arrive either from command line flags or wholesale from a JSON
//! file (`--config`). Construction of a simulation is rejected up front when
//! any parameter is out of range; there is no partial-result recovery.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::HerdError;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Parameters {
    /// Number of people in the population.
    pub population_size: usize,
    /// Fraction of the initial susceptible pool that is vaccinated.
    pub vaccination_coverage: f64,
    /// Label only; carries no behavior.
    pub virus_name: String,
    /// Per-infected-person probability of death at outcome resolution.
    pub mortality_rate: f64,
    /// Per-contact probability of transmission to a susceptible target.
    pub transmission_probability: f64,
    /// Number of people infected at the start.
    #[serde(default = "default_initial_infected")]
    pub initial_infected: usize,
    /// Base seed for the run's random source.
    #[serde(default)]
    pub seed: u64,
}

fn default_initial_infected() -> usize {
    1
}

impl Parameters {
    /// Loads and validates parameters from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns a `HerdError` when the file cannot be read or parsed, or when
    /// any parameter is out of range.
    pub fn from_file(path: &Path) -> Result<Parameters, HerdError> {
        let contents = fs::read_to_string(path)?;
        let parameters: Parameters = serde_json::from_str(&contents)?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// Rejects out-of-range parameters before any simulation state exists.
    ///
    /// # Errors
    ///
    /// Returns a `HerdError` naming the offending parameter.
    pub fn validate(&self) -> Result<(), HerdError> {
        if self.population_size == 0 {
            return Err("population_size must be positive".into());
        }
        if self.initial_infected == 0 {
            return Err("initial_infected must be positive".into());
        }
        if self.initial_infected > self.population_size {
            return Err(format!(
                "initial_infected ({}) cannot exceed population_size ({})",
                self.initial_infected, self.population_size
            )
            .into());
        }
        for (name, probability) in [
            ("vaccination_coverage", self.vaccination_coverage),
            ("mortality_rate", self.mortality_rate),
            ("transmission_probability", self.transmission_probability),
        ] {
            if !(0.0..=1.0).contains(&probability) {
                return Err(format!("{name} must be in [0, 1], got {probability}").into());
            }
        }
        Ok(())
    }

    /// Default file-name prefix for this run's report files.
    #[must_use]
    pub fn report_prefix(&self) -> String {
        format!(
            "{}_simulation_pop_{}_vp_{}_infected_{}",
            self.virus_name, self.population_size, self.vaccination_coverage, self.initial_infected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid() -> Parameters {
        Parameters {
            population_size: 100,
            vaccination_coverage: 0.9,
            virus_name: "measles".to_string(),
            mortality_rate: 0.12,
            transmission_probability: 0.5,
            initial_infected: 1,
            seed: 42,
        }
    }

    #[test]
    fn valid_parameters_pass() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn zero_population_rejected() {
        let mut parameters = valid();
        parameters.population_size = 0;
        assert!(parameters.validate().is_err());
    }

    #[test]
    fn zero_initial_infected_rejected() {
        let mut parameters = valid();
        parameters.initial_infected = 0;
        assert!(parameters.validate().is_err());
    }

    #[test]
    fn initial_infected_above_population_rejected() {
        let mut parameters = valid();
        parameters.initial_infected = 101;
        let result = parameters.validate();
        match result {
            Err(HerdError::HerdError(message)) => {
                assert!(message.contains("initial_infected"));
            }
            _ => panic!("expected a parameter error"),
        }
    }

    #[test]
    fn probabilities_outside_unit_interval_rejected() {
        for (field, value) in [
            ("coverage", 1.01),
            ("coverage", -0.01),
            ("mortality", 2.0),
            ("transmission", f64::NAN),
        ] {
            let mut parameters = valid();
            match field {
                "coverage" => parameters.vaccination_coverage = value,
                "mortality" => parameters.mortality_rate = value,
                _ => parameters.transmission_probability = value,
            }
            assert!(parameters.validate().is_err(), "{field} = {value}");
        }
    }

    #[test]
    fn defaults_applied_when_absent() {
        let parameters: Parameters = serde_json::from_str(
            r#"{
                "population_size": 10,
                "vaccination_coverage": 0.5,
                "virus_name": "flu",
                "mortality_rate": 0.1,
                "transmission_probability": 0.2
            }"#,
        )
        .unwrap();
        assert_eq!(parameters.initial_infected, 1);
        assert_eq!(parameters.seed, 0);
    }

    #[test]
    fn from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{
                "population_size": 50,
                "vaccination_coverage": 0.8,
                "virus_name": "measles",
                "mortality_rate": 0.1,
                "transmission_probability": 0.3,
                "initial_infected": 2,
                "seed": 7
            }}"#
        )
        .unwrap();

        let parameters = Parameters::from_file(&path).unwrap();
        assert_eq!(parameters.population_size, 50);
        assert_eq!(parameters.initial_infected, 2);
        assert_eq!(parameters.seed, 7);
    }

    #[test]
    fn from_file_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{
                "population_size": 50,
                "vaccination_coverage": 1.5,
                "virus_name": "measles",
                "mortality_rate": 0.1,
                "transmission_probability": 0.3
            }}"#
        )
        .unwrap();
        assert!(Parameters::from_file(&path).is_err());
    }

    #[test]
    fn report_prefix_matches_parameters() {
        assert_eq!(
            valid().report_prefix(),
            "measles_simulation_pop_100_vp_0.9_infected_1"
        );
    }
}
