//! The simulation engine.
//!
//! The engine owns the population, the disease parameters, the random
//! source, and the pending-infection buffer, and drives discrete time steps
//! until nobody is both alive and infected. Each step:
//!
//! * snapshots the living population,
//! * lets every infected, living person attempt [`MAX_CONTACTS`] contact
//!   trials against random living targets,
//! * resolves death vs. recovery for everyone who entered the step infected,
//! * then applies the infections recorded during the step, so the newly
//!   infected become contagious starting with the next step.
//!
//! The engine performs no I/O; it emits [`SimEvent`]s to an [`EventSink`].

use log::{debug, info, trace};
use rustc_hash::FxHashSet;

use crate::error::HerdError;
use crate::event::{
    EventSink, InteractionOutcome, InteractionRow, MetadataRow, OutcomeRow, SimEvent, StepRow,
};
use crate::params::Parameters;
use crate::people::{Person, PersonId, Population};
use crate::random::SimRng;

/// Contact trials attempted per infected, living person per time step,
/// regardless of how many succeed.
pub const MAX_CONTACTS: usize = 100;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum RunState {
    Running,
    Ended,
}

/// Aggregate tallies for a completed run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SimulationSummary {
    /// Time steps performed before the epidemic resolved.
    pub steps: u32,
    /// Everyone ever infected, including the initially infected.
    pub total_infected: usize,
    /// Everyone who died of their infection.
    pub total_dead: usize,
}

pub struct Simulation {
    params: Parameters,
    population: Population,
    rng: SimRng,
    /// People infected during the current step's contact phase, applied
    /// atomically at step end.
    newly_infected: FxHashSet<PersonId>,
    step_counter: u32,
    state: RunState,
    total_infected: usize,
    total_dead: usize,
}

impl Simulation {
    /// Validates the parameters and builds the starting population.
    ///
    /// # Errors
    ///
    /// Returns a `HerdError` when any parameter is out of range.
    pub fn new(params: Parameters) -> Result<Simulation, HerdError> {
        params.validate()?;
        let mut rng = SimRng::seed_from_u64(params.seed);
        let population = Population::generate(&params, &mut rng);
        info!(
            "created population of {} with {} initially infected",
            params.population_size, params.initial_infected
        );
        Ok(Simulation {
            total_infected: params.initial_infected,
            params,
            population,
            rng,
            newly_infected: FxHashSet::default(),
            step_counter: 0,
            state: RunState::Running,
            total_dead: 0,
        })
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn step_count(&self) -> u32 {
        self.step_counter
    }

    /// True while at least one person is both alive and infected.
    #[must_use]
    pub fn should_continue(&self) -> bool {
        self.population
            .people()
            .any(|person| person.is_alive() && person.is_infected())
    }

    #[must_use]
    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            steps: self.step_counter,
            total_infected: self.total_infected,
            total_dead: self.total_dead,
        }
    }

    /// Runs time steps until the epidemic resolves, emitting every event to
    /// `sink` in order. Performs zero steps when the starting population
    /// already has nobody both alive and infected.
    ///
    /// # Errors
    ///
    /// Returns a `HerdError` when the sink rejects an event, or when the
    /// simulation has already run.
    pub fn run(&mut self, sink: &mut impl EventSink) -> Result<SimulationSummary, HerdError> {
        if self.state == RunState::Ended {
            return Err("simulation has already run".into());
        }

        sink.emit(SimEvent::Metadata(MetadataRow {
            population_size: self.params.population_size,
            vaccination_coverage: self.params.vaccination_coverage,
            virus_name: self.params.virus_name.clone(),
            mortality_rate: self.params.mortality_rate,
            transmission_probability: self.params.transmission_probability,
        }))?;

        while self.should_continue() {
            self.time_step(sink)?;
        }
        self.state = RunState::Ended;
        info!("simulation ended after {} time steps", self.step_counter);
        Ok(self.summary())
    }

    fn time_step(&mut self, sink: &mut dyn EventSink) -> Result<(), HerdError> {
        self.step_counter += 1;
        let living = self.population.living();
        let infected_at_start: Vec<PersonId> = living
            .iter()
            .copied()
            .filter(|&id| {
                self.population
                    .get(id)
                    .is_some_and(Person::is_infected)
            })
            .collect();
        trace!(
            "step {}: {} living, {} infected",
            self.step_counter,
            living.len(),
            infected_at_start.len()
        );

        for &source in &infected_at_start {
            self.contact_phase(source, &living, sink)?;
        }
        let deaths = self.resolve_outcomes(&infected_at_start, sink)?;
        let newly_infected = self.apply_newly_infected();
        debug!(
            "step {}: {} newly infected, {} died ({} ever infected, {} dead)",
            self.step_counter, newly_infected, deaths, self.total_infected, self.total_dead
        );

        sink.emit(SimEvent::StepBoundary(StepRow {
            step_number: self.step_counter,
        }))
    }

    /// Runs one infected person's contact trials against the living
    /// snapshot. A person with no other living person to contact skips
    /// their trials for the step.
    fn contact_phase(
        &mut self,
        source: PersonId,
        living: &[PersonId],
        sink: &mut dyn EventSink,
    ) -> Result<(), HerdError> {
        if living.len() < 2 {
            trace!("{source:?} has no eligible contacts this step");
            return Ok(());
        }
        for _ in 0..MAX_CONTACTS {
            let target = self.select_target(source, living);
            let outcome = self.evaluate_contact(target);
            sink.emit(SimEvent::Interaction(InteractionRow {
                source_id: source,
                target_id: target,
                outcome,
            }))?;
        }
        Ok(())
    }

    /// Uniformly selects a living person other than the source. The same
    /// target may be selected multiple times in one step; each selection is
    /// an independent trial.
    fn select_target(&mut self, source: PersonId, living: &[PersonId]) -> PersonId {
        loop {
            let candidate = living[self.rng.sample_range(0..living.len())];
            if candidate != source {
                return candidate;
            }
        }
    }

    fn evaluate_contact(&mut self, target: PersonId) -> InteractionOutcome {
        let person = self
            .population
            .get(target)
            // Snapshot ids always resolve; membership never changes.
            .expect("living snapshot id not in population");
        if person.is_vaccinated() {
            InteractionOutcome::BlockedVaccinated
        } else if person.is_infected() {
            InteractionOutcome::BlockedAlreadyInfected
        } else if self.rng.sample_bool(self.params.transmission_probability) {
            self.newly_infected.insert(target);
            InteractionOutcome::Transmitted
        } else {
            InteractionOutcome::NoTransmission
        }
    }

    /// Resolves survival for everyone who entered this step infected. The
    /// newly infected are not resolved here; they get one full step of
    /// being contagious first.
    fn resolve_outcomes(
        &mut self,
        infected_at_start: &[PersonId],
        sink: &mut dyn EventSink,
    ) -> Result<usize, HerdError> {
        let mut deaths = 0;
        for &person_id in infected_at_start {
            let died = self.rng.sample_bool(self.params.mortality_rate);
            if let Some(person) = self.population.get_mut(person_id) {
                person.resolve_infection(died);
            }
            if died {
                deaths += 1;
                self.total_dead += 1;
                trace!("{person_id:?} died from infection");
            } else {
                trace!("{person_id:?} survived infection");
            }
            sink.emit(SimEvent::Outcome(OutcomeRow { person_id, died }))?;
        }
        Ok(deaths)
    }

    /// Applies the pending-infection buffer and clears it. Applied people
    /// become eligible for contact trials and outcome resolution starting
    /// with the next step.
    fn apply_newly_infected(&mut self) -> usize {
        let count = self.newly_infected.len();
        self.total_infected += count;
        for person_id in std::mem::take(&mut self.newly_infected) {
            if let Some(person) = self.population.get_mut(person_id) {
                person.expose();
            }
        }
        count
    }
}
