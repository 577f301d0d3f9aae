//! Structured notifications emitted by the simulation engine.
//!
//! The engine performs no I/O of its own. Everything of note that happens
//! during a run — the parameters in force, every contact trial, every
//! infection outcome, and every step boundary — is delivered as a
//! [`SimEvent`] to an [`EventSink`] in the exact order it occurred.
//! Collaborators decide what to do with the stream: [`FileLogger`] writes it
//! to CSV files, while tests usually substitute an [`EventCollector`].
//!
//! [`FileLogger`]: crate::report::FileLogger

use serde_derive::{Deserialize, Serialize};

use crate::error::HerdError;
use crate::people::PersonId;

/// What happened when an infected person contacted a random living person.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionOutcome {
    /// The target was susceptible and the transmission roll succeeded.
    Transmitted,
    /// The target's vaccination (innate or acquired) blocked transmission.
    BlockedVaccinated,
    /// The target is already carrying the disease.
    BlockedAlreadyInfected,
    /// The target was susceptible but the transmission roll failed.
    NoTransmission,
}

/// Run parameters, emitted once before the first time step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetadataRow {
    pub population_size: usize,
    pub vaccination_coverage: f64,
    pub virus_name: String,
    pub mortality_rate: f64,
    pub transmission_probability: f64,
}

/// One contact trial between an infected person and a random living person.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct InteractionRow {
    pub source_id: PersonId,
    pub target_id: PersonId,
    pub outcome: InteractionOutcome,
}

/// Resolution of one person's infection: death, or recovery with immunity.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRow {
    pub person_id: PersonId,
    pub died: bool,
}

/// Marks the end of a completed time step.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StepRow {
    pub step_number: u32,
}

/// A single notification from the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    Metadata(MetadataRow),
    Interaction(InteractionRow),
    Outcome(OutcomeRow),
    StepBoundary(StepRow),
}

/// The capability the engine depends on for event delivery.
///
/// Events must be handled in the order received; interaction events within a
/// step arrive in contact-trial order, then outcome events, then the step
/// boundary. A sink may buffer, but a failure to accept an event is fatal to
/// the run.
pub trait EventSink {
    /// # Errors
    ///
    /// Returns a `HerdError` when the sink cannot accept the event.
    fn emit(&mut self, event: SimEvent) -> Result<(), HerdError>;
}

/// An in-memory sink that records every event it receives.
#[derive(Default)]
pub struct EventCollector {
    events: Vec<SimEvent>,
}

impl EventCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn interactions(&self) -> impl Iterator<Item = &InteractionRow> {
        self.events.iter().filter_map(|event| match event {
            SimEvent::Interaction(row) => Some(row),
            _ => None,
        })
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &OutcomeRow> {
        self.events.iter().filter_map(|event| match event {
            SimEvent::Outcome(row) => Some(row),
            _ => None,
        })
    }

    /// Number of completed steps observed so far.
    #[must_use]
    pub fn steps(&self) -> u32 {
        self.events
            .iter()
            .filter(|event| matches!(event, SimEvent::StepBoundary(_)))
            .count() as u32
    }
}

impl EventSink for EventCollector {
    fn emit(&mut self, event: SimEvent) -> Result<(), HerdError> {
        self.events.push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_preserves_order() {
        let mut collector = EventCollector::new();
        collector
            .emit(SimEvent::Interaction(InteractionRow {
                source_id: PersonId(0),
                target_id: PersonId(1),
                outcome: InteractionOutcome::Transmitted,
            }))
            .unwrap();
        collector
            .emit(SimEvent::Outcome(OutcomeRow {
                person_id: PersonId(0),
                died: false,
            }))
            .unwrap();
        collector
            .emit(SimEvent::StepBoundary(StepRow { step_number: 1 }))
            .unwrap();

        assert_eq!(collector.events().len(), 3);
        assert!(matches!(collector.events()[0], SimEvent::Interaction(_)));
        assert!(matches!(collector.events()[2], SimEvent::StepBoundary(_)));
        assert_eq!(collector.steps(), 1);
    }

    #[test]
    fn outcome_serializes_snake_case() {
        let json = serde_json::to_string(&InteractionOutcome::BlockedAlreadyInfected).unwrap();
        assert_eq!(json, "\"blocked_already_infected\"");
    }
}
