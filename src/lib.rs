//! An agent-based simulation of herd immunity
//!
//! This crate models the spread of an infectious disease through a closed,
//! well-mixed population to study how vaccination coverage,
//! transmissibility, and lethality interact to determine whether an outbreak
//! dies out or persists.
//!
//! The central object is the [`Simulation`], which owns the population and
//! drives discrete time steps until nobody is both alive and infected. Each
//! step, every infected living person attempts a bounded number of contacts
//! with random living people; at step end, everyone who entered the step
//! infected either dies or recovers with immunity, and the people infected
//! during the step become contagious for the next one.
//!
//! A run usually involves the following pieces working together:
//! * A [`Parameters`] value describing the population, the disease, and the
//!   random seed, assembled from command line flags or a JSON file.
//! * The simulation engine itself, which contains all the stochastic logic
//!   and performs no I/O.
//! * An [`EventSink`] that receives a structured notification for every
//!   contact trial, infection outcome, and step boundary, in order. The
//!   [`FileLogger`] persists the stream as CSV files; tests usually use the
//!   in-memory [`EventCollector`].

pub mod error;
pub mod event;
pub mod log;
pub mod params;
pub mod people;
pub mod random;
pub mod report;
pub mod runner;
pub mod simulation;

pub use error::HerdError;
pub use event::{
    EventCollector, EventSink, InteractionOutcome, InteractionRow, MetadataRow, OutcomeRow,
    SimEvent, StepRow,
};
pub use params::Parameters;
pub use people::{Person, PersonId, Population};
pub use random::SimRng;
pub use report::{FileLogger, ReportOptions};
pub use simulation::{Simulation, SimulationSummary, MAX_CONTACTS};
