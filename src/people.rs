//! People and the population they form.
//!
//! A [`Person`] is an agent with a stable identity, a vaccination status,
//! a vitality flag, and an infection flag. The [`Population`] is a
//! fixed-membership collection of people: nobody joins or leaves once the
//! simulation starts, and the dead stay in the collection with
//! `alive = false`. People are looked up by [`PersonId`] through an explicit
//! id-to-index map rather than by storage position.

use std::fmt::{self, Display, Formatter};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::params::Parameters;
use crate::random::SimRng;

/// A unique, stable identifier for a person, assigned sequentially from 0
/// in creation order.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct PersonId(pub(crate) usize);

impl PersonId {
    #[must_use]
    pub fn value(self) -> usize {
        self.0
    }
}

impl fmt::Debug for PersonId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Person {}", self.0)
    }
}

impl Display for PersonId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One member of the population.
#[derive(Clone, Debug)]
pub struct Person {
    id: PersonId,
    vaccinated: bool,
    alive: bool,
    infected: bool,
}

impl Person {
    fn new_susceptible(id: PersonId, vaccinated: bool) -> Self {
        Person {
            id,
            vaccinated,
            alive: true,
            infected: false,
        }
    }

    fn new_infected(id: PersonId) -> Self {
        Person {
            id,
            vaccinated: false,
            alive: true,
            infected: true,
        }
    }

    #[must_use]
    pub fn id(&self) -> PersonId {
        self.id
    }

    /// True when immune, whether vaccinated up front or recovered.
    #[must_use]
    pub fn is_vaccinated(&self) -> bool {
        self.vaccinated
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn is_infected(&self) -> bool {
        self.infected
    }

    /// True when a contact trial can infect this person.
    #[must_use]
    pub fn is_susceptible(&self) -> bool {
        self.alive && !self.vaccinated && !self.infected
    }

    /// Marks the person as carrying the disease. Only the engine calls this,
    /// and only for people who were susceptible when the trial ran.
    pub(crate) fn expose(&mut self) {
        self.infected = true;
    }

    /// Resolves this person's infection: death, or recovery with acquired
    /// immunity. Either way the infection is cleared.
    pub(crate) fn resolve_infection(&mut self, died: bool) {
        if died {
            self.alive = false;
        } else {
            self.vaccinated = true;
        }
        self.infected = false;
    }
}

/// An ordered, fixed-size collection of people.
pub struct Population {
    people: Vec<Person>,
    // Decouples identifier values from storage position.
    index: FxHashMap<PersonId, usize>,
}

impl Population {
    /// Builds the starting population: `initial_infected` infected people
    /// first, then for each remaining slot a uniform draw against
    /// `vaccination_coverage` decides vaccinated vs. unvaccinated
    /// susceptible. Creation order determines identifier assignment.
    pub(crate) fn generate(params: &Parameters, rng: &mut SimRng) -> Self {
        let mut people = Vec::with_capacity(params.population_size);
        for number in 0..params.population_size {
            let id = PersonId(number);
            if number < params.initial_infected {
                people.push(Person::new_infected(id));
            } else {
                let vaccinated = rng.sample_bool(params.vaccination_coverage);
                people.push(Person::new_susceptible(id, vaccinated));
            }
        }
        let index = people
            .iter()
            .enumerate()
            .map(|(position, person)| (person.id(), position))
            .collect();
        Population { people, index }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.people.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.index.get(&id).map(|&position| &self.people[position])
    }

    pub(crate) fn get_mut(&mut self, id: PersonId) -> Option<&mut Person> {
        self.index
            .get(&id)
            .map(|&position| &mut self.people[position])
    }

    /// Iterates over everyone, in identifier order.
    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.people.iter()
    }

    /// The living snapshot: ids of everyone with `alive = true`, in
    /// identifier order. Captured once per time step and used for target
    /// selection throughout that step.
    #[must_use]
    pub fn living(&self) -> Vec<PersonId> {
        self.people
            .iter()
            .filter(|person| person.is_alive())
            .map(Person::id)
            .collect()
    }
}
