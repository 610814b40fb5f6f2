//! Fixed-size population of evaluated candidates.

use std::ops::Index;

use crate::schema::{Genome, Origin};

/// A candidate individual in the population.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Unique identifier.
    pub id: u64,
    /// The genome.
    pub genome: Genome,
    /// Cached fitness of `genome`. Only recomputed when the genome changes.
    pub fitness: u64,
    /// Operator that produced this genome.
    pub origin: Origin,
    /// Generation created.
    pub generation: u64,
}

/// Ordered candidates; best first once sorted.
///
/// The length is fixed when the population is built. Slots are overwritten in
/// place with [`Population::replace`], never added or removed.
#[derive(Debug, Clone, Default)]
pub struct Population {
    candidates: Vec<Candidate>,
}

impl Population {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    /// Stable sort ascending by fitness, so equal scores keep their order.
    pub fn sort(&mut self) {
        self.candidates.sort_by_key(|c| c.fitness);
    }

    pub fn is_sorted(&self) -> bool {
        self.candidates.windows(2).all(|w| w[0].fitness <= w[1].fitness)
    }

    /// Overwrite one slot, returning the previous occupant.
    pub fn replace(&mut self, slot: usize, candidate: Candidate) -> Candidate {
        std::mem::replace(&mut self.candidates[slot], candidate)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Lowest-fitness candidate, independent of sort state.
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.iter().min_by_key(|c| c.fitness)
    }

    pub fn worst(&self) -> Option<&Candidate> {
        self.candidates.iter().max_by_key(|c| c.fitness)
    }

    pub fn mean_fitness(&self) -> f64 {
        if self.candidates.is_empty() {
            return 0.0;
        }
        self.candidates.iter().map(|c| c.fitness as f64).sum::<f64>() / self.len() as f64
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.candidates
    }
}

impl Index<usize> for Population {
    type Output = Candidate;

    fn index(&self, slot: usize) -> &Candidate {
        &self.candidates[slot]
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: u64, fitness: u64) -> Candidate {
        Candidate {
            id,
            genome: Genome::default(),
            fitness,
            origin: Origin::Initial,
            generation: 0,
        }
    }

    #[test]
    fn test_sort_is_stable_and_ascending() {
        let mut population = Population::new(vec![
            candidate(0, 30),
            candidate(1, 10),
            candidate(2, 20),
            candidate(3, 10),
        ]);
        assert!(!population.is_sorted());
        population.sort();
        assert!(population.is_sorted());
        let ids: Vec<u64> = population.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3, 2, 0]);
    }

    #[test]
    fn test_stats() {
        let population = Population::new(vec![candidate(0, 4), candidate(1, 2), candidate(2, 9)]);
        assert_eq!(population.best().unwrap().id, 1);
        assert_eq!(population.worst().unwrap().id, 2);
        assert!((population.mean_fitness() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_replace_keeps_size() {
        let mut population = Population::new(vec![candidate(0, 4), candidate(1, 2)]);
        let old = population.replace(1, candidate(7, 1));
        assert_eq!(old.id, 1);
        assert_eq!(population.len(), 2);
        assert_eq!(population[1].id, 7);
    }
}
