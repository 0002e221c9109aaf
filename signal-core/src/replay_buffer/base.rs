//! FIFO experience memory.
use super::{MemoryConfig, Transition};
use crate::{ExperienceBufferBase, ReplayBufferBase};
use anyhow::Result;
use rand::{rngs::StdRng, seq::index, SeedableRng};
use std::collections::VecDeque;

/// Fixed-capacity FIFO memory of transitions.
pub struct Memory {
    capacity: usize,
    min_size: usize,
    samples: VecDeque<Transition>,
    rng: StdRng,
}

impl Memory {
    /// Returns an iterator over the stored transitions, oldest first.
    pub fn iter(&self) -> std::collections::vec_deque::Iter<Transition> {
        self.samples.iter()
    }

    /// The maximum number of stored transitions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of transitions required before sampling returns anything.
    pub fn min_size(&self) -> usize {
        self.min_size
    }
}

impl ExperienceBufferBase for Memory {
    type Item = Transition;

    fn push(&mut self, tr: Transition) -> Result<()> {
        self.samples.push_back(tr);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

impl ReplayBufferBase for Memory {
    type Config = MemoryConfig;
    type Batch = Vec<Transition>;

    fn build(config: &Self::Config) -> Self {
        Self {
            capacity: config.capacity,
            min_size: config.min_size,
            samples: VecDeque::with_capacity(config.capacity.min(1 << 16)),
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Samples `min(size, len)` transitions uniformly without replacement.
    ///
    /// Returns an empty batch while the memory holds fewer than `min_size` transitions.
    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        let len = self.samples.len();
        if len < self.min_size {
            return Ok(vec![]);
        }

        let ixs = index::sample(&mut self.rng, len, size.min(len));
        Ok(ixs.iter().map(|ix| self.samples[ix].clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(i: usize) -> Transition {
        Transition::new(vec![i as f32], i % 3, -(i as f32), vec![i as f32 + 1.0])
    }

    fn memory(capacity: usize, min_size: usize) -> Memory {
        Memory::build(&MemoryConfig::default().capacity(capacity).min_size(min_size))
    }

    #[test]
    fn test_fifo_eviction() -> Result<()> {
        let mut memory = memory(5, 0);
        for i in 0..12 {
            memory.push(transition(i))?;
            assert!(memory.len() <= 5);
        }
        let states: Vec<f32> = memory.iter().map(|t| t.state[0]).collect();
        assert_eq!(states, vec![7.0, 8.0, 9.0, 10.0, 11.0]);
        Ok(())
    }

    #[test]
    fn test_batch_below_min_size_is_empty() -> Result<()> {
        let mut memory = memory(100, 10);
        for i in 0..9 {
            memory.push(transition(i))?;
            assert!(memory.batch(4)?.is_empty());
        }
        memory.push(transition(9))?;
        assert_eq!(memory.batch(4)?.len(), 4);
        Ok(())
    }

    #[test]
    fn test_batch_larger_than_len_returns_all_once() -> Result<()> {
        let mut memory = memory(100, 1);
        for i in 0..7 {
            memory.push(transition(i))?;
        }
        let mut states: Vec<usize> = memory
            .batch(50)?
            .iter()
            .map(|t| t.state[0] as usize)
            .collect();
        states.sort_unstable();
        assert_eq!(states, (0..7).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn test_batch_without_replacement() -> Result<()> {
        let mut memory = memory(100, 1);
        for i in 0..40 {
            memory.push(transition(i))?;
        }
        for _ in 0..20 {
            let mut states: Vec<usize> = memory
                .batch(16)?
                .iter()
                .map(|t| t.state[0] as usize)
                .collect();
            assert_eq!(states.len(), 16);
            states.sort_unstable();
            states.dedup();
            assert_eq!(states.len(), 16);
        }
        Ok(())
    }
}
