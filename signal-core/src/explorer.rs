//! Epsilon-greedy action selection.
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Epsilon-greedy explorer.
///
/// Epsilon decays linearly over training episodes, from `eps_start` in the first
/// episode towards `eps_final`. The value for an episode is computed by the
/// [`Trainer`](crate::Trainer) and passed to the controllers.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    /// Epsilon in the first episode.
    pub eps_start: f64,

    /// Epsilon approached in the last episode.
    pub eps_final: f64,
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self {
            eps_start: 1.0,
            eps_final: 0.0,
        }
    }
}

impl EpsilonGreedy {
    /// Set the epsilon value at the start.
    pub fn eps_start(mut self, v: f64) -> Self {
        self.eps_start = v;
        self
    }

    /// Set the epsilon value at the final episode.
    pub fn eps_final(mut self, v: f64) -> Self {
        self.eps_final = v;
        self
    }

    /// Epsilon of the given episode, `eps_start - (eps_start - eps_final) * episode / n_episodes`.
    pub fn epsilon(&self, episode: usize, n_episodes: usize) -> f64 {
        if n_episodes == 0 {
            return self.eps_start;
        }
        let frac = episode as f64 / n_episodes as f64;
        self.eps_start - (self.eps_start - self.eps_final) * frac
    }

    /// Takes an action based on action values.
    ///
    /// With probability `eps` the action is uniform over all actions, otherwise it
    /// is the first index attaining the maximum Q-value.
    pub fn action(q_values: &[f32], eps: f64, rng: &mut impl Rng) -> usize {
        if rng.gen::<f64>() < eps {
            rng.gen_range(0..q_values.len())
        } else {
            argmax(q_values)
        }
    }
}

/// First index attaining the maximum value.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_argmax_ties_pick_first() {
        assert_eq!(argmax(&[0.5, 2.0, 2.0, -1.0]), 1);
        assert_eq!(argmax(&[3.0, 3.0, 3.0]), 0);
    }

    #[test]
    fn test_linear_decay() {
        let explorer = EpsilonGreedy::default();
        assert_eq!(explorer.epsilon(0, 100), 1.0);
        assert!((explorer.epsilon(50, 100) - 0.5).abs() < 1e-12);
        assert!((explorer.epsilon(99, 100) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_greedy_and_random() {
        let mut rng = StdRng::seed_from_u64(0);
        let q = [0.1, 0.9, 0.3];
        for _ in 0..100 {
            assert_eq!(EpsilonGreedy::action(&q, 0.0, &mut rng), 1);
        }
        let mut seen = [false; 3];
        for _ in 0..300 {
            seen[EpsilonGreedy::action(&q, 1.0, &mut rng)] = true;
        }
        assert_eq!(seen, [true; 3]);
    }
}
