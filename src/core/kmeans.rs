//! Lloyd-style k-means over fixed-width colour samples.
//!
//! A run moves through `Initialized -> Assigning -> Updating` and loops
//! until the total centroid movement of one update is at most
//! `stop_threshold` (`Converged`) or `max_iterations` updates have been made
//! (`MaxIterationsReached`). Samples and clusters are addressed by index;
//! labels are a plain `Vec<usize>` parallel to the sample slice.

use crate::core::error::EngineError;
use crate::simd::distance::{euclidean_distance, squared_euclidean};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the initial `k` centroids are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Seeding {
    /// The first `k` distinct samples in input order. Deterministic.
    #[default]
    FirstDistinct,
    /// `k` distinct sample indices drawn uniformly.
    Random { seed: u64 },
    /// k-means++: each further seed is drawn with probability proportional
    /// to its squared distance from the nearest seed so far.
    PlusPlus { seed: u64 },
}

/// What happens to a cluster that ends an assignment step with no members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmptyClusterPolicy {
    /// Move the sample farthest from its centroid into the empty cluster.
    #[default]
    ReseedFarthest,
    /// Leave the previous centroid where it was.
    RetainPrevious,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub k: usize,
    pub max_iterations: usize,
    pub stop_threshold: f32,
    #[serde(default)]
    pub seeding: Seeding,
    #[serde(default)]
    pub empty_cluster: EmptyClusterPolicy,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            k: 7,
            max_iterations: 10,
            stop_threshold: 0.0,
            seeding: Seeding::default(),
            empty_cluster: EmptyClusterPolicy::default(),
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.k == 0 {
            return Err(EngineError::InvalidParameter("k must be at least 1".to_string()));
        }
        if !self.stop_threshold.is_finite() || self.stop_threshold < 0.0 {
            return Err(EngineError::InvalidParameter(format!(
                "stop_threshold must be finite and non-negative, got {}",
                self.stop_threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterState {
    Initialized,
    Assigning,
    Updating,
    Converged,
    MaxIterationsReached,
}

impl ClusterState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ClusterState::Converged | ClusterState::MaxIterationsReached)
    }
}

/// Which terminal condition ended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterStatus {
    Converged,
    MaxIterationsReached,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster<const C: usize> {
    pub centroid: [f32; C],
    pub members: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOutcome<const C: usize> {
    pub centroids: Vec<[f32; C]>,
    /// One label per sample, each in `0..k`.
    pub labels: Vec<usize>,
    pub status: ClusterStatus,
    /// Completed update steps.
    pub iterations: usize,
    /// Total centroid movement of the last update step.
    pub movement: f32,
}

impl<const C: usize> ClusterOutcome<C> {
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Groups sample indices by label.
    pub fn clusters(&self) -> Vec<Cluster<C>> {
        let mut clusters: Vec<Cluster<C>> = self
            .centroids
            .iter()
            .map(|&centroid| Cluster {
                centroid,
                members: Vec::new(),
            })
            .collect();
        for (i, &label) in self.labels.iter().enumerate() {
            clusters[label].members.push(i);
        }
        clusters
    }
}

pub struct ClusterEngine {
    config: ClusterConfig,
}

impl ClusterEngine {
    pub fn new(config: ClusterConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn cluster<const C: usize>(&self, samples: &[[f32; C]]) -> Result<ClusterOutcome<C>, EngineError> {
        let mut run = KMeansRun::new(samples, &self.config)?;
        while !run.state.is_terminal() {
            run.step();
        }
        Ok(run.finish())
    }
}

struct KMeansRun<'a, const C: usize> {
    samples: &'a [[f32; C]],
    config: &'a ClusterConfig,
    state: ClusterState,
    centroids: Vec<[f32; C]>,
    labels: Vec<usize>,
    /// Squared distance of each sample to its assigned centroid.
    distances: Vec<f32>,
    iterations: usize,
    movement: f32,
}

impl<'a, const C: usize> KMeansRun<'a, C> {
    fn new(samples: &'a [[f32; C]], config: &'a ClusterConfig) -> Result<Self, EngineError> {
        config.validate()?;
        if config.k > samples.len() {
            return Err(EngineError::InsufficientSamples {
                k: config.k,
                samples: samples.len(),
            });
        }
        if let Some(i) = samples.iter().position(|s| s.iter().any(|v| !v.is_finite())) {
            return Err(EngineError::InvalidParameter(format!("sample {} has a non-finite channel", i)));
        }

        let centroids = seed_centroids(samples, config.k, config.seeding);
        Ok(Self {
            samples,
            config,
            state: ClusterState::Initialized,
            centroids,
            labels: vec![0; samples.len()],
            distances: vec![0.0; samples.len()],
            iterations: 0,
            movement: 0.0,
        })
    }

    fn step(&mut self) {
        self.state = match self.state {
            ClusterState::Initialized => {
                if self.config.max_iterations == 0 {
                    // Labels against the seeds; centroids stay untouched.
                    self.assign();
                    ClusterState::MaxIterationsReached
                } else {
                    ClusterState::Assigning
                }
            }
            ClusterState::Assigning => {
                self.assign();
                ClusterState::Updating
            }
            ClusterState::Updating => {
                if self.config.empty_cluster == EmptyClusterPolicy::ReseedFarthest {
                    self.reseed_empty();
                }
                self.movement = self.update();
                self.iterations += 1;
                debug!(iteration = self.iterations, movement = self.movement, "k-means update");

                if self.movement <= self.config.stop_threshold {
                    ClusterState::Converged
                } else if self.iterations >= self.config.max_iterations {
                    ClusterState::MaxIterationsReached
                } else {
                    ClusterState::Assigning
                }
            }
            terminal => terminal,
        };
    }

    /// Nearest centroid per sample; ties go to the lower cluster index.
    fn assign(&mut self) {
        let centroids = &self.centroids;
        let nearest: Vec<(usize, f32)> = self
            .samples
            .par_iter()
            .map(|sample| nearest_centroid(sample, centroids))
            .collect();

        for (i, (label, dist)) in nearest.into_iter().enumerate() {
            self.labels[i] = label;
            self.distances[i] = dist;
        }
    }

    fn reseed_empty(&mut self) {
        let k = self.centroids.len();
        let mut counts = vec![0usize; k];
        for &label in &self.labels {
            counts[label] += 1;
        }

        for cluster in 0..k {
            if counts[cluster] > 0 {
                continue;
            }
            // k <= samples, so some other cluster holds at least two.
            let donor = self
                .distances
                .iter()
                .enumerate()
                .filter(|&(i, _)| counts[self.labels[i]] > 1)
                .fold(None, |best: Option<(usize, f32)>, (i, &d)| match best {
                    Some((_, best_d)) if best_d >= d => best,
                    _ => Some((i, d)),
                });

            if let Some((i, dist)) = donor {
                debug!(cluster, sample = i, distance = dist.sqrt(), "Reseeding empty cluster");
                counts[self.labels[i]] -= 1;
                counts[cluster] += 1;
                self.labels[i] = cluster;
                self.distances[i] = 0.0;
            }
        }
    }

    /// Recomputes every centroid as the mean of its members and returns the
    /// summed distance the centroids moved.
    fn update(&mut self) -> f32 {
        let k = self.centroids.len();
        let mut sums = vec![[0.0f64; C]; k];
        let mut counts = vec![0usize; k];

        for (sample, &label) in self.samples.iter().zip(&self.labels) {
            counts[label] += 1;
            for (acc, &v) in sums[label].iter_mut().zip(sample.iter()) {
                *acc += v as f64;
            }
        }

        let mut movement = 0.0;
        for cluster in 0..k {
            if counts[cluster] == 0 {
                continue;
            }
            let mut mean = [0.0f32; C];
            for (m, &s) in mean.iter_mut().zip(sums[cluster].iter()) {
                *m = (s / counts[cluster] as f64) as f32;
            }
            movement += euclidean_distance(&self.centroids[cluster], &mean);
            self.centroids[cluster] = mean;
        }
        movement
    }

    fn finish(self) -> ClusterOutcome<C> {
        let status = match self.state {
            ClusterState::Converged => ClusterStatus::Converged,
            _ => ClusterStatus::MaxIterationsReached,
        };
        ClusterOutcome {
            centroids: self.centroids,
            labels: self.labels,
            status,
            iterations: self.iterations,
            movement: self.movement,
        }
    }
}

fn nearest_centroid<const C: usize>(sample: &[f32; C], centroids: &[[f32; C]]) -> (usize, f32) {
    let mut best = (0, f32::MAX);
    for (i, centroid) in centroids.iter().enumerate() {
        let d = squared_euclidean(sample, centroid);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

fn seed_centroids<const C: usize>(samples: &[[f32; C]], k: usize, seeding: Seeding) -> Vec<[f32; C]> {
    match seeding {
        Seeding::FirstDistinct => {
            let mut chosen: Vec<usize> = Vec::with_capacity(k);
            for (i, sample) in samples.iter().enumerate() {
                if chosen.len() == k {
                    break;
                }
                if !chosen.iter().any(|&c| samples[c] == *sample) {
                    chosen.push(i);
                }
            }
            // Fewer than k distinct colours: pad with the earliest unused
            // samples and let the empty-cluster policy sort them out.
            let mut next = 0;
            while chosen.len() < k {
                if !chosen.contains(&next) {
                    chosen.push(next);
                }
                next += 1;
            }
            chosen.into_iter().map(|i| samples[i]).collect()
        }
        Seeding::Random { seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut indices = rand::seq::index::sample(&mut rng, samples.len(), k).into_vec();
            indices.sort_unstable();
            indices.into_iter().map(|i| samples[i]).collect()
        }
        Seeding::PlusPlus { seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut centroids = Vec::with_capacity(k);
            centroids.push(samples[rng.gen_range(0..samples.len())]);

            let mut nearest: Vec<f64> = samples
                .iter()
                .map(|s| squared_euclidean(s, &centroids[0]) as f64)
                .collect();

            while centroids.len() < k {
                let total: f64 = nearest.iter().sum();
                let pick = if total > 0.0 {
                    let mut target = rng.gen::<f64>() * total;
                    let mut pick = samples.len() - 1;
                    for (i, &d) in nearest.iter().enumerate() {
                        if target < d {
                            pick = i;
                            break;
                        }
                        target -= d;
                    }
                    pick
                } else {
                    rng.gen_range(0..samples.len())
                };

                let centroid = samples[pick];
                for (d, s) in nearest.iter_mut().zip(samples) {
                    *d = d.min(squared_euclidean(s, &centroid) as f64);
                }
                centroids.push(centroid);
            }
            centroids
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Vec<[f32; 3]> {
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 1.0, 1.0],
            [250.0, 250.0, 250.0],
            [249.0, 249.0, 249.0],
        ]
    }

    fn config(k: usize, max_iterations: usize) -> ClusterConfig {
        ClusterConfig {
            k,
            max_iterations,
            ..ClusterConfig::default()
        }
    }

    #[test]
    fn test_two_blobs_converge() {
        let engine = ClusterEngine::new(config(2, 20)).unwrap();
        let outcome = engine.cluster(&two_blobs()).unwrap();

        assert_eq!(outcome.status, ClusterStatus::Converged);
        assert_eq!(outcome.labels[0], outcome.labels[1]);
        assert_eq!(outcome.labels[2], outcome.labels[3]);
        assert_ne!(outcome.labels[0], outcome.labels[2]);

        let low = outcome.centroids[outcome.labels[0]];
        let high = outcome.centroids[outcome.labels[2]];
        for c in 0..3 {
            assert!((low[c] - 0.5).abs() < 1e-4);
            assert!((high[c] - 249.5).abs() < 1e-4);
        }
    }

    #[test]
    fn test_zero_iterations_keeps_seeds() {
        let samples = two_blobs();
        let engine = ClusterEngine::new(config(2, 0)).unwrap();
        let outcome = engine.cluster(&samples).unwrap();

        assert_eq!(outcome.status, ClusterStatus::MaxIterationsReached);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.centroids, vec![samples[0], samples[1]]);
        assert_eq!(outcome.labels, vec![0, 1, 1, 1]);
    }

    #[test]
    fn test_max_iterations_reached() {
        let engine = ClusterEngine::new(config(2, 1)).unwrap();
        let outcome = engine.cluster(&two_blobs()).unwrap();
        assert_eq!(outcome.status, ClusterStatus::MaxIterationsReached);
        assert_eq!(outcome.iterations, 1);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            ClusterEngine::new(config(0, 10)),
            Err(EngineError::InvalidParameter(_))
        ));
        let bad_threshold = ClusterConfig {
            stop_threshold: -1.0,
            ..ClusterConfig::default()
        };
        assert!(matches!(
            ClusterEngine::new(bad_threshold),
            Err(EngineError::InvalidParameter(_))
        ));

        let engine = ClusterEngine::new(config(5, 10)).unwrap();
        assert_eq!(
            engine.cluster(&two_blobs()),
            Err(EngineError::InsufficientSamples { k: 5, samples: 4 })
        );
    }

    #[test]
    fn test_duplicate_samples_fill_every_cluster() {
        let samples = vec![[7.0f32, 7.0, 7.0]; 5];
        let engine = ClusterEngine::new(config(3, 10)).unwrap();
        let outcome = engine.cluster(&samples).unwrap();

        assert_eq!(outcome.labels.len(), 5);
        let clusters = outcome.clusters();
        assert!(clusters.iter().all(|c| !c.members.is_empty()));
        assert!(outcome.centroids.iter().all(|c| *c == [7.0, 7.0, 7.0]));
    }

    #[test]
    fn test_retain_previous_policy_keeps_labels_in_range() {
        let samples = vec![[7.0f32, 7.0, 7.0]; 5];
        let cfg = ClusterConfig {
            k: 3,
            max_iterations: 5,
            empty_cluster: EmptyClusterPolicy::RetainPrevious,
            ..ClusterConfig::default()
        };
        let outcome = ClusterEngine::new(cfg).unwrap().cluster(&samples).unwrap();
        assert!(outcome.labels.iter().all(|&l| l < 3));
        assert_eq!(outcome.centroids.len(), 3);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let samples: Vec<[f32; 3]> = (0..200)
            .map(|i| {
                let v = (i * 37 % 256) as f32;
                [v, (v * 0.5) % 256.0, 255.0 - v]
            })
            .collect();

        for seeding in [Seeding::Random { seed: 42 }, Seeding::PlusPlus { seed: 42 }] {
            let cfg = ClusterConfig {
                k: 4,
                max_iterations: 50,
                seeding,
                ..ClusterConfig::default()
            };
            let engine = ClusterEngine::new(cfg).unwrap();
            let first = engine.cluster(&samples).unwrap();
            let second = engine.cluster(&samples).unwrap();
            assert_eq!(first, second);
            assert!(first.labels.iter().all(|&l| l < 4));
        }
    }

    #[test]
    fn test_centroids_are_member_means() {
        let samples: Vec<[f32; 3]> = (0..60)
            .map(|i| {
                let base = if i % 3 == 0 { 20.0 } else if i % 3 == 1 { 120.0 } else { 220.0 };
                [base + (i % 5) as f32, base, base - (i % 7) as f32]
            })
            .collect();
        let cfg = ClusterConfig {
            k: 3,
            max_iterations: 100,
            ..ClusterConfig::default()
        };
        let outcome = ClusterEngine::new(cfg).unwrap().cluster(&samples).unwrap();
        assert_eq!(outcome.status, ClusterStatus::Converged);

        for cluster in outcome.clusters() {
            let mut mean = [0.0f32; 3];
            for &m in &cluster.members {
                for c in 0..3 {
                    mean[c] += samples[m][c] / cluster.members.len() as f32;
                }
            }
            for c in 0..3 {
                assert!((mean[c] - cluster.centroid[c]).abs() < 1e-3);
            }
        }
    }
}
