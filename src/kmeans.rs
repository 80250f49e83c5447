//! K-means clustering over the colors of a pixel buffer.
//!
//! Centroids start as random pixel colors (drawn with replacement), then the
//! loop alternates nearest-centroid assignment and mean recomputation until
//! the configured stability test passes or the iteration cap is reached.
//! Clusters that end up empty are reseeded with a fresh random pixel color so
//! the palette always holds exactly `k` entries.

use crate::color::{Color, distance, distance_stats, nearest_color_index};
use crate::error::{QuantizeError, Result};
use crate::pixel_buffer::PixelBuffer;
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Default upper bound on assignment/recompute passes.
pub const DEFAULT_MAX_ITERATIONS: usize = 20;

/// Default threshold under which the stability measure counts as converged.
pub const DEFAULT_EPSILON: f64 = 1e-4;

/// What the convergence test compares between two iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    /// Largest distance any centroid moved.
    #[default]
    CentroidShift,
    /// Largest change of any cluster's variance (mean squared distance of its
    /// members to the centroid; 0 for an empty cluster).
    VarianceDelta,
}

/// Tuning knobs for a clustering run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansOptions {
    /// Hard cap on iterations, reached or not converged (default: 20)
    pub max_iterations: usize,
    /// Convergence threshold in normalized distance units (default: 1e-4)
    pub epsilon: f64,
    /// Stability test used for the whole run (default: centroid shift)
    pub stability: Stability,
}

impl Default for KMeansOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            epsilon: DEFAULT_EPSILON,
            stability: Stability::default(),
        }
    }
}

impl KMeansOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(QuantizeError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(QuantizeError::InvalidConfig(format!(
                "epsilon must be a finite non-negative number, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Outcome of [`cluster`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterResult {
    /// One centroid per cluster, in cluster order.
    pub palette: Vec<Color>,
    /// Cluster index of every pixel, from the last completed pass.
    pub assignment: Vec<usize>,
    /// Number of passes run.
    pub iterations: usize,
    /// Whether the stability test passed before the cap.
    pub converged: bool,
}

/// Cluster membership as pixel indices grouped by cluster.
///
/// `members[offsets[c]..offsets[c + 1]]` lists the pixels of cluster `c`.
/// The vectors are reused across iterations.
struct ClusterArena {
    offsets: Vec<usize>,
    members: Vec<usize>,
    cursor: Vec<usize>,
}

impl ClusterArena {
    fn new(k: usize, pixel_count: usize) -> Self {
        Self {
            offsets: vec![0; k + 1],
            members: vec![0; pixel_count],
            cursor: vec![0; k],
        }
    }

    fn rebuild(&mut self, assignment: &[usize]) {
        self.offsets.iter_mut().for_each(|o| *o = 0);
        for &c in assignment {
            self.offsets[c + 1] += 1;
        }
        for c in 1..self.offsets.len() {
            self.offsets[c] += self.offsets[c - 1];
        }
        self.cursor.copy_from_slice(&self.offsets[..self.offsets.len() - 1]);
        for (pixel, &c) in assignment.iter().enumerate() {
            self.members[self.cursor[c]] = pixel;
            self.cursor[c] += 1;
        }
    }

    #[inline]
    fn members(&self, cluster: usize) -> &[usize] {
        &self.members[self.offsets[cluster]..self.offsets[cluster + 1]]
    }

    fn len(&self) -> usize {
        self.cursor.len()
    }
}

/// Run k-means on the colors of `buffer`.
///
/// Requires a non-empty buffer and `1 <= k <= pixel count`. `k` may exceed
/// the number of distinct colors, in which case the palette can contain
/// duplicates.
pub fn cluster<R: RandomSource + ?Sized>(
    buffer: &PixelBuffer,
    k: usize,
    options: &KMeansOptions,
    rng: &mut R,
) -> Result<ClusterResult> {
    if k == 0 {
        return Err(QuantizeError::InvalidConfig("k must be at least 1".to_string()));
    }
    options.validate()?;
    if buffer.is_empty() {
        return Err(QuantizeError::EmptyBuffer);
    }
    if k > buffer.pixel_count() {
        return Err(QuantizeError::InvalidConfig(format!(
            "k ({}) exceeds the pixel count ({})",
            k,
            buffer.pixel_count()
        )));
    }

    let colors: Vec<Color> = buffer.colors().collect();
    let n = colors.len();

    let mut centroids: Vec<Color> = (0..k).map(|_| colors[rng.pick_index(n)]).collect();
    let mut assignment = vec![0usize; n];
    let mut arena = ClusterArena::new(k, n);
    let mut previous_variance = vec![1.0f64; k];

    let mut iterations = 0;
    let mut converged = false;

    while iterations < options.max_iterations {
        iterations += 1;

        assign(&colors, &centroids, &mut assignment);
        arena.rebuild(&assignment);
        let next = recompute_centroids(&colors, &arena, rng);

        let change = match options.stability {
            Stability::CentroidShift => {
                let stats = distance_stats(&centroids, &next);
                debug!(
                    iteration = iterations,
                    max_shift = %format!("{:.6}", stats.max),
                    mean_shift = %format!("{:.6}", stats.mean),
                    "k-means centroid shift"
                );
                stats.max
            }
            Stability::VarianceDelta => {
                let mut delta_max = 0.0f64;
                for (c, previous) in previous_variance.iter_mut().enumerate() {
                    let variance = cluster_variance(&colors, arena.members(c), &next[c]);
                    delta_max = delta_max.max((*previous - variance).abs());
                    *previous = variance;
                }
                debug!(
                    iteration = iterations,
                    max_variance_delta = %format!("{:.6}", delta_max),
                    "k-means variance delta"
                );
                delta_max
            }
        };

        centroids = next;
        if change < options.epsilon {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            k,
            iterations, "k-means stopped at the iteration cap without converging"
        );
    }

    Ok(ClusterResult {
        palette: centroids,
        assignment,
        iterations,
        converged,
    })
}

/// Nearest-centroid index for every color.
fn assign(colors: &[Color], centroids: &[Color], assignment: &mut [usize]) {
    for (slot, color) in assignment.iter_mut().zip(colors) {
        // centroids is never empty here
        *slot = nearest_color_index(color, centroids).unwrap_or(0);
    }
}

/// Per-channel mean of each cluster; empty clusters get a random pixel color.
fn recompute_centroids<R: RandomSource + ?Sized>(
    colors: &[Color],
    arena: &ClusterArena,
    rng: &mut R,
) -> Vec<Color> {
    (0..arena.len())
        .map(|c| {
            let members = arena.members(c);
            if members.is_empty() {
                let reseed = colors[rng.pick_index(colors.len())];
                trace!(cluster = c, color = ?reseed, "reseeding empty cluster");
                return reseed;
            }
            mean_color(members.iter().map(|&i| &colors[i]), members.len())
        })
        .collect()
}

fn mean_color<'a>(colors: impl Iterator<Item = &'a Color>, count: usize) -> Color {
    let (mut sr, mut sg, mut sb) = (0u64, 0u64, 0u64);
    for c in colors {
        sr += c.r as u64;
        sg += c.g as u64;
        sb += c.b as u64;
    }
    let n = count as f64;
    let channel = |sum: u64| (sum as f64 / n).round().clamp(0.0, 255.0) as u8;
    Color::new(channel(sr), channel(sg), channel(sb))
}

fn cluster_variance(colors: &[Color], members: &[usize], centroid: &Color) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let sum: f64 = members
        .iter()
        .map(|&i| {
            let d = distance(&colors[i], centroid);
            d * d
        })
        .sum();
    sum / members.len() as f64
}

#[cfg(test)]
mod tests {
    include!("kmeans_tests.rs");
}
