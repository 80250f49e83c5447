//! Source of the random pixel draws used by k-means initialization and
//! empty-cluster reseeding.

use rand::Rng;
use rand::rngs::{StdRng, ThreadRng};

/// Picks uniformly distributed indices.
pub trait RandomSource {
    /// Return an index in `0..len`. `len` is never zero.
    fn pick_index(&mut self, len: usize) -> usize;
}

impl RandomSource for StdRng {
    fn pick_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

impl RandomSource for ThreadRng {
    fn pick_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn pick_index(&mut self, len: usize) -> usize {
        (**self).pick_index(len)
    }
}

/// Replays a fixed script of indices, wrapping around when exhausted.
///
/// Each scripted value is reduced modulo the requested range, so a script
/// written for one buffer stays valid on a smaller one.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    script: Vec<usize>,
    pos: usize,
}

impl SequenceSource {
    pub fn new(script: Vec<usize>) -> Self {
        Self { script, pos: 0 }
    }

    /// Number of indices drawn so far.
    pub fn draws(&self) -> usize {
        self.pos
    }
}

impl RandomSource for SequenceSource {
    fn pick_index(&mut self, len: usize) -> usize {
        if self.script.is_empty() {
            self.pos += 1;
            return 0;
        }
        let value = self.script[self.pos % self.script.len()];
        self.pos += 1;
        value % len
    }
}
