//! Replay recorded samples through the strobe primitive.
//!
//! Useful when tuning latch/unlatch: feed the ADC readings captured while
//! pressing and releasing one key, and see where it would have latched.

use esc_matrix::mock::Bench;
use esc_matrix::{AnalogStrobe, Thresholds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Press,
    Release,
}

/// One replayed sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub sample: u16,
    /// The comparison point in force for this sample.
    pub threshold: u16,
    pub active: bool,
    pub edge: Option<Edge>,
}

/// Run every sample through a one-key matrix, starting released.
pub fn replay(thresholds: Thresholds, samples: &[u16]) -> Vec<Step> {
    let bench = Bench::new();
    let mut line = bench.sense_line(0);
    let mut strobe = AnalogStrobe::new(bench.drain(), bench.adc(), thresholds);

    let mut active = false;
    samples
        .iter()
        .map(|&sample| {
            bench.set_level(0, 0, sample);
            let threshold = thresholds.comparison_point(active);
            let now = strobe.strobe(&mut line, active);
            let edge = match (active, now) {
                (false, true) => Some(Edge::Press),
                (true, false) => Some(Edge::Release),
                _ => None,
            };
            active = now;
            Step {
                sample,
                threshold,
                active,
                edge,
            }
        })
        .collect()
}

/// Count of press and release edges.
pub fn edge_counts(steps: &[Step]) -> (usize, usize) {
    steps.iter().fold((0, 0), |(press, release), step| match step.edge {
        Some(Edge::Press) => (press + 1, release),
        Some(Edge::Release) => (press, release + 1),
        None => (press, release),
    })
}
