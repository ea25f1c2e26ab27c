//! Seeded train/test partitioning.

use rand::seq::SliceRandom;

use crate::error::{EngineError, EngineResult};
use crate::frame::Frame;

use super::rng_for;

/// Partition `frame` into `(train, test)`.
///
/// Row indices are shuffled and the first `round(rows * test_fraction)` go to `test`. With
/// `stratify`, the same happens independently inside each stratum (first-appearance order) and the
/// partitions are concatenated. Every row lands in exactly one output.
pub fn split(
    frame: &Frame,
    test_fraction: f64,
    stratify: Option<&str>,
    seed: Option<u64>,
) -> EngineResult<(Frame, Frame)> {
    if !(0.0..=1.0).contains(&test_fraction) {
        return Err(EngineError::argument(format!(
            "test fraction must be within [0, 1], got {test_fraction}"
        )));
    }
    let strata: Vec<Vec<usize>> = match stratify {
        Some(name) => frame
            .column(name)?
            .groups()
            .into_iter()
            .map(|(_, rows)| rows)
            .collect(),
        None => vec![(0..frame.row_count()).collect()],
    };

    let mut rng = rng_for(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();
    for mut rows in strata {
        rows.shuffle(&mut rng);
        let n_test = ((rows.len() as f64 * test_fraction).round() as usize).min(rows.len());
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
    }
    Ok((frame.take_unchecked(&train), frame.take_unchecked(&test)))
}
