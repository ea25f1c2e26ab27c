//! `head` / `tail` / `random` / `stratified` row selection.

use std::fmt;
use std::str::FromStr;

use rand::seq::index;

use crate::error::{EngineError, EngineResult};
use crate::frame::Frame;

use super::rng_for;

/// Row selection strategy for [`sample()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMethod {
    /// First `size` rows.
    Head,
    /// Last `size` rows.
    Tail,
    /// `size` distinct rows drawn uniformly, in draw order.
    Random,
    /// Proportional random draw within each stratum of a column.
    Stratified,
}

impl fmt::Display for SampleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Head => "head",
            Self::Tail => "tail",
            Self::Random => "random",
            Self::Stratified => "stratified",
        })
    }
}

impl FromStr for SampleMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "head" => Ok(Self::Head),
            "tail" => Ok(Self::Tail),
            "random" => Ok(Self::Random),
            "stratified" => Ok(Self::Stratified),
            _ => Err(EngineError::argument(format!("Unknown sampling method: {s}"))),
        }
    }
}

/// Select rows of `frame` by `method`.
///
/// - `head` / `tail` clamp `size` to the row count and ignore `stratify` and `seed`.
/// - `random` and `stratified` fail with an argument error when `size` exceeds the row count.
/// - `stratified` needs `stratify`; strata follow first appearance, nulls form their own stratum,
///   and each gets `round(count / rows * size)` rows (half away from zero, capped at the stratum
///   size). The output can therefore differ from `size` by rounding.
pub fn sample(
    frame: &Frame,
    method: SampleMethod,
    size: usize,
    stratify: Option<&str>,
    seed: Option<u64>,
) -> EngineResult<Frame> {
    let rows = frame.row_count();
    match method {
        SampleMethod::Head => return Ok(frame.head(size)),
        SampleMethod::Tail => return Ok(frame.tail(size)),
        SampleMethod::Random | SampleMethod::Stratified => {}
    }

    let stratify = match (method, stratify) {
        (SampleMethod::Stratified, None) => {
            return Err(EngineError::argument("stratify column required"));
        }
        (SampleMethod::Stratified, Some(name)) => Some(frame.column(name)?),
        _ => None,
    };
    if size > rows {
        return Err(EngineError::argument(format!(
            "sample size {size} exceeds row count {rows}"
        )));
    }

    let mut rng = rng_for(seed);
    let picked: Vec<usize> = match stratify {
        None => index::sample(&mut rng, rows, size).into_vec(),
        Some(column) => {
            let mut picked = Vec::with_capacity(size);
            for (_, members) in column.groups() {
                let want = allocation(members.len(), rows, size);
                picked.extend(
                    index::sample(&mut rng, members.len(), want)
                        .into_iter()
                        .map(|i| members[i]),
                );
            }
            picked
        }
    };
    Ok(frame.take_unchecked(&picked))
}

fn allocation(stratum: usize, rows: usize, size: usize) -> usize {
    let share = (stratum as f64 / rows as f64 * size as f64).round() as usize;
    share.min(stratum)
}
