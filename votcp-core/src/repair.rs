//! Padding and conflict repair for extracted stop intervals.
//!
//! The predictor needs an analysis window of at least [`MIN_DURATION`] per
//! token and a guard gap of [`GUARD_GAP`] between neighbouring windows. The
//! sweep below walks adjacent pairs left to right:
//!
//! | Condition                               | Action                                  |
//! |-----------------------------------------|-----------------------------------------|
//! | `current.end > next.start`              | fatal overlap                           |
//! | current short, next within `PROXIMITY`  | elongate current, shift next            |
//! | current short                           | elongate current                        |
//! | next within `PROXIMITY`                 | shift next                              |
//!
//! The last interval has no successor, so it is floored separately.

use crate::category::Padding;
use crate::error::RepairError;
use crate::textgrid::Interval;

/// Minimum analysis window in seconds.
pub const MIN_DURATION: f64 = 0.025;

/// Gap at or below which the next interval counts as too close.
pub const PROXIMITY: f64 = 0.020;

/// Gap enforced after shifting a too-close interval.
pub const GUARD_GAP: f64 = 0.021;

/// Offset every interval boundary by the padding, preserving order.
pub fn apply_padding(stops: &[Interval], padding: Padding) -> Vec<Interval> {
    stops
        .iter()
        .map(|stop| {
            Interval::new(
                stop.label.clone(),
                stop.start + padding.start,
                stop.end + padding.end,
            )
        })
        .collect()
}

/// Resolve short windows and proximity conflicts in place.
///
/// `intervals` must be time-ordered. Fails on the first overlapping pair, or
/// if a pair still overlaps once the sweep is done.
pub fn repair(intervals: &mut [Interval], file: &str) -> Result<(), RepairError> {
    for i in 1..intervals.len() {
        let (head, tail) = intervals.split_at_mut(i);
        let current = &mut head[i - 1];
        let next = &mut tail[0];

        if current.end > next.start {
            return Err(overlap(current, next, file));
        }

        let gap = next.start - current.end;

        if current.duration() < MIN_DURATION {
            current.end = current.start + MIN_DURATION;

            if gap <= PROXIMITY {
                next.start = current.end + GUARD_GAP;
                tracing::warn!(
                    "In file {file}, the phone starting at {:.3} was elongated to 25 ms because it did not meet length requirements, and the phone starting at {:.3} was shifted forward due to a proximity issue. Please verify manually that the modified windows still capture the segments accurately.",
                    current.start,
                    next.start
                );
            } else {
                tracing::warn!(
                    "In file {file}, the phone starting at {:.3} was elongated to 25 ms because it did not meet length requirements.",
                    current.start
                );
            }
        } else if gap <= PROXIMITY {
            next.start = current.end + GUARD_GAP;
            tracing::warn!(
                "In file {file}, the phone starting at {:.3} was shifted forward due to a proximity issue.",
                next.start
            );
        }
    }

    if let Some(last) = intervals.last_mut()
        && last.duration() < MIN_DURATION
    {
        last.end = last.start + MIN_DURATION;
        tracing::warn!(
            "In file {file}, the phone starting at {:.3} was elongated to 25 ms because it did not meet length requirements.",
            last.start
        );
    }

    if let Some(pair) = intervals.windows(2).find(|pair| pair[0].end > pair[1].start) {
        return Err(overlap(&pair[0], &pair[1], file));
    }

    Ok(())
}

fn overlap(current: &Interval, next: &Interval, file: &str) -> RepairError {
    RepairError::Overlap {
        current_start: current.start,
        next_start: next.start,
        file: file.to_string(),
    }
}

/// Pad then repair.
pub fn pad_and_repair(
    stops: &[Interval],
    padding: Padding,
    file: &str,
) -> Result<Vec<Interval>, RepairError> {
    let mut padded = apply_padding(stops, padding);
    repair(&mut padded, file)?;
    Ok(padded)
}
