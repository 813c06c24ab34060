//! Selection of word-initial stop intervals from a phone tier.

use crate::category::{StopFilter, is_voiced_stop};
use crate::textgrid::Interval;
use std::collections::HashSet;

/// Timestamp resolution used to compare phone and word boundaries.
const TICKS_PER_SEC: f64 = 100_000.0;

/// Truncate a time in seconds to an integer tick of 10 µs.
pub fn quantize(secs: f64) -> i64 {
    (secs * TICKS_PER_SEC) as i64
}

/// Quantized start times of every word interval.
pub fn word_starts(words: &[Interval]) -> HashSet<i64> {
    words.iter().map(|word| quantize(word.start)).collect()
}

/// Stops selected from one phone tier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extraction {
    /// Matched intervals in tier order
    pub stops: Vec<Interval>,
    /// Lower-cased labels of matched voiced stops
    pub voiced: Vec<String>,
}

/// Keep phones accepted by `filter` that start exactly at a word boundary.
pub fn extract_stops(phones: &[Interval], filter: &StopFilter, word_starts: &HashSet<i64>) -> Extraction {
    let mut extraction = Extraction::default();

    for phone in phones {
        if !filter.accepts(&phone.label) || !word_starts.contains(&quantize(phone.start)) {
            continue;
        }

        if is_voiced_stop(&phone.label) {
            extraction.voiced.push(phone.label.to_lowercase());
        }
        extraction.stops.push(phone.clone());
    }

    tracing::debug!(
        matched = extraction.stops.len(),
        voiced = extraction.voiced.len(),
        "extracted stops"
    );

    extraction
}
