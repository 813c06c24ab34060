//! Praat TextGrid documents, read and written through the `textgrid` crate.
//!
//! Interval tiers are handed to the rest of the pipeline as plain
//! [`Interval`] lists. Tiers built here are gap-free: empty-label intervals
//! fill whatever the given intervals leave uncovered.

use crate::error::TextGridError;
use std::path::Path;

pub use textgrid::{Tier, TierType};

/// Gaps narrower than this are not filled with an empty interval.
const GAP_TOLERANCE: f64 = 1e-9;

type Result<T> = std::result::Result<T, TextGridError>;

/// Labeled time interval in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct Interval {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Interval text
    pub label: String,
}

impl Interval {
    pub fn new(label: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl From<&textgrid::Interval> for Interval {
    fn from(interval: &textgrid::Interval) -> Self {
        Self::new(interval.text.clone(), interval.xmin, interval.xmax)
    }
}

impl From<Interval> for textgrid::Interval {
    fn from(interval: Interval) -> Self {
        textgrid::Interval {
            xmin: interval.start,
            xmax: interval.end,
            text: interval.label,
        }
    }
}

/// Build an interval tier covering `[xmin, xmax]`.
pub fn interval_tier(name: impl Into<String>, xmin: f64, xmax: f64, intervals: &[Interval]) -> Tier {
    Tier {
        name: name.into(),
        tier_type: TierType::IntervalTier,
        xmin,
        xmax,
        intervals: fill_gaps(xmin, xmax, intervals)
            .into_iter()
            .map(textgrid::Interval::from)
            .collect(),
        points: Vec::new(),
    }
}

/// Intervals of an interval tier, `None` for point tiers.
pub fn intervals(tier: &Tier) -> Option<Vec<Interval>> {
    (tier.tier_type == TierType::IntervalTier)
        .then(|| tier.intervals.iter().map(Interval::from).collect())
}

/// TextGrid document.
///
/// Tier order is preserved as read; tiers are looked up by name.
pub struct TextGrid {
    inner: textgrid::TextGrid,
}

impl TextGrid {
    pub fn new(xmin: f64, xmax: f64) -> Result<Self> {
        let inner = textgrid::TextGrid::new(xmin, xmax)
            .map_err(|e| TextGridError::Invalid(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Read a TextGrid file in either text form.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let inner = textgrid::TextGrid::from_file(path).map_err(|e| TextGridError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self { inner })
    }

    /// Write the document in long text form.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.inner
            .to_file(path, false)
            .map_err(|e| TextGridError::Write {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    pub fn xmin(&self) -> f64 {
        self.inner.xmin
    }

    pub fn xmax(&self) -> f64 {
        self.inner.xmax
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.inner.tiers
    }

    pub fn tiers_mut(&mut self) -> &mut Vec<Tier> {
        &mut self.inner.tiers
    }

    pub fn tier(&self, name: &str) -> Option<&Tier> {
        self.inner.tiers.iter().find(|tier| tier.name == name)
    }

    pub fn tier_mut(&mut self, name: &str) -> Option<&mut Tier> {
        self.inner.tiers.iter_mut().find(|tier| tier.name == name)
    }

    pub fn tier_names(&self) -> impl Iterator<Item = &str> {
        self.inner.tiers.iter().map(|tier| tier.name.as_str())
    }

    /// Rename a tier, returning whether it existed.
    pub fn rename_tier(&mut self, old: &str, new: impl Into<String>) -> bool {
        match self.tier_mut(old) {
            Some(tier) => {
                tier.name = new.into();
                true
            }
            None => false,
        }
    }

    /// Append a tier, widening the document bounds to cover it.
    pub fn add_tier(&mut self, tier: Tier) -> Result<()> {
        if self.tier(&tier.name).is_some() {
            return Err(TextGridError::DuplicateTier(tier.name));
        }

        self.inner.xmin = self.inner.xmin.min(tier.xmin);
        self.inner.xmax = self.inner.xmax.max(tier.xmax);
        self.inner
            .add_tier(tier)
            .map_err(|e| TextGridError::Invalid(e.to_string()))
    }
}

/// Cover `[xmin, xmax]` with the given intervals plus empty-label fillers.
fn fill_gaps(xmin: f64, xmax: f64, intervals: &[Interval]) -> Vec<Interval> {
    let mut filled = Vec::with_capacity(intervals.len() * 2 + 1);
    let mut cursor = xmin;

    for interval in intervals {
        if interval.start > cursor + GAP_TOLERANCE {
            filled.push(Interval::new("", cursor, interval.start));
        }
        filled.push(interval.clone());
        cursor = cursor.max(interval.end);
    }

    if xmax > cursor + GAP_TOLERANCE {
        filled.push(Interval::new("", cursor, xmax));
    }

    filled
}
