//! Tier-name validation and word/phone speaker pairing.

use crate::error::TierError;
use crate::textgrid::{Interval, TextGrid, Tier, intervals};
use std::collections::HashSet;

/// Tier name written by the predictor.
pub const PREDICTION_TIER: &str = "AutoVOT";

/// Name given to a pre-existing [`PREDICTION_TIER`].
pub const RENAMED_PREDICTION_TIER: &str = "autovot - original";

/// Reserved infix of synthesized tiers.
pub const STOPS: &str = "stops";

const WORD: &str = "word";
const PHONE: &str = "phone";

/// Speaker tag recovered from a phone tier name.
///
/// `"speaker1 - phones"` splits into prefix `"speaker1 - "` and suffix `""`
/// (the plural `s` is dropped).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpeakerTag {
    pub prefix: String,
    pub suffix: String,
}

impl SpeakerTag {
    /// Split a phone tier name around its first `phone`.
    pub fn from_phone_tier(name: &str) -> Self {
        let mut parts = name.split(PHONE);
        let prefix = parts.next().unwrap_or_default();
        let suffix = parts.next().unwrap_or_default();
        let suffix = suffix.strip_prefix('s').unwrap_or(suffix);

        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }

    pub fn stops_tier(&self) -> String {
        format!("{}{STOPS}{}", self.prefix, self.suffix)
    }

    pub fn prediction_tier(&self) -> String {
        format!("{}{PREDICTION_TIER}{}", self.prefix, self.suffix)
    }
}

/// Word and phone intervals of one speaker.
#[derive(Clone, Debug)]
pub struct SpeakerGroup {
    /// Name of the phone tier the group was built from
    pub phone_tier: String,
    /// Bounds of the phone tier
    pub xmin: f64,
    pub xmax: f64,
    pub words: Vec<Interval>,
    pub phones: Vec<Interval>,
    pub tag: SpeakerTag,
}

/// Check tier names and normalize them to lower case.
///
/// Renames a pre-existing `AutoVOT` tier. Rejects names ending in `stops`,
/// empty names, and names that collide once lower-cased.
pub fn normalize_tier_names(tg: &mut TextGrid, file: &str) -> Result<(), TierError> {
    for tier in tg.tiers_mut().iter_mut() {
        if tier.name == PREDICTION_TIER {
            tracing::warn!(
                "A tier named '{PREDICTION_TIER}' already exists. Said tier will be renamed as '{RENAMED_PREDICTION_TIER}' to avoid a naming conflict."
            );
            tier.name = RENAMED_PREDICTION_TIER.to_string();
        } else if tier.name.to_lowercase().ends_with(STOPS) {
            return Err(TierError::ReservedStopsSuffix {
                name: tier.name.clone(),
                file: file.to_string(),
            });
        } else if tier.name.is_empty() {
            return Err(TierError::EmptyName {
                file: file.to_string(),
            });
        }
    }

    let mut seen = HashSet::new();
    for tier in tg.tiers_mut().iter_mut() {
        tier.name = tier.name.to_lowercase();
        if !seen.insert(tier.name.clone()) {
            return Err(TierError::DuplicateName {
                name: tier.name.clone(),
                file: file.to_string(),
            });
        }
    }

    Ok(())
}

/// Pair every phone tier with the word tier named after it.
///
/// Expects names already normalized. Groups come back in phone-tier order.
pub fn pair_speakers(tg: &TextGrid, file: &str) -> Result<Vec<SpeakerGroup>, TierError> {
    let word_tiers: Vec<&Tier> = tg.tiers().iter().filter(|t| t.name.contains(WORD)).collect();
    if word_tiers.is_empty() {
        return Err(TierError::NoWordTier {
            file: file.to_string(),
        });
    }

    let phone_tiers: Vec<&Tier> = tg.tiers().iter().filter(|t| t.name.contains(PHONE)).collect();
    if phone_tiers.is_empty() {
        return Err(TierError::NoPhoneTier {
            file: file.to_string(),
        });
    }

    if word_tiers.len() != phone_tiers.len() {
        return Err(TierError::CountMismatch {
            words: word_tiers.len(),
            phones: phone_tiers.len(),
            file: file.to_string(),
        });
    }

    phone_tiers
        .into_iter()
        .map(|phone_tier| {
            let expected = phone_tier.name.replace(PHONE, WORD);
            let word_tier = word_tiers
                .iter()
                .copied()
                .find(|t| t.name == expected)
                .ok_or_else(|| TierError::Unpaired {
                    phone: phone_tier.name.clone(),
                    expected,
                    file: file.to_string(),
                })?;

            Ok(SpeakerGroup {
                phone_tier: phone_tier.name.clone(),
                xmin: phone_tier.xmin,
                xmax: phone_tier.xmax,
                words: interval_list(word_tier, file)?,
                phones: interval_list(phone_tier, file)?,
                tag: SpeakerTag::from_phone_tier(&phone_tier.name),
            })
        })
        .collect()
}

fn interval_list(tier: &Tier, file: &str) -> Result<Vec<Interval>, TierError> {
    intervals(tier).ok_or_else(|| TierError::NotIntervalTier {
        name: tier.name.clone(),
        file: file.to_string(),
    })
}
