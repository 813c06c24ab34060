//! Stop-tier synthesis: one repaired `stops` tier per speaker.

use crate::category::{Padding, StopFilter};
use crate::error::{Result, TierError};
use crate::extract::{extract_stops, word_starts};
use crate::repair::pad_and_repair;
use crate::speaker::{SpeakerGroup, SpeakerTag, normalize_tier_names, pair_speakers};
use crate::textgrid::{Interval, TextGrid, Tier, interval_tier};
use std::collections::BTreeSet;

/// Validate the document, then add a stop tier for every speaker with stops.
///
/// Returns the tags of the speakers that received a tier, in speaker order.
/// The document is left without new tiers if any speaker fails.
pub fn add_stop_tiers(
    tg: &mut TextGrid,
    filter: &StopFilter,
    padding: Padding,
    file: &str,
) -> Result<Vec<SpeakerTag>> {
    normalize_tier_names(tg, file)?;

    let stop_tiers = {
        let groups = pair_speakers(tg, file)?;
        tracing::debug!(speakers = groups.len(), "paired speaker tiers");
        build_stop_tiers(&groups, filter, padding, file)?
    };

    if stop_tiers.is_empty() {
        return Err(TierError::NoStopsFound {
            file: file.to_string(),
        }
        .into());
    }

    let mut tags = Vec::with_capacity(stop_tiers.len());
    for (tag, tier) in stop_tiers {
        tracing::info!(tier = %tier.name, "adding stop tier");
        tg.add_tier(tier)?;
        tags.push(tag);
    }

    Ok(tags)
}

fn build_stop_tiers(
    groups: &[SpeakerGroup],
    filter: &StopFilter,
    padding: Padding,
    file: &str,
) -> Result<Vec<(SpeakerTag, Tier)>> {
    let mut voiced = BTreeSet::new();
    let mut stop_tiers = Vec::new();

    for group in groups {
        let _span = tracing::debug_span!("speaker", phone_tier = %group.phone_tier).entered();

        let extraction = extract_stops(&group.phones, filter, &word_starts(&group.words));
        voiced.extend(extraction.voiced);

        let repaired = pad_and_repair(&extraction.stops, padding, file)?;
        if repaired.is_empty() {
            tracing::debug!("no stops of interest for speaker");
            continue;
        }

        let tier = stop_tier(group, &repaired);
        stop_tiers.push((group.tag.clone(), tier));
    }

    warn_voiced(&voiced);

    Ok(stop_tiers)
}

/// Tier spanning the phone tier, widened to any interval padded past it.
fn stop_tier(group: &SpeakerGroup, intervals: &[Interval]) -> Tier {
    let xmin = intervals
        .first()
        .map_or(group.xmin, |i| i.start.min(group.xmin));
    let xmax = intervals
        .last()
        .map_or(group.xmax, |i| i.end.max(group.xmax));

    interval_tier(group.tag.stops_tier(), xmin, xmax, intervals)
}

/// Voiced-stop caveat, once per recording.
fn warn_voiced(voiced: &BTreeSet<String>) {
    let labels: Vec<&str> = voiced.iter().map(String::as_str).collect();

    match labels.as_slice() {
        [] => return,
        [single] => tracing::warn!(
            "You're trying to obtain VOT calculations of the following voiced stop: '{single}'"
        ),
        many => tracing::warn!(
            "You're trying to obtain VOT calculations of the following voiced stops: '{}'",
            many.join("', '")
        ),
    }

    tracing::info!(
        "Note that AutoVOT's current model only works on voiceless stops; prevoicing in the productions may result in inaccurate calculations."
    );
}
