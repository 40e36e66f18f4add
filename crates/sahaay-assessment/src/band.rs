//! Severity bands and classification.
//!
//! Each instrument's bands partition `0..=max_score` with inclusive bounds,
//! no gaps, and no overlaps. The two highest bands of each instrument are
//! `Urgent`.

use std::fmt;

use serde::{Deserialize, Serialize};

use sahaay_contracts::assessment::Instrument;

/// Selects the visual or alert treatment for a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    Normal,
    Caution,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandLabel {
    Minimal,
    Mild,
    Moderate,
    ModeratelySevere,
    Severe,
}

impl BandLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BandLabel::Minimal => "Minimal",
            BandLabel::Mild => "Mild",
            BandLabel::Moderate => "Moderate",
            BandLabel::ModeratelySevere => "Moderately Severe",
            BandLabel::Severe => "Severe",
        }
    }
}

impl fmt::Display for BandLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labeled, inclusive score range with its tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBand {
    pub label: BandLabel,
    pub tier: SeverityTier,
    pub min: u32,
    pub max: u32,
}

impl SeverityBand {
    const fn new(label: BandLabel, tier: SeverityTier, min: u32, max: u32) -> Self {
        Self { label, tier, min, max }
    }

    pub fn contains(&self, score: u32) -> bool {
        (self.min..=self.max).contains(&score)
    }
}

use BandLabel::*;
use SeverityTier::*;

const PHQ9_BANDS: [SeverityBand; 5] = [
    SeverityBand::new(Minimal, Normal, 0, 4),
    SeverityBand::new(Mild, Normal, 5, 9),
    SeverityBand::new(Moderate, Caution, 10, 14),
    SeverityBand::new(ModeratelySevere, Urgent, 15, 19),
    SeverityBand::new(Severe, Urgent, 20, 27),
];

const GAD7_BANDS: [SeverityBand; 4] = [
    SeverityBand::new(Minimal, Normal, 0, 4),
    SeverityBand::new(Mild, Normal, 5, 9),
    SeverityBand::new(Moderate, Urgent, 10, 14),
    SeverityBand::new(Severe, Urgent, 15, 21),
];

/// The band table for `instrument`, lowest band first.
pub fn bands(instrument: Instrument) -> &'static [SeverityBand] {
    match instrument {
        Instrument::Phq9 => &PHQ9_BANDS,
        Instrument::Gad7 => &GAD7_BANDS,
    }
}

/// Classify `score` into its band for `instrument`.
///
/// `score` must come from a valid response; anything above the instrument's
/// maximum is a caller defect and trips a debug assertion. Release builds
/// place such a score in the top band.
pub fn classify(instrument: Instrument, score: u32) -> SeverityBand {
    let table = bands(instrument);
    debug_assert!(
        score <= table[table.len() - 1].max,
        "{instrument} score {score} is outside the scoring range"
    );
    *table
        .iter()
        .find(|band| band.contains(score))
        .unwrap_or(&table[table.len() - 1])
}
