//! # sahaay-assessment
//!
//! Scoring and severity classification for the two screening instruments:
//! PHQ-9 (depression, 9 items, 0–27) and GAD-7 (anxiety, 7 items, 0–21).
//!
//! Pure functions, no I/O:
//!
//! ```rust,ignore
//! use sahaay_assessment::{classify, definition, score};
//!
//! let total = score(&response, &definition(response.instrument))?;
//! let band = classify(response.instrument, total);
//! println!("{} ({})", total, band.label);
//! ```

pub mod band;
pub mod definition;
pub mod scoring;

pub use band::{bands, classify, BandLabel, SeverityBand, SeverityTier};
pub use definition::{definition, Questionnaire};
pub use scoring::{create_record, has_crisis_indicator, score};

use sahaay_contracts::assessment::AssessmentRecord;

/// The band of a stored record, recomputed from its score.
pub fn interpret(record: &AssessmentRecord) -> SeverityBand {
    classify(record.instrument, record.score)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
