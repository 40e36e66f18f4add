//! Score movement between consecutive assessments of one instrument.

use serde::{Deserialize, Serialize};

use sahaay_contracts::assessment::{AssessmentRecord, Instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Steady,
    Worsening,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentTrend {
    pub instrument: Instrument,
    pub latest: u32,
    pub previous: u32,
    /// `latest - previous`. Lower scores are better on both instruments.
    pub delta: i64,
    pub direction: TrendDirection,
}

/// Compare the two most recent records of `instrument`. `None` with fewer
/// than two.
pub fn assessment_trend(records: &[AssessmentRecord], instrument: Instrument) -> Option<AssessmentTrend> {
    let mut same: Vec<&AssessmentRecord> = records.iter().filter(|r| r.instrument == instrument).collect();
    same.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let (latest, previous) = match same.as_slice() {
        [latest, previous, ..] => (latest.score, previous.score),
        _ => return None,
    };
    let delta = i64::from(latest) - i64::from(previous);
    let direction = match delta {
        d if d < 0 => TrendDirection::Improving,
        0 => TrendDirection::Steady,
        _ => TrendDirection::Worsening,
    };

    Some(AssessmentTrend { instrument, latest, previous, delta, direction })
}
