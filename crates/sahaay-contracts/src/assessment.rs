//! Screening instrument tags, answers, responses, and assessment records.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{SahaayError, SahaayResult},
    identity::{AssessmentId, UserId},
};

/// The two supported screening instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Instrument {
    /// Patient Health Questionnaire, 9-item depression screen.
    #[serde(rename = "PHQ9")]
    Phq9,
    /// Generalized Anxiety Disorder, 7-item anxiety screen.
    #[serde(rename = "GAD7")]
    Gad7,
}

impl Instrument {
    pub const ALL: [Instrument; 2] = [Instrument::Phq9, Instrument::Gad7];

    /// The display name, e.g. "PHQ-9".
    pub fn name(&self) -> &'static str {
        match self {
            Instrument::Phq9 => "PHQ-9",
            Instrument::Gad7 => "GAD-7",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Instrument {
    type Err = SahaayError;

    /// Accepts "PHQ9", "phq-9", "gad7", "GAD-7", and similar spellings.
    fn from_str(s: &str) -> SahaayResult<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "phq9" => Ok(Instrument::Phq9),
            "gad7" => Ok(Instrument::Gad7),
            _ => Err(SahaayError::UnknownInstrument(s.to_string())),
        }
    }
}

/// A single Likert answer in the closed range [0, 3].
///
/// 0 = "Not at all", 1 = "Several days", 2 = "More than half the days",
/// 3 = "Nearly every day". Values outside the range cannot be constructed,
/// including through deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Answer(u8);

impl Answer {
    pub const MAX: u8 = 3;

    /// The option labels, indexed by answer value.
    pub const LABELS: [&'static str; 4] = [
        "Not at all",
        "Several days",
        "More than half the days",
        "Nearly every day",
    ];

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn label(&self) -> &'static str {
        Self::LABELS[self.0 as usize]
    }
}

impl TryFrom<u8> for Answer {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Answer::new(value).ok_or_else(|| format!("answer {value} is outside the range 0..=3"))
    }
}

impl From<Answer> for u8 {
    fn from(answer: Answer) -> u8 {
        answer.0
    }
}

/// Answers collected for one administration of an instrument.
///
/// Keyed by 0-based question index. Completeness against the instrument's
/// definition is checked when the response is scored, not while it is filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResponse {
    pub instrument: Instrument,
    pub answers: BTreeMap<usize, Answer>,
}

impl AssessmentResponse {
    pub fn new(instrument: Instrument) -> Self {
        Self { instrument, answers: BTreeMap::new() }
    }

    /// Record (or replace) the answer to `question`.
    ///
    /// Rejects values outside [0, 3] so they never reach scoring.
    pub fn answer(&mut self, question: usize, value: u8) -> SahaayResult<()> {
        let answer =
            Answer::new(value).ok_or(SahaayError::InvalidAnswer { question, value })?;
        self.answers.insert(question, answer);
        Ok(())
    }

    /// Build a response from `(question, value)` pairs.
    pub fn from_pairs(
        instrument: Instrument,
        pairs: impl IntoIterator<Item = (usize, u8)>,
    ) -> SahaayResult<Self> {
        let mut response = Self::new(instrument);
        for (question, value) in pairs {
            response.answer(question, value)?;
        }
        Ok(response)
    }

    /// Build a response whose answers are `values` in question order.
    pub fn from_values(instrument: Instrument, values: &[u8]) -> SahaayResult<Self> {
        Self::from_pairs(instrument, values.iter().copied().enumerate())
    }

    /// The answer to `question`, if one has been recorded.
    pub fn get(&self, question: usize) -> Option<Answer> {
        self.answers.get(&question).copied()
    }
}

/// An immutable, scored administration of an instrument.
///
/// Amending an assessment means creating a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: AssessmentId,
    pub patient_id: UserId,
    pub instrument: Instrument,
    pub response: AssessmentResponse,
    /// Sum of all answer values.
    pub score: u32,
    pub created_at: DateTime<Utc>,
}
