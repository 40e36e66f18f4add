//! Response scoring and record creation.

use chrono::{DateTime, Utc};

use sahaay_contracts::{
    assessment::{AssessmentRecord, AssessmentResponse, Instrument},
    error::{SahaayError, SahaayResult},
    identity::{AssessmentId, UserId},
};

use crate::definition::{Questionnaire, PHQ9_SELF_HARM_ITEM};

/// Sum the answers of a complete response.
///
/// Rejects a response recorded for another instrument. Also rejects it if
/// any question of `definition` is unanswered (listing every missing index)
/// or if it answers an index the definition does not have. Answers
/// themselves are already range-checked.
pub fn score(response: &AssessmentResponse, definition: &Questionnaire) -> SahaayResult<u32> {
    if response.instrument != definition.instrument {
        return Err(SahaayError::InstrumentMismatch {
            expected: definition.instrument.to_string(),
            found: response.instrument.to_string(),
        });
    }

    if let Some(&index) = response.answers.keys().find(|&&i| i >= definition.len()) {
        return Err(SahaayError::UnexpectedQuestion {
            instrument: definition.instrument.to_string(),
            index,
        });
    }

    let missing: Vec<usize> = (0..definition.len())
        .filter(|i| !response.answers.contains_key(i))
        .collect();
    if !missing.is_empty() {
        return Err(SahaayError::IncompleteResponse {
            instrument: definition.instrument.to_string(),
            missing,
        });
    }

    Ok(response.answers.values().map(|a| u32::from(a.value())).sum())
}

/// Score `response` and wrap it in a new immutable record.
pub fn create_record(
    patient_id: UserId,
    response: AssessmentResponse,
    at: DateTime<Utc>,
) -> SahaayResult<AssessmentRecord> {
    let definition = crate::definition::definition(response.instrument);
    let score = score(&response, &definition)?;
    Ok(AssessmentRecord {
        id: AssessmentId::generate(),
        patient_id,
        instrument: response.instrument,
        response,
        score,
        created_at: at,
    })
}

/// True when the PHQ-9 self-harm item was answered above "Not at all".
///
/// Always false for other instruments.
pub fn has_crisis_indicator(response: &AssessmentResponse) -> bool {
    match response.instrument {
        Instrument::Phq9 => response
            .get(PHQ9_SELF_HARM_ITEM)
            .is_some_and(|a| a.value() > 0),
        Instrument::Gad7 => false,
    }
}
