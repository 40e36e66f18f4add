//! Questionnaire definitions: the ordered prompts of each instrument.

use sahaay_contracts::assessment::Instrument;

/// An immutable, ordered list of prompts for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Questionnaire {
    pub instrument: Instrument,
    /// Shown before the prompts.
    pub stem: &'static str,
    pub questions: &'static [&'static str],
}

impl Questionnaire {
    /// Number of questions; every index in `0..len()` needs an answer.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// The highest achievable score: 3 per question.
    pub fn max_score(&self) -> u32 {
        self.questions.len() as u32 * u32::from(sahaay_contracts::assessment::Answer::MAX)
    }
}

const STEM: &str =
    "Over the last 2 weeks, how often have you been bothered by any of the following problems?";

const PHQ9_QUESTIONS: [&str; 9] = [
    "Little interest or pleasure in doing things",
    "Feeling down, depressed, or hopeless",
    "Trouble falling or staying asleep, or sleeping too much",
    "Feeling tired or having little energy",
    "Poor appetite or overeating",
    "Feeling bad about yourself, or that you are a failure or have let yourself or your family down",
    "Trouble concentrating on things, such as reading the newspaper or watching television",
    "Moving or speaking so slowly that other people could have noticed, or the opposite: being so fidgety or restless that you have been moving around a lot more than usual",
    "Thoughts that you would be better off dead or of hurting yourself in some way",
];

const GAD7_QUESTIONS: [&str; 7] = [
    "Feeling nervous, anxious or on edge",
    "Not being able to stop or control worrying",
    "Worrying too much about different things",
    "Trouble relaxing",
    "Being so restless that it is hard to sit still",
    "Becoming easily annoyed or irritable",
    "Feeling afraid as if something awful might happen",
];

/// PHQ-9 item 9 (thoughts of self-harm), 0-based.
pub const PHQ9_SELF_HARM_ITEM: usize = 8;

/// Look up the definition of `instrument`.
pub fn definition(instrument: Instrument) -> Questionnaire {
    match instrument {
        Instrument::Phq9 => Questionnaire { instrument, stem: STEM, questions: &PHQ9_QUESTIONS },
        Instrument::Gad7 => Questionnaire { instrument, stem: STEM, questions: &GAD7_QUESTIONS },
    }
}
