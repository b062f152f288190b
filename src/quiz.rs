use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const TOTAL_QUESTIONS: usize = 10;
pub const MAX_ANSWER_VALUE: i64 = 40;

#[derive(Debug, PartialEq, Eq)]
pub enum QuizError {
    NotStarted,
    NoActiveQuestion,
    InvalidAnswer(i64),
    NoPreviousQuestion,
    Incomplete { answered: usize },
    GenerationInProgress,
}

impl fmt::Display for QuizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizError::NotStarted => write!(f, "the assessment has not been started"),
            QuizError::NoActiveQuestion => write!(f, "no question is currently presented"),
            QuizError::InvalidAnswer(value) => {
                write!(f, "{value} is not one of the offered answers")
            }
            QuizError::NoPreviousQuestion => write!(f, "already at the first question"),
            QuizError::Incomplete { answered } => write!(
                f,
                "only {answered} of {TOTAL_QUESTIONS} questions answered"
            ),
            QuizError::GenerationInProgress => {
                write!(f, "a question is already being generated")
            }
        }
    }
}

impl std::error::Error for QuizError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizOption {
    pub value: i64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: String,
    pub question: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub options: Vec<QuizOption>,
    pub follow_up_areas: Vec<String>,
}

/// One answered question, mirrored to the backend as conversation context
/// for generating the next one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question_number: usize,
    pub question_id: String,
    pub question_text: String,
    pub answer_value: i64,
    pub answer_text: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum NextStep {
    /// Another question is due.
    NextQuestion,
    /// All questions answered; ask for the pincode.
    PincodeEntry,
}

/// Severity band for a finished assessment, keyed by score percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultBand {
    Excellent,
    Good,
    Moderate,
    Concerning,
}

impl ResultBand {
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage <= 30.0 {
            ResultBand::Excellent
        } else if percentage <= 50.0 {
            ResultBand::Good
        } else if percentage <= 75.0 {
            ResultBand::Moderate
        } else {
            ResultBand::Concerning
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ResultBand::Excellent => "🌟",
            ResultBand::Good => "😊",
            ResultBand::Moderate => "😟",
            ResultBand::Concerning => "🚨",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ResultBand::Excellent => "Excellent Mental Wellness!",
            ResultBand::Good => "Good Mental Health",
            ResultBand::Moderate => "Moderate Stress Levels",
            ResultBand::Concerning => "High Stress - Support Recommended",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ResultBand::Excellent => {
                "Based on your responses, you're managing stress well and have healthy coping mechanisms."
            }
            ResultBand::Good => {
                "You're doing well overall, with some areas for improvement in stress management."
            }
            ResultBand::Moderate => {
                "Your responses indicate significant stress that may be impacting your daily life."
            }
            ResultBand::Concerning => {
                "Your stress levels appear very high. Professional support is strongly recommended."
            }
        }
    }
}

/// A well-formed Indian pincode: exactly six ASCII digits. Checked before
/// any network call is issued.
pub fn is_valid_pincode(value: &str) -> bool {
    value.len() == 6 && value.bytes().all(|byte| byte.is_ascii_digit())
}

pub fn default_options() -> Vec<QuizOption> {
    [
        (10, "😊 Not at all / Rarely"),
        (20, "😌 Sometimes / Occasionally"),
        (30, "😕 Frequently / Often"),
        (40, "😔 Almost always / Constantly"),
    ]
    .into_iter()
    .map(|(value, text)| QuizOption {
        value,
        text: text.to_string(),
    })
    .collect()
}

/// Backup questions used whenever the generation backend is unreachable,
/// rotated by question index.
pub fn fallback_question(question_index: usize) -> Question {
    const FALLBACKS: [(&str, [(i64, &str); 4]); 3] = [
        (
            "How are you feeling today overall?",
            [
                (10, "😊 Great, feeling positive and energized"),
                (20, "😌 Okay, managing well enough"),
                (30, "😕 Not great, feeling stressed or down"),
                (40, "😔 Really struggling today"),
            ],
        ),
        (
            "How would you describe your stress levels lately?",
            [
                (10, "😎 Low stress, feeling relaxed"),
                (20, "😌 Moderate, manageable stress"),
                (30, "😟 High stress, struggling to cope"),
                (40, "😰 Overwhelming, constant stress"),
            ],
        ),
        (
            "How has your sleep been recently?",
            [
                (10, "😴 Sleeping well, feeling rested"),
                (20, "🌙 Some issues but mostly okay"),
                (30, "😓 Poor sleep, often tired"),
                (40, "😵 Barely sleeping, exhausted"),
            ],
        ),
    ];

    let (question, options) = FALLBACKS[question_index % FALLBACKS.len()];
    Question {
        id: format!("fallback_q_{}", question_index + 1),
        question: question.to_string(),
        kind: "scale".to_string(),
        options: options
            .iter()
            .map(|(value, text)| QuizOption {
                value: *value,
                text: (*text).to_string(),
            })
            .collect(),
        follow_up_areas: Vec::new(),
    }
}

/// Assessment session state: which question is up, the running conversation
/// history, and the recorded answers. One in-flight generation at a time;
/// there is no cancellation of a pending request.
#[derive(Debug, Default)]
pub struct QuizFlow {
    started: bool,
    current_index: usize,
    current_question: Option<Question>,
    history: Vec<ConversationTurn>,
    answers: BTreeMap<String, i64>,
    generating: bool,
}

impl QuizFlow {
    /// Resets the flow for a fresh assessment. Refused while a question
    /// request is still pending, so a restart cannot clear the guard out
    /// from under it.
    pub fn start(&mut self) -> Result<(), QuizError> {
        if self.generating {
            return Err(QuizError::GenerationInProgress);
        }
        *self = Self {
            started: true,
            ..Self::default()
        };
        Ok(())
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn progress_percent(&self) -> f64 {
        (self.current_index + 1) as f64 / TOTAL_QUESTIONS as f64 * 100.0
    }

    /// Guards question generation; mirrors the single in-progress flag the
    /// flow has always used instead of request cancellation.
    pub fn begin_generation(&mut self) -> Result<(), QuizError> {
        if !self.started {
            return Err(QuizError::NotStarted);
        }
        if self.generating {
            return Err(QuizError::GenerationInProgress);
        }
        self.generating = true;
        Ok(())
    }

    pub fn present(&mut self, question: Question) {
        self.generating = false;
        self.current_question = Some(question);
    }

    pub fn generation_failed(&mut self) {
        self.generating = false;
    }

    /// Records the answer for the presented question, overwriting any answer
    /// recorded for it on an earlier pass, and advances the flow.
    pub fn record_answer(&mut self, value: i64, text: String) -> Result<NextStep, QuizError> {
        if !self.started {
            return Err(QuizError::NotStarted);
        }
        let question = self
            .current_question
            .as_ref()
            .ok_or(QuizError::NoActiveQuestion)?;
        if !question.options.iter().any(|option| option.value == value) {
            return Err(QuizError::InvalidAnswer(value));
        }

        let turn = ConversationTurn {
            question_number: self.current_index + 1,
            question_id: question.id.clone(),
            question_text: question.question.clone(),
            answer_value: value,
            answer_text: text,
        };
        self.answers.insert(question.id.clone(), value);
        if self.current_index < self.history.len() {
            self.history[self.current_index] = turn;
        } else {
            self.history.push(turn);
        }

        if self.current_index + 1 < TOTAL_QUESTIONS {
            self.current_index += 1;
            self.current_question = None;
            Ok(NextStep::NextQuestion)
        } else {
            self.current_question = None;
            Ok(NextStep::PincodeEntry)
        }
    }

    /// Steps back one question, reconstructing it from the conversation
    /// history with the default option set and the previously chosen value.
    pub fn previous(&mut self) -> Result<(Question, i64), QuizError> {
        if !self.started {
            return Err(QuizError::NotStarted);
        }
        if self.current_index == 0 || self.history.is_empty() {
            return Err(QuizError::NoPreviousQuestion);
        }
        self.current_index -= 1;
        let turn = &self.history[self.current_index];
        let question = Question {
            id: turn.question_id.clone(),
            question: turn.question_text.clone(),
            kind: "scale".to_string(),
            options: default_options(),
            follow_up_areas: Vec::new(),
        };
        let previous_value = self.answers.get(&turn.question_id).copied().unwrap_or(0);
        self.current_question = Some(question.clone());
        Ok((question, previous_value))
    }

    /// Total and maximum achievable score once every question is answered.
    pub fn score(&self) -> Result<(i64, i64), QuizError> {
        if self.history.len() < TOTAL_QUESTIONS {
            return Err(QuizError::Incomplete {
                answered: self.history.len(),
            });
        }
        let total = self.answers.values().sum();
        Ok((total, TOTAL_QUESTIONS as i64 * MAX_ANSWER_VALUE))
    }
}
