//! Multiple-choice health questions asked on Quiz tiles.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::core::RandomSource;

/// Invalid question or question bank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// A question needs at least two options.
    #[error("question {prompt:?} has {options} option(s), need at least 2")]
    TooFewOptions { prompt: String, options: usize },

    /// The answer index does not name an option.
    #[error("question {prompt:?} answer {answer} is out of range")]
    AnswerOutOfRange { prompt: String, answer: usize },

    /// A bank needs at least one question.
    #[error("question bank is empty")]
    EmptyBank,
}

/// A question with exactly one correct option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionFields")]
pub struct Question {
    /// The question text.
    pub prompt: String,
    /// Answer options. Most questions have four.
    pub options: SmallVec<[String; 4]>,
    /// Index of the correct option.
    pub answer: usize,
}

impl Question {
    /// Create and validate a question.
    pub fn new(
        prompt: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
        answer: usize,
    ) -> Result<Self, QuizError> {
        let question = Self {
            prompt: prompt.into(),
            options: options.into_iter().map(Into::into).collect(),
            answer,
        };
        question.validate()?;
        Ok(question)
    }

    /// Check option count and answer index.
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.options.len() < 2 {
            return Err(QuizError::TooFewOptions {
                prompt: self.prompt.clone(),
                options: self.options.len(),
            });
        }
        if self.answer >= self.options.len() {
            return Err(QuizError::AnswerOutOfRange {
                prompt: self.prompt.clone(),
                answer: self.answer,
            });
        }
        Ok(())
    }

    /// Number of options.
    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Whether `index` is the correct option.
    #[must_use]
    pub fn is_correct(&self, index: usize) -> bool {
        index == self.answer
    }
}

/// Unchecked question as read from disk.
#[derive(Deserialize)]
struct QuestionFields {
    prompt: String,
    options: SmallVec<[String; 4]>,
    answer: usize,
}

impl TryFrom<QuestionFields> for Question {
    type Error = QuizError;

    fn try_from(fields: QuestionFields) -> Result<Self, Self::Error> {
        let question = Self {
            prompt: fields.prompt,
            options: fields.options,
            answer: fields.answer,
        };
        question.validate()?;
        Ok(question)
    }
}

/// The pool questions are drawn from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BankFields")]
pub struct QuestionBank {
    questions: Vec<Question>,
}

#[derive(Deserialize)]
struct BankFields {
    questions: Vec<Question>,
}

impl TryFrom<BankFields> for QuestionBank {
    type Error = QuizError;

    fn try_from(fields: BankFields) -> Result<Self, Self::Error> {
        Self::new(fields.questions)
    }
}

impl QuestionBank {
    /// Create a bank, validating every question.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::EmptyBank);
        }
        let bank = Self { questions };
        bank.validate()?;
        Ok(bank)
    }

    /// Check that the bank is non-empty and every question is valid.
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.questions.is_empty() {
            return Err(QuizError::EmptyBank);
        }
        self.questions.iter().try_for_each(Question::validate)
    }

    /// The built-in health questions.
    #[must_use]
    pub fn standard() -> Self {
        const QUESTIONS: [(&str, [&str; 4], usize); 8] = [
            (
                "How long should you scrub your hands with soap?",
                ["2 seconds", "20 seconds", "2 minutes", "No need to scrub"],
                1,
            ),
            (
                "How many times a day should you brush your teeth?",
                ["Once a week", "Once", "At least twice", "Only after candy"],
                2,
            ),
            (
                "Which drink is best when you are thirsty?",
                ["Soda", "Water", "Energy drink", "Sweet tea"],
                1,
            ),
            (
                "How many hours should a school-age child sleep?",
                ["4 to 5", "6 to 7", "9 to 12", "15 or more"],
                2,
            ),
            (
                "Which snack is the healthiest choice?",
                ["Potato chips", "Fresh fruit", "Candy bar", "Cupcake"],
                1,
            ),
            (
                "How much active play should children get each day?",
                ["At least 60 minutes", "5 minutes", "None", "Only on weekends"],
                0,
            ),
            (
                "What should you do when you sneeze?",
                ["Sneeze into your hands and keep playing", "Cover with your elbow or a tissue", "Sneeze at a friend", "Hold it in"],
                1,
            ),
            (
                "Why is staring at a screen late at night bad?",
                ["It makes you taller", "It helps you sleep", "It makes it harder to fall asleep", "It has no effect"],
                2,
            ),
        ];

        let questions = QUESTIONS
            .iter()
            .map(|(prompt, options, answer)| Question {
                prompt: (*prompt).to_string(),
                options: options.iter().map(|o| (*o).to_string()).collect(),
                answer: *answer,
            })
            .collect();
        Self { questions }
    }

    /// Number of questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the bank holds no questions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Draw a question uniformly. `None` only for an empty bank.
    pub fn draw(&self, rng: &mut dyn RandomSource) -> Option<&Question> {
        let last = self.questions.len().checked_sub(1)?;
        self.questions.get(rng.pick(self.questions.len()).min(last))
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScriptedRng;

    #[test]
    fn test_standard_bank_is_valid() {
        let bank = QuestionBank::standard();
        assert_eq!(bank.len(), 8);
        assert!(QuestionBank::new(bank.questions.clone()).is_ok());
    }

    #[test]
    fn test_question_validation() {
        assert!(matches!(
            Question::new("Only one?", ["yes"], 0),
            Err(QuizError::TooFewOptions { options: 1, .. })
        ));
        assert!(matches!(
            Question::new("Pick", ["a", "b"], 2),
            Err(QuizError::AnswerOutOfRange { answer: 2, .. })
        ));

        let q = Question::new("Pick", ["a", "b", "c"], 1).unwrap();
        assert_eq!(q.option_count(), 3);
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
    }

    #[test]
    fn test_empty_bank_rejected() {
        assert_eq!(QuestionBank::new(Vec::new()), Err(QuizError::EmptyBank));
    }

    #[test]
    fn test_draw_uses_rng() {
        let bank = QuestionBank::standard();
        let mut rng = ScriptedRng::new(1).with_picks([3]);
        let question = bank.draw(&mut rng).unwrap();
        assert_eq!(question.prompt, bank.questions[3].prompt);

        let empty = QuestionBank { questions: Vec::new() };
        assert!(empty.draw(&mut rng).is_none());
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<QuestionBank>(r#"{"questions":[]}"#).is_err());
        assert!(serde_json::from_str::<Question>(
            r#"{"prompt":"Only one?","options":["yes"],"answer":0}"#
        )
        .is_err());
        assert!(serde_json::from_str::<Question>(
            r#"{"prompt":"Pick","options":["a","b"],"answer":5}"#
        )
        .is_err());

        let bank = QuestionBank::standard();
        let json = serde_json::to_string(&bank).unwrap();
        let loaded: QuestionBank = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, bank);
    }
}
