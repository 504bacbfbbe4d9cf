use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_points() -> u32 {
    1
}

/// A gradable question embedded in a quiz document.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    #[serde(default = "new_id")]
    pub id: String,
    pub text: String,
    pub kind: QuestionKind,
    #[serde(default = "default_points")]
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default)]
    pub order: i32,
}

/// Question type together with the data its grading rule needs.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum QuestionKind {
    MultipleChoice { options: Vec<QuestionOption> },
    TrueFalse { correct_answer: String },
    /// `correct_answer` may hold several accepted answers separated by `|`.
    ShortAnswer { correct_answer: String },
    Essay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    Essay,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    #[serde(default = "new_id")]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl QuestionOption {
    pub fn new(text: &str, is_correct: bool) -> Self {
        Self {
            id: new_id(),
            text: text.to_string(),
            is_correct,
        }
    }
}

impl QuizQuestion {
    pub fn new(text: &str, kind: QuestionKind, points: u32) -> Self {
        Self {
            id: new_id(),
            text: text.to_string(),
            kind,
            points,
            explanation: None,
            order: 0,
        }
    }

    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    pub fn options(&self) -> &[QuestionOption] {
        match &self.kind {
            QuestionKind::MultipleChoice { options } => options,
            _ => &[],
        }
    }
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionKind::TrueFalse { .. } => QuestionType::TrueFalse,
            QuestionKind::ShortAnswer { .. } => QuestionType::ShortAnswer,
            QuestionKind::Essay => QuestionType::Essay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_defaults_fill_in_id_points_and_order() {
        let json = r#"{
            "text": "Is Rust memory safe?",
            "kind": { "type": "true-false", "correctAnswer": "True" }
        }"#;

        let question: QuizQuestion = serde_json::from_str(json).expect("question should parse");

        assert!(!question.id.is_empty());
        assert_eq!(question.points, 1);
        assert_eq!(question.order, 0);
        assert_eq!(question.question_type(), QuestionType::TrueFalse);
        assert!(question.options().is_empty());
    }

    #[test]
    fn multiple_choice_options_keep_their_order() {
        let json = r#"{
            "text": "Pick the borrow checker",
            "points": 2,
            "kind": {
                "type": "multiple-choice",
                "options": [
                    { "text": "rustc", "isCorrect": true },
                    { "text": "gcc" }
                ]
            }
        }"#;

        let question: QuizQuestion = serde_json::from_str(json).expect("question should parse");

        assert_eq!(question.points, 2);
        assert_eq!(question.options().len(), 2);
        assert_eq!(question.options()[0].text, "rustc");
        assert!(question.options()[0].is_correct);
        assert!(!question.options()[1].is_correct);
        assert_ne!(question.options()[0].id, question.options()[1].id);
    }

    #[test]
    fn kind_serializes_with_kebab_case_tag() {
        let kind = QuestionKind::ShortAnswer {
            correct_answer: "torque|moment".to_string(),
        };

        let value = serde_json::to_value(&kind).expect("kind should serialize");

        assert_eq!(value["type"], "short-answer");
        assert_eq!(value["correctAnswer"], "torque|moment");
    }

    #[test]
    fn unknown_question_type_is_rejected() {
        let json = r#"{ "text": "?", "kind": { "type": "matching" } }"#;
        assert!(serde_json::from_str::<QuizQuestion>(json).is_err());
    }
}
