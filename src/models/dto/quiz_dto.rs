use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::quiz::{AttemptLimit, Quiz, QuizType};
use crate::models::domain::quiz_question::{QuestionOption, QuestionType, QuizQuestion};

/// Learner-facing quiz: nothing that reveals a correct answer or an
/// explanation survives the conversion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizForTaking {
    pub id: String,
    pub course_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub quiz_type: QuizType,
    pub questions: Vec<QuestionForTaking>,
    pub total_points: u32,
    pub time_limit: u32,
    pub passing_score: u8,
    pub attempts_allowed: AttemptLimit,
    pub shuffle_questions: bool,
    pub show_correct_answers: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_until: Option<DateTime<Utc>>,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionForTaking {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionForTaking>,
    pub points: u32,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionForTaking {
    pub id: String,
    pub text: String,
}

impl From<&QuestionOption> for OptionForTaking {
    fn from(option: &QuestionOption) -> Self {
        OptionForTaking {
            id: option.id.clone(),
            text: option.text.clone(),
        }
    }
}

impl From<&QuizQuestion> for QuestionForTaking {
    fn from(question: &QuizQuestion) -> Self {
        QuestionForTaking {
            id: question.id.clone(),
            text: question.text.clone(),
            question_type: question.question_type(),
            options: question.options().iter().map(OptionForTaking::from).collect(),
            points: question.points,
            order: question.order,
        }
    }
}

impl From<&Quiz> for QuizForTaking {
    fn from(quiz: &Quiz) -> Self {
        QuizForTaking {
            id: quiz.id.clone(),
            course_id: quiz.course_id.clone(),
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            quiz_type: quiz.quiz_type,
            questions: quiz.questions().iter().map(QuestionForTaking::from).collect(),
            total_points: quiz.total_points(),
            time_limit: quiz.time_limit,
            passing_score: quiz.passing_score,
            attempts_allowed: quiz.attempts_allowed,
            shuffle_questions: quiz.shuffle_questions,
            show_correct_answers: quiz.show_correct_answers,
            available_from: quiz.available_from,
            available_until: quiz.available_until,
            order: quiz.order,
        }
    }
}
