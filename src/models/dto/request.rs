use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::errors::{AppError, AppResult};
use crate::models::domain::quiz::{AttemptLimit, Quiz, QuizType};
use crate::models::domain::quiz_question::{new_id, QuestionKind, QuizQuestion};

pub const MAX_QUESTION_POINTS: u32 = 1000;

fn default_points() -> u32 {
    1
}

fn default_time_limit() -> u32 {
    30
}

fn default_passing_score() -> u8 {
    70
}

fn default_attempts_allowed() -> i64 {
    3
}

fn default_true() -> bool {
    true
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn validate_attempts_allowed(value: i64) -> Result<(), ValidationError> {
    if value == -1 || (1..=u32::MAX as i64).contains(&value) {
        return Ok(());
    }
    Err(ValidationError::new("attempts_allowed")
        .with_message("Attempts allowed must be a positive number or -1 for unlimited".into()))
}

fn validate_question_kind(kind: &QuestionKind) -> Result<(), ValidationError> {
    match kind {
        QuestionKind::MultipleChoice { options } => {
            if options.len() < 2 {
                return Err(ValidationError::new("options")
                    .with_message("Multiple-choice questions need at least two options".into()));
            }
            if options.iter().any(|o| o.text.trim().is_empty()) {
                return Err(ValidationError::new("options")
                    .with_message("Every option needs text".into()));
            }
            if !options.iter().any(|o| o.is_correct) {
                return Err(ValidationError::new("options")
                    .with_message("Mark at least one option as correct".into()));
            }
            if has_duplicate(options.iter().map(|o| o.id.as_str())) {
                return Err(ValidationError::new("options")
                    .with_message("Option ids must be unique within a question".into()));
            }
        }
        QuestionKind::TrueFalse { correct_answer } => {
            let normalized = correct_answer.trim().to_lowercase();
            if normalized != "true" && normalized != "false" {
                return Err(ValidationError::new("correct_answer")
                    .with_message("True/false answers must be 'true' or 'false'".into()));
            }
        }
        QuestionKind::ShortAnswer { correct_answer } => {
            if correct_answer.split('|').all(|a| a.trim().is_empty()) {
                return Err(ValidationError::new("correct_answer")
                    .with_message("Provide at least one accepted answer".into()));
            }
        }
        QuestionKind::Essay => {}
    }
    Ok(())
}

fn has_duplicate<'a>(ids: impl Iterator<Item = &'a str>) -> bool {
    let mut seen = HashSet::new();
    ids.map(str::trim)
        .filter(|id| !id.is_empty())
        .any(|id| !seen.insert(id))
}

/// Question ids are how answers find their question, so a quiz may not
/// reuse one.
fn check_question_ids(questions: &[QuestionInput]) -> Result<(), ValidationError> {
    if has_duplicate(questions.iter().filter_map(|q| q.id.as_deref())) {
        return Err(ValidationError::new("questions")
            .with_message("Question ids must be unique within a quiz".into()));
    }
    Ok(())
}

fn validate_create(request: &CreateQuizRequest) -> Result<(), ValidationError> {
    check_question_ids(&request.questions)?;
    check_window(request.available_from, request.available_until)
}

fn validate_update(request: &UpdateQuizRequest) -> Result<(), ValidationError> {
    match &request.questions {
        Some(questions) => check_question_ids(questions),
        None => Ok(()),
    }
}

fn check_window(
    from: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    if let (Some(from), Some(until)) = (from, until) {
        if until < from {
            return Err(ValidationError::new("available_until")
                .with_message("availableUntil must not be earlier than availableFrom".into()));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    /// Keeps the id of an existing question when a quiz is edited.
    pub id: Option<String>,

    #[validate(custom(function = "not_blank", message = "Please provide question text"))]
    pub text: String,

    #[validate(custom(function = "validate_question_kind"))]
    pub kind: QuestionKind,

    #[serde(default = "default_points")]
    #[validate(range(max = MAX_QUESTION_POINTS, message = "A question is worth at most 1000 points"))]
    pub points: u32,

    pub explanation: Option<String>,

    #[serde(default)]
    pub order: i32,
}

impl QuestionInput {
    pub fn into_question(self) -> QuizQuestion {
        QuizQuestion {
            id: self.id.filter(|id| !id.trim().is_empty()).unwrap_or_else(new_id),
            text: self.text.trim().to_string(),
            kind: self.kind,
            points: self.points,
            explanation: self.explanation,
            order: self.order,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create"))]
pub struct CreateQuizRequest {
    #[validate(custom(function = "not_blank", message = "Please provide course ID"))]
    pub course_id: String,

    #[validate(
        custom(function = "not_blank", message = "Please provide quiz title"),
        length(max = 200, message = "Title cannot exceed 200 characters")
    )]
    pub title: String,

    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,

    #[serde(rename = "type", default)]
    pub quiz_type: QuizType,

    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<QuestionInput>,

    #[serde(default = "default_time_limit")]
    #[validate(range(min = 1, message = "Time limit must be at least one minute"))]
    pub time_limit: u32,

    #[serde(default = "default_passing_score")]
    #[validate(range(max = 100, message = "Passing score must be between 0 and 100"))]
    pub passing_score: u8,

    #[serde(default = "default_attempts_allowed")]
    #[validate(custom(function = "validate_attempts_allowed"))]
    pub attempts_allowed: i64,

    #[serde(default)]
    pub shuffle_questions: bool,

    #[serde(default = "default_true")]
    pub show_correct_answers: bool,

    pub available_from: Option<DateTime<Utc>>,

    pub available_until: Option<DateTime<Utc>>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub order: i32,
}

impl CreateQuizRequest {
    /// Call after `validate()`.
    pub fn into_quiz(self, created_by: &str) -> Quiz {
        let mut quiz = Quiz::new(self.course_id.trim(), self.title.trim(), created_by);
        quiz.description = self.description.map(|d| d.trim().to_string());
        quiz.quiz_type = self.quiz_type;
        quiz.time_limit = self.time_limit;
        quiz.passing_score = self.passing_score;
        quiz.attempts_allowed =
            AttemptLimit::try_from(self.attempts_allowed).unwrap_or_default();
        quiz.shuffle_questions = self.shuffle_questions;
        quiz.show_correct_answers = self.show_correct_answers;
        if self.available_from.is_some() {
            quiz.available_from = self.available_from;
        }
        quiz.available_until = self.available_until;
        quiz.is_active = self.is_active;
        quiz.order = self.order;
        quiz.set_questions(
            self.questions
                .into_iter()
                .map(QuestionInput::into_question)
                .collect(),
        );
        quiz
    }
}

/// Partial update; a present `questions` list replaces the whole set.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update"))]
pub struct UpdateQuizRequest {
    #[validate(
        custom(function = "not_blank", message = "Please provide quiz title"),
        length(max = 200, message = "Title cannot exceed 200 characters")
    )]
    pub title: Option<String>,

    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub quiz_type: Option<QuizType>,

    #[validate(nested)]
    pub questions: Option<Vec<QuestionInput>>,

    #[validate(range(min = 1, message = "Time limit must be at least one minute"))]
    pub time_limit: Option<u32>,

    #[validate(range(max = 100, message = "Passing score must be between 0 and 100"))]
    pub passing_score: Option<u8>,

    #[validate(custom(function = "validate_attempts_allowed"))]
    pub attempts_allowed: Option<i64>,

    pub shuffle_questions: Option<bool>,

    pub show_correct_answers: Option<bool>,

    pub available_from: Option<DateTime<Utc>>,

    pub available_until: Option<DateTime<Utc>>,

    pub is_active: Option<bool>,

    pub order: Option<i32>,
}

impl UpdateQuizRequest {
    /// Call after `validate()`.
    pub fn apply_to(self, quiz: &mut Quiz) -> AppResult<()> {
        if let Some(title) = self.title {
            quiz.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            quiz.description = Some(description.trim().to_string());
        }
        if let Some(quiz_type) = self.quiz_type {
            quiz.quiz_type = quiz_type;
        }
        if let Some(questions) = self.questions {
            quiz.set_questions(questions.into_iter().map(QuestionInput::into_question).collect());
        }
        if let Some(time_limit) = self.time_limit {
            quiz.time_limit = time_limit;
        }
        if let Some(passing_score) = self.passing_score {
            quiz.passing_score = passing_score;
        }
        if let Some(attempts_allowed) = self.attempts_allowed {
            quiz.attempts_allowed =
                AttemptLimit::try_from(attempts_allowed).map_err(AppError::validation)?;
        }
        if let Some(shuffle) = self.shuffle_questions {
            quiz.shuffle_questions = shuffle;
        }
        if let Some(show) = self.show_correct_answers {
            quiz.show_correct_answers = show;
        }
        if self.available_from.is_some() {
            quiz.available_from = self.available_from;
        }
        if self.available_until.is_some() {
            quiz.available_until = self.available_until;
        }
        if let Some(is_active) = self.is_active {
            quiz.is_active = is_active;
        }
        if let Some(order) = self.order {
            quiz.order = order;
        }

        check_window(quiz.available_from, quiz.available_until).map_err(|e| {
            AppError::validation(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid availability window".to_string()),
            )
        })?;
        quiz.touch();
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: String,
    pub selected_option: Option<i32>,
    pub answer: Option<String>,
    pub time_spent: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttemptRequest {
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
    /// Seconds.
    pub time_spent: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualGradeRequest {
    pub points_earned: u32,
}
