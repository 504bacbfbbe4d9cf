use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::models::domain::quiz_question::{new_id, QuizQuestion};

fn default_time_limit() -> u32 {
    30
}

fn default_passing_score() -> u8 {
    70
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub course_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub quiz_type: QuizType,
    #[serde(default)]
    questions: Vec<QuizQuestion>,
    // Derived from `questions`; only `recompute_total_points` writes it.
    #[serde(default)]
    total_points: u32,
    /// Minutes.
    #[serde(default = "default_time_limit")]
    pub time_limit: u32,
    /// Percentage threshold, 0-100.
    #[serde(default = "default_passing_score")]
    pub passing_score: u8,
    #[serde(default)]
    pub attempts_allowed: AttemptLimit,
    #[serde(default)]
    pub shuffle_questions: bool,
    #[serde(default = "default_true")]
    pub show_correct_answers: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_until: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub order: i32,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

/// Only used to weight attempts when aggregating a course grade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizType {
    #[default]
    Quiz,
    Test,
    FinalExam,
}

impl QuizType {
    pub fn is_test(&self) -> bool {
        matches!(self, QuizType::Test | QuizType::FinalExam)
    }
}

/// Stored as a plain number; `-1` means unlimited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum AttemptLimit {
    Unlimited,
    Limited(u32),
}

impl Default for AttemptLimit {
    fn default() -> Self {
        AttemptLimit::Limited(3)
    }
}

impl TryFrom<i64> for AttemptLimit {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(AttemptLimit::Unlimited),
            n if n >= 0 && n <= u32::MAX as i64 => Ok(AttemptLimit::Limited(n as u32)),
            n => Err(format!("invalid attempts allowed value: {}", n)),
        }
    }
}

impl From<AttemptLimit> for i64 {
    fn from(limit: AttemptLimit) -> Self {
        match limit {
            AttemptLimit::Unlimited => -1,
            AttemptLimit::Limited(n) => n as i64,
        }
    }
}

impl AttemptLimit {
    pub fn is_exhausted(&self, completed_attempts: u64) -> bool {
        match self {
            AttemptLimit::Unlimited => false,
            AttemptLimit::Limited(allowed) => completed_attempts >= *allowed as u64,
        }
    }

    pub fn remaining(&self, completed_attempts: u64) -> AttemptsRemaining {
        match self {
            AttemptLimit::Unlimited => AttemptsRemaining::Unlimited,
            AttemptLimit::Limited(allowed) => {
                AttemptsRemaining::Count((*allowed as u64).saturating_sub(completed_attempts))
            }
        }
    }
}

/// Renders as `"Unlimited"` or a number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptsRemaining {
    Unlimited,
    Count(u64),
}

impl Serialize for AttemptsRemaining {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttemptsRemaining::Unlimited => serializer.serialize_str("Unlimited"),
            AttemptsRemaining::Count(n) => serializer.serialize_u64(*n),
        }
    }
}

impl Quiz {
    pub fn new(course_id: &str, title: &str, created_by: &str) -> Self {
        let now = Utc::now();
        Quiz {
            id: new_id(),
            course_id: course_id.to_string(),
            title: title.to_string(),
            description: None,
            quiz_type: QuizType::Quiz,
            questions: Vec::new(),
            total_points: 0,
            time_limit: default_time_limit(),
            passing_score: default_passing_score(),
            attempts_allowed: AttemptLimit::default(),
            shuffle_questions: false,
            show_correct_answers: true,
            available_from: Some(now),
            available_until: None,
            is_active: true,
            order: 0,
            created_by: created_by.to_string(),
            created_at: Some(now),
            modified_at: Some(now),
        }
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn question(&self, question_id: &str) -> Option<&QuizQuestion> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    /// Replaces the question set and keeps `total_points` in step with it.
    pub fn set_questions(&mut self, questions: Vec<QuizQuestion>) {
        self.questions = questions;
        self.recompute_total_points();
    }

    fn recompute_total_points(&mut self) {
        self.total_points = self.questions.iter().map(|q| q.points).sum();
    }

    pub fn is_available_at(&self, now: DateTime<Utc>) -> bool {
        let started = self.available_from.map_or(true, |from| from <= now);
        let not_ended = self.available_until.map_or(true, |until| now <= until);
        started && not_ended
    }

    pub fn touch(&mut self) {
        self.modified_at = Some(Utc::now());
    }
}

/// Learner listings: `order` ascending, then oldest first.
pub fn sort_for_learners(quizzes: &mut [Quiz]) {
    quizzes.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.created_at.cmp(&b.created_at)));
}

/// Admin listings: `order` ascending, then newest first.
pub fn sort_for_admin(quizzes: &mut [Quiz]) {
    quizzes.sort_by(|a, b| match a.order.cmp(&b.order) {
        Ordering::Equal => b.created_at.cmp(&a.created_at),
        other => other,
    });
}
