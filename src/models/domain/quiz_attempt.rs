use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::models::domain::quiz::Quiz;
use crate::models::domain::quiz_question::{new_id, QuizQuestion};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttemptStatus {
    InProgress,
    Completed,
    /// Set by cleanup jobs outside this service.
    Abandoned,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::InProgress => "in-progress",
            AttemptStatus::Completed => "completed",
            AttemptStatus::Abandoned => "abandoned",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptAnswer {
    pub question_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub is_correct: bool,
    pub points_earned: u32,
    /// Seconds.
    #[serde(default)]
    pub time_spent: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: String,
    pub quiz_id: String,
    pub user_id: String,
    /// Copied from the quiz when the attempt starts.
    pub course_id: String,
    #[serde(default)]
    answers: Vec<AttemptAnswer>,
    #[serde(default)]
    points_earned: u32,
    #[serde(default)]
    percentage: u32,
    pub total_points: u32,
    #[serde(default)]
    passed: bool,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    /// Seconds.
    #[serde(default)]
    pub time_spent: u64,
    pub status: AttemptStatus,
    pub attempt_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

/// `round(100 * earned / total)`, or 0 for a quiz worth nothing.
pub fn percentage_of(points_earned: u32, total_points: u32) -> u32 {
    if total_points == 0 {
        return 0;
    }
    ((points_earned as f64 / total_points as f64) * 100.0).round() as u32
}

/// Attempt histories are listed newest first.
pub fn sort_newest_first(attempts: &mut [QuizAttempt]) {
    attempts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

impl QuizAttempt {
    /// Opens a new in-progress attempt. `completed_attempts` is the number of
    /// attempts this user has already completed on the quiz.
    pub fn start(quiz: &Quiz, user_id: &str, completed_attempts: u64) -> Self {
        let now = Utc::now();
        QuizAttempt {
            id: new_id(),
            quiz_id: quiz.id.clone(),
            user_id: user_id.to_string(),
            course_id: quiz.course_id.clone(),
            answers: Vec::new(),
            points_earned: 0,
            percentage: 0,
            total_points: quiz.total_points(),
            passed: false,
            started_at: now,
            submitted_at: None,
            time_spent: 0,
            status: AttemptStatus::InProgress,
            attempt_number: completed_attempts as u32 + 1,
            created_at: Some(now),
            modified_at: Some(now),
        }
    }

    pub fn answers(&self) -> &[AttemptAnswer] {
        &self.answers
    }

    pub fn points_earned(&self) -> u32 {
        self.points_earned
    }

    pub fn percentage(&self) -> u32 {
        self.percentage
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn is_completed(&self) -> bool {
        self.status == AttemptStatus::Completed
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// The single `in-progress -> completed` transition. Answers are frozen
    /// afterwards.
    pub fn complete(
        &mut self,
        answers: Vec<AttemptAnswer>,
        total_points: u32,
        passing_score: u8,
        time_spent: u64,
    ) -> AppResult<()> {
        if self.is_completed() {
            return Err(AppError::AlreadySubmitted);
        }

        let now = Utc::now();
        self.answers = answers;
        self.total_points = total_points;
        self.recompute(passing_score);
        self.status = AttemptStatus::Completed;
        self.submitted_at = Some(now);
        self.time_spent = time_spent;
        self.modified_at = Some(now);
        Ok(())
    }

    /// Overrides the automatic score of one answer, e.g. an essay.
    pub fn apply_manual_grade(
        &mut self,
        question: &QuizQuestion,
        points_earned: u32,
        passing_score: u8,
    ) -> AppResult<()> {
        if !self.is_completed() {
            return Err(AppError::validation(
                "Only submitted attempts can be graded manually",
            ));
        }

        if points_earned > question.points {
            return Err(AppError::validation(format!(
                "Points earned cannot exceed the question's {} points",
                question.points
            )));
        }

        let answer = self
            .answers
            .iter_mut()
            .find(|a| a.question_id == question.id)
            .ok_or_else(|| AppError::not_found("Answer"))?;

        answer.points_earned = points_earned;
        answer.is_correct = points_earned > 0 && points_earned == question.points;

        self.recompute(passing_score);
        self.modified_at = Some(Utc::now());
        Ok(())
    }

    fn recompute(&mut self, passing_score: u8) {
        self.points_earned = self.answers.iter().map(|a| a.points_earned).sum();
        self.percentage = percentage_of(self.points_earned, self.total_points);
        self.passed = self.percentage >= passing_score as u32;
    }
}
