use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::certificate::Certificate;
use crate::models::domain::quiz::{AttemptsRemaining, Quiz};
use crate::models::domain::quiz_attempt::{AttemptAnswer, QuizAttempt};
use crate::models::domain::User;
use crate::models::dto::quiz_dto::QuizForTaking;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            data,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub count: usize,
    pub data: Vec<T>,
}

impl<T: Serialize> From<Vec<T>> for ListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        ListResponse {
            count: data.len(),
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Admins see the stored quiz, everyone else the stripped one.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum QuizView {
    Full(Quiz),
    ForTaking(QuizForTaking),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDetailResponse {
    #[serde(flatten)]
    pub quiz: QuizView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts_used: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts_remaining: Option<AttemptsRemaining>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAttemptResponse {
    pub attempt_id: String,
    pub attempt_number: u32,
    pub quiz: QuizForTaking,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
    #[serde(flatten)]
    pub answer: AttemptAnswer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub attempt_id: String,
    pub points_earned: u32,
    pub total_points: u32,
    pub percentage: u32,
    pub passed: bool,
    pub passing_score: u8,
    /// Present only when the quiz shows correct answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<GradedAnswer>>,
}

impl SubmissionSummary {
    pub fn message(&self) -> &'static str {
        if self.passed {
            "Congratulations! You passed!"
        } else {
            "Quiz completed"
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub full_name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            id: user.id.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptWithUser {
    #[serde(flatten)]
    pub attempt: QuizAttempt,
    /// `None` when the learner no longer exists in the directory.
    pub user: Option<UserSummary>,
}

/// Public view of a certificate for third-party verification.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateVerification {
    pub certificate_number: String,
    pub student_name: String,
    pub course_name: String,
    pub issue_date: DateTime<Utc>,
    pub grade: String,
    pub score: u32,
    pub is_valid: bool,
}

impl From<&Certificate> for CertificateVerification {
    fn from(certificate: &Certificate) -> Self {
        CertificateVerification {
            certificate_number: certificate.certificate_number.clone(),
            student_name: certificate.student_name.clone(),
            course_name: certificate.course_name.clone(),
            issue_date: certificate.issue_date,
            grade: certificate.grade.as_str().to_string(),
            score: certificate.score,
            is_valid: certificate.is_active,
        }
    }
}
