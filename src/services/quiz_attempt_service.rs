use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::domain::{Quiz, QuizAttempt},
    models::dto::{
        response::GradedAnswer, AttemptWithUser, QuizForTaking, StartAttemptResponse,
        SubmissionSummary, SubmitAttemptRequest, UserSummary,
    },
    repositories::{QuizAttemptRepository, QuizRepository, UserRepository},
    services::grading::GradingEngine,
};

/// Drives an attempt from start to submission, plus the admin views and
/// manual grading that act on completed attempts.
pub struct QuizAttemptService {
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
    users: Arc<dyn UserRepository>,
}

impl QuizAttemptService {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        attempts: Arc<dyn QuizAttemptRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            quizzes,
            attempts,
            users,
        }
    }

    async fn load_quiz(&self, quiz_id: &str) -> AppResult<Quiz> {
        self.quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::not_found("Quiz"))
    }

    async fn load_attempt(&self, attempt_id: &str) -> AppResult<QuizAttempt> {
        self.attempts
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| AppError::not_found("Quiz attempt"))
    }

    /// Opens a new attempt. Two concurrent starts by the same learner can
    /// both succeed; only completed attempts count against the limit.
    pub async fn start(&self, quiz_id: &str, user_id: &str) -> AppResult<StartAttemptResponse> {
        let quiz = self.load_quiz(quiz_id).await?;
        if !quiz.is_active {
            return Err(AppError::not_found("Quiz"));
        }
        if !quiz.is_available_at(Utc::now()) {
            return Err(AppError::QuizUnavailable);
        }

        let completed = self.attempts.count_completed(user_id, &quiz.id).await?;
        if quiz.attempts_allowed.is_exhausted(completed) {
            log::info!(
                "User {} has no attempts left on quiz {} ({} completed)",
                user_id,
                quiz.id,
                completed
            );
            return Err(AppError::AttemptsExhausted);
        }

        let attempt = self
            .attempts
            .create(QuizAttempt::start(&quiz, user_id, completed))
            .await?;

        log::info!(
            "User {} started attempt {} (#{}) on quiz {}",
            user_id,
            attempt.id,
            attempt.attempt_number,
            quiz.id
        );

        Ok(StartAttemptResponse {
            attempt_id: attempt.id,
            attempt_number: attempt.attempt_number,
            quiz: QuizForTaking::from(&quiz),
        })
    }

    /// Grades and closes an attempt. Only the attempt's owner may submit, and
    /// only once.
    pub async fn submit(
        &self,
        attempt_id: &str,
        user_id: &str,
        request: SubmitAttemptRequest,
    ) -> AppResult<SubmissionSummary> {
        let mut attempt = self.load_attempt(attempt_id).await?;

        if !attempt.is_owned_by(user_id) {
            return Err(AppError::Forbidden(
                "You can only submit your own attempts".to_string(),
            ));
        }
        if attempt.is_completed() {
            return Err(AppError::AlreadySubmitted);
        }

        let quiz = self.load_quiz(&attempt.quiz_id).await?;
        let graded = GradingEngine::grade_submission(&quiz, &request.answers);

        attempt.complete(
            graded.answers,
            quiz.total_points(),
            quiz.passing_score,
            request.time_spent.unwrap_or(0),
        )?;

        if !self.attempts.complete(&attempt).await? {
            log::warn!("Attempt {} was submitted concurrently", attempt.id);
            return Err(AppError::AlreadySubmitted);
        }

        log::info!(
            "User {} submitted attempt {} on quiz {}: {}/{} points ({}%), passed={}",
            user_id,
            attempt.id,
            quiz.id,
            attempt.points_earned(),
            attempt.total_points,
            attempt.percentage(),
            attempt.passed()
        );

        let answers: Option<Vec<GradedAnswer>> = quiz.show_correct_answers.then(|| {
            attempt
                .answers()
                .iter()
                .map(|answer| GradedAnswer {
                    answer: answer.clone(),
                    explanation: quiz
                        .question(&answer.question_id)
                        .and_then(|q| q.explanation.clone()),
                })
                .collect()
        });

        Ok(SubmissionSummary {
            attempt_id: attempt.id.clone(),
            points_earned: attempt.points_earned(),
            total_points: attempt.total_points,
            percentage: attempt.percentage(),
            passed: attempt.passed(),
            passing_score: quiz.passing_score,
            answers,
        })
    }

    pub async fn list_user_attempts(&self, quiz_id: &str, user_id: &str) -> AppResult<Vec<QuizAttempt>> {
        self.attempts.find_by_user_and_quiz(user_id, quiz_id).await
    }

    /// Every attempt on a quiz, newest first, with the learner's identity.
    pub async fn list_quiz_attempts(&self, quiz_id: &str) -> AppResult<Vec<AttemptWithUser>> {
        let quiz = self.load_quiz(quiz_id).await?;
        let attempts = self.attempts.find_by_quiz(&quiz.id).await?;

        let mut user_ids: Vec<String> = attempts.iter().map(|a| a.user_id.clone()).collect();
        user_ids.sort();
        user_ids.dedup();

        let users: HashMap<String, UserSummary> = self
            .users
            .find_by_ids(&user_ids)
            .await?
            .iter()
            .map(|user| (user.id.clone(), UserSummary::from(user)))
            .collect();

        Ok(attempts
            .into_iter()
            .map(|attempt| {
                let user = users.get(&attempt.user_id).cloned();
                AttemptWithUser { attempt, user }
            })
            .collect())
    }

    /// Overrides the score of one answer on a completed attempt.
    pub async fn grade_answer(
        &self,
        attempt_id: &str,
        question_id: &str,
        points_earned: u32,
        grader: &Claims,
    ) -> AppResult<QuizAttempt> {
        let mut attempt = self.load_attempt(attempt_id).await?;
        let quiz = self.load_quiz(&attempt.quiz_id).await?;
        let question = quiz
            .question(question_id)
            .ok_or_else(|| AppError::not_found("Question"))?;

        attempt.apply_manual_grade(question, points_earned, quiz.passing_score)?;
        self.attempts.update(&attempt).await?;

        log::info!(
            "{} graded question {} on attempt {}: {} points, attempt now {}%",
            grader.sub,
            question_id,
            attempt.id,
            points_earned,
            attempt.percentage()
        );
        Ok(attempt)
    }
}
