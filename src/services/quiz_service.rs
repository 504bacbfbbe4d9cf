use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::domain::Quiz,
    models::dto::{
        CreateQuizRequest, QuizDetailResponse, QuizForTaking, QuizView, UpdateQuizRequest,
    },
    repositories::{QuizAttemptRepository, QuizRepository},
};

/// Quiz definitions: learner listings plus the admin authoring surface.
pub struct QuizService {
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
}

impl QuizService {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        attempts: Arc<dyn QuizAttemptRepository>,
    ) -> Self {
        Self { quizzes, attempts }
    }

    pub async fn list_for_course(&self, course_id: &str) -> AppResult<Vec<QuizForTaking>> {
        let quizzes = self.quizzes.find_active_by_course(course_id).await?;
        Ok(quizzes.iter().map(QuizForTaking::from).collect())
    }

    /// Admins get the stored quiz, anyone else the stripped view of an
    /// active one. Signed-in callers also get their attempt counts.
    pub async fn get_quiz(&self, id: &str, caller: Option<&Claims>) -> AppResult<QuizDetailResponse> {
        let quiz = self
            .quizzes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Quiz"))?;

        let is_admin = caller.is_some_and(Claims::is_admin);
        if !quiz.is_active && !is_admin {
            return Err(AppError::not_found("Quiz"));
        }

        let (attempts_used, attempts_remaining) = match caller {
            Some(claims) => {
                let used = self.attempts.count_completed(&claims.sub, &quiz.id).await?;
                (Some(used), Some(quiz.attempts_allowed.remaining(used)))
            }
            None => (None, None),
        };

        let quiz = if is_admin {
            QuizView::Full(quiz)
        } else {
            QuizView::ForTaking(QuizForTaking::from(&quiz))
        };

        Ok(QuizDetailResponse {
            quiz,
            attempts_used,
            attempts_remaining,
        })
    }

    pub async fn list_for_admin(&self, course_id: &str) -> AppResult<Vec<Quiz>> {
        self.quizzes.find_by_course(course_id).await
    }

    pub async fn create_quiz(&self, request: CreateQuizRequest, created_by: &str) -> AppResult<Quiz> {
        request.validate()?;

        let quiz = self.quizzes.create(request.into_quiz(created_by)).await?;
        log::info!(
            "Quiz {} created for course {} by {} ({} questions, {} points)",
            quiz.id,
            quiz.course_id,
            created_by,
            quiz.questions().len(),
            quiz.total_points()
        );
        Ok(quiz)
    }

    pub async fn update_quiz(&self, id: &str, request: UpdateQuizRequest) -> AppResult<Quiz> {
        request.validate()?;

        let mut quiz = self
            .quizzes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Quiz"))?;

        request.apply_to(&mut quiz)?;

        let quiz = self.quizzes.update(quiz).await?;
        log::info!("Quiz {} updated", quiz.id);
        Ok(quiz)
    }

    /// Removes the quiz together with every attempt made on it.
    pub async fn delete_quiz(&self, id: &str) -> AppResult<()> {
        self.quizzes.delete(id).await?;
        let removed = self.attempts.delete_by_quiz(id).await?;
        log::info!("Quiz {} deleted along with {} attempts", id, removed);
        Ok(())
    }
}
